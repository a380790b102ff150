//! Common utilities for benchmarks

use criterion::Criterion;
use pprof::criterion::{Output, PProfProfiler};
use serde_json::{json, Value};

/// Configure criterion with flamegraph profiling support
pub fn criterion_config() -> Criterion {
    Criterion::default()
        .warm_up_time(std::time::Duration::from_secs(3))
        .measurement_time(std::time::Duration::from_secs(10))
        .sample_size(100)
        .with_profiler(PProfProfiler::new(100, Output::Flamegraph(None)))
}

/// A packument with `version_count` published versions
pub fn packument_json(version_count: usize) -> Value {
    let mut versions = serde_json::Map::new();
    let mut time = serde_json::Map::new();
    for i in 0..version_count {
        let version = format!("1.{i}.0");
        versions.insert(
            version.clone(),
            json!({
                "name": "bench-package",
                "version": version,
                "_id": format!("bench-package@{version}"),
                "description": "Benchmark fixture",
                "license": "MIT",
                "dependencies": { "left-pad": "^1.3.0", "lodash": "^4.17.21" },
                "dist": {
                    "tarball": format!("https://registry.npmjs.org/bench-package/-/bench-package-{version}.tgz"),
                    "shasum": "5b8a3a7765dfe001261dde915589e782f8c94d1e",
                    "integrity": "sha512-abc",
                    "fileCount": 12,
                    "unpackedSize": 40960
                }
            }),
        );
        time.insert(version, json!("2024-01-01T00:00:00.000Z"));
    }
    json!({
        "_id": "bench-package",
        "name": "bench-package",
        "dist-tags": { "latest": format!("1.{}.0", version_count.saturating_sub(1)) },
        "versions": versions,
        "time": time,
        "readme": "x".repeat(4096)
    })
}
