//! Unit tests for registry client

use super::*;
use crate::api::{DownloadPeriod, PackageManifest, RegistryDownloads, SearchCriteria};
use crate::cache::{FsDriver, MemoryDriver, RequestIdentity, StorageDriver};
use camino::Utf8PathBuf;
use npq_core::error::ErrorKind;
use serde_json::json;
use std::sync::Arc;

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, cache: Option<Cache>) -> RegistryClient {
    RegistryClient::with_options(ClientOptions {
        registry_api_url: server.uri(),
        downloads_api_url: server.uri(),
        cache,
        ..ClientOptions::default()
    })
    .unwrap()
}

fn manifest_body(name: &str, version: &str) -> Value {
    json!({
        "name": name,
        "version": version,
        "_id": format!("{name}@{version}"),
        "dist": {
            "tarball": format!("https://registry.npmjs.org/{name}/-/{name}-{version}.tgz"),
            "shasum": "3b5b6e8a5f5d5c5e3c1b1f1e9c6a2d4f6b0c8e2a"
        }
    })
}

fn point_downloads_body() -> Value {
    json!({ "downloads": 1000, "start": "2024-01-01", "end": "2024-01-07" })
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |requests| requests.len())
}

#[test]
fn test_registry_client_creation() {
    let client = RegistryClient::new().unwrap();
    assert_eq!(client.registry_api_url().as_str(), "https://registry.npmjs.org/");
    assert_eq!(client.downloads_api_url().as_str(), "https://api.npmjs.org/");
    assert!(client.cache().is_none());

    let cached = RegistryClient::with_cache(Cache::new()).unwrap();
    assert!(cached.cache().is_some());
}

#[test]
fn test_base_url_normalization() {
    let url = parse_base_url("registry_api_url", "https://mirror.example.com/npm").unwrap();
    assert_eq!(url.as_str(), "https://mirror.example.com/npm/");

    let url = parse_base_url("registry_api_url", "https://mirror.example.com/npm/").unwrap();
    assert_eq!(url.as_str(), "https://mirror.example.com/npm/");

    for raw in ["not a url", "ftp://example.com/", "mailto:someone@example.com"] {
        let err = parse_base_url("registry_api_url", raw).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{raw}");
    }
}

#[test]
fn test_endpoint_url_encodes_segments() {
    let base = parse_base_url("base", "https://api.npmjs.org").unwrap();
    assert_eq!(
        endpoint_url(&base, &["downloads", "point", "last-week", "@types", "node"]).as_str(),
        "https://api.npmjs.org/downloads/point/last-week/@types/node"
    );
    assert_eq!(
        endpoint_url(&base, &["versions", "@types/node", "last-week"]).as_str(),
        "https://api.npmjs.org/versions/@types%2Fnode/last-week"
    );
}

#[tokio::test]
async fn test_cache_hit_avoids_network() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/react/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest_body("react", "18.2.0")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, Some(Cache::new()));
    let first = client.get_package_manifest("react", None).await.unwrap();
    let second = client.get_package_manifest("react", None).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(request_count(&server).await, 1);
    assert_eq!(client.cache().unwrap().storage().list_keys().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_without_cache_every_call_fetches() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/react/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest_body("react", "18.2.0")))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    client.get_package_manifest("react", None).await.unwrap();
    client.get_package_manifest("react", None).await.unwrap();
}

#[tokio::test]
async fn test_stored_value_drops_unknown_fields() {
    let server = MockServer::start().await;
    let mut body = manifest_body("react", "18.2.0");
    body["readme"] = json!("not part of a manifest");
    Mock::given(method("GET"))
        .and(path("/react/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let cache = Cache::new();
    let client = client_for(&server, Some(cache.clone()));
    client.get_package_manifest("react", None).await.unwrap();

    let keys = cache.storage().list_keys().await.unwrap();
    let stored = cache.storage().get(&keys[0]).await.unwrap().unwrap();
    assert!(stored.get("readme").is_none());
    assert_eq!(stored["_id"], "react@18.2.0");
}

#[tokio::test]
async fn test_invalid_response_is_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/downloads/point/last-week"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "downloads": "lots" })))
        .mount(&server)
        .await;

    let cache = Cache::new();
    let client = client_for(&server, Some(cache.clone()));
    let err = client
        .get_registry_downloads(DownloadPeriod::LastWeek)
        .await
        .unwrap_err();

    match err {
        NpqError::Validation { shape, path, .. } => {
            assert_eq!(shape, "RegistryDownloads");
            assert_eq!(path, "downloads");
        }
        other => panic!("Expected Validation error, got {other:?}"),
    }
    assert!(cache.storage().list_keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_stale_cached_value_fails_validation() {
    let server = MockServer::start().await;
    let client = client_for(&server, Some(Cache::new()));

    let url = endpoint_url(client.downloads_api_url(), &["downloads", "point", "last-week"]);
    let cache = client.cache().unwrap();
    let key = cache.key_for(&RequestIdentity::new(url.as_str(), None));
    cache
        .storage()
        .set(&key, json!({ "unexpected": true }))
        .await
        .unwrap();

    let err = client
        .get_registry_downloads(DownloadPeriod::LastWeek)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_prepopulated_cache_is_used() {
    let server = MockServer::start().await;
    let client = client_for(&server, Some(Cache::new()));

    let url = endpoint_url(client.downloads_api_url(), &["downloads", "point", "last-month"]);
    let key = client
        .cache()
        .unwrap()
        .key_for(&RequestIdentity::new(url.as_str(), None));
    client
        .cache()
        .unwrap()
        .storage()
        .set(&key, point_downloads_body())
        .await
        .unwrap();

    let downloads = client
        .get_registry_downloads(DownloadPeriod::LastMonth)
        .await
        .unwrap();
    assert_eq!(
        downloads,
        RegistryDownloads {
            downloads: 1000,
            start: "2024-01-01".to_string(),
            end: "2024-01-07".to_string(),
        }
    );
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nonexistent-package/latest"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "error": "Not found" })))
        .mount(&server)
        .await;

    let client = client_for(&server, Some(Cache::new()));
    let err = client
        .get_package_manifest("nonexistent-package", None)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.status(), Some(404));
    assert!(client.cache().unwrap().storage().list_keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_transport_failure() {
    let client = RegistryClient::with_options(ClientOptions {
        registry_api_url: "http://127.0.0.1:1".to_string(),
        timeout: Duration::from_secs(5),
        ..ClientOptions::default()
    })
    .unwrap();

    let err = client.get_registry_metadata().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
    assert_eq!(err.status(), None);
}

#[tokio::test]
async fn test_non_json_body_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server, None)
        .get_registry_metadata()
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Network);
}

#[tokio::test]
async fn test_invalid_names_fail_before_network() {
    let server = MockServer::start().await;
    let client = client_for(&server, None);

    for name in ["", ".hidden", "node_modules", " padded "] {
        let err = client.get_packument(name).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{name:?}");
    }
    for version in ["", ".", "..", "1.0.0/../x"] {
        let err = client
            .get_package_manifest("react", Some(version))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument, "{version:?}");
    }
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_bulk_argument_checks() {
    let server = MockServer::start().await;
    let client = client_for(&server, None);
    let period = DownloadPeriod::LastWeek;

    let scoped = client
        .get_bulk_package_downloads(&["npm", "@scope/pkg"], period)
        .await
        .unwrap_err();
    assert_eq!(scoped.kind(), ErrorKind::InvalidArgument);

    let single = client
        .get_bulk_daily_package_downloads(&["npm"], period)
        .await
        .unwrap_err();
    assert_eq!(single.kind(), ErrorKind::InvalidArgument);

    let names: Vec<String> = (0..=MAX_BULK_PACKAGES).map(|i| format!("pkg-{i}")).collect();
    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    let too_many = client
        .get_bulk_package_downloads(&names, period)
        .await
        .unwrap_err();
    assert_eq!(too_many.kind(), ErrorKind::InvalidArgument);

    let invalid = client
        .get_bulk_package_downloads(&["npm", "_private"], period)
        .await
        .unwrap_err();
    assert!(matches!(invalid, NpqError::InvalidPackageName { ref name, .. } if name == "_private"));

    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_bulk_package_downloads() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/downloads/point/last-day/npm,react"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "npm": { "downloads": 10, "start": "2024-01-01", "end": "2024-01-01", "package": "npm" },
            "react": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let bulk = client_for(&server, None)
        .get_bulk_package_downloads(&["npm", "react"], DownloadPeriod::LastDay)
        .await
        .unwrap();
    assert_eq!(bulk["npm"].as_ref().unwrap().downloads, 10);
    assert!(bulk["react"].is_none());
}

#[tokio::test]
async fn test_manifest_defaults_to_latest() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/react/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest_body("react", "18.2.0")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/react/17.0.2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest_body("react", "17.0.2")))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let latest: PackageManifest = client.get_package_manifest("react", None).await.unwrap();
    assert_eq!(latest.name, "react");
    assert_eq!(latest.version, "18.2.0");

    let pinned = client
        .get_package_manifest("react", Some("17.0.2"))
        .await
        .unwrap();
    assert_eq!(pinned.version, "17.0.2");
}

#[tokio::test]
async fn test_scoped_package_paths() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/@types/node/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest_body("@types/node", "20.0.0")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/versions/@types%2Fnode/last-week"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "package": "@types/node",
            "downloads": { "20.0.0": 5, "19.0.0": 2 }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let manifest = client.get_package_manifest("@types/node", None).await.unwrap();
    assert_eq!(manifest.name, "@types/node");

    let versions = client.get_package_versions_downloads("@types/node").await.unwrap();
    assert_eq!(versions.downloads["20.0.0"], 5);
}

#[tokio::test]
async fn test_packument_accept_headers_have_separate_cache_entries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/left-pad"))
        .and(header("Accept", "application/vnd.npm.install-v1+json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "left-pad",
            "modified": "2024-01-01T00:00:00.000Z",
            "dist-tags": { "latest": "1.3.0" },
            "versions": {}
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/left-pad"))
        .and(header("Accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "left-pad",
            "dist-tags": { "latest": "1.3.0" },
            "versions": {}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let cache = Cache::new();
    let client = client_for(&server, Some(cache.clone()));
    let abbreviated = client.get_abbreviated_packument("left-pad").await.unwrap();
    let full = client.get_packument("left-pad").await.unwrap();

    assert_eq!(abbreviated.dist_tags.latest, "1.3.0");
    assert_eq!(full.name, "left-pad");
    assert_eq!(cache.storage().list_keys().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_search_query_parameters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/-/v1/search"))
        .and(query_param("text", "author:sindresorhus"))
        .and(query_param("size", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "objects": [],
            "total": 0,
            "time": "Mon Jan 01 2024 00:00:00 GMT+0000 (UTC)"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let criteria = SearchCriteria {
        size: Some(5),
        ..SearchCriteria::text("author:sindresorhus")
    };
    let results = client_for(&server, None).search_packages(&criteria).await.unwrap();
    assert_eq!(results.total, 0);
    assert!(results.objects.is_empty());
}

#[tokio::test]
async fn test_custom_base_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/mirror/-/npm/v1/keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [{
                "expires": null,
                "keyid": "SHA256:jl3bwswu80PjjokCgh0o2w5c2U4LhQAE57gj9cz1kzA",
                "keytype": "ecdsa-sha2-nistp256",
                "scheme": "ecdsa-sha2-nistp256",
                "key": "MFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAE1Olb3zMAFFxXKHiIkQO5cJ3Yhl5i6UPp+IhuteBJbuHcA5UogKo0EWtlWwW6KSaKoTNEYL7JlCQiVnkhBktUgg=="
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stats/downloads/range/last-year/npm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "start": "2023-01-01",
            "end": "2023-12-31",
            "package": "npm",
            "downloads": [{ "downloads": 3, "day": "2023-01-01" }, { "downloads": 4, "day": "2023-01-02" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = RegistryClient::with_options(ClientOptions {
        registry_api_url: format!("{}/mirror", server.uri()),
        downloads_api_url: format!("{}/stats/", server.uri()),
        ..ClientOptions::default()
    })
    .unwrap();

    let keys = client.get_registry_signing_keys().await.unwrap();
    assert_eq!(keys.keys.len(), 1);

    let daily = client
        .get_daily_package_downloads("npm", DownloadPeriod::LastYear)
        .await
        .unwrap();
    assert_eq!(daily.total(), 7);
}

#[tokio::test]
async fn test_clients_share_storage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/downloads/point/last-week"))
        .respond_with(ResponseTemplate::new(200).set_body_json(point_downloads_body()))
        .expect(1)
        .mount(&server)
        .await;

    let storage: Arc<dyn StorageDriver> = Arc::new(MemoryDriver::new());
    let first = client_for(&server, Some(Cache::builder().shared_storage(Arc::clone(&storage)).build()));
    let second = client_for(&server, Some(Cache::builder().shared_storage(storage).build()));

    let a = first.get_registry_downloads(DownloadPeriod::LastWeek).await.unwrap();
    let b = second.get_registry_downloads(DownloadPeriod::LastWeek).await.unwrap();
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_fetch_raw_json_shape() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/anything"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "x": [1, 2] })))
        .mount(&server)
        .await;

    let client = client_for(&server, None);
    let url = endpoint_url(client.registry_api_url(), &["anything"]);
    let value: Value = client.fetch(&url, None).await.unwrap();
    assert_eq!(value, json!({ "x": [1, 2] }));
}

#[tokio::test]
async fn test_custom_serializer_over_fs_driver() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/react/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(manifest_body("react", "18.2.0")))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let root = Utf8PathBuf::from_path_buf(dir.path().join("cache")).unwrap();
    let cache = Cache::builder()
        .serializer(|identity: &RequestIdentity| format!("k+/{}=", identity.url.len()))
        .storage(FsDriver::new(&root))
        .build();
    let client = client_for(&server, Some(cache.clone()));

    let first = client.get_package_manifest("react", None).await.unwrap();
    let second = client.get_package_manifest("react", None).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(request_count(&server).await, 1);

    let keys = cache.storage().list_keys().await.unwrap();
    assert_eq!(keys.len(), 1);
    assert!(keys[0].starts_with("k+/") && keys[0].ends_with('='));

    // A fresh driver on the same directory serves the entry
    let reopened = Cache::builder()
        .serializer(|identity: &RequestIdentity| format!("k+/{}=", identity.url.len()))
        .storage(FsDriver::new(&root))
        .build();
    let offline = client_for(&server, Some(reopened));
    assert_eq!(offline.get_package_manifest("react", None).await.unwrap(), first);
    assert_eq!(request_count(&server).await, 1);
}
