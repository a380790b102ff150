//! npm package name checking.
//!
//! Two checkers are provided. [`validate_package_name`] accepts anything the
//! registry can still serve, including legacy names with uppercase letters or
//! punctuation. [`validate_strict_package_name`] applies the rules new
//! packages must follow when they are published.

use crate::error::{NpqError, NpqResult};

/// Names the registry refuses regardless of case
pub const BLACKLISTED_NAMES: &[&str] = &["node_modules", "favicon.ico"];

/// Maximum length of a package name accepted by the strict checker
pub const MAX_PACKAGE_NAME_LENGTH: usize = 214;

/// Node.js builtin modules, reserved for new packages
pub const NODE_BUILTIN_MODULES: &[&str] = &[
    "_http_agent",
    "_http_client",
    "_http_common",
    "_http_incoming",
    "_http_outgoing",
    "_http_server",
    "_stream_duplex",
    "_stream_passthrough",
    "_stream_readable",
    "_stream_transform",
    "_stream_wrap",
    "_stream_writable",
    "_tls_common",
    "_tls_wrap",
    "assert",
    "assert/strict",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "dns/promises",
    "domain",
    "events",
    "fs",
    "fs/promises",
    "http",
    "http2",
    "https",
    "inspector",
    "inspector/promises",
    "module",
    "net",
    "os",
    "path",
    "path/posix",
    "path/win32",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "readline/promises",
    "repl",
    "stream",
    "stream/consumers",
    "stream/promises",
    "stream/web",
    "string_decoder",
    "sys",
    "timers",
    "timers/promises",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "util/types",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Punctuation that new package names may not contain
const STRICT_SPECIAL_CHARS: &[char] = &['~', '\'', '!', '(', ')', '*'];

/// Check a package name with the permissive (legacy-compatible) rules
pub fn validate_package_name(name: &str) -> NpqResult<()> {
    if name.is_empty() {
        return Err(invalid(name, "Package name cannot be empty."));
    }
    if name.starts_with('.') {
        return Err(invalid(name, "Package name cannot start with a leading period."));
    }
    if name.starts_with('_') {
        return Err(invalid(name, "Package name cannot start with a leading underscore."));
    }
    if name.trim() != name {
        return Err(invalid(name, "Package name cannot contain leading or trailing spaces."));
    }
    let lower = name.to_lowercase();
    if BLACKLISTED_NAMES.contains(&lower.as_str()) {
        return Err(invalid(name, "Package name cannot be node_modules or favicon.ico."));
    }
    if !has_url_friendly_parts(name) {
        return Err(invalid(name, "Package name can only contain URL-friendly characters."));
    }
    Ok(())
}

/// Check a package name with the rules applied to newly published packages
pub fn validate_strict_package_name(name: &str) -> NpqResult<()> {
    validate_package_name(name)?;

    let lower = name.to_lowercase();
    if NODE_BUILTIN_MODULES.contains(&lower.as_str()) {
        return Err(invalid(name, "Package name cannot be a Node.js builtin module."));
    }
    if name.chars().count() > MAX_PACKAGE_NAME_LENGTH {
        return Err(invalid(name, "Package name cannot be longer than 214 characters."));
    }
    if name != lower {
        return Err(invalid(name, "Package name should be lower case."));
    }
    if name.contains(STRICT_SPECIAL_CHARS) {
        return Err(invalid(name, "Package name cannot contain special characters."));
    }
    Ok(())
}

/// Whether the name has an `@scope/` prefix
pub fn is_scoped(name: &str) -> bool {
    name.starts_with('@') && name.contains('/')
}

/// Split a name into its optional scope and package part.
///
/// Returns `None` when the name is neither `pkg` nor `@scope/pkg`.
pub fn split_scope(name: &str) -> Option<(Option<&str>, &str)> {
    if let Some(rest) = name.strip_prefix('@') {
        if let Some((scope, pkg)) = rest.split_once('/') {
            if scope.is_empty() || pkg.is_empty() || pkg.contains('/') {
                return None;
            }
            return Some((Some(scope), pkg));
        }
    }
    if name.is_empty() || name.contains('/') {
        return None;
    }
    Some((None, name))
}

fn has_url_friendly_parts(name: &str) -> bool {
    match split_scope(name) {
        Some((scope, pkg)) => scope.map_or(true, is_uri_component_safe) && is_uri_component_safe(pkg),
        None => false,
    }
}

/// Characters `encodeURIComponent` leaves untouched
fn is_uri_component_safe(part: &str) -> bool {
    part.chars().all(|c| {
        c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')')
    })
}

fn invalid(name: &str, reason: &str) -> NpqError {
    NpqError::InvalidPackageName {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}
