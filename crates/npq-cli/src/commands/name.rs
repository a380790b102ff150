//! `npq check-name`

use npq_core::error::NpqResult;
use npq_core::name::{is_scoped, validate_package_name, validate_strict_package_name};
use serde_json::{json, Value};

/// Fails with the first broken rule; an invalid name is a command error
pub fn check(name: &str, strict: bool) -> NpqResult<Value> {
    if strict {
        validate_strict_package_name(name)?;
    } else {
        validate_package_name(name)?;
    }
    Ok(json!({
        "name": name,
        "valid": true,
        "strict": strict,
        "scoped": is_scoped(name),
    }))
}
