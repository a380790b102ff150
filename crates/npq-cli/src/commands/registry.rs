//! Registry document commands

use npq_core::error::NpqResult;
use npq_registry::SearchCriteria;
use serde_json::Value;

use super::{to_json, CommandContext};

pub async fn metadata(ctx: &CommandContext) -> NpqResult<Value> {
    to_json(&ctx.client.get_registry_metadata().await?)
}

pub async fn keys(ctx: &CommandContext) -> NpqResult<Value> {
    to_json(&ctx.client.get_registry_signing_keys().await?)
}

pub async fn packument(ctx: &CommandContext, name: &str, abbreviated: bool) -> NpqResult<Value> {
    if abbreviated {
        to_json(&ctx.client.get_abbreviated_packument(name).await?)
    } else {
        to_json(&ctx.client.get_packument(name).await?)
    }
}

pub async fn manifest(ctx: &CommandContext, name: &str, version: Option<&str>) -> NpqResult<Value> {
    to_json(&ctx.client.get_package_manifest(name, version).await?)
}

pub async fn search(ctx: &CommandContext, criteria: &SearchCriteria) -> NpqResult<Value> {
    to_json(&ctx.client.search_packages(criteria).await?)
}
