//! Download count commands

use npq_core::error::NpqResult;
use npq_registry::DownloadPeriod;
use serde_json::Value;

use super::{to_json, CommandContext};

/// One name uses the single-package endpoint, several use the bulk endpoint
pub async fn packages(
    ctx: &CommandContext,
    names: &[String],
    period: DownloadPeriod,
    daily: bool,
) -> NpqResult<Value> {
    let client = &ctx.client;
    if let [name] = names {
        return if daily {
            to_json(&client.get_daily_package_downloads(name, period).await?)
        } else {
            to_json(&client.get_package_downloads(name, period).await?)
        };
    }

    let names: Vec<&str> = names.iter().map(String::as_str).collect();
    if daily {
        to_json(&client.get_bulk_daily_package_downloads(&names, period).await?)
    } else {
        to_json(&client.get_bulk_package_downloads(&names, period).await?)
    }
}

pub async fn registry(ctx: &CommandContext, period: DownloadPeriod, daily: bool) -> NpqResult<Value> {
    if daily {
        to_json(&ctx.client.get_daily_registry_downloads(period).await?)
    } else {
        to_json(&ctx.client.get_registry_downloads(period).await?)
    }
}

pub async fn versions(ctx: &CommandContext, name: &str) -> NpqResult<Value> {
    to_json(&ctx.client.get_package_versions_downloads(name).await?)
}
