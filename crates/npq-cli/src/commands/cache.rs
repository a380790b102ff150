//! `npq cache` subcommands

use camino::Utf8Path;
use npq_config::CacheDriverKind;
use npq_core::error::NpqResult;
use npq_registry::snapshot;
use serde_json::{json, Value};

use super::CommandContext;

/// Memory caches start empty in every process
fn warn_if_volatile(ctx: &CommandContext) {
    if ctx.settings.cache.driver == CacheDriverKind::Memory {
        ctx.output
            .warn("The memory cache driver does not persist; use --cache-driver fs to manage a cache on disk");
    }
}

fn location(ctx: &CommandContext) -> Value {
    match ctx.settings.cache.driver {
        CacheDriverKind::Memory => Value::Null,
        CacheDriverKind::Fs => json!(ctx.settings.cache.dir.as_str()),
    }
}

pub async fn list(ctx: &CommandContext) -> NpqResult<Value> {
    warn_if_volatile(ctx);
    let keys = ctx.cache.storage().list_keys().await?;
    Ok(json!({
        "driver": ctx.cache.storage().name(),
        "dir": location(ctx),
        "keys": keys,
    }))
}

pub async fn clear(ctx: &CommandContext) -> NpqResult<Value> {
    warn_if_volatile(ctx);
    let storage = ctx.cache.storage();
    let removed = storage.list_keys().await?.len();
    storage.clear().await?;
    ctx.output.success(&format!("Removed {removed} cache entries"));
    Ok(json!({ "driver": storage.name(), "removed": removed }))
}

pub async fn export(ctx: &CommandContext, file: &Utf8Path) -> NpqResult<Value> {
    warn_if_volatile(ctx);
    let entries = snapshot::write_snapshot(&ctx.cache, file).await?;
    ctx.output.success(&format!("Exported {entries} entries to {file}"));
    Ok(json!({ "file": file.as_str(), "entries": entries }))
}

pub async fn import(ctx: &CommandContext, file: &Utf8Path) -> NpqResult<Value> {
    warn_if_volatile(ctx);
    let entries = snapshot::read_snapshot(&ctx.cache, file).await?;
    ctx.output.success(&format!("Imported {entries} entries from {file}"));
    Ok(json!({ "file": file.as_str(), "entries": entries }))
}
