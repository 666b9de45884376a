//! Cache command handler - Manage cached metadata documents

use crate::cache::MetadataCache;
use crate::cli::{CacheArgs, CacheOperation};
use crate::commands::{banner, CommandContext};
use crate::error::Result;

/// Run the cache command
pub fn run_cache(args: &CacheArgs, ctx: &CommandContext) -> Result<String> {
    let cache = MetadataCache::from_config(&ctx.config);
    match &args.operation {
        CacheOperation::Info => run_cache_info(&cache, ctx),
        CacheOperation::Clear { app_id } => run_cache_clear(&cache, app_id.as_deref(), ctx),
        CacheOperation::Prune { hours } => run_cache_prune(&cache, *hours, ctx),
    }
}

/// Show cache information
fn run_cache_info(cache: &MetadataCache, ctx: &CommandContext) -> Result<String> {
    let entries = cache.entries(None)?;
    let now = cache.now();
    let max_age_hours = ctx.config.cache.max_age_hours as i64;

    let total_size: u64 = entries.iter().map(|e| e.size_bytes).sum();
    let documents: Vec<serde_json::Value> = entries
        .iter()
        .map(|entry| {
            let age_hours = entry.age(now).num_hours();
            serde_json::json!({
                "app_id": entry.app_id,
                "path": entry.path.to_string_lossy(),
                "written_at": entry.written_at.to_rfc3339(),
                "age_hours": age_hours,
                "fresh": age_hours < max_age_hours,
                "size_bytes": entry.size_bytes,
            })
        })
        .collect();

    let json_value = serde_json::json!({
        "_type": "cache_info",
        "cache_dir": cache.dir().to_string_lossy(),
        "max_age_hours": max_age_hours,
        "cached_documents": entries.len(),
        "total_size_bytes": total_size,
        "documents": documents,
    });

    Ok(ctx.render(&json_value, || {
        let mut output = banner("KNACK-SLEUTH CACHE INFO");
        output.push_str(&format!("cache_dir: {}\n", cache.dir().display()));
        output.push_str(&format!("max_age: {} hours\n", max_age_hours));
        output.push_str(&format!("cached_documents: {}\n\n", entries.len()));

        if entries.is_empty() {
            output.push_str("No cached metadata found.\n");
            return output;
        }

        output.push_str(&format!(
            "total_size: {} bytes ({:.2} MB)\n\n",
            total_size,
            total_size as f64 / (1024.0 * 1024.0)
        ));
        output.push_str("documents:\n");
        for entry in &entries {
            let age_hours = entry.age(now).num_hours();
            output.push_str(&format!("  - app_id: {}\n", entry.app_id));
            output.push_str(&format!("    path: {}\n", entry.path.display()));
            output.push_str(&format!(
                "    written: {} ({}h ago{})\n",
                entry.written_at.format("%Y-%m-%d %H:%M UTC"),
                age_hours,
                if age_hours < max_age_hours { "" } else { ", stale" }
            ));
            output.push_str(&format!("    size: {} bytes\n", entry.size_bytes));
        }
        output
    }))
}

/// Remove cached documents, for one application or all
fn run_cache_clear(
    cache: &MetadataCache,
    app_id: Option<&str>,
    ctx: &CommandContext,
) -> Result<String> {
    let removed = cache.clear(app_id)?;

    let json_value = serde_json::json!({
        "_type": "cache_clear",
        "cache_dir": cache.dir().to_string_lossy(),
        "app_id": app_id,
        "removed": removed,
    });

    Ok(ctx.render(&json_value, || match app_id {
        Some(id) => format!("Removed {} cached documents for {}\n", removed, id),
        None => format!("Removed {} cached documents\n", removed),
    }))
}

/// Remove documents older than `hours`
fn run_cache_prune(cache: &MetadataCache, hours: u64, ctx: &CommandContext) -> Result<String> {
    let removed = cache.prune(hours)?;

    let json_value = serde_json::json!({
        "_type": "cache_prune",
        "cache_dir": cache.dir().to_string_lossy(),
        "older_than_hours": hours,
        "removed": removed,
    });

    Ok(ctx.render(&json_value, || {
        format!(
            "Pruned {} cached documents older than {} hours\n",
            removed, hours
        )
    }))
}
