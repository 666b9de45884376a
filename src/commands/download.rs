//! Download command handler - save application metadata to a JSON file

use std::fs;
use std::path::PathBuf;

use serde_json::json;
use tracing::info;

use crate::cli::DownloadArgs;
use crate::commands::{banner, CommandContext};
use crate::error::{Result, SleuthError};
use crate::loader::{LoadOptions, MetadataLoader};

/// Default output file for an application
pub fn default_output(app_id: &str) -> PathBuf {
    PathBuf::from(format!("{}_metadata.json", app_id))
}

/// Run the download-metadata command
pub fn run_download(args: &DownloadArgs, ctx: &CommandContext) -> Result<String> {
    let app_id = args
        .app_id
        .clone()
        .or_else(|| ctx.config.api.app_id.clone())
        .filter(|id| !id.trim().is_empty())
        .ok_or(SleuthError::MissingAppId)?;

    let loader = MetadataLoader::from_config(&ctx.config);
    let document = loader.load_document(
        &app_id,
        LoadOptions {
            refresh: args.refresh,
            no_cache: false,
        },
    )?;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(&app_id));
    let pretty = serde_json::to_string_pretty(&document).map_err(|e| SleuthError::InvalidJson {
        source_name: app_id.clone(),
        message: e.to_string(),
    })?;
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(&output, &pretty)?;
    info!(app_id = %app_id, path = %output.display(), "metadata downloaded");

    let app_name = document
        .get("application")
        .and_then(|a| a.get("name"))
        .and_then(|n| n.as_str())
        .unwrap_or("unknown");

    let json_value = json!({
        "_type": "download",
        "app_id": app_id,
        "application": app_name,
        "path": output.display().to_string(),
        "size_bytes": pretty.len(),
    });

    Ok(ctx.render(&json_value, || {
        let mut text = banner(&format!("DOWNLOAD: {}", app_name));
        text.push_str(&format!("app_id: {}\n", app_id));
        text.push_str(&format!("path: {}\n", output.display()));
        text.push_str(&format!("size: {} bytes\n", pretty.len()));
        text
    }))
}
