// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::cli::CliArgs;
use crate::config::model::{RawReloaderConfig, ReloaderConfig};
use crate::errors::Result;

/// Load a TOML configuration file and return the raw `RawReloaderConfig`.
///
/// This only performs TOML deserialization; it does **not** check the
/// option constraints. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawReloaderConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawReloaderConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Overlay command-line arguments on top of a raw config.
///
/// - repeatable flags (`--volume-dir`, `--volume-dir-archive`,
///   `--webhook-url`) are appended to the lists from the file;
/// - scalar flags replace the file value only when given;
/// - `--init-mode` is OR-ed with the file value.
pub fn merge_cli(mut raw: RawReloaderConfig, args: &CliArgs) -> RawReloaderConfig {
    raw.init_mode |= args.init_mode;
    raw.volume_dirs.extend(args.volume_dirs.iter().cloned());
    raw.volume_dirs_archive
        .extend(args.volume_dirs_archive.iter().cloned());
    raw.webhook.urls.extend(args.webhook_urls.iter().cloned());

    if let Some(dir) = &args.dir_for_unarchive {
        raw.dir_for_unarchive = dir.clone();
    }
    if let Some(method) = &args.webhook_method {
        raw.webhook.method = method.clone();
    }
    if let Some(code) = args.webhook_status_code {
        raw.webhook.status_code = code;
    }
    if let Some(retries) = args.webhook_retries {
        raw.webhook.retries = retries;
    }
    if let Some(secs) = args.webhook_backoff_secs {
        raw.webhook.backoff_secs = secs;
    }
    if let Some(secs) = args.webhook_timeout_secs {
        raw.webhook.timeout_secs = secs;
    }
    if let Some(secs) = args.archive_pacing_secs {
        raw.archive_pacing_secs = secs;
    }
    if let Some(addr) = &args.web_listen_address {
        raw.web.listen_address = addr.clone();
    }
    if let Some(path) = &args.web_telemetry_path {
        raw.web.telemetry_path = path.clone();
    }

    raw
}

/// Resolve the effective configuration for a run.
///
/// Reads `--config` if given, overlays the flags, then validates. This is
/// the entry point the binary uses.
pub fn load_and_validate(args: &CliArgs) -> Result<ReloaderConfig> {
    let raw = match &args.config {
        Some(path) => load_from_path(path)?,
        None => RawReloaderConfig::default(),
    };
    let merged = merge_cli(raw, args);
    ReloaderConfig::try_from(merged)
}
