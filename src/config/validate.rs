// src/config/validate.rs

use std::time::Duration;

use url::Url;

use crate::config::model::{RawReloaderConfig, ReloaderConfig};
use crate::errors::{ReloaderError, Result};
use crate::types::{WatchMode, WatchTarget};
use crate::webhook::{redact_url, WebhookDestination};

impl TryFrom<RawReloaderConfig> for ReloaderConfig {
    type Error = ReloaderError;

    fn try_from(raw: RawReloaderConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let destinations = build_destinations(&raw)?;

        let targets = raw
            .volume_dirs
            .iter()
            .map(|d| WatchTarget::new(d, WatchMode::Plain))
            .chain(
                raw.volume_dirs_archive
                    .iter()
                    .map(|d| WatchTarget::new(d, WatchMode::Archive)),
            )
            .collect();

        Ok(ReloaderConfig::new_unchecked(
            raw.init_mode,
            targets,
            raw.dir_for_unarchive,
            destinations,
            Duration::from_secs(raw.webhook.backoff_secs),
            Duration::from_secs(raw.webhook.timeout_secs),
            Duration::from_secs(raw.archive_pacing_secs),
            raw.web,
        ))
    }
}

/// Check the mutual constraints between options. The first violation wins.
fn validate_raw_config(cfg: &RawReloaderConfig) -> Result<()> {
    ensure_has_dirs(cfg)?;
    ensure_has_webhook(cfg)?;
    validate_init_mode(cfg)?;
    validate_unarchive_dir(cfg)?;
    Ok(())
}

fn ensure_has_dirs(cfg: &RawReloaderConfig) -> Result<()> {
    if cfg.volume_dirs.is_empty() && cfg.volume_dirs_archive.is_empty() {
        return Err(ReloaderError::ConfigError(
            "missing volume-dir or volume-dir-archive".to_string(),
        ));
    }
    Ok(())
}

fn ensure_has_webhook(cfg: &RawReloaderConfig) -> Result<()> {
    if cfg.webhook.urls.is_empty() && cfg.webhook.destinations.is_empty() {
        return Err(ReloaderError::ConfigError("missing webhook-url".to_string()));
    }
    Ok(())
}

fn validate_init_mode(cfg: &RawReloaderConfig) -> Result<()> {
    if !cfg.init_mode {
        return Ok(());
    }
    if cfg.volume_dirs_archive.is_empty() {
        return Err(ReloaderError::ConfigError(
            "init-mode works only with volume-dir-archive".to_string(),
        ));
    }
    if !cfg.volume_dirs.is_empty() {
        return Err(ReloaderError::ConfigError(
            "init-mode does not work with volume-dir".to_string(),
        ));
    }
    Ok(())
}

fn validate_unarchive_dir(cfg: &RawReloaderConfig) -> Result<()> {
    if !cfg.volume_dirs_archive.is_empty() && cfg.dir_for_unarchive.as_os_str().is_empty() {
        return Err(ReloaderError::ConfigError(
            "dir-for-unarchive must not be empty when volume-dir-archive is set".to_string(),
        ));
    }
    Ok(())
}

fn build_destinations(cfg: &RawReloaderConfig) -> Result<Vec<WebhookDestination>> {
    let shared = &cfg.webhook;
    let mut destinations = Vec::with_capacity(shared.urls.len() + shared.destinations.len());

    for raw in &shared.urls {
        destinations.push(WebhookDestination::new(
            parse_webhook_url(raw)?,
            shared.method.clone(),
            shared.status_code,
            shared.retries,
        ));
    }

    for entry in &shared.destinations {
        destinations.push(WebhookDestination::new(
            parse_webhook_url(&entry.url)?,
            entry.method.clone().unwrap_or_else(|| shared.method.clone()),
            entry.status_code.unwrap_or(shared.status_code),
            entry.retries.unwrap_or(shared.retries),
        ));
    }

    Ok(destinations)
}

fn parse_webhook_url(raw: &str) -> Result<Url> {
    // The parse error never echoes the input, so credentials stay out of logs.
    let url = Url::parse(raw)
        .map_err(|e| ReloaderError::ConfigError(format!("invalid webhook-url: {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ReloaderError::ConfigError(format!(
            "webhook-url '{}' has unsupported scheme '{}' (expected http or https)",
            redact_url(&url),
            other
        ))),
    }
}
