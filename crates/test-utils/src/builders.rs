#![allow(dead_code)]

use std::path::PathBuf;

use config_reloader::config::{DestinationOverride, RawReloaderConfig, ReloaderConfig};

/// Builder for `RawReloaderConfig` to simplify test setup.
///
/// Starts from the same defaults as an empty TOML file.
pub struct RawConfigBuilder {
    config: RawReloaderConfig,
}

impl RawConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: RawReloaderConfig::default(),
        }
    }

    pub fn volume_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.volume_dirs.push(dir.into());
        self
    }

    pub fn volume_dir_archive(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.volume_dirs_archive.push(dir.into());
        self
    }

    pub fn dir_for_unarchive(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.dir_for_unarchive = dir.into();
        self
    }

    pub fn init_mode(mut self, val: bool) -> Self {
        self.config.init_mode = val;
        self
    }

    pub fn webhook_url(mut self, url: &str) -> Self {
        self.config.webhook.urls.push(url.to_string());
        self
    }

    pub fn method(mut self, method: &str) -> Self {
        self.config.webhook.method = method.to_string();
        self
    }

    pub fn status_code(mut self, code: u16) -> Self {
        self.config.webhook.status_code = code;
        self
    }

    pub fn retries(mut self, retries: u32) -> Self {
        self.config.webhook.retries = retries;
        self
    }

    pub fn backoff_secs(mut self, secs: u64) -> Self {
        self.config.webhook.backoff_secs = secs;
        self
    }

    pub fn archive_pacing_secs(mut self, secs: u64) -> Self {
        self.config.archive_pacing_secs = secs;
        self
    }

    pub fn destination(
        mut self,
        url: &str,
        method: Option<&str>,
        status_code: Option<u16>,
        retries: Option<u32>,
    ) -> Self {
        self.config.webhook.destinations.push(DestinationOverride {
            url: url.to_string(),
            method: method.map(str::to_string),
            status_code,
            retries,
        });
        self
    }

    pub fn raw(self) -> RawReloaderConfig {
        self.config
    }

    pub fn build(self) -> ReloaderConfig {
        ReloaderConfig::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for RawConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
