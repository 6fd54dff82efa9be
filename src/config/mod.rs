// src/config/mod.rs

//! Configuration loading and validation.
//!
//! Responsibilities:
//! - Define the raw (TOML/CLI) and validated data model (`model.rs`).
//! - Load a config file and merge CLI flags into it (`loader.rs`).
//! - Enforce the option constraints (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_and_validate, load_from_path, merge_cli};
pub use model::{DestinationOverride, RawReloaderConfig, ReloaderConfig, WebSection, WebhookSection};
