#![allow(dead_code)]

use std::sync::Arc;

use config_reloader::metrics::ReloaderMetrics;

pub use config_reloader_test_utils::builders;
pub use config_reloader_test_utils::fakes;
pub use config_reloader_test_utils::{gzip, init_tracing, with_timeout};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// Fresh metrics with their own registry, so tests never share counters.
pub fn metrics() -> Arc<ReloaderMetrics> {
    Arc::new(ReloaderMetrics::new().expect("metrics registry"))
}
