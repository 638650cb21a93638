//! Tracing setup
//!
//! The subscriber is installed before configuration is loaded so warnings
//! from loading reach the log. Once the configured level is known the filter
//! is swapped in place. `RUST_LOG` overrides both.

use tracing_subscriber::{
    layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

/// Handle for replacing the installed filter
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// Filter directives enabling `level` for this service's crates
pub fn directives(level: &str) -> String {
    format!("judge_server={level},judge_common={level},tower_http={level}")
}

fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)))
}

/// Install the global subscriber at `level`
pub fn init(level: &str) -> FilterHandle {
    let (filter, handle) = reload::Layer::new(filter_for(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
    handle
}

/// Switch to the configured level
pub fn set_level(handle: &FilterHandle, level: &str) {
    if let Err(e) = apply_filter(handle, filter_for(level)) {
        tracing::warn!("Failed to apply log level {}: {}", level, e);
    }
}

fn apply_filter(handle: &FilterHandle, filter: EnvFilter) -> Result<(), reload::Error> {
    handle.reload(filter)
}
