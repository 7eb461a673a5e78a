//! Shared test setup: tracing subscriber and container fixtures

use std::env;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::config::Settings;
use crate::infrastructure::di::ServiceContainer;

static TEST_SETUP: Once = Once::new();

/// Install the global test subscriber once per process. `RUST_LOG` wins,
/// otherwise everything from this crate is logged at debug.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("catalog_tree=debug"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    // Only set if we haven't already set a global subscriber
    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
    debug!(rust_log = ?env::var("RUST_LOG").ok(), "test logging ready");
}

/// Services over a fresh in-memory store with default settings.
pub fn in_memory_container() -> ServiceContainer {
    init_test_setup();
    ServiceContainer::in_memory(Settings::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_fresh_container_when_checking_then_empty_tree_is_consistent() {
        let c = in_memory_container();
        c.hierarchy.check().unwrap();
        assert!(c.hierarchy.all_nodes().unwrap().is_empty());
    }
}
