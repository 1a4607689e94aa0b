use std::sync::OnceLock;

use tracing::{debug, error};
use tracing_subscriber::prelude::*;
use tracing_subscriber::reload::Handle;
use tracing_subscriber::{EnvFilter, Registry};

use crate::commands::Verbosity;

static LOGGER_HANDLE: OnceLock<Handle<EnvFilter, Registry>> = OnceLock::new();

/// Filter directives for a verbosity level.
///
/// `RUST_LOG` takes precedence when set.
pub(crate) fn log_filter(verbosity: Verbosity) -> &'static str {
    match verbosity {
        // Show only errors
        Verbosity::Quiet => "off,holocron=error,holocron_sdk=error,holocron_catalog=error",
        // Only show warnings
        Verbosity::Verbose(0) => "off,holocron=warn,holocron_sdk=warn,holocron_catalog=warn",
        // Show our own info logs
        Verbosity::Verbose(1) => "off,holocron=info,holocron_sdk=info,holocron_catalog=info",
        // Also show debug from our libraries
        Verbosity::Verbose(2) => "off,holocron=debug,holocron_sdk=debug,holocron_catalog=debug",
        // Also show trace from our libraries
        Verbosity::Verbose(3) => "off,holocron=trace,holocron_sdk=trace,holocron_catalog=trace",
        // Everything, including the http stack
        Verbosity::Verbose(_) => "trace",
    }
}

pub(crate) fn init_logger(verbosity: Option<Verbosity>) {
    let verbosity = verbosity.unwrap_or_default();

    let filter_handle = LOGGER_HANDLE.get_or_init(|| {
        let (subscriber, reload_handle) = create_registry_and_filter_reload_handle();
        subscriber.init();
        reload_handle
    });

    update_filters(filter_handle, log_filter(verbosity));
}

pub fn update_filters(filter_handle: &Handle<EnvFilter, Registry>, log_filter: &str) {
    let result = filter_handle.modify(|layer| {
        match EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_filter)) {
            Ok(new_filter) => *layer = new_filter,
            Err(err) => {
                error!("Updating logger filter failed: {}", err);
            },
        };
    });
    if let Err(err) = result {
        error!("Updating logger filter failed: {}", err);
    }
}

pub fn create_registry_and_filter_reload_handle() -> (
    impl tracing_subscriber::layer::SubscriberExt + Send + Sync,
    Handle<EnvFilter, Registry>,
) {
    debug!("Initializing logger (how are you seeing this?)");
    // Starts permissive, the actual level is set through the reload handle.
    let filter = EnvFilter::new("trace");
    let (filter, filter_reload_handle) = tracing_subscriber::reload::Layer::new(filter);
    let log_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .event_format(tracing_subscriber::fmt::format())
        .with_filter(filter);

    let registry = tracing_subscriber::registry().with(log_layer);

    (registry, filter_reload_handle)
}

#[cfg(test)]
mod tests {
    use tracing_subscriber::EnvFilter;

    use super::*;

    #[test]
    fn every_verbosity_has_a_valid_filter() {
        let levels = [
            Verbosity::Quiet,
            Verbosity::Verbose(0),
            Verbosity::Verbose(1),
            Verbosity::Verbose(2),
            Verbosity::Verbose(3),
            Verbosity::Verbose(7),
        ];
        for verbosity in levels {
            let filter = log_filter(verbosity);
            assert!(EnvFilter::try_new(filter).is_ok(), "{filter}");
        }
    }

    #[test]
    fn default_verbosity_shows_warnings() {
        assert_eq!(
            log_filter(Verbosity::default()),
            "off,holocron=warn,holocron_sdk=warn,holocron_catalog=warn"
        );
        assert!(log_filter(Verbosity::Quiet).contains("holocron_sdk=error"));
    }
}
