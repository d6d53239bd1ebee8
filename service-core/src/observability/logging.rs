use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the tracing subscriber for a service.
///
/// `RUST_LOG` overrides `log_level` when set. JSON output keeps the log
/// lines machine-parseable in deployment; `pretty` is for local work.
pub fn init_tracing(service_name: &str, log_level: &str, pretty: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(env_filter);

    if pretty {
        registry
            .with(tracing_subscriber::fmt::layer().with_file(true).with_line_number(true))
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_file(true)
                    .with_line_number(true)
                    .json()
                    .flatten_event(true),
            )
            .init();
    }

    tracing::info!(service = %service_name, "tracing initialized");
}
