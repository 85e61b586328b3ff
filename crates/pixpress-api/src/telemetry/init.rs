use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Install the console subscriber. `RUST_LOG` overrides the default filter.
///
/// Returns an error when a global subscriber is already set.
pub fn init_telemetry(environment: &str) -> Result<(), Box<dyn std::error::Error>> {
    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false)
            .without_time(),
    );
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pixpress=debug,tower_http=debug".into()),
        )
        .with(console_fmt)
        .try_init()?;

    tracing::info!(environment, "Tracing initialized");
    Ok(())
}
