use tracing_appender::rolling;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global subscriber.
///
/// The file layer writes JSON with daily rotation into `log_dir`. The human
/// layer goes to stderr so rendered views on stdout stay clean.
pub fn init_logging(log_dir: &str, verbose: bool) {
    let file_appender = rolling::daily(log_dir, "dashboard.log");
    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .json();

    let stderr_layer = fmt::layer().with_writer(std::io::stderr).with_target(false);

    let default_directives = if verbose {
        "farmvibes_dashboard=debug,info"
    } else {
        "warn"
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();
}
