use tracing_subscriber::EnvFilter;

/// Install the process-wide log output on stderr.
///
/// `RUST_LOG` selects the filter; without it the default is `warn`, or
/// `debug` with `--verbose`. Records emitted through the `log` facade by
/// the core library and plugins are forwarded into the same subscriber.
pub fn init(verbose: bool) {
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records: {}", e);
    }

    let default_filter = if verbose { "debug" } else { "warn" };
    let filter = if verbose {
        EnvFilter::new(default_filter)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install log subscriber: {}", e);
    }
}
