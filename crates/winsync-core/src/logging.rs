use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;

/// Install the global JSON subscriber on stderr.
///
/// `RUST_LOG` takes precedence; otherwise `quiet` selects warnings only.
/// Calling this twice is harmless; the second install is ignored.
pub fn init_logging(quiet: bool) {
    let default_directive = if quiet {
        "winsync=warn,winsync_core=warn"
    } else {
        "winsync=info,winsync_core=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_current_span(false)
        .with_span_events(FmtSpan::NONE)
        .try_init();
}
