use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "research_sidebar=info";

/// Install the global fmt subscriber. Honors `RUST_LOG`; safe to call twice.
pub fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("research_sidebar=debug")
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        }
    });

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbose)
        .with_writer(std::io::stderr)
        .try_init();
}
