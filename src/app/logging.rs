//! Diagnostic logging setup.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_DIRECTIVE: &str = "pveqc=warn";
const VERBOSE_DIRECTIVE: &str = "pveqc=debug";

/// Filter used when `RUST_LOG` is unset or unparsable.
pub fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::new(if verbose { VERBOSE_DIRECTIVE } else { DEFAULT_DIRECTIVE })
}

/// Install the stderr subscriber. `RUST_LOG` takes precedence over `verbose`.
///
/// Calling this twice is harmless; the second call is ignored.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(verbose));
    let terminal_layer =
        tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false);

    let _ = tracing_subscriber::registry().with(filter).with(terminal_layer).try_init();
}
