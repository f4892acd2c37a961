use tracing_chrome::{ChromeLayerBuilder, FlushGuard};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

/// Installs the global tracing subscriber.
///
/// With `trace` spans are recorded for chrome://tracing or https://ui.perfetto.dev/. Keep the
/// returned guard alive in the scope to be instrumented, the trace file is written when it drops.
/// With `verbose` events at debug level and above are logged to stderr.
pub fn init(trace: bool, verbose: bool) -> Option<FlushGuard> {
    let (chrome_layer, guard) = if trace {
        let (layer, guard) = ChromeLayerBuilder::new().build();
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    let fmt_layer = verbose.then(|| {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_filter(LevelFilter::DEBUG)
    });

    tracing_subscriber::registry()
        .with(chrome_layer)
        .with(fmt_layer)
        .init();

    guard
}
