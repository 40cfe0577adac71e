//! Logger bootstrap.

/// Logger configuration.
///
/// `env_filter` uses the `env_logger` filter syntax, e.g.
/// `"snowglobe=debug,wgpu=warn"`.
#[derive(Debug, Clone, Default)]
pub struct LoggingConfig {
    /// Explicit filter; falls back to `RUST_LOG`, then `info`.
    pub env_filter: Option<String>,
    /// Force or suppress ANSI colours.
    #[cfg(not(target_arch = "wasm32"))]
    pub write_style: Option<env_logger::WriteStyle>,
}

/// Install the global logger. Later calls are ignored.
#[cfg(not(target_arch = "wasm32"))]
pub fn init_logging(config: LoggingConfig) {
    use std::sync::Once;

    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        if let Some(filter) = config.env_filter {
            builder.parse_filters(&filter);
        } else if let Ok(filter) = std::env::var("RUST_LOG") {
            builder.parse_filters(&filter);
        } else {
            builder.filter_level(log::LevelFilter::Info);
            // wgpu is chatty at info
            builder.filter_module("wgpu_core", log::LevelFilter::Warn);
            builder.filter_module("wgpu_hal", log::LevelFilter::Warn);
        }

        if let Some(style) = config.write_style {
            builder.write_style(style);
        }

        // A test harness may already own the logger.
        if builder.try_init().is_ok() {
            log::debug!("logging initialized");
        }
    });
}

/// On the web the panic hook is the only sink; log records are dropped.
#[cfg(target_arch = "wasm32")]
pub fn init_logging(_config: LoggingConfig) {
    #[cfg(feature = "web")]
    console_error_panic_hook::set_once();
}
