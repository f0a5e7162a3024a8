use std::sync::Once;

use log::LevelFilter;

/// Crates the GPU backends pull in. Their info-level output drowns the
/// engine's own, so they default to `warn` unless a filter names them.
const NOISY_DEPENDENCIES: &[&str] = &["wgpu_core", "wgpu_hal", "naga"];

/// Modules that log once per dispatched pointer event or per frame.
const PER_FRAME_MODULES: &[&str] = &["nova_engine::events", "nova_engine::post"];

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g.
/// "nova_engine=debug,wgpu_core=warn") and takes precedence over `RUST_LOG`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
    /// Keep per-event and per-frame debug lines. Off by default.
    pub frame_trace: bool,
    /// Millisecond timestamps; seconds otherwise.
    pub precise_timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
            frame_trace: false,
            precise_timestamps: true,
        }
    }
}

static INIT: Once = Once::new();

/// Installs `env_logger` as the global logger once.
///
/// Subsequent calls are ignored. Call early in `main`, before the app is built,
/// so capability warnings emitted during construction are visible.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();
        builder.filter_level(LevelFilter::Info);
        for module in NOISY_DEPENDENCIES {
            builder.filter_module(module, LevelFilter::Warn);
        }
        if !config.frame_trace {
            for module in PER_FRAME_MODULES {
                builder.filter_module(module, LevelFilter::Info);
            }
        }

        // Explicit filters are parsed last so they override the defaults above.
        let filter = config.env_filter.or_else(|| std::env::var("RUST_LOG").ok());
        if let Some(filter) = filter {
            builder.parse_filters(&filter);
        }

        if config.precise_timestamps {
            builder.format_timestamp_millis();
        } else {
            builder.format_timestamp_secs();
        }

        builder.write_style(config.write_style);
        builder.init();

        log::debug!("logging initialized (frame trace {})", config.frame_trace);
    });
}
