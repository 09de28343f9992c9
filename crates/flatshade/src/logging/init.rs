use std::sync::Once;

/// Logger configuration.
///
/// `env_filter` follows the `env_logger` filter syntax (e.g. "info",
/// "flatshade=debug,wgpu_core=warn").
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// Resolves the filter string actually applied: explicit config, then
    /// `RUST_LOG`, then `None` (meaning the built-in `info` level).
    pub fn resolved_filter(&self) -> Option<String> {
        self.filter_with_env(std::env::var("RUST_LOG").ok())
    }

    /// Blank strings count as unset at both levels.
    fn filter_with_env(&self, rust_log: Option<String>) -> Option<String> {
        let non_blank = |f: &String| !f.trim().is_empty();
        self.env_filter
            .clone()
            .filter(non_blank)
            .or_else(|| rust_log.filter(non_blank))
    }
}

static INIT: Once = Once::new();

/// Initializes the global logger once.
///
/// Subsequent calls are ignored. Call early in `main`.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let mut builder = env_logger::Builder::new();

        match config.resolved_filter() {
            Some(filter) => {
                builder.parse_filters(&filter);
            }
            None => {
                // wgpu is chatty at info; keep it at warn unless asked.
                builder
                    .filter_level(log::LevelFilter::Info)
                    .filter_module("wgpu_core", log::LevelFilter::Warn)
                    .filter_module("wgpu_hal", log::LevelFilter::Warn)
                    .filter_module("naga", log::LevelFilter::Warn);
            }
        }

        builder.write_style(config.write_style);

        // A test harness or embedding app may already own the logger.
        if builder.try_init().is_err() {
            return;
        }

        log::debug!("logging initialized");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let cfg = LoggingConfig {
            env_filter: Some("flatshade=trace".into()),
            ..Default::default()
        };
        assert_eq!(cfg.resolved_filter().as_deref(), Some("flatshade=trace"));
    }

    #[test]
    fn blank_rust_log_uses_builtin_default() {
        let cfg = LoggingConfig::default();
        assert_eq!(cfg.filter_with_env(Some(String::new())), None);
        assert_eq!(cfg.filter_with_env(Some("  ".into())), None);
        assert_eq!(cfg.filter_with_env(None), None);
        assert_eq!(
            cfg.filter_with_env(Some("naga=debug".into())).as_deref(),
            Some("naga=debug")
        );
    }

    #[test]
    fn blank_config_filter_falls_through_to_rust_log() {
        let cfg = LoggingConfig {
            env_filter: Some(" ".into()),
            ..Default::default()
        };
        assert_eq!(cfg.filter_with_env(Some("warn".into())).as_deref(), Some("warn"));
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging(LoggingConfig::default());
        init_logging(LoggingConfig::default());
    }
}
