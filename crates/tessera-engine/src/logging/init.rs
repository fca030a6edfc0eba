use std::sync::Once;

/// Crates whose info-level output drowns out the renderer's own.
const QUIET_DEPENDENCIES: &[&str] = &["wgpu_core", "wgpu_hal", "naga"];

/// Logger configuration.
///
/// `env_filter` uses `env_logger` filter syntax (e.g. `"tessera_engine=trace"`).
/// When unset, `RUST_LOG` is used, then `default_level`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub default_level: log::LevelFilter,
    pub write_style: env_logger::WriteStyle,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            default_level: log::LevelFilter::Info,
            write_style: env_logger::WriteStyle::Auto,
        }
    }
}

impl LoggingConfig {
    /// The filter string handed to `env_logger`.
    fn filter(&self, env: Option<String>) -> String {
        if let Some(filter) = self.env_filter.clone().or(env) {
            return filter;
        }
        let mut filter = self.default_level.to_string().to_lowercase();
        if self.default_level > log::LevelFilter::Warn {
            for name in QUIET_DEPENDENCIES {
                filter.push_str(&format!(",{name}=warn"));
            }
        }
        filter
    }
}

static INIT: Once = Once::new();

/// Installs the global logger. Later calls do nothing.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = config.filter(std::env::var("RUST_LOG").ok());
        env_logger::Builder::new()
            .parse_filters(&filter)
            .write_style(config.write_style)
            .init();
        log::debug!("logging initialized ({filter})");
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_filter_wins() {
        let config = LoggingConfig {
            env_filter: Some("tessera_engine=trace".into()),
            ..Default::default()
        };
        assert_eq!(config.filter(Some("warn".into())), "tessera_engine=trace");
    }

    #[test]
    fn env_is_used_before_default() {
        assert_eq!(LoggingConfig::default().filter(Some("debug".into())), "debug");
    }

    #[test]
    fn default_quiets_gpu_crates() {
        assert_eq!(
            LoggingConfig::default().filter(None),
            "info,wgpu_core=warn,wgpu_hal=warn,naga=warn"
        );
    }

    #[test]
    fn quiet_levels_are_left_alone() {
        let config = LoggingConfig {
            default_level: log::LevelFilter::Error,
            ..Default::default()
        };
        assert_eq!(config.filter(None), "error");
    }
}
