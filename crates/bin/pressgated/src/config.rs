//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `pressgate.toml` in the working directory, or at the path named
//! by `PRESSGATE_CONFIG`. Every scalar field has a default, but the site
//! credentials and at least one line with a target must be provided for the
//! daemon to start. Environment variables take precedence over file values.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use pressgate_adapter_gpio_rppal::{Bias, GpioConfig};
use pressgate_adapter_press_log::PressLogConfig;
use pressgate_adapter_shinobi::{ShinobiConfig, parse_base_url};
use pressgate_domain::error::ValidationError;
use pressgate_domain::line::{Line, LineId, TargetId};
use pressgate_domain::notification::{MotionProfile, SiteCredentials};

const DEFAULT_PATH: &str = "pressgate.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Credentials of the monitoring site.
    pub site: SiteConfig,
    /// Monitoring endpoint and motion event settings.
    pub notifier: NotifierConfig,
    /// Input hardware settings.
    pub gpio: GpioSection,
    /// Press log location.
    pub press_log: PressLogConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Pin number (as a string key) to ordered target identifiers.
    pub lines: BTreeMap<String, Vec<String>>,
}

/// Opaque credentials placed in every request path.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub api_key: String,
    pub group_key: String,
}

impl fmt::Debug for SiteConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SiteConfig")
            .field("api_key", &"***")
            .field("group_key", &self.group_key)
            .finish()
    }
}

/// Monitoring endpoint configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct NotifierConfig {
    /// Base URL of the monitoring service.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Region label reported with every motion event.
    pub region_name: String,
    /// Confidence reported with every motion event.
    pub confidence: f64,
}

/// Which line monitor drives the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Driver {
    /// Raspberry Pi GPIO through rppal.
    #[default]
    Rppal,
    /// Simulated board; nothing is ever pressed. For dry runs.
    Virtual,
}

/// Input hardware configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GpioSection {
    pub driver: Driver,
    /// Driver-level debounce in milliseconds; `0` disables it.
    pub debounce_ms: u64,
    /// Per-line cooldown window in milliseconds.
    pub cooldown_ms: u64,
    pub bias: Bias,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `pressgate.toml` (or `PRESSGATE_CONFIG`), then
    /// apply environment-variable overrides and validate the scalar settings.
    ///
    /// Credentials and lines are checked when built, by
    /// [`site_credentials`](Self::site_credentials) and [`lines`](Self::lines),
    /// so their warnings are emitted once logging is up.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed, or
    /// if a scalar setting is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("PRESSGATE_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("PRESSGATE_API_KEY") {
            self.site.api_key = val;
        }
        if let Ok(val) = std::env::var("PRESSGATE_GROUP_KEY") {
            self.site.group_key = val;
        }
        if let Ok(val) = std::env::var("PRESSGATE_BASE_URL") {
            self.notifier.base_url = val;
        }
        if let Ok(val) = std::env::var("PRESSGATE_LOG") {
            self.logging.filter = val;
        }
        if let Ok(val) = std::env::var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let base_url = parse_base_url(&self.notifier.base_url)
            .map_err(|err| ConfigError::Validation(err.to_string()))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "base_url must be http or https, got `{}`",
                base_url.scheme()
            )));
        }
        if self.notifier.timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "timeout_ms must be non-zero".to_string(),
            ));
        }
        if !self.notifier.confidence.is_finite() {
            return Err(ConfigError::Validation(
                "confidence must be a finite number".to_string(),
            ));
        }
        if self.gpio.cooldown_ms == 0 {
            return Err(ConfigError::Validation(
                "cooldown_ms must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Validated site credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if either key is blank.
    pub fn site_credentials(&self) -> Result<SiteCredentials, ConfigError> {
        Ok(SiteCredentials::new(
            self.site.api_key.as_str(),
            self.site.group_key.as_str(),
        )?)
    }

    /// Build the monitored lines.
    ///
    /// Blank targets are dropped and lines left without targets are skipped,
    /// both with a warning.
    ///
    /// # Errors
    ///
    /// Fails on a key that is not a supported pin, on a pin declared twice,
    /// and when no usable line remains.
    pub fn lines(&self) -> Result<Vec<Line>, ConfigError> {
        let debounce = self.gpio.debounce();
        let cooldown = self.gpio.cooldown();
        let mut seen = BTreeSet::new();
        let mut lines = Vec::with_capacity(self.lines.len());

        for (key, raw_targets) in &self.lines {
            let pin: u8 = key.trim().parse().map_err(|_| {
                ConfigError::Validation(format!("line key `{key}` is not a pin number"))
            })?;
            let id = LineId::supported(pin)?;
            if !seen.insert(id) {
                return Err(ConfigError::Validation(format!(
                    "pin {id} is configured more than once"
                )));
            }

            let targets = raw_targets
                .iter()
                .filter_map(|raw| match TargetId::new(raw.as_str()) {
                    Ok(target) => Some(target),
                    Err(err) => {
                        tracing::warn!(line = %id, %err, "dropping blank target");
                        None
                    }
                })
                .collect();

            match Line::new(id, targets, debounce, cooldown) {
                Ok(line) => lines.push(line),
                Err(err) => tracing::warn!(line = %id, %err, "skipping line"),
            }
        }

        if lines.is_empty() {
            return Err(ConfigError::Validation(
                "no line has any target configured".to_string(),
            ));
        }
        Ok(lines)
    }
}

impl NotifierConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Transport settings for the HTTP notifier.
    #[must_use]
    pub fn shinobi(&self) -> ShinobiConfig {
        ShinobiConfig {
            base_url: self.base_url.clone(),
            timeout_ms: self.timeout_ms,
        }
    }

    /// Fixed fields of every motion event.
    #[must_use]
    pub fn motion_profile(&self) -> MotionProfile {
        MotionProfile {
            region_name: self.region_name.clone(),
            confidence: self.confidence,
        }
    }
}

impl GpioSection {
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    #[must_use]
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    /// Settings for the rppal line monitor.
    #[must_use]
    pub fn rppal(&self) -> GpioConfig {
        GpioConfig { bias: self.bias }
    }
}

impl Default for NotifierConfig {
    fn default() -> Self {
        let transport = ShinobiConfig::default();
        let profile = MotionProfile::default();
        Self {
            base_url: transport.base_url,
            timeout_ms: transport.timeout_ms,
            region_name: profile.region_name,
            confidence: profile.confidence,
        }
    }
}

impl Default for GpioSection {
    fn default() -> Self {
        Self {
            driver: Driver::default(),
            debounce_ms: 200,
            cooldown_ms: 5000,
            bias: Bias::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "pressgated=info,pressgate=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// A value rejected by the domain model.
    #[error("invalid configuration")]
    Invalid(#[from] ValidationError),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const MINIMAL: &str = "
        [site]
        api_key = 'key123'
        group_key = 'ArenaVarandas'

        [lines]
        19 = ['camA', 'camB']
    ";

    fn parse(toml: &str) -> Config {
        toml::from_str(toml).unwrap()
    }

    fn pins(lines: &[Line]) -> Vec<u8> {
        lines.iter().map(|line| line.id().pin()).collect()
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.notifier.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.notifier.timeout(), Duration::from_secs(3));
        assert_eq!(config.notifier.motion_profile(), MotionProfile::default());
        assert_eq!(config.gpio.driver, Driver::Rppal);
        assert_eq!(config.gpio.debounce(), Duration::from_millis(200));
        assert_eq!(config.gpio.cooldown(), Duration::from_secs(5));
        assert_eq!(config.gpio.bias, Bias::PullUp);
        assert_eq!(
            config.press_log.path(),
            PathBuf::from("logs/button_presses_details.txt")
        );
        assert!(config.lines.is_empty());
    }

    #[test]
    fn should_reject_defaults_without_credentials() {
        let result = Config::default().site_credentials();
        assert!(matches!(
            result,
            Err(ConfigError::Invalid(ValidationError::EmptyCredential("api_key")))
        ));
    }

    #[test]
    fn should_accept_minimal_toml() {
        let config = parse(MINIMAL);
        assert!(config.validate().is_ok());

        let lines = config.lines().unwrap();
        assert_eq!(pins(&lines), vec![19]);
        let targets: Vec<&str> = lines[0].expand().iter().map(TargetId::as_str).collect();
        assert_eq!(targets, vec!["camA", "camB"]);
        assert_eq!(lines[0].cooldown(), Duration::from_secs(5));
    }

    #[test]
    fn should_parse_full_toml() {
        let config = parse(
            "
            [site]
            api_key = 'key123'
            group_key = 'ArenaVarandas'

            [notifier]
            base_url = 'https://nvr.example.com/shinobi'
            timeout_ms = 1500
            region_name = 'door'
            confidence = 42.5

            [gpio]
            driver = 'virtual'
            debounce_ms = 0
            cooldown_ms = 2000
            bias = 'pull_down'

            [press_log]
            directory = '/var/log/pressgate'
            file_name = 'presses.txt'

            [logging]
            filter = 'debug'

            [lines]
            26 = ['gate']
            5 = ['camA']
        ",
        );
        assert!(config.validate().is_ok());
        assert_eq!(config.notifier.shinobi().timeout(), Duration::from_millis(1500));
        assert_eq!(config.notifier.motion_profile().region_name, "door");
        assert_eq!(config.gpio.driver, Driver::Virtual);
        assert_eq!(config.gpio.rppal().bias, Bias::PullDown);
        assert_eq!(
            config.press_log.path(),
            PathBuf::from("/var/log/pressgate/presses.txt")
        );
        assert_eq!(config.logging.filter, "debug");

        let lines = config.lines().unwrap();
        assert_eq!(pins(&lines).len(), 2);
        assert!(lines.iter().all(|line| line.debounce().is_zero()));
        assert!(lines.iter().all(|line| line.cooldown() == Duration::from_secs(2)));
    }

    #[test]
    fn should_skip_line_without_targets() {
        let config = parse(
            "
            [site]
            api_key = 'key123'
            group_key = 'ArenaVarandas'

            [lines]
            19 = ['camA']
            26 = []
            13 = ['  ', '']
        ",
        );
        assert_eq!(pins(&config.lines().unwrap()), vec![19]);
    }

    #[test]
    fn should_drop_blank_targets_and_keep_order() {
        let config = parse(
            "
            [site]
            api_key = 'key123'
            group_key = 'ArenaVarandas'

            [lines]
            6 = ['camB', ' ', ' camA ']
        ",
        );
        let lines = config.lines().unwrap();
        let targets: Vec<&str> = lines[0].expand().iter().map(TargetId::as_str).collect();
        assert_eq!(targets, vec!["camB", "camA"]);
    }

    #[test]
    fn should_reject_when_no_usable_line_remains() {
        let config = parse(
            "
            [site]
            api_key = 'key123'
            group_key = 'ArenaVarandas'

            [lines]
            19 = []
        ",
        );
        assert!(config.validate().is_ok());
        assert!(matches!(config.lines(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_unsupported_pin() {
        let mut config = parse(MINIMAL);
        config.lines.insert("4".to_string(), vec!["camC".to_string()]);
        assert!(matches!(
            config.lines(),
            Err(ConfigError::Invalid(ValidationError::UnsupportedPin(4)))
        ));
    }

    #[test]
    fn should_reject_non_numeric_line_key() {
        let mut config = parse(MINIMAL);
        config.lines.insert("front".to_string(), vec!["camC".to_string()]);
        assert!(matches!(config.lines(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_pin_declared_twice() {
        let mut config = parse(MINIMAL);
        config.lines.insert("019".to_string(), vec!["camC".to_string()]);
        assert!(matches!(config.lines(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_blank_group_key() {
        let mut config = parse(MINIMAL);
        config.site.group_key = "   ".to_string();
        assert!(matches!(
            config.site_credentials(),
            Err(ConfigError::Invalid(ValidationError::EmptyCredential("group_key")))
        ));
    }

    #[test]
    fn should_leave_lines_and_credentials_to_their_builders() {
        let config = parse(
            "
            [lines]
            19 = ['  ']
            26 = []
        ",
        );
        assert!(config.validate().is_ok());
        assert!(config.lines().is_err());
        assert!(config.site_credentials().is_err());
    }

    #[test]
    fn should_reject_non_http_base_url() {
        let mut config = parse(MINIMAL);
        config.notifier.base_url = "ftp://nvr.local".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));

        config.notifier.base_url = "nvr.local:8080".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_zero_timeout() {
        let mut config = parse(MINIMAL);
        config.notifier.timeout_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_zero_cooldown() {
        let mut config = parse(MINIMAL);
        config.gpio.cooldown_ms = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_unknown_driver() {
        let result: Result<Config, _> = toml::from_str("[gpio]\ndriver = 'sysfs'");
        assert!(result.is_err());
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.gpio.cooldown_ms, 5000);
    }

    #[test]
    fn should_redact_api_key_in_debug_output() {
        let config = parse(MINIMAL);
        let rendered = format!("{:?}", config.site);
        assert!(!rendered.contains("key123"));
        assert!(rendered.contains("ArenaVarandas"));
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
