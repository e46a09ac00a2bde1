//! GPIO adapter configuration.

use serde::Deserialize;

/// Internal resistor applied to each button pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bias {
    /// Pull the line high; a press pulls it to ground (falling edge).
    #[default]
    PullUp,
    PullDown,
    /// Leave the line floating; external resistors are fitted.
    Off,
}

/// Configuration for the rppal line monitor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GpioConfig {
    pub bias: Bias,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_default_to_pull_up() {
        assert_eq!(GpioConfig::default().bias, Bias::PullUp);
    }

    #[test]
    fn should_deserialize_bias_from_toml() {
        let config: GpioConfig = toml::from_str(r#"bias = "off""#).unwrap();
        assert_eq!(config.bias, Bias::Off);

        let config: GpioConfig = toml::from_str(r#"bias = "pull_down""#).unwrap();
        assert_eq!(config.bias, Bias::PullDown);
    }

    #[test]
    fn should_reject_unknown_bias() {
        let result: Result<GpioConfig, _> = toml::from_str(r#"bias = "sideways""#);
        assert!(result.is_err());
    }
}
