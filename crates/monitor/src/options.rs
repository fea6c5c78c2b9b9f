//! Run options and process settings.

use std::str::FromStr;
use std::time::Duration;

use homegate_fritzbox::http::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
use homegate_fritzbox::FritzboxConfig;

use crate::error::SettingsError;

/// Default wait between daemon runs.
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Inputs of a single monitor run.
///
/// Credentials, period and policy are kept raw and validated at the start
/// of each run, so a bad value surfaces as a run failure in the summary.
#[derive(Debug, Clone, PartialEq)]
pub struct MonitorOptions {
    pub username: String,
    pub password: String,
    /// Explicit target MAC. `None` monitors the router's configured devices.
    pub mac: Option<String>,
    /// `"hour"` or `"day"`.
    pub period: String,
    /// Bytes/s a sample must exceed to count as active.
    pub activity_threshold: f64,
    pub policy: Option<String>,
    /// Issue block/unblock calls.
    pub enforce: bool,
}

impl Default for MonitorOptions {
    fn default() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            mac: None,
            period: "day".to_string(),
            activity_threshold: 0.0,
            policy: None,
            enforce: false,
        }
    }
}

/// Everything a host process needs: run options plus router connection
/// settings and the daemon interval.
#[derive(Debug, Clone)]
pub struct Settings {
    pub options: MonitorOptions,
    pub router_url: String,
    pub router_timeout: Duration,
    pub interval: Duration,
}

impl Settings {
    /// Load settings from environment variables.
    ///
    /// | Env Var                       | Default              |
    /// |-------------------------------|----------------------|
    /// | `FRITZBOX_USERNAME`           | --                   |
    /// | `FRITZBOX_PASSWORD`           | --                   |
    /// | `FRITZBOX_URL`                | `http://192.168.2.1` |
    /// | `FRITZBOX_TIMEOUT_SECS`       | `30`                 |
    /// | `HOMEGATE_MAC`                | --                   |
    /// | `HOMEGATE_PERIOD`             | `day`                |
    /// | `HOMEGATE_ACTIVITY_THRESHOLD` | `0`                  |
    /// | `HOMEGATE_POLICY`             | --                   |
    /// | `HOMEGATE_ENFORCE`            | `false`              |
    /// | `HOMEGATE_INTERVAL_SECS`      | `300`                |
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Settings::from_env`] with an arbitrary variable source.
    /// Blank values count as unset; credentials are kept as given.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        // Credentials are taken verbatim.
        let credential = |name: &str| lookup(name).unwrap_or_default();

        let options = MonitorOptions {
            username: credential("FRITZBOX_USERNAME"),
            password: credential("FRITZBOX_PASSWORD"),
            mac: var("HOMEGATE_MAC"),
            period: var("HOMEGATE_PERIOD").unwrap_or_else(|| "day".into()),
            activity_threshold: parse_or("HOMEGATE_ACTIVITY_THRESHOLD", &var, 0.0, "number")?,
            policy: var("HOMEGATE_POLICY"),
            enforce: match var("HOMEGATE_ENFORCE") {
                Some(value) => parse_bool("HOMEGATE_ENFORCE", value)?,
                None => false,
            },
        };

        let timeout_secs: u64 =
            parse_or("FRITZBOX_TIMEOUT_SECS", &var, DEFAULT_TIMEOUT.as_secs(), "u64")?;

        let interval_secs: u64 =
            parse_or("HOMEGATE_INTERVAL_SECS", &var, DEFAULT_INTERVAL_SECS, "u64")?;
        if interval_secs == 0 {
            return Err(SettingsError::InvalidValue {
                name: "HOMEGATE_INTERVAL_SECS",
                expected: "positive number of seconds",
                value: "0".into(),
            });
        }

        Ok(Self {
            options,
            router_url: var("FRITZBOX_URL").unwrap_or_else(|| DEFAULT_BASE_URL.into()),
            router_timeout: Duration::from_secs(timeout_secs),
            interval: Duration::from_secs(interval_secs),
        })
    }

    /// Connection settings for the HTTP router client.
    pub fn router_config(&self) -> FritzboxConfig {
        let mut config = FritzboxConfig::new(&self.options.username, &self.options.password);
        config.base_url = self.router_url.clone();
        config.timeout = self.router_timeout;
        config
    }
}

fn parse_or<T, V>(
    name: &'static str,
    var: V,
    default: T,
    expected: &'static str,
) -> Result<T, SettingsError>
where
    T: FromStr,
    V: Fn(&str) -> Option<String>,
{
    match var(name) {
        Some(value) => value
            .parse()
            .map_err(|_| SettingsError::InvalidValue { name, expected, value }),
        None => Ok(default),
    }
}

fn parse_bool(name: &'static str, value: String) -> Result<bool, SettingsError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(SettingsError::InvalidValue {
            name,
            expected: "boolean",
            value,
        }),
    }
}
