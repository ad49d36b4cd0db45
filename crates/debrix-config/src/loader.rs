//! Parsing and validation of raw variable values.

use std::collections::HashMap;
use std::time::Duration;

use tracing::warn;
use url::Url;

use crate::defaults::{
    DEFAULT_API_URL, DEFAULT_CHUNK_SIZE, DEFAULT_LOG_LEVEL, DEFAULT_TIMEOUT_MS, ENV_API_KEY,
    ENV_API_URL, ENV_CHUNK_SIZE, ENV_LOG_FORMAT, ENV_LOG_LEVEL, ENV_TIMEOUT_MS, ENV_TRACKERS,
    MAX_CHUNK_SIZE, MAX_TIMEOUT_MS,
};
use crate::error::{ConfigError, ConfigResult};
use crate::model::DebridConfig;

const KNOWN: [&str; 7] = [
    ENV_API_URL,
    ENV_TIMEOUT_MS,
    ENV_CHUNK_SIZE,
    ENV_TRACKERS,
    ENV_LOG_LEVEL,
    ENV_LOG_FORMAT,
    ENV_API_KEY,
];

pub(crate) fn load(vars: &HashMap<String, String>) -> ConfigResult<DebridConfig> {
    for key in vars.keys().filter(|key| !KNOWN.contains(&key.as_str())) {
        warn!(variable = %key, "ignoring unrecognised setting");
    }
    let get = |key: &str| vars.get(key).map(|value| value.trim());

    let api_url = parse_api_url(get(ENV_API_URL).unwrap_or(DEFAULT_API_URL))?;
    let timeout_ms = get(ENV_TIMEOUT_MS)
        .map(|raw| parse_bounded(ENV_TIMEOUT_MS, raw, 1, MAX_TIMEOUT_MS))
        .transpose()?
        .unwrap_or(DEFAULT_TIMEOUT_MS);
    let chunk_size = get(ENV_CHUNK_SIZE)
        .map(|raw| parse_bounded(ENV_CHUNK_SIZE, raw, 1, MAX_CHUNK_SIZE))
        .transpose()?
        .unwrap_or(DEFAULT_CHUNK_SIZE);
    let trackers = get(ENV_TRACKERS)
        .map(parse_trackers)
        .transpose()?
        .unwrap_or_default();
    let log_format = get(ENV_LOG_FORMAT).map(parse_log_format).transpose()?;
    let log_level = get(ENV_LOG_LEVEL).unwrap_or(DEFAULT_LOG_LEVEL).to_string();
    let api_key = get(ENV_API_KEY).map(str::to_string);

    Ok(DebridConfig::new(
        api_url,
        Duration::from_millis(timeout_ms),
        chunk_size,
        trackers,
        log_level,
        log_format,
        api_key,
    ))
}

fn parse_api_url(raw: &str) -> ConfigResult<Url> {
    let url = Url::parse(raw)
        .map_err(|err| ConfigError::invalid(ENV_API_URL, raw, format!("not a URL: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::invalid(
            ENV_API_URL,
            raw,
            "scheme must be http or https",
        ));
    }
    Ok(url)
}

fn parse_bounded<T>(field: &'static str, raw: &str, min: T, max: T) -> ConfigResult<T>
where
    T: std::str::FromStr + PartialOrd + std::fmt::Display + Copy,
{
    let value: T = raw
        .parse()
        .map_err(|_| ConfigError::invalid(field, raw, "must be an integer"))?;
    if value < min || value > max {
        return Err(ConfigError::invalid(
            field,
            raw,
            format!("must be between {min} and {max}"),
        ));
    }
    Ok(value)
}

fn parse_trackers(raw: &str) -> ConfigResult<Vec<String>> {
    raw.split(',')
        .map(str::trim)
        .filter(|tracker| !tracker.is_empty())
        .map(|tracker| {
            Url::parse(tracker)
                .map(|_| tracker.to_string())
                .map_err(|err| ConfigError::invalid(ENV_TRACKERS, tracker, format!("not a URL: {err}")))
        })
        .collect()
}

fn parse_log_format(raw: &str) -> ConfigResult<String> {
    let normalized = raw.to_ascii_lowercase();
    match normalized.as_str() {
        "json" | "pretty" => Ok(normalized),
        _ => Err(ConfigError::invalid(
            ENV_LOG_FORMAT,
            raw,
            "must be 'json' or 'pretty'",
        )),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use anyhow::Result;

    use crate::{ConfigError, DebridConfig};

    #[test]
    fn defaults_apply_when_nothing_is_set() -> Result<()> {
        let config = DebridConfig::from_map(Vec::<(String, String)>::new())?;
        assert_eq!(config.api_url.as_str(), "https://easydebrid.com/api/v1");
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.chunk_size, 100);
        assert!(config.trackers.is_empty());
        assert_eq!(config.log_level, "info");
        assert!(config.log_format.is_none());
        Ok(())
    }

    #[test]
    fn values_are_parsed_and_trimmed() -> Result<()> {
        let config = DebridConfig::from_map([
            ("DEBRIX_API_URL", "http://localhost:8080/api/v1"),
            ("DEBRIX_TIMEOUT_MS", " 2500 "),
            ("DEBRIX_CHUNK_SIZE", "25"),
            ("DEBRIX_TRACKERS", "udp://a.example:80/announce, ,http://b.example/announce"),
            ("DEBRIX_LOG_FORMAT", "JSON"),
            ("DEBRIX_LOG_LEVEL", "debug"),
        ])?;
        assert_eq!(config.api_url.host_str(), Some("localhost"));
        assert_eq!(config.trackers.len(), 2);
        assert_eq!(config.log_format.as_deref(), Some("json"));
        assert_eq!(config.log_level, "debug");

        let settings = config.resolver_settings();
        assert_eq!(settings.request_timeout, Duration::from_millis(2_500));
        assert_eq!(settings.chunk_size, 25);
        Ok(())
    }

    #[test]
    fn out_of_range_numbers_are_rejected() {
        let err = DebridConfig::from_map([("DEBRIX_CHUNK_SIZE", "0")]).err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidField {
                field: "DEBRIX_CHUNK_SIZE",
                ..
            })
        ));

        let err = DebridConfig::from_map([("DEBRIX_TIMEOUT_MS", "120001")]).err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidField {
                field: "DEBRIX_TIMEOUT_MS",
                ..
            })
        ));

        let err = DebridConfig::from_map([("DEBRIX_TIMEOUT_MS", "soon")]).err();
        assert!(
            err.is_some_and(|err| err.to_string() == "invalid value for 'DEBRIX_TIMEOUT_MS': must be an integer")
        );
    }

    #[test]
    fn non_http_api_url_is_rejected() {
        let err = DebridConfig::from_map([("DEBRIX_API_URL", "ftp://files.example")]).err();
        assert!(matches!(
            err,
            Some(ConfigError::InvalidField {
                field: "DEBRIX_API_URL",
                ..
            })
        ));
    }

    #[test]
    fn bad_tracker_and_log_format_are_rejected() {
        assert!(DebridConfig::from_map([("DEBRIX_TRACKERS", "not a url")]).is_err());
        assert!(DebridConfig::from_map([("DEBRIX_LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn credential_is_required_on_demand() -> Result<()> {
        let config = DebridConfig::from_map([("DEBRIX_API_KEY", "  ")])?;
        assert_eq!(
            config.credential().err(),
            Some(ConfigError::MissingField {
                field: "DEBRIX_API_KEY"
            })
        );

        let config = DebridConfig::from_map([("DEBRIX_API_KEY", "abc")])?;
        assert_eq!(config.credential()?.expose(), "abc");
        assert!(!format!("{config:?}").contains("abc"));
        Ok(())
    }
}
