use std::time::Duration;

use anyhow::{anyhow, Context};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub expires_in: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub host: String,
    pub port: u16,
    pub static_dir: String,
    pub request_timeout: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(var: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| var(key).with_context(|| format!("{key} must be set"));

        let database_url = required("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: required("JWT_SECRET")?,
            issuer: var("JWT_ISSUER").unwrap_or_else(|| "userauth".into()),
            audience: var("JWT_AUDIENCE").unwrap_or_else(|| "userauth-users".into()),
            expires_in: parse_duration(&required("JWT_TIMEOUT_DURATION")?)
                .context("JWT_TIMEOUT_DURATION")?,
        };
        let port = match var("PORT") {
            Some(v) => v.parse::<u16>().context("PORT must be a port number")?,
            None => 8000,
        };
        let request_timeout = var("REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        Ok(Self {
            database_url,
            jwt,
            host: var("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            static_dir: var("STATIC_DIR").unwrap_or_else(|| "public".into()),
            request_timeout,
        })
    }
}

/// Parses durations like `2h`, `30m`, `45s`, `7d`; a bare number is seconds.
pub fn parse_duration(raw: &str) -> anyhow::Result<Duration> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);
    let value: u64 = digits
        .parse()
        .map_err(|_| anyhow!("invalid duration {raw:?}"))?;
    let secs = match unit.trim() {
        "" | "s" => value,
        "m" => value * 60,
        "h" => value * 60 * 60,
        "d" => value * 60 * 60 * 24,
        other => return Err(anyhow!("unknown duration unit {other:?}")),
    };
    if secs == 0 {
        return Err(anyhow!("duration must be positive"));
    }
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: &[(&str, &str)] = &[
        ("DATABASE_URL", "postgres://localhost/userauth"),
        ("JWT_SECRET", "dev-secret"),
        ("JWT_TIMEOUT_DURATION", "2h"),
    ];

    #[test]
    fn parses_duration_units() {
        assert_eq!(parse_duration("45").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("45s").unwrap(), Duration::from_secs(45));
        assert_eq!(parse_duration("30m").unwrap(), Duration::from_secs(1800));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
        assert_eq!(parse_duration("7d").unwrap(), Duration::from_secs(604_800));
    }

    #[test]
    fn rejects_bad_durations() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("h").is_err());
        assert!(parse_duration("10w").is_err());
        assert!(parse_duration("0").is_err());
    }

    #[test]
    fn defaults_apply_when_optional_vars_missing() {
        let cfg = AppConfig::from_lookup(lookup(BASE)).expect("config");
        assert_eq!(cfg.port, 8000);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.static_dir, "public");
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert_eq!(cfg.jwt.expires_in, Duration::from_secs(7200));
        assert_eq!(cfg.jwt.issuer, "userauth");
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = AppConfig::from_lookup(lookup(&BASE[..1])).unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn port_override_is_parsed() {
        let mut pairs = BASE.to_vec();
        pairs.push(("PORT", "9090"));
        let cfg = AppConfig::from_lookup(lookup(&pairs)).expect("config");
        assert_eq!(cfg.port, 9090);

        pairs.pop();
        pairs.push(("PORT", "not-a-port"));
        assert!(AppConfig::from_lookup(lookup(&pairs)).is_err());
    }
}
