//! Configuration loading and representation.
//!
//! Everything comes from `JOBSHEET_*` environment variables with defaults that
//! run a single shop out of the working directory.

use std::net::SocketAddr;
use std::path::PathBuf;

use jobsheet_core::ShopTimezone;
use jobsheet_observability::LogFormat;
use jobsheet_receipt::ShopProfile;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://jobsheet.db";
pub const DEFAULT_OUTPUT_DIR: &str = "receipts";
pub const DEFAULT_SHOP_NAME: &str = "Orbit Enterprises";
pub const DEFAULT_SHOP_ADDRESS: &str =
    "NO:5/321, LIC COLONY, NEAR HOTEL VASANTHAM, OPP TO NEW BUS STAND, SALEM-636004";
pub const DEFAULT_SHOP_PHONE: &str = "Tel: 9095022199, 934422199";
pub const DEFAULT_UTC_OFFSET: &str = "+05:30";

/// Keys whose defaults describe one particular shop, not a neutral setting.
const SHOP_PROFILE_KEYS: [&str; 3] = ["JOBSHEET_SHOP_NAME", "JOBSHEET_SHOP_ADDRESS", "JOBSHEET_SHOP_PHONE"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {key}={value:?}: {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

/// Process configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub output_dir: PathBuf,
    pub shop: ShopProfile,
    pub log_format: LogFormat,
    /// Shop-profile keys that were unset and took the built-in value.
    pub placeholder_defaults: Vec<&'static str>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut placeholder_defaults = Vec::new();
        let mut get = |key: &'static str, default: &str| match lookup(key).filter(|v| !v.trim().is_empty()) {
            Some(value) => value,
            None => {
                if SHOP_PROFILE_KEYS.contains(&key) {
                    placeholder_defaults.push(key);
                }
                default.to_string()
            }
        };

        let bind_raw = get("JOBSHEET_BIND_ADDR", DEFAULT_BIND_ADDR);
        let bind_addr = bind_raw.parse().map_err(|e: std::net::AddrParseError| ConfigError {
            key: "JOBSHEET_BIND_ADDR",
            value: bind_raw.clone(),
            reason: e.to_string(),
        })?;

        let offset_raw = get("JOBSHEET_UTC_OFFSET", DEFAULT_UTC_OFFSET);
        let timezone = ShopTimezone::parse(&offset_raw).map_err(|e| ConfigError {
            key: "JOBSHEET_UTC_OFFSET",
            value: offset_raw.clone(),
            reason: e.to_string(),
        })?;

        let format_raw = get("JOBSHEET_LOG_FORMAT", "json");
        let log_format = format_raw.parse().map_err(|e: jobsheet_observability::UnknownLogFormat| ConfigError {
            key: "JOBSHEET_LOG_FORMAT",
            value: format_raw.clone(),
            reason: e.to_string(),
        })?;

        let database_url = get("JOBSHEET_DATABASE_URL", DEFAULT_DATABASE_URL);
        let output_dir = PathBuf::from(get("JOBSHEET_OUTPUT_DIR", DEFAULT_OUTPUT_DIR));
        let shop = ShopProfile::new(
            get("JOBSHEET_SHOP_NAME", DEFAULT_SHOP_NAME),
            get("JOBSHEET_SHOP_ADDRESS", DEFAULT_SHOP_ADDRESS),
            get("JOBSHEET_SHOP_PHONE", DEFAULT_SHOP_PHONE),
            timezone,
        );

        Ok(Self {
            bind_addr,
            database_url,
            output_dir,
            shop,
            log_format,
            placeholder_defaults,
        })
    }

    /// Warn once per shop-profile value that fell back to the built-in shop.
    ///
    /// Call after logging is initialised; configuration is read before that.
    pub fn warn_on_placeholder_defaults(&self) {
        for key in &self.placeholder_defaults {
            tracing::warn!(key = *key, shop = %self.shop.name, "{key} not set; printing the built-in shop profile value");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(cfg.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(cfg.output_dir, PathBuf::from("receipts"));
        assert_eq!(cfg.shop.name, DEFAULT_SHOP_NAME);
        assert_eq!(cfg.shop.timezone, ShopTimezone::parse("+05:30").unwrap());
        assert_eq!(cfg.log_format, LogFormat::Json);
    }

    #[test]
    fn overrides_are_read() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("JOBSHEET_BIND_ADDR", "127.0.0.1:9000"),
            ("JOBSHEET_SHOP_NAME", "Second Branch"),
            ("JOBSHEET_UTC_OFFSET", "-03:00"),
            ("JOBSHEET_LOG_FORMAT", "pretty"),
            ("JOBSHEET_OUTPUT_DIR", "/var/lib/jobsheet/receipts"),
        ]))
        .unwrap();
        assert_eq!(cfg.bind_addr.port(), 9000);
        assert_eq!(cfg.shop.name, "Second Branch");
        assert_eq!(cfg.shop.timezone.offset().local_minus_utc(), -10_800);
        assert_eq!(cfg.log_format, LogFormat::Pretty);
        assert_eq!(cfg.output_dir, PathBuf::from("/var/lib/jobsheet/receipts"));
    }

    #[test]
    fn unset_shop_profile_values_are_reported() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("JOBSHEET_SHOP_NAME", "Second Branch"),
            ("JOBSHEET_SHOP_PHONE", " "),
            ("JOBSHEET_OUTPUT_DIR", "out"),
        ]))
        .unwrap();
        assert_eq!(cfg.placeholder_defaults, vec!["JOBSHEET_SHOP_ADDRESS", "JOBSHEET_SHOP_PHONE"]);
        assert_eq!(cfg.shop.phone, DEFAULT_SHOP_PHONE);

        let all_set = AppConfig::from_lookup(lookup(&[
            ("JOBSHEET_SHOP_NAME", "A"),
            ("JOBSHEET_SHOP_ADDRESS", "B"),
            ("JOBSHEET_SHOP_PHONE", "C"),
        ]))
        .unwrap();
        assert!(all_set.placeholder_defaults.is_empty());

        // Neutral settings (bind address, output dir, offset) are not placeholders.
        let none_set = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(none_set.placeholder_defaults, SHOP_PROFILE_KEYS.to_vec());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let cfg = AppConfig::from_lookup(lookup(&[("JOBSHEET_OUTPUT_DIR", "  ")])).unwrap();
        assert_eq!(cfg.output_dir, PathBuf::from(DEFAULT_OUTPUT_DIR));
    }

    #[test]
    fn malformed_values_are_errors() {
        let err = AppConfig::from_lookup(lookup(&[("JOBSHEET_UTC_OFFSET", "IST")])).unwrap_err();
        assert_eq!(err.key, "JOBSHEET_UTC_OFFSET");

        let err = AppConfig::from_lookup(lookup(&[("JOBSHEET_BIND_ADDR", "nope")])).unwrap_err();
        assert_eq!(err.key, "JOBSHEET_BIND_ADDR");

        let err = AppConfig::from_lookup(lookup(&[("JOBSHEET_LOG_FORMAT", "xml")])).unwrap_err();
        assert_eq!(err.key, "JOBSHEET_LOG_FORMAT");
    }
}
