//! Service Configuration
//!
//! Everything is read from the environment once at startup, then `--bind`
//! on the command line may override the listen address. Unset or unparsable
//! values fall back to the defaults below.

use crate::cache::gateway::CacheSettings;
use crate::search::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageLimits};

use std::time::Duration;

pub const DEFAULT_BIND: &str = "0.0.0.0:8084";
pub const DEFAULT_SERVICE_API_KEY: &str = "default_service_key";
pub const DEFAULT_JWT_SECRET: &str = "default_secret_key";

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub bind: String,
    pub service_api_key: String,
    pub jwt_secret: String,
    pub cache_enabled: bool,
    pub cache: CacheSettings,
    pub page_limits: PageLimits,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            service_api_key: DEFAULT_SERVICE_API_KEY.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            cache_enabled: true,
            cache: CacheSettings::default(),
            page_limits: PageLimits::default(),
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let bind = match (get("SEARCH_BIND"), get("PORT")) {
            (Some(bind), _) => bind,
            (None, Some(port)) => format!("0.0.0.0:{}", port.trim()),
            (None, None) => defaults.bind,
        };

        let service_api_key = get("SERVICE_API_KEY").unwrap_or_else(|| {
            tracing::warn!("SERVICE_API_KEY not set, using development default");
            defaults.service_api_key
        });

        let jwt_secret = get("JWT_SECRET_KEY").unwrap_or_else(|| {
            tracing::warn!("JWT_SECRET_KEY not set, using development default");
            defaults.jwt_secret
        });

        let cache_enabled = get("SEARCH_CACHE_ENABLED")
            .and_then(|v| parse_flag(&v))
            .unwrap_or(defaults.cache_enabled);

        let secs = |name: &str, fallback: Duration| {
            get(name)
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_secs)
                .unwrap_or(fallback)
        };

        let cache = CacheSettings {
            results_ttl: secs("SEARCH_CACHE_TTL_SECS", defaults.cache.results_ttl),
            trending_ttl: secs("TRENDING_CACHE_TTL_SECS", defaults.cache.trending_ttl),
            timeout: get("CACHE_TIMEOUT_MS")
                .and_then(|v| v.trim().parse::<u64>().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.cache.timeout),
        };

        let size = |name: &str, fallback: usize| {
            get(name)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|n| *n > 0)
                .unwrap_or(fallback)
        };

        let max_page_size = size("SEARCH_MAX_PAGE_SIZE", MAX_PAGE_SIZE);
        let page_limits = PageLimits {
            default_page_size: size("SEARCH_DEFAULT_PAGE_SIZE", DEFAULT_PAGE_SIZE).min(max_page_size),
            max_page_size,
        };

        Self {
            bind,
            service_api_key,
            jwt_secret,
            cache_enabled,
            cache,
            page_limits,
        }
    }

    /// Applies command-line overrides. `args` excludes the program name.
    pub fn apply_args(&mut self, args: &[String]) -> anyhow::Result<()> {
        let mut rest = args.iter();
        while let Some(arg) = rest.next() {
            if arg == "--bind" {
                let Some(addr) = rest.next() else {
                    anyhow::bail!("--bind requires <addr:port>");
                };
                self.bind = addr.clone();
            }
        }
        Ok(())
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
