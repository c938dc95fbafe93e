//! Server configuration from environment.

use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteProviderKind {
    GraphHopper,
    StraightLine,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub route_provider: RouteProviderKind,
    pub routing_url: String,
    pub routing_api_key: Option<String>,
    pub routing_profile: String,
    pub route_timeout_ms: u64,
    pub geocoder_url: String,
    pub geocoder_user_agent: String,
    pub geocode_timeout_ms: u64,
    pub geocode_cache_max_entries: usize,
    pub geocode_cache_ttl_s: u64,
    /// Instruction language, e.g. `de_DE`.
    pub locale: String,
    pub event_queue_capacity: usize,
    pub frame_buffer: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            server_port: parse_env("ITINERARY_PORT", 3000),
            route_provider: match env::var("ITINERARY_ROUTE_PROVIDER")
                .unwrap_or_default()
                .trim()
                .to_ascii_lowercase()
                .as_str()
            {
                "straight" | "straight-line" | "offline" => RouteProviderKind::StraightLine,
                _ => RouteProviderKind::GraphHopper,
            },
            routing_url: env::var("ITINERARY_ROUTING_URL")
                .unwrap_or_else(|_| "https://graphhopper.com/api/1".to_string()),
            routing_api_key: env::var("ITINERARY_ROUTING_API_KEY")
                .ok()
                .filter(|value| !value.trim().is_empty()),
            routing_profile: env::var("ITINERARY_ROUTING_PROFILE")
                .unwrap_or_else(|_| "car".to_string()),
            route_timeout_ms: parse_env("ITINERARY_ROUTE_TIMEOUT_MS", 15_000),
            geocoder_url: env::var("ITINERARY_GEOCODER_URL")
                .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
            geocoder_user_agent: env::var("ITINERARY_GEOCODER_USER_AGENT")
                .unwrap_or_else(|_| format!("itinerary-server/{}", env!("CARGO_PKG_VERSION"))),
            geocode_timeout_ms: parse_env("ITINERARY_GEOCODE_TIMEOUT_MS", 10_000),
            geocode_cache_max_entries: parse_env("ITINERARY_GEOCODE_CACHE_MAX_ENTRIES", 1024),
            geocode_cache_ttl_s: parse_env("ITINERARY_GEOCODE_CACHE_TTL_S", 3600),
            locale: env::var("ITINERARY_LOCALE")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .or_else(|| env::var("LANG").ok().and_then(|lang| locale_from_lang(&lang)))
                .unwrap_or_else(|| "en".to_string()),
            event_queue_capacity: parse_env("ITINERARY_EVENT_QUEUE", 256),
            frame_buffer: parse_env("ITINERARY_FRAME_BUFFER", 256),
        }
    }

    pub fn route_timeout(&self) -> Duration {
        Duration::from_millis(self.route_timeout_ms.max(1))
    }

    pub fn geocode_timeout(&self) -> Duration {
        Duration::from_millis(self.geocode_timeout_ms.max(1))
    }

    pub fn geocode_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.geocode_cache_ttl_s)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

/// `de_DE.UTF-8` -> `de_DE`; `C` and `POSIX` carry no language.
fn locale_from_lang(lang: &str) -> Option<String> {
    let locale = lang.split(['.', '@']).next()?.trim();
    if locale.is_empty() || locale == "C" || locale == "POSIX" {
        None
    } else {
        Some(locale.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lang_is_reduced_to_locale() {
        assert_eq!(locale_from_lang("de_DE.UTF-8").as_deref(), Some("de_DE"));
        assert_eq!(locale_from_lang("fr_FR@euro").as_deref(), Some("fr_FR"));
        assert_eq!(locale_from_lang("C.UTF-8"), None);
        assert_eq!(locale_from_lang(""), None);
    }
}
