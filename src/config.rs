//! Environment-driven configuration

use crate::types::{CounterpartMode, GameConfig};
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_COUNTRIES_URL: &str = "https://restcountries.com/v3.1/all";

/// Country lookup settings
#[derive(Debug, Clone)]
pub struct CountriesConfig {
    pub url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Extra attempts after the first failure
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for CountriesConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_COUNTRIES_URL.to_string(),
            timeout: Duration::from_secs(5),
            max_retries: 3,
            retry_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub game: GameConfig,
    pub countries: CountriesConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 6573)),
            game: GameConfig::default(),
            countries: CountriesConfig::default(),
        }
    }
}

/// Read and parse an env var, warning and falling back when it doesn't parse
fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Ignoring unparsable {}={:?}", key, raw);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_counterpart(raw: &str) -> Option<CounterpartMode> {
    match raw.trim().to_lowercase().as_str() {
        "simulated" | "sim" => Some(CounterpartMode::Simulated),
        "remote" | "peer" => Some(CounterpartMode::Remote),
        _ => None,
    }
}

impl AppConfig {
    /// Load config from environment variables
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();

        let bind_addr = env_parse("BIND_ADDR", defaults.bind_addr);

        let counterpart = match std::env::var("GAME_COUNTERPART") {
            Ok(raw) => parse_counterpart(&raw).unwrap_or_else(|| {
                tracing::warn!(
                    "GAME_COUNTERPART must be 'simulated' or 'remote', got {:?}",
                    raw
                );
                defaults.game.counterpart
            }),
            Err(_) => defaults.game.counterpart,
        };

        let seed = std::env::var("GAME_SEED")
            .ok()
            .and_then(|v| v.trim().parse().ok());

        let game = GameConfig {
            question_seconds: env_parse("GAME_QUESTION_SECONDS", defaults.game.question_seconds),
            reveal_delay_ms: env_parse("GAME_REVEAL_DELAY_MS", defaults.game.reveal_delay_ms),
            tick_interval_ms: env_parse("GAME_TICK_MS", defaults.game.tick_interval_ms),
            counterpart,
            seed,
        };

        let countries = CountriesConfig {
            url: std::env::var("COUNTRIES_URL")
                .ok()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.countries.url),
            timeout: Duration::from_millis(env_parse(
                "COUNTRIES_TIMEOUT_MS",
                defaults.countries.timeout.as_millis() as u64,
            )),
            max_retries: env_parse("COUNTRIES_MAX_RETRIES", defaults.countries.max_retries),
            retry_delay: Duration::from_millis(env_parse(
                "COUNTRIES_RETRY_DELAY_MS",
                defaults.countries.retry_delay.as_millis() as u64,
            )),
        };

        tracing::info!(
            %bind_addr,
            question_seconds = game.question_seconds,
            reveal_delay_ms = game.reveal_delay_ms,
            counterpart = ?game.counterpart,
            "Config loaded"
        );

        Self {
            bind_addr,
            game,
            countries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: &[&str] = &[
        "BIND_ADDR",
        "GAME_QUESTION_SECONDS",
        "GAME_REVEAL_DELAY_MS",
        "GAME_TICK_MS",
        "GAME_COUNTERPART",
        "GAME_SEED",
        "COUNTRIES_URL",
        "COUNTRIES_TIMEOUT_MS",
        "COUNTRIES_MAX_RETRIES",
        "COUNTRIES_RETRY_DELAY_MS",
    ];

    fn clear_env() {
        for key in KEYS {
            std::env::remove_var(key);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        let config = AppConfig::from_env();
        assert_eq!(config.bind_addr.port(), 6573);
        assert_eq!(config.game.question_seconds, 30);
        assert_eq!(config.game.reveal_delay_ms, 2000);
        assert_eq!(config.game.tick_interval_ms, 1000);
        assert_eq!(config.game.counterpart, CounterpartMode::Simulated);
        assert_eq!(config.game.seed, None);
        assert_eq!(config.countries.url, DEFAULT_COUNTRIES_URL);
        assert_eq!(config.countries.max_retries, 3);
        assert_eq!(config.countries.timeout, Duration::from_secs(5));
    }

    #[test]
    #[serial]
    fn test_overrides() {
        clear_env();
        std::env::set_var("BIND_ADDR", "127.0.0.1:9000");
        std::env::set_var("GAME_QUESTION_SECONDS", "15");
        std::env::set_var("GAME_COUNTERPART", "Remote");
        std::env::set_var("GAME_SEED", "42");
        std::env::set_var("COUNTRIES_MAX_RETRIES", "0");

        let config = AppConfig::from_env();
        assert_eq!(config.bind_addr, "127.0.0.1:9000".parse::<SocketAddr>().unwrap());
        assert_eq!(config.game.question_seconds, 15);
        assert_eq!(config.game.counterpart, CounterpartMode::Remote);
        assert_eq!(config.game.seed, Some(42));
        assert_eq!(config.countries.max_retries, 0);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_bad_values_fall_back() {
        clear_env();
        std::env::set_var("GAME_QUESTION_SECONDS", "soon");
        std::env::set_var("GAME_COUNTERPART", "robot");

        let config = AppConfig::from_env();
        assert_eq!(config.game.question_seconds, 30);
        assert_eq!(config.game.counterpart, CounterpartMode::Simulated);
        clear_env();
    }
}
