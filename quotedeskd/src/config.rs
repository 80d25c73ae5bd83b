//! Daemon configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use quotedesk_engine::{DepthConfig, SyntheticQuoteConfig, UniformAmounts};
use rust_decimal::Decimal;

use crate::error::{DaemonError, DaemonResult};

/// Depths the dashboard lets the user pick from.
///
/// The generator accepts any depth; this list is presentation policy.
pub const DEPTH_OPTIONS: [usize; 4] = [10, 20, 50, 100];

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Environment (test, development, production)
    pub environment: Environment,

    /// Refresh cadence
    pub refresh: RefreshConfig,

    /// Order book generation
    pub book: BookConfig,

    /// Synthetic price feed
    pub quotes: SyntheticQuoteConfig,

    /// How books and sizing results are printed
    pub output: OutputFormat,
}

/// Refresh cadence.
#[derive(Debug, Clone)]
pub struct RefreshConfig {
    /// Time between two book regenerations
    pub interval: Duration,
}

/// Order book generation settings.
#[derive(Debug, Clone)]
pub struct BookConfig {
    /// Initial levels per side (one of `DEPTH_OPTIONS`)
    pub depth: usize,
    /// Price grid
    pub grid: DepthConfig,
    /// Smallest level amount (inclusive)
    pub amount_min: Decimal,
    /// Largest level amount (exclusive)
    pub amount_max: Decimal,
    /// Seed for amounts and quotes; entropy when unset
    pub seed: Option<u64>,
}

/// Output format for rendered books and results.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable ladder
    Text,
    /// One JSON object per line
    Json,
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment (fixed seed, fast refresh)
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through a key lookup.
    ///
    /// Missing keys fall back to defaults; present but invalid keys are errors.
    pub fn from_lookup<F>(lookup: F) -> DaemonResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Self::load_environment(&lookup)?;
        let refresh = Self::load_refresh_config(&lookup)?;
        let book = Self::load_book_config(&lookup)?;
        let quotes = Self::load_quote_config(&lookup)?;
        check_ladder_floor(&book, &quotes)?;
        let output = Self::load_output_format(&lookup)?;

        Ok(Self {
            environment,
            refresh,
            book,
            quotes,
            output,
        })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            environment: Environment::Test,
            refresh: RefreshConfig {
                interval: Duration::from_millis(10),
            },
            book: BookConfig {
                depth: 10,
                seed: Some(42),
                ..BookConfig::default()
            },
            quotes: SyntheticQuoteConfig::default(),
            output: OutputFormat::Json,
        }
    }

    fn load_environment<F: Fn(&str) -> Option<String>>(lookup: &F) -> DaemonResult<Environment> {
        let env_str = lookup("QUOTEDESK_ENV").unwrap_or_else(|| "development".to_string());

        match env_str.to_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(DaemonError::Config(format!(
                "Invalid QUOTEDESK_ENV: {}. Expected: test, development, production",
                other
            ))),
        }
    }

    fn load_refresh_config<F: Fn(&str) -> Option<String>>(
        lookup: &F,
    ) -> DaemonResult<RefreshConfig> {
        let millis: u64 = Self::load_parsed(lookup, "QUOTEDESK_REFRESH_MS", 500)?;
        if millis == 0 {
            return Err(DaemonError::Config("QUOTEDESK_REFRESH_MS must be positive".to_string()));
        }

        Ok(RefreshConfig {
            interval: Duration::from_millis(millis),
        })
    }

    fn load_book_config<F: Fn(&str) -> Option<String>>(lookup: &F) -> DaemonResult<BookConfig> {
        let depth: usize = Self::load_parsed(lookup, "QUOTEDESK_DEPTH", 20)?;
        validate_depth(depth)?;

        let tick_step =
            Self::load_parsed(lookup, "QUOTEDESK_TICK_STEP", DepthConfig::DEFAULT_TICK_STEP)?;
        let price_scale = match lookup("QUOTEDESK_PRICE_SCALE") {
            Some(val) if val.eq_ignore_ascii_case("none") => None,
            Some(val) => Some(val.parse::<u32>().map_err(|_| {
                DaemonError::Config(format!("Invalid QUOTEDESK_PRICE_SCALE value: {}", val))
            })?),
            None => Some(DepthConfig::DEFAULT_PRICE_SCALE),
        };
        let grid = DepthConfig::new(tick_step, price_scale)?;

        let amount_min =
            Self::load_parsed(lookup, "QUOTEDESK_AMOUNT_MIN", UniformAmounts::DEFAULT_MIN)?;
        let amount_max =
            Self::load_parsed(lookup, "QUOTEDESK_AMOUNT_MAX", UniformAmounts::DEFAULT_MAX)?;

        let seed = match lookup("QUOTEDESK_SEED") {
            Some(val) => Some(val.parse::<u64>().map_err(|_| {
                DaemonError::Config(format!("Invalid QUOTEDESK_SEED value: {}", val))
            })?),
            None => None,
        };

        Ok(BookConfig {
            depth,
            grid,
            amount_min,
            amount_max,
            seed,
        })
    }

    fn load_quote_config<F: Fn(&str) -> Option<String>>(
        lookup: &F,
    ) -> DaemonResult<SyntheticQuoteConfig> {
        let defaults = SyntheticQuoteConfig::default();

        let config = SyntheticQuoteConfig {
            anchor_mid: Self::load_parsed(lookup, "QUOTEDESK_ANCHOR_MID", defaults.anchor_mid)?,
            mid_jitter: Self::load_parsed(lookup, "QUOTEDESK_MID_JITTER", defaults.mid_jitter)?,
            spread_min: Self::load_parsed(lookup, "QUOTEDESK_SPREAD_MIN", defaults.spread_min)?,
            spread_max: Self::load_parsed(lookup, "QUOTEDESK_SPREAD_MAX", defaults.spread_max)?,
        };
        config.validate()?;

        Ok(config)
    }

    fn load_output_format<F: Fn(&str) -> Option<String>>(
        lookup: &F,
    ) -> DaemonResult<OutputFormat> {
        let format = lookup("QUOTEDESK_OUTPUT").unwrap_or_else(|| "text".to_string());

        match format.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(DaemonError::Config(format!(
                "Invalid QUOTEDESK_OUTPUT: {}. Expected: text, json",
                other
            ))),
        }
    }

    fn load_parsed<F, T>(lookup: &F, key: &str, default: T) -> DaemonResult<T>
    where
        F: Fn(&str) -> Option<String>,
        T: FromStr,
    {
        match lookup(key) {
            Some(val) => val
                .trim()
                .parse::<T>()
                .map_err(|_| DaemonError::Config(format!("Invalid {} value: {}", key, val))),
            None => Ok(default),
        }
    }
}

/// Check a depth against the dashboard's depth options.
pub fn validate_depth(depth: usize) -> DaemonResult<()> {
    if DEPTH_OPTIONS.contains(&depth) {
        Ok(())
    } else {
        Err(DaemonError::Config(format!(
            "Unsupported depth {}. Expected one of {:?}",
            depth, DEPTH_OPTIONS
        )))
    }
}

/// Reject feeds whose deepest possible bid would reach zero.
///
/// Uses the lowest mid and widest spread the quote feed can produce and the
/// largest depth a user can select.
fn check_ladder_floor(book: &BookConfig, quotes: &SyntheticQuoteConfig) -> DaemonResult<()> {
    let max_depth = DEPTH_OPTIONS.iter().copied().max().unwrap_or(book.depth);
    let floor = Decimal::from(max_depth.saturating_sub(1))
        .checked_mul(book.grid.tick_step())
        .and_then(|steps| steps.checked_add(quotes.mid_jitter / Decimal::from(2)))
        .and_then(|offset| offset.checked_add(quotes.spread_max / Decimal::from(2)))
        .and_then(|offset| quotes.anchor_mid.checked_sub(offset));

    match floor {
        Some(floor) if floor > Decimal::ZERO => Ok(()),
        _ => Err(DaemonError::Config(format!(
            "Anchor mid {} is too low for {} levels at tick {}: bids would reach zero",
            quotes.anchor_mid,
            max_depth,
            book.grid.tick_step()
        ))),
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            environment: Environment::Development,
            refresh: RefreshConfig {
                interval: Duration::from_millis(500),
            },
            book: BookConfig::default(),
            quotes: SyntheticQuoteConfig::default(),
            output: OutputFormat::Text,
        }
    }
}

impl Default for BookConfig {
    fn default() -> Self {
        Self {
            depth: 20,
            grid: DepthConfig::default(),
            amount_min: UniformAmounts::DEFAULT_MIN,
            amount_max: UniformAmounts::DEFAULT_MAX,
            seed: None,
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.refresh.interval, Duration::from_millis(500));
        assert_eq!(config.book.depth, 20);
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.output, OutputFormat::Text);
    }

    #[test]
    fn test_test_config() {
        let config = Config::test();

        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.book.seed, Some(42));
        assert!(DEPTH_OPTIONS.contains(&config.book.depth));
    }

    #[test]
    fn test_empty_lookup_gives_defaults() {
        let config = Config::from_lookup(|_| None).unwrap();

        assert_eq!(config.book.depth, 20);
        assert_eq!(config.book.grid, DepthConfig::default());
        assert_eq!(config.book.amount_min, dec!(0.1));
        assert_eq!(config.book.amount_max, dec!(5.1));
        assert_eq!(config.quotes, SyntheticQuoteConfig::default());
        assert_eq!(config.book.seed, None);
    }

    #[test]
    fn test_lookup_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("QUOTEDESK_ENV", "prod"),
            ("QUOTEDESK_REFRESH_MS", "250"),
            ("QUOTEDESK_DEPTH", "50"),
            ("QUOTEDESK_TICK_STEP", "0.5"),
            ("QUOTEDESK_PRICE_SCALE", "none"),
            ("QUOTEDESK_SEED", "7"),
            ("QUOTEDESK_ANCHOR_MID", "3000"),
            ("QUOTEDESK_OUTPUT", "JSON"),
        ]))
        .unwrap();

        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.refresh.interval, Duration::from_millis(250));
        assert_eq!(config.book.depth, 50);
        assert_eq!(config.book.grid.tick_step(), dec!(0.5));
        assert_eq!(config.book.grid.price_scale(), None);
        assert_eq!(config.book.seed, Some(7));
        assert_eq!(config.quotes.anchor_mid, dec!(3000));
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn test_rejects_depth_outside_options() {
        let result = Config::from_lookup(lookup_from(&[("QUOTEDESK_DEPTH", "15")]));
        assert!(matches!(result, Err(DaemonError::Config(_))));

        let result = Config::from_lookup(lookup_from(&[("QUOTEDESK_DEPTH", "-10")]));
        assert!(matches!(result, Err(DaemonError::Config(_))));
    }

    #[test]
    fn test_rejects_invalid_values() {
        assert!(Config::from_lookup(lookup_from(&[("QUOTEDESK_ENV", "staging")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("QUOTEDESK_REFRESH_MS", "0")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("QUOTEDESK_TICK_STEP", "abc")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("QUOTEDESK_OUTPUT", "xml")])).is_err());
        assert!(Config::from_lookup(lookup_from(&[("QUOTEDESK_SEED", "-1")])).is_err());
    }

    #[test]
    fn test_rejects_invalid_grid_and_quotes() {
        let result = Config::from_lookup(lookup_from(&[("QUOTEDESK_TICK_STEP", "0.001")]));
        assert!(matches!(result, Err(DaemonError::Engine(_))));

        let result = Config::from_lookup(lookup_from(&[
            ("QUOTEDESK_SPREAD_MIN", "1"),
            ("QUOTEDESK_SPREAD_MAX", "0.5"),
        ]));
        assert!(matches!(result, Err(DaemonError::Engine(_))));
    }

    #[test]
    fn test_rejects_anchor_too_low_for_deepest_book() {
        // 100 levels at 0.25 below a mid of 10 reach negative prices
        let result = Config::from_lookup(lookup_from(&[("QUOTEDESK_ANCHOR_MID", "10")]));
        assert!(matches!(result, Err(DaemonError::Config(msg)) if msg.contains("too low")));

        // 40 - 5 - 0.35 - 99 × 0.25 stays positive
        let config = Config::from_lookup(lookup_from(&[("QUOTEDESK_ANCHOR_MID", "40")])).unwrap();
        assert_eq!(config.quotes.anchor_mid, dec!(40));

        // A coarser grid needs a higher anchor
        let result = Config::from_lookup(lookup_from(&[
            ("QUOTEDESK_ANCHOR_MID", "40"),
            ("QUOTEDESK_TICK_STEP", "1"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_depth() {
        for depth in DEPTH_OPTIONS {
            assert!(validate_depth(depth).is_ok());
        }
        assert!(validate_depth(0).is_err());
        assert!(validate_depth(25).is_err());
    }

    #[test]
    fn test_environment_display() {
        assert_eq!(Environment::Test.to_string(), "test");
        assert_eq!(Environment::Development.to_string(), "development");
        assert_eq!(Environment::Production.to_string(), "production");
    }
}
