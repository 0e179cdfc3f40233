use anyhow::Result;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub recurrence: RecurrenceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u8,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// How a MONTHLY rule is labelled in the legacy `cal_type` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MonthlyTypePolicy {
    /// Every MONTHLY rule is written as `monthlyByDate`.
    #[default]
    Collapse,
    /// BYSETPOS rules are written as `monthlyBySetPos`, BYDAY rules as
    /// `monthlyByDay`, everything else as `monthlyByDate`.
    Distinguish,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecurrenceConfig {
    pub monthly_type: MonthlyTypePolicy,
    /// Widest listing window, in days, the service layer accepts.
    pub max_window_days: u32,
}

impl Default for RecurrenceConfig {
    fn default() -> Self {
        Self {
            monthly_type: MonthlyTypePolicy::Collapse,
            max_window_days: 3660,
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from `.env` file and environment variables into a `Settings`.
    /// Environment variables take precedence over `.env` file values and over
    /// `config.toml`.
    ///
    /// Nested keys use `__` between levels, e.g. `RECURRENCE__MAX_WINDOW_DAYS`
    /// for `recurrence.max_window_days`. `DATABASE_URL` sets `database.url`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Self::from_environment(
            config::Environment::default(),
            std::env::var("DATABASE_URL").ok(),
        )
    }

    fn from_environment(
        environment: config::Environment,
        database_url: Option<String>,
    ) -> Result<Self> {
        Ok(Config::builder()
            .set_default("database.max_connections", 4)?
            .set_default("logging.level", "info")?
            .set_default("recurrence.monthly_type", "collapse")?
            .set_default("recurrence.max_window_days", 3660)?
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            // Environment
            .add_source(
                environment
                    .convert_case(config::Case::Snake)
                    .separator("__")
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .set_override_option("database.url", database_url)?
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}
