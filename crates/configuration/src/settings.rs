use core_types::LoanPeriod;
use serde::Deserialize;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub loans: LoanSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Where the library database lives and how the pool talks to it.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    pub host: String,
    pub port: u16,
    /// The database name (e.g., "library_db").
    pub name: String,
    pub user: String,
    pub password: String,
    /// Upper bound on pooled connections. The CLI only ever needs one at a time.
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    /// A full connection URL. When present it wins over the discrete fields.
    /// Filled from `DATABASE_URL` if that variable is set.
    pub url: Option<String>,
}

/// Lending rules.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoanSettings {
    /// Days between the borrow date and the due date.
    pub period_days: u32,
}

/// Where log files go and how chatty they are.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub directory: String,
    /// File name prefix; the daily rotation appends the date.
    pub file_prefix: String,
    /// An `EnvFilter` directive. `RUST_LOG` takes precedence when set.
    pub filter: String,
}

impl LoanSettings {
    pub fn loan_period(&self) -> Result<LoanPeriod, core_types::CoreError> {
        LoanPeriod::new(self.period_days)
    }
}

// --- Default Implementations ---
// These allow a user to omit any section (or the whole file)
// and still get a working local setup.

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            name: "library_db".to_string(),
            user: "postgres".to_string(),
            password: String::new(),
            max_connections: 5,
            acquire_timeout_secs: 5,
            url: None,
        }
    }
}

impl Default for LoanSettings {
    fn default() -> Self {
        Self {
            period_days: LoanPeriod::DEFAULT_DAYS,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            directory: "logs".to_string(),
            file_prefix: "libris.log".to_string(),
            filter: "info".to_string(),
        }
    }
}
