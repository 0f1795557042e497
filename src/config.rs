//! Service configuration.

/// Default points awarded when a curator approves without an explicit amount.
pub const DEFAULT_AWARD: i64 = 50;

/// Configuration for a running service instance.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Address the API server binds.
    pub bind: String,

    /// SQLite connection string.
    pub database_url: String,

    /// Points granted on approval when the curator does not specify any.
    pub default_award: i64,
}

impl AppConfig {
    /// Create a config with the default award.
    pub fn new(bind: impl Into<String>, database_url: impl Into<String>) -> Self {
        Self {
            bind: bind.into(),
            database_url: database_url.into(),
            default_award: DEFAULT_AWARD,
        }
    }

    /// Override the default approval award.
    pub fn with_default_award(mut self, points: i64) -> Self {
        self.default_award = points;
        self
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::new("0.0.0.0:7070", "sqlite:reciclo.db")
    }
}
