#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    /// Default half-life for decayed scores, in days.
    pub half_life_days: f64,
    /// Deepest JSON nesting level the extractor descends into.
    pub max_depth: usize,
    /// Payloads larger than this are skipped without parsing.
    pub max_payload_bytes: usize,
    /// Lowercase handle that extraction is scoped to, if any.
    pub profile: Option<String>,
    pub trend_top_n: usize,
    pub max_concurrent_files: usize,
}
