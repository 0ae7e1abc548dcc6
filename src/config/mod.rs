mod builder;
mod types;

pub use builder::{EngineConfigBuilder, WithDatabaseUrl};
pub use types::EngineConfig;

impl EngineConfig {
    /// Load from environment (via `dotenvy`), falling back to defaults for
    /// anything unset. `DATABASE_URL` is the only field without a default.
    pub fn from_env() -> anyhow::Result<Self> {
        let _ = dotenvy::dotenv();
        let mut builder = EngineConfig::builder().database_url(
            std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/harvest_engine".to_string()),
        );
        if let Ok(agent) = std::env::var("HARVEST_USER_AGENT") {
            builder = builder.user_agent(agent);
        }
        if let Ok(v) = std::env::var("HARVEST_FETCH_TIMEOUT_SECS") {
            if let Ok(v) = v.parse() {
                builder = builder.fetch_timeout_secs(v);
            }
        }
        if let Ok(v) = std::env::var("HARVEST_TRANSACTIONS_LIMIT") {
            if let Ok(v) = v.parse() {
                builder = builder.transactions_limit(v);
            }
        }
        if let Ok(v) = std::env::var("HARVEST_CONCURRENT_REQUESTS_LIMIT") {
            if let Ok(v) = v.parse() {
                builder = builder.concurrent_requests_limit(v);
            }
        }
        builder.build()
    }
}
