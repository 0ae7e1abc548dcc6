use crate::utils::constants::{
    DEFAULT_CONCURRENT_REQUESTS_LIMIT, DEFAULT_DICTIONARY_CACHE_CAPACITY, DEFAULT_FETCH_RETRIES,
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_TRANSACTIONS_LIMIT, DEFAULT_USER_AGENT,
    DEFAULT_WAIT_FOR_SECS,
};

/// Engine-wide configuration, built through [`super::builder::EngineConfigBuilder`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub database_url: String,
    pub user_agent: String,
    pub fetch_timeout_secs: u64,
    pub fetch_retries: u8,
    pub wait_for_secs: u64,
    pub transactions_limit: u32,
    pub concurrent_requests_limit: usize,
    pub dictionary_cache_capacity: usize,
}

impl EngineConfig {
    #[must_use]
    pub fn builder() -> super::builder::EngineConfigBuilder<()> {
        super::builder::EngineConfigBuilder::default()
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            fetch_retries: DEFAULT_FETCH_RETRIES,
            wait_for_secs: DEFAULT_WAIT_FOR_SECS,
            transactions_limit: DEFAULT_TRANSACTIONS_LIMIT,
            concurrent_requests_limit: DEFAULT_CONCURRENT_REQUESTS_LIMIT,
            dictionary_cache_capacity: DEFAULT_DICTIONARY_CACHE_CAPACITY,
        }
    }
}
