//! Type-safe builder for `EngineConfig` using the typestate pattern: the
//! `database_url` field must be supplied before `build()` is available.

use std::marker::PhantomData;

use anyhow::{anyhow, Result};

use crate::utils::constants::{
    DEFAULT_CONCURRENT_REQUESTS_LIMIT, DEFAULT_DICTIONARY_CACHE_CAPACITY, DEFAULT_FETCH_RETRIES,
    DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_TRANSACTIONS_LIMIT, DEFAULT_USER_AGENT,
    DEFAULT_WAIT_FOR_SECS,
};

use super::types::EngineConfig;

pub struct WithDatabaseUrl;

pub struct EngineConfigBuilder<State = ()> {
    database_url: Option<String>,
    user_agent: String,
    fetch_timeout_secs: u64,
    fetch_retries: u8,
    wait_for_secs: u64,
    transactions_limit: u32,
    concurrent_requests_limit: usize,
    dictionary_cache_capacity: usize,
    _phantom: PhantomData<State>,
}

impl Default for EngineConfigBuilder<()> {
    fn default() -> Self {
        Self {
            database_url: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            fetch_retries: DEFAULT_FETCH_RETRIES,
            wait_for_secs: DEFAULT_WAIT_FOR_SECS,
            transactions_limit: DEFAULT_TRANSACTIONS_LIMIT,
            concurrent_requests_limit: DEFAULT_CONCURRENT_REQUESTS_LIMIT,
            dictionary_cache_capacity: DEFAULT_DICTIONARY_CACHE_CAPACITY,
            _phantom: PhantomData,
        }
    }
}

impl EngineConfigBuilder<()> {
    pub fn database_url(self, url: impl Into<String>) -> EngineConfigBuilder<WithDatabaseUrl> {
        EngineConfigBuilder {
            database_url: Some(url.into()),
            user_agent: self.user_agent,
            fetch_timeout_secs: self.fetch_timeout_secs,
            fetch_retries: self.fetch_retries,
            wait_for_secs: self.wait_for_secs,
            transactions_limit: self.transactions_limit,
            concurrent_requests_limit: self.concurrent_requests_limit,
            dictionary_cache_capacity: self.dictionary_cache_capacity,
            _phantom: PhantomData,
        }
    }
}

// Available at every builder state; none of these gate `build()`.
impl<State> EngineConfigBuilder<State> {
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    #[must_use]
    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.fetch_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn fetch_retries(mut self, retries: u8) -> Self {
        self.fetch_retries = retries;
        self
    }

    #[must_use]
    pub fn wait_for_secs(mut self, secs: u64) -> Self {
        self.wait_for_secs = secs;
        self
    }

    /// Rolling daily write budget per scheduler (§4.H "Per-day counter").
    #[must_use]
    pub fn transactions_limit(mut self, limit: u32) -> Self {
        self.transactions_limit = limit;
        self
    }

    #[must_use]
    pub fn concurrent_requests_limit(mut self, limit: usize) -> Self {
        self.concurrent_requests_limit = limit;
        self
    }

    #[must_use]
    pub fn dictionary_cache_capacity(mut self, capacity: usize) -> Self {
        self.dictionary_cache_capacity = capacity;
        self
    }
}

impl EngineConfigBuilder<WithDatabaseUrl> {
    pub fn build(self) -> Result<EngineConfig> {
        Ok(EngineConfig {
            database_url: self
                .database_url
                .ok_or_else(|| anyhow!("database_url is required"))?,
            user_agent: self.user_agent,
            fetch_timeout_secs: self.fetch_timeout_secs,
            fetch_retries: self.fetch_retries,
            wait_for_secs: self.wait_for_secs,
            transactions_limit: self.transactions_limit,
            concurrent_requests_limit: self.concurrent_requests_limit,
            dictionary_cache_capacity: self.dictionary_cache_capacity,
        })
    }
}
