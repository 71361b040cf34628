use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::env;

/// Embedding service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding provider (ollama or mock)
    pub provider: String,

    /// Model name to use for embeddings
    pub model: String,

    /// Base URL for the embedding service
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            model: "embeddinggemma".to_string(),
            base_url: "http://localhost:11434".to_string(),
            timeout_seconds: 60,
        }
    }
}

impl EmbeddingConfig {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let mut config = Self::default();

        if let Ok(provider) = env::var("EMBEDDING_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = env::var("EMBEDDING_MODEL") {
            config.model = model;
        }

        if let Ok(base_url) = env::var("OLLAMA_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(timeout) = env::var("EMBEDDING_TIMEOUT_SECONDS") {
            config.timeout_seconds = timeout
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid EMBEDDING_TIMEOUT_SECONDS: {}", e))?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // from_env reads process-global state; tests touching it take this lock.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("EMBEDDING_PROVIDER");
        env::remove_var("EMBEDDING_MODEL");
        env::remove_var("OLLAMA_BASE_URL");
        env::remove_var("EMBEDDING_TIMEOUT_SECONDS");
    }

    #[test]
    fn test_defaults() {
        let config = EmbeddingConfig::default();
        assert_eq!(config.provider, "ollama");
        assert_eq!(config.model, "embeddinggemma");
        assert_eq!(config.base_url, "http://localhost:11434");
        assert_eq!(config.timeout_seconds, 60);
    }

    #[test]
    fn test_env_overrides_apply() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("EMBEDDING_PROVIDER", "mock");
        env::set_var("EMBEDDING_MODEL", "nomic-embed-text");
        env::set_var("OLLAMA_BASE_URL", "http://10.0.0.5:11434");
        env::set_var("EMBEDDING_TIMEOUT_SECONDS", "5");

        let config = EmbeddingConfig::from_env();
        clear_env();

        let config = config.unwrap();
        assert_eq!(config.provider, "mock");
        assert_eq!(config.model, "nomic-embed-text");
        assert_eq!(config.base_url, "http://10.0.0.5:11434");
        assert_eq!(config.timeout_seconds, 5);
    }

    #[test]
    fn test_from_env_without_overrides_matches_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();

        let config = EmbeddingConfig::from_env().unwrap();
        assert_eq!(config, EmbeddingConfig::default());
    }

    #[test]
    fn test_invalid_timeout_is_an_error() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_env();
        env::set_var("EMBEDDING_TIMEOUT_SECONDS", "not-a-number");

        let result = EmbeddingConfig::from_env();
        clear_env();

        assert!(result.is_err());
    }
}
