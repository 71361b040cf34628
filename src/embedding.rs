use std::io::Cursor;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::EmbeddingConfig;

#[derive(Debug, Clone)]
pub struct SimpleEmbedder {
    client: Client,
    model: String,
    base_url: String,
    provider: EmbeddingProvider,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EmbeddingProvider {
    Ollama,
    Mock, // For testing
}

// Ollama embed API request/response structures
#[derive(Debug, Serialize)]
struct OllamaEmbedRequest {
    model: String,
    input: String,
}

#[derive(Debug, Deserialize)]
struct OllamaEmbedResponse {
    embeddings: EmbeddingRows,
}

/// Ollama has returned both a list of vectors and a single flat vector for
/// one-input requests. Both shapes are accepted as an explicit branch rather
/// than sniffed dynamically.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmbeddingRows {
    Nested(Vec<Vec<f32>>),
    Flat(Vec<f32>),
}

impl SimpleEmbedder {
    pub fn new_ollama(base_url: String, model: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            model,
            base_url,
            provider: EmbeddingProvider::Ollama,
        }
    }

    pub fn new_mock() -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            model: "mock-model".to_string(),
            base_url: "http://mock:11434".to_string(),
            provider: EmbeddingProvider::Mock,
        }
    }

    pub fn from_config(config: &EmbeddingConfig) -> Self {
        if config.provider == "mock" {
            return Self::new_mock();
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
            provider: EmbeddingProvider::Ollama,
        }
    }

    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Embed a single image file: decode, re-encode to PNG in memory, base64
    /// the bytes, and submit as the embed input.
    pub async fn embed_image(&self, path: &Path) -> Result<Vec<f32>> {
        let payload = encode_image_base64(path)?;
        debug!(
            "Encoded {} to a {} byte base64 payload",
            path.display(),
            payload.len()
        );
        self.embed_input(&payload).await
    }

    /// Generate an embedding for an already-encoded input string.
    pub async fn embed_input(&self, input: &str) -> Result<Vec<f32>> {
        match self.provider {
            EmbeddingProvider::Ollama => self.ollama_embed(input).await,
            EmbeddingProvider::Mock => self.mock_embed(input),
        }
    }

    async fn ollama_embed(&self, input: &str) -> Result<Vec<f32>> {
        let request = OllamaEmbedRequest {
            model: self.model.clone(),
            input: input.to_string(),
        };

        let response = self
            .client
            .post(format!("{}/api/embed", self.base_url))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(anyhow::anyhow!(
                "Ollama API request failed with status {}: {}",
                status,
                error_text
            ));
        }

        let embed_response: OllamaEmbedResponse = response
            .json()
            .await
            .context("Failed to parse Ollama embed response")?;

        match embed_response.embeddings {
            // Single-image convention: the first row is the result.
            EmbeddingRows::Nested(rows) => rows
                .into_iter()
                .next()
                .ok_or_else(|| anyhow::anyhow!("No embeddings in Ollama response")),
            EmbeddingRows::Flat(vector) => Ok(vector),
        }
    }

    fn mock_embed(&self, input: &str) -> Result<Vec<f32>> {
        // Deterministic embedding derived from the input content, useful for
        // testing without a running embedding service.
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        input.hash(&mut hasher);
        let hash = hasher.finish();

        let dimensions = self.embedding_dimension();
        let mut embedding = Vec::with_capacity(dimensions);

        let mut seed = hash;
        for _ in 0..dimensions {
            seed = seed.wrapping_mul(1103515245).wrapping_add(12345);
            let value = ((seed >> 16) % 1000) as f32 / 1000.0 - 0.5; // -0.5 to 0.5
            embedding.push(value);
        }

        // Normalize to unit length
        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for val in &mut embedding {
                *val /= magnitude;
            }
        }

        Ok(embedding)
    }

    /// Get the dimension of embeddings for this model
    pub fn embedding_dimension(&self) -> usize {
        match self.provider {
            EmbeddingProvider::Ollama => match self.model.as_str() {
                "embeddinggemma" => 768,
                "nomic-embed-text" => 768,
                "mxbai-embed-large" => 1024,
                "all-minilm" => 384,
                _ => 768, // Default dimension for many embedding models
            },
            EmbeddingProvider::Mock => 768,
        }
    }

    /// Get the provider type
    pub fn provider(&self) -> &EmbeddingProvider {
        &self.provider
    }
}

/// Decode an image from disk and re-encode it losslessly as PNG in memory,
/// then base64-encode the PNG bytes for transmission.
pub fn encode_image_base64(path: &Path) -> Result<String> {
    let img =
        image::open(path).with_context(|| format!("Failed to open image {}", path.display()))?;

    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, image::ImageFormat::Png)
        .with_context(|| format!("Failed to re-encode image {}", path.display()))?;

    Ok(STANDARD.encode(buffer.get_ref()))
}
