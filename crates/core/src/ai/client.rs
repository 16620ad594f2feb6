//! Ollama client implementation for embedding operations

use crate::{
    config::OllamaConfig,
    error::{ArtVectorError, Result},
};
use reqwest::{Client, ClientBuilder};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Ollama client for interacting with the Ollama API
#[derive(Debug, Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a new Ollama client with the default timeout
    pub fn new(base_url: String) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(300))
    }

    /// Create a client with custom timeout
    pub fn with_timeout(base_url: String, timeout: Duration) -> Self {
        let client = ClientBuilder::new()
            .timeout(timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { client, base_url }
    }

    /// Create a client from the Ollama configuration section
    pub fn from_config(config: &OllamaConfig) -> Self {
        Self::with_timeout(
            config.url.clone(),
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Get the base URL of the Ollama server
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Check if the Ollama server is accessible
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(e) => {
                warn!("Ollama health check failed: {}", e);
                Ok(false)
            }
        }
    }

    /// List available models
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/api/tags", self.base_url);

        debug!("Fetching models from: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ArtVectorError::network(format!("Failed to fetch models: {}", e)))?;

        if !response.status().is_success() {
            return Err(ArtVectorError::embedding_model(format!(
                "Failed to list models: HTTP {}",
                response.status()
            )));
        }

        let models_response: ModelsResponse = response.json().await.map_err(|e| {
            ArtVectorError::embedding_model(format!("Failed to parse models response: {}", e))
        })?;

        Ok(models_response.models)
    }

    /// Check if a specific model is available
    pub async fn has_model(&self, model_name: &str) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| m.name.contains(model_name)))
    }

    /// Pull a model if not available
    pub async fn pull_model(&self, model_name: &str) -> Result<()> {
        let url = format!("{}/api/pull", self.base_url);

        info!("Pulling model: {}", model_name);

        let request = PullRequest {
            name: model_name.to_string(),
            stream: false,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ArtVectorError::network(format!("Failed to pull model: {}", e)))?;

        if !response.status().is_success() {
            return Err(ArtVectorError::embedding_model(format!(
                "Model pull failed: HTTP {}",
                response.status()
            )));
        }

        info!("Successfully pulled model: {}", model_name);
        Ok(())
    }

    /// Ensure a model is available, pulling if necessary
    pub async fn ensure_model(&self, model_name: &str) -> Result<()> {
        if !self.has_model(model_name).await? {
            self.pull_model(model_name).await?;
        }
        Ok(())
    }

    /// Generate an embedding for a single text
    ///
    /// # Errors
    ///
    /// Returns an embedding-model error if the request fails or the response
    /// does not contain a vector.
    pub async fn embed(&self, request: EmbedRequest) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);

        debug!("Generating embedding with model: {}", request.model);

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| ArtVectorError::network(format!("Failed to send embed request: {}", e)))?;

        if !response.status().is_success() {
            return Err(ArtVectorError::embedding_model(format!(
                "Embed request failed: HTTP {}",
                response.status()
            )));
        }

        let embed_response: EmbedResponse = response.json().await.map_err(|e| {
            ArtVectorError::embedding_model(format!("Failed to parse embed response: {}", e))
        })?;

        if embed_response.embedding.is_empty() {
            return Err(ArtVectorError::embedding_model("No embedding returned"));
        }

        Ok(embed_response.embedding)
    }

    /// Generate embeddings for multiple texts in one request
    ///
    /// Uses the batch `/api/embed` endpoint so a whole indexing batch costs a
    /// single round trip.
    ///
    /// # Errors
    ///
    /// Returns an embedding-model error if the request fails or the number of
    /// returned vectors differs from the number of inputs.
    pub async fn embed_batch(&self, model: &str, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/api/embed", self.base_url);

        debug!(
            "Generating {} embeddings with model: {}",
            texts.len(),
            model
        );

        let request = BatchEmbedRequest {
            model: model.to_string(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                ArtVectorError::network(format!("Failed to send batch embed request: {}", e))
            })?;

        if !response.status().is_success() {
            return Err(ArtVectorError::embedding_model(format!(
                "Batch embed request failed: HTTP {}",
                response.status()
            )));
        }

        let embed_response: BatchEmbedResponse = response.json().await.map_err(|e| {
            ArtVectorError::embedding_model(format!("Failed to parse batch embed response: {}", e))
        })?;

        if embed_response.embeddings.len() != texts.len() {
            return Err(ArtVectorError::embedding_model(format!(
                "Batch embed returned {} vectors for {} inputs",
                embed_response.embeddings.len(),
                texts.len()
            )));
        }

        Ok(embed_response.embeddings)
    }
}

/// Request for single-text embedding generation
#[derive(Debug, Clone, Serialize)]
pub struct EmbedRequest {
    /// Model name
    pub model: String,
    /// Text to embed
    pub prompt: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
struct BatchEmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Debug, Serialize)]
struct PullRequest {
    name: String,
    stream: bool,
}

/// Information about an available model
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    /// Model name (including tag)
    pub name: String,
    /// Model size in bytes
    #[serde(default)]
    pub size: u64,
}

#[derive(Debug, Deserialize)]
struct ModelsResponse {
    models: Vec<ModelInfo>,
}
