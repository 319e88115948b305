use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient {
    /// Produce an embedding vector for each supplied text.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;

    /// Dimensionality of the vectors this client produces.
    fn dimension(&self) -> usize;
}

/// Content-independent embedder that returns an all-zero vector for every input.
///
/// It only demonstrates the shape the index expects. Similarity between its vectors carries no
/// meaning, so any query against them returns arbitrarily ordered matches.
pub struct PlaceholderEmbedder {
    dimension: usize,
}

impl PlaceholderEmbedder {
    /// Construct a placeholder embedder producing vectors of `dimension` components.
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl EmbeddingClient for PlaceholderEmbedder {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if self.dimension == 0 {
            return Err(EmbeddingClientError::GenerationFailed(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }

        if texts.is_empty() {
            return Err(EmbeddingClientError::GenerationFailed(
                "no texts provided".to_string(),
            ));
        }

        tracing::debug!(
            inputs = texts.len(),
            dimension = self.dimension,
            "Generating placeholder embeddings"
        );

        Ok(texts
            .iter()
            .map(|_| vec![0.0_f32; self.dimension])
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Build the embedding client used by the index backend.
pub fn get_embedding_client(dimension: usize) -> Box<dyn EmbeddingClient + Send + Sync> {
    Box::new(PlaceholderEmbedder::new(dimension))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn placeholder_vectors_are_zero_filled() {
        let client = get_embedding_client(1536);
        let vectors = client
            .generate_embeddings(vec!["a.pdf".into(), "a different text".into()])
            .await
            .expect("embeddings");

        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors[0].len(), 1536);
        assert!(vectors.iter().flatten().all(|value| *value == 0.0));
        assert_eq!(vectors[0], vectors[1]);
    }

    #[tokio::test]
    async fn rejects_empty_input_and_zero_dimension() {
        let client = PlaceholderEmbedder::new(8);
        assert!(client.generate_embeddings(Vec::new()).await.is_err());

        let degenerate = PlaceholderEmbedder::new(0);
        assert!(
            degenerate
                .generate_embeddings(vec!["x".into()])
                .await
                .is_err()
        );
    }
}
