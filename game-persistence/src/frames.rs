use async_trait::async_trait;

/// Maps opaque object-storage keys to time-limited, publicly fetchable
/// URLs. Injected so the repositories stay storage-agnostic; the server
/// provides the production implementation.
#[async_trait]
pub trait FrameUrlSigner: Send + Sync {
    async fn presigned_urls(&self, keys: &[String]) -> Vec<String>;
}
