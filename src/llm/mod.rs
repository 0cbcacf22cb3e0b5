pub mod qianfan;

pub use qianfan::QianfanClient;

/// Boundary to the external text-generation service. Implementations
/// return the raw assistant message on success; every transport problem,
/// non-2xx status, or unusable response envelope comes back as `Err` —
/// nothing panics past this seam.
#[async_trait::async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> anyhow::Result<String>;
    fn name(&self) -> &str;
}
