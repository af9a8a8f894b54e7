use crate::domain::model::OutputArtifact;
use crate::domain::ports::Pipeline;
use crate::utils::error::Result;

/// Drives one pipeline through extract, transform and load, in that order.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<OutputArtifact> {
        let name = self.pipeline.name();
        tracing::info!("🚀 {}: starting", name);

        tracing::info!("📥 {}: extracting", name);
        let extracted = self.pipeline.extract().await?;

        tracing::info!("🔄 {}: transforming", name);
        let transformed = self.pipeline.transform(extracted).await?;

        tracing::info!("💾 {}: producing output", name);
        let artifact = self.pipeline.load(transformed).await?;

        tracing::info!(
            "✅ {}: produced {} ({} bytes)",
            name,
            artifact.file_name,
            artifact.bytes.len()
        );
        Ok(artifact)
    }

    /// Extract and transform only; returns what would be rendered.
    pub async fn dry_run(&self) -> Result<serde_json::Value> {
        let name = self.pipeline.name();
        tracing::info!("🔍 {}: dry run", name);

        let extracted = self.pipeline.extract().await?;
        let transformed = self.pipeline.transform(extracted).await?;
        self.pipeline.describe(&transformed)
    }
}
