use crate::domain::model::{OutputArtifact, TransformedContext};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Destination for produced artifacts. Returns where the file ended up.
pub trait Storage: Send + Sync {
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<String>> + Send;
}

/// Fills a template with one record's context. Every call starts from the
/// untouched template bytes.
pub trait TemplateEngine: Send + Sync {
    fn render(&self, template: &[u8], context: &TransformedContext) -> Result<Vec<u8>>;
}

/// Produces a fixed-layout (PDF) rendition of a rendered document.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, document_name: &str, document: &[u8]) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    type Extracted: Send;
    type Transformed: Send;

    fn name(&self) -> &str;
    async fn extract(&self) -> Result<Self::Extracted>;
    async fn transform(&self, data: Self::Extracted) -> Result<Self::Transformed>;
    async fn load(&self, result: Self::Transformed) -> Result<OutputArtifact>;

    /// JSON summary of a transform result, for dry runs.
    fn describe(&self, result: &Self::Transformed) -> Result<serde_json::Value>;
}
