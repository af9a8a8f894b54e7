use crate::adapters::docx::DocxTemplate;
use crate::app::pipelines::{LetterPipeline, MergePipeline};
use crate::core::etl::EtlEngine;
use crate::core::request::{GenerationRequest, ValidatedRequest};
use crate::domain::model::OutputArtifact;
use crate::domain::ports::{Converter, Pipeline, Storage};
use crate::utils::error::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy)]
pub struct RunOptions {
    /// Produce PDF renditions for workflows that have them.
    pub renditions_enabled: bool,
    /// Stop after transformation and report what would be produced.
    pub dry_run: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            renditions_enabled: true,
            dry_run: false,
        }
    }
}

/// Where the produced file ended up.
#[derive(Debug, Clone, Serialize)]
pub struct Delivery {
    pub path: String,
    pub file_name: String,
    pub content_type: &'static str,
    pub size: usize,
}

#[derive(Debug)]
pub enum Outcome {
    Delivered(Delivery),
    Preview(serde_json::Value),
}

/// Validates a request, runs the matching workflow and hands the result to
/// storage.
pub struct Generator<S: Storage, C: Converter> {
    storage: S,
    converter: C,
    engine: DocxTemplate,
    options: RunOptions,
}

impl<S: Storage, C: Converter> Generator<S, C> {
    pub fn new(storage: S, converter: C, options: RunOptions) -> Result<Self> {
        Ok(Self {
            storage,
            converter,
            engine: DocxTemplate::new()?,
            options,
        })
    }

    pub async fn run(&self, request: GenerationRequest) -> Result<Outcome> {
        match request.validate()? {
            ValidatedRequest::Letter {
                workflow,
                definition,
                table,
                template,
                issue_date,
            } => {
                let pipeline = LetterPipeline::new(
                    workflow,
                    definition,
                    table,
                    template,
                    issue_date,
                    &self.engine,
                    &self.converter,
                    self.options.renditions_enabled,
                );
                self.drive(EtlEngine::new(pipeline)).await
            }
            ValidatedRequest::Merge {
                workflow,
                spec,
                primary,
                secondary,
            } => {
                let pipeline = MergePipeline::new(workflow, spec, primary, secondary);
                self.drive(EtlEngine::new(pipeline)).await
            }
        }
    }

    async fn drive<P: Pipeline>(&self, engine: EtlEngine<P>) -> Result<Outcome> {
        if self.options.dry_run {
            return Ok(Outcome::Preview(engine.dry_run().await?));
        }
        let artifact = engine.run().await?;
        Ok(Outcome::Delivered(self.deliver(artifact).await?))
    }

    async fn deliver(&self, artifact: OutputArtifact) -> Result<Delivery> {
        let path = self
            .storage
            .write_file(&artifact.file_name, &artifact.bytes)
            .await?;
        tracing::info!("💾 Saved {} ({} bytes)", path, artifact.bytes.len());

        Ok(Delivery {
            path,
            file_name: artifact.file_name,
            content_type: artifact.content_type,
            size: artifact.bytes.len(),
        })
    }
}
