use crate::adapters::spreadsheet::{read_table, ReadOptions};
use crate::core::transform::{build_jobs, check_required_columns};
use crate::domain::model::{InputFile, LetterJob, OutputArtifact, Table, ZIP_CONTENT_TYPE};
use crate::domain::ports::{Converter, Pipeline, TemplateEngine};
use crate::domain::workflow::{LetterDefinition, Rendition, Workflow};
use crate::utils::error::Result;
use chrono::NaiveDate;
use std::collections::HashSet;
use std::io::Write;
use zip::write::{SimpleFileOptions, ZipWriter};

/// One document per record, rendered from the uploaded template and packed
/// into a single archive.
pub struct LetterPipeline<'a, T: TemplateEngine, C: Converter> {
    workflow: Workflow,
    definition: &'static LetterDefinition,
    table: InputFile,
    template: InputFile,
    issue_date: NaiveDate,
    engine: &'a T,
    converter: &'a C,
    renditions_enabled: bool,
}

impl<'a, T: TemplateEngine, C: Converter> LetterPipeline<'a, T, C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        workflow: Workflow,
        definition: &'static LetterDefinition,
        table: InputFile,
        template: InputFile,
        issue_date: NaiveDate,
        engine: &'a T,
        converter: &'a C,
        renditions_enabled: bool,
    ) -> Self {
        Self {
            workflow,
            definition,
            table,
            template,
            issue_date,
            engine,
            converter,
            renditions_enabled,
        }
    }

    fn wants_rendition(&self) -> bool {
        self.definition.rendition == Rendition::Pdf && self.renditions_enabled
    }
}

/// Appends `_2`, `_3`, … to a stem already used in this archive.
fn unique_stem(used: &mut HashSet<String>, stem: &str) -> String {
    if used.insert(stem.to_string()) {
        return stem.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{}_{}", stem, n);
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

#[async_trait::async_trait]
impl<'a, T: TemplateEngine, C: Converter> Pipeline for LetterPipeline<'a, T, C> {
    type Extracted = Table;
    type Transformed = Vec<LetterJob>;

    fn name(&self) -> &str {
        self.workflow.display_name()
    }

    async fn extract(&self) -> Result<Table> {
        let table = read_table(&self.table, ReadOptions::default())?;
        check_required_columns(&table, &self.definition.required_columns(), &self.table.name)?;

        tracing::info!("📥 {}: {} record(s) in {}", self.name(), table.len(), self.table.name);
        if table.is_empty() {
            tracing::warn!("🔶 {}: {} has no data rows", self.name(), self.table.name);
        }
        Ok(table)
    }

    async fn transform(&self, data: Table) -> Result<Vec<LetterJob>> {
        let jobs = build_jobs(self.definition, self.issue_date, &data)?;
        tracing::info!("🔄 {}: prepared {} letter(s)", self.name(), jobs.len());
        Ok(jobs)
    }

    async fn load(&self, jobs: Vec<LetterJob>) -> Result<OutputArtifact> {
        let with_rendition = self.wants_rendition();
        if self.definition.rendition == Rendition::Pdf && !with_rendition {
            tracing::warn!("🔶 {}: PDF renditions disabled by configuration", self.name());
        }

        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        let mut used = HashSet::new();

        // strictly in input order; one render and one conversion at a time
        for (index, job) in jobs.iter().enumerate() {
            let document = self.engine.render(&self.template.bytes, &job.context)?;
            let stem = unique_stem(&mut used, &job.file_stem);
            let document_name = format!("{}.docx", stem);

            tracing::debug!("📝 {}: {}/{} {}", self.name(), index + 1, jobs.len(), document_name);

            let rendition = if with_rendition {
                Some(self.converter.convert(&document_name, &document).await?)
            } else {
                None
            };

            zip.start_file(document_name.as_str(), options)?;
            zip.write_all(&document)?;

            if let Some(pdf) = rendition {
                zip.start_file(format!("{}.pdf", stem), options)?;
                zip.write_all(&pdf)?;
            }
        }

        let bytes = zip.finish()?.into_inner();
        Ok(OutputArtifact {
            file_name: self.workflow.archive_name(),
            content_type: ZIP_CONTENT_TYPE,
            bytes,
        })
    }

    fn describe(&self, jobs: &Vec<LetterJob>) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "workflow": self.name(),
            "archive": self.workflow.archive_name(),
            "pdf_renditions": self.wants_rendition(),
            "letters": serde_json::to_value(jobs)?,
        }))
    }
}
