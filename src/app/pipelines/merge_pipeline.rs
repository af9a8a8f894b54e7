use crate::adapters::spreadsheet::{read_table, write_xlsx, ReadOptions};
use crate::core::join::{drop_columns, left_join, rename_columns, require_join_key, title_case_headers};
use crate::core::transform::check_required_columns;
use crate::domain::model::{InputFile, OutputArtifact, Table, XLSX_CONTENT_TYPE};
use crate::domain::ports::Pipeline;
use crate::domain::workflow::{MergeSpec, TableSpec, Workflow};
use crate::utils::error::Result;

/// Enriches one report with columns looked up from another.
pub struct MergePipeline {
    workflow: Workflow,
    spec: &'static MergeSpec,
    primary: InputFile,
    secondary: InputFile,
}

impl MergePipeline {
    pub fn new(
        workflow: Workflow,
        spec: &'static MergeSpec,
        primary: InputFile,
        secondary: InputFile,
    ) -> Self {
        Self {
            workflow,
            spec,
            primary,
            secondary,
        }
    }

    fn load_report(&self, file: &InputFile, table_spec: &TableSpec) -> Result<Table> {
        let mut table = read_table(
            file,
            ReadOptions {
                header_row: table_spec.header_row,
                fold_case: true,
            },
        )?;
        rename_columns(&mut table, table_spec.renames);
        require_join_key(&table, self.spec.join_key, table_spec.label)?;

        tracing::info!(
            "📥 {}: '{}' has {} row(s)",
            self.name(),
            table_spec.label,
            table.len()
        );
        Ok(table)
    }
}

#[async_trait::async_trait]
impl Pipeline for MergePipeline {
    type Extracted = (Table, Table);
    type Transformed = Table;

    fn name(&self) -> &str {
        self.workflow.display_name()
    }

    async fn extract(&self) -> Result<(Table, Table)> {
        let primary = self.load_report(&self.primary, &self.spec.primary)?;
        let secondary = self.load_report(&self.secondary, &self.spec.secondary)?;
        check_required_columns(&secondary, self.spec.secondary_columns, self.spec.secondary.label)?;
        Ok((primary, secondary))
    }

    async fn transform(&self, (primary, secondary): (Table, Table)) -> Result<Table> {
        let mut merged = left_join(
            &primary,
            &secondary,
            self.spec.join_key,
            self.spec.secondary_columns,
        );
        drop_columns(&mut merged, self.spec.drop_columns);
        title_case_headers(&mut merged);

        tracing::info!(
            "🔄 {}: {} row(s), {} column(s)",
            self.name(),
            merged.len(),
            merged.headers.len()
        );
        Ok(merged)
    }

    async fn load(&self, merged: Table) -> Result<OutputArtifact> {
        let bytes = write_xlsx(&merged)?;
        Ok(OutputArtifact {
            file_name: self.spec.output_file.to_string(),
            content_type: XLSX_CONTENT_TYPE,
            bytes,
        })
    }

    fn describe(&self, merged: &Table) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "workflow": self.name(),
            "output": self.spec.output_file,
            "columns": merged.headers,
            "rows": merged.len(),
        }))
    }
}
