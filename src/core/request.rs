use crate::domain::model::InputFile;
use crate::domain::workflow::{LetterDefinition, MergeSpec, Workflow, WorkflowKind};
use crate::utils::error::{DocsError, Result};
use chrono::NaiveDate;

/// Everything one run needs, captured before any transformation starts.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub workflow: Workflow,
    pub table: Option<InputFile>,
    pub template: Option<InputFile>,
    pub primary: Option<InputFile>,
    pub secondary: Option<InputFile>,
    /// Shown as `date` in every letter.
    pub issue_date: NaiveDate,
}

impl GenerationRequest {
    pub fn new(workflow: Workflow, issue_date: NaiveDate) -> Self {
        Self {
            workflow,
            table: None,
            template: None,
            primary: None,
            secondary: None,
            issue_date,
        }
    }

    pub fn with_table(mut self, file: InputFile) -> Self {
        self.table = Some(file);
        self
    }

    pub fn with_template(mut self, file: InputFile) -> Self {
        self.template = Some(file);
        self
    }

    pub fn with_primary(mut self, file: InputFile) -> Self {
        self.primary = Some(file);
        self
    }

    pub fn with_secondary(mut self, file: InputFile) -> Self {
        self.secondary = Some(file);
        self
    }

    /// Resolves the workflow and checks that the uploads it needs are there.
    /// Missing uploads are all named in one warning.
    pub fn validate(self) -> Result<ValidatedRequest> {
        match self.workflow.definition() {
            WorkflowKind::Letter(definition) => match (self.table, self.template) {
                (Some(table), Some(template)) => Ok(ValidatedRequest::Letter {
                    workflow: self.workflow,
                    definition,
                    table,
                    template,
                    issue_date: self.issue_date,
                }),
                (table, template) => Err(missing(&[
                    (table.is_none(), "Excel file"),
                    (template.is_none(), "Word template (DOCX)"),
                ])),
            },
            WorkflowKind::Merge(spec) => match (self.primary, self.secondary) {
                (Some(primary), Some(secondary)) => Ok(ValidatedRequest::Merge {
                    workflow: self.workflow,
                    spec,
                    primary,
                    secondary,
                }),
                (primary, secondary) => {
                    let primary_label = format!("'{}' report", spec.primary.label);
                    let secondary_label = format!("'{}' report", spec.secondary.label);
                    Err(missing(&[
                        (primary.is_none(), primary_label.as_str()),
                        (secondary.is_none(), secondary_label.as_str()),
                    ]))
                }
            },
        }
    }
}

fn missing(inputs: &[(bool, &str)]) -> DocsError {
    let names: Vec<&str> = inputs
        .iter()
        .filter(|(absent, _)| *absent)
        .map(|(_, name)| *name)
        .collect();
    DocsError::MissingInputError {
        input: names.join(" and "),
    }
}

#[derive(Debug)]
pub enum ValidatedRequest {
    Letter {
        workflow: Workflow,
        definition: &'static LetterDefinition,
        table: InputFile,
        template: InputFile,
        issue_date: NaiveDate,
    },
    Merge {
        workflow: Workflow,
        spec: &'static MergeSpec,
        primary: InputFile,
        secondary: InputFile,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn test_letter_request_needs_template() {
        let err = GenerationRequest::new(Workflow::GetinAcceptance, today())
            .with_table(InputFile::new("interns.xlsx", vec![]))
            .validate()
            .unwrap_err();
        assert!(err.is_warning());
        assert!(matches!(err, DocsError::MissingInputError { ref input } if input == "Word template (DOCX)"));
    }

    #[test]
    fn test_merge_request_names_both_missing_reports() {
        let err = GenerationRequest::new(Workflow::PaymentsMerge, today())
            .validate()
            .unwrap_err();
        match err {
            DocsError::MissingInputError { input } => {
                assert_eq!(input, "'Payments Received' report and 'Invoices Report' report");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_letter_uploads_ignored_for_merge() {
        let err = GenerationRequest::new(Workflow::InvoicesMerge, today())
            .with_table(InputFile::new("interns.xlsx", vec![]))
            .with_template(InputFile::new("letter.docx", vec![]))
            .validate()
            .unwrap_err();
        assert!(matches!(err, DocsError::MissingInputError { .. }));
    }

    #[test]
    fn test_complete_letter_request() {
        let validated = GenerationRequest::new(Workflow::InfonelCompletion, today())
            .with_table(InputFile::new("interns.csv", vec![]))
            .with_template(InputFile::new("letter.docx", vec![]))
            .validate()
            .unwrap();
        assert!(matches!(
            validated,
            ValidatedRequest::Letter {
                workflow: Workflow::InfonelCompletion,
                ..
            }
        ));
    }
}
