//! The fixed catalogue of workflows. Each workflow is plain data; the
//! letter and merge pipelines interpret it, so adding a variant never adds
//! a new branch of control flow.

use crate::utils::error::DocsError;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum Workflow {
    GetinAcceptance,
    GetinCompletion,
    InfonelAcceptance,
    InfonelCompletion,
    PaymentsMerge,
    InvoicesMerge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredInputs {
    TableAndTemplate,
    TwoTables,
}

#[derive(Debug, Clone, Copy)]
pub enum WorkflowKind {
    Letter(&'static LetterDefinition),
    Merge(&'static MergeSpec),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldTransform {
    /// Cell text as-is.
    Raw,
    TitleCase,
    /// Letters and whitespace only, then title case.
    CleanName,
    /// Parsed with the workflow's accepted formats, shown in its display format.
    Date,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub placeholder: &'static str,
    pub column: &'static str,
    pub transform: FieldTransform,
}

const fn field(placeholder: &'static str, column: &'static str, transform: FieldTransform) -> FieldRule {
    FieldRule {
        placeholder,
        column,
        transform,
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DateFormats {
    pub parse: &'static [&'static str],
    pub display: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdentifierScheme {
    pub prefix: &'static str,
    pub base: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rendition {
    None,
    Pdf,
}

#[derive(Debug)]
pub struct LetterDefinition {
    pub fields: &'static [FieldRule],
    /// Read when present; absence resolves to neutral pronouns.
    pub gender_column: Option<&'static str>,
    pub name_column: &'static str,
    pub dates: DateFormats,
    pub identifier: Option<IdentifierScheme>,
    /// Archive entry stem. Tokens: `{name}`, `{clean_name}`,
    /// `{certificate_id}`, `{sequence}`.
    pub filename_pattern: &'static str,
    pub rendition: Rendition,
}

impl LetterDefinition {
    /// Columns that must exist in the upload, in first-use order.
    pub fn required_columns(&self) -> Vec<&'static str> {
        let mut columns = vec![self.name_column];
        for rule in self.fields {
            if !columns.contains(&rule.column) {
                columns.push(rule.column);
            }
        }
        columns
    }
}

#[derive(Debug)]
pub struct TableSpec {
    pub label: &'static str,
    /// Number of banner rows above the real header.
    pub header_row: usize,
    /// (from, to) applied after headers are trimmed and lower-cased.
    pub renames: &'static [(&'static str, &'static str)],
}

#[derive(Debug)]
pub struct MergeSpec {
    pub primary: TableSpec,
    pub secondary: TableSpec,
    pub join_key: &'static str,
    /// Secondary columns (post-rename) carried into the result.
    pub secondary_columns: &'static [&'static str],
    /// Removed after the join when present.
    pub drop_columns: &'static [&'static str],
    pub output_file: &'static str,
}

const LONG_DATE: &str = "%d %B %Y";
const SLASH_DATE: &str = "%d/%m/%Y";

static GETIN_ACCEPTANCE: LetterDefinition = LetterDefinition {
    fields: &[
        field("name", "Name", FieldTransform::TitleCase),
        field("roll_no", "Roll No", FieldTransform::Raw),
        field("college", "College Name", FieldTransform::Raw),
        field("city", "City", FieldTransform::TitleCase),
        field("postal_code", "Postal Code", FieldTransform::Raw),
        field("position", "Position", FieldTransform::Raw),
        field("field", "Field", FieldTransform::Raw),
        field("location", "Location", FieldTransform::TitleCase),
        field("start_date", "Start Date", FieldTransform::Date),
        field("end_date", "End Date", FieldTransform::Date),
    ],
    gender_column: None,
    name_column: "Name",
    dates: DateFormats {
        parse: &[LONG_DATE],
        display: LONG_DATE,
    },
    identifier: None,
    filename_pattern: "{name}_Internship_Letter",
    rendition: Rendition::None,
};

static GETIN_COMPLETION: LetterDefinition = LetterDefinition {
    fields: &[
        field("name", "Name", FieldTransform::TitleCase),
        field("roll_no", "Roll No", FieldTransform::Raw),
        field("college", "College Name", FieldTransform::Raw),
        field("position", "Position", FieldTransform::Raw),
        field("start_date", "Start Date", FieldTransform::Date),
        field("end_date", "End Date", FieldTransform::Date),
    ],
    gender_column: Some("Gender"),
    name_column: "Name",
    dates: DateFormats {
        parse: &[LONG_DATE],
        display: LONG_DATE,
    },
    identifier: None,
    filename_pattern: "{name}_Completion_Certificate",
    rendition: Rendition::None,
};

static INFONEL_ACCEPTANCE: LetterDefinition = LetterDefinition {
    fields: &[
        field("name", "Name", FieldTransform::CleanName),
        field("roll_no", "Roll No", FieldTransform::Raw),
        field("college_name", "College Name", FieldTransform::Raw),
        field("college_location", "College Location", FieldTransform::Raw),
        field("college_pincode", "College Pincode", FieldTransform::Raw),
        field("position", "Position", FieldTransform::TitleCase),
        field("start_date", "Start Date", FieldTransform::Date),
        field("end_date", "End Date", FieldTransform::Date),
    ],
    gender_column: None,
    name_column: "Name",
    // exports from this team arrive in several layouts
    dates: DateFormats {
        parse: &[LONG_DATE, "%Y-%m-%d", SLASH_DATE, "%d-%m-%Y", "%Y-%m-%d %H:%M:%S"],
        display: SLASH_DATE,
    },
    identifier: Some(IdentifierScheme {
        prefix: "INT/VNR",
        base: 600,
    }),
    filename_pattern: "{clean_name}_Internship_Confirmation_{sequence}",
    rendition: Rendition::None,
};

static INFONEL_COMPLETION: LetterDefinition = LetterDefinition {
    fields: &[
        field("name", "Name", FieldTransform::TitleCase),
        field("roll_no", "Roll No", FieldTransform::Raw),
        field("college", "College Name", FieldTransform::Raw),
        field("position", "Position", FieldTransform::Raw),
        field("start_date", "Start Date", FieldTransform::Date),
        field("end_date", "End Date", FieldTransform::Date),
        field("work_description", "Work Description", FieldTransform::Raw),
    ],
    gender_column: None,
    name_column: "Name",
    dates: DateFormats {
        parse: &[LONG_DATE],
        display: LONG_DATE,
    },
    identifier: Some(IdentifierScheme {
        prefix: "INT/KVP",
        base: 501,
    }),
    filename_pattern: "{name}_{certificate_id}",
    rendition: Rendition::Pdf,
};

static PAYMENTS_MERGE: MergeSpec = MergeSpec {
    primary: TableSpec {
        label: "Payments Received",
        header_row: 1,
        renames: &[],
    },
    secondary: TableSpec {
        label: "Invoices Report",
        header_row: 1,
        renames: &[],
    },
    join_key: "invoice #",
    secondary_columns: &["branch"],
    drop_columns: &[],
    output_file: "Payments_Received_With_Branch.xlsx",
};

static INVOICES_MERGE: MergeSpec = MergeSpec {
    primary: TableSpec {
        label: "Invoices Report",
        header_row: 1,
        renames: &[("amount", "amount with tax")],
    },
    secondary: TableSpec {
        label: "Payments Received",
        header_row: 1,
        renames: &[("amount", "amount received"), ("date", "payment date")],
    },
    join_key: "invoice #",
    secondary_columns: &["amount received", "payment mode", "payment date"],
    drop_columns: &["customer id", "invoice id", "exchange rate"],
    output_file: "Invoices_With_Payments.xlsx",
};

impl Workflow {
    pub const ALL: [Workflow; 6] = [
        Workflow::GetinAcceptance,
        Workflow::GetinCompletion,
        Workflow::InfonelAcceptance,
        Workflow::InfonelCompletion,
        Workflow::PaymentsMerge,
        Workflow::InvoicesMerge,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Workflow::GetinAcceptance => "Getin - Intern Acceptance",
            Workflow::GetinCompletion => "Getin - Intern Completion Letter",
            Workflow::InfonelAcceptance => "Infonel - Intern Acceptance Letter",
            Workflow::InfonelCompletion => "Infonel - Intern Completion Letter",
            Workflow::PaymentsMerge => "Payments Report Merge",
            Workflow::InvoicesMerge => "Invoices Report Merge",
        }
    }

    pub fn slug(self) -> &'static str {
        match self {
            Workflow::GetinAcceptance => "getin-acceptance",
            Workflow::GetinCompletion => "getin-completion",
            Workflow::InfonelAcceptance => "infonel-acceptance",
            Workflow::InfonelCompletion => "infonel-completion",
            Workflow::PaymentsMerge => "payments-merge",
            Workflow::InvoicesMerge => "invoices-merge",
        }
    }

    pub fn definition(self) -> WorkflowKind {
        match self {
            Workflow::GetinAcceptance => WorkflowKind::Letter(&GETIN_ACCEPTANCE),
            Workflow::GetinCompletion => WorkflowKind::Letter(&GETIN_COMPLETION),
            Workflow::InfonelAcceptance => WorkflowKind::Letter(&INFONEL_ACCEPTANCE),
            Workflow::InfonelCompletion => WorkflowKind::Letter(&INFONEL_COMPLETION),
            Workflow::PaymentsMerge => WorkflowKind::Merge(&PAYMENTS_MERGE),
            Workflow::InvoicesMerge => WorkflowKind::Merge(&INVOICES_MERGE),
        }
    }

    pub fn required_inputs(self) -> RequiredInputs {
        match self.definition() {
            WorkflowKind::Letter(_) => RequiredInputs::TableAndTemplate,
            WorkflowKind::Merge(_) => RequiredInputs::TwoTables,
        }
    }

    /// Download name for letter archives, e.g.
    /// `Getin_-_Intern_Acceptance_Letters.zip`.
    pub fn archive_name(self) -> String {
        format!("{}_Letters.zip", self.display_name().replace(' ', "_"))
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Workflow {
    type Err = DocsError;

    /// Accepts either the slug or the display name, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Workflow::ALL
            .into_iter()
            .find(|w| w.slug().eq_ignore_ascii_case(wanted) || w.display_name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DocsError::UnknownWorkflow {
                name: wanted.to_string(),
            })
    }
}
