//! Field-level rules shared by every letter workflow.

use crate::domain::model::{Cell, LetterJob, Record, Table, TransformedContext};
use crate::domain::workflow::{DateFormats, FieldTransform, IdentifierScheme, LetterDefinition};
use crate::utils::error::{DocsError, Result};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pronouns {
    pub subject: &'static str,
    pub object: &'static str,
    pub possessive: &'static str,
}

pub const HE: Pronouns = Pronouns {
    subject: "he",
    object: "him",
    possessive: "his",
};

pub const SHE: Pronouns = Pronouns {
    subject: "she",
    object: "her",
    possessive: "her",
};

pub const THEY: Pronouns = Pronouns {
    subject: "they",
    object: "them",
    possessive: "their",
};

/// Total: anything other than male/female (any case) is neutral.
pub fn resolve_pronouns(gender: Option<&Cell>) -> Pronouns {
    match gender {
        Some(Cell::Text(value)) => {
            let value = value.trim();
            if value.eq_ignore_ascii_case("male") {
                HE
            } else if value.eq_ignore_ascii_case("female") {
                SHE
            } else {
                THEY
            }
        }
        _ => THEY,
    }
}

/// Upper-cases the first letter of each word and lower-cases the rest. Words
/// start at the beginning of the string, after whitespace, or after a hyphen.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;

    for ch in value.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                out.extend(ch.to_uppercase());
            } else {
                out.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(ch);
            if ch.is_whitespace() || ch == '-' {
                at_word_start = true;
            }
        }
    }

    out
}

pub fn clean_name(value: &str) -> String {
    let letters: String = value
        .chars()
        .filter(|c| c.is_alphabetic() || c.is_whitespace())
        .collect();
    title_case(letters.trim())
}

/// `INT/KVP` with base 501 gives `INT/KVP501` for index 0. Width grows past
/// three digits instead of truncating.
pub fn identifier(scheme: &IdentifierScheme, index: usize) -> String {
    format!("{}{:03}", scheme.prefix, sequence_number(scheme, index))
}

pub fn sequence_number(scheme: &IdentifierScheme, index: usize) -> u64 {
    u64::from(scheme.base) + index as u64
}

pub fn parse_date(
    cell: Option<&Cell>,
    formats: &DateFormats,
    column: &str,
    row: usize,
) -> Result<NaiveDate> {
    let text = match cell {
        Some(Cell::Date(dt)) => return Ok(dt.date()),
        Some(other) => other.display(),
        None => String::new(),
    };
    let text = text.trim();

    for format in formats.parse {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Ok(date);
        }
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, format) {
            return Ok(dt.date());
        }
    }

    Err(DocsError::DateParseError {
        column: column.to_string(),
        row,
        value: text.to_string(),
        expected: formats.parse.join(" | "),
    })
}

pub fn format_date(date: NaiveDate, display: &str) -> String {
    date.format(display).to_string()
}

/// Fails with the first required column that the table lacks.
pub fn check_required_columns(table: &Table, columns: &[&str], table_label: &str) -> Result<()> {
    match columns.iter().find(|column| !table.has_column(column)) {
        Some(missing) => Err(DocsError::MissingColumnError {
            column: (*missing).to_string(),
            table: table_label.to_string(),
        }),
        None => Ok(()),
    }
}

fn cell_text(record: &Record, column: &str) -> String {
    record.get(column).map(Cell::display).unwrap_or_default()
}

fn filename_token(value: &str) -> String {
    value
        .trim()
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

/// Builds the context and archive stem for the record at `index`. `row` in
/// errors is 1-based to match what the operator sees in the spreadsheet body.
pub fn build_job(
    definition: &LetterDefinition,
    issue_date: NaiveDate,
    index: usize,
    record: &Record,
) -> Result<LetterJob> {
    let row = index + 1;
    let mut context = TransformedContext::default();
    context.insert("date", format_date(issue_date, "%d/%m/%Y"));

    for rule in definition.fields {
        let value = match rule.transform {
            FieldTransform::Raw => cell_text(record, rule.column),
            FieldTransform::TitleCase => title_case(&cell_text(record, rule.column)),
            FieldTransform::CleanName => clean_name(&cell_text(record, rule.column)),
            FieldTransform::Date => {
                let date = parse_date(record.get(rule.column), &definition.dates, rule.column, row)?;
                format_date(date, definition.dates.display)
            }
        };
        context.insert(rule.placeholder, value);
    }

    if let Some(gender_column) = definition.gender_column {
        let pronouns = resolve_pronouns(record.get(gender_column));
        context.insert("pronoun_subject", pronouns.subject);
        context.insert("pronoun_object", pronouns.object);
        context.insert("pronoun_possessive", pronouns.possessive);
    }

    let raw_name = cell_text(record, definition.name_column);
    let mut stem = definition
        .filename_pattern
        .replace("{name}", &filename_token(&raw_name))
        .replace("{clean_name}", &filename_token(&clean_name(&raw_name)));

    if let Some(scheme) = &definition.identifier {
        let certificate_id = identifier(scheme, index);
        stem = stem
            .replace("{certificate_id}", &filename_token(&certificate_id))
            .replace("{sequence}", &sequence_number(scheme, index).to_string());
        context.insert("certificate_id", certificate_id);
    }

    Ok(LetterJob {
        file_stem: stem,
        context,
    })
}

/// Transforms every record in input order. The first failure aborts the run.
pub fn build_jobs(definition: &LetterDefinition, issue_date: NaiveDate, table: &Table) -> Result<Vec<LetterJob>> {
    table
        .records
        .iter()
        .enumerate()
        .map(|(index, record)| build_job(definition, issue_date, index, record))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::workflow::{Workflow, WorkflowKind};

    fn letter(workflow: Workflow) -> &'static LetterDefinition {
        match workflow.definition() {
            WorkflowKind::Letter(def) => def,
            WorkflowKind::Merge(_) => panic!("{} is not a letter workflow", workflow),
        }
    }

    fn issue_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn record(pairs: &[(&str, &str)]) -> Record {
        Record {
            data: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), Cell::text(*v)))
                .collect(),
        }
    }

    #[test]
    fn test_pronouns_case_insensitive() {
        for gender in ["Male", "MALE", "male", " male "] {
            assert_eq!(resolve_pronouns(Some(&Cell::text(gender))), HE);
        }
        for gender in ["Female", "FEMALE", "female"] {
            assert_eq!(resolve_pronouns(Some(&Cell::text(gender))), SHE);
        }
    }

    #[test]
    fn test_pronouns_default_to_neutral() {
        assert_eq!(resolve_pronouns(None), THEY);
        assert_eq!(resolve_pronouns(Some(&Cell::Empty)), THEY);
        assert_eq!(resolve_pronouns(Some(&Cell::Number(1.0))), THEY);
        assert_eq!(resolve_pronouns(Some(&Cell::text(""))), THEY);
        assert_eq!(resolve_pronouns(Some(&Cell::text("non-binary"))), THEY);
        assert_eq!(resolve_pronouns(Some(&Cell::text("males"))), THEY);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("asha RAO"), "Asha Rao");
        assert_eq!(title_case("mary-jane watson"), "Mary-Jane Watson");
        assert_eq!(title_case("it's  NEW delhi"), "It's  New Delhi");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("o'brien123"), "Obrien");
        assert_eq!(clean_name("  ravi kumar.  "), "Ravi Kumar");
        assert_eq!(clean_name("J. R. R. tolkien"), "J R R Tolkien");
    }

    #[test]
    fn test_identifier_sequence() {
        let scheme = IdentifierScheme {
            prefix: "INT/KVP",
            base: 501,
        };
        let ids: Vec<String> = (0..3).map(|i| identifier(&scheme, i)).collect();
        assert_eq!(ids, vec!["INT/KVP501", "INT/KVP502", "INT/KVP503"]);

        let small = IdentifierScheme { prefix: "X", base: 7 };
        assert_eq!(identifier(&small, 0), "X007");
        assert_eq!(identifier(&small, 993), "X1000");
    }

    #[test]
    fn test_date_round_trip() {
        let formats = DateFormats {
            parse: &["%d %B %Y"],
            display: "%d/%m/%Y",
        };
        let date = parse_date(Some(&Cell::text("05 January 2024")), &formats, "Start Date", 1).unwrap();
        assert_eq!(format_date(date, formats.display), "05/01/2024");
    }

    #[test]
    fn test_date_cells_skip_parsing() {
        let formats = DateFormats {
            parse: &["%d %B %Y"],
            display: "%d %B %Y",
        };
        let dt = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let date = parse_date(Some(&Cell::Date(dt)), &formats, "End Date", 1).unwrap();
        assert_eq!(format_date(date, formats.display), "29 February 2024");
    }

    #[test]
    fn test_date_mismatch_reports_row_and_column() {
        let formats = DateFormats {
            parse: &["%d %B %Y"],
            display: "%d %B %Y",
        };
        let err = parse_date(Some(&Cell::text("2024-01-05")), &formats, "Start Date", 4).unwrap_err();
        match err {
            DocsError::DateParseError { column, row, value, .. } => {
                assert_eq!(column, "Start Date");
                assert_eq!(row, 4);
                assert_eq!(value, "2024-01-05");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_getin_completion_context() {
        let rec = record(&[
            ("Name", "asha rao"),
            ("Roll No", "21A91A0501"),
            ("College Name", "Aditya Engineering College"),
            ("Position", "Web Developer Intern"),
            ("Start Date", "01 May 2024"),
            ("End Date", "30 June 2024"),
            ("Gender", "Female"),
        ]);
        let job = build_job(letter(Workflow::GetinCompletion), issue_date(), 0, &rec).unwrap();

        assert_eq!(job.file_stem, "asha_rao_Completion_Certificate");
        assert_eq!(job.context.get("date"), Some("03/06/2024"));
        assert_eq!(job.context.get("name"), Some("Asha Rao"));
        assert_eq!(job.context.get("start_date"), Some("01 May 2024"));
        assert_eq!(job.context.get("pronoun_subject"), Some("she"));
        assert_eq!(job.context.get("pronoun_possessive"), Some("her"));
    }

    #[test]
    fn test_getin_completion_without_gender_column() {
        let rec = record(&[
            ("Name", "Kiran"),
            ("Roll No", "7"),
            ("College Name", "GVP"),
            ("Position", "Analyst"),
            ("Start Date", "01 May 2024"),
            ("End Date", "30 June 2024"),
        ]);
        let job = build_job(letter(Workflow::GetinCompletion), issue_date(), 0, &rec).unwrap();
        assert_eq!(job.context.get("pronoun_subject"), Some("they"));
        assert_eq!(job.context.get("pronoun_object"), Some("them"));
    }

    #[test]
    fn test_infonel_acceptance_uses_clean_name_and_sequence() {
        let rec = record(&[
            ("Name", "p. sai teja!"),
            ("Roll No", "20B01"),
            ("College Name", "VNR VJIET"),
            ("College Location", "Hyderabad"),
            ("College Pincode", "500090"),
            ("Position", "data analyst"),
            ("Start Date", "2024-07-01"),
            ("End Date", "15 August 2024"),
        ]);
        let job = build_job(letter(Workflow::InfonelAcceptance), issue_date(), 2, &rec).unwrap();

        assert_eq!(job.context.get("certificate_id"), Some("INT/VNR602"));
        assert_eq!(job.context.get("name"), Some("P Sai Teja"));
        assert_eq!(job.context.get("position"), Some("Data Analyst"));
        assert_eq!(job.context.get("start_date"), Some("01/07/2024"));
        assert_eq!(job.context.get("end_date"), Some("15/08/2024"));
        assert_eq!(job.file_stem, "P_Sai_Teja_Internship_Confirmation_602");
    }

    #[test]
    fn test_infonel_acceptance_slash_dates_are_day_first() {
        let rec = record(&[
            ("Name", "Asha Rao"),
            ("Roll No", "1"),
            ("College Name", "VNR VJIET"),
            ("College Location", "Hyderabad"),
            ("College Pincode", "500090"),
            ("Position", "intern"),
            ("Start Date", "03/06/2024"),
            ("End Date", "13/07/2024"),
        ]);
        let job = build_job(letter(Workflow::InfonelAcceptance), issue_date(), 0, &rec).unwrap();
        assert_eq!(job.context.get("start_date"), Some("03/06/2024"));
        assert_eq!(job.context.get("end_date"), Some("13/07/2024"));

        let formats = &letter(Workflow::InfonelAcceptance).dates;
        let date = parse_date(Some(&Cell::text("03/06/2024")), formats, "Start Date", 1).unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
    }

    #[test]
    fn test_infonel_completion_filename_uses_safe_identifier() {
        let rec = record(&[
            ("Name", "Neha Sharma"),
            ("Roll No", "19K41"),
            ("College Name", "KITS"),
            ("Position", "Intern"),
            ("Start Date", "01 March 2024"),
            ("End Date", "31 May 2024"),
            ("Work Description", "Built dashboards"),
        ]);
        let job = build_job(letter(Workflow::InfonelCompletion), issue_date(), 0, &rec).unwrap();
        assert_eq!(job.context.get("certificate_id"), Some("INT/KVP501"));
        assert_eq!(job.file_stem, "Neha_Sharma_INT_KVP501");
    }

    #[test]
    fn test_missing_required_column_is_named() {
        let mut table = Table::new(vec!["Name".to_string(), "Roll No".to_string()]);
        table.push_row(vec![Cell::text("A"), Cell::text("1")]);
        let def = letter(Workflow::GetinAcceptance);
        let err = check_required_columns(&table, &def.required_columns(), "the uploaded table").unwrap_err();
        assert!(matches!(err, DocsError::MissingColumnError { ref column, .. } if column == "College Name"));
    }
}
