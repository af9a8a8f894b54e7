//! Column reshaping and the left join used by the report merges.

use crate::core::transform::title_case;
use crate::domain::model::{Cell, Record, Table};
use crate::utils::error::{DocsError, Result};
use std::collections::HashMap;

/// Renames columns in place. Renames whose source is absent are skipped.
pub fn rename_columns(table: &mut Table, renames: &[(&str, &str)]) {
    for (from, to) in renames {
        let Some(position) = table.headers.iter().position(|h| h == *from) else {
            continue;
        };
        table.headers[position] = (*to).to_string();
        for record in &mut table.records {
            if let Some(cell) = record.data.remove(*from) {
                record.data.insert((*to).to_string(), cell);
            }
        }
    }
}

pub fn require_join_key(table: &Table, key: &str, label: &str) -> Result<()> {
    if table.has_column(key) {
        Ok(())
    } else {
        Err(DocsError::JoinKeyError {
            key: key.to_string(),
            table: label.to_string(),
        })
    }
}

fn key_of(record: &Record, key: &str) -> Option<String> {
    let value = record.get(key)?.display();
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Left join of `primary` onto `columns` of `secondary`.
///
/// Every primary row appears exactly once, in order. The first secondary row
/// for a key wins. Rows without a match, or with a blank key, get empty
/// cells. A projected column that also exists in `primary` is emitted twice
/// with `_x` (primary) and `_y` (secondary) suffixes.
pub fn left_join(primary: &Table, secondary: &Table, key: &str, columns: &[&str]) -> Table {
    let mut lookup: HashMap<String, &Record> = HashMap::new();
    for record in &secondary.records {
        if let Some(k) = key_of(record, key) {
            lookup.entry(k).or_insert(record);
        }
    }

    let projected: Vec<&str> = columns.iter().copied().filter(|c| *c != key).collect();
    let clashes = |column: &str| projected.contains(&column) && column != key;

    let mut headers: Vec<String> = primary
        .headers
        .iter()
        .map(|h| if clashes(h.as_str()) { format!("{}_x", h) } else { h.clone() })
        .collect();
    let secondary_names: Vec<String> = projected
        .iter()
        .map(|c| {
            if primary.has_column(c) {
                format!("{}_y", c)
            } else {
                (*c).to_string()
            }
        })
        .collect();
    headers.extend(secondary_names.iter().cloned());

    let mut joined = Table::new(headers);
    let mut matched = 0usize;

    for record in &primary.records {
        let mut cells: Vec<Cell> = primary
            .headers
            .iter()
            .map(|h| record.get(h).cloned().unwrap_or_default())
            .collect();

        let partner = key_of(record, key).and_then(|k| lookup.get(&k).copied());
        if partner.is_some() {
            matched += 1;
        }
        cells.extend(
            projected
                .iter()
                .map(|c| partner.and_then(|p| p.get(c)).cloned().unwrap_or_default()),
        );
        joined.push_row(cells);
    }

    tracing::debug!(
        "🔗 Joined on '{}': {} of {} rows matched",
        key,
        matched,
        primary.len()
    );
    joined
}

/// Removes listed columns that exist; unknown names are ignored.
pub fn drop_columns(table: &mut Table, columns: &[&str]) {
    table.headers.retain(|h| !columns.contains(&h.as_str()));
    for record in &mut table.records {
        for column in columns {
            record.data.remove(*column);
        }
    }
}

pub fn title_case_headers(table: &mut Table) {
    let renames: Vec<(String, String)> = table
        .headers
        .iter()
        .map(|h| (h.clone(), title_case(h)))
        .collect();

    table.headers = renames.iter().map(|(_, to)| to.clone()).collect();
    for record in &mut table.records {
        let mut data = HashMap::with_capacity(record.data.len());
        for (from, to) in &renames {
            if let Some(cell) = record.data.remove(from) {
                data.insert(to.clone(), cell);
            }
        }
        record.data = data;
    }
}
