//! Column-selection heuristic shared by the cross-referencer and the
//! association-table loader.

use crate::config::P_VALUE_NAMES;

/// Outcome of picking a column from a header row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnChoice {
    /// A keyword matched; index into the header row.
    Matched(usize),
    /// No keyword matched; fell back to the first column.
    Fallback(usize),
}

impl ColumnChoice {
    pub fn index(&self) -> usize {
        match *self {
            ColumnChoice::Matched(i) | ColumnChoice::Fallback(i) => i,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ColumnChoice::Fallback(_))
    }
}

/// Pick the column most likely to hold variant identifiers.
///
/// Case-insensitive substring match of each keyword list entry against the
/// column names, first matching column in column order wins. With no match
/// the first column is chosen as a fallback; an empty header yields `None`.
pub fn pick_column(columns: &[String], keywords: &[String]) -> Option<ColumnChoice> {
    if columns.is_empty() {
        return None;
    }
    let matched = columns.iter().position(|col| {
        let lower = col.to_lowercase();
        keywords.iter().any(|kw| lower.contains(&kw.to_lowercase()))
    });
    Some(match matched {
        Some(i) => ColumnChoice::Matched(i),
        None => ColumnChoice::Fallback(0),
    })
}

/// Locate the p-value column by exact (case-insensitive) header name.
pub fn find_p_value_column(columns: &[String]) -> Option<usize> {
    columns.iter().position(|col| {
        P_VALUE_NAMES
            .iter()
            .any(|name| col.eq_ignore_ascii_case(name))
    })
}
