//! Loading of delimited result tables (association output and similar).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::PipelineError;

/// Detect delimiter (tab, comma, space) from the first line of a file.
pub fn detect_delimiter(path: &Path) -> Result<u8, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::missing_input(path, e))?;
    let mut rdr = BufReader::new(file);
    let mut first_line = String::new();
    rdr.read_line(&mut first_line)
        .map_err(|e| PipelineError::missing_input(path, e))?;
    if first_line.contains('\t') {
        Ok(b'\t')
    } else if first_line.contains(',') {
        Ok(b',')
    } else {
        Ok(b' ')
    }
}

/// Parse a p-value cell; empty and NA-like cells are missing.
pub fn parse_p_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty()
        || trimmed.eq_ignore_ascii_case("na")
        || trimmed.eq_ignore_ascii_case("nan")
    {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// An association table held as strings: one header row plus one row per
/// tested variant, all original columns retained.
#[derive(Clone, Debug)]
pub struct AssociationTable {
    pub path: PathBuf,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl AssociationTable {
    /// Load a delimited table with a header row.
    ///
    /// Tab- and comma-delimited files go through the csv reader; plain
    /// space-delimited files (PLINK's aligned output) are split on
    /// whitespace runs. Rows are padded to the header width.
    pub fn load(path: &Path) -> Result<Self, PipelineError> {
        let delim = detect_delimiter(path)?;
        let (headers, mut rows) = if delim == b' ' {
            read_whitespace_table(path)?
        } else {
            read_csv_table(path, delim)?
        };
        if headers.is_empty() {
            return Err(PipelineError::invalid_schema("<header row>", path));
        }
        for row in rows.iter_mut() {
            row.resize(headers.len(), String::new());
        }
        Ok(AssociationTable {
            path: path.to_path_buf(),
            headers,
            rows,
        })
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Cell accessor; out-of-range cells read as empty.
    pub fn cell<'a>(&'a self, row: usize, col: usize) -> &'a str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(String::as_str)
            .unwrap_or("")
    }
}

fn read_csv_table(path: &Path, delim: u8) -> Result<(Vec<String>, Vec<Vec<String>>), PipelineError> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(delim)
        .flexible(true)
        .from_path(path)
        .map_err(|e| csv_to_pipeline_error(path, e))?;

    let headers = rdr
        .headers()
        .map_err(|e| csv_to_pipeline_error(path, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| csv_to_pipeline_error(path, e))?;
        if record.is_empty() {
            continue;
        }
        rows.push(record.iter().map(|c| c.to_string()).collect());
    }
    Ok((headers, rows))
}

fn read_whitespace_table(path: &Path) -> Result<(Vec<String>, Vec<Vec<String>>), PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::missing_input(path, e))?;
    let mut lines = BufReader::new(file).lines();

    let headers: Vec<String> = match lines.next() {
        Some(line) => line
            .map_err(|e| PipelineError::missing_input(path, e))?
            .split_whitespace()
            .map(|s| s.to_string())
            .collect(),
        None => Vec::new(),
    };

    let mut rows = Vec::new();
    for line in lines {
        let line = line.map_err(|e| PipelineError::missing_input(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        rows.push(line.split_whitespace().map(|s| s.to_string()).collect());
    }
    Ok((headers, rows))
}

fn csv_to_pipeline_error(path: &Path, e: csv::Error) -> PipelineError {
    match e.into_kind() {
        csv::ErrorKind::Io(io_err) => PipelineError::missing_input(path, io_err),
        other => PipelineError::FormatConversion {
            path: path.to_path_buf(),
            detail: format!("{:?}", other),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn detects_tab_and_comma() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "a\tb\tc").unwrap();
        assert_eq!(detect_delimiter(f.path()).unwrap(), b'\t');

        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "a,b,c").unwrap();
        assert_eq!(detect_delimiter(f.path()).unwrap(), b',');
    }

    #[test]
    fn loads_tab_delimited_table() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "CHR\tSNP\tBP\tP").unwrap();
        writeln!(f, "1\trs1\t1000\t0.5").unwrap();
        writeln!(f, "2\trs2\t2000\tNA").unwrap();

        let table = AssociationTable::load(f.path()).unwrap();
        assert_eq!(table.headers, vec!["CHR", "SNP", "BP", "P"]);
        assert_eq!(table.n_rows(), 2);
        assert_eq!(table.cell(0, 1), "rs1");
        assert_eq!(table.cell(1, 3), "NA");
    }

    #[test]
    fn loads_whitespace_aligned_table() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, " CHR  SNP    BP      P").unwrap();
        writeln!(f, "   1  rs1  1000    0.5").unwrap();

        let table = AssociationTable::load(f.path()).unwrap();
        assert_eq!(table.headers, vec!["CHR", "SNP", "BP", "P"]);
        assert_eq!(table.cell(0, 0), "1");
        assert_eq!(table.cell(0, 3), "0.5");
    }

    #[test]
    fn missing_file_is_missing_input() {
        let err = AssociationTable::load(Path::new("/no/such/table.assoc")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput { .. }));
    }

    #[test]
    fn parses_p_values() {
        assert_eq!(parse_p_value("0.05"), Some(0.05));
        assert_eq!(parse_p_value(" 5e-9 "), Some(5e-9));
        assert_eq!(parse_p_value("NA"), None);
        assert_eq!(parse_p_value("nan"), None);
        assert_eq!(parse_p_value(""), None);
    }
}
