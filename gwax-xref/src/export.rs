//! Re-delimit an association table to CSV for spreadsheet import.

use std::path::Path;

use gwax_core::table::AssociationTable;
use gwax_core::PipelineError;

/// Rewrite `input` as a delimited file at `output` (default delimiter `;`).
/// Content is carried over verbatim; only the delimiter changes.
pub fn export_assoc_table(input: &Path, output: &Path, delimiter: u8) -> Result<usize, PipelineError> {
    let table = AssociationTable::load(input)?;

    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_path(output)
        .map_err(|e| PipelineError::FormatConversion {
            path: output.to_path_buf(),
            detail: e.to_string(),
        })?;

    let mut write = || -> csv::Result<()> {
        wtr.write_record(&table.headers)?;
        for row in &table.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
        Ok(())
    };
    write().map_err(|e| PipelineError::FormatConversion {
        path: output.to_path_buf(),
        detail: e.to_string(),
    })?;

    Ok(table.n_rows())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    #[test]
    fn rewrites_with_requested_delimiter() {
        let mut f = NamedTempFile::new().unwrap();
        writeln!(f, "CHR\tSNP\tP").unwrap();
        writeln!(f, "1\trs1\t0.5").unwrap();

        let dir = tempdir().unwrap();
        let out = dir.path().join("out.csv");
        let rows = export_assoc_table(f.path(), &out, b';').unwrap();
        assert_eq!(rows, 1);

        let content = fs::read_to_string(&out).unwrap();
        assert_eq!(content, "CHR;SNP;P\n1;rs1;0.5\n");
    }
}
