use std::{collections::BTreeSet, fs, path::Path};

use anyhow::{Context, bail};
use metstat_engine::table::{Record, Value, VerificationTable};

use crate::util::read_json_file;

/// Reads a verification table.
///
/// `.json` files hold an array of records; anything else is MET-style text:
/// a header line of column names followed by whitespace-separated rows.
pub fn read_table(path: &Path) -> anyhow::Result<VerificationTable> {
    let is_json = path
        .extension()
        .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
    let table: VerificationTable = if is_json {
        read_json_file("table", path)?
    } else {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read table file: {}", path.display()))?;
        parse_stat_text(&text)
            .with_context(|| format!("Failed to parse table file: {}", path.display()))?
    };
    tracing::info!(
        path = %path.display(),
        rows = table.len(),
        columns = table.columns().len(),
        "table loaded"
    );
    Ok(table)
}

/// Parses whitespace-delimited text with a header line.
///
/// Blank lines and lines starting with `#` are ignored. `NA` cells are
/// missing, numeric cells become numbers, everything else stays text.
pub fn parse_stat_text(text: &str) -> anyhow::Result<VerificationTable> {
    let mut lines = text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty() && !line.trim_start().starts_with('#'));
    let Some((_, header)) = lines.next() else {
        return Ok(VerificationTable::default());
    };
    let columns = header.split_whitespace().collect::<Vec<_>>();

    let mut rows = vec![];
    for (index, line) in lines {
        let fields = line.split_whitespace().collect::<Vec<_>>();
        if fields.len() != columns.len() {
            bail!(
                "line {}: expected {} fields, found {}",
                index + 1,
                columns.len(),
                fields.len()
            );
        }
        rows.push(
            columns
                .iter()
                .zip(fields)
                .map(|(column, field)| ((*column).to_owned(), parse_cell(field)))
                .collect::<Record>(),
        );
    }
    let columns = columns.into_iter().map(str::to_owned).collect::<BTreeSet<_>>();
    Ok(VerificationTable::with_columns(columns, rows)?)
}

fn parse_cell(field: &str) -> Value {
    if field.eq_ignore_ascii_case("NA") {
        return Value::Missing;
    }
    field
        .parse()
        .map_or_else(|_| Value::Text(field.to_owned()), Value::Number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stat_text() {
        let text = "\
# combined output
MODEL FCST_LEAD VALID           TOTAL FY_OY FY_ON FN_OY FN_ON

GFS   120000    20240101_000000 10    4     1     NA    5
";
        let table = parse_stat_text(text).unwrap();
        assert_eq!(table.len(), 1);
        let row = &table.rows()[0];
        assert_eq!(row["MODEL"], Value::Text("GFS".to_owned()));
        assert_eq!(row["FCST_LEAD"], Value::Number(120_000.0));
        assert_eq!(row["VALID"], Value::Text("20240101_000000".to_owned()));
        assert_eq!(row["FN_OY"], Value::Missing);
    }

    #[test]
    fn test_short_row_is_rejected() {
        let error = parse_stat_text("TOTAL FBAR\n1\n").unwrap_err();
        assert_eq!(error.to_string(), "line 2: expected 2 fields, found 1");
    }

    #[test]
    fn test_empty_text_is_an_empty_table() {
        assert!(parse_stat_text("\n# nothing\n").unwrap().is_empty());
    }
}
