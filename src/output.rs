use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};

use crate::pipeline::{META_COLUMNS, PredictionTable};

pub const OUTPUT_DELIMITER: u8 = b';';

pub fn to_csv_string(table: &PredictionTable) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(OUTPUT_DELIMITER)
        .from_writer(Vec::new());
    writer
        .write_record(table.header())
        .context("write header row")?;
    for (idx, row) in table.cells().into_iter().enumerate() {
        let row: Vec<String> = row.into_iter().map(|c| single_line(&c)).collect();
        writer
            .write_record(&row)
            .with_context(|| format!("write row {}", idx + 1))?;
    }
    let bytes = writer.into_inner().context("flush csv writer")?;
    String::from_utf8(bytes).context("csv output is not utf-8")
}

pub fn write_csv(path: &Path, table: &PredictionTable) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    let body = to_csv_string(table)?;
    let tmp = path.with_extension("csv.tmp");
    fs::write(&tmp, body).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(())
}

pub fn write_xlsx(path: &Path, table: &PredictionTable) -> Result<()> {
    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Predictions").context("name worksheet")?;
        let mut rows = vec![table.header()];
        rows.extend(table.cells());
        write_rows(sheet, &rows, META_COLUMNS.len(), table.header().len() - 1)?;
    }
    workbook
        .save(path)
        .with_context(|| format!("save workbook {}", path.display()))?;
    Ok(())
}

/// Writes `rows`; data cells in `numeric_from..numeric_to` become numbers when they parse.
fn write_rows(
    worksheet: &mut Worksheet,
    rows: &[Vec<String>],
    numeric_from: usize,
    numeric_to: usize,
) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            let numeric = row_idx > 0 && (numeric_from..numeric_to).contains(&col_idx);
            let written = match value.parse::<f64>() {
                Ok(n) if numeric => worksheet
                    .write_number(row_idx as u32, col_idx as u16, n)
                    .map(|_| ()),
                _ => worksheet
                    .write_string(row_idx as u32, col_idx as u16, single_line(value))
                    .map(|_| ()),
            };
            written.with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}

fn single_line(raw: &str) -> String {
    if raw.contains(['\n', '\r']) {
        raw.replace("\r\n", " ").replace(['\n', '\r'], " ")
    } else {
        raw.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newlines_are_flattened() {
        assert_eq!(single_line("Inter\nMilan"), "Inter Milan");
        assert_eq!(single_line("a\r\nb"), "a b");
        assert_eq!(single_line("plain"), "plain");
    }
}
