mod csv_export;
mod xlsx_export;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use thiserror::Error;
use tracing::info;

use crate::billing::FeeBreakdown;
use crate::models::LineItem;

pub use csv_export::render_csv;
pub use xlsx_export::render_xlsx;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("spreadsheet encoding failed: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub const HEADERS: [&str; 14] = [
    "Serial",
    "Patient Name",
    "Review",
    "Free",
    "Amount (₹)",
    "2E Included",
    "2E (₹)",
    "Lab Included",
    "Lab (₹)",
    "Obs",
    "Extra Included",
    "Extra (₹)",
    "Row Total (₹)",
    "Sync Status",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Xlsx,
}

impl ExportFormat {
    pub fn file_name(&self, date: NaiveDate) -> String {
        let date = date.format("%Y-%m-%d");
        match self {
            ExportFormat::Csv => format!("OPD-{}.csv", date),
            ExportFormat::Xlsx => format!("OPD-Clinic-{}.xlsx", date),
        }
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "Yes" } else { "No" }
}

fn sync_label(row: &LineItem) -> &'static str {
    if row.synced { "Synced" } else { "Local Only" }
}

/// Renders the day in `format` and writes it into `dir`. Returns the path
/// written.
pub fn write_export(
    dir: &Path,
    format: ExportFormat,
    date: NaiveDate,
    rows: &[LineItem],
) -> Result<PathBuf, ExportError> {
    let bytes = match format {
        ExportFormat::Csv => render_csv(rows)?,
        ExportFormat::Xlsx => render_xlsx(rows, date)?,
    };

    let path = dir.join(format.file_name(date));
    let io_err = |source| ExportError::Io { path: path.clone(), source };
    fs::create_dir_all(dir).map_err(io_err)?;
    fs::write(&path, bytes).map_err(io_err)?;

    info!(path = %path.display(), rows = rows.len(), "exported ledger");
    Ok(path)
}

/// Per-row values shared by both formats.
struct ExportRow<'a> {
    serial: usize,
    item: &'a LineItem,
    fees: FeeBreakdown,
}

impl<'a> ExportRow<'a> {
    fn all(rows: &'a [LineItem]) -> impl Iterator<Item = ExportRow<'a>> {
        rows.iter().enumerate().map(|(i, item)| ExportRow {
            serial: i + 1,
            item,
            fees: FeeBreakdown::of(item),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_carry_the_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(ExportFormat::Csv.file_name(date), "OPD-2024-03-09.csv");
        assert_eq!(ExportFormat::Xlsx.file_name(date), "OPD-Clinic-2024-03-09.xlsx");
    }

    #[test]
    fn export_rows_number_and_gate_fees() {
        let mut free = LineItem::empty();
        free.is_free = true;
        free.amount = "300".to_string();
        free.include_lab = true;
        free.test_fee = "150".to_string();

        let mut paid = LineItem::empty();
        paid.amount = "500".to_string();
        paid.procedure_fee = "200".to_string();
        paid.include_extra = true;
        paid.extra_fee = "abc".to_string();

        let rows = [free, paid];
        let exported: Vec<_> = ExportRow::all(&rows).collect();
        assert_eq!(exported[0].serial, 1);
        assert_eq!(exported[0].fees.consultation, 0.0);
        assert_eq!(exported[0].fees.tests, 150.0);
        assert_eq!(exported[1].serial, 2);
        assert_eq!(exported[1].fees.procedure, 0.0);
        assert_eq!(exported[1].fees.additional, 0.0);
        assert_eq!(exported[1].fees.total(), 500.0);
    }

    #[test]
    fn writes_csv_into_the_export_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("exports");
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let rows = vec![LineItem::empty()];

        let path = write_export(&target, ExportFormat::Csv, date, &rows).unwrap();
        assert_eq!(path, target.join("OPD-2024-03-09.csv"));
        assert_eq!(fs::read(&path).unwrap(), render_csv(&rows).unwrap());
    }
}
