use chrono::NaiveDate;
use rust_xlsxwriter::{Color, Format, FormatAlign, Workbook};

use crate::billing::{daily_total, plain_number};
use crate::export::{sync_label, yes_no, ExportError, ExportRow, HEADERS};
use crate::models::LineItem;
use crate::words::amount_in_words;

const COLUMN_WIDTHS: [f64; 14] = [8.0, 20.0, 15.0, 8.0, 12.0, 12.0, 10.0, 12.0, 10.0, 25.0, 12.0, 10.0, 12.0, 12.0];
const TOTAL_COLUMN: u16 = 12;

fn sheet_name(date: NaiveDate) -> String {
    format!("OPD {}", date.format("%B %-d, %Y"))
}

/// The day as a single-sheet workbook, numbers stored as numeric cells.
pub fn render_xlsx(rows: &[LineItem], date: NaiveDate) -> Result<Vec<u8>, ExportError> {
    render_sheet(rows, &sheet_name(date))
}

fn render_sheet(rows: &[LineItem], name: &str) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header = Format::new()
        .set_bold()
        .set_background_color(Color::RGB(0xE3F2FD))
        .set_align(FormatAlign::Center);

    let sheet = workbook.add_worksheet();
    sheet.set_name(name)?;

    for (col, (title, width)) in HEADERS.iter().zip(COLUMN_WIDTHS).enumerate() {
        let col = col as u16;
        sheet.write_string_with_format(0, col, *title, &header)?;
        sheet.set_column_width(col, width)?;
    }

    for row in ExportRow::all(rows) {
        let r = row.serial as u32;
        let item = row.item;
        sheet.write_number(r, 0, row.serial as f64)?;
        sheet.write_string(r, 1, item.name.as_str())?;
        sheet.write_string(r, 2, item.review_type.as_str())?;
        sheet.write_string(r, 3, yes_no(item.is_free))?;
        sheet.write_number(r, 4, row.fees.consultation)?;
        sheet.write_string(r, 5, yes_no(item.include_procedure))?;
        sheet.write_number(r, 6, row.fees.procedure)?;
        sheet.write_string(r, 7, yes_no(item.include_lab))?;
        sheet.write_number(r, 8, row.fees.tests)?;
        sheet.write_string(r, 9, item.observations.as_str())?;
        sheet.write_string(r, 10, yes_no(item.include_extra))?;
        sheet.write_number(r, 11, row.fees.additional)?;
        sheet.write_number(r, TOTAL_COLUMN, row.fees.total())?;
        sheet.write_string(r, 13, sync_label(item))?;
    }

    // One blank row between the ledger and the summary.
    let summary = rows.len() as u32 + 2;
    let total = daily_total(rows);
    sheet.write_string(summary, TOTAL_COLUMN, format!("Daily Total: ₹{}", plain_number(total)))?;
    sheet.write_string(summary + 1, TOTAL_COLUMN, format!("In Words: {}", amount_in_words(total)))?;

    Ok(workbook.save_to_buffer()?)
}
