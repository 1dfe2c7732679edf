use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::billing::{daily_total, plain_number};
use crate::export::{sync_label, yes_no, ExportError, ExportRow, HEADERS};
use crate::models::LineItem;
use crate::words::amount_in_words;

/// The day as CSV: header, one record per row, then a summary record with
/// the daily total and its words form. Fields are quoted only when they
/// contain a comma, quote or line break. Identical rows give identical
/// bytes.
pub fn render_csv(rows: &[LineItem]) -> Result<Vec<u8>, ExportError> {
    let mut writer = WriterBuilder::new()
        .flexible(true)
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;

    for row in ExportRow::all(rows) {
        let item = row.item;
        writer.write_record([
            row.serial.to_string().as_str(),
            item.name.as_str(),
            item.review_type.as_str(),
            yes_no(item.is_free),
            plain_number(row.fees.consultation).as_str(),
            yes_no(item.include_procedure),
            plain_number(row.fees.procedure).as_str(),
            yes_no(item.include_lab),
            plain_number(row.fees.tests).as_str(),
            item.observations.as_str(),
            yes_no(item.include_extra),
            plain_number(row.fees.additional).as_str(),
            plain_number(row.fees.total()).as_str(),
            sync_label(item),
        ])?;
    }

    let total = daily_total(rows);
    writer.write_record([
        "Daily Total Revenue (₹)",
        plain_number(total).as_str(),
        amount_in_words(total).as_str(),
    ])?;

    writer
        .into_inner()
        .map_err(|e| ExportError::Csv(csv::Error::from(e.into_error())))
}
