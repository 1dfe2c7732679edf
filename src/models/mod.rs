mod line_item;
mod patient_record;

pub use line_item::{LineItem, LineItemPatch};
pub use patient_record::PatientRecord;
