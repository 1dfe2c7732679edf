pub mod components;
pub mod date_picker;
pub mod ledger;
pub mod row_editor;
