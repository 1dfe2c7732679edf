use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::billing::{plain_number, FeeBreakdown};
use crate::models::LineItem;

/// Row of the remote `patient_records` table.
#[derive(sqlx::FromRow, Debug, Clone, PartialEq)]
pub struct PatientRecord {
    pub id: Uuid,
    pub record_date: NaiveDate,
    pub patient_name: String,
    pub visit_type: String,
    pub is_free: bool,
    pub consultation_fee: f64,
    pub include_procedure: bool,
    pub procedure_fee: f64,
    pub include_tests: bool,
    pub test_fee: f64,
    pub include_additional: bool,
    pub additional_fee: f64,
    pub notes: String,
    pub total_amount: f64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PatientRecord {
    /// Remote shape of a local row. Fees are stored already gated by their
    /// flags, so an excluded fee goes out as 0.
    pub fn from_item(item: &LineItem, record_date: NaiveDate) -> Self {
        let fees = FeeBreakdown::of(item);

        Self {
            id: item.id,
            record_date,
            patient_name: item.name.clone(),
            visit_type: item.review_type.clone(),
            is_free: item.is_free,
            consultation_fee: fees.consultation,
            include_procedure: item.include_procedure,
            procedure_fee: fees.procedure,
            include_tests: item.include_lab,
            test_fee: fees.tests,
            include_additional: item.include_extra,
            additional_fee: fees.additional,
            notes: item.observations.clone(),
            total_amount: fees.total(),
            created_at: None,
            updated_at: None,
        }
    }

    /// Local row for a record fetched from the remote table. It is in sync
    /// by definition.
    pub fn into_line_item(self) -> LineItem {
        LineItem {
            id: self.id,
            name: self.patient_name,
            review_type: self.visit_type,
            is_free: self.is_free,
            amount: plain_number(self.consultation_fee),
            include_procedure: self.include_procedure,
            procedure_fee: plain_number(self.procedure_fee),
            include_lab: self.include_tests,
            test_fee: plain_number(self.test_fee),
            observations: self.notes,
            include_extra: self.include_additional,
            extra_fee: plain_number(self.additional_fee),
            synced: true,
            version: 0,
        }
    }
}
