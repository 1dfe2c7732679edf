use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::models::PatientRecord;

#[cfg(test)]
pub mod memory;
mod postgres;

pub use postgres::PgMirror;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("remote database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("invalid remote configuration: {0}")]
    Config(String),
    #[error("remote rejected the call: {0}")]
    Rejected(String),
}

/// Best-effort replica of the day ledgers in the `patient_records` table.
///
/// Every method is a single independent call; nothing here retries or
/// orders calls relative to each other.
#[async_trait]
pub trait RemoteMirror: Send + Sync + 'static {
    /// Cheap round trip used to decide whether local rows can be trusted as
    /// mirrored.
    async fn test_connection(&self) -> Result<(), RemoteError>;

    /// All records of a day, oldest `created_at` first.
    async fn fetch_by_date(&self, date: NaiveDate) -> Result<Vec<PatientRecord>, RemoteError>;

    /// Insert, or replace the record with the same id.
    async fn upsert(&self, record: &PatientRecord) -> Result<(), RemoteError>;

    async fn delete_by_id(&self, id: Uuid) -> Result<(), RemoteError>;

    async fn delete_by_date(&self, date: NaiveDate) -> Result<(), RemoteError>;
}
