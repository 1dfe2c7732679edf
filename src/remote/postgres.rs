use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use crate::config::RemoteConfig;
use crate::models::PatientRecord;
use crate::remote::{RemoteError, RemoteMirror};

const SELECT_BY_DATE: &str = r#"
    SELECT
        id,
        record_date,
        COALESCE(patient_name, '') AS patient_name,
        COALESCE(visit_type, '') AS visit_type,
        COALESCE(is_free, false) AS is_free,
        COALESCE(consultation_fee, 0)::float8 AS consultation_fee,
        COALESCE(include_procedure, false) AS include_procedure,
        COALESCE(procedure_fee, 0)::float8 AS procedure_fee,
        COALESCE(include_tests, false) AS include_tests,
        COALESCE(test_fee, 0)::float8 AS test_fee,
        COALESCE(include_additional, false) AS include_additional,
        COALESCE(additional_fee, 0)::float8 AS additional_fee,
        COALESCE(notes, '') AS notes,
        COALESCE(total_amount, 0)::float8 AS total_amount,
        created_at,
        updated_at
    FROM patient_records
    WHERE record_date = $1
    ORDER BY created_at ASC
"#;

const UPSERT: &str = r#"
    INSERT INTO patient_records (
        id, record_date, patient_name, visit_type, is_free,
        consultation_fee, include_procedure, procedure_fee,
        include_tests, test_fee, include_additional, additional_fee,
        notes, total_amount
    )
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
    ON CONFLICT (id) DO UPDATE SET
        record_date = EXCLUDED.record_date,
        patient_name = EXCLUDED.patient_name,
        visit_type = EXCLUDED.visit_type,
        is_free = EXCLUDED.is_free,
        consultation_fee = EXCLUDED.consultation_fee,
        include_procedure = EXCLUDED.include_procedure,
        procedure_fee = EXCLUDED.procedure_fee,
        include_tests = EXCLUDED.include_tests,
        test_fee = EXCLUDED.test_fee,
        include_additional = EXCLUDED.include_additional,
        additional_fee = EXCLUDED.additional_fee,
        notes = EXCLUDED.notes,
        total_amount = EXCLUDED.total_amount,
        updated_at = now()
"#;

/// PostgreSQL-backed mirror.
pub struct PgMirror {
    pool: PgPool,
}

impl PgMirror {
    /// Builds a lazily connecting pool; nothing touches the network until the
    /// first call, so an unreachable server only shows up as failed calls.
    pub fn connect(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let options = PgConnectOptions::from_str(&config.url)
            .map_err(|e| RemoteError::Config(e.to_string()))?
            .password(&config.key);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_lazy_with(options);

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool
    pub fn get_pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl RemoteMirror for PgMirror {
    async fn test_connection(&self) -> Result<(), RemoteError> {
        sqlx::query("SELECT 1").execute(self.get_pool()).await?;
        Ok(())
    }

    async fn fetch_by_date(&self, date: NaiveDate) -> Result<Vec<PatientRecord>, RemoteError> {
        let records = sqlx::query_as::<_, PatientRecord>(SELECT_BY_DATE)
            .bind(date)
            .fetch_all(self.get_pool())
            .await?;

        debug!(%date, count = records.len(), "fetched remote records");
        Ok(records)
    }

    async fn upsert(&self, record: &PatientRecord) -> Result<(), RemoteError> {
        let result = sqlx::query(UPSERT)
            .bind(record.id)
            .bind(record.record_date)
            .bind(&record.patient_name)
            .bind(&record.visit_type)
            .bind(record.is_free)
            .bind(record.consultation_fee)
            .bind(record.include_procedure)
            .bind(record.procedure_fee)
            .bind(record.include_tests)
            .bind(record.test_fee)
            .bind(record.include_additional)
            .bind(record.additional_fee)
            .bind(&record.notes)
            .bind(record.total_amount)
            .execute(self.get_pool())
            .await?;

        if result.rows_affected() != 1 {
            return Err(RemoteError::Rejected(format!(
                "upsert of {} touched {} rows",
                record.id,
                result.rows_affected()
            )));
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), RemoteError> {
        sqlx::query("DELETE FROM patient_records WHERE id = $1")
            .bind(id)
            .execute(self.get_pool())
            .await?;

        Ok(())
    }

    async fn delete_by_date(&self, date: NaiveDate) -> Result<(), RemoteError> {
        let result = sqlx::query("DELETE FROM patient_records WHERE record_date = $1")
            .bind(date)
            .execute(self.get_pool())
            .await?;

        debug!(%date, deleted = result.rows_affected(), "cleared remote records");
        Ok(())
    }
}
