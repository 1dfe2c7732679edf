//! In-process mirror for exercising the store's sync paths.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Semaphore;
use uuid::Uuid;

use crate::models::PatientRecord;
use crate::remote::{RemoteError, RemoteMirror};

#[derive(Debug, Clone, PartialEq)]
pub enum MirrorCall {
    Upsert(Uuid),
    DeleteById(Uuid),
    DeleteByDate(NaiveDate),
}

pub struct MemoryMirror {
    records: Mutex<Vec<PatientRecord>>,
    calls: Mutex<Vec<MirrorCall>>,
    failing: AtomicBool,
    hold_upserts: AtomicBool,
    upsert_gate: Semaphore,
}

impl MemoryMirror {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            failing: AtomicBool::new(false),
            hold_upserts: AtomicBool::new(false),
            upsert_gate: Semaphore::new(0),
        }
    }

    pub fn with_records(records: Vec<PatientRecord>) -> Self {
        let mirror = Self::new();
        *lock(&mirror.records) = records;
        mirror
    }

    /// Every call fails while set.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Upserts park until `release_upserts` hands out permits.
    pub fn hold_upserts(&self) {
        self.hold_upserts.store(true, Ordering::SeqCst);
    }

    pub fn release_upserts(&self, count: usize) {
        self.upsert_gate.add_permits(count);
    }

    pub fn records(&self) -> Vec<PatientRecord> {
        lock(&self.records).clone()
    }

    pub fn calls(&self) -> Vec<MirrorCall> {
        lock(&self.calls).clone()
    }

    fn check(&self) -> Result<(), RemoteError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RemoteError::Rejected("mirror offline".to_string()));
        }
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl RemoteMirror for MemoryMirror {
    async fn test_connection(&self) -> Result<(), RemoteError> {
        self.check()
    }

    async fn fetch_by_date(&self, date: NaiveDate) -> Result<Vec<PatientRecord>, RemoteError> {
        self.check()?;
        Ok(lock(&self.records)
            .iter()
            .filter(|r| r.record_date == date)
            .cloned()
            .collect())
    }

    async fn upsert(&self, record: &PatientRecord) -> Result<(), RemoteError> {
        if self.hold_upserts.load(Ordering::SeqCst) {
            if let Ok(permit) = self.upsert_gate.acquire().await {
                permit.forget();
            }
        }
        lock(&self.calls).push(MirrorCall::Upsert(record.id));
        self.check()?;

        let mut records = lock(&self.records);
        let mut stored = record.clone();
        stored.updated_at = Some(Utc::now());
        match records.iter_mut().find(|r| r.id == record.id) {
            Some(existing) => {
                stored.created_at = existing.created_at;
                *existing = stored;
            }
            None => {
                stored.created_at = stored.updated_at;
                records.push(stored);
            }
        }
        Ok(())
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), RemoteError> {
        lock(&self.calls).push(MirrorCall::DeleteById(id));
        self.check()?;
        lock(&self.records).retain(|r| r.id != id);
        Ok(())
    }

    async fn delete_by_date(&self, date: NaiveDate) -> Result<(), RemoteError> {
        lock(&self.calls).push(MirrorCall::DeleteByDate(date));
        self.check()?;
        lock(&self.records).retain(|r| r.record_date != date);
        Ok(())
    }
}
