use chrono::NaiveDate;
use uuid::Uuid;

/// Outcome of a background remote call, delivered back to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    Upserted {
        date: NaiveDate,
        id: Uuid,
        version: u64,
    },
    UpsertFailed {
        date: NaiveDate,
        id: Uuid,
        error: String,
    },
    Deleted {
        id: Uuid,
    },
    DeleteFailed {
        id: Uuid,
        error: String,
    },
    DayCleared {
        date: NaiveDate,
    },
    ClearFailed {
        date: NaiveDate,
        error: String,
    },
}

/// What the status line shows about the remote mirror.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    LocalOnly,
    Syncing,
    Error,
    Active,
}

impl SyncStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SyncStatus::LocalOnly => "Local Storage Only",
            SyncStatus::Syncing => "Syncing to Cloud...",
            SyncStatus::Error => "Sync Error",
            SyncStatus::Active => "Cloud Sync Active",
        }
    }
}
