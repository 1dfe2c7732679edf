//! The day ledger: ordered rows for one date, kept in local storage and
//! mirrored opportunistically to the remote table.
//!
//! Local writes happen inline and finish before a mutating call returns.
//! Remote calls run as spawned tasks that report back over a channel; the
//! store folds those reports in when the owner calls
//! [`LedgerStore::apply_pending_events`] or [`LedgerStore::next_event`].

mod events;
mod sample;

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::billing;
use crate::models::{LineItem, LineItemPatch, PatientRecord};
use crate::remote::RemoteMirror;
use crate::storage::{LedgerStorage, StorageError};

pub use events::{SyncEvent, SyncStatus};
pub use sample::sample_patients;

#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("local storage failed: {0}")]
    Storage(#[from] StorageError),
}

pub struct LedgerStore {
    date: NaiveDate,
    rows: Vec<LineItem>,
    loading: bool,
    in_flight: usize,
    last_error: Option<String>,
    storage: LedgerStorage,
    mirror: Option<Arc<dyn RemoteMirror>>,
    // Store-wide edit counter; never reset, so versions stay monotonic across loads.
    last_version: u64,
    // Ids removed locally whose remote copy must stay deleted.
    tombstones: HashSet<Uuid>,
    upserts_in_flight: HashMap<Uuid, usize>,
    // Outstanding delete-by-date calls, and the upserts held back until they land.
    clears_in_flight: HashMap<NaiveDate, usize>,
    deferred_upserts: HashSet<Uuid>,
    events_tx: mpsc::UnboundedSender<SyncEvent>,
    events_rx: mpsc::UnboundedReceiver<SyncEvent>,
}

impl LedgerStore {
    /// A store for `date` with no rows yet; call [`LedgerStore::load`] before use.
    pub fn new(storage: LedgerStorage, mirror: Option<Arc<dyn RemoteMirror>>, date: NaiveDate) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            date,
            rows: Vec::new(),
            loading: false,
            in_flight: 0,
            last_error: None,
            storage,
            mirror,
            last_version: 0,
            tombstones: HashSet::new(),
            upserts_in_flight: HashMap::new(),
            clears_in_flight: HashMap::new(),
            deferred_upserts: HashSet::new(),
            events_tx,
            events_rx,
        }
    }

    /// `new` followed by `load`.
    pub async fn open(storage: LedgerStorage, mirror: Option<Arc<dyn RemoteMirror>>, date: NaiveDate) -> Self {
        let mut store = Self::new(storage, mirror, date);
        store.load(date).await;
        store
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn rows(&self) -> &[LineItem] {
        &self.rows
    }

    pub fn row(&self, id: Uuid) -> Option<&LineItem> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    /// True while any remote call is still outstanding.
    pub fn syncing(&self) -> bool {
        self.in_flight > 0
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.last_error = None;
    }

    pub fn remote_enabled(&self) -> bool {
        self.mirror.is_some()
    }

    pub fn daily_total(&self) -> f64 {
        billing::daily_total(&self.rows)
    }

    pub fn sync_status(&self) -> SyncStatus {
        if self.mirror.is_none() {
            SyncStatus::LocalOnly
        } else if self.syncing() {
            SyncStatus::Syncing
        } else if self.last_error.is_some() {
            SyncStatus::Error
        } else {
            SyncStatus::Active
        }
    }

    pub async fn test_connection(&self) -> bool {
        let Some(mirror) = &self.mirror else {
            debug!("remote mirror not configured");
            return false;
        };

        match mirror.test_connection().await {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "remote mirror unreachable");
                false
            }
        }
    }

    /// Replaces `rows` with the ledger of `date`.
    ///
    /// Non-empty remote data wins and is backed up locally; otherwise local
    /// data is used, and a day with nothing stored starts with one empty,
    /// persisted row. Always leaves at least one row.
    pub async fn load(&mut self, date: NaiveDate) {
        self.loading = true;
        self.date = date;
        self.last_error = None;

        let connected = self.test_connection().await;

        if connected {
            if let Some(rows) = self.fetch_remote(date).await {
                self.tombstones.retain(|id| !rows.iter().any(|r| r.id == *id));
                self.rows = rows;
                self.observe_versions();
                let _ = self.persist();
                self.loading = false;
                return;
            }
        }

        match self.storage.load(date) {
            Ok(Some(rows)) if !rows.is_empty() => {
                info!(%date, count = rows.len(), "loaded local records");
                self.rows = rows
                    .into_iter()
                    .map(|mut row| {
                        row.synced = connected || row.synced;
                        row
                    })
                    .collect();
                self.observe_versions();
            }
            Ok(_) => {
                info!(%date, "starting an empty day");
                self.rows = vec![LineItem::empty()];
                let _ = self.persist();
            }
            Err(e) => {
                error!(%date, error = %e, "failed to load local records");
                self.last_error = Some("Failed to load records".to_string());
                self.rows = vec![LineItem::empty()];
            }
        }

        self.loading = false;
    }

    async fn fetch_remote(&mut self, date: NaiveDate) -> Option<Vec<LineItem>> {
        let mirror = self.mirror.clone()?;

        match mirror.fetch_by_date(date).await {
            Ok(records) if !records.is_empty() => {
                info!(%date, count = records.len(), "loaded records from remote");
                Some(records.into_iter().map(PatientRecord::into_line_item).collect())
            }
            Ok(_) => {
                debug!(%date, "no remote records");
                None
            }
            Err(e) => {
                error!(%date, error = %e, "failed to load remote records");
                self.last_error = Some("Failed to sync with cloud database".to_string());
                None
            }
        }
    }

    /// Appends an empty row. Returns its id.
    pub fn add_row(&mut self) -> Result<Uuid, LedgerError> {
        let row = LineItem::empty();
        let id = row.id;
        self.rows.push(row);
        debug!(%id, "added row");
        self.persist()?;
        Ok(id)
    }

    /// Merges `patch` into row `id` and marks it unsynced. Unknown ids are
    /// ignored. A named row is then upserted remotely in the background.
    pub fn update_row(&mut self, id: Uuid, patch: LineItemPatch) -> Result<(), LedgerError> {
        let Some(row) = self.rows.iter_mut().find(|r| r.id == id) else {
            debug!(%id, "update for unknown row ignored");
            return Ok(());
        };

        patch.apply(row);
        row.synced = false;
        self.last_version += 1;
        row.version = self.last_version;
        let snapshot = row.clone();

        let saved = self.persist();
        self.push_upsert(&snapshot);
        saved
    }

    /// Drops row `id`, asking the remote to delete it first. Unknown ids are
    /// ignored.
    pub fn remove_row(&mut self, id: Uuid) -> Result<(), LedgerError> {
        if self.row(id).is_none() {
            return Ok(());
        }

        if self.mirror.is_some() {
            self.tombstones.insert(id);
        }
        self.push_delete(id);
        self.rows.retain(|r| r.id != id);
        debug!(%id, "removed row");
        self.persist()
    }

    /// Wipes the selected day locally and remotely and starts over with one
    /// empty row.
    pub fn clear_day(&mut self) -> Result<(), LedgerError> {
        let date = self.date;

        if let Some(mirror) = self.mirror.clone() {
            *self.clears_in_flight.entry(date).or_default() += 1;
            self.spawn_remote(async move {
                match mirror.delete_by_date(date).await {
                    Ok(()) => SyncEvent::DayCleared { date },
                    Err(e) => SyncEvent::ClearFailed { date, error: e.to_string() },
                }
            });
            self.tombstones.extend(self.rows.iter().map(|r| r.id));
        }

        if let Err(e) = self.storage.erase(date) {
            return Err(self.storage_failed(e));
        }

        self.rows = vec![LineItem::empty()];
        info!(%date, "cleared day");
        self.persist()
    }

    /// Appends the demonstration patients, each added and then edited like
    /// a row typed in by hand. Returns how many rows were added.
    pub fn add_sample_patients(&mut self) -> Result<usize, LedgerError> {
        let patients = sample_patients();
        let count = patients.len();
        for patch in patients {
            let id = self.add_row()?;
            self.update_row(id, patch)?;
        }
        info!(date = %self.date, count, "added sample patients");
        Ok(count)
    }

    /// Folds every sync report that has already arrived. Never waits.
    pub fn apply_pending_events(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.apply_event(event);
            applied += 1;
        }
        applied
    }

    /// Waits for the next sync report and folds it in. Returns `false`
    /// straight away when nothing is in flight.
    pub async fn next_event(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        match self.events_rx.recv().await {
            Some(event) => {
                self.apply_event(event);
                true
            }
            None => false,
        }
    }

    /// Waits until every outstanding remote call has reported back.
    pub async fn settle(&mut self) {
        while self.next_event().await {}
    }

    fn apply_event(&mut self, event: SyncEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match event {
            SyncEvent::Upserted { date, id, version } => {
                self.upsert_landed(id);
                if self.tombstones.contains(&id) {
                    // The upsert landed after the row was deleted here.
                    warn!(%id, "upsert confirmed for a removed row, deleting again");
                    self.push_delete(id);
                    return;
                }
                if date != self.date {
                    return;
                }

                let Some(row) = self.rows.iter_mut().find(|r| r.id == id) else {
                    return;
                };
                if row.version != version {
                    debug!(%id, sent = version, current = row.version, "stale upsert confirmation ignored");
                    return;
                }
                row.synced = true;
                debug!(%id, version, "row synced");
                // A failure here is already recorded in last_error.
                let _ = self.persist();
            }
            SyncEvent::UpsertFailed { date, id, error } => {
                self.upsert_landed(id);
                error!(%date, %id, %error, "sync to remote failed");
                self.last_error = Some("Failed to sync to cloud database".to_string());
            }
            SyncEvent::Deleted { id } => {
                debug!(%id, "removed from remote");
                if !self.upserts_in_flight.contains_key(&id) {
                    self.tombstones.remove(&id);
                }
            }
            SyncEvent::DeleteFailed { id, error } => {
                error!(%id, %error, "remote delete failed");
                self.last_error = Some("Failed to remove record from cloud database".to_string());
            }
            SyncEvent::DayCleared { date } => {
                info!(%date, "cleared remote records");
                self.clear_landed(date);
            }
            SyncEvent::ClearFailed { date, error } => {
                error!(%date, %error, "failed to clear remote records");
                self.last_error = Some("Failed to clear cloud records".to_string());
                self.clear_landed(date);
            }
        }
    }

    fn upsert_landed(&mut self, id: Uuid) {
        if let Some(count) = self.upserts_in_flight.get_mut(&id) {
            *count -= 1;
            if *count == 0 {
                self.upserts_in_flight.remove(&id);
            }
        }
    }

    /// Sends the upserts that waited for the day's remote wipe.
    fn clear_landed(&mut self, date: NaiveDate) {
        let Some(count) = self.clears_in_flight.get_mut(&date) else {
            return;
        };
        *count -= 1;
        if *count > 0 {
            return;
        }
        self.clears_in_flight.remove(&date);

        let deferred = std::mem::take(&mut self.deferred_upserts);
        if date != self.date {
            return;
        }
        let rows: Vec<LineItem> = self
            .rows
            .iter()
            .filter(|r| deferred.contains(&r.id))
            .cloned()
            .collect();
        for row in rows {
            debug!(id = %row.id, "sending upsert held back by clear");
            self.push_upsert(&row);
        }
    }

    fn observe_versions(&mut self) {
        let seen = self.rows.iter().map(|r| r.version).max().unwrap_or(0);
        self.last_version = self.last_version.max(seen);
    }

    fn push_upsert(&mut self, row: &LineItem) {
        let Some(mirror) = self.mirror.clone() else {
            return;
        };
        if !row.has_name() {
            return;
        }
        if self.clears_in_flight.contains_key(&self.date) {
            // Must not reach the server before the pending delete-by-date.
            self.deferred_upserts.insert(row.id);
            return;
        }

        let record = PatientRecord::from_item(row, self.date);
        let (date, id, version) = (self.date, row.id, row.version);
        *self.upserts_in_flight.entry(id).or_default() += 1;
        self.spawn_remote(async move {
            match mirror.upsert(&record).await {
                Ok(()) => SyncEvent::Upserted { date, id, version },
                Err(e) => SyncEvent::UpsertFailed { date, id, error: e.to_string() },
            }
        });
    }

    fn push_delete(&mut self, id: Uuid) {
        let Some(mirror) = self.mirror.clone() else {
            return;
        };

        self.spawn_remote(async move {
            match mirror.delete_by_id(id).await {
                Ok(()) => SyncEvent::Deleted { id },
                Err(e) => SyncEvent::DeleteFailed { id, error: e.to_string() },
            }
        });
    }

    fn spawn_remote<F>(&mut self, call: F)
    where
        F: Future<Output = SyncEvent> + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(call.await);
        });
    }

    fn persist(&mut self) -> Result<(), LedgerError> {
        match self.storage.save(self.date, &self.rows) {
            Ok(()) => Ok(()),
            Err(e) => Err(self.storage_failed(e)),
        }
    }

    fn storage_failed(&mut self, e: StorageError) -> LedgerError {
        error!(date = %self.date, error = %e, "local storage write failed");
        self.last_error = Some(format!("Failed to save records: {}", e));
        LedgerError::Storage(e)
    }
}
