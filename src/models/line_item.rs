use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One patient visit on the day's ledger.
///
/// Fee fields hold whatever text the user typed; they are only interpreted
/// as numbers when totals are computed (see `crate::billing`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub id: Uuid,
    pub name: String,
    pub review_type: String,
    pub is_free: bool,
    pub amount: String,
    pub include_procedure: bool,
    pub procedure_fee: String,
    pub include_lab: bool,
    pub test_fee: String,
    pub observations: String,
    pub include_extra: bool,
    pub extra_fee: String,
    #[serde(default, alias = "syncedToRemote")]
    pub synced: bool,
    /// Bumped on every local edit; a remote confirmation is only accepted
    /// for the version it was sent with.
    #[serde(default)]
    pub version: u64,
}

impl LineItem {
    /// A blank row with a fresh id.
    pub fn empty() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            review_type: String::new(),
            is_free: false,
            amount: String::new(),
            include_procedure: false,
            procedure_fee: String::new(),
            include_lab: false,
            test_fee: String::new(),
            observations: String::new(),
            include_extra: false,
            extra_fee: String::new(),
            synced: false,
            version: 0,
        }
    }

    /// True when there is a patient name worth mirroring remotely.
    pub fn has_name(&self) -> bool {
        !self.name.trim().is_empty()
    }
}

/// Partial update for a `LineItem`. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LineItemPatch {
    pub name: Option<String>,
    pub review_type: Option<String>,
    pub is_free: Option<bool>,
    pub amount: Option<String>,
    pub include_procedure: Option<bool>,
    pub procedure_fee: Option<String>,
    pub include_lab: Option<bool>,
    pub test_fee: Option<String>,
    pub observations: Option<String>,
    pub include_extra: Option<bool>,
    pub extra_fee: Option<String>,
}

impl LineItemPatch {
    /// Patch that overwrites every editable field with the values of `item`.
    pub fn from_item(item: &LineItem) -> Self {
        Self {
            name: Some(item.name.clone()),
            review_type: Some(item.review_type.clone()),
            is_free: Some(item.is_free),
            amount: Some(item.amount.clone()),
            include_procedure: Some(item.include_procedure),
            procedure_fee: Some(item.procedure_fee.clone()),
            include_lab: Some(item.include_lab),
            test_fee: Some(item.test_fee.clone()),
            observations: Some(item.observations.clone()),
            include_extra: Some(item.include_extra),
            extra_fee: Some(item.extra_fee.clone()),
        }
    }

    pub fn apply(self, item: &mut LineItem) {
        if let Some(v) = self.name {
            item.name = v;
        }
        if let Some(v) = self.review_type {
            item.review_type = v;
        }
        if let Some(v) = self.is_free {
            item.is_free = v;
        }
        if let Some(v) = self.amount {
            item.amount = v;
        }
        if let Some(v) = self.include_procedure {
            item.include_procedure = v;
        }
        if let Some(v) = self.procedure_fee {
            item.procedure_fee = v;
        }
        if let Some(v) = self.include_lab {
            item.include_lab = v;
        }
        if let Some(v) = self.test_fee {
            item.test_fee = v;
        }
        if let Some(v) = self.observations {
            item.observations = v;
        }
        if let Some(v) = self.include_extra {
            item.include_extra = v;
        }
        if let Some(v) = self.extra_fee {
            item.extra_fee = v;
        }
    }
}
