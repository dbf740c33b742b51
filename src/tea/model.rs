//! Session model following TEA pattern
//!
//! Holds the form fields and the three remote-backed slots. Slots only change
//! when their own remote call completes.

use crate::api::{BroadcastResponse, FieldType, HealingCode, SoulArchiveEntry};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::view::{compute_geometry_image_url, BroadcastSummary};
use chrono::{DateTime, Local};

/// Per-slot request tag, increasing with every request issued for that slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RequestSeq(pub u64);

impl RequestSeq {
    pub fn next(self) -> Self {
        RequestSeq(self.0 + 1)
    }
}

impl std::fmt::Display for RequestSeq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One piece of remote-backed state
#[derive(Debug, Clone)]
pub struct Slot<T> {
    value: Option<T>,
    issued: RequestSeq,
    applied: Option<RequestSeq>,
    pending: usize,
    updated_at: Option<DateTime<Local>>,
    last_error: Option<ApiError>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            value: None,
            issued: RequestSeq::default(),
            applied: None,
            pending: 0,
            updated_at: None,
            last_error: None,
        }
    }
}

impl<T> Slot<T> {
    /// Current value, `None` while the slot is still empty
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.value.is_some()
    }

    /// Whether any request for this slot has not completed yet
    pub fn is_pending(&self) -> bool {
        self.pending > 0
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        self.updated_at
    }

    /// Failure of the most recent relevant request, kept for the harness; never shown as state
    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    /// Tag a new outgoing request
    pub fn issue(&mut self) -> RequestSeq {
        self.issued = self.issued.next();
        self.pending += 1;
        self.issued
    }

    /// True when a request at least as new as `seq` has already been applied
    pub fn is_stale(&self, seq: RequestSeq) -> bool {
        matches!(self.applied, Some(applied) if seq <= applied)
    }

    /// Store a completed result, replacing the previous one wholesale
    ///
    /// Returns false when the completion was dropped as stale.
    pub fn accept(&mut self, seq: RequestSeq, value: T, drop_stale: bool) -> bool {
        self.complete();
        if drop_stale && self.is_stale(seq) {
            return false;
        }

        self.value = Some(value);
        self.applied = Some(seq);
        self.updated_at = Some(Local::now());
        self.last_error = None;
        true
    }

    /// Note a failed request; the stored value is left untouched
    pub fn record_failure(&mut self, seq: RequestSeq, error: ApiError, drop_stale: bool) -> bool {
        self.complete();
        if drop_stale && self.is_stale(seq) {
            return false;
        }

        self.last_error = Some(error);
        true
    }

    /// Account for a completion without touching state
    pub fn discard(&mut self, _seq: RequestSeq) {
        self.complete();
    }

    fn complete(&mut self) {
        self.pending = self.pending.saturating_sub(1);
    }
}

/// Live, uncommitted form values
#[derive(Debug, Clone, PartialEq)]
pub struct FormFields {
    pub intention: String,
    pub frequency_text: String,
    pub field_type: FieldType,
    pub amplify: bool,
    pub multiplier_text: String,
    pub code_query: String,
}

impl Default for FormFields {
    fn default() -> Self {
        Self {
            intention: String::new(),
            frequency_text: "7.83".to_string(),
            field_type: FieldType::default(),
            amplify: false,
            multiplier_text: "1.0".to_string(),
            code_query: String::new(),
        }
    }
}

/// Session lifecycle state
#[derive(Debug, Clone)]
pub struct SessionState {
    /// False once the view has been torn down
    pub live: bool,

    /// Whether the startup archive load has been triggered
    pub initialized: bool,
}

/// Complete view session state
#[derive(Debug, Clone)]
pub struct Model {
    pub session: SessionState,

    pub form: FormFields,

    pub latest_broadcast: Slot<BroadcastResponse>,

    pub code_search_results: Slot<Vec<HealingCode>>,

    pub archive_entries: Slot<Vec<SoulArchiveEntry>>,

    pub config: ClientConfig,
}

impl Model {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            session: SessionState {
                live: true,
                initialized: false,
            },
            form: FormFields::default(),
            latest_broadcast: Slot::default(),
            code_search_results: Slot::default(),
            archive_entries: Slot::default(),
            config,
        }
    }

    /// Code search results; empty until the first search completes
    pub fn healing_codes(&self) -> &[HealingCode] {
        self.code_search_results
            .value()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Archive entries; empty until the startup load completes
    pub fn archives(&self) -> &[SoulArchiveEntry] {
        self.archive_entries
            .value()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Geometry image for the latest broadcast
    pub fn geometry_image_url(&self) -> Option<String> {
        compute_geometry_image_url(self.config.origin(), self.latest_broadcast.value())
    }

    pub fn broadcast_summary(&self) -> Option<BroadcastSummary> {
        self.latest_broadcast.value().map(BroadcastSummary::from_response)
    }

    /// Whether any remote call is still outstanding
    pub fn has_pending(&self) -> bool {
        self.latest_broadcast.is_pending()
            || self.code_search_results.is_pending()
            || self.archive_entries.is_pending()
    }
}

impl Default for Model {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}
