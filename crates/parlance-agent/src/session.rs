//! Per-conversation session state.
//!
//! Tracks which fields of the in-progress lead form have been gathered,
//! plus a small set of conversation flags. The state is an explicit struct
//! with one slot per known field and an enumerated phase rather than a bag
//! of optional keys; fields may still arrive in any order, re-supplying a
//! field overwrites it, and completeness is evaluated structurally.
//!
//! Session state lives only in process memory and is discarded when the
//! conversation ends. It is never persisted.

use std::collections::HashMap;
use std::sync::Mutex;

use uuid::Uuid;

use parlance_store::LeadDraft;

/// Fields required before a lead can be saved.
pub const REQUIRED_LEAD_FIELDS: [&str; 3] = ["name", "company", "email"];

/// Where the collection form stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CollectPhase {
    /// Still gathering required fields.
    #[default]
    Collecting,
    /// All required fields present; awaiting confirmation.
    ReadyToConfirm,
    /// Confirmed and persisted.
    Completed,
}

/// Mutable state for one live conversation.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    name: Option<String>,
    company: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    interest: Option<String>,
    pub phase: CollectPhase,
    /// The record currently being worked on, by key.
    pub current_subject: Option<Uuid>,
    /// Whether the caller has passed any domain verification step.
    pub verified: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a known field, overwriting any previous value.
    ///
    /// Returns false for unknown field names. Advances the phase to
    /// `ReadyToConfirm` once every required field is present, but never
    /// moves a `Completed` session backward.
    pub fn set_field(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "name" => &mut self.name,
            "company" => &mut self.company,
            "email" => &mut self.email,
            "phone" => &mut self.phone,
            "interest" => &mut self.interest,
            _ => return false,
        };
        *slot = Some(value);
        self.refresh_phase();
        true
    }

    /// Current value of a known field.
    pub fn field(&self, field: &str) -> Option<&str> {
        match field {
            "name" => self.name.as_deref(),
            "company" => self.company.as_deref(),
            "email" => self.email.as_deref(),
            "phone" => self.phone.as_deref(),
            "interest" => self.interest.as_deref(),
            _ => None,
        }
    }

    /// Names of the fields gathered so far.
    pub fn collected(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.company.is_some() {
            fields.push("company");
        }
        if self.email.is_some() {
            fields.push("email");
        }
        if self.phone.is_some() {
            fields.push("phone");
        }
        if self.interest.is_some() {
            fields.push("interest");
        }
        fields
    }

    /// True iff every required field has been gathered.
    pub fn is_complete(&self, required: &[&str]) -> bool {
        required.iter().all(|f| self.field(f).is_some())
    }

    /// Required fields still missing, in the order given.
    pub fn missing<'a>(&self, required: &[&'a str]) -> Vec<&'a str> {
        required
            .iter()
            .copied()
            .filter(|f| self.field(f).is_none())
            .collect()
    }

    /// Mark the form confirmed.
    pub fn confirm(&mut self) {
        self.phase = CollectPhase::Completed;
    }

    /// Build a lead draft once the required fields are present.
    pub fn lead_draft(&self) -> Option<LeadDraft> {
        if !self.is_complete(&REQUIRED_LEAD_FIELDS) {
            return None;
        }
        Some(LeadDraft {
            name: self.name.clone().unwrap_or_default(),
            company: self.company.clone().unwrap_or_default(),
            email: self.email.clone().unwrap_or_default(),
            phone: self.phone.clone(),
            interest: self.interest.clone(),
        })
    }

    /// Clear the form for a new lead in the same conversation.
    pub fn reset_form(&mut self) {
        self.name = None;
        self.company = None;
        self.email = None;
        self.phone = None;
        self.interest = None;
        self.phase = CollectPhase::Collecting;
    }

    fn refresh_phase(&mut self) {
        if self.phase == CollectPhase::Completed {
            return;
        }
        self.phase = if self.is_complete(&REQUIRED_LEAD_FIELDS) {
            CollectPhase::ReadyToConfirm
        } else {
            CollectPhase::Collecting
        };
    }
}

/// Holder for all live session states, keyed by session id.
///
/// `with_session` lazily creates a zero-valued state on first use and never
/// errors; a poisoned lock is recovered rather than propagated.
#[derive(Debug, Default)]
pub struct SessionManager {
    sessions: Mutex<HashMap<Uuid, SessionState>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run a closure against the state for `session_id`, creating it if
    /// absent.
    pub fn with_session<R>(&self, session_id: Uuid, f: impl FnOnce(&mut SessionState) -> R) -> R {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let state = sessions.entry(session_id).or_default();
        f(state)
    }

    /// Cloned snapshot of a session's state, if it exists.
    pub fn snapshot(&self, session_id: Uuid) -> Option<SessionState> {
        let sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.get(&session_id).cloned()
    }

    /// Discard a session's state. Returns true if it existed.
    pub fn end(&self, session_id: Uuid) -> bool {
        let mut sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.remove(&session_id).is_some()
    }

    pub fn len(&self) -> usize {
        let sessions = self
            .sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
