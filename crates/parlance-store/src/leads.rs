//! JSON-file-backed lead store for the SDR flow.
//!
//! Same persistence discipline as the order store: whole-array rewrite under
//! a per-store mutex, corrupt-file recovery on read.

use std::path::PathBuf;
use std::sync::Mutex;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use parlance_core::error::{ParlanceError, Result};
use parlance_core::types::{Lead, LeadStatus};

use crate::sink::{read_records, write_records};

/// Fields collected during a lead conversation, before persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LeadDraft {
    pub name: String,
    pub company: String,
    pub email: String,
    pub phone: Option<String>,
    pub interest: Option<String>,
}

/// File-backed store for captured leads.
pub struct LeadStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl LeadStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    /// Persist a completed draft as a new lead.
    ///
    /// Name, company, and email are required; a missing one is a validation
    /// error and nothing is written.
    pub fn create(&self, draft: LeadDraft) -> Result<Lead> {
        for (field, value) in [
            ("name", &draft.name),
            ("company", &draft.company),
            ("email", &draft.email),
        ] {
            if value.trim().is_empty() {
                return Err(ParlanceError::Validation(format!(
                    "lead is missing required field '{}'",
                    field
                )));
            }
        }

        let lead = Lead {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            name: draft.name,
            company: draft.company,
            email: draft.email,
            phone: draft.phone,
            interest: draft.interest,
            status: LeadStatus::New,
            last_updated: None,
        };

        let _guard = self
            .lock
            .lock()
            .map_err(|e| ParlanceError::Storage(format!("lead store lock poisoned: {}", e)))?;
        let mut leads: Vec<Lead> = read_records(&self.path);
        leads.push(lead.clone());
        write_records(&self.path, &leads)?;

        info!(lead_id = %lead.id, company = %lead.company, "Lead captured");
        Ok(lead)
    }

    /// All leads in insertion order.
    pub fn list(&self) -> Result<Vec<Lead>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| ParlanceError::Storage(format!("lead store lock poisoned: {}", e)))?;
        Ok(read_records(&self.path))
    }

    /// Lead history, newest first, truncated to `limit` when given.
    pub fn history(&self, limit: Option<usize>) -> Result<Vec<Lead>> {
        let mut leads = self.list()?;
        leads.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        if let Some(limit) = limit {
            leads.truncate(limit);
        }
        Ok(leads)
    }

    /// Apply a mutation to the lead with the given id and persist.
    pub fn update<F>(&self, id: Uuid, mutator: F) -> Result<Lead>
    where
        F: FnOnce(&mut Lead),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|e| ParlanceError::Storage(format!("lead store lock poisoned: {}", e)))?;
        let mut leads: Vec<Lead> = read_records(&self.path);
        let lead = leads
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| ParlanceError::NotFound(format!("lead {}", id)))?;

        mutator(lead);
        lead.last_updated = Some(Utc::now());
        let updated = lead.clone();

        write_records(&self.path, &leads)?;
        Ok(updated)
    }
}
