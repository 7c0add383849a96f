//! SQLite-backed repository for wellness check-ins.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use parlance_core::error::ParlanceError;
use parlance_core::types::CheckIn;

use crate::db::Database;

/// Repository for check-in entries.
pub struct CheckInRepository {
    db: Arc<Database>,
}

impl CheckInRepository {
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Store a new check-in.
    pub fn save(&self, checkin: &CheckIn) -> Result<(), ParlanceError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO checkins (id, created_at, mood, energy, note)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    checkin.id.to_string(),
                    checkin.created_at.timestamp(),
                    checkin.mood,
                    checkin.energy as i64,
                    checkin.note,
                ],
            )
            .map_err(|e| ParlanceError::Storage(format!("Failed to save check-in: {}", e)))?;
            Ok(())
        })
    }

    /// Most recent check-ins, newest first.
    pub fn recent(&self, limit: u64) -> Result<Vec<CheckIn>, ParlanceError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn
                .prepare(
                    "SELECT id, created_at, mood, energy, note
                     FROM checkins
                     ORDER BY created_at DESC, rowid DESC
                     LIMIT ?1",
                )
                .map_err(|e| ParlanceError::Storage(e.to_string()))?;

            let rows = stmt
                .query_map(rusqlite::params![limit], |row| Ok(row_to_checkin(row)))
                .map_err(|e| ParlanceError::Storage(e.to_string()))?;

            let mut checkins = Vec::new();
            for row in rows {
                let checkin = row.map_err(|e| ParlanceError::Storage(e.to_string()))??;
                checkins.push(checkin);
            }
            Ok(checkins)
        })
    }

    /// Count total check-ins.
    pub fn count(&self) -> Result<u64, ParlanceError> {
        self.db.with_conn(|conn| {
            let count: i64 = conn
                .query_row("SELECT COUNT(*) FROM checkins", [], |row| row.get(0))
                .map_err(|e| ParlanceError::Storage(e.to_string()))?;
            Ok(count as u64)
        })
    }
}

/// Map a result row to a CheckIn.
fn row_to_checkin(row: &rusqlite::Row<'_>) -> Result<CheckIn, ParlanceError> {
    let id_str: String = row
        .get(0)
        .map_err(|e| ParlanceError::Storage(e.to_string()))?;
    let created_secs: i64 = row
        .get(1)
        .map_err(|e| ParlanceError::Storage(e.to_string()))?;
    let mood: String = row
        .get(2)
        .map_err(|e| ParlanceError::Storage(e.to_string()))?;
    let energy: i64 = row
        .get(3)
        .map_err(|e| ParlanceError::Storage(e.to_string()))?;
    let note: String = row
        .get(4)
        .map_err(|e| ParlanceError::Storage(e.to_string()))?;

    let id = Uuid::parse_str(&id_str)
        .map_err(|e| ParlanceError::Storage(format!("Invalid check-in id: {}", e)))?;
    let created_at: DateTime<Utc> = DateTime::from_timestamp(created_secs, 0)
        .ok_or_else(|| ParlanceError::Storage(format!("Invalid timestamp: {}", created_secs)))?;

    Ok(CheckIn {
        id,
        created_at,
        mood,
        energy: energy.clamp(1, 5) as u8,
        note,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn repo() -> CheckInRepository {
        CheckInRepository::new(Arc::new(Database::in_memory().unwrap()))
    }

    #[test]
    fn test_save_and_recent() {
        let repo = repo();
        let checkin = CheckIn::new("calm".to_string(), 4, "slept well".to_string());
        repo.save(&checkin).unwrap();

        let recent = repo.recent(10).unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, checkin.id);
        assert_eq!(recent[0].mood, "calm");
        assert_eq!(recent[0].energy, 4);
        assert_eq!(recent[0].note, "slept well");
    }

    #[test]
    fn test_recent_newest_first_with_limit() {
        let repo = repo();
        for i in 1..=3u8 {
            repo.save(&CheckIn::new(format!("mood-{}", i), i, String::new()))
                .unwrap();
        }

        let recent = repo.recent(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].mood, "mood-3");
        assert_eq!(recent[1].mood, "mood-2");
    }

    #[test]
    fn test_count() {
        let repo = repo();
        assert_eq!(repo.count().unwrap(), 0);
        repo.save(&CheckIn::new("ok".to_string(), 3, String::new()))
            .unwrap();
        repo.save(&CheckIn::new("good".to_string(), 4, String::new()))
            .unwrap();
        assert_eq!(repo.count().unwrap(), 2);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let repo = repo();
        let checkin = CheckIn::new("calm".to_string(), 3, String::new());
        repo.save(&checkin).unwrap();
        let err = repo.save(&checkin).unwrap_err();
        assert!(matches!(err, ParlanceError::Storage(_)));
    }
}
