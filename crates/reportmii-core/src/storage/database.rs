//! SQLite-based analysis storage.
//!
//! Provides persistent storage for:
//! - Answer stores, one per (owner, analysis)
//! - Full wizard session snapshots so an analysis can be resumed

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::{data_dir, AnswerPersistence};
use crate::answers::AnswerStore;
use crate::error::StorageError;
use crate::wizard::{WizardSession, WizardStep};

/// One row of the analysis listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub analysis_id: String,
    pub name: String,
    pub catalog: String,
    pub step: WizardStep,
    pub updated_at: DateTime<Utc>,
    pub submitted: bool,
}

/// SQLite database for analyses.
pub struct AnalysisDb {
    conn: Connection,
}

impl AnalysisDb {
    /// Open the database at `~/.config/reportmii/reportmii.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, StorageError> {
        Self::open_at(data_dir()?.join("reportmii.db"))
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|source| StorageError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), rusqlite::Error> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS analyses (
                owner        TEXT NOT NULL,
                analysis_id  TEXT NOT NULL,
                name         TEXT NOT NULL DEFAULT '',
                catalog      TEXT NOT NULL,
                step         INTEGER NOT NULL,
                payload      TEXT NOT NULL,
                updated_at   TEXT NOT NULL,
                submitted_at TEXT,
                PRIMARY KEY (owner, analysis_id)
            );

            CREATE TABLE IF NOT EXISTS answers (
                owner       TEXT NOT NULL,
                analysis_id TEXT NOT NULL,
                payload     TEXT NOT NULL,
                updated_at  TEXT NOT NULL,
                PRIMARY KEY (owner, analysis_id)
            );

            CREATE INDEX IF NOT EXISTS idx_analyses_owner_updated ON analyses(owner, updated_at);",
        )?;
        Ok(())
    }

    /// Store a session snapshot together with its answers.
    ///
    /// # Errors
    /// Returns an error if serialization or either write fails; nothing is
    /// written in that case.
    pub fn save_session(&self, session: &WizardSession) -> Result<(), StorageError> {
        let payload = serde_json::to_string(session)?;
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO analyses (owner, analysis_id, name, catalog, step, payload, updated_at, submitted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT(owner, analysis_id) DO UPDATE SET
                name = excluded.name,
                catalog = excluded.catalog,
                step = excluded.step,
                payload = excluded.payload,
                updated_at = excluded.updated_at,
                submitted_at = excluded.submitted_at",
            params![
                session.owner(),
                session.analysis_id(),
                session.basic_info().name,
                session.catalog().as_str(),
                session.step().index(),
                payload,
                session.updated_at().to_rfc3339(),
                session.submitted_at().map(|t| t.to_rfc3339()),
            ],
        )?;
        Self::write_answers(&tx, session.owner(), session.analysis_id(), session.answers())?;
        tx.commit()?;
        Ok(())
    }

    /// Load a session; the answers table is authoritative for its answers.
    pub fn load_session(
        &self,
        owner: &str,
        analysis_id: &str,
    ) -> Result<Option<WizardSession>, StorageError> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM analyses WHERE owner = ?1 AND analysis_id = ?2",
                params![owner, analysis_id],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            return Ok(None);
        };
        let mut session: WizardSession = serde_json::from_str(&payload)?;
        if let Some(answers) = self.load(owner, analysis_id)? {
            session.replace_answers(answers);
        }
        Ok(Some(session))
    }

    /// Analyses of an owner, most recently updated first.
    pub fn list_sessions(&self, owner: &str) -> Result<Vec<AnalysisSummary>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT analysis_id, name, catalog, step, updated_at, submitted_at
             FROM analyses
             WHERE owner = ?1
             ORDER BY updated_at DESC",
        )?;

        let rows = stmt.query_map(params![owner], |row| {
            let step: u8 = row.get(3)?;
            let updated: String = row.get(4)?;
            let submitted_at: Option<String> = row.get(5)?;
            let updated_at = DateTime::parse_from_rfc3339(&updated)
                .map(|t| t.with_timezone(&Utc))
                .map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
                })?;
            Ok(AnalysisSummary {
                analysis_id: row.get(0)?,
                name: row.get(1)?,
                catalog: row.get(2)?,
                step: WizardStep::from_index(step).unwrap_or_default(),
                updated_at,
                submitted: submitted_at.is_some(),
            })
        })?;

        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    /// Delete an analysis and its answers. Returns whether it existed.
    pub fn delete_session(&self, owner: &str, analysis_id: &str) -> Result<bool, StorageError> {
        let tx = self.conn.unchecked_transaction()?;
        let removed = tx.execute(
            "DELETE FROM analyses WHERE owner = ?1 AND analysis_id = ?2",
            params![owner, analysis_id],
        )?;
        tx.execute(
            "DELETE FROM answers WHERE owner = ?1 AND analysis_id = ?2",
            params![owner, analysis_id],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }

    fn write_answers(
        conn: &Connection,
        owner: &str,
        analysis_id: &str,
        store: &AnswerStore,
    ) -> Result<(), StorageError> {
        conn.execute(
            "INSERT INTO answers (owner, analysis_id, payload, updated_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(owner, analysis_id) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at",
            params![owner, analysis_id, store.to_json()?, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }
}

impl AnswerPersistence for AnalysisDb {
    fn load(&self, owner: &str, analysis_id: &str) -> Result<Option<AnswerStore>, StorageError> {
        let payload: Option<String> = self
            .conn
            .query_row(
                "SELECT payload FROM answers WHERE owner = ?1 AND analysis_id = ?2",
                params![owner, analysis_id],
                |row| row.get(0),
            )
            .optional()?;
        payload
            .map(|json| AnswerStore::from_json(&json))
            .transpose()
            .map_err(StorageError::from)
    }

    fn save(&self, owner: &str, analysis_id: &str, store: &AnswerStore) -> Result<(), StorageError> {
        Self::write_answers(&self.conn, owner, analysis_id, store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::AnswerValue;
    use crate::blocks::PricingPolicy;
    use crate::catalog::CatalogKind;
    use crate::wizard::BasicInfo;
    use tempfile::TempDir;

    fn session(owner: &str) -> WizardSession {
        let mut s = WizardSession::new(owner, CatalogKind::Business, PricingPolicy::default());
        s.set_basic_info(BasicInfo {
            name: "Yearly review".into(),
            description: String::new(),
        })
        .unwrap();
        s.record_answer("business-strategy", 0, AnswerValue::Scale(4)).unwrap();
        s.record_answer("business-strategy", 3, AnswerValue::Choice("Founders".into()))
            .unwrap();
        s
    }

    #[test]
    fn test_answers_roundtrip_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("reportmii.db");
        let s = session("ana");

        {
            let db = AnalysisDb::open_at(&path).unwrap();
            db.save("ana", s.analysis_id(), s.answers()).unwrap();
        }

        let db = AnalysisDb::open_at(&path).unwrap();
        let loaded = db.load("ana", s.analysis_id()).unwrap().unwrap();
        assert_eq!(&loaded, s.answers());
        assert!(db.load("ben", s.analysis_id()).unwrap().is_none());
    }

    #[test]
    fn test_session_roundtrip() {
        let db = AnalysisDb::open_memory().unwrap();
        let s = session("ana");
        db.save_session(&s).unwrap();

        let loaded = db.load_session("ana", s.analysis_id()).unwrap().unwrap();
        assert_eq!(loaded, s);
    }

    #[test]
    fn test_answers_table_wins_over_snapshot() {
        let db = AnalysisDb::open_memory().unwrap();
        let mut s = session("ana");
        db.save_session(&s).unwrap();

        s.record_answer("business-finance", 0, AnswerValue::Scale(2)).unwrap();
        db.save("ana", s.analysis_id(), s.answers()).unwrap();

        let loaded = db.load_session("ana", s.analysis_id()).unwrap().unwrap();
        assert_eq!(loaded.answers(), s.answers());
    }

    #[test]
    fn test_list_and_delete() {
        let db = AnalysisDb::open_memory().unwrap();
        let a = session("ana");
        let b = session("ana");
        db.save_session(&a).unwrap();
        db.save_session(&b).unwrap();
        db.save_session(&session("ben")).unwrap();

        let listed = db.list_sessions("ana").unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|s| s.name == "Yearly review" && !s.submitted));
        assert_eq!(listed[0].step, WizardStep::BasicInfo);

        assert!(db.delete_session("ana", a.analysis_id()).unwrap());
        assert!(!db.delete_session("ana", a.analysis_id()).unwrap());
        assert!(db.load("ana", a.analysis_id()).unwrap().is_none());
        assert_eq!(db.list_sessions("ana").unwrap().len(), 1);
    }
}
