//! Per-user working sessions. Each session owns an independent checklist,
//! incidence log and report fields; the router serves them over HTTP.

pub mod router;

#[cfg(test)]
mod tests;

use crate::workflows::checklist::ChecklistStore;
use crate::workflows::incidences::IncidenceLog;
use crate::workflows::report::{ReportFields, ReportSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

pub use router::{attachment_disposition, session_router, UPLOAD_BODY_LIMIT};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

static SESSION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

impl SessionId {
    pub fn generate() -> Self {
        let id = SESSION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
        Self(format!("session-{id:06}"))
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub checklist: ChecklistStore,
    pub incidences: IncidenceLog,
    pub fields: ReportFields,
}

impl Session {
    /// Fresh session seeded with the built-in catalog.
    pub fn new(fields: ReportFields) -> Self {
        Self {
            checklist: ChecklistStore::standard(),
            incidences: IncidenceLog::default(),
            fields,
        }
    }

    pub fn snapshot(&self) -> ReportSnapshot {
        ReportSnapshot::capture(&self.checklist, &self.incidences, &self.fields)
    }
}

/// Session storage. Callers get closure access so every read or edit of one
/// session happens under that session's lock.
pub trait SessionRepository: Send + Sync {
    fn create(&self, session: Session) -> Result<SessionId, SessionError>;
    fn remove(&self, id: &SessionId) -> Result<(), SessionError>;
    fn read<T>(&self, id: &SessionId, f: impl FnOnce(&Session) -> T) -> Result<T, SessionError>;
    fn update<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, SessionError>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(SessionId),
    #[error("session storage unavailable: {0}")]
    Unavailable(String),
}
