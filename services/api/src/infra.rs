use building_ops::workflows::checklist::ItemStatus;
use building_ops::workflows::session::{Session, SessionError, SessionId, SessionRepository};
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Sessions live in process memory; each one has its own lock so edits to
/// different sessions never wait on each other.
///
/// Nothing expires: a session and its photo bytes stay resident until the
/// client sends `DELETE /api/v1/sessions/:id` or the process exits, so clients
/// must close the sessions they open. A session whose lock was poisoned by a
/// panicking request reports [`SessionError::Unavailable`] until it is removed.
#[derive(Default, Clone)]
pub(crate) struct InMemorySessionRepository {
    sessions: Arc<Mutex<HashMap<SessionId, Arc<Mutex<Session>>>>>,
}

fn poisoned<T>(_: PoisonError<T>) -> SessionError {
    SessionError::Unavailable("session state poisoned by a failed request".to_string())
}

impl InMemorySessionRepository {
    fn handle(&self, id: &SessionId) -> Result<Arc<Mutex<Session>>, SessionError> {
        let guard = self.sessions.lock().map_err(poisoned)?;
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.lock().map_or(0, |guard| guard.len())
    }
}

impl SessionRepository for InMemorySessionRepository {
    fn create(&self, session: Session) -> Result<SessionId, SessionError> {
        let id = SessionId::generate();
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        guard.insert(id.clone(), Arc::new(Mutex::new(session)));
        debug!(session = %id, open = guard.len(), "session stored");
        Ok(id)
    }

    fn remove(&self, id: &SessionId) -> Result<(), SessionError> {
        let mut guard = self.sessions.lock().map_err(poisoned)?;
        match guard.remove(id) {
            Some(_) => Ok(()),
            None => Err(SessionError::NotFound(id.clone())),
        }
    }

    fn read<T>(&self, id: &SessionId, f: impl FnOnce(&Session) -> T) -> Result<T, SessionError> {
        let handle = self.handle(id)?;
        let session = handle.lock().map_err(poisoned)?;
        Ok(f(&session))
    }

    fn update<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, SessionError> {
        let handle = self.handle(id)?;
        let mut session = handle.lock().map_err(poisoned)?;
        Ok(f(&mut session))
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

/// Bulk status accepted on the command line.
pub(crate) fn parse_bulk_status(raw: &str) -> Result<ItemStatus, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "pending" | "pendiente" => Ok(ItemStatus::Pending),
        "ok" => Ok(ItemStatus::Ok),
        other => Err(format!("unsupported status '{other}' (use pending or ok)")),
    }
}

/// Splits `"Employee: detail"` at the first colon.
pub(crate) fn parse_incidence(raw: &str) -> Result<(String, String), String> {
    let (employee, detail) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected 'Employee: detail', got '{raw}'"))?;
    let (employee, detail) = (employee.trim(), detail.trim());
    if employee.is_empty() || detail.is_empty() {
        return Err(format!("expected 'Employee: detail', got '{raw}'"));
    }
    Ok((employee.to_string(), detail.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use building_ops::workflows::report::ReportFields;

    #[test]
    fn repository_round_trips_sessions() {
        let repository = InMemorySessionRepository::default();
        let date = parse_date("2025-03-14").expect("valid date");
        let id = repository
            .create(Session::new(ReportFields::new("Torre", date)))
            .expect("stored");
        assert_eq!(repository.len(), 1);

        repository
            .update(&id, |session| session.checklist.set_all_status(ItemStatus::Ok))
            .expect("session exists");
        let ok = repository
            .read(&id, |session| session.checklist.stats().ok)
            .expect("session exists");
        assert_eq!(ok, 15);

        repository.remove(&id).expect("session exists");
        assert_eq!(repository.len(), 0);
        assert_eq!(
            repository.read(&id, |_| ()),
            Err(SessionError::NotFound(id))
        );
    }

    #[test]
    fn panicked_edit_makes_only_that_session_unavailable() {
        let repository = InMemorySessionRepository::default();
        let date = parse_date("2025-03-14").expect("valid date");
        let broken = repository
            .create(Session::new(ReportFields::new("Torre", date)))
            .expect("stored");
        let healthy = repository
            .create(Session::new(ReportFields::new("Edificio Sur", date)))
            .expect("stored");

        let worker = repository.clone();
        let target = broken.clone();
        let outcome = std::thread::spawn(move || {
            worker.update(&target, |session| {
                if !session.checklist.is_empty() {
                    panic!("handler bug");
                }
                session.checklist.len()
            })
        })
        .join();
        assert!(outcome.is_err());

        assert!(matches!(
            repository.read(&broken, |session| session.checklist.len()),
            Err(SessionError::Unavailable(_))
        ));
        assert_eq!(
            repository.read(&healthy, |session| session.checklist.len()),
            Ok(15)
        );

        repository.remove(&broken).expect("poisoned session can be closed");
        assert_eq!(repository.len(), 1);
    }

    #[test]
    fn parses_cli_values() {
        assert!(parse_date("14/03/2025").is_err());
        assert_eq!(parse_bulk_status(" OK "), Ok(ItemStatus::Ok));
        assert!(parse_bulk_status("fail").is_err());
        assert_eq!(
            parse_incidence("Marta: llegó 20 min tarde: sin aviso"),
            Ok(("Marta".to_string(), "llegó 20 min tarde: sin aviso".to_string()))
        );
        assert!(parse_incidence("sin separador").is_err());
        assert!(parse_incidence(" : detalle").is_err());
    }
}
