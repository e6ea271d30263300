use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::ReportConfig;
use crate::workflows::report::ReportFields;
use crate::workflows::session::{
    session_router, Session, SessionError, SessionId, SessionRepository,
};

#[derive(Default)]
pub(super) struct MemorySessions {
    sessions: Mutex<HashMap<SessionId, Arc<Mutex<Session>>>>,
}

impl MemorySessions {
    fn handle(&self, id: &SessionId) -> Result<Arc<Mutex<Session>>, SessionError> {
        let guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard
            .get(id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }
}

impl SessionRepository for MemorySessions {
    fn create(&self, session: Session) -> Result<SessionId, SessionError> {
        let id = SessionId::generate();
        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard.insert(id.clone(), Arc::new(Mutex::new(session)));
        Ok(id)
    }

    fn remove(&self, id: &SessionId) -> Result<(), SessionError> {
        let mut guard = self.sessions.lock().expect("sessions mutex poisoned");
        guard
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SessionError::NotFound(id.clone()))
    }

    fn read<T>(&self, id: &SessionId, f: impl FnOnce(&Session) -> T) -> Result<T, SessionError> {
        let handle = self.handle(id)?;
        let session = handle.lock().expect("session mutex poisoned");
        Ok(f(&session))
    }

    fn update<T>(
        &self,
        id: &SessionId,
        f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, SessionError> {
        let handle = self.handle(id)?;
        let mut session = handle.lock().expect("session mutex poisoned");
        Ok(f(&mut session))
    }
}

pub(super) struct UnavailableSessions;

impl SessionRepository for UnavailableSessions {
    fn create(&self, _session: Session) -> Result<SessionId, SessionError> {
        Err(SessionError::Unavailable("offline".to_string()))
    }

    fn remove(&self, _id: &SessionId) -> Result<(), SessionError> {
        Err(SessionError::Unavailable("offline".to_string()))
    }

    fn read<T>(&self, _id: &SessionId, _f: impl FnOnce(&Session) -> T) -> Result<T, SessionError> {
        Err(SessionError::Unavailable("offline".to_string()))
    }

    fn update<T>(
        &self,
        _id: &SessionId,
        _f: impl FnOnce(&mut Session) -> T,
    ) -> Result<T, SessionError> {
        Err(SessionError::Unavailable("offline".to_string()))
    }
}

pub(super) fn report_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
}

pub(super) fn fields() -> ReportFields {
    ReportFields::new("Torre Norte", report_date())
}

pub(super) fn router_with(repository: Arc<MemorySessions>) -> Router {
    session_router(
        repository,
        ReportConfig {
            community_name: "Torre Norte".to_string(),
        },
    )
}

/// Registers a session directly in the repository and returns its id.
pub(super) fn seeded(repository: &MemorySessions) -> SessionId {
    repository
        .create(Session::new(fields()))
        .expect("memory repository accepts sessions")
}

pub(super) fn png_photo() -> Vec<u8> {
    let image = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
        120,
        80,
        image::Rgb([20, 120, 200]),
    ));
    let mut buffer = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, image::ImageOutputFormat::Png)
        .expect("png encodes");
    buffer.into_inner()
}

pub(super) fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(&body).expect("json encodes")))
        .expect("request builds")
}

pub(super) fn raw_request(method: &str, uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::from(body))
        .expect("request builds")
}

pub(super) fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request builds")
}

pub(super) async fn read_body(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
        .await
        .expect("body readable")
        .to_vec()
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = read_body(response).await;
    serde_json::from_slice(&body).expect("valid json")
}
