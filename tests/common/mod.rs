//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use court_booking::{
    ApiBaseUrl, BookingApp, ClientConfig, MemoryStorage, Notice, Route, Session,
    SessionObserver, UserProfile,
};
use wiremock::MockServer;

/// Observer that records everything it is told.
#[derive(Debug, Default)]
pub struct RecordingObserver {
    notices: Mutex<Vec<Notice>>,
    routes: Mutex<Vec<Route>>,
}

impl RecordingObserver {
    pub fn notices(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().unwrap().clone()
    }

    pub fn count_route(&self, route: Route) -> usize {
        self.routes().into_iter().filter(|r| *r == route).count()
    }

    pub fn titles(&self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.title).collect()
    }
}

impl SessionObserver for RecordingObserver {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }

    fn navigate(&self, route: Route) {
        self.routes.lock().unwrap().push(route);
    }
}

/// Everything a test needs to drive and inspect one app.
pub struct Harness {
    pub app: Arc<BookingApp>,
    pub storage: Arc<MemoryStorage>,
    pub observer: Arc<RecordingObserver>,
}

/// Builds an app pointed at `server`, already restored.
pub fn harness(server: &MockServer) -> Harness {
    harness_with_storage(server, Arc::new(MemoryStorage::new()))
}

/// Builds an app over `storage` pointed at `server`, already restored.
pub fn harness_with_storage(server: &MockServer, storage: Arc<MemoryStorage>) -> Harness {
    let config = ClientConfig::builder()
        .base_url(ApiBaseUrl::new(format!("{}/api", server.uri())).unwrap())
        .build()
        .unwrap();
    let observer = Arc::new(RecordingObserver::default());
    let app = BookingApp::with_parts(config, storage.clone(), observer.clone()).unwrap();
    app.session().restore();

    Harness {
        app: Arc::new(app),
        storage,
        observer,
    }
}

pub fn profile(id: &str, first_name: &str) -> UserProfile {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "email": "a@x.com",
        "firstName": first_name,
        "lastName": "B",
        "roles": ["PLAYER"]
    }))
    .unwrap()
}

/// Installs a session with the given tokens.
pub fn sign_in(harness: &Harness, access_token: &str, refresh_token: Option<&str>) {
    harness
        .app
        .context()
        .install(Session::new(
            access_token.to_string(),
            refresh_token.map(String::from),
            profile("u1", "A"),
        ))
        .unwrap();
}
