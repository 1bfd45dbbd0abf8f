use crate::checklist::Session;
use crate::storage::FileBackend;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<Mutex<Session<FileBackend>>>,
}

impl AppState {
    pub fn new(session: Session<FileBackend>) -> Self {
        Self {
            session: Arc::new(Mutex::new(session)),
        }
    }
}
