pub mod app;
pub mod checklist;
pub mod errors;
pub mod handlers;
pub mod history;
pub mod models;
pub mod reset;
pub mod state;
pub mod storage;
pub mod store;

pub use app::router;
pub use checklist::{Checklist, Session};
pub use errors::{ChecklistError, ChecklistResult};
pub use state::AppState;
pub use storage::{resolve_data_dir, Backend, FileBackend, MemoryBackend};
pub use store::WorkoutStore;
