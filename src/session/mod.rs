// ABOUTME: Session module: per-session state, the event loop that owns it, and transcripts.
// ABOUTME: One SessionState exists per running chat and is only touched by the session loop.

pub mod log;
pub mod r#loop;
pub mod state;

pub use log::TranscriptLogger;
pub use r#loop::{SessionLoopParams, run_session_loop};
pub use state::{ChatEntry, ContactMode, Role, SessionState, new_session_id};
