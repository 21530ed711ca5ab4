pub mod clipboard;
pub mod config;
pub mod output;
pub mod segment;
pub mod state;
pub mod workflow;

pub use clipboard::{
    copy_batch, copy_item, copy_target, Clipboard, ClipboardError, CopyTarget, MemoryClipboard,
    SystemClipboard,
};
pub use segment::{segment, segment_all, Segments};
pub use state::{transition, Effect, Event, Outcome, Rejection, SessionConfig, SessionState};
pub use workflow::{build_batch, finish, Workflow, WorkflowError};
