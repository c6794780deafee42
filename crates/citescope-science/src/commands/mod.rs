//! Handlers behind the popup and options page.
//!
//! Each handler takes plain inputs and returns what should be rendered;
//! no handler returns an error for a failed lookup.

pub mod clipboard;
pub mod options;
pub mod popup;
pub mod state;

pub use clipboard::{COPIED_LABEL, ClipboardSink, copy_citation};
pub use options::{Options, StatusMessage};
pub use popup::{DetectedList, Popup};
pub use state::PopupState;
