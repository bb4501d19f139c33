//! Admin front-end for the Quill content backend.
//!
//! - [`editor::EditSession`] -- the validate / diff / submit form pipeline.
//! - [`listing`] -- list pages and the delete confirmation dialog.
//! - [`toast::ToastBus`] -- user-facing notifications.
//! - [`app::AdminApp`] -- wiring shared by all of the above and the CLI.

pub mod app;
pub mod editor;
pub mod listing;
pub mod toast;

pub use app::AdminApp;
pub use editor::{EditMode, EditSession, FormState, SubmitOutcome};
pub use listing::{DeleteDialog, DeleteOutcome, ListPage};
pub use toast::{Toast, ToastBus, ToastLevel};
