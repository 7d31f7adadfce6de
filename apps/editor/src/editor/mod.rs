// Editor session service.
// Owns the single editor session and wires its actions to the document service.
// Remote calls never hold the session lock; see `remote`.

pub mod handlers;
pub mod remote;
pub mod session;
pub mod template;

pub use session::EditorSession;
