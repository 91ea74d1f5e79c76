//! Error types for the lip-sync engine

use thiserror::Error;

/// Errors surfaced by the binding and capture surface.
///
/// Per-tick processing never fails: degenerate input resolves to the
/// silence fallback so the animation sink is never stalled.
#[derive(Debug, Error)]
pub enum LipsyncError {
    /// An analysis context or capture device could not be created.
    /// Recoverable: the engine stays unbound and the caller may retry
    /// with a different source or abandon lip-sync for the session.
    #[error("failed to bind audio source: {0}")]
    SourceBind(String),

    /// A tick ran with no bound source. Handled internally as a no-op
    /// republish of the last result, never a hard failure.
    #[error("no audio source bound")]
    EmptySource,
}
