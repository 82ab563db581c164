use thiserror::Error;

/// Errors that abort guild construction.
///
/// Everything else (unknown entity kinds, dangling references, malformed
/// list elements) is absorbed where it happens: the offending item is
/// skipped or treated as a no-op, a diagnostic is logged, and processing
/// continues. Only a snapshot that cannot be keyed at all is fatal, and in
/// that case no partially-built guild is ever handed out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SnapshotError {
    /// The snapshot payload carries no guild id.
    #[error("guild snapshot is missing its id")]
    MissingId,
}
