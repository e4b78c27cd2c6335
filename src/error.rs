//! Error definitions.
use thiserror::Error;

/// Returned when a view cursor is asked for an element after its last one.
///
/// This is a misuse signal at the call site, unlike the `None` that
/// `get`/`put`/`delete` return for keys that are not present.
#[derive(Error, Debug, Copy, Clone, Eq, PartialEq)]
#[error("traversal has no more elements")]
pub struct Exhausted;
