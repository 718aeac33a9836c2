//! Runtime errors and the fatal exit path.

use std::io::Write;

/// A condition that ends the program.
///
/// Aria has no exception mechanism: every error reaching an entry point is
/// printed and the process exits with status 1.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuntimeError {
    #[error("Index OOB (index {index}, length {len})")]
    IndexOutOfBounds { index: i64, len: usize },

    #[error("Index must be an integer.")]
    NonIntegerIndex,

    #[error("Division by zero (mod).")]
    DivisionByZero,

    #[error("Get on null object.")]
    GetOnNull,

    #[error("Set on null object.")]
    SetOnNull,

    #[error("List operation on a non-list value.")]
    NotAList,

    #[error("Out of memory allocating {size} bytes.")]
    OutOfMemory { size: usize },

    #[error("Failed to spawn thread: {0}")]
    ThreadSpawn(String),
}

/// Print `Runtime Error: <message>` and exit with status 1.
pub(crate) fn fatal(err: &RuntimeError) -> ! {
    tracing::error!(error = ?err, "fatal runtime error");
    let _ = std::io::stdout().flush();
    eprintln!("Runtime Error: {err}");
    std::process::exit(1)
}

/// Unwrap a runtime result at a C entry point.
pub(crate) trait OrFatal<T> {
    fn or_fatal(self) -> T;
}

impl<T> OrFatal<T> for Result<T, RuntimeError> {
    #[inline]
    fn or_fatal(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => fatal(&err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            RuntimeError::IndexOutOfBounds { index: 3, len: 0 }.to_string(),
            "Index OOB (index 3, length 0)"
        );
        assert_eq!(
            RuntimeError::DivisionByZero.to_string(),
            "Division by zero (mod)."
        );
        assert_eq!(RuntimeError::GetOnNull.to_string(), "Get on null object.");
        assert_eq!(
            RuntimeError::OutOfMemory { size: 16 }.to_string(),
            "Out of memory allocating 16 bytes."
        );
    }

    #[test]
    fn test_or_fatal_passes_values_through() {
        let ok: Result<u8, RuntimeError> = Ok(7);
        assert_eq!(ok.or_fatal(), 7);
    }
}
