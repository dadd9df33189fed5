//! Structured error types for callscope
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Nothing here ever crosses the hook boundary as a panic: a tracer that
//! kills the traced process defeats its purpose, so every failure is a
//! return code the caller can log and skip.

use thiserror::Error;

/// Per-argument resolution failures.
///
/// Under the default lenient mode only contract violations surface as
/// errors; range diagnostics are logged and resolution continues.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ResolveError {
    #[error("register-only argument spec cannot be resolved from the stack")]
    RegisterSpecOnStack,

    #[error("stack offset {0} outside the sane range 1..=100 words")]
    StackOffsetOutOfRange(isize),

    #[error("vector register {0} is not an argument register")]
    BadVectorRegister(usize),

    #[error("call context has no captured return value storage")]
    NoReturnValue,
}

/// Bind-now trampoline installation failures.
///
/// Fatal to the bind-now workaround only; the caller decides whether
/// tracing continues without it.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("failed to map {0} bytes for the trampoline table")]
    TrampolineAlloc(usize),

    #[error("failed to seal the trampoline table read+execute")]
    ProtectFailed,

    #[error("traced image has no .plt section")]
    PltSectionNotFound,

    #[error("unreadable image memory at {addr:#x} ({len} bytes)")]
    ImageRead { addr: u64, len: usize },

    #[error("PLT hook registry rejected symbol {index} ({name})")]
    RegistryRejected { index: usize, name: String },

    #[error(transparent)]
    Object(#[from] object::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_error_display() {
        let err = ResolveError::StackOffsetOutOfRange(-1);
        assert_eq!(err.to_string(), "stack offset -1 outside the sane range 1..=100 words");
    }

    #[test]
    fn test_install_error_display() {
        let err = InstallError::PltSectionNotFound;
        assert_eq!(err.to_string(), "traced image has no .plt section");

        let err = InstallError::RegistryRejected { index: 3, name: "malloc".to_string() };
        assert!(err.to_string().contains("malloc"));
        assert!(err.to_string().contains('3'));
    }
}
