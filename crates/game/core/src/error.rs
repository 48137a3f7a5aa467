//! Common error infrastructure for game-core.
//!
//! Domain errors (`SpawnError`, `InstanceError`) live next to the operations
//! that produce them. Each implements [`GameError`] so the runtime can decide
//! between rejecting a single request and discarding a whole instance.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: the request can be retried or replaced by another one
/// - **Validation**: invalid input, reject without retry
/// - **Internal**: unexpected state inconsistency that needs investigation
/// - **Fatal**: the owning instance is unusable
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: move blocked by a wall, stale instance reference.
    Recoverable,

    /// Examples: unknown player, unknown instance.
    Validation,

    /// Examples: spawn point resolved onto a wall tile.
    Internal,

    /// Examples: a generated grid with no floor tiles at all.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if the caller's session can continue after this error.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable | Self::Validation)
    }

    /// Returns true if this error indicates a bug or corrupted state.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Common trait for all game-core errors.
///
/// # Implementation Guidelines
///
/// - Use `#[derive(thiserror::Error)]` for the Display/Error impl
/// - Classify severity by recoverability, not by impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static identifier for this error variant.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_do_not_end_a_session() {
        assert!(ErrorSeverity::Validation.is_recoverable());
        assert!(!ErrorSeverity::Fatal.is_recoverable());
        assert!(ErrorSeverity::Internal.is_internal());
        assert_eq!(ErrorSeverity::Fatal.as_str(), "fatal");
    }
}
