//! Severity classification shared by every arena-core error.
//!
//! `ConfigError` and `CastError` live next to the code that raises them; both
//! report through [`GameError`] so the runtime can route them without matching
//! on concrete variants. Errors carry plain data only.

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: Temporary conditions (cooldown, missing resource) that may
///   succeed on a later tick
/// - **Validation**: Invalid input that should be rejected without retry
/// - **Internal**: Unexpected state inconsistencies that require investigation
/// - **Fatal**: Broken configuration; the server must not start
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Recoverable error - the same input may succeed later.
    ///
    /// Examples: ability on cooldown, not enough mana
    Recoverable,

    /// Validation error - invalid input, should not retry without changes.
    ///
    /// Examples: unknown caster, target out of range
    Validation,

    /// Internal error - unexpected state inconsistency.
    ///
    /// Examples: a slot bound to an ability missing from the catalogue
    Internal,

    /// Fatal error - configuration is unusable.
    ///
    /// Examples: scaling table shorter than max rank, handler for unknown ability
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates a bug or broken configuration.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Implemented by every error enum in the crate.
///
/// Severity follows whether retrying can succeed, not how bad the failure is.
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Stable identifier of the variant, e.g. `CAST_REJECTED`.
    ///
    /// Shows up in log fields and rejection events.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
