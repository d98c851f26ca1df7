use thiserror::Error;

/// Business-rule failures surfaced by every operation. Each variant
/// carries a human-readable message; `kind` gives the stable
/// classification the HTTP layer serializes alongside it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Referenced entity absent.
    #[error("{0}")]
    NotFound(String),

    /// Authenticated but not permitted: wrong party or non-admin.
    #[error("{0}")]
    Forbidden(String),

    /// Missing, malformed, or unresolvable credential.
    #[error("{0}")]
    Unauthenticated(String),

    /// Missing or malformed fields, non-positive numeric fields.
    #[error("{0}")]
    InvalidInput(String),

    /// Operation not valid for the entity's current lifecycle state.
    #[error("{0}")]
    InvalidState(String),

    /// Duplicate email on register, already-rated booking.
    #[error("{0}")]
    Conflict(String),

    /// Storage or transport failure. Never exposes query text.
    #[error("internal error: {0}")]
    Internal(String),
}

impl CoreError {
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::NotFound(_) => "NOT_FOUND",
            CoreError::Forbidden(_) => "FORBIDDEN",
            CoreError::Unauthenticated(_) => "UNAUTHENTICATED",
            CoreError::InvalidInput(_) => "INVALID_INPUT",
            CoreError::InvalidState(_) => "INVALID_STATE",
            CoreError::Conflict(_) => "CONFLICT",
            CoreError::Internal(_) => "INTERNAL",
        }
    }

    pub fn not_found(entity: &str) -> Self {
        CoreError::NotFound(format!("{entity} not found"))
    }
}

#[cfg(test)]
mod tests {
    use super::CoreError;

    #[test]
    fn kinds_are_stable() {
        assert_eq!(CoreError::not_found("booking").kind(), "NOT_FOUND");
        assert_eq!(
            CoreError::Forbidden("only the provider may complete a booking".into()).kind(),
            "FORBIDDEN"
        );
        assert_eq!(
            CoreError::Unauthenticated("invalid credentials".into()).kind(),
            "UNAUTHENTICATED"
        );
        assert_eq!(
            CoreError::Conflict("email already registered".into()).kind(),
            "CONFLICT"
        );
    }

    #[test]
    fn not_found_message_names_the_entity() {
        assert_eq!(CoreError::not_found("offer").to_string(), "offer not found");
    }

    #[test]
    fn internal_errors_are_prefixed() {
        let err = CoreError::Internal("connection reset".into());
        assert_eq!(err.to_string(), "internal error: connection reset");
    }
}
