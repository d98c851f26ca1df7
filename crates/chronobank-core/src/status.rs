use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    Disputed,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EscrowStatus {
    Held,
    Released,
    Refunded,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TxnType {
    Credit,
    Debit,
    Adjustment,
    Refund,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DisputeStatus {
    Open,
    Resolved,
    Rejected,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Accepted => "ACCEPTED",
            RequestStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "PENDING" => Ok(RequestStatus::Pending),
            "ACCEPTED" => Ok(RequestStatus::Accepted),
            "REJECTED" => Ok(RequestStatus::Rejected),
            other => Err(CoreError::Internal(format!(
                "unknown request status '{other}'"
            ))),
        }
    }
}

impl BookingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::InProgress => "IN_PROGRESS",
            BookingStatus::Completed => "COMPLETED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::Disputed => "DISPUTED",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "IN_PROGRESS" => Ok(BookingStatus::InProgress),
            "COMPLETED" => Ok(BookingStatus::Completed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            "DISPUTED" => Ok(BookingStatus::Disputed),
            other => Err(CoreError::Internal(format!(
                "unknown booking status '{other}'"
            ))),
        }
    }

    /// The allowed lifecycle graph. PENDING and IN_PROGRESS are declared
    /// states with no producing operation yet; DISPUTED is reachable from
    /// any live state because either party may dispute even a completed
    /// booking.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        match (self, next) {
            (Pending, Confirmed) | (Pending, Cancelled) => true,
            (Confirmed, InProgress) | (Confirmed, Completed) | (Confirmed, Cancelled) => true,
            (InProgress, Completed) => true,
            (Pending | Confirmed | InProgress | Completed, Disputed) => true,
            // A second dispute filing leaves the booking DISPUTED.
            (Disputed, Disputed) => true,
            _ => false,
        }
    }

    /// Settlement gate: only a CONFIRMED booking may be completed. A
    /// second completion attempt lands here with COMPLETED and is
    /// rejected, which is what makes settlement idempotent-safe.
    pub fn ensure_completable(self) -> Result<(), CoreError> {
        if self == BookingStatus::Confirmed {
            Ok(())
        } else {
            Err(CoreError::InvalidState(format!(
                "booking cannot be completed from status {}",
                self.as_str()
            )))
        }
    }

    /// Ratings are only accepted once the service has actually been
    /// settled.
    pub fn ensure_ratable(self) -> Result<(), CoreError> {
        if self == BookingStatus::Completed {
            Ok(())
        } else {
            Err(CoreError::InvalidState(format!(
                "booking cannot be rated in status {}",
                self.as_str()
            )))
        }
    }
}

impl EscrowStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EscrowStatus::Held => "HELD",
            EscrowStatus::Released => "RELEASED",
            EscrowStatus::Refunded => "REFUNDED",
        }
    }
}

impl TxnType {
    pub fn as_str(self) -> &'static str {
        match self {
            TxnType::Credit => "CREDIT",
            TxnType::Debit => "DEBIT",
            TxnType::Adjustment => "ADJUSTMENT",
            TxnType::Refund => "REFUND",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "CREDIT" => Ok(TxnType::Credit),
            "DEBIT" => Ok(TxnType::Debit),
            "ADJUSTMENT" => Ok(TxnType::Adjustment),
            "REFUND" => Ok(TxnType::Refund),
            other => Err(CoreError::Internal(format!("unknown txn type '{other}'"))),
        }
    }
}

impl DisputeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DisputeStatus::Open => "OPEN",
            DisputeStatus::Resolved => "RESOLVED",
            DisputeStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "OPEN" => Ok(DisputeStatus::Open),
            "RESOLVED" => Ok(DisputeStatus::Resolved),
            "REJECTED" => Ok(DisputeStatus::Rejected),
            other => Err(CoreError::Internal(format!(
                "unknown dispute status '{other}'"
            ))),
        }
    }

    /// Admin closure accepts only the two terminal statuses.
    pub fn parse_resolution(value: &str) -> Result<Self, CoreError> {
        match value.trim().to_ascii_uppercase().as_str() {
            "RESOLVED" => Ok(DisputeStatus::Resolved),
            "REJECTED" => Ok(DisputeStatus::Rejected),
            _ => Err(CoreError::InvalidInput(
                "status must be RESOLVED or REJECTED".to_string(),
            )),
        }
    }
}

/// A rating score must land on the 1..=5 scale.
pub fn validate_score(score: i16) -> Result<i16, CoreError> {
    if (1..=5).contains(&score) {
        Ok(score)
    } else {
        Err(CoreError::InvalidInput(
            "score must be between 1 and 5".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmed_booking_completes() {
        assert!(BookingStatus::Confirmed.ensure_completable().is_ok());
    }

    #[test]
    fn completed_booking_cannot_complete_again() {
        let err = BookingStatus::Completed.ensure_completable().unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
    }

    #[test]
    fn disputed_and_cancelled_bookings_cannot_complete() {
        assert!(BookingStatus::Disputed.ensure_completable().is_err());
        assert!(BookingStatus::Cancelled.ensure_completable().is_err());
    }

    #[test]
    fn dispute_reachable_from_completed() {
        assert!(BookingStatus::Completed.can_transition_to(BookingStatus::Disputed));
        assert!(BookingStatus::Confirmed.can_transition_to(BookingStatus::Disputed));
    }

    #[test]
    fn completed_and_disputed_not_directly_connected() {
        assert!(!BookingStatus::Disputed.can_transition_to(BookingStatus::Completed));
    }

    #[test]
    fn cancelled_is_terminal() {
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Confirmed));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Completed));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Disputed));
    }

    #[test]
    fn only_completed_bookings_are_ratable() {
        assert!(BookingStatus::Completed.ensure_ratable().is_ok());
        assert!(BookingStatus::Confirmed.ensure_ratable().is_err());
        assert!(BookingStatus::Disputed.ensure_ratable().is_err());
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::InProgress,
            BookingStatus::Completed,
            BookingStatus::Cancelled,
            BookingStatus::Disputed,
        ] {
            assert_eq!(BookingStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(BookingStatus::parse("SETTLED").is_err());
    }

    #[test]
    fn dispute_resolution_accepts_only_terminal_statuses() {
        assert_eq!(
            DisputeStatus::parse_resolution("resolved").unwrap(),
            DisputeStatus::Resolved
        );
        assert_eq!(
            DisputeStatus::parse_resolution(" REJECTED ").unwrap(),
            DisputeStatus::Rejected
        );
        assert!(DisputeStatus::parse_resolution("OPEN").is_err());
        assert!(DisputeStatus::parse_resolution("").is_err());
    }

    #[test]
    fn score_bounds() {
        assert!(validate_score(1).is_ok());
        assert!(validate_score(5).is_ok());
        assert!(validate_score(0).is_err());
        assert!(validate_score(6).is_err());
    }
}
