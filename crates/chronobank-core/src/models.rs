use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::status::{BookingStatus, DisputeStatus, EscrowStatus, RequestStatus, TxnType};

/// A registered account. `rating` is the mean of all scores received,
/// zero until the member has been rated. The password digest and salt
/// never leave the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub contact: Option<String>,
    pub avatar_url: Option<String>,
    pub bio: Option<String>,
    pub rating: Decimal,
    pub is_provider: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// A provider-authored service listing priced in time-credits per hour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Offer {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub rate_per_hour: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// A member's expression of interest in an offer. Bridges the offer to a
/// prospective booking; transitions to ACCEPTED when a booking is created
/// from it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub member_id: Uuid,
    pub note: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// A scheduled service engagement between a requesting member and a
/// provider. Created CONFIRMED; settlement moves it to COMPLETED and a
/// dispute from either party moves it to DISPUTED.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub request_id: Uuid,
    pub provider_id: Uuid,
    pub member_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
    pub status: BookingStatus,
    pub escrow_id: Uuid,
    pub rated: bool,
    pub created_at: DateTime<Utc>,
}

/// Credits held against a booking pending completion. HELD at booking
/// creation, RELEASED at settlement. REFUNDED is reserved for a future
/// cancellation path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Escrow {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: Decimal,
    pub status: EscrowStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One append-only row of a member's credit history. `amount` is signed
/// (positive credit, negative debit) and `balance_after` carries the
/// running balance computed at write time. Rows are never updated or
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: Uuid,
    pub member_id: Uuid,
    pub amount: Decimal,
    pub txn_type: TxnType,
    pub balance_after: Decimal,
    pub related_booking_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Post-completion feedback from one booking party about the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rating {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub rater_id: Uuid,
    pub rated_id: Uuid,
    pub score: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A conflict raised by a booking party, closed only by an admin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dispute {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub reason: String,
    pub status: DisputeStatus,
    pub resolution: Option<String>,
    pub admin_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    /// Whether the member is one of the two parties to this booking.
    pub fn is_party(&self, member_id: Uuid) -> bool {
        self.member_id == member_id || self.provider_id == member_id
    }

    /// The counterparty of `member_id`, if they are a party at all.
    pub fn other_party(&self, member_id: Uuid) -> Option<Uuid> {
        if member_id == self.member_id {
            Some(self.provider_id)
        } else if member_id == self.provider_id {
            Some(self.member_id)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn booking(member_id: Uuid, provider_id: Uuid) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            request_id: Uuid::new_v4(),
            provider_id,
            member_id,
            start_time: Utc::now(),
            duration_minutes: 60,
            status: BookingStatus::Confirmed,
            escrow_id: Uuid::new_v4(),
            rated: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn other_party_flips_between_member_and_provider() {
        let member = Uuid::new_v4();
        let provider = Uuid::new_v4();
        let b = booking(member, provider);

        assert_eq!(b.other_party(member), Some(provider));
        assert_eq!(b.other_party(provider), Some(member));
        assert_eq!(b.other_party(Uuid::new_v4()), None);
    }

    #[test]
    fn is_party_rejects_strangers() {
        let member = Uuid::new_v4();
        let provider = Uuid::new_v4();
        let b = booking(member, provider);

        assert!(b.is_party(member));
        assert!(b.is_party(provider));
        assert!(!b.is_party(Uuid::new_v4()));
    }
}
