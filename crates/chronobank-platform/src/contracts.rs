use chrono::{DateTime, Utc};
use chronobank_core::{BookingStatus, DisputeStatus, RequestStatus, TxnType};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Member projection returned to clients. Credential material never
/// appears here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberView {
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

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub member: MemberView,
    pub token: String,
}

/// Explicit patch shape for profile updates. Absent fields are left
/// untouched; id and email are immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub contact: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOfferRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub skills: Vec<String>,
    pub rate_per_hour: Decimal,
}

/// Offer with the provider's name/avatar/rating attached at read time.
/// The snapshot is a query-side projection, not a stored field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OfferView {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub title: String,
    pub description: String,
    pub skills: Vec<String>,
    pub rate_per_hour: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub provider_name: Option<String>,
    pub provider_avatar_url: Option<String>,
    pub provider_rating: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateServiceRequestRequest {
    pub offer_id: Uuid,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequestView {
    pub id: Uuid,
    pub offer_id: Uuid,
    pub member_id: Uuid,
    pub note: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingRequest {
    pub request_id: Uuid,
    pub offer_id: Uuid,
    pub start_time: DateTime<Utc>,
    pub duration_minutes: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingView {
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
    pub offer_title: Option<String>,
    pub other_party_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteBookingResponse {
    pub booking_id: Uuid,
    pub status: BookingStatus,
    pub amount: Decimal,
    pub debit_entry_id: Uuid,
    pub credit_entry_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateBookingRequest {
    pub score: i16,
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatingView {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub rater_id: Uuid,
    pub rated_id: Uuid,
    pub score: i16,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileDisputeRequest {
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisputeView {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub reason: String,
    pub status: DisputeStatus,
    pub resolution: Option<String>,
    pub admin_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveDisputeRequest {
    pub status: String,
    pub resolution: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustLedgerRequest {
    pub member_id: Uuid,
    pub amount: Decimal,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntryView {
    pub id: Uuid,
    pub member_id: Uuid,
    pub amount: Decimal,
    pub txn_type: TxnType,
    pub balance_after: Decimal,
    pub related_booking_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Failure payload: a human-readable message plus the stable error kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: String,
}
