pub mod auth;
pub mod config;
pub mod contracts;
pub mod db;

pub use auth::{
    SESSION_TTL_DAYS, hash_password, new_salt, new_session_token, session_expiry, verify_password,
};
pub use config::ServiceConfig;
pub use contracts::{
    AdjustLedgerRequest, AuthResponse, BookingView, CompleteBookingResponse, CreateBookingRequest,
    CreateOfferRequest, CreateServiceRequestRequest, DisputeView, ErrorBody, FileDisputeRequest,
    LedgerEntryView, LoginRequest, MemberView, OfferView, RateBookingRequest, RatingView,
    RegisterRequest, ResolveDisputeRequest, ServiceRequestView, UpdateProfileRequest,
};
pub use db::connect_database;
