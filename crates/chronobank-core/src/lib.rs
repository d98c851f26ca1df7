pub mod error;
pub mod models;
pub mod status;

pub use error::CoreError;
pub use models::{Booking, Dispute, Escrow, LedgerEntry, Member, Offer, Rating, ServiceRequest};
pub use status::{
    BookingStatus, DisputeStatus, EscrowStatus, RequestStatus, TxnType, validate_score,
};
