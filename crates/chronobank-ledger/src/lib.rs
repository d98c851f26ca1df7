//! Settlement arithmetic for the time-credit ledger.
//!
//! A completed booking settles as one balanced pair of postings: a debit
//! against the requesting member and a credit to the provider, equal in
//! absolute amount. Admin adjustments are unilateral single postings.
//! This crate owns the arithmetic; persistence and locking live with the
//! caller.

use chronobank_core::TxnType;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Money values are carried to four decimal places, matching the ledger
/// column scale.
pub const MONEY_SCALE: u32 = 4;

const MINUTES_PER_HOUR: Decimal = Decimal::from_parts(60, 0, 0, false, 0);

/// Credits owed for a booking: `rate_per_hour * duration_minutes / 60`.
pub fn settlement_amount(rate_per_hour: Decimal, duration_minutes: i32) -> Decimal {
    (rate_per_hour * Decimal::from(duration_minutes) / MINUTES_PER_HOUR).round_dp(MONEY_SCALE)
}

/// The running balance after appending a signed amount.
pub fn apply_to_balance(prior_balance: Decimal, amount: Decimal) -> Decimal {
    (prior_balance + amount).round_dp(MONEY_SCALE)
}

/// One ledger posting ready to be appended for a member. `amount` is
/// signed: positive credits, negative debits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Posting {
    pub member_id: Uuid,
    pub amount: Decimal,
    pub txn_type: TxnType,
    pub related_booking_id: Option<Uuid>,
    pub notes: String,
}

/// The balanced debit/credit pair produced by booking settlement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementPair {
    pub debit: Posting,
    pub credit: Posting,
}

impl SettlementPair {
    /// Builds the pair for a booking: requester pays, provider earns.
    /// Both postings reference the booking and carry the same absolute
    /// amount, which is what keeps the ledger conserved.
    pub fn for_booking(
        booking_id: Uuid,
        requester_id: Uuid,
        provider_id: Uuid,
        amount: Decimal,
    ) -> Self {
        let amount = amount.round_dp(MONEY_SCALE);
        SettlementPair {
            debit: Posting {
                member_id: requester_id,
                amount: -amount,
                txn_type: TxnType::Debit,
                related_booking_id: Some(booking_id),
                notes: "Booking settled: payment for service".to_string(),
            },
            credit: Posting {
                member_id: provider_id,
                amount,
                txn_type: TxnType::Credit,
                related_booking_id: Some(booking_id),
                notes: "Booking settled: earnings for service".to_string(),
            },
        }
    }

    /// The two postings in the order they are appended.
    pub fn postings(&self) -> [&Posting; 2] {
        [&self.debit, &self.credit]
    }

    pub fn is_balanced(&self) -> bool {
        self.debit.amount + self.credit.amount == Decimal::ZERO
    }
}

/// A unilateral admin balance change. No counterpart posting.
pub fn adjustment(member_id: Uuid, amount: Decimal, reason: &str) -> Posting {
    Posting {
        member_id,
        amount: amount.round_dp(MONEY_SCALE),
        txn_type: TxnType::Adjustment,
        related_booking_id: None,
        notes: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn ninety_minutes_at_two_credits_costs_three() {
        assert_eq!(settlement_amount(dec!(2), 90), dec!(3));
    }

    #[test]
    fn fractional_rates_settle_exactly() {
        assert_eq!(settlement_amount(dec!(1.5), 60), dec!(1.5));
        assert_eq!(settlement_amount(dec!(0.75), 120), dec!(1.5));
        assert_eq!(settlement_amount(dec!(0.5), 30), dec!(0.25));
    }

    #[test]
    fn odd_durations_round_to_money_scale() {
        // 1 credit/hr for 50 minutes = 0.8333...
        assert_eq!(settlement_amount(dec!(1), 50), dec!(0.8333));
    }

    #[test]
    fn pair_is_conserved() {
        let booking_id = Uuid::new_v4();
        let requester = Uuid::new_v4();
        let provider = Uuid::new_v4();
        let amount = settlement_amount(dec!(2), 90);

        let pair = SettlementPair::for_booking(booking_id, requester, provider, amount);

        assert!(pair.is_balanced());
        assert_eq!(pair.debit.amount, dec!(-3));
        assert_eq!(pair.credit.amount, dec!(3));
        assert_eq!(pair.debit.member_id, requester);
        assert_eq!(pair.credit.member_id, provider);
        assert_eq!(pair.debit.txn_type, TxnType::Debit);
        assert_eq!(pair.credit.txn_type, TxnType::Credit);
        assert_eq!(pair.debit.related_booking_id, Some(booking_id));
        assert_eq!(pair.credit.related_booking_id, Some(booking_id));
    }

    #[test]
    fn settlement_scenario_balances() {
        // Offer at 2 credits/hr, 90-minute booking. Requester starts at
        // 10 credits, provider at 0.
        let amount = settlement_amount(dec!(2), 90);
        let pair = SettlementPair::for_booking(
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4(),
            amount,
        );

        assert_eq!(apply_to_balance(dec!(10), pair.debit.amount), dec!(7));
        assert_eq!(apply_to_balance(dec!(0), pair.credit.amount), dec!(3));
    }

    #[test]
    fn running_balance_integrity_over_a_sequence() {
        // balance_after of the last entry equals the sum of all amounts.
        let amounts = [dec!(10), dec!(-3), dec!(3), dec!(-5), dec!(0.25)];
        let mut balance = Decimal::ZERO;
        for amount in amounts {
            balance = apply_to_balance(balance, amount);
        }
        assert_eq!(balance, amounts.iter().copied().sum::<Decimal>());
        assert_eq!(balance, dec!(5.25));
    }

    #[test]
    fn adjustment_can_push_balance_negative() {
        // Uncapped credit: members may go below zero.
        let posting = adjustment(Uuid::new_v4(), dec!(-5), "penalty");
        assert_eq!(posting.txn_type, TxnType::Adjustment);
        assert_eq!(posting.related_booking_id, None);
        assert_eq!(apply_to_balance(dec!(2), posting.amount), dec!(-3));
    }
}
