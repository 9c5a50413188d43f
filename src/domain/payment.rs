//! Payment gateway wire-adjacent types.

use bigdecimal::BigDecimal;
use std::fmt;

use super::status::PaymentStatus;

#[derive(Debug, Clone)]
pub struct Payer {
    pub email: String,
    pub name: Option<String>,
    pub identification: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub amount: BigDecimal,
    pub token: String,
    pub payment_method_id: String,
    pub installments: i32,
    pub payer: Payer,
    pub description: Option<String>,
    /// Shared idempotency key: ties the charge to the order and makes
    /// network-level retries safe against double-charging.
    pub external_reference: String,
}

/// Raw card data sent to the gateway's tokenizer. Never persisted.
#[derive(Debug, Clone)]
pub struct CardData {
    pub card_number: String,
    pub expiration_month: i32,
    pub expiration_year: i32,
    pub security_code: String,
    pub cardholder_name: String,
}

#[derive(Debug, Clone)]
pub struct CardToken {
    pub id: String,
}

/// Closed set of user-facing rejection reasons, mapped from the gateway's
/// provider-specific detail codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    InvalidCardNumber,
    InsufficientFunds,
    AuthorizationRequired,
    ExpiredCard,
    Other,
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            RejectionReason::InvalidCardNumber => "invalid card number",
            RejectionReason::InsufficientFunds => "insufficient funds",
            RejectionReason::AuthorizationRequired => "issuer authorization required",
            RejectionReason::ExpiredCard => "expired card",
            RejectionReason::Other => "payment rejected",
        };
        f.write_str(msg)
    }
}

impl RejectionReason {
    /// Maps a gateway `status_detail` to the closed reason set.
    pub fn from_detail(detail: &str) -> RejectionReason {
        match detail {
            "cc_rejected_bad_filled_card_number" => RejectionReason::InvalidCardNumber,
            "cc_rejected_insufficient_amount" => RejectionReason::InsufficientFunds,
            "cc_rejected_call_for_authorize" => RejectionReason::AuthorizationRequired,
            "cc_rejected_card_expired" | "cc_rejected_bad_filled_date" => {
                RejectionReason::ExpiredCard
            }
            _ => RejectionReason::Other,
        }
    }
}

/// Canonical charge state as reported by the gateway. The webhook payload is
/// only a trigger; this is what local state transitions are derived from.
#[derive(Debug, Clone)]
pub struct ChargeResult {
    pub id: String,
    pub status: PaymentStatus,
    pub status_detail: Option<String>,
    pub external_reference: Option<String>,
}

impl ChargeResult {
    pub fn rejection_reason(&self) -> Option<RejectionReason> {
        if self.status != PaymentStatus::Rejected {
            return None;
        }
        Some(
            self.status_detail
                .as_deref()
                .map(RejectionReason::from_detail)
                .unwrap_or(RejectionReason::Other),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_codes_map_to_closed_set() {
        assert_eq!(
            RejectionReason::from_detail("cc_rejected_bad_filled_card_number"),
            RejectionReason::InvalidCardNumber
        );
        assert_eq!(
            RejectionReason::from_detail("cc_rejected_insufficient_amount"),
            RejectionReason::InsufficientFunds
        );
        assert_eq!(
            RejectionReason::from_detail("cc_rejected_call_for_authorize"),
            RejectionReason::AuthorizationRequired
        );
        assert_eq!(
            RejectionReason::from_detail("cc_rejected_card_expired"),
            RejectionReason::ExpiredCard
        );
        assert_eq!(
            RejectionReason::from_detail("cc_rejected_other_reason"),
            RejectionReason::Other
        );
    }

    #[test]
    fn rejection_reason_only_for_rejected_charges() {
        let approved = ChargeResult {
            id: "1".to_string(),
            status: PaymentStatus::Approved,
            status_detail: Some("accredited".to_string()),
            external_reference: None,
        };
        assert_eq!(approved.rejection_reason(), None);

        let rejected = ChargeResult {
            id: "2".to_string(),
            status: PaymentStatus::Rejected,
            status_detail: Some("cc_rejected_insufficient_amount".to_string()),
            external_reference: None,
        };
        assert_eq!(
            rejected.rejection_reason(),
            Some(RejectionReason::InsufficientFunds)
        );
    }
}
