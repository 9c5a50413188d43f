use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::domain::errors::DomainError;
use crate::domain::payment::{CardData, CardToken, ChargeRequest, ChargeResult};
use crate::domain::ports::{OrderRepository, PaymentGateway};
use crate::domain::retry::RetryPolicy;
use crate::domain::status::{OrderStatus, PaymentStatus};

type HmacSha256 = Hmac<Sha256>;

/// Verifies the gateway's webhook signature: HMAC-SHA256 over
/// `request_id + "." + raw_body`, hex-encoded, optionally prefixed `v1=`.
pub fn verify_webhook_signature(
    secret: &str,
    request_id: &str,
    raw_body: &[u8],
    signature: &str,
) -> bool {
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(request_id.as_bytes());
    mac.update(b".");
    mac.update(raw_body);
    let expected = hex::encode(mac.finalize().into_bytes());
    let provided = signature.strip_prefix("v1=").unwrap_or(signature);
    expected.eq_ignore_ascii_case(provided)
}

/// Drives charges and webhook notifications onto order state.
///
/// A webhook body is a trigger, not a source of truth: every mutation starts
/// from a fresh `get_charge` against the gateway, so stale, reordered, or
/// forged payloads cannot corrupt local state. Transitions are conditioned on
/// the stored status, which makes duplicate delivery a no-op.
pub struct PaymentService<O, G> {
    orders: O,
    gateway: G,
    lookup_retry: RetryPolicy,
}

impl<O, G> PaymentService<O, G>
where
    O: OrderRepository + Clone,
    G: PaymentGateway,
{
    pub fn new(orders: O, gateway: G, lookup_retry: RetryPolicy) -> Self {
        Self {
            orders,
            gateway,
            lookup_retry,
        }
    }

    /// Runs a blocking repository call on the blocking thread pool so the
    /// async executor is never occupied by database work.
    async fn with_orders<T, F>(&self, op: F) -> Result<T, DomainError>
    where
        F: FnOnce(&O) -> Result<T, DomainError> + Send + 'static,
        T: Send + 'static,
    {
        let orders = self.orders.clone();
        tokio::task::spawn_blocking(move || op(&orders))
            .await
            .map_err(|e| DomainError::Internal(format!("blocking task failed: {}", e)))?
    }

    pub async fn create_card_token(&self, card: CardData) -> Result<CardToken, DomainError> {
        self.gateway.create_card_token(&card).await
    }

    /// Creates a charge at the gateway and projects the synchronous outcome
    /// onto the order. The webhook channel will deliver the same state again
    /// later; both paths converge on `apply_charge`.
    pub async fn create_charge(
        &self,
        request: ChargeRequest,
    ) -> Result<ChargeResult, DomainError> {
        let charge = self.gateway.create_charge(&request).await?;
        if let Err(e) = self.apply_charge(&charge).await {
            log::warn!(
                "charge {}: created but projection onto order failed: {}",
                charge.id,
                e
            );
        }
        Ok(charge)
    }

    /// Handles an inbound gateway notification for `payment_id`.
    ///
    /// Returns Ok even when no matching order is found after the bounded
    /// lookup retry: the handler acknowledges regardless, and the gateway's
    /// periodic redelivery will land once checkout has committed the row.
    pub async fn process_webhook(&self, payment_id: &str) -> Result<(), DomainError> {
        let charge = self.gateway.get_charge(payment_id).await?;
        self.apply_charge(&charge).await
    }

    async fn apply_charge(&self, charge: &ChargeResult) -> Result<(), DomainError> {
        let Some(reference) = charge.external_reference.as_deref() else {
            log::warn!(
                "charge {} carries no external reference; nothing to update",
                charge.id
            );
            return Ok(());
        };

        // The order row may not be committed yet if the gateway notified
        // faster than checkout finished. Poll briefly before giving up.
        let lookup = self
            .lookup_retry
            .run(|_attempt| {
                let orders = self.orders.clone();
                let reference = reference.to_string();
                async move {
                    let found = tokio::task::spawn_blocking(move || {
                        orders.find_by_external_reference(&reference)
                    })
                    .await
                    .map_err(|e| {
                        DomainError::Internal(format!("blocking task failed: {}", e))
                    })??;
                    found.ok_or(DomainError::NotFound)
                }
            })
            .await;

        let order = match lookup {
            Ok(order) => order,
            Err(DomainError::NotFound) => {
                log::warn!(
                    "charge {}: no order for reference {} after {} attempts; acknowledging anyway",
                    charge.id,
                    reference,
                    self.lookup_retry.max_attempts()
                );
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let order_id = order.id;
        let charge_id = charge.id.clone();
        match charge.status {
            PaymentStatus::Approved => {
                let moved = self
                    .with_orders(move |orders| {
                        orders.transition(
                            order_id,
                            &[OrderStatus::Pendente],
                            OrderStatus::Pago,
                            &charge_id,
                            PaymentStatus::Approved,
                        )
                    })
                    .await?;
                if moved {
                    log::info!("order {} paid (charge {})", order_id, charge.id);
                } else {
                    log::debug!("order {}: duplicate approval ignored", order_id);
                }
            }
            PaymentStatus::Rejected => {
                // A correction after an earlier approval also lands here, so
                // `pago` is an accepted source state. The transition and the
                // stock restoration commit together; if the write fails, the
                // error propagates so the gateway redelivers and the whole
                // unit is retried.
                let moved = self
                    .with_orders(move |orders| {
                        orders.transition_and_restock(
                            order_id,
                            &[OrderStatus::Pendente, OrderStatus::Pago],
                            OrderStatus::PagamentoRejeitado,
                            &charge_id,
                            PaymentStatus::Rejected,
                        )
                    })
                    .await?;
                if moved {
                    if let Some(reason) = charge.rejection_reason() {
                        log::info!("order {} rejected: {}", order_id, reason);
                    }
                }
            }
            PaymentStatus::Refunded => {
                let moved = self
                    .with_orders(move |orders| {
                        orders.transition(
                            order_id,
                            &[OrderStatus::Pago],
                            OrderStatus::Reembolsado,
                            &charge_id,
                            PaymentStatus::Refunded,
                        )
                    })
                    .await?;
                if !moved {
                    log::debug!("order {}: refund event without matching paid state", order_id);
                }
            }
            PaymentStatus::Pending | PaymentStatus::InProcess => {
                // No status movement; keep the payment projection current.
                let status = charge.status;
                self.with_orders(move |orders| {
                    orders.record_payment(order_id, &charge_id, status)
                })
                .await?;
            }
        }
        Ok(())
    }
}
