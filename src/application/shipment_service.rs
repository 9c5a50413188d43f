use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::domain::ports::{OrderRepository, ShipmentRepository, ShippingProvider};
use crate::domain::retry::RetryPolicy;
use crate::domain::shipment::ShipmentView;
use crate::domain::status::{OrderStatus, ShipmentStatus};

/// Purchases the shipping label for a paid order and keeps tracking state in
/// sync with the provider.
///
/// Label generation is asynchronous on the provider side, so the sequence is
/// a step machine that persists each partial result (provider id, then label,
/// then tracking) as soon as it is known. Re-running any step is safe; retry
/// exhaustion surfaces as `processando_me`, never as a hard error.
pub struct ShipmentSyncService<O, S, P> {
    orders: O,
    shipments: S,
    provider: P,
    tracking_retry: RetryPolicy,
}

impl<O, S, P> ShipmentSyncService<O, S, P>
where
    O: OrderRepository + Clone,
    S: ShipmentRepository + Clone,
    P: ShippingProvider,
{
    pub fn new(orders: O, shipments: S, provider: P, tracking_retry: RetryPolicy) -> Self {
        Self {
            orders,
            shipments,
            provider,
            tracking_retry,
        }
    }

    /// Runs a blocking order-repository call on the blocking thread pool so
    /// the async executor is never occupied by database work.
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

    async fn with_shipments<T, F>(&self, op: F) -> Result<T, DomainError>
    where
        F: FnOnce(&S) -> Result<T, DomainError> + Send + 'static,
        T: Send + 'static,
    {
        let shipments = self.shipments.clone();
        tokio::task::spawn_blocking(move || op(&shipments))
            .await
            .map_err(|e| DomainError::Internal(format!("blocking task failed: {}", e)))?
    }

    /// Entry point for `GET /shipment/sync`: purchases the shipment on first
    /// call for a paid order, resumes/refreshes on every later call.
    pub async fn sync(&self, order_id: Uuid) -> Result<ShipmentView, DomainError> {
        let existing = self
            .with_shipments(move |shipments| shipments.find_by_order(order_id))
            .await?;
        match existing {
            Some(shipment) => self.drive(shipment).await,
            None => self.purchase_and_release(order_id).await,
        }
    }

    pub async fn purchase_and_release(
        &self,
        order_id: Uuid,
    ) -> Result<ShipmentView, DomainError> {
        let order = self
            .with_orders(move |orders| orders.find_by_id(order_id))
            .await?
            .ok_or(DomainError::NotFound)?;
        if order.status != OrderStatus::Pago {
            return Err(DomainError::InvalidInput(format!(
                "order {} is not paid (status {})",
                order.id, order.status
            )));
        }
        let shipment = self
            .with_shipments(move |shipments| match shipments.find_by_order(order_id)? {
                Some(existing) => Ok(existing),
                None => shipments.create_for_order(order_id),
            })
            .await?;
        self.drive(shipment).await
    }

    /// Runs the remaining steps for a shipment, starting from whatever was
    /// already persisted.
    async fn drive(&self, mut shipment: ShipmentView) -> Result<ShipmentView, DomainError> {
        // Fully synced shipments only get a refresh; any provider hiccup
        // falls back to the persisted record instead of erroring.
        if shipment.tracking_code.is_some() {
            return Ok(self.refresh(shipment).await);
        }

        // Step 1: finalize the provider-side purchase.
        let shipment_id = shipment.id;
        let me_shipment_id = match shipment.me_shipment_id.clone() {
            Some(id) => id,
            None => {
                let order_id = shipment.order_id;
                let order = self
                    .with_orders(move |orders| orders.find_by_id(order_id))
                    .await?
                    .ok_or(DomainError::NotFound)?;
                match self.provider.checkout_shipment(&order.external_reference).await {
                    Ok(provider_shipment) => {
                        let provider_id = provider_shipment.id.clone();
                        self.with_shipments(move |shipments| {
                            shipments.set_provider_id(
                                shipment_id,
                                &provider_id,
                                ShipmentStatus::Released,
                            )
                        })
                        .await?;
                        shipment.me_shipment_id = Some(provider_shipment.id.clone());
                        shipment.status = ShipmentStatus::Released;
                        provider_shipment.id
                    }
                    Err(e) if e.is_transient() => {
                        log::warn!(
                            "shipment {}: provider checkout unavailable: {}",
                            shipment.id,
                            e
                        );
                        self.with_shipments(move |shipments| {
                            shipments.set_status(shipment_id, ShipmentStatus::ProcessandoMe)
                        })
                        .await?;
                        shipment.status = ShipmentStatus::ProcessandoMe;
                        return Ok(shipment);
                    }
                    Err(e) => return Err(e),
                }
            }
        };

        // Step 2: request label generation. The provider generates labels
        // asynchronously; a failure here only delays step 3.
        if shipment.label_url.is_none() {
            if let Err(e) = self.provider.generate_label(&me_shipment_id).await {
                log::warn!(
                    "shipment {}: label generation not ready at provider: {}",
                    shipment.id,
                    e
                );
            }
        }

        // Step 3: poll for tracking with bounded fixed-delay retry.
        let provider = &self.provider;
        let me_ref = me_shipment_id.as_str();
        let polled = self
            .tracking_retry
            .run(|attempt| async move {
                let info = provider.get_tracking(me_ref).await?;
                if info.tracking_code.is_some() {
                    Ok(info)
                } else {
                    Err(DomainError::Processing(format!(
                        "tracking unavailable at provider (attempt {})",
                        attempt
                    )))
                }
            })
            .await;

        match polled {
            Ok(info) => {
                if let Some(code) = info.tracking_code.clone() {
                    let label = info.label_url.clone();
                    self.with_shipments(move |shipments| {
                        shipments.set_tracking(
                            shipment_id,
                            &code,
                            label.as_deref(),
                            ShipmentStatus::ProntoParaEnvio,
                        )
                    })
                    .await?;
                    shipment.tracking_code = info.tracking_code;
                    if info.label_url.is_some() {
                        shipment.label_url = info.label_url;
                    }
                    shipment.status = ShipmentStatus::ProntoParaEnvio;
                }
                Ok(shipment)
            }
            Err(e) if e.is_transient() => {
                log::info!(
                    "shipment {}: still processing at provider after {} attempts",
                    shipment.id,
                    self.tracking_retry.max_attempts()
                );
                self.with_shipments(move |shipments| {
                    shipments.set_status(shipment_id, ShipmentStatus::ProcessandoMe)
                })
                .await?;
                shipment.status = ShipmentStatus::ProcessandoMe;
                Ok(shipment)
            }
            Err(e) => Err(e),
        }
    }

    /// One refresh fetch for an already-synced shipment; persisted state is
    /// the fallback for every failure mode.
    async fn refresh(&self, mut shipment: ShipmentView) -> ShipmentView {
        let Some(me_shipment_id) = shipment.me_shipment_id.clone() else {
            return shipment;
        };
        match self.provider.get_tracking(&me_shipment_id).await {
            Ok(info) if info.tracking_code.is_some() => {
                let shipment_id = shipment.id;
                let code = info.tracking_code.clone().unwrap_or_default();
                let stored_code = code.clone();
                let label = info.label_url.clone();
                let persisted = self
                    .with_shipments(move |shipments| {
                        shipments.set_tracking(
                            shipment_id,
                            &code,
                            label.as_deref(),
                            ShipmentStatus::ProntoParaEnvio,
                        )
                    })
                    .await;
                if let Err(e) = persisted {
                    log::error!("shipment {}: failed to persist refresh: {}", shipment.id, e);
                    return shipment;
                }
                shipment.tracking_code = Some(stored_code);
                if info.label_url.is_some() {
                    shipment.label_url = info.label_url;
                }
                shipment.status = ShipmentStatus::ProntoParaEnvio;
                shipment
            }
            Ok(_) => shipment,
            Err(e) => {
                log::warn!(
                    "shipment {}: refresh failed, serving persisted state: {}",
                    shipment.id,
                    e
                );
                shipment
            }
        }
    }
}
