use async_trait::async_trait;
use bigdecimal::BigDecimal;
use uuid::Uuid;

use super::cart::CartItemView;
use super::errors::DomainError;
use super::inventory::VariantInfo;
use super::order::{NewOrder, OrderView};
use super::payment::{CardData, CardToken, ChargeRequest, ChargeResult};
use super::shipment::{ProviderShipment, ShipmentView, TrackingInfo};
use super::status::{OrderStatus, PaymentStatus, ShipmentStatus};

pub trait CartRepository: Send + Sync + 'static {
    fn items_for_user(&self, user_id: Uuid) -> Result<Vec<CartItemView>, DomainError>;
    fn find_item(&self, user_id: Uuid, item_id: Uuid) -> Result<Option<CartItemView>, DomainError>;
    fn find_item_for_variant(
        &self,
        user_id: Uuid,
        variant_id: Uuid,
    ) -> Result<Option<CartItemView>, DomainError>;
    fn insert_item(
        &self,
        user_id: Uuid,
        variant_id: Uuid,
        quantity: i32,
        unit_price: BigDecimal,
    ) -> Result<Uuid, DomainError>;
    fn update_quantity(&self, item_id: Uuid, quantity: i32) -> Result<(), DomainError>;
    fn delete_item(&self, item_id: Uuid) -> Result<(), DomainError>;
    /// Removes every item in the user's cart; returns how many were removed.
    fn clear(&self, user_id: Uuid) -> Result<usize, DomainError>;
}

/// Authoritative per-variant stock. Reserve/restore are single conditional
/// statements at the store, never read-then-write pairs.
pub trait InventoryRepository: Send + Sync + 'static {
    fn variant_info(&self, variant_id: Uuid) -> Result<Option<VariantInfo>, DomainError>;
    /// Decrement-if-sufficient. Returns false when stock was too low; the
    /// check and the decrement are one atomic statement.
    fn reserve(&self, variant_id: Uuid, quantity: i32) -> Result<bool, DomainError>;
    fn restore(&self, variant_id: Uuid, quantity: i32) -> Result<(), DomainError>;
}

pub trait OrderRepository: Send + Sync + 'static {
    /// Persists the order and its items in a single transaction.
    fn create(&self, order: NewOrder) -> Result<OrderView, DomainError>;
    /// Compensation path for a checkout that failed after the order row was
    /// committed: puts the reserved quantities back and deletes the order in
    /// one transaction, so both land or neither does.
    fn delete_and_restock(
        &self,
        order_id: Uuid,
        restock: &[(Uuid, i32)],
    ) -> Result<(), DomainError>;
    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError>;
    fn find_by_external_reference(
        &self,
        reference: &str,
    ) -> Result<Option<OrderView>, DomainError>;
    /// Conditionally moves the order from one of `from` to `to`, recording
    /// the gateway payment projection. Returns whether a row was updated;
    /// false means the order was already past `from` and the caller must
    /// treat the event as a duplicate.
    fn transition(
        &self,
        order_id: Uuid,
        from: &[OrderStatus],
        to: OrderStatus,
        payment_id: &str,
        payment_status: PaymentStatus,
    ) -> Result<bool, DomainError>;
    /// Like `transition`, but when the move applies it also puts every item
    /// quantity back into stock inside the same transaction. Used for
    /// rejection events, where the restoration must survive exactly as many
    /// times as the transition itself.
    fn transition_and_restock(
        &self,
        order_id: Uuid,
        from: &[OrderStatus],
        to: OrderStatus,
        payment_id: &str,
        payment_status: PaymentStatus,
    ) -> Result<bool, DomainError>;
    /// Updates only the payment projection, for events that do not move the
    /// order status (pending, in_process).
    fn record_payment(
        &self,
        order_id: Uuid,
        payment_id: &str,
        payment_status: PaymentStatus,
    ) -> Result<(), DomainError>;
}

pub trait ShipmentRepository: Send + Sync + 'static {
    fn find_by_order(&self, order_id: Uuid) -> Result<Option<ShipmentView>, DomainError>;
    fn create_for_order(&self, order_id: Uuid) -> Result<ShipmentView, DomainError>;
    fn set_provider_id(
        &self,
        shipment_id: Uuid,
        me_shipment_id: &str,
        status: ShipmentStatus,
    ) -> Result<(), DomainError>;
    fn set_tracking(
        &self,
        shipment_id: Uuid,
        tracking_code: &str,
        label_url: Option<&str>,
        status: ShipmentStatus,
    ) -> Result<(), DomainError>;
    fn set_status(&self, shipment_id: Uuid, status: ShipmentStatus) -> Result<(), DomainError>;
}

/// Stateless client for the payment gateway. Mutating calls carry the
/// caller-supplied idempotency key so network retries cannot double-charge.
#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<ChargeResult, DomainError>;
    async fn get_charge(&self, payment_id: &str) -> Result<ChargeResult, DomainError>;
    async fn create_card_token(&self, card: &CardData) -> Result<CardToken, DomainError>;
}

#[async_trait]
pub trait ShippingProvider: Send + Sync + 'static {
    /// Finalizes the previously quoted shipment; returns the provider's
    /// authoritative shipment id.
    async fn checkout_shipment(
        &self,
        order_reference: &str,
    ) -> Result<ProviderShipment, DomainError>;
    async fn generate_label(&self, me_shipment_id: &str) -> Result<(), DomainError>;
    async fn get_tracking(&self, me_shipment_id: &str) -> Result<TrackingInfo, DomainError>;
}
