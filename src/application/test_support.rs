//! In-memory fakes for the domain ports, shared by the service tests.

use std::collections::{HashMap, VecDeque};
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::account::{Account, AccountKind};
use crate::domain::cart::CartItemView;
use crate::domain::errors::DomainError;
use crate::domain::inventory::VariantInfo;
use crate::domain::order::{NewOrder, OrderItemView, OrderView};
use crate::domain::payment::{CardData, CardToken, ChargeRequest, ChargeResult};
use crate::domain::ports::{
    CartRepository, InventoryRepository, OrderRepository, PaymentGateway, ShipmentRepository,
    ShippingProvider,
};
use crate::domain::shipment::{ProviderShipment, ShipmentView, TrackingInfo};
use crate::domain::status::{OrderStatus, PaymentStatus, ShipmentStatus};

pub fn account() -> Account {
    Account::new(Uuid::new_v4(), AccountKind::Customer)
}

pub fn dec(s: &str) -> BigDecimal {
    BigDecimal::from_str(s).expect("valid decimal")
}

// ── Inventory ────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryInventory {
    variants: Arc<Mutex<HashMap<Uuid, VariantInfo>>>,
}

impl InMemoryInventory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_variant(
        &self,
        product_name: &str,
        product_active: bool,
        price: &str,
        discounted_price: Option<&str>,
        has_discount: bool,
        stock: i32,
    ) -> Uuid {
        let id = Uuid::new_v4();
        let info = VariantInfo {
            id,
            product_id: Uuid::new_v4(),
            product_name: product_name.to_string(),
            product_active,
            size: "M".to_string(),
            color: "preto".to_string(),
            price: dec(price),
            discounted_price: discounted_price.map(dec),
            has_discount,
            stock,
        };
        self.variants.lock().unwrap().insert(id, info);
        id
    }

    pub fn stock_of(&self, variant_id: Uuid) -> i32 {
        self.variants.lock().unwrap()[&variant_id].stock
    }
}

impl InventoryRepository for InMemoryInventory {
    fn variant_info(&self, variant_id: Uuid) -> Result<Option<VariantInfo>, DomainError> {
        Ok(self.variants.lock().unwrap().get(&variant_id).cloned())
    }

    fn reserve(&self, variant_id: Uuid, quantity: i32) -> Result<bool, DomainError> {
        let mut variants = self.variants.lock().unwrap();
        let variant = variants
            .get_mut(&variant_id)
            .ok_or(DomainError::NotFound)?;
        if variant.stock < quantity {
            return Ok(false);
        }
        variant.stock -= quantity;
        Ok(true)
    }

    fn restore(&self, variant_id: Uuid, quantity: i32) -> Result<(), DomainError> {
        let mut variants = self.variants.lock().unwrap();
        let variant = variants
            .get_mut(&variant_id)
            .ok_or(DomainError::NotFound)?;
        variant.stock += quantity;
        Ok(())
    }
}

// ── Cart ─────────────────────────────────────────────────────────────────────

struct StoredCartItem {
    id: Uuid,
    user_id: Uuid,
    variant_id: Uuid,
    quantity: i32,
    unit_price: BigDecimal,
}

#[derive(Clone)]
pub struct InMemoryCart {
    items: Arc<Mutex<Vec<StoredCartItem>>>,
    inventory: InMemoryInventory,
    pub fail_clear: Arc<AtomicBool>,
}

impl InMemoryCart {
    pub fn new(inventory: InMemoryInventory) -> Self {
        Self {
            items: Arc::new(Mutex::new(Vec::new())),
            inventory,
            fail_clear: Arc::new(AtomicBool::new(false)),
        }
    }

    fn view(&self, item: &StoredCartItem) -> CartItemView {
        let variant = self
            .inventory
            .variant_info(item.variant_id)
            .unwrap()
            .expect("test variant must exist");
        CartItemView {
            id: item.id,
            variant_id: item.variant_id,
            product_id: variant.product_id,
            product_name: variant.product_name,
            size: variant.size,
            color: variant.color,
            quantity: item.quantity,
            unit_price: item.unit_price.clone(),
            added_at: Utc::now(),
        }
    }
}

impl CartRepository for InMemoryCart {
    fn items_for_user(&self, user_id: Uuid) -> Result<Vec<CartItemView>, DomainError> {
        let items = self.items.lock().unwrap();
        Ok(items
            .iter()
            .filter(|i| i.user_id == user_id)
            .map(|i| self.view(i))
            .collect())
    }

    fn find_item(&self, user_id: Uuid, item_id: Uuid) -> Result<Option<CartItemView>, DomainError> {
        let items = self.items.lock().unwrap();
        Ok(items
            .iter()
            .find(|i| i.id == item_id && i.user_id == user_id)
            .map(|i| self.view(i)))
    }

    fn find_item_for_variant(
        &self,
        user_id: Uuid,
        variant_id: Uuid,
    ) -> Result<Option<CartItemView>, DomainError> {
        let items = self.items.lock().unwrap();
        Ok(items
            .iter()
            .find(|i| i.user_id == user_id && i.variant_id == variant_id)
            .map(|i| self.view(i)))
    }

    fn insert_item(
        &self,
        user_id: Uuid,
        variant_id: Uuid,
        quantity: i32,
        unit_price: BigDecimal,
    ) -> Result<Uuid, DomainError> {
        let id = Uuid::new_v4();
        self.items.lock().unwrap().push(StoredCartItem {
            id,
            user_id,
            variant_id,
            quantity,
            unit_price,
        });
        Ok(id)
    }

    fn update_quantity(&self, item_id: Uuid, quantity: i32) -> Result<(), DomainError> {
        let mut items = self.items.lock().unwrap();
        let item = items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or(DomainError::NotFound)?;
        item.quantity = quantity;
        Ok(())
    }

    fn delete_item(&self, item_id: Uuid) -> Result<(), DomainError> {
        self.items.lock().unwrap().retain(|i| i.id != item_id);
        Ok(())
    }

    fn clear(&self, user_id: Uuid) -> Result<usize, DomainError> {
        if self.fail_clear.load(Ordering::SeqCst) {
            return Err(DomainError::Internal("simulated clear failure".to_string()));
        }
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|i| i.user_id != user_id);
        Ok(before - items.len())
    }
}

// ── Orders ───────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryOrders {
    orders: Arc<Mutex<HashMap<Uuid, OrderView>>>,
    inventory: InMemoryInventory,
    pub fail_create: Arc<AtomicBool>,
    pub fail_restock: Arc<AtomicBool>,
}

impl InMemoryOrders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shares the inventory fake so restocking operations are observable
    /// through `stock_of`.
    pub fn with_inventory(inventory: InMemoryInventory) -> Self {
        Self {
            inventory,
            ..Self::default()
        }
    }

    pub fn count(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    pub fn get(&self, id: Uuid) -> Option<OrderView> {
        self.orders.lock().unwrap().get(&id).cloned()
    }

    /// Seeds a committed order directly, bypassing checkout.
    pub fn put(&self, order: OrderView) {
        self.orders.lock().unwrap().insert(order.id, order);
    }
}

impl OrderRepository for InMemoryOrders {
    fn create(&self, order: NewOrder) -> Result<OrderView, DomainError> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(DomainError::Internal(
                "simulated write failure".to_string(),
            ));
        }
        let mut orders = self.orders.lock().unwrap();
        if orders
            .values()
            .any(|o| o.external_reference == order.external_reference)
        {
            return Err(DomainError::DuplicateReference(order.external_reference));
        }
        let now = Utc::now();
        let view = OrderView {
            id: Uuid::new_v4(),
            user_id: order.user_id,
            subtotal: order.subtotal,
            shipping_cost: order.shipping_cost,
            total: order.total,
            status: OrderStatus::Pendente,
            payment_id: None,
            payment_status: None,
            external_reference: order.external_reference,
            address: order.address,
            created_at: now,
            updated_at: now,
            items: order
                .items
                .into_iter()
                .map(|i| OrderItemView {
                    id: Uuid::new_v4(),
                    product_id: i.product_id,
                    variant_id: i.variant_id,
                    quantity: i.quantity,
                    unit_price: i.unit_price,
                    selected_size: i.selected_size,
                    selected_color: i.selected_color,
                })
                .collect(),
        };
        orders.insert(view.id, view.clone());
        Ok(view)
    }

    fn delete_and_restock(
        &self,
        order_id: Uuid,
        restock: &[(Uuid, i32)],
    ) -> Result<(), DomainError> {
        if self.fail_restock.load(Ordering::SeqCst) {
            return Err(DomainError::Transient(
                "simulated restock failure".to_string(),
            ));
        }
        for (variant_id, quantity) in restock {
            self.inventory.restore(*variant_id, *quantity)?;
        }
        self.orders.lock().unwrap().remove(&order_id);
        Ok(())
    }

    fn find_by_id(&self, id: Uuid) -> Result<Option<OrderView>, DomainError> {
        Ok(self.orders.lock().unwrap().get(&id).cloned())
    }

    fn find_by_external_reference(
        &self,
        reference: &str,
    ) -> Result<Option<OrderView>, DomainError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .values()
            .find(|o| o.external_reference == reference)
            .cloned())
    }

    fn transition(
        &self,
        order_id: Uuid,
        from: &[OrderStatus],
        to: OrderStatus,
        payment_id: &str,
        payment_status: PaymentStatus,
    ) -> Result<bool, DomainError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders.get_mut(&order_id).ok_or(DomainError::NotFound)?;
        if !from.contains(&order.status) {
            return Ok(false);
        }
        order.status = to;
        order.payment_id = Some(payment_id.to_string());
        order.payment_status = Some(payment_status.as_str().to_string());
        order.updated_at = Utc::now();
        Ok(true)
    }

    fn transition_and_restock(
        &self,
        order_id: Uuid,
        from: &[OrderStatus],
        to: OrderStatus,
        payment_id: &str,
        payment_status: PaymentStatus,
    ) -> Result<bool, DomainError> {
        // Fails before any change, like an aborted database transaction.
        if self.fail_restock.load(Ordering::SeqCst) {
            return Err(DomainError::Transient(
                "simulated restock failure".to_string(),
            ));
        }
        let mut orders = self.orders.lock().unwrap();
        let order = orders.get_mut(&order_id).ok_or(DomainError::NotFound)?;
        if !from.contains(&order.status) {
            return Ok(false);
        }
        for item in &order.items {
            self.inventory.restore(item.variant_id, item.quantity)?;
        }
        order.status = to;
        order.payment_id = Some(payment_id.to_string());
        order.payment_status = Some(payment_status.as_str().to_string());
        order.updated_at = Utc::now();
        Ok(true)
    }

    fn record_payment(
        &self,
        order_id: Uuid,
        payment_id: &str,
        payment_status: PaymentStatus,
    ) -> Result<(), DomainError> {
        let mut orders = self.orders.lock().unwrap();
        let order = orders.get_mut(&order_id).ok_or(DomainError::NotFound)?;
        order.payment_id = Some(payment_id.to_string());
        order.payment_status = Some(payment_status.as_str().to_string());
        order.updated_at = Utc::now();
        Ok(())
    }
}

// ── Shipments ────────────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct InMemoryShipments {
    shipments: Arc<Mutex<HashMap<Uuid, ShipmentView>>>,
}

impl InMemoryShipments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, shipment_id: Uuid) -> Option<ShipmentView> {
        self.shipments.lock().unwrap().get(&shipment_id).cloned()
    }
}

impl ShipmentRepository for InMemoryShipments {
    fn find_by_order(&self, order_id: Uuid) -> Result<Option<ShipmentView>, DomainError> {
        Ok(self
            .shipments
            .lock()
            .unwrap()
            .values()
            .find(|s| s.order_id == order_id)
            .cloned())
    }

    fn create_for_order(&self, order_id: Uuid) -> Result<ShipmentView, DomainError> {
        let now = Utc::now();
        let view = ShipmentView {
            id: Uuid::new_v4(),
            order_id,
            me_shipment_id: None,
            tracking_code: None,
            label_url: None,
            status: ShipmentStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.shipments.lock().unwrap().insert(view.id, view.clone());
        Ok(view)
    }

    fn set_provider_id(
        &self,
        shipment_id: Uuid,
        me_shipment_id: &str,
        status: ShipmentStatus,
    ) -> Result<(), DomainError> {
        let mut shipments = self.shipments.lock().unwrap();
        let s = shipments
            .get_mut(&shipment_id)
            .ok_or(DomainError::NotFound)?;
        s.me_shipment_id = Some(me_shipment_id.to_string());
        s.status = status;
        s.updated_at = Utc::now();
        Ok(())
    }

    fn set_tracking(
        &self,
        shipment_id: Uuid,
        tracking_code: &str,
        label_url: Option<&str>,
        status: ShipmentStatus,
    ) -> Result<(), DomainError> {
        let mut shipments = self.shipments.lock().unwrap();
        let s = shipments
            .get_mut(&shipment_id)
            .ok_or(DomainError::NotFound)?;
        s.tracking_code = Some(tracking_code.to_string());
        if let Some(url) = label_url {
            s.label_url = Some(url.to_string());
        }
        s.status = status;
        s.updated_at = Utc::now();
        Ok(())
    }

    fn set_status(&self, shipment_id: Uuid, status: ShipmentStatus) -> Result<(), DomainError> {
        let mut shipments = self.shipments.lock().unwrap();
        let s = shipments
            .get_mut(&shipment_id)
            .ok_or(DomainError::NotFound)?;
        s.status = status;
        s.updated_at = Utc::now();
        Ok(())
    }
}

// ── Payment gateway ──────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeGateway {
    charges: Arc<Mutex<HashMap<String, ChargeResult>>>,
    create_response: Arc<Mutex<Option<Result<ChargeResult, DomainError>>>>,
    pub get_calls: Arc<AtomicU32>,
}

impl FakeGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `get_charge(id)` return this canonical state.
    pub fn put_charge(&self, charge: ChargeResult) {
        self.charges
            .lock()
            .unwrap()
            .insert(charge.id.clone(), charge);
    }

    pub fn script_create(&self, response: Result<ChargeResult, DomainError>) {
        *self.create_response.lock().unwrap() = Some(response);
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn create_charge(&self, _request: &ChargeRequest) -> Result<ChargeResult, DomainError> {
        let response = self
            .create_response
            .lock()
            .unwrap()
            .take()
            .unwrap_or(Err(DomainError::Internal(
                "no scripted create_charge response".to_string(),
            )));
        if let Ok(charge) = &response {
            self.put_charge(charge.clone());
        }
        response
    }

    async fn get_charge(&self, payment_id: &str) -> Result<ChargeResult, DomainError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        self.charges
            .lock()
            .unwrap()
            .get(payment_id)
            .cloned()
            .ok_or(DomainError::NotFound)
    }

    async fn create_card_token(&self, _card: &CardData) -> Result<CardToken, DomainError> {
        Ok(CardToken {
            id: "tok_test".to_string(),
        })
    }
}

// ── Shipping provider ────────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct FakeShippingProvider {
    checkout_error: Arc<Mutex<Option<DomainError>>>,
    label_error: Arc<Mutex<Option<DomainError>>>,
    tracking_responses: Arc<Mutex<VecDeque<Result<TrackingInfo, DomainError>>>>,
    pub checkout_calls: Arc<AtomicU32>,
    pub tracking_calls: Arc<AtomicU32>,
}

impl FakeShippingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_checkout(&self, error: DomainError) {
        *self.checkout_error.lock().unwrap() = Some(error);
    }

    pub fn fail_next_label(&self, error: DomainError) {
        *self.label_error.lock().unwrap() = Some(error);
    }

    pub fn push_tracking(&self, response: Result<TrackingInfo, DomainError>) {
        self.tracking_responses.lock().unwrap().push_back(response);
    }
}

#[async_trait]
impl ShippingProvider for FakeShippingProvider {
    async fn checkout_shipment(
        &self,
        _order_reference: &str,
    ) -> Result<ProviderShipment, DomainError> {
        self.checkout_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(e) = self.checkout_error.lock().unwrap().take() {
            return Err(e);
        }
        Ok(ProviderShipment {
            id: "me-shipment-1".to_string(),
        })
    }

    async fn generate_label(&self, _me_shipment_id: &str) -> Result<(), DomainError> {
        if let Some(e) = self.label_error.lock().unwrap().take() {
            return Err(e);
        }
        Ok(())
    }

    async fn get_tracking(&self, _me_shipment_id: &str) -> Result<TrackingInfo, DomainError> {
        self.tracking_calls.fetch_add(1, Ordering::SeqCst);
        self.tracking_responses
            .lock()
            .unwrap()
            .pop_front()
            // Provider still generating: nothing available yet.
            .unwrap_or(Ok(TrackingInfo::default()))
    }
}
