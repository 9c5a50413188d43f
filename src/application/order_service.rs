use bigdecimal::BigDecimal;
use uuid::Uuid;

use crate::domain::account::Account;
use crate::domain::errors::DomainError;
use crate::domain::order::{NewOrder, OrderItemInput, OrderView, ShippingAddress};
use crate::domain::ports::{CartRepository, InventoryRepository, OrderRepository};
use crate::domain::shipping::shipping_fee;

#[derive(Debug, Clone)]
pub struct CheckoutInput {
    pub address: ShippingAddress,
    pub payment_method: String,
    /// Caller-supplied idempotency key. Generated server-side when absent so
    /// every order has one to share with the payment gateway.
    pub external_reference: Option<String>,
}

/// Turns a cart into a committed order.
///
/// Order + items are one atomic write; stock decrements follow as conditional
/// updates with explicit compensation (restore + delete) if any of them
/// fails, so a checkout is observable either completely or not at all.
pub struct OrderCreationService<C, I, O> {
    carts: C,
    inventory: I,
    orders: O,
}

impl<C, I, O> OrderCreationService<C, I, O>
where
    C: CartRepository,
    I: InventoryRepository,
    O: OrderRepository,
{
    pub fn new(carts: C, inventory: I, orders: O) -> Self {
        Self {
            carts,
            inventory,
            orders,
        }
    }

    pub fn checkout(
        &self,
        account: &Account,
        input: CheckoutInput,
    ) -> Result<OrderView, DomainError> {
        input.address.validate()?;
        if input.payment_method.trim().is_empty() {
            return Err(DomainError::InvalidInput(
                "payment_method must not be empty".to_string(),
            ));
        }

        // Replay of an already-committed checkout returns the existing order.
        if let Some(reference) = &input.external_reference {
            if let Some(existing) = self.orders.find_by_external_reference(reference)? {
                return Ok(existing);
            }
        }

        let cart_items = self.carts.items_for_user(account.user_id)?;
        if cart_items.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        // Re-validate against current stock and product state, not cached
        // values from add-to-cart time. Prices stay snapshotted.
        let mut items = Vec::with_capacity(cart_items.len());
        for cart_item in &cart_items {
            let variant = self
                .inventory
                .variant_info(cart_item.variant_id)?
                .ok_or(DomainError::NotFound)?;
            if !variant.product_active {
                return Err(DomainError::ProductInactive {
                    product_id: variant.product_id,
                });
            }
            if cart_item.quantity > variant.stock {
                return Err(DomainError::InsufficientStock {
                    variant_id: variant.id,
                });
            }
            items.push(OrderItemInput {
                product_id: variant.product_id,
                variant_id: variant.id,
                quantity: cart_item.quantity,
                unit_price: cart_item.unit_price.clone(),
                selected_size: variant.size,
                selected_color: variant.color,
            });
        }

        let subtotal = items
            .iter()
            .map(|i| &i.unit_price * BigDecimal::from(i.quantity))
            .fold(BigDecimal::from(0), |acc, t| acc + t);
        let shipping_cost = shipping_fee(&subtotal, items.len(), &input.address.cep);
        let total = &subtotal + &shipping_cost;
        let external_reference = input
            .external_reference
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let order = match self.orders.create(NewOrder {
            user_id: account.user_id,
            subtotal,
            shipping_cost,
            total,
            external_reference,
            address: input.address,
            items,
        }) {
            Ok(order) => order,
            // Lost a race with a concurrent replay; the committed order wins.
            Err(DomainError::DuplicateReference(reference)) => {
                return self
                    .orders
                    .find_by_external_reference(&reference)?
                    .ok_or_else(|| {
                        DomainError::Internal(format!(
                            "order for reference {} vanished after unique violation",
                            reference
                        ))
                    });
            }
            Err(e) => return Err(e),
        };

        let mut reserved: Vec<(Uuid, i32)> = Vec::with_capacity(order.items.len());
        for item in &order.items {
            match self.inventory.reserve(item.variant_id, item.quantity) {
                Ok(true) => reserved.push((item.variant_id, item.quantity)),
                Ok(false) => {
                    self.compensate(&order, &reserved);
                    return Err(DomainError::InsufficientStock {
                        variant_id: item.variant_id,
                    });
                }
                Err(e) => {
                    self.compensate(&order, &reserved);
                    return Err(e);
                }
            }
        }

        // Loss of cart-clear is cosmetic; the order is already committed.
        if let Err(e) = self.carts.clear(account.user_id) {
            log::warn!(
                "order {}: failed to clear cart for user {}: {}",
                order.id,
                account.user_id,
                e
            );
        }

        Ok(order)
    }

    /// Fetches one of the account's orders. Another user's order id answers
    /// not-found rather than forbidden, so ids cannot be probed.
    pub fn get(&self, account: &Account, order_id: Uuid) -> Result<OrderView, DomainError> {
        match self.orders.find_by_id(order_id)? {
            Some(order) if order.user_id == account.user_id => Ok(order),
            _ => Err(DomainError::NotFound),
        }
    }

    fn compensate(&self, order: &OrderView, reserved: &[(Uuid, i32)]) {
        // Restoration and deletion land in one transaction so an aborted
        // checkout cannot leak stock.
        if let Err(e) = self.orders.delete_and_restock(order.id, reserved) {
            log::error!(
                "order {}: failed to roll back aborted checkout: {}",
                order.id,
                e
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::application::cart_service::CartService;
    use crate::application::test_support::{
        account, dec, InMemoryCart, InMemoryInventory, InMemoryOrders,
    };
    use crate::domain::status::OrderStatus;

    fn address() -> ShippingAddress {
        ShippingAddress {
            cep: "01310-100".to_string(),
            logradouro: "Avenida Paulista".to_string(),
            numero: "1000".to_string(),
            bairro: "Bela Vista".to_string(),
            cidade: "São Paulo".to_string(),
            estado: "SP".to_string(),
            complemento: None,
        }
    }

    fn input() -> CheckoutInput {
        CheckoutInput {
            address: address(),
            payment_method: "credit_card".to_string(),
            external_reference: None,
        }
    }

    struct Fixture {
        inventory: InMemoryInventory,
        carts: InMemoryCart,
        orders: InMemoryOrders,
        checkout: OrderCreationService<InMemoryCart, InMemoryInventory, InMemoryOrders>,
        cart: CartService<InMemoryCart, InMemoryInventory>,
    }

    fn fixture() -> Fixture {
        let inventory = InMemoryInventory::new();
        let carts = InMemoryCart::new(inventory.clone());
        let orders = InMemoryOrders::with_inventory(inventory.clone());
        Fixture {
            checkout: OrderCreationService::new(carts.clone(), inventory.clone(), orders.clone()),
            cart: CartService::new(carts.clone(), inventory.clone()),
            inventory,
            carts,
            orders,
        }
    }

    #[test]
    fn worked_example_totals_and_stock() {
        let f = fixture();
        let acc = account();
        let variant = f.inventory.add_variant("Camiseta", true, "10.00", None, false, 5);
        f.cart.add(&acc, variant, 2).expect("add failed");

        let order = f.checkout.checkout(&acc, input()).expect("checkout failed");

        assert_eq!(order.subtotal, dec("20.00"));
        assert_eq!(order.shipping_cost, dec("15"));
        assert_eq!(order.total, dec("35.00"));
        assert_eq!(order.status, OrderStatus::Pendente);
        assert_eq!(order.items.len(), 1);
        assert_eq!(f.inventory.stock_of(variant), 3);

        // Cart is cleared once the order commits.
        assert_eq!(f.cart.get(&acc).expect("get failed").item_count, 0);
    }

    #[test]
    fn empty_cart_is_rejected() {
        let f = fixture();
        assert!(matches!(
            f.checkout.checkout(&account(), input()),
            Err(DomainError::EmptyCart)
        ));
        assert_eq!(f.orders.count(), 0);
    }

    #[test]
    fn insufficient_stock_creates_no_order() {
        let f = fixture();
        let acc = account();
        let variant = f.inventory.add_variant("Camiseta", true, "10.00", None, false, 6);
        f.cart.add(&acc, variant, 6).expect("add failed");

        // Someone else bought 1 unit after the cart was filled.
        assert!(f.inventory.reserve(variant, 1).expect("reserve failed"));

        let err = f.checkout.checkout(&acc, input()).unwrap_err();
        assert!(matches!(err, DomainError::InsufficientStock { .. }));
        assert_eq!(f.orders.count(), 0);
        assert_eq!(f.inventory.stock_of(variant), 5);
    }

    #[test]
    fn inactive_product_is_rejected_at_checkout() {
        let f = fixture();
        let acc = account();
        let variant = f.inventory.add_variant("Descontinuada", true, "10.00", None, false, 5);
        f.cart.add(&acc, variant, 1).expect("add failed");

        // Product deactivated between add and checkout.
        let inactive = f.inventory.add_variant("Outra", false, "10.00", None, false, 5);
        f.carts
            .insert_item(acc.user_id, inactive, 1, dec("10.00"))
            .expect("insert failed");

        let err = f.checkout.checkout(&acc, input()).unwrap_err();
        assert!(matches!(err, DomainError::ProductInactive { .. }));
        assert_eq!(f.orders.count(), 0);
    }

    #[test]
    fn failed_reservation_rolls_back_order_and_stock() {
        let f = fixture();
        let acc = account();
        let first = f.inventory.add_variant("Camiseta", true, "10.00", None, false, 5);
        let second = f.inventory.add_variant("Calça", true, "20.00", None, false, 5);
        f.cart.add(&acc, first, 2).expect("add failed");
        f.cart.add(&acc, second, 5).expect("add failed");

        // Concurrent purchase drains the second variant between validation
        // and reservation; its conditional decrement will return false.
        struct RacingInventory {
            inner: InMemoryInventory,
            drain: Uuid,
            drained: std::sync::atomic::AtomicBool,
        }
        impl InventoryRepository for RacingInventory {
            fn variant_info(
                &self,
                variant_id: Uuid,
            ) -> Result<Option<crate::domain::inventory::VariantInfo>, DomainError> {
                self.inner.variant_info(variant_id)
            }
            fn reserve(&self, variant_id: Uuid, quantity: i32) -> Result<bool, DomainError> {
                if variant_id == self.drain && !self.drained.swap(true, Ordering::SeqCst) {
                    assert!(self.inner.reserve(variant_id, 3)?);
                }
                self.inner.reserve(variant_id, quantity)
            }
            fn restore(&self, variant_id: Uuid, quantity: i32) -> Result<(), DomainError> {
                self.inner.restore(variant_id, quantity)
            }
        }

        let racing = RacingInventory {
            inner: f.inventory.clone(),
            drain: second,
            drained: std::sync::atomic::AtomicBool::new(false),
        };
        let checkout = OrderCreationService::new(f.carts.clone(), racing, f.orders.clone());

        let err = checkout.checkout(&acc, input()).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InsufficientStock { variant_id } if variant_id == second
        ));
        // No order row survives, and the first variant's decrement was undone.
        assert_eq!(f.orders.count(), 0);
        assert_eq!(f.inventory.stock_of(first), 5);
        assert_eq!(f.inventory.stock_of(second), 2);
        // Cart untouched by the failed attempt.
        assert_eq!(f.cart.get(&acc).expect("get failed").item_count, 2);
    }

    #[test]
    fn write_failure_commits_nothing() {
        let f = fixture();
        let acc = account();
        let variant = f.inventory.add_variant("Camiseta", true, "10.00", None, false, 5);
        f.cart.add(&acc, variant, 2).expect("add failed");
        f.orders.fail_create.store(true, Ordering::SeqCst);

        let err = f.checkout.checkout(&acc, input()).unwrap_err();
        assert!(matches!(err, DomainError::Internal(_)));
        assert_eq!(f.orders.count(), 0);
        assert_eq!(f.inventory.stock_of(variant), 5);
    }

    #[test]
    fn replay_with_same_reference_returns_existing_order() {
        let f = fixture();
        let acc = account();
        let variant = f.inventory.add_variant("Camiseta", true, "10.00", None, false, 10);
        f.cart.add(&acc, variant, 2).expect("add failed");

        let mut req = input();
        req.external_reference = Some("checkout-42".to_string());
        let first = f.checkout.checkout(&acc, req.clone()).expect("checkout failed");

        // Second call with the same reference: same order, no new rows, no
        // second decrement even though the cart was already cleared.
        f.cart.add(&acc, variant, 2).expect("re-add failed");
        let second = f.checkout.checkout(&acc, req).expect("replay failed");

        assert_eq!(first.id, second.id);
        assert_eq!(f.orders.count(), 1);
        assert_eq!(f.inventory.stock_of(variant), 8);
    }

    #[test]
    fn shipping_is_free_above_threshold() {
        let f = fixture();
        let acc = account();
        let variant = f.inventory.add_variant("Tênis", true, "120.00", None, false, 5);
        f.cart.add(&acc, variant, 1).expect("add failed");

        let order = f.checkout.checkout(&acc, input()).expect("checkout failed");
        assert_eq!(order.shipping_cost, dec("0"));
        assert_eq!(order.total, dec("120.00"));
    }

    #[test]
    fn cart_clear_failure_does_not_fail_checkout() {
        let f = fixture();
        let acc = account();
        let variant = f.inventory.add_variant("Camiseta", true, "10.00", None, false, 5);
        f.cart.add(&acc, variant, 1).expect("add failed");
        f.carts.fail_clear.store(true, Ordering::SeqCst);

        let order = f.checkout.checkout(&acc, input()).expect("checkout failed");
        assert!(f.orders.get(order.id).is_some());
        assert_eq!(f.inventory.stock_of(variant), 4);
    }

    #[test]
    fn get_hides_orders_of_other_accounts() {
        let f = fixture();
        let acc = account();
        let variant = f.inventory.add_variant("Camiseta", true, "10.00", None, false, 5);
        f.cart.add(&acc, variant, 1).expect("add failed");
        let order = f.checkout.checkout(&acc, input()).expect("checkout failed");

        assert_eq!(f.checkout.get(&acc, order.id).expect("get failed").id, order.id);

        let other = account();
        assert!(matches!(
            f.checkout.get(&other, order.id),
            Err(DomainError::NotFound)
        ));
        assert!(matches!(
            f.checkout.get(&acc, Uuid::new_v4()),
            Err(DomainError::NotFound)
        ));
    }

    #[test]
    fn malformed_address_is_rejected_before_any_write() {
        let f = fixture();
        let acc = account();
        let variant = f.inventory.add_variant("Camiseta", true, "10.00", None, false, 5);
        f.cart.add(&acc, variant, 1).expect("add failed");

        let mut req = input();
        req.address.cep = "123".to_string();
        assert!(matches!(
            f.checkout.checkout(&acc, req),
            Err(DomainError::InvalidInput(_))
        ));
        assert_eq!(f.orders.count(), 0);
        assert_eq!(f.inventory.stock_of(variant), 5);
    }
}
