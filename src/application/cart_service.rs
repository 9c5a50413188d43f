use uuid::Uuid;

use crate::domain::account::Account;
use crate::domain::cart::CartView;
use crate::domain::errors::DomainError;
use crate::domain::ports::{CartRepository, InventoryRepository};

/// Per-user cart mutation and display.
///
/// Stock is re-read from the ledger on every add/update; the check covers the
/// resulting total quantity for the variant, not just the delta being added.
pub struct CartService<C, I> {
    carts: C,
    inventory: I,
}

impl<C: CartRepository, I: InventoryRepository> CartService<C, I> {
    pub fn new(carts: C, inventory: I) -> Self {
        Self { carts, inventory }
    }

    pub fn add(
        &self,
        account: &Account,
        variant_id: Uuid,
        quantity: i32,
    ) -> Result<CartView, DomainError> {
        if quantity <= 0 {
            return Err(DomainError::InvalidInput(
                "quantity must be positive".to_string(),
            ));
        }
        let variant = self
            .inventory
            .variant_info(variant_id)?
            .ok_or(DomainError::NotFound)?;
        if !variant.product_active {
            return Err(DomainError::ProductInactive {
                product_id: variant.product_id,
            });
        }

        let existing = self
            .carts
            .find_item_for_variant(account.user_id, variant_id)?;
        let requested_total = existing.as_ref().map(|i| i.quantity).unwrap_or(0) + quantity;
        if requested_total > variant.stock {
            return Err(DomainError::OutOfStock { variant_id });
        }

        match existing {
            Some(item) => self.carts.update_quantity(item.id, requested_total)?,
            None => {
                // Snapshot the price now; checkout will not re-derive it.
                self.carts.insert_item(
                    account.user_id,
                    variant_id,
                    quantity,
                    variant.effective_price(),
                )?;
            }
        }
        self.get(account)
    }

    pub fn update(
        &self,
        account: &Account,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<CartView, DomainError> {
        if quantity <= 0 {
            return Err(DomainError::InvalidInput(
                "quantity must be positive".to_string(),
            ));
        }
        let item = self
            .carts
            .find_item(account.user_id, item_id)?
            .ok_or(DomainError::NotFound)?;
        let variant = self
            .inventory
            .variant_info(item.variant_id)?
            .ok_or(DomainError::NotFound)?;
        if quantity > variant.stock {
            return Err(DomainError::OutOfStock {
                variant_id: variant.id,
            });
        }
        self.carts.update_quantity(item.id, quantity)?;
        self.get(account)
    }

    pub fn remove(&self, account: &Account, item_id: Uuid) -> Result<CartView, DomainError> {
        let item = self
            .carts
            .find_item(account.user_id, item_id)?
            .ok_or(DomainError::NotFound)?;
        self.carts.delete_item(item.id)?;
        self.get(account)
    }

    pub fn clear(&self, account: &Account) -> Result<usize, DomainError> {
        self.carts.clear(account.user_id)
    }

    /// Read-only joined view; no side effects.
    pub fn get(&self, account: &Account) -> Result<CartView, DomainError> {
        let items = self.carts.items_for_user(account.user_id)?;
        Ok(CartView::from_items(items))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use bigdecimal::BigDecimal;

    use super::*;
    use crate::application::test_support::{account, InMemoryCart, InMemoryInventory};

    fn service() -> (CartService<InMemoryCart, InMemoryInventory>, Uuid) {
        let inventory = InMemoryInventory::new();
        let variant_id = inventory.add_variant("Camiseta", true, "50.00", None, false, 5);
        let carts = InMemoryCart::new(inventory.clone());
        (CartService::new(carts, inventory), variant_id)
    }

    #[test]
    fn add_snapshots_price_and_returns_cart() {
        let (svc, variant_id) = service();
        let acc = account();

        let cart = svc.add(&acc, variant_id, 2).expect("add failed");
        assert_eq!(cart.item_count, 1);
        assert_eq!(cart.items[0].quantity, 2);
        assert_eq!(
            cart.subtotal,
            BigDecimal::from_str("100.00").expect("valid decimal")
        );
    }

    #[test]
    fn add_uses_discounted_price_when_flagged() {
        let inventory = InMemoryInventory::new();
        let variant_id = inventory.add_variant("Camiseta", true, "50.00", Some("39.90"), true, 5);
        let carts = InMemoryCart::new(inventory.clone());
        let svc = CartService::new(carts, inventory);
        let acc = account();

        let cart = svc.add(&acc, variant_id, 1).expect("add failed");
        assert_eq!(
            cart.items[0].unit_price,
            BigDecimal::from_str("39.90").expect("valid decimal")
        );
    }

    #[test]
    fn add_checks_total_quantity_not_just_delta() {
        let (svc, variant_id) = service();
        let acc = account();

        svc.add(&acc, variant_id, 3).expect("first add failed");
        // 3 already in cart + 3 more would exceed stock of 5.
        let err = svc.add(&acc, variant_id, 3).unwrap_err();
        assert!(matches!(err, DomainError::OutOfStock { .. }));

        // The failed add must not have touched the cart.
        let cart = svc.get(&acc).expect("get failed");
        assert_eq!(cart.items[0].quantity, 3);
    }

    #[test]
    fn add_merges_into_existing_row() {
        let (svc, variant_id) = service();
        let acc = account();

        svc.add(&acc, variant_id, 2).expect("add failed");
        let cart = svc.add(&acc, variant_id, 3).expect("second add failed");
        assert_eq!(cart.item_count, 1);
        assert_eq!(cart.items[0].quantity, 5);
    }

    #[test]
    fn add_rejects_non_positive_quantity() {
        let (svc, variant_id) = service();
        assert!(matches!(
            svc.add(&account(), variant_id, 0),
            Err(DomainError::InvalidInput(_))
        ));
        assert!(matches!(
            svc.add(&account(), variant_id, -1),
            Err(DomainError::InvalidInput(_))
        ));
    }

    #[test]
    fn add_rejects_inactive_product() {
        let inventory = InMemoryInventory::new();
        let variant_id = inventory.add_variant("Descontinuada", false, "10.00", None, false, 5);
        let carts = InMemoryCart::new(inventory.clone());
        let svc = CartService::new(carts, inventory);

        assert!(matches!(
            svc.add(&account(), variant_id, 1),
            Err(DomainError::ProductInactive { .. })
        ));
    }

    #[test]
    fn update_rechecks_stock() {
        let (svc, variant_id) = service();
        let acc = account();

        let cart = svc.add(&acc, variant_id, 2).expect("add failed");
        let item_id = cart.items[0].id;

        let err = svc.update(&acc, item_id, 6).unwrap_err();
        assert!(matches!(err, DomainError::OutOfStock { .. }));

        let cart = svc.update(&acc, item_id, 5).expect("update failed");
        assert_eq!(cart.items[0].quantity, 5);
    }

    #[test]
    fn items_are_scoped_to_their_owner() {
        let (svc, variant_id) = service();
        let owner = account();
        let stranger = account();

        let cart = svc.add(&owner, variant_id, 1).expect("add failed");
        let item_id = cart.items[0].id;

        assert!(matches!(
            svc.update(&stranger, item_id, 2),
            Err(DomainError::NotFound)
        ));
        assert!(matches!(
            svc.remove(&stranger, item_id),
            Err(DomainError::NotFound)
        ));
        assert_eq!(svc.get(&stranger).expect("get failed").item_count, 0);
    }

    #[test]
    fn remove_and_clear() {
        let (svc, variant_id) = service();
        let acc = account();

        let cart = svc.add(&acc, variant_id, 1).expect("add failed");
        let cart = svc.remove(&acc, cart.items[0].id).expect("remove failed");
        assert_eq!(cart.item_count, 0);

        svc.add(&acc, variant_id, 1).expect("add failed");
        assert_eq!(svc.clear(&acc).expect("clear failed"), 1);
        assert_eq!(svc.get(&acc).expect("get failed").item_count, 0);
    }
}
