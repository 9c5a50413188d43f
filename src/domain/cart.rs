use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// A cart row joined with variant and product metadata for display.
#[derive(Debug, Clone)]
pub struct CartItemView {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub size: String,
    pub color: String,
    pub quantity: i32,
    /// Price snapshotted when the item was added; later catalog changes do
    /// not retroactively reprice the cart.
    pub unit_price: BigDecimal,
    pub added_at: DateTime<Utc>,
}

impl CartItemView {
    pub fn line_total(&self) -> BigDecimal {
        &self.unit_price * BigDecimal::from(self.quantity)
    }
}

#[derive(Debug, Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: BigDecimal,
    pub item_count: usize,
}

impl CartView {
    pub fn from_items(items: Vec<CartItemView>) -> Self {
        let subtotal = items
            .iter()
            .map(CartItemView::line_total)
            .fold(BigDecimal::from(0), |acc, t| acc + t);
        let item_count = items.len();
        CartView {
            items,
            subtotal,
            item_count,
        }
    }
}
