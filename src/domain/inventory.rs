use bigdecimal::BigDecimal;
use uuid::Uuid;

/// A purchasable variant joined with its parent product, as read from the
/// ledger at validation time. Always re-read, never cached across requests.
#[derive(Debug, Clone)]
pub struct VariantInfo {
    pub id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub product_active: bool,
    pub size: String,
    pub color: String,
    pub price: BigDecimal,
    pub discounted_price: Option<BigDecimal>,
    pub has_discount: bool,
    pub stock: i32,
}

impl VariantInfo {
    /// Price to snapshot at add-to-cart time.
    pub fn effective_price(&self) -> BigDecimal {
        if self.has_discount {
            if let Some(discounted) = &self.discounted_price {
                return discounted.clone();
            }
        }
        self.price.clone()
    }
}
