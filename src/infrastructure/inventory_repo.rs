use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::inventory::VariantInfo;
use crate::domain::ports::InventoryRepository;
use crate::schema::{product_variants, products};

use super::models::{ProductRow, VariantRow};

/// Authoritative stock ledger. Reserve and restore are single statements at
/// the database, so concurrent checkouts of the same variant cannot lose
/// updates and stock can never go negative.
#[derive(Clone)]
pub struct DieselInventoryRepository {
    pool: DbPool,
}

impl DieselInventoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl InventoryRepository for DieselInventoryRepository {
    fn variant_info(&self, variant_id: Uuid) -> Result<Option<VariantInfo>, DomainError> {
        let mut conn = self.pool.get()?;
        let row: Option<(VariantRow, ProductRow)> = product_variants::table
            .inner_join(products::table)
            .filter(product_variants::id.eq(variant_id))
            .select((VariantRow::as_select(), ProductRow::as_select()))
            .first(&mut conn)
            .optional()?;
        Ok(row.map(|(variant, product)| VariantInfo {
            id: variant.id,
            product_id: variant.product_id,
            product_name: product.name,
            product_active: product.active,
            size: variant.size,
            color: variant.color,
            price: variant.price,
            discounted_price: variant.discounted_price,
            has_discount: variant.has_discount,
            stock: variant.stock,
        }))
    }

    fn reserve(&self, variant_id: Uuid, quantity: i32) -> Result<bool, DomainError> {
        let mut conn = self.pool.get()?;
        // Decrement-if-sufficient in one UPDATE; zero rows means the guard
        // did not hold and nothing was changed.
        let updated = diesel::update(
            product_variants::table
                .filter(product_variants::id.eq(variant_id))
                .filter(product_variants::stock.ge(quantity)),
        )
        .set(product_variants::stock.eq(product_variants::stock - quantity))
        .execute(&mut conn)?;
        Ok(updated == 1)
    }

    fn restore(&self, variant_id: Uuid, quantity: i32) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let updated =
            diesel::update(product_variants::table.filter(product_variants::id.eq(variant_id)))
                .set(product_variants::stock.eq(product_variants::stock + quantity))
                .execute(&mut conn)?;
        if updated == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
