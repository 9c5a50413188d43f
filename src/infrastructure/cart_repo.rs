use bigdecimal::BigDecimal;
use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::cart::CartItemView;
use crate::domain::errors::DomainError;
use crate::domain::ports::CartRepository;
use crate::schema::{cart_items, product_variants, products};

use super::models::{CartItemRow, NewCartItemRow, ProductRow, VariantRow};

#[derive(Clone)]
pub struct DieselCartRepository {
    pool: DbPool,
}

impl DieselCartRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_view(row: CartItemRow, variant: VariantRow, product: ProductRow) -> CartItemView {
    CartItemView {
        id: row.id,
        variant_id: row.variant_id,
        product_id: variant.product_id,
        product_name: product.name,
        size: variant.size,
        color: variant.color,
        quantity: row.quantity,
        unit_price: row.unit_price,
        added_at: row.created_at,
    }
}

impl CartRepository for DieselCartRepository {
    fn items_for_user(&self, user_id: Uuid) -> Result<Vec<CartItemView>, DomainError> {
        let mut conn = self.pool.get()?;
        let rows: Vec<(CartItemRow, VariantRow, ProductRow)> = cart_items::table
            .inner_join(product_variants::table.inner_join(products::table))
            .filter(cart_items::user_id.eq(user_id))
            .order(cart_items::created_at.asc())
            .select((
                CartItemRow::as_select(),
                VariantRow::as_select(),
                ProductRow::as_select(),
            ))
            .load(&mut conn)?;
        Ok(rows
            .into_iter()
            .map(|(row, variant, product)| to_view(row, variant, product))
            .collect())
    }

    fn find_item(&self, user_id: Uuid, item_id: Uuid) -> Result<Option<CartItemView>, DomainError> {
        let mut conn = self.pool.get()?;
        let row: Option<(CartItemRow, VariantRow, ProductRow)> = cart_items::table
            .inner_join(product_variants::table.inner_join(products::table))
            .filter(cart_items::id.eq(item_id))
            .filter(cart_items::user_id.eq(user_id))
            .select((
                CartItemRow::as_select(),
                VariantRow::as_select(),
                ProductRow::as_select(),
            ))
            .first(&mut conn)
            .optional()?;
        Ok(row.map(|(r, v, p)| to_view(r, v, p)))
    }

    fn find_item_for_variant(
        &self,
        user_id: Uuid,
        variant_id: Uuid,
    ) -> Result<Option<CartItemView>, DomainError> {
        let mut conn = self.pool.get()?;
        let row: Option<(CartItemRow, VariantRow, ProductRow)> = cart_items::table
            .inner_join(product_variants::table.inner_join(products::table))
            .filter(cart_items::user_id.eq(user_id))
            .filter(cart_items::variant_id.eq(variant_id))
            .select((
                CartItemRow::as_select(),
                VariantRow::as_select(),
                ProductRow::as_select(),
            ))
            .first(&mut conn)
            .optional()?;
        Ok(row.map(|(r, v, p)| to_view(r, v, p)))
    }

    fn insert_item(
        &self,
        user_id: Uuid,
        variant_id: Uuid,
        quantity: i32,
        unit_price: BigDecimal,
    ) -> Result<Uuid, DomainError> {
        let mut conn = self.pool.get()?;
        let id = Uuid::new_v4();
        diesel::insert_into(cart_items::table)
            .values(&NewCartItemRow {
                id,
                user_id,
                variant_id,
                quantity,
                unit_price,
            })
            .execute(&mut conn)?;
        Ok(id)
    }

    fn update_quantity(&self, item_id: Uuid, quantity: i32) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(cart_items::table.filter(cart_items::id.eq(item_id)))
            .set(cart_items::quantity.eq(quantity))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    fn delete_item(&self, item_id: Uuid) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let deleted =
            diesel::delete(cart_items::table.filter(cart_items::id.eq(item_id)))
                .execute(&mut conn)?;
        if deleted == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    fn clear(&self, user_id: Uuid) -> Result<usize, DomainError> {
        let mut conn = self.pool.get()?;
        let deleted = diesel::delete(cart_items::table.filter(cart_items::user_id.eq(user_id)))
            .execute(&mut conn)?;
        Ok(deleted)
    }
}
