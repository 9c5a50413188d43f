use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::account::Account;
use crate::domain::cart::{CartItemView, CartView};
use crate::errors::AppError;
use crate::CartSvc;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddToCartRequest {
    pub variant_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCartItemRequest {
    pub item_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RemoveItemParams {
    pub id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartItemResponse {
    pub id: Uuid,
    pub variant_id: Uuid,
    pub product_id: Uuid,
    pub product_name: String,
    pub size: String,
    pub color: String,
    pub quantity: i32,
    /// Decimal price as a string to avoid floating-point issues, e.g. "9.99"
    pub unit_price: String,
    pub line_total: String,
    pub added_at: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CartResponse {
    pub items: Vec<CartItemResponse>,
    pub subtotal: String,
    pub item_count: usize,
}

impl From<CartItemView> for CartItemResponse {
    fn from(item: CartItemView) -> Self {
        let line_total = item.line_total();
        CartItemResponse {
            id: item.id,
            variant_id: item.variant_id,
            product_id: item.product_id,
            product_name: item.product_name,
            size: item.size,
            color: item.color,
            quantity: item.quantity,
            unit_price: item.unit_price.to_string(),
            line_total: line_total.to_string(),
            added_at: item.added_at.to_rfc3339(),
        }
    }
}

impl From<CartView> for CartResponse {
    fn from(view: CartView) -> Self {
        CartResponse {
            subtotal: view.subtotal.to_string(),
            item_count: view.item_count,
            items: view.items.into_iter().map(CartItemResponse::from).collect(),
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /cart/add
///
/// Adds a variant to the caller's cart, merging into an existing row for the
/// same variant. The stock check covers the resulting total quantity.
#[utoipa::path(
    post,
    path = "/cart/add",
    request_body = AddToCartRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Variant not found"),
        (status = 409, description = "Not enough stock or product inactive"),
    ),
    tag = "cart"
)]
pub async fn add(
    svc: web::Data<CartSvc>,
    account: Account,
    body: web::Json<AddToCartRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let svc = svc.into_inner();
    let view = web::block(move || svc.add(&account, body.variant_id, body.quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(CartResponse::from(view)))
}

/// PATCH /cart/update
///
/// Replaces the quantity of one of the caller's cart items.
#[utoipa::path(
    patch,
    path = "/cart/update",
    request_body = UpdateCartItemRequest,
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 400, description = "Invalid quantity"),
        (status = 404, description = "Item not found"),
        (status = 409, description = "Not enough stock"),
    ),
    tag = "cart"
)]
pub async fn update(
    svc: web::Data<CartSvc>,
    account: Account,
    body: web::Json<UpdateCartItemRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let svc = svc.into_inner();
    let view = web::block(move || svc.update(&account, body.item_id, body.quantity))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(CartResponse::from(view)))
}

/// DELETE /cart/item?id=
#[utoipa::path(
    delete,
    path = "/cart/item",
    params(("id" = Uuid, Query, description = "Cart item UUID")),
    responses(
        (status = 200, description = "Updated cart", body = CartResponse),
        (status = 404, description = "Item not found"),
    ),
    tag = "cart"
)]
pub async fn remove(
    svc: web::Data<CartSvc>,
    account: Account,
    query: web::Query<RemoveItemParams>,
) -> Result<HttpResponse, AppError> {
    let item_id = query.into_inner().id;
    let svc = svc.into_inner();
    let view = web::block(move || svc.remove(&account, item_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(CartResponse::from(view)))
}

/// DELETE /cart
#[utoipa::path(
    delete,
    path = "/cart",
    responses((status = 200, description = "Number of removed items")),
    tag = "cart"
)]
pub async fn clear(
    svc: web::Data<CartSvc>,
    account: Account,
) -> Result<HttpResponse, AppError> {
    let svc = svc.into_inner();
    let removed = web::block(move || svc.clear(&account))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "removed": removed })))
}

/// GET /cart
#[utoipa::path(
    get,
    path = "/cart",
    responses((status = 200, description = "The caller's cart", body = CartResponse)),
    tag = "cart"
)]
pub async fn get(svc: web::Data<CartSvc>, account: Account) -> Result<HttpResponse, AppError> {
    let svc = svc.into_inner();
    let view = web::block(move || svc.get(&account))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(CartResponse::from(view)))
}
