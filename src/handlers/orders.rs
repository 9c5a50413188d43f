use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::application::order_service::CheckoutInput;
use crate::domain::account::Account;
use crate::domain::order::{OrderItemView, OrderView, ShippingAddress};
use crate::errors::AppError;
use crate::OrderSvc;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct AddressDto {
    pub cep: String,
    pub logradouro: String,
    pub numero: String,
    pub bairro: String,
    pub cidade: String,
    pub estado: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complemento: Option<String>,
}

impl From<AddressDto> for ShippingAddress {
    fn from(dto: AddressDto) -> Self {
        ShippingAddress {
            cep: dto.cep,
            logradouro: dto.logradouro,
            numero: dto.numero,
            bairro: dto.bairro,
            cidade: dto.cidade,
            estado: dto.estado,
            complemento: dto.complemento,
        }
    }
}

impl From<ShippingAddress> for AddressDto {
    fn from(addr: ShippingAddress) -> Self {
        AddressDto {
            cep: addr.cep,
            logradouro: addr.logradouro,
            numero: addr.numero,
            bairro: addr.bairro,
            cidade: addr.cidade,
            estado: addr.estado,
            complemento: addr.complemento,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CheckoutRequest {
    pub address: AddressDto,
    pub payment_method: String,
    /// Idempotency key for the checkout. Repeating a request with the same
    /// reference returns the already-created order.
    #[serde(default)]
    pub external_reference: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderItemResponse {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Uuid,
    pub quantity: i32,
    pub unit_price: String,
    pub selected_size: String,
    pub selected_color: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderResponse {
    pub id: Uuid,
    pub status: String,
    pub subtotal: String,
    pub shipping_cost: String,
    pub total: String,
    pub external_reference: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,
    pub address: AddressDto,
    pub created_at: String,
    pub items: Vec<OrderItemResponse>,
}

impl From<OrderView> for OrderResponse {
    fn from(order: OrderView) -> Self {
        OrderResponse {
            id: order.id,
            status: order.status.as_str().to_string(),
            subtotal: order.subtotal.to_string(),
            shipping_cost: order.shipping_cost.to_string(),
            total: order.total.to_string(),
            external_reference: order.external_reference,
            payment_id: order.payment_id,
            payment_status: order.payment_status,
            address: AddressDto::from(order.address),
            created_at: order.created_at.to_rfc3339(),
            items: order.items.into_iter().map(OrderItemResponse::from).collect(),
        }
    }
}

impl From<OrderItemView> for OrderItemResponse {
    fn from(item: OrderItemView) -> Self {
        OrderItemResponse {
            id: item.id,
            product_id: item.product_id,
            variant_id: item.variant_id,
            quantity: item.quantity,
            unit_price: item.unit_price.to_string(),
            selected_size: item.selected_size,
            selected_color: item.selected_color,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /order/checkout
///
/// Converts the caller's cart into an order: re-validates stock and product
/// state, writes the order atomically, then decrements stock with rollback on
/// failure. Replaying with the same `external_reference` returns the already
/// committed order instead of creating another one.
#[utoipa::path(
    post,
    path = "/order/checkout",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Order created", body = OrderResponse),
        (status = 400, description = "Empty cart or invalid address"),
        (status = 409, description = "Not enough stock or product inactive"),
    ),
    tag = "orders"
)]
pub async fn checkout(
    svc: web::Data<OrderSvc>,
    account: Account,
    body: web::Json<CheckoutRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let input = CheckoutInput {
        address: ShippingAddress::from(body.address),
        payment_method: body.payment_method,
        external_reference: body.external_reference,
    };
    let svc = svc.into_inner();
    let order = web::block(move || svc.checkout(&account, input))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// GET /order/{id}
#[utoipa::path(
    get,
    path = "/order/{id}",
    params(("id" = Uuid, Path, description = "Order UUID")),
    responses(
        (status = 200, description = "Order found", body = OrderResponse),
        (status = 404, description = "Order not found or owned by someone else"),
    ),
    tag = "orders"
)]
pub async fn get(
    svc: web::Data<OrderSvc>,
    account: Account,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
    let order_id = path.into_inner();
    let svc = svc.into_inner();
    let order = web::block(move || svc.get(&account, order_id))
        .await
        .map_err(|e| AppError::Internal(e.to_string()))??;
    Ok(HttpResponse::Ok().json(OrderResponse::from(order)))
}
