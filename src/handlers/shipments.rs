use std::str::FromStr;

use actix_web::{web, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::shipment::ShipmentView;
use crate::domain::shipping::{is_valid_cep, shipping_fee};
use crate::errors::AppError;
use crate::ShipmentSvc;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct SyncParams {
    pub order_id: Uuid,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ShipmentResponse {
    pub id: Uuid,
    pub order_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub me_shipment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label_url: Option<String>,
    pub status: String,
    pub updated_at: String,
}

impl From<ShipmentView> for ShipmentResponse {
    fn from(s: ShipmentView) -> Self {
        ShipmentResponse {
            id: s.id,
            order_id: s.order_id,
            me_shipment_id: s.me_shipment_id,
            tracking_code: s.tracking_code,
            label_url: s.label_url,
            status: s.status.as_str().to_string(),
            updated_at: s.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct QuoteParams {
    pub cep: String,
    /// Decimal subtotal as a string, e.g. "85.00"
    pub subtotal: String,
    /// Number of distinct line items in the cart
    pub items: usize,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct QuoteResponse {
    pub fee: String,
    pub free_shipping: bool,
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// GET /shipment/sync?order_id=
///
/// Purchases the shipment with the provider on first call for a paid order,
/// then resumes whatever step is pending (label, tracking) on later calls.
/// Provider outages surface as status `processando_me`, never as an error.
#[utoipa::path(
    get,
    path = "/shipment/sync",
    params(("order_id" = Uuid, Query, description = "Order UUID")),
    responses(
        (status = 200, description = "Current shipment state", body = ShipmentResponse),
        (status = 400, description = "Order is not paid yet"),
        (status = 404, description = "Order not found"),
    ),
    tag = "shipments"
)]
pub async fn sync(
    svc: web::Data<ShipmentSvc>,
    query: web::Query<SyncParams>,
) -> Result<HttpResponse, AppError> {
    let shipment = svc.sync(query.into_inner().order_id).await?;
    Ok(HttpResponse::Ok().json(ShipmentResponse::from(shipment)))
}

/// GET /shipping/quote?cep=&subtotal=&items=
///
/// Deterministic shipping fee for a prospective cart; no provider call.
#[utoipa::path(
    get,
    path = "/shipping/quote",
    params(
        ("cep" = String, Query, description = "Destination CEP"),
        ("subtotal" = String, Query, description = "Cart subtotal, e.g. \"85.00\""),
        ("items" = usize, Query, description = "Number of distinct line items"),
    ),
    responses(
        (status = 200, description = "Quoted fee", body = QuoteResponse),
        (status = 400, description = "Invalid CEP or subtotal"),
    ),
    tag = "shipments"
)]
pub async fn quote(query: web::Query<QuoteParams>) -> Result<HttpResponse, AppError> {
    let params = query.into_inner();
    if !is_valid_cep(&params.cep) {
        return Err(AppError::Validation {
            code: "INVALID_INPUT",
            message: format!("invalid CEP '{}'", params.cep),
        });
    }
    let subtotal = BigDecimal::from_str(&params.subtotal).map_err(|_| AppError::Validation {
        code: "INVALID_INPUT",
        message: format!("invalid subtotal '{}'", params.subtotal),
    })?;
    let fee = shipping_fee(&subtotal, params.items, &params.cep);
    let free_shipping = fee == BigDecimal::from(0);
    Ok(HttpResponse::Ok().json(QuoteResponse {
        fee: fee.to_string(),
        free_shipping,
    }))
}
