use std::str::FromStr;

use actix_web::{web, HttpRequest, HttpResponse};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::application::payment_service::verify_webhook_signature;
use crate::config::Config;
use crate::domain::payment::{CardData, ChargeRequest, ChargeResult, Payer};
use crate::errors::AppError;
use crate::PaymentSvc;

// ── Request / response DTOs ──────────────────────────────────────────────────

#[derive(Debug, Deserialize, ToSchema)]
pub struct PayerDto {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub identification: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateChargeRequest {
    /// Decimal amount as a string, e.g. "35.00"
    pub amount: String,
    pub token: String,
    pub payment_method_id: String,
    pub installments: i32,
    pub payer: PayerDto,
    #[serde(default)]
    pub description: Option<String>,
    pub external_reference: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChargeResponse {
    pub id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_detail: Option<String>,
    /// User-facing reason, present only for rejected charges.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl From<ChargeResult> for ChargeResponse {
    fn from(charge: ChargeResult) -> Self {
        let rejection_reason = charge.rejection_reason().map(|r| r.to_string());
        ChargeResponse {
            id: charge.id,
            status: charge.status.as_str().to_string(),
            status_detail: charge.status_detail,
            rejection_reason,
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CardTokenRequest {
    pub card_number: String,
    pub expiration_month: i32,
    pub expiration_year: i32,
    pub security_code: String,
    pub cardholder_name: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CardTokenResponse {
    pub id: String,
}

/// Gateway notification body. Only the payment id is consumed; everything
/// else about the charge is re-fetched from the gateway.
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub data: Option<WebhookData>,
}

#[derive(Debug, Deserialize)]
pub struct WebhookData {
    pub id: Option<WebhookId>,
}

/// Gateways send the payment id sometimes as a JSON number, sometimes as a
/// string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum WebhookId {
    Num(i64),
    Str(String),
}

impl WebhookId {
    fn into_string(self) -> String {
        match self {
            WebhookId::Num(n) => n.to_string(),
            WebhookId::Str(s) => s,
        }
    }
}

// ── Handlers ─────────────────────────────────────────────────────────────────

/// POST /payments/charge
#[utoipa::path(
    post,
    path = "/payments/charge",
    request_body = CreateChargeRequest,
    responses(
        (status = 200, description = "Charge created at the gateway", body = ChargeResponse),
        (status = 400, description = "Invalid amount or card token"),
        (status = 202, description = "Gateway temporarily unavailable"),
    ),
    tag = "payments"
)]
pub async fn create_charge(
    svc: web::Data<PaymentSvc>,
    body: web::Json<CreateChargeRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let amount = BigDecimal::from_str(&body.amount).map_err(|_| AppError::Validation {
        code: "INVALID_INPUT",
        message: format!("invalid amount '{}'", body.amount),
    })?;
    let request = ChargeRequest {
        amount,
        token: body.token,
        payment_method_id: body.payment_method_id,
        installments: body.installments,
        payer: Payer {
            email: body.payer.email,
            name: body.payer.name,
            identification: body.payer.identification,
        },
        description: body.description,
        external_reference: body.external_reference,
    };
    let charge = svc.create_charge(request).await?;
    Ok(HttpResponse::Ok().json(ChargeResponse::from(charge)))
}

/// POST /payments/card_token
///
/// Proxies card tokenization to the gateway so raw card data never touches
/// local storage.
#[utoipa::path(
    post,
    path = "/payments/card_token",
    request_body = CardTokenRequest,
    responses(
        (status = 200, description = "Tokenized card", body = CardTokenResponse),
        (status = 400, description = "Card rejected by the gateway"),
    ),
    tag = "payments"
)]
pub async fn create_card_token(
    svc: web::Data<PaymentSvc>,
    body: web::Json<CardTokenRequest>,
) -> Result<HttpResponse, AppError> {
    let body = body.into_inner();
    let token = svc
        .create_card_token(CardData {
            card_number: body.card_number,
            expiration_month: body.expiration_month,
            expiration_year: body.expiration_year,
            security_code: body.security_code,
            cardholder_name: body.cardholder_name,
        })
        .await?;
    Ok(HttpResponse::Ok().json(CardTokenResponse { id: token.id }))
}

/// POST /webhook/payment
///
/// Gateway notification endpoint. The body is a trigger only: the handler
/// extracts the payment id and the service re-fetches the canonical charge
/// before touching any order. A missing order is acknowledged with 200 so
/// the gateway stops retrying; a gateway lookup failure answers 500 so it
/// redelivers.
///
/// Gateway-facing, so it is deliberately absent from the OpenAPI document:
/// the raw body is consumed as bytes for signature verification, not as a
/// schema-described payload.
pub async fn webhook(
    svc: web::Data<PaymentSvc>,
    config: web::Data<Config>,
    req: HttpRequest,
    raw: web::Bytes,
) -> Result<HttpResponse, AppError> {
    if let Some(secret) = config.webhook_secret.as_deref() {
        let signature = req
            .headers()
            .get("x-signature")
            .and_then(|v| v.to_str().ok());
        let request_id = req
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok());
        match (signature, request_id) {
            (Some(signature), Some(request_id)) => {
                if !verify_webhook_signature(secret, request_id, &raw, signature) {
                    // Logged for investigation; the canonical state is
                    // re-fetched from the gateway either way, so a forged
                    // body cannot inject state.
                    log::warn!("payment webhook signature mismatch (request {})", request_id);
                }
            }
            _ => log::warn!("payment webhook without signature headers"),
        }
    }

    let body: WebhookBody = serde_json::from_slice(&raw).map_err(|e| AppError::Validation {
        code: "INVALID_INPUT",
        message: format!("malformed webhook body: {}", e),
    })?;

    if body.event_type.as_deref() != Some("payment") {
        log::info!(
            "ignoring webhook of type {:?}",
            body.event_type.as_deref().unwrap_or("<none>")
        );
        return Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ignored" })));
    }

    let payment_id = body
        .data
        .and_then(|d| d.id)
        .ok_or_else(|| AppError::Validation {
            code: "INVALID_INPUT",
            message: "webhook body carries no payment id".to_string(),
        })?
        .into_string();

    // A transient gateway failure must answer 5xx here, not 202: the
    // gateway only redelivers on error responses.
    svc.process_webhook(&payment_id).await.map_err(|e| match e {
        crate::domain::errors::DomainError::Transient(msg) => AppError::Internal(msg),
        other => AppError::from(other),
    })?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "status": "ok" })))
}
