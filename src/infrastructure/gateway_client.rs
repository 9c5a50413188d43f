use std::time::Duration;

use async_trait::async_trait;
use bigdecimal::ToPrimitive;
use serde::Deserialize;
use serde_json::json;

use crate::domain::errors::DomainError;
use crate::domain::payment::{CardData, CardToken, ChargeRequest, ChargeResult};
use crate::domain::ports::PaymentGateway;
use crate::domain::status::PaymentStatus;

/// reqwest-backed payment gateway client.
///
/// Stateless: every call carries the bearer token, and mutating calls carry
/// the caller's idempotency key in `X-Idempotency-Key`. 5xx and transport
/// timeouts surface as `Transient` so callers can distinguish "retry later"
/// from a rejected charge, which is a 2xx business outcome.
pub struct HttpPaymentGateway {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpPaymentGateway {
    pub fn new(base_url: &str, token: &str) -> Result<Self, DomainError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| DomainError::Internal(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }
}

fn map_transport(e: reqwest::Error) -> DomainError {
    if e.is_timeout() || e.is_connect() {
        DomainError::Transient(format!("payment gateway unreachable: {}", e))
    } else {
        DomainError::Internal(format!("payment gateway request failed: {}", e))
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, DomainError> {
    let status = resp.status();
    if status.is_server_error() || status.as_u16() == 429 {
        return Err(DomainError::Transient(format!(
            "payment gateway returned {}",
            status
        )));
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(DomainError::InvalidInput(format!(
            "payment gateway rejected the request ({}): {}",
            status, body
        )));
    }
    Ok(resp)
}

/// The gateway serializes payment ids as numbers in some payloads and as
/// strings in others.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum GatewayId {
    Num(i64),
    Str(String),
}

impl GatewayId {
    fn into_string(self) -> String {
        match self {
            GatewayId::Num(n) => n.to_string(),
            GatewayId::Str(s) => s,
        }
    }
}

#[derive(Debug, Deserialize)]
struct GatewayPayment {
    id: GatewayId,
    status: String,
    status_detail: Option<String>,
    external_reference: Option<String>,
}

fn to_charge_result(payment: GatewayPayment) -> Result<ChargeResult, DomainError> {
    let id = payment.id.into_string();
    let status = PaymentStatus::parse(&payment.status).ok_or_else(|| {
        DomainError::Internal(format!(
            "payment {} has unknown gateway status '{}'",
            id, payment.status
        ))
    })?;
    Ok(ChargeResult {
        id,
        status,
        status_detail: payment.status_detail,
        external_reference: payment.external_reference,
    })
}

#[derive(Debug, Deserialize)]
struct GatewayToken {
    id: GatewayId,
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_charge(&self, request: &ChargeRequest) -> Result<ChargeResult, DomainError> {
        let amount = request.amount.to_f64().ok_or_else(|| {
            DomainError::InvalidInput(format!("amount {} is not representable", request.amount))
        })?;
        let body = json!({
            "transaction_amount": amount,
            "token": request.token,
            "payment_method_id": request.payment_method_id,
            "installments": request.installments,
            "description": request.description,
            "external_reference": request.external_reference,
            "payer": {
                "email": request.payer.email,
                "first_name": request.payer.name,
                "identification": request.payer.identification,
            },
        });
        let resp = self
            .http
            .post(format!("{}/v1/payments", self.base_url))
            .bearer_auth(&self.token)
            .header("X-Idempotency-Key", &request.external_reference)
            .json(&body)
            .send()
            .await
            .map_err(map_transport)?;
        let payment: GatewayPayment = check_status(resp)
            .await?
            .json()
            .await
            .map_err(map_transport)?;
        to_charge_result(payment)
    }

    async fn get_charge(&self, payment_id: &str) -> Result<ChargeResult, DomainError> {
        let resp = self
            .http
            .get(format!("{}/v1/payments/{}", self.base_url, payment_id))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(map_transport)?;
        if resp.status().as_u16() == 404 {
            return Err(DomainError::NotFound);
        }
        let payment: GatewayPayment = check_status(resp)
            .await?
            .json()
            .await
            .map_err(map_transport)?;
        to_charge_result(payment)
    }

    async fn create_card_token(&self, card: &CardData) -> Result<CardToken, DomainError> {
        let body = json!({
            "card_number": card.card_number,
            "expiration_month": card.expiration_month,
            "expiration_year": card.expiration_year,
            "security_code": card.security_code,
            "cardholder": { "name": card.cardholder_name },
        });
        let resp = self
            .http
            .post(format!("{}/v1/card_tokens", self.base_url))
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await
            .map_err(map_transport)?;
        let token: GatewayToken = check_status(resp)
            .await?
            .json()
            .await
            .map_err(map_transport)?;
        Ok(CardToken {
            id: token.id.into_string(),
        })
    }
}
