use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::domain::errors::DomainError;
use crate::domain::ports::ShippingProvider;
use crate::domain::shipment::{ProviderShipment, TrackingInfo};

/// reqwest-backed shipping provider client (Melhor Envio style API).
///
/// Label generation is asynchronous on the provider side, so `get_tracking`
/// legitimately returns empty fields for a while after `generate_label`.
pub struct HttpShippingProvider {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpShippingProvider {
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
        DomainError::Transient(format!("shipping provider unreachable: {}", e))
    } else {
        DomainError::Internal(format!("shipping provider request failed: {}", e))
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, DomainError> {
    let status = resp.status();
    if status.is_server_error() || status.as_u16() == 429 {
        return Err(DomainError::Transient(format!(
            "shipping provider returned {}",
            status
        )));
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(DomainError::InvalidInput(format!(
            "shipping provider rejected the request ({}): {}",
            status, body
        )));
    }
    Ok(resp)
}

#[derive(Debug, Deserialize)]
struct CheckoutResponse {
    purchase: PurchaseBody,
}

#[derive(Debug, Deserialize)]
struct PurchaseBody {
    orders: Vec<PurchasedOrder>,
}

#[derive(Debug, Deserialize)]
struct PurchasedOrder {
    id: String,
}

#[derive(Debug, Deserialize)]
struct ProviderOrderInfo {
    tracking: Option<String>,
    label_url: Option<String>,
}

#[async_trait]
impl ShippingProvider for HttpShippingProvider {
    async fn checkout_shipment(
        &self,
        order_reference: &str,
    ) -> Result<ProviderShipment, DomainError> {
        let resp = self
            .http
            .post(format!("{}/api/v2/me/shipment/checkout", self.base_url))
            .bearer_auth(&self.token)
            .json(&json!({ "orders": [order_reference] }))
            .send()
            .await
            .map_err(map_transport)?;
        let body: CheckoutResponse = check_status(resp)
            .await?
            .json()
            .await
            .map_err(map_transport)?;
        let order = body.purchase.orders.into_iter().next().ok_or_else(|| {
            DomainError::Transient(
                "shipping provider returned no shipment for the checkout".to_string(),
            )
        })?;
        Ok(ProviderShipment { id: order.id })
    }

    async fn generate_label(&self, me_shipment_id: &str) -> Result<(), DomainError> {
        let resp = self
            .http
            .post(format!("{}/api/v2/me/shipment/generate", self.base_url))
            .bearer_auth(&self.token)
            .json(&json!({ "orders": [me_shipment_id] }))
            .send()
            .await
            .map_err(map_transport)?;
        check_status(resp).await?;
        Ok(())
    }

    async fn get_tracking(&self, me_shipment_id: &str) -> Result<TrackingInfo, DomainError> {
        let resp = self
            .http
            .get(format!("{}/api/v2/me/orders/{}", self.base_url, me_shipment_id))
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(map_transport)?;
        let info: ProviderOrderInfo = check_status(resp)
            .await?
            .json()
            .await
            .map_err(map_transport)?;
        Ok(TrackingInfo {
            tracking_code: info.tracking,
            label_url: info.label_url,
        })
    }
}
