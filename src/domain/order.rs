use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::errors::DomainError;
use super::shipping::is_valid_cep;
use super::status::OrderStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingAddress {
    pub cep: String,
    pub logradouro: String,
    pub numero: String,
    pub bairro: String,
    pub cidade: String,
    pub estado: String,
    pub complemento: Option<String>,
}

impl ShippingAddress {
    pub fn validate(&self) -> Result<(), DomainError> {
        if !is_valid_cep(&self.cep) {
            return Err(DomainError::InvalidInput(format!(
                "invalid CEP '{}'",
                self.cep
            )));
        }
        for (field, value) in [
            ("logradouro", &self.logradouro),
            ("numero", &self.numero),
            ("bairro", &self.bairro),
            ("cidade", &self.cidade),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::InvalidInput(format!(
                    "address field '{}' must not be empty",
                    field
                )));
            }
        }
        if self.estado.len() != 2 || !self.estado.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(DomainError::InvalidInput(format!(
                "invalid estado '{}'",
                self.estado
            )));
        }
        Ok(())
    }
}

/// Input for one order line, snapshotted from the cart at checkout.
#[derive(Debug, Clone)]
pub struct OrderItemInput {
    pub product_id: Uuid,
    pub variant_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub selected_size: String,
    pub selected_color: String,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub subtotal: BigDecimal,
    pub shipping_cost: BigDecimal,
    pub total: BigDecimal,
    pub external_reference: String,
    pub address: ShippingAddress,
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Clone)]
pub struct OrderItemView {
    pub id: Uuid,
    pub product_id: Uuid,
    pub variant_id: Uuid,
    pub quantity: i32,
    pub unit_price: BigDecimal,
    pub selected_size: String,
    pub selected_color: String,
}

#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: Uuid,
    pub user_id: Uuid,
    pub subtotal: BigDecimal,
    pub shipping_cost: BigDecimal,
    pub total: BigDecimal,
    pub status: OrderStatus,
    pub payment_id: Option<String>,
    pub payment_status: Option<String>,
    pub external_reference: String,
    pub address: ShippingAddress,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItemView>,
}
