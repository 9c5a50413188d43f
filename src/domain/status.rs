//! Status vocabularies for orders, gateway payments, and shipments.
//!
//! Order statuses keep the Portuguese wire values the storefront and the
//! gateway integration were built around; renaming them would break every
//! existing consumer.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Pendente,
    Pago,
    PagamentoRejeitado,
    Cancelado,
    Reembolsado,
    Confirmed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pendente => "pendente",
            OrderStatus::Pago => "pago",
            OrderStatus::PagamentoRejeitado => "pagamento_rejeitado",
            OrderStatus::Cancelado => "cancelado",
            OrderStatus::Reembolsado => "reembolsado",
            OrderStatus::Confirmed => "confirmed",
        }
    }

    pub fn parse(s: &str) -> Option<OrderStatus> {
        match s {
            "pendente" => Some(OrderStatus::Pendente),
            "pago" => Some(OrderStatus::Pago),
            "pagamento_rejeitado" => Some(OrderStatus::PagamentoRejeitado),
            "cancelado" => Some(OrderStatus::Cancelado),
            "reembolsado" => Some(OrderStatus::Reembolsado),
            "confirmed" => Some(OrderStatus::Confirmed),
            _ => None,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical charge status as reported by the payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
    Refunded,
    InProcess,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Approved => "approved",
            PaymentStatus::Rejected => "rejected",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::InProcess => "in_process",
        }
    }

    pub fn parse(s: &str) -> Option<PaymentStatus> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "approved" => Some(PaymentStatus::Approved),
            "rejected" => Some(PaymentStatus::Rejected),
            "refunded" => Some(PaymentStatus::Refunded),
            "in_process" => Some(PaymentStatus::InProcess),
            _ => None,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipmentStatus {
    Pending,
    Released,
    ProntoParaEnvio,
    ProcessandoMe,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShipmentStatus::Pending => "pending",
            ShipmentStatus::Released => "released",
            ShipmentStatus::ProntoParaEnvio => "pronto_para_envio",
            ShipmentStatus::ProcessandoMe => "processando_me",
        }
    }

    pub fn parse(s: &str) -> Option<ShipmentStatus> {
        match s {
            "pending" => Some(ShipmentStatus::Pending),
            "released" => Some(ShipmentStatus::Released),
            "pronto_para_envio" => Some(ShipmentStatus::ProntoParaEnvio),
            "processando_me" => Some(ShipmentStatus::ProcessandoMe),
            _ => None,
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
