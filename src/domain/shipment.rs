use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::status::ShipmentStatus;

/// Local projection of a shipment with the provider. Each field is persisted
/// as soon as it becomes known so a crash mid-sequence loses nothing.
#[derive(Debug, Clone)]
pub struct ShipmentView {
    pub id: Uuid,
    pub order_id: Uuid,
    pub me_shipment_id: Option<String>,
    pub tracking_code: Option<String>,
    pub label_url: Option<String>,
    pub status: ShipmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Authoritative provider-side shipment handle returned by checkout.
#[derive(Debug, Clone)]
pub struct ProviderShipment {
    pub id: String,
}

/// Tracking/label state as reported by the provider. Either field may still
/// be absent while label generation is pending on the provider side.
#[derive(Debug, Clone, Default)]
pub struct TrackingInfo {
    pub tracking_code: Option<String>,
    pub label_url: Option<String>,
}
