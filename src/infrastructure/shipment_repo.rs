use diesel::prelude::*;
use uuid::Uuid;

use crate::db::DbPool;
use crate::domain::errors::DomainError;
use crate::domain::ports::ShipmentRepository;
use crate::domain::shipment::ShipmentView;
use crate::domain::status::ShipmentStatus;
use crate::schema::shipments;

use super::models::{NewShipmentRow, ShipmentRow};

#[derive(Clone)]
pub struct DieselShipmentRepository {
    pool: DbPool,
}

impl DieselShipmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn to_view(row: ShipmentRow) -> Result<ShipmentView, DomainError> {
    let status = ShipmentStatus::parse(&row.status).ok_or_else(|| {
        DomainError::Internal(format!(
            "shipment {} has unknown status '{}'",
            row.id, row.status
        ))
    })?;
    Ok(ShipmentView {
        id: row.id,
        order_id: row.order_id,
        me_shipment_id: row.me_shipment_id,
        tracking_code: row.tracking_code,
        label_url: row.label_url,
        status,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

impl ShipmentRepository for DieselShipmentRepository {
    fn find_by_order(&self, order_id: Uuid) -> Result<Option<ShipmentView>, DomainError> {
        let mut conn = self.pool.get()?;
        let row = shipments::table
            .filter(shipments::order_id.eq(order_id))
            .select(ShipmentRow::as_select())
            .first(&mut conn)
            .optional()?;
        row.map(to_view).transpose()
    }

    fn create_for_order(&self, order_id: Uuid) -> Result<ShipmentView, DomainError> {
        let mut conn = self.pool.get()?;
        let id = Uuid::new_v4();
        diesel::insert_into(shipments::table)
            .values(&NewShipmentRow {
                id,
                order_id,
                status: ShipmentStatus::Pending.as_str().to_string(),
            })
            .execute(&mut conn)?;
        let row = shipments::table
            .filter(shipments::id.eq(id))
            .select(ShipmentRow::as_select())
            .first(&mut conn)?;
        to_view(row)
    }

    fn set_provider_id(
        &self,
        shipment_id: Uuid,
        me_shipment_id: &str,
        status: ShipmentStatus,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(shipments::table.filter(shipments::id.eq(shipment_id)))
            .set((
                shipments::me_shipment_id.eq(me_shipment_id),
                shipments::status.eq(status.as_str()),
                shipments::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    fn set_tracking(
        &self,
        shipment_id: Uuid,
        tracking_code: &str,
        label_url: Option<&str>,
        status: ShipmentStatus,
    ) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let updated = match label_url {
            Some(url) => diesel::update(shipments::table.filter(shipments::id.eq(shipment_id)))
                .set((
                    shipments::tracking_code.eq(tracking_code),
                    shipments::label_url.eq(url),
                    shipments::status.eq(status.as_str()),
                    shipments::updated_at.eq(diesel::dsl::now),
                ))
                .execute(&mut conn)?,
            // Keep any previously persisted label URL.
            None => diesel::update(shipments::table.filter(shipments::id.eq(shipment_id)))
                .set((
                    shipments::tracking_code.eq(tracking_code),
                    shipments::status.eq(status.as_str()),
                    shipments::updated_at.eq(diesel::dsl::now),
                ))
                .execute(&mut conn)?,
        };
        if updated == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }

    fn set_status(&self, shipment_id: Uuid, status: ShipmentStatus) -> Result<(), DomainError> {
        let mut conn = self.pool.get()?;
        let updated = diesel::update(shipments::table.filter(shipments::id.eq(shipment_id)))
            .set((
                shipments::status.eq(status.as_str()),
                shipments::updated_at.eq(diesel::dsl::now),
            ))
            .execute(&mut conn)?;
        if updated == 0 {
            return Err(DomainError::NotFound);
        }
        Ok(())
    }
}
