//! # Admin Service
//!
//! Warehouse locations and the audit trail.

use tracing::info;

use crate::error::ApiResult;
use crate::services::Gate;
use crate::state::Session;
use crate::AppContext;
use depot_core::validation::{validate_capacity, validate_name};
use depot_core::{Action, AuditAction, AuditLogEntry, AuditModule, Warehouse};
use depot_db::{NewAuditEntry, NewWarehouse};

/// Capacity of a new warehouse when none is given.
pub const DEFAULT_WAREHOUSE_CAPACITY: i64 = 5000;

pub struct AdminService {
    ctx: AppContext,
}

impl AdminService {
    pub fn new(ctx: AppContext) -> Self {
        AdminService { ctx }
    }

    pub async fn list_warehouses(&self, session: &Session) -> ApiResult<Vec<Warehouse>> {
        Gate::check(session, Action::Read)?;

        let mut conn = self.ctx.db().acquire().await?;
        Ok(self.ctx.db().warehouses().list(&mut conn).await?)
    }

    /// Registers a new location. Admin only.
    pub async fn add_warehouse(
        &self,
        session: &Session,
        name: &str,
        location: &str,
        address: &str,
        phone: &str,
        capacity: Option<i64>,
    ) -> ApiResult<Warehouse> {
        Gate::check(session, Action::Delete)?;

        let capacity = capacity.unwrap_or(DEFAULT_WAREHOUSE_CAPACITY);
        validate_capacity(capacity)?;

        let new = NewWarehouse {
            name: validate_name("name", name)?,
            location: validate_name("location", location)?,
            address: address.trim().to_string(),
            phone: phone.trim().to_string(),
            capacity,
        };

        let db = self.ctx.db();
        let mut tx = db.begin_write().await?;

        let warehouse = db.warehouses().insert(&mut tx, &new).await?;
        db.audit()
            .append(
                &mut tx,
                &NewAuditEntry::new(
                    AuditAction::Create,
                    AuditModule::Warehouses,
                    warehouse.id,
                    session.username.as_str(),
                    format!("Added {} in {} ({} units)", warehouse.name, warehouse.location, capacity),
                ),
                self.ctx.now(),
            )
            .await?;

        tx.commit().await?;

        info!(id = warehouse.id, name = %warehouse.name, capacity, "Warehouse added");
        Ok(warehouse)
    }

    /// Audit entries newest first, optionally narrowed by module and action.
    pub async fn audit_trail(
        &self,
        session: &Session,
        module: Option<AuditModule>,
        action: Option<AuditAction>,
    ) -> ApiResult<Vec<AuditLogEntry>> {
        Gate::check(session, Action::ViewReports)?;

        let mut conn = self.ctx.db().acquire().await?;
        Ok(self.ctx.db().audit().query(&mut conn, module, action).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::testing::{context, login};
    use depot_core::orders::LineRequest;
    use depot_core::{Money, Role};

    #[tokio::test]
    async fn test_add_warehouse() {
        let ctx = context().await;
        let admin = login(&ctx, Role::Admin).await;
        let manager = login(&ctx, Role::Manager).await;
        let service = ctx.admin();

        let north = service
            .add_warehouse(&admin, "North Depot", "Pune", "Plot 7, MIDC", "020-555-0101", None)
            .await
            .unwrap();
        assert_eq!(north.capacity, DEFAULT_WAREHOUSE_CAPACITY);

        let err = service
            .add_warehouse(&admin, "Tiny", "Pune", "", "", Some(0))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidInput);

        let err = service
            .add_warehouse(&manager, "South", "Chennai", "", "", Some(100))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);

        let all = service.list_warehouses(&manager).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Main Warehouse");
        assert_eq!(all[1], north);
    }

    #[tokio::test]
    async fn test_audit_trail_records_mutations() {
        let ctx = context().await;
        let admin = login(&ctx, Role::Admin).await;

        let item = ctx
            .inventory()
            .add_item(&admin, "Crate", 10, Money::from_cents(500), 2)
            .await
            .unwrap();
        let receipt = ctx
            .orders()
            .create_order(&admin, "Acme", &[LineRequest::new(item.id, 3)])
            .await
            .unwrap();
        ctx.orders().fulfill_order(&admin, receipt.order.id).await.unwrap();

        let service = ctx.admin();
        let trail = service.audit_trail(&admin, None, None).await.unwrap();
        assert_eq!(trail.len(), 3);
        assert_eq!(trail[0].action, AuditAction::Update);
        assert_eq!(trail[0].module, AuditModule::Orders);
        assert!(trail.iter().all(|e| e.user == "admin"));

        let orders = service
            .audit_trail(&admin, Some(AuditModule::Orders), None)
            .await
            .unwrap();
        assert_eq!(orders.len(), 2);
        assert!(orders.iter().all(|e| e.record_id == receipt.order.id.to_string()));

        let creates = service
            .audit_trail(&admin, Some(AuditModule::Orders), Some(AuditAction::Create))
            .await
            .unwrap();
        assert_eq!(creates.len(), 1);

        let worker = login(&ctx, Role::Worker).await;
        let err = service.audit_trail(&worker, None, None).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
    }
}
