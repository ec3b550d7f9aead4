//! PostgreSQL-backed work order repository.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use cmms_application::{WorkOrderListQuery, WorkOrderRepository};
use cmms_core::{AppError, AppResult};
use cmms_domain::{
    UserId, UserRef, WorkOrder, WorkOrderId, WorkOrderPriority, WorkOrderRevision, WorkOrderState,
    WorkOrderStatus,
};

/// PostgreSQL implementation of the work order repository port.
#[derive(Clone)]
pub struct PostgresWorkOrderRepository {
    pool: PgPool,
}

impl PostgresWorkOrderRepository {
    /// Creates a repository with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const WORK_ORDER_COLUMNS: &str = r#"
    id, title, description, asset_name, location, priority, status,
    requested_by_id, requested_by_name, assigned_to_id, assigned_to_name,
    managed_by_id, managed_by_name, due_date, technician_notes, review_notes,
    rejection_reason, version, created_at, updated_at
"#;

#[derive(Debug, sqlx::FromRow)]
struct WorkOrderRow {
    id: Uuid,
    title: String,
    description: Option<String>,
    asset_name: Option<String>,
    location: Option<String>,
    priority: String,
    status: String,
    requested_by_id: Uuid,
    requested_by_name: String,
    assigned_to_id: Option<Uuid>,
    assigned_to_name: Option<String>,
    managed_by_id: Option<Uuid>,
    managed_by_name: Option<String>,
    due_date: Option<NaiveDate>,
    technician_notes: Option<String>,
    review_notes: Option<String>,
    rejection_reason: Option<String>,
    version: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn user_ref(id: Option<Uuid>, name: Option<String>) -> Option<UserRef> {
    id.map(|id| UserRef::new(UserId::from_uuid(id), name.unwrap_or_default()))
}

impl TryFrom<WorkOrderRow> for WorkOrder {
    type Error = AppError;

    fn try_from(row: WorkOrderRow) -> Result<Self, Self::Error> {
        let version = u32::try_from(row.version).map_err(|error| {
            AppError::Internal(format!(
                "work order '{}' has invalid version {}: {error}",
                row.id, row.version
            ))
        })?;

        WorkOrder::from_state(WorkOrderState {
            id: WorkOrderId::from_uuid(row.id),
            title: row.title,
            description: row.description,
            asset_name: row.asset_name,
            location: row.location,
            priority: WorkOrderPriority::from_str(row.priority.as_str())?,
            status: WorkOrderStatus::from_str(row.status.as_str())?,
            requested_by: UserRef::new(
                UserId::from_uuid(row.requested_by_id),
                row.requested_by_name,
            ),
            assigned_to: user_ref(row.assigned_to_id, row.assigned_to_name),
            managed_by: user_ref(row.managed_by_id, row.managed_by_name),
            due_date: row.due_date,
            technician_notes: row.technician_notes,
            review_notes: row.review_notes,
            rejection_reason: row.rejection_reason,
            version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn version_value(version: u32) -> AppResult<i32> {
    i32::try_from(version)
        .map_err(|error| AppError::Internal(format!("work order version overflow: {error}")))
}

fn page_value(value: usize) -> AppResult<i64> {
    i64::try_from(value)
        .map_err(|error| AppError::Validation(format!("invalid paging value: {error}")))
}

impl PostgresWorkOrderRepository {
    /// Distinguishes a missing row from a stale revision after a guarded write
    /// touched nothing.
    async fn stale_write_error(&self, work_order_id: WorkOrderId) -> AppResult<AppError> {
        let current = self.find_work_order(work_order_id).await?;
        Ok(match current {
            Some(current) => AppError::Conflict(format!(
                "work order '{}' was changed concurrently: now {} at version {}",
                work_order_id,
                current.status(),
                current.version()
            )),
            None => AppError::NotFound(format!("work order '{work_order_id}' does not exist")),
        })
    }
}

#[async_trait]
impl WorkOrderRepository for PostgresWorkOrderRepository {
    async fn insert_work_order(&self, work_order: &WorkOrder) -> AppResult<()> {
        let assigned_to = work_order.assigned_to();
        let managed_by = work_order.managed_by();

        sqlx::query(
            r#"
            INSERT INTO work_orders (
                id, title, description, asset_name, location, priority, status,
                requested_by_id, requested_by_name, assigned_to_id, assigned_to_name,
                managed_by_id, managed_by_name, due_date, technician_notes, review_notes,
                rejection_reason, version, created_at, updated_at
            )
            VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                $11, $12, $13, $14, $15, $16, $17, $18, $19, $20
            )
            "#,
        )
        .bind(work_order.id().as_uuid())
        .bind(work_order.title().as_str())
        .bind(work_order.description())
        .bind(work_order.asset_name())
        .bind(work_order.location())
        .bind(work_order.priority().as_str())
        .bind(work_order.status().as_str())
        .bind(work_order.requested_by().user_id.as_uuid())
        .bind(work_order.requested_by().display_name.as_str())
        .bind(assigned_to.map(|user| user.user_id.as_uuid()))
        .bind(assigned_to.map(|user| user.display_name.as_str()))
        .bind(managed_by.map(|user| user.user_id.as_uuid()))
        .bind(managed_by.map(|user| user.display_name.as_str()))
        .bind(work_order.due_date())
        .bind(work_order.technician_notes())
        .bind(work_order.review_notes())
        .bind(work_order.rejection_reason())
        .bind(version_value(work_order.version())?)
        .bind(work_order.created_at())
        .bind(work_order.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(ref database_error) = error
                && database_error.code().as_deref() == Some("23505")
            {
                return AppError::Conflict(format!(
                    "work order '{}' already exists",
                    work_order.id()
                ));
            }

            AppError::Internal(format!("failed to insert work order: {error}"))
        })?;

        Ok(())
    }

    async fn find_work_order(&self, work_order_id: WorkOrderId) -> AppResult<Option<WorkOrder>> {
        let row = sqlx::query_as::<_, WorkOrderRow>(&format!(
            "SELECT {WORK_ORDER_COLUMNS} FROM work_orders WHERE id = $1"
        ))
        .bind(work_order_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find work order: {error}")))?;

        row.map(WorkOrder::try_from).transpose()
    }

    async fn list_work_orders(&self, query: WorkOrderListQuery) -> AppResult<Vec<WorkOrder>> {
        let rows = sqlx::query_as::<_, WorkOrderRow>(&format!(
            r#"
            SELECT {WORK_ORDER_COLUMNS}
            FROM work_orders
            WHERE ($1::TEXT IS NULL OR status = $1)
              AND ($2::UUID IS NULL OR assigned_to_id = $2)
              AND ($3::UUID IS NULL OR requested_by_id = $3)
            ORDER BY created_at DESC, id
            LIMIT $4 OFFSET $5
            "#
        ))
        .bind(query.status.map(|status| status.as_str()))
        .bind(query.assigned_to.map(|user_id| user_id.as_uuid()))
        .bind(query.requested_by.map(|user_id| user_id.as_uuid()))
        .bind(page_value(query.limit)?)
        .bind(page_value(query.offset)?)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list work orders: {error}")))?;

        rows.into_iter().map(WorkOrder::try_from).collect()
    }

    async fn list_due_between(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<WorkOrder>> {
        let rows = sqlx::query_as::<_, WorkOrderRow>(&format!(
            r#"
            SELECT {WORK_ORDER_COLUMNS}
            FROM work_orders
            WHERE due_date BETWEEN $1 AND $2
            ORDER BY due_date, id
            "#
        ))
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list work orders by due date: {error}"))
        })?;

        rows.into_iter().map(WorkOrder::try_from).collect()
    }

    async fn update_work_order(
        &self,
        work_order: &WorkOrder,
        expected: WorkOrderRevision,
    ) -> AppResult<()> {
        let assigned_to = work_order.assigned_to();
        let managed_by = work_order.managed_by();

        let result = sqlx::query(
            r#"
            UPDATE work_orders
            SET title = $2,
                description = $3,
                asset_name = $4,
                location = $5,
                priority = $6,
                status = $7,
                assigned_to_id = $8,
                assigned_to_name = $9,
                managed_by_id = $10,
                managed_by_name = $11,
                due_date = $12,
                technician_notes = $13,
                review_notes = $14,
                rejection_reason = $15,
                version = $16,
                updated_at = $17
            WHERE id = $1 AND status = $18 AND version = $19
            "#,
        )
        .bind(work_order.id().as_uuid())
        .bind(work_order.title().as_str())
        .bind(work_order.description())
        .bind(work_order.asset_name())
        .bind(work_order.location())
        .bind(work_order.priority().as_str())
        .bind(work_order.status().as_str())
        .bind(assigned_to.map(|user| user.user_id.as_uuid()))
        .bind(assigned_to.map(|user| user.display_name.as_str()))
        .bind(managed_by.map(|user| user.user_id.as_uuid()))
        .bind(managed_by.map(|user| user.display_name.as_str()))
        .bind(work_order.due_date())
        .bind(work_order.technician_notes())
        .bind(work_order.review_notes())
        .bind(work_order.rejection_reason())
        .bind(version_value(work_order.version())?)
        .bind(work_order.updated_at())
        .bind(expected.status.as_str())
        .bind(version_value(expected.version)?)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to update work order: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(self.stale_write_error(work_order.id()).await?);
        }

        Ok(())
    }

    async fn delete_work_order(
        &self,
        work_order_id: WorkOrderId,
        expected: WorkOrderRevision,
    ) -> AppResult<()> {
        let result = sqlx::query(
            r#"
            DELETE FROM work_orders
            WHERE id = $1 AND status = $2 AND version = $3
            "#,
        )
        .bind(work_order_id.as_uuid())
        .bind(expected.status.as_str())
        .bind(version_value(expected.version)?)
        .execute(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to delete work order: {error}")))?;

        if result.rows_affected() == 0 {
            return Err(self.stale_write_error(work_order_id).await?);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
