use std::str::FromStr;

use chrono::NaiveDate;
use cmms_application::{
    WorkOrderCapabilities, WorkOrderListQuery, WorkflowOutcome, DEFAULT_WORK_ORDER_PAGE_SIZE,
};
use cmms_core::AppError;
use cmms_domain::{
    UserId, WorkOrder, WorkOrderDetailsUpdate, WorkOrderInput, WorkOrderPermissions,
    WorkOrderPriority, WorkOrderStatus,
};

use super::types::{
    CreateWorkOrderRequest, UpdateWorkOrderRequest, WorkOrderCapabilitiesResponse,
    WorkOrderListQueryRequest, WorkOrderPermissionsResponse, WorkOrderResponse,
    WorkflowOutcomeResponse,
};
use crate::dto::common::UserRefResponse;
use crate::dto::notifications::NotificationResponse;

fn parse_due_date(value: Option<String>) -> Result<Option<NaiveDate>, AppError> {
    value
        .filter(|value| !value.trim().is_empty())
        .map(|value| {
            NaiveDate::from_str(value.trim()).map_err(|error| {
                AppError::Validation(format!("invalid due_date '{value}': {error}"))
            })
        })
        .transpose()
}

/// Absent leaves the date unchanged; an empty string clears it.
fn parse_due_date_update(value: Option<String>) -> Result<Option<Option<NaiveDate>>, AppError> {
    match value {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(Some(None)),
        Some(value) => parse_due_date(Some(value)).map(Some),
    }
}

fn parse_priority(value: Option<String>) -> Result<Option<WorkOrderPriority>, AppError> {
    value
        .map(|value| WorkOrderPriority::from_str(value.as_str()))
        .transpose()
}

fn parse_user_id(value: Option<String>) -> Result<Option<UserId>, AppError> {
    value.map(|value| UserId::from_str(value.as_str())).transpose()
}

impl TryFrom<CreateWorkOrderRequest> for WorkOrderInput {
    type Error = AppError;

    fn try_from(value: CreateWorkOrderRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title,
            description: value.description,
            asset_name: value.asset_name,
            location: value.location,
            priority: parse_priority(value.priority)?.unwrap_or_default(),
            due_date: parse_due_date(value.due_date)?,
        })
    }
}

impl TryFrom<UpdateWorkOrderRequest> for WorkOrderDetailsUpdate {
    type Error = AppError;

    fn try_from(value: UpdateWorkOrderRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            title: value.title,
            description: value.description,
            asset_name: value.asset_name,
            location: value.location,
            priority: parse_priority(value.priority)?,
            due_date: parse_due_date_update(value.due_date)?,
        })
    }
}

impl TryFrom<WorkOrderListQueryRequest> for WorkOrderListQuery {
    type Error = AppError;

    fn try_from(value: WorkOrderListQueryRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            status: value
                .status
                .map(|status| WorkOrderStatus::from_str(status.as_str()))
                .transpose()?,
            assigned_to: parse_user_id(value.assigned_to)?,
            requested_by: parse_user_id(value.requested_by)?,
            limit: value.limit.unwrap_or(DEFAULT_WORK_ORDER_PAGE_SIZE),
            offset: value.offset.unwrap_or(0),
        })
    }
}

impl From<&WorkOrder> for WorkOrderResponse {
    fn from(value: &WorkOrder) -> Self {
        Self {
            work_order_id: value.id().to_string(),
            title: value.title().as_str().to_owned(),
            description: value.description().map(ToOwned::to_owned),
            asset_name: value.asset_name().map(ToOwned::to_owned),
            location: value.location().map(ToOwned::to_owned),
            priority: value.priority().as_str().to_owned(),
            status: value.status().as_str().to_owned(),
            requested_by: UserRefResponse::from(value.requested_by()),
            assigned_to: value.assigned_to().map(UserRefResponse::from),
            managed_by: value.managed_by().map(UserRefResponse::from),
            due_date: value.due_date().map(|date| date.to_string()),
            technician_notes: value.technician_notes().map(ToOwned::to_owned),
            review_notes: value.review_notes().map(ToOwned::to_owned),
            rejection_reason: value.rejection_reason().map(ToOwned::to_owned),
            version: value.version(),
            created_at: value.created_at().to_rfc3339(),
            updated_at: value.updated_at().to_rfc3339(),
        }
    }
}

impl From<WorkOrderPermissions> for WorkOrderPermissionsResponse {
    fn from(value: WorkOrderPermissions) -> Self {
        Self {
            can_edit: value.can_edit,
            can_change_status: value.can_change_status,
            can_assign: value.can_assign,
            can_delete: value.can_delete,
            can_view: value.can_view,
        }
    }
}

impl From<WorkOrderCapabilities> for WorkOrderCapabilitiesResponse {
    fn from(value: WorkOrderCapabilities) -> Self {
        Self {
            status: value.status.as_str().to_owned(),
            version: value.version,
            permissions: value.permissions.into(),
            next_statuses: value
                .next_statuses
                .into_iter()
                .map(|status| status.as_str().to_owned())
                .collect(),
        }
    }
}

impl From<WorkflowOutcome> for WorkflowOutcomeResponse {
    fn from(value: WorkflowOutcome) -> Self {
        Self {
            work_order: WorkOrderResponse::from(&value.work_order),
            notifications: value
                .notifications
                .iter()
                .map(NotificationResponse::from)
                .collect(),
            failed_deliveries: value.failed_deliveries,
        }
    }
}
