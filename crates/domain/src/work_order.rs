//! Work order aggregate governed by the workflow engine.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use cmms_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    Actor, UserRef, WorkOrderCommand, WorkOrderPermissions, WorkOrderStatus, WorkflowError,
    resolve_permissions, validate_transition,
};

/// Unique identifier for a work order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WorkOrderId(Uuid);

impl WorkOrderId {
    /// Creates a new random work order identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a work order identifier from an existing UUID value.
    #[must_use]
    pub fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Returns the underlying UUID value.
    #[must_use]
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for WorkOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WorkOrderId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for WorkOrderId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
            AppError::Validation(format!("invalid work order id '{value}': {error}"))
        })
    }
}

/// Urgency of a work order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WorkOrderPriority {
    /// Safety or production stopping.
    Critical,
    /// Needs attention soon.
    High,
    /// Regular maintenance.
    #[default]
    Medium,
    /// Can wait.
    Low,
}

impl WorkOrderPriority {
    /// Returns a stable storage value for this priority.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl FromStr for WorkOrderPriority {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "critical" => Ok(Self::Critical),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(AppError::Validation(format!(
                "unknown work order priority '{value}'"
            ))),
        }
    }
}

/// Reason attached to a rejected review. Never blank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionReason(String);

impl RejectionReason {
    /// Creates a trimmed rejection reason.
    pub fn new(value: impl Into<String>) -> Result<Self, WorkflowError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(WorkflowError::MissingRejectionReason);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the reason text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Status and version a write expects to replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkOrderRevision {
    /// Status read before the write.
    pub status: WorkOrderStatus,
    /// Version read before the write.
    pub version: u32,
}

/// Input payload used to raise a new work order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkOrderInput {
    /// Short summary.
    pub title: String,
    /// Longer description of the problem.
    pub description: Option<String>,
    /// Asset the work applies to.
    pub asset_name: Option<String>,
    /// Physical location.
    pub location: Option<String>,
    /// Urgency.
    pub priority: WorkOrderPriority,
    /// Target completion date.
    pub due_date: Option<NaiveDate>,
}

/// Partial update of descriptive fields. `None` leaves a field unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WorkOrderDetailsUpdate {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New asset name.
    pub asset_name: Option<String>,
    /// New location.
    pub location: Option<String>,
    /// New priority.
    pub priority: Option<WorkOrderPriority>,
    /// New due date; `Some(None)` clears it.
    pub due_date: Option<Option<NaiveDate>>,
}

/// Persisted shape of a work order, used by storage adapters to rehydrate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrderState {
    /// Identifier.
    pub id: WorkOrderId,
    /// Title.
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Asset name.
    pub asset_name: Option<String>,
    /// Location.
    pub location: Option<String>,
    /// Priority.
    pub priority: WorkOrderPriority,
    /// Current status.
    pub status: WorkOrderStatus,
    /// Who raised the request.
    pub requested_by: UserRef,
    /// Assigned technician.
    pub assigned_to: Option<UserRef>,
    /// Admin who assigned the work.
    pub managed_by: Option<UserRef>,
    /// Due date.
    pub due_date: Option<NaiveDate>,
    /// Notes submitted with completion.
    pub technician_notes: Option<String>,
    /// Reviewer notes on approval.
    pub review_notes: Option<String>,
    /// Reason of the latest rejection.
    pub rejection_reason: Option<String>,
    /// Optimistic concurrency version.
    pub version: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last mutation timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Maintenance task whose status and assignee change only through validated transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkOrder {
    id: WorkOrderId,
    title: NonEmptyString,
    description: Option<String>,
    asset_name: Option<String>,
    location: Option<String>,
    priority: WorkOrderPriority,
    status: WorkOrderStatus,
    requested_by: UserRef,
    assigned_to: Option<UserRef>,
    managed_by: Option<UserRef>,
    due_date: Option<NaiveDate>,
    technician_notes: Option<String>,
    review_notes: Option<String>,
    rejection_reason: Option<String>,
    version: u32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WorkOrder {
    /// Raises a new work order in `Open` on behalf of `requester`.
    pub fn create(input: WorkOrderInput, requester: &Actor, now: DateTime<Utc>) -> AppResult<Self> {
        validate_transition(WorkOrderStatus::Open, WorkOrderStatus::Open, requester.role())?;

        let WorkOrderInput {
            title,
            description,
            asset_name,
            location,
            priority,
            due_date,
        } = input;

        Ok(Self {
            id: WorkOrderId::new(),
            title: NonEmptyString::new(title.trim())?,
            description: normalize_optional(description),
            asset_name: normalize_optional(asset_name),
            location: normalize_optional(location),
            priority,
            status: WorkOrderStatus::Open,
            requested_by: requester.user_ref(),
            assigned_to: None,
            managed_by: None,
            due_date,
            technician_notes: None,
            review_notes: None,
            rejection_reason: None,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rebuilds a work order from its persisted shape.
    pub fn from_state(state: WorkOrderState) -> AppResult<Self> {
        let WorkOrderState {
            id,
            title,
            description,
            asset_name,
            location,
            priority,
            status,
            requested_by,
            assigned_to,
            managed_by,
            due_date,
            technician_notes,
            review_notes,
            rejection_reason,
            version,
            created_at,
            updated_at,
        } = state;

        Ok(Self {
            id,
            title: NonEmptyString::new(title)?,
            description,
            asset_name,
            location,
            priority,
            status,
            requested_by,
            assigned_to,
            managed_by,
            due_date,
            technician_notes,
            review_notes,
            rejection_reason,
            version,
            created_at,
            updated_at,
        })
    }

    /// Returns the identifier.
    #[must_use]
    pub fn id(&self) -> WorkOrderId {
        self.id
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &NonEmptyString {
        &self.title
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the asset name.
    #[must_use]
    pub fn asset_name(&self) -> Option<&str> {
        self.asset_name.as_deref()
    }

    /// Returns the location.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Returns the priority.
    #[must_use]
    pub fn priority(&self) -> WorkOrderPriority {
        self.priority
    }

    /// Returns the current status.
    #[must_use]
    pub fn status(&self) -> WorkOrderStatus {
        self.status
    }

    /// Returns who raised the request.
    #[must_use]
    pub fn requested_by(&self) -> &UserRef {
        &self.requested_by
    }

    /// Returns the assigned technician.
    #[must_use]
    pub fn assigned_to(&self) -> Option<&UserRef> {
        self.assigned_to.as_ref()
    }

    /// Returns the admin who assigned the work.
    #[must_use]
    pub fn managed_by(&self) -> Option<&UserRef> {
        self.managed_by.as_ref()
    }

    /// Returns the due date.
    #[must_use]
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    /// Returns the technician completion notes.
    #[must_use]
    pub fn technician_notes(&self) -> Option<&str> {
        self.technician_notes.as_deref()
    }

    /// Returns the reviewer notes.
    #[must_use]
    pub fn review_notes(&self) -> Option<&str> {
        self.review_notes.as_deref()
    }

    /// Returns the latest rejection reason.
    #[must_use]
    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason.as_deref()
    }

    /// Returns the optimistic concurrency version.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the last mutation timestamp.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Returns the status/version pair a write must match.
    #[must_use]
    pub fn revision(&self) -> WorkOrderRevision {
        WorkOrderRevision {
            status: self.status,
            version: self.version,
        }
    }

    /// Resolves the actor's capabilities against the current state.
    #[must_use]
    pub fn permissions_for(&self, actor: &Actor) -> WorkOrderPermissions {
        resolve_permissions(
            self.status,
            actor.role(),
            self.assigned_to.as_ref().map(|assignee| assignee.user_id),
            actor.user_id(),
        )
    }

    /// Applies a workflow command, returning the next state.
    ///
    /// The transition table is checked first; on violation `self` is untouched.
    pub fn apply(
        &self,
        command: &WorkOrderCommand,
        actor: &Actor,
        now: DateTime<Utc>,
    ) -> Result<Self, WorkflowError> {
        let target = command.target_status();
        validate_transition(self.status, target, actor.role())?;

        let mut next = self.clone();
        next.status = target;
        next.version = self.version.saturating_add(1);
        next.updated_at = now;

        match command {
            WorkOrderCommand::Assign { technician } => {
                next.assigned_to = Some(technician.clone());
                next.managed_by = Some(actor.user_ref());
            }
            WorkOrderCommand::SubmitCompletion { notes } => {
                if let Some(notes) = normalize_optional(notes.clone()) {
                    next.technician_notes = Some(notes);
                }
            }
            WorkOrderCommand::Approve { review_notes } => {
                next.review_notes = normalize_optional(review_notes.clone());
            }
            WorkOrderCommand::Reject { reason } => {
                next.rejection_reason = Some(reason.as_str().to_owned());
            }
            WorkOrderCommand::Close | WorkOrderCommand::Reopen | WorkOrderCommand::Cancel => {}
        }

        Ok(next)
    }

    /// Applies a descriptive update. Status and assignment are never touched.
    pub fn with_details(&self, update: WorkOrderDetailsUpdate, now: DateTime<Utc>) -> AppResult<Self> {
        let mut next = self.clone();

        if let Some(title) = update.title {
            next.title = NonEmptyString::new(title.trim())?;
        }
        if let Some(description) = update.description {
            next.description = normalize_optional(Some(description));
        }
        if let Some(asset_name) = update.asset_name {
            next.asset_name = normalize_optional(Some(asset_name));
        }
        if let Some(location) = update.location {
            next.location = normalize_optional(Some(location));
        }
        if let Some(priority) = update.priority {
            next.priority = priority;
        }
        if let Some(due_date) = update.due_date {
            next.due_date = due_date;
        }

        next.version = self.version.saturating_add(1);
        next.updated_at = now;
        Ok(next)
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim().to_owned();
        (!trimmed.is_empty()).then_some(trimmed)
    })
}
