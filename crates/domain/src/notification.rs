//! Notification rule engine.
//!
//! Each rule turns one completed workflow action into notification values,
//! one per recipient. Rules never look anyone up: role broadcasts arrive as
//! already-resolved recipient lists.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use cmms_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{RejectionReason, Role, UserRef, WorkOrder, WorkOrderId, WorkOrderStatus};

/// Unique identifier for a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NotificationId(Uuid);

impl NotificationId {
    /// Creates a new random notification identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a notification identifier from an existing UUID value.
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

impl Default for NotificationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NotificationId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for NotificationId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim()).map(Self).map_err(|error| {
            AppError::Validation(format!("invalid notification id '{value}': {error}"))
        })
    }
}

/// Event category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    /// A work order was raised.
    WoCreated,
    /// A technician was assigned.
    WoAssigned,
    /// Work was submitted for review.
    WoCompleted,
    /// Review accepted the work.
    WoApproved,
    /// Review sent the work back.
    WoRejected,
    /// Work order was closed.
    WoClosed,
    /// Work order was canceled.
    WoCanceled,
    /// Due in seven days.
    WoDue7Days,
    /// Due in three days.
    WoDue3Days,
    /// Due tomorrow.
    WoDue1Day,
}

impl NotificationType {
    /// Returns a stable storage value for this type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WoCreated => "wo_created",
            Self::WoAssigned => "wo_assigned",
            Self::WoCompleted => "wo_completed",
            Self::WoApproved => "wo_approved",
            Self::WoRejected => "wo_rejected",
            Self::WoClosed => "wo_closed",
            Self::WoCanceled => "wo_canceled",
            Self::WoDue7Days => "wo_due_7_days",
            Self::WoDue3Days => "wo_due_3_days",
            Self::WoDue1Day => "wo_due_1_day",
        }
    }

    /// Returns the reminder type for a work order due in `days` days.
    #[must_use]
    pub fn due_reminder(days: i64) -> Option<Self> {
        match days {
            7 => Some(Self::WoDue7Days),
            3 => Some(Self::WoDue3Days),
            1 => Some(Self::WoDue1Day),
            _ => None,
        }
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for NotificationType {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "wo_created" => Ok(Self::WoCreated),
            "wo_assigned" => Ok(Self::WoAssigned),
            "wo_completed" => Ok(Self::WoCompleted),
            "wo_approved" => Ok(Self::WoApproved),
            "wo_rejected" => Ok(Self::WoRejected),
            "wo_closed" => Ok(Self::WoClosed),
            "wo_canceled" => Ok(Self::WoCanceled),
            "wo_due_7_days" => Ok(Self::WoDue7Days),
            "wo_due_3_days" => Ok(Self::WoDue3Days),
            "wo_due_1_day" => Ok(Self::WoDue1Day),
            _ => Err(AppError::Validation(format!(
                "unknown notification type '{value}'"
            ))),
        }
    }
}

/// A message for exactly one recipient about one work order event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Identifier, also used as the delivery idempotency key.
    pub notification_id: NotificationId,
    /// Event category.
    pub notification_type: NotificationType,
    /// Work order the event concerns.
    pub work_order_id: WorkOrderId,
    /// Work order title at the time of the event.
    pub work_order_title: String,
    /// Rendered message.
    pub message: String,
    /// Role under which the recipient is addressed.
    pub recipient_role: Role,
    /// The single recipient.
    pub recipient: UserRef,
    /// Read flag; always false on construction.
    pub is_read: bool,
    /// Construction time.
    pub created_at: DateTime<Utc>,
    /// Who caused the event.
    pub triggered_by: UserRef,
}

/// Picks who reviews a completion: the technician's supervisor if known,
/// otherwise every head technician.
#[must_use]
pub fn completion_reviewers(
    supervisor: Option<UserRef>,
    head_technicians: Vec<UserRef>,
) -> Vec<UserRef> {
    match supervisor {
        Some(supervisor) => vec![supervisor],
        None => head_technicians,
    }
}

/// A completed action on a work order, ready to be turned into notifications.
#[derive(Debug, Clone, Copy)]
pub struct WorkOrderEvent<'a> {
    work_order: &'a WorkOrder,
    triggered_by: &'a UserRef,
    occurred_at: DateTime<Utc>,
}

impl<'a> WorkOrderEvent<'a> {
    /// Describes an action by `triggered_by` that produced `work_order`.
    #[must_use]
    pub fn new(
        work_order: &'a WorkOrder,
        triggered_by: &'a UserRef,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            work_order,
            triggered_by,
            occurred_at,
        }
    }

    /// New request: every admin is told.
    #[must_use]
    pub fn created(&self, admins: &[UserRef]) -> Vec<Notification> {
        let message = format!("New work order created: \"{}\"", self.title());
        admins
            .iter()
            .map(|admin| {
                self.notify(
                    NotificationType::WoCreated,
                    Role::Admin,
                    admin.clone(),
                    message.clone(),
                )
            })
            .collect()
    }

    /// Assignment: the assignee is told.
    #[must_use]
    pub fn assigned(&self) -> Vec<Notification> {
        let message = format!(
            "You have been assigned to work order: \"{}\"",
            self.title()
        );
        self.work_order
            .assigned_to()
            .map(|technician| {
                self.notify(
                    NotificationType::WoAssigned,
                    Role::Technician,
                    technician.clone(),
                    message,
                )
            })
            .into_iter()
            .collect()
    }

    /// Completion submitted: the resolved reviewers are told.
    #[must_use]
    pub fn completed(&self, reviewers: &[UserRef]) -> Vec<Notification> {
        let message = format!(
            "Work order \"{}\" has been completed and is pending review",
            self.title()
        );
        reviewers
            .iter()
            .map(|reviewer| {
                self.notify(
                    NotificationType::WoCompleted,
                    Role::HeadTechnician,
                    reviewer.clone(),
                    message.clone(),
                )
            })
            .collect()
    }

    /// Approval: the requester and the assigned technician are told separately.
    #[must_use]
    pub fn approved(&self) -> Vec<Notification> {
        let title = self.title();
        let mut notifications = vec![self.notify(
            NotificationType::WoApproved,
            Role::Requester,
            self.work_order.requested_by().clone(),
            format!("Your work order \"{title}\" has been approved and completed"),
        )];

        if let Some(technician) = self.work_order.assigned_to() {
            notifications.push(self.notify(
                NotificationType::WoApproved,
                Role::Technician,
                technician.clone(),
                format!("Work order \"{title}\" has been approved"),
            ));
        }

        notifications
    }

    /// Approval: the managing admin, or every admin when none is recorded,
    /// learns the work is ready to close.
    #[must_use]
    pub fn ready_to_close(&self, admins: &[UserRef]) -> Vec<Notification> {
        let message = format!(
            "Work order \"{}\" has been approved and is ready to be closed",
            self.title()
        );
        let recipients = match self.work_order.managed_by() {
            Some(manager) => std::slice::from_ref(manager),
            None => admins,
        };

        recipients
            .iter()
            .map(|admin| {
                self.notify(
                    NotificationType::WoApproved,
                    Role::Admin,
                    admin.clone(),
                    message.clone(),
                )
            })
            .collect()
    }

    /// Rejection: the assigned technician is told why.
    #[must_use]
    pub fn rejected(&self, reason: &RejectionReason) -> Vec<Notification> {
        let message = format!(
            "Work order \"{}\" needs revision. Reason: {}",
            self.title(),
            reason.as_str()
        );
        self.work_order
            .assigned_to()
            .map(|technician| {
                self.notify(
                    NotificationType::WoRejected,
                    Role::Technician,
                    technician.clone(),
                    message,
                )
            })
            .into_iter()
            .collect()
    }

    /// Closure: the requester is told.
    #[must_use]
    pub fn closed(&self) -> Vec<Notification> {
        vec![self.notify(
            NotificationType::WoClosed,
            Role::Requester,
            self.work_order.requested_by().clone(),
            format!("Work order \"{}\" has been closed", self.title()),
        )]
    }

    /// Cancellation: the requester is told.
    #[must_use]
    pub fn canceled(&self) -> Vec<Notification> {
        vec![self.notify(
            NotificationType::WoCanceled,
            Role::Requester,
            self.work_order.requested_by().clone(),
            format!("Work order \"{}\" has been canceled", self.title()),
        )]
    }

    fn title(&self) -> &str {
        self.work_order.title().as_str()
    }

    fn notify(
        &self,
        notification_type: NotificationType,
        recipient_role: Role,
        recipient: UserRef,
        message: String,
    ) -> Notification {
        Notification {
            notification_id: NotificationId::new(),
            notification_type,
            work_order_id: self.work_order.id(),
            work_order_title: self.title().to_owned(),
            message,
            recipient_role,
            recipient,
            is_read: false,
            created_at: self.occurred_at,
            triggered_by: self.triggered_by.clone(),
        }
    }
}

/// Builds the due-date reminder for `work_order` as of `today`, if one is due.
///
/// Only assigned work that is still being worked on qualifies, and only at
/// seven, three and one day(s) before the due date.
#[must_use]
pub fn due_reminder(
    work_order: &WorkOrder,
    today: NaiveDate,
    now: DateTime<Utc>,
) -> Option<Notification> {
    let status = work_order.status();
    if status.is_terminal() || status == WorkOrderStatus::Completed {
        return None;
    }

    let technician = work_order.assigned_to()?;
    let due_date = work_order.due_date()?;
    let days_left = (due_date - today).num_days();
    let notification_type = NotificationType::due_reminder(days_left)?;

    let title = work_order.title().as_str();
    let message = match notification_type {
        NotificationType::WoDue1Day => {
            format!("Work order \"{title}\" is due tomorrow ({due_date})")
        }
        _ => format!("Work order \"{title}\" is due in {days_left} days ({due_date})"),
    };

    let system = UserRef::system();
    Some(
        WorkOrderEvent::new(work_order, &system, now).notify(
            notification_type,
            Role::Technician,
            technician.clone(),
            message,
        ),
    )
}
