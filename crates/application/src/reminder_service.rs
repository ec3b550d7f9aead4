use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use cmms_core::{AppError, AppResult};
use cmms_domain::due_reminder;
use tracing::{debug, warn};

use crate::notification_ports::{NotificationDelivery, NotificationRepository};
use crate::work_order_ports::WorkOrderRepository;

/// Furthest reminder horizon, in days.
const REMINDER_HORIZON_DAYS: u64 = 7;

/// Counters from one reminder pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReminderRunSummary {
    /// Work orders with a due date inside the horizon.
    pub scanned: usize,
    /// Reminders delivered.
    pub sent: usize,
    /// Reminders skipped because the inbox already holds them.
    pub already_sent: usize,
    /// Reminders whose delivery failed.
    pub failed: usize,
}

/// Emits due-date reminders for assigned work.
#[derive(Clone)]
pub struct ReminderService {
    work_orders: Arc<dyn WorkOrderRepository>,
    inbox: Arc<dyn NotificationRepository>,
    delivery: Arc<dyn NotificationDelivery>,
}

impl ReminderService {
    /// Creates a reminder service.
    #[must_use]
    pub fn new(
        work_orders: Arc<dyn WorkOrderRepository>,
        inbox: Arc<dyn NotificationRepository>,
        delivery: Arc<dyn NotificationDelivery>,
    ) -> Self {
        Self {
            work_orders,
            inbox,
            delivery,
        }
    }

    /// Delivers every reminder due as of `today` that has not been sent yet.
    pub async fn dispatch_due_reminders(&self, today: NaiveDate) -> AppResult<ReminderRunSummary> {
        let horizon = today
            .checked_add_days(Days::new(REMINDER_HORIZON_DAYS))
            .ok_or_else(|| AppError::Internal(format!("reminder horizon overflows from {today}")))?;
        let tomorrow = today
            .checked_add_days(Days::new(1))
            .ok_or_else(|| AppError::Internal(format!("reminder horizon overflows from {today}")))?;

        let candidates = self.work_orders.list_due_between(tomorrow, horizon).await?;
        let mut summary = ReminderRunSummary {
            scanned: candidates.len(),
            ..ReminderRunSummary::default()
        };

        let now = Utc::now();
        for work_order in &candidates {
            let Some(reminder) = due_reminder(work_order, today, now) else {
                continue;
            };

            if self
                .inbox
                .has_notification(
                    reminder.work_order_id,
                    reminder.recipient.user_id,
                    reminder.notification_type,
                )
                .await?
            {
                summary.already_sent += 1;
                continue;
            }

            match self.delivery.deliver(&reminder).await {
                Ok(()) => {
                    summary.sent += 1;
                    debug!(
                        work_order_id = %reminder.work_order_id,
                        notification_type = %reminder.notification_type,
                        "due reminder delivered"
                    );
                }
                Err(error) => {
                    summary.failed += 1;
                    warn!(
                        work_order_id = %reminder.work_order_id,
                        notification_type = %reminder.notification_type,
                        error = %error,
                        "due reminder delivery failed"
                    );
                }
            }
        }

        Ok(summary)
    }
}
