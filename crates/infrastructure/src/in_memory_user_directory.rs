use std::collections::HashMap;

use async_trait::async_trait;
use cmms_application::{DirectoryUser, UserDirectory};
use cmms_core::{AppError, AppResult};
use cmms_domain::{Role, UserId};
use tokio::sync::RwLock;

/// In-memory user directory.
#[derive(Debug, Default)]
pub struct InMemoryUserDirectory {
    users: RwLock<HashMap<UserId, DirectoryUser>>,
}

impl InMemoryUserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(HashMap::new()),
        }
    }
}

fn sorted(mut users: Vec<DirectoryUser>) -> Vec<DirectoryUser> {
    users.sort_by(|left, right| {
        left.display_name
            .cmp(&right.display_name)
            .then_with(|| left.user_id.cmp(&right.user_id))
    });
    users
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<DirectoryUser>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn list_users(&self) -> AppResult<Vec<DirectoryUser>> {
        Ok(sorted(self.users.read().await.values().cloned().collect()))
    }

    async fn list_users_with_role(&self, role: Role) -> AppResult<Vec<DirectoryUser>> {
        Ok(sorted(
            self.users
                .read()
                .await
                .values()
                .filter(|user| user.role == role)
                .cloned()
                .collect(),
        ))
    }

    async fn find_supervisor(&self, user_id: UserId) -> AppResult<Option<DirectoryUser>> {
        let users = self.users.read().await;
        Ok(users
            .get(&user_id)
            .and_then(|user| user.supervisor_id)
            .and_then(|supervisor_id| users.get(&supervisor_id))
            .cloned())
    }

    async fn save_user(&self, user: DirectoryUser) -> AppResult<()> {
        let mut users = self.users.write().await;
        if let Some(supervisor_id) = user.supervisor_id {
            match users.get(&supervisor_id) {
                None => {
                    return Err(AppError::Validation(format!(
                        "supervisor '{supervisor_id}' does not exist"
                    )));
                }
                Some(supervisor) if supervisor.role != Role::HeadTechnician => {
                    return Err(AppError::Validation(format!(
                        "supervisor '{supervisor_id}' must be a head technician"
                    )));
                }
                Some(_) => {}
            }
        }

        users.insert(user.user_id, user);
        Ok(())
    }
}
