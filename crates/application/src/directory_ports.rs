use async_trait::async_trait;
use cmms_core::AppResult;
use cmms_domain::{Actor, Role, UserId, UserRef};

/// A user known to the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryUser {
    /// Stable id.
    pub user_id: UserId,
    /// Display name.
    pub display_name: String,
    /// Permission role.
    pub role: Role,
    /// Cosmetic job title.
    pub title: Option<String>,
    /// Head technician supervising this user, if any.
    pub supervisor_id: Option<UserId>,
}

impl DirectoryUser {
    /// Returns this user as an actor.
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.display_name.clone(), self.role)
    }

    /// Returns a reference to this user.
    #[must_use]
    pub fn user_ref(&self) -> UserRef {
        UserRef::new(self.user_id, self.display_name.clone())
    }
}

/// Actor and role directory.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Returns one user by id.
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<DirectoryUser>>;

    /// Lists every user.
    async fn list_users(&self) -> AppResult<Vec<DirectoryUser>>;

    /// Lists every current holder of `role`.
    async fn list_users_with_role(&self, role: Role) -> AppResult<Vec<DirectoryUser>>;

    /// Returns the supervisor of `user_id`, if one is recorded.
    async fn find_supervisor(&self, user_id: UserId) -> AppResult<Option<DirectoryUser>>;

    /// Creates or replaces a user.
    async fn save_user(&self, user: DirectoryUser) -> AppResult<()>;
}
