//! PostgreSQL-backed user directory.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use cmms_application::{DirectoryUser, UserDirectory};
use cmms_core::{AppError, AppResult};
use cmms_domain::{Role, UserId};

/// PostgreSQL implementation of the user directory port.
#[derive(Clone)]
pub struct PostgresUserDirectory {
    pool: PgPool,
}

impl PostgresUserDirectory {
    /// Creates a directory with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    display_name: String,
    role: String,
    title: Option<String>,
    supervisor_id: Option<Uuid>,
}

impl TryFrom<UserRow> for DirectoryUser {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            user_id: UserId::from_uuid(row.id),
            display_name: row.display_name,
            role: Role::from_str(row.role.as_str())?,
            title: row.title,
            supervisor_id: row.supervisor_id.map(UserId::from_uuid),
        })
    }
}

fn collect(rows: Vec<UserRow>) -> AppResult<Vec<DirectoryUser>> {
    rows.into_iter().map(DirectoryUser::try_from).collect()
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    async fn find_user(&self, user_id: UserId) -> AppResult<Option<DirectoryUser>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, display_name, role, title, supervisor_id
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find user: {error}")))?;

        row.map(DirectoryUser::try_from).transpose()
    }

    async fn list_users(&self) -> AppResult<Vec<DirectoryUser>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, display_name, role, title, supervisor_id
            FROM users
            ORDER BY display_name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list users: {error}")))?;

        collect(rows)
    }

    async fn list_users_with_role(&self, role: Role) -> AppResult<Vec<DirectoryUser>> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, display_name, role, title, supervisor_id
            FROM users
            WHERE role = $1
            ORDER BY display_name, id
            "#,
        )
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to list users with role '{role}': {error}"))
        })?;

        collect(rows)
    }

    async fn find_supervisor(&self, user_id: UserId) -> AppResult<Option<DirectoryUser>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT supervisor.id, supervisor.display_name, supervisor.role,
                   supervisor.title, supervisor.supervisor_id
            FROM users member
            INNER JOIN users supervisor ON supervisor.id = member.supervisor_id
            WHERE member.id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find supervisor: {error}")))?;

        row.map(DirectoryUser::try_from).transpose()
    }

    async fn save_user(&self, user: DirectoryUser) -> AppResult<()> {
        if let Some(supervisor_id) = user.supervisor_id
            && let Some(supervisor) = self.find_user(supervisor_id).await?
            && supervisor.role != Role::HeadTechnician
        {
            return Err(AppError::Validation(format!(
                "supervisor '{supervisor_id}' must be a head technician"
            )));
        }

        sqlx::query(
            r#"
            INSERT INTO users (id, display_name, role, title, supervisor_id)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE
            SET display_name = EXCLUDED.display_name,
                role = EXCLUDED.role,
                title = EXCLUDED.title,
                supervisor_id = EXCLUDED.supervisor_id
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.display_name.as_str())
        .bind(user.role.as_str())
        .bind(user.title.as_deref())
        .bind(user.supervisor_id.map(|supervisor_id| supervisor_id.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(|error| {
            if let sqlx::Error::Database(ref database_error) = error
                && database_error.code().as_deref() == Some("23503")
            {
                return AppError::Validation(format!(
                    "supervisor of user '{}' does not exist",
                    user.user_id
                ));
            }

            AppError::Internal(format!("failed to save user: {error}"))
        })?;

        Ok(())
    }
}
