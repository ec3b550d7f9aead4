//! Actor identity and role types.

use std::str::FromStr;

use cmms_core::AppError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a user. Assignment and actor comparison use this,
/// never the display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UserId(Uuid);

impl UserId {
    /// Creates a new random user identifier.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a user identifier from an existing UUID value.
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

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl FromStr for UserId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value.trim())
            .map(Self)
            .map_err(|error| AppError::Validation(format!("invalid user id '{value}': {error}")))
    }
}

/// Permission class of an actor. Job titles are cosmetic and live elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Universal escalation role: assigns, closes, cancels.
    Admin,
    /// Reviews completed work.
    HeadTechnician,
    /// Performs assigned work.
    Technician,
    /// Raises maintenance requests.
    Requester,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::HeadTechnician => "head_technician",
            Self::Technician => "technician",
            Self::Requester => "requester",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::Admin,
            Role::HeadTechnician,
            Role::Technician,
            Role::Requester,
        ];

        ALL
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "admin" => Ok(Self::Admin),
            "head_technician" => Ok(Self::HeadTechnician),
            "technician" => Ok(Self::Technician),
            "requester" => Ok(Self::Requester),
            _ => Err(AppError::Validation(format!("unknown role value '{value}'"))),
        }
    }
}

/// Reference to a user: stable id plus a display label.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserRef {
    /// Stable user id.
    pub user_id: UserId,
    /// Cosmetic display name captured at reference time.
    pub display_name: String,
}

impl UserRef {
    /// Creates a user reference.
    #[must_use]
    pub fn new(user_id: UserId, display_name: impl Into<String>) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
        }
    }

    /// Reference used for automated triggers such as reminders.
    #[must_use]
    pub fn system() -> Self {
        Self {
            user_id: UserId::from_uuid(Uuid::nil()),
            display_name: "System".to_owned(),
        }
    }
}

/// The acting user, passed explicitly into every workflow call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    user_id: UserId,
    display_name: String,
    role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub fn new(user_id: UserId, display_name: impl Into<String>, role: Role) -> Self {
        Self {
            user_id,
            display_name: display_name.into(),
            role,
        }
    }

    /// Returns the stable user id.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the permission role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns a reference to this actor for recording on work orders and notifications.
    #[must_use]
    pub fn user_ref(&self) -> UserRef {
        UserRef::new(self.user_id, self.display_name.clone())
    }
}
