use cmms_application::{DirectoryUser, UserDirectory};
use cmms_core::{AppError, AppResult};
use cmms_domain::{Role, UserId};
use tracing::info;
use uuid::Uuid;

struct SeedUser {
    id: &'static str,
    display_name: &'static str,
    role: Role,
    title: &'static str,
    supervisor_id: Option<&'static str>,
}

const DEV_SEED_HEAD_TECHNICIAN_ID: &str = "5d0b7a3e-6f41-4f4b-9a0e-2f5d7c1b8e21";

// Supervisors come before the users they supervise.
const DEV_SEED_USERS: &[SeedUser] = &[
    SeedUser {
        id: "a2c8ea5f-4f39-4724-97f5-932f97f54f76",
        display_name: "Ada Admin",
        role: Role::Admin,
        title: "Maintenance Manager",
        supervisor_id: None,
    },
    SeedUser {
        id: DEV_SEED_HEAD_TECHNICIAN_ID,
        display_name: "Hank Head",
        role: Role::HeadTechnician,
        title: "Lead Technician",
        supervisor_id: None,
    },
    SeedUser {
        id: "96d11e90-7403-4654-9727-cb1043f8bd31",
        display_name: "Alice Tech",
        role: Role::Technician,
        title: "Electrician",
        supervisor_id: Some(DEV_SEED_HEAD_TECHNICIAN_ID),
    },
    SeedUser {
        id: "0c6f3b55-1e0a-4d8f-8d7e-47b3a9c2d610",
        display_name: "Bob Tech",
        role: Role::Technician,
        title: "Mechanic",
        supervisor_id: None,
    },
    SeedUser {
        id: "e4a1d2c3-9b8f-4e7d-a6c5-3b2a1f0e9d8c",
        display_name: "Rita Requester",
        role: Role::Requester,
        title: "Line Supervisor",
        supervisor_id: None,
    },
];

fn parse_seed_id(value: &str) -> AppResult<UserId> {
    Uuid::parse_str(value)
        .map(UserId::from_uuid)
        .map_err(|error| AppError::Internal(format!("invalid seed user id '{value}': {error}")))
}

/// Creates the demo directory so the API can be exercised with `x-user-id`.
pub async fn run(directory: &dyn UserDirectory) -> AppResult<()> {
    for seed in DEV_SEED_USERS {
        let user = DirectoryUser {
            user_id: parse_seed_id(seed.id)?,
            display_name: seed.display_name.to_owned(),
            role: seed.role,
            title: Some(seed.title.to_owned()),
            supervisor_id: seed.supervisor_id.map(parse_seed_id).transpose()?,
        };

        directory.save_user(user).await?;
        info!(
            user_id = seed.id,
            role = seed.role.as_str(),
            display_name = seed.display_name,
            "seeded directory user"
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use cmms_application::UserDirectory;
    use cmms_domain::Role;
    use cmms_infrastructure::InMemoryUserDirectory;

    use super::{DEV_SEED_HEAD_TECHNICIAN_ID, parse_seed_id, run};

    #[tokio::test]
    async fn seeds_every_role_and_supervision_link() {
        let directory = InMemoryUserDirectory::new();
        assert!(run(&directory).await.is_ok());

        let users = directory.list_users().await.unwrap_or_default();
        for role in Role::all() {
            assert!(users.iter().any(|user| user.role == *role));
        }

        let Some(alice) = users
            .iter()
            .find(|user| user.display_name == "Alice Tech")
        else {
            panic!("seeded technician should exist");
        };
        let head_id = parse_seed_id(DEV_SEED_HEAD_TECHNICIAN_ID).ok();
        assert_eq!(alice.supervisor_id, head_id);
    }

    #[tokio::test]
    async fn seeding_twice_is_idempotent() {
        let directory = InMemoryUserDirectory::new();
        assert!(run(&directory).await.is_ok());
        assert!(run(&directory).await.is_ok());

        assert_eq!(directory.list_users().await.unwrap_or_default().len(), 5);
    }
}
