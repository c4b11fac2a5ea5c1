use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use super::claims::{Role, UnknownRole};

/// Raw `users` row; `role` is stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub name: String,
    pub role: Role,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<UserRow> for User {
    type Error = UnknownRole;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            email: r.email,
            password_hash: r.password_hash,
            name: r.name,
            role: r.role.parse()?,
            created_at: r.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: "admin@pharmacy.com".into(),
            password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
            name: "Admin User".into(),
            role: role.into(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn row_converts_with_known_role() {
        let user = User::try_from(row("admin")).unwrap();
        assert_eq!(user.role, Role::Admin);
        assert!(User::try_from(row("owner")).is_err());
    }

    #[test]
    fn password_hash_never_serialized() {
        let user = User::try_from(row("pharmacist")).unwrap();
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"pharmacist\""));
    }
}
