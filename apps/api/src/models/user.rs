use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

text_enum!(Role {
    Admin => "admin",
    Employee => "employee",
});

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub full_name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Unknown role strings are treated as the least-privileged role.
    pub fn role(&self) -> Role {
        self.role.parse().unwrap_or(Role::Employee)
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Role::Admin
    }

    pub fn display_name(&self) -> &str {
        self.full_name.as_deref().unwrap_or(&self.email)
    }
}

/// Compact listing used by assignment pickers.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct EmployeeSummary {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub email: String,
}

#[cfg(test)]
pub(crate) fn test_user(role: Role) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: "someone@example.com".to_string(),
        hashed_password: String::new(),
        full_name: Some("Sam Doe".to_string()),
        role: role.as_str().to_string(),
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}
