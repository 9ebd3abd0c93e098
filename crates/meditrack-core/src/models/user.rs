//! Users, roles and acting identities.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Staff role.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Pharmacist,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Pharmacist => "pharmacist",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "pharmacist" => Ok(Role::Pharmacist),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

/// The authenticated user performing an operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// A stored staff account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: String,
    /// Login name, unique
    pub username: String,
    /// Display name
    pub name: String,
    pub role: Role,
    /// bcrypt hash, never the plain password
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: String,
}

impl User {
    /// Create a new user from an already-hashed credential.
    pub fn new(username: String, name: String, role: Role, password_hash: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            username,
            name,
            role,
            password_hash,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// The acting identity for core operations.
    pub fn actor(&self) -> Actor {
        Actor::new(self.id.clone(), self.name.clone(), self.role)
    }
}
