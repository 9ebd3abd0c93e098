//! Credential helpers and user registration.
//!
//! The core never issues tokens. Callers authenticate here once and carry the
//! resulting [`Actor`] into every other operation.

use thiserror::Error;
use tracing::{info, warn};

use crate::db::{Database, DbError};
use crate::models::{Actor, Role, User};

/// Default bcrypt work factor.
pub const DEFAULT_COST: u32 = 10;

/// Credential errors.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Hashing error: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("Username already exists: {0}")]
    DuplicateUsername(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type AuthResult<T> = Result<T, AuthError>;

/// Hash a plain password with bcrypt.
pub fn hash_password(password: &str, cost: u32) -> AuthResult<String> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Check a plain password against a stored bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> AuthResult<bool> {
    Ok(bcrypt::verify(password, hash)?)
}

/// Create and store a new staff account.
pub fn register_user(
    db: &Database,
    username: &str,
    name: &str,
    role: Role,
    password: &str,
    cost: u32,
) -> AuthResult<User> {
    let username = username.trim();
    if username.is_empty() {
        return Err(AuthError::InvalidInput("username is required".into()));
    }
    if password.is_empty() {
        return Err(AuthError::InvalidInput("password is required".into()));
    }
    if db.get_user_by_username(username)?.is_some() {
        return Err(AuthError::DuplicateUsername(username.to_string()));
    }

    let user = User::new(
        username.to_string(),
        name.trim().to_string(),
        role,
        hash_password(password, cost)?,
    );
    db.insert_user(&user)?;

    info!(username = %user.username, role = %user.role, "registered user");
    Ok(user)
}

/// Resolve a username/password pair into the acting identity.
pub fn authenticate(db: &Database, username: &str, password: &str) -> AuthResult<Actor> {
    let user = db
        .get_user_by_username(username.trim())?
        .ok_or(AuthError::InvalidCredentials)?;

    if !verify_password(password, &user.password_hash)? {
        warn!(username = %user.username, "rejected login");
        return Err(AuthError::InvalidCredentials);
    }
    Ok(user.actor())
}

/// Load the account behind an acting identity.
pub fn current_user(db: &Database, user_id: &str) -> AuthResult<User> {
    db.get_user(user_id)?
        .ok_or_else(|| AuthError::UserNotFound(user_id.to_string()))
}

/// Change a user's own display name and/or password.
///
/// Blank values count as absent; at least one field must be given.
pub fn update_profile(
    db: &Database,
    user_id: &str,
    name: Option<&str>,
    password: Option<&str>,
    cost: u32,
) -> AuthResult<User> {
    let name = name.map(str::trim).filter(|n| !n.is_empty());
    let password = password.filter(|p| !p.is_empty());
    if name.is_none() && password.is_none() {
        return Err(AuthError::InvalidInput("nothing to update".into()));
    }

    let mut user = current_user(db, user_id)?;
    if let Some(name) = name {
        user.name = name.to_string();
    }
    if let Some(password) = password {
        user.password_hash = hash_password(password, cost)?;
    }
    if !db.update_user(&user)? {
        return Err(AuthError::UserNotFound(user_id.to_string()));
    }

    info!(
        username = %user.username,
        name_changed = name.is_some(),
        password_changed = password.is_some(),
        "updated profile"
    );
    Ok(user)
}
