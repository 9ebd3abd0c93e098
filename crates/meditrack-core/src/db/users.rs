//! User account database operations.

use rusqlite::{params, OptionalExtension};

use super::{Database, DbError, DbResult};
use crate::models::{Role, User};

impl Database {
    /// Insert a new user. Fails with `Constraint` if the username is taken.
    pub fn insert_user(&self, user: &User) -> DbResult<()> {
        if self.get_user_by_username(&user.username)?.is_some() {
            return Err(DbError::Constraint(format!(
                "Username already exists: {}",
                user.username
            )));
        }

        self.conn.execute(
            r#"
            INSERT INTO users (id, username, name, role, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                user.id,
                user.username,
                user.name,
                user.role.as_str(),
                user.password_hash,
                user.created_at,
            ],
        )?;
        Ok(())
    }

    /// Get a user by login name.
    pub fn get_user_by_username(&self, username: &str) -> DbResult<Option<User>> {
        self.conn
            .query_row(
                r#"
                SELECT id, username, name, role, password_hash, created_at
                FROM users
                WHERE username = ?
                "#,
                [username],
                map_user_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Get a user by ID.
    pub fn get_user(&self, id: &str) -> DbResult<Option<User>> {
        self.conn
            .query_row(
                r#"
                SELECT id, username, name, role, password_hash, created_at
                FROM users
                WHERE id = ?
                "#,
                [id],
                map_user_row,
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    /// Overwrite a user's display name and password hash. Returns false if the ID is unknown.
    pub fn update_user(&self, user: &User) -> DbResult<bool> {
        let rows = self.conn.execute(
            "UPDATE users SET name = ?1, password_hash = ?2 WHERE id = ?3",
            params![user.name, user.password_hash, user.id],
        )?;
        Ok(rows > 0)
    }

    /// List all users by username.
    pub fn list_users(&self) -> DbResult<Vec<User>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT id, username, name, role, password_hash, created_at
            FROM users
            ORDER BY username
            "#,
        )?;
        let rows = stmt.query_map([], map_user_row)?;

        let mut users = Vec::new();
        for row in rows {
            users.push(row?.try_into()?);
        }
        Ok(users)
    }
}

/// Intermediate row struct for database mapping.
struct UserRow {
    id: String,
    username: String,
    name: String,
    role: String,
    password_hash: String,
    created_at: String,
}

fn map_user_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        name: row.get(2)?,
        role: row.get(3)?,
        password_hash: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl TryFrom<UserRow> for User {
    type Error = DbError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role: Role = row.role.parse().map_err(DbError::InvalidValue)?;
        Ok(User {
            id: row.id,
            username: row.username,
            name: row.name,
            role,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}
