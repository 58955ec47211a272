use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::db::PgStore;
use crate::store::{NewUser, ProfilePatch, User, UserRepo};

const USER_COLUMNS: &str =
    "id, name, email, password_hash, university, department, avatar_url, created_at";

#[async_trait]
impl UserRepo for PgStore {
    /// Create a new user with hashed password.
    async fn create_user(&self, new: NewUser) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (name, email, password_hash, university, department)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (email) DO NOTHING
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.university)
        .bind(&new.department)
        .fetch_optional(&self.pool)
        .await
        .context("insert user")?;
        Ok(user)
    }

    /// Find a user by email (exact match).
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .context("find user by email")?;
        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("find user by id")?;
        Ok(user)
    }

    async fn update_profile(&self, id: Uuid, patch: ProfilePatch) -> anyhow::Result<Option<User>> {
        // NULL parameters keep the current value.
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET university = COALESCE($2, university),
                   department = COALESCE($3, department),
                   avatar_url = COALESCE($4, avatar_url)
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(&patch.university)
        .bind(&patch.department)
        .bind(&patch.avatar_url)
        .fetch_optional(&self.pool)
        .await
        .context("update profile")?;
        Ok(user)
    }
}
