use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::db::PgStore;
use crate::store::{Course, CourseRepo};

#[async_trait]
impl CourseRepo for PgStore {
    async fn list_courses(&self, owner_id: Uuid) -> anyhow::Result<Vec<Course>> {
        let rows = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, name, owner_id, created_at
              FROM courses
             WHERE owner_id = $1
             ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await
        .context("list courses")?;
        Ok(rows)
    }

    async fn create_course(&self, owner_id: Uuid, name: &str) -> anyhow::Result<Course> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses (name, owner_id)
            VALUES ($1, $2)
            RETURNING id, name, owner_id, created_at
            "#,
        )
        .bind(name)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await
        .context("insert course")?;
        Ok(course)
    }

    async fn find_owned_course(
        &self,
        owner_id: Uuid,
        course_id: Uuid,
    ) -> anyhow::Result<Option<Course>> {
        let course = sqlx::query_as::<_, Course>(
            r#"
            SELECT id, name, owner_id, created_at
              FROM courses
             WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(course_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await
        .context("find owned course")?;
        Ok(course)
    }
}
