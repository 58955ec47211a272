use std::collections::{HashMap, HashSet};

use anyhow::Context;
use async_trait::async_trait;
use time::Date;
use uuid::Uuid;

use crate::db::PgStore;
use crate::store::{DeadlineRange, HomeSummary, NewTask, ReorderOutcome, Task, TaskPatch, TaskRepo};

const TASK_COLUMNS: &str = "t.id, t.title, t.deadline, t.completed, t.course_id, t.owner_id, \
     t.estimated_time, t.actual_time, t.task_type, t.order_index";

const INSERT_TASK: &str = r#"
    INSERT INTO tasks (title, deadline, course_id, owner_id, estimated_time, task_type, order_index)
    VALUES ($1, $2, $3, $4, $5, $6,
            (SELECT COALESCE(MAX(order_index) + 1, 0) FROM tasks WHERE course_id = $3))
    RETURNING id, title, deadline, completed, course_id, owner_id,
              estimated_time, actual_time, task_type, order_index
"#;

fn insert_task<'q>(
    course_id: Uuid,
    owner_id: Uuid,
    new: &'q NewTask,
) -> sqlx::query::QueryAs<'q, sqlx::Postgres, Task, sqlx::postgres::PgArguments> {
    sqlx::query_as::<_, Task>(INSERT_TASK)
        .bind(&new.title)
        .bind(new.deadline)
        .bind(course_id)
        .bind(owner_id)
        .bind(new.estimated_time)
        .bind(&new.task_type)
}

#[async_trait]
impl TaskRepo for PgStore {
    async fn list_course_tasks(&self, course_id: Uuid) -> anyhow::Result<Vec<Task>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks t WHERE t.course_id = $1 \
             ORDER BY t.order_index ASC, t.id ASC"
        );
        let rows = sqlx::query_as::<_, Task>(&sql)
            .bind(course_id)
            .fetch_all(&self.pool)
            .await
            .context("list course tasks")?;
        Ok(rows)
    }

    async fn list_user_tasks(
        &self,
        owner_id: Uuid,
        range: DeadlineRange,
    ) -> anyhow::Result<Vec<Task>> {
        // With no bound set every task matches, including those without a
        // deadline. Any bound excludes NULL deadlines.
        let sql = format!(
            r#"
            SELECT {TASK_COLUMNS}
              FROM tasks t
              JOIN courses c ON c.id = t.course_id
             WHERE c.owner_id = $1
               AND ($2::date IS NULL OR t.deadline >= $2)
               AND ($3::date IS NULL OR t.deadline <= $3)
               AND (($2::date IS NULL AND $3::date IS NULL) OR t.deadline IS NOT NULL)
             ORDER BY t.deadline ASC NULLS LAST, t.order_index ASC, t.id ASC
            "#
        );
        let rows = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_id)
            .bind(range.start)
            .bind(range.end)
            .fetch_all(&self.pool)
            .await
            .context("list user tasks")?;
        Ok(rows)
    }

    async fn create_task(
        &self,
        course_id: Uuid,
        owner_id: Uuid,
        new: NewTask,
    ) -> anyhow::Result<Task> {
        let task = insert_task(course_id, owner_id, &new)
            .fetch_one(&self.pool)
            .await
            .context("insert task")?;
        Ok(task)
    }

    async fn insert_tasks_batch(
        &self,
        course_id: Uuid,
        owner_id: Uuid,
        tasks: Vec<NewTask>,
    ) -> anyhow::Result<usize> {
        let mut tx = self.pool.begin().await.context("begin task batch")?;
        for new in &tasks {
            insert_task(course_id, owner_id, new)
                .fetch_one(&mut *tx)
                .await
                .context("insert extracted task")?;
        }
        tx.commit().await.context("commit task batch")?;
        Ok(tasks.len())
    }

    async fn find_owned_task(
        &self,
        owner_id: Uuid,
        task_id: Uuid,
    ) -> anyhow::Result<Option<Task>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks t JOIN courses c ON c.id = t.course_id \
             WHERE t.id = $1 AND c.owner_id = $2"
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task_id)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .context("find owned task")?;
        Ok(task)
    }

    async fn update_task(&self, task_id: Uuid, patch: TaskPatch) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
               SET completed   = COALESCE($2, completed),
                   actual_time = COALESCE($3, actual_time)
             WHERE id = $1
            RETURNING id, title, deadline, completed, course_id, owner_id,
                      estimated_time, actual_time, task_type, order_index
            "#,
        )
        .bind(task_id)
        .bind(patch.completed)
        .bind(patch.actual_time)
        .fetch_optional(&self.pool)
        .await
        .context("update task")?;
        Ok(task)
    }

    async fn delete_owned_task(&self, owner_id: Uuid, task_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks t
             USING courses c
             WHERE t.id = $1 AND c.id = t.course_id AND c.owner_id = $2
            "#,
        )
        .bind(task_id)
        .bind(owner_id)
        .execute(&self.pool)
        .await
        .context("delete task")?;
        Ok(result.rows_affected() > 0)
    }

    async fn reorder_tasks(
        &self,
        owner_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> anyhow::Result<ReorderOutcome> {
        let mut tx = self.pool.begin().await.context("begin reorder")?;

        let rows: Vec<(Uuid, Uuid)> = sqlx::query_as(
            r#"
            SELECT t.id, t.course_id
              FROM tasks t
              JOIN courses c ON c.id = t.course_id
             WHERE t.id = ANY($1) AND c.owner_id = $2
               FOR UPDATE OF t
            "#,
        )
        .bind(ordered_ids)
        .bind(owner_id)
        .fetch_all(&mut *tx)
        .await
        .context("lock tasks for reorder")?;

        let found: HashMap<Uuid, Uuid> = rows.into_iter().collect();
        if let Some(missing) = ordered_ids.iter().find(|id| !found.contains_key(id)) {
            tx.rollback().await.context("rollback reorder")?;
            return Ok(ReorderOutcome::UnknownTask(*missing));
        }
        let courses: HashSet<&Uuid> = found.values().collect();
        if courses.len() > 1 {
            tx.rollback().await.context("rollback reorder")?;
            return Ok(ReorderOutcome::MixedCourses);
        }

        for (position, id) in ordered_ids.iter().enumerate() {
            sqlx::query("UPDATE tasks SET order_index = $1 WHERE id = $2")
                .bind(i32::try_from(position)?)
                .bind(id)
                .execute(&mut *tx)
                .await
                .context("update order index")?;
        }
        tx.commit().await.context("commit reorder")?;
        Ok(ReorderOutcome::Applied(ordered_ids.len()))
    }

    async fn home_summary(&self, owner_id: Uuid, today: Date) -> anyhow::Result<HomeSummary> {
        let (course_count, tasks_due_today_count, total_study_time): (i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM courses WHERE owner_id = $1),
                    (SELECT COUNT(*)
                       FROM tasks t JOIN courses c ON c.id = t.course_id
                      WHERE c.owner_id = $1 AND t.deadline = $2 AND NOT t.completed),
                    (SELECT COALESCE(SUM(t.actual_time), 0)::BIGINT
                       FROM tasks t JOIN courses c ON c.id = t.course_id
                      WHERE c.owner_id = $1 AND t.completed)
                "#,
            )
            .bind(owner_id)
            .bind(today)
            .fetch_one(&self.pool)
            .await
            .context("home summary")?;
        Ok(HomeSummary {
            course_count,
            tasks_due_today_count,
            total_study_time,
        })
    }
}
