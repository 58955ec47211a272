use anyhow::Context;
use async_trait::async_trait;
use uuid::Uuid;

use crate::db::PgStore;
use crate::store::{DocumentRepo, DocumentSummary, NewDocument};

#[async_trait]
impl DocumentRepo for PgStore {
    async fn insert_documents(
        &self,
        course_id: Uuid,
        docs: Vec<NewDocument>,
    ) -> anyhow::Result<Vec<DocumentSummary>> {
        let mut tx = self.pool.begin().await.context("begin document upload")?;
        let mut stored = Vec::with_capacity(docs.len());
        for doc in &docs {
            let row = sqlx::query_as::<_, DocumentSummary>(
                r#"
                INSERT INTO documents (course_id, file_name, file_type, text_content)
                VALUES ($1, $2, $3, $4)
                RETURNING id, file_name, upload_date
                "#,
            )
            .bind(course_id)
            .bind(&doc.file_name)
            .bind(&doc.file_type)
            .bind(&doc.text_content)
            .fetch_one(&mut *tx)
            .await
            .context("insert document")?;
            stored.push(row);
        }
        tx.commit().await.context("commit document upload")?;
        Ok(stored)
    }

    async fn list_documents(&self, course_id: Uuid) -> anyhow::Result<Vec<DocumentSummary>> {
        let rows = sqlx::query_as::<_, DocumentSummary>(
            r#"
            SELECT id, file_name, upload_date
              FROM documents
             WHERE course_id = $1
             ORDER BY upload_date ASC, id ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .context("list documents")?;
        Ok(rows)
    }

    async fn load_document_texts(&self, course_id: Uuid) -> anyhow::Result<Vec<String>> {
        let rows: Vec<(Option<String>,)> = sqlx::query_as(
            r#"
            SELECT text_content
              FROM documents
             WHERE course_id = $1
             ORDER BY upload_date ASC, id ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await
        .context("load document texts")?;
        Ok(rows.into_iter().filter_map(|(text,)| text).collect())
    }
}
