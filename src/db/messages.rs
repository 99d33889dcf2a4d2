use sqlx::{Pool, Sqlite};
use uuid::Uuid;
use crate::db::models::{Message, NewMessage};
use crate::error::AppError;

pub struct MessageRepository;

impl MessageRepository {
    pub async fn insert(
        pool: &Pool<Sqlite>,
        new_message: NewMessage,
    ) -> Result<Message, AppError> {
        let id = Uuid::new_v4();

        let message = sqlx::query_as::<_, Message>(
            r#"
INSERT INTO TB_Messages (id, client_ip, message)
VALUES (?, ?, ?)
RETURNING id, client_ip, message
            "#,
        )
        .bind(id)
        .bind(&new_message.client_ip)
        .bind(&new_message.message)
        .fetch_one(pool)
        .await?;

        Ok(message)
    }

    pub async fn find_by_id(
        pool: &Pool<Sqlite>,
        id: Uuid,
    ) -> Result<Option<Message>, AppError> {
        let message = sqlx::query_as::<_, Message>(
            "SELECT id, client_ip, message FROM TB_Messages WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(message)
    }

    /// Every stored message, in whatever order SQLite returns them.
    pub async fn find_all(pool: &Pool<Sqlite>) -> Result<Vec<Message>, AppError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT id, client_ip, message FROM TB_Messages"
        )
        .fetch_all(pool)
        .await?;

        Ok(messages)
    }

    /// Replaces the text of a message. `client_ip` is never touched.
    pub async fn update_message(
        pool: &Pool<Sqlite>,
        id: Uuid,
        text: &str,
    ) -> Result<Option<Message>, AppError> {
        let message = sqlx::query_as::<_, Message>(
            r#"
UPDATE TB_Messages
SET message = ?
WHERE id = ?
RETURNING id, client_ip, message
            "#,
        )
        .bind(text)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(message)
    }

    /// Returns `false` when no row had that id.
    pub async fn delete_by_id(pool: &Pool<Sqlite>, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM TB_Messages WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::{apply_schema, connect};

    async fn memory_pool() -> Pool<Sqlite> {
        let config = Config::from_lookup(|key| {
            (key == "DATABASE_URL").then(|| "sqlite::memory:".to_string())
        })
        .unwrap();
        let pool = connect(&config).await.expect("Failed to open pool");
        apply_schema(&pool).await.expect("Failed to apply schema");
        pool
    }

    #[tokio::test]
    async fn insert_assigns_id_and_find_returns_row() {
        let pool = memory_pool().await;

        let created = MessageRepository::insert(&pool, NewMessage::new("10.0.0.1", "hello"))
            .await
            .unwrap();
        assert!(!created.id.is_nil());

        let found = MessageRepository::find_by_id(&pool, created.id)
            .await
            .unwrap()
            .expect("message should exist");
        assert_eq!(found, created);
        assert_eq!(found.client_ip, "10.0.0.1");
        assert_eq!(found.message, "hello");
    }

    #[tokio::test]
    async fn inserts_get_distinct_ids() {
        let pool = memory_pool().await;

        let a = MessageRepository::insert(&pool, NewMessage::new("a", "same")).await.unwrap();
        let b = MessageRepository::insert(&pool, NewMessage::new("a", "same")).await.unwrap();
        assert_ne!(a.id, b.id);

        let all = MessageRepository::find_all(&pool).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn update_changes_only_message_text() {
        let pool = memory_pool().await;
        let created = MessageRepository::insert(&pool, NewMessage::new("192.168.1.7", "before"))
            .await
            .unwrap();

        let updated = MessageRepository::update_message(&pool, created.id, "after")
            .await
            .unwrap()
            .expect("message should exist");

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.client_ip, "192.168.1.7");
        assert_eq!(updated.message, "after");
    }

    #[tokio::test]
    async fn update_and_delete_report_missing_rows() {
        let pool = memory_pool().await;
        let unknown = Uuid::new_v4();

        assert!(MessageRepository::update_message(&pool, unknown, "x")
            .await
            .unwrap()
            .is_none());
        assert!(!MessageRepository::delete_by_id(&pool, unknown).await.unwrap());
    }

    #[tokio::test]
    async fn delete_removes_row() {
        let pool = memory_pool().await;
        let created = MessageRepository::insert(&pool, NewMessage::new("h", "bye"))
            .await
            .unwrap();

        assert!(MessageRepository::delete_by_id(&pool, created.id).await.unwrap());
        assert!(MessageRepository::find_by_id(&pool, created.id)
            .await
            .unwrap()
            .is_none());
        assert!(!MessageRepository::delete_by_id(&pool, created.id).await.unwrap());
    }
}
