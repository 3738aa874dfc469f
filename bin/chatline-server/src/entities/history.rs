use std::future::Future;

use chrono::{DateTime, Utc};

use crate::entities::{ChatRecord, NewChatRecord, SqliteStore};

/// Append-only log of chat exchanges.
pub trait HistoryStore: Send + Sync + 'static {
    /// Append one exchange and return its assigned id.
    fn record(&self, record: NewChatRecord) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;

    /// Up to `limit` most recent exchanges, newest first.
    fn recent(&self, limit: u32) -> impl Future<Output = Result<Vec<ChatRecord>, sqlx::Error>> + Send;
}

impl HistoryStore for SqliteStore {
    async fn record(&self, record: NewChatRecord) -> Result<i64, sqlx::Error> {
        let created_at = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO chat_history (user_id, user_message, bot_reply, created_at) \
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(&record.user_id)
        .bind(&record.user_message)
        .bind(&record.bot_reply)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    async fn recent(&self, limit: u32) -> Result<Vec<ChatRecord>, sqlx::Error> {
        let rows: Vec<(i64, String, String, String, String)> = sqlx::query_as(
            "SELECT id, user_id, user_message, bot_reply, created_at \
             FROM chat_history ORDER BY id DESC LIMIT ?1",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|(id, user_id, user_message, bot_reply, created_at)| {
                let created_at = created_at
                    .parse::<DateTime<Utc>>()
                    .map_err(|e| sqlx::Error::Decode(Box::new(e)))?;
                Ok(ChatRecord { id, user_id, user_message, bot_reply, created_at })
            })
            .collect()
    }
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;
    use crate::entities::dao::chat::DEFAULT_USER_ID;
    use crate::testing::temp_store;

    #[tokio::test]
    async fn recent_returns_last_ten_newest_first() {
        let (_dir, store) = temp_store().await;
        for i in 1..=15 {
            store
                .record(NewChatRecord::anonymous(format!("q{i}"), format!("a{i}")))
                .await
                .unwrap();
        }

        let recent = store.recent(10).await.unwrap();
        let messages: Vec<&str> = recent.iter().map(|r| r.user_message.as_str()).collect();
        let expected: Vec<String> = (6..=15).rev().map(|i| format!("q{i}")).collect();
        assert_eq!(messages, expected);
        assert_eq!(recent[0].bot_reply, "a15");
        assert!(recent.iter().all(|r| r.user_id == DEFAULT_USER_ID));
    }

    #[tokio::test]
    async fn ids_increase_monotonically() {
        let (_dir, store) = temp_store().await;
        let first = store.record(NewChatRecord::anonymous("a", "b")).await.unwrap();
        let second = store.record(NewChatRecord::anonymous("c", "d")).await.unwrap();
        assert!(second > first);
    }

    #[tokio::test]
    async fn empty_store_returns_nothing() {
        let (_dir, store) = temp_store().await;
        assert!(store.recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unparseable_timestamp_is_a_decode_error() {
        let (_dir, store) = temp_store().await;
        sqlx::query(
            "INSERT INTO chat_history (user_id, user_message, bot_reply, created_at) \
             VALUES ('anonymous', 'hi', 'hello', 'yesterday-ish')",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let err = store.recent(10).await.unwrap_err();
        assert!(matches!(err, sqlx::Error::Decode(_)));
    }

    #[tokio::test]
    async fn recent_keeps_ids_and_timestamps() {
        let (_dir, store) = temp_store().await;
        let before = Utc::now();
        let id = store.record(NewChatRecord::anonymous("hi", "hello")).await.unwrap();

        let rows = store.recent(1).await.unwrap();
        assert_eq!(rows[0].id, id);
        assert!(rows[0].created_at >= before - chrono::Duration::seconds(1));
    }

    #[tokio::test]
    async fn reopening_keeps_rows() {
        let (dir, store) = temp_store().await;
        store.record(NewChatRecord::anonymous("hi", "hello")).await.unwrap();
        drop(store);

        let url = format!("sqlite://{}", dir.path().join("chat.db").display());
        let reopened = SqliteStore::connect(&url).await.unwrap();
        assert_eq!(reopened.recent(10).await.unwrap().len(), 1);
    }
}
