use chrono::{DateTime, Utc};

/// Placeholder owner for every exchange; per-user identity is not tracked.
pub const DEFAULT_USER_ID: &str = "anonymous";

/// A single exchange row in the `chat_history` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRecord {
    /// Surrogate key assigned by SQLite; never reused.
    pub id: i64,
    pub user_id: String,
    pub user_message: String,
    pub bot_reply: String,
    pub created_at: DateTime<Utc>,
}

/// Values supplied when appending an exchange.
#[derive(Debug, Clone)]
pub struct NewChatRecord {
    pub user_id: String,
    pub user_message: String,
    pub bot_reply: String,
}

impl NewChatRecord {
    pub fn anonymous(user_message: impl Into<String>, bot_reply: impl Into<String>) -> Self {
        Self {
            user_id: DEFAULT_USER_ID.to_owned(),
            user_message: user_message.into(),
            bot_reply: bot_reply.into(),
        }
    }
}
