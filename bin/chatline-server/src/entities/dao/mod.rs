pub mod chat;

pub use chat::{ChatRecord, NewChatRecord};
