//! Conversation model: chats, messages and the sidebar list.

pub mod format;
pub mod ids;
pub mod list;
pub mod seed;
pub mod types;

pub use ids::{ChatId, MessageId};
pub use list::ChatList;
pub use types::{Chat, FileMetadata, Message, MessageBody, Sender};
