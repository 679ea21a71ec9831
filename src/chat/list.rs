//! Ordered chat list with a selected entry.

use serde::Serialize;

use super::ids::ChatId;
use super::types::Chat;

/// The chats shown in the sidebar, newest-created first, plus the selection.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ChatList {
    chats: Vec<Chat>,
    selected: Option<ChatId>,
}

impl ChatList {
    /// Build a list; the first chat, if any, starts selected.
    #[must_use]
    pub fn new(chats: Vec<Chat>) -> Self {
        let selected = chats.first().map(|c| c.id);
        Self { chats, selected }
    }

    /// All chats in display order.
    #[must_use]
    pub fn chats(&self) -> &[Chat] {
        &self.chats
    }

    /// Identifier of the selected chat.
    #[must_use]
    pub const fn selected_id(&self) -> Option<ChatId> {
        self.selected
    }

    /// Look up a chat by id.
    #[must_use]
    pub fn get(&self, id: ChatId) -> Option<&Chat> {
        self.chats.iter().find(|c| c.id == id)
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: ChatId) -> Option<&mut Chat> {
        self.chats.iter_mut().find(|c| c.id == id)
    }

    /// Insert a chat at the front and select it.
    pub fn insert_front(&mut self, chat: Chat) {
        self.selected = Some(chat.id);
        self.chats.insert(0, chat);
    }

    /// Select an existing chat. Returns `false` if the id is unknown.
    pub fn select(&mut self, id: ChatId) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        self.selected = Some(id);
        true
    }
}
