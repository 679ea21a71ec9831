//! Demo conversations shown to a fresh browser session.

use chrono::{DateTime, TimeZone, Utc};

use super::types::{Chat, Message};

fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

fn user(content: &str, time: &str) -> Message {
    let mut message = Message::user_text(content, Utc::now());
    message.timestamp = time.to_string();
    message
}

fn bot(content: &str, time: &str) -> Message {
    let mut message = Message::bot_reply(content, false, false, Utc::now());
    message.timestamp = time.to_string();
    message
}

/// The two sample threads ("Support Client", "Informations Produit").
#[must_use]
pub fn demo_chats() -> Vec<Chat> {
    vec![
        Chat::new(
            "Support Client",
            "Merci de m'avoir aidé avec mon problème de compte...",
            at(2024, 1, 15, 10, 30),
            vec![
                user("J'ai besoin d'aide avec les paramètres de mon compte", "10:28"),
                bot(
                    "Je serais ravi de vous aider avec les paramètres de votre compte. Quel problème spécifique rencontrez-vous ?",
                    "10:29",
                ),
                user("Je n'arrive pas à changer mon mot de passe", "10:29"),
                bot(
                    "Laissez-moi vous guider dans le processus de réinitialisation du mot de passe. D'abord, allez dans Paramètres > Sécurité...",
                    "10:30",
                ),
            ],
        ),
        Chat::new(
            "Informations Produit",
            "Voici les spécifications que vous avez demandées...",
            at(2024, 1, 14, 15, 45),
            vec![
                user("Pouvez-vous me parler de vos fonctionnalités premium ?", "15:44"),
                bot(
                    "Nos fonctionnalités premium incluent des analyses avancées, un support prioritaire et des intégrations personnalisées. Souhaitez-vous des détails sur une fonctionnalité spécifique ?",
                    "15:45",
                ),
            ],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::types::Sender;

    #[test]
    fn test_demo_chats() {
        let chats = demo_chats();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].title, "Support Client");
        assert_eq!(chats[0].messages().len(), 4);
        assert_eq!(chats[0].messages()[0].sender, Sender::User);
        assert_eq!(chats[0].messages()[1].timestamp, "10:29");
        assert_ne!(chats[0].id, chats[1].id);
    }
}
