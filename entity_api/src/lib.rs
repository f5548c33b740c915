pub use entity::{
    bot_events, bots, chat_messages, credit_transactions, organizations, participants, projects,
    recordings, utterances, webhook_delivery_attempts, webhook_secrets, webhook_subscriptions, Id,
};

pub mod async_transcription;
pub mod bot;
pub mod bot_event;
pub mod chat_message;
pub mod credential;
pub mod credit_transaction;
pub mod debug_screenshot;
pub mod error;
pub mod organization;
pub mod participant;
pub mod project;
pub mod recording;
pub mod resource_snapshot;
pub mod utterance;
pub mod webhook_delivery_attempt;
pub mod webhook_secret;
pub mod webhook_subscription;

pub fn uuid_parse_str(uuid_str: &str) -> Result<Id, error::Error> {
    Id::parse_str(uuid_str).map_err(|_| error::Error {
        source: None,
        error_kind: error::EntityApiErrorKind::InvalidQueryTerm,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uuid_parse_str_accepts_canonical_uuids() {
        let id = Id::new_v4();
        assert_eq!(uuid_parse_str(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn uuid_parse_str_rejects_garbage() {
        assert!(uuid_parse_str("bot_0123456789abcdef").is_err());
    }
}
