use sqlx::FromRow;
use uuid::Uuid;

/// A stored row of `TB_Messages`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Message {
    pub id: Uuid,
    pub client_ip: String,
    pub message: String,
}

/// A message that has not been persisted yet; storage assigns its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub client_ip: String,
    pub message: String,
}

impl NewMessage {
    pub fn new(client_ip: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            client_ip: client_ip.into(),
            message: message.into(),
        }
    }
}
