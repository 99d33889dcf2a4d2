use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::{Message, NewMessage};
use crate::error::AppError;

/// Wire shape of a message. Every field is optional because the same shape
/// carries both creation payloads and stored records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageDto {
    pub id: Option<Uuid>,
    pub client_ip: Option<String>,
    pub message: Option<String>,
}

/// Body of `PATCH /messages/message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMessageRequest {
    pub message_id: Uuid,
    pub updated_message: String,
}

impl From<Message> for MessageDto {
    fn from(message: Message) -> Self {
        Self {
            id: Some(message.id),
            client_ip: Some(message.client_ip),
            message: Some(message.message),
        }
    }
}

/// Any `id` in the payload is dropped; storage assigns one on insert.
impl TryFrom<MessageDto> for NewMessage {
    type Error = AppError;

    fn try_from(dto: MessageDto) -> Result<Self, Self::Error> {
        let client_ip = dto
            .client_ip
            .ok_or_else(|| AppError::Validation("missing field `client_ip`".to_string()))?;
        let message = dto
            .message
            .ok_or_else(|| AppError::Validation("missing field `message`".to_string()))?;

        Ok(NewMessage { client_ip, message })
    }
}
