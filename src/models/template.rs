//! Invitation message template model

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "message_channel", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageChannel {
    Email,
    Sms,
    Whatsapp,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MessageTemplate {
    pub id: i64,
    pub organisateur_id: i64,
    pub name: String,
    pub channel: MessageChannel,
    /// Email only
    pub subject: Option<String>,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    pub channel: MessageChannel,
    pub subject: Option<String>,
    pub body: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTemplateRequest {
    pub name: Option<String>,
    /// Absent keeps the subject, blank clears it
    pub subject: Option<String>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationRecipient {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Either an organizer template or the built-in default of a channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvitationRequest {
    pub template_id: Option<i64>,
    pub channel: Option<MessageChannel>,
    #[serde(default)]
    pub recipients: Vec<InvitationRecipient>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedInvitation {
    pub recipient: Option<String>,
    pub channel: MessageChannel,
    pub subject: Option<String>,
    pub body: String,
    /// `mailto:`, `sms:` or `https://wa.me/` link; `None` when the recipient lacks the needed address
    pub link: Option<String>,
    pub unresolved: Vec<String>,
}
