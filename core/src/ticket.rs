use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An incoming support ticket, already validated by the boundary layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TicketRequest {
    /// Ticket subject line (≤ 500 characters)
    pub subject: String,
    /// Latest customer message (≤ 10,000 characters)
    pub latest_message: String,
    /// Earlier turns, oldest first (≤ 50 entries)
    pub conversation_history: Vec<ConversationMessage>,
    /// Customer display name used in the greeting (≤ 100 characters)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub metadata: TicketMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ConversationMessage {
    pub role: Role,
    pub text: String,
    /// Free-form timestamp as sent by the helpdesk; never interpreted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Agent,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TicketMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,
    /// Product string from the storefront (e.g. "Apollo II Full Package")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    /// Attachment descriptors; only the count matters to the engine (≤ 10)
    #[serde(default)]
    #[schema(value_type = Vec<Object>)]
    pub attachments: Vec<serde_json::Value>,
}

impl TicketMetadata {
    /// Blank order numbers count as absent.
    pub fn order_number(&self) -> Option<&str> {
        self.order_number
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn attachment_count(&self) -> usize {
        self.attachments.len()
    }
}

impl TicketRequest {
    /// Convenience constructor for a ticket with no history or metadata.
    pub fn new(subject: impl Into<String>, latest_message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            latest_message: latest_message.into(),
            conversation_history: Vec::new(),
            customer_name: None,
            metadata: TicketMetadata::default(),
        }
    }

    pub fn customer_name(&self) -> Option<&str> {
        self.customer_name
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Texts of earlier customer turns. Agent turns are excluded.
    pub fn customer_turns(&self) -> impl Iterator<Item = &str> {
        self.conversation_history
            .iter()
            .filter(|m| m.role == Role::Customer)
            .map(|m| m.text.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_defaults_when_missing() {
        let req: TicketRequest = serde_json::from_value(serde_json::json!({
            "subject": "Hi",
            "latest_message": "Hello",
            "conversation_history": []
        }))
        .unwrap();
        assert_eq!(req.metadata, TicketMetadata::default());
        assert_eq!(req.metadata.attachment_count(), 0);
    }

    #[test]
    fn blank_order_number_is_absent() {
        let meta = TicketMetadata {
            order_number: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(meta.order_number(), None);
    }

    #[test]
    fn customer_turns_skip_agent_messages() {
        let mut req = TicketRequest::new("s", "m");
        req.conversation_history = vec![
            ConversationMessage {
                role: Role::Agent,
                text: "Did you restart?".to_string(),
                timestamp: None,
            },
            ConversationMessage {
                role: Role::Customer,
                text: "I restarted".to_string(),
                timestamp: Some("2024-01-01T10:00:00Z".to_string()),
            },
        ];
        assert_eq!(req.customer_turns().collect::<Vec<_>>(), vec!["I restarted"]);
    }
}
