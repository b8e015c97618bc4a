use crate::{
    assistants::Tool,
    client::{List, OpenAiClient},
    ApiResponseOrError,
};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub object: String,
    pub created_at: u64,
    /// The thread ID that this message belongs to.
    pub thread_id: String,
    /// The entity that produced the message. One of user or assistant
    pub role: Role,
    /// The content of the message.
    #[serde(default)]
    pub content: Vec<Content>,
    /// The assistant that produced the message.
    pub assistant_id: Option<String>,
    /// The ID of the run associated with the creation of this message. Value is null when messages are created manually using the create message or create thread endpoints.
    pub run_id: Option<String>,
    /// A list of files attached to the message.
    pub attachments: Option<Vec<Attachment>>,
    pub metadata: Option<HashMap<String, String>>,
}

impl Message {
    /// The text parts of this message, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(|content| match content {
            Content::Text { text } => Some(text.value.as_str()),
            Content::ImageFile { .. }
            | Content::ImageUrl { .. }
            | Content::Refusal { .. }
            | Content::Unknown => None,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Text { text: Text },
    ImageFile { image_file: ImageFile },
    ImageUrl { image_url: ImageUrl },
    Refusal { refusal: String },
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Text {
    pub value: String,
    #[serde(default)]
    pub annotations: Vec<Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ImageFile {
    pub file_id: String,
    pub detail: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ImageUrl {
    pub url: String,
    pub detail: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Attachment {
    pub file_id: String,
    #[serde(default)]
    pub tools: Vec<Tool>,
}

#[derive(Serialize, Builder, Debug, Clone)]
#[builder(pattern = "owned")]
#[builder(name = "CreateMessageBuilder")]
#[builder(setter(strip_option, into))]
pub struct CreateMessageRequest {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub attachments: Option<Vec<Attachment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl OpenAiClient {
    pub async fn create_message(
        &self,
        thread_id: &str,
        request: CreateMessageRequest,
    ) -> ApiResponseOrError<Message> {
        self.post(format!("threads/{thread_id}/messages"), request)
            .await
    }

    /// Lists the messages of a thread, newest first.
    pub async fn list_messages(&self, thread_id: &str) -> ApiResponseOrError<Vec<Message>> {
        let page: List<Message> = self
            .list(format!("threads/{thread_id}/messages?order=desc"))
            .await?;
        Ok(page.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mixed_content_decodes_in_order() {
        let message: Message = serde_json::from_value(json!({
            "id": "msg_1",
            "object": "thread.message",
            "created_at": 1_700_000_000u64,
            "thread_id": "thread_1",
            "status": "completed",
            "role": "assistant",
            "content": [
                { "type": "image_file", "image_file": { "file_id": "file-chart" } },
                { "type": "text", "text": { "value": "Here is the chart.", "annotations": [] } },
                { "type": "audio", "audio": {} },
                { "type": "text", "text": { "value": "Prices rose.", "annotations": [] } }
            ],
            "assistant_id": "asst_1",
            "run_id": "run_1",
            "attachments": [],
            "metadata": {}
        }))
        .unwrap();

        assert_eq!(message.role, Role::Assistant);
        assert!(matches!(
            &message.content[0],
            Content::ImageFile { image_file } if image_file.file_id == "file-chart"
        ));
        assert_eq!(message.content[2], Content::Unknown);
        assert_eq!(
            message.texts().collect::<Vec<_>>(),
            vec!["Here is the chart.", "Prices rose."]
        );
    }

    #[test]
    fn create_request_wire_shape() {
        let request = CreateMessageBuilder::default()
            .role(Role::User)
            .content("Plot AAPL.")
            .build()
            .unwrap();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "role": "user", "content": "Plot AAPL." })
        );
    }
}
