use std::collections::HashMap;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    client::{List, OpenAiClient},
    ApiResponseOrError,
};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Assistant {
    pub id: String,
    pub object: String,
    pub created_at: u64,
    /// The name of the assistant. The maximum length is 256 characters.
    pub name: Option<String>,
    pub description: Option<String>,
    /// ID of the model to use.
    pub model: String,
    /// The system instructions that the assistant uses. The maximum length is 256,000 characters.
    pub instructions: Option<String>,
    #[serde(default)]
    pub tools: Vec<Tool>,
    /// Set of 16 key-value pairs that can be attached to an object.
    pub metadata: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    CodeInterpreter,
    FileSearch,
    Function {
        function: Function,
    },
    #[serde(other)]
    Unknown,
}

impl Tool {
    pub fn function_name(&self) -> Option<&str> {
        match self {
            Tool::Function { function } => Some(&function.name),
            Tool::CodeInterpreter | Tool::FileSearch | Tool::Unknown => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

#[derive(Serialize, Builder, Debug, Clone, Default)]
#[builder(pattern = "owned")]
#[builder(name = "CreateAssistantBuilder")]
#[builder(setter(strip_option, into))]
pub struct CreateAssistantRequest {
    /// ID of the model to use.
    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub instructions: Option<String>,
    /// A set of tools that the assistant can use.
    #[builder(default)]
    pub tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub metadata: Option<HashMap<String, String>>,
}

impl OpenAiClient {
    pub async fn create_assistant(
        &self,
        request: CreateAssistantRequest,
    ) -> ApiResponseOrError<Assistant> {
        self.post("assistants", request).await
    }

    /// Lists the most recently created assistants, newest first.
    pub async fn list_assistants(&self, limit: u32) -> ApiResponseOrError<Vec<Assistant>> {
        let page: List<Assistant> = self
            .list(format!("assistants?order=desc&limit={limit}"))
            .await?;
        Ok(page.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_manifest_wire_shape() {
        let tools = vec![
            Tool::CodeInterpreter,
            Tool::Function {
                function: Function {
                    name: "lookup".to_string(),
                    description: None,
                    parameters: json!({ "type": "object" }),
                },
            },
        ];

        assert_eq!(
            serde_json::to_value(&tools).unwrap(),
            json!([
                { "type": "code_interpreter" },
                {
                    "type": "function",
                    "function": { "name": "lookup", "parameters": { "type": "object" } }
                }
            ])
        );
    }

    #[test]
    fn assistant_with_unfamiliar_tool_decodes() {
        let assistant: Assistant = serde_json::from_value(json!({
            "id": "asst_1",
            "object": "assistant",
            "created_at": 1_700_000_000u64,
            "name": "stock_analyzer_assistant",
            "description": null,
            "model": "gpt-4o-mini",
            "instructions": "Analyze.",
            "tools": [
                { "type": "code_interpreter" },
                { "type": "file_search", "file_search": { "max_num_results": 5 } },
                { "type": "browser" }
            ],
            "metadata": {},
            "temperature": 1.0
        }))
        .unwrap();

        assert_eq!(
            assistant.tools,
            vec![Tool::CodeInterpreter, Tool::FileSearch, Tool::Unknown]
        );
        assert_eq!(assistant.name.as_deref(), Some("stock_analyzer_assistant"));
    }

    #[test]
    fn create_request_skips_unset_fields() {
        let request = CreateAssistantBuilder::default()
            .model("gpt-4o-mini")
            .name("analyst")
            .build()
            .unwrap();

        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "model": "gpt-4o-mini", "name": "analyst", "tools": [] })
        );
    }
}
