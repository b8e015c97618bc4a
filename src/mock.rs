//! A scripted, in-memory [`AssistantBackend`].
//!
//! Poll responses are queued up front and handed out one per `get_run`;
//! every call is recorded so tests can assert on what was sent.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::{
    assistants::{
        messages::{Content, CreateMessageRequest, Message, Role, Text},
        runs::{
            CreateRunRequest, FunctionCall, RequiredAction, Run, RunStep, Status, SubmitToolOutputs,
            SubmitToolOutputsRequest, ToolCall, ToolOutput,
        },
        threads::Thread,
        Assistant, CreateAssistantRequest,
    },
    backend::AssistantBackend,
    ApiResponseOrError, OpenAiError,
};

pub const THREAD_ID: &str = "thread_mock";
pub const RUN_ID: &str = "run_mock";

#[derive(Debug, Clone)]
pub enum Call {
    ListAssistants { limit: u32 },
    CreateAssistant(CreateAssistantRequest),
    CreateThread,
    CreateMessage { thread_id: String, content: String },
    CreateRun { thread_id: String, assistant_id: String },
    GetRun { thread_id: String, run_id: String },
    SubmitToolOutputs { run_id: String, outputs: Vec<ToolOutput> },
    ListRunSteps { run_id: String },
    ListMessages { thread_id: String },
    FileContent { file_id: String },
}

#[derive(Default)]
struct MockState {
    assistants: Vec<Assistant>,
    polls: VecDeque<Run>,
    messages: Vec<Message>,
    files: HashMap<String, Vec<u8>>,
    calls: Vec<Call>,
}

#[derive(Default)]
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an assistant that already exists on the service.
    pub fn with_assistant(self, assistant: Assistant) -> Self {
        self.lock().assistants.push(assistant);
        self
    }

    /// Queues the run returned by the next `get_run`.
    pub fn with_poll(self, run: Run) -> Self {
        self.lock().polls.push_back(run);
        self
    }

    /// Seeds the thread's messages, newest first.
    pub fn with_messages(self, messages: Vec<Message>) -> Self {
        self.lock().messages = messages;
        self
    }

    pub fn with_file(self, file_id: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.lock().files.insert(file_id.into(), bytes);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Every batch of tool outputs submitted so far, in submission order.
    pub fn submissions(&self) -> Vec<Vec<ToolOutput>> {
        self.lock()
            .calls
            .iter()
            .filter_map(|call| match call {
                Call::SubmitToolOutputs { outputs, .. } => Some(outputs.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn created_assistants(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, Call::CreateAssistant(_)))
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, call: Call) {
        self.lock().calls.push(call);
    }
}

#[async_trait]
impl AssistantBackend for MockBackend {
    async fn list_assistants(&self, limit: u32) -> ApiResponseOrError<Vec<Assistant>> {
        self.record(Call::ListAssistants { limit });
        let assistants = self
            .lock()
            .assistants
            .iter()
            .take(limit as usize)
            .cloned()
            .collect();
        Ok(assistants)
    }

    async fn create_assistant(
        &self,
        request: CreateAssistantRequest,
    ) -> ApiResponseOrError<Assistant> {
        self.record(Call::CreateAssistant(request.clone()));
        let mut state = self.lock();
        let created = Assistant {
            id: format!("asst_mock_{}", state.assistants.len() + 1),
            object: "assistant".to_string(),
            created_at: 0,
            name: request.name,
            description: request.description,
            model: request.model,
            instructions: request.instructions,
            tools: request.tools,
            metadata: request.metadata,
        };
        state.assistants.insert(0, created.clone());
        Ok(created)
    }

    async fn create_thread(&self) -> ApiResponseOrError<Thread> {
        self.record(Call::CreateThread);
        Ok(Thread {
            id: THREAD_ID.to_string(),
            object: "thread".to_string(),
            created_at: 0,
            metadata: None,
        })
    }

    async fn create_message(
        &self,
        thread_id: &str,
        request: CreateMessageRequest,
    ) -> ApiResponseOrError<Message> {
        self.record(Call::CreateMessage {
            thread_id: thread_id.to_string(),
            content: request.content.clone(),
        });
        Ok(message(
            "msg_user",
            request.role,
            vec![Content::Text {
                text: Text {
                    value: request.content,
                    annotations: Vec::new(),
                },
            }],
        ))
    }

    async fn create_run(
        &self,
        thread_id: &str,
        request: CreateRunRequest,
    ) -> ApiResponseOrError<Run> {
        self.record(Call::CreateRun {
            thread_id: thread_id.to_string(),
            assistant_id: request.assistant_id.clone(),
        });
        let mut created = run(Status::Queued);
        created.assistant_id = request.assistant_id;
        Ok(created)
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> ApiResponseOrError<Run> {
        self.record(Call::GetRun {
            thread_id: thread_id.to_string(),
            run_id: run_id.to_string(),
        });
        self.lock().polls.pop_front().ok_or_else(|| {
            OpenAiError::new(
                "no scripted poll response left".to_string(),
                "mock".to_string(),
            )
        })
    }

    async fn submit_tool_outputs(
        &self,
        _thread_id: &str,
        run_id: &str,
        request: SubmitToolOutputsRequest,
    ) -> ApiResponseOrError<Run> {
        self.record(Call::SubmitToolOutputs {
            run_id: run_id.to_string(),
            outputs: request.tool_outputs,
        });
        Ok(run(Status::Queued))
    }

    async fn list_run_steps(
        &self,
        _thread_id: &str,
        run_id: &str,
    ) -> ApiResponseOrError<Vec<RunStep>> {
        self.record(Call::ListRunSteps {
            run_id: run_id.to_string(),
        });
        Ok(Vec::new())
    }

    async fn list_messages(&self, thread_id: &str) -> ApiResponseOrError<Vec<Message>> {
        self.record(Call::ListMessages {
            thread_id: thread_id.to_string(),
        });
        Ok(self.lock().messages.clone())
    }

    async fn file_content(&self, file_id: &str) -> ApiResponseOrError<Vec<u8>> {
        self.record(Call::FileContent {
            file_id: file_id.to_string(),
        });
        self.lock().files.get(file_id).cloned().ok_or_else(|| {
            OpenAiError::new(
                format!("No such File object: {file_id}"),
                "invalid_request_error".to_string(),
            )
        })
    }
}

pub fn assistant(id: &str, name: &str) -> Assistant {
    Assistant {
        id: id.to_string(),
        object: "assistant".to_string(),
        created_at: 0,
        name: Some(name.to_string()),
        description: None,
        model: "gpt-4o-mini".to_string(),
        instructions: None,
        tools: Vec::new(),
        metadata: None,
    }
}

pub fn run(status: Status) -> Run {
    Run {
        id: RUN_ID.to_string(),
        object: "thread.run".to_string(),
        created_at: 0,
        assistant_id: "asst_mock".to_string(),
        thread_id: THREAD_ID.to_string(),
        status,
        required_action: None,
        last_error: None,
        expires_at: None,
        started_at: None,
        completed_at: None,
        cancelled_at: None,
        failed_at: None,
        model: None,
        usage: None,
        metadata: None,
    }
}

/// A run waiting on the given tool calls.
pub fn requires_action(tool_calls: Vec<ToolCall>) -> Run {
    Run {
        required_action: Some(RequiredAction::SubmitToolOutputs {
            submit_tool_outputs: SubmitToolOutputs { tool_calls },
        }),
        ..run(Status::RequiresAction)
    }
}

pub fn tool_call(id: &str, name: &str, arguments: &str) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        kind: "function".to_string(),
        function: FunctionCall {
            name: name.to_string(),
            arguments: arguments.to_string(),
        },
    }
}

pub fn message(id: &str, role: Role, content: Vec<Content>) -> Message {
    Message {
        id: id.to_string(),
        object: "thread.message".to_string(),
        created_at: 0,
        thread_id: THREAD_ID.to_string(),
        role,
        content,
        assistant_id: None,
        run_id: None,
        attachments: None,
        metadata: None,
    }
}

pub fn text(value: &str) -> Content {
    Content::Text {
        text: Text {
            value: value.to_string(),
            annotations: Vec::new(),
        },
    }
}
