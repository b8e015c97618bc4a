//! The operations the provisioner, driver and extractor need from the
//! assistant service.
//!
//! [`OpenAiClient`] is the real implementation; [`crate::mock::MockBackend`]
//! stands in for it in tests.

use async_trait::async_trait;

use crate::{
    assistants::{
        messages::{CreateMessageRequest, Message},
        runs::{CreateRunRequest, Run, RunStep, SubmitToolOutputsRequest},
        threads::{CreateThreadRequest, Thread},
        Assistant, CreateAssistantRequest,
    },
    client::OpenAiClient,
    ApiResponseOrError,
};

#[async_trait]
pub trait AssistantBackend: Send + Sync {
    async fn list_assistants(&self, limit: u32) -> ApiResponseOrError<Vec<Assistant>>;

    async fn create_assistant(
        &self,
        request: CreateAssistantRequest,
    ) -> ApiResponseOrError<Assistant>;

    async fn create_thread(&self) -> ApiResponseOrError<Thread>;

    async fn create_message(
        &self,
        thread_id: &str,
        request: CreateMessageRequest,
    ) -> ApiResponseOrError<Message>;

    async fn create_run(&self, thread_id: &str, request: CreateRunRequest)
        -> ApiResponseOrError<Run>;

    async fn get_run(&self, thread_id: &str, run_id: &str) -> ApiResponseOrError<Run>;

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        request: SubmitToolOutputsRequest,
    ) -> ApiResponseOrError<Run>;

    async fn list_run_steps(&self, thread_id: &str, run_id: &str)
        -> ApiResponseOrError<Vec<RunStep>>;

    /// Messages of the thread, newest first.
    async fn list_messages(&self, thread_id: &str) -> ApiResponseOrError<Vec<Message>>;

    async fn file_content(&self, file_id: &str) -> ApiResponseOrError<Vec<u8>>;
}

#[async_trait]
impl AssistantBackend for OpenAiClient {
    async fn list_assistants(&self, limit: u32) -> ApiResponseOrError<Vec<Assistant>> {
        OpenAiClient::list_assistants(self, limit).await
    }

    async fn create_assistant(
        &self,
        request: CreateAssistantRequest,
    ) -> ApiResponseOrError<Assistant> {
        OpenAiClient::create_assistant(self, request).await
    }

    async fn create_thread(&self) -> ApiResponseOrError<Thread> {
        OpenAiClient::create_thread(self, CreateThreadRequest::default()).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        request: CreateMessageRequest,
    ) -> ApiResponseOrError<Message> {
        OpenAiClient::create_message(self, thread_id, request).await
    }

    async fn create_run(
        &self,
        thread_id: &str,
        request: CreateRunRequest,
    ) -> ApiResponseOrError<Run> {
        OpenAiClient::create_run(self, thread_id, request).await
    }

    async fn get_run(&self, thread_id: &str, run_id: &str) -> ApiResponseOrError<Run> {
        OpenAiClient::get_run(self, thread_id, run_id).await
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        request: SubmitToolOutputsRequest,
    ) -> ApiResponseOrError<Run> {
        OpenAiClient::submit_tool_outputs(self, thread_id, run_id, request).await
    }

    async fn list_run_steps(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> ApiResponseOrError<Vec<RunStep>> {
        OpenAiClient::list_run_steps(self, thread_id, run_id).await
    }

    async fn list_messages(&self, thread_id: &str) -> ApiResponseOrError<Vec<Message>> {
        OpenAiClient::list_messages(self, thread_id).await
    }

    async fn file_content(&self, file_id: &str) -> ApiResponseOrError<Vec<u8>> {
        OpenAiClient::file_content(self, file_id).await
    }
}
