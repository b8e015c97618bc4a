use crate::{client::OpenAiClient, ApiResponseOrError};

impl OpenAiClient {
    /// Downloads the raw contents of a file, such as an image the code
    /// interpreter generated.
    pub async fn file_content(&self, file_id: &str) -> ApiResponseOrError<Vec<u8>> {
        self.get_bytes(format!("files/{file_id}/content")).await
    }
}
