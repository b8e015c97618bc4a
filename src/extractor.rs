//! Pulls the answer text and the generated image out of a finished thread.

use std::path::{Path, PathBuf};

use crate::{
    assistants::messages::{Content, Message, Role},
    backend::AssistantBackend,
    Error, Result,
};

/// Text parts starting with this are taken to be file IDs.
pub const FILE_REFERENCE_PREFIX: &str = "file-";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// The text of the newest assistant message, parts joined by newlines.
    pub answer: Option<String>,
    /// The first image or file reference found in any assistant message.
    pub file_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub answer: Option<String>,
    pub image_path: Option<PathBuf>,
}

/// Inspects `messages`, which must be ordered newest first.
pub fn extract(messages: &[Message]) -> Extraction {
    let mut replies = messages
        .iter()
        .filter(|message| message.role == Role::Assistant)
        .peekable();

    let answer = replies
        .peek()
        .map(|latest| latest.texts().collect::<Vec<_>>().join("\n"))
        .filter(|answer| !answer.is_empty());

    let file_id = replies.find_map(file_reference);

    Extraction { answer, file_id }
}

fn file_reference(message: &Message) -> Option<String> {
    message.content.iter().find_map(|content| match content {
        Content::ImageFile { image_file } => Some(image_file.file_id.clone()),
        Content::Text { text } => {
            let value = text.value.trim();
            value
                .starts_with(FILE_REFERENCE_PREFIX)
                .then(|| value.to_string())
        }
        Content::ImageUrl { .. } | Content::Refusal { .. } | Content::Unknown => None,
    })
}

/// Downloads a file and writes it to `path`, replacing whatever is there.
pub async fn save_file<B>(backend: &B, file_id: &str, path: &Path) -> Result<usize>
where
    B: AssistantBackend + ?Sized,
{
    let bytes = backend.file_content(file_id).await?;
    tokio::fs::write(path, &bytes)
        .await
        .map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
    log::info!("Saved {file_id} ({} bytes) to {}", bytes.len(), path.display());
    Ok(bytes.len())
}

/// Logs the steps a finished run went through.
///
/// The steps are diagnostic only, so a failure to list them is logged and
/// never stops the caller from collecting the result.
pub async fn log_run_steps<B>(backend: &B, thread_id: &str, run_id: &str)
where
    B: AssistantBackend + ?Sized,
{
    match backend.list_run_steps(thread_id, run_id).await {
        Ok(steps) => {
            for step in &steps {
                log::debug!("Run step {} ({}): {:?}", step.id, step.status, step.step_details);
            }
        }
        Err(err) => log::warn!("Could not list steps of run {run_id}: {err}"),
    }
}

/// Reads the thread's messages and saves the image, if one was produced.
pub async fn collect<B>(backend: &B, thread_id: &str, output_path: &Path) -> Result<Report>
where
    B: AssistantBackend + ?Sized,
{
    let messages = backend.list_messages(thread_id).await?;
    let Extraction { answer, file_id } = extract(&messages);

    let image_path = match file_id {
        Some(file_id) => {
            save_file(backend, &file_id, output_path).await?;
            Some(output_path.to_path_buf())
        }
        None => {
            log::info!("No image found in thread {thread_id}");
            None
        }
    };

    Ok(Report { answer, image_path })
}
