use crate::{
    assistants::{Assistant, CreateAssistantBuilder},
    backend::AssistantBackend,
    config::AnalyzerConfig,
    tools, Error, Result,
};

/// Returns the first assistant named `config.assistant_name`, creating it
/// when none of the most recent `config.lookup_limit` assistants match.
///
/// A match is returned as-is: its instructions, model and tools are not
/// compared with `config`.
pub async fn get_or_create_assistant<B>(backend: &B, config: &AnalyzerConfig) -> Result<Assistant>
where
    B: AssistantBackend + ?Sized,
{
    let assistants = backend.list_assistants(config.lookup_limit).await?;

    if let Some(existing) = assistants
        .into_iter()
        .find(|assistant| assistant.name.as_deref() == Some(config.assistant_name.as_str()))
    {
        log::info!(
            "Matching `{}` assistant found, using the first matching assistant with ID: {}",
            config.assistant_name,
            existing.id
        );
        return Ok(existing);
    }

    let request = CreateAssistantBuilder::default()
        .model(config.model.as_str())
        .name(config.assistant_name.as_str())
        .instructions(config.instructions.as_str())
        .tools(tools::manifest())
        .build()
        .map_err(|err| Error::InvalidRequest(err.to_string()))?;

    let assistant = backend.create_assistant(request).await?;
    log::info!(
        "No matching `{}` assistant found, creating a new assistant with ID: {}",
        config.assistant_name,
        assistant.id
    );
    Ok(assistant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assistants::Tool;
    use crate::mock::{assistant, Call, MockBackend};

    #[tokio::test]
    async fn reuses_existing_assistant_by_name() {
        let backend = MockBackend::new()
            .with_assistant(assistant("asst_other", "portfolio_helper"))
            .with_assistant(assistant("asst_1", "stock_analyzer_assistant"))
            .with_assistant(assistant("asst_2", "stock_analyzer_assistant"));
        let config = AnalyzerConfig::default();

        let first = get_or_create_assistant(&backend, &config).await.unwrap();
        let second = get_or_create_assistant(&backend, &config).await.unwrap();

        assert_eq!(first.id, "asst_1");
        assert_eq!(second.id, "asst_1");
        assert_eq!(backend.created_assistants(), 0);
    }

    #[tokio::test]
    async fn creates_once_then_reuses() {
        let backend = MockBackend::new();
        let config = AnalyzerConfig::default();

        let created = get_or_create_assistant(&backend, &config).await.unwrap();
        let reused = get_or_create_assistant(&backend, &config).await.unwrap();

        assert_eq!(created.id, reused.id);
        assert_eq!(backend.created_assistants(), 1);
    }

    #[tokio::test]
    async fn creation_carries_the_fixed_definition() {
        let backend = MockBackend::new();
        let config = AnalyzerConfig::default();

        get_or_create_assistant(&backend, &config).await.unwrap();

        let calls = backend.calls();
        assert!(matches!(calls[0], Call::ListAssistants { limit: 20 }));
        let Call::CreateAssistant(request) = &calls[1] else {
            panic!("expected a create call, got {:?}", calls[1]);
        };
        assert_eq!(request.name.as_deref(), Some("stock_analyzer_assistant"));
        assert_eq!(request.model, "gpt-4o-mini");
        assert_eq!(request.instructions.as_deref(), Some(config.instructions.as_str()));
        assert_eq!(request.tools[0], Tool::CodeInterpreter);
        assert_eq!(request.tools[1].function_name(), Some("retrieve_stock_data"));
    }

    #[tokio::test]
    async fn stale_definition_is_not_reconciled() {
        let mut stale = assistant("asst_old", "stock_analyzer_assistant");
        stale.instructions = Some("Old instructions.".to_string());
        let backend = MockBackend::new().with_assistant(stale);

        let found = get_or_create_assistant(&backend, &AnalyzerConfig::default())
            .await
            .unwrap();

        assert_eq!(found.instructions.as_deref(), Some("Old instructions."));
        assert!(found.tools.is_empty());
        assert_eq!(backend.calls().len(), 1);
    }
}
