use dotenvy::dotenv;
use stock_analyzer::{
    client::OpenAiClient,
    config::{AnalyzerConfig, Settings},
    driver::{PollPolicy, RunDriver},
    extractor,
    market_data::AlphaVantageClient,
    provisioner,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let settings = Settings::from_env()?;
    let config = AnalyzerConfig::default();

    let client = OpenAiClient::new(settings.credentials)?;
    let market_data = AlphaVantageClient::new(settings.market_data_key)?;

    let assistant = provisioner::get_or_create_assistant(&client, &config).await?;

    let driver = RunDriver::new(&client, &market_data, PollPolicy::default());
    let outcome = driver.execute(&assistant.id, &config.prompt).await?;

    if !outcome.is_completed() {
        println!("Run ended with status: {}", outcome.run.status);
        if let Some(error) = &outcome.run.last_error {
            println!("Last error ({}): {}", error.code, error.message);
        }
        return Ok(());
    }

    if log::log_enabled!(log::Level::Debug) {
        extractor::log_run_steps(&client, &outcome.run.thread_id, &outcome.run.id).await;
    }

    let report =
        extractor::collect(&client, &outcome.run.thread_id, &config.output_path).await?;

    match report.answer {
        Some(answer) => println!("{answer}"),
        None => println!("The assistant did not reply with any text."),
    }
    if let Some(path) = report.image_path {
        println!("Chart saved to {}", path.display());
    }

    Ok(())
}
