use anyhow::{Context, Result};
use std::process::ExitCode;
use tokio::fs;
use tracing_subscriber::EnvFilter;

use vital_lens::analyzer::GeminiAnalyzer;
use vital_lens::api_connection::Provider;
use vital_lens::cli::{parse_args, Cli};
use vital_lens::config::AppConfig;
use vital_lens::image_input::load_image;
use vital_lens::presentation::ResultView;
use vital_lens::session::{AnalysisTicket, AppState, Session};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("vital_lens=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn start_analysis(session: &mut Session, cli: &Cli) -> Result<AnalysisTicket> {
    if let Some(path) = &cli.image {
        let image = load_image(path)
            .await
            .with_context(|| format!("Failed to load image '{}'", path.display()))?;
        return Ok(session.select_image(image)?);
    }

    let text = match (&cli.text, &cli.text_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read ingredient file '{}'", path.display()))?,
        (None, None) => anyhow::bail!("No input given"),
    };
    session.set_raw_text(text);
    if !session.can_submit_text() {
        anyhow::bail!("Ingredient text is empty; nothing to analyze");
    }
    Ok(session.submit_text()?)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logging();
    let cli = parse_args();

    let config = AppConfig::from_env().with_model_override(cli.model.clone());
    let provider = Provider::gemini(config.api_key.clone(), config.base_url.clone());
    let analyzer = GeminiAnalyzer::new(provider).with_model(config.model.clone());

    let mut session = Session::new();
    let ticket = start_analysis(&mut session, &cli).await?;
    eprintln!("Reasoning... (model: {})", analyzer.model());

    let preview_url = session.preview_url().map(str::to_string);
    match session.analyze_with(&analyzer, ticket).await {
        AppState::Result(result) => {
            if cli.json {
                let json = serde_json::to_string_pretty(result)
                    .context("Failed to serialize analysis result")?;
                println!("{}", json);
            } else {
                let mut view = ResultView::new(result);
                view.set_search(cli.search.clone());
                print!("{}", view.render(preview_url.as_deref()));
            }
            Ok(ExitCode::SUCCESS)
        }
        AppState::Error(message) => {
            eprintln!("Analysis Failed: {}", message);
            Ok(ExitCode::FAILURE)
        }
        other => anyhow::bail!("Analysis ended in unexpected state '{}'", other.name()),
    }
}
