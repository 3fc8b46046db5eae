use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use paragraph_aligner::form::{FormEvent, RunOnceForm};
use paragraph_aligner::markup::MarkupPolicy;
use paragraph_aligner::models::{Config, Inputs, PromptConfig, SelectedFile, VisionSettings};
use paragraph_aligner::upload::UploadPage;
use paragraph_aligner::workflow::WorkflowClient;
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "paragraph-aligner")]
#[command(about = "Align a source document with its translation")]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Submit two documents to the alignment workflow and print the result page.
    Align {
        #[arg(value_name = "SOURCE")]
        source: PathBuf,
        #[arg(value_name = "TRANSLATED")]
        translated: PathBuf,
        /// Inject the returned markup without escaping it.
        #[arg(long)]
        raw_markup: bool,
        /// Write the page to a file instead of stdout.
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// Render a run form from a prompt config and apply edits to it.
    Form {
        #[arg(long, value_name = "FILE")]
        config: PathBuf,
        /// Vision settings JSON enabling the image section.
        #[arg(long, value_name = "FILE")]
        vision: Option<PathBuf>,
        /// Set an input, as KEY=VALUE. May be repeated.
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment)]
        assignments: Vec<(String, String)>,
        /// Clear all inputs after applying the assignments.
        #[arg(long)]
        clear: bool,
    },
}

fn parse_assignment(input: &str) -> std::result::Result<(String, String), String> {
    input
        .split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .ok_or_else(|| format!("Invalid assignment '{}'. Expected KEY=VALUE", input))
}

async fn run_align(
    source: PathBuf,
    translated: PathBuf,
    raw_markup: bool,
    output: Option<PathBuf>,
) -> Result<()> {
    let config = Config::from_env()?;
    let markup_policy = if raw_markup {
        MarkupPolicy::Raw
    } else {
        config.markup_policy
    };

    let client = WorkflowClient::new(&config)?;
    let mut page = UploadPage::new(client, markup_policy);
    page.select_source(Some(
        SelectedFile::from_path(&source)
            .await
            .with_context(|| format!("Failed to read {}", source.display()))?,
    ));
    page.select_target(Some(
        SelectedFile::from_path(&translated)
            .await
            .with_context(|| format!("Failed to read {}", translated.display()))?,
    ));

    page.submit().await;

    let html = page.render_html();
    match output {
        Some(path) => {
            tokio::fs::write(&path, html).await?;
            info!("Wrote result page to {}", path.display());
        }
        None => print!("{}", html),
    }
    Ok(())
}

fn run_form(
    config: PathBuf,
    vision: Option<PathBuf>,
    assignments: Vec<(String, String)>,
    clear: bool,
) -> Result<()> {
    let prompt_config: PromptConfig = serde_json::from_str(
        &std::fs::read_to_string(&config)
            .with_context(|| format!("Failed to read {}", config.display()))?,
    )?;
    let vision_config: VisionSettings = match vision {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(&path)?)?,
        None => VisionSettings::default(),
    };

    let form = RunOnceForm::new(prompt_config, vision_config);
    let mut inputs = Inputs::new();
    let mut events: Vec<FormEvent> = Vec::new();

    for (key, value) in &assignments {
        form.change_input(&inputs, key, value, &mut events);
        if let Some(FormEvent::InputsChange { inputs: next }) = events.last() {
            inputs = next.clone();
        }
    }
    if clear {
        form.clear(&mut events);
        if let Some(FormEvent::InputsChange { inputs: next }) = events.last() {
            inputs = next.clone();
        }
    }

    let output = serde_json::json!({
        "form": form.render(&inputs),
        "inputs": inputs,
        "events": events,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paragraph_aligner=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = CliArgs::parse();

    let outcome = match args.command {
        Command::Align {
            source,
            translated,
            raw_markup,
            output,
        } => run_align(source, translated, raw_markup, output).await,
        Command::Form {
            config,
            vision,
            assignments,
            clear,
        } => run_form(config, vision, assignments, clear),
    };

    if let Err(e) = outcome {
        error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
