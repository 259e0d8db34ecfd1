use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use samarth::config::{get_data_directory, AppConfig};
use samarth::display::{render_inspection, render_response};
use samarth::export::ExportFormat;
use samarth::logging::{init_logging, LogContext, RequestIdGenerator};
use samarth::source::DatasetKind;
use samarth::Samarth;

#[derive(Parser)]
#[command(name = "samarth")]
#[command(about = "Answer questions about Indian rainfall, crop prices and MSP")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    verbose: bool,

    #[arg(short, long, global = true, help = "Configuration file path")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a single question
    Ask {
        #[arg(help = "Question about rainfall, crop prices or MSP")]
        question: String,

        #[arg(short, long, help = "Export the answer table to this file")]
        output: Option<PathBuf>,

        #[arg(short, long, help = "Export format", value_enum)]
        format: Option<OutputFormat>,

        #[arg(long, help = "Print the answer as JSON")]
        json: bool,
    },

    /// Ask questions in a loop until `exit`
    Interactive,

    /// Fetch a dataset and check its columns
    Inspect {
        #[arg(help = "Dataset: rainfall, crop-price or msp")]
        dataset: DatasetKind,
    },

    /// Serve the HTTP API
    #[cfg(feature = "api")]
    Serve {
        #[arg(long, help = "Bind address")]
        host: Option<String>,

        #[arg(short, long, help = "Port")]
        port: Option<u16>,
    },
}

#[derive(clap::ValueEnum, Clone, Copy)]
enum OutputFormat {
    Csv,
    Json,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::Json => ExportFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path).await?,
        None => AppConfig::load().await?,
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }

    init_logging(&config.logging, &get_data_directory().join("logs"))?;

    let context = LogContext::new("main", "startup")
        .with_request_id(RequestIdGenerator::generate())
        .with_string_field("version", env!("CARGO_PKG_VERSION"));
    samarth::log_info!(context, "Samarth starting up");

    let app = Arc::new(Samarth::new(config)?);

    match cli.command {
        Commands::Ask {
            question,
            output,
            format,
            json,
        } => {
            ask(&app, &question, output, format, json).await?;
        }
        Commands::Interactive => {
            interactive(&app).await?;
        }
        Commands::Inspect { dataset } => {
            let inspection = app.inspect(dataset).await?;
            print!("{}", render_inspection(&inspection));
        }
        #[cfg(feature = "api")]
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| app.config().api.host.clone());
            let port = port.unwrap_or(app.config().api.port);
            samarth::api::serve(app.clone(), &host, port).await?;
        }
    }

    if let Some(stats) = app.http_stats().await {
        debug!(
            "HTTP requests: {} ok, {} failed, {} records, avg {}ms",
            stats.success_count,
            stats.error_count,
            stats.records_received,
            stats.avg_response_time.as_millis()
        );
    }

    Ok(())
}

async fn ask(
    app: &Samarth,
    question: &str,
    output: Option<PathBuf>,
    format: Option<OutputFormat>,
    json: bool,
) -> Result<()> {
    let response = app.ask(question).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", render_response(&response));
    }

    if output.is_some() || format.is_some() {
        match app
            .export_answer(&response, output.as_deref(), format.map(ExportFormat::from))
            .await?
        {
            Some(stats) => println!("Results exported to: {}", stats.file_path.display()),
            None => println!("Nothing to export."),
        }
    }

    Ok(())
}

async fn interactive(app: &Samarth) -> Result<()> {
    println!("Project Samarth - ask about rainfall, crop prices or MSP.");
    println!("Type `refresh` to refetch datasets, `exit` to quit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"\nAsk a question: ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match line.trim() {
            "" => continue,
            "exit" | "quit" => break,
            "refresh" => {
                app.refresh();
                println!("Datasets will be refetched on the next question.");
            }
            question => {
                let response = app.ask(question).await;
                print!("{}", render_response(&response));
            }
        }
    }

    info!("Interactive session ended");
    Ok(())
}
