use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::process;
use tokio::io::AsyncReadExt;
use tracing::{error, info, warn};

mod api;
mod config;
mod ops;

use api::client::RetellerClient;
use api::types::{looks_like_pdf, DocumentRef, JobId};
use config::Config;
use ops::export::Exporter;
use ops::retrieve::PollConfig;

fn cli() -> Command {
    Command::new("book-reteller")
        .version("0.3.1")
        .about("Command-line client for the Book Reteller summarization API")
        .long_about(
            "Submits a PDF to the Book Reteller service and retrieves the generated summary:\n\
            - upload: submit a PDF and print the job id\n\
            - summary: fetch a finished summary by job id\n\
            - run: upload, wait for the summary, print and optionally export it",
        )
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("endpoint")
                .long("endpoint")
                .value_name("URL")
                .global(true)
                .help("Base URL of the summarization API (defaults to $BOOK_RETELLER_URL)")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("export-dir")
                .long("export-dir")
                .value_name("DIR")
                .global(true)
                .help("Directory summaries are exported into (defaults to $BOOK_RETELLER_EXPORT_DIR)")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .global(true)
                .help("Only log errors")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("upload")
                .about("Submit a PDF for summarization and print the job id")
                .arg(Arg::new("file").value_name("FILE").required(true))
                .arg(
                    Arg::new("start-page")
                        .long("start-page")
                        .value_name("N")
                        .default_value("0")
                        .help("First page to summarize"),
                )
                .arg(
                    Arg::new("end-page")
                        .long("end-page")
                        .value_name("N")
                        .default_value("")
                        .help("Last page to summarize (empty for the whole book)"),
                ),
        )
        .subcommand(
            Command::new("summary")
                .about("Fetch the summary for a job id")
                .arg(Arg::new("id").value_name("JOB_ID").required(true))
                .arg(
                    Arg::new("wait")
                        .long("wait")
                        .help("Poll until the summary is ready")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("save")
                        .long("save")
                        .help("Export the summary to a .txt file")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("share")
                        .long("share")
                        .help("Export the summary and open it with the system handler")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new("run")
                .about("Upload a PDF, wait for the summary, and print it")
                .arg(Arg::new("file").value_name("FILE").required(true))
                .arg(
                    Arg::new("start-page")
                        .long("start-page")
                        .value_name("N")
                        .default_value("0"),
                )
                .arg(
                    Arg::new("end-page")
                        .long("end-page")
                        .value_name("N")
                        .default_value(""),
                )
                .arg(Arg::new("save").long("save").action(ArgAction::SetTrue))
                .arg(Arg::new("share").long("share").action(ArgAction::SetTrue)),
        )
}

#[tokio::main]
async fn main() {
    let matches = cli().get_matches();

    // Logs go to stderr only; stdout carries the job id or summary text.
    let log_level = if std::env::var("RUST_LOG").is_ok() {
        None
    } else if matches.get_flag("quiet") {
        Some("error")
    } else {
        Some("info")
    };

    if let Some(level) = log_level {
        std::env::set_var("RUST_LOG", level);
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::resolve(
        matches.get_one::<String>("endpoint").cloned(),
        matches.get_one::<String>("export-dir").cloned(),
    ) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(2);
        }
    };

    info!("Using endpoint {}", config.base_url);
    let client = RetellerClient::new(config.base_url.clone());

    let result = match matches.subcommand() {
        Some(("upload", sub)) => cmd_upload(&client, sub).await,
        Some(("summary", sub)) => cmd_summary(&client, &config, sub).await,
        Some(("run", sub)) => cmd_run(&client, &config, sub).await,
        _ => unreachable!("a subcommand is required"),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        process::exit(1);
    }
}

/// Builds the document reference for a local path and sniffs its head so
/// obviously wrong picks are flagged before the upload starts.
async fn pick_document(path: &str) -> anyhow::Result<DocumentRef> {
    let document = DocumentRef::from_path(path);

    let mut file = tokio::fs::File::open(&document.path)
        .await
        .with_context(|| format!("cannot open {}", path))?;
    let mut head = [0u8; 5];
    let read = file
        .read(&mut head)
        .await
        .with_context(|| format!("cannot read {}", path))?;

    if !looks_like_pdf(&head[..read]) {
        warn!(
            "{} does not look like a PDF; the service may reject it",
            document.name
        );
    }

    Ok(document)
}

fn page_bounds(matches: &ArgMatches) -> (&str, &str) {
    let start = matches
        .get_one::<String>("start-page")
        .map(String::as_str)
        .unwrap_or("0");
    let end = matches
        .get_one::<String>("end-page")
        .map(String::as_str)
        .unwrap_or("");
    (start, end)
}

async fn cmd_upload(client: &RetellerClient, matches: &ArgMatches) -> anyhow::Result<()> {
    let path = matches.get_one::<String>("file").expect("required");
    let document = pick_document(path).await?;
    let (start, end) = page_bounds(matches);

    let id = ops::upload::submit(client, Some(&document), start, end).await?;
    println!("{}", id);

    Ok(())
}

async fn cmd_summary(
    client: &RetellerClient,
    config: &Config,
    matches: &ArgMatches,
) -> anyhow::Result<()> {
    let id = JobId::new(matches.get_one::<String>("id").expect("required").clone());

    let result = if matches.get_flag("wait") {
        ops::retrieve::await_summary(client, &id, PollConfig::default()).await?
    } else {
        ops::retrieve::fetch(client, &id).await?
    };

    println!("{}", result.summary);
    maybe_export(config, &id, &result.summary, matches).await
}

async fn cmd_run(
    client: &RetellerClient,
    config: &Config,
    matches: &ArgMatches,
) -> anyhow::Result<()> {
    let path = matches.get_one::<String>("file").expect("required");
    let document = pick_document(path).await?;
    let (start, end) = page_bounds(matches);

    let id = ops::upload::submit(client, Some(&document), start, end).await?;
    let result = ops::retrieve::await_summary(client, &id, PollConfig::default()).await?;

    println!("{}", result.summary);
    maybe_export(config, &id, &result.summary, matches).await
}

async fn maybe_export(
    config: &Config,
    id: &JobId,
    text: &str,
    matches: &ArgMatches,
) -> anyhow::Result<()> {
    let share = matches.get_flag("share");
    if matches.get_flag("save") || share {
        let exporter = Exporter::new(config.export_dir.clone());
        exporter.export(id, text, share).await?;
    }

    Ok(())
}
