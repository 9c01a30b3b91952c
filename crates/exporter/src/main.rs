use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use exporter::logger;
use exporter::{
    DirectoryDownloads, EventDraft, EventRateClient, ExportConfig, ExportSession, RefereeCheck,
    ReportExporter, Severity,
};
use report::{EventMeta, ExportRequest, ItemList, LocalRenderer, RefereeList};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "eventrate-export")]
#[command(about = "Export EventRate posters and referees to PDF and start the event")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render, download and auto-start an event
    Export {
        /// JSON file shaped like `{eventData, posters, refereeList}`
        #[arg(long, conflicts_with_all = ["posters", "referees"])]
        request: Option<PathBuf>,

        #[arg(long)]
        event_id: Option<String>,

        #[arg(long)]
        questionnaire_id: Option<String>,

        /// Poster title; repeat for several posters
        #[arg(long = "poster")]
        posters: Vec<String>,

        /// Referee email; repeat for several referees
        #[arg(long = "referee")]
        referees: Vec<String>,

        /// Directory to save the PDF in
        #[arg(long)]
        out_dir: Option<PathBuf>,

        /// Never call the remote renderer
        #[arg(long)]
        local_only: bool,

        /// Save the event as pending before exporting
        #[arg(long)]
        save: bool,
    },

    /// Check that a referee email belongs to a registered user
    VerifyReferee { email: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logger::init_cli_logger(cli.verbose);

    let config = match &cli.config {
        Some(path) => ExportConfig::from_file(path)?,
        None => ExportConfig::default(),
    };
    tracing::debug!("config: {:?}", config);

    match cli.command {
        Command::Export {
            request,
            event_id,
            questionnaire_id,
            posters,
            referees,
            out_dir,
            local_only,
            save,
        } => {
            let request = match request {
                Some(path) => {
                    let content = std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?;
                    serde_json::from_str::<ExportRequest>(&content)
                        .with_context(|| format!("failed to parse {}", path.display()))?
                }
                None => build_request(&config, event_id, questionnaire_id, &posters, &referees)?,
            };
            run_export(config, request, out_dir, local_only, save).await
        }
        Command::VerifyReferee { email } => {
            let client = EventRateClient::new(config.api.clone())?;
            match client.verify_referee(&email).await {
                Ok(RefereeCheck::Verified { email, .. }) => {
                    println!("✅ {email} is a registered user");
                    Ok(())
                }
                Ok(RefereeCheck::Rejected { message }) => bail!(message),
                Err(e) => {
                    tracing::error!("referee lookup failed: {}", e);
                    bail!("Error verifying referee email")
                }
            }
        }
    }
}

/// Assemble a request from command-line lists, applying the list rules
fn build_request(
    config: &ExportConfig,
    event_id: Option<String>,
    questionnaire_id: Option<String>,
    posters: &[String],
    referees: &[String],
) -> anyhow::Result<ExportRequest> {
    let mut items = ItemList::new(
        &config.export.voting_base_url,
        questionnaire_id.clone().unwrap_or_default(),
        event_id.clone(),
    );
    for title in posters {
        items.add(title)?;
    }

    let mut referee_list = RefereeList::new();
    for email in referees {
        referee_list.add(email)?;
    }

    let event = EventMeta {
        event_id,
        questionnaire_id,
        ..EventMeta::default()
    };
    Ok(ExportRequest::new(event, items.into_items(), referee_list)?)
}

async fn run_export(
    mut config: ExportConfig,
    request: ExportRequest,
    out_dir: Option<PathBuf>,
    local_only: bool,
    save: bool,
) -> anyhow::Result<()> {
    if let Some(dir) = out_dir {
        config.export.download_dir = dir;
    }
    config.export.local_only |= local_only;

    let client = EventRateClient::new(config.api.clone())?;

    if save {
        // Saving is best effort; the export goes ahead either way
        if let Err(e) = client.save_event(&EventDraft::from_request(&request, None)).await {
            tracing::warn!("failed to save event, exporting anyway: {}", e);
        }
    }

    let exporter = ReportExporter::new(
        client.clone(),
        client,
        DirectoryDownloads::new(config.export.download_dir.clone()),
        LocalRenderer::new(config.report.clone()),
        config.export.clone(),
    );

    let mut session = ExportSession::new();
    let outcome = exporter.export_guarded(&mut session, &request).await?;

    println!("📁 Saved to: {}", outcome.download.path.display());
    match outcome.notice.severity {
        Severity::Success => println!("✅ {}", outcome.notice.message),
        Severity::Warning => println!("⚠️ {}", outcome.notice.message),
    }
    if let Some(redirect) = outcome.redirect {
        println!("➡️ Continue at {} (after {} ms)", redirect.path, redirect.delay.as_millis());
    }

    Ok(())
}
