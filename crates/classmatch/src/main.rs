use std::path::PathBuf;

use crate::prelude::*;
use clap::Parser;

mod align;
mod authoritative;
mod error;
mod extractor;
mod parse;
mod prelude;
mod reconcile;
mod settings;
mod vocab;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Rebuild a class schedule from OCR output and reconcile it against the authoritative timetable"
)]
pub struct App {
    #[command(subcommand)]
    pub command: SubCommands,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// TOML configuration file (layout, extraction, reconciliation, vocabulary)
    #[clap(long, env = "CLASSMATCH_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Location stamped on every derived entry; detected from the document when omitted
    #[clap(long, env = "CLASSMATCH_LOCATION", global = true)]
    location: Option<String>,

    /// Whether to display additional information.
    #[clap(long, env = "CLASSMATCH_VERBOSE", global = true, default_value = "false")]
    verbose: bool,
}

#[derive(Debug, clap::Parser)]
pub enum SubCommands {
    /// Parse an extracted document into schedule entries
    Parse(crate::parse::ParseOptions),

    /// Reconcile a parsed document against an authoritative CSV schedule
    Reconcile(crate::reconcile::ReconcileOptions),

    /// Show the per-day side-by-side alignment of both schedules
    Align(crate::align::AlignOptions),

    /// Print the effective class, trainer and location vocabulary
    Vocab(crate::vocab::VocabOptions),
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    color_eyre::install()?;

    let app = App::parse();

    match app.command {
        SubCommands::Parse(options) => crate::parse::run(options, app.global).await,
        SubCommands::Reconcile(options) => crate::reconcile::run(options, app.global).await,
        SubCommands::Align(options) => crate::align::run(options, app.global).await,
        SubCommands::Vocab(options) => crate::vocab::run(options, app.global).await,
    }
    .map_err(|err: color_eyre::eyre::Report| eyre!(err))
}
