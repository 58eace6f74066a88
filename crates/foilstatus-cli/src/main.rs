mod display;
mod inputs;

use clap::{Args, Parser, Subcommand, ValueEnum};
use foilstatus_core::{ComplaintOrder, ReconcileOptions, Report, reconcile};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use crate::inputs::{InputArgs, load_inputs, load_matching_inputs};

#[derive(Parser)]
#[command(name = "foilstatus", version, about = "Closing-report status for FOIL-requested officers")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Reconcile the roster and print received/waiting status per officer and per FOIL batch.
    Report(ReportArgs),
    /// List roster rows that match no officer, or more than one.
    Unmatched {
        #[command(flatten)]
        inputs: InputArgs,
    },
}

#[derive(Args)]
struct ReportArgs {
    #[command(flatten)]
    inputs: InputArgs,

    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,

    /// Complaint order within each officer and batch listing.
    #[arg(long, value_enum, default_value_t = Order::Asc)]
    listing_order: Order,

    /// Complaint order of the global complaint table (JSON output).
    #[arg(long, value_enum, default_value_t = Order::Desc)]
    all_order: Order,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum Order {
    Asc,
    Desc,
}

impl From<Order> for ComplaintOrder {
    fn from(order: Order) -> Self {
        match order {
            Order::Asc => ComplaintOrder::Ascending,
            Order::Desc => ComplaintOrder::Descending,
        }
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    generated_at: &'a str,
    #[serde(flatten)]
    report: &'a Report,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::info!("foilstatus v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Report(args) => cmd_report(args).await,
        Command::Unmatched { inputs } => cmd_unmatched(inputs).await,
    }
}

async fn cmd_report(args: ReportArgs) -> anyhow::Result<()> {
    let inputs = load_inputs(&args.inputs).await?;
    let options = ReconcileOptions {
        officer_order: args.listing_order.into(),
        batch_order: args.listing_order.into(),
        all_order: args.all_order.into(),
    };
    let report = reconcile(
        &inputs.roster,
        &inputs.received,
        &inputs.db,
        &inputs.overrides,
        &options,
    );

    let generated_at = chrono::Utc::now().to_rfc3339();
    match args.format {
        Format::Text => print!("{}", display::render_report(&report, &generated_at)),
        Format::Json => {
            let output = JsonOutput {
                generated_at: &generated_at,
                report: &report,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

async fn cmd_unmatched(inputs: InputArgs) -> anyhow::Result<()> {
    let inputs = load_matching_inputs(&inputs).await?;
    let report = reconcile(
        &inputs.roster,
        &inputs.received,
        &inputs.db,
        &inputs.overrides,
        &ReconcileOptions::default(),
    );
    print!("{}", display::render_unmatched(&report));
    Ok(())
}
