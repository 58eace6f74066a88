//! Input gathering: snapshot, roster, received listing, and overrides, each
//! from a local file or its remote source.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, bail};
use clap::Args;
use foilstatus_core::{CanonicalDb, ExternalRecord, ManualOverrides, ReceivedReport};
use foilstatus_sync::DriveClient;
use foilstatus_sync::http::DEFAULT_API_BASE;
use tracing::info;

const DEFAULT_SHEET_URL: &str = "https://docs.google.com/spreadsheets/d/1VoCHoMXiR5OHhoYrwaIJxGPwKiLpYT8et3fux13cfGo/export?format=csv&gid=1431660392";
const DEFAULT_DRIVE_FOLDER: &str = "1GiTvSKGMh--3llPxYJq_qIbTlPk-O7Z2";

#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Canonical officer/complaint snapshot (JSON).
    #[arg(long, env = "FOILSTATUS_MAPPING", default_value = "foil-status-mapping.json")]
    pub mapping: PathBuf,

    /// Local roster CSV; the tracking sheet is downloaded when omitted.
    #[arg(long)]
    pub roster: Option<PathBuf>,

    /// Tracking-sheet CSV export URL.
    #[arg(long, env = "FOILSTATUS_SHEET_URL", default_value = DEFAULT_SHEET_URL)]
    pub sheet_url: String,

    /// Local received-report listing (JSON array of {batch_id, complaint_id});
    /// the file API is queried when omitted.
    #[arg(long)]
    pub received: Option<PathBuf>,

    /// Root folder holding one sub-folder per FOIL batch.
    #[arg(long, env = "FOILSTATUS_DRIVE_FOLDER", default_value = DEFAULT_DRIVE_FOLDER)]
    pub drive_folder: String,

    #[arg(long, env = "FOILSTATUS_DRIVE_BASE", default_value = DEFAULT_API_BASE)]
    pub drive_base: String,

    /// File API key, required unless --received is given.
    #[arg(long, env = "DRIVE_API_KEY", hide_env_values = true)]
    pub drive_api_key: Option<String>,

    /// Extra identity overrides (JSON object of "LAST:FIRST:SHIELD": "officer id").
    #[arg(long)]
    pub overrides: Option<PathBuf>,

    /// Start from an empty override table instead of the curated one.
    #[arg(long)]
    pub no_curated_overrides: bool,
}

/// Where received reports come from, decided before anything is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReceivedSource {
    File(PathBuf),
    Drive {
        base_url: String,
        folder_id: String,
        api_key: String,
    },
}

impl InputArgs {
    /// Fails when the listing has to be fetched and no API key is configured.
    pub fn received_source(&self) -> anyhow::Result<ReceivedSource> {
        if let Some(path) = &self.received {
            return Ok(ReceivedSource::File(path.clone()));
        }
        match self.drive_api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => Ok(ReceivedSource::Drive {
                base_url: self.drive_base.clone(),
                folder_id: self.drive_folder.clone(),
                api_key: key.to_string(),
            }),
            _ => bail!(
                "no DRIVE_API_KEY defined, cannot load reports; set it in .env, the environment, \
                 or pass --received with a local listing"
            ),
        }
    }
}

pub struct Inputs {
    pub db: CanonicalDb,
    pub roster: Vec<ExternalRecord>,
    pub received: Vec<ReceivedReport>,
    pub overrides: ManualOverrides,
}

/// Load every input. All fatal conditions surface here, before reconciliation.
pub async fn load_inputs(args: &InputArgs) -> anyhow::Result<Inputs> {
    load(args, true).await
}

/// Load what officer matching needs; the received listing is left empty.
pub async fn load_matching_inputs(args: &InputArgs) -> anyhow::Result<Inputs> {
    load(args, false).await
}

async fn load(args: &InputArgs, with_received: bool) -> anyhow::Result<Inputs> {
    let start = Instant::now();
    let received_source = if with_received {
        Some(args.received_source()?)
    } else {
        None
    };

    let db = foilstatus_sync::load_snapshot(&args.mapping)
        .with_context(|| format!("loading snapshot {}", args.mapping.display()))?;

    let mut overrides = if args.no_curated_overrides {
        ManualOverrides::empty()
    } else {
        ManualOverrides::curated()
    };
    if let Some(path) = &args.overrides {
        foilstatus_sync::load_overrides(path, &mut overrides)
            .with_context(|| format!("loading overrides {}", path.display()))?;
    }

    let received = match received_source {
        None => Vec::new(),
        Some(ReceivedSource::File(path)) => foilstatus_sync::load_received(&path)
            .with_context(|| format!("loading received listing {}", path.display()))?,
        Some(ReceivedSource::Drive {
            base_url,
            folder_id,
            api_key,
        }) => DriveClient::new(base_url, api_key)
            .fetch_received_reports(&folder_id)
            .await
            .context("listing received closing reports")?,
    };

    let roster = match &args.roster {
        Some(path) => foilstatus_sync::load_roster(path)
            .with_context(|| format!("loading roster {}", path.display()))?,
        None => foilstatus_sync::fetch_roster(&reqwest::Client::new(), &args.sheet_url)
            .await
            .context("downloading roster")?,
    };

    info!(
        officers = db.officers.len(),
        complaints = db.complaints.len(),
        roster = roster.len(),
        received = received.len(),
        overrides = overrides.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "inputs loaded"
    );

    Ok(Inputs {
        db,
        roster,
        received,
        overrides,
    })
}
