use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use tsr_core::analytics::build_dashboard_payload;
use tsr_core::chain;
use tsr_core::db;
use tsr_core::demo;
use tsr_core::domain::{Incident, IncidentLocation, IncidentType, NewIncident};
use tsr_core::emergency::{contact_for, EmergencyService};
use tsr_core::error::AppError;
use tsr_core::evidence::{prepare_evidence, EvidenceUpload};
use tsr_core::lifecycle::{IncidentService, ServiceConfig};
use tsr_core::store::{IncidentStore, LocalStore, SqliteStore};

const DB_FILE_NAME: &str = "tsr.sqlite";

#[derive(Parser)]
#[command(name = "tsr")]
#[command(version)]
#[command(about = "Tourist safety incident reporting and ops review", long_about = None)]
struct Cli {
    /// Data directory for the incident stores
    #[arg(long, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Storage backend
    #[arg(long, value_enum, default_value_t = StoreKind::Local)]
    store: StoreKind,

    /// Actor name recorded on operator-initiated audit entries
    #[arg(long, default_value = "Ops Console")]
    actor: String,

    /// Print results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    Local,
    Sqlite,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the data directory (and database for the sqlite backend)
    Init,
    /// Seed the two illustrative demo incidents
    SeedDemo,
    /// List incidents, newest first
    List,
    /// Show one incident in full
    Show { id: String },
    /// Submit a new incident report
    Report {
        /// Incident category: theft, assault, medical, crowd, other
        #[arg(long = "type")]
        kind: String,
        /// Severity, 1-10
        #[arg(long)]
        severity: u8,
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
        #[arg(long)]
        address: Option<String>,
        #[arg(long, default_value = "")]
        notes: String,
        #[arg(long)]
        reporter: Option<String>,
        /// Evidence files to hash and attach, in order
        #[arg(long = "file", value_name = "PATH")]
        files: Vec<PathBuf>,
    },
    /// Mark a pending incident as acknowledged
    Acknowledge { id: String },
    /// Close an incident
    Resolve { id: String },
    /// Anchor the evidence bundle to the mock ledger
    Anchor {
        id: String,
        /// Skip the simulated ledger latency
        #[arg(long)]
        no_delay: bool,
    },
    /// Re-hash the evidence bundle and compare against the anchored hash
    Verify { id: String },
    /// Log a simulated emergency call against an incident
    Call {
        id: String,
        /// police, hospital, or fire
        #[arg(long, default_value = "police")]
        service: String,
    },
    /// Dashboard aggregates over the incident collection
    Stats,
    /// Print an incident's audit log
    Audit { id: String },
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tsr")
}

fn build_store(kind: StoreKind, data_dir: &Path) -> Result<Box<dyn IncidentStore>, AppError> {
    match kind {
        StoreKind::Local => Ok(Box::new(LocalStore::new(data_dir))),
        StoreKind::Sqlite => {
            fs::create_dir_all(data_dir).map_err(|e| {
                AppError::new("CLI_DATA_DIR_FAILED", "Failed to create data directory")
                    .with_details(format!("path={}: {}", data_dir.display(), e))
            })?;
            let mut conn = db::open(&data_dir.join(DB_FILE_NAME))?;
            db::migrate(&mut conn)?;
            Ok(Box::new(SqliteStore::new(conn)))
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

fn guess_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain",
        _ => "application/octet-stream",
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value).map_err(|e| {
        AppError::new("CLI_ENCODE_FAILED", "Failed to encode output as JSON")
            .with_details(e.to_string())
    })?;
    println!("{text}");
    Ok(())
}

fn print_incident_line(incident: &Incident) {
    println!(
        "{}  {:<8} sev {:>2} ({})  {:<12} anchor:{:<12} verify:{:<11} {}",
        incident.id,
        incident.incident_type.as_str(),
        incident.severity,
        incident.severity_bucket().label(),
        incident.status.as_str(),
        incident.anchor_status.as_str(),
        incident.verification_status.as_str(),
        incident.reported_at,
    );
}

fn print_incident(incident: &Incident, json: bool) -> Result<(), AppError> {
    if json {
        return print_json(incident);
    }

    print_incident_line(incident);
    if let Some(reporter) = &incident.reporter_name {
        println!("  reporter: {reporter}");
    }
    println!(
        "  location: {}, {}{}",
        incident.location.lat,
        incident.location.lng,
        incident
            .location
            .address
            .as_deref()
            .map(|a| format!(" ({a})"))
            .unwrap_or_default()
    );
    if !incident.notes.is_empty() {
        println!("  notes: {}", incident.notes);
    }
    for f in &incident.files {
        println!(
            "  file: {} ({}, {} bytes) sha256={}",
            f.name, f.mime_type, f.size_bytes, f.content_hash
        );
    }
    if let Some(tx) = &incident.chain_tx_id {
        println!("  tx: {tx}");
        println!("  explorer: {}", chain::explorer_url(tx));
    }
    if let Some(hash) = &incident.chain_hash {
        println!("  anchored hash: {hash}");
    }
    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run() {
        eprintln!("error: {err}");
        if let Some(details) = &err.details {
            eprintln!("  {details}");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let data_dir = cli.data_dir.clone().unwrap_or_else(default_data_dir);
    tracing::debug!(data_dir = %data_dir.display(), "resolved data directory");
    let mut store = build_store(cli.store, &data_dir)?;

    // Command-level knobs feed the service config once, up front.
    let anchor_delay = match &cli.command {
        Commands::Anchor { no_delay: true, .. } => Duration::ZERO,
        _ => ServiceConfig::default().anchor_delay,
    };
    let config = ServiceConfig {
        actor: cli.actor.clone(),
        anchor_delay,
        ..ServiceConfig::default()
    };

    match cli.command {
        Commands::Init => {
            fs::create_dir_all(&data_dir).map_err(|e| {
                AppError::new("CLI_DATA_DIR_FAILED", "Failed to create data directory")
                    .with_details(format!("path={}: {}", data_dir.display(), e))
            })?;
            println!("initialized {}", data_dir.display());
            Ok(())
        }
        Commands::SeedDemo => {
            let count = demo::seed_demo(store.as_mut())?;
            println!("seeded {count} demo incidents");
            Ok(())
        }
        Commands::List => {
            let mut svc = IncidentService::new(store, config);
            let incidents = svc.list_incidents()?;
            if cli.json {
                return print_json(&incidents);
            }
            for incident in &incidents {
                print_incident_line(incident);
            }
            Ok(())
        }
        Commands::Show { id } => {
            let mut svc = IncidentService::new(store, config);
            let incident = svc.get_incident(&id)?;
            print_incident(&incident, cli.json)
        }
        Commands::Report {
            kind,
            severity,
            lat,
            lng,
            address,
            notes,
            reporter,
            files,
        } => {
            let incident_type = IncidentType::parse(&kind)?;

            let mut uploads = Vec::new();
            for path in &files {
                let reader = fs::File::open(path).map_err(|e| {
                    AppError::new("CLI_FILE_OPEN_FAILED", "Failed to open evidence file")
                        .with_details(format!("path={}: {}", path.display(), e))
                })?;
                uploads.push(EvidenceUpload {
                    name: file_name(path),
                    mime_type: guess_mime(path).to_string(),
                    preview: None,
                    reader,
                });
            }
            let (evidence, warnings) = prepare_evidence(uploads);
            for w in &warnings {
                eprintln!("warning [{}] {}", w.code, w.message);
            }

            let mut svc = IncidentService::new(store, config);
            let incident = svc.create_incident(NewIncident {
                reporter_name: reporter,
                incident_type,
                severity,
                location: IncidentLocation { lat, lng, address },
                notes,
                files: evidence,
            })?;
            print_incident(&incident, cli.json)
        }
        Commands::Acknowledge { id } => {
            let mut svc = IncidentService::new(store, config);
            let incident = svc.acknowledge(&id)?;
            print_incident(&incident, cli.json)
        }
        Commands::Resolve { id } => {
            let mut svc = IncidentService::new(store, config);
            let incident = svc.resolve(&id)?;
            print_incident(&incident, cli.json)
        }
        Commands::Anchor { id, .. } => {
            let mut svc = IncidentService::new(store, config);
            let incident = svc.anchor_evidence(&id)?;
            print_incident(&incident, cli.json)
        }
        Commands::Verify { id } => {
            let mut svc = IncidentService::new(store, config);
            let incident = svc.verify_integrity(&id)?;
            if !cli.json {
                println!(
                    "verification: {}",
                    incident.verification_status.as_str()
                );
            }
            print_incident(&incident, cli.json)
        }
        Commands::Call { id, service } => {
            let service = EmergencyService::parse(&service)?;
            let contact = contact_for(service);
            let mut svc = IncidentService::new(store, config);
            let incident = svc.log_emergency_call(&id, &contact)?;
            if !cli.json {
                println!("logged call to {} ({})", contact.name, contact.number);
            }
            print_incident(&incident, cli.json)
        }
        Commands::Stats => {
            let mut svc = IncidentService::new(store, config);
            let incidents = svc.list_incidents()?;
            let payload = build_dashboard_payload(&incidents);
            if cli.json {
                return print_json(&payload);
            }
            println!("incidents: {}", payload.incident_count);
            println!(
                "status: pending {} / acknowledged {} / resolved {}",
                payload.status_counts.pending,
                payload.status_counts.acknowledged,
                payload.status_counts.resolved
            );
            println!("anchored: {}", payload.anchored_count);
            for bucket in &payload.severity_mix {
                println!("severity {}: {}", bucket.label, bucket.count);
            }
            for bucket in &payload.type_mix {
                println!("type {}: {}", bucket.label, bucket.count);
            }
            Ok(())
        }
        Commands::Audit { id } => {
            let mut svc = IncidentService::new(store, config);
            let incident = svc.get_incident(&id)?;
            if cli.json {
                return print_json(&incident.audit_log);
            }
            for entry in &incident.audit_log {
                match &entry.details {
                    Some(details) => println!(
                        "{}  {}  ({})  {}",
                        entry.timestamp, entry.action, entry.actor, details
                    ),
                    None => println!("{}  {}  ({})", entry.timestamp, entry.action, entry.actor),
                }
            }
            Ok(())
        }
    }
}
