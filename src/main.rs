use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;

use consent_portal_lib::api::{HttpPortalApi, SharedApi};
use consent_portal_lib::config::{self, PortalConfig};
use consent_portal_lib::consent_flow::ConsentManager;
use consent_portal_lib::models::{ConsentPurpose, StatusFilter};
use consent_portal_lib::resources::{
    ConsentsResource, PatientDetailResource, PatientQuery, PatientsResource, StatsResource,
    TransactionsResource,
};
use consent_portal_lib::views::{
    ConsentListView, PatientDetailView, PatientListView, Screen, StatsView, TransactionListView,
};
use consent_portal_lib::wallet::{DisconnectedWallet, LocalWallet, WalletSigner};

#[derive(Parser)]
#[command(
    name = "consent-portal",
    about = "Browse patients and records, manage signed consents, and review transactions",
    version,
    arg_required_else_help = true
)]
struct Cli {
    /// Backend base URL (overrides CONSENT_PORTAL_API_URL).
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Print the view as JSON instead of text.
    #[arg(long, global = true, action = ArgAction::SetTrue)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List patients, one page at a time.
    Patients {
        #[arg(long, default_value_t = 1)]
        page: u32,
        /// Filter by name.
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one patient with their medical records.
    Patient { id: String },

    /// List consents, newest first.
    Consents {
        /// all, pending or active.
        #[arg(long, default_value = "all")]
        status: StatusFilter,
        #[arg(long, value_name = "ID")]
        patient: Option<String>,
    },

    /// Sign and create a consent with the local wallet.
    CreateConsent {
        #[arg(long, value_name = "ID")]
        patient: String,
        /// One of the fixed purposes, e.g. "Research Study Participation".
        #[arg(long)]
        purpose: ConsentPurpose,
    },

    /// Activate a pending consent.
    Activate {
        id: String,
        /// Anchoring transaction hash; a placeholder is used when omitted.
        #[arg(long)]
        tx_hash: Option<String>,
    },

    /// Show recent transactions.
    Transactions {
        #[arg(long, conflicts_with = "mine")]
        wallet: Option<String>,
        /// Only transactions touching the local wallet.
        #[arg(long, action = ArgAction::SetTrue)]
        mine: bool,
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Show platform statistics.
    Stats,

    /// Print the local wallet address, creating the key on first use.
    Wallet,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    consent_portal_lib::init_tracing();

    let mut config = PortalConfig::from_env().context("Invalid configuration")?;
    if let Some(url) = cli.api_url {
        config.api_base_url = url;
    }

    let api: SharedApi = Arc::new(
        HttpPortalApi::from_config(&config).context("Cannot create API client")?,
    );
    tracing::debug!(api = %config.api_base_url, "{} ready", config::APP_NAME);

    match cli.command {
        Commands::Patients { page, search } => {
            let query = PatientQuery {
                page,
                search: search.unwrap_or_default(),
                ..PatientQuery::default()
            };
            let patients = PatientsResource::with_query(api, query);
            patients.load().await;
            print_screen(PatientListView::build(&patients), cli.json)
        }
        Commands::Patient { id } => {
            let detail = PatientDetailResource::new(api, id);
            detail.load().await;
            print_screen(PatientDetailView::build(&detail), cli.json)
        }
        Commands::Consents { status, patient } => {
            let consents = ConsentsResource::new(api, patient, status);
            consents.load().await;
            print_screen(ConsentListView::build(&consents), cli.json)
        }
        Commands::CreateConsent { patient, purpose } => {
            let wallet = load_wallet(&config)?;
            let manager = ConsentManager::new(
                ConsentsResource::new(api, Some(patient.clone()), StatusFilter::All),
                Arc::new(wallet),
            );
            manager.set_patient_id(patient);
            manager.set_purpose(Some(purpose));
            let created = manager.submit().await?;
            println!("Created consent {} ({})", created.id, created.status);
            print_screen(ConsentListView::build(manager.consents()), cli.json)
        }
        Commands::Activate { id, tx_hash } => {
            let manager = ConsentManager::new(
                ConsentsResource::new(api, None, StatusFilter::All),
                Arc::new(DisconnectedWallet),
            );
            let updated = manager.activate(&id, tx_hash.as_deref()).await?;
            println!("Consent {} is now {}", updated.id, updated.status);
            Ok(())
        }
        Commands::Transactions {
            wallet,
            mine,
            limit,
        } => {
            let wallet = if mine {
                load_wallet(&config)?.account()
            } else {
                wallet
            };
            let limit = limit.unwrap_or(config.transactions_limit);
            let transactions = TransactionsResource::new(api, wallet, limit);
            transactions.load().await;
            print_screen(TransactionListView::build(&transactions), cli.json)
        }
        Commands::Stats => {
            let stats = StatsResource::new(api);
            stats.load().await;
            print_screen(StatsView::build(&stats), cli.json)
        }
        Commands::Wallet => {
            let wallet = load_wallet(&config)?;
            println!("{}", wallet.address());
            Ok(())
        }
    }
}

fn load_wallet(config: &PortalConfig) -> Result<LocalWallet> {
    let path = config.require_wallet_key_path()?;
    LocalWallet::load_or_create(&path)
        .with_context(|| format!("Cannot open wallet key {}", path.display()))
}

/// Print a screen; an error screen also makes the process exit non-zero.
fn print_screen<T>(screen: Screen<T>, json: bool) -> Result<()>
where
    T: std::fmt::Display + Serialize,
{
    if json {
        println!("{}", serde_json::to_string_pretty(&screen)?);
    } else {
        print!("{screen}");
        if !matches!(screen, Screen::Ready(_)) {
            println!();
        }
    }
    if let Screen::Error(message) = screen {
        anyhow::bail!(message);
    }
    Ok(())
}
