use std::io::Read;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use billcheck_core::constants::{BILL_YEAR_MAX_ENV, BILL_YEAR_MIN_ENV, STORAGE_ID_FIELD_ENV};
use billcheck_core::records::{admin_user_document, bill_document};
use billcheck_core::{
    CoreConfig, Document, DocumentNormalizer, generate_composite_bill_id, generate_id, is_valid_id,
};

#[derive(Parser)]
#[command(name = "billcheck")]
#[command(about = "billcheck identifier and record tooling")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a new identifier
    GenerateId,
    /// Check an identifier
    ValidateId {
        candidate: String,
    },
    /// Build a composite bill id
    GenerateBillId {
        /// Customer code prefix
        customer_code: String,
        /// Billing cycle (MM/YYYY); falls back to the current month if malformed
        billing_cycle: String,
    },
    /// Check a composite bill id against the configured year window
    ValidateBillId {
        candidate: String,
    },
    /// Prepare a JSON document for writing
    Prepare {
        /// JSON object, or '-' to read stdin
        json: String,
    },
    /// Clean a JSON document, or an array of documents, read from storage
    Clean {
        /// JSON object or array, or '-' to read stdin
        json: String,
    },
    /// Print a prepared bill record
    Bill {
        customer_code: String,
        /// Billing cycle (MM/YYYY)
        billing_cycle: String,
        /// Extra fields as a JSON object
        #[arg(long)]
        fields: Option<String>,
    },
    /// Print a prepared admin user record
    SeedAdmin {
        email: String,
        name: String,
    },
}

/// Entry point for the billcheck operator CLI.
///
/// # Environment Variables
/// - `BILLCHECK_STORAGE_ID_FIELD`: storage identifier field stripped from documents (default: "_id")
/// - `BILLCHECK_BILL_YEAR_MIN` / `BILLCHECK_BILL_YEAR_MAX`: accepted two-digit bill years
///   (default: 24 and 29)
/// - `RUST_LOG`: log filter (default: "billcheck=info")
fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("billcheck=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = CoreConfig::from_env_values(
        std::env::var(STORAGE_ID_FIELD_ENV).ok(),
        std::env::var(BILL_YEAR_MIN_ENV).ok(),
        std::env::var(BILL_YEAR_MAX_ENV).ok(),
    )
    .context("invalid billcheck configuration")?;
    tracing::debug!(?config, "resolved configuration");

    let normalizer = DocumentNormalizer::new(config);

    match cli.command {
        Commands::GenerateId => {
            println!("{}", generate_id());
        }
        Commands::ValidateId { candidate } => {
            return Ok(report_validity(is_valid_id(&candidate)));
        }
        Commands::GenerateBillId {
            customer_code,
            billing_cycle,
        } => {
            println!("{}", generate_composite_bill_id(&customer_code, &billing_cycle));
        }
        Commands::ValidateBillId { candidate } => {
            return Ok(report_validity(normalizer.is_valid_bill_id(&candidate)));
        }
        Commands::Prepare { json } => {
            let doc: Document = serde_json::from_str(&read_input(&json)?)
                .context("input must be a JSON object")?;
            let prepared = normalizer.prepare_document(doc)?;
            print_json(&prepared)?;
        }
        Commands::Clean { json } => {
            let value: serde_json::Value =
                serde_json::from_str(&read_input(&json)?).context("input must be JSON")?;
            match value {
                serde_json::Value::Array(items) => {
                    let docs = items
                        .into_iter()
                        .map(Document::from_value)
                        .collect::<Result<Vec<_>, _>>()?;
                    print_json(&normalizer.clean_list_response(docs)?)?;
                }
                other => {
                    let cleaned = normalizer.clean_response(Document::from_value(other)?)?;
                    print_json(&cleaned)?;
                }
            }
        }
        Commands::Bill {
            customer_code,
            billing_cycle,
            fields,
        } => {
            let fields = match fields {
                Some(raw) => serde_json::from_str(&raw).context("--fields must be a JSON object")?,
                None => serde_json::Map::new(),
            };
            let doc = bill_document(&normalizer, &customer_code, &billing_cycle, fields)?;
            print_json(&doc)?;
        }
        Commands::SeedAdmin { email, name } => {
            let doc = admin_user_document(&normalizer, &email, &name)?;
            tracing::info!(id = doc.id().unwrap_or_default(), "prepared admin user");
            print_json(&doc)?;
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn report_validity(valid: bool) -> ExitCode {
    if valid {
        println!("valid");
        ExitCode::SUCCESS
    } else {
        println!("invalid");
        ExitCode::FAILURE
    }
}

fn read_input(arg: &str) -> anyhow::Result<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }

    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read stdin")?;
    Ok(buf)
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
