use anyhow::Context;
use clap::{Parser, Subcommand};
use clinic_core::{
    db,
    dto::{CreatePatientReq, PatientRes},
    password::hash_password,
    repositories::patients::SqlitePatientRepository,
    ClinicConfig, PatientService,
};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "clinic")]
#[command(about = "Clinic management operator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database schema if it does not exist
    InitDb,
    /// List patients
    List {
        /// Number of patients to skip
        #[arg(long, default_value_t = 0)]
        skip: u32,
        /// Maximum number of patients to show
        #[arg(long)]
        limit: Option<u32>,
    },
    /// Show one patient as JSON
    Get {
        /// Patient id
        id: i64,
    },
    /// Register a patient
    CreatePatient {
        first_name: String,
        last_name: String,
        /// Contact email (must be unique)
        #[arg(long)]
        email: Option<String>,
    },
    /// Hash a password for the CLINIC_USERS credential list
    HashPassword {
        password: String,
    },
}

/// Loads configuration, opens the database and makes sure the schema exists.
async fn open() -> anyhow::Result<(ClinicConfig, PatientService)> {
    let cfg = ClinicConfig::from_env()?;
    let pool = db::connect(cfg.database_url())
        .await
        .with_context(|| format!("failed to open {}", cfg.database_url()))?;
    db::ensure_schema(&pool).await?;
    let service = PatientService::new(Arc::new(SqlitePatientRepository::new(
        pool,
        cfg.patient_list_max_limit(),
    )));
    Ok((cfg, service))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("No command given. Use --help to see available commands.");
        return Ok(());
    };

    match command {
        Commands::HashPassword { password } => {
            println!("{}", hash_password(&password));
        }
        Commands::InitDb => {
            let (cfg, _) = open().await?;
            println!("Schema ready at {}", cfg.database_url());
        }
        Commands::List { skip, limit } => {
            let (cfg, service) = open().await?;
            let limit = limit.unwrap_or(cfg.patient_list_max_limit());
            let patients = service.list(skip, limit).await?;
            if patients.is_empty() {
                println!("No patients found.");
            } else {
                for patient in patients {
                    println!(
                        "ID: {}, Name: {} {}, Email: {}",
                        patient.id,
                        patient.first_name,
                        patient.last_name,
                        patient.email.as_deref().unwrap_or("-")
                    );
                }
            }
        }
        Commands::Get { id } => {
            let (_, service) = open().await?;
            let patient = service.get(id).await?;
            println!("{}", serde_json::to_string_pretty(&PatientRes::from(patient))?);
        }
        Commands::CreatePatient {
            first_name,
            last_name,
            email,
        } => {
            let (_, service) = open().await?;
            let patient = service
                .create(CreatePatientReq {
                    first_name,
                    last_name,
                    email,
                    ..Default::default()
                })
                .await?;
            println!("Created patient with ID: {}", patient.id);
        }
    }

    Ok(())
}
