//! VetPro CLI: clinic management from the terminal.
//!
//! Without `AUTH_URL`/`DATABASE_URL` every command runs against the demo clinic, stored under
//! `DEMO_STORAGE_PATH`. With them and `AUTH_EMAIL`/`AUTH_PASSWORD`, commands run against the
//! signed-in user's clinic.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use uuid::Uuid;
use vetpro_cli::{init_tracing, parse_time, user_message, PromptConfirmation};
use vetpro_core::models::{
    AppointmentForm, AppointmentStatus, ClientForm, MedicalRecordForm, PetForm, PetGender,
    StatusFilter, Tenant,
};
use vetpro_core::Config;
use vetpro_gateway::{GatewayFactory, SettingsGateway, TenantScoped};
use vetpro_services::{
    AppointmentService, ClientService, DashboardService, MedicalRecordService, PetService,
    SettingsService, TenantContext,
};
use vetpro_session::{
    AuthProvider, EmptyDirectory, GoTrueClient, InMemoryAuthProvider, PgTenantDirectory,
    ResolverState, TenantDirectory, TenantResolver,
};

#[derive(Parser)]
#[command(name = "vetpro", about = "VetPro clinic management CLI")]
struct Cli {
    /// Do not ask before deleting
    #[arg(long, short = 'y', global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account on the authentication service
    Signup {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
    },
    #[command(flatten)]
    Clinic(ClinicCommands),
}

/// Commands that run against the resolved clinic.
#[derive(Subcommand)]
enum ClinicCommands {
    /// Show the active clinic and backend
    Whoami,
    /// Pet owners
    Clients {
        #[command(subcommand)]
        sub: ClientCommands,
    },
    /// Patients
    Pets {
        #[command(subcommand)]
        sub: PetCommands,
    },
    /// Appointment schedule
    Appointments {
        #[command(subcommand)]
        sub: AppointmentCommands,
    },
    /// Medical history
    Records {
        #[command(subcommand)]
        sub: RecordCommands,
    },
    /// Clinic settings
    Settings {
        #[command(subcommand)]
        sub: SettingsCommands,
    },
    /// Today's stats and upcoming appointments
    Dashboard,
    /// WhatsApp link with a quote for a pet's owner
    Budget {
        #[arg(long)]
        pet: Uuid,
        /// Estimated total, in the clinic's currency
        #[arg(long)]
        total: f64,
    },
}

#[derive(Args)]
struct ClientArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    address: Option<String>,
}

impl From<ClientArgs> for ClientForm {
    fn from(args: ClientArgs) -> Self {
        ClientForm {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            phone: args.phone,
            address: args.address,
        }
    }
}

#[derive(Subcommand)]
enum ClientCommands {
    List {
        /// Match on name, email or phone
        #[arg(long)]
        search: Option<String>,
    },
    Create(ClientArgs),
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: ClientArgs,
    },
    /// Delete a client with their pets, appointments and records
    Delete { id: Uuid },
}

#[derive(Args)]
struct PetArgs {
    /// Owner id
    #[arg(long)]
    client: Uuid,
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    species: String,
    #[arg(long)]
    breed: Option<String>,
    /// Years
    #[arg(long)]
    age: Option<String>,
    /// Kilograms
    #[arg(long)]
    weight: Option<String>,
    /// M or F
    #[arg(long)]
    gender: Option<PetGender>,
    #[arg(long)]
    photo_url: Option<String>,
}

impl From<PetArgs> for PetForm {
    fn from(args: PetArgs) -> Self {
        PetForm {
            client_id: Some(args.client),
            name: args.name,
            species: args.species,
            breed: args.breed,
            age: args.age,
            weight: args.weight,
            gender: args.gender,
            photo_url: args.photo_url,
        }
    }
}

#[derive(Subcommand)]
enum PetCommands {
    List {
        /// Match on pet or owner name
        #[arg(long)]
        search: Option<String>,
        /// Only pets of this client
        #[arg(long)]
        client: Option<Uuid>,
    },
    Create(PetArgs),
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: PetArgs,
    },
    /// Delete a pet with its appointments and records
    Delete { id: Uuid },
}

#[derive(Args)]
struct AppointmentArgs {
    #[arg(long)]
    client: Uuid,
    #[arg(long)]
    pet: Uuid,
    /// YYYY-MM-DD, clinic local date
    #[arg(long)]
    date: NaiveDate,
    /// HH:MM, clinic local time
    #[arg(long, value_parser = parse_time)]
    time: NaiveTime,
    #[arg(long, default_value = "")]
    reason: String,
    #[arg(long)]
    notes: Option<String>,
    #[arg(long)]
    status: Option<AppointmentStatus>,
    #[arg(long)]
    veterinarian: Option<Uuid>,
}

impl From<AppointmentArgs> for AppointmentForm {
    fn from(args: AppointmentArgs) -> Self {
        AppointmentForm {
            client_id: Some(args.client),
            pet_id: Some(args.pet),
            date: Some(args.date),
            time: Some(args.time),
            reason: args.reason,
            notes: args.notes,
            status: args.status,
            veterinarian_id: args.veterinarian,
        }
    }
}

#[derive(Subcommand)]
enum AppointmentCommands {
    List {
        /// all, pending, confirmed, completed or cancelled
        #[arg(long, default_value = "all")]
        status: StatusFilter,
    },
    Create(AppointmentArgs),
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: AppointmentArgs,
    },
    /// Set any status
    Status { id: Uuid, status: AppointmentStatus },
    /// Mark as confirmed
    Confirm { id: Uuid },
    Delete { id: Uuid },
    /// WhatsApp reminder link for the client
    Remind { id: Uuid },
}

#[derive(Args)]
struct RecordArgs {
    #[arg(long)]
    pet: Uuid,
    #[arg(long)]
    diagnosis: String,
    #[arg(long)]
    treatment: String,
    #[arg(long)]
    symptoms: Option<String>,
    /// Repeat for several attachments
    #[arg(long = "attachment")]
    attachments: Vec<String>,
    #[arg(long)]
    veterinarian: Option<Uuid>,
}

impl From<RecordArgs> for MedicalRecordForm {
    fn from(args: RecordArgs) -> Self {
        MedicalRecordForm {
            pet_id: Some(args.pet),
            diagnosis: args.diagnosis,
            treatment: args.treatment,
            symptoms: args.symptoms,
            attachments: args.attachments,
            veterinarian_id: args.veterinarian,
        }
    }
}

#[derive(Subcommand)]
enum RecordCommands {
    /// Pets ordered by name, to pick whose history to open
    Pets {
        #[arg(long)]
        search: Option<String>,
    },
    /// History of one pet, newest first
    List { pet: Uuid },
    Create(RecordArgs),
    Update {
        id: Uuid,
        #[command(flatten)]
        fields: RecordArgs,
    },
    Delete { id: Uuid },
}

#[derive(Subcommand)]
enum SettingsCommands {
    Show,
    /// Change clinic settings; omitted fields keep their value
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        address: Option<String>,
        /// ISO 4217 code, e.g. ARS
        #[arg(long)]
        currency: Option<String>,
        /// IANA name, e.g. America/Argentina/Buenos_Aires
        #[arg(long)]
        timezone: Option<String>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

struct Backends {
    auth: Arc<dyn AuthProvider>,
    directory: Arc<dyn TenantDirectory>,
    factory: GatewayFactory,
}

async fn connect(config: &Config) -> anyhow::Result<Backends> {
    let store = vetpro_storage::create_snapshot_store(config)
        .await
        .context("Failed to open demo storage")?;

    if !config.live_mode_available() {
        tracing::info!("Auth service not configured, running in demo mode");
        return Ok(Backends {
            auth: Arc::new(InMemoryAuthProvider::new()),
            directory: Arc::new(EmptyDirectory),
            factory: GatewayFactory::local_only(store),
        });
    }

    let pool = vetpro_db::setup_database(config)
        .await
        .context("Failed to connect to the database")?;
    let auth = GoTrueClient::from_config(config)
        .context("Failed to create auth client")?
        .context("AUTH_URL is not set")?;

    Ok(Backends {
        auth: Arc::new(auth),
        directory: Arc::new(PgTenantDirectory::new(pool.clone())),
        factory: GatewayFactory::new(Some(pool), store),
    })
}

async fn resolve_tenant(resolver: &TenantResolver) -> anyhow::Result<Tenant> {
    resolver.start().await;
    match resolver.wait_resolved().await? {
        ResolverState::DemoTenant(tenant) | ResolverState::LiveTenant(tenant) => Ok(tenant),
        ResolverState::NoTenantAssigned { user_id } => {
            bail!("User {} has no clinic assigned. Ask an administrator to add you to one.", user_id)
        }
        ResolverState::Failed { reason } => bail!("Could not resolve the clinic: {}", reason),
        state => bail!("Tenant resolution did not finish: {:?}", state),
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = Config::from_env();
    init_tracing(config.as_ref().is_ok_and(Config::is_production));
    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.context("Invalid configuration")),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", user_message(&e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: Config) -> anyhow::Result<()> {
    let backends = connect(&config).await?;

    let command = match cli.command {
        Commands::Signup {
            email,
            password,
            name,
        } => {
            let session = backends
                .auth
                .sign_up(&email, &password, &name)
                .await
                .context("Sign up failed")?;
            return print_json(&serde_json::json!({
                "signed_in": session.is_some(),
                "user": session.map(|s| s.user),
            }));
        }
        Commands::Clinic(command) => command,
    };

    if let Some((email, password)) = config.sign_in_credentials() {
        backends
            .auth
            .sign_in_with_password(email, password)
            .await
            .context("Sign in failed")?;
    }

    let resolver = TenantResolver::new(backends.auth.clone(), backends.directory.clone());
    let resolved = resolve_tenant(&resolver).await;
    resolver.shutdown();
    let tenant = resolved?;

    let gateway = backends.factory.gateway_for(&tenant)?;
    let tenant = gateway.load_tenant(&tenant).await?;
    let ctx = TenantContext::new(tenant, gateway)?;
    let confirmation = PromptConfirmation {
        assume_yes: cli.yes,
    };

    match command {
        ClinicCommands::Whoami => {
            let session = backends.auth.current_session().await;
            print_json(&serde_json::json!({
                "mode": ctx.gateway().mode(),
                "user": session.map(|s| s.user),
                "tenant": ctx.tenant(),
            }))?;
        }
        ClinicCommands::Clients { sub } => {
            let service = ClientService::new(ctx);
            match sub {
                ClientCommands::List { search } => {
                    print_json(&service.list(search.as_deref()).await?)?
                }
                ClientCommands::Create(fields) => print_json(&service.create(fields.into()).await?)?,
                ClientCommands::Update { id, fields } => {
                    print_json(&service.update(id, fields.into()).await?)?
                }
                ClientCommands::Delete { id } => {
                    let outcome = service.delete(id, &confirmation).await?;
                    print_json(&serde_json::json!({ "outcome": outcome }))?
                }
            }
        }
        ClinicCommands::Pets { sub } => {
            let service = PetService::new(ctx);
            match sub {
                PetCommands::List {
                    client: Some(client),
                    ..
                } => print_json(&service.list_for_client(client).await?)?,
                PetCommands::List { search, .. } => {
                    print_json(&service.list(search.as_deref()).await?)?
                }
                PetCommands::Create(fields) => print_json(&service.create(fields.into()).await?)?,
                PetCommands::Update { id, fields } => {
                    print_json(&service.update(id, fields.into()).await?)?
                }
                PetCommands::Delete { id } => {
                    let outcome = service.delete(id, &confirmation).await?;
                    print_json(&serde_json::json!({ "outcome": outcome }))?
                }
            }
        }
        ClinicCommands::Appointments { sub } => {
            let service = AppointmentService::new(ctx);
            match sub {
                AppointmentCommands::List { status } => print_json(&service.list(status).await?)?,
                AppointmentCommands::Create(fields) => {
                    print_json(&service.create(fields.into()).await?)?
                }
                AppointmentCommands::Update { id, fields } => {
                    print_json(&service.update(id, fields.into()).await?)?
                }
                AppointmentCommands::Status { id, status } => {
                    print_json(&service.set_status(id, status).await?)?
                }
                AppointmentCommands::Confirm { id } => print_json(&service.confirm(id).await?)?,
                AppointmentCommands::Delete { id } => {
                    let outcome = service.delete(id, &confirmation).await?;
                    print_json(&serde_json::json!({ "outcome": outcome }))?
                }
                AppointmentCommands::Remind { id } => {
                    let link = service.reminder_link(id).await?;
                    print_json(&serde_json::json!({ "whatsapp_url": link }))?
                }
            }
        }
        ClinicCommands::Records { sub } => {
            let service = MedicalRecordService::new(ctx);
            match sub {
                RecordCommands::Pets { search } => {
                    print_json(&service.pet_picker(search.as_deref()).await?)?
                }
                RecordCommands::List { pet } => print_json(&service.history(pet).await?)?,
                RecordCommands::Create(fields) => {
                    print_json(&service.create(fields.into()).await?)?
                }
                RecordCommands::Update { id, fields } => {
                    print_json(&service.update(id, fields.into()).await?)?
                }
                RecordCommands::Delete { id } => {
                    let outcome = service.delete(id, &confirmation).await?;
                    print_json(&serde_json::json!({ "outcome": outcome }))?
                }
            }
        }
        ClinicCommands::Settings { sub } => {
            let service = SettingsService::new(ctx);
            match sub {
                SettingsCommands::Show => print_json(&service.load().await?)?,
                SettingsCommands::Update {
                    name,
                    phone,
                    address,
                    currency,
                    timezone,
                } => {
                    let mut form = service.form().await?;
                    if let Some(name) = name {
                        form.name = name;
                    }
                    if phone.is_some() {
                        form.phone = phone;
                    }
                    if address.is_some() {
                        form.address = address;
                    }
                    if let Some(currency) = currency {
                        form.currency = currency;
                    }
                    if let Some(timezone) = timezone {
                        form.timezone = timezone;
                    }
                    print_json(&service.update(form).await?)?
                }
            }
        }
        ClinicCommands::Dashboard => {
            let dashboard = DashboardService::new(ctx).load(Utc::now()).await?;
            print_json(&dashboard)?;
        }
        ClinicCommands::Budget { pet, total } => {
            let link = AppointmentService::new(ctx).budget_link(pet, total).await?;
            print_json(&serde_json::json!({ "whatsapp_url": link }))?;
        }
    }

    Ok(())
}
