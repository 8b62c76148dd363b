use std::path::Path;
use std::process::ExitCode;

use tracing::{error, info};

use docportal::access::validate_admin_password;
use docportal::{hash_password, AppState, ApplicantRepository, Config, Database, WebServer};

const DEFAULT_CONFIG_PATH: &str = "config.toml";

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  docportal [CONFIG]              Run the server (default config: {DEFAULT_CONFIG_PATH})");
    eprintln!("  docportal hash-password <PASS>  Print an Argon2 hash for admin.password_hash");
}

fn hash_password_command(password: Option<String>) -> ExitCode {
    let Some(password) = password else {
        print_usage();
        return ExitCode::FAILURE;
    };
    if let Err(e) = validate_admin_password(&password) {
        eprintln!("Error: {e}");
        return ExitCode::FAILURE;
    }
    match hash_password(&password) {
        Ok(hash) => {
            println!("{hash}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: &str) -> Config {
    let mut config = match Config::load(path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load {path}: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };
    config.apply_env_overrides();
    config
}

async fn serve(config: Config) -> docportal::Result<()> {
    config.validate()?;

    let db = Database::open(&config.database.path).await?;
    let state = AppState::from_config(db, &config, Path::new("."))?;

    let records = ApplicantRepository::new(state.db.pool()).count().await?;
    info!(records, "Applicant records loaded");

    if state.admin.is_none() {
        info!("No admin account configured; admin login is disabled");
    }
    info!(
        upload_dir = %config.storage.upload_dir,
        max_upload_mb = config.storage.max_upload_size_mb,
        "File storage ready"
    );

    let server = WebServer::new(&config.server, state, &config.web.cors_origins)?;
    server.run().await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let mut args = std::env::args().skip(1);
    let first = args.next();

    match first.as_deref() {
        Some("hash-password") => return hash_password_command(args.next()),
        Some("-h") | Some("--help") => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        _ => {}
    }

    let config = load_config(first.as_deref().unwrap_or(DEFAULT_CONFIG_PATH));

    // Initialize logging
    if let Err(e) = docportal::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        docportal::logging::init_console_only(&config.logging.level);
    }

    info!("docportal - applicant document portal");
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    match serve(config).await {
        Ok(()) => {
            info!("Server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Fatal error: {e}");
            ExitCode::FAILURE
        }
    }
}
