use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use servease_client::auth::{CredentialStore, FileCredentialStore, SessionObserver};
use servease_client::config::{Command, Config};
use servease_client::models::CreateBookingRequest;
use servease_client::services::{AuthService, BookingService, CatalogService, ServiceQuery};
use servease_client::GatewayClient;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let (config, command) = Config::load()?;

    // Initialize logging with a configured level
    let log_level = config.log_level.to_lowercase();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_level));

    // stdout carries command output, logs go to stderr
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if config.log_json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    tracing::debug!(
        api_url = %config.api_url,
        token_file = %config.token_file.display(),
        "Configuration loaded"
    );

    let store: Arc<dyn CredentialStore> =
        Arc::new(FileCredentialStore::new(config.token_file.clone()));
    let client = GatewayClient::from_config(&config, store)?;

    // Held for the whole run, so the observer is cleared on the way out
    let observer: Arc<dyn SessionObserver> = Arc::new(|| {
        tracing::warn!("Session expired, run `servease sign-in` to authenticate again");
    });
    let _session = client.observe_session(observer);

    execute(&client, command).await
}

async fn execute(client: &GatewayClient, command: Command) -> Result<()> {
    let auth = AuthService::new(client.clone());
    let catalog = CatalogService::new(client.clone());
    let bookings = BookingService::new(client.clone());

    match command {
        Command::SignIn { email, password } => {
            let response = auth.sign_in(&email, &password).await?;
            print_json(&response)?;
            if response.requires_two_factor() {
                eprintln!(
                    "A verification code was sent. Finish with `servease verify --email {} --code <CODE>`",
                    email.trim()
                );
            }
        }
        Command::Verify { email, code } => {
            let response = auth.verify_2fa(&email, &code).await?;
            match response.access_token {
                Some(_) => eprintln!("Signed in."),
                None => eprintln!(
                    "{}",
                    response
                        .message
                        .as_deref()
                        .unwrap_or("Verification did not return a session.")
                ),
            }
        }
        Command::SignOut => {
            auth.sign_out().await?;
            eprintln!("Signed out.");
        }
        Command::Profile => {
            let profile = auth.profile().await?;
            eprintln!("Signed in as {}", profile.display_name());
            print_json(&profile)?;
        }
        Command::Services { limit, category } => {
            let query = ServiceQuery {
                limit,
                category_id: category,
            };
            print_json(&catalog.services(&query).await?)?;
        }
        Command::Service { id } => {
            print_json(&catalog.service(&id).await?)?;
        }
        Command::Categories => {
            print_json(&catalog.categories().await?)?;
        }
        Command::Providers { limit } => {
            print_json(&catalog.providers(limit).await?)?;
        }
        Command::Bookings => {
            print_json(&bookings.list().await?)?;
        }
        Command::Book {
            service,
            schedule,
            address,
        } => {
            let schedule = DateTime::parse_from_rfc3339(&schedule)
                .with_context(|| format!("Invalid schedule '{}', expected RFC 3339", schedule))?
                .with_timezone(&Utc);
            let request = CreateBookingRequest {
                service_id: service,
                schedule,
                address,
            };
            print_json(&bookings.create(&request).await?)?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("Failed to render output")?;
    println!("{}", rendered);
    Ok(())
}
