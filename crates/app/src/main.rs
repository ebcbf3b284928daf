use std::{net::SocketAddr, path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use migration::{Migrator, MigratorTrait};
use notifier::{AlertDispatcher, EmailNotifier, TelegramNotifier};
use settings::Database;

mod settings;

#[derive(Parser, Debug)]
#[command(name = "budgetify")]
#[command(about = "Budget limits and threshold alerts server")]
struct Cli {
    /// Settings file; a missing file is not an error.
    #[arg(long, default_value = "config/budgetify.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = settings::Settings::new(&cli.config)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "budgetify={level},server={level},engine={level},notifier={level}",
            level = settings.app.level
        ))
        .init();

    let Some(server) = settings.server else {
        tracing::warn!("no server settings found, nothing to run");
        return Ok(());
    };

    tracing::info!("Found server settings...");
    let db = parse_database(&server.database).await?;
    let engine = Arc::new(
        engine::Engine::builder()
            .database(db.clone())
            .build()
            .await?,
    );
    let dispatcher = Arc::new(build_dispatcher(&settings.alerts, Arc::clone(&engine)));

    let bind = server.bind.unwrap_or_else(|| "127.0.0.1".to_string());
    let addr: SocketAddr = format!("{}:{}", bind, server.port).parse()?;

    let state = server::ServerState {
        engine,
        dispatcher,
        db,
    };
    server::run(state, addr).await;

    Ok(())
}

fn build_dispatcher(alerts: &settings::Alerts, engine: Arc<engine::Engine>) -> AlertDispatcher {
    let mut builder =
        AlertDispatcher::builder(engine).timeout(Duration::from_secs(alerts.timeout_secs));

    match &alerts.telegram {
        Some(telegram) => {
            tracing::info!("Telegram alerts enabled");
            builder = builder.notifier(Arc::new(TelegramNotifier::new(&telegram.token)));
        }
        None => tracing::info!("no telegram settings, telegram alerts disabled"),
    }
    match &alerts.email {
        Some(email) => {
            tracing::info!("Email alerts enabled");
            builder = builder.notifier(Arc::new(EmailNotifier::new(
                reqwest::Client::new(),
                email.clone(),
            )));
        }
        None => tracing::info!("no email settings, email alerts disabled"),
    }

    builder.build()
}

async fn parse_database(
    config: &settings::Database,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    let url = match config {
        Database::Memory => String::from("sqlite::memory:"),
        Database::Sqlite(path) => format!("sqlite:{}?mode=rwc", path),
    };

    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
