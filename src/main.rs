use donation_buddy::{
    bot::{self, BotData},
    config,
    core::mailer::Mailer,
    errors::{Error, Result},
};
use dotenvy::dotenv;
use std::env;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; env vars can also be set externally
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 3. Load config.toml (falls back to defaults)
    let settings = config::settings::load_default_settings()
        .inspect_err(|e| error!("Failed to load settings: {e}"))?;

    // 4. Connect and make sure the schema exists
    let database = config::database::create_connection()
        .await
        .inspect_err(|e| error!("Failed to connect to database: {e}"))?;
    config::database::create_tables(&database)
        .await
        .inspect(|()| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {e}"))?;

    let mailer = Mailer::new(settings.mail.endpoint.clone());
    if !mailer.is_enabled() {
        info!("No mail service configured, email receipts are disabled.");
    }
    let admins = config::users::get_bootstrap_admins();
    info!(count = admins.len(), "Loaded bootstrap admins");

    // 5. Run the bot
    let token = env::var("DISCORD_BOT_TOKEN")
        .inspect_err(|e| error!("DISCORD_BOT_TOKEN not found: {e}"))
        .map_err(Error::EnvVar)?;

    bot::run_bot(token, BotData::new(database, settings, mailer, admins)).await
}
