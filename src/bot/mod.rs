//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for the donation tracker,
//! including all slash commands, autocomplete handlers, and bot context management.

/// Discord command implementations (account, campaign, donation, admin, live, general)
pub mod commands;
/// Discord interaction handlers (autocomplete, etc.)
pub mod handlers;

use crate::{
    config::settings::Settings,
    core::{
        campaign,
        live::ChangeFeed,
        mailer::{self, Mailer},
        user,
    },
    entities::user as user_entity,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::{collections::HashMap, hash::Hash, sync::Arc};
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{error, info, instrument, warn};

/// Shorthand for the poise context every command receives
pub type Context<'a> = poise::Context<'a, BotData, Error>;

/// Shared data available to all bot commands.
/// This structure holds the database connection and the other global state
/// that commands need to access.
pub struct BotData {
    /// Database connection for all database operations, shared with live queries
    pub database: Arc<DatabaseConnection>,
    /// Change broadcaster for live queries
    pub feed: ChangeFeed,
    /// Notification email client
    pub mailer: Mailer,
    /// Loaded `config.toml`
    pub settings: Settings,
    /// User ids that are always treated as admins
    pub admins: Vec<String>,
    /// Live list tasks, one per channel
    pub watches: Mutex<HashMap<serenity::ChannelId, JoinHandle<()>>>,
}

impl BotData {
    /// Creates a new `BotData` instance.
    /// This is typically called during bot initialization to set up the
    /// shared context for all commands.
    #[must_use]
    pub fn new(
        database: DatabaseConnection,
        settings: Settings,
        mailer: Mailer,
        admins: Vec<String>,
    ) -> Self {
        Self {
            database: Arc::new(database),
            feed: ChangeFeed::new(),
            mailer,
            settings,
            admins,
            watches: Mutex::new(HashMap::new()),
        }
    }

    /// Sends an email in the background. Failures are logged, not returned.
    pub fn send_mail_in_background(&self, message: mailer::EmailMessage) {
        if !self.mailer.is_enabled() {
            return;
        }
        let mailer = self.mailer.clone();
        tokio::spawn(async move {
            if let Err(e) = mailer.send(&message).await {
                warn!(to = %message.to, "Failed to send email: {e}");
            }
        });
    }
}

/// Looks up the caller's account, failing with a hint to `/register`.
pub async fn require_registered(ctx: Context<'_>) -> Result<user_entity::Model> {
    let user_id = ctx.author().id.to_string();
    user::get_user_by_id(&ctx.data().database, &user_id)
        .await?
        .ok_or_else(|| Error::PermissionDenied {
            message: "register first with `/register`".to_string(),
        })
}

/// Fails with [`Error::PermissionDenied`] unless the caller is an admin.
pub async fn require_admin(ctx: Context<'_>) -> Result<String> {
    let user_id = ctx.author().id.to_string();
    let data = ctx.data();
    if user::is_admin(&data.database, &user_id, &data.admins).await? {
        Ok(user_id)
    } else {
        Err(Error::PermissionDenied {
            message: "admin only".to_string(),
        })
    }
}

/// Resolves a campaign argument given as a title, `#id` or bare id.
pub async fn resolve_campaign(
    db: &DatabaseConnection,
    input: &str,
) -> Result<crate::entities::campaign::Model> {
    let trimmed = input.trim();
    if let Ok(id) = trimmed.trim_start_matches('#').parse::<i64>() {
        if let Some(found) = campaign::get_campaign_by_id(db, id).await? {
            return Ok(found);
        }
    }
    campaign::find_campaign_by_title(db, trimmed)
        .await?
        .ok_or_else(|| Error::CampaignNotFound {
            id: trimmed.to_string(),
        })
}

/// Stores a channel's live list task, aborting the one it replaces.
///
/// Tasks that already finished are dropped first so the map only holds
/// running lists.
pub fn register_watch<K>(
    watches: &mut HashMap<K, JoinHandle<()>>,
    key: K,
    task: JoinHandle<()>,
) where
    K: Eq + Hash,
{
    watches.retain(|_, handle| !handle.is_finished());
    if let Some(previous) = watches.insert(key, task) {
        previous.abort();
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {error:?}");
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("❌ {error}")).await {
                error!("Failed to send error message: {e}");
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {e}");
            }
        }
    }
}

/// Registers every command and runs the Discord client until it stops.
#[instrument(skip(token, data))]
pub async fn run_bot(token: String, data: BotData) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                commands::ping(),
                commands::help(),
                commands::register(),
                commands::profile(),
                commands::update_profile(),
                commands::campaigns(),
                commands::campaign_info(),
                commands::my_campaigns(),
                commands::campaign(),
                commands::donate(),
                commands::history(),
                commands::campaign_donations(),
                commands::stats(),
                commands::leaderboard(),
                commands::notifications(),
                commands::mark_read(),
                commands::mark_all_read(),
                commands::admin(),
                commands::watch(),
                commands::unwatch(),
            ],
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(|ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(data)
            })
        })
        .build();

    let intents = serenity::GatewayIntents::non_privileged();

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {e:?}"))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {e:?}"))?;
    Ok(())
}

pub use commands::*;
pub use handlers::*;
