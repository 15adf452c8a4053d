//! General Discord commands - ping and help.
//! This module contains simple commands that don't require database operations.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**DonationBuddy Help**\n\
        Here is a summary of all available commands.\n\n\
        **Account**\n\
        • `/register <name> <email>` - Creates your donor account.\n\
        • `/profile` - Shows your profile and donation totals.\n\
        • `/update_profile [name] [email] [phone] [bio]` - Edits your profile.\n\n\
        **Campaigns**\n\
        • `/campaigns [status] [category] [after]` - Browses campaigns.\n\
        • `/campaign_info <campaign>` - Shows one campaign with recent donations.\n\
        • `/my_campaigns` - Lists the campaigns you run.\n\
        • `/campaign <create|publish|end|edit|delete>` - Manages your campaigns.\n\n\
        **Donations**\n\
        • `/donate <campaign> <amount> [message] [anonymous]` - Donates to a campaign.\n\
        • `/history` - Shows your donations.\n\
        • `/campaign_donations <campaign>` - Lists donations to a campaign.\n\
        • `/stats [period]` - Sums your donations by day, month or year.\n\
        • `/leaderboard [count]` - Shows the campaigns that raised the most.\n\n\
        **Notifications**\n\
        • `/notifications [unread_only]`, `/mark_read <id>`, `/mark_all_read`\n\n\
        **Live lists**\n\
        • `/watch [category]` - Keeps a live list of active campaigns in this channel.\n\
        • `/unwatch` - Stops the live list.\n\n\
        **Admin**\n\
        • `/admin <users|set_role|delete_user|campaigns|set_status|donations|fail_donation|delete_donation>`";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
