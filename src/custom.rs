//! User-authored reactions bound to guild or channel hooks.
//!
//! A handler is a closed tagged variant over action kinds the engine knows
//! how to run, not an open-ended script.  The engine treats every variant
//! through the single `process_event` operation and contains its failures
//! per invocation, so handlers should be idempotent for one logical event.

use crate::{context::DispatchContext, error::HandlerError};
use serenity::all::ReactionType;

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum CustomHandler {
    /// Post a templated message in the context channel.
    Respond { content: String },
    /// React to the triggering message with an emoji.
    React { emoji: String },
    /// Send a templated direct message to the triggering user.
    Dm { content: String },
}

impl CustomHandler {
    pub async fn process_event(&self, ctx: &DispatchContext<'_>) -> Result<(), HandlerError> {
        match self {
            CustomHandler::Respond { content } => {
                let channel = ctx.channel.as_ref().ok_or(HandlerError::MissingChannel)?;
                let rendered = match &ctx.user {
                    Some(user) => user.render_template(content),
                    None => content.clone(),
                };
                ctx.gateway.send_message(channel.id, &rendered).await?;
                Ok(())
            }
            CustomHandler::React { emoji } => {
                let msg = ctx.message.ok_or(HandlerError::MissingMessage)?;
                let reaction = ReactionType::try_from(emoji.as_str())
                    .map_err(|_| HandlerError::InvalidEmoji(emoji.clone()))?;
                ctx.gateway.react(msg.channel.id, msg.id, reaction).await?;
                Ok(())
            }
            CustomHandler::Dm { content } => {
                let user = ctx.user.as_ref().ok_or(HandlerError::MissingUser)?;
                ctx.gateway
                    .dm_user(user.id, &user.render_template(content))
                    .await?;
                Ok(())
            }
        }
    }
}
