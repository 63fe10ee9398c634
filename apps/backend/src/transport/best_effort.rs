//! Wrappers that log collaborator failures and carry on.

use tracing::{debug, warn};

use super::GameTransport;
use crate::domain::ids::{ChannelId, GuildId, MessageId, PlayerId};

pub async fn send(
    transport: &dyn GameTransport,
    channel: ChannelId,
    content: &str,
) -> Option<MessageId> {
    match transport.send_message(channel, content).await {
        Ok(id) => Some(id),
        Err(err) => {
            warn!(channel_id = %channel, error = %err, "send_message failed");
            None
        }
    }
}

/// DMs are routinely disabled by users, so failures only log at debug.
pub async fn dm(transport: &dyn GameTransport, user: PlayerId, content: &str) {
    if let Err(err) = transport.direct_message(user, content).await {
        debug!(player_id = %user, error = %err, "direct_message failed");
    }
}

pub async fn create_secret_channel(
    transport: &dyn GameTransport,
    guild: GuildId,
    members: &[PlayerId],
) -> Option<ChannelId> {
    match transport.create_secret_channel(guild, members).await {
        Ok(id) => Some(id),
        Err(err) => {
            warn!(guild_id = %guild, error = %err, "create_secret_channel failed");
            None
        }
    }
}

pub async fn delete_channel(transport: &dyn GameTransport, channel: ChannelId) {
    if let Err(err) = transport.delete_channel(channel).await {
        warn!(channel_id = %channel, error = %err, "delete_channel failed");
    }
}

pub async fn lock(transport: &dyn GameTransport, channel: ChannelId) {
    if let Err(err) = transport.lock_channel(channel).await {
        warn!(channel_id = %channel, error = %err, "lock_channel failed");
    }
}

pub async fn unlock(transport: &dyn GameTransport, channel: ChannelId) {
    if let Err(err) = transport.unlock_channel(channel).await {
        warn!(channel_id = %channel, error = %err, "unlock_channel failed");
    }
}
