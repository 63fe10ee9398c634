//! Chat-platform collaborator contract.
//!
//! The engine never sees a wire format. It calls these operations and, apart
//! from the secret channel id, does not depend on their results.

use async_trait::async_trait;

use crate::domain::ids::{ChannelId, GuildId, MessageId, PlayerId};
use crate::error::AppError;

pub mod best_effort;
pub mod memory;

pub use memory::{MemoryTransport, TransportOp};

#[async_trait]
pub trait GameTransport: Send + Sync {
    async fn send_message(&self, channel: ChannelId, content: &str)
        -> Result<MessageId, AppError>;

    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> Result<(), AppError>;

    async fn direct_message(&self, user: PlayerId, content: &str) -> Result<(), AppError>;

    /// Create a channel only `members` can read. Used once per game.
    async fn create_secret_channel(
        &self,
        guild: GuildId,
        members: &[PlayerId],
    ) -> Result<ChannelId, AppError>;

    async fn delete_channel(&self, channel: ChannelId) -> Result<(), AppError>;

    async fn lock_channel(&self, channel: ChannelId) -> Result<(), AppError>;

    async fn unlock_channel(&self, channel: ChannelId) -> Result<(), AppError>;
}
