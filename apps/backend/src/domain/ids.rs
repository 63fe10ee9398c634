//! Platform identities.
//!
//! The chat platform hands out 64-bit snowflakes for users, channels, guilds
//! and messages. Each gets its own newtype so a channel can never be passed
//! where a player is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! snowflake_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

snowflake_id!(
    /// A participant, human or computer-controlled.
    PlayerId
);
snowflake_id!(
    /// A text channel: the game's primary channel or the mafia's secret one.
    ChannelId
);
snowflake_id!(GuildId);
snowflake_id!(MessageId);
