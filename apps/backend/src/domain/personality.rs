//! Personalities for computer-controlled players.

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Personality {
    Cautious,
    Aggressive,
    Analytical,
    Chatty,
    Quiet,
}

impl Personality {
    pub const ALL: [Personality; 5] = [
        Personality::Cautious,
        Personality::Aggressive,
        Personality::Analytical,
        Personality::Chatty,
        Personality::Quiet,
    ];

    /// One-line description used inside prompts.
    pub const fn description(self) -> &'static str {
        match self {
            Personality::Cautious => {
                "You are cautious: you avoid rash accusations and prefer to wait for evidence."
            }
            Personality::Aggressive => {
                "You are aggressive: you push hard on anyone who seems suspicious."
            }
            Personality::Analytical => {
                "You are analytical: you reason from who died, who voted for whom, and who stayed quiet."
            }
            Personality::Chatty => "You are chatty and sociable, and you like to banter.",
            Personality::Quiet => "You are quiet and terse; you say little but mean it.",
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        *Self::ALL.choose(rng).unwrap_or(&Personality::Analytical)
    }
}
