//! Core duel state: players, zones, phases, RNG.

mod player;
mod rng;
mod state;

pub use player::{
    Controller, DrawOutcome, PlayerId, PlayerState, CHARACTER_FIELD_LIMIT, FIELD_SLOT_COUNT,
    HAND_LIMIT, STARTING_ENERGY, STARTING_LIFE,
};
pub use rng::{DuelRng, DuelRngState};
pub use state::{DuelResult, DuelState, TurnPhase, VictoryReason};
