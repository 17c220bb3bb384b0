//! # duelcore
//!
//! Rules engine for a two-player, turn-based trading-card duel.
//!
//! ## Design Principles
//!
//! 1. **Headless**: no rendering, assets, or input handling. Hosts drive
//!    matches through [`engine::MatchContext`] and receive messages, sound
//!    cues, and prompts through the [`notify`] traits.
//!
//! 2. **Explicit context**: every operation runs against a `MatchContext`
//!    owned by the host. Nothing in the crate is global.
//!
//! 3. **Derived state**: stat boosts, cost reductions, and alternate
//!    victory conditions are recomputed from what is on the field rather
//!    than stored on instances, so removing a source can never leave a
//!    stale bonus behind.
//!
//! 4. **Deterministic**: all randomness flows through a seeded
//!    [`core::DuelRng`] whose position can be captured and restored, so a
//!    snapshot replays identically.
//!
//! ## Architecture
//!
//! - **Scheduled pacing**: turn hand-offs and AI steps are queued tasks
//!   over a virtual millisecond clock, advanced by [`engine::MatchContext::tick`].
//!   Every pending delay is a visible, cancellable queue entry.
//!
//! - **Bounded reactive dispatch**: raising an event opens one reactive
//!   spell window for the non-acting player; the activation and everything
//!   it triggers resolves recursively (depth-capped) before passive
//!   observers see the original event.
//!
//! ## Modules
//!
//! - `core`: players, zones, duel state, phases, RNG
//! - `cards`: card definitions, instances, database, decks
//! - `effects`: the effect tagged union and its resolution
//! - `battle`: derived stats and combat math
//! - `events`: event types, passive observers, reactive windows
//! - `engine`: match controller, turn flow, scheduler
//! - `ai`: the greedy AI policy
//! - `notify`: host-facing notification, prompt, and audio traits
//! - `error`: error types

pub mod ai;
pub mod battle;
pub mod cards;
pub mod core;
pub mod effects;
pub mod engine;
pub mod error;
pub mod events;
pub mod notify;

// Re-export commonly used types
pub use crate::core::{
    Controller, DuelResult, DuelRng, DuelRngState, DuelState, PlayerId, PlayerState, TurnPhase,
    VictoryReason,
};

pub use crate::cards::{
    ActivationTiming, CardDatabase, CardDefinition, CardId, CardInstance, CardKind, CardRegistry,
    Category, DeckDefinition, Element, FieldData, InstanceId,
};

pub use crate::effects::Effect;

pub use crate::battle::{effective_attack, effective_defense, BattleOutcome};

pub use crate::events::{
    EffectActivationController, EventBus, EventObserver, GameEvent, GameEventKind, SpellCandidate,
};

pub use crate::engine::{MatchBuilder, MatchContext, Scheduler, Task};

pub use crate::ai::{AiAction, AiDecisionEngine};

pub use crate::error::{DeckError, DrawError, EngineError, MatchError, PlayError};

pub use crate::notify::{
    AudioSink, NotificationKind, NullNotifier, PromptAnswer, RecordingNotifier, SoundCue,
    UiNotifier,
};
