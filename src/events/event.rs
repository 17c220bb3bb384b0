//! Game events.
//!
//! Events are the engine's only broadcast mechanism: every phase transition
//! and player action raises exactly one event after its state mutation
//! completes. Reactive spells and passive observers both key off these.

use serde::{Deserialize, Serialize};

use crate::cards::InstanceId;
use crate::core::{PlayerId, TurnPhase};

/// The closed set of event kinds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameEventKind {
    /// Any card left a hand for the field or resolution.
    CardPlayed,
    /// A character card entered the field.
    CharacterSummoned,
    /// A spell resolved (including reactive activations).
    SpellActivated,
    /// An attack against a defending character was declared.
    AttackDeclared,
    /// An attack against a player with an empty field was declared.
    DirectAttack,
    PhaseChanged,
    TurnChanged,
}

impl std::fmt::Display for GameEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            GameEventKind::CardPlayed => "CardPlayed",
            GameEventKind::CharacterSummoned => "CharacterSummoned",
            GameEventKind::SpellActivated => "SpellActivated",
            GameEventKind::AttackDeclared => "AttackDeclared",
            GameEventKind::DirectAttack => "DirectAttack",
            GameEventKind::PhaseChanged => "PhaseChanged",
            GameEventKind::TurnChanged => "TurnChanged",
        };
        f.write_str(name)
    }
}

/// A discrete game event with contextual data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: GameEventKind,

    /// The acting player.
    pub player: PlayerId,

    /// The player affected, when different from the actor.
    pub target_player: Option<PlayerId>,

    /// The card that caused the event.
    pub source_card: Option<InstanceId>,

    /// The card affected by the event.
    pub target_card: Option<InstanceId>,

    /// The phase entered, for `PhaseChanged`.
    pub phase: Option<TurnPhase>,
}

impl GameEvent {
    #[must_use]
    pub fn new(kind: GameEventKind, player: PlayerId) -> Self {
        Self {
            kind,
            player,
            target_player: None,
            source_card: None,
            target_card: None,
            phase: None,
        }
    }

    /// Set the target player (builder pattern).
    #[must_use]
    pub fn with_target_player(mut self, target: PlayerId) -> Self {
        self.target_player = Some(target);
        self
    }

    /// Set the source card (builder pattern).
    #[must_use]
    pub fn with_source_card(mut self, card: InstanceId) -> Self {
        self.source_card = Some(card);
        self
    }

    /// Set the target card (builder pattern).
    #[must_use]
    pub fn with_target_card(mut self, card: InstanceId) -> Self {
        self.target_card = Some(card);
        self
    }

    /// A card left the actor's hand.
    #[must_use]
    pub fn card_played(player: PlayerId, card: InstanceId) -> Self {
        Self::new(GameEventKind::CardPlayed, player).with_source_card(card)
    }

    /// A character entered the actor's field.
    #[must_use]
    pub fn character_summoned(player: PlayerId, card: InstanceId) -> Self {
        Self::new(GameEventKind::CharacterSummoned, player).with_source_card(card)
    }

    /// A spell resolved.
    #[must_use]
    pub fn spell_activated(player: PlayerId, card: InstanceId) -> Self {
        Self::new(GameEventKind::SpellActivated, player).with_source_card(card)
    }

    /// An attack on a defending character was declared.
    #[must_use]
    pub fn attack_declared(player: PlayerId, attacker: InstanceId, defender: InstanceId) -> Self {
        Self::new(GameEventKind::AttackDeclared, player)
            .with_target_player(player.opponent())
            .with_source_card(attacker)
            .with_target_card(defender)
    }

    /// A direct attack on the opposing player was declared.
    #[must_use]
    pub fn direct_attack(player: PlayerId, attacker: InstanceId) -> Self {
        Self::new(GameEventKind::DirectAttack, player)
            .with_target_player(player.opponent())
            .with_source_card(attacker)
    }

    /// The active player entered a new phase.
    #[must_use]
    pub fn phase_changed(player: PlayerId, phase: TurnPhase) -> Self {
        let mut event = Self::new(GameEventKind::PhaseChanged, player);
        event.phase = Some(phase);
        event
    }

    /// The turn passed to `player`.
    #[must_use]
    pub fn turn_changed(player: PlayerId) -> Self {
        Self::new(GameEventKind::TurnChanged, player)
    }
}
