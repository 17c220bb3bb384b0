//! Whole-duel state and victory evaluation.
//!
//! ## Victory checking
//!
//! `check_victory` runs synchronously inside every life change and draw
//! failure, so a mid-effect lethal is detected at the exact mutation that
//! caused it rather than at the next phase boundary. The first recorded
//! outcome sticks; later checks are no-ops.

use serde::{Deserialize, Serialize};

use crate::core::player::{PlayerId, PlayerState};
use crate::core::rng::DuelRng;
use crate::effects::Effect;

/// Phases of one turn, in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TurnPhase {
    /// Before the first turn starts.
    None,
    Draw,
    Action,
    End,
}

impl std::fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TurnPhase::None => "None",
            TurnPhase::Draw => "Draw",
            TurnPhase::Action => "Action",
            TurnPhase::End => "End",
        };
        f.write_str(name)
    }
}

/// Why a duel ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum VictoryReason {
    /// The loser's life points reached zero.
    LifeDepleted,
    /// The loser had to draw from an empty deck.
    DeckOut,
    /// The winner satisfied a card's alternate victory condition.
    SpecialCondition,
}

/// A finished duel's outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelResult {
    pub winner: PlayerId,
    pub reason: VictoryReason,
}

/// Complete state of one duel.
///
/// Serializable as a whole for snapshots; the RNG round-trips through its
/// seed and stream position so a restored duel replays identically.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DuelState {
    players: [PlayerState; 2],
    #[serde(with = "rng_serde")]
    pub(crate) rng: DuelRng,
    turn_number: u32,
    phase: TurnPhase,
    active: PlayerId,
    first_player: PlayerId,
    outcome: Option<DuelResult>,
    /// Match-wide instance id counter.
    pub(crate) next_instance: u32,
}

impl DuelState {
    #[must_use]
    pub fn new(players: [PlayerState; 2], first_player: PlayerId, rng: DuelRng) -> Self {
        Self {
            players,
            rng,
            turn_number: 0,
            phase: TurnPhase::None,
            active: first_player,
            first_player,
            outcome: None,
            next_instance: 0,
        }
    }

    // === Read accessors ===

    #[must_use]
    pub fn player(&self, id: PlayerId) -> &PlayerState {
        &self.players[id.index()]
    }

    #[must_use]
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }

    #[must_use]
    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    #[must_use]
    pub fn active_player(&self) -> PlayerId {
        self.active
    }

    #[must_use]
    pub fn first_player(&self) -> PlayerId {
        self.first_player
    }

    #[must_use]
    pub fn outcome(&self) -> Option<DuelResult> {
        self.outcome
    }

    #[must_use]
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Is the current turn the very first turn of the duel? The player who
    /// goes first may not attack during it.
    #[must_use]
    pub fn is_opening_turn(&self) -> bool {
        self.turn_number == 1 && self.active == self.first_player
    }

    // === Engine-only mutators ===

    pub(crate) fn player_mut(&mut self, id: PlayerId) -> &mut PlayerState {
        &mut self.players[id.index()]
    }

    pub(crate) fn set_phase(&mut self, phase: TurnPhase) {
        self.phase = phase;
    }

    pub(crate) fn begin_turn(&mut self, player: PlayerId) {
        self.active = player;
        self.turn_number += 1;
    }

    /// Draw one card for `id`. A failed draw is a loss condition and is
    /// evaluated immediately.
    pub(crate) fn draw(&mut self, id: PlayerId) -> Result<crate::core::DrawOutcome, crate::error::DrawError> {
        let result = self.players[id.index()].draw_card(&mut self.rng);
        if result.is_err() {
            self.check_victory();
        }
        result
    }

    /// Move the first matching deck card of `id` to hand, then shuffle.
    pub(crate) fn search_deck(
        &mut self,
        id: PlayerId,
        predicate: impl Fn(&crate::cards::CardInstance) -> bool,
    ) -> Option<(String, Option<String>)> {
        self.players[id.index()].search_deck(predicate, &mut self.rng)
    }

    /// Move the first matching graveyard card of `id` back to hand.
    pub(crate) fn retrieve_from_graveyard(
        &mut self,
        id: PlayerId,
        predicate: impl Fn(&crate::cards::CardInstance) -> bool,
    ) -> Option<(String, Option<String>)> {
        self.players[id.index()].retrieve_from_graveyard(predicate, &mut self.rng)
    }

    /// Apply a life delta to `target` and immediately evaluate victory.
    /// Returns the new life total.
    pub(crate) fn change_life(&mut self, target: PlayerId, delta: i32) -> i32 {
        let life = self.player_mut(target).change_life(delta);
        self.check_victory();
        life
    }

    /// Evaluate every loss and alternate-victory condition. The first
    /// outcome recorded for the duel is final.
    pub(crate) fn check_victory(&mut self) -> Option<DuelResult> {
        if self.outcome.is_some() {
            return self.outcome;
        }

        // Decide first, record after; recording needs the borrows released.
        let mut decided = None;
        'players: for id in PlayerId::both() {
            let player = self.player(id);

            if player.life_points() == 0 {
                decided = Some((id.opponent(), VictoryReason::LifeDepleted));
                break;
            }
            if player.cannot_draw() {
                decided = Some((id.opponent(), VictoryReason::DeckOut));
                break;
            }

            // Alternate victory granted by an on-field card, e.g. "win while
            // controlling N characters of category X".
            for source in player.persistent_sources() {
                for effect in &source.definition.effects {
                    if let Effect::SpecialVictory { category, required } = effect {
                        let count = player
                            .character_field()
                            .iter()
                            .filter(|c| c.has_category(category))
                            .count();
                        if count >= *required {
                            decided = Some((id, VictoryReason::SpecialCondition));
                            break 'players;
                        }
                    }
                }
            }
        }

        let (winner, reason) = decided?;
        self.record(winner, reason)
    }

    fn record(&mut self, winner: PlayerId, reason: VictoryReason) -> Option<DuelResult> {
        let result = DuelResult { winner, reason };
        tracing::info!(%winner, ?reason, "duel over");
        self.outcome = Some(result);
        self.outcome
    }
}

mod rng_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use crate::core::rng::{DuelRng, DuelRngState};

    pub fn serialize<S: Serializer>(rng: &DuelRng, serializer: S) -> Result<S::Ok, S::Error> {
        rng.state().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DuelRng, D::Error> {
        Ok(DuelRng::from_state(&DuelRngState::deserialize(
            deserializer,
        )?))
    }
}
