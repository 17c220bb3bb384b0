//! Reactive spell windows.
//!
//! When an event is raised during one player's turn, the other player gets
//! one chance to activate a hand spell flagged for opponent-turn use whose
//! timing matches the event. The activation (and any events it raises in
//! turn) resolves completely before passive observers see the original
//! event.

use crate::cards::InstanceId;
use crate::core::{DuelState, PlayerId};
use crate::events::GameEvent;

/// A hand spell that may be activated in response to an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpellCandidate {
    pub instance_id: InstanceId,
    pub name: String,
    /// Effective cost at the moment the window opened.
    pub cost: i32,
}

/// Finds legal reactive activations.
pub struct EffectActivationController;

impl EffectActivationController {
    /// Spells in `responder`'s hand that may answer `event`: flagged for
    /// opponent-turn activation, timing matches the event kind, and the
    /// responder can pay.
    #[must_use]
    pub fn candidates(
        state: &DuelState,
        responder: PlayerId,
        event: &GameEvent,
    ) -> Vec<SpellCandidate> {
        if state.is_over() {
            return Vec::new();
        }

        let player = state.player(responder);
        player
            .hand()
            .iter()
            .filter_map(|card| {
                let spell = card.definition.spell_data()?;
                if !spell.opponent_turn || !spell.timing.matches(event.kind) {
                    return None;
                }
                let cost = player.effective_cost(card);
                if cost > player.energy() {
                    return None;
                }
                Some(SpellCandidate {
                    instance_id: card.instance_id,
                    name: card.name().to_string(),
                    cost,
                })
            })
            .collect()
    }
}
