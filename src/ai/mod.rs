//! AI opponent.
//!
//! A stateless greedy policy over the public duel state: each step it
//! returns one action by a fixed priority ladder, and the match controller
//! executes it and asks again. No lookahead, no hidden information; the AI
//! sees exactly what a player would.
//!
//! Priorities: attack with the first ready character, summon the strongest
//! affordable character, cast the best-scoring spell, summon the most
//! expensive character, play a field card, end the turn.

use crate::battle::effective_attack;
use crate::cards::{CardInstance, InstanceId};
use crate::core::{DuelState, PlayerId, CHARACTER_FIELD_LIMIT};

/// Safety cap on AI actions within one turn. Hitting it forces the end
/// phase even if the policy still wants to act.
pub const AI_ACTION_LIMIT: usize = 20;

/// Minimum spell score worth an activation.
const SPELL_SCORE_THRESHOLD: i32 = 3;

/// Summon value below which the strongest-summon pass holds the card back
/// so the spell priority gets a look first.
const SUMMON_VALUE_FLOOR: i32 = 100;

/// One action the AI wants to take.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AiAction {
    /// Attack a defender, or the opponent directly when `target` is `None`.
    Attack {
        attacker: InstanceId,
        target: Option<InstanceId>,
    },
    PlayCard {
        card: InstanceId,
        field_slot: Option<usize>,
    },
    EndTurn,
}

/// The greedy policy.
pub struct AiDecisionEngine;

impl AiDecisionEngine {
    /// Pick the next action for `player`. Assumes it is `player`'s action
    /// phase; the turn-order and phase checks belong to the caller.
    #[must_use]
    pub fn choose(state: &DuelState, player: PlayerId) -> AiAction {
        if state.is_over() {
            return AiAction::EndTurn;
        }

        if !state.is_opening_turn() {
            if let Some(action) = Self::attack(state, player) {
                return action;
            }
        }

        if let Some(action) = Self::strongest_summon(state, player) {
            return action;
        }
        if let Some(action) = Self::best_spell(state, player) {
            return action;
        }
        if let Some(action) = Self::any_summon(state, player) {
            return action;
        }
        if let Some(action) = Self::field_card(state, player) {
            return action;
        }

        AiAction::EndTurn
    }

    /// First ready attacker against the first legal defender: a direct
    /// attack when the opposing field is empty, otherwise the first
    /// opposing character (the taunt character is a forced target).
    fn attack(state: &DuelState, player: PlayerId) -> Option<AiAction> {
        let me = state.player(player);
        let attacker = me
            .character_field()
            .iter()
            .find(|c| !c.has_attacked_this_turn)?;

        let opponent = state.player(player.opponent());
        let target = opponent
            .taunt_character()
            .or_else(|| opponent.character_field().first())
            .map(|defender| defender.instance_id);

        Some(AiAction::Attack {
            attacker: attacker.instance_id,
            target,
        })
    }

    /// Best stats-per-cost character worth fielding outright.
    fn strongest_summon(state: &DuelState, player: PlayerId) -> Option<AiAction> {
        let card = Self::playable_characters(state, player)
            .max_by_key(|c| Self::summon_value(c))
            .filter(|c| Self::summon_value(c) >= SUMMON_VALUE_FLOOR)?;
        Some(AiAction::PlayCard {
            card: card.instance_id,
            field_slot: None,
        })
    }

    /// Fallback summon: the most expensive character that can be played.
    fn any_summon(state: &DuelState, player: PlayerId) -> Option<AiAction> {
        let card = Self::playable_characters(state, player).max_by_key(|c| c.definition.cost)?;
        Some(AiAction::PlayCard {
            card: card.instance_id,
            field_slot: None,
        })
    }

    fn playable_characters<'a>(
        state: &'a DuelState,
        player: PlayerId,
    ) -> impl Iterator<Item = &'a CardInstance> {
        let me = state.player(player);
        let field_full = me.character_field().len() >= CHARACTER_FIELD_LIMIT;
        me.hand().iter().filter(move |c| {
            !field_full && c.definition.is_character() && me.effective_cost(c) <= me.energy()
        })
    }

    fn summon_value(card: &CardInstance) -> i32 {
        let Some(data) = card.definition.character_data() else {
            return 0;
        };
        let stats = data.attack + data.defense / 2;
        let effect_bonus = if card.definition.effects.is_empty() {
            0
        } else {
            300
        };
        stats * 10 / card.definition.cost.max(1) + effect_bonus
    }

    /// Highest-scoring affordable spell, if any clears the threshold.
    fn best_spell(state: &DuelState, player: PlayerId) -> Option<AiAction> {
        let me = state.player(player);

        me.hand()
            .iter()
            .filter(|c| c.definition.is_spell() && me.effective_cost(c) <= me.energy())
            .map(|c| (c, Self::spell_score(state, player, c)))
            .filter(|(_, score)| *score >= SPELL_SCORE_THRESHOLD)
            .max_by_key(|(_, score)| *score)
            .map(|(c, _)| AiAction::PlayCard {
                card: c.instance_id,
                field_slot: None,
            })
    }

    /// Keyword heuristic over the card text. Removal reads the opposing
    /// board, healing reads own life, draw reads hand size, buffs and
    /// debuffs read the relevant field count; anything unrecognized scores
    /// by cost.
    fn spell_score(state: &DuelState, player: PlayerId, card: &CardInstance) -> i32 {
        let me = state.player(player);
        let opponent = state.player(player.opponent());
        let text = format!("{} {}", card.definition.name, card.definition.description)
            .to_lowercase();
        let mentions = |keywords: &[&str]| keywords.iter().any(|k| text.contains(k));

        if mentions(&["destroy", "remove", "banish"]) {
            let threat: i32 = opponent
                .character_field()
                .iter()
                .map(|c| effective_attack(state, player.opponent(), c))
                .sum();
            return threat / 500;
        }
        if mentions(&["heal", "restore", "recover"]) {
            return match me.life_points() {
                0..=999 => 8,
                1000..=2499 => 4,
                _ => 1,
            };
        }
        if mentions(&["draw"]) {
            return match me.hand().len() {
                0..=2 => 6,
                3..=4 => 3,
                _ => 1,
            };
        }
        if mentions(&["boost", "empower", "strengthen"]) {
            return me.character_field().len() as i32 * 2;
        }
        if mentions(&["weaken", "curse"]) {
            return opponent.character_field().len() as i32 * 2;
        }

        card.definition.cost / 2 + 1
    }

    /// Best-scoring affordable field card when none is active.
    fn field_card(state: &DuelState, player: PlayerId) -> Option<AiAction> {
        let me = state.player(player);
        if me.active_field_card().is_some() {
            return None;
        }

        me.hand()
            .iter()
            .filter(|c| c.definition.is_field() && me.effective_cost(c) <= me.energy())
            .max_by_key(|c| Self::field_score(c))
            .map(|c| AiAction::PlayCard {
                card: c.instance_id,
                field_slot: Some(0),
            })
    }

    fn field_score(card: &CardInstance) -> i32 {
        let mut score = card.definition.cost * 10;
        if let Some(data) = card.definition.field_data() {
            if data.modifies_stats {
                score += 100 + 5 * (data.attack_modifier.abs() + data.defense_modifier.abs());
            }
        }
        score
    }
}
