//! Card effects.
//!
//! Effects form a closed tagged union. Immediate effects mutate the duel
//! state when resolved; persistent effects (`is_persistent`) do nothing on
//! resolution and are instead read back by the stat derivation in
//! `crate::battle`, cost derivation in `PlayerState::effective_cost`, and
//! victory checks, for as long as the source card stays on the field. A
//! destroyed source therefore takes its contribution with it with no
//! explicit rollback step.

use serde::{Deserialize, Serialize};

use crate::core::{DuelState, PlayerId};
use crate::cards::Category;

/// One effect carried by a card definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    /// The owner draws `count` cards.
    Draw { count: u32 },
    /// The opponent loses `amount` life.
    Damage { amount: i32 },
    /// The owner gains `amount` life.
    Heal { amount: i32 },
    /// Persistent: the source character's own stats shift while it is on
    /// the field.
    StatModifier { attack: i32, defense: i32 },
    /// Move the first matching card from the owner's deck to hand.
    CategorySearch { category: Category },
    /// Return the first matching card from the owner's graveyard to hand.
    CategoryGraveyard { category: Category },
    /// Persistent: friendly characters of `category` gain stats while the
    /// source is on the field.
    CategoryBoost {
        category: Category,
        attack: i32,
        defense: i32,
    },
    /// Persistent: hand cards of `category` cost `amount` less while the
    /// source is on the field.
    CategoryCostReduction { category: Category, amount: i32 },
    /// Both players' energy shifts.
    EnergyManipulation { own: i32, opponent: i32 },
    /// Persistent: the owner wins when controlling at least `required`
    /// characters of `category`.
    SpecialVictory { category: Category, required: usize },
    /// Destroy up to `count` of the opponent's strongest characters.
    Removal { count: u32 },
    /// Persistent: the source character draws all attacks while on the
    /// field.
    AttackTarget,
}

impl Effect {
    /// Persistent effects contribute nothing at resolution time; they are
    /// read back from the field for as long as their source stays there.
    #[must_use]
    pub fn is_persistent(&self) -> bool {
        matches!(
            self,
            Effect::StatModifier { .. }
                | Effect::CategoryBoost { .. }
                | Effect::CategoryCostReduction { .. }
                | Effect::SpecialVictory { .. }
                | Effect::AttackTarget
        )
    }

    /// Resolve an immediate effect. Returns human-readable notices for the
    /// host UI; persistent effects return none.
    pub fn apply(&self, state: &mut DuelState, owner: PlayerId) -> Vec<String> {
        let mut notices = Vec::new();
        let owner_name = state.player(owner).name().to_string();

        match self {
            Effect::Draw { count } => {
                for _ in 0..*count {
                    match state.draw(owner) {
                        Ok(outcome) => {
                            notices.push(format!("{owner_name} drew {}", outcome.drawn_name));
                            if let Some(discarded) = outcome.forced_discard {
                                notices.push(format!(
                                    "{owner_name} discarded {discarded} (hand limit)"
                                ));
                            }
                        }
                        Err(_) => {
                            notices.push(format!("{owner_name} cannot draw: deck is empty"));
                            break;
                        }
                    }
                }
            }

            Effect::Damage { amount } => {
                let target = owner.opponent();
                let life = state.change_life(target, -amount);
                notices.push(format!(
                    "{} takes {amount} damage ({life} LP)",
                    state.player(target).name()
                ));
            }

            Effect::Heal { amount } => {
                let life = state.change_life(owner, *amount);
                notices.push(format!("{owner_name} recovers {amount} LP ({life} LP)"));
            }

            Effect::CategorySearch { category } => {
                match state.search_deck(owner, |c| c.has_category(category)) {
                    Some((name, discard)) => {
                        notices.push(format!("{owner_name} fetched {name} from the deck"));
                        if let Some(discarded) = discard {
                            notices
                                .push(format!("{owner_name} discarded {discarded} (hand limit)"));
                        }
                    }
                    None => notices.push(format!(
                        "{owner_name} found no {category} card in the deck"
                    )),
                }
            }

            Effect::CategoryGraveyard { category } => {
                match state.retrieve_from_graveyard(owner, |c| c.has_category(category)) {
                    Some((name, discard)) => {
                        notices.push(format!("{owner_name} returned {name} from the graveyard"));
                        if let Some(discarded) = discard {
                            notices
                                .push(format!("{owner_name} discarded {discarded} (hand limit)"));
                        }
                    }
                    None => notices.push(format!(
                        "{owner_name} found no {category} card in the graveyard"
                    )),
                }
            }

            Effect::EnergyManipulation { own, opponent } => {
                if *own != 0 {
                    let energy = state.player_mut(owner).change_energy(*own);
                    notices.push(format!("{owner_name} now has {energy} energy"));
                }
                if *opponent != 0 {
                    let other = owner.opponent();
                    let energy = state.player_mut(other).change_energy(*opponent);
                    notices.push(format!(
                        "{} now has {energy} energy",
                        state.player(other).name()
                    ));
                }
            }

            Effect::Removal { count } => {
                let target = owner.opponent();
                for _ in 0..*count {
                    // Strongest by printed attack first.
                    let victim = state
                        .player(target)
                        .character_field()
                        .iter()
                        .max_by_key(|c| c.definition.character_data().map_or(0, |d| d.attack))
                        .map(|c| c.instance_id);
                    let Some(id) = victim else { break };
                    let Some(card) = state.player_mut(target).remove_character(id) else {
                        break;
                    };
                    notices.push(format!("{} was destroyed", card.name()));
                    state.player_mut(target).send_to_graveyard(card);
                }
                state.check_victory();
            }

            // Persistent: read back from the field, never resolved.
            Effect::StatModifier { .. }
            | Effect::CategoryBoost { .. }
            | Effect::CategoryCostReduction { .. }
            | Effect::SpecialVictory { .. }
            | Effect::AttackTarget => {}
        }

        notices
    }

    /// One-line description for card text and logs.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Effect::Draw { count } => format!("Draw {count} card(s)"),
            Effect::Damage { amount } => format!("Deal {amount} damage to the opponent"),
            Effect::Heal { amount } => format!("Recover {amount} LP"),
            Effect::StatModifier { attack, defense } => {
                format!("This character gets {attack:+} ATK / {defense:+} DEF")
            }
            Effect::CategorySearch { category } => {
                format!("Add a {category} card from your deck to your hand")
            }
            Effect::CategoryGraveyard { category } => {
                format!("Return a {category} card from your graveyard to your hand")
            }
            Effect::CategoryBoost {
                category,
                attack,
                defense,
            } => format!("Your {category} characters get {attack:+} ATK / {defense:+} DEF"),
            Effect::CategoryCostReduction { category, amount } => {
                format!("Your {category} cards cost {amount} less")
            }
            Effect::EnergyManipulation { own, opponent } => {
                format!("Energy: you {own:+}, opponent {opponent:+}")
            }
            Effect::SpecialVictory { category, required } => {
                format!("Win the duel while you control {required}+ {category} characters")
            }
            Effect::Removal { count } => {
                format!("Destroy up to {count} of the opponent's strongest characters")
            }
            Effect::AttackTarget => "Opposing attacks must target this character".to_string(),
        }
    }
}
