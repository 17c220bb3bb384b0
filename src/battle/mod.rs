//! Battle resolution and derived stats.
//!
//! ## Derived stats
//!
//! Characters never store stat boosts. Effective attack and defense are
//! recomputed on demand from the printed stats plus every modifier source
//! currently on the field: field-card modifiers (own or opposing, per the
//! card's filter), the character's own `StatModifier` effects, and friendly
//! `CategoryBoost` sources. Removing a source changes the next derivation;
//! there is no rollback bookkeeping to get wrong.

use crate::cards::{CardInstance, InstanceId};
use crate::core::{DuelState, PlayerId};
use crate::effects::Effect;

/// Effective attack of a character on `owner`'s field.
#[must_use]
pub fn effective_attack(state: &DuelState, owner: PlayerId, card: &CardInstance) -> i32 {
    derive_stat(state, owner, card, Stat::Attack)
}

/// Effective defense of a character on `owner`'s field.
#[must_use]
pub fn effective_defense(state: &DuelState, owner: PlayerId, card: &CardInstance) -> i32 {
    derive_stat(state, owner, card, Stat::Defense)
}

#[derive(Clone, Copy)]
enum Stat {
    Attack,
    Defense,
}

fn derive_stat(state: &DuelState, owner: PlayerId, card: &CardInstance, stat: Stat) -> i32 {
    let Some(data) = card.definition.character_data() else {
        return 0;
    };
    let mut value = match stat {
        Stat::Attack => data.attack,
        Stat::Defense => data.defense,
    };

    // Field cards from either side, gated on their side filter.
    for id in PlayerId::both() {
        let Some(field_card) = state.player(id).active_field_card() else {
            continue;
        };
        let Some(field) = field_card.definition.field_data() else {
            continue;
        };
        let applies = field.modifies_stats
            && field.affects(data)
            && (field.affects_own_field == (id == owner));
        if applies {
            value += match stat {
                Stat::Attack => field.attack_modifier,
                Stat::Defense => field.defense_modifier,
            };
        }
    }

    // The character's own printed modifiers.
    for effect in &card.definition.effects {
        if let Effect::StatModifier { attack, defense } = effect {
            value += match stat {
                Stat::Attack => *attack,
                Stat::Defense => *defense,
            };
        }
    }

    // Friendly category boosts, excluding the character boosting itself
    // through its own aura twice is fine: a source boosts every matching
    // friendly character, itself included.
    for source in state.player(owner).persistent_sources() {
        for effect in &source.definition.effects {
            if let Effect::CategoryBoost {
                category,
                attack,
                defense,
            } = effect
            {
                if card.has_category(category) {
                    value += match stat {
                        Stat::Attack => *attack,
                        Stat::Defense => *defense,
                    };
                }
            }
        }
    }

    value
}

/// Is `card` shielded from battle destruction by its owner's field card?
#[must_use]
fn battle_protected(state: &DuelState, owner: PlayerId, card: &CardInstance) -> bool {
    let Some(data) = card.definition.character_data() else {
        return false;
    };
    state
        .player(owner)
        .active_field_card()
        .and_then(|f| f.definition.field_data())
        .is_some_and(|f| f.prevent_battle_destruction && f.affects_own_field && f.affects(data))
}

/// What one battle did.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BattleOutcome {
    pub attacker_destroyed: bool,
    pub defender_destroyed: bool,
    /// Piercing damage dealt to the defending player.
    pub piercing_damage: i32,
    /// Piercing damage dealt back to the attacking player by a counter.
    pub counter_piercing_damage: i32,
    pub notices: Vec<String>,
}

/// Resolve a declared attack against a defending character.
///
/// Legality (phase, turn, exhaustion, taunt) was validated by the match
/// controller before the declaration event; this function only does the
/// math. The attacker is marked exhausted whatever the result.
pub fn resolve_character_battle(
    state: &mut DuelState,
    attacker_owner: PlayerId,
    attacker_id: InstanceId,
    defender_id: InstanceId,
) -> BattleOutcome {
    let defender_owner = attacker_owner.opponent();
    let mut outcome = BattleOutcome::default();

    state.player_mut(attacker_owner).mark_attacked(attacker_id);

    let (Some(attacker), Some(defender)) = (
        state.player(attacker_owner).character(attacker_id),
        state.player(defender_owner).character(defender_id),
    ) else {
        return outcome;
    };

    let attack = effective_attack(state, attacker_owner, attacker);
    let defense = effective_defense(state, defender_owner, defender);
    let attacker_name = attacker.name().to_string();
    let defender_name = defender.name().to_string();
    let pierces = attacker
        .definition
        .character_data()
        .is_some_and(|d| d.allows_piercing);
    let counters = defender
        .definition
        .character_data()
        .is_some_and(|d| d.can_counter_attack);
    let counter_pierces = defender
        .definition
        .character_data()
        .is_some_and(|d| d.allows_piercing);
    let defender_shielded = battle_protected(state, defender_owner, defender);
    let attacker_shielded = battle_protected(state, attacker_owner, attacker);
    let counter_attack = effective_attack(state, defender_owner, defender);
    let attacker_defense = effective_defense(state, attacker_owner, attacker);

    tracing::debug!(%attacker_name, %defender_name, attack, defense, "battle");
    outcome
        .notices
        .push(format!("{attacker_name} ({attack}) attacks {defender_name} ({defense})"));

    if attack > defense {
        if defender_shielded {
            outcome
                .notices
                .push(format!("{defender_name} is protected from destruction"));
        } else {
            outcome.defender_destroyed = true;
        }
        if pierces {
            outcome.piercing_damage = attack - defense;
        }
    } else if attack < defense {
        if attacker_shielded {
            outcome
                .notices
                .push(format!("{attacker_name} is protected from destruction"));
        } else {
            outcome.attacker_destroyed = true;
        }
    }
    // Equal values: both survive.

    // A surviving defender with the counter flag strikes back at the
    // attacker using the same comparison, with its own piercing check.
    if counters && !outcome.defender_destroyed && !outcome.attacker_destroyed {
        outcome.notices.push(format!(
            "{defender_name} counter-attacks ({counter_attack} vs {attacker_defense})"
        ));
        if counter_attack > attacker_defense {
            if !attacker_shielded {
                outcome.attacker_destroyed = true;
            }
            if counter_pierces {
                outcome.counter_piercing_damage = counter_attack - attacker_defense;
            }
        }
    }

    if outcome.defender_destroyed {
        if let Some(name) = destroy_character(state, defender_owner, defender_id) {
            outcome.notices.push(format!("{name} was destroyed"));
        }
    }
    if outcome.attacker_destroyed {
        if let Some(name) = destroy_character(state, attacker_owner, attacker_id) {
            outcome.notices.push(format!("{name} was destroyed"));
        }
    }

    if outcome.piercing_damage > 0 {
        let life = state.change_life(defender_owner, -outcome.piercing_damage);
        outcome.notices.push(format!(
            "{} takes {} piercing damage ({life} LP)",
            state.player(defender_owner).name(),
            outcome.piercing_damage
        ));
    }
    if outcome.counter_piercing_damage > 0 {
        let life = state.change_life(attacker_owner, -outcome.counter_piercing_damage);
        outcome.notices.push(format!(
            "{} takes {} piercing damage ({life} LP)",
            state.player(attacker_owner).name(),
            outcome.counter_piercing_damage
        ));
    }

    outcome
}

/// Resolve a direct attack: full effective attack to the opponent's life.
/// The opposing field was validated empty by the match controller.
pub fn resolve_direct_attack(
    state: &mut DuelState,
    attacker_owner: PlayerId,
    attacker_id: InstanceId,
) -> BattleOutcome {
    let mut outcome = BattleOutcome::default();

    state.player_mut(attacker_owner).mark_attacked(attacker_id);

    let Some(attacker) = state.player(attacker_owner).character(attacker_id) else {
        return outcome;
    };
    let attack = effective_attack(state, attacker_owner, attacker);
    let attacker_name = attacker.name().to_string();

    let target = attacker_owner.opponent();
    let life = state.change_life(target, -attack);
    outcome.piercing_damage = 0;
    outcome.notices.push(format!(
        "{attacker_name} attacks {} directly for {attack} ({life} LP)",
        state.player(target).name()
    ));

    outcome
}

/// Move a character from the field to its owner's graveyard.
pub fn destroy_character(
    state: &mut DuelState,
    owner: PlayerId,
    id: InstanceId,
) -> Option<String> {
    let card = state.player_mut(owner).remove_character(id)?;
    let name = card.name().to_string();
    state.player_mut(owner).send_to_graveyard(card);
    state.check_victory();
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardId, Category, FieldData};
    use crate::core::{Controller, DuelRng, PlayerState};

    fn duel() -> DuelState {
        let players = [
            PlayerState::new("Alice", Controller::Human),
            PlayerState::new("Bob", Controller::Human),
        ];
        DuelState::new(players, PlayerId::ONE, DuelRng::new(5))
    }

    fn put_character(
        state: &mut DuelState,
        owner: PlayerId,
        id: u32,
        def: CardDefinition,
    ) -> InstanceId {
        let instance = CardInstance::new(InstanceId(id), def);
        state.player_mut(owner).place_character(instance);
        InstanceId(id)
    }

    #[test]
    fn test_higher_attack_destroys_defender() {
        let mut state = duel();
        let attacker = put_character(
            &mut state,
            PlayerId::ONE,
            1,
            CardDefinition::character(CardId::new(1), "Knight", 3, 1500, 1000),
        );
        let defender = put_character(
            &mut state,
            PlayerId::TWO,
            2,
            CardDefinition::character(CardId::new(2), "Wall", 3, 800, 1200),
        );

        let outcome = resolve_character_battle(&mut state, PlayerId::ONE, attacker, defender);

        assert!(outcome.defender_destroyed);
        assert!(!outcome.attacker_destroyed);
        assert_eq!(outcome.piercing_damage, 0);
        assert!(state.player(PlayerId::TWO).character_field().is_empty());
        assert_eq!(state.player(PlayerId::TWO).graveyard().len(), 1);
        assert!(state.player(PlayerId::ONE).character(attacker).unwrap().has_attacked_this_turn);
    }

    #[test]
    fn test_lower_attack_destroys_attacker() {
        let mut state = duel();
        let attacker = put_character(
            &mut state,
            PlayerId::ONE,
            1,
            CardDefinition::character(CardId::new(1), "Scout", 1, 800, 600),
        );
        let defender = put_character(
            &mut state,
            PlayerId::TWO,
            2,
            CardDefinition::character(CardId::new(2), "Fortress", 4, 500, 2000),
        );

        let outcome = resolve_character_battle(&mut state, PlayerId::ONE, attacker, defender);

        assert!(outcome.attacker_destroyed);
        assert!(!outcome.defender_destroyed);
        assert!(state.player(PlayerId::ONE).character_field().is_empty());
        assert_eq!(state.player(PlayerId::TWO).character_field().len(), 1);
        // No damage either way without piercing.
        assert_eq!(state.player(PlayerId::ONE).life_points(), 4000);
        assert_eq!(state.player(PlayerId::TWO).life_points(), 4000);
    }

    #[test]
    fn test_equal_values_both_survive() {
        let mut state = duel();
        let attacker = put_character(
            &mut state,
            PlayerId::ONE,
            1,
            CardDefinition::character(CardId::new(1), "A", 2, 1000, 500),
        );
        let defender = put_character(
            &mut state,
            PlayerId::TWO,
            2,
            CardDefinition::character(CardId::new(2), "B", 2, 500, 1000),
        );

        let outcome = resolve_character_battle(&mut state, PlayerId::ONE, attacker, defender);

        assert!(!outcome.attacker_destroyed);
        assert!(!outcome.defender_destroyed);
        assert_eq!(state.player(PlayerId::ONE).character_field().len(), 1);
        assert_eq!(state.player(PlayerId::TWO).character_field().len(), 1);
    }

    #[test]
    fn test_piercing_damage_is_the_difference() {
        let mut state = duel();
        let attacker = put_character(
            &mut state,
            PlayerId::ONE,
            1,
            CardDefinition::character(CardId::new(1), "Lancer", 4, 1800, 900).with_piercing(),
        );
        let defender = put_character(
            &mut state,
            PlayerId::TWO,
            2,
            CardDefinition::character(CardId::new(2), "Wall", 3, 300, 1200),
        );

        let outcome = resolve_character_battle(&mut state, PlayerId::ONE, attacker, defender);

        assert!(outcome.defender_destroyed);
        assert_eq!(outcome.piercing_damage, 600);
        assert_eq!(state.player(PlayerId::TWO).life_points(), 3400);
    }

    #[test]
    fn test_counter_attack_after_surviving() {
        let mut state = duel();
        // Attacker loses the comparison? No: equal, both survive, then the
        // defender counters and wins against the attacker's low defense.
        let attacker = put_character(
            &mut state,
            PlayerId::ONE,
            1,
            CardDefinition::character(CardId::new(1), "Raider", 3, 1000, 400),
        );
        let defender = put_character(
            &mut state,
            PlayerId::TWO,
            2,
            CardDefinition::character(CardId::new(2), "Sentinel", 3, 900, 1000)
                .with_counter_attack(),
        );

        let outcome = resolve_character_battle(&mut state, PlayerId::ONE, attacker, defender);

        assert!(outcome.attacker_destroyed, "counter-attack destroys the attacker");
        assert!(!outcome.defender_destroyed);
        assert_eq!(state.player(PlayerId::ONE).graveyard().len(), 1);
    }

    #[test]
    fn test_counter_attack_carries_its_own_piercing() {
        let mut state = duel();
        // The clash ties, then the piercing defender counters into the
        // attacker's 400 defense for 600 through damage.
        let attacker = put_character(
            &mut state,
            PlayerId::ONE,
            1,
            CardDefinition::character(CardId::new(1), "Berserker", 3, 1000, 400),
        );
        let defender = put_character(
            &mut state,
            PlayerId::TWO,
            2,
            CardDefinition::character(CardId::new(2), "Thornguard", 3, 1000, 1000)
                .with_counter_attack()
                .with_piercing(),
        );

        let outcome = resolve_character_battle(&mut state, PlayerId::ONE, attacker, defender);

        assert!(outcome.attacker_destroyed);
        assert_eq!(outcome.counter_piercing_damage, 600);
        assert_eq!(state.player(PlayerId::ONE).life_points(), 3400);
        assert_eq!(state.player(PlayerId::TWO).life_points(), 4000);
    }

    #[test]
    fn test_field_card_boost_and_rollback() {
        let mut state = duel();
        let category = Category::new("Beast");

        let beast = put_character(
            &mut state,
            PlayerId::ONE,
            1,
            CardDefinition::character(CardId::new(1), "Dire Wolf", 2, 1000, 800)
                .with_category(category.clone()),
        );

        let grove = CardInstance::new(
            InstanceId(2),
            CardDefinition::field(CardId::new(2), "Wild Grove", 2).with_field_data(FieldData {
                modifies_stats: true,
                attack_modifier: 300,
                defense_modifier: 100,
                affects_own_field: true,
                allows_deck_search: false,
                prevent_battle_destruction: false,
                provides_life_recovery: false,
                categories: Vec::new(),
                affected_categories: vec![category],
                affected_elements: Vec::new(),
            }),
        );
        state.player_mut(PlayerId::ONE).place_field_card(grove, 0);

        let card = state.player(PlayerId::ONE).character(beast).unwrap();
        assert_eq!(effective_attack(&state, PlayerId::ONE, card), 1300);
        assert_eq!(effective_defense(&state, PlayerId::ONE, card), 900);

        // Evicting the field card removes the boost with no explicit undo.
        let plain = CardInstance::new(
            InstanceId(3),
            CardDefinition::field(CardId::new(3), "Barren Plain", 1),
        );
        state.player_mut(PlayerId::ONE).place_field_card(plain, 1);

        let card = state.player(PlayerId::ONE).character(beast).unwrap();
        assert_eq!(effective_attack(&state, PlayerId::ONE, card), 1000);
        assert_eq!(effective_defense(&state, PlayerId::ONE, card), 800);
    }

    #[test]
    fn test_opposing_field_card_debuff() {
        let mut state = duel();
        let victim = put_character(
            &mut state,
            PlayerId::ONE,
            1,
            CardDefinition::character(CardId::new(1), "Squire", 1, 900, 900),
        );

        let miasma = CardInstance::new(
            InstanceId(2),
            CardDefinition::field(CardId::new(2), "Miasma", 2).with_field_data(FieldData {
                modifies_stats: true,
                attack_modifier: -200,
                defense_modifier: -200,
                affects_own_field: false,
                allows_deck_search: false,
                prevent_battle_destruction: false,
                provides_life_recovery: false,
                categories: Vec::new(),
                affected_categories: Vec::new(),
                affected_elements: Vec::new(),
            }),
        );
        state.player_mut(PlayerId::TWO).place_field_card(miasma, 0);

        let card = state.player(PlayerId::ONE).character(victim).unwrap();
        assert_eq!(effective_attack(&state, PlayerId::ONE, card), 700);
        // Does not debuff its own side.
        assert!(state.player(PlayerId::TWO).character_field().is_empty());
    }

    #[test]
    fn test_category_boost_from_friendly_character() {
        let mut state = duel();
        let category = Category::new("Dragon");

        let hatchling = put_character(
            &mut state,
            PlayerId::ONE,
            1,
            CardDefinition::character(CardId::new(1), "Hatchling", 1, 400, 400)
                .with_category(category.clone()),
        );
        put_character(
            &mut state,
            PlayerId::ONE,
            2,
            CardDefinition::character(CardId::new(2), "Broodmother", 4, 1200, 1200)
                .with_category(category.clone())
                .with_effect(Effect::CategoryBoost {
                    category: category.clone(),
                    attack: 500,
                    defense: 0,
                }),
        );

        let card = state.player(PlayerId::ONE).character(hatchling).unwrap();
        assert_eq!(effective_attack(&state, PlayerId::ONE, card), 900);

        // The source boosts itself too; it matches its own category.
        let source = state.player(PlayerId::ONE).character(InstanceId(2)).unwrap();
        assert_eq!(effective_attack(&state, PlayerId::ONE, source), 1700);
    }

    #[test]
    fn test_prevent_battle_destruction() {
        let mut state = duel();

        let attacker = put_character(
            &mut state,
            PlayerId::ONE,
            1,
            CardDefinition::character(CardId::new(1), "Giant", 5, 2500, 2000).with_piercing(),
        );
        let defender = put_character(
            &mut state,
            PlayerId::TWO,
            2,
            CardDefinition::character(CardId::new(2), "Acolyte", 1, 300, 500),
        );

        let sanctuary = CardInstance::new(
            InstanceId(3),
            CardDefinition::field(CardId::new(3), "Sanctuary", 2).with_field_data(FieldData {
                modifies_stats: false,
                attack_modifier: 0,
                defense_modifier: 0,
                affects_own_field: true,
                allows_deck_search: false,
                prevent_battle_destruction: true,
                provides_life_recovery: false,
                categories: Vec::new(),
                affected_categories: Vec::new(),
                affected_elements: Vec::new(),
            }),
        );
        state.player_mut(PlayerId::TWO).place_field_card(sanctuary, 0);

        let outcome = resolve_character_battle(&mut state, PlayerId::ONE, attacker, defender);

        assert!(!outcome.defender_destroyed);
        assert_eq!(state.player(PlayerId::TWO).character_field().len(), 1);
        // Piercing still goes through; protection stops destruction only.
        assert_eq!(outcome.piercing_damage, 2000);
        assert_eq!(state.player(PlayerId::TWO).life_points(), 2000);
    }

    #[test]
    fn test_direct_attack_full_damage() {
        let mut state = duel();
        let attacker = put_character(
            &mut state,
            PlayerId::ONE,
            1,
            CardDefinition::character(CardId::new(1), "Knight", 3, 1500, 1000),
        );

        resolve_direct_attack(&mut state, PlayerId::ONE, attacker);

        assert_eq!(state.player(PlayerId::TWO).life_points(), 2500);
        assert!(state.player(PlayerId::ONE).character(attacker).unwrap().has_attacked_this_turn);
    }

    #[test]
    fn test_lethal_direct_attack_ends_duel() {
        let mut state = duel();
        state.change_life(PlayerId::TWO, -3000);
        let attacker = put_character(
            &mut state,
            PlayerId::ONE,
            1,
            CardDefinition::character(CardId::new(1), "Knight", 3, 1500, 1000),
        );

        resolve_direct_attack(&mut state, PlayerId::ONE, attacker);

        let result = state.outcome().unwrap();
        assert_eq!(result.winner, PlayerId::ONE);
    }
}
