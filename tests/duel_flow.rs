//! End-to-end turn and combat flow through the public API.

mod common;

use common::*;
use duelcore::{
    Controller, MatchBuilder, MatchContext, MatchError, PlayError, PlayerId, TurnPhase,
    VictoryReason,
};

fn knights_vs_walls(seed: u64) -> MatchContext {
    let mut db = duelcore::CardRegistry::new();
    let knights = archetype_deck(&mut db, 100, knight);
    let walls = archetype_deck(&mut db, 200, wall);

    MatchBuilder::new(seed)
        .player("Alice", Controller::Human, knights)
        .player("Bob", Controller::Human, walls)
        .first_player(PlayerId::ONE)
        .build(&db)
        .expect("valid decks")
}

#[test]
fn opening_hand_energy_and_phase() {
    let mut duel = knights_vs_walls(1);
    duel.start_game().unwrap();

    let state = duel.state();
    // Opening five plus the automatic turn-start draw.
    assert_eq!(state.player(PlayerId::ONE).hand().len(), 6);
    assert_eq!(state.player(PlayerId::TWO).hand().len(), 5);
    assert_eq!(state.player(PlayerId::ONE).energy(), 6);
    assert_eq!(state.player(PlayerId::ONE).deck_size(), 34);
    assert_eq!(state.turn_number(), 1);
    assert_eq!(state.phase(), TurnPhase::Action);
    assert_eq!(state.active_player(), PlayerId::ONE);
}

#[test]
fn summoning_spends_energy_until_it_runs_out() {
    let mut duel = knights_vs_walls(2);
    duel.start_game().unwrap();

    let first = in_hand(duel.state(), PlayerId::ONE, "Knight");
    duel.play_card(PlayerId::ONE, first, None).unwrap();
    assert_eq!(duel.state().player(PlayerId::ONE).energy(), 3);

    let second = in_hand(duel.state(), PlayerId::ONE, "Knight");
    duel.play_card(PlayerId::ONE, second, None).unwrap();
    assert_eq!(duel.state().player(PlayerId::ONE).energy(), 0);
    assert_eq!(duel.state().player(PlayerId::ONE).character_field().len(), 2);

    let third = in_hand(duel.state(), PlayerId::ONE, "Knight");
    let err = duel.play_card(PlayerId::ONE, third, None).unwrap_err();
    assert_eq!(
        err,
        MatchError::Play(PlayError::InsufficientEnergy { need: 3, have: 0 })
    );
    // The rejected play changed nothing.
    assert_eq!(duel.state().player(PlayerId::ONE).hand().len(), 4);
}

#[test]
fn the_first_player_cannot_attack_on_turn_one() {
    let mut duel = knights_vs_walls(3);
    duel.start_game().unwrap();

    let card = in_hand(duel.state(), PlayerId::ONE, "Knight");
    duel.play_card(PlayerId::ONE, card, None).unwrap();

    let err = duel.attack(PlayerId::ONE, card, None).unwrap_err();
    assert_eq!(err, MatchError::Play(PlayError::FirstTurnAttackBan));
}

#[test]
fn battle_and_direct_attack_across_turns() {
    let mut duel = knights_vs_walls(4);
    duel.start_game().unwrap();

    // Turn 1: Alice summons and passes.
    let knight_id = in_hand(duel.state(), PlayerId::ONE, "Knight");
    duel.play_card(PlayerId::ONE, knight_id, None).unwrap();
    duel.go_to_end_phase(PlayerId::ONE).unwrap();
    duel.tick(500).unwrap();

    // Turn 2: Bob summons a wall and passes.
    assert_eq!(duel.state().active_player(), PlayerId::TWO);
    let wall_id = in_hand(duel.state(), PlayerId::TWO, "Wall");
    duel.play_card(PlayerId::TWO, wall_id, None).unwrap();
    duel.go_to_end_phase(PlayerId::TWO).unwrap();
    duel.tick(500).unwrap();

    // Turn 3: the knight (1500 ATK) destroys the wall (1200 DEF).
    assert_eq!(duel.state().turn_number(), 3);
    let outcome = duel
        .attack(PlayerId::ONE, knight_id, Some(wall_id))
        .unwrap();
    assert!(outcome.defender_destroyed);
    assert!(!outcome.attacker_destroyed);
    assert!(duel.state().player(PlayerId::TWO).character_field().is_empty());
    // No piercing: life untouched.
    assert_eq!(duel.state().player(PlayerId::TWO).life_points(), 4000);

    // One attack per character per turn.
    let err = duel.attack(PlayerId::ONE, knight_id, None).unwrap_err();
    assert_eq!(err, MatchError::Play(PlayError::AlreadyAttacked));

    // A second knight hits directly now that the field is empty.
    let second = in_hand(duel.state(), PlayerId::ONE, "Knight");
    duel.play_card(PlayerId::ONE, second, None).unwrap();
    duel.attack(PlayerId::ONE, second, None).unwrap();
    assert_eq!(duel.state().player(PlayerId::TWO).life_points(), 2500);
}

#[test]
fn direct_attack_requires_an_empty_field() {
    let mut duel = knights_vs_walls(5);
    duel.start_game().unwrap();

    let knight_id = in_hand(duel.state(), PlayerId::ONE, "Knight");
    duel.play_card(PlayerId::ONE, knight_id, None).unwrap();
    duel.go_to_end_phase(PlayerId::ONE).unwrap();
    duel.tick(500).unwrap();

    let wall_id = in_hand(duel.state(), PlayerId::TWO, "Wall");
    duel.play_card(PlayerId::TWO, wall_id, None).unwrap();
    duel.go_to_end_phase(PlayerId::TWO).unwrap();
    duel.tick(500).unwrap();

    let err = duel.attack(PlayerId::ONE, knight_id, None).unwrap_err();
    assert_eq!(err, MatchError::Play(PlayError::FieldNotEmpty));
}

#[test]
fn a_taunt_character_draws_all_attacks() {
    let mut db = duelcore::CardRegistry::new();
    let knights = archetype_deck(&mut db, 100, knight);
    let guards = archetype_deck(&mut db, 200, guard);
    let mut duel = MatchBuilder::new(6)
        .player("Alice", Controller::Human, knights)
        .player("Bob", Controller::Human, guards)
        .first_player(PlayerId::TWO)
        .build(&db)
        .unwrap();
    duel.start_game().unwrap();

    // Bob fields two guards; the first one placed is the active taunt.
    let first_guard = in_hand(duel.state(), PlayerId::TWO, "Guard");
    duel.play_card(PlayerId::TWO, first_guard, None).unwrap();
    let second_guard = in_hand(duel.state(), PlayerId::TWO, "Guard");
    duel.play_card(PlayerId::TWO, second_guard, None).unwrap();
    duel.go_to_end_phase(PlayerId::TWO).unwrap();
    duel.tick(500).unwrap();

    let knight_id = in_hand(duel.state(), PlayerId::ONE, "Knight");
    duel.play_card(PlayerId::ONE, knight_id, None).unwrap();

    let err = duel
        .attack(PlayerId::ONE, knight_id, Some(second_guard))
        .unwrap_err();
    assert_eq!(err, MatchError::Play(PlayError::MustTargetDefender));
    let err = duel.attack(PlayerId::ONE, knight_id, None).unwrap_err();
    assert_eq!(err, MatchError::Play(PlayError::MustTargetDefender));

    let outcome = duel
        .attack(PlayerId::ONE, knight_id, Some(first_guard))
        .unwrap();
    assert!(outcome.defender_destroyed);
}

#[test]
fn field_cards_need_a_slot_and_evict_their_predecessor() {
    let mut db = duelcore::CardRegistry::new();
    let sanctums = archetype_deck(&mut db, 100, sanctum);
    let walls = archetype_deck(&mut db, 200, wall);
    let mut duel = MatchBuilder::new(10)
        .player("Alice", Controller::Human, sanctums)
        .player("Bob", Controller::Human, walls)
        .first_player(PlayerId::ONE)
        .build(&db)
        .unwrap();
    duel.start_game().unwrap();

    let first = in_hand(duel.state(), PlayerId::ONE, "Sanctum");
    let err = duel.play_card(PlayerId::ONE, first, None).unwrap_err();
    assert_eq!(err, MatchError::Play(PlayError::MissingFieldSlot));
    let err = duel.play_card(PlayerId::ONE, first, Some(5)).unwrap_err();
    assert_eq!(err, MatchError::Play(PlayError::FieldSlotOutOfRange(5)));

    duel.play_card(PlayerId::ONE, first, Some(0)).unwrap();
    assert_eq!(
        duel.state()
            .player(PlayerId::ONE)
            .active_field_card()
            .map(|c| c.instance_id),
        Some(first)
    );

    // A replacement sends the active field card to the graveyard.
    let second = in_hand(duel.state(), PlayerId::ONE, "Sanctum");
    duel.play_card(PlayerId::ONE, second, Some(2)).unwrap();
    let alice = duel.state().player(PlayerId::ONE);
    assert_eq!(alice.field_slots().iter().flatten().count(), 1);
    assert_eq!(
        alice.active_field_card().map(|c| c.instance_id),
        Some(second)
    );
    assert_eq!(alice.graveyard().len(), 1);

    // The sanctum heals its owner at the next turn start.
    duel.go_to_end_phase(PlayerId::ONE).unwrap();
    duel.tick(500).unwrap();
    duel.go_to_end_phase(PlayerId::TWO).unwrap();
    duel.tick(500).unwrap();
    assert_eq!(duel.state().player(PlayerId::ONE).life_points(), 4300);
}

#[test]
fn a_field_card_resolves_its_entry_effect() {
    let mut db = duelcore::CardRegistry::new();
    let beacons = archetype_deck(&mut db, 100, beacon);
    let walls = archetype_deck(&mut db, 200, wall);
    let mut duel = MatchBuilder::new(11)
        .player("Alice", Controller::Human, beacons)
        .player("Bob", Controller::Human, walls)
        .first_player(PlayerId::ONE)
        .build(&db)
        .unwrap();
    duel.start_game().unwrap();
    assert_eq!(duel.state().player(PlayerId::ONE).hand().len(), 6);
    assert_eq!(duel.state().player(PlayerId::ONE).deck_size(), 34);

    // The beacon leaves the hand but draws a replacement as it enters play.
    let card = in_hand(duel.state(), PlayerId::ONE, "Beacon");
    duel.play_card(PlayerId::ONE, card, Some(0)).unwrap();
    assert_eq!(duel.state().player(PlayerId::ONE).hand().len(), 6);
    assert_eq!(duel.state().player(PlayerId::ONE).deck_size(), 33);
}

#[test]
fn notices_carry_display_durations() {
    let handle = recorder();
    let mut db = duelcore::CardRegistry::new();
    let knights = archetype_deck(&mut db, 100, knight);
    let walls = archetype_deck(&mut db, 200, wall);
    let mut duel = MatchBuilder::new(12)
        .player("Alice", Controller::Human, knights)
        .player("Bob", Controller::Human, walls)
        .first_player(PlayerId::ONE)
        .notifier(Box::new(handle.clone()))
        .build(&db)
        .unwrap();
    duel.start_game().unwrap();
    duel.go_to_end_phase(PlayerId::ONE).unwrap();

    let seen = handle.borrow();
    assert_eq!(seen.messages.len(), seen.durations.len());
    for ((kind, _), duration) in seen.messages.iter().zip(&seen.durations) {
        let expected = match kind {
            duelcore::NotificationKind::MatchOver => 5.0,
            duelcore::NotificationKind::PhaseChange => 1.5,
            _ => 2.5,
        };
        assert_eq!(*duration, expected);
    }
    assert!(seen
        .messages
        .iter()
        .any(|(kind, _)| *kind == duelcore::NotificationKind::PhaseChange));
}

#[test]
fn acting_out_of_turn_or_phase_is_rejected() {
    let mut duel = knights_vs_walls(7);
    duel.start_game().unwrap();

    let bob_card = in_hand(duel.state(), PlayerId::TWO, "Wall");
    let err = duel.play_card(PlayerId::TWO, bob_card, None).unwrap_err();
    assert_eq!(err, MatchError::Play(PlayError::NotYourTurn));

    duel.go_to_end_phase(PlayerId::ONE).unwrap();
    let alice_card = in_hand(duel.state(), PlayerId::ONE, "Knight");
    let err = duel.play_card(PlayerId::ONE, alice_card, None).unwrap_err();
    assert_eq!(
        err,
        MatchError::Play(PlayError::WrongPhase(TurnPhase::End))
    );
}

#[test]
fn the_hand_cap_forces_discards_over_time() {
    let mut duel = knights_vs_walls(8);
    duel.start_game().unwrap();

    // Nobody plays anything for ten turns; hands fill to the cap and the
    // overflow goes to the graveyard.
    for _ in 0..10 {
        let active = duel.state().active_player();
        duel.go_to_end_phase(active).unwrap();
        duel.tick(500).unwrap();
        assert!(duel.state().player(PlayerId::ONE).hand().len() <= 7);
        assert!(duel.state().player(PlayerId::TWO).hand().len() <= 7);
    }

    assert!(!duel.state().player(PlayerId::ONE).graveyard().is_empty());
    assert!(!duel.state().player(PlayerId::TWO).graveyard().is_empty());
}

#[test]
fn lethal_battle_damage_ends_the_match_immediately() {
    let mut duel = knights_vs_walls(9);
    duel.start_game().unwrap();

    // Grind Bob down with direct knight attacks; 4000 LP / 1500 = 3 hits.
    let mut turns = 0;
    while !duel.state().is_over() {
        turns += 1;
        assert!(turns < 20, "the duel should end by direct damage");

        if duel.state().active_player() == PlayerId::ONE {
            if let Some(card) = duel
                .state()
                .player(PlayerId::ONE)
                .hand()
                .first()
                .map(|c| c.instance_id)
            {
                let _ = duel.play_card(PlayerId::ONE, card, None);
            }
            if !duel.state().is_opening_turn() {
                let attackers: Vec<_> = duel
                    .state()
                    .player(PlayerId::ONE)
                    .character_field()
                    .iter()
                    .map(|c| c.instance_id)
                    .collect();
                for attacker in attackers {
                    if duel.state().is_over() {
                        break;
                    }
                    let _ = duel.attack(PlayerId::ONE, attacker, None);
                }
            }
        }
        if duel.state().is_over() {
            break;
        }
        let active = duel.state().active_player();
        duel.go_to_end_phase(active).unwrap();
        duel.tick(500).unwrap();
    }

    let result = duel.state().outcome().unwrap();
    assert_eq!(result.winner, PlayerId::ONE);
    assert_eq!(result.reason, VictoryReason::LifeDepleted);
    assert_eq!(duel.state().player(PlayerId::TWO).life_points(), 0);

    // Nothing works after the match ends.
    let err = duel.go_to_end_phase(PlayerId::ONE).unwrap_err();
    assert_eq!(err, MatchError::Play(PlayError::MatchOver));
}
