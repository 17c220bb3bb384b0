//! Unattended AI-vs-AI matches: termination, determinism, deck-out.

mod common;

use common::*;
use duelcore::{Controller, MatchBuilder, MatchContext, PlayerId, VictoryReason};

fn ai_match(seed: u64, deck_a: fn(duelcore::CardId, u32) -> duelcore::CardDefinition,
            deck_b: fn(duelcore::CardId, u32) -> duelcore::CardDefinition) -> MatchContext {
    let mut db = duelcore::CardRegistry::new();
    let a = archetype_deck(&mut db, 100, deck_a);
    let b = archetype_deck(&mut db, 200, deck_b);

    MatchBuilder::new(seed)
        .player("Aggro", Controller::Ai, a)
        .player("Pile", Controller::Ai, b)
        .first_player(PlayerId::ONE)
        .build(&db)
        .unwrap()
}

#[test]
fn a_stronger_ai_deck_wins_by_damage() {
    let mut duel = ai_match(11, knight, vanilla);
    duel.start_game().unwrap();
    duel.run().unwrap();

    let result = duel.state().outcome().expect("the duel terminates");
    assert_eq!(result.winner, PlayerId::ONE);
    assert_eq!(result.reason, VictoryReason::LifeDepleted);
    assert_eq!(duel.state().player(PlayerId::TWO).life_points(), 0);
    // Nothing left pending once the match settles.
    assert_eq!(duel.scheduler().pending(), 0);
}

#[test]
fn matches_with_the_same_seed_replay_identically() {
    let run_once = |seed: u64| {
        let mut duel = ai_match(seed, knight, vanilla);
        duel.start_game().unwrap();
        duel.run().unwrap();
        (
            duel.state().outcome().unwrap(),
            duel.state().turn_number(),
            duel.state().player(PlayerId::ONE).life_points(),
            duel.state().player(PlayerId::TWO).life_points(),
            duel.state().player(PlayerId::ONE).deck_size(),
        )
    };

    assert_eq!(run_once(42), run_once(42));
}

#[test]
fn two_passive_decks_grind_to_deck_out() {
    // Sigils never clear the casting threshold, so neither AI ever acts and
    // the first player exhausts their deck first.
    let mut duel = ai_match(13, sigil, sigil);
    duel.start_game().unwrap();
    duel.run().unwrap();

    let result = duel.state().outcome().expect("the duel terminates");
    assert_eq!(result.reason, VictoryReason::DeckOut);
    assert_eq!(result.winner, PlayerId::TWO);
    assert_eq!(duel.state().player(PlayerId::ONE).deck_size(), 0);
}

#[test]
fn an_unseeded_first_player_is_still_deterministic() {
    let run_once = || {
        let mut db = duelcore::CardRegistry::new();
        let a = archetype_deck(&mut db, 100, vanilla);
        let b = archetype_deck(&mut db, 200, vanilla);
        let mut duel = MatchBuilder::new(99)
            .player("One", Controller::Ai, a)
            .player("Two", Controller::Ai, b)
            .build(&db)
            .unwrap();
        let first = duel.state().first_player();
        duel.start_game().unwrap();
        duel.run().unwrap();
        (first, duel.state().outcome().unwrap())
    };

    assert_eq!(run_once(), run_once());
}
