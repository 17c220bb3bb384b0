//! Shared fixtures: archetype decks and recording plumbing.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use duelcore::{
    ActivationTiming, CardDefinition, CardId, CardRegistry, DeckDefinition, DuelState, Effect,
    EventObserver, GameEvent, GameEventKind, InstanceId, PlayerId, RecordingNotifier,
};

/// Register twenty variants built by `make` and return a legal 40-card deck
/// holding two copies of each, so every opening hand is drawn from one
/// archetype.
pub fn archetype_deck(
    db: &mut CardRegistry,
    base_id: u32,
    make: impl Fn(CardId, u32) -> CardDefinition,
) -> DeckDefinition {
    let mut ids = Vec::with_capacity(40);
    for i in 0..20 {
        let id = CardId::new(base_id + i);
        db.register(make(id, i));
        ids.push(id);
        ids.push(id);
    }
    DeckDefinition::new(ids)
}

pub fn knight(id: CardId, i: u32) -> CardDefinition {
    CardDefinition::character(id, format!("Knight {i}"), 3, 1500, 1000)
}

pub fn wall(id: CardId, i: u32) -> CardDefinition {
    CardDefinition::character(id, format!("Wall {i}"), 2, 300, 1200)
}

pub fn vanilla(id: CardId, i: u32) -> CardDefinition {
    CardDefinition::character(id, format!("Squire {i}"), 1, 500, 500)
}

pub fn guard(id: CardId, i: u32) -> CardDefinition {
    CardDefinition::character(id, format!("Guard {i}"), 2, 400, 1000)
        .with_effect(Effect::AttackTarget)
}

/// Reactive removal: answers any attack declaration by destroying the
/// opponent's strongest character.
pub fn counter_bolt(id: CardId, i: u32) -> CardDefinition {
    CardDefinition::spell(id, format!("Counter Bolt {i}"), 1)
        .reactive_on(ActivationTiming::OnEvents(vec![
            GameEventKind::AttackDeclared,
            GameEventKind::DirectAttack,
        ]))
        .with_effect(Effect::Removal { count: 1 })
}

/// Free reactive cantrip that answers anything; used to force dispatch
/// recursion.
pub fn echo(id: CardId, i: u32) -> CardDefinition {
    CardDefinition::spell(id, format!("Echo {i}"), 0)
        .reactive_on(ActivationTiming::Any)
        .with_effect(Effect::Draw { count: 1 })
}

/// Cheap spell with no recognizable text; the AI never rates it worth
/// casting.
pub fn sigil(id: CardId, i: u32) -> CardDefinition {
    CardDefinition::spell(id, format!("Sigil {i}"), 2)
}

/// Field card that draws a card as it enters play.
pub fn beacon(id: CardId, i: u32) -> CardDefinition {
    CardDefinition::field(id, format!("Beacon {i}"), 1).with_effect(Effect::Draw { count: 1 })
}

/// Field card that heals its owner 300 LP at every turn start.
pub fn sanctum(id: CardId, i: u32) -> CardDefinition {
    let data = duelcore::FieldData {
        modifies_stats: false,
        attack_modifier: 0,
        defense_modifier: 0,
        affects_own_field: true,
        allows_deck_search: false,
        prevent_battle_destruction: false,
        provides_life_recovery: true,
        categories: Vec::new(),
        affected_categories: Vec::new(),
        affected_elements: Vec::new(),
    };
    CardDefinition::field(id, format!("Sanctum {i}"), 1).with_field_data(data)
}

/// First hand card whose name starts with `prefix`.
pub fn in_hand(state: &DuelState, player: PlayerId, prefix: &str) -> InstanceId {
    state
        .player(player)
        .hand()
        .iter()
        .find(|c| c.name().starts_with(prefix))
        .map(|c| c.instance_id)
        .unwrap_or_else(|| panic!("no card named {prefix}* in hand"))
}

/// Shared recorder handle; clone one side into the builder.
pub fn recorder() -> Rc<RefCell<RecordingNotifier>> {
    Rc::new(RefCell::new(RecordingNotifier::new()))
}

/// Observer that collects event kinds in dispatch order.
pub struct KindCollector(pub Rc<RefCell<Vec<GameEventKind>>>);

impl EventObserver for KindCollector {
    fn on_event(&mut self, event: &GameEvent, _state: &DuelState) {
        self.0.borrow_mut().push(event.kind);
    }
}
