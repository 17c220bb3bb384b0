//! Player identity and per-player duel state.
//!
//! ## Mutation boundary
//!
//! `PlayerState` exposes read accessors publicly but keeps every mutator
//! `pub(crate)`: only the engine (turn handlers, effect resolution, the
//! battle resolver) may change a player's resources or zones. There is no
//! concurrent writer, so this visibility boundary is the whole
//! shared-resource policy.

use serde::{Deserialize, Serialize};

use crate::cards::{CardInstance, InstanceId};
use crate::core::rng::DuelRng;
use crate::effects::Effect;
use crate::error::DrawError;

/// Starting life points.
pub const STARTING_LIFE: i32 = 4000;
/// Starting energy.
pub const STARTING_ENERGY: i32 = 3;
/// Soft hand cap; a draw beyond this forces a random discard.
pub const HAND_LIMIT: usize = 7;
/// Maximum characters on one player's field.
pub const CHARACTER_FIELD_LIMIT: usize = 5;
/// Number of field-card slots. At most one may be occupied by rule.
pub const FIELD_SLOT_COUNT: usize = 3;

/// One of the two seats in a duel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(u8);

impl PlayerId {
    pub const ONE: PlayerId = PlayerId(0);
    pub const TWO: PlayerId = PlayerId(1);

    /// Both seats, in order.
    #[must_use]
    pub const fn both() -> [PlayerId; 2] {
        [PlayerId::ONE, PlayerId::TWO]
    }

    /// Zero-based index into per-player arrays.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The other seat.
    #[must_use]
    pub const fn opponent(self) -> PlayerId {
        PlayerId(1 - self.0)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0 + 1)
    }
}

/// Who makes decisions for a seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Controller {
    Human,
    Ai,
}

/// The outcome of one draw, including any forced discard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DrawOutcome {
    pub drawn: InstanceId,
    pub drawn_name: String,
    /// Name of the card randomly discarded because the hand exceeded
    /// [`HAND_LIMIT`]. `None` when the draw fit.
    pub forced_discard: Option<String>,
}

/// One player's resources and zones.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerState {
    name: String,
    controller: Controller,
    life_points: i32,
    energy: i32,
    /// Top of the deck is the end of the vec.
    deck: Vec<CardInstance>,
    hand: Vec<CardInstance>,
    graveyard: Vec<CardInstance>,
    character_field: Vec<CardInstance>,
    field_slots: [Option<CardInstance>; FIELD_SLOT_COUNT],
    last_played_card: Option<InstanceId>,
    cannot_draw_card: bool,
}

impl PlayerState {
    #[must_use]
    pub fn new(name: impl Into<String>, controller: Controller) -> Self {
        Self {
            name: name.into(),
            controller,
            life_points: STARTING_LIFE,
            energy: STARTING_ENERGY,
            deck: Vec::new(),
            hand: Vec::new(),
            graveyard: Vec::new(),
            character_field: Vec::new(),
            field_slots: [None, None, None],
            last_played_card: None,
            cannot_draw_card: false,
        }
    }

    // === Read accessors ===

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn controller(&self) -> Controller {
        self.controller
    }

    #[must_use]
    pub fn life_points(&self) -> i32 {
        self.life_points
    }

    #[must_use]
    pub fn energy(&self) -> i32 {
        self.energy
    }

    #[must_use]
    pub fn deck_size(&self) -> usize {
        self.deck.len()
    }

    #[must_use]
    pub fn hand(&self) -> &[CardInstance] {
        &self.hand
    }

    #[must_use]
    pub fn graveyard(&self) -> &[CardInstance] {
        &self.graveyard
    }

    #[must_use]
    pub fn character_field(&self) -> &[CardInstance] {
        &self.character_field
    }

    #[must_use]
    pub fn field_slots(&self) -> &[Option<CardInstance>; FIELD_SLOT_COUNT] {
        &self.field_slots
    }

    /// The single active field card, if any.
    #[must_use]
    pub fn active_field_card(&self) -> Option<&CardInstance> {
        self.field_slots.iter().flatten().next()
    }

    #[must_use]
    pub fn last_played_card(&self) -> Option<InstanceId> {
        self.last_played_card
    }

    #[must_use]
    pub fn cannot_draw(&self) -> bool {
        self.cannot_draw_card
    }

    /// Position of a card in hand, by instance.
    #[must_use]
    pub fn hand_position(&self, id: InstanceId) -> Option<usize> {
        self.hand.iter().position(|c| c.instance_id == id)
    }

    /// A character on the field, by instance.
    #[must_use]
    pub fn character(&self, id: InstanceId) -> Option<&CardInstance> {
        self.character_field.iter().find(|c| c.instance_id == id)
    }

    /// Effective cost of a hand card: base cost, minus the card's own
    /// per-turn reduction, minus active `CategoryCostReduction` sources on
    /// this player's field, floored at zero.
    #[must_use]
    pub fn effective_cost(&self, card: &CardInstance) -> i32 {
        let mut cost = card.reduced_cost();
        for source in self.persistent_sources() {
            for effect in &source.definition.effects {
                if let Effect::CategoryCostReduction { category, amount } = effect {
                    if card.has_category(category) {
                        cost -= amount;
                    }
                }
            }
        }
        cost.max(0)
    }

    /// All on-field cards whose attached effects are currently live:
    /// field characters plus the active field card.
    pub fn persistent_sources(&self) -> impl Iterator<Item = &CardInstance> {
        self.character_field
            .iter()
            .chain(self.field_slots.iter().flatten())
    }

    // === Engine-only mutators ===

    pub(crate) fn set_deck(&mut self, deck: Vec<CardInstance>) {
        self.deck = deck;
    }

    /// Draw one card. On an empty deck this flips `cannot_draw_card`
    /// (a loss condition checked by the match controller) and fails.
    pub(crate) fn draw_card(&mut self, rng: &mut DuelRng) -> Result<DrawOutcome, DrawError> {
        let Some(card) = self.deck.pop() else {
            self.cannot_draw_card = true;
            return Err(DrawError::DeckEmpty);
        };

        let drawn = card.instance_id;
        let drawn_name = card.name().to_string();
        let forced_discard = self.add_to_hand(card, rng);

        Ok(DrawOutcome {
            drawn,
            drawn_name,
            forced_discard,
        })
    }

    /// Append a card to hand, enforcing [`HAND_LIMIT`] with a uniformly
    /// random discard to graveyard. Returns the discarded card's name.
    pub(crate) fn add_to_hand(
        &mut self,
        card: CardInstance,
        rng: &mut DuelRng,
    ) -> Option<String> {
        self.hand.push(card);
        if self.hand.len() > HAND_LIMIT {
            let index = rng.pick_index(self.hand.len());
            let discarded = self.hand.remove(index);
            let name = discarded.name().to_string();
            self.graveyard.push(discarded);
            Some(name)
        } else {
            None
        }
    }

    /// Apply a life delta, clamping at zero. Returns the new total.
    /// Victory checking is the caller's responsibility
    /// (`DuelState::change_life` runs it synchronously).
    pub(crate) fn change_life(&mut self, delta: i32) -> i32 {
        self.life_points = (self.life_points + delta).max(0);
        self.life_points
    }

    /// Apply an energy delta, clamping at zero. Returns the new total.
    pub(crate) fn change_energy(&mut self, delta: i32) -> i32 {
        self.energy = (self.energy + delta).max(0);
        self.energy
    }

    pub(crate) fn take_from_hand(&mut self, index: usize) -> CardInstance {
        self.hand.remove(index)
    }

    /// Put a character on the field. Capacity was validated by the caller.
    pub(crate) fn place_character(&mut self, card: CardInstance) {
        debug_assert!(self.character_field.len() < CHARACTER_FIELD_LIMIT);
        self.character_field.push(card);
    }

    /// Occupy a field slot, evicting any currently active field card to the
    /// graveyard first so at most one stays active. Returns the evicted
    /// card's name.
    pub(crate) fn place_field_card(&mut self, card: CardInstance, slot: usize) -> Option<String> {
        debug_assert!(slot < FIELD_SLOT_COUNT);
        let mut evicted_name = None;
        for occupied in &mut self.field_slots {
            if let Some(old) = occupied.take() {
                evicted_name = Some(old.name().to_string());
                self.graveyard.push(old);
            }
        }
        self.field_slots[slot] = Some(card);
        evicted_name
    }

    /// Remove a character from the field (it is NOT sent to the graveyard;
    /// destruction processing owns that step).
    pub(crate) fn remove_character(&mut self, id: InstanceId) -> Option<CardInstance> {
        let index = self
            .character_field
            .iter()
            .position(|c| c.instance_id == id)?;
        Some(self.character_field.remove(index))
    }

    pub(crate) fn send_to_graveyard(&mut self, card: CardInstance) {
        self.graveyard.push(card);
    }

    /// Move the first graveyard card matching `predicate` back to hand.
    pub(crate) fn retrieve_from_graveyard(
        &mut self,
        predicate: impl Fn(&CardInstance) -> bool,
        rng: &mut DuelRng,
    ) -> Option<(String, Option<String>)> {
        let index = self.graveyard.iter().position(|c| predicate(c))?;
        let card = self.graveyard.remove(index);
        let name = card.name().to_string();
        let discard = self.add_to_hand(card, rng);
        Some((name, discard))
    }

    /// Move the first deck card matching `predicate` to hand, then shuffle.
    pub(crate) fn search_deck(
        &mut self,
        predicate: impl Fn(&CardInstance) -> bool,
        rng: &mut DuelRng,
    ) -> Option<(String, Option<String>)> {
        let index = self.deck.iter().position(|c| predicate(c))?;
        let card = self.deck.remove(index);
        let name = card.name().to_string();
        let discard = self.add_to_hand(card, rng);
        rng.shuffle(&mut self.deck);
        Some((name, discard))
    }

    pub(crate) fn mark_attacked(&mut self, id: InstanceId) {
        if let Some(card) = self
            .character_field
            .iter_mut()
            .find(|c| c.instance_id == id)
        {
            card.has_attacked_this_turn = true;
        }
    }

    pub(crate) fn set_last_played(&mut self, id: InstanceId) {
        self.last_played_card = Some(id);
    }

    /// Reset per-turn flags on every owned instance (field and hand).
    pub(crate) fn reset_turn_flags(&mut self) {
        for card in self
            .character_field
            .iter_mut()
            .chain(self.hand.iter_mut())
        {
            card.reset_turn_flags();
        }
    }

    /// Does any field character carry an `AttackTarget` effect?
    /// Such a character draws all attacks while it is on the field.
    #[must_use]
    pub fn taunt_character(&self) -> Option<&CardInstance> {
        self.character_field.iter().find(|c| {
            c.definition
                .effects
                .iter()
                .any(|e| matches!(e, Effect::AttackTarget))
        })
    }
}
