//! Card definitions and runtime instances.
//!
//! `CardDefinition` is the immutable, authored description of a card. The
//! engine never mutates definitions; when a deck is loaded each entry is
//! cloned into a `CardInstance` so two copies of "the same card" carry
//! independent per-turn state.
//!
//! The card kinds form a closed tagged union (`CardKind`): exhaustive
//! matching replaces the dynamic subclass dispatch of typical ports of this
//! design, so "none of the branches matched" cannot happen silently.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::effects::Effect;
use crate::events::GameEventKind;

/// Identifier of an authored card definition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Identifier of a runtime card instance, unique within one match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(pub u32);

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Instance({})", self.0)
    }
}

/// Tag-based grouping used by targeted effects and field modifiers.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Category(pub String);

impl Category {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Elemental alignment of a character card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Water,
    Earth,
    Wind,
    Light,
    Dark,
    Neutral,
}

/// Character-specific data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterData {
    /// Base attack power.
    pub attack: i32,
    /// Base defense power.
    pub defense: i32,
    pub element: Element,
    pub categories: Vec<Category>,
    /// Excess attack over the defender's defense hits the owner's life.
    pub allows_piercing: bool,
    /// Surviving defenders with this flag strike back.
    pub can_counter_attack: bool,
}

/// When an opponent-turn spell may be activated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationTiming {
    /// Any qualifying event opens the activation window.
    Any,
    /// Only the listed event kinds open the window.
    OnEvents(Vec<GameEventKind>),
}

impl ActivationTiming {
    /// Does an event of this kind open the activation window?
    #[must_use]
    pub fn matches(&self, kind: GameEventKind) -> bool {
        match self {
            ActivationTiming::Any => true,
            ActivationTiming::OnEvents(kinds) => kinds.contains(&kind),
        }
    }
}

/// Spell-specific data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpellData {
    /// May this spell be activated during the opponent's turn?
    pub opponent_turn: bool,
    pub timing: ActivationTiming,
}

/// Field-card-specific data.
///
/// Empty `affected_categories` / `affected_elements` mean "all".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldData {
    pub modifies_stats: bool,
    pub attack_modifier: i32,
    pub defense_modifier: i32,
    /// `true`: modifies the owner's characters; `false`: the opponent's.
    pub affects_own_field: bool,
    pub allows_deck_search: bool,
    pub prevent_battle_destruction: bool,
    pub provides_life_recovery: bool,
    /// The card's own categories; distinct from the filter below.
    pub categories: Vec<Category>,
    pub affected_categories: Vec<Category>,
    pub affected_elements: Vec<Element>,
}

impl FieldData {
    /// Does this field card's filter match the given character?
    #[must_use]
    pub fn affects(&self, character: &CharacterData) -> bool {
        let category_ok = self.affected_categories.is_empty()
            || character
                .categories
                .iter()
                .any(|c| self.affected_categories.contains(c));
        let element_ok = self.affected_elements.is_empty()
            || self.affected_elements.contains(&character.element);
        category_ok && element_ok
    }
}

/// The closed set of card kinds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardKind {
    Character(CharacterData),
    Spell(SpellData),
    Field(FieldData),
}

/// An authored, immutable card definition.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,
    pub name: String,
    pub description: String,
    /// Base energy cost to play.
    pub cost: i32,
    /// Asset reference, opaque to the engine.
    pub artwork: String,
    pub effects: SmallVec<[Effect; 2]>,
    pub kind: CardKind,
}

impl CardDefinition {
    /// Create a character card definition.
    #[must_use]
    pub fn character(id: CardId, name: impl Into<String>, cost: i32, attack: i32, defense: i32) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            cost,
            artwork: String::new(),
            effects: SmallVec::new(),
            kind: CardKind::Character(CharacterData {
                attack,
                defense,
                element: Element::Neutral,
                categories: Vec::new(),
                allows_piercing: false,
                can_counter_attack: false,
            }),
        }
    }

    /// Create a spell card definition, activatable only on the owner's turn.
    #[must_use]
    pub fn spell(id: CardId, name: impl Into<String>, cost: i32) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            cost,
            artwork: String::new(),
            effects: SmallVec::new(),
            kind: CardKind::Spell(SpellData {
                opponent_turn: false,
                timing: ActivationTiming::Any,
            }),
        }
    }

    /// Create a field card definition with no modifiers or gates set.
    #[must_use]
    pub fn field(id: CardId, name: impl Into<String>, cost: i32) -> Self {
        Self {
            id,
            name: name.into(),
            description: String::new(),
            cost,
            artwork: String::new(),
            effects: SmallVec::new(),
            kind: CardKind::Field(FieldData {
                modifies_stats: false,
                attack_modifier: 0,
                defense_modifier: 0,
                affects_own_field: true,
                allows_deck_search: false,
                prevent_battle_destruction: false,
                provides_life_recovery: false,
                categories: Vec::new(),
                affected_categories: Vec::new(),
                affected_elements: Vec::new(),
            }),
        }
    }

    /// Set the description (builder pattern).
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the artwork reference (builder pattern).
    #[must_use]
    pub fn with_artwork(mut self, artwork: impl Into<String>) -> Self {
        self.artwork = artwork.into();
        self
    }

    /// Attach an effect (builder pattern).
    #[must_use]
    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Add a category. Only meaningful for Character and Field cards.
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        match self.kind {
            CardKind::Character(ref mut data) => data.categories.push(category),
            CardKind::Field(ref mut data) => data.categories.push(category),
            CardKind::Spell(_) => {}
        }
        self
    }

    /// Set the element. Only meaningful for Character cards.
    #[must_use]
    pub fn with_element(mut self, element: Element) -> Self {
        if let CardKind::Character(ref mut data) = self.kind {
            data.element = element;
        }
        self
    }

    /// Enable piercing damage. Only meaningful for Character cards.
    #[must_use]
    pub fn with_piercing(mut self) -> Self {
        if let CardKind::Character(ref mut data) = self.kind {
            data.allows_piercing = true;
        }
        self
    }

    /// Enable counter-attacks. Only meaningful for Character cards.
    #[must_use]
    pub fn with_counter_attack(mut self) -> Self {
        if let CardKind::Character(ref mut data) = self.kind {
            data.can_counter_attack = true;
        }
        self
    }

    /// Allow activation during the opponent's turn on the given events.
    /// Only meaningful for Spell cards.
    #[must_use]
    pub fn reactive_on(mut self, timing: ActivationTiming) -> Self {
        if let CardKind::Spell(ref mut data) = self.kind {
            data.opponent_turn = true;
            data.timing = timing;
        }
        self
    }

    /// Replace the field data wholesale. Only meaningful for Field cards.
    #[must_use]
    pub fn with_field_data(mut self, data: FieldData) -> Self {
        if matches!(self.kind, CardKind::Field(_)) {
            self.kind = CardKind::Field(data);
        }
        self
    }

    #[must_use]
    pub fn is_character(&self) -> bool {
        matches!(self.kind, CardKind::Character(_))
    }

    #[must_use]
    pub fn is_spell(&self) -> bool {
        matches!(self.kind, CardKind::Spell(_))
    }

    #[must_use]
    pub fn is_field(&self) -> bool {
        matches!(self.kind, CardKind::Field(_))
    }

    #[must_use]
    pub fn character_data(&self) -> Option<&CharacterData> {
        match &self.kind {
            CardKind::Character(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn spell_data(&self) -> Option<&SpellData> {
        match &self.kind {
            CardKind::Spell(data) => Some(data),
            _ => None,
        }
    }

    #[must_use]
    pub fn field_data(&self) -> Option<&FieldData> {
        match &self.kind {
            CardKind::Field(data) => Some(data),
            _ => None,
        }
    }
}

/// A card instance in a match.
///
/// Carries the per-instance mutable state. Stat boosts are intentionally
/// absent: effective attack and defense are derived from the definition plus
/// the modifier sources currently on the field (see `crate::battle`), so a
/// removed source never leaves a stale bonus behind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    pub instance_id: InstanceId,
    pub definition: CardDefinition,
    /// Reset at the owner's turn start.
    pub has_attacked_this_turn: bool,
    /// Reset at the owner's turn start.
    pub temporary_cost_reduction: i32,
}

impl CardInstance {
    /// Clone a definition into a fresh instance.
    #[must_use]
    pub fn new(instance_id: InstanceId, definition: CardDefinition) -> Self {
        Self {
            instance_id,
            definition,
            has_attacked_this_turn: false,
            temporary_cost_reduction: 0,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.definition.name
    }

    #[must_use]
    pub fn card_id(&self) -> CardId {
        self.definition.id
    }

    /// Base cost reduced by the per-turn reduction, floored at zero.
    /// Field-sourced reductions are folded in by `PlayerState::effective_cost`.
    #[must_use]
    pub fn reduced_cost(&self) -> i32 {
        (self.definition.cost - self.temporary_cost_reduction).max(0)
    }

    /// Clear the flags that reset at turn start.
    pub fn reset_turn_flags(&mut self) {
        self.has_attacked_this_turn = false;
        self.temporary_cost_reduction = 0;
    }

    #[must_use]
    pub fn has_category(&self, category: &Category) -> bool {
        match &self.definition.kind {
            CardKind::Character(data) => data.categories.contains(category),
            CardKind::Field(data) => data.categories.contains(category),
            CardKind::Spell(_) => false,
        }
    }
}
