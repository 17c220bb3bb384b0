//! Card model: authored definitions, runtime instances, and the database.

mod card;
mod database;

pub use card::{
    ActivationTiming, CardDefinition, CardId, CardInstance, CardKind, Category, CharacterData,
    Element, FieldData, InstanceId, SpellData,
};
pub use database::{CardDatabase, CardRegistry, DeckDefinition, DECK_MAX, DECK_MIN, MAX_COPIES};
