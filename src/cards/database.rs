//! Card database and deck definitions.
//!
//! The engine reads card definitions through the `CardDatabase` trait and
//! never mutates them. `CardRegistry` is the in-memory implementation used
//! by tests and by hosts that load content themselves; authoring tools own
//! the persistence format.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::card::{CardDefinition, CardId, CardInstance, InstanceId};
use crate::error::DeckError;

/// Minimum deck size accepted by the engine.
pub const DECK_MIN: usize = 40;
/// Maximum deck size accepted by the engine.
pub const DECK_MAX: usize = 60;
/// Maximum copies of one card id per deck.
pub const MAX_COPIES: usize = 2;

/// Read-only card lookup.
pub trait CardDatabase {
    fn get_by_id(&self, id: CardId) -> Option<&CardDefinition>;

    /// All known definitions, in unspecified order.
    fn all(&self) -> Vec<&CardDefinition>;
}

/// In-memory card database.
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, CardDefinition>,
}

impl CardRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, replacing any previous one with the same id.
    pub fn register(&mut self, definition: CardDefinition) {
        self.cards.insert(definition.id, definition);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl CardDatabase for CardRegistry {
    fn get_by_id(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }

    fn all(&self) -> Vec<&CardDefinition> {
        self.cards.values().collect()
    }
}

/// An ordered list of card ids making up one player's deck.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeckDefinition {
    pub cards: Vec<CardId>,
}

impl DeckDefinition {
    #[must_use]
    pub fn new(cards: Vec<CardId>) -> Self {
        Self { cards }
    }

    /// Validate size bounds and the per-id copy limit against a database.
    pub fn validate(&self, db: &dyn CardDatabase) -> Result<(), DeckError> {
        if self.cards.len() < DECK_MIN {
            return Err(DeckError::TooSmall(self.cards.len()));
        }
        if self.cards.len() > DECK_MAX {
            return Err(DeckError::TooLarge(self.cards.len()));
        }

        let mut counts: FxHashMap<CardId, usize> = FxHashMap::default();
        for &id in &self.cards {
            if db.get_by_id(id).is_none() {
                return Err(DeckError::UnknownCard(id));
            }
            let count = counts.entry(id).or_insert(0);
            *count += 1;
            if *count > MAX_COPIES {
                return Err(DeckError::TooManyCopies { id, count: *count });
            }
        }

        Ok(())
    }

    /// Clone definitions into runtime instances, in deck order.
    ///
    /// `next_instance` is the match-wide instance counter; it is advanced by
    /// one per card. Validation must have passed first; an unknown id here
    /// is still reported rather than skipped.
    pub fn instantiate(
        &self,
        db: &dyn CardDatabase,
        next_instance: &mut u32,
    ) -> Result<Vec<CardInstance>, DeckError> {
        let mut instances = Vec::with_capacity(self.cards.len());
        for &id in &self.cards {
            let definition = db.get_by_id(id).ok_or(DeckError::UnknownCard(id))?;
            let instance_id = InstanceId(*next_instance);
            *next_instance += 1;
            instances.push(CardInstance::new(instance_id, definition.clone()));
        }
        Ok(instances)
    }
}
