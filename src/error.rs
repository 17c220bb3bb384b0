//! Error types for the duel engine.
//!
//! Rejected player actions are soft failures: the engine returns a
//! `PlayError` and guarantees no state was mutated. Internal-consistency
//! failures (`EngineError`) are fatal for the match but leave the state
//! continuable for inspection.

use crate::cards::CardId;
use crate::core::TurnPhase;

/// A player action was rejected. No state mutation occurred.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PlayError {
    #[error("card is not in hand")]
    NotInHand,

    #[error("insufficient energy: need {need}, have {have}")]
    InsufficientEnergy { need: i32, have: i32 },

    #[error("character field is full")]
    CharacterFieldFull,

    #[error("field slot {0} is out of range (0..3)")]
    FieldSlotOutOfRange(usize),

    #[error("a field card needs a slot")]
    MissingFieldSlot,

    #[error("action is not legal during the {0} phase")]
    WrongPhase(TurnPhase),

    #[error("it is not this player's turn")]
    NotYourTurn,

    #[error("character has already attacked this turn")]
    AlreadyAttacked,

    #[error("the first player cannot attack on the first turn")]
    FirstTurnAttackBan,

    #[error("no such character on the field")]
    NoSuchCharacter,

    #[error("direct attacks require an empty opposing field")]
    FieldNotEmpty,

    #[error("attacks must target the defending character that draws them")]
    MustTargetDefender,

    #[error("the match is already over")]
    MatchOver,
}

/// Drawing from the deck failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    /// The deck is empty. This flips the owner's `cannot_draw_card` flag,
    /// which the match controller treats as a loss condition.
    #[error("deck is empty")]
    DeckEmpty,
}

/// A deck definition failed validation.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DeckError {
    #[error("deck has {0} cards, minimum is {min}", min = crate::cards::DECK_MIN)]
    TooSmall(usize),

    #[error("deck has {0} cards, maximum is {max}", max = crate::cards::DECK_MAX)]
    TooLarge(usize),

    #[error("deck contains {count} copies of card {id}, limit is {limit}", limit = crate::cards::MAX_COPIES)]
    TooManyCopies { id: CardId, count: usize },

    #[error("deck references unknown card {0}")]
    UnknownCard(CardId),
}

/// Internal consistency failure. Fatal for the match.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("a duel requires exactly two players, got {0}")]
    WrongPlayerCount(usize),

    #[error("a turn transition is already in progress")]
    TurnTransitionInProgress,

    #[error("event dispatch exceeded the depth bound of {bound}")]
    EventDepthExceeded { bound: usize },

    #[error("card database has no definition for {0}")]
    MissingCardDefinition(CardId),

    #[error("deck validation failed: {0}")]
    InvalidDeck(#[from] DeckError),
}

/// Any failure a match operation can surface.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MatchError {
    #[error(transparent)]
    Play(#[from] PlayError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
