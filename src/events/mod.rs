//! Events, passive observation, and reactive spell windows.

mod bus;
mod event;
mod reactive;

pub use bus::{EventBus, EventObserver, MAX_EVENT_DEPTH};
pub use event::{GameEvent, GameEventKind};
pub use reactive::{EffectActivationController, SpellCandidate};
