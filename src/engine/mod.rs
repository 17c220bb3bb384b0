//! Match controller.
//!
//! `MatchContext` owns one duel end to end: the state, the event bus, the
//! scheduler, and the host-facing notifier and audio sinks. Every rule
//! check lives here or below it; hosts drive a match exclusively through
//! [`MatchContext::play_card`], [`MatchContext::attack`],
//! [`MatchContext::go_to_end_phase`], and [`MatchContext::tick`].
//!
//! ## Event dispatch
//!
//! Raising an event opens a reactive spell window for the non-acting
//! player before the event reaches passive observers. An activation
//! resolves completely (including the events it raises, recursively)
//! within that window, bounded by [`MAX_EVENT_DEPTH`]; exceeding the bound
//! is a fatal [`EngineError`].
//!
//! ## Failed actions
//!
//! Every `PlayError` return is checked before the first mutation, so a
//! rejected action leaves the duel exactly as it was.

mod scheduler;
mod turn;

pub use scheduler::{Scheduler, Task, TaskHandle, AI_STEP_DELAY_MS, TURN_START_DELAY_MS};
pub use turn::{ENERGY_PER_TURN, FIELD_LIFE_RECOVERY, OPENING_HAND_SIZE};

use crate::battle::{self, BattleOutcome};
use crate::cards::{CardDatabase, CardKind, DeckDefinition, InstanceId, FieldData};
use crate::core::{
    Controller, DuelRng, DuelState, PlayerId, PlayerState, TurnPhase, CHARACTER_FIELD_LIMIT,
    FIELD_SLOT_COUNT,
};
use crate::error::{EngineError, MatchError, PlayError};
use crate::events::{
    EffectActivationController, EventBus, EventObserver, GameEvent, SpellCandidate,
    MAX_EVENT_DEPTH,
};
use crate::notify::{AudioSink, NotificationKind, NullNotifier, SoundCue, UiNotifier};

/// One running duel and its plumbing.
pub struct MatchContext {
    state: DuelState,
    bus: EventBus,
    scheduler: Scheduler,
    notifier: Box<dyn UiNotifier>,
    audio: Box<dyn AudioSink>,
    /// Set while a turn transition runs, to reject re-entrant transitions.
    pub(crate) turn_transition: bool,
    pub(crate) ai_actions_this_turn: usize,
    outcome_announced: bool,
}

impl MatchContext {
    #[must_use]
    pub fn state(&self) -> &DuelState {
        &self.state
    }

    #[must_use]
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub(crate) fn state_mut(&mut self) -> &mut DuelState {
        &mut self.state
    }

    pub(crate) fn notify(&mut self, kind: NotificationKind, message: &str) {
        let duration = match kind {
            NotificationKind::MatchOver => 5.0,
            NotificationKind::PhaseChange => 1.5,
            _ => 2.5,
        };
        self.notifier.notify(message, duration, kind);
    }

    pub(crate) fn cue(&mut self, cue: SoundCue) {
        self.audio.play(cue);
    }

    pub(crate) fn schedule(&mut self, delay_ms: u64, task: Task) {
        self.scheduler.schedule(delay_ms, task);
    }

    pub(crate) fn cancel_ai_tasks(&mut self, player: PlayerId) {
        self.scheduler.cancel_ai(player);
    }

    pub(crate) fn advance_scheduler(&mut self, ms: u64) -> Vec<Task> {
        self.scheduler.advance(ms)
    }

    /// Play a card from `player`'s hand. Field cards need a `field_slot`.
    pub fn play_card(
        &mut self,
        player: PlayerId,
        card: InstanceId,
        field_slot: Option<usize>,
    ) -> Result<(), MatchError> {
        // Validation, in rejection order. Nothing mutates until it all
        // passes.
        if self.state.is_over() {
            return Err(PlayError::MatchOver.into());
        }
        if self.state.active_player() != player {
            return Err(PlayError::NotYourTurn.into());
        }
        if self.state.phase() != TurnPhase::Action {
            return Err(PlayError::WrongPhase(self.state.phase()).into());
        }

        let me = self.state.player(player);
        let index = me.hand_position(card).ok_or(PlayError::NotInHand)?;
        let instance = &me.hand()[index];
        let cost = me.effective_cost(instance);
        if cost > me.energy() {
            return Err(PlayError::InsufficientEnergy {
                need: cost,
                have: me.energy(),
            }
            .into());
        }

        let slot = match &instance.definition.kind {
            CardKind::Character(_) => {
                if me.character_field().len() >= CHARACTER_FIELD_LIMIT {
                    return Err(PlayError::CharacterFieldFull.into());
                }
                None
            }
            CardKind::Spell(_) => None,
            CardKind::Field(_) => {
                let slot = field_slot.ok_or(PlayError::MissingFieldSlot)?;
                if slot >= FIELD_SLOT_COUNT {
                    return Err(PlayError::FieldSlotOutOfRange(slot).into());
                }
                Some(slot)
            }
        };

        // Commit.
        let me = self.state.player_mut(player);
        let instance = me.take_from_hand(index);
        me.change_energy(-cost);
        me.set_last_played(instance.instance_id);

        let name = instance.name().to_string();
        let player_name = self.state.player(player).name().to_string();
        self.notify(
            NotificationKind::CardPlayed,
            &format!("{player_name} plays {name}"),
        );

        match instance.definition.kind.clone() {
            CardKind::Character(_) => {
                self.state.player_mut(player).place_character(instance);
                self.audio.play(SoundCue::Summon);
                self.dispatch(GameEvent::card_played(player, card))?;
                // Immediate effects resolve on summon; persistent ones are
                // read back from the field.
                self.resolve_field_entry_effects(player, card);
                self.dispatch(GameEvent::character_summoned(player, card))?;
            }
            CardKind::Spell(_) => {
                self.resolve_spell(player, instance, 0)?;
                self.dispatch(GameEvent::card_played(player, card))?;
            }
            CardKind::Field(data) => {
                let effects: Vec<_> = instance
                    .definition
                    .effects
                    .iter()
                    .filter(|e| !e.is_persistent())
                    .cloned()
                    .collect();
                let evicted = self
                    .state
                    .player_mut(player)
                    .place_field_card(instance, slot.unwrap_or(0));
                if let Some(old) = evicted {
                    self.notify(
                        NotificationKind::Info,
                        &format!("{old} was sent to the graveyard"),
                    );
                }
                self.audio.play(SoundCue::Summon);
                for effect in effects {
                    for notice in effect.apply(&mut self.state, player) {
                        self.notify(NotificationKind::Info, &notice);
                    }
                }
                self.field_entry_search(player, &data);
                self.dispatch(GameEvent::card_played(player, card))?;
            }
        }

        self.settle();
        Ok(())
    }

    /// Declare an attack. `target` names the defending character, or `None`
    /// for a direct attack against an empty field.
    ///
    /// The declaration event opens a reactive window before any damage is
    /// dealt; if the reaction removed either combatant the attack fizzles
    /// with no further effect (the attacker's exhaustion stands).
    pub fn attack(
        &mut self,
        player: PlayerId,
        attacker: InstanceId,
        target: Option<InstanceId>,
    ) -> Result<BattleOutcome, MatchError> {
        if self.state.is_over() {
            return Err(PlayError::MatchOver.into());
        }
        if self.state.active_player() != player {
            return Err(PlayError::NotYourTurn.into());
        }
        if self.state.phase() != TurnPhase::Action {
            return Err(PlayError::WrongPhase(self.state.phase()).into());
        }
        if self.state.is_opening_turn() {
            return Err(PlayError::FirstTurnAttackBan.into());
        }

        let me = self.state.player(player);
        let attacking = me.character(attacker).ok_or(PlayError::NoSuchCharacter)?;
        if attacking.has_attacked_this_turn {
            return Err(PlayError::AlreadyAttacked.into());
        }

        let opponent = self.state.player(player.opponent());
        if let Some(taunt) = opponent.taunt_character() {
            if target != Some(taunt.instance_id) {
                return Err(PlayError::MustTargetDefender.into());
            }
        }
        match target {
            Some(defender) => {
                if opponent.character(defender).is_none() {
                    return Err(PlayError::NoSuchCharacter.into());
                }
            }
            None => {
                if !opponent.character_field().is_empty() {
                    return Err(PlayError::FieldNotEmpty.into());
                }
            }
        }

        // Declaration event; reactions resolve before damage.
        let declaration = match target {
            Some(defender) => GameEvent::attack_declared(player, attacker, defender),
            None => GameEvent::direct_attack(player, attacker),
        };
        self.dispatch(declaration)?;

        if self.state.is_over() {
            self.settle();
            return Ok(BattleOutcome::default());
        }

        // Re-validate by instance id; the reaction may have cleared a
        // combatant off the field.
        if self.state.player(player).character(attacker).is_none() {
            let mut outcome = BattleOutcome::default();
            outcome.notices.push("the attack fizzled".to_string());
            self.notify(NotificationKind::Battle, "the attack fizzled");
            return Ok(outcome);
        }

        self.audio.play(SoundCue::Attack);
        let outcome = match target {
            Some(defender) => {
                if self
                    .state
                    .player(player.opponent())
                    .character(defender)
                    .is_none()
                {
                    self.state.player_mut(player).mark_attacked(attacker);
                    let mut outcome = BattleOutcome::default();
                    outcome.notices.push("the attack fizzled".to_string());
                    self.notify(NotificationKind::Battle, "the attack fizzled");
                    return Ok(outcome);
                }
                battle::resolve_character_battle(&mut self.state, player, attacker, defender)
            }
            None => battle::resolve_direct_attack(&mut self.state, player, attacker),
        };

        for notice in &outcome.notices {
            self.notify(NotificationKind::Battle, notice);
        }
        if outcome.piercing_damage > 0 || outcome.counter_piercing_damage > 0 || target.is_none() {
            self.audio.play(SoundCue::Damage);
        }
        if outcome.attacker_destroyed || outcome.defender_destroyed {
            self.audio.play(SoundCue::Destruction);
        }

        self.settle();
        Ok(outcome)
    }

    /// Subscribe a passive observer after construction.
    pub fn subscribe(&mut self, observer: Box<dyn EventObserver>) {
        self.bus.subscribe(observer);
    }

    // === Internal plumbing ===

    pub(crate) fn dispatch(&mut self, event: GameEvent) -> Result<(), EngineError> {
        self.dispatch_at(event, 0)
    }

    /// Raise an event: reactive window first, passive observers after the
    /// window (and everything it triggered) has settled.
    fn dispatch_at(&mut self, event: GameEvent, depth: usize) -> Result<(), EngineError> {
        if depth >= MAX_EVENT_DEPTH {
            return Err(EngineError::EventDepthExceeded {
                bound: MAX_EVENT_DEPTH,
            });
        }

        let responder = event.player.opponent();
        if !self.state.is_over() {
            let candidates =
                EffectActivationController::candidates(&self.state, responder, &event);
            if !candidates.is_empty() {
                let choice = match self.state.player(responder).controller() {
                    Controller::Human => {
                        self.notifier
                            .prompt_spell_choice(responder, &candidates, &event)
                    }
                    Controller::Ai => pick_reaction(&candidates),
                };
                if let Some(id) = choice {
                    if candidates.iter().any(|c| c.instance_id == id) {
                        self.cast_reactive(responder, id, depth + 1)?;
                    }
                }
            }
        }

        self.bus.notify(&event, &self.state);
        Ok(())
    }

    /// Activate a hand spell inside a reactive window.
    fn cast_reactive(
        &mut self,
        player: PlayerId,
        card: InstanceId,
        depth: usize,
    ) -> Result<(), EngineError> {
        let me = self.state.player_mut(player);
        let Some(index) = me.hand_position(card) else {
            return Ok(());
        };
        let instance = me.take_from_hand(index);
        let cost = self.state.player(player).effective_cost(&instance);
        self.state.player_mut(player).change_energy(-cost);

        let player_name = self.state.player(player).name().to_string();
        let message = format!("{player_name} responds with {}", instance.name());
        self.notify(NotificationKind::CardPlayed, &message);
        self.resolve_spell(player, instance, depth)
    }

    /// Resolve a spell already removed from hand and paid for: effects,
    /// graveyard, `SpellActivated`.
    fn resolve_spell(
        &mut self,
        player: PlayerId,
        instance: crate::cards::CardInstance,
        depth: usize,
    ) -> Result<(), EngineError> {
        let id = instance.instance_id;
        self.audio.play(SoundCue::SpellCast);

        for effect in instance.definition.effects.clone() {
            for notice in effect.apply(&mut self.state, player) {
                self.notify(NotificationKind::Info, &notice);
            }
        }
        self.state.player_mut(player).send_to_graveyard(instance);

        self.dispatch_at(GameEvent::spell_activated(player, id), depth)?;
        self.settle();
        Ok(())
    }

    /// Resolve a summoned character's immediate effects.
    fn resolve_field_entry_effects(&mut self, player: PlayerId, card: InstanceId) {
        let Some(instance) = self.state.player(player).character(card) else {
            return;
        };
        let effects: Vec<_> = instance
            .definition
            .effects
            .iter()
            .filter(|e| !e.is_persistent())
            .cloned()
            .collect();
        for effect in effects {
            for notice in effect.apply(&mut self.state, player) {
                self.notify(NotificationKind::Info, &notice);
            }
        }
    }

    /// A field card that allows deck searching fetches the first card
    /// matching its category filter as it enters play.
    fn field_entry_search(&mut self, player: PlayerId, data: &FieldData) {
        if !data.allows_deck_search {
            return;
        }
        let categories = data.affected_categories.clone();
        let found = self.state.search_deck(player, |c| {
            categories.is_empty() || categories.iter().any(|cat| c.has_category(cat))
        });
        if let Some((name, discard)) = found {
            let player_name = self.state.player(player).name().to_string();
            self.notify(
                NotificationKind::Info,
                &format!("{player_name} fetched {name} from the deck"),
            );
            if let Some(discarded) = discard {
                self.notify(
                    NotificationKind::Info,
                    &format!("{player_name} discarded {discarded} (hand limit)"),
                );
            }
        }
    }

    /// Announce a finished duel once and drop all pending work.
    pub(crate) fn settle(&mut self) {
        if self.outcome_announced {
            return;
        }
        let Some(result) = self.state.outcome() else {
            return;
        };
        self.outcome_announced = true;
        self.scheduler.cancel_all();
        self.audio.play(SoundCue::Victory);
        let winner = self.state.player(result.winner).name().to_string();
        self.notify(
            NotificationKind::MatchOver,
            &format!("{winner} wins ({:?})", result.reason),
        );
    }
}

/// The AI's reaction choice: the highest-cost eligible spell, with hand
/// order breaking ties.
fn pick_reaction(candidates: &[SpellCandidate]) -> Option<InstanceId> {
    let mut best: Option<&SpellCandidate> = None;
    for candidate in candidates {
        if best.map_or(true, |b| candidate.cost > b.cost) {
            best = Some(candidate);
        }
    }
    best.map(|c| c.instance_id)
}

/// Assembles a [`MatchContext`].
///
/// ```no_run
/// # use duelcore::engine::MatchBuilder;
/// # use duelcore::cards::{CardRegistry, DeckDefinition};
/// # use duelcore::core::Controller;
/// # fn decks() -> (CardRegistry, DeckDefinition, DeckDefinition) { unimplemented!() }
/// let (db, deck_a, deck_b) = decks();
/// let mut duel = MatchBuilder::new(42)
///     .player("Alice", Controller::Human, deck_a)
///     .player("Rival", Controller::Ai, deck_b)
///     .build(&db)?;
/// duel.start_game()?;
/// # Ok::<(), duelcore::error::MatchError>(())
/// ```
pub struct MatchBuilder {
    seed: u64,
    players: Vec<(String, Controller, DeckDefinition)>,
    first_player: Option<PlayerId>,
    notifier: Option<Box<dyn UiNotifier>>,
    audio: Option<Box<dyn AudioSink>>,
    observers: Vec<Box<dyn EventObserver>>,
}

impl MatchBuilder {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            players: Vec::new(),
            first_player: None,
            notifier: None,
            audio: None,
            observers: Vec::new(),
        }
    }

    /// Add a seat. Exactly two are required.
    #[must_use]
    pub fn player(
        mut self,
        name: impl Into<String>,
        controller: Controller,
        deck: DeckDefinition,
    ) -> Self {
        self.players.push((name.into(), controller, deck));
        self
    }

    /// Fix who goes first instead of rolling for it.
    #[must_use]
    pub fn first_player(mut self, player: PlayerId) -> Self {
        self.first_player = Some(player);
        self
    }

    #[must_use]
    pub fn notifier(mut self, notifier: Box<dyn UiNotifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    #[must_use]
    pub fn audio(mut self, audio: Box<dyn AudioSink>) -> Self {
        self.audio = Some(audio);
        self
    }

    #[must_use]
    pub fn observer(mut self, observer: Box<dyn EventObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Validate decks, shuffle, and assemble the match. The duel does not
    /// begin until [`MatchContext::start_game`].
    pub fn build(self, db: &dyn CardDatabase) -> Result<MatchContext, EngineError> {
        if self.players.len() != 2 {
            return Err(EngineError::WrongPlayerCount(self.players.len()));
        }

        let mut rng = DuelRng::new(self.seed);
        let mut next_instance = 0u32;
        let mut seats = Vec::with_capacity(2);
        for (name, controller, deck) in self.players {
            deck.validate(db)?;
            let mut cards = deck.instantiate(db, &mut next_instance)?;
            rng.shuffle(&mut cards);
            let mut player = PlayerState::new(name, controller);
            player.set_deck(cards);
            seats.push(player);
        }

        let first = self
            .first_player
            .unwrap_or_else(|| PlayerId::both()[rng.pick_index(2)]);
        let Some(two) = seats.pop() else {
            return Err(EngineError::WrongPlayerCount(0));
        };
        let Some(one) = seats.pop() else {
            return Err(EngineError::WrongPlayerCount(1));
        };

        let mut state = DuelState::new([one, two], first, rng);
        state.next_instance = next_instance;

        let mut bus = EventBus::new();
        for observer in self.observers {
            bus.subscribe(observer);
        }

        tracing::info!(seed = self.seed, %first, "match assembled");
        Ok(MatchContext {
            state,
            bus,
            scheduler: Scheduler::new(),
            notifier: self.notifier.unwrap_or_else(|| Box::new(NullNotifier)),
            audio: self.audio.unwrap_or_else(|| Box::new(NullNotifier)),
            turn_transition: false,
            ai_actions_this_turn: 0,
            outcome_announced: false,
        })
    }
}
