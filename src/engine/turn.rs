//! Turn flow.
//!
//! A turn runs Draw -> Action -> End. The transition into a turn (turn
//! change, draw-phase upkeep, the automatic draw, and entry into the action
//! phase) is one guarded critical section: a second transition attempted
//! while one is running is an internal error, not a queued request.
//!
//! Turn hand-off is scheduled, not called: ending a turn queues the
//! opponent's `StartTurn` task on the scheduler, and hosts pump the queue
//! with [`MatchContext::tick`].

use super::scheduler::{Task, AI_STEP_DELAY_MS, TURN_START_DELAY_MS};
use super::MatchContext;
use crate::ai::{AiAction, AiDecisionEngine, AI_ACTION_LIMIT};
use crate::core::{Controller, PlayerId, TurnPhase};
use crate::error::{EngineError, MatchError, PlayError};
use crate::events::GameEvent;
use crate::notify::{NotificationKind, SoundCue};

/// Cards drawn by each player before the first turn.
pub const OPENING_HAND_SIZE: usize = 5;
/// Energy gained at every turn start.
pub const ENERGY_PER_TURN: i32 = 3;
/// Life recovered at turn start by a field card that grants recovery.
pub const FIELD_LIFE_RECOVERY: i32 = 300;

impl MatchContext {
    /// Deal opening hands and start the first turn.
    pub fn start_game(&mut self) -> Result<(), MatchError> {
        for id in PlayerId::both() {
            for _ in 0..OPENING_HAND_SIZE {
                if self.state_mut().draw(id).is_err() {
                    break;
                }
            }
        }
        let first = self.state().first_player();
        let first_name = self.state().player(first).name().to_string();
        self.notify(
            NotificationKind::Info,
            &format!("the duel begins; {first_name} goes first"),
        );
        self.start_turn(first)
    }

    /// Run one turn transition for `player`.
    pub(crate) fn start_turn(&mut self, player: PlayerId) -> Result<(), MatchError> {
        if self.state().is_over() {
            return Ok(());
        }
        if self.turn_transition {
            return Err(EngineError::TurnTransitionInProgress.into());
        }
        self.turn_transition = true;
        let result = self.run_turn_transition(player);
        self.turn_transition = false;
        result
    }

    fn run_turn_transition(&mut self, player: PlayerId) -> Result<(), MatchError> {
        self.state_mut().begin_turn(player);
        self.ai_actions_this_turn = 0;

        let turn = self.state().turn_number();
        let name = self.state().player(player).name().to_string();
        tracing::info!(turn, player = %player, "turn start");
        self.notify(NotificationKind::Info, &format!("turn {turn}: {name}"));
        self.dispatch(GameEvent::turn_changed(player))?;

        // Draw phase: upkeep, then the automatic draw.
        self.state_mut().set_phase(TurnPhase::Draw);
        self.dispatch(GameEvent::phase_changed(player, TurnPhase::Draw))?;

        self.state_mut()
            .player_mut(player)
            .change_energy(ENERGY_PER_TURN);
        self.state_mut().player_mut(player).reset_turn_flags();

        let recovers = self
            .state()
            .player(player)
            .active_field_card()
            .and_then(|c| c.definition.field_data())
            .is_some_and(|f| f.provides_life_recovery);
        if recovers {
            let life = self.state_mut().change_life(player, FIELD_LIFE_RECOVERY);
            self.notify(
                NotificationKind::Recovery,
                &format!("{name} recovers {FIELD_LIFE_RECOVERY} LP ({life} LP)"),
            );
        }

        match self.state_mut().draw(player) {
            Ok(outcome) => {
                self.cue(SoundCue::Draw);
                self.notify(NotificationKind::Info, &format!("{name} draws a card"));
                if let Some(discarded) = outcome.forced_discard {
                    self.notify(
                        NotificationKind::Info,
                        &format!("{name} discarded {discarded} (hand limit)"),
                    );
                }
            }
            Err(_) => {
                // Deck-out; the loss is already recorded.
                self.settle();
                return Ok(());
            }
        }
        if self.state().is_over() {
            self.settle();
            return Ok(());
        }

        self.state_mut().set_phase(TurnPhase::Action);
        self.dispatch(GameEvent::phase_changed(player, TurnPhase::Action))?;

        if self.state().player(player).controller() == Controller::Ai {
            self.schedule(AI_STEP_DELAY_MS, Task::AiStep(player));
        }
        Ok(())
    }

    /// Move the active player from the action phase to the end phase and
    /// queue the opponent's turn.
    pub fn go_to_end_phase(&mut self, player: PlayerId) -> Result<(), MatchError> {
        if self.state().is_over() {
            return Err(PlayError::MatchOver.into());
        }
        if self.state().active_player() != player {
            return Err(PlayError::NotYourTurn.into());
        }
        if self.state().phase() != TurnPhase::Action {
            return Err(PlayError::WrongPhase(self.state().phase()).into());
        }

        self.cancel_ai_tasks(player);
        self.state_mut().set_phase(TurnPhase::End);
        let name = self.state().player(player).name().to_string();
        self.notify(
            NotificationKind::PhaseChange,
            &format!("{name} ends the turn"),
        );
        self.dispatch(GameEvent::phase_changed(player, TurnPhase::End))?;

        self.schedule(TURN_START_DELAY_MS, Task::StartTurn(player.opponent()));
        Ok(())
    }

    /// Advance the virtual clock and run every task that came due.
    pub fn tick(&mut self, ms: u64) -> Result<(), MatchError> {
        let due = self.advance_scheduler(ms);
        for task in due {
            if self.state().is_over() {
                break;
            }
            match task {
                Task::StartTurn(player) => self.start_turn(player)?,
                Task::AiStep(player) => self.ai_step(player)?,
            }
        }
        self.settle();
        Ok(())
    }

    /// Pump the scheduler until the duel ends or nothing is pending.
    /// Intended for unattended (AI vs AI) matches; a duel always terminates
    /// because every turn consumes a deck card.
    pub fn run(&mut self) -> Result<(), MatchError> {
        while !self.state().is_over() {
            let Some(due) = self.scheduler().next_due() else {
                break;
            };
            let step = due.saturating_sub(self.scheduler().now());
            self.tick(step)?;
        }
        Ok(())
    }

    /// Take one AI action, then queue the next step or end the turn.
    fn ai_step(&mut self, player: PlayerId) -> Result<(), MatchError> {
        if self.state().is_over()
            || self.state().active_player() != player
            || self.state().phase() != TurnPhase::Action
        {
            return Ok(());
        }
        if self.ai_actions_this_turn >= AI_ACTION_LIMIT {
            tracing::warn!(player = %player, "AI hit the per-turn action limit");
            return self.go_to_end_phase(player);
        }

        self.ai_actions_this_turn += 1;
        let action = AiDecisionEngine::choose(self.state(), player);
        tracing::debug!(player = %player, ?action, "AI action");

        let result = match action {
            AiAction::EndTurn => return self.go_to_end_phase(player),
            AiAction::Attack { attacker, target } => {
                self.attack(player, attacker, target).map(|_| ())
            }
            AiAction::PlayCard { card, field_slot } => self.play_card(player, card, field_slot),
        };

        match result {
            Ok(()) => {}
            // The policy proposed something the rules rejected. Ending the
            // turn beats retrying the same illegal action forever.
            Err(MatchError::Play(err)) => {
                tracing::warn!(player = %player, %err, "AI action rejected");
                return self.go_to_end_phase(player);
            }
            Err(err) => return Err(err),
        }

        if !self.state().is_over()
            && self.state().active_player() == player
            && self.state().phase() == TurnPhase::Action
        {
            self.schedule(AI_STEP_DELAY_MS, Task::AiStep(player));
        }
        Ok(())
    }
}
