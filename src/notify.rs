//! Host-facing notification and prompt surfaces.
//!
//! The engine is headless. Anything a UI would show (messages, sound cues)
//! or ask (reactive spell prompts) goes through these traits; the host
//! plugs in real implementations, tests use [`RecordingNotifier`], and
//! unattended matches use [`NullNotifier`].

use crate::cards::InstanceId;
use crate::core::PlayerId;
use crate::events::{GameEvent, SpellCandidate};

/// Coarse classification of a notice, for styling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    CardPlayed,
    Battle,
    Damage,
    Recovery,
    PhaseChange,
    MatchOver,
}

/// Short sound cues tied to game moments.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SoundCue {
    Draw,
    Summon,
    SpellCast,
    Attack,
    Damage,
    Destruction,
    Victory,
}

/// Messages and prompts toward the host UI.
pub trait UiNotifier {
    /// Show `message` for `duration` seconds, styled by `kind`.
    fn notify(&mut self, message: &str, duration: f32, kind: NotificationKind);

    /// Ask a human responder to pick a reactive spell, or decline.
    /// Returning an id not present in `candidates` counts as declining.
    fn prompt_spell_choice(
        &mut self,
        responder: PlayerId,
        candidates: &[SpellCandidate],
        trigger: &GameEvent,
    ) -> Option<InstanceId>;
}

/// Sound cue sink.
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// Drops every notice, declines every prompt, swallows every cue.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullNotifier;

impl UiNotifier for NullNotifier {
    fn notify(&mut self, _message: &str, _duration: f32, _kind: NotificationKind) {}

    fn prompt_spell_choice(
        &mut self,
        _responder: PlayerId,
        _candidates: &[SpellCandidate],
        _trigger: &GameEvent,
    ) -> Option<InstanceId> {
        None
    }
}

impl AudioSink for NullNotifier {
    fn play(&mut self, _cue: SoundCue) {}
}

/// A scripted answer to one reactive prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PromptAnswer {
    Decline,
    /// Activate the first offered candidate.
    AcceptFirst,
    Choose(InstanceId),
}

/// Records every notice and cue; answers prompts from a script.
///
/// Each prompt pops the front of the script; an exhausted script falls back
/// to the default answer (declining, unless changed).
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub messages: Vec<(NotificationKind, String)>,
    pub durations: Vec<f32>,
    pub cues: Vec<SoundCue>,
    pub prompts_seen: usize,
    script: std::collections::VecDeque<PromptAnswer>,
    default_answer: Option<PromptAnswer>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the next unanswered prompt.
    pub fn script(&mut self, answer: PromptAnswer) {
        self.script.push_back(answer);
    }

    /// Answer every unscripted prompt with `answer`.
    pub fn default_answer(&mut self, answer: PromptAnswer) {
        self.default_answer = Some(answer);
    }

    #[must_use]
    pub fn contains(&self, fragment: &str) -> bool {
        self.messages.iter().any(|(_, m)| m.contains(fragment))
    }
}

impl UiNotifier for RecordingNotifier {
    fn notify(&mut self, message: &str, duration: f32, kind: NotificationKind) {
        self.messages.push((kind, message.to_string()));
        self.durations.push(duration);
    }

    fn prompt_spell_choice(
        &mut self,
        _responder: PlayerId,
        candidates: &[SpellCandidate],
        _trigger: &GameEvent,
    ) -> Option<InstanceId> {
        self.prompts_seen += 1;
        let answer = self
            .script
            .pop_front()
            .or(self.default_answer)
            .unwrap_or(PromptAnswer::Decline);
        match answer {
            PromptAnswer::Decline => None,
            PromptAnswer::AcceptFirst => candidates.first().map(|c| c.instance_id),
            PromptAnswer::Choose(id) => Some(id),
        }
    }
}

impl AudioSink for RecordingNotifier {
    fn play(&mut self, cue: SoundCue) {
        self.cues.push(cue);
    }
}

// Shared-handle forms, so a test can keep one side of the recorder while
// the match owns the other.
impl UiNotifier for std::rc::Rc<std::cell::RefCell<RecordingNotifier>> {
    fn notify(&mut self, message: &str, duration: f32, kind: NotificationKind) {
        self.borrow_mut().notify(message, duration, kind);
    }

    fn prompt_spell_choice(
        &mut self,
        responder: PlayerId,
        candidates: &[SpellCandidate],
        trigger: &GameEvent,
    ) -> Option<InstanceId> {
        self.borrow_mut()
            .prompt_spell_choice(responder, candidates, trigger)
    }
}

impl AudioSink for std::rc::Rc<std::cell::RefCell<RecordingNotifier>> {
    fn play(&mut self, cue: SoundCue) {
        self.borrow_mut().play(cue);
    }
}
