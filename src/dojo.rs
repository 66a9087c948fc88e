//! The dojo session controller: roster, round lifecycle, and rotation.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::clock::RoundClock;
use crate::error::DojoError;
use crate::roster::Roster;

/// Overall session state. `Active` covers both a running and a paused round;
/// [`DojoAssistant::is_round_active`] and [`DojoAssistant::is_round_paused`]
/// distinguish the two.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DojoState {
    #[default]
    Idle,
    Active,
}

type RoundEndedCallback = Box<dyn Fn() + Send>;

/// Round state shared with the clock task. Everything the fire path touches
/// lives behind one mutex, so a fire racing a caller-invoked transition can
/// never observe a half-applied state.
#[derive(Default)]
struct RoundState {
    dojo_state: DojoState,
    round_active: bool,
    round_paused: bool,
    rotation_count: u64,
    /// Remaining seconds snapshotted at pause; 0 otherwise.
    paused_remaining_secs: u64,
    /// Duration the running leg was armed with: the full round on start,
    /// the stored remainder on resume.
    armed_secs: u64,
    started_at: Option<Instant>,
    clock: RoundClock,
}

/// Session manager for a turn-based pairing dojo.
///
/// Tracks an ordered roster of participants, rotates a pilot/co-pilot pair
/// each round, and runs a countdown per round with pause/resume/skip. One
/// instance is one session; nothing is persisted.
///
/// Round lifecycle methods must be called from within a Tokio runtime, since
/// the countdown runs on a spawned task.
pub struct DojoAssistant {
    round_secs: u64,
    roster: Roster,
    state: Arc<Mutex<RoundState>>,
    observers: Arc<Mutex<Vec<RoundEndedCallback>>>,
}

impl DojoAssistant {
    /// Creates an idle session whose rounds last `round_secs` seconds.
    pub fn new(round_secs: u64) -> Self {
        Self {
            round_secs,
            roster: Roster::new(),
            state: Arc::new(Mutex::new(RoundState::default())),
            observers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn state(&self) -> MutexGuard<'_, RoundState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_idle(&self) -> Result<(), DojoError> {
        if self.state().dojo_state == DojoState::Active {
            return Err(DojoError::InvalidState(
                "the roster cannot change while the dojo is active",
            ));
        }
        Ok(())
    }

    /// Appends a participant. Only allowed while the dojo is idle.
    pub fn add_participant(&mut self, name: &str) -> Result<(), DojoError> {
        self.ensure_idle()?;
        self.roster.add(name)?;
        debug!(name, "participant added");
        Ok(())
    }

    /// Removes a participant by exact name. Only allowed while idle.
    pub fn remove_participant(&mut self, name: &str) -> Result<(), DojoError> {
        self.ensure_idle()?;
        self.roster.remove(name)?;
        debug!(name, "participant removed");
        Ok(())
    }

    /// Clears the roster. Only allowed while idle; succeeds on an empty one.
    pub fn remove_all_participants(&mut self) -> Result<(), DojoError> {
        self.ensure_idle()?;
        self.roster.clear();
        debug!("roster cleared");
        Ok(())
    }

    /// Randomly mixes the rotation order. Only allowed while idle.
    pub fn shuffle_participants(&mut self) -> Result<(), DojoError> {
        self.ensure_idle()?;
        self.roster.shuffle();
        debug!("roster shuffled");
        Ok(())
    }

    /// Starts a round: marks the dojo active and arms the clock with the
    /// full configured duration. Needs at least two participants.
    pub fn start_round(&mut self) -> Result<(), DojoError> {
        let mut state = self.state();
        if state.round_active {
            return Err(DojoError::InvalidState("a round is already running"));
        }
        if self.roster.len() <= 1 {
            return Err(DojoError::InvalidParticipantCount);
        }
        state.dojo_state = DojoState::Active;
        state.round_active = true;
        state.round_paused = false;
        state.paused_remaining_secs = 0;
        state.armed_secs = self.round_secs;
        state.started_at = Some(Instant::now());
        let on_fire =
            Self::completion_handler(Arc::clone(&self.state), Arc::clone(&self.observers));
        state.clock.start(Duration::from_secs(self.round_secs), on_fire);
        drop(state);
        info!(
            pilot = self.pilot(),
            co_pilot = self.co_pilot(),
            round_secs = self.round_secs,
            "round started"
        );
        Ok(())
    }

    /// Freezes the running round: stops the clock and stores the remaining
    /// seconds for a later [`resume_round`](Self::resume_round).
    pub fn pause_round(&mut self) -> Result<(), DojoError> {
        let mut state = self.state();
        if !state.round_active {
            return Err(DojoError::InvalidState("no round is running"));
        }
        let elapsed = state
            .started_at
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0);
        state.paused_remaining_secs = state.armed_secs.saturating_sub(elapsed);
        state.clock.stop();
        state.round_paused = true;
        state.round_active = false;
        state.started_at = None;
        debug!(remaining_secs = state.paused_remaining_secs, "round paused");
        Ok(())
    }

    /// Restarts a paused round with the stored remainder.
    pub fn resume_round(&mut self) -> Result<(), DojoError> {
        let mut state = self.state();
        if !state.round_paused {
            return Err(DojoError::InvalidState("no round is paused"));
        }
        let remaining = state.paused_remaining_secs;
        state.armed_secs = remaining;
        state.paused_remaining_secs = 0;
        state.round_paused = false;
        state.round_active = true;
        state.started_at = Some(Instant::now());
        let on_fire =
            Self::completion_handler(Arc::clone(&self.state), Arc::clone(&self.observers));
        state.clock.start(Duration::from_secs(remaining), on_fire);
        debug!(remaining_secs = remaining, "round resumed");
        Ok(())
    }

    /// Ends the paused round immediately, as if the clock had fired. A
    /// running round must be paused first before it can be skipped.
    pub fn skip_round(&mut self) -> Result<(), DojoError> {
        {
            let mut state = self.state();
            if !state.round_paused {
                return Err(DojoError::InvalidState("only a paused round can be skipped"));
            }
            Self::complete_round(&mut state);
        }
        Self::notify_round_ended(&self.observers);
        Ok(())
    }

    /// Returns the dojo to idle, unlocking the roster. Fails while a round
    /// is running; a paused round's remainder is discarded. The roster and
    /// the rotation counter are left untouched.
    pub fn end_dojo(&mut self) -> Result<(), DojoError> {
        let mut state = self.state();
        if state.round_active {
            return Err(DojoError::InvalidState(
                "cannot end the dojo while a round is running",
            ));
        }
        state.dojo_state = DojoState::Idle;
        state.round_paused = false;
        state.paused_remaining_secs = 0;
        state.started_at = None;
        state.clock.stop();
        info!("dojo ended");
        Ok(())
    }

    /// Registers a callback invoked (with no payload) each time a round
    /// completes, whether by timeout or skip. Callbacks run after state has
    /// been updated and must not register further observers.
    pub fn on_round_ended<F>(&mut self, callback: F)
    where
        F: Fn() + Send + 'static,
    {
        self.observers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(callback));
    }

    /// Live countdown value: 0 unless a round is currently running.
    pub fn remaining_time_in_seconds(&self) -> u64 {
        let state = self.state();
        if !state.round_active {
            return 0;
        }
        let elapsed = state
            .started_at
            .map(|t| t.elapsed().as_secs())
            .unwrap_or(0);
        state.armed_secs.saturating_sub(elapsed)
    }

    /// Remainder stored by [`pause_round`](Self::pause_round); 0 unless a
    /// round is paused.
    pub fn paused_remaining_in_seconds(&self) -> u64 {
        self.state().paused_remaining_secs
    }

    /// Current pilot, rotating with each completed round. `None` on an
    /// empty roster.
    pub fn pilot(&self) -> Option<&str> {
        if self.roster.is_empty() {
            return None;
        }
        let index = self.state().rotation_count as usize % self.roster.len();
        self.roster.get(index)
    }

    /// Current co-pilot: the participant after the pilot, wrapping around.
    pub fn co_pilot(&self) -> Option<&str> {
        if self.roster.is_empty() {
            return None;
        }
        let index = (self.state().rotation_count as usize + 1) % self.roster.len();
        self.roster.get(index)
    }

    pub fn participants(&self) -> &[String] {
        self.roster.names()
    }

    pub fn dojo_state(&self) -> DojoState {
        self.state().dojo_state
    }

    pub fn is_round_active(&self) -> bool {
        self.state().round_active
    }

    pub fn is_round_paused(&self) -> bool {
        self.state().round_paused
    }

    /// Number of completed rounds. Never resets for the lifetime of the
    /// session, even across [`end_dojo`](Self::end_dojo).
    pub fn completed_rounds(&self) -> u64 {
        self.state().rotation_count
    }

    pub fn round_duration_in_seconds(&self) -> u64 {
        self.round_secs
    }

    /// Builds the clock-fire callback. It re-checks the generation under the
    /// state lock so a fire from a superseded arming is dropped instead of
    /// double-counting a completion.
    fn completion_handler(
        state: Arc<Mutex<RoundState>>,
        observers: Arc<Mutex<Vec<RoundEndedCallback>>>,
    ) -> impl FnOnce(u64) + Send + 'static {
        move |generation| {
            {
                let mut state = state.lock().unwrap_or_else(PoisonError::into_inner);
                if generation != state.clock.generation() || !state.round_active {
                    debug!(generation, "ignoring stale round clock fire");
                    return;
                }
                Self::complete_round(&mut state);
            }
            Self::notify_round_ended(&observers);
        }
    }

    /// Shared completion path for natural expiry and skip. The dojo stays
    /// active afterwards; only `end_dojo` returns it to idle.
    fn complete_round(state: &mut RoundState) {
        state.round_active = false;
        state.round_paused = false;
        state.paused_remaining_secs = 0;
        state.armed_secs = 0;
        state.started_at = None;
        state.rotation_count += 1;
        state.clock.stop();
        info!(completed_rounds = state.rotation_count, "round ended");
    }

    // Runs outside the state lock so callbacks may call back into the
    // controller.
    fn notify_round_ended(observers: &Mutex<Vec<RoundEndedCallback>>) {
        let observers = observers.lock().unwrap_or_else(PoisonError::into_inner);
        for observer in observers.iter() {
            observer();
        }
    }
}
