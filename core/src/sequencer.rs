//! Choreography of a single die roll.
//!
//! A roll is two timed activities sharing one [`RollSession`]:
//!
//! - the shuffle task, which shows a random face every `shuffle_interval` and
//!   owns the deadline that settles the roll;
//! - the spin task, which advances `rotation_progress` frame by frame until
//!   its cycles are done or the roll settles, whichever comes first.
//!
//! Starting a roll while another is in flight cancels the old session before
//! spawning the new one. Every state write is tagged with the roll id, so a
//! task that lost the race with a newer roll can no longer touch the state.

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;
use tokio::time::interval_at;
use tokio::time::sleep_until;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;

use crate::config::Config;
use crate::face::FaceId;
use crate::haptics;
use crate::haptics::HapticFeedback;
use crate::haptics::HapticRequest;
use crate::random::RandomSource;
use crate::random::random_source;
use crate::rotation::SpinAnimation;
use crate::state::RollOutcome;
use crate::state::RollPhase;
use crate::state::RollState;
use crate::timing::RollTiming;

const OUTCOME_CHANNEL_CAPACITY: usize = 16;

type SharedRandom = Arc<Mutex<Box<dyn RandomSource>>>;
type SessionSlot = Arc<Mutex<Option<RollSession>>>;

/// Drives rolls and publishes the resulting [`RollState`].
///
/// Must be used from within a Tokio runtime: [`RollSequencer::start`] spawns
/// the session tasks on the current runtime.
pub struct RollSequencer {
    timing: RollTiming,
    haptics: Arc<dyn HapticFeedback>,
    haptic_request: HapticRequest,
    random: SharedRandom,
    state_tx: Arc<watch::Sender<RollState>>,
    outcome_tx: broadcast::Sender<RollOutcome>,
    session: SessionSlot,
}

/// Tasks owned by one in-flight roll.
struct RollSession {
    roll_id: u64,
    cancel: CancellationToken,
    shuffle: JoinHandle<()>,
    spin: JoinHandle<()>,
}

impl RollSession {
    fn stop(self) {
        self.cancel.cancel();
        self.shuffle.abort();
        self.spin.abort();
    }
}

impl RollSequencer {
    pub fn new(
        timing: RollTiming,
        haptics: Arc<dyn HapticFeedback>,
        haptic_request: HapticRequest,
        random: Box<dyn RandomSource>,
    ) -> Self {
        Self::with_initial_state(
            timing,
            haptics,
            haptic_request,
            random,
            RollState::default(),
        )
    }

    pub fn with_initial_state(
        timing: RollTiming,
        haptics: Arc<dyn HapticFeedback>,
        haptic_request: HapticRequest,
        random: Box<dyn RandomSource>,
        initial: RollState,
    ) -> Self {
        let (state_tx, _) = watch::channel(initial);
        let (outcome_tx, _) = broadcast::channel(OUTCOME_CHANNEL_CAPACITY);
        Self {
            timing,
            haptics,
            haptic_request,
            random: Arc::new(Mutex::new(random)),
            state_tx: Arc::new(state_tx),
            outcome_tx,
            session: Arc::new(Mutex::new(None)),
        }
    }

    /// Sequencer wired to the configured timing, haptic request and seed.
    pub fn from_config(config: &Config, haptics: Arc<dyn HapticFeedback>) -> Self {
        Self::new(
            config.timing,
            haptics,
            config.haptics.request,
            random_source(config.seed),
        )
    }

    pub fn timing(&self) -> &RollTiming {
        &self.timing
    }

    pub fn state(&self) -> RollState {
        *self.state_tx.borrow()
    }

    pub fn is_rolling(&self) -> bool {
        self.state_tx.borrow().is_rolling()
    }

    /// Receiver that wakes whenever the face, rotation, or phase changes.
    pub fn subscribe(&self) -> watch::Receiver<RollState> {
        self.state_tx.subscribe()
    }

    /// Receives one [`RollOutcome`] per roll that reaches its deadline.
    pub fn subscribe_outcomes(&self) -> broadcast::Receiver<RollOutcome> {
        self.outcome_tx.subscribe()
    }

    /// Id of the roll whose tasks are currently live, if any.
    pub fn active_roll(&self) -> Option<u64> {
        lock(&self.session).as_ref().map(|session| session.roll_id)
    }

    /// Begins a roll, superseding any roll already in flight.
    pub fn start(&self) {
        haptics::pulse(self.haptics.as_ref(), self.haptic_request);

        let mut slot = lock(&self.session);
        if let Some(previous) = slot.take() {
            debug!(roll_id = previous.roll_id, "superseding in-flight roll");
            previous.stop();
        }

        let mut roll_id = 0;
        self.state_tx.send_modify(|state| {
            state.roll_id += 1;
            state.phase = RollPhase::Rolling;
            state.rotation_progress = 0.0;
            roll_id = state.roll_id;
        });

        let started_at = Instant::now();
        let cancel = CancellationToken::new();
        let spin = tokio::spawn(run_spin(
            self.timing.spin(),
            self.timing.frame_interval,
            started_at,
            roll_id,
            Arc::clone(&self.state_tx),
            cancel.clone(),
        ));
        let shuffle = tokio::spawn(run_shuffle(ShuffleTask {
            timing: self.timing,
            started_at,
            roll_id,
            random: Arc::clone(&self.random),
            state_tx: Arc::clone(&self.state_tx),
            outcome_tx: self.outcome_tx.clone(),
            session: Arc::clone(&self.session),
            cancel: cancel.clone(),
        }));
        debug!(roll_id, "roll started");

        *slot = Some(RollSession {
            roll_id,
            cancel,
            shuffle,
            spin,
        });
    }

    /// Stops an in-flight roll without committing a new face.
    pub fn cancel(&self) {
        let Some(session) = lock(&self.session).take() else {
            return;
        };
        let roll_id = session.roll_id;
        session.stop();
        self.state_tx.send_if_modified(|state| {
            if !state.is_owned_by(roll_id) {
                return false;
            }
            state.phase = RollPhase::Idle;
            true
        });
        debug!(roll_id, "roll cancelled");
    }
}

impl Drop for RollSequencer {
    fn drop(&mut self) {
        if let Some(session) = lock(&self.session).take() {
            session.stop();
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn next_face(random: &Mutex<Box<dyn RandomSource>>) -> FaceId {
    lock(random).next_face()
}

async fn run_spin(
    spin: SpinAnimation,
    frame_interval: Duration,
    started_at: Instant,
    roll_id: u64,
    state_tx: Arc<watch::Sender<RollState>>,
    cancel: CancellationToken,
) {
    let mut frames = interval_at(started_at + frame_interval, frame_interval);
    frames.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = frames.tick() => {
                let elapsed = started_at.elapsed();
                let progress = spin.progress_at(elapsed);
                let owned = state_tx.send_if_modified(|state| {
                    if !state.is_owned_by(roll_id) {
                        return false;
                    }
                    state.rotation_progress = progress;
                    true
                });
                if !owned || spin.is_finished_at(elapsed) {
                    return;
                }
            }
        }
    }
}

struct ShuffleTask {
    timing: RollTiming,
    started_at: Instant,
    roll_id: u64,
    random: SharedRandom,
    state_tx: Arc<watch::Sender<RollState>>,
    outcome_tx: broadcast::Sender<RollOutcome>,
    session: SessionSlot,
    cancel: CancellationToken,
}

async fn run_shuffle(task: ShuffleTask) {
    let interval = task.timing.shuffle_interval;
    let mut ticks = interval_at(task.started_at + interval, interval);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let deadline = sleep_until(task.started_at + task.timing.duration);
    tokio::pin!(deadline);

    loop {
        // The deadline is polled before the tick so a shuffle that lands on
        // the same instant never runs after the roll has settled.
        tokio::select! {
            biased;
            _ = task.cancel.cancelled() => return,
            _ = &mut deadline => {
                settle(&task);
                return;
            }
            _ = ticks.tick() => {
                let face = next_face(&task.random);
                let roll_id = task.roll_id;
                task.state_tx.send_if_modified(|state| {
                    if !state.is_owned_by(roll_id) {
                        return false;
                    }
                    state.current_face = face;
                    true
                });
            }
        }
    }
}

fn settle(task: &ShuffleTask) {
    task.cancel.cancel();

    let face = next_face(&task.random);
    let roll_id = task.roll_id;
    let committed = task.state_tx.send_if_modified(|state| {
        if !state.is_owned_by(roll_id) {
            return false;
        }
        state.current_face = face;
        state.phase = RollPhase::Idle;
        true
    });

    {
        let mut slot = lock(&task.session);
        if slot.as_ref().is_some_and(|session| session.roll_id == roll_id) {
            // Our own handles; dropping them only detaches the finished tasks.
            slot.take();
        }
    }

    if committed {
        info!(roll_id, face = face.value(), "roll settled");
        // No subscribers is normal when nobody watches outcomes.
        let _ = task.outcome_tx.send(RollOutcome { roll_id, face });
    }
}
