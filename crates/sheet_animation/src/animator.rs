//! Frame-driven spring animator
//!
//! `SpringAnimator` moves a single scalar (a sheet's top offset) from a start
//! position toward a target position along a damped spring trajectory. It
//! owns no clock: the host calls [`SpringAnimator::step`] once per display
//! frame with the frame duration, so stepping stays on the host's event loop.
//!
//! # Lifecycle
//!
//! ```text
//!            start                pause
//! Stopped ---------> Active ---------------> Inactive
//!    ^                 |   <---------------     |
//!    |   settled/stop  |        start           |  stop
//!    +-----------------+------------------------+
//! ```
//!
//! Pausing freezes the physics state. Setting the from/to positions while
//! paused (or running) immediately updates the spring's displacement, which
//! is how an in-flight animation gets redirected without a visual jump.
//!
//! # Example
//!
//! ```rust
//! use sheet_animation::{SpringAnimator, SpringConfig, StepOutcome};
//!
//! let mut animator = SpringAnimator::new(SpringConfig::sheet());
//! animator.set_from_position(800.0);
//! animator.set_to_position(400.0);
//! animator.start_animation();
//!
//! let mut last = 800.0;
//! for _ in 0..600 {
//!     match animator.step(1.0 / 60.0) {
//!         StepOutcome::Moved(y) => last = y,
//!         StepOutcome::Finished(y) => {
//!             last = y;
//!             break;
//!         }
//!         StepOutcome::Idle => break,
//!     }
//! }
//! assert_eq!(last, 400.0);
//! ```

use crate::spring::{Spring, SpringConfig};
use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Handle to a registered per-frame callback
    pub struct FrameCallbackId;
}

/// Callback receiving every frame's interpolated position
pub type FrameCallback = Box<dyn FnMut(f32)>;

/// Callback fired once when a run ends; `true` if the target was reached
pub type CompletionCallback = Box<dyn FnOnce(bool)>;

/// Animator run state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum AnimatorState {
    /// Paused mid-flight, physics state preserved
    Inactive,
    /// Stepping on every frame
    Active,
    /// Not running; a new run starts from the current from/to positions
    #[default]
    Stopped,
}

/// Result of a single [`SpringAnimator::step`]
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StepOutcome {
    /// Animator is paused or stopped, nothing moved
    Idle,
    /// New interpolated position
    Moved(f32),
    /// Settled exactly on the target; the run is over
    Finished(f32),
}

impl StepOutcome {
    /// Position produced by this step, if any
    pub fn position(&self) -> Option<f32> {
        match self {
            StepOutcome::Idle => None,
            StepOutcome::Moved(y) | StepOutcome::Finished(y) => Some(*y),
        }
    }
}

/// Spring animator driven by host frame ticks
pub struct SpringAnimator {
    spring: Spring,
    state: AnimatorState,
    animations: SlotMap<FrameCallbackId, FrameCallback>,
    completion: Option<CompletionCallback>,
}

impl SpringAnimator {
    pub fn new(config: SpringConfig) -> Self {
        Self {
            spring: Spring::new(config, 0.0),
            state: AnimatorState::Stopped,
            animations: SlotMap::with_key(),
            completion: None,
        }
    }

    /// Use a custom rest threshold (typically one physical pixel in points)
    pub fn with_rest_threshold(mut self, threshold: f32) -> Self {
        self.spring = self.spring.with_rest_threshold(threshold);
        self
    }

    /// Replace the spring parameters
    ///
    /// Ignored while a run is active, matching how a running spring keeps
    /// the physics it started with.
    pub fn set_config(&mut self, config: SpringConfig) {
        if self.is_running() {
            tracing::debug!("SpringAnimator: ignoring config change while running");
            return;
        }
        let threshold = self.spring.rest_threshold();
        let mut spring = Spring::new(config, self.spring.value()).with_rest_threshold(threshold);
        spring.set_target(self.spring.target());
        spring.set_velocity(self.spring.velocity());
        self.spring = spring;
    }

    pub fn config(&self) -> SpringConfig {
        self.spring.config()
    }

    pub fn state(&self) -> AnimatorState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == AnimatorState::Active
    }

    /// Current interpolated position
    pub fn position(&self) -> f32 {
        self.spring.value()
    }

    pub fn velocity(&self) -> f32 {
        self.spring.velocity()
    }

    pub fn to_position(&self) -> f32 {
        self.spring.target()
    }

    /// Set the start position; the displacement from the target updates immediately
    pub fn set_from_position(&mut self, position: f32) {
        self.spring.set_value(position);
    }

    /// Set the target position; the displacement updates immediately
    pub fn set_to_position(&mut self, position: f32) {
        self.spring.set_target(position);
    }

    pub fn set_initial_velocity(&mut self, velocity: f32) {
        self.spring.set_velocity(velocity);
    }

    /// Register a callback that receives every frame's position
    pub fn add_animation<F>(&mut self, animation: F) -> FrameCallbackId
    where
        F: FnMut(f32) + 'static,
    {
        self.animations.insert(Box::new(animation))
    }

    pub fn remove_animation(&mut self, id: FrameCallbackId) -> bool {
        self.animations.remove(id).is_some()
    }

    /// Set the completion callback for the current (or next) run, replacing any previous one
    pub fn set_completion<F>(&mut self, completion: F)
    where
        F: FnOnce(bool) + 'static,
    {
        self.completion = Some(Box::new(completion));
    }

    pub fn start_animation(&mut self) {
        if self.is_running() {
            return;
        }
        tracing::debug!(
            "SpringAnimator: start {:?} -> {} (v={})",
            self.state,
            self.spring.target(),
            self.spring.velocity()
        );
        self.state = AnimatorState::Active;
    }

    pub fn pause_animation(&mut self) {
        if !self.is_running() {
            return;
        }
        tracing::debug!("SpringAnimator: paused at {}", self.spring.value());
        self.state = AnimatorState::Inactive;
    }

    /// End the current run early
    ///
    /// With `without_finishing` the spring stays where it is and the
    /// completion fires with `false`; otherwise it snaps to the target,
    /// emits a final frame and completes with `true`. A paused run counts as
    /// a run: stopping it also fires the completion. Stopping an animator
    /// that is already stopped does nothing.
    pub fn stop_animation(&mut self, without_finishing: bool) {
        if self.state == AnimatorState::Stopped {
            return;
        }
        self.state = AnimatorState::Stopped;

        if without_finishing {
            self.spring.set_velocity(0.0);
        } else {
            self.spring.snap_to_target();
            self.emit_frame(self.spring.value());
        }

        tracing::debug!(
            "SpringAnimator: stopped at {} (finished={})",
            self.spring.value(),
            !without_finishing
        );
        self.complete(!without_finishing);
    }

    /// Advance the animation by one frame of `dt` seconds
    pub fn step(&mut self, dt: f32) -> StepOutcome {
        if !self.is_running() {
            return StepOutcome::Idle;
        }

        self.spring.step(dt);

        if self.spring.is_settled() {
            self.spring.snap_to_target();
            self.state = AnimatorState::Stopped;
            let position = self.spring.value();
            self.emit_frame(position);
            self.complete(true);
            return StepOutcome::Finished(position);
        }

        let position = self.spring.value();
        self.emit_frame(position);
        StepOutcome::Moved(position)
    }

    fn emit_frame(&mut self, position: f32) {
        for (_, animation) in self.animations.iter_mut() {
            animation(position);
        }
    }

    fn complete(&mut self, finished: bool) {
        if let Some(completion) = self.completion.take() {
            completion(finished);
        }
    }
}

impl Default for SpringAnimator {
    fn default() -> Self {
        Self::new(SpringConfig::default())
    }
}

impl std::fmt::Debug for SpringAnimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpringAnimator")
            .field("spring", &self.spring)
            .field("state", &self.state)
            .field("animations", &self.animations.len())
            .field("has_completion", &self.completion.is_some())
            .finish()
    }
}
