//! Sheet controller
//!
//! Owns the drag state machine for one presentation session. The live
//! position is written by exactly one driver at a time: the drag while
//! `Dragging`, the spring animator otherwise. Handing over is the
//! pause/start pair on the animator, tracked by [`SheetState`].
//!
//! ```text
//!            Present            DragBegan
//! Detached ----------> Animating ---------> Dragging
//!                       |  ^  ^                |
//!               settled |  |  +----------------+ DragEnded (range)
//!                       v  |
//!                       Idle          DragEnded (dismiss edge) / Dismiss
//!                                  -----------------------------------> DismissProposed
//!                                                  allowed |   | vetoed -> Animating
//!                                                          v
//!                                         Dismissed <--- Dismissing
//! ```

use sheet_animation::{SpringAnimator, StepOutcome};

use crate::config::SheetConfig;
use crate::error::{Result, SheetError};
use crate::event::{DismissAction, Effects, SheetEffect, SheetEvent, SheetHost};
use crate::height::{ContainerSize, ContentMeasure, SheetHeight};
use crate::target::{find_target, translation_targets, TranslationTarget};

/// Drag state machine state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SheetState {
    /// Not attached to a container yet
    #[default]
    Detached,
    /// Resting on a target offset
    Idle,
    /// Position follows the pan gesture
    Dragging,
    /// Spring is moving toward a target offset
    Animating,
    /// Waiting for the host to allow or veto a dismissal
    DismissProposed,
    /// Spring is moving the sheet off screen
    Dismissing,
    /// Off screen; only `Present` brings it back
    Dismissed,
}

impl SheetState {
    /// Whether gestures and dismiss requests are accepted
    pub fn is_interactive(&self) -> bool {
        matches!(
            self,
            SheetState::Idle | SheetState::Animating | SheetState::Dragging
        )
    }

    /// Whether the sheet is attached to a container and on screen
    pub fn is_presented(&self) -> bool {
        !matches!(self, SheetState::Detached | SheetState::Dismissed)
    }
}

/// What the running animation is for
#[derive(Clone, Copy, Debug, PartialEq)]
enum Motion {
    Settle { index: usize },
    /// Resting offset that matches no configured height
    Hold { offset: f32 },
    Dismiss { action: DismissAction },
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct DragSession {
    origin: f32,
    location: f32,
}

/// Drag state machine for a bottom sheet
pub struct SheetController {
    config: SheetConfig,
    heights: Vec<SheetHeight>,
    measure: Box<dyn ContentMeasure>,
    container: Option<ContainerSize>,
    offsets: Vec<f32>,
    targets: Vec<TranslationTarget>,
    index: usize,
    position: f32,
    state: SheetState,
    animator: SpringAnimator,
    motion: Option<Motion>,
    drag: Option<DragSession>,
    pending_dismiss: Option<DismissAction>,
}

impl SheetController {
    /// Create a controller for `heights`, measuring automatic heights with `measure`
    ///
    /// An empty height list is replaced by a single automatic height.
    pub fn new<M>(heights: Vec<SheetHeight>, measure: M, config: SheetConfig) -> Self
    where
        M: ContentMeasure + 'static,
    {
        let animator = SpringAnimator::new(config.spring.spring_config())
            .with_rest_threshold(config.spring.rest_threshold);

        Self {
            config,
            heights: Self::non_empty(heights),
            measure: Box::new(measure),
            container: None,
            offsets: Vec::new(),
            targets: Vec::new(),
            index: 0,
            position: 0.0,
            state: SheetState::Detached,
            animator,
            motion: None,
            drag: None,
            pending_dismiss: None,
        }
    }

    fn non_empty(heights: Vec<SheetHeight>) -> Vec<SheetHeight> {
        if heights.is_empty() {
            tracing::warn!("Sheet created with no heights, using automatic height");
            vec![SheetHeight::Automatic]
        } else {
            heights
        }
    }

    pub fn state(&self) -> SheetState {
        self.state
    }

    pub fn config(&self) -> &SheetConfig {
        &self.config
    }

    pub fn heights(&self) -> &[SheetHeight] {
        &self.heights
    }

    pub fn container(&self) -> Option<ContainerSize> {
        self.container
    }

    /// Resting offsets, ascending
    pub fn offsets(&self) -> &[f32] {
        &self.offsets
    }

    /// Translation targets for the current index, bottom to top
    pub fn targets(&self) -> &[TranslationTarget] {
        &self.targets
    }

    /// Index of the current resting offset
    pub fn current_index(&self) -> usize {
        self.index
    }

    /// Live position of the sheet's top edge
    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn animator(&self) -> &SpringAnimator {
        &self.animator
    }

    /// Backdrop alpha for the live position
    pub fn overlay_alpha(&self) -> Option<f32> {
        if !self.config.dims_background {
            return None;
        }

        let deepest = *self.offsets.last()?;
        if self.position <= 0.0 {
            return Some(1.0);
        }
        Some((deepest / self.position).clamp(0.0, 1.0))
    }

    /// Handle one event and return the effects the host must apply
    pub fn handle(&mut self, event: SheetEvent) -> Result<Effects> {
        let mut effects = Effects::new();

        match event {
            SheetEvent::Present { container } => self.present(container, &mut effects),
            SheetEvent::Resize { container } => {
                if self.state.is_presented() {
                    self.container = Some(container);
                    self.relayout();
                }
            }
            SheetEvent::Reload { heights } => {
                self.heights = Self::non_empty(heights);
                if self.state.is_presented() {
                    self.relayout();
                }
            }
            SheetEvent::Reset => {
                if self.state.is_presented() {
                    self.relayout();
                }
            }
            SheetEvent::TransitionTo { index } => self.transition_to(index)?,
            SheetEvent::TransitionToHeight { height } => self.transition_to_height(height)?,
            SheetEvent::DragBegan => self.drag_began(),
            SheetEvent::DragChanged { translation, .. } => {
                self.drag_changed(translation, &mut effects)
            }
            SheetEvent::DragEnded {
                translation,
                velocity,
            } => {
                if let Some(drag) = self.drag {
                    self.release(drag.origin + translation, velocity, &mut effects);
                }
            }
            SheetEvent::DragCancelled => {
                if let Some(drag) = self.drag {
                    self.release(drag.location, 0.0, &mut effects);
                }
            }
            SheetEvent::Frame { dt } => self.frame(dt, &mut effects),
            SheetEvent::Dismiss { action } => {
                if self.state.is_interactive() {
                    self.drag = None;
                    self.propose_dismiss(action, &mut effects);
                } else {
                    tracing::debug!("Sheet: ignoring dismiss in {:?}", self.state);
                }
            }
            SheetEvent::DismissDecision { allowed } => {
                self.dismiss_decision(allowed, &mut effects)
            }
        }

        Ok(effects)
    }

    /// Handle `event` and apply the effects to `host`
    ///
    /// Dismiss proposals are answered by [`SheetHost::propose_dismiss`] and
    /// the decision is handled before returning.
    pub fn dispatch<H>(&mut self, event: SheetEvent, host: &mut H) -> Result<()>
    where
        H: SheetHost + ?Sized,
    {
        let mut next = Some(event);

        while let Some(event) = next.take() {
            for effect in self.handle(event)? {
                match effect {
                    SheetEffect::SetPosition(y) => host.set_live_position(y),
                    SheetEffect::SetOverlayAlpha(alpha) => host.set_overlay_alpha(alpha),
                    SheetEffect::ProposeDismiss(action) => {
                        let allowed = host.propose_dismiss(action);
                        next = Some(SheetEvent::DismissDecision { allowed });
                    }
                    SheetEffect::DismissCancelled(action) => host.notify_dismiss_cancelled(action),
                    SheetEffect::WillDismiss(action) => host.notify_will_dismiss(action),
                    SheetEffect::DidDismiss(action) => host.notify_did_dismiss(action),
                    SheetEffect::Settled { index } => host.notify_settled(index),
                }
            }
        }

        Ok(())
    }

    fn set_state(&mut self, state: SheetState) {
        if self.state != state {
            tracing::debug!("Sheet state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn container_height(&self) -> f32 {
        self.container.map(|c| c.height).unwrap_or(0.0)
    }

    fn present(&mut self, container: ContainerSize, effects: &mut Effects) {
        if self.state.is_presented() {
            self.container = Some(container);
            self.relayout();
            return;
        }

        self.container = Some(container);
        self.drag = None;
        self.pending_dismiss = None;
        self.recompute_offsets();
        self.index = self.start_index();
        self.rebuild_targets();

        self.position = container.height;
        self.animator.stop_animation(true);
        self.emit_position(effects);

        tracing::debug!(
            "Sheet presented in {}x{} with offsets {:?}",
            container.width,
            container.height,
            self.offsets
        );

        self.animate_to_index(self.index, 0.0);
    }

    fn start_index(&self) -> usize {
        let last = self.offsets.len().saturating_sub(1);
        match self.config.start_index {
            Some(index) if index > last => {
                tracing::warn!(
                    "Start index {} out of range for {} offsets, using {}",
                    index,
                    self.offsets.len(),
                    last
                );
                last
            }
            Some(index) => index,
            None => last,
        }
    }

    fn recompute_offsets(&mut self) {
        let Some(container) = self.container else {
            return;
        };

        self.offsets = self.config.geometry.target_offsets(
            &self.heights,
            &container,
            self.measure.as_ref(),
        );

        if self.offsets.is_empty() {
            tracing::warn!("Sheet has no usable offsets for {:?}", self.heights);
        }
        self.index = self.index.min(self.offsets.len().saturating_sub(1));
    }

    fn rebuild_targets(&mut self) {
        self.targets = translation_targets(
            &self.offsets,
            self.index,
            self.container_height(),
            &self.config.geometry,
            self.config.dismiss,
        );
    }

    /// Recompute geometry and move back onto the current index
    fn relayout(&mut self) {
        self.recompute_offsets();
        self.rebuild_targets();

        tracing::debug!(
            "Sheet relayout: offsets {:?}, index {}",
            self.offsets,
            self.index
        );

        match self.state {
            SheetState::Idle | SheetState::Animating => {
                let velocity = self.carried_velocity();
                self.animate_to_index(self.index, velocity);
            }
            SheetState::Dismissing => {
                self.animator.set_to_position(self.container_height());
            }
            _ => {}
        }
    }

    fn carried_velocity(&self) -> f32 {
        if self.animator.is_running() {
            self.animator.velocity()
        } else {
            0.0
        }
    }

    fn transition_to(&mut self, index: usize) -> Result<()> {
        if !self.state.is_presented() {
            tracing::debug!("Sheet: transition to {} before presentation", index);
            return Ok(());
        }

        if index >= self.offsets.len() {
            return Err(SheetError::TargetIndexOutOfRange {
                index,
                len: self.offsets.len(),
            });
        }

        match self.state {
            SheetState::DismissProposed | SheetState::Dismissing => {
                tracing::debug!("Sheet: ignoring transition to {} while dismissing", index);
            }
            _ => {
                self.drag = None;
                let velocity = self.carried_velocity();
                self.animate_to_index(index, velocity);
            }
        }

        Ok(())
    }

    fn transition_to_height(&mut self, height: SheetHeight) -> Result<()> {
        let Some(container) = self.container.filter(|_| self.state.is_presented()) else {
            tracing::debug!("Sheet: transition to {:?} before presentation", height);
            return Ok(());
        };

        let offset = self
            .config
            .geometry
            .offset(height, &container, self.measure.as_ref())?;

        match self.state {
            SheetState::DismissProposed | SheetState::Dismissing => {
                tracing::debug!("Sheet: ignoring transition to {:?} while dismissing", height);
            }
            _ => {
                self.drag = None;
                let velocity = self.carried_velocity();
                let motion = match self.offsets.iter().position(|&o| o == offset) {
                    Some(index) => Motion::Settle { index },
                    None => Motion::Hold { offset },
                };
                self.animate(offset, velocity, motion);
            }
        }

        Ok(())
    }

    fn drag_began(&mut self) {
        match self.state {
            SheetState::Idle | SheetState::Animating => {}
            state => {
                tracing::debug!("Sheet: ignoring drag start in {:?}", state);
                return;
            }
        }

        self.animator.pause_animation();
        self.motion = None;
        self.drag = Some(DragSession {
            origin: self.position,
            location: self.position,
        });
        self.set_state(SheetState::Dragging);
    }

    fn drag_changed(&mut self, translation: f32, effects: &mut Effects) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };

        let location = drag.origin + translation;
        drag.location = location;

        let Some(target) = find_target(&self.targets, location) else {
            tracing::trace!("Sheet: no target contains {}", location);
            return;
        };

        self.position = target.next_offset(location);
        tracing::trace!("Sheet drag at {} -> {}", location, self.position);
        self.emit_position(effects);
    }

    fn release(&mut self, location: f32, velocity: f32, effects: &mut Effects) {
        self.drag = None;

        let Some(target) = find_target(&self.targets, location).cloned() else {
            tracing::debug!("Sheet released at {} outside every target", location);
            self.animate_to_index(self.index, 0.0);
            return;
        };

        let velocity = target.translate_velocity(velocity, location);
        tracing::debug!(
            "Sheet released at {} -> offset {} (v={})",
            location,
            target.target_offset(),
            velocity
        );

        if target.is_dismissal() {
            self.propose_dismiss(DismissAction::Drag { velocity }, effects);
        } else {
            self.animate(
                target.target_offset(),
                velocity,
                Motion::Settle {
                    index: target.index(),
                },
            );
        }
    }

    fn frame(&mut self, dt: f32, effects: &mut Effects) {
        match self.animator.step(dt) {
            StepOutcome::Idle => {}
            StepOutcome::Moved(y) => {
                self.position = y;
                self.emit_position(effects);
            }
            StepOutcome::Finished(y) => {
                self.position = y;
                self.emit_position(effects);
                self.finish_motion(effects);
            }
        }
    }

    fn finish_motion(&mut self, effects: &mut Effects) {
        match self.motion.take() {
            Some(Motion::Settle { index }) => {
                self.index = index;
                self.rebuild_targets();
                self.set_state(SheetState::Idle);
                tracing::debug!("Sheet settled at index {} ({})", index, self.position);
                effects.push(SheetEffect::Settled { index });
            }
            Some(Motion::Hold { offset }) => {
                self.set_state(SheetState::Idle);
                tracing::debug!(
                    "Sheet resting at {} off the configured offsets, index stays {}",
                    offset,
                    self.index
                );
            }
            Some(Motion::Dismiss { action }) => {
                self.set_state(SheetState::Dismissed);
                tracing::debug!("Sheet dismissed by {:?}", action);
                effects.push(SheetEffect::DidDismiss(action));
            }
            None => self.set_state(SheetState::Idle),
        }
    }

    fn propose_dismiss(&mut self, action: DismissAction, effects: &mut Effects) {
        self.animator.pause_animation();
        self.motion = None;
        self.pending_dismiss = Some(action);
        self.set_state(SheetState::DismissProposed);
        effects.push(SheetEffect::ProposeDismiss(action));
    }

    fn dismiss_decision(&mut self, allowed: bool, effects: &mut Effects) {
        let Some(action) = self.pending_dismiss.take() else {
            tracing::debug!("Sheet: dismiss decision without a proposal");
            return;
        };

        if allowed {
            effects.push(SheetEffect::WillDismiss(action));
            // Off screen is always toward the container bottom
            let velocity = match action {
                DismissAction::Drag { velocity } => velocity.max(0.0),
                DismissAction::BackdropTap | DismissAction::Programmatic => 0.0,
            };
            self.animate(
                self.container_height(),
                velocity,
                Motion::Dismiss { action },
            );
        } else {
            tracing::debug!("Sheet: dismiss vetoed, returning to index {}", self.index);
            effects.push(SheetEffect::DismissCancelled(action));
            self.animate_to_index(self.index, 0.0);
        }
    }

    fn animate_to_index(&mut self, index: usize, velocity: f32) {
        match self.offsets.get(index) {
            Some(&offset) => self.animate(offset, velocity, Motion::Settle { index }),
            None => {
                self.animator.stop_animation(true);
                self.motion = None;
                self.set_state(SheetState::Idle);
            }
        }
    }

    fn animate(&mut self, to: f32, velocity: f32, motion: Motion) {
        self.animator.set_from_position(self.position);
        self.animator.set_to_position(to);
        self.animator.set_initial_velocity(velocity);
        self.motion = Some(motion);
        self.animator.start_animation();

        let state = match motion {
            Motion::Settle { .. } | Motion::Hold { .. } => SheetState::Animating,
            Motion::Dismiss { .. } => SheetState::Dismissing,
        };
        self.set_state(state);
    }

    fn emit_position(&self, effects: &mut Effects) {
        effects.push(SheetEffect::SetPosition(self.position));
        if let Some(alpha) = self.overlay_alpha() {
            effects.push(SheetEffect::SetOverlayAlpha(alpha));
        }
    }
}

impl std::fmt::Debug for SheetController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetController")
            .field("state", &self.state)
            .field("heights", &self.heights)
            .field("offsets", &self.offsets)
            .field("index", &self.index)
            .field("position", &self.position)
            .field("animator", &self.animator)
            .finish()
    }
}
