//! Events fed into the sheet controller and the effects it emits
//!
//! The controller never calls back into the host. The host pumps
//! [`SheetEvent`]s in and performs the returned [`SheetEffect`]s, either by
//! hand or through a [`SheetHost`] implementation and
//! [`SheetController::dispatch`](crate::SheetController::dispatch).

use smallvec::SmallVec;

use crate::height::{ContainerSize, SheetHeight};

/// What triggered a dismissal
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DismissAction {
    /// Released past a dismissible edge with this (translated) velocity
    Drag { velocity: f32 },
    /// Tap on the dimmed backdrop
    BackdropTap,
    /// Requested by the host
    Programmatic,
}

/// Input events
#[derive(Clone, Debug, PartialEq)]
pub enum SheetEvent {
    /// Attach to a container and animate in
    Present { container: ContainerSize },
    /// Container size changed
    Resize { container: ContainerSize },
    /// Replace the requested heights
    Reload { heights: Vec<SheetHeight> },
    /// Recompute everything against the current container
    Reset,
    /// Animate to a resting index
    TransitionTo { index: usize },
    /// Animate to the offset of `height`, which need not be configured
    TransitionToHeight { height: SheetHeight },
    /// Pan gesture began
    DragBegan,
    /// Pan gesture moved; `translation` is cumulative since `DragBegan`
    DragChanged { translation: f32, velocity: f32 },
    /// Pan gesture ended
    DragEnded { translation: f32, velocity: f32 },
    /// Pan gesture was cancelled or failed
    DragCancelled,
    /// Display refresh tick
    Frame { dt: f32 },
    /// Ask to dismiss the sheet
    Dismiss { action: DismissAction },
    /// Host answer to [`SheetEffect::ProposeDismiss`]
    DismissDecision { allowed: bool },
}

/// Output effects, in the order they must be applied
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SheetEffect {
    SetPosition(f32),
    SetOverlayAlpha(f32),
    /// The host must answer with [`SheetEvent::DismissDecision`]
    ProposeDismiss(DismissAction),
    DismissCancelled(DismissAction),
    WillDismiss(DismissAction),
    DidDismiss(DismissAction),
    Settled { index: usize },
}

/// Effects produced by a single event; most events emit at most a few
pub type Effects = SmallVec<[SheetEffect; 4]>;

/// Host-side sinks for sheet effects
pub trait SheetHost {
    /// Move the sheet's top edge to `y`
    fn set_live_position(&mut self, y: f32);

    fn set_overlay_alpha(&mut self, _alpha: f32) {}

    /// Decide whether a dismissal may proceed
    fn propose_dismiss(&mut self, _action: DismissAction) -> bool {
        true
    }

    fn notify_dismiss_cancelled(&mut self, _action: DismissAction) {}

    fn notify_will_dismiss(&mut self, _action: DismissAction) {}

    fn notify_did_dismiss(&mut self, _action: DismissAction) {}

    fn notify_settled(&mut self, _index: usize) {}
}
