//! Sheet Animation System
//!
//! Spring physics and the frame-driven motion driver that moves a bottom
//! sheet between its resting offsets.
//!
//! # Features
//!
//! - **Spring Physics**: RK4-integrated springs configured by stiffness/damping
//!   or by damping ratio and response time
//! - **Host-Driven Frames**: No internal clock or thread; the host steps the
//!   animator once per display refresh
//! - **Interruptible**: Pause, resume and redirect mid-flight while keeping
//!   position and velocity
//! - **Callbacks**: Any number of per-frame callbacks and a one-shot completion

pub mod animator;
pub mod spring;

pub use animator::{
    AnimatorState, CompletionCallback, FrameCallback, FrameCallbackId, SpringAnimator, StepOutcome,
};
pub use spring::{Spring, SpringConfig, DEFAULT_REST_THRESHOLD};
