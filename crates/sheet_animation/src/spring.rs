//! Spring physics animation
//!
//! RK4-integrated damped harmonic oscillator used to move a sheet between
//! resting offsets. Springs can be described either by raw stiffness/damping
//! or by a damping ratio and a response time.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Default rest threshold: half a point, imperceptible on any display density
pub const DEFAULT_REST_THRESHOLD: f32 = 0.5;

/// Configuration for a spring animation
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub stiffness: f32,
    pub damping: f32,
    pub mass: f32,
}

impl SpringConfig {
    /// Create a new spring configuration
    pub fn new(stiffness: f32, damping: f32, mass: f32) -> Self {
        Self {
            stiffness,
            damping,
            mass,
        }
    }

    /// Create a unit-mass spring from a damping ratio and a response time
    ///
    /// `response` is the period of the undamped oscillation in seconds.
    /// A ratio of 1.0 is critically damped, below 1.0 overshoots.
    pub fn from_response(damping_ratio: f32, response: f32) -> Self {
        let stiffness = (2.0 * PI / response).powi(2);
        Self {
            stiffness,
            damping: 2.0 * damping_ratio * stiffness.sqrt(),
            mass: 1.0,
        }
    }

    /// The spring used for sheet transitions (slight overshoot, ~0.4s)
    pub fn sheet() -> Self {
        Self::from_response(0.8, 0.4)
    }

    /// A stiff, snappy spring
    pub fn stiff() -> Self {
        Self {
            stiffness: 400.0,
            damping: 30.0,
            mass: 1.0,
        }
    }

    /// A slow spring with no overshoot (critically damped)
    pub fn molasses() -> Self {
        Self {
            stiffness: 100.0,
            damping: 20.0,
            mass: 1.0,
        }
    }

    /// Calculate critical damping for this spring's stiffness and mass
    pub fn critical_damping(&self) -> f32 {
        2.0 * (self.stiffness * self.mass).sqrt()
    }

    /// Ratio of actual damping to critical damping
    pub fn damping_ratio(&self) -> f32 {
        self.damping / self.critical_damping()
    }

    /// Check if the spring is underdamped (will oscillate)
    pub fn is_underdamped(&self) -> bool {
        self.damping < self.critical_damping()
    }

    /// Check if the spring is critically damped (no oscillation, fastest settling)
    pub fn is_critically_damped(&self) -> bool {
        (self.damping - self.critical_damping()).abs() < 0.01
    }

    /// Check if the spring is overdamped (slow settling, no oscillation)
    pub fn is_overdamped(&self) -> bool {
        self.damping > self.critical_damping()
    }
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::sheet()
    }
}

/// A spring-based animator for a single scalar
#[derive(Clone, Copy, Debug)]
pub struct Spring {
    config: SpringConfig,
    value: f32,
    velocity: f32,
    target: f32,
    rest_threshold: f32,
}

impl Spring {
    pub fn new(config: SpringConfig, initial: f32) -> Self {
        Self {
            config,
            value: initial,
            velocity: 0.0,
            target: initial,
            rest_threshold: DEFAULT_REST_THRESHOLD,
        }
    }

    /// Use a custom distance/velocity threshold for [`Spring::is_settled`]
    pub fn with_rest_threshold(mut self, threshold: f32) -> Self {
        self.rest_threshold = threshold;
        self
    }

    pub fn config(&self) -> SpringConfig {
        self.config
    }

    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn rest_threshold(&self) -> f32 {
        self.rest_threshold
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    /// Move the spring to `value` without touching target or velocity
    pub fn set_value(&mut self, value: f32) {
        self.value = value;
    }

    pub fn set_velocity(&mut self, velocity: f32) {
        self.velocity = velocity;
    }

    /// Signed distance from the target (the oscillator's displacement)
    pub fn displacement(&self) -> f32 {
        self.value - self.target
    }

    /// Jump to the target and drop all momentum
    pub fn snap_to_target(&mut self) {
        self.value = self.target;
        self.velocity = 0.0;
    }

    /// Check if the spring has settled (within threshold of target with minimal velocity)
    pub fn is_settled(&self) -> bool {
        self.displacement().abs() < self.rest_threshold && self.velocity.abs() < self.rest_threshold
    }

    /// Step the spring simulation using RK4 integration
    pub fn step(&mut self, dt: f32) {
        if self.is_settled() {
            self.snap_to_target();
            return;
        }

        let k1_v = self.acceleration(self.value, self.velocity);
        let k1_x = self.velocity;

        let k2_v = self.acceleration(
            self.value + k1_x * dt * 0.5,
            self.velocity + k1_v * dt * 0.5,
        );
        let k2_x = self.velocity + k1_v * dt * 0.5;

        let k3_v = self.acceleration(
            self.value + k2_x * dt * 0.5,
            self.velocity + k2_v * dt * 0.5,
        );
        let k3_x = self.velocity + k2_v * dt * 0.5;

        let k4_v = self.acceleration(self.value + k3_x * dt, self.velocity + k3_v * dt);
        let k4_x = self.velocity + k3_v * dt;

        self.velocity += (k1_v + 2.0 * k2_v + 2.0 * k3_v + k4_v) * dt / 6.0;
        self.value += (k1_x + 2.0 * k2_x + 2.0 * k3_x + k4_x) * dt / 6.0;
    }

    fn acceleration(&self, x: f32, v: f32) -> f32 {
        let spring_force = -self.config.stiffness * (x - self.target);
        let damping_force = -self.config.damping * v;
        (spring_force + damping_force) / self.config.mass
    }
}
