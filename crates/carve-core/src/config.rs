//! Tunable constants for tracing and movement
//!
//! Defaults reproduce the reference behavior exactly. The movement values in
//! particular are gameplay-feel parameters: change them per game, not to make
//! the physics "more correct".

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Sphere tracing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Distance at or below which a sample counts as a surface hit
    pub hit_epsilon: f32,
    /// A single step longer than this means there is no surface nearby
    pub far_step: f32,
    /// Hard cap on field evaluations per trace
    pub max_steps: u32,
    /// Smallest step taken by shadow rays, so they can cross thin features
    pub shadow_min_step: f32,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            hit_epsilon: 1e-3,
            far_step: 100.0,
            max_steps: 1000,
            shadow_min_step: 1e-2,
        }
    }
}

impl TraceConfig {
    pub fn with_hit_epsilon(mut self, hit_epsilon: f32) -> Self {
        self.hit_epsilon = hit_epsilon;
        self
    }

    pub fn with_far_step(mut self, far_step: f32) -> Self {
        self.far_step = far_step;
        self
    }

    pub fn with_max_steps(mut self, max_steps: u32) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_shadow_min_step(mut self, shadow_min_step: f32) -> Self {
        self.shadow_min_step = shadow_min_step;
        self
    }

    pub fn validate(&self) -> Result<()> {
        positive("hit_epsilon", self.hit_epsilon)?;
        positive("far_step", self.far_step)?;
        positive("shadow_min_step", self.shadow_min_step)?;
        if self.max_steps == 0 {
            return Err(Error::InvalidParameter("max_steps must be at least 1".into()));
        }
        Ok(())
    }
}

/// Collision response parameters for the movement integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Extra look-ahead added to the per-step travel budget
    pub overshoot: f32,
    /// Remaining budget below which the step ends
    pub min_travel: f32,
    /// Hard cap on trace/bounce iterations per step
    pub max_iterations: u32,
    /// Skin margin: bodies stop this far from the surface
    pub skin: f32,
    /// Speed factor after reflecting off a surface with a usable normal
    pub glancing_damping: f32,
    /// Speed factor after bouncing straight back (no horizontal normal)
    pub head_on_damping: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            overshoot: 0.1,
            min_travel: 0.01,
            max_iterations: 100,
            skin: 0.125,
            glancing_damping: 0.75,
            head_on_damping: 0.5,
        }
    }
}

impl MovementConfig {
    pub fn with_skin(mut self, skin: f32) -> Self {
        self.skin = skin;
        self
    }

    pub fn with_damping(mut self, glancing: f32, head_on: f32) -> Self {
        self.glancing_damping = glancing;
        self.head_on_damping = head_on;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn validate(&self) -> Result<()> {
        non_negative("overshoot", self.overshoot)?;
        non_negative("min_travel", self.min_travel)?;
        non_negative("skin", self.skin)?;
        unit_interval("glancing_damping", self.glancing_damping)?;
        unit_interval("head_on_damping", self.head_on_damping)?;
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameter(
                "max_iterations must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn positive(name: &str, value: f32) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "{name} must be positive, got {value}"
        )))
    }
}

fn non_negative(name: &str, value: f32) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "{name} must not be negative, got {value}"
        )))
    }
}

fn unit_interval(name: &str, value: f32) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(TraceConfig::default().validate().is_ok());
        assert!(MovementConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_movement_constants() {
        let c = MovementConfig::default();
        assert_eq!(c.skin, 0.125);
        assert_eq!(c.glancing_damping, 0.75);
        assert_eq!(c.head_on_damping, 0.5);
        assert_eq!(c.overshoot, 0.1);
        assert_eq!(c.min_travel, 0.01);
        assert_eq!(c.max_iterations, 100);
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = TraceConfig::default().with_hit_epsilon(0.0).validate();
        assert!(matches!(err, Err(Error::InvalidParameter(msg)) if msg.contains("hit_epsilon")));

        let err = MovementConfig::default().with_damping(1.5, 0.5).validate();
        assert!(matches!(err, Err(Error::InvalidParameter(msg)) if msg.contains("glancing")));

        assert!(TraceConfig::default().with_max_steps(0).validate().is_err());
        assert!(MovementConfig::default().with_skin(-1.0).validate().is_err());
    }
}
