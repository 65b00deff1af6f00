//! Movement integration against a distance field
//!
//! Advances a body by one timestep, bouncing off surfaces it would touch.
//! Positions are fixed-point [`Fixie`]s so large worlds keep uniform
//! precision; all field queries happen in `f32` at the body's location.
//!
//! Each step spends a travel budget of `speed * dt` plus a small look-ahead
//! overshoot. The body repeatedly traces as far as its skin margin allows,
//! advances, and on contact either reflects off the surface or bounces
//! straight back:
//!
//! - The contact normal is flattened to the horizontal plane. If anything
//!   remains, the direction reflects about it and speed is damped by the
//!   glancing factor.
//! - Otherwise (floors, ceilings, degenerate normals) the direction reverses
//!   and speed is damped by the head-on factor.
//!
//! The look-ahead is never travelled: it only lets a body bounce slightly
//! before it would come to rest against a surface.

use crate::sdf::Sdf;
use crate::trace::SphereTracer;
use crate::{MovementConfig, Result, TraceConfig};
use carve_math::Fixie;
use glam::Vec3;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// A moving body: fixed-point position and velocity in units per second.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub position: Fixie,
    pub velocity: Vec3,
}

impl Body {
    pub fn new(position: Fixie, velocity: Vec3) -> Self {
        Self { position, velocity }
    }
}

/// Steps bodies through a distance field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementIntegrator {
    pub movement: MovementConfig,
    pub tracer: SphereTracer,
}

impl MovementIntegrator {
    pub fn new(movement: MovementConfig, trace: TraceConfig) -> Self {
        Self {
            movement,
            tracer: SphereTracer::new(trace),
        }
    }

    /// Like [`MovementIntegrator::new`], rejecting invalid configuration.
    pub fn try_new(movement: MovementConfig, trace: TraceConfig) -> Result<Self> {
        movement.validate()?;
        trace.validate()?;
        Ok(Self::new(movement, trace))
    }

    /// Advance `position` by `velocity` over `dt` seconds, resolving contacts.
    ///
    /// Returns the new position and velocity. A body at rest, or a
    /// non-positive `dt`, is returned unchanged.
    pub fn step<S: Sdf + ?Sized>(
        &self,
        sdf: &S,
        position: Fixie,
        velocity: Vec3,
        dt: f32,
    ) -> (Fixie, Vec3) {
        let MovementConfig {
            overshoot,
            min_travel,
            max_iterations,
            skin,
            glancing_damping,
            head_on_damping,
        } = self.movement;

        let speed = velocity.length();
        if !(speed > 0.0 && speed.is_finite()) || dt <= 0.0 {
            return (position, velocity);
        }

        let mut direction = velocity / speed;
        let mut speed = speed;
        let mut position = position;
        let mut remaining = speed * dt + overshoot;
        let mut bounces = 0u32;
        let mut iterations = 0;

        while remaining > min_travel && iterations < max_iterations {
            iterations += 1;

            let travel = self.tracer.travel_trace(
                sdf,
                position.to_vec3(),
                direction,
                remaining,
                skin,
            );
            let advance = travel.travel.min(remaining - overshoot).max(0.0);
            position += Fixie::from_vec3(direction * advance);
            remaining -= travel.travel;

            if !travel.hit {
                continue;
            }

            bounces += 1;
            let mut normal = sdf.gradient(position.to_vec3());
            normal.z = 0.0;
            if normal.length_squared() > 0.0 {
                let normal = normal.normalize();
                direction -= 2.0 * direction.dot(normal) * normal;
                speed *= glancing_damping;
            } else {
                direction = -direction;
                speed *= head_on_damping;
            }
            tracing::trace!(?position, ?direction, speed, remaining, "bounce");
        }

        if iterations == max_iterations && remaining > min_travel {
            tracing::debug!(
                ?position,
                remaining,
                bounces,
                "movement step hit the iteration cap"
            );
        }

        let velocity = if bounces == 0 {
            velocity
        } else {
            direction * speed
        };
        (position, velocity)
    }

    /// Step every body in parallel.
    pub fn step_batch<S: Sdf + ?Sized>(&self, sdf: &S, bodies: &mut [Body], dt: f32) {
        bodies.par_iter_mut().for_each(|body| {
            let (position, velocity) = self.step(sdf, body.position, body.velocity, dt);
            body.position = position;
            body.velocity = velocity;
        });
    }
}

/// [`MovementIntegrator::step`] with default configuration
pub fn integrate_movement<S: Sdf + ?Sized>(
    sdf: &S,
    position: Fixie,
    velocity: Vec3,
    dt: f32,
) -> (Fixie, Vec3) {
    MovementIntegrator::default().step(sdf, position, velocity, dt)
}

/// [`MovementIntegrator::step_batch`] with default configuration
pub fn integrate_batch<S: Sdf + ?Sized>(sdf: &S, bodies: &mut [Body], dt: f32) {
    MovementIntegrator::default().step_batch(sdf, bodies, dt);
}
