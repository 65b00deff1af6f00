//! Sphere tracing queries
//!
//! Three queries march along a segment by repeatedly stepping the distance
//! the field reports as free:
//!
//! - [`SphereTracer::trace`] finds the first surface along a ray.
//! - [`SphereTracer::travel_trace`] reports how far a body with a skin margin
//!   may move before touching a surface.
//! - [`SphereTracer::light_trace`] estimates soft-shadow visibility between two
//!   points.
//!
//! The free functions of the same names use [`TraceConfig::default`].
//!
//! ## Example
//!
//! ```rust
//! use carve_core::prelude::*;
//!
//! let scene = ground().union(&sphere(2.0).translate(Vec3::new(0.0, 0.0, 3.0)));
//! let hit = trace(&scene, Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO);
//! assert!(hit.hit);
//! assert!((hit.point.z - 4.0).abs() < 1e-2);
//! ```

use crate::TraceConfig;
use crate::sdf::Sdf;
use glam::Vec3;

/// Result of [`SphereTracer::trace`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Whether a surface was found
    pub hit: bool,
    /// Final sample point, on the surface when `hit` is set
    pub point: Vec3,
    /// Distance marched from the start
    pub travel: f32,
    /// Number of field evaluations
    pub steps: u32,
}

/// Result of [`SphereTracer::travel_trace`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Travel {
    /// Whether the skin touched a surface within range
    pub hit: bool,
    /// Free distance along the direction, within `[0, max_travel]`
    pub travel: f32,
    /// Number of field evaluations
    pub steps: u32,
}

/// Sphere tracer with configurable thresholds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SphereTracer {
    pub config: TraceConfig,
}

impl SphereTracer {
    pub fn new(config: TraceConfig) -> Self {
        Self { config }
    }

    /// March from `start` toward `stop` until the field drops to the hit
    /// threshold.
    ///
    /// `stop` only sets the direction: the ray continues past it until it
    /// hits, takes a step longer than the far threshold, or runs out of
    /// steps. A start point already inside a surface is an immediate hit.
    pub fn trace<S: Sdf + ?Sized>(&self, sdf: &S, start: Vec3, stop: Vec3) -> Hit {
        let TraceConfig {
            hit_epsilon,
            far_step,
            max_steps,
            ..
        } = self.config;
        let dir = (stop - start).normalize_or_zero();

        let mut travel = 0.0;
        let mut point = start;
        for step in 1..=max_steps {
            point = start + dir * travel;
            let d = sdf.distance(point);
            if d <= hit_epsilon {
                return Hit {
                    hit: true,
                    point,
                    travel,
                    steps: step,
                };
            }
            if d > far_step || dir == Vec3::ZERO {
                return Hit {
                    hit: false,
                    point,
                    travel,
                    steps: step,
                };
            }
            travel += d;
        }

        tracing::debug!(?start, ?stop, travel, "trace gave up after {max_steps} steps");
        Hit {
            hit: false,
            point,
            travel,
            steps: max_steps,
        }
    }

    /// How far a body can move from `start` along `direction` while keeping
    /// `margin` clearance from every surface.
    ///
    /// The field is deflated by `margin`, so a hit means the skin touched a
    /// surface. A sample only counts as a hit while the ray is approaching the
    /// surface; a body resting on a surface can always move away from it.
    /// The returned travel never exceeds `max_travel`.
    pub fn travel_trace<S: Sdf + ?Sized>(
        &self,
        sdf: &S,
        start: Vec3,
        direction: Vec3,
        max_travel: f32,
        margin: f32,
    ) -> Travel {
        let TraceConfig {
            hit_epsilon,
            far_step,
            max_steps,
            ..
        } = self.config;
        let dir = direction.normalize_or_zero();
        let max_travel = max_travel.max(0.0);
        if dir == Vec3::ZERO || max_travel == 0.0 {
            return Travel {
                hit: false,
                travel: 0.0,
                steps: 0,
            };
        }

        let limit = max_travel + margin;
        let mut travel = 0.0_f32;
        for step in 1..=max_steps {
            let point = start + dir * travel;
            let d = sdf.distance(point) - margin;

            if d <= hit_epsilon {
                if sdf.gradient(point).dot(dir) < 0.0 {
                    return Travel {
                        hit: true,
                        travel: travel.min(max_travel),
                        steps: step,
                    };
                }
                // Leaving the surface: the real surface is |d + margin| away
                travel += (d + margin).abs().max(hit_epsilon);
            } else if d > far_step {
                return Travel {
                    hit: false,
                    travel: (travel + d).min(max_travel),
                    steps: step,
                };
            } else {
                travel += d;
            }

            if travel >= limit {
                return Travel {
                    hit: false,
                    travel: max_travel,
                    steps: step,
                };
            }
        }

        tracing::debug!(?start, ?direction, travel, "travel trace gave up after {max_steps} steps");
        Travel {
            hit: false,
            travel: travel.min(max_travel),
            steps: max_steps,
        }
    }

    /// Soft-shadow visibility of `stop` as seen from `start`.
    ///
    /// Returns `1.0` when nothing comes near the segment and `0.0` when it
    /// passes well inside a surface. `light_size` widens the penumbra.
    pub fn light_trace<S: Sdf + ?Sized>(
        &self,
        sdf: &S,
        start: Vec3,
        stop: Vec3,
        light_size: f32,
    ) -> f32 {
        let delta = stop - start;
        let length = delta.length();
        if length <= 0.0 || !length.is_finite() {
            return 1.0;
        }
        let dir = delta / length;
        let size = light_size.max(f32::EPSILON);
        let min_step = self.config.shadow_min_step;

        let mut ratio = 1.0_f32;
        let mut travel = min_step;
        let mut steps = 0;
        while travel < length && steps < self.config.max_steps {
            steps += 1;
            let d = sdf.distance(start + dir * travel);
            ratio = ratio.min(d / (size * travel));
            if ratio <= -1.0 {
                break;
            }
            travel += d.max(min_step);
        }

        let r = ratio.clamp(-1.0, 1.0);
        0.25 * (1.0 + r) * (1.0 + r) * (2.0 - r)
    }
}

/// [`SphereTracer::trace`] with default thresholds
pub fn trace<S: Sdf + ?Sized>(sdf: &S, start: Vec3, stop: Vec3) -> Hit {
    SphereTracer::default().trace(sdf, start, stop)
}

/// [`SphereTracer::travel_trace`] with default thresholds
pub fn travel_trace<S: Sdf + ?Sized>(
    sdf: &S,
    start: Vec3,
    direction: Vec3,
    max_travel: f32,
    margin: f32,
) -> Travel {
    SphereTracer::default().travel_trace(sdf, start, direction, max_travel, margin)
}

/// [`SphereTracer::light_trace`] with default thresholds
pub fn light_trace<S: Sdf + ?Sized>(sdf: &S, start: Vec3, stop: Vec3, light_size: f32) -> f32 {
    SphereTracer::default().light_trace(sdf, start, stop, light_size)
}
