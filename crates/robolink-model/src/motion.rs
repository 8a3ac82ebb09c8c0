//! Motion interpolation
//!
//! Animates the simulated pointer from its current pose to a target point in
//! a fixed number of linear steps, independent of the distance travelled.
//! The time budget is `distance / speed`, where distance is the larger of
//! the location and rotation distances, spread evenly over the steps.
//!
//! Cancellation is checked before every step and ends the wait for the
//! next step at once. A cancelled motion leaves
//! the pose where the last step put it; an uncancelled one finishes with an
//! exact snap to the target.

use robolink_core::{MotionError, Pose, PositionPoint};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Number of interpolation steps per motion
pub const MOTION_STEPS: u32 = 1000;

/// How an interpolation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionOutcome {
    /// All steps ran and the pose was snapped to the target
    Completed {
        /// Interpolation steps applied, excluding the final snap
        steps: u32,
    },
    /// Cancelled before the given step
    Cancelled {
        /// Interpolation steps applied before cancellation
        steps: u32,
    },
    /// Degenerate input, nothing was applied
    Rejected,
}

impl MotionOutcome {
    /// Whether the pose ended exactly on the target
    pub fn reached_target(&self) -> bool {
        matches!(self, Self::Completed { .. })
    }
}

/// Precomputed trajectory parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionPlan {
    /// Start pose
    pub start: Pose,
    /// Target pose
    pub target: Pose,
    /// Per-step increment of each component, `x y z r p w`
    pub increment: [f64; 6],
    /// Larger of location and rotation distance
    pub distance: f64,
    /// Total motion time in seconds
    pub total_time: f64,
    /// Delay before each step
    pub step_delay: Duration,
    /// Number of steps
    pub steps: u32,
}

fn euclidean(a: [f64; 3], b: [f64; 3]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (y - x) * (y - x))
        .sum::<f64>()
        .sqrt()
}

impl MotionPlan {
    /// Plan a motion from `start` to `target` in `steps` steps
    pub fn new(start: &Pose, target: &PositionPoint, steps: u32) -> Result<Self, MotionError> {
        let speed = target.move_speed();
        if !(speed.is_finite() && speed > 0.0) {
            return Err(MotionError::NonPositiveSpeed { speed });
        }

        let end = target.pose();
        let distance = euclidean(start.location(), end.location())
            .max(euclidean(start.rotation(), end.rotation()));
        let total_time = distance / speed;
        let steps = steps.max(1);

        let from = start.components();
        let to = end.components();
        let mut increment = [0.0; 6];
        for (i, inc) in increment.iter_mut().enumerate() {
            *inc = (to[i] - from[i]) / f64::from(steps);
        }

        let step_delay =
            Duration::try_from_secs_f64(total_time / f64::from(steps)).unwrap_or(Duration::MAX);

        Ok(Self {
            start: *start,
            target: end,
            increment,
            distance,
            total_time,
            step_delay,
            steps,
        })
    }
}

/// Cancellable, time-sliced pose interpolator
#[derive(Debug, Clone, Copy)]
pub struct MotionInterpolator {
    steps: u32,
}

impl MotionInterpolator {
    /// Interpolator with [`MOTION_STEPS`] steps
    pub fn new() -> Self {
        Self {
            steps: MOTION_STEPS,
        }
    }

    /// Interpolator with a custom step count
    pub fn with_steps(steps: u32) -> Self {
        Self {
            steps: steps.max(1),
        }
    }

    /// Number of steps per motion
    pub fn steps(&self) -> u32 {
        self.steps
    }

    /// Plan a motion without running it
    pub fn plan(&self, from: &Pose, target: &PositionPoint) -> Result<MotionPlan, MotionError> {
        MotionPlan::new(from, target, self.steps)
    }

    /// Run a motion, handing every intermediate pose to `apply`
    ///
    /// `apply` receives one pose per step followed by the exact target,
    /// unless the motion is cancelled.
    pub async fn interpolate<F>(
        &self,
        from: Pose,
        target: &PositionPoint,
        cancel: &CancellationToken,
        mut apply: F,
    ) -> MotionOutcome
    where
        F: FnMut(&Pose),
    {
        let plan = match self.plan(&from, target) {
            Ok(plan) => plan,
            Err(e) => {
                tracing::debug!("Motion rejected: {}", e);
                return MotionOutcome::Rejected;
            }
        };

        tracing::debug!(
            "Motion over {:.3} in {:.3}s ({} steps)",
            plan.distance,
            plan.total_time,
            plan.steps
        );

        // Step k ends at start + k * step_delay
        let start = Instant::now();
        let mut components = from.components();
        for step in 0..plan.steps {
            if cancel.is_cancelled() {
                return MotionOutcome::Cancelled { steps: step };
            }
            if !plan.step_delay.is_zero() {
                let deadline = plan
                    .step_delay
                    .checked_mul(step + 1)
                    .and_then(|elapsed| start.checked_add(elapsed));
                match deadline {
                    Some(deadline) => {
                        tokio::select! {
                            biased;
                            _ = cancel.cancelled() => return MotionOutcome::Cancelled { steps: step },
                            _ = tokio::time::sleep_until(deadline) => {}
                        }
                    }
                    None => {
                        cancel.cancelled().await;
                        return MotionOutcome::Cancelled { steps: step };
                    }
                }
            }

            for (c, inc) in components.iter_mut().zip(plan.increment) {
                *c += inc;
            }
            apply(&Pose::from_components(components));
        }

        if cancel.is_cancelled() {
            return MotionOutcome::Cancelled { steps: plan.steps };
        }
        apply(&plan.target);
        MotionOutcome::Completed { steps: plan.steps }
    }
}

impl Default for MotionInterpolator {
    fn default() -> Self {
        Self::new()
    }
}
