use log::{debug, warn};
use nalgebra::Vector3;

use crate::dynamics::body::RigidBody;
use crate::dynamics::state::world_up;
use crate::error::FlightError;
use crate::vehicle::Engine;

// ---------------------------------------------------------------------------
// Required correction torque
// ---------------------------------------------------------------------------

/// Restoring torque that would bring body up back onto world up.
///
/// Direction is `up × ŷ`, magnitude `|up × ŷ| · mass · 0.5`: grows with the
/// sine of the tilt and with total mass, not with moment of inertia.
pub fn required_torque<B: RigidBody + ?Sized>(body: &B) -> Vector3<f64> {
    let correction_axis = body.up().cross(&world_up());
    let strength = correction_axis.norm();
    let required = correction_axis
        .try_normalize(0.0)
        .map_or_else(Vector3::zeros, |dir| dir * strength * body.mass() * 0.5);
    debug!(target: "torque", "required {:.2?} |{:.2}|", required.as_slice(), required.norm());
    required
}

// ---------------------------------------------------------------------------
// Evaluation order
// ---------------------------------------------------------------------------

/// Indices of `engines` in evaluation order: the center engine first, the
/// rest by ascending id. Independent of the input order.
pub fn evaluation_order(engines: &[Engine], center_id: u32) -> Vec<usize> {
    let mut order: Vec<usize> = (0..engines.len()).collect();
    order.sort_by_key(|&i| (engines[i].id != center_id, engines[i].id));
    order
}

// ---------------------------------------------------------------------------
// Greedy stabilization selector
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Engine ids to steer this tick, in evaluation order.
    pub engines: Vec<u32>,
    pub required: Vector3<f64>,
    pub accumulated: Vector3<f64>,
}

impl Selection {
    pub fn is_sufficient(&self) -> bool {
        self.accumulated.norm() >= self.required.norm()
    }

    pub fn contains(&self, id: u32) -> bool {
        self.engines.contains(&id)
    }

    pub fn shortfall(&self) -> Option<FlightError> {
        (!self.is_sufficient()).then(|| FlightError::TorqueInsufficient {
            required: self.required.norm(),
            achieved: self.accumulated.norm(),
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub struct StabilizationSelector {
    pub center_engine_id: u32,
}

impl StabilizationSelector {
    pub fn new(center_engine_id: u32) -> Self {
        Self { center_engine_id }
    }

    /// First-fit selection: walk engines in priority order, accumulate the
    /// torque of each active one, stop once the accumulated magnitude
    /// reaches the required magnitude. Not an optimal allocation.
    pub fn select<B: RigidBody + ?Sized>(
        &self,
        body: &B,
        engines: &[Engine],
        thrust_per_engine: f64,
    ) -> Selection {
        let required = required_torque(body);
        let required_mag = required.norm();
        let mut accumulated = Vector3::zeros();
        let mut selected = Vec::new();

        for i in evaluation_order(engines, self.center_engine_id) {
            let engine = &engines[i];
            if !engine.active {
                continue;
            }

            let torque = engine.torque(body, thrust_per_engine);
            accumulated += torque;
            selected.push(engine.id);
            debug!(
                target: "gimbal",
                "engine {} selected, torque {:.2?} |{:.2}|",
                engine.id,
                torque.as_slice(),
                torque.norm()
            );

            if accumulated.norm() >= required_mag {
                debug!(target: "gimbal", "total torque achieved: {:.2}", accumulated.norm());
                break;
            }
        }

        let selection = Selection { engines: selected, required, accumulated };
        if let Some(err) = selection.shortfall() {
            warn!(target: "torque", "{err}");
        }
        selection
    }
}
