//! The step loop
//!
//! One call to [`Engine::step`] runs, in order:
//! 1. force accumulation + integration (`integrator`)
//! 2. damping and orientation update
//! 3. octree rebuild over the current positions
//! 4. broad-phase query and narrow-phase tests per body
//! 5. pair contact resolution, then bounds contacts from the corrected positions
//! 6. linear / angular velocity clamps
//!
//! The system itself is owned by the caller and passed in each step; the
//! engine only keeps its settings, the force set, the octree and the RNG.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::math::quaternion;
use crate::simulation::collision::{self, BoundsContact, Contact, PairContact};
use crate::simulation::forces::ForceSet;
use crate::simulation::integrator::integrate;
use crate::simulation::metrics::{gravity_potential, kinetic_temperature, measure_energy, StepMetrics};
use crate::simulation::octree::{enclosing_bbox, Octree};
use crate::simulation::params::Parameters;
use crate::simulation::resolver::{self, Correction};
use crate::simulation::forces::constants::BOLTZMANN;
use crate::simulation::states::{Body, System};

pub struct Engine {
    pub parameters: Parameters,
    pub forces: ForceSet,
    pub correction: Correction,
    pub track_energy: bool, // potential energy is O(N^2) for pair laws
    octree: Octree,
    rng: StdRng,
    steps: u64,
}

impl Engine {
    pub fn new(parameters: Parameters, forces: ForceSet) -> Self {
        let octree = Octree::new(
            crate::math::NVec3::repeat(-1.0),
            crate::math::NVec3::repeat(1.0),
            parameters.octree_capacity,
            parameters.octree_max_depth,
        );
        let rng = StdRng::seed_from_u64(parameters.seed);
        Self {
            parameters,
            forces,
            correction: Correction::default(),
            track_energy: true,
            octree,
            rng,
            steps: 0,
        }
    }

    pub fn octree(&self) -> &Octree {
        &self.octree
    }

    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    /// Advance `sys` by one fixed step. Never fails.
    pub fn step(&mut self, sys: &mut System) -> StepMetrics {
        let started = Instant::now();

        integrate(sys, &self.forces, &self.parameters, &mut self.rng);
        self.apply_damping_and_spin(sys);

        let (collision_checks, contacts) = if self.parameters.collisions {
            let restitution = self.parameters.restitution;
            let (checks, pairs) = self.detect_pairs(sys);
            for contact in &pairs {
                resolver::resolve_pair(contact, &mut sys.bodies, restitution, &self.correction);
            }
            // pair corrections may have pushed bodies further into a wall
            let walls = self.bounds_contacts(&sys.bodies);
            for contact in &walls {
                resolver::resolve_bounds(contact, &mut sys.bodies, restitution);
            }
            (checks, pairs.len() + walls.len())
        } else {
            (0, 0)
        };

        self.clamp_velocities(sys);
        self.steps += 1;

        let mut metrics = StepMetrics {
            step: self.steps,
            time: sys.t,
            frame_time: self.parameters.dt,
            body_count: sys.bodies.len(),
            bond_count: sys.bonds.len(),
            collision_checks,
            contacts,
            ..Default::default()
        };

        if self.track_energy {
            let mut energy = measure_energy(sys, &self.forces, &self.parameters);
            energy.potential += gravity_potential(sys, &self.parameters.gravity);
            let free = sys.bodies.iter().filter(|b| !b.fixed).count();
            metrics.kinetic_energy = energy.kinetic;
            metrics.potential_energy = energy.potential;
            metrics.total_energy = energy.total();
            metrics.temperature = kinetic_temperature(energy.kinetic, free, BOLTZMANN);
        }
        metrics.compute_time_ms = started.elapsed().as_secs_f64() * 1000.0;

        log::trace!(
            "step {} t={:.4} checks={} contacts={} E={:.6}",
            metrics.step,
            metrics.time,
            metrics.collision_checks,
            metrics.contacts,
            metrics.total_energy
        );

        metrics
    }

    /// Run `steps` steps and return the metrics of the last one
    pub fn run(&mut self, sys: &mut System, steps: usize) -> Option<StepMetrics> {
        let mut last = None;
        for _ in 0..steps {
            last = Some(self.step(sys));
        }
        last
    }

    /// Rebuild the octree and collect all contacts for the current positions
    ///
    /// Returns the number of narrow-phase tests run and the contacts found,
    /// pair contacts first.
    pub fn detect_collisions(&mut self, sys: &System) -> (usize, Vec<Contact>) {
        let (checks, pairs) = self.detect_pairs(sys);
        let walls = self.bounds_contacts(&sys.bodies);
        let contacts = pairs
            .into_iter()
            .map(Contact::Pair)
            .chain(walls.into_iter().map(Contact::Bounds))
            .collect();
        (checks, contacts)
    }

    /// Broad phase through the octree, then the narrow phase on each candidate pair
    fn detect_pairs(&mut self, sys: &System) -> (usize, Vec<PairContact>) {
        let bodies = &sys.bodies;
        let mut contacts = Vec::new();
        if bodies.is_empty() {
            return (0, contacts);
        }

        let world = self.parameters.bounds.map(|b| (b.min, b.max));
        let (min, max) = enclosing_bbox(bodies.iter().map(|b| (&b.x, b.effective_radius())), world);
        self.octree.reset(min, max);
        for (i, b) in bodies.iter().enumerate() {
            self.octree.insert(i, b.x);
        }
        log::debug!(
            "octree rebuilt: {} bodies, {} nodes, depth {}",
            self.octree.len(),
            self.octree.node_count(),
            self.octree.max_depth_reached()
        );

        let max_radius = bodies.iter().map(|b| b.effective_radius()).fold(0.0, f64::max);

        let mut checks = 0;
        let mut candidates = Vec::new();
        for (i, bi) in bodies.iter().enumerate() {
            candidates.clear();
            // r_i + r_max: equals 2r when all radii match
            self.octree.query_into(&bi.x, bi.effective_radius() + max_radius, &mut candidates);
            for &j in &candidates {
                // each unordered pair once
                if j <= i {
                    continue;
                }
                let bj = &bodies[j];
                if bi.fixed && bj.fixed {
                    continue;
                }
                checks += 1;
                if let Some(c) = collision::test_pair(i, bi, j, bj) {
                    contacts.push(c);
                }
            }
        }

        (checks, contacts)
    }

    fn bounds_contacts(&self, bodies: &[Body]) -> Vec<BoundsContact> {
        let mut walls = Vec::new();
        if let Some(bounds) = &self.parameters.bounds {
            for (i, b) in bodies.iter().enumerate() {
                if !b.fixed {
                    collision::sphere_bounds(i, b, bounds, &mut walls);
                }
            }
        }
        walls
    }

    fn apply_damping_and_spin(&self, sys: &mut System) {
        let p = &self.parameters;
        let dt = p.dt;
        for b in sys.bodies.iter_mut() {
            if b.fixed {
                continue;
            }
            let linear = (1.0 - (p.damping + b.linear_damping) * dt).max(0.0);
            let angular = (1.0 - (p.angular_damping + b.angular_damping) * dt).max(0.0);
            b.v *= linear;
            b.w *= angular;
            if b.w.norm_squared() > 0.0 {
                b.q = quaternion::integrate(&b.q, &b.w, dt);
            }
        }
    }

    fn clamp_velocities(&self, sys: &mut System) {
        let max_v = self.parameters.max_velocity;
        let max_w = self.parameters.max_angular_velocity;
        for b in sys.bodies.iter_mut() {
            let speed = b.v.norm();
            if speed > max_v {
                b.v *= max_v / speed;
            }
            let spin = b.w.norm();
            if spin > max_w {
                b.w *= max_w / spin;
            }
        }
    }
}
