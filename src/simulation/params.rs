//! Runtime parameters for the step loop
//!
//! `Parameters` holds everything the caller can change between steps:
//! - time step and end time,
//! - gravity, global damping, velocity clamps,
//! - collision switches, restitution and world bounds,
//! - integrator choice and random seed,
//! - optional molecular settings (temperature, dielectric, cutoff)

use crate::configuration::config::IntegratorConfig;
use crate::math::NVec3;
use crate::simulation::collision::WorldBounds;
use crate::simulation::octree::Octree;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MolecularParameters {
    pub temperature: f64, // K
    pub pressure: f64, // bar, reported only
    pub dielectric: f64, // relative permittivity
    pub cutoff: f64, // nm, non-bonded interaction range
}

impl Default for MolecularParameters {
    fn default() -> Self {
        Self {
            temperature: 300.0,
            pressure: 1.0,
            dielectric: 1.0,
            cutoff: 1.2,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Parameters {
    pub dt: f64, // fixed step size
    pub t_end: f64, // time end
    pub gravity: NVec3,
    pub damping: f64, // global linear damping, 1/s
    pub angular_damping: f64,
    pub collisions: bool,
    pub restitution: f64,
    pub bounds: Option<WorldBounds>,
    pub max_velocity: f64,
    pub max_angular_velocity: f64,
    pub min_distance: f64, // closest separation non-bonded forces look at
    pub integrator: IntegratorConfig,
    pub molecular: Option<MolecularParameters>,
    pub seed: u64, // deterministic seed
    pub octree_capacity: usize,
    pub octree_max_depth: usize,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            dt: 1.0 / 60.0,
            t_end: 10.0,
            gravity: NVec3::zeros(),
            damping: 0.0,
            angular_damping: 0.0,
            collisions: true,
            restitution: 0.5,
            bounds: None,
            max_velocity: 100.0,
            max_angular_velocity: 50.0,
            min_distance: 0.01,
            integrator: IntegratorConfig::Verlet,
            molecular: None,
            seed: 42,
            octree_capacity: Octree::DEFAULT_CAPACITY,
            octree_max_depth: Octree::DEFAULT_MAX_DEPTH,
        }
    }
}

impl Parameters {
    /// Number of whole steps needed to reach `t_end`
    pub fn step_count(&self) -> usize {
        if self.dt <= 0.0 {
            return 0;
        }
        (self.t_end / self.dt).ceil().max(0.0) as usize
    }
}
