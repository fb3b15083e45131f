//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scenario. A scenario consists of:
//!
//! - [`EngineConfig`]     – integrator, collision switches, octree tuning
//! - [`ParametersConfig`] – step size, gravity, damping, bounds, clamps, seed
//! - [`MolecularConfig`]  – temperature, dielectric and cutoff for MD runs
//! - [`ForceConfig`]      – one entry per active force generator
//! - [`BodyConfig`], [`BondConfig`], [`DihedralConfig`] – initial state
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! # YAML format
//! A small scenario matching these types:
//!
//! ```yaml
//! engine:
//!   integrator: "verlet"    # "euler", "verlet" or "rk4"
//!   collisions: true
//!   restitution: 0.8
//!
//! parameters:
//!   dt: 0.005
//!   t_end: 5.0
//!   gravity: [0.0, -9.81, 0.0]
//!   bounds:
//!     min: [-5.0, 0.0, -5.0]
//!     max: [ 5.0, 10.0, 5.0]
//!
//! forces:
//!   - type: spring
//!   - type: drag
//!     coefficient: 0.47
//!     fluid_density: 1.2
//!
//! bodies:
//!   - id: anchor
//!     x: [0.0, 5.0, 0.0]
//!     fixed: true
//!   - id: ball
//!     x: [0.0, 4.0, 0.0]
//!     m: 1.0
//!     radius: 0.2
//!
//! bonds:
//!   - a: anchor
//!     b: ball
//!     kind: single
//!     rest_length: 1.0
//!     stiffness: 50.0
//! ```
//!
//! Every section except `bodies` is optional. `preset: <name>` starts from a
//! built-in preset and appends whatever bodies, bonds and forces the file
//! lists. The scenario builder maps this into the runtime types.

use serde::Deserialize;

use crate::error::{SimError, SimResult};
use crate::simulation::states::{Annotation, BondType};

/// Which integrator method used by the engine
/// `integrator: "euler"`, `integrator: "verlet"` or `integrator: "rk4"`
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IntegratorConfig {
    #[serde(rename = "euler")] // Semi-implicit Euler. Cheapest, first order
    Euler,

    #[default]
    #[serde(rename = "verlet")] // Velocity Verlet integrator. Symplectic, long-term energy behavior, fixed step size
    Verlet,

    #[serde(rename = "rk4")] // Classical 4th-order Runge–Kutta integrator (RK4), higher local accuracy per step but not symplectic
    Rk4,
}

/// High-level engine configuration
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct EngineConfig {
    pub integrator: IntegratorConfig, // Time integrator used for advancing the system state
    pub collisions: Option<bool>, // broad + narrow phase on/off
    pub restitution: Option<f64>, // 0 = perfectly inelastic, 1 = elastic
    pub octree_capacity: Option<usize>, // bodies per leaf before it splits
    pub octree_max_depth: Option<usize>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BoundsConfig {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ParametersConfig {
    pub dt: Option<f64>, // time step size
    pub t_end: Option<f64>, // time end
    pub gravity: Option<Vec<f64>>,
    pub damping: Option<f64>,
    pub angular_damping: Option<f64>,
    pub bounds: Option<BoundsConfig>,
    pub max_velocity: Option<f64>,
    pub max_angular_velocity: Option<f64>,
    pub min_distance: Option<f64>, // prevent singular forces at very small separations
    pub seed: Option<u64>, // deterministic seed to make runs reproducable
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct MolecularConfig {
    pub temperature: Option<f64>, // K
    pub pressure: Option<f64>, // bar
    pub dielectric: Option<f64>,
    pub cutoff: Option<f64>, // nm
}

/// One force generator. Unset fields fall back to the generator defaults.
/// Temperature, dielectric, cutoff and minimum distance, when unset, are read
/// from the engine parameters on every step.
#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForceConfig {
    Gravity {
        g: Vec<f64>,
    },
    Spring,
    LennardJones {
        epsilon: Option<f64>,
        sigma: Option<f64>,
        min_distance: Option<f64>,
        cutoff: Option<f64>,
        use_element_params: Option<bool>,
        exclude_bonded: Option<bool>,
    },
    Electrostatic {
        dielectric: Option<f64>,
        min_distance: Option<f64>,
        cutoff: Option<f64>,
    },
    HydrogenBond {
        strength: Option<f64>,
        ideal_distance: Option<f64>,
        width: Option<f64>,
        min_distance: Option<f64>,
        max_distance: Option<f64>,
    },
    Hydrophobic {
        strength: Option<f64>,
        min_distance: Option<f64>,
        cutoff: Option<f64>,
    },
    Torsion, // uses the scenario's `dihedrals`
    Brownian {
        temperature: Option<f64>,
        scale: Option<f64>,
    },
    Drag {
        coefficient: Option<f64>,
        fluid_density: Option<f64>,
        min_speed: Option<f64>,
    },
}

#[derive(Deserialize, Debug, Clone)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeConfig {
    Sphere,
    Capsule { height: f64 },
    Box { half_extents: Vec<f64> },
}

/// Configuration for a single body’s initial state
#[derive(Deserialize, Debug, Clone)]
pub struct BodyConfig {
    pub id: String,
    pub x: Vec<f64>, // Initial position
    #[serde(default)]
    pub v: Option<Vec<f64>>, // Initial velocity, zero when absent
    #[serde(default)]
    pub w: Option<Vec<f64>>, // Initial angular velocity
    #[serde(default)]
    pub m: Option<f64>, // Mass; atoms default to their element mass
    #[serde(default)]
    pub radius: Option<f64>, // Collision radius
    #[serde(default)]
    pub fixed: bool,
    #[serde(default)]
    pub linear_damping: f64,
    #[serde(default)]
    pub angular_damping: f64,
    #[serde(default)]
    pub charge: Option<f64>,
    #[serde(default)]
    pub shape: Option<ShapeConfig>,
    #[serde(default)]
    pub element: Option<String>, // makes the body an atom
    #[serde(default)]
    pub hybridization: Option<String>,
    #[serde(default)]
    pub component: Option<String>, // makes the body an organelle / cell component
    #[serde(default)]
    pub hydrophobicity: Option<f64>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct BondConfig {
    pub a: String,
    pub b: String,
    #[serde(default = "default_bond_kind")]
    pub kind: BondType,
    pub rest_length: f64,
    pub stiffness: f64,
    #[serde(default)]
    pub order: Option<f64>,
}

fn default_bond_kind() -> BondType {
    BondType::Single
}

#[derive(Deserialize, Debug, Clone)]
pub struct DihedralConfig {
    pub ids: [String; 4],
    pub target_degrees: f64,
    pub stiffness: f64,
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct ScenarioConfig {
    pub preset: Option<String>, // built-in starting point
    pub engine: EngineConfig,
    pub parameters: ParametersConfig,
    pub molecular: Option<MolecularConfig>,
    pub forces: Vec<ForceConfig>,
    pub bodies: Vec<BodyConfig>,
    pub bonds: Vec<BondConfig>,
    pub dihedrals: Vec<DihedralConfig>,
}

impl ScenarioConfig {
    pub fn from_yaml(text: &str) -> SimResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }
}

/// Check a YAML list is a 3-vector and return it as an array
pub fn vec3(field: &str, values: &[f64]) -> SimResult<[f64; 3]> {
    match values {
        [x, y, z] => Ok([*x, *y, *z]),
        _ => Err(SimError::BadVector {
            field: field.to_string(),
            expected: 3,
            got: values.len(),
        }),
    }
}
