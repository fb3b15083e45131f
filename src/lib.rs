pub mod math;
pub mod error;
pub mod simulation;
pub mod configuration;
pub mod benchmark;

pub use math::{NMat4, NQuat, NVec3};
pub use error::{SimError, SimResult};

pub use simulation::states::{Annotation, AnnotationKind, Body, BodyId, BodyKind, Bond, BondType, Shape, System};
pub use simulation::forces::{
    BrownianMotion, CustomField, Dihedral, Drag, Electrostatic, ForceContext, ForceField, ForceSet, Gravity,
    HydrogenBonding, Hydrophobic, LennardJones, MolecularSpring, Torsion,
};
pub use simulation::forces::constants::Element;
pub use simulation::collision::{Contact, WorldBounds};
pub use simulation::engine::Engine;
pub use simulation::metrics::StepMetrics;
pub use simulation::params::{MolecularParameters, Parameters};
pub use simulation::presets::PresetKind;
pub use simulation::scenario::Scenario;

pub use configuration::config::{IntegratorConfig, ScenarioConfig};

pub use benchmark::benchmark::{bench_broad_phase, bench_step_curve};
