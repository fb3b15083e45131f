pub mod states;
pub mod params;
pub mod engine;
pub mod forces;
pub mod integrator;
pub mod collision;
pub mod octree;
pub mod resolver;
pub mod metrics;
pub mod scenario;
pub mod presets;
