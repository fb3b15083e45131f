//! Per-step diagnostics for telemetry overlays

use serde::Serialize;

use crate::math::NVec3;
use crate::simulation::forces::constants::BOLTZMANN;
use crate::simulation::forces::ForceSet;
use crate::simulation::params::Parameters;
use crate::simulation::states::System;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepMetrics {
    pub step: u64,
    pub time: f64, // simulation time after the step
    pub frame_time: f64, // dt
    pub body_count: usize,
    pub bond_count: usize,
    pub collision_checks: usize, // narrow-phase tests run
    pub contacts: usize,
    pub kinetic_energy: f64,
    pub potential_energy: f64,
    pub total_energy: f64,
    pub temperature: f64, // K, from equipartition
    pub compute_time_ms: f64, // wall clock
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Energy {
    pub kinetic: f64,
    pub potential: f64,
}

impl Energy {
    pub fn total(&self) -> f64 {
        self.kinetic + self.potential
    }
}

/// Kinetic energy of the system plus potential energy of every force term
pub fn measure_energy(sys: &System, forces: &ForceSet, params: &Parameters) -> Energy {
    Energy {
        kinetic: sys.kinetic_energy(),
        potential: forces.potential_energy(sys, params),
    }
}

/// Potential of the uniform parameter gravity, `-m g . x` over free bodies
pub fn gravity_potential(sys: &System, g: &NVec3) -> f64 {
    sys.bodies.iter().filter(|b| !b.fixed).map(|b| -b.m * g.dot(&b.x)).sum()
}

/// Equipartition temperature `T = 2 KE / (3 N k_B)` over `n` free bodies
pub fn kinetic_temperature(kinetic_energy: f64, n: usize, boltzmann: f64) -> f64 {
    if n == 0 || boltzmann <= 0.0 {
        return 0.0;
    }
    2.0 * kinetic_energy / (3.0 * n as f64 * boltzmann)
}

pub fn system_temperature(sys: &System) -> f64 {
    let free = sys.bodies.iter().filter(|b| !b.fixed).count();
    kinetic_temperature(sys.kinetic_energy(), free, BOLTZMANN)
}
