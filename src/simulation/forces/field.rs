//! Single-body force laws: uniform gravity, quadratic drag, Brownian
//! kicks and caller-supplied fields

use std::f64::consts::PI;

use rand::rngs::StdRng;

use super::constants::{AIR_DENSITY, BOLTZMANN};
use super::{ForceContext, ForceField};
use crate::math::{vector, NVec3};

/// Uniform acceleration field, `F = m g`
pub struct Gravity {
    pub g: NVec3,
}

impl ForceField for Gravity {
    fn name(&self) -> &str {
        "gravity"
    }

    fn force(&self, i: usize, ctx: &ForceContext<'_>, _rng: &mut StdRng) -> NVec3 {
        self.g * ctx.bodies[i].m
    }

    /// U = -m g . x, summed over free bodies
    fn potential_energy(&self, ctx: &ForceContext<'_>) -> f64 {
        ctx.bodies
            .iter()
            .filter(|b| !b.fixed)
            .map(|b| -b.m * self.g.dot(&b.x))
            .sum()
    }
}

/// Quadratic drag `F = -1/2 rho C_d A |v|^2 v_hat` with `A = pi r^2`
///
/// The magnitude is capped at `m |v| / dt`, so within one step drag can at
/// most bring a body to rest and never reverses its motion.
pub struct Drag {
    pub coefficient: f64, // C_d
    pub fluid_density: f64, // rho
    pub min_speed: f64, // below this no drag, avoids jitter at rest
}

impl Default for Drag {
    fn default() -> Self {
        Self {
            coefficient: 0.47, // sphere
            fluid_density: AIR_DENSITY,
            min_speed: 1e-3,
        }
    }
}

impl ForceField for Drag {
    fn name(&self) -> &str {
        "drag"
    }

    fn force(&self, i: usize, ctx: &ForceContext<'_>, _rng: &mut StdRng) -> NVec3 {
        let b = &ctx.bodies[i];
        let speed = b.v.norm();
        if speed < self.min_speed {
            return NVec3::zeros();
        }
        let area = PI * b.radius * b.radius;
        let mut magnitude = 0.5 * self.fluid_density * self.coefficient * area * speed * speed;
        let dt = ctx.params.dt;
        if dt > 0.0 {
            magnitude = magnitude.min(b.m * speed / dt);
        }
        -(b.v / speed) * magnitude
    }
}

/// Isotropic thermal kicks, magnitude `sqrt(2 k_B T scale / m)`
///
/// Hotter systems jitter more, heavier bodies less. At `T = 0` the force is
/// exactly zero. Without a fixed `temperature` the kicks follow the
/// temperature in the step's molecular parameters.
pub struct BrownianMotion {
    pub temperature: Option<f64>, // K
    pub scale: f64,
    pub boltzmann: f64,
}

impl Default for BrownianMotion {
    fn default() -> Self {
        Self {
            temperature: None,
            scale: 1.0,
            boltzmann: BOLTZMANN,
        }
    }
}

impl BrownianMotion {
    /// Kicks at a fixed temperature, ignoring the step parameters
    pub fn new(temperature: f64) -> Self {
        Self {
            temperature: Some(temperature),
            ..Self::default()
        }
    }

    pub fn magnitude_for(&self, temperature: f64, mass: f64) -> f64 {
        if temperature <= 0.0 || mass <= 0.0 {
            return 0.0;
        }
        (2.0 * self.boltzmann * temperature * self.scale / mass).sqrt()
    }
}

impl ForceField for BrownianMotion {
    fn name(&self) -> &str {
        "brownian"
    }

    fn force(&self, i: usize, ctx: &ForceContext<'_>, rng: &mut StdRng) -> NVec3 {
        let temperature = self.temperature.unwrap_or_else(|| ctx.temperature());
        let magnitude = self.magnitude_for(temperature, ctx.bodies[i].m);
        if magnitude == 0.0 {
            return NVec3::zeros();
        }
        vector::random_unit_vector(rng) * magnitude
    }
}

/// Arbitrary external field, a function of position only
pub struct CustomField {
    name: String,
    field: Box<dyn Fn(&NVec3) -> NVec3 + Send + Sync>,
}

impl CustomField {
    pub fn new(name: impl Into<String>, field: impl Fn(&NVec3) -> NVec3 + Send + Sync + 'static) -> Self {
        Self {
            name: name.into(),
            field: Box::new(field),
        }
    }
}

impl ForceField for CustomField {
    fn name(&self) -> &str {
        &self.name
    }

    fn force(&self, i: usize, ctx: &ForceContext<'_>, _rng: &mut StdRng) -> NVec3 {
        (self.field)(&ctx.bodies[i].x)
    }
}
