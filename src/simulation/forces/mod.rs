//! Force contributors for the simulation
//!
//! Every generator implements [`ForceField`] and is registered in a
//! [`ForceSet`]. Each step the set builds one read-only [`ForceContext`]
//! over the system, asks every generator for its contribution to every
//! non-fixed body, and sums them into a separate output buffer so no body
//! sees another body's mid-step state.
//!
//! The context also carries the step's [`Parameters`]. Generators whose
//! temperature, dielectric, cutoff or minimum distance is left unset read
//! those values from it on every evaluation, so a caller may change them
//! between steps.
//!
//! - `field`     gravity, drag, Brownian motion, custom fields
//! - `molecular` bonds, Lennard-Jones, Coulomb, hydrogen bonds, hydrophobic, torsion
//! - `constants` element table and physical constants

pub mod constants;
pub mod field;
pub mod molecular;

use std::collections::HashMap;

use rand::rngs::StdRng;

use crate::math::NVec3;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, Bond, System};

pub use field::{BrownianMotion, CustomField, Drag, Gravity};
pub use molecular::{
    Dihedral, Electrostatic, HydrogenBonding, Hydrophobic, LennardJones, MolecularSpring, Torsion,
};

/// Immutable snapshot of the system handed to generators
///
/// Bond endpoints are resolved to indices once per evaluation; bonds with a
/// missing endpoint are dropped here and never reach a generator.
pub struct ForceContext<'a> {
    pub t: f64,
    pub params: &'a Parameters,
    pub bodies: &'a [Body],
    pub bonds: &'a [Bond],
    lookup: HashMap<&'a str, usize>,
    resolved: Vec<(usize, usize, usize)>, // (bond index, a, b)
    bonds_of: Vec<Vec<usize>>, // body -> positions in `resolved`
}

impl<'a> ForceContext<'a> {
    pub fn new(sys: &'a System, params: &'a Parameters) -> Self {
        let lookup = sys.id_lookup();
        let mut resolved = Vec::with_capacity(sys.bonds.len());
        let mut bonds_of = vec![Vec::new(); sys.bodies.len()];

        for (k, bond) in sys.bonds.iter().enumerate() {
            let (Some(&a), Some(&b)) = (lookup.get(bond.a.as_str()), lookup.get(bond.b.as_str())) else {
                continue;
            };
            bonds_of[a].push(resolved.len());
            bonds_of[b].push(resolved.len());
            resolved.push((k, a, b));
        }

        Self {
            t: sys.t,
            params,
            bodies: &sys.bodies,
            bonds: &sys.bonds,
            lookup,
            resolved,
            bonds_of,
        }
    }

    /// Temperature of the current step, falling back to the molecular defaults
    pub fn temperature(&self) -> f64 {
        self.params.molecular.unwrap_or_default().temperature
    }

    pub fn dielectric(&self) -> f64 {
        self.params.molecular.unwrap_or_default().dielectric
    }

    /// Non-bonded cutoff from the molecular settings, if any were given
    pub fn cutoff(&self) -> Option<f64> {
        self.params.molecular.map(|m| m.cutoff)
    }

    pub fn min_distance(&self) -> f64 {
        self.params.min_distance
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.lookup.get(id).copied()
    }

    /// Bonds touching body `i` as `(bond, other endpoint index)`
    pub fn bonds_of(&self, i: usize) -> impl Iterator<Item = (&'a Bond, usize)> + '_ {
        let bonds: &'a [Bond] = self.bonds;
        self.bonds_of[i].iter().map(move |&r| {
            let (k, a, b) = self.resolved[r];
            let other = if a == i { b } else { a };
            (&bonds[k], other)
        })
    }

    /// Every bond with both endpoints present, as `(bond, a, b)`
    pub fn resolved_bonds(&self) -> impl Iterator<Item = (&'a Bond, usize, usize)> + '_ {
        let bonds: &'a [Bond] = self.bonds;
        self.resolved.iter().map(move |&(k, a, b)| (&bonds[k], a, b))
    }

    /// Covalently bonded neighbours of body `i`
    pub fn covalent_neighbors(&self, i: usize) -> impl Iterator<Item = usize> + '_ {
        self.bonds_of(i)
            .filter(|(bond, _)| bond.kind.is_covalent())
            .map(|(_, other)| other)
    }
}

/// A single force law
///
/// Implementations return the force (not acceleration) on body `i`. The
/// owning [`ForceSet`] never calls `force` for fixed bodies.
pub trait ForceField {
    fn name(&self) -> &str;

    fn force(&self, i: usize, ctx: &ForceContext<'_>, rng: &mut StdRng) -> NVec3;

    /// Potential energy of the whole system under this law (0 if not conservative)
    fn potential_energy(&self, _ctx: &ForceContext<'_>) -> f64 {
        0.0
    }
}

/// Collection of force terms
/// Contributions of every term are summed into one force vector per body
pub struct ForceSet {
    terms: Vec<Box<dyn ForceField + Send + Sync>>,
}

impl Default for ForceSet {
    fn default() -> Self {
        Self::new()
    }
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        Self { terms: Vec::new() }
    }

    /// Add a force term
    pub fn with(mut self, term: impl ForceField + Send + Sync + 'static) -> Self {
        self.terms.push(Box::new(term));
        self
    }

    pub fn push(&mut self, term: impl ForceField + Send + Sync + 'static) {
        self.terms.push(Box::new(term));
    }

    /// Remove every term with the given name; returns how many were removed
    pub fn remove(&mut self, name: &str) -> usize {
        let before = self.terms.len();
        self.terms.retain(|t| t.name() != name);
        before - self.terms.len()
    }

    pub fn names(&self) -> Vec<&str> {
        self.terms.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Compute total forces for all bodies in `sys`
    /// - `out[i]` is overwritten with the sum over all terms
    /// - fixed bodies always get zero
    pub fn accumulate_forces(&self, sys: &System, params: &Parameters, rng: &mut StdRng, out: &mut [NVec3]) {
        for f in out.iter_mut() {
            *f = NVec3::zeros();
        }
        if self.terms.is_empty() {
            return;
        }

        let ctx = ForceContext::new(sys, params);
        for (i, body) in sys.bodies.iter().enumerate() {
            if body.fixed {
                continue;
            }
            for term in &self.terms {
                out[i] += term.force(i, &ctx, rng);
            }
        }
    }

    /// Force divided by mass; zero for fixed bodies
    pub fn accumulate_accels(&self, sys: &System, params: &Parameters, rng: &mut StdRng, out: &mut [NVec3]) {
        self.accumulate_forces(sys, params, rng, out);
        for (a, body) in out.iter_mut().zip(sys.bodies.iter()) {
            *a *= body.inv_mass();
        }
    }

    /// Sum of the potential energies of all terms
    pub fn potential_energy(&self, sys: &System, params: &Parameters) -> f64 {
        if self.terms.is_empty() {
            return 0.0;
        }
        let ctx = ForceContext::new(sys, params);
        self.terms.iter().map(|t| t.potential_energy(&ctx)).sum()
    }
}
