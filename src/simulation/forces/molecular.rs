//! Interatomic force laws
//!
//! All pairwise laws here loop over every other body, so a full evaluation
//! is O(N^2). Each one has a distance window; pairs outside it are skipped
//! both for speed and to keep the `1/r^n` terms away from their singularity.

use std::f64::consts::{PI, TAU};

use rand::rngs::StdRng;

use super::constants::{mixed_lj, COULOMB};
use super::{ForceContext, ForceField};
use crate::math::NVec3;
use crate::simulation::states::{Body, BodyId};

/// Bonds shorter than this have no usable direction and are skipped.
const MIN_BOND_LENGTH: f64 = 1e-6;

/// Lennard-Jones range when neither the term nor the step parameters set one
const LJ_DEFAULT_CUTOFF: f64 = 2.5;

// =========================================================================================
// Bonds
// =========================================================================================

/// Hookean spring along every bond touching the body
///
/// F = -k (d - rest) along the bond axis, `k = stiffness * order`.
/// Bonds whose other endpoint is gone contribute nothing.
#[derive(Default)]
pub struct MolecularSpring;

impl ForceField for MolecularSpring {
    fn name(&self) -> &str {
        "spring"
    }

    fn force(&self, i: usize, ctx: &ForceContext<'_>, _rng: &mut StdRng) -> NVec3 {
        let xi = ctx.bodies[i].x;
        let mut f = NVec3::zeros();
        for (bond, other) in ctx.bonds_of(i) {
            let d = ctx.bodies[other].x - xi; // toward the partner
            let len = d.norm();
            if len < MIN_BOND_LENGTH {
                continue;
            }
            // stretched -> pulled toward partner, compressed -> pushed away
            f += d * (bond.spring_constant() * (len - bond.rest_length) / len);
        }
        f
    }

    fn potential_energy(&self, ctx: &ForceContext<'_>) -> f64 {
        ctx.resolved_bonds()
            .map(|(bond, a, b)| {
                let stretch = (ctx.bodies[b].x - ctx.bodies[a].x).norm() - bond.rest_length;
                0.5 * bond.spring_constant() * stretch * stretch
            })
            .sum()
    }
}

// =========================================================================================
// Van der Waals
// =========================================================================================

/// Lennard-Jones 12-6 interaction
///
/// F(r) = 24 eps / r [2 (sigma/r)^12 - (sigma/r)^6], positive = repulsive.
/// Atom pairs use mixed element parameters when `use_element_params` is set,
/// everything else the global `epsilon` / `sigma`. An unset `min_distance`
/// or `cutoff` is read from the step parameters.
pub struct LennardJones {
    pub epsilon: f64,
    pub sigma: f64,
    pub min_distance: Option<f64>,
    pub cutoff: Option<f64>,
    pub use_element_params: bool,
    pub exclude_bonded: bool, // skip directly bonded pairs
}

impl Default for LennardJones {
    fn default() -> Self {
        Self {
            epsilon: 1.0,
            sigma: 1.0,
            min_distance: None,
            cutoff: None,
            use_element_params: false,
            exclude_bonded: true,
        }
    }
}

impl LennardJones {
    fn params(&self, a: &Body, b: &Body) -> (f64, f64) {
        if self.use_element_params {
            if let (Some(ea), Some(eb)) = (a.element(), b.element()) {
                return mixed_lj(ea, eb);
            }
        }
        (self.epsilon, self.sigma)
    }

    /// `[min_distance, cutoff]` for this evaluation
    fn window(&self, ctx: &ForceContext<'_>) -> (f64, f64) {
        let lo = self.min_distance.unwrap_or_else(|| ctx.min_distance());
        let hi = self.cutoff.or_else(|| ctx.cutoff()).unwrap_or(LJ_DEFAULT_CUTOFF);
        (lo, hi)
    }

    fn excluded(&self, ctx: &ForceContext<'_>, i: usize, j: usize) -> bool {
        self.exclude_bonded && ctx.bonds_of(i).any(|(_, other)| other == j)
    }

    /// Scalar force magnitude at separation `r` (positive pushes apart)
    pub fn magnitude(epsilon: f64, sigma: f64, r: f64) -> f64 {
        let sr6 = (sigma / r).powi(6);
        24.0 * epsilon / r * (2.0 * sr6 * sr6 - sr6)
    }

    pub fn potential(epsilon: f64, sigma: f64, r: f64) -> f64 {
        let sr6 = (sigma / r).powi(6);
        4.0 * epsilon * (sr6 * sr6 - sr6)
    }
}

impl ForceField for LennardJones {
    fn name(&self) -> &str {
        "lennard_jones"
    }

    fn force(&self, i: usize, ctx: &ForceContext<'_>, _rng: &mut StdRng) -> NVec3 {
        let bi = &ctx.bodies[i];
        let (lo, hi) = self.window(ctx);
        let mut f = NVec3::zeros();
        for (j, bj) in ctx.bodies.iter().enumerate() {
            if j == i {
                continue;
            }
            let d = bj.x - bi.x;
            let r = d.norm();
            if r < lo || r > hi || self.excluded(ctx, i, j) {
                continue;
            }
            let (eps, sigma) = self.params(bi, bj);
            // repulsion acts along -d (away from j)
            f -= d * (Self::magnitude(eps, sigma, r) / r);
        }
        f
    }

    fn potential_energy(&self, ctx: &ForceContext<'_>) -> f64 {
        let (lo, hi) = self.window(ctx);
        let n = ctx.bodies.len();
        let mut u = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let (bi, bj) = (&ctx.bodies[i], &ctx.bodies[j]);
                let r = (bj.x - bi.x).norm();
                if r < lo || r > hi || self.excluded(ctx, i, j) {
                    continue;
                }
                let (eps, sigma) = self.params(bi, bj);
                u += Self::potential(eps, sigma, r);
            }
        }
        u
    }
}

// =========================================================================================
// Electrostatics
// =========================================================================================

/// Coulomb interaction screened by a relative dielectric constant
///
/// F = k q1 q2 / (eps_r r^2), like charges repel. Unset fields come from
/// the step parameters; with no cutoff anywhere the range is unlimited.
pub struct Electrostatic {
    pub coulomb_constant: f64,
    pub dielectric: Option<f64>,
    pub min_distance: Option<f64>,
    pub cutoff: Option<f64>,
}

impl Default for Electrostatic {
    fn default() -> Self {
        Self {
            coulomb_constant: COULOMB,
            dielectric: None,
            min_distance: None,
            cutoff: None,
        }
    }
}

impl Electrostatic {
    fn charges(a: &Body, b: &Body) -> Option<(f64, f64)> {
        match (a.charge, b.charge) {
            (Some(qa), Some(qb)) if qa != 0.0 && qb != 0.0 => Some((qa, qb)),
            _ => None,
        }
    }

    fn in_window(&self, ctx: &ForceContext<'_>, r: f64) -> bool {
        let lo = self.min_distance.unwrap_or_else(|| ctx.min_distance());
        r >= lo && self.cutoff.or_else(|| ctx.cutoff()).map_or(true, |c| r <= c)
    }

    fn k_eff(&self, ctx: &ForceContext<'_>) -> f64 {
        let dielectric = self.dielectric.unwrap_or_else(|| ctx.dielectric());
        self.coulomb_constant / dielectric.max(f64::MIN_POSITIVE)
    }
}

impl ForceField for Electrostatic {
    fn name(&self) -> &str {
        "electrostatic"
    }

    fn force(&self, i: usize, ctx: &ForceContext<'_>, _rng: &mut StdRng) -> NVec3 {
        let bi = &ctx.bodies[i];
        if bi.charge.map_or(true, |q| q == 0.0) {
            return NVec3::zeros();
        }
        let k = self.k_eff(ctx);
        let mut f = NVec3::zeros();
        for (j, bj) in ctx.bodies.iter().enumerate() {
            if j == i {
                continue;
            }
            let Some((qi, qj)) = Self::charges(bi, bj) else {
                continue;
            };
            let d = bi.x - bj.x; // from j to i
            let r = d.norm();
            if !self.in_window(ctx, r) {
                continue;
            }
            f += d * (k * qi * qj / (r * r * r));
        }
        f
    }

    fn potential_energy(&self, ctx: &ForceContext<'_>) -> f64 {
        let k = self.k_eff(ctx);
        let n = ctx.bodies.len();
        let mut u = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                let (bi, bj) = (&ctx.bodies[i], &ctx.bodies[j]);
                let Some((qi, qj)) = Self::charges(bi, bj) else {
                    continue;
                };
                let r = (bj.x - bi.x).norm();
                if self.in_window(ctx, r) {
                    u += k * qi * qj / r;
                }
            }
        }
        u
    }
}

// =========================================================================================
// Hydrogen bonds
// =========================================================================================

/// Directional donor-acceptor attraction
///
/// A donor is a hydrogen covalently bonded to exactly one heavy atom; an
/// acceptor is any N, O or F atom. Inside `[min_distance, max_distance]` the
/// hydrogen is pulled toward the ideal distance with
/// `k (r - r0) exp(-(r - r0)^2 / 2w^2)`, scaled by how well the
/// heavy->H and H->acceptor directions line up. The acceptor gets the
/// opposite force.
pub struct HydrogenBonding {
    pub strength: f64,
    pub ideal_distance: f64,
    pub width: f64,
    pub min_distance: f64,
    pub max_distance: f64,
}

impl Default for HydrogenBonding {
    fn default() -> Self {
        Self {
            strength: 20.0,
            ideal_distance: 0.19,
            width: 0.05,
            min_distance: 0.12,
            max_distance: 0.35,
        }
    }
}

impl HydrogenBonding {
    /// Heavy atom the hydrogen `i` donates from, if `i` is a donor
    fn donor_heavy(ctx: &ForceContext<'_>, i: usize) -> Option<usize> {
        if ctx.bodies[i].element()?.is_heavy() {
            return None;
        }
        let mut heavy = ctx
            .covalent_neighbors(i)
            .filter(|&n| ctx.bodies[n].element().map_or(false, |e| e.is_heavy()));
        let first = heavy.next()?;
        if heavy.next().is_some() {
            return None;
        }
        Some(first)
    }

    fn is_acceptor(body: &Body) -> bool {
        body.element().map_or(false, |e| e.is_hbond_acceptor())
    }

    /// Force on hydrogen `h` (bonded to `heavy`) from acceptor `acc`
    fn pair_force(&self, ctx: &ForceContext<'_>, h: usize, heavy: usize, acc: usize) -> NVec3 {
        let xh = ctx.bodies[h].x;
        let d = ctx.bodies[acc].x - xh;
        let r = d.norm();
        if r < self.min_distance || r > self.max_distance {
            return NVec3::zeros();
        }
        let donor_axis = xh - ctx.bodies[heavy].x;
        let axis_len = donor_axis.norm();
        if axis_len < MIN_BOND_LENGTH {
            return NVec3::zeros();
        }
        let alignment = (donor_axis.dot(&d) / (axis_len * r)).clamp(0.0, 1.0);
        let delta = r - self.ideal_distance;
        let decay = (-(delta * delta) / (2.0 * self.width * self.width)).exp();
        d * (self.strength * delta * decay * alignment / r)
    }
}

impl ForceField for HydrogenBonding {
    fn name(&self) -> &str {
        "hydrogen_bond"
    }

    fn force(&self, i: usize, ctx: &ForceContext<'_>, _rng: &mut StdRng) -> NVec3 {
        let mut f = NVec3::zeros();

        if let Some(heavy) = Self::donor_heavy(ctx, i) {
            for (j, bj) in ctx.bodies.iter().enumerate() {
                if j != heavy && j != i && Self::is_acceptor(bj) {
                    f += self.pair_force(ctx, i, heavy, j);
                }
            }
        }

        if Self::is_acceptor(&ctx.bodies[i]) {
            for h in 0..ctx.bodies.len() {
                if h == i {
                    continue;
                }
                if let Some(heavy) = Self::donor_heavy(ctx, h) {
                    if heavy != i {
                        f -= self.pair_force(ctx, h, heavy, i);
                    }
                }
            }
        }

        f
    }
}

// =========================================================================================
// Hydrophobic effect
// =========================================================================================

/// Like-attracts-like interaction between bodies with a hydrophobicity score
///
/// |F| = strength |h_i h_j| / r^2; attractive when `h_i h_j > 0`
/// (both hydrophobic or both hydrophilic), repulsive otherwise.
pub struct Hydrophobic {
    pub strength: f64,
    pub min_distance: f64,
    pub cutoff: f64,
}

impl Default for Hydrophobic {
    fn default() -> Self {
        Self {
            strength: 1.0,
            min_distance: 0.05,
            cutoff: 5.0,
        }
    }
}

impl ForceField for Hydrophobic {
    fn name(&self) -> &str {
        "hydrophobic"
    }

    fn force(&self, i: usize, ctx: &ForceContext<'_>, _rng: &mut StdRng) -> NVec3 {
        let bi = &ctx.bodies[i];
        let Some(hi) = bi.hydrophobicity() else {
            return NVec3::zeros();
        };
        let mut f = NVec3::zeros();
        for (j, bj) in ctx.bodies.iter().enumerate() {
            if j == i {
                continue;
            }
            let Some(hj) = bj.hydrophobicity() else {
                continue;
            };
            let d = bj.x - bi.x; // toward j
            let r = d.norm();
            if r < self.min_distance || r > self.cutoff {
                continue;
            }
            // signed: positive product pulls toward j
            let magnitude = self.strength * hi * hj / (r * r);
            f += d * (magnitude / r);
        }
        f
    }
}

// =========================================================================================
// Torsion
// =========================================================================================

/// Four sequentially bonded bodies and the dihedral angle they should keep
#[derive(Debug, Clone)]
pub struct Dihedral {
    pub ids: [BodyId; 4],
    pub target: f64, // radians
    pub stiffness: f64,
}

/// Signed dihedral angle of `p0-p1-p2-p3` in `(-pi, pi]`
///
/// Returns `None` when three consecutive points are collinear and the
/// angle is undefined.
pub fn dihedral_angle(p0: &NVec3, p1: &NVec3, p2: &NVec3, p3: &NVec3) -> Option<f64> {
    dihedral_frame(p0, p1, p2, p3).map(|frame| frame.phi)
}

struct DihedralFrame {
    phi: f64,
    n1: NVec3,
    n2: NVec3,
    b2_len: f64,
}

fn dihedral_frame(p0: &NVec3, p1: &NVec3, p2: &NVec3, p3: &NVec3) -> Option<DihedralFrame> {
    let b1 = p1 - p0;
    let b2 = p2 - p1;
    let b3 = p3 - p2;
    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    let b2_len = b2.norm();
    if n1.norm_squared() < 1e-12 || n2.norm_squared() < 1e-12 || b2_len < MIN_BOND_LENGTH {
        return None;
    }
    let phi = (b2_len * b1.dot(&n2)).atan2(n1.dot(&n2));
    Some(DihedralFrame { phi, n1, n2, b2_len })
}

fn wrap_angle(a: f64) -> f64 {
    let mut a = a % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Harmonic dihedral restraint `U = 1/2 k (phi - phi0)^2`
///
/// The restoring torque is expressed as forces on the two terminal atoms
/// only: `F0 = k dphi |b2| / |n1|^2 n1` and `F3 = -k dphi |b2| / |n2|^2 n2`.
#[derive(Default)]
pub struct Torsion {
    pub dihedrals: Vec<Dihedral>,
}

impl Torsion {
    pub fn new(dihedrals: Vec<Dihedral>) -> Self {
        Self { dihedrals }
    }

    fn resolve(ctx: &ForceContext<'_>, d: &Dihedral) -> Option<[usize; 4]> {
        Some([
            ctx.index_of(d.ids[0].as_str())?,
            ctx.index_of(d.ids[1].as_str())?,
            ctx.index_of(d.ids[2].as_str())?,
            ctx.index_of(d.ids[3].as_str())?,
        ])
    }
}

impl ForceField for Torsion {
    fn name(&self) -> &str {
        "torsion"
    }

    fn force(&self, i: usize, ctx: &ForceContext<'_>, _rng: &mut StdRng) -> NVec3 {
        let mut f = NVec3::zeros();
        for dihedral in &self.dihedrals {
            let Some(idx) = Self::resolve(ctx, dihedral) else {
                continue;
            };
            if i != idx[0] && i != idx[3] {
                continue;
            }
            let p = idx.map(|k| ctx.bodies[k].x);
            let Some(frame) = dihedral_frame(&p[0], &p[1], &p[2], &p[3]) else {
                continue;
            };
            let torque = dihedral.stiffness * wrap_angle(frame.phi - dihedral.target);
            if i == idx[0] {
                f += frame.n1 * (torque * frame.b2_len / frame.n1.norm_squared());
            } else {
                f -= frame.n2 * (torque * frame.b2_len / frame.n2.norm_squared());
            }
        }
        f
    }

    fn potential_energy(&self, ctx: &ForceContext<'_>) -> f64 {
        self.dihedrals
            .iter()
            .filter_map(|d| {
                let idx = Self::resolve(ctx, d)?;
                let p = idx.map(|k| ctx.bodies[k].x);
                let phi = dihedral_angle(&p[0], &p[1], &p[2], &p[3])?;
                let delta = wrap_angle(phi - d.target);
                Some(0.5 * d.stiffness * delta * delta)
            })
            .sum()
    }
}
