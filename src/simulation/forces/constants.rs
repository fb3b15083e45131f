//! Read-only physical data used by the force generators
//!
//! Units follow the usual molecular-dynamics convention:
//! length nm, time ps, mass u (g/mol), energy kJ/mol, charge e.

use std::fmt;
use std::str::FromStr;

use crate::error::SimError;

/// Boltzmann constant in kJ/(mol K)
pub const BOLTZMANN: f64 = 0.008_314_462_618;

/// Coulomb constant 1/(4 pi eps0) in kJ nm / (mol e^2)
pub const COULOMB: f64 = 138.935_458;

/// Standard gravity in m/s^2, for macroscopic presets
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Density of air at sea level in kg/m^3, the default drag medium
pub const AIR_DENSITY: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Element {
    H,
    C,
    N,
    O,
    F,
    P,
    S,
    Na,
    Cl,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementProps {
    pub symbol: &'static str,
    pub mass: f64, // u
    pub vdw_radius: f64, // nm
    pub electronegativity: f64, // Pauling
    pub lj_epsilon: f64, // kJ/mol
    pub lj_sigma: f64, // nm
}

// Indexed by `Element as usize`
static ELEMENTS: [ElementProps; 9] = [
    ElementProps { symbol: "H", mass: 1.008, vdw_radius: 0.120, electronegativity: 2.20, lj_epsilon: 0.125, lj_sigma: 0.250 },
    ElementProps { symbol: "C", mass: 12.011, vdw_radius: 0.170, electronegativity: 2.55, lj_epsilon: 0.276, lj_sigma: 0.350 },
    ElementProps { symbol: "N", mass: 14.007, vdw_radius: 0.155, electronegativity: 3.04, lj_epsilon: 0.711, lj_sigma: 0.325 },
    ElementProps { symbol: "O", mass: 15.999, vdw_radius: 0.152, electronegativity: 3.44, lj_epsilon: 0.879, lj_sigma: 0.296 },
    ElementProps { symbol: "F", mass: 18.998, vdw_radius: 0.147, electronegativity: 3.98, lj_epsilon: 0.255, lj_sigma: 0.294 },
    ElementProps { symbol: "P", mass: 30.974, vdw_radius: 0.180, electronegativity: 2.19, lj_epsilon: 0.837, lj_sigma: 0.374 },
    ElementProps { symbol: "S", mass: 32.06, vdw_radius: 0.180, electronegativity: 2.58, lj_epsilon: 1.046, lj_sigma: 0.355 },
    ElementProps { symbol: "Na", mass: 22.990, vdw_radius: 0.227, electronegativity: 0.93, lj_epsilon: 0.012, lj_sigma: 0.333 },
    ElementProps { symbol: "Cl", mass: 35.45, vdw_radius: 0.175, electronegativity: 3.16, lj_epsilon: 0.418, lj_sigma: 0.440 },
];

impl Element {
    pub const ALL: [Element; 9] = [
        Element::H,
        Element::C,
        Element::N,
        Element::O,
        Element::F,
        Element::P,
        Element::S,
        Element::Na,
        Element::Cl,
    ];

    pub fn props(self) -> &'static ElementProps {
        &ELEMENTS[self as usize]
    }

    pub fn symbol(self) -> &'static str {
        self.props().symbol
    }

    /// Anything heavier than hydrogen
    pub fn is_heavy(self) -> bool {
        self != Element::H
    }

    /// N, O and F can accept a hydrogen bond
    pub fn is_hbond_acceptor(self) -> bool {
        matches!(self, Element::N | Element::O | Element::F)
    }
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Element {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Element::ALL
            .iter()
            .copied()
            .find(|e| e.symbol().eq_ignore_ascii_case(s))
            .ok_or_else(|| SimError::UnknownElement(s.to_string()))
    }
}

/// Lorentz-Berthelot mixing: arithmetic sigma, geometric epsilon
pub fn mixed_lj(a: Element, b: Element) -> (f64, f64) {
    let (pa, pb) = (a.props(), b.props());
    let epsilon = (pa.lj_epsilon * pb.lj_epsilon).sqrt();
    let sigma = 0.5 * (pa.lj_sigma + pb.lj_sigma);
    (epsilon, sigma)
}
