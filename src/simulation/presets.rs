//! Built-in starting scenes
//!
//! Each preset produces a validated [`System`] together with the parameters
//! and force set it is meant to run with. The builders take their shape
//! parameters explicitly; [`PresetKind::build`] uses the defaults.
//!
//! Molecular presets use nm / u / ps, the mechanical ones plain SI.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::{SimError, SimResult};
use crate::math::NVec3;
use crate::simulation::forces::constants::{Element, STANDARD_GRAVITY};
use crate::simulation::forces::{ForceSet, Hydrophobic, MolecularSpring};
use crate::simulation::params::{MolecularParameters, Parameters};
use crate::simulation::states::{
    Annotation, AnnotationKind, AtomInfo, Body, BodyKind, Bond, BondType, OrganelleInfo, Shape, System,
};
use crate::simulation::collision::WorldBounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresetKind {
    Pendulum,
    SpringSystem,
    Projectile,
    WaterMolecule,
    BenzeneRing,
    DnaHelix,
    CellMembrane,
}

impl PresetKind {
    pub const ALL: [PresetKind; 7] = [
        PresetKind::Pendulum,
        PresetKind::SpringSystem,
        PresetKind::Projectile,
        PresetKind::WaterMolecule,
        PresetKind::BenzeneRing,
        PresetKind::DnaHelix,
        PresetKind::CellMembrane,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PresetKind::Pendulum => "pendulum",
            PresetKind::SpringSystem => "spring_system",
            PresetKind::Projectile => "projectile",
            PresetKind::WaterMolecule => "water_molecule",
            PresetKind::BenzeneRing => "benzene_ring",
            PresetKind::DnaHelix => "dna_helix",
            PresetKind::CellMembrane => "cell_membrane",
        }
    }

    /// Gravity the preset is meant to run under
    pub fn gravity(self) -> NVec3 {
        match self {
            PresetKind::Pendulum | PresetKind::SpringSystem | PresetKind::Projectile => {
                NVec3::new(0.0, -STANDARD_GRAVITY, 0.0)
            }
            _ => NVec3::zeros(),
        }
    }

    /// Build the preset with its default shape parameters
    pub fn build(self) -> SimResult<Preset> {
        let system = match self {
            PresetKind::Pendulum => pendulum(2.0, 1.0, 30.0)?,
            PresetKind::SpringSystem => spring_system(3, 50.0, 1.0)?,
            PresetKind::Projectile => projectile(15.0, 45.0)?,
            PresetKind::WaterMolecule => water_molecule(0.0958, 104.5)?,
            PresetKind::BenzeneRing => benzene_ring(0.139)?,
            PresetKind::DnaHelix => dna_helix(10, 1.0, 3.4)?,
            PresetKind::CellMembrane => cell_membrane(2.0, 2.0, 0.5)?,
        };
        log::debug!("built preset {} with {} bodies, {} bonds", self, system.bodies.len(), system.bonds.len());
        Ok(Preset {
            kind: self,
            system,
            parameters: self.parameters(),
            forces: self.forces(),
        })
    }

    fn parameters(self) -> Parameters {
        let mut p = Parameters {
            gravity: self.gravity(),
            ..Parameters::default()
        };
        match self {
            PresetKind::Pendulum => {
                p.dt = 1.0 / 240.0;
            }
            PresetKind::SpringSystem => {
                p.dt = 1.0 / 120.0;
                p.damping = 0.05;
            }
            PresetKind::Projectile => {
                p.dt = 1.0 / 120.0;
                p.restitution = 0.6;
                p.bounds = Some(WorldBounds::new(NVec3::new(-50.0, 0.0, -50.0), NVec3::new(50.0, 50.0, 50.0)));
            }
            PresetKind::WaterMolecule | PresetKind::BenzeneRing => {
                // bonded atoms sit at touching distance
                p.dt = 0.001;
                p.t_end = 1.0;
                p.collisions = false;
                p.molecular = Some(MolecularParameters::default());
            }
            PresetKind::DnaHelix => {
                p.dt = 0.005;
                p.damping = 0.1;
            }
            PresetKind::CellMembrane => {
                // capsule tails overlap their neighbours as bounding spheres
                p.dt = 0.005;
                p.damping = 0.5;
                p.collisions = false;
            }
        }
        p
    }

    fn forces(self) -> ForceSet {
        let forces = ForceSet::new().with(MolecularSpring);
        match self {
            PresetKind::CellMembrane => forces.with(Hydrophobic {
                strength: 0.5,
                min_distance: 0.05,
                cutoff: 1.5,
            }),
            _ => forces,
        }
    }
}

impl fmt::Display for PresetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PresetKind {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        PresetKind::ALL
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| SimError::UnknownPreset(s.to_string()))
    }
}

/// A ready-to-run preset
pub struct Preset {
    pub kind: PresetKind,
    pub system: System,
    pub parameters: Parameters,
    pub forces: ForceSet,
}

// =========================================================================================
// Mechanics
// =========================================================================================

/// Bob hanging from a fixed anchor at (0, 2, 0), released at `angle_deg`
///
/// The rod is a stiff spring.
pub fn pendulum(length: f64, mass: f64, angle_deg: f64) -> SimResult<System> {
    let angle = angle_deg.to_radians();
    let anchor = NVec3::new(0.0, 2.0, 0.0);
    let bob = anchor + NVec3::new(length * angle.sin(), -length * angle.cos(), 0.0);
    let period = 2.0 * PI * (length / STANDARD_GRAVITY).sqrt();

    let mut sys = System::new();
    sys.add_body(
        Body::builder("pendulum_anchor", anchor)
            .radius(0.1)
            .fixed(true)
            .annotation(Annotation::label("Anchor Point"))
            .build()?,
    )?;
    sys.add_body(
        Body::builder("pendulum_bob", bob)
            .mass(mass)
            .radius(0.2)
            .annotation(Annotation::label("Pendulum Bob"))
            .annotation(Annotation::new(AnnotationKind::Measurement, format!("period {period:.3} s")))
            .build()?,
    )?;
    sys.add_bond(Bond::new("pendulum_anchor", "pendulum_bob", BondType::Single, length, 1000.0))?;
    Ok(sys)
}

/// Chain of `count` unit masses hanging below a fixed anchor
///
/// Masses start 20% below their rest spacing so the chain oscillates.
pub fn spring_system(count: usize, stiffness: f64, rest_length: f64) -> SimResult<System> {
    let top = NVec3::new(0.0, 5.0, 0.0);
    let mut sys = System::new();
    sys.add_body(Body::builder("spring_anchor", top).radius(0.1).fixed(true).build()?)?;

    let mut prev = "spring_anchor".to_string();
    for i in 0..count {
        let id = format!("spring_mass_{i}");
        let x = top - NVec3::new(0.0, 1.2 * rest_length * (i + 1) as f64, 0.0);
        sys.add_body(Body::builder(id.as_str(), x).mass(1.0).radius(0.2).build()?)?;
        sys.add_bond(Bond::new(prev.as_str(), id.as_str(), BondType::Single, rest_length, stiffness))?;
        prev = id;
    }
    Ok(sys)
}

/// Ball launched from the floor at `speed` and `angle_deg` above +X
pub fn projectile(speed: f64, angle_deg: f64) -> SimResult<System> {
    let angle = angle_deg.to_radians();
    let v = NVec3::new(speed * angle.cos(), speed * angle.sin(), 0.0);
    let range = speed * speed * (2.0 * angle).sin() / STANDARD_GRAVITY;

    let mut sys = System::new();
    sys.add_body(
        Body::builder("projectile", NVec3::new(0.0, 0.2, 0.0))
            .mass(1.0)
            .radius(0.2)
            .velocity(v)
            .annotation(Annotation::new(AnnotationKind::Measurement, format!("range {range:.2} m")))
            .build()?,
    )?;
    Ok(sys)
}

// =========================================================================================
// Chemistry
// =========================================================================================

/// H2O with the oxygen at the origin and both hydrogens in the XZ plane
pub fn water_molecule(bond_length: f64, bond_angle_deg: f64) -> SimResult<System> {
    let half = bond_angle_deg.to_radians() / 2.0;
    let hx = bond_length * half.sin();
    let hz = bond_length * half.cos();

    let mut sys = System::new();
    sys.add_body(
        Body::builder("water_O", NVec3::zeros())
            .atom(Element::O)
            .radius(0.066)
            .charge(-0.82)
            .annotation(Annotation::label("Oxygen").with_color("#FF0000"))
            .build()?,
    )?;
    for (id, sign) in [("water_H1", 1.0), ("water_H2", -1.0)] {
        sys.add_body(
            Body::builder(id, NVec3::new(sign * hx, 0.0, hz))
                .atom(Element::H)
                .radius(0.031)
                .charge(0.41)
                .annotation(Annotation::label("Hydrogen").with_color("#FFFFFF"))
                .build()?,
        )?;
        sys.add_bond(Bond::new("water_O", id, BondType::Single, bond_length, 500.0).with_order(1.0))?;
    }
    Ok(sys)
}

/// C6H6 in the XY plane with aromatic C-C bonds of order 1.5
pub fn benzene_ring(radius: f64) -> SimResult<System> {
    const CH_LENGTH: f64 = 0.109;

    let mut sys = System::new();
    for i in 0..6 {
        let angle = i as f64 * PI / 3.0;
        let dir = NVec3::new(angle.cos(), angle.sin(), 0.0);
        let carbon = format!("benzene_C{i}");
        let hydrogen = format!("benzene_H{i}");

        let mut info = AtomInfo::new(Element::C);
        info.hybridization = Some("sp2".to_string());
        info.bond_hint = Some(BondType::Aromatic);
        sys.add_body(
            Body::builder(carbon.as_str(), dir * radius)
                .kind(BodyKind::Atom(info))
                .mass(Element::C.props().mass)
                .radius(0.07)
                .annotation(Annotation::label(format!("Carbon {}", i + 1)).with_color("#404040"))
                .build()?,
        )?;
        sys.add_body(
            Body::builder(hydrogen.as_str(), dir * (radius + CH_LENGTH))
                .atom(Element::H)
                .radius(0.031)
                .build()?,
        )?;
        sys.add_bond(Bond::new(carbon.as_str(), hydrogen.as_str(), BondType::Single, CH_LENGTH, 400.0))?;
    }
    for i in 0..6 {
        let a = format!("benzene_C{i}");
        let b = format!("benzene_C{}", (i + 1) % 6);
        sys.add_bond(Bond::new(a, b, BondType::Aromatic, radius, 600.0).with_order(1.5))?;
    }
    Ok(sys)
}

// =========================================================================================
// Biology
// =========================================================================================

fn base_color(base: char) -> &'static str {
    match base {
        'A' => "#00FF00",
        'T' => "#FF0000",
        'G' => "#FFFF00",
        _ => "#0000FF",
    }
}

fn complement(base: char) -> char {
    match base {
        'A' => 'T',
        'T' => 'A',
        'G' => 'C',
        _ => 'G',
    }
}

/// Two helical strands of nucleotides, ten base pairs per turn
///
/// Pairs are linked across by hydrogen-type springs, neighbours along each
/// strand by backbone springs at their initial separation.
pub fn dna_helix(base_pairs: usize, radius: f64, pitch: f64) -> SimResult<System> {
    const BASES: [char; 4] = ['A', 'T', 'G', 'C'];
    let mut sys = System::new();

    let nucleotide = |id: String, x: NVec3, base: char, strand: u8| {
        Body::builder(id, x)
            .mass(300.0)
            .radius(0.3)
            .kind(BodyKind::Organelle(OrganelleInfo {
                component: format!("nucleotide_strand_{strand}"),
                hydrophobicity: None,
            }))
            .annotation(Annotation::label(base.to_string()).with_color(base_color(base)))
            .build()
    };

    for i in 0..base_pairs {
        let angle = i as f64 * 2.0 * PI / 10.0;
        let height = i as f64 * pitch / 10.0;
        let x1 = NVec3::new(radius * angle.cos(), height, radius * angle.sin());
        let x2 = NVec3::new(radius * (angle + PI).cos(), height, radius * (angle + PI).sin());

        let b1 = BASES[i % 4];
        let id1 = format!("dna_base1_{i}");
        let id2 = format!("dna_base2_{i}");
        sys.add_body(nucleotide(id1.clone(), x1, b1, 1)?)?;
        sys.add_body(nucleotide(id2.clone(), x2, complement(b1), 2)?)?;
        sys.add_bond(Bond::new(id1.as_str(), id2.as_str(), BondType::Hydrogen, 2.0 * radius, 50.0))?;

        if i > 0 {
            for strand in [1, 2] {
                let prev = format!("dna_base{strand}_{}", i - 1);
                let cur = format!("dna_base{strand}_{i}");
                let rest = match (sys.body(&prev), sys.body(&cur)) {
                    (Some(p), Some(c)) => (c.x - p.x).norm(),
                    _ => pitch / 10.0,
                };
                sys.add_bond(Bond::new(prev, cur, BondType::Single, rest, 300.0))?;
            }
        }
    }
    Ok(sys)
}

/// Patch of phospholipid bilayer: hydrophilic sphere heads at y = +-2 and
/// hydrophobic capsule tails pointing into the membrane core
pub fn cell_membrane(width: f64, depth: f64, spacing: f64) -> SimResult<System> {
    if spacing <= 0.0 {
        return Err(SimError::InvalidConfig(format!("membrane spacing must be > 0, got {spacing}")));
    }
    let nx = (width / spacing) as usize;
    let nz = (depth / spacing) as usize;
    let mut sys = System::new();

    let part = |id: String, x: NVec3, component: &str, hydrophobicity: f64| {
        Body::builder(id, x).kind(BodyKind::Organelle(OrganelleInfo {
            component: component.to_string(),
            hydrophobicity: Some(hydrophobicity),
        }))
    };

    for i in 0..nx {
        for j in 0..nz {
            let x = i as f64 * spacing - width / 2.0;
            let z = j as f64 * spacing - depth / 2.0;
            for (layer, sign) in [("upper", 1.0), ("lower", -1.0)] {
                let head = format!("lipid_head_{layer}_{i}_{j}");
                let tail = format!("lipid_tail_{layer}_{i}_{j}");
                sys.add_body(
                    part(head.clone(), NVec3::new(x, 2.0 * sign, z), "phosphate_head", -1.0)
                        .mass(50.0)
                        .radius(0.2)
                        .annotation(Annotation::label("hydrophilic").with_color("#FF6B6B"))
                        .build()?,
                )?;
                sys.add_body(
                    part(tail.clone(), NVec3::new(x, 0.75 * sign, z), "fatty_acid_tail", 1.0)
                        .mass(200.0)
                        .radius(0.1)
                        .shape(Shape::Capsule { height: 1.5 })
                        .annotation(Annotation::label("hydrophobic").with_color("#4ECDC4"))
                        .build()?,
                )?;
                sys.add_bond(Bond::new(head, tail, BondType::Single, 1.25, 200.0))?;
            }
        }
    }
    Ok(sys)
}
