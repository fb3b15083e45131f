//! Core state types for the simulation
//!
//! - `Body`   one simulated particle / rigid unit
//! - `Bond`   spring-like link between two bodies
//! - `System` the caller-owned body and bond lists plus the current time `t`
//!
//! Bodies are created through [`BodyBuilder`], which rejects a non-fixed body
//! without a positive finite mass. After creation the step loop mutates the
//! public fields directly.

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::math::{quaternion, NQuat, NVec3};
use crate::simulation::forces::constants::Element;

/// Opaque, unique body identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub String);

impl BodyId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BodyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BodyId {
    fn from(s: &str) -> Self {
        BodyId(s.to_string())
    }
}

impl From<String> for BodyId {
    fn from(s: String) -> Self {
        BodyId(s)
    }
}

/// Collision geometry. Boxes are axis aligned around the body position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Sphere,
    Capsule { height: f64 },
    Box { half_extents: NVec3 },
}

/// What a body represents, for generators that only act on some categories
#[derive(Debug, Clone, PartialEq)]
pub enum BodyKind {
    Particle,
    Atom(AtomInfo),
    Organelle(OrganelleInfo),
}

#[derive(Debug, Clone, PartialEq)]
pub struct AtomInfo {
    pub element: Element,
    pub bond_hint: Option<BondType>,
    pub hydrophobicity: Option<f64>, // > 0 hydrophobic, < 0 hydrophilic
    pub hybridization: Option<String>,
}

impl AtomInfo {
    pub fn new(element: Element) -> Self {
        Self {
            element,
            bond_hint: None,
            hydrophobicity: None,
            hybridization: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrganelleInfo {
    pub component: String,
    pub hydrophobicity: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Label,
    Detailed,
    Measurement,
    Region,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationStyle {
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub size: Option<f64>,
}

/// Renderer-facing annotation; carried along untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub kind: AnnotationKind,
    #[serde(default)]
    pub offset: [f64; 3], // relative to the body position
    pub content: String,
    #[serde(default)]
    pub style: AnnotationStyle,
}

impl Annotation {
    pub fn new(kind: AnnotationKind, content: impl Into<String>) -> Self {
        Self {
            kind,
            offset: [0.0; 3],
            content: content.into(),
            style: AnnotationStyle::default(),
        }
    }

    pub fn label(content: impl Into<String>) -> Self {
        Self::new(AnnotationKind::Label, content)
    }

    pub fn with_color(mut self, color: &str) -> Self {
        self.style.color = Some(color.to_string());
        self
    }
}

#[derive(Debug, Clone)]
pub struct Body {
    pub id: BodyId,
    pub x: NVec3, // position
    pub v: NVec3, // velocity
    pub a: NVec3, // acceleration of the last step
    pub q: NQuat, // orientation
    pub w: NVec3, // angular velocity
    pub m: f64, // mass (ignored when fixed)
    pub radius: f64, // collision radius
    pub fixed: bool,
    pub linear_damping: f64,
    pub angular_damping: f64,
    pub charge: Option<f64>,
    pub shape: Shape,
    pub kind: BodyKind,
    pub annotations: Vec<Annotation>,
}

impl Body {
    /// Start building a spherical body at `x`
    pub fn builder(id: impl Into<BodyId>, x: NVec3) -> BodyBuilder {
        BodyBuilder::new(id.into(), x)
    }

    /// Inverse mass; zero for fixed bodies
    pub fn inv_mass(&self) -> f64 {
        if self.fixed {
            0.0
        } else {
            1.0 / self.m
        }
    }

    /// Radius used for sphere-like collision tests and bounds checks
    pub fn effective_radius(&self) -> f64 {
        match self.shape {
            Shape::Sphere => self.radius,
            Shape::Capsule { height } => self.radius + 0.5 * height,
            Shape::Box { half_extents } => half_extents.norm(),
        }
    }

    pub fn element(&self) -> Option<Element> {
        match &self.kind {
            BodyKind::Atom(info) => Some(info.element),
            _ => None,
        }
    }

    pub fn hydrophobicity(&self) -> Option<f64> {
        match &self.kind {
            BodyKind::Atom(info) => info.hydrophobicity,
            BodyKind::Organelle(info) => info.hydrophobicity,
            BodyKind::Particle => None,
        }
    }

    pub fn kinetic_energy(&self) -> f64 {
        if self.fixed {
            return 0.0;
        }
        0.5 * self.m * self.v.norm_squared()
    }
}

/// Validating constructor for [`Body`]
#[derive(Debug, Clone)]
pub struct BodyBuilder {
    body: Body,
}

impl BodyBuilder {
    fn new(id: BodyId, x: NVec3) -> Self {
        Self {
            body: Body {
                id,
                x,
                v: NVec3::zeros(),
                a: NVec3::zeros(),
                q: quaternion::identity(),
                w: NVec3::zeros(),
                m: 1.0,
                radius: 0.5,
                fixed: false,
                linear_damping: 0.0,
                angular_damping: 0.0,
                charge: None,
                shape: Shape::Sphere,
                kind: BodyKind::Particle,
                annotations: Vec::new(),
            },
        }
    }

    pub fn mass(mut self, m: f64) -> Self {
        self.body.m = m;
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.body.radius = radius;
        self
    }

    pub fn velocity(mut self, v: NVec3) -> Self {
        self.body.v = v;
        self
    }

    pub fn orientation(mut self, q: NQuat) -> Self {
        self.body.q = quaternion::normalize(&q);
        self
    }

    pub fn angular_velocity(mut self, w: NVec3) -> Self {
        self.body.w = w;
        self
    }

    pub fn fixed(mut self, fixed: bool) -> Self {
        self.body.fixed = fixed;
        self
    }

    pub fn damping(mut self, linear: f64, angular: f64) -> Self {
        self.body.linear_damping = linear;
        self.body.angular_damping = angular;
        self
    }

    pub fn charge(mut self, q: f64) -> Self {
        self.body.charge = Some(q);
        self
    }

    pub fn shape(mut self, shape: Shape) -> Self {
        self.body.shape = shape;
        self
    }

    pub fn kind(mut self, kind: BodyKind) -> Self {
        self.body.kind = kind;
        self
    }

    /// Atom of the given element; mass defaults to the element's atomic mass
    pub fn atom(mut self, element: Element) -> Self {
        self.body.m = element.props().mass;
        self.body.kind = BodyKind::Atom(AtomInfo::new(element));
        self
    }

    pub fn annotation(mut self, annotation: Annotation) -> Self {
        self.body.annotations.push(annotation);
        self
    }

    pub fn build(self) -> SimResult<Body> {
        let b = self.body;
        if !b.fixed && !(b.m.is_finite() && b.m > 0.0) {
            return Err(SimError::InvalidMass { id: b.id.0, mass: b.m });
        }
        if !(b.radius.is_finite() && b.radius >= 0.0) {
            return Err(SimError::InvalidRadius { id: b.id.0, radius: b.radius });
        }
        Ok(b)
    }
}

/// Bond category, roughly ordered by strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondType {
    Single,
    Double,
    Triple,
    Aromatic,
    Hydrogen,
    Ionic,
    VanDerWaals,
}

impl BondType {
    /// Whether the bond is part of the covalent skeleton (used to find donors)
    pub fn is_covalent(self) -> bool {
        matches!(self, BondType::Single | BondType::Double | BondType::Triple | BondType::Aromatic)
    }
}

#[derive(Debug, Clone)]
pub struct Bond {
    pub a: BodyId,
    pub b: BodyId,
    pub kind: BondType,
    pub rest_length: f64,
    pub stiffness: f64,
    pub order: Option<f64>, // stiffness multiplier, 1.0 when absent
}

impl Bond {
    pub fn new(a: impl Into<BodyId>, b: impl Into<BodyId>, kind: BondType, rest_length: f64, stiffness: f64) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            kind,
            rest_length,
            stiffness,
            order: None,
        }
    }

    pub fn with_order(mut self, order: f64) -> Self {
        self.order = Some(order);
        self
    }

    /// Spring constant `stiffness * order`
    pub fn spring_constant(&self) -> f64 {
        self.stiffness * self.order.unwrap_or(1.0)
    }
}

/// The full simulated state: bodies, bonds and time
#[derive(Debug, Clone, Default)]
pub struct System {
    pub bodies: Vec<Body>,
    pub bonds: Vec<Bond>,
    pub t: f64,
}

impl System {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a body; ids must be unique
    pub fn add_body(&mut self, body: Body) -> SimResult<usize> {
        if self.index_of(&body.id).is_some() {
            return Err(SimError::DuplicateBody(body.id.0));
        }
        self.bodies.push(body);
        Ok(self.bodies.len() - 1)
    }

    /// Remove a body by id. Bonds that referenced it are left for the caller;
    /// the spring force ignores them.
    pub fn remove_body(&mut self, id: &BodyId) -> Option<Body> {
        let idx = self.index_of(id)?;
        Some(self.bodies.remove(idx))
    }

    /// Add a bond, checking that both endpoints exist
    pub fn add_bond(&mut self, bond: Bond) -> SimResult<()> {
        for end in [&bond.a, &bond.b] {
            if self.index_of(end).is_none() {
                return Err(SimError::UnknownBody {
                    owner: format!("bond {}-{}", bond.a, bond.b),
                    id: end.0.clone(),
                });
            }
        }
        self.bonds.push(bond);
        Ok(())
    }

    /// Drop bonds whose endpoints are no longer present
    pub fn prune_bonds(&mut self) -> usize {
        let ids: HashSet<&str> = self.bodies.iter().map(|b| b.id.as_str()).collect();
        let before = self.bonds.len();
        self.bonds
            .retain(|b| ids.contains(b.a.as_str()) && ids.contains(b.b.as_str()));
        before - self.bonds.len()
    }

    pub fn index_of(&self, id: &BodyId) -> Option<usize> {
        self.bodies.iter().position(|b| &b.id == id)
    }

    pub fn body(&self, id: &str) -> Option<&Body> {
        self.bodies.iter().find(|b| b.id.as_str() == id)
    }

    pub fn body_mut(&mut self, id: &str) -> Option<&mut Body> {
        self.bodies.iter_mut().find(|b| b.id.as_str() == id)
    }

    /// Map from id to current index in `bodies`
    pub fn id_lookup(&self) -> HashMap<&str, usize> {
        self.bodies
            .iter()
            .enumerate()
            .map(|(i, b)| (b.id.as_str(), i))
            .collect()
    }

    pub fn kinetic_energy(&self) -> f64 {
        self.bodies.iter().map(Body::kinetic_energy).sum()
    }
}
