//! Build fully-initialized simulation scenarios from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) or a preset name and produces a
//! runtime bundle containing:
//! - the engine (`Engine`) with its parameters and active force set
//! - system state (`System` with bodies and bonds at t = 0)
//!
//! All validation happens here; once a `Scenario` exists every step is
//! infallible.

use crate::configuration::config::{
    vec3, BodyConfig, BondConfig, DihedralConfig, ForceConfig, MolecularConfig, ParametersConfig, ScenarioConfig,
    ShapeConfig,
};
use crate::error::{SimError, SimResult};
use crate::math::NVec3;
use crate::simulation::collision::WorldBounds;
use crate::simulation::engine::Engine;
use crate::simulation::forces::constants::Element;
use crate::simulation::forces::{
    BrownianMotion, Dihedral, Drag, Electrostatic, ForceSet, Gravity, HydrogenBonding, Hydrophobic, LennardJones,
    MolecularSpring, Torsion,
};
use crate::simulation::metrics::StepMetrics;
use crate::simulation::params::{MolecularParameters, Parameters};
use crate::simulation::presets::PresetKind;
use crate::simulation::states::{AtomInfo, Body, BodyKind, Bond, OrganelleInfo, Shape, System};

/// A fully-initialized simulation: engine settings, forces and the system
/// state they act on
pub struct Scenario {
    pub engine: Engine,
    pub system: System,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> SimResult<Self> {
        // Starting point: a preset, or an empty system with default parameters
        let (mut system, base_params, mut forces) = match &cfg.preset {
            Some(name) => {
                let preset = name.parse::<PresetKind>()?.build()?;
                (preset.system, preset.parameters, preset.forces)
            }
            None => (System::new(), Parameters::default(), ForceSet::new()),
        };

        let mut parameters = apply_parameters(base_params, &cfg.parameters)?;
        let e_cfg = &cfg.engine;
        parameters.integrator = e_cfg.integrator;
        if let Some(collisions) = e_cfg.collisions {
            parameters.collisions = collisions;
        }
        if let Some(restitution) = e_cfg.restitution {
            parameters.restitution = restitution;
        }
        if let Some(capacity) = e_cfg.octree_capacity {
            parameters.octree_capacity = capacity.max(1);
        }
        if let Some(depth) = e_cfg.octree_max_depth {
            parameters.octree_max_depth = depth;
        }
        if let Some(m_cfg) = &cfg.molecular {
            parameters.molecular = Some(apply_molecular(parameters.molecular.unwrap_or_default(), m_cfg));
        }

        // Bodies: map `BodyConfig` -> runtime `Body`
        for bc in &cfg.bodies {
            system.add_body(build_body(bc)?)?;
        }
        for bond in &cfg.bonds {
            system.add_bond(build_bond(bond))?;
        }
        let dihedrals = cfg
            .dihedrals
            .iter()
            .map(|d| build_dihedral(&system, d))
            .collect::<SimResult<Vec<_>>>()?;

        let mut torsion_used = false;
        for f_cfg in &cfg.forces {
            torsion_used |= matches!(f_cfg, ForceConfig::Torsion);
            push_force(&mut forces, f_cfg, &dihedrals)?;
        }
        if !dihedrals.is_empty() && !torsion_used {
            log::warn!("{} dihedral(s) configured without a torsion force; ignoring them", dihedrals.len());
        }

        log::info!(
            "scenario built: {} bodies, {} bonds, forces [{}], integrator {:?}",
            system.bodies.len(),
            system.bonds.len(),
            forces.names().join(", "),
            parameters.integrator
        );

        Ok(Self {
            engine: Engine::new(parameters, forces),
            system,
        })
    }

    pub fn from_yaml(text: &str) -> SimResult<Self> {
        Self::build_scenario(ScenarioConfig::from_yaml(text)?)
    }

    pub fn from_preset(kind: PresetKind) -> SimResult<Self> {
        let preset = kind.build()?;
        Ok(Self {
            engine: Engine::new(preset.parameters, preset.forces),
            system: preset.system,
        })
    }

    pub fn step(&mut self) -> StepMetrics {
        self.engine.step(&mut self.system)
    }

    pub fn run(&mut self, steps: usize) -> Option<StepMetrics> {
        self.engine.run(&mut self.system, steps)
    }
}

fn to_vec(field: &str, values: &[f64]) -> SimResult<NVec3> {
    Ok(NVec3::from(vec3(field, values)?))
}

fn apply_parameters(mut p: Parameters, cfg: &ParametersConfig) -> SimResult<Parameters> {
    if let Some(dt) = cfg.dt {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::InvalidConfig(format!("dt must be positive, got {dt}")));
        }
        p.dt = dt;
    }
    if let Some(t_end) = cfg.t_end {
        p.t_end = t_end;
    }
    if let Some(g) = &cfg.gravity {
        p.gravity = to_vec("parameters.gravity", g)?;
    }
    if let Some(d) = cfg.damping {
        p.damping = d;
    }
    if let Some(d) = cfg.angular_damping {
        p.angular_damping = d;
    }
    if let Some(b) = &cfg.bounds {
        let min = to_vec("parameters.bounds.min", &b.min)?;
        let max = to_vec("parameters.bounds.max", &b.max)?;
        if (0..3).any(|k| min[k] >= max[k]) {
            return Err(SimError::InvalidConfig("bounds.min must be below bounds.max on every axis".into()));
        }
        p.bounds = Some(WorldBounds::new(min, max));
    }
    if let Some(v) = cfg.max_velocity {
        p.max_velocity = v;
    }
    if let Some(w) = cfg.max_angular_velocity {
        p.max_angular_velocity = w;
    }
    if let Some(d) = cfg.min_distance {
        p.min_distance = d;
    }
    if let Some(seed) = cfg.seed {
        p.seed = seed;
    }
    Ok(p)
}

fn apply_molecular(mut m: MolecularParameters, cfg: &MolecularConfig) -> MolecularParameters {
    if let Some(t) = cfg.temperature {
        m.temperature = t;
    }
    if let Some(p) = cfg.pressure {
        m.pressure = p;
    }
    if let Some(d) = cfg.dielectric {
        m.dielectric = d;
    }
    if let Some(c) = cfg.cutoff {
        m.cutoff = c;
    }
    m
}

fn build_body(bc: &BodyConfig) -> SimResult<Body> {
    let x = to_vec(&format!("bodies.{}.x", bc.id), &bc.x)?;
    let mut builder = Body::builder(bc.id.as_str(), x)
        .fixed(bc.fixed)
        .damping(bc.linear_damping, bc.angular_damping);

    if let Some(v) = &bc.v {
        builder = builder.velocity(to_vec(&format!("bodies.{}.v", bc.id), v)?);
    }
    if let Some(w) = &bc.w {
        builder = builder.angular_velocity(to_vec(&format!("bodies.{}.w", bc.id), w)?);
    }

    let mut default_radius = None;
    if let Some(symbol) = &bc.element {
        let element: Element = symbol.parse()?;
        let mut info = AtomInfo::new(element);
        info.hybridization = bc.hybridization.clone();
        info.hydrophobicity = bc.hydrophobicity;
        builder = builder.atom(element).kind(BodyKind::Atom(info));
        default_radius = Some(element.props().vdw_radius);
    } else if let Some(component) = &bc.component {
        builder = builder.kind(BodyKind::Organelle(OrganelleInfo {
            component: component.clone(),
            hydrophobicity: bc.hydrophobicity,
        }));
    } else if bc.hydrophobicity.is_some() {
        log::warn!("body '{}': hydrophobicity needs an element or component; ignoring it", bc.id);
    }

    if let Some(m) = bc.m {
        builder = builder.mass(m);
    }
    if let Some(r) = bc.radius.or(default_radius) {
        builder = builder.radius(r);
    }
    if let Some(q) = bc.charge {
        builder = builder.charge(q);
    }
    if let Some(shape) = &bc.shape {
        builder = builder.shape(match shape {
            ShapeConfig::Sphere => Shape::Sphere,
            ShapeConfig::Capsule { height } => Shape::Capsule { height: *height },
            ShapeConfig::Box { half_extents } => Shape::Box {
                half_extents: to_vec(&format!("bodies.{}.shape.half_extents", bc.id), half_extents)?,
            },
        });
    }
    for annotation in &bc.annotations {
        builder = builder.annotation(annotation.clone());
    }
    builder.build()
}

fn build_bond(cfg: &BondConfig) -> Bond {
    let bond = Bond::new(cfg.a.as_str(), cfg.b.as_str(), cfg.kind, cfg.rest_length, cfg.stiffness);
    match cfg.order {
        Some(order) => bond.with_order(order),
        None => bond,
    }
}

fn build_dihedral(sys: &System, cfg: &DihedralConfig) -> SimResult<Dihedral> {
    for id in &cfg.ids {
        if sys.body(id).is_none() {
            return Err(SimError::UnknownBody {
                owner: format!("dihedral {}", cfg.ids.join("-")),
                id: id.clone(),
            });
        }
    }
    let [a, b, c, d] = cfg.ids.clone();
    Ok(Dihedral {
        ids: [a.into(), b.into(), c.into(), d.into()],
        target: cfg.target_degrees.to_radians(),
        stiffness: cfg.stiffness,
    })
}

/// Register the generator described by `cfg`
///
/// Temperature, dielectric, cutoff and minimum distance stay unset unless the
/// force entry names them, so those generators follow the engine parameters.
fn push_force(forces: &mut ForceSet, cfg: &ForceConfig, dihedrals: &[Dihedral]) -> SimResult<()> {
    match cfg {
        ForceConfig::Gravity { g } => forces.push(Gravity {
            g: to_vec("forces.gravity.g", g)?,
        }),
        ForceConfig::Spring => forces.push(MolecularSpring),
        ForceConfig::LennardJones {
            epsilon,
            sigma,
            min_distance,
            cutoff,
            use_element_params,
            exclude_bonded,
        } => {
            let d = LennardJones::default();
            forces.push(LennardJones {
                epsilon: epsilon.unwrap_or(d.epsilon),
                sigma: sigma.unwrap_or(d.sigma),
                min_distance: *min_distance,
                cutoff: *cutoff,
                use_element_params: use_element_params.unwrap_or(d.use_element_params),
                exclude_bonded: exclude_bonded.unwrap_or(d.exclude_bonded),
            })
        }
        ForceConfig::Electrostatic {
            dielectric,
            min_distance,
            cutoff,
        } => {
            forces.push(Electrostatic {
                dielectric: *dielectric,
                min_distance: *min_distance,
                cutoff: *cutoff,
                ..Electrostatic::default()
            })
        }
        ForceConfig::HydrogenBond {
            strength,
            ideal_distance,
            width,
            min_distance,
            max_distance,
        } => {
            let d = HydrogenBonding::default();
            forces.push(HydrogenBonding {
                strength: strength.unwrap_or(d.strength),
                ideal_distance: ideal_distance.unwrap_or(d.ideal_distance),
                width: width.unwrap_or(d.width),
                min_distance: min_distance.unwrap_or(d.min_distance),
                max_distance: max_distance.unwrap_or(d.max_distance),
            })
        }
        ForceConfig::Hydrophobic {
            strength,
            min_distance,
            cutoff,
        } => {
            let d = Hydrophobic::default();
            forces.push(Hydrophobic {
                strength: strength.unwrap_or(d.strength),
                min_distance: min_distance.unwrap_or(d.min_distance),
                cutoff: cutoff.unwrap_or(d.cutoff),
            })
        }
        ForceConfig::Torsion => forces.push(Torsion::new(dihedrals.to_vec())),
        ForceConfig::Brownian { temperature, scale } => {
            let mut brownian = BrownianMotion {
                temperature: *temperature,
                ..BrownianMotion::default()
            };
            if let Some(scale) = scale {
                brownian.scale = *scale;
            }
            forces.push(brownian)
        }
        ForceConfig::Drag {
            coefficient,
            fluid_density,
            min_speed,
        } => {
            let d = Drag::default();
            forces.push(Drag {
                coefficient: coefficient.unwrap_or(d.coefficient),
                fluid_density: fluid_density.unwrap_or(d.fluid_density),
                min_speed: min_speed.unwrap_or(d.min_speed),
            })
        }
    }
    Ok(())
}
