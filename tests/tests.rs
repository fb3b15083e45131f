use approx::{assert_abs_diff_eq, assert_relative_eq};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use std::f64::consts::{FRAC_PI_2, FRAC_PI_3, PI};

use stemsim::math::{quaternion, transform, vector, NVec3};
use stemsim::simulation::collision::{self, brute_force_pairs, Contact, WorldBounds};
use stemsim::simulation::engine::Engine;
use stemsim::simulation::forces::constants::{Element, BOLTZMANN, COULOMB};
use stemsim::simulation::forces::molecular::dihedral_angle;
use stemsim::simulation::forces::{
    BrownianMotion, CustomField, Dihedral, Drag, Electrostatic, ForceSet, Gravity, HydrogenBonding, Hydrophobic,
    LennardJones, MolecularSpring, Torsion,
};
use stemsim::simulation::metrics::{kinetic_temperature, system_temperature};
use stemsim::simulation::octree::Octree;
use stemsim::simulation::params::{MolecularParameters, Parameters};
use stemsim::simulation::resolver::{self, Correction};
use stemsim::simulation::states::{Body, BodyKind, Bond, BondType, OrganelleInfo, Shape, System};
use stemsim::{IntegratorConfig, SimError};

/// Free sphere of radius `r` and mass `m` at `x`
pub fn ball(id: &str, x: [f64; 3], r: f64, m: f64) -> Body {
    Body::builder(id, NVec3::from(x)).radius(r).mass(m).build().unwrap()
}

pub fn fixed_ball(id: &str, x: [f64; 3], r: f64) -> Body {
    Body::builder(id, NVec3::from(x)).radius(r).fixed(true).build().unwrap()
}

pub fn atom(id: &str, element: Element, x: [f64; 3]) -> Body {
    Body::builder(id, NVec3::from(x)).atom(element).radius(0.05).build().unwrap()
}

pub fn system_of(bodies: Vec<Body>) -> System {
    let mut sys = System::new();
    for b in bodies {
        sys.add_body(b).unwrap();
    }
    sys
}

pub fn test_rng() -> StdRng {
    StdRng::seed_from_u64(7)
}

/// Forces from `set` on every body of `sys` under default parameters
pub fn forces_on(sys: &System, set: &ForceSet) -> Vec<NVec3> {
    forces_with(sys, set, &Parameters::default())
}

pub fn forces_with(sys: &System, set: &ForceSet, params: &Parameters) -> Vec<NVec3> {
    let mut out = vec![NVec3::zeros(); sys.bodies.len()];
    set.accumulate_forces(sys, params, &mut test_rng(), &mut out);
    out
}

/// Parameters with collisions off and nothing else acting
pub fn quiet_params(dt: f64) -> Parameters {
    Parameters {
        dt,
        collisions: false,
        ..Parameters::default()
    }
}

// ==================================================================================
// Vector / quaternion / transform tests
// ==================================================================================

#[test]
fn normalize_zero_is_zero() {
    let n = vector::normalize(&vector::zero());
    assert_eq!(n, vector::zero());
    assert!(n.iter().all(|c| c.is_finite()));
}

#[test]
fn divide_by_zero_is_zero() {
    let v = NVec3::new(1.0, -2.0, 3.0);
    assert_eq!(vector::divide(&v, 0.0), NVec3::zeros());
    assert_relative_eq!(vector::divide(&v, 2.0), NVec3::new(0.5, -1.0, 1.5));
}

#[test]
fn distance_is_magnitude_of_difference_and_dot_commutes() {
    let a = NVec3::new(1.0, 2.0, -0.5);
    let b = NVec3::new(-3.0, 0.25, 4.0);
    assert_relative_eq!(vector::distance(&a, &b), vector::magnitude(&vector::subtract(&b, &a)));
    assert_relative_eq!(vector::distance_squared(&a, &b), vector::magnitude_squared(&(b - a)));
    assert_eq!(vector::dot(&a, &b), vector::dot(&b, &a));
}

#[test]
fn angle_between_parallel_vectors_does_not_nan() {
    let a = NVec3::new(0.1, 0.2, 0.3);
    let b = a * 3.0;
    let angle = vector::angle_between(&a, &b);
    assert!(angle.is_finite());
    assert_abs_diff_eq!(angle, 0.0, epsilon = 1e-6);
    assert_abs_diff_eq!(vector::angle_between(&a, &-b), PI, epsilon = 1e-6);
    assert_eq!(vector::angle_between(&a, &NVec3::zeros()), 0.0);
}

#[test]
fn slerp_halfway_between_axes() {
    let x = NVec3::x();
    let y = NVec3::y();
    let mid = vector::slerp(&x, &y, 0.5);
    let h = 0.5f64.sqrt();
    assert_relative_eq!(mid, NVec3::new(h, h, 0.0), epsilon = 1e-12);
    // near-parallel falls back to lerp
    assert_relative_eq!(vector::slerp(&x, &x, 0.3), x);
}

#[test]
fn reflect_and_project() {
    let v = NVec3::new(1.0, -2.0, 0.0);
    assert_relative_eq!(vector::reflect(&v, &NVec3::new(0.0, 5.0, 0.0)), NVec3::new(1.0, 2.0, 0.0));
    assert_relative_eq!(vector::project(&v, &NVec3::x()), NVec3::new(1.0, 0.0, 0.0));
    assert_eq!(vector::project(&v, &NVec3::zeros()), NVec3::zeros());
}

#[test]
fn rodrigues_quarter_turn_about_z() {
    let r = vector::rotate_about_axis(&NVec3::x(), &NVec3::z(), FRAC_PI_2);
    assert_relative_eq!(r, NVec3::y(), epsilon = 1e-12);
}

#[test]
fn spherical_coordinates_round_trip() {
    let v = NVec3::new(1.0, 2.0, -3.0);
    let (r, theta, phi) = vector::to_spherical(&v);
    assert_relative_eq!(r, v.norm());
    assert_relative_eq!(vector::from_spherical(r, theta, phi), v, epsilon = 1e-12);
}

#[test]
fn random_unit_vectors_have_unit_length() {
    let mut rng = test_rng();
    for _ in 0..100 {
        assert_relative_eq!(vector::random_unit_vector(&mut rng).norm(), 1.0, epsilon = 1e-12);
    }
}

#[test]
fn quaternion_rotation_matches_rodrigues() {
    let axis = NVec3::new(1.0, 1.0, 0.5);
    let angle = 0.7;
    let v = NVec3::new(0.3, -1.0, 2.0);
    let q = quaternion::from_axis_angle(&axis, angle);
    assert_relative_eq!(
        quaternion::rotate_vector(&q, &v),
        vector::rotate_about_axis(&v, &axis, angle),
        epsilon = 1e-12
    );
    // composing two quarter turns is a half turn
    let quarter = quaternion::from_axis_angle(&NVec3::z(), FRAC_PI_2);
    let half = quaternion::multiply(&quarter, &quarter);
    assert_relative_eq!(quaternion::rotate_vector(&half, &NVec3::x()), -NVec3::x(), epsilon = 1e-12);
}

#[test]
fn quaternion_integration_stays_unit_and_turns() {
    let mut q = quaternion::identity();
    let w = NVec3::new(0.0, 0.0, 1.0);
    let steps = 2000;
    let dt = FRAC_PI_2 / steps as f64;
    for _ in 0..steps {
        q = quaternion::integrate(&q, &w, dt);
    }
    let len = (q.w * q.w + q.i * q.i + q.j * q.j + q.k * q.k).sqrt();
    assert_relative_eq!(len, 1.0, epsilon = 1e-12);
    assert_relative_eq!(quaternion::rotate_vector(&q, &NVec3::x()), NVec3::y(), epsilon = 1e-3);
}

#[test]
fn trs_matrix_scales_rotates_then_translates() {
    let q = quaternion::from_axis_angle(&NVec3::z(), FRAC_PI_2);
    let m = transform::compose_trs(&NVec3::new(1.0, 2.0, 3.0), &q, &NVec3::new(2.0, 1.0, 1.0));
    let p = transform::transform_point(&m, &NVec3::x());
    assert_relative_eq!(p, NVec3::new(1.0, 4.0, 3.0), epsilon = 1e-12);
}

// ==================================================================================
// Body / system tests
// ==================================================================================

#[test]
fn builder_rejects_bad_mass_for_free_bodies() {
    for m in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        let err = Body::builder("b", NVec3::zeros()).mass(m).build();
        assert!(matches!(err, Err(SimError::InvalidMass { .. })), "mass {m} accepted");
    }
    // fixed bodies carry no meaningful mass
    assert!(Body::builder("anchor", NVec3::zeros()).mass(0.0).fixed(true).build().is_ok());
}

#[test]
fn system_rejects_duplicate_ids_and_dangling_bonds() {
    let mut sys = system_of(vec![ball("a", [0.0; 3], 0.1, 1.0)]);
    assert!(matches!(sys.add_body(ball("a", [1.0, 0.0, 0.0], 0.1, 1.0)), Err(SimError::DuplicateBody(_))));
    let bond = Bond::new("a", "ghost", BondType::Single, 1.0, 1.0);
    assert!(matches!(sys.add_bond(bond), Err(SimError::UnknownBody { .. })));
}

#[test]
fn atom_builder_uses_element_mass() {
    let o = atom("O", Element::O, [0.0; 3]);
    assert_eq!(o.element(), Some(Element::O));
    assert_relative_eq!(o.m, Element::O.props().mass);
    assert_eq!("cl".parse::<Element>().unwrap(), Element::Cl);
    assert!(matches!("Xx".parse::<Element>(), Err(SimError::UnknownElement(_))));
}

#[test]
fn bond_order_defaults_to_one() {
    let bond = Bond::new("a", "b", BondType::Aromatic, 1.0, 600.0);
    assert_relative_eq!(bond.spring_constant(), 600.0);
    assert_relative_eq!(bond.with_order(1.5).spring_constant(), 900.0);
}

// ==================================================================================
// Force tests
// ==================================================================================

#[test]
fn force_set_skips_fixed_bodies() {
    let sys = system_of(vec![fixed_ball("wall", [0.0; 3], 0.5), ball("free", [5.0, 0.0, 0.0], 0.5, 2.0)]);
    let set = ForceSet::new().with(Gravity {
        g: NVec3::new(0.0, -9.81, 0.0),
    });
    let f = forces_on(&sys, &set);
    assert_eq!(f[0], NVec3::zeros());
    assert_relative_eq!(f[1], NVec3::new(0.0, -19.62, 0.0), epsilon = 1e-12);
}

#[test]
fn force_set_registry_add_remove_list() {
    let mut set = ForceSet::new().with(MolecularSpring).with(Drag::default());
    set.push(CustomField::new("wind", |_| NVec3::x()));
    assert_eq!(set.names(), vec!["spring", "drag", "wind"]);
    assert_eq!(set.remove("drag"), 1);
    assert_eq!(set.remove("drag"), 0);
    assert_eq!(set.len(), 2);
}

#[test]
fn spring_pulls_stretched_pair_together() {
    let mut sys = system_of(vec![ball("a", [0.0; 3], 0.1, 1.0), ball("b", [2.0, 0.0, 0.0], 0.1, 1.0)]);
    sys.add_bond(Bond::new("a", "b", BondType::Double, 1.0, 10.0).with_order(2.0)).unwrap();
    let set = ForceSet::new().with(MolecularSpring);
    let f = forces_on(&sys, &set);
    // k = 10 * 2, stretch 1
    assert_relative_eq!(f[0], NVec3::new(20.0, 0.0, 0.0), epsilon = 1e-12);
    assert_relative_eq!(f[1], NVec3::new(-20.0, 0.0, 0.0), epsilon = 1e-12);
    assert_relative_eq!(set.potential_energy(&sys, &Parameters::default()), 0.5 * 20.0, epsilon = 1e-12);
}

#[test]
fn spring_with_missing_endpoint_is_zero() {
    let mut sys = system_of(vec![ball("a", [0.0; 3], 0.1, 1.0), ball("b", [3.0, 0.0, 0.0], 0.1, 1.0)]);
    sys.add_bond(Bond::new("a", "b", BondType::Single, 1.0, 10.0)).unwrap();
    sys.remove_body(&"b".into()).unwrap();
    let f = forces_on(&sys, &ForceSet::new().with(MolecularSpring));
    assert_eq!(f[0], NVec3::zeros());
    assert_eq!(sys.prune_bonds(), 1);
}

#[test]
fn prune_bonds_keeps_bonds_between_present_bodies() {
    let mut sys = system_of(vec![
        ball("a", [0.0; 3], 0.1, 1.0),
        ball("b", [1.0, 0.0, 0.0], 0.1, 1.0),
        ball("c", [2.0, 0.0, 0.0], 0.1, 1.0),
    ]);
    sys.add_bond(Bond::new("a", "b", BondType::Single, 1.0, 10.0)).unwrap();
    sys.add_bond(Bond::new("b", "c", BondType::Single, 1.0, 10.0)).unwrap();
    assert_eq!(sys.prune_bonds(), 0);

    sys.remove_body(&"c".into()).unwrap();
    assert_eq!(sys.prune_bonds(), 1);
    assert_eq!(sys.bonds.len(), 1);
    assert_eq!((sys.bonds[0].a.as_str(), sys.bonds[0].b.as_str()), ("a", "b"));
}

#[test]
fn lennard_jones_window_and_sign() {
    let lj = LennardJones {
        epsilon: 1.0,
        sigma: 1.0,
        min_distance: Some(0.5),
        cutoff: Some(2.5),
        ..LennardJones::default()
    };
    let set = ForceSet::new().with(lj);

    // outside the cutoff and inside min distance: nothing
    for r in [3.0, 0.4] {
        let sys = system_of(vec![ball("a", [0.0; 3], 0.1, 1.0), ball("b", [r, 0.0, 0.0], 0.1, 1.0)]);
        assert_eq!(forces_on(&sys, &set)[0], NVec3::zeros(), "r = {r}");
    }

    // short range repels: force on a points away from b
    let sys = system_of(vec![ball("a", [0.0; 3], 0.1, 1.0), ball("b", [0.9, 0.0, 0.0], 0.1, 1.0)]);
    let f = forces_on(&sys, &set);
    assert!(f[0].x < 0.0 && f[1].x > 0.0);
    assert_relative_eq!(f[0], -f[1], epsilon = 1e-12);

    // beyond the minimum it attracts
    let sys = system_of(vec![ball("a", [0.0; 3], 0.1, 1.0), ball("b", [1.5, 0.0, 0.0], 0.1, 1.0)]);
    assert!(forces_on(&sys, &set)[0].x > 0.0);

    // zero force at the potential minimum 2^(1/6) sigma
    assert_abs_diff_eq!(LennardJones::magnitude(1.0, 1.0, 2f64.powf(1.0 / 6.0)), 0.0, epsilon = 1e-12);
    assert_relative_eq!(LennardJones::potential(1.0, 1.0, 2f64.powf(1.0 / 6.0)), -1.0, epsilon = 1e-12);
}

#[test]
fn lennard_jones_skips_bonded_pairs_by_default() {
    let mut sys = system_of(vec![ball("a", [0.0; 3], 0.1, 1.0), ball("b", [0.9, 0.0, 0.0], 0.1, 1.0)]);
    sys.add_bond(Bond::new("a", "b", BondType::Single, 0.9, 1.0)).unwrap();
    let f = forces_on(&sys, &ForceSet::new().with(LennardJones::default()));
    assert_eq!(f[0], NVec3::zeros());
}

#[test]
fn lennard_jones_unset_window_follows_parameters() {
    let set = ForceSet::new().with(LennardJones::default());
    let sys = system_of(vec![ball("a", [0.0; 3], 0.1, 1.0), ball("b", [1.5, 0.0, 0.0], 0.1, 1.0)]);
    assert!(forces_on(&sys, &set)[0].x > 0.0);

    // molecular cutoff 1.2 drops the pair at 1.5
    let mut params = Parameters {
        molecular: Some(MolecularParameters::default()),
        ..Parameters::default()
    };
    assert_eq!(forces_with(&sys, &set, &params)[0], NVec3::zeros());

    // a minimum distance above the separation drops it too
    params.molecular = None;
    params.min_distance = 2.0;
    assert_eq!(forces_with(&sys, &set, &params)[0], NVec3::zeros());
}

#[test]
fn coulomb_like_charges_repel_opposite_attract() {
    let set = ForceSet::new().with(Electrostatic {
        dielectric: Some(2.0),
        ..Electrostatic::default()
    });
    let charged = |id: &str, x: f64, q: f64| {
        Body::builder(id, NVec3::new(x, 0.0, 0.0)).charge(q).radius(0.1).build().unwrap()
    };

    let sys = system_of(vec![charged("a", 0.0, 1.0), charged("b", 0.5, 1.0)]);
    let f = forces_on(&sys, &set);
    assert!(f[0].x < 0.0 && f[1].x > 0.0);
    assert_relative_eq!(f[1].x, COULOMB / 2.0 / 0.25, epsilon = 1e-9);

    let sys = system_of(vec![charged("a", 0.0, 1.0), charged("b", 0.5, -1.0)]);
    let f = forces_on(&sys, &set);
    assert!(f[0].x > 0.0 && f[1].x < 0.0);

    // uncharged bodies feel nothing
    let sys = system_of(vec![charged("a", 0.0, 1.0), ball("n", [0.5, 0.0, 0.0], 0.1, 1.0)]);
    assert_eq!(forces_on(&sys, &set)[1], NVec3::zeros());
}

#[test]
fn coulomb_reads_dielectric_and_cutoff_each_evaluation() {
    let set = ForceSet::new().with(Electrostatic::default());
    let charged = |id: &str, x: f64| Body::builder(id, NVec3::new(x, 0.0, 0.0)).charge(1.0).radius(0.1).build().unwrap();
    let sys = system_of(vec![charged("a", 0.0), charged("b", 0.5)]);

    // no molecular settings: vacuum, unlimited range
    let vacuum = forces_on(&sys, &set)[1].x;
    assert_relative_eq!(vacuum, COULOMB / 0.25, epsilon = 1e-9);

    let mut params = Parameters {
        molecular: Some(MolecularParameters {
            dielectric: 4.0,
            ..MolecularParameters::default()
        }),
        ..Parameters::default()
    };
    assert_relative_eq!(forces_with(&sys, &set, &params)[1].x, vacuum / 4.0, epsilon = 1e-9);

    params.molecular = Some(MolecularParameters {
        cutoff: 0.3,
        ..MolecularParameters::default()
    });
    assert_eq!(forces_with(&sys, &set, &params)[1], NVec3::zeros());

    // an explicit dielectric on the term wins
    let fixed = ForceSet::new().with(Electrostatic {
        dielectric: Some(2.0),
        ..Electrostatic::default()
    });
    params.molecular = Some(MolecularParameters {
        dielectric: 80.0,
        ..MolecularParameters::default()
    });
    assert_relative_eq!(forces_with(&sys, &fixed, &params)[1].x, vacuum / 2.0, epsilon = 1e-9);
}

#[test]
fn hydrogen_bond_pulls_donor_and_acceptor_together() {
    let mut sys = system_of(vec![
        atom("O", Element::O, [0.0, 0.0, 0.0]),
        atom("H", Element::H, [0.1, 0.0, 0.0]),
        atom("N", Element::N, [0.35, 0.0, 0.0]),
    ]);
    sys.add_bond(Bond::new("O", "H", BondType::Single, 0.1, 500.0)).unwrap();

    let f = forces_on(&sys, &ForceSet::new().with(HydrogenBonding::default()));
    // r = 0.25 > r0: hydrogen moves toward N, N toward hydrogen
    assert!(f[1].x > 0.0);
    assert!(f[2].x < 0.0);
    assert_relative_eq!(f[1], -f[2], epsilon = 1e-12);
    // the heavy atom the hydrogen is bonded to takes no part
    assert_eq!(f[0], NVec3::zeros());

    // outside the distance band
    sys.body_mut("N").unwrap().x = NVec3::new(0.6, 0.0, 0.0);
    assert_eq!(forces_on(&sys, &ForceSet::new().with(HydrogenBonding::default()))[1], NVec3::zeros());
}

#[test]
fn hydrophobic_like_attracts_unlike_repels() {
    let part = |id: &str, x: f64, h: f64| {
        Body::builder(id, NVec3::new(x, 0.0, 0.0))
            .kind(BodyKind::Organelle(OrganelleInfo {
                component: "lipid".into(),
                hydrophobicity: Some(h),
            }))
            .build()
            .unwrap()
    };
    let set = ForceSet::new().with(Hydrophobic::default());

    let f = forces_on(&system_of(vec![part("a", 0.0, 1.0), part("b", 1.0, 1.0)]), &set);
    assert!(f[0].x > 0.0 && f[1].x < 0.0);

    let f = forces_on(&system_of(vec![part("a", 0.0, 1.0), part("b", 1.0, -1.0)]), &set);
    assert!(f[0].x < 0.0 && f[1].x > 0.0);
}

fn butane() -> System {
    let mut sys = system_of(vec![
        atom("C1", Element::C, [0.0, 0.15, 0.0]),
        atom("C2", Element::C, [0.0, 0.0, 0.0]),
        atom("C3", Element::C, [0.15, 0.0, 0.0]),
        atom("C4", Element::C, [0.15, 0.0, 0.15]),
    ]);
    for (a, b) in [("C1", "C2"), ("C2", "C3"), ("C3", "C4")] {
        sys.add_bond(Bond::new(a, b, BondType::Single, 0.15, 800.0)).unwrap();
    }
    sys
}

#[test]
fn dihedral_angle_of_perpendicular_chain() {
    let sys = butane();
    let p: Vec<NVec3> = sys.bodies.iter().map(|b| b.x).collect();
    assert_relative_eq!(dihedral_angle(&p[0], &p[1], &p[2], &p[3]).unwrap(), FRAC_PI_2, epsilon = 1e-12);
    // collinear points have no dihedral
    assert!(dihedral_angle(&p[1], &p[2], &NVec3::new(0.3, 0.0, 0.0), &p[3]).is_none());
}

#[test]
fn torsion_restores_toward_target() {
    let mut sys = butane();
    let torsion = Torsion::new(vec![Dihedral {
        ids: ["C1".into(), "C2".into(), "C3".into(), "C4".into()],
        target: FRAC_PI_3,
        stiffness: 5.0,
    }]);
    let set = ForceSet::new().with(torsion);

    let angle = |sys: &System| {
        let p: Vec<NVec3> = sys.bodies.iter().map(|b| b.x).collect();
        dihedral_angle(&p[0], &p[1], &p[2], &p[3]).unwrap()
    };
    let before = angle(&sys);
    let u_before = set.potential_energy(&sys, &Parameters::default());

    let f = forces_on(&sys, &set);
    // only the terminal atoms are pushed
    assert_eq!(f[1], NVec3::zeros());
    assert_eq!(f[2], NVec3::zeros());
    for (b, f) in sys.bodies.iter_mut().zip(f.iter()) {
        b.x += f * 1e-4;
    }

    let after = angle(&sys);
    assert!((after - FRAC_PI_3).abs() < (before - FRAC_PI_3).abs());
    assert!(set.potential_energy(&sys, &Parameters::default()) < u_before);
}

#[test]
fn brownian_is_zero_at_zero_temperature() {
    let sys = system_of(vec![ball("a", [0.0; 3], 0.1, 1.0), ball("b", [1.0, 0.0, 0.0], 0.1, 1e-3)]);
    let f = forces_on(&sys, &ForceSet::new().with(BrownianMotion::new(0.0)));
    assert!(f.iter().all(|v| *v == NVec3::zeros()));

    // magnitude scales with sqrt(T)
    let warm = BrownianMotion::new(300.0);
    assert_relative_eq!(warm.magnitude_for(1200.0, 2.0), 2.0 * warm.magnitude_for(300.0, 2.0), epsilon = 1e-12);
    assert_relative_eq!(warm.magnitude_for(300.0, 1.0), (2.0 * BOLTZMANN * 300.0).sqrt(), epsilon = 1e-12);

    let f = forces_on(&sys, &ForceSet::new().with(warm));
    assert_relative_eq!(f[0].norm(), (2.0 * BOLTZMANN * 300.0).sqrt(), epsilon = 1e-9);

    // a fixed temperature ignores the step parameters
    let cold = Parameters {
        molecular: Some(MolecularParameters {
            temperature: 0.0,
            ..MolecularParameters::default()
        }),
        ..Parameters::default()
    };
    let f = forces_with(&sys, &ForceSet::new().with(BrownianMotion::new(1200.0)), &cold);
    assert_relative_eq!(f[0].norm(), (2.0 * BOLTZMANN * 1200.0).sqrt(), epsilon = 1e-9);
}

#[test]
fn brownian_follows_temperature_changed_between_steps() {
    let mut sys = system_of(vec![ball("a", [0.0; 3], 0.1, 1.0)]);
    let at = |temperature: f64| {
        Some(MolecularParameters {
            temperature,
            ..MolecularParameters::default()
        })
    };
    let params = Parameters {
        molecular: at(0.0),
        ..quiet_params(1e-3)
    };
    let mut engine = Engine::new(params, ForceSet::new().with(BrownianMotion::default()));

    engine.run(&mut sys, 10);
    assert_eq!(sys.bodies[0].v, NVec3::zeros());

    engine.parameters.molecular = at(300.0);
    engine.step(&mut sys);
    assert!(sys.bodies[0].v.norm() > 0.0);

    // without molecular settings the default 300 K applies
    let mut other = system_of(vec![ball("a", [0.0; 3], 0.1, 1.0)]);
    engine.parameters.molecular = None;
    engine.step(&mut other);
    assert!(other.bodies[0].v.norm() > 0.0);
}

#[test]
fn drag_opposes_motion_above_min_speed() {
    let set = ForceSet::new().with(Drag {
        coefficient: 1.0,
        fluid_density: 2.0,
        min_speed: 0.01,
    });
    let moving = |v: f64| {
        Body::builder("a", NVec3::zeros()).radius(1.0).velocity(NVec3::new(v, 0.0, 0.0)).build().unwrap()
    };

    assert_eq!(forces_on(&system_of(vec![moving(0.005)]), &set)[0], NVec3::zeros());

    // 1/2 * 2 * 1 * pi * 1 * 3^2 = 9 pi
    let f = forces_on(&system_of(vec![moving(3.0)]), &set);
    assert_relative_eq!(f[0], NVec3::new(-9.0 * PI, 0.0, 0.0), epsilon = 1e-9);

    // capped at m |v| / dt: 9 pi > 1 * 3 / 0.1
    let coarse = Parameters {
        dt: 0.1,
        ..Parameters::default()
    };
    let f = forces_with(&system_of(vec![moving(3.0)]), &set, &coarse);
    assert_relative_eq!(f[0], NVec3::new(-30.0, 0.0, 0.0), epsilon = 1e-9);
}

#[test]
fn drag_never_reverses_motion() {
    assert_relative_eq!(Drag::default().fluid_density, 1.2);

    let v0 = NVec3::new(1.0, 0.0, 0.0);
    for integrator in [IntegratorConfig::Euler, IntegratorConfig::Verlet] {
        for density in [Drag::default().fluid_density, 1000.0] {
            let mut sys = system_of(vec![Body::builder("a", NVec3::zeros()).velocity(v0).build().unwrap()]);
            let params = Parameters {
                integrator,
                ..quiet_params(1.0 / 60.0)
            };
            let drag = Drag {
                fluid_density: density,
                ..Drag::default()
            };
            let mut engine = Engine::new(params, ForceSet::new().with(drag));
            for step in 0..200 {
                engine.step(&mut sys);
                let along = sys.bodies[0].v.dot(&v0);
                assert!(along >= -1e-12, "{integrator:?} rho={density} step {step}: v.v0 = {along}");
            }
            assert!(sys.bodies[0].v.norm() < 1.0);
        }
    }
}

#[test]
fn custom_field_sees_position() {
    let sys = system_of(vec![ball("a", [1.0, 2.0, 3.0], 0.1, 1.0)]);
    let set = ForceSet::new().with(CustomField::new("restoring", |x| -x));
    assert_relative_eq!(forces_on(&sys, &set)[0], NVec3::new(-1.0, -2.0, -3.0));
}

// ==================================================================================
// Narrow-phase tests
// ==================================================================================

#[test]
fn sphere_sphere_reports_depth_and_normal() {
    let a = ball("a", [0.0, 0.0, 0.0], 1.0, 1.0);
    let b = ball("b", [1.5, 0.0, 0.0], 1.0, 1.0);
    let c = collision::sphere_sphere(0, &a, 1, &b).unwrap();
    assert_relative_eq!(c.depth, 0.5, epsilon = 1e-12);
    assert_relative_eq!(c.normal, NVec3::new(1.0, 0.0, 0.0));
    assert_relative_eq!(c.point, NVec3::new(0.75, 0.0, 0.0), epsilon = 1e-12);

    let far = ball("c", [2.5, 0.0, 0.0], 1.0, 1.0);
    assert!(collision::sphere_sphere(0, &a, 2, &far).is_none());
}

#[test]
fn sphere_sphere_is_symmetric() {
    let a = ball("a", [0.2, -0.1, 0.4], 0.7, 1.0);
    let b = ball("b", [0.9, 0.3, 0.1], 0.5, 1.0);
    let ab = collision::sphere_sphere(0, &a, 1, &b).unwrap();
    let ba = collision::sphere_sphere(1, &b, 0, &a).unwrap();
    assert_relative_eq!(ab.depth, ba.depth, epsilon = 1e-12);
    assert_eq!(ab.normal, -ba.normal);
}

#[test]
fn coincident_centres_use_up_normal() {
    let a = ball("a", [1.0, 1.0, 1.0], 0.5, 1.0);
    let b = ball("b", [1.0, 1.0, 1.0], 0.25, 1.0);
    let c = collision::sphere_sphere(0, &a, 1, &b).unwrap();
    assert_eq!(c.normal, collision::default_normal());
    assert_relative_eq!(c.depth, 0.75);
}

#[test]
fn sphere_box_contact_points_from_box_to_sphere() {
    let bx = Body::builder("box", NVec3::zeros())
        .shape(Shape::Box {
            half_extents: NVec3::new(1.0, 1.0, 1.0),
        })
        .build()
        .unwrap();
    let s = ball("s", [1.5, 0.0, 0.0], 1.0, 1.0);

    let c = collision::test_pair(0, &bx, 1, &s).unwrap();
    assert_eq!((c.a, c.b), (0, 1));
    assert_relative_eq!(c.depth, 0.5, epsilon = 1e-12);
    assert_relative_eq!(c.normal, NVec3::x());
    assert_relative_eq!(c.point, NVec3::new(1.0, 0.0, 0.0));

    // same answer when the sphere comes first
    let c2 = collision::test_pair(1, &s, 0, &bx).unwrap();
    assert_eq!((c2.a, c2.b), (0, 1));

    let clear = ball("clear", [2.5, 0.0, 0.0], 1.0, 1.0);
    assert!(collision::sphere_box(2, &clear, 0, &bx).is_none());
}

#[test]
fn capsules_use_effective_radius() {
    let cap = |id: &str, x: f64| {
        Body::builder(id, NVec3::new(x, 0.0, 0.0))
            .radius(0.1)
            .shape(Shape::Capsule { height: 1.0 })
            .build()
            .unwrap()
    };
    let (a, b) = (cap("a", 0.0), cap("b", 0.9));
    let c = collision::test_pair(0, &a, 1, &b).unwrap();
    assert_relative_eq!(c.depth, 0.3, epsilon = 1e-12);
    assert!(collision::test_pair(0, &a, 1, &cap("c", 1.3)).is_none());
}

#[test]
fn body_resting_on_bound_gets_zero_depth_contact() {
    let bounds = WorldBounds::new(NVec3::new(-5.0, 0.0, -5.0), NVec3::new(5.0, 10.0, 5.0));
    let mut bodies = vec![ball("rest", [0.0, 0.5, 0.0], 0.5, 1.0)];

    let mut out = Vec::new();
    collision::sphere_bounds(0, &bodies[0], &bounds, &mut out);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].depth, 0.0);
    assert_eq!(out[0].normal, NVec3::y());

    resolver::resolve(&Contact::Bounds(out[0]), &mut bodies, 0.5, &Correction::default());
    assert_eq!(bodies[0].x, NVec3::new(0.0, 0.5, 0.0));
    assert_eq!(bodies[0].v, NVec3::zeros());
}

#[test]
fn corner_penetration_yields_one_contact_per_face() {
    let bounds = WorldBounds::cube(1.0);
    let b = ball("corner", [0.9, 0.9, -0.9], 0.2, 1.0);
    let mut out = Vec::new();
    collision::sphere_bounds(0, &b, &bounds, &mut out);
    assert_eq!(out.len(), 3);
    for c in &out {
        assert_relative_eq!(c.depth, 0.1, epsilon = 1e-12);
    }
}

// ==================================================================================
// Resolver tests
// ==================================================================================

#[test]
fn fixed_and_free_sphere_resolution() {
    let mut bodies = vec![
        fixed_ball("floor", [0.0, 0.0, 0.0], 1.0),
        Body::builder("ball", NVec3::new(1.8, 0.0, 0.0))
            .radius(1.0)
            .velocity(NVec3::new(-1.0, 0.0, 0.0))
            .build()
            .unwrap(),
    ];
    let c = collision::test_pair(0, &bodies[0], 1, &bodies[1]).unwrap();
    assert_relative_eq!(c.depth, 0.2, epsilon = 1e-12);

    resolver::resolve(&Contact::Pair(c), &mut bodies, 0.5, &Correction::default());

    assert_eq!(bodies[0].x, NVec3::zeros());
    assert_eq!(bodies[0].v, NVec3::zeros());
    // j = 1.5, so v = -1 + 1.5
    assert_relative_eq!(bodies[1].v, NVec3::new(0.5, 0.0, 0.0), epsilon = 1e-12);
    // push = (0.2 - 0.01) * 0.8
    assert_relative_eq!(bodies[1].x, NVec3::new(1.952, 0.0, 0.0), epsilon = 1e-12);
}

#[test]
fn elastic_equal_masses_swap_velocities() {
    let mover = |id: &str, x: f64, v: f64| {
        Body::builder(id, NVec3::new(x, 0.0, 0.0)).radius(1.0).velocity(NVec3::new(v, 0.0, 0.0)).build().unwrap()
    };
    let mut bodies = vec![mover("a", 0.0, 1.0), mover("b", 1.9, -1.0)];
    let c = collision::test_pair(0, &bodies[0], 1, &bodies[1]).unwrap();
    resolver::resolve(&Contact::Pair(c), &mut bodies, 1.0, &Correction::default());
    assert_relative_eq!(bodies[0].v.x, -1.0, epsilon = 1e-12);
    assert_relative_eq!(bodies[1].v.x, 1.0, epsilon = 1e-12);
}

#[test]
fn unequal_masses_match_total_mass_form() {
    let (ma, mb, e) = (1.0, 3.0, 0.5);
    let mut bodies = vec![
        Body::builder("a", NVec3::zeros()).radius(1.0).mass(ma).velocity(NVec3::new(2.0, 0.0, 0.0)).build().unwrap(),
        Body::builder("b", NVec3::new(1.9, 0.0, 0.0)).radius(1.0).mass(mb).build().unwrap(),
    ];
    let c = collision::test_pair(0, &bodies[0], 1, &bodies[1]).unwrap();
    resolver::resolve(&Contact::Pair(c), &mut bodies, e, &Correction::default());

    // dv_a = -(1 + e) mB / (mA + mB) * (vA - vB), and the mirror for b
    let closing = 2.0;
    assert_relative_eq!(bodies[0].v.x, 2.0 - (1.0 + e) * mb / (ma + mb) * closing, epsilon = 1e-12);
    assert_relative_eq!(bodies[1].v.x, (1.0 + e) * ma / (ma + mb) * closing, epsilon = 1e-12);
    assert_relative_eq!(ma * bodies[0].v.x + mb * bodies[1].v.x, ma * 2.0, epsilon = 1e-12);
}

#[test]
fn separating_pair_is_left_alone() {
    let mut bodies = vec![
        Body::builder("a", NVec3::zeros()).radius(1.0).velocity(NVec3::new(-1.0, 0.0, 0.0)).build().unwrap(),
        Body::builder("b", NVec3::new(1.5, 0.0, 0.0)).radius(1.0).velocity(NVec3::new(1.0, 0.0, 0.0)).build().unwrap(),
    ];
    let before: Vec<_> = bodies.iter().map(|b| (b.x, b.v)).collect();
    let c = collision::test_pair(0, &bodies[0], 1, &bodies[1]).unwrap();
    resolver::resolve(&Contact::Pair(c), &mut bodies, 0.5, &Correction::default());
    let after: Vec<_> = bodies.iter().map(|b| (b.x, b.v)).collect();
    assert_eq!(before, after);
}

#[test]
fn two_fixed_spheres_never_move() {
    let mut sys = system_of(vec![fixed_ball("a", [0.0; 3], 1.0), fixed_ball("b", [0.5, 0.0, 0.0], 1.0)]);
    let params = Parameters {
        gravity: NVec3::new(0.0, -9.81, 0.0),
        ..Parameters::default()
    };
    let mut engine = Engine::new(params, ForceSet::new().with(MolecularSpring));
    engine.run(&mut sys, 50);
    assert_eq!(sys.bodies[0].x, NVec3::zeros());
    assert_eq!(sys.bodies[1].x, NVec3::new(0.5, 0.0, 0.0));

    // direct resolver call is a no-op as well
    let c = collision::test_pair(0, &sys.bodies[0], 1, &sys.bodies[1]).unwrap();
    resolver::resolve(&Contact::Pair(c), &mut sys.bodies, 1.0, &Correction::default());
    assert_eq!(sys.bodies[1].x, NVec3::new(0.5, 0.0, 0.0));
}

// ==================================================================================
// Octree tests
// ==================================================================================

fn sorted(mut v: Vec<usize>) -> Vec<usize> {
    v.sort_unstable();
    v
}

#[test]
fn covering_query_returns_every_body_once() {
    let mut rng = test_rng();
    let mut tree = Octree::new(NVec3::repeat(-10.0), NVec3::repeat(10.0), 4, 6);
    let mut n = 0;
    // scattered
    for _ in 0..400 {
        let x = NVec3::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));
        tree.insert(n, x);
        n += 1;
    }
    // tightly clustered, including exact duplicates
    for k in 0..200 {
        tree.insert(n, NVec3::new(1.0, 1.0, 1.0) + NVec3::repeat((k % 3) as f64 * 1e-9));
        n += 1;
    }
    assert_eq!(tree.len(), n);
    assert_eq!(sorted(tree.query(&NVec3::zeros(), 100.0)), (0..n).collect::<Vec<_>>());
}

#[test]
fn max_depth_bounds_subdivision() {
    let mut tree = Octree::new(NVec3::repeat(-1.0), NVec3::repeat(1.0), 2, 4);
    for i in 0..100 {
        tree.insert(i, NVec3::new(0.3, 0.3, 0.3));
    }
    assert!(tree.max_depth_reached() <= 4);
    assert!(tree.nodes().iter().all(|n| n.depth <= 4));
    assert_eq!(tree.query(&NVec3::new(0.3, 0.3, 0.3), 0.01).len(), 100);
}

#[test]
fn query_is_superset_of_true_neighbours() {
    let mut rng = test_rng();
    let points: Vec<NVec3> = (0..300)
        .map(|_| NVec3::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0)))
        .collect();
    let mut tree = Octree::new(NVec3::repeat(-5.0), NVec3::repeat(5.0), 8, 8);
    for (i, p) in points.iter().enumerate() {
        tree.insert(i, *p);
    }
    let center = NVec3::new(0.5, -1.0, 2.0);
    let found = tree.query(&center, 1.5);
    for (i, p) in points.iter().enumerate() {
        if (p - center).norm() <= 1.5 {
            assert!(found.contains(&i), "missing neighbour {i}");
        }
    }
    assert!(found.len() < points.len());
}

#[test]
fn points_outside_root_are_kept() {
    let mut tree = Octree::new(NVec3::repeat(-1.0), NVec3::repeat(1.0), 1, 4);
    tree.insert(0, NVec3::new(0.5, 0.5, 0.5));
    tree.insert(1, NVec3::new(0.6, 0.6, 0.6));
    tree.insert(2, NVec3::new(50.0, 0.0, 0.0));
    assert_eq!(sorted(tree.query(&NVec3::zeros(), 1000.0)), vec![0, 1, 2]);
    tree.clear();
    assert!(tree.is_empty());
    assert_eq!(tree.node_count(), 1);
}

// ==================================================================================
// Engine / integrator tests
// ==================================================================================

fn spring_pair() -> System {
    let mut sys = system_of(vec![ball("a", [0.0; 3], 0.1, 1.0), ball("b", [1.5, 0.0, 0.0], 0.1, 1.0)]);
    sys.add_bond(Bond::new("a", "b", BondType::Single, 1.0, 10.0)).unwrap();
    sys
}

#[test]
fn verlet_spring_conserves_energy() {
    let mut sys = spring_pair();
    let mut params = quiet_params(1e-3);
    params.restitution = 1.0;
    let mut engine = Engine::new(params, ForceSet::new().with(MolecularSpring));

    let e0 = 0.5 * 10.0 * 0.25;
    let mut min_sep = f64::INFINITY;
    for _ in 0..5000 {
        let m = engine.step(&mut sys);
        assert_abs_diff_eq!(m.total_energy, e0, epsilon = 1e-3 * e0);
        min_sep = min_sep.min((sys.bodies[1].x - sys.bodies[0].x).norm());
    }
    // it actually oscillated through the rest length
    assert!(min_sep < 0.6);
}

#[test]
fn free_fall_matches_closed_form() {
    for integrator in [IntegratorConfig::Verlet, IntegratorConfig::Rk4, IntegratorConfig::Euler] {
        let mut sys = system_of(vec![ball("drop", [0.0, 100.0, 0.0], 0.1, 2.0)]);
        let params = Parameters {
            dt: 0.01,
            gravity: NVec3::new(0.0, -9.81, 0.0),
            integrator,
            ..Parameters::default()
        };
        let mut engine = Engine::new(params, ForceSet::new());
        engine.run(&mut sys, 100);

        let expected = 100.0 - 0.5 * 9.81;
        // semi-implicit Euler overshoots by g dt t / 2
        let tol = if integrator == IntegratorConfig::Euler { 0.06 } else { 1e-9 };
        assert_abs_diff_eq!(sys.bodies[0].x.y, expected, epsilon = tol);
        assert_relative_eq!(sys.t, 1.0, epsilon = 1e-9);
    }
}

#[test]
fn damping_and_velocity_clamp() {
    let mut sys = system_of(vec![Body::builder("a", NVec3::zeros())
        .velocity(NVec3::new(10.0, 0.0, 0.0))
        .damping(0.5, 0.0)
        .build()
        .unwrap()]);
    let mut params = quiet_params(0.1);
    params.damping = 0.5;
    let mut engine = Engine::new(params, ForceSet::new());
    engine.step(&mut sys);
    // factor 1 - (0.5 + 0.5) * 0.1
    assert_relative_eq!(sys.bodies[0].v.x, 9.0, epsilon = 1e-12);

    let mut sys = system_of(vec![Body::builder("fast", NVec3::zeros())
        .velocity(NVec3::new(300.0, 400.0, 0.0))
        .angular_velocity(NVec3::new(0.0, 0.0, 80.0))
        .build()
        .unwrap()]);
    let mut engine = Engine::new(quiet_params(1e-3), ForceSet::new());
    engine.step(&mut sys);
    assert_relative_eq!(sys.bodies[0].v.norm(), 100.0, epsilon = 1e-9);
    assert_relative_eq!(sys.bodies[0].w.norm(), 50.0, epsilon = 1e-9);
}

#[test]
fn spinning_body_turns() {
    let mut sys = system_of(vec![Body::builder("spin", NVec3::zeros())
        .angular_velocity(NVec3::new(0.0, 0.0, FRAC_PI_2))
        .build()
        .unwrap()]);
    let mut engine = Engine::new(quiet_params(1e-3), ForceSet::new());
    engine.run(&mut sys, 1000);
    let x = quaternion::rotate_vector(&sys.bodies[0].q, &NVec3::x());
    assert_relative_eq!(x, NVec3::y(), epsilon = 1e-3);
}

#[test]
fn octree_broad_phase_matches_all_pairs() {
    let mut rng = test_rng();
    let sys = system_of(
        (0..300)
            .map(|i| {
                let x = [rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0), rng.gen_range(-3.0..3.0)];
                ball(&format!("p{i}"), x, 0.3, 1.0)
            })
            .collect(),
    );
    let mut engine = Engine::new(Parameters::default(), ForceSet::new());
    let (checks, contacts) = engine.detect_collisions(&sys);

    let (brute_checks, brute) = brute_force_pairs(&sys.bodies);
    let mut from_tree: Vec<(usize, usize)> = contacts
        .iter()
        .filter_map(|c| match c {
            Contact::Pair(p) => Some((p.a.min(p.b), p.a.max(p.b))),
            Contact::Bounds(_) => None,
        })
        .collect();
    let mut expected: Vec<(usize, usize)> = brute.iter().map(|p| (p.a.min(p.b), p.a.max(p.b))).collect();
    from_tree.sort_unstable();
    expected.sort_unstable();

    assert!(!expected.is_empty());
    assert_eq!(from_tree, expected);
    assert!(checks < brute_checks);
}

#[test]
fn balls_settle_inside_bounds() {
    let mut sys = system_of(vec![
        ball("a", [0.0, 2.0, 0.0], 0.3, 1.0),
        ball("b", [0.1, 3.0, 0.0], 0.3, 1.0),
        ball("c", [-0.1, 4.0, 0.1], 0.3, 1.0),
    ]);
    let bounds = WorldBounds::new(NVec3::new(-1.0, 0.0, -1.0), NVec3::new(1.0, 5.0, 1.0));
    let params = Parameters {
        dt: 1.0 / 240.0,
        gravity: NVec3::new(0.0, -9.81, 0.0),
        restitution: 0.3,
        damping: 0.5,
        bounds: Some(bounds),
        ..Parameters::default()
    };
    let mut engine = Engine::new(params, ForceSet::new());
    let mut contacts = 0;
    for _ in 0..2400 {
        contacts += engine.step(&mut sys).contacts;
    }
    assert!(contacts > 0);
    for b in &sys.bodies {
        assert!(b.x.iter().all(|c| c.is_finite()));
        assert!(b.x.y > 0.2, "{} sank to {}", b.id, b.x.y);
        assert!(b.x.y < 5.0);
    }
}

#[test]
fn pair_push_into_floor_is_undone_the_same_step() {
    // a rests on the floor, b lands on it from above
    let mut sys = system_of(vec![
        ball("a", [0.0, 0.5, 0.0], 0.5, 1.0),
        Body::builder("b", NVec3::new(0.0, 1.3, 0.0))
            .radius(0.5)
            .velocity(NVec3::new(0.0, -1.0, 0.0))
            .build()
            .unwrap(),
    ]);
    let params = Parameters {
        dt: 1e-3,
        bounds: Some(WorldBounds::new(NVec3::new(-5.0, 0.0, -5.0), NVec3::new(5.0, 5.0, 5.0))),
        ..Parameters::default()
    };
    let mut engine = Engine::new(params, ForceSet::new());
    let m = engine.step(&mut sys);

    assert_eq!(m.contacts, 2);
    let a = &sys.bodies[0];
    assert!(a.x.y >= 0.5 - 1e-9, "a left inside the floor at y = {}", a.x.y);
    assert!(a.v.y >= 0.0);
}

#[test]
fn metrics_report_counts_and_temperature() {
    let mut sys = spring_pair();
    sys.bodies[0].v = NVec3::new(0.0, 0.0, 1.0);
    let mut engine = Engine::new(quiet_params(1e-4), ForceSet::new());
    let m = engine.step(&mut sys);
    assert_eq!(m.step, 1);
    assert_eq!(m.body_count, 2);
    assert_eq!(m.bond_count, 1);
    assert_eq!(m.collision_checks, 0);
    assert_relative_eq!(m.kinetic_energy, 0.5, epsilon = 1e-12);
    assert_relative_eq!(m.temperature, kinetic_temperature(0.5, 2, BOLTZMANN), epsilon = 1e-12);
    assert_relative_eq!(m.temperature, 1.0 / (6.0 * BOLTZMANN), epsilon = 1e-9);
    assert_relative_eq!(system_temperature(&sys), m.temperature, epsilon = 1e-12);
    assert_eq!(kinetic_temperature(1.0, 0, BOLTZMANN), 0.0);
}

#[test]
fn same_seed_same_trajectory() {
    let run = |seed: u64| {
        let mut sys = system_of(vec![ball("a", [0.0; 3], 0.1, 1.0), ball("b", [3.0, 0.0, 0.0], 0.1, 1.0)]);
        let params = Parameters {
            seed,
            ..quiet_params(1e-3)
        };
        let mut engine = Engine::new(params, ForceSet::new().with(BrownianMotion::new(300.0)));
        engine.run(&mut sys, 100);
        sys.bodies[0].x
    };
    assert_eq!(run(11), run(11));
    assert_ne!(run(11), run(12));
}

#[test]
fn empty_system_steps_cleanly() {
    let mut sys = System::new();
    let mut engine = Engine::new(Parameters::default(), ForceSet::new().with(LennardJones::default()));
    let m = engine.step(&mut sys);
    assert_eq!(m.body_count, 0);
    assert_eq!(m.contacts, 0);
}
