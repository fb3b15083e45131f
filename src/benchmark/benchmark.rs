use std::time::Instant;

use crate::error::SimResult;
use crate::math::NVec3;
use crate::simulation::collision::{brute_force_pairs, Contact};
use crate::simulation::engine::Engine;
use crate::simulation::forces::{ForceSet, LennardJones};
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, System};

/// One row of the broad-phase comparison
#[derive(Debug, Clone, Copy)]
pub struct BroadPhaseTiming {
    pub n: usize,
    pub brute_ms: f64,
    pub octree_ms: f64,
    pub brute_checks: usize,
    pub octree_checks: usize,
    pub brute_contacts: usize,
    pub octree_contacts: usize,
}

/// Helper to build a manual System of size `n`
///
/// Deterministic positions inside a cube of half-width 5, no rand needed.
pub fn make_system(n: usize, radius: f64) -> SimResult<System> {
    let mut sys = System::new();
    for i in 0..n {
        let i_f = i as f64;
        let x = NVec3::new(
            (i_f * 0.37).sin() * 5.0,
            (i_f * 0.13).cos() * 5.0,
            (i_f * 0.07).sin() * 5.0,
        );
        sys.add_body(Body::builder(format!("b{i}"), x).mass(1.0).radius(radius).build()?)?;
    }
    Ok(sys)
}

/// Time all-pairs against octree collision detection for each `n`
///
/// Both paths must find the same contacts; the octree path should run
/// far fewer narrow-phase tests.
pub fn bench_broad_phase(ns: &[usize]) -> SimResult<Vec<BroadPhaseTiming>> {
    let mut rows = Vec::with_capacity(ns.len());
    println!("N,brute_ms,octree_ms,brute_checks,octree_checks,contacts");

    for &n in ns {
        let sys = make_system(n, 0.05)?;
        let mut engine = Engine::new(Parameters::default(), ForceSet::new());

        // Warm up
        let _ = engine.detect_collisions(&sys);

        let t0 = Instant::now();
        let (brute_checks, brute) = brute_force_pairs(&sys.bodies);
        let brute_ms = t0.elapsed().as_secs_f64() * 1000.0;

        let t1 = Instant::now();
        let (octree_checks, contacts) = engine.detect_collisions(&sys);
        let octree_ms = t1.elapsed().as_secs_f64() * 1000.0;

        let octree_contacts = contacts.iter().filter(|c| matches!(c, Contact::Pair(_))).count();
        if octree_contacts != brute.len() {
            log::warn!("N = {n}: octree found {octree_contacts} contacts, brute force {}", brute.len());
        }

        println!("{},{:.6},{:.6},{},{},{}", n, brute_ms, octree_ms, brute_checks, octree_checks, brute.len());
        rows.push(BroadPhaseTiming {
            n,
            brute_ms,
            octree_ms,
            brute_checks,
            octree_checks,
            brute_contacts: brute.len(),
            octree_contacts,
        });
    }
    Ok(rows)
}

/// Mean wall-clock time of a full engine step (Verlet, Lennard-Jones, collisions)
/// Paste output directly into excel to graph
pub fn bench_step_curve(max_n: usize, step_n: usize, steps: usize) -> SimResult<Vec<(usize, f64)>> {
    let mut rows = Vec::new();
    println!("N,step_ms");

    for n in (step_n..=max_n).step_by(step_n.max(1)) {
        let mut sys = make_system(n, 0.05)?;
        let forces = ForceSet::new().with(LennardJones {
            cutoff: Some(1.0),
            sigma: 0.1,
            ..LennardJones::default()
        });
        let params = Parameters {
            dt: 1.0e-3,
            ..Parameters::default()
        };
        let mut engine = Engine::new(params, forces);
        engine.track_energy = false;

        let t0 = Instant::now();
        engine.run(&mut sys, steps.max(1));
        let ms = t0.elapsed().as_secs_f64() * 1000.0 / steps.max(1) as f64;

        println!("{},{:.6}", n, ms);
        rows.push((n, ms));
    }
    Ok(rows)
}
