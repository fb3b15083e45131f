//! Fixed-step time integrators
//!
//! Provides semi-implicit Euler, velocity-Verlet and classical RK4, all
//! driven by a `ForceSet` and `Parameters`. Fixed bodies are never moved.
//! Accelerations are always computed from a complete snapshot of the
//! system into a separate buffer before any body is updated.

use rand::rngs::StdRng;

use crate::configuration::config::IntegratorConfig;
use crate::math::NVec3;
use crate::simulation::forces::ForceSet;
use crate::simulation::params::Parameters;
use crate::simulation::states::System;

/// Advance the system by `params.dt` with the configured method
pub fn integrate(sys: &mut System, forces: &ForceSet, params: &Parameters, rng: &mut StdRng) {
    match params.integrator {
        IntegratorConfig::Euler => euler_integrator(sys, forces, params, rng),
        IntegratorConfig::Verlet => verlet_integrator(sys, forces, params, rng),
        IntegratorConfig::Rk4 => rk4_integrator(sys, forces, params, rng),
    }
}

/// Accelerations from the force set plus the uniform `params.gravity` field
///
/// Gravity is mass independent, so it is added directly instead of going
/// through a force term. Fixed bodies stay at zero.
pub fn accelerations(sys: &System, forces: &ForceSet, params: &Parameters, rng: &mut StdRng, out: &mut [NVec3]) {
    forces.accumulate_accels(sys, params, rng, out);
    if params.gravity == NVec3::zeros() {
        return;
    }
    for (b, a) in sys.bodies.iter().zip(out.iter_mut()) {
        if !b.fixed {
            *a += params.gravity;
        }
    }
}

/// Semi-implicit (symplectic) Euler: v += a dt, then x += v dt
pub fn euler_integrator(sys: &mut System, forces: &ForceSet, params: &Parameters, rng: &mut StdRng) {
    let n = sys.bodies.len();
    if n == 0 {
        return;
    }
    let dt = params.dt;

    let mut acc = vec![NVec3::zeros(); n];
    accelerations(&*sys, forces, params, rng, &mut acc);

    for (b, a) in sys.bodies.iter_mut().zip(acc.iter()) {
        b.a = *a;
        if b.fixed {
            continue;
        }
        b.v += dt * *a;
        b.x += dt * b.v;
    }

    sys.t += dt;
}

/// Advance the system by one step using velocity-Verlet
/// Uses two force evaluations per step
pub fn verlet_integrator(sys: &mut System, forces: &ForceSet, params: &Parameters, rng: &mut StdRng) {
    let n = sys.bodies.len();
    if n == 0 {
        return;
    }
    let dt = params.dt;
    let half_dt = 0.5 * dt;

    // a_n from x_n at time t_n
    let mut a_old = vec![NVec3::zeros(); n];
    accelerations(&*sys, forces, params, rng, &mut a_old);

    // Kick: v_n+1/2 = v_n + (dt/2) a_n
    // Drift: x_n+1 = x_n + dt v_n+1/2
    for (b, a) in sys.bodies.iter_mut().zip(a_old.iter()) {
        if b.fixed {
            continue;
        }
        b.v += half_dt * *a;
        b.x += dt * b.v;
    }

    sys.t += dt;

    // a_n+1 from x_n+1 at time t_n+1
    let mut a_new = vec![NVec3::zeros(); n];
    accelerations(&*sys, forces, params, rng, &mut a_new);

    // Second kick: v_n+1 = v_n+1/2 + (dt/2) a_n+1
    for (b, a) in sys.bodies.iter_mut().zip(a_new.iter()) {
        b.a = *a;
        if b.fixed {
            continue;
        }
        b.v += half_dt * *a;
    }
}

/// Classical 4th-order Runge-Kutta on the (x, v) state
///
/// Higher local accuracy per step than Verlet but not symplectic, and costs
/// four force evaluations.
pub fn rk4_integrator(sys: &mut System, forces: &ForceSet, params: &Parameters, rng: &mut StdRng) {
    let n = sys.bodies.len();
    if n == 0 {
        return;
    }
    let dt = params.dt;
    let t0 = sys.t;

    let x0: Vec<NVec3> = sys.bodies.iter().map(|b| b.x).collect();
    let v0: Vec<NVec3> = sys.bodies.iter().map(|b| b.v).collect();

    // scratch system used to evaluate forces at the intermediate states
    let mut scratch = sys.clone();

    let mut kx = [vec![NVec3::zeros(); n], vec![NVec3::zeros(); n], vec![NVec3::zeros(); n], vec![NVec3::zeros(); n]];
    let mut kv = kx.clone();

    let stages = [(0.0, 0.0), (0.5, 0.5), (0.5, 0.5), (1.0, 1.0)];
    for (s, &(t_frac, w)) in stages.iter().enumerate() {
        for (i, b) in scratch.bodies.iter_mut().enumerate() {
            if s == 0 || b.fixed {
                b.x = x0[i];
                b.v = v0[i];
            } else {
                b.x = x0[i] + kx[s - 1][i] * (w * dt);
                b.v = v0[i] + kv[s - 1][i] * (w * dt);
            }
        }
        scratch.t = t0 + t_frac * dt;

        accelerations(&scratch, forces, params, rng, &mut kv[s]);
        for (i, b) in scratch.bodies.iter().enumerate() {
            kx[s][i] = b.v;
        }
    }

    for (i, b) in sys.bodies.iter_mut().enumerate() {
        b.a = kv[0][i];
        if b.fixed {
            continue;
        }
        b.x = x0[i] + (kx[0][i] + kx[1][i] * 2.0 + kx[2][i] * 2.0 + kx[3][i]) * (dt / 6.0);
        b.v = v0[i] + (kv[0][i] + kv[1][i] * 2.0 + kv[2][i] * 2.0 + kv[3][i]) * (dt / 6.0);
    }

    sys.t = t0 + dt;
}
