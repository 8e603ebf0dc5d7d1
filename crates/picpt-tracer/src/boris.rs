//! Boris particle push.
//!
//! The field passed in is already multiplied by the charge-to-mass ratio,
//! so the update is written for unit `q/m`.

use picpt_core::{FieldSample, Particle};

#[inline]
fn add(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
fn scale(a: [f64; 3], s: f64) -> [f64; 3] {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Advance one particle by `dt` in the local field.
///
/// With `dt2 = dt / 2`:
///
/// 1. `v⁻ = v + E·dt2`
/// 2. `h = |B|²·dt2²`
/// 3. `u = v⁻ + (v⁻ × B)·dt2`
/// 4. `v⁺ = v⁻ + (u × B)·dt/(1 + h) + E·dt2`
/// 5. `x' = x + v⁺·dt`
///
/// A negative `dt` integrates backward in time.
pub fn boris_push(particle: Particle, field: &FieldSample, dt: f64) -> Particle {
    let dt2 = 0.5 * dt;
    let b = field.b();
    let e = field.e();

    let v_minus = add(particle.velocity, scale(e, dt2));
    let h = dot(b, b) * dt2 * dt2;
    let u = add(v_minus, scale(cross(v_minus, b), dt2));
    let v_plus = add(
        add(v_minus, scale(cross(u, b), dt / (1.0 + h))),
        scale(e, dt2),
    );
    let position = add(particle.position, scale(v_plus, dt));
    Particle::new(position, v_plus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn free_particle_drifts() {
        let p = Particle::new([1.0, 2.0, 3.0], [0.5, -1.0, 2.0]);
        let q = boris_push(p, &FieldSample::ZERO, 0.1);
        assert_eq!(q.velocity, p.velocity);
        assert!((q.position[0] - 1.05).abs() < 1e-12);
        assert!((q.position[1] - 1.9).abs() < 1e-12);
        assert!((q.position[2] - 3.2).abs() < 1e-12);
    }

    #[test]
    fn electric_field_accelerates() {
        let field = FieldSample::from_vectors([0.0; 3], [2.0, 0.0, -1.0]);
        let q = boris_push(Particle::new([0.0; 3], [0.0; 3]), &field, 0.5);
        assert_eq!(q.velocity, [1.0, 0.0, -0.5]);
        assert_eq!(q.position, [0.5, 0.0, -0.25]);
    }

    #[test]
    fn magnetic_field_rotates_about_b() {
        // Bz only: vz unchanged, vx/vy rotate.
        let field = FieldSample::from_vectors([0.0, 0.0, 1.0], [0.0; 3]);
        let q = boris_push(Particle::new([0.0; 3], [1.0, 0.0, 0.7]), &field, 0.2);
        assert_eq!(q.velocity[2], 0.7);
        assert!(q.velocity[1] < 0.0);
        let planar = (q.velocity[0].powi(2) + q.velocity[1].powi(2)).sqrt();
        assert!((planar - 1.0).abs() < 1e-12);
    }

    #[test]
    fn backward_step_undoes_forward_step() {
        let field = FieldSample::from_vectors([0.3, -0.2, 1.1], [0.0; 3]);
        let p = Particle::new([1.0, 0.0, -1.0], [0.2, 0.4, -0.1]);
        let q = boris_push(p, &field, 0.05);
        // Rewinding the velocity with -dt recovers it (E = 0 rotation is exact).
        let back = boris_push(Particle::new(q.position, q.velocity), &field, -0.05);
        for k in 0..3 {
            assert!((back.velocity[k] - p.velocity[k]).abs() < 1e-12);
        }
    }

    proptest! {
        #[test]
        fn pure_magnetic_push_preserves_speed(
            v in prop::array::uniform3(-10.0f64..10.0),
            b in prop::array::uniform3(-10.0f64..10.0),
            dt in -1.0f64..1.0,
        ) {
            let p = Particle::new([0.0; 3], v);
            let q = boris_push(p, &FieldSample::from_vectors(b, [0.0; 3]), dt);
            let before = p.speed();
            let after = q.speed();
            prop_assert!((after - before).abs() <= 1e-10 * before.max(1.0));
        }
    }
}
