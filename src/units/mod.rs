use std::f64::consts::{FRAC_PI_2, PI, TAU};

use rand::Rng;

pub const KM_PER_AU: f64 = 149_597_870.7;
pub const EARTH_RADIUS_KM: f64 = 6371.0;
pub const EARTH_RADIUS_AU: f64 = EARTH_RADIUS_KM / KM_PER_AU;

pub fn km_to_au(km: f64) -> f64 {
    km / KM_PER_AU
}

pub fn au_to_km(au: f64) -> f64 {
    au * KM_PER_AU
}

/// Samples a longitude-like `theta` in [0, 2π) and a latitude-like `phi` in
/// [-π/2, π/2).
///
/// This only spreads points visually around the origin; it is not an orbital
/// position. Seed the generator for reproducible output.
pub fn sample_direction<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    let theta = rng.gen_range(0.0..TAU);
    let phi = rng.gen_range(-FRAC_PI_2..FRAC_PI_2);
    (theta, phi)
}

/// `phi` is measured from the equatorial plane, so `z = r·sin(phi)`.
pub fn spherical_to_cartesian(radius: f64, theta: f64, phi: f64) -> [f64; 3] {
    let (sin_phi, cos_phi) = phi.sin_cos();
    let (sin_theta, cos_theta) = theta.sin_cos();
    [
        radius * cos_phi * cos_theta,
        radius * cos_phi * sin_theta,
        radius * sin_phi,
    ]
}

/// `n` evenly spaced samples over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Longitude samples for a full turn, latitude samples pole to pole.
pub fn sphere_angles(resolution: usize) -> (Vec<f64>, Vec<f64>) {
    (linspace(0.0, TAU, resolution), linspace(0.0, PI, resolution))
}
