/// Tolerance used when comparing texture coordinates of vertices.
pub(crate) const EPSILON5: f64 = 1e-5;

pub(crate) fn equals_epsilon(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON5
}

pub(crate) fn inverse_mix(a: f64, b: f64, value: f64) -> f64 {
    ((value - a) / (b - a)).clamp(0.0, 1.0)
}

pub(crate) fn mix(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
