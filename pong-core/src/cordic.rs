//! Integer-only CORDIC sin/cos in Q16.16.
//!
//! Eight shift-add iterations give ~0.23° of angular precision, which is
//! plenty for rebound angles bounded to ±60°. The atan table and the gain
//! constant are hardcoded; recomputing them from a floating-point library at
//! runtime is exactly the kind of platform dependence this module exists to
//! avoid.

use crate::fixed::{fx_abs, Fx};

/// π in Q16.16.
pub const PI_Q16: Fx = 205887;

const ITER: usize = 8;

/// atan(2^-i) in Q16.16, i = 0..8.
const ATAN_Q16: [Fx; ITER] = [51472, 30386, 16055, 8150, 4091, 2047, 1024, 512];

/// CORDIC gain correction 1/K in Q16.16 for 8 iterations.
const K_Q16: Fx = 39797;

/// Degrees to Q16.16 radians, integer-only: `deg * PI / 180`.
#[inline(always)]
pub const fn deg_to_rad_q16(deg: i32) -> Fx {
    (deg as i64 * PI_Q16) / 180
}

/// Returns `(sin, cos)` of a Q16.16 radian angle, `|angle| <= 8π`.
///
/// Odd symmetry is exact: negative angles rotate the mirrored positive angle
/// and negate sin, so `sin(-a) == -sin(a)` bit-for-bit on every platform.
#[inline(always)]
pub fn sin_cos(angle: Fx) -> (Fx, Fx) {
    assert!(
        fx_abs(angle) <= PI_Q16 * 8,
        "CORDIC: |angle| must be <= 8π"
    );
    if angle < 0 {
        let (s, c) = rotate(-angle);
        (-s, c)
    } else {
        rotate(angle)
    }
}

fn rotate(angle: Fx) -> (Fx, Fx) {
    let mut x = K_Q16;
    let mut y: Fx = 0;
    let mut z = angle;
    for (i, &atan) in ATAN_Q16.iter().enumerate() {
        let d: Fx = if z >= 0 { 1 } else { -1 };
        let xs = x >> i;
        let ys = y >> i;
        x -= d * ys;
        y += d * xs;
        z -= d * atan;
    }
    (y, x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::FX_ONE;

    // sin(45°) = cos(45°) = 0.7071067811865476 → 46341 in Q16.16
    const SQRT_HALF_Q16: Fx = 46341;

    #[test]
    fn table_constants_are_fixed() {
        assert_eq!(K_Q16, 39797);
        assert_eq!(ATAN_Q16[0], 51472);
    }

    #[test]
    fn forty_five_degrees() {
        let (s, c) = sin_cos(deg_to_rad_q16(45));
        assert!((s - SQRT_HALF_Q16).abs() < 512, "sin(45°) = {s}");
        assert!((c - SQRT_HALF_Q16).abs() < 512, "cos(45°) = {c}");
    }

    #[test]
    fn unit_magnitude_across_game_range() {
        // sin² + cos² within 1e-2 of one, over the full rebound range.
        for deg in -60..=60 {
            let (s, c) = sin_cos(deg_to_rad_q16(deg));
            let mag = (((s as i128) * (s as i128) + (c as i128) * (c as i128))
                >> 16) as i64;
            assert!(
                (mag - FX_ONE).abs() <= 655,
                "sin²+cos² off at {deg}°: {mag}"
            );
        }
    }

    #[test]
    fn sine_is_exactly_odd() {
        for deg in 0..=60 {
            let a = deg_to_rad_q16(deg);
            let (s_pos, c_pos) = sin_cos(a);
            let (s_neg, c_neg) = sin_cos(-a);
            assert_eq!(s_neg, -s_pos);
            assert_eq!(c_neg, c_pos);
        }
    }

    #[test]
    fn zero_angle_residual_is_small() {
        // The rotation never lands exactly on zero; the residual stays well
        // under the 0.23° iteration precision.
        let (s, c) = sin_cos(0);
        assert!(s.abs() < 512, "sin(0) = {s}");
        assert!((c - FX_ONE).abs() < 512, "cos(0) = {c}");
    }

    #[test]
    fn degree_conversion_is_integer_only() {
        assert_eq!(deg_to_rad_q16(180), PI_Q16);
        assert_eq!(deg_to_rad_q16(-180), -PI_Q16);
        assert_eq!(deg_to_rad_q16(0), 0);
    }
}
