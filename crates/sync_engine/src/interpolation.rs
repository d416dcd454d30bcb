//! Interpolation contract used by linear retrieval.
//!
//! Linear blending is generalised to any payload that can express
//! `plus(base, delta)` and `between(from, to)`, where the delta (tangent)
//! can be scaled by a real ratio. Arithmetic payloads use `+`/`-`; rotations
//! and poses blend along the geodesic through the exponential map.

use nalgebra::{
    DVector, Isometry3, RealField, SVector, Translation3, UnitQuaternion, Vector3, Vector6,
};

/// Tangent values that can be scaled by a real-valued ratio.
pub trait Scalable {
    fn scaled(&self, ratio: f64) -> Self;
}

/// Payloads that can be linearly blended.
///
/// For any `a`, `b`: `a.plus(&Self::between(a, b))` should reproduce `b`,
/// and `a.plus(&Self::between(a, b).scaled(0.0))` should reproduce `a`.
pub trait Interpolate: Sized {
    type Tangent: Scalable;

    /// Displacement taking `from` to `to`.
    fn between(from: &Self, to: &Self) -> Self::Tangent;

    /// Apply a displacement to `self`.
    fn plus(&self, delta: &Self::Tangent) -> Self;

    /// Blend `ratio` of the way from `low` to `high`.
    fn interpolate(low: &Self, high: &Self, ratio: f64) -> Self {
        low.plus(&Self::between(low, high).scaled(ratio))
    }

    /// Runtime width for dynamically sized payloads. Values blended together
    /// must agree on it; fixed-size payloads return `None`.
    fn width(&self) -> Option<usize> {
        None
    }
}

macro_rules! impl_scalar_interpolate {
    ($($ty:ty),+) => {
        $(
            impl Scalable for $ty {
                #[inline]
                fn scaled(&self, ratio: f64) -> Self {
                    (*self as f64 * ratio) as $ty
                }
            }

            impl Interpolate for $ty {
                type Tangent = $ty;

                #[inline]
                fn between(from: &Self, to: &Self) -> Self {
                    to - from
                }

                #[inline]
                fn plus(&self, delta: &Self) -> Self {
                    self + delta
                }
            }
        )+
    };
}

impl_scalar_interpolate!(f32, f64);

impl<T: RealField + Copy, const D: usize> Scalable for SVector<T, D> {
    fn scaled(&self, ratio: f64) -> Self {
        self * nalgebra::convert::<f64, T>(ratio)
    }
}

impl<T: RealField + Copy, const D: usize> Interpolate for SVector<T, D> {
    type Tangent = SVector<T, D>;

    fn between(from: &Self, to: &Self) -> Self::Tangent {
        to - from
    }

    fn plus(&self, delta: &Self::Tangent) -> Self {
        self + delta
    }
}

impl<T: RealField + Copy> Scalable for DVector<T> {
    fn scaled(&self, ratio: f64) -> Self {
        self * nalgebra::convert::<f64, T>(ratio)
    }
}

/// Both vectors must have the same length.
impl<T: RealField + Copy> Interpolate for DVector<T> {
    type Tangent = DVector<T>;

    fn between(from: &Self, to: &Self) -> Self::Tangent {
        to - from
    }

    fn plus(&self, delta: &Self::Tangent) -> Self {
        self + delta
    }

    fn width(&self) -> Option<usize> {
        Some(self.len())
    }
}

/// Rotation blend: `between = log(from⁻¹ · to)`, `plus = a · exp(δ)`.
///
/// The tangent is the scaled rotation axis, always the shortest arc.
impl<T: RealField + Copy> Interpolate for UnitQuaternion<T> {
    type Tangent = Vector3<T>;

    fn between(from: &Self, to: &Self) -> Self::Tangent {
        (from.inverse() * to).scaled_axis()
    }

    fn plus(&self, delta: &Self::Tangent) -> Self {
        self * UnitQuaternion::from_scaled_axis(*delta)
    }
}

/// Rigid pose blend with the tangent laid out as `[translation; rotation]`.
///
/// Translation and rotation of the relative pose blend independently:
/// the relative translation is scaled linearly in the frame of `from`.
impl<T: RealField + Copy> Interpolate for Isometry3<T> {
    type Tangent = Vector6<T>;

    fn between(from: &Self, to: &Self) -> Self::Tangent {
        let relative = from.inverse() * to;
        let t = relative.translation.vector;
        let r = relative.rotation.scaled_axis();
        Vector6::new(t.x, t.y, t.z, r.x, r.y, r.z)
    }

    fn plus(&self, delta: &Self::Tangent) -> Self {
        let step = Isometry3::from_parts(
            Translation3::new(delta[0], delta[1], delta[2]),
            UnitQuaternion::from_scaled_axis(Vector3::new(delta[3], delta[4], delta[5])),
        );
        self * step
    }
}
