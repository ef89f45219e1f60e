//! Scalar math for the ship engine.
//!
//! `core` has no square root or sine, so those go through `libm`. The
//! engine runs on `f32`; the vector types are written against [`Float`].

use core::ops::{Add, Div, Mul, Neg, Sub};

pub trait Float:
    Copy
    + PartialOrd
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + Default
    + core::fmt::Debug
{
    const ZERO: Self;
    const ONE: Self;
    /// Lengths below this normalize to the zero vector.
    const TINY: Self;

    fn pi() -> Self;
    fn sqrt(self) -> Self;
    fn sin(self) -> Self;
    fn abs(self) -> Self;
    fn min(self, other: Self) -> Self;
    fn max(self, other: Self) -> Self;

    fn clamp(self, min: Self, max: Self) -> Self {
        self.max(min).min(max)
    }

    /// `self + (other - self) * t`
    fn lerp(self, other: Self, t: Self) -> Self {
        self + (other - self) * t
    }

    fn is_near_zero(self, epsilon: Self) -> bool {
        self.abs() < epsilon
    }
}

impl Float for f32 {
    const ZERO: Self = 0.0;
    const ONE: Self = 1.0;
    const TINY: Self = 1e-10;

    fn pi() -> Self {
        core::f32::consts::PI
    }

    fn sqrt(self) -> Self {
        libm::sqrtf(self)
    }

    fn sin(self) -> Self {
        libm::sinf(self)
    }

    fn abs(self) -> Self {
        libm::fabsf(self)
    }

    fn min(self, other: Self) -> Self {
        libm::fminf(self, other)
    }

    fn max(self, other: Self) -> Self {
        libm::fmaxf(self, other)
    }
}
