// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Objective Value Trait
//!
//! Unified numeric bounds for objective values, bounds and selection scores.
//! Monte Carlo tree search normalizes objective values and computes
//! logarithms and square roots for its exploration term, so objectives are
//! floating point numbers. `ObjectiveValue` collects the required
//! capabilities into a single alias, which keeps the generic signatures in
//! the search crates short.
//!
//! Both `f32` and `f64` satisfy the trait; `f64` is the usual choice.
//!
//! Infinities are meaningful: `+inf` is the value of "no solution yet" and
//! `-inf` is the bound of a node that cannot bound its subtree. `NaN` is never
//! a valid objective; see `ObjectiveValue::is_valid_objective`.

use num_traits::{Float, FromPrimitive, ToPrimitive};

/// A trait alias for floating point types that can be used as objective values.
pub trait ObjectiveValue:
    Float + FromPrimitive + ToPrimitive + std::fmt::Debug + std::fmt::Display + Send + Sync + 'static
{
    /// Returns `true` if the value can take part in comparisons,
    /// i.e. it is not `NaN`. Infinite values are accepted.
    #[inline(always)]
    fn is_valid_objective(self) -> bool {
        !self.is_nan()
    }

    /// Converts a `f64` constant into this type.
    ///
    /// # Panics
    ///
    /// Panics if the constant cannot be represented, which cannot happen for
    /// `f32` and `f64`.
    #[inline(always)]
    fn constant(value: f64) -> Self {
        Self::from_f64(value).expect("objective value type must represent f64 constants")
    }
}

impl<T> ObjectiveValue for T where
    T: Float
        + FromPrimitive
        + ToPrimitive
        + std::fmt::Debug
        + std::fmt::Display
        + Send
        + Sync
        + 'static
{
}

#[cfg(test)]
mod tests {
    use super::ObjectiveValue;

    fn accepts<T: ObjectiveValue>(value: T) -> bool {
        value.is_valid_objective()
    }

    #[test]
    fn test_nan_is_not_a_valid_objective() {
        assert!(!accepts(f64::NAN));
        assert!(!accepts(f32::NAN));
    }

    #[test]
    fn test_infinities_are_valid_objectives() {
        assert!(accepts(f64::INFINITY));
        assert!(accepts(f64::NEG_INFINITY));
        assert!(accepts(-3.5f32));
    }

    #[test]
    fn test_constant_round_trips_for_f32_and_f64() {
        assert_eq!(<f64 as ObjectiveValue>::constant(0.25), 0.25);
        assert_eq!(<f32 as ObjectiveValue>::constant(0.5), 0.5f32);
    }

    #[test]
    fn test_constant_keeps_infinities() {
        assert_eq!(<f64 as ObjectiveValue>::constant(f64::NEG_INFINITY), f64::NEG_INFINITY);
        assert_eq!(<f32 as ObjectiveValue>::constant(f64::NEG_INFINITY), f32::NEG_INFINITY);
        assert_eq!(<f32 as ObjectiveValue>::constant(f64::INFINITY), f32::INFINITY);
    }
}
