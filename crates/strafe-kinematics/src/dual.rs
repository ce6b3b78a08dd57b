//! Dual numbers: a value carried together with its time derivatives.

use core::fmt;
use core::ops::{Add, Div, Index, Mul, Neg, Sub};
use libm::{cos, sin};

/// A real value paired with its first `N - 1` derivatives.
///
/// Coefficient `0` is the value and coefficient `k` is the `k`-th derivative
/// with respect to a shared parameter (time, in this workspace). Arithmetic
/// follows the sum, product and chain rules, so any quantity built from dual
/// inputs carries the exact derivatives of the combined expression.
///
/// `DualNum` is a plain `Copy` value and never allocates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualNum<const N: usize> {
    values: [f64; N],
}

impl<const N: usize> DualNum<N> {
    /// Construct a dual number from its raw coefficients.
    pub const fn new(values: [f64; N]) -> Self {
        DualNum { values }
    }

    /// A constant: the given value with all derivatives zero.
    pub fn constant(value: f64) -> Self {
        let mut values = [0.0; N];
        if let Some(first) = values.first_mut() {
            *first = value;
        }
        DualNum { values }
    }

    /// The independent variable itself: the given value with unit first
    /// derivative and zero higher derivatives.
    pub fn variable(value: f64) -> Self {
        let mut values = [0.0; N];
        if let Some(first) = values.first_mut() {
            *first = value;
        }
        if let Some(second) = values.get_mut(1) {
            *second = 1.0;
        }
        DualNum { values }
    }

    /// The value coefficient.
    ///
    /// # Panics
    ///
    /// Panics if `N == 0`.
    pub fn value(&self) -> f64 {
        self.values[0]
    }

    /// The `i`-th coefficient (`0` is the value).
    ///
    /// # Panics
    ///
    /// Panics if `i >= N`.
    pub fn get(&self, i: usize) -> f64 {
        self.values[i]
    }

    /// All coefficients, value first.
    pub fn values(&self) -> &[f64; N] {
        &self.values
    }

    /// Replace the value coefficient while keeping every derivative.
    pub fn with_value(mut self, value: f64) -> Self {
        if let Some(first) = self.values.first_mut() {
            *first = value;
        }
        self
    }

    /// Drop the value coefficient, leaving the derivative as a dual number
    /// one order shorter. `M` must equal `N - 1`.
    pub fn drop_first<const M: usize>(&self) -> DualNum<M> {
        const { assert!(M + 1 == N, "drop_first removes exactly one coefficient") };
        let mut values = [0.0; M];
        values.copy_from_slice(&self.values[1..]);
        DualNum { values }
    }

    /// Keep only the first `M` coefficients. `M` must not exceed `N`.
    pub fn truncate<const M: usize>(&self) -> DualNum<M> {
        const { assert!(M <= N, "cannot truncate to more coefficients than are held") };
        let mut values = [0.0; M];
        values.copy_from_slice(&self.values[..M]);
        DualNum { values }
    }

    /// Prepend `value` to `tail`, the inverse of [`DualNum::drop_first`].
    /// `M` must equal `N - 1`.
    pub fn cons<const M: usize>(value: f64, tail: DualNum<M>) -> Self {
        const { assert!(M + 1 == N, "cons adds exactly one coefficient") };
        let mut values = [0.0; N];
        values[0] = value;
        values[1..].copy_from_slice(&tail.values);
        DualNum { values }
    }

    /// Sine, with derivatives from the chain rule.
    pub fn sin(self) -> Self {
        let x = self.value();
        let (s, c) = (sin(x), cos(x));
        self.compose([s, c, -s, -c])
    }

    /// Cosine, with derivatives from the chain rule.
    pub fn cos(self) -> Self {
        let x = self.value();
        let (s, c) = (sin(x), cos(x));
        self.compose([c, -s, -c, s])
    }

    /// Apply an outer function `f` to `self = g(t)`, given `f` and its first
    /// three derivatives evaluated at `g(t)` (Faà di Bruno up to third order).
    fn compose(self, f: [f64; 4]) -> Self {
        const { assert!(N <= 4, "function composition is tracked up to the third derivative") };
        let g = &self.values;
        let mut out = [0.0; N];
        for (k, slot) in out.iter_mut().enumerate() {
            *slot = match k {
                0 => f[0],
                1 => f[1] * g[1],
                2 => f[2] * g[1] * g[1] + f[1] * g[2],
                _ => f[3] * g[1] * g[1] * g[1] + 3.0 * f[2] * g[1] * g[2] + f[1] * g[3],
            };
        }
        DualNum { values: out }
    }
}

impl<const N: usize> Default for DualNum<N> {
    fn default() -> Self {
        DualNum { values: [0.0; N] }
    }
}

impl<const N: usize> Index<usize> for DualNum<N> {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.values[i]
    }
}

impl<const N: usize> Add for DualNum<N> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        for (a, b) in self.values.iter_mut().zip(rhs.values) {
            *a += b;
        }
        self
    }
}

impl<const N: usize> Sub for DualNum<N> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        for (a, b) in self.values.iter_mut().zip(rhs.values) {
            *a -= b;
        }
        self
    }
}

impl<const N: usize> Neg for DualNum<N> {
    type Output = Self;

    fn neg(mut self) -> Self {
        for a in self.values.iter_mut() {
            *a = -*a;
        }
        self
    }
}

/// Product rule generalized to higher orders (Leibniz):
/// `(ab)^(k) = Σ C(k, i) a^(i) b^(k-i)`.
impl<const N: usize> Mul for DualNum<N> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let mut out = [0.0; N];
        for (k, slot) in out.iter_mut().enumerate() {
            let mut binomial = 1.0;
            for i in 0..=k {
                *slot += binomial * self.values[i] * rhs.values[k - i];
                binomial = binomial * (k - i) as f64 / (i + 1) as f64;
            }
        }
        DualNum { values: out }
    }
}

impl<const N: usize> Mul<f64> for DualNum<N> {
    type Output = Self;

    fn mul(mut self, rhs: f64) -> Self {
        for a in self.values.iter_mut() {
            *a *= rhs;
        }
        self
    }
}

impl<const N: usize> Div<f64> for DualNum<N> {
    type Output = Self;

    fn div(mut self, rhs: f64) -> Self {
        for a in self.values.iter_mut() {
            *a /= rhs;
        }
        self
    }
}

/// Adding a plain number shifts the value only.
impl<const N: usize> Add<f64> for DualNum<N> {
    type Output = Self;

    fn add(self, rhs: f64) -> Self {
        let value = self.value() + rhs;
        self.with_value(value)
    }
}

impl<const N: usize> Sub<f64> for DualNum<N> {
    type Output = Self;

    fn sub(self, rhs: f64) -> Self {
        self + -rhs
    }
}

impl<const N: usize> fmt::Display for DualNum<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, v) in self.values.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:.4}", v)?;
        }
        write!(f, "]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_constant_and_variable() {
        let c = DualNum::<3>::constant(2.5);
        assert_eq!(c.values(), &[2.5, 0.0, 0.0]);
        let t = DualNum::<3>::variable(1.0);
        assert_eq!(t.values(), &[1.0, 1.0, 0.0]);
        let one = DualNum::<1>::variable(4.0);
        assert_eq!(one.values(), &[4.0]);
    }

    #[test]
    fn test_add_sub_scale() {
        let a = DualNum::new([1.0, 2.0, 3.0]);
        let b = DualNum::new([0.5, -1.0, 4.0]);
        assert_eq!((a + b).values(), &[1.5, 1.0, 7.0]);
        assert_eq!((a - b).values(), &[0.5, 3.0, -1.0]);
        assert_eq!((a * 2.0).values(), &[2.0, 4.0, 6.0]);
        assert_eq!((-a).values(), &[-1.0, -2.0, -3.0]);
        // Adding a plain number only moves the value
        assert_eq!((a + 10.0).values(), &[11.0, 2.0, 3.0]);
    }

    #[test]
    fn test_product_rule() {
        // x(t) = t, y(t) = t^2 at t = 3  =>  x*y = t^3
        // (t^3)' = 3t^2 = 27, (t^3)'' = 6t = 18
        let t = 3.0;
        let x = DualNum::new([t, 1.0, 0.0]);
        let y = DualNum::new([t * t, 2.0 * t, 2.0]);
        let p = x * y;
        assert!((p[0] - 27.0).abs() < EPSILON);
        assert!((p[1] - 27.0).abs() < EPSILON);
        assert!((p[2] - 18.0).abs() < EPSILON);
    }

    #[test]
    fn test_third_order_product() {
        // t^2 * t^2 = t^4 at t = 2: value 16, d1 = 4t^3 = 32, d2 = 12t^2 = 48, d3 = 24t = 48
        let sq = DualNum::new([4.0, 4.0, 2.0, 0.0]);
        let p = sq * sq;
        assert!((p[0] - 16.0).abs() < EPSILON);
        assert!((p[1] - 32.0).abs() < EPSILON);
        assert!((p[2] - 48.0).abs() < EPSILON);
        assert!((p[3] - 48.0).abs() < EPSILON);
    }

    #[test]
    fn test_chain_rule_sin_cos() {
        // g(t) = 2t at t = 0.4, sin(g)' = 2cos(2t), sin(g)'' = -4 sin(2t)
        let t = 0.4;
        let g = DualNum::new([2.0 * t, 2.0, 0.0]);
        let s = g.sin();
        assert!((s[0] - sin(0.8)).abs() < EPSILON);
        assert!((s[1] - 2.0 * cos(0.8)).abs() < EPSILON);
        assert!((s[2] + 4.0 * sin(0.8)).abs() < EPSILON);

        let c = g.cos();
        assert!((c[0] - cos(0.8)).abs() < EPSILON);
        assert!((c[1] + 2.0 * sin(0.8)).abs() < EPSILON);
        assert!((c[2] + 4.0 * cos(0.8)).abs() < EPSILON);
    }

    #[test]
    fn test_sin_squared_plus_cos_squared_is_constant() {
        let g = DualNum::new([1.3, -0.7, 2.1, 0.4]);
        let sum = g.sin() * g.sin() + g.cos() * g.cos();
        assert!((sum[0] - 1.0).abs() < EPSILON);
        for k in 1..4 {
            assert!(sum[k].abs() < EPSILON);
        }
    }

    #[test]
    fn test_drop_cons_truncate() {
        let a = DualNum::new([1.0, 2.0, 3.0]);
        let tail: DualNum<2> = a.drop_first();
        assert_eq!(tail.values(), &[2.0, 3.0]);
        let head: DualNum<2> = a.truncate();
        assert_eq!(head.values(), &[1.0, 2.0]);
        let rebuilt = DualNum::<3>::cons(1.0, tail);
        assert_eq!(rebuilt, a);
        assert_eq!(a.with_value(9.0).values(), &[9.0, 2.0, 3.0]);
    }
}
