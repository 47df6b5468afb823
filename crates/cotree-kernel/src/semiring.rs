//! Semirings: the coefficient algebra of weighted coproducts.
//!
//! A semiring is passed around as a *value* implementing [`Semiring`], so
//! instances can carry data (the polynomial semiring carries its key monoid
//! and coefficient semiring). The engine touches coefficients only through
//! the trait.
//!
//! Every instance supplies its own [`Semiring::is_zero`]; normalization
//! never relies on structural equality with a freshly built zero.

use crate::error::CotreeError;
use crate::rational::Rational;
use num_bigint::{BigInt, BigUint};
use num_traits::Zero;
use std::collections::BTreeMap;
use std::fmt;

/// Additive identity, multiplicative identity, and the two operations.
///
/// Callers are responsible for the algebraic laws; the engine only relies
/// on `add` being associative and commutative when merging terms.
pub trait Semiring {
    type Elem: Clone + fmt::Debug + PartialEq;

    /// Short identifier used in diagnostics.
    fn name(&self) -> &'static str;

    fn zero(&self) -> Self::Elem;

    fn one(&self) -> Self::Elem;

    fn add(&self, x: &Self::Elem, y: &Self::Elem) -> Self::Elem;

    fn mul(&self, x: &Self::Elem, y: &Self::Elem) -> Self::Elem;

    /// Semantic test for the additive identity.
    fn is_zero(&self, x: &Self::Elem) -> bool;

    /// Exact division by a positive integer.
    ///
    /// Only orbit normalization needs this. Semirings without exact
    /// division keep the default, which refuses.
    fn divide_by(&self, x: &Self::Elem, n: &BigUint) -> Result<Self::Elem, CotreeError> {
        let _ = x;
        Err(CotreeError::InexactDivision {
            semiring: self.name(),
            divisor: n.to_string(),
        })
    }

    /// Fold `add` over `items`, starting from `zero`.
    fn sum<'a, I>(&self, items: I) -> Self::Elem
    where
        I: IntoIterator<Item = &'a Self::Elem>,
        Self::Elem: 'a,
    {
        items
            .into_iter()
            .fold(self.zero(), |acc, x| self.add(&acc, x))
    }
}

// ─── Scalar instances ───────────────────────────────────────────────────────

fn saturated(op: &'static str, x: u64, y: u64) -> u64 {
    tracing::warn!(op, x, y, "natural overflow, saturating at u64::MAX");
    u64::MAX
}

/// Natural numbers as `u64`.
///
/// Sums and products saturate at `u64::MAX` instead of wrapping, and log a
/// warning when they do. Use [`Integer`] when weights can grow that large.
#[derive(Debug, Clone, Copy, Default)]
pub struct Natural;

impl Semiring for Natural {
    type Elem = u64;

    fn name(&self) -> &'static str {
        "nat"
    }

    fn zero(&self) -> u64 {
        0
    }

    fn one(&self) -> u64 {
        1
    }

    fn add(&self, x: &u64, y: &u64) -> u64 {
        x.checked_add(*y).unwrap_or_else(|| saturated("add", *x, *y))
    }

    fn mul(&self, x: &u64, y: &u64) -> u64 {
        x.checked_mul(*y).unwrap_or_else(|| saturated("mul", *x, *y))
    }

    fn is_zero(&self, x: &u64) -> bool {
        *x == 0
    }
}

/// Unbounded integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct Integer;

impl Semiring for Integer {
    type Elem = BigInt;

    fn name(&self) -> &'static str {
        "int"
    }

    fn zero(&self) -> BigInt {
        BigInt::zero()
    }

    fn one(&self) -> BigInt {
        BigInt::from(1)
    }

    fn add(&self, x: &BigInt, y: &BigInt) -> BigInt {
        x + y
    }

    fn mul(&self, x: &BigInt, y: &BigInt) -> BigInt {
        x * y
    }

    fn is_zero(&self, x: &BigInt) -> bool {
        x.is_zero()
    }
}

/// Exact rationals. The only scalar instance with exact division.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rationals;

impl Semiring for Rationals {
    type Elem = Rational;

    fn name(&self) -> &'static str {
        "rat"
    }

    fn zero(&self) -> Rational {
        Rational::zero()
    }

    fn one(&self) -> Rational {
        Rational::one()
    }

    fn add(&self, x: &Rational, y: &Rational) -> Rational {
        x + y
    }

    fn mul(&self, x: &Rational, y: &Rational) -> Rational {
        x * y
    }

    fn is_zero(&self, x: &Rational) -> bool {
        x.is_zero()
    }

    fn divide_by(&self, x: &Rational, n: &BigUint) -> Result<Rational, CotreeError> {
        x.checked_div(&Rational::from_integer(BigInt::from(n.clone())))
    }
}

// ─── Polynomials over monoid keys ───────────────────────────────────────────

/// A monoid on keys: an empty element and an associative `concat`.
pub trait Monoid {
    type Key: Clone + Ord + fmt::Debug;

    fn empty(&self) -> Self::Key;

    fn concat(&self, a: &Self::Key, b: &Self::Key) -> Self::Key;
}

/// Strings under concatenation (free monoid on characters).
#[derive(Debug, Clone, Copy, Default)]
pub struct Concat;

impl Monoid for Concat {
    type Key = String;

    fn empty(&self) -> String {
        String::new()
    }

    fn concat(&self, a: &String, b: &String) -> String {
        let mut out = String::with_capacity(a.len() + b.len());
        out.push_str(a);
        out.push_str(b);
        out
    }
}

/// Exponents under addition: keys are degrees of a single variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct Degree;

impl Monoid for Degree {
    type Key = u32;

    fn empty(&self) -> u32 {
        0
    }

    fn concat(&self, a: &u32, b: &u32) -> u32 {
        a + b
    }
}

/// Sparse formal sums `Σ c_k · k` with keys in a monoid and coefficients in
/// a semiring. Elements never store zero coefficients.
#[derive(Debug, Clone, Default)]
pub struct Polynomial<M, R> {
    monoid: M,
    coeffs: R,
}

impl<M: Monoid, R: Semiring> Polynomial<M, R> {
    pub fn new(monoid: M, coeffs: R) -> Self {
        Self { monoid, coeffs }
    }

    pub fn monoid(&self) -> &M {
        &self.monoid
    }

    pub fn coefficients(&self) -> &R {
        &self.coeffs
    }

    /// The single-term sum `c · key` (empty when `c` is zero).
    pub fn term(&self, key: M::Key, c: R::Elem) -> BTreeMap<M::Key, R::Elem> {
        self.sum_terms([(key, c)])
    }

    /// Collect terms, adding coefficients on repeated keys.
    pub fn sum_terms<I>(&self, terms: I) -> BTreeMap<M::Key, R::Elem>
    where
        I: IntoIterator<Item = (M::Key, R::Elem)>,
    {
        let mut out: BTreeMap<M::Key, R::Elem> = BTreeMap::new();
        for (k, c) in terms {
            self.accumulate(&mut out, k, &c);
        }
        self.normalize(out)
    }

    fn accumulate(&self, into: &mut BTreeMap<M::Key, R::Elem>, key: M::Key, c: &R::Elem) {
        match into.get_mut(&key) {
            Some(existing) => *existing = self.coeffs.add(existing, c),
            None => {
                into.insert(key, c.clone());
            }
        }
    }

    fn normalize(&self, mut p: BTreeMap<M::Key, R::Elem>) -> BTreeMap<M::Key, R::Elem> {
        p.retain(|_, c| !self.coeffs.is_zero(c));
        p
    }
}

impl<M: Monoid, R: Semiring> Semiring for Polynomial<M, R> {
    type Elem = BTreeMap<M::Key, R::Elem>;

    fn name(&self) -> &'static str {
        "poly"
    }

    fn zero(&self) -> Self::Elem {
        BTreeMap::new()
    }

    fn one(&self) -> Self::Elem {
        self.term(self.monoid.empty(), self.coeffs.one())
    }

    fn add(&self, x: &Self::Elem, y: &Self::Elem) -> Self::Elem {
        let mut out = x.clone();
        for (k, c) in y {
            self.accumulate(&mut out, k.clone(), c);
        }
        self.normalize(out)
    }

    fn mul(&self, x: &Self::Elem, y: &Self::Elem) -> Self::Elem {
        let mut out = BTreeMap::new();
        for (k1, c1) in x {
            for (k2, c2) in y {
                let key = self.monoid.concat(k1, k2);
                let c = self.coeffs.mul(c1, c2);
                self.accumulate(&mut out, key, &c);
            }
        }
        self.normalize(out)
    }

    fn is_zero(&self, x: &Self::Elem) -> bool {
        x.values().all(|c| self.coeffs.is_zero(c))
    }

    fn divide_by(&self, x: &Self::Elem, n: &BigUint) -> Result<Self::Elem, CotreeError> {
        let mut out = BTreeMap::new();
        for (k, c) in x {
            out.insert(k.clone(), self.coeffs.divide_by(c, n)?);
        }
        Ok(self.normalize(out))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn natural_overflow_saturates() {
        let n = Natural;
        assert_eq!(n.add(&u64::MAX, &1), u64::MAX);
        assert_eq!(n.mul(&(1 << 40), &(1 << 40)), u64::MAX);
        assert_eq!(n.mul(&0, &u64::MAX), 0);
        assert_eq!(n.sum([u64::MAX, 5, 7].iter()), u64::MAX);
    }

    fn int(n: i64) -> BigInt {
        BigInt::from(n)
    }

    #[test]
    fn scalar_identities() {
        assert_eq!(Natural.add(&Natural.zero(), &5), 5);
        assert_eq!(Natural.mul(&Natural.one(), &5), 5);
        assert_eq!(Integer.mul(&int(-3), &int(4)), int(-12));
        assert!(Integer.is_zero(&Integer.add(&int(-3), &int(3))));
        let half = Rational::new(1, 2).unwrap();
        assert!(Rationals.is_zero(&Rationals.add(&half, &(-half.clone()))));
        assert_eq!(Rationals.sum([&half, &half]), Rational::one());
    }

    #[test]
    fn only_exact_semirings_divide() {
        let six = BigUint::from(6u32);
        assert_eq!(
            Rationals.divide_by(&Rational::from(3), &six).unwrap(),
            Rational::new(1, 2).unwrap()
        );
        assert!(matches!(
            Natural.divide_by(&6, &six),
            Err(CotreeError::InexactDivision { semiring: "nat", .. })
        ));
        assert!(Integer.divide_by(&int(6), &six).is_err());
        assert!(
            Rationals
                .divide_by(&Rational::one(), &BigUint::from(0u32))
                .is_err()
        );
    }

    #[test]
    fn polynomial_identities() {
        let p = Polynomial::new(Degree, Integer);
        let x = p.sum_terms([(0, int(1)), (1, int(2))]); // 1 + 2x
        assert_eq!(p.mul(&p.one(), &x), x);
        assert_eq!(p.add(&p.zero(), &x), x);
        assert!(p.is_zero(&p.mul(&p.zero(), &x)));
    }

    #[test]
    fn polynomial_cauchy_product() {
        let p = Polynomial::new(Degree, Integer);
        let a = p.sum_terms([(0, int(1)), (1, int(1))]); // 1 + x
        let b = p.sum_terms([(0, int(1)), (1, int(-1))]); // 1 - x
        // (1 + x)(1 - x) = 1 - x²; the x terms cancel and are dropped.
        assert_eq!(p.mul(&a, &b), p.sum_terms([(0, int(1)), (2, int(-1))]));
    }

    #[test]
    fn polynomial_add_drops_cancelled_keys() {
        let p = Polynomial::new(Concat, Integer);
        let a = p.term("ab".into(), int(2));
        let b = p.term("ab".into(), int(-2));
        assert!(p.add(&a, &b).is_empty());
        assert!(p.term("x".into(), int(0)).is_empty());
    }

    #[test]
    fn polynomial_over_words_is_non_commutative() {
        let p = Polynomial::new(Concat, Natural);
        let a = p.term("a".into(), 1);
        let b = p.term("b".into(), 1);
        assert_eq!(p.mul(&a, &b), p.term("ab".into(), 1));
        assert_eq!(p.mul(&b, &a), p.term("ba".into(), 1));
    }

    #[test]
    fn polynomial_zero_test_uses_coefficient_semantics() {
        let p = Polynomial::new(Degree, Rationals);
        let half = Rational::new(1, 2).unwrap();
        let a = p.term(3, half.clone());
        let b = p.term(3, -half);
        assert!(p.is_zero(&p.add(&a, &b)));
        assert_eq!(p.add(&a, &b), p.zero());
    }

    #[test]
    fn polynomial_divides_through_coefficients() {
        let p = Polynomial::new(Degree, Rationals);
        let a = p.sum_terms([(0, Rational::from(2)), (2, Rational::from(3))]);
        let halved = p.divide_by(&a, &BigUint::from(2u32)).unwrap();
        assert_eq!(
            halved,
            p.sum_terms([(0, Rational::one()), (2, Rational::new(3, 2).unwrap())])
        );
        let q = Polynomial::new(Degree, Integer);
        assert!(q.divide_by(&q.one(), &BigUint::from(2u32)).is_err());
    }

    fn sparse() -> impl Strategy<Value = Vec<(u32, i64)>> {
        prop::collection::vec((0u32..4, -4i64..5), 0..5)
    }

    proptest! {
        #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

        #[test]
        fn prop_polynomial_add_commutes(a in sparse(), b in sparse()) {
            let p = Polynomial::new(Degree, Integer);
            let a = p.sum_terms(a.into_iter().map(|(k, c)| (k, int(c))));
            let b = p.sum_terms(b.into_iter().map(|(k, c)| (k, int(c))));
            prop_assert_eq!(p.add(&a, &b), p.add(&b, &a));
        }

        #[test]
        fn prop_polynomial_mul_distributes(a in sparse(), b in sparse(), c in sparse()) {
            let p = Polynomial::new(Degree, Integer);
            let a = p.sum_terms(a.into_iter().map(|(k, c)| (k, int(c))));
            let b = p.sum_terms(b.into_iter().map(|(k, c)| (k, int(c))));
            let c = p.sum_terms(c.into_iter().map(|(k, c)| (k, int(c))));
            let left = p.mul(&a, &p.add(&b, &c));
            let right = p.add(&p.mul(&a, &b), &p.mul(&a, &c));
            prop_assert_eq!(left, right);
            let left = p.mul(&p.add(&b, &c), &a);
            let right = p.add(&p.mul(&b, &a), &p.mul(&c, &a));
            prop_assert_eq!(left, right);
        }

        #[test]
        fn prop_word_polynomial_mul_distributes(
            a in prop::collection::vec(("[ab]{0,2}", 0u64..3), 0..4),
            b in prop::collection::vec(("[ab]{0,2}", 0u64..3), 0..4),
            c in prop::collection::vec(("[ab]{0,2}", 0u64..3), 0..4),
        ) {
            let p = Polynomial::new(Concat, Natural);
            let a = p.sum_terms(a);
            let b = p.sum_terms(b);
            let c = p.sum_terms(c);
            prop_assert_eq!(
                p.mul(&a, &p.add(&b, &c)),
                p.add(&p.mul(&a, &b), &p.mul(&a, &c))
            );
        }
    }
}
