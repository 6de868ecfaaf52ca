//! Weierstrass curve group `y^2 = x^3 + ax + b` over a prime field.
//!
//! Points are a sum type: the Point at Infinity (group identity) or an affine
//! coordinate pair. Group operations live on [`CurveParams`] since they need the
//! coefficient `a`; negation only needs the point itself.

use crate::error::ArithmeticError;
use crate::field::{FieldElement, PrimeField};
use num_bigint::BigUint;
use num_traits::Zero;
use std::cmp::Ordering;

/// A point on a Weierstrass curve.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Point {
    /// The identity element. Has no coordinates and no byte encoding.
    Infinity,
    /// An affine point `(x, y)`.
    Affine { x: FieldElement, y: FieldElement },
}

impl Point {
    pub fn is_infinity(&self) -> bool {
        matches!(self, Point::Infinity)
    }

    /// Affine coordinates, `None` for Infinity.
    pub fn coordinates(&self) -> Option<(&FieldElement, &FieldElement)> {
        match self {
            Point::Infinity => None,
            Point::Affine { x, y } => Some((x, y)),
        }
    }

    /// `-P = (x, -y)`. Infinity has no negation in this scheme.
    pub fn neg(&self) -> Result<Point, ArithmeticError> {
        match self {
            Point::Infinity => Err(ArithmeticError::UndefinedOperation(
                "cannot negate the point at infinity",
            )),
            Point::Affine { x, y } => Ok(Point::Affine {
                x: x.clone(),
                y: y.neg(),
            }),
        }
    }
}

/// Canonical total order used when participants sort keys: Infinity first, then affine
/// points lexicographically on `(x, y)` as plain integers.
impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Point::Infinity, Point::Infinity) => Ordering::Equal,
            (Point::Infinity, Point::Affine { .. }) => Ordering::Less,
            (Point::Affine { .. }, Point::Infinity) => Ordering::Greater,
            (Point::Affine { x: x1, y: y1 }, Point::Affine { x: x2, y: y2 }) => {
                x1.cmp(x2).then_with(|| y1.cmp(y2))
            }
        }
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Immutable curve configuration `(p, a, b)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CurveParams {
    field: PrimeField,
    a: FieldElement,
    b: FieldElement,
}

impl CurveParams {
    pub fn new(p: BigUint, a: BigUint, b: BigUint) -> Self {
        let field = PrimeField::new(p);
        let a = field.element(a);
        let b = field.element(b);
        CurveParams { field, a, b }
    }

    pub fn field(&self) -> &PrimeField {
        &self.field
    }

    pub fn a(&self) -> &FieldElement {
        &self.a
    }

    pub fn b(&self) -> &FieldElement {
        &self.b
    }

    /// Build an affine point, rejecting coordinates that are not on the curve.
    pub fn point(&self, x: BigUint, y: BigUint) -> Result<Point, ArithmeticError> {
        let p = Point::Affine {
            x: self.field.element(x),
            y: self.field.element(y),
        };
        if self.contains(&p) {
            Ok(p)
        } else {
            Err(ArithmeticError::NotOnCurve)
        }
    }

    /// Whether `p` satisfies the curve equation. Infinity is always on the curve.
    pub fn contains(&self, p: &Point) -> bool {
        match p {
            Point::Infinity => true,
            Point::Affine { x, y } => {
                if x.field() != &self.field || y.field() != &self.field {
                    return false;
                }
                let lhs = y * y;
                let rhs = &(&(&(x * x) * x) + &(&self.a * x)) + &self.b;
                lhs == rhs
            }
        }
    }

    /// Group addition `P + Q`.
    pub fn add(&self, p: &Point, q: &Point) -> Result<Point, ArithmeticError> {
        let (xp, yp, xq, yq) = match (p, q) {
            (Point::Infinity, _) => return Ok(q.clone()),
            (_, Point::Infinity) => return Ok(p.clone()),
            (Point::Affine { x: xp, y: yp }, Point::Affine { x: xq, y: yq }) => (xp, yp, xq, yq),
        };

        // P = -Q, which also covers doubling a point with y = 0
        if xp == xq && *yp == yq.neg() {
            return Ok(Point::Infinity);
        }

        let delta = if xp == xq && yp == yq {
            let three = self.field.element(3u32);
            let two = self.field.element(2u32);
            let num = &(&three * &(xp * xp)) + &self.a;
            num.div(&(&two * yp))?
        } else {
            (yq - yp).div(&(xq - xp))?
        };

        let xr = &(&(&delta * &delta) - xp) - xq;
        let yr = &(&delta * &(xp - &xr)) - yp;
        Ok(Point::Affine { x: xr, y: yr })
    }

    pub fn double(&self, p: &Point) -> Result<Point, ArithmeticError> {
        self.add(p, p)
    }

    /// Scalar multiplication `n * P` by double-and-add, most significant bit first.
    ///
    /// `n` is not reduced by any group order.
    pub fn mul(&self, p: &Point, n: &BigUint) -> Result<Point, ArithmeticError> {
        if n.is_zero() || p.is_infinity() {
            return Ok(Point::Infinity);
        }
        // the leading bit is consumed by starting the accumulator at P
        let mut acc = p.clone();
        for i in (0..n.bits() - 1).rev() {
            acc = self.double(&acc)?;
            if n.bit(i) {
                acc = self.add(&acc, p)?;
            }
        }
        Ok(acc)
    }

    /// Group sum of `points`, seeded with Infinity.
    pub fn sum<'a, I>(&self, points: I) -> Result<Point, ArithmeticError>
    where
        I: IntoIterator<Item = &'a Point>,
    {
        points
            .into_iter()
            .try_fold(Point::Infinity, |acc, p| self.add(&acc, p))
    }
}
