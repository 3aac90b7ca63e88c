//! Arithmetic values: rational/real scalars with promotion (component A).
//!
//! A [`Scalar`] is either an exact `Rational{num, den}` or an IEEE-754
//! `Real`. Binary operations promote to `Real` whenever exactness cannot
//! be preserved (any mix with a `Real` operand, or a named function that
//! is inherently irrational: `sqrt`, `ln`, the trig family). `Rational`
//! stays normalized — `gcd(|num|, den) == 1` — after every producing
//! operation, using `num_integer`'s Euclidean `gcd`/`div_floor` the way
//! `subset_julia_vm` leans on `num-integer`/`num-traits` for its own
//! numeric tower.
//!
//! Division-by-zero and other blow-ups never panic or raise: they are
//! expressed as sentinel values (`den == 0` rationals carrying
//! `num == ±1`, or `f64::INFINITY`/`NAN` reals), per spec §4.A. Spec §9
//! leaves the exact propagation of `den == 0` rationals through further
//! arithmetic as an open question; this implementation resolves it by
//! promoting any operand that is already an infinite-rational sentinel to
//! `Real` before combining it with anything else, so propagation beyond
//! that point follows ordinary IEEE-754 rules rather than needing a
//! second, rational-specific notion of infinity arithmetic.

use num_integer::Integer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Scalar {
    Rational { num: i64, den: u64 },
    Real(f64),
}

impl Scalar {
    pub fn zero() -> Self {
        Scalar::Rational { num: 0, den: 1 }
    }

    pub fn pi() -> Self {
        Scalar::Real(std::f64::consts::PI)
    }

    pub fn e() -> Self {
        Scalar::Real(std::f64::consts::E)
    }

    pub fn is_infinite_rational(&self) -> bool {
        matches!(self, Scalar::Rational { den: 0, .. })
    }

    pub fn to_f64(self) -> f64 {
        match self {
            Scalar::Real(v) => v,
            Scalar::Rational { den: 0, num } => {
                if num >= 0 {
                    f64::INFINITY
                } else {
                    f64::NEG_INFINITY
                }
            }
            Scalar::Rational { num, den } => num as f64 / den as f64,
        }
    }

    fn as_real(self) -> f64 {
        self.to_f64()
    }

    /// Parse a literal already isolated by the tokenizer's longest-match
    /// scan (spec §4.F rule 3 / §4.A parsing contract).
    pub fn parse_literal(text: &str, is_integer: bool) -> Option<Scalar> {
        if is_integer {
            match text.parse::<i64>() {
                Ok(n) => Some(Scalar::Rational { num: n, den: 1 }),
                Err(_) => text.parse::<f64>().ok().map(Scalar::Real),
            }
        } else {
            text.parse::<f64>().ok().map(Scalar::Real)
        }
    }

    pub fn print(&self) -> String {
        match *self {
            Scalar::Rational { num, den: 0 } => {
                if num >= 0 {
                    "inf".to_string()
                } else {
                    "-inf".to_string()
                }
            }
            Scalar::Rational { num, den: 1 } => num.to_string(),
            Scalar::Rational { num, den } => format!("{} / {}", num, den),
            Scalar::Real(v) => format!("{}", v),
        }
    }

    fn normalize_rational(num: i128, den: i128) -> Scalar {
        debug_assert!(den >= 0);
        if den == 0 {
            let sign: i64 = match num.cmp(&0) {
                std::cmp::Ordering::Less => -1,
                _ => 1,
            };
            return Scalar::Rational { num: sign, den: 0 };
        }
        if num == 0 {
            return Scalar::Rational { num: 0, den: 1 };
        }
        let g = num.abs().gcd(&den);
        Scalar::Rational {
            num: (num / g) as i64,
            den: (den / g) as u64,
        }
    }

    pub fn negate(self) -> Scalar {
        match self {
            Scalar::Rational { num, den } => Scalar::Rational { num: -num, den },
            Scalar::Real(v) => Scalar::Real(-v),
        }
    }

    /// Combine two rationals with a callback producing the (num, den)
    /// pair of the exact result, falling back to `real_op` whenever either
    /// operand cannot stay exact (a `Real` operand, or an infinite
    /// sentinel on either side).
    fn binary(
        a: Scalar,
        b: Scalar,
        rational_op: impl FnOnce(i64, u64, i64, u64) -> (i128, i128),
        real_op: impl FnOnce(f64, f64) -> f64,
    ) -> Scalar {
        match (a, b) {
            (Scalar::Rational { num: n1, den: d1 }, Scalar::Rational { num: n2, den: d2 })
                if d1 != 0 && d2 != 0 =>
            {
                let (num, den) = rational_op(n1, d1, n2, d2);
                Scalar::normalize_rational(num, den)
            }
            _ => Scalar::Real(real_op(a.as_real(), b.as_real())),
        }
    }

    pub fn add(self, other: Scalar) -> Scalar {
        Scalar::binary(
            self,
            other,
            |n1, d1, n2, d2| {
                let (d1, d2) = (d1 as i128, d2 as i128);
                (n1 as i128 * d2 + n2 as i128 * d1, d1 * d2)
            },
            |a, b| a + b,
        )
    }

    pub fn sub(self, other: Scalar) -> Scalar {
        Scalar::binary(
            self,
            other,
            |n1, d1, n2, d2| {
                let (d1, d2) = (d1 as i128, d2 as i128);
                (n1 as i128 * d2 - n2 as i128 * d1, d1 * d2)
            },
            |a, b| a - b,
        )
    }

    pub fn mul(self, other: Scalar) -> Scalar {
        Scalar::binary(
            self,
            other,
            |n1, d1, n2, d2| (n1 as i128 * n2 as i128, d1 as i128 * d2 as i128),
            |a, b| a * b,
        )
    }

    pub fn div(self, other: Scalar) -> Scalar {
        match (self, other) {
            (Scalar::Rational { num: n1, den: d1 }, Scalar::Rational { num: n2, den: d2 })
                if d1 != 0 && d2 != 0 =>
            {
                if n2 == 0 {
                    let sign = if n1 < 0 { -1 } else { 1 };
                    return Scalar::Rational { num: sign, den: 0 };
                }
                let sign: i128 = if n2 < 0 { -1 } else { 1 };
                let num = n1 as i128 * sign;
                let den = d1 as i128 * n2.unsigned_abs() as i128;
                Scalar::normalize_rational(num, den)
            }
            _ => Scalar::Real(self.as_real() / other.as_real()),
        }
    }

    pub fn floor_div(self, other: Scalar) -> Scalar {
        match (self, other) {
            (Scalar::Rational { num: n1, den: d1 }, Scalar::Rational { num: n2, den: d2 })
                if d1 != 0 && d2 != 0 =>
            {
                if n2 == 0 {
                    let sign = if n1 < 0 { -1 } else { 1 };
                    return Scalar::Rational { num: sign, den: 0 };
                }
                let numerator = n1 as i128 * d2 as i128;
                let denom = n2 as i128 * d1 as i128;
                let q = numerator.div_floor(&denom);
                Scalar::Rational { num: q as i64, den: 1 }
            }
            _ => Scalar::Rational {
                num: (self.as_real() / other.as_real()).floor() as i64,
                den: 1,
            },
        }
    }

    pub fn modulo(self, other: Scalar) -> Scalar {
        match (self, other) {
            (Scalar::Rational { den: d1, .. }, Scalar::Rational { num: n2, den: d2 })
                if d1 != 0 && d2 != 0 =>
            {
                if n2 == 0 {
                    return Scalar::Real(f64::NAN);
                }
                let q = self.floor_div(other);
                self.sub(q.mul(other))
            }
            _ => Scalar::Real(self.as_real() % other.as_real()),
        }
    }

    pub fn pow(self, exp: Scalar) -> Scalar {
        if let (Scalar::Rational { num: bn, den: bd }, Scalar::Rational { num: en, den: ed }) =
            (self, exp)
        {
            if bd != 0 && ed == 1 {
                return Self::pow_integer(bn, bd, en);
            }
        }
        Scalar::Real(self.as_real().powf(exp.as_real()))
    }

    fn pow_integer(base_num: i64, base_den: u64, exp: i64) -> Scalar {
        let (bn, bd, exp) = if exp < 0 {
            if base_num == 0 {
                return Scalar::Rational { num: 1, den: 0 };
            }
            let sign = if base_num < 0 { -1i128 } else { 1i128 };
            (base_den as i128 * sign, base_num.unsigned_abs() as i128, -exp as u32)
        } else {
            (base_num as i128, base_den as i128, exp as u32)
        };
        let num = ipow(bn, exp);
        let den = ipow(bd, exp);
        Scalar::normalize_rational(num, den)
    }

    pub fn abs(self) -> Scalar {
        match self {
            Scalar::Rational { num, den } => Scalar::Rational { num: num.abs(), den },
            Scalar::Real(v) => Scalar::Real(v.abs()),
        }
    }

    pub fn floor(self) -> Scalar {
        match self {
            Scalar::Rational { num, den } if den != 0 => {
                let q = (num as i128).div_floor(&(den as i128));
                Scalar::Rational { num: q as i64, den: 1 }
            }
            Scalar::Rational { num, .. } => Scalar::Rational { num, den: 0 },
            Scalar::Real(v) => Scalar::Real(v.floor()),
        }
    }

    pub fn ceil(self) -> Scalar {
        self.negate().floor().negate()
    }

    pub fn sqrt(self) -> Scalar {
        Scalar::Real(self.as_real().sqrt())
    }

    pub fn ln(self) -> Scalar {
        Scalar::Real(self.as_real().ln())
    }

    pub fn log(self, base: Scalar) -> Scalar {
        Scalar::Real(self.as_real().log(base.as_real()))
    }

    pub fn sin(self) -> Scalar {
        Scalar::Real(self.as_real().sin())
    }

    pub fn cos(self) -> Scalar {
        Scalar::Real(self.as_real().cos())
    }

    pub fn tan(self) -> Scalar {
        Scalar::Real(self.as_real().tan())
    }
}

fn ipow(mut base: i128, mut exp: u32) -> i128 {
    let mut acc: i128 = 1;
    while exp > 0 {
        if exp & 1 == 1 {
            acc *= base;
        }
        base *= base;
        exp >>= 1;
    }
    acc
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r(num: i64, den: u64) -> Scalar {
        Scalar::Rational { num, den }
    }

    #[test]
    fn rational_stays_normalized() {
        let v = r(2, 4).add(r(1, 4));
        assert_eq!(v, r(3, 4));
    }

    #[test]
    fn addition_commutes_and_associates() {
        let a = r(1, 3);
        let b = r(2, 5);
        let c = r(7, 11);
        assert_eq!(a.add(b), b.add(a));
        assert_eq!(a.add(b).add(c), a.add(b.add(c)));
    }

    #[test]
    fn distributive_law() {
        let a = r(2, 3);
        let b = r(1, 6);
        let c = r(4, 9);
        assert_eq!(a.mul(b.add(c)), a.mul(b).add(a.mul(c)));
    }

    #[test]
    fn self_subtraction_is_zero() {
        let a = r(7, 13);
        assert_eq!(a.sub(a), Scalar::zero());
    }

    #[test]
    fn rational_div_by_zero_is_infinite_sentinel() {
        let v = r(1, 2).div(r(0, 1));
        assert_eq!(v, Scalar::Rational { num: 1, den: 0 });
        let v = r(-1, 2).div(r(0, 1));
        assert_eq!(v, Scalar::Rational { num: -1, den: 0 });
    }

    #[test]
    fn mixed_rational_real_promotes() {
        let v = r(1, 2).add(Scalar::Real(0.5));
        assert!(matches!(v, Scalar::Real(_)));
    }

    #[test]
    fn pow_integer_exponent_stays_rational() {
        let v = r(2, 3).pow(r(3, 1));
        assert_eq!(v, r(8, 27));
    }

    #[test]
    fn pow_negative_integer_exponent_inverts() {
        let v = r(2, 3).pow(r(-2, 1));
        assert_eq!(v, r(9, 4));
    }

    #[test]
    fn pow_fractional_exponent_demotes_to_real() {
        let v = r(4, 1).pow(r(1, 2));
        assert!(matches!(v, Scalar::Real(_)));
    }

    #[test]
    fn floor_div_always_yields_integer_rational() {
        let v = r(7, 2).floor_div(r(1, 1));
        assert_eq!(v, r(3, 1));
        let v = r(-7, 2).floor_div(r(1, 1));
        assert_eq!(v, r(-4, 1));
    }

    #[test]
    fn floor_div_and_modulo_by_zero_do_not_panic() {
        let v = r(5, 1).floor_div(r(0, 1));
        assert_eq!(v, Scalar::Rational { num: 1, den: 0 });
        let v = r(-5, 1).floor_div(r(0, 1));
        assert_eq!(v, Scalar::Rational { num: -1, den: 0 });

        let v = r(5, 1).modulo(r(0, 1));
        assert!(matches!(v, Scalar::Real(x) if x.is_nan()));
    }

    #[test]
    fn modulo_sign_follows_divisor() {
        let v = r(-7, 1).modulo(r(3, 1));
        assert_eq!(v, r(2, 1));
        let v = r(7, 1).modulo(r(-3, 1));
        assert_eq!(v, r(-2, 1));
    }

    #[test]
    fn literal_round_trip() {
        for text in ["0", "42", "-0"] {
            let parsed = Scalar::parse_literal(text, true).unwrap();
            let printed = parsed.print();
            let reparsed = Scalar::parse_literal(&printed, true).unwrap();
            assert_eq!(parsed, reparsed);
        }
        for text in ["3.5", "0.125", "100.0"] {
            let parsed = Scalar::parse_literal(text, false).unwrap();
            let printed = parsed.print();
            let reparsed = Scalar::parse_literal(&printed, false).unwrap();
            assert_eq!(parsed, reparsed);
        }
    }

    #[test]
    fn print_format() {
        assert_eq!(r(4, 1).print(), "4");
        assert_eq!(r(3, 4).print(), "3 / 4");
    }
}
