//! Algebraic laws and parse/print round-trips for the rational/real
//! scalar (spec §8, component A).

use expr_engine::Scalar;

fn r(num: i64, den: u64) -> Scalar {
    Scalar::Rational { num, den }
}

#[test]
fn rational_addition_is_commutative_and_associative() {
    let a = r(1, 3);
    let b = r(5, 7);
    let c = r(-2, 9);
    assert_eq!(a.add(b), b.add(a));
    assert_eq!(a.add(b).add(c), a.add(b.add(c)));
}

#[test]
fn rational_distributes_over_addition() {
    let a = r(2, 3);
    let b = r(1, 4);
    let c = r(-5, 6);
    assert_eq!(a.mul(b.add(c)), a.mul(b).add(a.mul(c)));
}

#[test]
fn rational_self_subtraction_is_zero() {
    let a = r(17, 5);
    assert_eq!(a.sub(a), Scalar::zero());
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

#[test]
fn rational_stays_normalized_after_every_op() {
    let a = r(4, 6);
    let b = r(9, 12);
    for value in [a.add(b), a.mul(b), a.sub(b), a.div(b)] {
        if let Scalar::Rational { num, den } = value {
            if den > 1 {
                assert_eq!(gcd(num.unsigned_abs(), den), 1);
            }
        }
    }
}

#[test]
fn division_by_zero_rational_yields_infinite_sentinel() {
    let a = r(3, 1);
    let zero = Scalar::zero();
    let result = a.div(zero);
    assert!(result.is_infinite_rational());
    assert_eq!(result.to_f64(), f64::INFINITY);
}

#[test]
fn rational_division_by_zero_is_negative_infinite_when_numerator_is_negative() {
    let a = r(-3, 1);
    let result = a.div(Scalar::zero());
    assert_eq!(result.to_f64(), f64::NEG_INFINITY);
}

#[test]
fn mixing_a_real_operand_promotes_the_result() {
    let rational = r(1, 2);
    let real = Scalar::Real(0.5);
    assert!(matches!(rational.add(real), Scalar::Real(_)));
}

#[test]
fn integer_power_of_a_rational_stays_rational() {
    let base = r(2, 3);
    let squared = base.pow(r(2, 1));
    assert_eq!(squared, r(4, 9));
}

#[test]
fn sqrt_of_a_rational_demotes_to_real() {
    let four = r(4, 1);
    assert!(matches!(four.pow(r(1, 2)), Scalar::Real(_)));
}

#[test]
fn floor_div_always_yields_an_integer_rational() {
    let a = r(7, 1);
    let b = r(2, 1);
    assert_eq!(a.floor_div(b), r(3, 1));
}

#[test]
fn floor_div_by_zero_is_infinite_sentinel_not_a_panic() {
    let positive = r(5, 1).floor_div(Scalar::zero());
    assert!(positive.is_infinite_rational());
    assert_eq!(positive.to_f64(), f64::INFINITY);

    let negative = r(-5, 1).floor_div(Scalar::zero());
    assert!(negative.is_infinite_rational());
    assert_eq!(negative.to_f64(), f64::NEG_INFINITY);
}

#[test]
fn modulo_by_zero_is_nan_not_a_panic() {
    let result = r(5, 1).modulo(Scalar::zero());
    assert!(matches!(result, Scalar::Real(v) if v.is_nan()));
}

#[test]
fn integer_literal_round_trips_through_print_and_parse() {
    for text in ["0", "42", "-17"] {
        let parsed = Scalar::parse_literal(text, true).unwrap();
        let printed = parsed.print();
        let reparsed = Scalar::parse_literal(&printed, !printed.contains('.')).unwrap();
        assert_eq!(parsed, reparsed);
    }
}

#[test]
fn decimal_literal_round_trips_through_print_and_parse() {
    let parsed = Scalar::parse_literal("3.25", false).unwrap();
    let printed = parsed.print();
    let reparsed = Scalar::parse_literal(&printed, false).unwrap();
    assert_eq!(parsed, reparsed);
}
