//! 80-bit extended precision floats
//!
//! AIFF stores the sample rate as a big-endian IEEE 754 extended value:
//! 1 sign bit, a 15-bit exponent biased by 16383 and a 64-bit mantissa whose
//! top bit is the explicit integer bit.

use byteorder::{BigEndian, ByteOrder};

const EXPONENT_BIAS: i32 = 16383;
const MANTISSA_BITS: i32 = 63;
const MAX_EXPONENT: u16 = 0x7FFF;

/// Decode a 10-byte extended value
///
/// An all-zero field (and any zero mantissa) decodes to `0.0`. The maximum
/// exponent decodes to infinity or NaN as in IEEE 754.
pub fn decode_extended(bytes: [u8; 10]) -> f64 {
    let sign_exp = BigEndian::read_u16(&bytes[..2]);
    let mantissa = BigEndian::read_u64(&bytes[2..]);

    let negative = sign_exp & 0x8000 != 0;
    let exponent = sign_exp & MAX_EXPONENT;

    let magnitude = if exponent == MAX_EXPONENT {
        if mantissa << 1 == 0 {
            f64::INFINITY
        } else {
            f64::NAN
        }
    } else if mantissa == 0 {
        0.0
    } else {
        let shift = i32::from(exponent) - EXPONENT_BIAS - MANTISSA_BITS;
        // Two steps keep the intermediate power inside f64 range.
        let half = shift / 2;
        mantissa as f64 * 2f64.powi(half) * 2f64.powi(shift - half)
    };

    if negative {
        -magnitude
    } else {
        magnitude
    }
}

/// Encode an `f64` as a 10-byte extended value
///
/// Every finite `f64` is representable exactly, so
/// `decode_extended(encode_extended(x)) == x`.
pub fn encode_extended(value: f64) -> [u8; 10] {
    let mut out = [0u8; 10];
    let sign: u16 = if value.is_sign_negative() { 0x8000 } else { 0 };

    if value == 0.0 {
        BigEndian::write_u16(&mut out[..2], sign);
        return out;
    }
    if value.is_nan() {
        BigEndian::write_u16(&mut out[..2], sign | MAX_EXPONENT);
        BigEndian::write_u64(&mut out[2..], 0xC000_0000_0000_0000);
        return out;
    }
    if value.is_infinite() {
        BigEndian::write_u16(&mut out[..2], sign | MAX_EXPONENT);
        BigEndian::write_u64(&mut out[2..], 0x8000_0000_0000_0000);
        return out;
    }

    let bits = value.abs().to_bits();
    let raw_exp = ((bits >> 52) & 0x7FF) as i32;
    let fraction = bits & ((1u64 << 52) - 1);

    let (exponent, mantissa) = if raw_exp == 0 {
        // f64 subnormal: normalise so the integer bit is set.
        let lz = fraction.leading_zeros() as i32;
        (1 - 1023 - (lz - 11), fraction << lz)
    } else {
        (raw_exp - 1023, (1u64 << 63) | (fraction << 11))
    };

    let biased = (exponent + EXPONENT_BIAS) as u16;
    BigEndian::write_u16(&mut out[..2], sign | biased);
    BigEndian::write_u64(&mut out[2..], mantissa);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case([0x40, 0x0D, 0xAC, 0x44, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], 22050.0)]
    #[case([0x40, 0x0E, 0xAC, 0x44, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], 44100.0)]
    #[case([0x40, 0x0E, 0xBB, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], 48000.0)]
    #[case([0x40, 0x0B, 0xFA, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], 8000.0)]
    #[case([0x40, 0x0C, 0xAC, 0x44, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], 11025.0)]
    #[case([0x40, 0x0F, 0xBB, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00], 96000.0)]
    fn test_known_rates(#[case] bytes: [u8; 10], #[case] expected: f64) {
        assert_eq!(decode_extended(bytes), expected);
        assert_eq!(encode_extended(expected), bytes);
    }

    #[test]
    fn test_zero() {
        assert_eq!(decode_extended([0u8; 10]), 0.0);
        assert_eq!(encode_extended(0.0), [0u8; 10]);
    }

    #[test]
    fn test_negative_rate() {
        let bytes = [0xC0, 0x0E, 0xAC, 0x44, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(decode_extended(bytes), -44100.0);
    }

    #[test]
    fn test_infinity_and_nan() {
        let inf = [0x7F, 0xFF, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(decode_extended(inf), f64::INFINITY);

        let nan = [0x7F, 0xFF, 0xC0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert!(decode_extended(nan).is_nan());
        assert!(decode_extended(encode_extended(f64::NAN)).is_nan());
    }

    #[test]
    fn test_fractional_rate() {
        let rate = 44_100.0 * 1000.0 / 1001.0;
        assert_eq!(decode_extended(encode_extended(rate)), rate);
    }

    proptest! {
        #[test]
        fn test_integer_rates_round_trip(rate in 1u32..=1_000_000) {
            let decoded = decode_extended(encode_extended(f64::from(rate)));
            prop_assert_eq!(decoded, f64::from(rate));
        }

        #[test]
        fn test_finite_values_round_trip(value in proptest::num::f64::NORMAL) {
            prop_assert_eq!(decode_extended(encode_extended(value)), value);
        }
    }
}
