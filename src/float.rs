const HALF_SIGN: u16 = 0x8000;
const HALF_EXP: u16 = 0x7c00;
const HALF_MANT: u16 = 0x03ff;

/// 2^-24, the value of the least significant bit of a subnormal half.
const HALF_SUBNORMAL_UNIT: f32 = 1.0 / 16_777_216.0;

/// Widens IEEE-754 binary16 bits to `f32`.
///
/// Normal values are rebuilt by re-biasing the exponent (15 -> 127); every
/// half value is exactly representable in `f32`.
#[must_use]
pub fn half_to_f32(bits: u16) -> f32 {
    let negative = bits & HALF_SIGN != 0;
    let exp = (bits & HALF_EXP) >> 10;
    let mant = bits & HALF_MANT;

    let magnitude = match exp {
        0 => f32::from(mant) * HALF_SUBNORMAL_UNIT,
        0x1f if mant != 0 => return f32::NAN,
        0x1f => f32::INFINITY,
        _ => {
            let exp32 = u32::from(exp) + (127 - 15);
            f32::from_bits((exp32 << 23) | (u32::from(mant) << 13))
        }
    };

    if negative {
        -magnitude
    } else {
        magnitude
    }
}
