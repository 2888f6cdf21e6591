//! Fixed-point YUV → packed ARGB conversion.
//!
//! Integer-only BT.601-style conversion on studio-swing luma. Coefficients
//! are scaled by 1024 and the intermediate values carry 18 bits of headroom
//! before the final shift into 8-bit channels. The bit sequence must stay
//! exactly as written: existing reference captures were produced with it.

/// Luma black level for studio-swing video.
const LUMA_OFFSET: i32 = 16;
/// Chroma zero point.
const CHROMA_OFFSET: i32 = 128;

const Y_COEFF: i32 = 1192;
const V_TO_R: i32 = 1634;
const V_TO_G: i32 = 833;
const U_TO_G: i32 = 400;
const U_TO_B: i32 = 2066;

/// Upper clamp for the 18-bit fixed-point channel values.
const CHANNEL_MAX: i32 = 262_143;

/// Opaque alpha in packed 0xAARRGGBB pixels.
pub const ALPHA_OPAQUE: u32 = 0xFF00_0000;

/// Remove the studio-swing black level from a raw luma byte.
///
/// Floored at zero, never clamped above: the result is at most 239.
#[inline(always)]
pub fn offset_luma(raw: u8) -> u8 {
    (raw as i32 - LUMA_OFFSET).max(0) as u8
}

/// Pack an already-offset luma sample and a raw chroma pair into 0xAARRGGBB.
///
/// `luma` is the value after [`offset_luma`] (or after a tone curve has
/// remapped it), so it may span the full 0..=255 range.
#[inline(always)]
pub fn pack_rgb(luma: u8, u: u8, v: u8) -> u32 {
    let u = u as i32 - CHROMA_OFFSET;
    let v = v as i32 - CHROMA_OFFSET;

    let y1192 = Y_COEFF * luma as i32;
    let r = (y1192 + V_TO_R * v).clamp(0, CHANNEL_MAX);
    let g = (y1192 - V_TO_G * v - U_TO_G * u).clamp(0, CHANNEL_MAX);
    let b = (y1192 + U_TO_B * u).clamp(0, CHANNEL_MAX);

    ALPHA_OPAQUE
        | ((r << 6) & 0x00FF_0000) as u32
        | ((g >> 2) & 0x0000_FF00) as u32
        | ((b >> 10) & 0x0000_00FF) as u32
}

/// Convert one raw (Y, U, V) triple to a packed opaque RGB pixel.
#[inline(always)]
pub fn yuv_to_argb(y: u8, u: u8, v: u8) -> u32 {
    pack_rgb(offset_luma(y), u, v)
}

/// Convert a raw luma byte to an opaque gray pixel (chroma ignored).
#[inline(always)]
pub fn gray_to_argb(y: u8) -> u32 {
    let g = offset_luma(y) as u32;
    ALPHA_OPAQUE | (g << 16) | (g << 8) | g
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_black_level_is_black() {
        assert_eq!(yuv_to_argb(16, 128, 128), 0xFF00_0000);
    }

    #[test]
    fn test_below_black_level_floors_at_zero() {
        assert_eq!(offset_luma(0), 0);
        assert_eq!(offset_luma(15), 0);
        assert_eq!(yuv_to_argb(3, 128, 128), 0xFF00_0000);
    }

    #[test]
    fn test_nominal_white_stays_below_clamp() {
        // 1192 * 219 = 261048 < 262143, so every channel lands on 0xFE.
        assert_eq!(yuv_to_argb(235, 128, 128), 0xFFFE_FEFE);
    }

    #[test]
    fn test_super_white_hits_clamp() {
        // 1192 * 239 = 284888, clamped to 262143 → full white.
        assert_eq!(yuv_to_argb(255, 128, 128), 0xFFFF_FFFF);
    }

    #[test]
    fn test_mid_gray() {
        assert_eq!(yuv_to_argb(126, 128, 128), 0xFF80_8080);
    }

    #[test]
    fn test_primaries() {
        assert_eq!(yuv_to_argb(81, 90, 240), 0xFFFE_0000);
        assert_eq!(yuv_to_argb(145, 54, 34), 0xFF00_FF00);
        assert_eq!(yuv_to_argb(41, 240, 110), 0xFF00_00FF);
    }

    #[test]
    fn test_matches_reference_formula_over_grid() {
        for y in (0..=255u8).step_by(17) {
            for u in (0..=255u8).step_by(51) {
                for v in (0..=255u8).step_by(51) {
                    let yy = (y as i32 - 16).max(0);
                    let uu = u as i32 - 128;
                    let vv = v as i32 - 128;
                    let a = 1192 * yy;
                    let r = (a + 1634 * vv).clamp(0, 262143);
                    let g = (a - 833 * vv - 400 * uu).clamp(0, 262143);
                    let b = (a + 2066 * uu).clamp(0, 262143);
                    let expected = 0xFF00_0000u32
                        | ((r << 6) & 0xFF0000) as u32
                        | ((g >> 2) & 0xFF00) as u32
                        | ((b >> 10) & 0xFF) as u32;
                    assert_eq!(yuv_to_argb(y, u, v), expected, "y={y} u={u} v={v}");
                }
            }
        }
    }

    #[test]
    fn test_alpha_always_opaque() {
        for y in [0u8, 16, 128, 255] {
            assert_eq!(yuv_to_argb(y, 0, 255) & ALPHA_OPAQUE, ALPHA_OPAQUE);
            assert_eq!(gray_to_argb(y) & ALPHA_OPAQUE, ALPHA_OPAQUE);
        }
    }

    #[test]
    fn test_gray_replicates_offset_luma() {
        assert_eq!(gray_to_argb(16), 0xFF00_0000);
        assert_eq!(gray_to_argb(144), 0xFF80_8080);
        assert_eq!(gray_to_argb(255), 0xFFEF_EFEF);
    }
}
