//! NV21 → packed ARGB frame decoding.
//!
//! One decoder serves every mode: the plain conversion and the enhanced
//! conversion differ only in the optional [`LumaRemap`] applied to each
//! offset luma sample before it is packed.

use crate::convert::{gray_to_argb, offset_luma, pack_rgb};
use crate::frame::{Frame, FrameError};

/// A luma → luma tone mapping applied to offset luma before conversion.
pub trait LumaRemap {
    fn remap(&self, luma: u8) -> u8;
}

impl<F> LumaRemap for F
where
    F: Fn(u8) -> u8,
{
    fn remap(&self, luma: u8) -> u8 {
        self(luma)
    }
}

/// Decode `frame` into `out`, optionally remapping luma through `remap`.
///
/// `out` must hold exactly `width * height` pixels; it is never resized.
pub fn decode_into(
    frame: &Frame<'_>,
    remap: Option<&dyn LumaRemap>,
    out: &mut [u32],
) -> Result<(), FrameError> {
    check_output(frame, out)?;
    match remap {
        Some(curve) => decode_rows(frame, out, |l| curve.remap(l)),
        None => decode_rows(frame, out, |l| l),
    }
    Ok(())
}

/// Decode only the luma plane into opaque gray pixels.
pub fn decode_grayscale_into(frame: &Frame<'_>, out: &mut [u32]) -> Result<(), FrameError> {
    check_output(frame, out)?;
    for (px, &y) in out.iter_mut().zip(frame.luma()) {
        *px = gray_to_argb(y);
    }
    Ok(())
}

fn check_output(frame: &Frame<'_>, out: &[u32]) -> Result<(), FrameError> {
    let expected = frame.len();
    if out.len() != expected {
        return Err(FrameError::DimensionMismatch {
            expected,
            actual: out.len(),
        });
    }
    Ok(())
}

#[inline(always)]
fn decode_rows<F>(frame: &Frame<'_>, out: &mut [u32], tone: F)
where
    F: Fn(u8) -> u8,
{
    let w = frame.width() as usize;
    let chroma = frame.chroma();

    let rows = frame.luma().chunks_exact(w).zip(out.chunks_exact_mut(w));
    for (row, (y_row, out_row)) in rows.enumerate() {
        // One V/U row serves two luma rows.
        let start = (row / 2) * w;
        let vu_row = &chroma[start..start + w];

        let blocks = y_row
            .chunks_exact(2)
            .zip(out_row.chunks_exact_mut(2))
            .zip(vu_row.chunks_exact(2));
        for ((ys, px), vu) in blocks {
            let (v, u) = (vu[0], vu[1]);
            for (p, &y) in px.iter_mut().zip(ys) {
                *p = pack_rgb(tone(offset_luma(y)), u, v);
            }
        }
    }
}
