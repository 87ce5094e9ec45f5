/// Spatial output extent of a sliding window.
///
/// `floor((input + 2*pad - kernel) / stride) + 1`, computed in signed
/// arithmetic so callers can see non-positive results. Returns `None` for a
/// zero stride.
pub fn output_extent(input: usize, pad: usize, kernel: usize, stride: usize) -> Option<i64> {
    if stride == 0 {
        return None;
    }
    let span = (input + 2 * pad) as i64 - kernel as i64;
    Some(span.div_euclid(stride as i64) + 1)
}

/// Like [`output_extent`] but only yields strictly positive extents.
pub fn positive_extent(input: usize, pad: usize, kernel: usize, stride: usize) -> Option<usize> {
    match output_extent(input, pad, kernel, stride) {
        Some(n) if n > 0 => Some(n as usize),
        _ => None,
    }
}
