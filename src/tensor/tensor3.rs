use std::fmt;

use num_traits::Zero;

/// A 3D feature map.
///
/// Layout is HWC (height, width, channel): channels are innermost, so one
/// spatial row is a contiguous run of `w * c` elements.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor3<T> {
    pub h: usize,
    pub w: usize,
    pub c: usize,
    pub data: Vec<T>,
}

impl<T: Copy + Zero> Tensor3<T> {
    pub fn new(h: usize, w: usize, c: usize) -> Self {
        Tensor3 {
            h,
            w,
            c,
            data: vec![T::zero(); h * w * c],
        }
    }

    /// Returns a copy with `pad` zero cells added on every spatial side.
    pub fn padded(&self, pad: usize) -> Self {
        if pad == 0 {
            return self.clone();
        }
        let mut out = Tensor3::new(self.h + 2 * pad, self.w + 2 * pad, self.c);
        let row_len = self.w * self.c;
        for h in 0..self.h {
            let src = h * row_len;
            let dst = out.index(h + pad, pad, 0);
            out.data[dst..dst + row_len].copy_from_slice(&self.data[src..src + row_len]);
        }
        out
    }
}

impl<T: Copy> Tensor3<T> {
    /// Wraps `data` laid out as HWC. Panics if the length does not match.
    pub fn from_vec(h: usize, w: usize, c: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), h * w * c, "Tensor3::from_vec: length mismatch");
        Tensor3 { h, w, c, data }
    }

    #[inline]
    fn index(&self, h: usize, w: usize, c: usize) -> usize {
        h * self.w * self.c + w * self.c + c
    }

    pub fn get(&self, h: usize, w: usize, c: usize) -> T {
        self.data[self.index(h, w, c)]
    }

    pub fn set(&mut self, h: usize, w: usize, c: usize, val: T) {
        let idx = self.index(h, w, c);
        self.data[idx] = val;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<T> fmt::Display for Tensor3<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}", self.h, self.w, self.c)
    }
}
