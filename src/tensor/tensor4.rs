use std::fmt;

use num_traits::Zero;

/// A bank of convolution filters.
///
/// Layout is FHWC (filter, height, width, channel), one HWC volume per filter.
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor4<T> {
    pub f: usize,
    pub h: usize,
    pub w: usize,
    pub c: usize,
    pub data: Vec<T>,
}

impl<T: Copy + Zero> Tensor4<T> {
    pub fn new(f: usize, h: usize, w: usize, c: usize) -> Self {
        Tensor4 {
            f,
            h,
            w,
            c,
            data: vec![T::zero(); f * h * w * c],
        }
    }
}

impl<T: Copy> Tensor4<T> {
    pub fn from_vec(f: usize, h: usize, w: usize, c: usize, data: Vec<T>) -> Self {
        assert_eq!(data.len(), f * h * w * c, "Tensor4::from_vec: length mismatch");
        Tensor4 { f, h, w, c, data }
    }

    #[inline]
    fn index(&self, f: usize, h: usize, w: usize, c: usize) -> usize {
        f * self.h * self.w * self.c + h * self.w * self.c + w * self.c + c
    }

    pub fn get(&self, f: usize, h: usize, w: usize, c: usize) -> T {
        self.data[self.index(f, h, w, c)]
    }

    pub fn set(&mut self, f: usize, h: usize, w: usize, c: usize, val: T) {
        let idx = self.index(f, h, w, c);
        self.data[idx] = val;
    }
}

impl<T> fmt::Display for Tensor4<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}x{}x{}", self.f, self.h, self.w, self.c)
    }
}
