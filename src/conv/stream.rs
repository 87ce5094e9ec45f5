/// Streaming im2col conversion with a bounded window.
///
/// Only `kernel_size` padded input rows are resident at any time. Rows are
/// pulled from the input FIFO as the window slides down the image, and every
/// receptive field is pushed to the output FIFO in the same order
/// [`conv_convert`](super::conv_convert) lays patches out in `input_matrix`.

use num_traits::Zero;
use tracing::{debug, warn};

use crate::fifo::{StreamSink, StreamSource};
use crate::network::LayerDescriptor;
use super::shape::positive_extent;

/// Counters describing one streaming call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Elements actually read from the input FIFO.
    pub elements_read: usize,
    /// Elements that were due but missing; each was replaced by zero.
    pub underrun: usize,
    /// Elements written to the output FIFO.
    pub elements_written: usize,
}

/// Ring of `rows` padded input rows. Logical row 0 is the top of the window.
struct WindowBuffer<T> {
    data: Vec<T>,
    rows: usize,
    row_len: usize,
    head: usize,
}

impl<T: Copy + Zero> WindowBuffer<T> {
    fn new(rows: usize, row_len: usize) -> Self {
        WindowBuffer {
            data: vec![T::zero(); rows * row_len],
            rows,
            row_len,
            head: 0,
        }
    }

    #[inline]
    fn span(&self, r: usize) -> std::ops::Range<usize> {
        let start = ((self.head + r) % self.rows) * self.row_len;
        start..start + self.row_len
    }

    fn row(&self, r: usize) -> &[T] {
        &self.data[self.span(r)]
    }

    fn row_mut(&mut self, r: usize) -> &mut [T] {
        let span = self.span(r);
        &mut self.data[span]
    }

    /// Drops the top row; the freed storage becomes the new bottom row.
    fn advance(&mut self) -> &mut [T] {
        self.head = (self.head + 1) % self.rows;
        self.row_mut(self.rows - 1)
    }
}

/// Vertical layout of the padded image, used to decide which rows carry data.
struct RowSource {
    padding: usize,
    height: usize,
    lead: usize,
    valid: usize,
}

impl RowSource {
    /// Materialises padded row `padded_row` into `row`.
    ///
    /// Rows in the padding bands or past the image are zero. Data rows read
    /// `width * channels` elements, with zero standing in for anything the
    /// FIFO cannot supply.
    fn fill<T, S>(&self, row: &mut [T], padded_row: usize, input: &mut S, stats: &mut StreamStats)
    where
        T: Copy + Zero,
        S: StreamSource<T> + ?Sized,
    {
        if padded_row < self.padding || padded_row >= self.padding + self.height {
            row.fill(T::zero());
            return;
        }
        let (lead, valid) = (self.lead, self.valid);
        row[..lead].fill(T::zero());
        for slot in &mut row[lead..lead + valid] {
            let next = if input.is_empty() { None } else { input.read() };
            *slot = match next {
                Some(value) => {
                    stats.elements_read += 1;
                    value
                }
                None => {
                    stats.underrun += 1;
                    T::zero()
                }
            };
        }
        row[lead + valid..].fill(T::zero());
    }
}

/// Number of elements the window buffer holds for `layer` at `padding`.
pub fn window_len(layer: &LayerDescriptor, padding: usize) -> usize {
    layer.kernel_size * (layer.input_width + 2 * padding) * layer.input_channels
}

/// Streams the im2col unrolling of one layer from `input` to `output`.
///
/// Input is consumed row-major in HWC order. Output receives, for each output
/// position in row-major order, `kernel_size^2 * channels` elements in
/// (kernel-row, kernel-col, channel) order. The layer descriptor is trusted;
/// geometry that yields no output emits nothing.
pub fn conv_convert_stream<T, S, O>(
    layer: &LayerDescriptor,
    padding: usize,
    stride: usize,
    input: &mut S,
    output: &mut O,
) -> StreamStats
where
    T: Copy + Zero,
    S: StreamSource<T> + ?Sized,
    O: StreamSink<T> + ?Sized,
{
    let mut stats = StreamStats::default();
    let k = layer.kernel_size;
    let c = layer.input_channels;
    let (in_h, in_w) = (layer.input_height, layer.input_width);

    let extents = (
        positive_extent(in_h, padding, k, stride),
        positive_extent(in_w, padding, k, stride),
    );
    let (out_h, out_w) = match extents {
        (Some(h), Some(w)) if k > 0 => (h, w),
        _ => {
            warn!(in_h, in_w, kernel = k, padding, stride, "stream conversion has no output positions");
            return stats;
        }
    };

    let padded_w = in_w + 2 * padding;
    let rows = RowSource {
        padding,
        height: in_h,
        lead: padding * c,
        valid: in_w * c,
    };
    let mut window = WindowBuffer::new(k, padded_w * c);
    debug!(
        in_h,
        in_w,
        channels = c,
        kernel = k,
        padding,
        stride,
        out_h,
        out_w,
        window = window.data.len(),
        "stream conversion"
    );

    let mut current_padded_row = 0;
    for r in 0..k {
        rows.fill(window.row_mut(r), current_padded_row, input, &mut stats);
        current_padded_row += 1;
    }

    let patch_row = k * c;
    for i in 0..out_h {
        for j in 0..out_w {
            let start = j * stride * c;
            for kr in 0..k {
                for &value in &window.row(kr)[start..start + patch_row] {
                    output.write(value);
                }
            }
            stats.elements_written += k * patch_row;
        }
        if i + 1 < out_h {
            for _ in 0..stride {
                rows.fill(window.advance(), current_padded_row, input, &mut stats);
                current_padded_row += 1;
            }
        }
    }

    if stats.underrun > 0 {
        warn!(
            missing = stats.underrun,
            read = stats.elements_read,
            "input stream ran dry; missing elements were read as zero"
        );
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ring_rotates_without_moving_rows() {
        let mut window = WindowBuffer::<i32>::new(3, 2);
        for r in 0..3 {
            window.row_mut(r).fill(r as i32);
        }
        window.advance().fill(3);
        assert_eq!(window.row(0), &[1, 1]);
        assert_eq!(window.row(1), &[2, 2]);
        assert_eq!(window.row(2), &[3, 3]);
        window.advance().fill(4);
        window.advance().fill(5);
        assert_eq!(window.row(0), &[3, 3]);
        assert_eq!(window.row(2), &[5, 5]);
        assert_eq!(window.data.len(), 6);
    }

    #[test]
    fn padding_rows_read_nothing() {
        let rows = RowSource { padding: 1, height: 2, lead: 1, valid: 2 };
        let mut input: crate::fifo::Fifo<i32> = vec![7, 8, 9].into_iter().collect();
        let mut stats = StreamStats::default();
        let mut row = [9; 4];

        rows.fill(&mut row[..], 0, &mut input, &mut stats);
        assert_eq!(row, [0, 0, 0, 0]);
        rows.fill(&mut row[..], 1, &mut input, &mut stats);
        assert_eq!(row, [0, 7, 8, 0]);
        rows.fill(&mut row[..], 2, &mut input, &mut stats);
        assert_eq!(row, [0, 9, 0, 0]);
        rows.fill(&mut row[..], 3, &mut input, &mut stats);
        assert_eq!(row, [0, 0, 0, 0]);
        assert_eq!(stats.elements_read, 3);
        assert_eq!(stats.underrun, 1);
    }
}
