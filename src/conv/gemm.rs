/// Tiled matrix multiply over [`Matrix`] values.

use std::ops::Mul;

use num_traits::Zero;

use crate::tensor::Matrix;

const TILE: usize = 32;

/// `a (m x k) * b (k x n) -> (m x n)`, blocked into `TILE`-sized tiles for
/// cache-friendly access. Panics if the inner dimensions disagree.
pub fn matmul<T>(a: &Matrix<T>, b: &Matrix<T>) -> Matrix<T>
where
    T: Copy + Zero + Mul<Output = T>,
{
    assert_eq!(a.cols, b.rows, "matmul: inner dimensions {} vs {}", a.cols, b.rows);
    let (m, k, n) = (a.rows, a.cols, b.cols);
    let mut c = Matrix::new(m, n);

    let mut ii = 0;
    while ii < m {
        let i_end = (ii + TILE).min(m);
        let mut pp = 0;
        while pp < k {
            let p_end = (pp + TILE).min(k);
            let mut jj = 0;
            while jj < n {
                let j_end = (jj + TILE).min(n);
                for i in ii..i_end {
                    let c_row = i * n;
                    let a_row = i * k;
                    for p in pp..p_end {
                        let a_val = a.data[a_row + p];
                        let b_row = p * n;
                        for j in jj..j_end {
                            c.data[c_row + j] = c.data[c_row + j] + a_val * b.data[b_row + j];
                        }
                    }
                }
                jj += TILE;
            }
            pp += TILE;
        }
        ii += TILE;
    }
    c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn small_product() {
        let a = Matrix { rows: 2, cols: 3, data: vec![1, 2, 3, 4, 5, 6] };
        let b = Matrix { rows: 3, cols: 2, data: vec![7, 8, 9, 10, 11, 12] };
        let c = matmul(&a, &b);
        assert_eq!((c.rows, c.cols), (2, 2));
        assert_eq!(c.data, vec![58, 64, 139, 154]);
    }

    #[test]
    fn spans_several_tiles() {
        let n = TILE + 5;
        let mut ident = Matrix::<i64>::new(n, n);
        for i in 0..n {
            ident.set(i, i, 1);
        }
        let a = Matrix { rows: 3, cols: n, data: (0..3 * n as i64).collect() };
        assert_eq!(matmul(&a, &ident), a);
    }
}
