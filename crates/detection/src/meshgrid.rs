use ndarray::{Array2, ArrayView1};

/// Output layout of [`meshgrid`], following numpy's naming.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indexing {
    /// Cartesian indexing, grids have shape `[len(y), len(x)]`.
    Xy,
    /// Matrix indexing, grids have shape `[len(x), len(y)]`.
    Ij,
}

/// Build coordinate grids from two coordinate vectors.
///
/// Returns `(xx, yy)`, where `xx` repeats `x` along the `y` axis and `yy` repeats `y` along
/// the `x` axis.
pub fn meshgrid<T>(x: ArrayView1<T>, y: ArrayView1<T>, indexing: Indexing) -> (Array2<T>, Array2<T>)
where
    T: Copy,
{
    match indexing {
        Indexing::Xy => {
            let shape = (y.len(), x.len());
            (
                Array2::from_shape_fn(shape, |(_, j)| x[j]),
                Array2::from_shape_fn(shape, |(i, _)| y[i]),
            )
        }
        Indexing::Ij => {
            let shape = (x.len(), y.len());
            (
                Array2::from_shape_fn(shape, |(i, _)| x[i]),
                Array2::from_shape_fn(shape, |(_, j)| y[j]),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn xy_indexing() {
        let x = array![0, 16, 32];
        let y = array![0, 16];

        let (xx, yy) = meshgrid(x.view(), y.view(), Indexing::Xy);

        assert_eq!(xx, array![[0, 16, 32], [0, 16, 32]]);
        assert_eq!(yy, array![[0, 0, 0], [16, 16, 16]]);
    }

    #[test]
    fn ij_indexing() {
        let x = array![1, 2, 3];
        let y = array![7, 8];

        let (xx, yy) = meshgrid(x.view(), y.view(), Indexing::Ij);

        assert_eq!(xx, array![[1, 1], [2, 2], [3, 3]]);
        assert_eq!(yy, array![[7, 8], [7, 8], [7, 8]]);
    }
}
