//! Dense matrix arithmetic for the network engine.
//!
//! [`Matrix`] is a rows×cols grid of `f64` values stored in a flat row-major
//! buffer. It provides exactly the operations forward/backward propagation and
//! genetic crossover need: in-place addition, bias broadcasting, scalar and
//! element-wise (Hadamard) products, the standard matrix product,
//! transposition, activation application, and the two randomized operators
//! (full overwrite for initialization, gated additive perturbation for
//! mutation).
//!
//! Every binary operation checks dimensions up front and returns a
//! [`ShapeError`] on mismatch; values are never silently truncated or padded.
//! Copies are deep ([`Clone`]), so matrices are never shared mutably between
//! networks.

use rand::Rng;

use crate::activation::Activation;

/// Error returned when two matrices have incompatible dimensions for an
/// operation.
///
/// `op` names the rejected operation; the four dimension fields record both
/// operands' shapes as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display, derive_more::Error)]
#[display("matrix {op} dimension mismatch: {lhs_rows}x{lhs_cols} vs {rhs_rows}x{rhs_cols}")]
pub struct ShapeError {
    pub op: &'static str,
    pub lhs_rows: usize,
    pub lhs_cols: usize,
    pub rhs_rows: usize,
    pub rhs_cols: usize,
}

impl ShapeError {
    fn new(op: &'static str, lhs: &Matrix, rhs: &Matrix) -> Self {
        Self {
            op,
            lhs_rows: lhs.rows,
            lhs_cols: lhs.cols,
            rhs_rows: rhs.rows,
            rhs_cols: rhs.cols,
        }
    }
}

/// A dense rows×cols matrix of `f64` values.
///
/// # Examples
///
/// ```
/// use nevo_network::matrix::Matrix;
///
/// let a = Matrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]);
/// let b = Matrix::from_rows(&[vec![1.0], vec![1.0]]);
/// let product = Matrix::multiply(&a, &b).unwrap();
/// assert_eq!(product.values(), &[3.0, 7.0]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates a rows×cols matrix with every element set to zero.
    #[must_use]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Creates a matrix by applying a function to each `(row, col)` index.
    #[must_use]
    pub fn from_fn<F>(rows: usize, cols: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(rows * cols);
        for row in 0..rows {
            for col in 0..cols {
                data.push(f(row, col));
            }
        }
        Self { rows, cols, data }
    }

    /// Creates a matrix from explicit rows.
    ///
    /// # Panics
    ///
    /// Panics if the rows do not all have the same length.
    #[must_use]
    pub fn from_rows(rows: &[Vec<f64>]) -> Self {
        let cols = rows.first().map_or(0, Vec::len);
        assert!(
            rows.iter().all(|row| row.len() == cols),
            "all rows must have the same length"
        );
        Self {
            rows: rows.len(),
            cols,
            data: rows.concat(),
        }
    }

    /// Creates a 1×n row matrix from a slice of values.
    #[must_use]
    pub fn from_row(values: &[f64]) -> Self {
        Self {
            rows: 1,
            cols: values.len(),
            data: values.to_vec(),
        }
    }

    /// Creates a rows×cols matrix from a row-major value buffer.
    ///
    /// Returns `None` if the buffer length is not exactly `rows * cols`.
    #[must_use]
    pub fn from_vec(rows: usize, cols: usize, data: Vec<f64>) -> Option<Self> {
        (data.len() == rows * cols).then_some(Self { rows, cols, data })
    }

    /// Returns the number of rows.
    #[must_use]
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[must_use]
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the elements as a row-major slice.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Consumes the matrix and returns its elements row-major.
    #[must_use]
    pub fn into_values(self) -> Vec<f64> {
        self.data
    }

    /// Adds another matrix element-wise, in place.
    ///
    /// Both matrices must have exactly the same shape.
    pub fn add(&mut self, other: &Self) -> Result<(), ShapeError> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(ShapeError::new("add", self, other));
        }
        for (lhs, rhs) in self.data.iter_mut().zip(&other.data) {
            *lhs += rhs;
        }
        Ok(())
    }

    /// Adds a bias row to every row of the matrix.
    ///
    /// The bias is broadcast across all rows; only its column count must match
    /// (the first row of `bias` is read).
    pub fn add_bias(&mut self, bias: &Self) -> Result<(), ShapeError> {
        if self.cols != bias.cols {
            return Err(ShapeError::new("bias add", self, bias));
        }
        for row in self.data.chunks_exact_mut(self.cols) {
            for (lhs, rhs) in row.iter_mut().zip(&bias.data[..bias.cols]) {
                *lhs += rhs;
            }
        }
        Ok(())
    }

    /// Computes the element-wise difference `a - b` as a new matrix.
    pub fn subtract(a: &Self, b: &Self) -> Result<Self, ShapeError> {
        if a.rows != b.rows || a.cols != b.cols {
            return Err(ShapeError::new("subtract", a, b));
        }
        let data = a.data.iter().zip(&b.data).map(|(x, y)| x - y).collect();
        Ok(Self {
            rows: a.rows,
            cols: a.cols,
            data,
        })
    }

    /// Computes the element-wise average of two matrices as a new matrix.
    ///
    /// This is the crossover primitive: merging two networks averages every
    /// corresponding weight and bias cell.
    pub fn merged(a: &Self, b: &Self) -> Result<Self, ShapeError> {
        if a.rows != b.rows || a.cols != b.cols {
            return Err(ShapeError::new("merge", a, b));
        }
        let data = a
            .data
            .iter()
            .zip(&b.data)
            .map(|(x, y)| (x + y) / 2.0)
            .collect();
        Ok(Self {
            rows: a.rows,
            cols: a.cols,
            data,
        })
    }

    /// Multiplies every element by a scalar, in place.
    pub fn scale(&mut self, factor: f64) {
        for value in &mut self.data {
            *value *= factor;
        }
    }

    /// Multiplies element-wise by another matrix (Hadamard product), in place.
    pub fn hadamard(&mut self, other: &Self) -> Result<(), ShapeError> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(ShapeError::new("hadamard", self, other));
        }
        for (lhs, rhs) in self.data.iter_mut().zip(&other.data) {
            *lhs *= rhs;
        }
        Ok(())
    }

    /// Computes the standard matrix product `a × b` as a new matrix.
    ///
    /// Requires `a.cols() == b.rows()`; the result has shape
    /// `a.rows() × b.cols()`.
    pub fn multiply(a: &Self, b: &Self) -> Result<Self, ShapeError> {
        if a.cols != b.rows {
            return Err(ShapeError::new("multiply", a, b));
        }
        let mut result = Self::zeros(a.rows, b.cols);
        for row in 0..a.rows {
            for k in 0..a.cols {
                let lhs = a.data[row * a.cols + k];
                if lhs == 0.0 {
                    continue;
                }
                let out = &mut result.data[row * b.cols..(row + 1) * b.cols];
                for (target, rhs) in out.iter_mut().zip(&b.data[k * b.cols..(k + 1) * b.cols]) {
                    *target += lhs * rhs;
                }
            }
        }
        Ok(result)
    }

    /// Returns the transpose as a new matrix.
    #[must_use]
    pub fn transposed(&self) -> Self {
        Self::from_fn(self.cols, self.rows, |row, col| self[(col, row)])
    }

    /// Applies an activation function to every element, in place.
    pub fn activate(&mut self, activation: Activation) {
        for value in &mut self.data {
            *value = activation.apply(*value);
        }
    }

    /// Returns a new matrix of element-wise activation derivatives.
    ///
    /// Derivatives are computed from the *activated* value, so callers must
    /// pass a matrix that [`activate`](Self::activate) has already been
    /// applied to.
    #[must_use]
    pub fn derived(&self, activation: Activation) -> Self {
        Self {
            rows: self.rows,
            cols: self.cols,
            data: self.data.iter().map(|y| activation.derive(*y)).collect(),
        }
    }

    /// Overwrites every element with a uniform draw in `[-scale, scale]`.
    ///
    /// This is the weight initializer, not the mutation operator; see
    /// [`perturb`](Self::perturb) for the latter.
    pub fn randomize<R>(&mut self, scale: f64, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for value in &mut self.data {
            *value = rng.random_range(-scale..=scale);
        }
    }

    /// Perturbs each element independently with probability `rate` by adding a
    /// uniform draw in `[-scale, scale]`.
    ///
    /// Unperturbed elements keep their prior value. This is the genetic
    /// mutation operator: `rate` gates how many parameters change, `scale`
    /// bounds how far each one moves.
    pub fn perturb<R>(&mut self, scale: f64, rate: f64, rng: &mut R)
    where
        R: Rng + ?Sized,
    {
        for value in &mut self.data {
            if rng.random_bool(rate) {
                *value += rng.random_range(-scale..=scale);
            }
        }
    }
}

impl std::ops::Index<(usize, usize)> for Matrix {
    type Output = f64;

    fn index(&self, (row, col): (usize, usize)) -> &f64 {
        &self.data[row * self.cols + col]
    }
}

impl std::ops::IndexMut<(usize, usize)> for Matrix {
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut f64 {
        &mut self.data[row * self.cols + col]
    }
}
