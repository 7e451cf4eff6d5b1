// -*- mode: rust; -*-
//
// This file is part of frost-bip340.
// See LICENSE for licensing information.

//! Dense matrices over the secp256k1 scalar field.
//!
//! These are the linear-algebra primitives behind threshold changes: an
//! inverse Vandermonde matrix converts public verification shares back into
//! the coefficient commitments of the group polynomial, evaluated in the
//! exponent via [`Matrix::mul_point_matrix`]. Dimensions are bounded by the
//! signing threshold, so the classical cofactor algorithms are plenty.

use k256::elliptic_curve::ff::Field;
use k256::{ProjectivePoint, Scalar};

use crate::Error;

/// A dense matrix of scalars mod the secp256k1 group order.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Matrix {
    elements: Vec<Vec<Scalar>>,
}

impl Matrix {
    /// Construct a matrix from its rows.
    ///
    /// Fails with [`Error::InvalidDimensions`] if the input is empty or
    /// ragged.
    pub fn new(elements: Vec<Vec<Scalar>>) -> Result<Self, Error> {
        let width = match elements.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => return Err(Error::InvalidDimensions),
        };
        if elements.iter().any(|row| row.len() != width) {
            return Err(Error::InvalidDimensions);
        }
        Ok(Self { elements })
    }

    /// The square Vandermonde matrix of the given indexes:
    /// `V[r][c] = indexes[r]^c`.
    ///
    /// Distinct nonzero indexes make this matrix invertible.
    pub fn vandermonde(indexes: &[u8]) -> Result<Self, Error> {
        if indexes.is_empty() {
            return Err(Error::InvalidDimensions);
        }

        let elements = indexes
            .iter()
            .map(|&index| {
                let x = Scalar::from(u64::from(index));
                let mut power = Scalar::ONE;
                (0..indexes.len())
                    .map(|_| {
                        let entry = power;
                        power *= x;
                        entry
                    })
                    .collect()
            })
            .collect();

        Ok(Self { elements })
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.elements.len()
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.elements[0].len()
    }

    /// The determinant, by cofactor expansion along the first row.
    ///
    /// Fails with [`Error::InvalidDimensions`] on non-square matrices.
    pub fn determinant(&self) -> Result<Scalar, Error> {
        if self.rows() != self.cols() {
            return Err(Error::InvalidDimensions);
        }

        let n = self.rows();
        let det = match n {
            1 => self.elements[0][0],
            2 => {
                self.elements[0][0] * self.elements[1][1]
                    - self.elements[0][1] * self.elements[1][0]
            }
            _ => {
                let mut sum = Scalar::ZERO;
                for col in 0..n {
                    let cofactor = self.elements[0][col] * self.minor(0, col).determinant()?;
                    if col % 2 == 0 {
                        sum += cofactor;
                    } else {
                        sum -= cofactor;
                    }
                }
                sum
            }
        };
        Ok(det)
    }

    /// The inverse, as the adjugate scaled by the inverted determinant.
    ///
    /// Fails with [`Error::SingularMatrix`] when the determinant is zero.
    pub fn inverse(&self) -> Result<Self, Error> {
        let determinant = self.determinant()?;
        let determinant_inverse =
            Option::<Scalar>::from(determinant.invert()).ok_or(Error::SingularMatrix)?;

        let n = self.rows();
        if n == 1 {
            return Ok(Self {
                elements: vec![vec![determinant_inverse]],
            });
        }

        let mut elements = Vec::with_capacity(n);
        for row in 0..n {
            let mut inverse_row = Vec::with_capacity(n);
            for col in 0..n {
                // Adjugate: transposed cofactors.
                let mut cofactor = self.minor(col, row).determinant()?;
                if (row + col) % 2 == 1 {
                    cofactor = -cofactor;
                }
                inverse_row.push(cofactor * determinant_inverse);
            }
            elements.push(inverse_row);
        }
        Ok(Self { elements })
    }

    /// Left-multiply a matrix of points by this scalar matrix:
    /// `result[r][j] = Σ_k self[r][k] · points[k][j]`.
    ///
    /// Fails with [`Error::InvalidDimensions`] unless `points` has exactly
    /// [`Self::cols`] rows of equal nonzero width.
    pub fn mul_point_matrix(
        &self,
        points: &[Vec<ProjectivePoint>],
    ) -> Result<Vec<Vec<ProjectivePoint>>, Error> {
        if points.len() != self.cols() {
            return Err(Error::InvalidDimensions);
        }
        let width = match points.first() {
            Some(row) if !row.is_empty() => row.len(),
            _ => return Err(Error::InvalidDimensions),
        };
        if points.iter().any(|row| row.len() != width) {
            return Err(Error::InvalidDimensions);
        }

        let mut result = Vec::with_capacity(self.rows());
        for row in &self.elements {
            let mut result_row = Vec::with_capacity(width);
            for col in 0..width {
                let mut sum = ProjectivePoint::IDENTITY;
                for (scalar, point_row) in row.iter().zip(points) {
                    sum += point_row[col] * *scalar;
                }
                result_row.push(sum);
            }
            result.push(result_row);
        }
        Ok(result)
    }

    fn minor(&self, row: usize, col: usize) -> Self {
        let elements = self
            .elements
            .iter()
            .enumerate()
            .filter(|(r, _)| *r != row)
            .map(|(_, elements_row)| {
                elements_row
                    .iter()
                    .enumerate()
                    .filter(|(c, _)| *c != col)
                    .map(|(_, element)| *element)
                    .collect()
            })
            .collect();
        Self { elements }
    }
}
