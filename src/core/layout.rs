//! Block structure of the Gram matrix for each equation family.
//!
//! The collocation method measures the unknown function through several
//! linear operators (e.g., the Laplacian at interior points and point values
//! everywhere). Each such measurement is a *block*: an operator together with
//! the set of points it is applied at. Stacking the blocks gives the ordering
//! of rows and columns of the Gram matrix, of the residual vector and of the
//! cross-covariance used for prediction.

use std::ops::Range;

use super::{
    base::Pde,
    points::{CollocationSet, Point},
};
use crate::kernel::{Axis, Operator};

/// Points that a block is measured at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    /// Interior points only.
    Domain,
    /// Interior points followed by boundary points.
    All,
}

/// Linear measurement of the unknown function.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    operator: Operator,
    support: Support,
}

impl Block {
    /// Creates a block measuring `operator` at `support`.
    pub fn new(operator: Operator, support: Support) -> Self {
        Self { operator, support }
    }

    /// Operator applied to the function.
    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    /// Points the operator is applied at.
    pub fn support(&self) -> Support {
        self.support
    }
}

/// Ordered blocks of a family with the point counts fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    blocks: Vec<Block>,
    offsets: Vec<usize>,
    n_domain: usize,
    n_boundary: usize,
}

impl Layout {
    /// Layout of the family `pde` for given point counts.
    ///
    /// The last block is always the value block on all points.
    pub fn new(pde: &Pde, n_domain: usize, n_boundary: usize) -> Self {
        let blocks = match *pde {
            Pde::Elliptic { .. } => vec![
                Block::new(Operator::laplacian(), Support::Domain),
                Block::new(Operator::identity(), Support::All),
            ],
            Pde::Burgers { nu, .. } => vec![
                Block::new(Operator::advection_diffusion(nu), Support::Domain),
                Block::new(Operator::partial(Axis::Second), Support::Domain),
                Block::new(Operator::identity(), Support::All),
            ],
            Pde::Eikonal { .. } => vec![
                Block::new(Operator::partial(Axis::First), Support::Domain),
                Block::new(Operator::partial(Axis::Second), Support::Domain),
                Block::new(Operator::laplacian(), Support::Domain),
                Block::new(Operator::identity(), Support::All),
            ],
        };

        Self::from_blocks(blocks, n_domain, n_boundary)
    }

    /// Layout with custom blocks.
    pub fn from_blocks(blocks: Vec<Block>, n_domain: usize, n_boundary: usize) -> Self {
        let mut offsets = Vec::with_capacity(blocks.len() + 1);
        let mut offset = 0;
        offsets.push(offset);
        for block in &blocks {
            offset += match block.support {
                Support::Domain => n_domain,
                Support::All => n_domain + n_boundary,
            };
            offsets.push(offset);
        }

        Self {
            blocks,
            offsets,
            n_domain,
            n_boundary,
        }
    }

    /// The blocks in order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Total number of measurements, i.e., the size of the Gram matrix.
    pub fn dim(&self) -> usize {
        self.offsets[self.blocks.len()]
    }

    /// Indices of block `b` in the stacked ordering.
    pub fn range(&self, b: usize) -> Range<usize> {
        self.offsets[b]..self.offsets[b + 1]
    }

    /// Index of the reference block used for trace ratios (the value block).
    pub fn reference(&self) -> usize {
        self.blocks.len() - 1
    }

    /// Number of interior points.
    pub fn n_domain(&self) -> usize {
        self.n_domain
    }

    /// Number of boundary points.
    pub fn n_boundary(&self) -> usize {
        self.n_boundary
    }

    /// Operator and point of every measurement in the stacked ordering.
    pub fn nodes<'a>(&'a self, points: &CollocationSet) -> Vec<(&'a Operator, Point)> {
        debug_assert_eq!(points.n_domain(), self.n_domain);
        debug_assert_eq!(points.n_boundary(), self.n_boundary);

        self.blocks
            .iter()
            .flat_map(|block| {
                let pts: Vec<Point> = match block.support {
                    Support::Domain => points.domain().to_vec(),
                    Support::All => points.all().copied().collect(),
                };
                pts.into_iter().map(move |x| (&block.operator, x))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use nalgebra::point;

    #[test]
    fn sizes_per_family() {
        let (n, nb) = (7, 5);

        assert_eq!(Layout::new(&Pde::elliptic(1.0, 3), n, nb).dim(), 2 * n + nb);
        assert_eq!(Layout::new(&Pde::burgers(1.0, 0.02), n, nb).dim(), 3 * n + nb);
        assert_eq!(Layout::new(&Pde::eikonal(0.1), n, nb).dim(), 4 * n + nb);
    }

    #[test]
    fn ranges_are_contiguous() {
        let layout = Layout::new(&Pde::eikonal(0.1), 4, 3);

        assert_eq!(layout.range(0), 0..4);
        assert_eq!(layout.range(1), 4..8);
        assert_eq!(layout.range(2), 8..12);
        assert_eq!(layout.range(3), 12..19);
        assert_eq!(layout.reference(), 3);
    }

    #[test]
    fn nodes_follow_ordering() {
        let points = CollocationSet::new(
            vec![point![0.5, 0.5], point![0.25, 0.75]],
            vec![point![0.0, 0.0]],
        );
        let layout = Layout::new(&Pde::elliptic(1.0, 3), 2, 1);
        let nodes = layout.nodes(&points);

        assert_eq!(nodes.len(), layout.dim());
        assert_eq!(*nodes[0].0, Operator::laplacian());
        assert_eq!(nodes[1].1, point![0.25, 0.75]);
        assert_eq!(*nodes[2].0, Operator::identity());
        assert_eq!(nodes[2].1, point![0.5, 0.5]);
        assert_eq!(nodes[4].1, point![0.0, 0.0]);
    }
}
