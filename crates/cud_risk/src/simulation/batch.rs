//! Mergeable batches of simulated paths.

/// Paths produced by one or more batches.
///
/// Merging is associative with [`PathBatch::empty`] as identity, so any
/// number of completed batches fold into one ensemble in batch order.
///
/// # Examples
/// ```
/// use cud_risk::simulation::PathBatch;
///
/// let a = PathBatch::new(vec![vec![1.0, 2.0]]);
/// let b = PathBatch::new(vec![vec![1.0, 0.5]]);
/// let merged = PathBatch::empty().merge(a).merge(b);
/// assert_eq!(merged.len(), 2);
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PathBatch {
    paths: Vec<Vec<f64>>,
}

impl PathBatch {
    /// Batch holding the given paths.
    pub fn new(paths: Vec<Vec<f64>>) -> Self {
        Self { paths }
    }

    /// Batch with no paths.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Appends `other` after `self`.
    pub fn merge(mut self, mut other: Self) -> Self {
        self.paths.append(&mut other.paths);
        self
    }

    /// Number of paths.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Whether the batch has no paths.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Paths in order.
    pub fn paths(&self) -> &[Vec<f64>] {
        &self.paths
    }

    /// Consumes the batch, returning its paths.
    pub fn into_paths(self) -> Vec<Vec<f64>> {
        self.paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(values: &[f64]) -> PathBatch {
        PathBatch::new(values.iter().map(|v| vec![*v]).collect())
    }

    #[test]
    fn test_identity() {
        let a = batch(&[1.0, 2.0]);
        assert_eq!(PathBatch::empty().merge(a.clone()), a);
        assert_eq!(a.clone().merge(PathBatch::empty()), a);
    }

    #[test]
    fn test_associative_and_ordered() {
        let (a, b, c) = (batch(&[1.0]), batch(&[2.0, 3.0]), batch(&[4.0]));
        let left = a.clone().merge(b.clone()).merge(c.clone());
        let right = a.merge(b.merge(c));
        assert_eq!(left, right);
        let firsts: Vec<f64> = left.paths().iter().map(|p| p[0]).collect();
        assert_eq!(firsts, vec![1.0, 2.0, 3.0, 4.0]);
    }
}
