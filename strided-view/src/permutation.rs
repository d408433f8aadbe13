//! Axis permutations, given directly or derived from label sequences.

use std::sync::Arc;

use crate::{Result, StridedError};

/// Bijective map from source axis to destination axis.
///
/// Entry `j` is the destination position of source axis `j`, so a source
/// multi-index `i` lands at destination index `t` with `t[perm[j]] = i[j]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permutation {
    dest: Arc<[usize]>,
}

impl Permutation {
    /// Create a permutation, checking it is a bijection over `[0, len)`.
    pub fn new(dest: &[usize]) -> Result<Self> {
        let rank = dest.len();
        let mut seen = vec![false; rank];
        for &d in dest {
            if d >= rank || seen[d] {
                return Err(StridedError::InvalidPermutation(dest.to_vec()));
            }
            seen[d] = true;
        }
        Ok(Self {
            dest: Arc::from(dest),
        })
    }

    /// The identity permutation of the given rank.
    pub fn identity(rank: usize) -> Self {
        Self {
            dest: (0..rank).collect(),
        }
    }

    /// Derive the permutation taking axes labelled `src` to axes labelled
    /// `dst`.
    ///
    /// Each source label must match exactly one destination label, and no two
    /// source labels may match the same destination axis.
    pub fn from_labels<L: PartialEq>(src: &[L], dst: &[L]) -> Result<Self> {
        if src.len() != dst.len() {
            return Err(StridedError::LabelLengthMismatch(src.len(), dst.len()));
        }
        let rank = src.len();
        let mut dest = vec![0usize; rank];
        let mut claimed: Vec<Option<usize>> = vec![None; rank];
        for (j, label) in src.iter().enumerate() {
            let mut matches = dst
                .iter()
                .enumerate()
                .filter(|(_, l)| *l == label)
                .map(|(k, _)| k);
            let k = matches.next().ok_or(StridedError::LabelNotFound(j))?;
            if matches.next().is_some() {
                return Err(StridedError::AmbiguousLabel(j));
            }
            if let Some(first) = claimed[k] {
                return Err(StridedError::DuplicateLabelTarget {
                    first,
                    second: j,
                    dest: k,
                });
            }
            claimed[k] = Some(j);
            dest[j] = k;
        }
        tracing::debug!(rank, perm = ?dest, "permutation derived from labels");
        Ok(Self {
            dest: Arc::from(dest),
        })
    }

    #[inline]
    pub fn rank(&self) -> usize {
        self.dest.len()
    }

    /// Destination axis of source axis `j`.
    #[inline]
    pub fn dest(&self, j: usize) -> usize {
        self.dest[j]
    }

    #[inline]
    pub fn as_slice(&self) -> &[usize] {
        &self.dest
    }

    pub fn is_identity(&self) -> bool {
        self.dest.iter().enumerate().all(|(j, &d)| j == d)
    }

    /// The permutation undoing this one.
    pub fn inverse(&self) -> Self {
        let mut inv = vec![0usize; self.rank()];
        for (j, &d) in self.dest.iter().enumerate() {
            inv[d] = j;
        }
        Self {
            dest: Arc::from(inv),
        }
    }

    /// Destination multi-index of source multi-index `index`.
    pub fn apply_to_index(&self, index: &[usize]) -> Vec<usize> {
        let mut out = vec![0usize; self.rank()];
        for (j, &i) in index.iter().enumerate() {
            out[self.dest[j]] = i;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let p = Permutation::new(&[2, 0, 1]).unwrap();
        assert_eq!(p.rank(), 3);
        assert_eq!(p.dest(0), 2);
        assert!(!p.is_identity());
    }

    #[test]
    fn test_new_rejects_non_bijection() {
        assert_eq!(
            Permutation::new(&[0, 0]),
            Err(StridedError::InvalidPermutation(vec![0, 0]))
        );
        assert!(Permutation::new(&[0, 2]).is_err());
    }

    #[test]
    fn test_rank_zero() {
        let p = Permutation::new(&[]).unwrap();
        assert_eq!(p.rank(), 0);
        assert!(p.is_identity());
        assert!(p.apply_to_index(&[]).is_empty());
    }

    #[test]
    fn test_inverse() {
        let p = Permutation::new(&[2, 0, 3, 1]).unwrap();
        let inv = p.inverse();
        let idx = [5, 6, 7, 8];
        assert_eq!(inv.apply_to_index(&p.apply_to_index(&idx)), idx.to_vec());
        assert!(Permutation::identity(4).inverse().is_identity());
    }

    #[test]
    fn test_apply_to_index() {
        let p = Permutation::new(&[1, 0]).unwrap();
        assert_eq!(p.apply_to_index(&[1, 2]), vec![2, 1]);
    }

    #[test]
    fn test_from_labels() {
        let p = Permutation::from_labels(&['i', 'j', 'k'], &['k', 'i', 'j']).unwrap();
        assert_eq!(p.as_slice(), &[1, 2, 0]);
    }

    #[test]
    fn test_from_labels_empty() {
        let p = Permutation::from_labels::<u32>(&[], &[]).unwrap();
        assert_eq!(p.rank(), 0);
    }

    #[test]
    fn test_from_labels_errors() {
        assert_eq!(
            Permutation::from_labels(&[1, 2], &[1]),
            Err(StridedError::LabelLengthMismatch(2, 1))
        );
        assert_eq!(
            Permutation::from_labels(&[1, 3], &[2, 1]),
            Err(StridedError::LabelNotFound(1))
        );
        assert_eq!(
            Permutation::from_labels(&[1, 1], &[1, 1]),
            Err(StridedError::AmbiguousLabel(0))
        );
        assert_eq!(
            Permutation::from_labels(&[1, 1], &[1, 2]),
            Err(StridedError::DuplicateLabelTarget {
                first: 0,
                second: 1,
                dest: 0
            })
        );
    }
}
