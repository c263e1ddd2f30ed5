//! Permutations of `0..degree`.

use super::GroupError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bijection of `0..degree`, stored as its image list: `i ↦ images[i]`.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "Vec<usize>", into = "Vec<usize>")]
pub struct Permutation {
    images: Vec<usize>,
}

impl Permutation {
    pub fn new(images: Vec<usize>) -> Result<Self, GroupError> {
        let n = images.len();
        let mut seen = vec![false; n];
        for (i, &x) in images.iter().enumerate() {
            if x >= n {
                return Err(GroupError::NotAPermutation {
                    detail: format!("image {x} of {i} is outside 0..{n}"),
                });
            }
            if seen[x] {
                return Err(GroupError::NotAPermutation {
                    detail: format!("{x} is hit twice"),
                });
            }
            seen[x] = true;
        }
        Ok(Self { images })
    }

    pub fn identity(degree: usize) -> Self {
        Self {
            images: (0..degree).collect(),
        }
    }

    pub fn degree(&self) -> usize {
        self.images.len()
    }

    #[inline]
    pub fn apply(&self, point: usize) -> usize {
        self.images[point]
    }

    pub fn images(&self) -> &[usize] {
        &self.images
    }

    pub fn is_identity(&self) -> bool {
        self.images.iter().enumerate().all(|(i, &x)| i == x)
    }

    /// `self` first, then `other`: i ↦ other(self(i)).
    pub fn then(&self, other: &Self) -> Self {
        Self {
            images: self.images.iter().map(|&x| other.images[x]).collect(),
        }
    }

    pub fn inverse(&self) -> Self {
        let mut images = vec![0; self.images.len()];
        for (i, &x) in self.images.iter().enumerate() {
            images[x] = i;
        }
        Self { images }
    }

    /// Cycles of length > 1, each starting at its smallest point.
    pub fn cycles(&self) -> Vec<Vec<usize>> {
        let mut seen = vec![false; self.degree()];
        let mut out = Vec::new();
        for start in 0..self.degree() {
            if seen[start] || self.images[start] == start {
                continue;
            }
            let mut cycle = Vec::new();
            let mut x = start;
            while !seen[x] {
                seen[x] = true;
                cycle.push(x);
                x = self.images[x];
            }
            out.push(cycle);
        }
        out
    }

    /// Element order, the lcm of the cycle lengths.
    pub fn order(&self) -> u64 {
        fn gcd(a: u64, b: u64) -> u64 {
            if b == 0 { a } else { gcd(b, a % b) }
        }
        self.cycles()
            .iter()
            .map(|c| c.len() as u64)
            .fold(1, |acc, len| acc / gcd(acc, len) * len)
    }
}

impl TryFrom<Vec<usize>> for Permutation {
    type Error = GroupError;

    fn try_from(images: Vec<usize>) -> Result<Self, Self::Error> {
        Self::new(images)
    }
}

impl From<Permutation> for Vec<usize> {
    fn from(p: Permutation) -> Self {
        p.images
    }
}

impl fmt::Debug for Permutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_identity() {
            return write!(f, "()");
        }
        for cycle in self.cycles() {
            let parts: Vec<String> = cycle.iter().map(usize::to_string).collect();
            write!(f, "({})", parts.join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_bijections() {
        assert!(matches!(
            Permutation::new(vec![0, 0, 1]),
            Err(GroupError::NotAPermutation { .. })
        ));
        assert!(Permutation::new(vec![0, 3]).is_err());
    }

    #[test]
    fn test_composition_order() {
        let a = Permutation::new(vec![1, 2, 0]).unwrap();
        let b = Permutation::new(vec![1, 0, 2]).unwrap();
        // a then b: 0 -> 1 -> 0
        assert_eq!(a.then(&b).apply(0), 0);
        assert_eq!(b.then(&a).apply(0), 2);
        assert!(a.then(&a.inverse()).is_identity());
    }

    #[test]
    fn test_cycles_and_order() {
        let p = Permutation::new(vec![1, 0, 3, 4, 2, 5]).unwrap();
        assert_eq!(p.cycles(), vec![vec![0, 1], vec![2, 3, 4]]);
        assert_eq!(p.order(), 6);
        assert_eq!(format!("{p:?}"), "(0 1)(2 3 4)");
    }

    #[test]
    fn test_serde_validates() {
        let p: Permutation = serde_json::from_str("[2, 0, 1]").unwrap();
        assert_eq!(p.apply(0), 2);
        assert!(serde_json::from_str::<Permutation>("[1, 1]").is_err());
        assert_eq!(serde_json::to_string(&p).unwrap(), "[2,0,1]");
    }
}
