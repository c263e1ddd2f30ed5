//! Permutation groups and the automorphism search.
//!
//! Two independent routes lead to a group order:
//!
//! 1. [`automorphisms`] searches the graph directly, by partition refinement
//!    and individualisation, and multiplies the basic orbit lengths.
//! 2. [`PermutationGroup::order`] closes a generator list breadth-first.
//!
//! [`cross_check_order`] compares the two.

mod permutation;
mod refine;
mod search;

pub use permutation::Permutation;
pub use refine::Partition;
pub use search::{AutomorphismGroup, AutomorphismOutcome, ExhaustedBy, SearchBudget, automorphisms};

use crate::error::InconsistencyError;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("not a permutation: {detail}")]
    NotAPermutation { detail: String },
    #[error("generator acts on {found} points, expected {expected}")]
    DegreeMismatch { expected: usize, found: usize },
    #[error("point {point} outside 0..{degree}")]
    PointOutOfRange { point: usize, degree: usize },
    #[error("closure exceeds {limit} elements")]
    ClosureLimit { limit: usize },
    #[error("colouring has {found} entries for {expected} vertices")]
    ColouringLength { expected: usize, found: usize },
}

/// A group given by generators, with a lazily computed element list.
///
/// The closure is cached inside the value; a group with other generators is
/// a new value with an empty cache.
#[derive(Debug, Clone)]
pub struct PermutationGroup {
    degree: usize,
    generators: Vec<Permutation>,
    closure: OnceLock<Vec<Permutation>>,
}

impl PermutationGroup {
    pub fn new(degree: usize, generators: Vec<Permutation>) -> Result<Self, GroupError> {
        if let Some(g) = generators.iter().find(|g| g.degree() != degree) {
            return Err(GroupError::DegreeMismatch {
                expected: degree,
                found: g.degree(),
            });
        }
        let generators = generators.into_iter().filter(|g| !g.is_identity()).collect();
        Ok(Self {
            degree,
            generators,
            closure: OnceLock::new(),
        })
    }

    pub fn from_images(degree: usize, images: Vec<Vec<usize>>) -> Result<Self, GroupError> {
        let generators = images
            .into_iter()
            .map(Permutation::new)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(degree, generators)
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn generators(&self) -> &[Permutation] {
        &self.generators
    }

    /// Same group acting on the same points, with extra generators.
    pub fn with_generators(&self, extra: Vec<Permutation>) -> Result<Self, GroupError> {
        let mut all = self.generators.clone();
        all.extend(extra);
        Self::new(self.degree, all)
    }

    /// Every element, by breadth-first closure. Fails past `limit` elements;
    /// a successful closure is cached.
    pub fn elements(&self, limit: usize) -> Result<&[Permutation], GroupError> {
        if let Some(cached) = self.closure.get() {
            return Ok(cached);
        }
        let identity = Permutation::identity(self.degree);
        let mut seen: HashSet<Permutation> = HashSet::from([identity.clone()]);
        let mut elements = vec![identity.clone()];
        let mut queue = VecDeque::from([identity]);
        while let Some(g) = queue.pop_front() {
            for s in &self.generators {
                let h = g.then(s);
                if seen.insert(h.clone()) {
                    if elements.len() >= limit {
                        return Err(GroupError::ClosureLimit { limit });
                    }
                    elements.push(h.clone());
                    queue.push_back(h);
                }
            }
        }
        debug!(degree = self.degree, order = elements.len(), "closure computed");
        Ok(self.closure.get_or_init(|| elements))
    }

    pub fn order(&self, limit: usize) -> Result<u128, GroupError> {
        Ok(self.elements(limit)?.len() as u128)
    }

    fn check_point(&self, point: usize) -> Result<(), GroupError> {
        if point >= self.degree {
            return Err(GroupError::PointOutOfRange {
                point,
                degree: self.degree,
            });
        }
        Ok(())
    }

    /// Orbit of `point` with a transversal: `transversal[x]` maps `point` to x.
    pub fn orbit_transversal(
        &self,
        point: usize,
    ) -> Result<BTreeMap<usize, Permutation>, GroupError> {
        self.check_point(point)?;
        let mut transversal = BTreeMap::from([(point, Permutation::identity(self.degree))]);
        let mut queue = VecDeque::from([point]);
        while let Some(x) = queue.pop_front() {
            for s in &self.generators {
                let y = s.apply(x);
                if !transversal.contains_key(&y) {
                    let t = transversal[&x].then(s);
                    transversal.insert(y, t);
                    queue.push_back(y);
                }
            }
        }
        Ok(transversal)
    }

    pub fn orbit(&self, point: usize) -> Result<Vec<usize>, GroupError> {
        Ok(self.orbit_transversal(point)?.into_keys().collect())
    }

    /// The orbits, a partition of `0..degree`, ordered by smallest point.
    pub fn orbits(&self) -> Vec<Vec<usize>> {
        let mut parent: Vec<usize> = (0..self.degree).collect();
        fn find(parent: &mut [usize], mut x: usize) -> usize {
            while parent[x] != x {
                parent[x] = parent[parent[x]];
                x = parent[x];
            }
            x
        }
        for g in &self.generators {
            for x in 0..self.degree {
                let (a, b) = (find(&mut parent, x), find(&mut parent, g.apply(x)));
                if a != b {
                    parent[a.max(b)] = a.min(b);
                }
            }
        }
        let mut classes: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for x in 0..self.degree {
            let root = find(&mut parent, x);
            classes.entry(root).or_default().push(x);
        }
        classes.into_values().collect()
    }

    /// Stabilizer of `point`, generated by Schreier generators.
    pub fn stabilizer(&self, point: usize) -> Result<PermutationGroup, GroupError> {
        let transversal = self.orbit_transversal(point)?;
        let mut schreier = Vec::new();
        let mut seen = HashSet::new();
        for (&x, t) in &transversal {
            for s in &self.generators {
                let back = transversal[&s.apply(x)].inverse();
                let g = t.then(s).then(&back);
                if !g.is_identity() && seen.insert(g.clone()) {
                    schreier.push(g);
                }
            }
        }
        PermutationGroup::new(self.degree, schreier)
    }

    /// Check |orbit(point)|·|Stab(point)| = |G|.
    pub fn check_orbit_stabilizer(&self, point: usize, limit: usize) -> Result<(), CheckError> {
        let order = self.order(limit)?;
        let orbit = self.orbit(point)?.len();
        let stabilizer = self.stabilizer(point)?.order(limit)?;
        if orbit as u128 * stabilizer != order {
            return Err(InconsistencyError::OrbitStabilizer {
                point,
                orbit,
                stabilizer,
                order,
            }
            .into());
        }
        Ok(())
    }
}

/// Either the group computation failed or its results disagree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckError {
    #[error(transparent)]
    Group(#[from] GroupError),
    #[error(transparent)]
    Inconsistent(#[from] InconsistencyError),
}

/// Compare the searched group order with the closure of independent generators.
pub fn cross_check_order(
    searched: &AutomorphismGroup,
    independent: &PermutationGroup,
    limit: usize,
) -> Result<u128, CheckError> {
    let closure = independent.order(limit)?;
    if closure != searched.order {
        return Err(InconsistencyError::GroupOrderMismatch {
            search: searched.order,
            closure,
        }
        .into());
    }
    Ok(closure)
}
