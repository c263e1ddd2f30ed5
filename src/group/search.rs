//! Budgeted automorphism search by refinement and individualisation.
//!
//! The search walks down a base b0, b1, … of the graph. At level i the
//! partition has b0..b(i-1) individualised; the first vertex b of the first
//! non-singleton cell becomes the next base point. For every other vertex v
//! of that cell not yet known to be in the orbit of b, a backtracking search
//! looks for an automorphism fixing the earlier base points and sending b to
//! v. Generators found at this level fix b0..b(i-1), so the orbit of b under
//! them is the basic orbit, and the group order is the product of the basic
//! orbit lengths.

use super::{GroupError, Partition, Permutation};
use crate::graph::Graph;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Limits on the automorphism search. Every refinement counts as a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchBudget {
    pub max_nodes: u64,
    #[serde(default, with = "duration_ms")]
    pub max_duration: Option<Duration>,
}

impl Default for SearchBudget {
    fn default() -> Self {
        Self {
            max_nodes: 1_000_000,
            max_duration: None,
        }
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Ok(Option::<u64>::deserialize(d)?.map(Duration::from_millis))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExhaustedBy {
    Nodes,
    Time,
}

/// The automorphism group found by a complete search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutomorphismGroup {
    pub degree: usize,
    pub generators: Vec<Permutation>,
    pub base: Vec<usize>,
    pub orbit_lengths: Vec<usize>,
    pub order: u128,
    /// Refinements performed.
    pub nodes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutomorphismOutcome {
    Complete(AutomorphismGroup),
    /// The budget ran out; nothing is claimed about the group.
    Exhausted { by: ExhaustedBy, nodes: u64 },
}

impl AutomorphismOutcome {
    pub fn group(&self) -> Option<&AutomorphismGroup> {
        match self {
            Self::Complete(g) => Some(g),
            Self::Exhausted { .. } => None,
        }
    }
}

struct Exhausted(ExhaustedBy);

/// The first-path leaf from a partition, with the cell chosen and the cell
/// sizes seen at every depth.
struct Reference {
    cells: Vec<usize>,
    sizes: Vec<Vec<usize>>,
    leaf: Vec<usize>,
}

struct Search<'a> {
    graph: &'a Graph,
    budget: SearchBudget,
    started: Instant,
    nodes: u64,
}

impl Search<'_> {
    fn refined(&mut self, mut p: Partition) -> Result<Partition, Exhausted> {
        self.nodes += 1;
        if self.nodes > self.budget.max_nodes {
            return Err(Exhausted(ExhaustedBy::Nodes));
        }
        if let Some(limit) = self.budget.max_duration
            && self.started.elapsed() > limit
        {
            return Err(Exhausted(ExhaustedBy::Time));
        }
        p.refine(self.graph);
        Ok(p)
    }

    fn reference(&mut self, mut p: Partition) -> Result<Reference, Exhausted> {
        let mut cells = Vec::new();
        let mut sizes = vec![p.cell_sizes()];
        while let Some(cell) = p.first_non_singleton() {
            let v = p.members(cell)[0];
            p = self.refined(p.individualize(v))?;
            cells.push(cell);
            sizes.push(p.cell_sizes());
        }
        Ok(Reference {
            cells,
            sizes,
            leaf: p.labelling().unwrap_or_default(),
        })
    }

    /// Find a leaf below `p` whose labelling, matched against the reference
    /// leaf, is an automorphism.
    fn matching_leaf(
        &mut self,
        p: Partition,
        depth: usize,
        reference: &Reference,
    ) -> Result<Option<Permutation>, Exhausted> {
        if p.cell_sizes() != reference.sizes[depth] {
            return Ok(None);
        }
        let Some(&cell) = reference.cells.get(depth) else {
            return Ok(p.labelling().and_then(|leaf| self.leaf_map(&reference.leaf, &leaf)));
        };
        for v in p.members(cell) {
            let child = self.refined(p.individualize(v))?;
            if let Some(g) = self.matching_leaf(child, depth + 1, reference)? {
                return Ok(Some(g));
            }
        }
        Ok(None)
    }

    /// The map sending the vertex at each position of `from` to the vertex
    /// at the same position of `to`, if it preserves adjacency.
    fn leaf_map(&self, from: &[usize], to: &[usize]) -> Option<Permutation> {
        let mut images = vec![0; from.len()];
        for (&a, &b) in from.iter().zip(to) {
            images[a] = b;
        }
        let preserves = (0..self.graph.order()).all(|u| {
            self.graph
                .neighbors(u)
                .iter()
                .all(|&w| self.graph.adjacent(images[u], images[w]))
        });
        if !preserves {
            return None;
        }
        Permutation::new(images).ok()
    }

    fn run(&mut self, colours: &[u32]) -> Result<AutomorphismGroup, Exhausted> {
        let n = self.graph.order();
        let mut current = self.refined(Partition::from_colours(colours))?;
        let mut generators = Vec::new();
        let mut base = Vec::new();
        let mut orbit_lengths = Vec::new();

        while let Some(cell) = current.first_non_singleton() {
            let members = current.members(cell);
            let b = members[0];
            let fixed = self.refined(current.individualize(b))?;
            let reference = self.reference(fixed.clone())?;

            let mut level: Vec<Permutation> = Vec::new();
            let mut orbit = BTreeSet::from([b]);
            for &v in &members[1..] {
                if orbit.contains(&v) {
                    continue;
                }
                let moved = self.refined(current.individualize(v))?;
                if let Some(g) = self.matching_leaf(moved, 0, &reference)? {
                    level.push(g);
                    orbit = orbit_of(b, &level);
                }
            }
            debug!(
                level = base.len(),
                cell = members.len(),
                orbit = orbit.len(),
                nodes = self.nodes,
                "base point"
            );
            base.push(b);
            orbit_lengths.push(orbit.len());
            generators.extend(level);
            current = fixed;
        }

        let order = orbit_lengths.iter().map(|&l| l as u128).product();
        Ok(AutomorphismGroup {
            degree: n,
            generators,
            base,
            orbit_lengths,
            order,
            nodes: self.nodes,
        })
    }
}

fn orbit_of(point: usize, generators: &[Permutation]) -> BTreeSet<usize> {
    let mut orbit = BTreeSet::from([point]);
    let mut stack = vec![point];
    while let Some(x) = stack.pop() {
        for g in generators {
            let y = g.apply(x);
            if orbit.insert(y) {
                stack.push(y);
            }
        }
    }
    orbit
}

/// Automorphisms of `graph` preserving `colours` (all equal when `None`).
///
/// A colouring must give exactly one colour per vertex.
pub fn automorphisms(
    graph: &Graph,
    colours: Option<&[u32]>,
    budget: SearchBudget,
) -> Result<AutomorphismOutcome, GroupError> {
    let n = graph.order();
    let uniform: Vec<u32> = vec![0; n];
    let colours = match colours {
        Some(c) if c.len() != n => {
            return Err(GroupError::ColouringLength {
                expected: n,
                found: c.len(),
            });
        }
        Some(c) => c,
        None => uniform.as_slice(),
    };
    let mut search = Search {
        graph,
        budget,
        started: Instant::now(),
        nodes: 0,
    };
    match search.run(colours) {
        Ok(group) => {
            info!(
                n,
                order = %group.order,
                generators = group.generators.len(),
                elapsed_ms = search.started.elapsed().as_millis() as u64,
                "automorphism search complete"
            );
            Ok(AutomorphismOutcome::Complete(group))
        }
        Err(Exhausted(by)) => {
            info!(n, nodes = search.nodes, ?by, "automorphism search exhausted");
            Ok(AutomorphismOutcome::Exhausted {
                by,
                nodes: search.nodes,
            })
        }
    }
}
