//! Correspondence search between derived graphs and root-system graphs.
//!
//! The search runs in four stages:
//!
//! 1. **Classify** every unordered pair of edges of the source graph by its
//!    [`RelationClass`].
//! 2. **Combine** each non-empty set of classes into a graph on the edges and
//!    keep the regular ones.
//! 3. **Compare** each regular candidate's order, degree and spectrum with
//!    every target.
//! 4. **Report** matches, near-matches and a [`Verdict`].
//!
//! Zero matches is a result, not a failure.

mod classify;
mod combine;
mod report;

pub use classify::{ClassMembers, Classification, RelationClass, classify, relation};
pub use combine::{Candidate, CombineOutcome, combine};
pub use report::{
    CandidateSummary, ClassCount, CorrespondenceReport, Match, NearMatch, SearchOptions,
    SpectrumPolicy, Target, TargetSummary, Verdict, compare, search,
};
