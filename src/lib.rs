//! quadrangle - a finite-geometry kernel for generalized quadrangles.
//!
//! Builds GQ(s,t) incidence structures (W(q), Q(4,q), grids), computes
//! their graph invariants, kernel codes and clique-complex cohomology over
//! small finite fields, and their automorphism groups with cross-checks.
//! It then searches for correspondences between edge relations and root
//! systems. Every result is a serializable record from [`schema`].

pub mod cache;
pub mod config;
pub mod correspond;
pub mod error;
pub mod field;
pub mod geometry;
pub mod graph;
pub mod group;
pub mod ingest;
pub mod linalg;
pub mod roots;
pub mod schema;
pub mod session;

pub use error::{InconsistencyError, KernelError, KernelResult};
pub use session::Session;
