//! Matbridge Core Library
//!
//! Exact integer/rational linear algebra behind an explicit marshaling
//! layer: host matrices are converted into the flat layouts the compute
//! engines expect, every buffer of arbitrary-precision cells is
//! lifetime-accounted, and every engine call runs inside an interruptible
//! region.
//!
//! # Key Components
//!
//! - [`matrix`] / [`rational`] / [`sparse`] - Host-side representations
//! - [`layout`] - Conversion descriptors between host and engine layouts
//! - [`lease`] - Buffer lifetime accounting across all exit paths
//! - [`interrupt`] - Cooperative cancellation of long engine calls
//! - [`scratch`] - The process-wide scratch stack with mark/rewind sessions
//! - [`engine`] - Gaussian elimination over GF(p)
//! - [`lifting`] - Dixon p-adic lifting for exact solving
//! - [`determinant`] / [`rank`] / [`solve`] / [`nullspace`] / [`hnf`] /
//!   [`eigen`] - The dispatched operations

pub mod crt;
pub mod determinant;
pub mod eigen;
pub mod engine;
pub mod error;
pub mod hnf;
pub mod interrupt;
pub mod layout;
pub mod lease;
pub mod lifting;
pub mod matrix;
pub mod nullspace;
pub mod primes;
pub mod rank;
pub mod rational;
pub mod scratch;
pub mod solve;
pub mod sparse;

pub use determinant::Determinant;
pub use eigen::{eigen_decompose, eigen_decompose_generalized, EigenDecomposition, EigenPair};
pub use engine::{EliminationEngine, ModularEngine};
pub use error::{Error, Result};
pub use hnf::{hermite_form, HnfOptions};
pub use interrupt::{InterruptFlag, InterruptGuard};
pub use layout::{EngineLayout, StrideOrder};
pub use lease::CellBuffer;
pub use lifting::{Lifting, LiftingConfig};
pub use matrix::Matrix;
pub use nullspace::right_kernel;
pub use primes::{PrimeSource, ResidueBasis};
pub use rank::{determinant_bareiss, rank};
pub use rational::Rational;
pub use solve::Solver;
pub use sparse::SparseMatrix;
