//! Training boundary: numeric design matrix and target for external model collaborators.

mod matrix;

pub use matrix::{DesignMatrix, NUMERIC_FEATURES};
