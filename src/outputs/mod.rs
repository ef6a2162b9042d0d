//! Output stage: checking and persisting the aggregate artifact.
//!
//! # Submodules
//!
//! - [`json`]: Writes [`AggregateOutput`](crate::models::AggregateOutput) to disk
//! - [`validate`]: Post-run sanity checks reported as warnings
//!
//! # Output Structure
//!
//! ```text
//! public/
//! └── data.json   # { articles, x_viral, reddit_viral }
//! ```

pub mod json;
pub mod validate;
