//! Statistical summaries for the nevo project.
//!
//! Training and evolution both produce series of `f64` scores (per-iteration
//! costs, per-generation fitness values). This crate summarizes such series
//! without depending on the rest of the workspace.
//!
//! # Examples
//!
//! ```
//! use nevo_stats::descriptive::DescriptiveStats;
//!
//! let fitness = [-4.0, -2.0, -3.0, -1.0, -5.0];
//! let stats = DescriptiveStats::new(fitness).unwrap();
//! assert_eq!(stats.max, -1.0);
//! assert_eq!(stats.mean, -3.0);
//! ```

pub mod descriptive;
