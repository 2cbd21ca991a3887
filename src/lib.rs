//! # Land Audit
//!
//! Evaluates land development proposals against the Bertaud density model
//! and a 30-year lease audit, and grades blueprints.
//!
//! ## Features
//!
//! - Proposed, theoretical and legal FAR with an UNDER/OPTIMAL/OVER verdict
//! - Lease NPV, construction cost audit and return on assets
//! - Gap analysis, zone-aware density bands and polycentric density
//! - Blueprint grading through local or hosted graders
//! - Five-page text report, JSON and CSV exports
//! - Terminal dashboard with live recomputation
//!
//! ## Example
//!
//! ```
//! use land_audit::engine::far::calculate_far;
//! use land_audit::model::{FarInputs, FarStatus};
//!
//! let evaluation = calculate_far(&FarInputs::new(5.0, 40_000.0, 10.0, 0.1, 2.0))?;
//! assert_eq!(evaluation.proposed_far, 5.0);
//! assert_eq!(evaluation.status, FarStatus::Under);
//! # Ok::<(), land_audit::error::FarError>(())
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod export;
pub mod grading;
pub mod loader;
pub mod map;
pub mod model;
pub mod settings;
pub mod ui;
