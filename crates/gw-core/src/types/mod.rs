//! Domain types for gitward.
//!
//! # Module Organization
//!
//! - [`severity`] - Rule urgency tiers
//! - [`rule`] - Ignore rules and pattern normalization
//! - [`framework`] - Ecosystems, framework ids and detections
//!
//! All public types are re-exported here and at the crate root:
//!
//! ```
//! use gw_core::{Ecosystem, FrameworkDetection, Rule, Severity};
//! ```

mod framework;
mod rule;
mod severity;

pub use framework::{Ecosystem, FrameworkDetection, FrameworkId};
pub use rule::{Rule, normalize_pattern};
pub use severity::{ParseSeverityError, Severity};
