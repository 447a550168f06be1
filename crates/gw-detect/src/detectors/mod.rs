//! Built-in detectors, one per ecosystem.
//!
//! Each module declares an [`EcosystemProfile`](crate::EcosystemProfile):
//! the manifests to look for, dependency signatures, and marker files.
//! Framework ids must match the ids used by the rule catalog.

use std::sync::Arc;

use crate::detector::FrameworkDetector;

pub mod go;
pub mod java;
pub mod node;
pub mod php;
pub mod python;
pub mod ruby;
pub mod rust;

/// Every built-in detector, in the fixed registration order.
///
/// # Examples
///
/// ```
/// use gw_core::Ecosystem;
/// use gw_detect::default_detectors;
///
/// let ecosystems: Vec<_> = default_detectors().iter().map(|d| d.ecosystem()).collect();
/// assert_eq!(ecosystems, Ecosystem::ALL);
/// ```
#[must_use]
pub fn default_detectors() -> Vec<Arc<dyn FrameworkDetector>> {
    vec![
        Arc::new(node::PROFILE),
        Arc::new(python::PROFILE),
        Arc::new(java::PROFILE),
        Arc::new(rust::PROFILE),
        Arc::new(go::PROFILE),
        Arc::new(php::PROFILE),
        Arc::new(ruby::PROFILE),
    ]
}
