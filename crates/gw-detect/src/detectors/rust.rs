//! Cargo projects.

use gw_core::Ecosystem;

use crate::detector::{EcosystemProfile, FrameworkSignature};

/// Rust detection profile.
pub const PROFILE: EcosystemProfile = EcosystemProfile {
    ecosystem: Ecosystem::Rust,
    manifests: &["Cargo.toml"],
    case_insensitive: false,
    signatures: &[
        FrameworkSignature {
            id: "tauri",
            display_name: "Tauri",
            dependencies: &["tauri"],
            config_files: &["tauri.conf.json"],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "bevy",
            display_name: "Bevy",
            dependencies: &["bevy"],
            config_files: &[],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "rocket",
            display_name: "Rocket",
            dependencies: &["rocket"],
            config_files: &["Rocket.toml"],
            confidence: 0.9,
        },
    ],
    markers: &[],
};
