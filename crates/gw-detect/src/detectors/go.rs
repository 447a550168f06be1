//! Go modules.

use gw_core::Ecosystem;

use crate::detector::{EcosystemProfile, FrameworkSignature};

/// Go detection profile.
pub const PROFILE: EcosystemProfile = EcosystemProfile {
    ecosystem: Ecosystem::Go,
    manifests: &["go.mod"],
    case_insensitive: false,
    signatures: &[
        FrameworkSignature {
            id: "gin",
            display_name: "Gin",
            dependencies: &["github.com/gin-gonic/gin"],
            config_files: &[".air.toml"],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "echo",
            display_name: "Echo",
            dependencies: &["github.com/labstack/echo*"],
            config_files: &[".air.toml"],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "fiber",
            display_name: "Fiber",
            dependencies: &["github.com/gofiber/fiber*"],
            config_files: &[".air.toml"],
            confidence: 0.9,
        },
    ],
    markers: &[],
};
