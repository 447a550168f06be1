//! Composer-managed PHP projects.

use gw_core::Ecosystem;

use crate::detector::{EcosystemProfile, FrameworkSignature, MarkerFile};

/// PHP detection profile. Composer package names are case-insensitive.
pub const PROFILE: EcosystemProfile = EcosystemProfile {
    ecosystem: Ecosystem::Php,
    manifests: &["composer.json"],
    case_insensitive: true,
    signatures: &[
        FrameworkSignature {
            id: "laravel",
            display_name: "Laravel",
            dependencies: &["laravel/framework"],
            config_files: &["artisan"],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "symfony",
            display_name: "Symfony",
            dependencies: &["symfony/framework-bundle"],
            config_files: &["symfony.lock"],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "wordpress",
            display_name: "WordPress",
            dependencies: &["johnpbloch/wordpress*", "roots/wordpress*"],
            config_files: &[],
            confidence: 0.85,
        },
    ],
    markers: &[
        MarkerFile {
            path: "artisan",
            id: "laravel",
            display_name: "Laravel",
            confidence: 0.98,
        },
        MarkerFile {
            path: "bin/console",
            id: "symfony",
            display_name: "Symfony",
            confidence: 0.95,
        },
        MarkerFile {
            path: "wp-config.php",
            id: "wordpress",
            display_name: "WordPress",
            confidence: 0.95,
        },
    ],
};
