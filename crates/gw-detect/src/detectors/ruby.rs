//! Bundler-managed Ruby projects.

use gw_core::Ecosystem;

use crate::detector::{EcosystemProfile, FrameworkSignature, MarkerFile};

/// Ruby detection profile. Gem names are case-insensitive.
pub const PROFILE: EcosystemProfile = EcosystemProfile {
    ecosystem: Ecosystem::Ruby,
    manifests: &["Gemfile"],
    case_insensitive: true,
    signatures: &[
        FrameworkSignature {
            id: "rails",
            display_name: "Ruby on Rails",
            dependencies: &["rails"],
            config_files: &["config/application.rb"],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "sinatra",
            display_name: "Sinatra",
            dependencies: &["sinatra"],
            config_files: &["config.ru"],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "jekyll",
            display_name: "Jekyll",
            dependencies: &["jekyll"],
            config_files: &["_config.yml"],
            confidence: 0.9,
        },
    ],
    markers: &[MarkerFile {
        path: "bin/rails",
        id: "rails",
        display_name: "Ruby on Rails",
        confidence: 0.98,
    }],
};
