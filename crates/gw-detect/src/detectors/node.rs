//! JavaScript and TypeScript projects.

use gw_core::Ecosystem;

use crate::detector::{EcosystemProfile, FrameworkSignature, MarkerFile};

/// Node.js detection profile.
pub const PROFILE: EcosystemProfile = EcosystemProfile {
    ecosystem: Ecosystem::Node,
    manifests: &["package.json"],
    case_insensitive: false,
    signatures: &[
        FrameworkSignature {
            id: "nextjs",
            display_name: "Next.js",
            dependencies: &["next"],
            config_files: &["next.config.js", "next.config.mjs", "next.config.ts"],
            confidence: 0.95,
        },
        FrameworkSignature {
            id: "nuxt",
            display_name: "Nuxt",
            dependencies: &["nuxt", "nuxt3"],
            config_files: &["nuxt.config.js", "nuxt.config.ts"],
            confidence: 0.95,
        },
        FrameworkSignature {
            id: "gatsby",
            display_name: "Gatsby",
            dependencies: &["gatsby"],
            config_files: &["gatsby-config.js", "gatsby-config.ts"],
            confidence: 0.95,
        },
        FrameworkSignature {
            id: "angular",
            display_name: "Angular",
            dependencies: &["@angular/core"],
            config_files: &["angular.json"],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "svelte",
            display_name: "Svelte",
            dependencies: &["svelte", "@sveltejs/kit"],
            config_files: &["svelte.config.js"],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "nestjs",
            display_name: "NestJS",
            dependencies: &["@nestjs/core"],
            config_files: &["nest-cli.json"],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "electron",
            display_name: "Electron",
            dependencies: &["electron"],
            config_files: &["electron-builder.yml", "electron-builder.json"],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "react",
            display_name: "React",
            dependencies: &["react"],
            config_files: &[],
            confidence: 0.85,
        },
        FrameworkSignature {
            id: "vue",
            display_name: "Vue",
            dependencies: &["vue"],
            config_files: &["vue.config.js"],
            confidence: 0.85,
        },
        FrameworkSignature {
            id: "vite",
            display_name: "Vite",
            dependencies: &["vite"],
            config_files: &["vite.config.js", "vite.config.ts", "vite.config.mjs"],
            confidence: 0.85,
        },
        FrameworkSignature {
            id: "express",
            display_name: "Express",
            dependencies: &["express"],
            config_files: &[],
            confidence: 0.8,
        },
    ],
    markers: &[MarkerFile {
        path: "angular.json",
        id: "angular",
        display_name: "Angular",
        confidence: 0.95,
    }],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::FrameworkDetector;
    use camino::Utf8Path;
    use std::fs;

    #[test]
    fn test_nextjs_project() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(
            root.join("package.json"),
            r#"{"dependencies": {"next": "14.2.0", "react": "18.3.0"}}"#,
        )
        .unwrap();
        fs::write(root.join("next.config.js"), "module.exports = {};").unwrap();

        let report = PROFILE.detect(root);
        let confidence = |id: &str| {
            report
                .detections
                .iter()
                .find(|d| d.id.as_str() == id)
                .map(|d| d.confidence)
        };
        assert_eq!(confidence("node"), Some(0.8));
        assert!(confidence("nextjs").is_some_and(|c| (c - 1.0).abs() < 1e-6));
        assert_eq!(confidence("react"), Some(0.85));
        assert!(confidence("vue").is_none());
    }

    #[test]
    fn test_dependencies_are_case_sensitive() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(root.join("package.json"), r#"{"dependencies": {"React": "1"}}"#).unwrap();

        let report = PROFILE.detect(root);
        assert!(report.detections.iter().all(|d| d.id.as_str() != "react"));
    }
}
