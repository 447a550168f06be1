//! JVM projects built with Maven or Gradle.

use gw_core::Ecosystem;

use crate::detector::{EcosystemProfile, FrameworkSignature, MarkerFile};

/// Java detection profile.
pub const PROFILE: EcosystemProfile = EcosystemProfile {
    ecosystem: Ecosystem::Java,
    manifests: &["pom.xml", "build.gradle", "build.gradle.kts"],
    case_insensitive: false,
    signatures: &[
        FrameworkSignature {
            id: "spring-boot",
            display_name: "Spring Boot",
            dependencies: &["org.springframework.boot", "spring-boot-starter*"],
            config_files: &[
                "src/main/resources/application.properties",
                "src/main/resources/application.yml",
            ],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "quarkus",
            display_name: "Quarkus",
            dependencies: &["io.quarkus", "quarkus-*"],
            config_files: &[],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "android",
            display_name: "Android",
            dependencies: &["com.android.application", "com.android.library"],
            config_files: &["src/main/AndroidManifest.xml"],
            confidence: 0.9,
        },
    ],
    markers: &[
        MarkerFile {
            path: "mvnw",
            id: "maven",
            display_name: "Maven",
            confidence: 0.95,
        },
        MarkerFile {
            path: "pom.xml",
            id: "maven",
            display_name: "Maven",
            confidence: 0.9,
        },
        MarkerFile {
            path: "gradlew",
            id: "gradle",
            display_name: "Gradle",
            confidence: 0.95,
        },
        MarkerFile {
            path: "build.gradle",
            id: "gradle",
            display_name: "Gradle",
            confidence: 0.9,
        },
        MarkerFile {
            path: "build.gradle.kts",
            id: "gradle",
            display_name: "Gradle",
            confidence: 0.9,
        },
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::FrameworkDetector;
    use camino::Utf8Path;
    use std::fs;

    #[test]
    fn test_spring_boot_maven_project() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(
            root.join("pom.xml"),
            "<project><dependencies><dependency>\
             <groupId>org.springframework.boot</groupId>\
             <artifactId>spring-boot-starter-web</artifactId>\
             </dependency></dependencies></project>",
        )
        .unwrap();
        fs::write(root.join("mvnw"), "#!/bin/sh").unwrap();

        let report = PROFILE.detect(root);
        let ids: Vec<_> = report.detections.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["java", "spring-boot", "maven"]);
        let maven = &report.detections[2];
        assert!((maven.confidence - 0.95).abs() < f32::EPSILON);
    }
}
