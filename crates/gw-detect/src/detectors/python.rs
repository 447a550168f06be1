//! Python projects.

use gw_core::Ecosystem;

use crate::detector::{EcosystemProfile, FrameworkSignature, MarkerFile};

/// Python detection profile. Package names are case-insensitive.
pub const PROFILE: EcosystemProfile = EcosystemProfile {
    ecosystem: Ecosystem::Python,
    manifests: &["requirements*.txt", "pyproject.toml", "Pipfile"],
    case_insensitive: true,
    signatures: &[
        FrameworkSignature {
            id: "django",
            display_name: "Django",
            dependencies: &["django"],
            config_files: &["manage.py"],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "flask",
            display_name: "Flask",
            dependencies: &["flask"],
            config_files: &[],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "fastapi",
            display_name: "FastAPI",
            dependencies: &["fastapi"],
            config_files: &[],
            confidence: 0.9,
        },
        FrameworkSignature {
            id: "jupyter",
            display_name: "Jupyter",
            dependencies: &["jupyter", "jupyterlab", "notebook"],
            config_files: &[],
            confidence: 0.8,
        },
    ],
    markers: &[MarkerFile {
        path: "manage.py",
        id: "django",
        display_name: "Django",
        confidence: 0.98,
    }],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detector::FrameworkDetector;
    use camino::Utf8Path;
    use std::fs;

    #[test]
    fn test_dependency_names_are_case_insensitive() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::write(root.join("requirements-prod.txt"), "Flask==3.0\n").unwrap();

        let report = PROFILE.detect(root);
        let ids: Vec<_> = report.detections.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, ["python", "flask"]);
    }

    #[test]
    fn test_manage_py_marker_outranks_dependency() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();
        fs::create_dir(root.join("backend")).unwrap();
        fs::write(root.join("backend/pyproject.toml"), "[project]\ndependencies = [\"Django>=5\"]\n").unwrap();
        fs::write(root.join("backend/manage.py"), "").unwrap();

        let report = PROFILE.detect(root);
        let django = report.detections.iter().find(|d| d.id.as_str() == "django").unwrap();
        assert!((django.confidence - 0.98).abs() < f32::EPSILON);
        assert_eq!(django.detected_at_path, root.join("backend/manage.py"));
    }
}
