//! Best-effort dependency extraction from project manifests.
//!
//! JSON and TOML manifests are deserialized properly. Build descriptors
//! (`pom.xml`, Gradle scripts, `go.mod`, `Gemfile`) are scanned with
//! section-scoped regular expressions instead of real parsers: good enough to
//! spot a framework dependency, not good enough to resolve versions.

use std::sync::LazyLock;

use camino::Utf8Path;
use regex::Regex;
use serde_json::Value;

use crate::error::DetectError;

static POM_SECTION: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(?s)<(?:dependencies|parent|plugins)>(.*?)</(?:dependencies|parent|plugins)>").ok()
});

static POM_COORDINATE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"<(?:groupId|artifactId)>\s*([^<\s]+)\s*</(?:groupId|artifactId)>").ok()
});

static GRADLE_COORDINATE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"["']([\w.\-]+):([\w.\-]+)(?::[^"']*)?["']"#).ok()
});

static GRADLE_PLUGIN: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r#"(?:\bid\s*\(?\s*|apply\s+plugin\s*:\s*)["']([\w.\-]+)["']"#).ok()
});

static GEM: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r#"(?m)^\s*gem\s+["']([^"']+)["']"#).ok());

/// The manifest formats understood by the detectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ManifestKind {
    /// `package.json`
    PackageJson,
    /// `composer.json`
    ComposerJson,
    /// `Cargo.toml`
    CargoToml,
    /// `pyproject.toml`
    PyProject,
    /// `Pipfile`
    Pipfile,
    /// `requirements.txt` and variants such as `requirements-dev.txt`
    Requirements,
    /// `pom.xml`
    PomXml,
    /// `build.gradle` / `build.gradle.kts`
    Gradle,
    /// `go.mod`
    GoMod,
    /// `Gemfile`
    Gemfile,
}

impl ManifestKind {
    /// Identifies a manifest by its file name.
    ///
    /// # Examples
    ///
    /// ```
    /// use gw_detect::ManifestKind;
    ///
    /// assert_eq!(ManifestKind::from_file_name("build.gradle.kts"), Some(ManifestKind::Gradle));
    /// assert_eq!(ManifestKind::from_file_name("requirements-dev.txt"), Some(ManifestKind::Requirements));
    /// assert_eq!(ManifestKind::from_file_name("README.md"), None);
    /// ```
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        let kind = match name {
            "package.json" => Self::PackageJson,
            "composer.json" => Self::ComposerJson,
            "Cargo.toml" => Self::CargoToml,
            "pyproject.toml" => Self::PyProject,
            "Pipfile" => Self::Pipfile,
            "pom.xml" => Self::PomXml,
            "build.gradle" | "build.gradle.kts" => Self::Gradle,
            "go.mod" => Self::GoMod,
            "Gemfile" => Self::Gemfile,
            _ if name.starts_with("requirements") && name.ends_with(".txt") => Self::Requirements,
            _ => return None,
        };
        Some(kind)
    }

    /// Extracts dependency names from manifest text.
    ///
    /// Names are returned as written; duplicates are possible.
    ///
    /// # Errors
    ///
    /// Returns a human-readable reason when a structured manifest (JSON or
    /// TOML) cannot be parsed. Line- and regex-based formats never fail.
    pub fn parse(self, content: &str) -> Result<Vec<String>, String> {
        match self {
            Self::PackageJson => json_dependencies(
                content,
                &[
                    "dependencies",
                    "devDependencies",
                    "peerDependencies",
                    "optionalDependencies",
                ],
            ),
            Self::ComposerJson => json_dependencies(content, &["require", "require-dev"]),
            Self::CargoToml => cargo_dependencies(content),
            Self::PyProject => pyproject_dependencies(content),
            Self::Pipfile => {
                let table = parse_toml(content)?;
                Ok(["packages", "dev-packages"]
                    .iter()
                    .flat_map(|section| table_keys(&table, &[*section]))
                    .collect())
            }
            Self::Requirements => Ok(requirements_dependencies(content)),
            Self::PomXml => Ok(pom_dependencies(content)),
            Self::Gradle => Ok(gradle_dependencies(content)),
            Self::GoMod => Ok(go_mod_dependencies(content)),
            Self::Gemfile => Ok(captures(&GEM, content)),
        }
    }
}

/// Reads and parses the manifest at `path`.
///
/// # Errors
///
/// Returns [`DetectError::Manifest`] for an unrecognized file name or
/// malformed contents, and [`DetectError::Read`] if the file can't be read.
pub fn read_dependencies(path: &Utf8Path) -> Result<Vec<String>, DetectError> {
    let kind = path
        .file_name()
        .and_then(ManifestKind::from_file_name)
        .ok_or_else(|| DetectError::manifest(path, "unrecognized manifest name"))?;
    let content = std::fs::read_to_string(path).map_err(|e| DetectError::read(path, e))?;
    kind.parse(&content)
        .map_err(|reason| DetectError::manifest(path, reason))
}

fn json_dependencies(content: &str, sections: &[&str]) -> Result<Vec<String>, String> {
    let value: Value = serde_json::from_str(content).map_err(|e| e.to_string())?;
    let Some(object) = value.as_object() else {
        return Err("expected a JSON object at the top level".to_owned());
    };
    Ok(sections
        .iter()
        .filter_map(|section| object.get(*section).and_then(Value::as_object))
        .flat_map(|deps| deps.keys().cloned())
        .collect())
}

fn parse_toml(content: &str) -> Result<toml::Table, String> {
    toml::from_str(content).map_err(|e: toml::de::Error| e.to_string())
}

/// Keys of the table found by following `path`, or nothing.
fn table_keys(table: &toml::Table, path: &[&str]) -> Vec<String> {
    let mut current = table;
    for segment in path {
        match current.get(*segment).and_then(toml::Value::as_table) {
            Some(next) => current = next,
            None => return Vec::new(),
        }
    }
    current.keys().cloned().collect()
}

fn cargo_dependencies(content: &str) -> Result<Vec<String>, String> {
    let table = parse_toml(content)?;
    let sections = ["dependencies", "dev-dependencies", "build-dependencies"];

    let mut deps: Vec<String> = sections
        .iter()
        .flat_map(|section| table_keys(&table, &[*section]))
        .collect();
    deps.extend(table_keys(&table, &["workspace", "dependencies"]));

    if let Some(targets) = table.get("target").and_then(toml::Value::as_table) {
        for target in targets.values().filter_map(toml::Value::as_table) {
            for section in sections {
                deps.extend(table_keys(target, &[section]));
            }
        }
    }
    Ok(deps)
}

fn pyproject_dependencies(content: &str) -> Result<Vec<String>, String> {
    let table = parse_toml(content)?;
    let mut deps = Vec::new();

    let project = table.get("project").and_then(toml::Value::as_table);
    if let Some(list) = project
        .and_then(|p| p.get("dependencies"))
        .and_then(toml::Value::as_array)
    {
        deps.extend(requirement_names(list));
    }
    if let Some(optional) = project
        .and_then(|p| p.get("optional-dependencies"))
        .and_then(toml::Value::as_table)
    {
        for list in optional.values().filter_map(toml::Value::as_array) {
            deps.extend(requirement_names(list));
        }
    }
    if let Some(groups) = table.get("dependency-groups").and_then(toml::Value::as_table) {
        for list in groups.values().filter_map(toml::Value::as_array) {
            deps.extend(requirement_names(list));
        }
    }

    deps.extend(table_keys(&table, &["tool", "poetry", "dependencies"]));
    deps.extend(table_keys(&table, &["tool", "poetry", "dev-dependencies"]));
    if let Some(groups) = table
        .get("tool")
        .and_then(|t| t.get("poetry"))
        .and_then(|p| p.get("group"))
        .and_then(toml::Value::as_table)
    {
        for group in groups.values().filter_map(toml::Value::as_table) {
            deps.extend(table_keys(group, &["dependencies"]));
        }
    }

    deps.retain(|name| name != "python");
    Ok(deps)
}

fn requirement_names(list: &[toml::Value]) -> impl Iterator<Item = String> + '_ {
    list.iter()
        .filter_map(toml::Value::as_str)
        .filter_map(requirement_name)
}

/// Extracts the distribution name from a PEP 508 requirement string.
fn requirement_name(spec: &str) -> Option<String> {
    let spec = spec.trim();
    let end = spec
        .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        .unwrap_or(spec.len());
    let (name, rest) = spec.split_at(end);
    if name.is_empty() || rest.starts_with([':', '+']) {
        return None;
    }
    Some(name.to_owned())
}

fn requirements_dependencies(content: &str) -> Vec<String> {
    content
        .lines()
        .map(|line| line.split(" #").next().unwrap_or(line).trim())
        .filter(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with('-'))
        .filter_map(requirement_name)
        .collect()
}

fn pom_dependencies(content: &str) -> Vec<String> {
    let Some(section) = POM_SECTION.as_ref() else {
        return Vec::new();
    };
    section
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .flat_map(|body| captures(&POM_COORDINATE, body.as_str()))
        .collect()
}

fn gradle_dependencies(content: &str) -> Vec<String> {
    let mut deps = Vec::new();
    if let Some(coordinate) = GRADLE_COORDINATE.as_ref() {
        for block in braced_blocks(content, "dependencies") {
            for caps in coordinate.captures_iter(block) {
                deps.extend(caps.get(1).map(|m| m.as_str().to_owned()));
                deps.extend(caps.get(2).map(|m| m.as_str().to_owned()));
            }
        }
    }
    // Plugin ids appear both in `plugins {}` and in legacy `apply plugin:` lines.
    deps.extend(captures(&GRADLE_PLUGIN, content));
    deps
}

fn go_mod_dependencies(content: &str) -> Vec<String> {
    let mut deps = Vec::new();
    let mut in_block = false;
    for line in content.lines() {
        let line = line.split("//").next().unwrap_or(line).trim();
        if in_block {
            if line.starts_with(')') {
                in_block = false;
            } else if let Some(module) = line.split_whitespace().next() {
                deps.push(module.to_owned());
            }
        } else if let Some(rest) = line.strip_prefix("require") {
            let rest = rest.trim();
            if rest.starts_with('(') {
                in_block = true;
            } else if let Some(module) = rest.split_whitespace().next() {
                deps.push(module.to_owned());
            }
        }
    }
    deps
}

/// Bodies of every `keyword { ... }` block, with braces balanced.
fn braced_blocks<'a>(content: &'a str, keyword: &str) -> Vec<&'a str> {
    let mut blocks = Vec::new();
    let mut search_from = 0;
    while let Some(found) = content[search_from..].find(keyword) {
        let after_keyword = search_from + found + keyword.len();
        search_from = after_keyword;

        let rest = &content[after_keyword..];
        let trimmed = rest.trim_start();
        if !trimmed.starts_with('{') {
            continue;
        }
        let body_start = after_keyword + (rest.len() - trimmed.len()) + 1;

        let mut depth = 1usize;
        let mut body_end = None;
        for (offset, c) in content[body_start..].char_indices() {
            match c {
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth == 0 {
                        body_end = Some(body_start + offset);
                        break;
                    }
                }
                _ => {}
            }
        }
        let end = body_end.unwrap_or(content.len());
        blocks.push(&content[body_start..end]);
        search_from = end;
    }
    blocks
}

/// First capture group of every match of a lazily compiled pattern.
fn captures(pattern: &LazyLock<Option<Regex>>, content: &str) -> Vec<String> {
    let Some(re) = pattern.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(kind: ManifestKind, content: &str) -> Vec<String> {
        let mut deps = kind.parse(content).unwrap();
        deps.sort();
        deps.dedup();
        deps
    }

    #[test]
    fn test_package_json() {
        let deps = parse(
            ManifestKind::PackageJson,
            r#"{
                "name": "web",
                "dependencies": {"next": "14.0.0", "react": "^18"},
                "devDependencies": {"typescript": "5"},
                "scripts": {"build": "next build"}
            }"#,
        );
        assert_eq!(deps, ["next", "react", "typescript"]);
    }

    #[test]
    fn test_package_json_malformed() {
        assert!(ManifestKind::PackageJson.parse("{ \"dependencies\": ").is_err());
        assert!(ManifestKind::PackageJson.parse("[1, 2]").is_err());
    }

    #[test]
    fn test_composer_json() {
        let deps = parse(
            ManifestKind::ComposerJson,
            r#"{"require": {"php": "^8.2", "laravel/framework": "^11.0"}}"#,
        );
        assert_eq!(deps, ["laravel/framework", "php"]);
    }

    #[test]
    fn test_cargo_toml() {
        let deps = parse(
            ManifestKind::CargoToml,
            r#"
            [package]
            name = "app"

            [dependencies]
            tauri = { version = "2", features = [] }
            serde = "1"

            [target.'cfg(windows)'.dependencies]
            winapi = "0.3"

            [workspace.dependencies]
            bevy = "0.14"
            "#,
        );
        assert_eq!(deps, ["bevy", "serde", "tauri", "winapi"]);
    }

    #[test]
    fn test_pyproject_pep621_and_poetry() {
        let deps = parse(
            ManifestKind::PyProject,
            r#"
            [project]
            dependencies = ["Django>=5.0", "requests[socks] ; python_version > '3.8'"]

            [project.optional-dependencies]
            test = ["pytest"]

            [tool.poetry.dependencies]
            python = "^3.11"
            FastAPI = "*"

            [tool.poetry.group.dev.dependencies]
            black = "*"
            "#,
        );
        assert_eq!(deps, ["Django", "FastAPI", "black", "pytest", "requests"]);
    }

    #[test]
    fn test_pipfile() {
        let deps = parse(
            ManifestKind::Pipfile,
            "[packages]\nflask = \"*\"\n\n[dev-packages]\npytest = \"*\"\n",
        );
        assert_eq!(deps, ["flask", "pytest"]);
    }

    #[test]
    fn test_requirements() {
        let deps = parse(
            ManifestKind::Requirements,
            "# web\nDjango==4.2  # pinned\n-r base.txt\n--index-url https://x\n\nfastapi[all]>=0.100\nnumpy\ngit+https://github.com/x/y.git\n",
        );
        assert_eq!(deps, ["Django", "fastapi", "numpy"]);
    }

    #[test]
    fn test_pom_xml_is_section_scoped() {
        let deps = parse(
            ManifestKind::PomXml,
            r"
            <project>
              <groupId>com.example</groupId>
              <artifactId>demo</artifactId>
              <parent>
                <groupId>org.springframework.boot</groupId>
                <artifactId>spring-boot-starter-parent</artifactId>
              </parent>
              <dependencies>
                <dependency>
                  <groupId>org.springframework.boot</groupId>
                  <artifactId> spring-boot-starter-web </artifactId>
                </dependency>
              </dependencies>
            </project>
            ",
        );
        assert_eq!(
            deps,
            [
                "org.springframework.boot",
                "spring-boot-starter-parent",
                "spring-boot-starter-web"
            ]
        );
    }

    #[test]
    fn test_gradle_dependencies_and_plugins() {
        let deps = parse(
            ManifestKind::Gradle,
            r#"
            plugins {
                id 'org.springframework.boot' version '3.2.0'
                id("io.spring.dependency-management")
            }
            apply plugin: 'com.android.application'
            dependencies {
                implementation 'org.springframework.boot:spring-boot-starter-web'
                testImplementation("junit:junit:4.13.2")
                if (true) { runtimeOnly "com.h2database:h2" }
            }
            repositories { mavenCentral() }
            "#,
        );
        assert_eq!(
            deps,
            [
                "com.android.application",
                "com.h2database",
                "h2",
                "io.spring.dependency-management",
                "junit",
                "org.springframework.boot",
                "spring-boot-starter-web",
            ]
        );
    }

    #[test]
    fn test_go_mod() {
        let deps = parse(
            ManifestKind::GoMod,
            "module example.com/api\n\ngo 1.22\n\nrequire github.com/labstack/echo/v4 v4.11.0\n\nrequire (\n\tgithub.com/gin-gonic/gin v1.9.1\n\tgolang.org/x/net v0.17.0 // indirect\n)\n",
        );
        assert_eq!(
            deps,
            [
                "github.com/gin-gonic/gin",
                "github.com/labstack/echo/v4",
                "golang.org/x/net"
            ]
        );
    }

    #[test]
    fn test_gemfile() {
        let deps = parse(
            ManifestKind::Gemfile,
            "source 'https://rubygems.org'\ngem 'rails', '~> 7.1'\n  gem \"puma\"\n# gem 'commented'\n",
        );
        assert_eq!(deps, ["puma", "rails"]);
    }

    #[test]
    fn test_braced_blocks_balances_nested_braces() {
        let blocks = braced_blocks("dependencies { a { b } c } dependencies{d}", "dependencies");
        assert_eq!(blocks, [" a { b } c ", "d"]);
    }

    #[test]
    fn test_read_dependencies_reports_errors() {
        let dir = tempfile::tempdir().unwrap();
        let root = Utf8Path::from_path(dir.path()).unwrap();

        let missing = read_dependencies(&root.join("package.json")).unwrap_err();
        assert!(matches!(missing, DetectError::Read { .. }));

        std::fs::write(root.join("Cargo.toml"), "[dependencies\n").unwrap();
        let malformed = read_dependencies(&root.join("Cargo.toml")).unwrap_err();
        assert!(matches!(malformed, DetectError::Manifest { .. }));

        let unknown = read_dependencies(&root.join("notes.md")).unwrap_err();
        assert!(matches!(unknown, DetectError::Manifest { .. }));
    }
}
