//! Module discovery: find `module.yaml` manifests under the module roots.
//!
//! A module's qualified name is its directory path relative to the root,
//! `/`-separated (`<root>/net/portscan/module.yaml` → `net/portscan`).
//! Directories starting with `.` are skipped, and module directories are not
//! searched for nested modules.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use super::parameter::{display_value, Parameter, ParameterKind, ParameterStore};
use super::script::ScriptRunner;
use super::Module;
use crate::error::LoadError;

pub const MANIFEST_FILE: &str = "module.yaml";

/// Source of the module catalog. Called once at console startup.
pub trait ModuleLoader {
    fn load_modules(&self) -> Result<Vec<Module>, LoadError>;
}

#[derive(Deserialize, Debug)]
struct ModuleManifest {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    tags: Vec<String>,
    entry_point: String,
    #[serde(default)]
    interpreter: Option<String>,
    #[serde(default)]
    parameters: Vec<ParameterManifest>,
}

#[derive(Deserialize, Debug)]
struct ParameterManifest {
    name: String,
    #[serde(rename = "type", default)]
    kind: KindName,
    #[serde(default)]
    default: Option<Value>,
    #[serde(default)]
    required: bool,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    choices: Vec<String>,
    #[serde(default)]
    min: Option<i64>,
    #[serde(default)]
    max: Option<i64>,
    #[serde(default)]
    pattern: Option<String>,
}

#[derive(Deserialize, Debug, Default, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum KindName {
    #[default]
    String,
    Integer,
    Boolean,
    Port,
    Host,
    Choice,
}

/// Loads script modules from `module.yaml` manifests.
#[derive(Debug, Clone)]
pub struct ManifestLoader {
    roots: Vec<PathBuf>,
}

impl ManifestLoader {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    fn walk(&self, root: &Path, dir: &Path, out: &mut Vec<Module>) -> Result<(), LoadError> {
        let manifest = dir.join(MANIFEST_FILE);
        if manifest.is_file() {
            out.push(load_manifest(root, dir, &manifest)?);
            return Ok(());
        }

        let entries = fs::read_dir(dir).map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut children: Vec<_> = entries.flatten().collect();
        children.sort_by_key(|e| e.file_name());
        for entry in children {
            let p = entry.path();
            let hidden = entry.file_name().to_string_lossy().starts_with('.');
            if p.is_dir() && !hidden {
                self.walk(root, &p, out)?;
            }
        }
        Ok(())
    }
}

impl ModuleLoader for ManifestLoader {
    fn load_modules(&self) -> Result<Vec<Module>, LoadError> {
        let mut modules = Vec::new();
        for root in &self.roots {
            if !root.is_dir() {
                tracing::debug!(root = %root.display(), "Module root does not exist, skipping");
                continue;
            }
            let before = modules.len();
            self.walk(root, root, &mut modules)?;
            tracing::debug!(
                root = %root.display(),
                count = modules.len() - before,
                "Loaded modules"
            );
        }
        Ok(modules)
    }
}

fn qualified_name(root: &Path, dir: &Path) -> Option<String> {
    let rel = dir.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

fn load_manifest(root: &Path, dir: &Path, manifest_path: &Path) -> Result<Module, LoadError> {
    let invalid = |reason: String| LoadError::Invalid {
        path: manifest_path.to_path_buf(),
        reason,
    };

    let name = qualified_name(root, dir)
        .ok_or_else(|| invalid("a module root cannot itself be a module".to_string()))?;

    let content = fs::read_to_string(manifest_path).map_err(|source| LoadError::Io {
        path: manifest_path.to_path_buf(),
        source,
    })?;
    let manifest: ModuleManifest =
        serde_yaml::from_str(&content).map_err(|source| LoadError::Manifest {
            path: manifest_path.to_path_buf(),
            source,
        })?;

    if manifest.entry_point.trim().is_empty() {
        return Err(invalid("entry_point is empty".to_string()));
    }

    let mut params = ParameterStore::new();
    for pm in manifest.parameters {
        let param = build_parameter(pm).map_err(invalid)?;
        params.declare(param).map_err(|e| invalid(e.to_string()))?;
    }

    let runner = ScriptRunner::new(dir, &manifest.entry_point, manifest.interpreter);
    Ok(Module::new(name, runner)
        .with_description(manifest.description.unwrap_or_default())
        .with_tags(manifest.tags)
        .with_parameters(params))
}

fn build_parameter(pm: ParameterManifest) -> Result<Parameter, String> {
    let kind = match pm.kind {
        KindName::String => ParameterKind::String,
        KindName::Integer => ParameterKind::Integer {
            min: pm.min,
            max: pm.max,
        },
        KindName::Boolean => ParameterKind::Boolean,
        KindName::Port => ParameterKind::Port,
        KindName::Host => ParameterKind::Host,
        KindName::Choice => {
            if pm.choices.is_empty() {
                return Err(format!("parameter '{}' of type choice has no choices", pm.name));
            }
            ParameterKind::Choice(pm.choices)
        }
    };

    let mut param = Parameter::new(pm.name.clone(), kind)
        .required(pm.required)
        .with_description(pm.description.unwrap_or_default());
    if let Some(ref pattern) = pm.pattern {
        let re = Regex::new(pattern)
            .map_err(|e| format!("parameter '{}' has an invalid pattern: {}", pm.name, e))?;
        param = param.with_pattern(re);
    }
    match pm.default {
        None | Some(Value::Null) => Ok(param),
        Some(ref v) => param
            .with_default(&display_value(Some(v)))
            .map_err(|e| format!("bad default: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn write_module(root: &Path, rel: &str, manifest: &str) {
        let dir = root.join(rel);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
    }

    #[test]
    fn test_load_modules_qualified_names() {
        let tmp = tempfile::tempdir().unwrap();
        write_module(tmp.path(), "net/portscan", "entry_point: main.py\n");
        write_module(tmp.path(), "ble/sniff", "entry_point: run.sh\ntags: [bluetooth]\n");
        write_module(tmp.path(), ".hidden/x", "entry_point: main.py\n");

        let loader = ManifestLoader::new(vec![tmp.path().to_path_buf()]);
        let modules = loader.load_modules().unwrap();
        let names: Vec<_> = modules.iter().map(|m| m.qualified_name()).collect();
        assert_eq!(names, vec!["ble/sniff", "net/portscan"]);
        assert_eq!(modules[0].tags(), ["bluetooth".to_string()]);
    }

    #[test]
    fn test_parameters_from_manifest() {
        let tmp = tempfile::tempdir().unwrap();
        write_module(
            tmp.path(),
            "net/portscan",
            r#"
description: TCP connect scan
entry_point: main.py
parameters:
  - name: target
    type: host
    required: true
    description: Host to scan
  - name: port
    type: port
    default: 80
  - name: mode
    type: choice
    choices: [fast, slow]
    default: fast
  - name: retries
    type: integer
    min: 0
    max: 5
"#,
        );
        let modules = ManifestLoader::new(vec![tmp.path().to_path_buf()])
            .load_modules()
            .unwrap();
        let m = &modules[0];
        assert_eq!(m.description(), "TCP connect scan");
        let p = m.parameters();
        assert_eq!(p.len(), 4);
        assert!(p.get("target").unwrap().is_required());
        assert_eq!(p.get("port").unwrap().value(), Some(&json!(80)));
        assert_eq!(p.get("mode").unwrap().value(), Some(&json!("fast")));
        assert_eq!(
            p.get("retries").unwrap().kind(),
            &ParameterKind::Integer {
                min: Some(0),
                max: Some(5)
            }
        );
    }

    #[test]
    fn test_invalid_default_is_load_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_module(
            tmp.path(),
            "x/y",
            "entry_point: a.sh\nparameters:\n  - name: port\n    type: port\n    default: 70000\n",
        );
        let err = ManifestLoader::new(vec![tmp.path().to_path_buf()])
            .load_modules()
            .unwrap_err();
        assert!(matches!(err, LoadError::Invalid { .. }));
    }

    #[test]
    fn test_malformed_yaml_is_load_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_module(tmp.path(), "x/y", "entry_point: [unclosed\n");
        let err = ManifestLoader::new(vec![tmp.path().to_path_buf()])
            .load_modules()
            .unwrap_err();
        assert!(matches!(err, LoadError::Manifest { .. }));
    }

    #[test]
    fn test_duplicate_parameter_is_load_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_module(
            tmp.path(),
            "x/y",
            "entry_point: a.sh\nparameters:\n  - name: a\n  - name: a\n",
        );
        let err = ManifestLoader::new(vec![tmp.path().to_path_buf()])
            .load_modules()
            .unwrap_err();
        assert!(err.to_string().contains("declared more than once"));
    }

    #[test]
    fn test_missing_root_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let loader = ManifestLoader::new(vec![tmp.path().join("absent")]);
        assert!(loader.load_modules().unwrap().is_empty());
    }
}
