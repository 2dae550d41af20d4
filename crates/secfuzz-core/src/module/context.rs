//! Navigation state: the module catalog and the current selection.

use std::collections::BTreeMap;

use super::Module;
use crate::error::{LoadError, ResolveError};

/// Catalog of loaded modules plus the currently selected one.
///
/// The selection is stored as a catalog key. Modules are never removed from
/// the catalog, so a selected key always resolves.
#[derive(Debug, Default)]
pub struct ModuleContext {
    catalog: BTreeMap<String, Module>,
    current: Option<String>,
}

impl ModuleContext {
    pub fn new(modules: Vec<Module>) -> Result<Self, LoadError> {
        let mut catalog = BTreeMap::new();
        for m in modules {
            let name = m.qualified_name().to_string();
            if catalog.contains_key(&name) {
                return Err(LoadError::DuplicateModule(name));
            }
            catalog.insert(name, m);
        }
        Ok(Self {
            catalog,
            current: None,
        })
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }

    /// All modules, sorted by qualified name.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.catalog.values()
    }

    pub fn get(&self, qualified_name: &str) -> Option<&Module> {
        self.catalog.get(qualified_name)
    }

    /// Resolve a user token to a catalog key.
    ///
    /// Exact match first, then case-insensitive exact match, then a unique
    /// case-insensitive prefix. Several prefix matches are an error.
    pub fn resolve(&self, token: &str) -> Result<&str, ResolveError> {
        if let Some((name, _)) = self.catalog.get_key_value(token) {
            return Ok(name.as_str());
        }
        let lowered = token.to_lowercase();
        if let Some(name) = self.catalog.keys().find(|k| k.to_lowercase() == lowered) {
            return Ok(name.as_str());
        }
        let candidates: Vec<&String> = self
            .catalog
            .keys()
            .filter(|k| k.to_lowercase().starts_with(&lowered))
            .collect();
        match candidates.as_slice() {
            [only] => Ok(only.as_str()),
            [] => Err(ResolveError::NotFound(token.to_string())),
            many => Err(ResolveError::Ambiguous {
                token: token.to_string(),
                candidates: many.iter().map(|s| s.to_string()).collect(),
            }),
        }
    }

    /// Make the module matching `token` current, replacing any prior selection.
    pub fn select(&mut self, token: &str) -> Result<&Module, ResolveError> {
        let name = self.resolve(token)?.to_string();
        self.current = Some(name.clone());
        self.catalog
            .get(&name)
            .ok_or(ResolveError::NotFound(name))
    }

    /// Drop the selection. Idempotent.
    pub fn clear(&mut self) {
        self.current = None;
    }

    pub fn current(&self) -> Option<&Module> {
        self.current.as_ref().and_then(|k| self.catalog.get(k))
    }

    pub fn current_mut(&mut self) -> Option<&mut Module> {
        match self.current {
            Some(ref k) => self.catalog.get_mut(k),
            None => None,
        }
    }

    /// Modules whose name, description or tags contain `pattern`.
    pub fn search(&self, pattern: &str) -> Vec<&Module> {
        self.catalog.values().filter(|m| m.matches(pattern)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModuleExecutionError;
    use crate::module::{OutputStream, ParameterStore};

    fn noop(_: &str, _: &ParameterStore) -> Result<OutputStream, ModuleExecutionError> {
        Ok(Box::new(std::iter::empty()))
    }

    fn ctx() -> ModuleContext {
        ModuleContext::new(vec![
            Module::new("foo/bar", noop),
            Module::new("foo/baz", noop),
            Module::new("net/portscan", noop).with_description("TCP connect scan"),
        ])
        .unwrap()
    }

    #[test]
    fn test_use_then_back() {
        let mut c = ctx();
        assert!(c.current().is_none());
        c.select("foo/bar").unwrap();
        assert_eq!(c.current().unwrap().qualified_name(), "foo/bar");
        c.clear();
        assert!(c.current().is_none());
        c.clear();
        assert!(c.current().is_none());
    }

    #[test]
    fn test_select_replaces_previous() {
        let mut c = ctx();
        c.select("foo/bar").unwrap();
        c.select("net/portscan").unwrap();
        assert_eq!(c.current().unwrap().qualified_name(), "net/portscan");
    }

    #[test]
    fn test_resolve_case_and_prefix() {
        let c = ctx();
        assert_eq!(c.resolve("FOO/BAR").unwrap(), "foo/bar");
        assert_eq!(c.resolve("net/").unwrap(), "net/portscan");
        assert_eq!(
            c.resolve("foo/ba"),
            Err(ResolveError::Ambiguous {
                token: "foo/ba".into(),
                candidates: vec!["foo/bar".into(), "foo/baz".into()],
            })
        );
        assert_eq!(c.resolve("nope"), Err(ResolveError::NotFound("nope".into())));
    }

    #[test]
    fn test_failed_select_keeps_current() {
        let mut c = ctx();
        c.select("foo/baz").unwrap();
        assert!(c.select("missing").is_err());
        assert_eq!(c.current().unwrap().qualified_name(), "foo/baz");
    }

    #[test]
    fn test_duplicate_module_rejected() {
        let err = ModuleContext::new(vec![Module::new("a/b", noop), Module::new("a/b", noop)])
            .unwrap_err();
        assert!(matches!(err, LoadError::DuplicateModule(ref n) if n == "a/b"));
    }

    #[test]
    fn test_search_and_listing_order() {
        let c = ctx();
        let names: Vec<_> = c.modules().map(|m| m.qualified_name()).collect();
        assert_eq!(names, vec!["foo/bar", "foo/baz", "net/portscan"]);
        let hits: Vec<_> = c.search("tcp").into_iter().map(|m| m.qualified_name()).collect();
        assert_eq!(hits, vec!["net/portscan"]);
    }
}
