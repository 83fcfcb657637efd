//! Filesystem namespace loader.
//!
//! Resolves a namespace path such as `apache/conf_dir` to
//! `<root>/<namespace>/apache/conf_dir.<extension>` and registers the macros the file defines.
//! Roots configured for the requested environment are searched before the common module paths,
//! so an environment can shadow a common definition file.
//!
//! A definition file is YAML:
//!
//! ```yaml
//! macros:
//!   - name: testmodule::foo::b
//!     params: [b, { name: a, default: ~ }]
//!     body: "$b"
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::LoaderConfig;
use crate::macros::loader::NamespaceLoader;
use crate::macros::name::is_valid_name;
use crate::macros::registry::{NewMacroOptions, Registry};
use crate::macros::template::{MacroTemplate, ParamSpec};
use crate::{err_msg, Environment, MacroError, Value};

/// Type alias for definition parsing results
type DefinitionResult = Result<Vec<(String, MacroTemplate)>, MacroError>;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DefinitionFile {
    #[serde(default)]
    macros: Vec<MacroSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct MacroSpec {
    name: String,
    #[serde(default)]
    params: Vec<ParamSpec>,
    #[serde(default)]
    body: Value,
    #[serde(default)]
    doc: Option<String>,
}

// =============================
// Public API for definition files
// =============================

/// Parses macro definitions from YAML source, checking every name before anything is returned.
///
/// A file is accepted or rejected as a whole, so a loader never registers part of it.
/// `origin` names the source in error messages.
pub fn parse_definitions(source: &str, origin: &str) -> DefinitionResult {
    let file: DefinitionFile = serde_yaml::from_str(source).map_err(|e| {
        err_msg!(General, "Failed to parse macro definitions in '{}'", origin).with_source(e)
    })?;
    let mut names_seen = HashSet::new();
    let mut macros = Vec::with_capacity(file.macros.len());
    for spec in file.macros {
        if !is_valid_name(&spec.name) {
            return Err(err_msg!(
                General,
                "Invalid macro name {} in '{}'",
                Value::from(spec.name.as_str()).inspect(),
                origin
            ));
        }
        if !names_seen.insert(spec.name.clone()) {
            return Err(err_msg!(
                General,
                "Duplicate macro name '{}' in '{}'",
                spec.name,
                origin
            ));
        }
        let template = MacroTemplate::new(spec.params, spec.body).map_err(|e| {
            err_msg!(General, "Invalid definition of macro '{}' in '{}'", spec.name, origin)
                .with_source(e)
        })?;
        let template = match spec.doc {
            Some(doc) => template.with_doc(doc),
            None => template,
        };
        macros.push((spec.name, template));
    }
    Ok(macros)
}

/// Loads the namespace from definition files on disk.
#[derive(Debug, Clone, Default)]
pub struct FsLoader {
    config: LoaderConfig,
}

impl FsLoader {
    pub fn new(config: LoaderConfig) -> Self {
        FsLoader { config }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Roots for `env`: its own roots first, then the common module paths.
    fn roots_for<'a>(&'a self, env: &Environment) -> impl Iterator<Item = &'a PathBuf> + 'a {
        self.config
            .environments
            .get(env.name())
            .into_iter()
            .flatten()
            .chain(self.config.module_paths.iter())
    }

    fn candidate(&self, root: &Path, path: &str) -> PathBuf {
        root.join(&self.config.namespace)
            .join(format!("{}.{}", path, self.config.extension))
    }

    /// The first existing definition file for `path` in `env`.
    pub fn find(&self, path: &str, env: &Environment) -> Option<PathBuf> {
        self.roots_for(env)
            .map(|root| self.candidate(root, path))
            .find(|file| file.is_file())
    }

    /// Parses `file` and registers every macro it defines in `env`. Returns how many.
    pub fn load_file(
        &self,
        registry: &Registry,
        file: &Path,
        env: &Environment,
    ) -> Result<usize, MacroError> {
        let origin = file.display().to_string();
        let source = fs::read_to_string(file).map_err(|e| {
            err_msg!(General, "Failed to read macro definitions in '{}'", origin).with_source(e)
        })?;
        let definitions = parse_definitions(&source, &origin)?;
        let options = NewMacroOptions::in_environment(env.clone());
        let count = definitions.len();
        for (name, template) in definitions {
            registry.newmacro(&name, &options, template.into_macro())?;
        }
        debug!("loaded {} macro(s) from {} into {:?}", count, origin, env.name());
        Ok(count)
    }

    /// Every definition file under `root`'s namespace directory, sorted.
    fn definition_files(&self, root: &Path) -> Vec<PathBuf> {
        let dir = root.join(&self.config.namespace);
        if !dir.is_dir() {
            return Vec::new();
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(&dir) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("failed to walk {}: {}", dir.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(self.config.extension.as_str()) {
                continue;
            }
            files.push(path.to_path_buf());
        }
        files.sort();
        files
    }

    fn load_root(&self, registry: &Registry, root: &Path, env: &Environment, loaded: &mut Vec<PathBuf>) {
        for file in self.definition_files(root) {
            match self.load_file(registry, &file, env) {
                Ok(_) => loaded.push(file),
                Err(e) => warn!("failed to load {}: {}", file.display(), e),
            }
        }
    }
}

impl NamespaceLoader for FsLoader {
    fn load(&self, registry: &Registry, path: &str, env: &Environment) -> Result<bool, MacroError> {
        let Some(file) = self.find(path, env) else {
            return Ok(false);
        };
        self.load_file(registry, &file, env)?;
        Ok(true)
    }

    /// The candidate in the first root searched for `env`.
    fn expand(&self, path: &str, env: &Environment) -> String {
        match self.roots_for(env).next() {
            Some(root) => self.candidate(root, path).display().to_string(),
            None => self.candidate(Path::new(""), path).display().to_string(),
        }
    }

    /// Environment roots load into their environment; common roots load into the root
    /// environment.
    fn loadall(&self, registry: &Registry) -> Vec<PathBuf> {
        let mut loaded = Vec::new();
        for (name, roots) in &self.config.environments {
            let env = Environment::new(name);
            for root in roots {
                self.load_root(registry, root, &env, &mut loaded);
            }
        }
        let root_env = Environment::root();
        for root in &self.config.module_paths {
            self.load_root(registry, root, &root_env, &mut loaded);
        }
        loaded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_definitions() {
        let source = r#"
macros:
  - name: testmodule::foo::b
    params: [b, { name: a, default: ~ }]
    body: "$b"
  - name: testmodule::foo::c
"#;
        let defs = parse_definitions(source, "inline").unwrap();
        assert_eq!(defs.len(), 2);
        assert_eq!(defs[0].0, "testmodule::foo::b");
        assert_eq!(defs[1].0, "testmodule::foo::c");
    }

    #[test]
    fn test_duplicate_macro_names() {
        let source = "macros:\n  - name: a\n  - name: a\n";
        let err = parse_definitions(source, "inline").unwrap_err();
        assert_eq!(err.to_string(), "Duplicate macro name 'a' in 'inline'");
    }

    #[test]
    fn test_invalid_template_is_chained() {
        use std::error::Error as _;
        let source = "macros:\n  - name: a\n    params: [x]\n    body: \"$y\"\n";
        let err = parse_definitions(source, "inline").unwrap_err();
        assert_eq!(err.to_string(), "Invalid definition of macro 'a' in 'inline'");
        assert_eq!(
            err.source().unwrap().to_string(),
            "Unknown parameter 'y' in template body"
        );
    }

    #[test]
    fn test_invalid_macro_name_rejects_whole_file() {
        let source = "macros:\n  - name: good\n  - name: Bad\n";
        let err = parse_definitions(source, "inline").unwrap_err();
        assert_eq!(err.to_string(), "Invalid macro name \"Bad\" in 'inline'");
    }

    #[test]
    fn test_doc_is_kept() {
        let source = "macros:\n  - name: a\n    doc: Says hello.\n    body: hello\n";
        let defs = parse_definitions(source, "inline").unwrap();
        assert_eq!(defs[0].1.clone().into_macro().doc(), Some("Says hello."));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = parse_definitions("macros: [", "broken.yaml").unwrap_err();
        assert_eq!(err.to_string(), "Failed to parse macro definitions in 'broken.yaml'");
    }

    #[test]
    fn test_expand_uses_first_root_of_environment() {
        let mut config = LoaderConfig {
            module_paths: vec![PathBuf::from("/modules")],
            ..LoaderConfig::default()
        };
        config
            .environments
            .insert("staging".to_string(), vec![PathBuf::from("/staging")]);
        let loader = FsLoader::new(config);
        assert_eq!(
            loader.expand("foo/bar", &Environment::new("production")),
            Path::new("/modules/macros/foo/bar.yaml").display().to_string()
        );
        assert_eq!(
            loader.expand("foo/bar", &Environment::new("staging")),
            Path::new("/staging/macros/foo/bar.yaml").display().to_string()
        );
        assert_eq!(
            FsLoader::default().expand("foo/bar", &Environment::root()),
            Path::new("macros/foo/bar.yaml").display().to_string()
        );
    }
}
