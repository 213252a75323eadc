//! Loads user-supplied constants and functions from a directory.
//!
//! Each `*.json` file in the directory is a [`PluginManifest`]. Files are
//! applied in file-name order, so a later file replaces functions defined by
//! an earlier one. A file that fails to load is reported and skipped as a
//! whole; it never takes the process down.
//!
//! This module sits outside the evaluation core. It only hands finished
//! name/definition pairs to [`Registry::register`].

mod manifest;

pub use manifest::{is_private, FunctionDecl, PluginManifest};

use crate::ast::{is_identifier, ASTNode, Evaluator, Parser};
use crate::error::{RegistryError, SyntaxError};
use crate::registry::{Arity, Definition, FunctionEntry, Registry};
use log::{debug, info, warn};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("cannot read plugin file: {0}")]
    Io(#[from] io::Error),

    #[error("invalid plugin manifest: {0}")]
    Manifest(#[from] serde_json::Error),

    #[error("function '{name}' has an invalid body: {source}")]
    Body {
        name: String,
        #[source]
        source: SyntaxError,
    },

    #[error("function '{name}' has an invalid parameter name '{param}'")]
    InvalidParam { name: String, param: String },

    #[error("function '{name}' declares parameter '{param}' more than once")]
    DuplicateParam { name: String, param: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Outcome of [`PluginLoader::load`].
#[derive(Debug, Default)]
pub struct LoadReport {
    pub loaded: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, PluginError)>,
    /// Public names registered, in registration order.
    pub registered: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct PluginLoader {
    dir: PathBuf,
    parser: Parser,
    evaluator: Evaluator,
}

impl PluginLoader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            parser: Parser::default(),
            evaluator: Evaluator::default(),
        }
    }

    /// Nesting limit for parsing and evaluating function bodies.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.parser = Parser::new(max_depth);
        self.evaluator = Evaluator::new(max_depth);
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Plugin files in the directory, sorted by name.
    pub fn discover(&self) -> io::Result<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths)
    }

    /// Applies every plugin file to `registry`. A missing directory loads nothing.
    pub fn load(&self, registry: &mut Registry) -> LoadReport {
        let mut report = LoadReport::default();

        let paths = match self.discover() {
            Ok(paths) => paths,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Plugin directory {} does not exist", self.dir.display());
                return report;
            }
            Err(e) => {
                warn!("Cannot read plugin directory {}: {}", self.dir.display(), e);
                return report;
            }
        };

        for path in paths {
            match self.load_file(&path, registry) {
                Ok(names) => {
                    info!("Loaded plugin {} ({} definitions)", path.display(), names.len());
                    report.registered.extend(names);
                    report.loaded.push(path);
                }
                Err(e) => {
                    warn!("Failed to load plugin {}: {}", path.display(), e);
                    report.failed.push((path, e));
                }
            }
        }

        report
    }

    pub fn load_file(&self, path: &Path, registry: &mut Registry) -> Result<Vec<String>, PluginError> {
        debug!("Reading plugin {}", path.display());
        let text = fs::read_to_string(path)?;
        let manifest: PluginManifest = serde_json::from_str(&text)?;
        self.apply(manifest, registry)
    }

    /// Registers the public definitions of `manifest`. Either all of them are
    /// registered or, on error, none.
    ///
    /// Function bodies see the registry as it was before this manifest, plus
    /// this manifest's constants (private ones included).
    pub fn apply(
        &self,
        manifest: PluginManifest,
        registry: &mut Registry,
    ) -> Result<Vec<String>, PluginError> {
        let mut scope = registry.clone();
        for (name, value) in &manifest.constants {
            scope.register_constant(name, *value)?;
        }
        let scope = Arc::new(scope);

        let mut staged = registry.clone();
        let mut registered = Vec::new();

        for (name, value) in manifest.constants {
            if is_private(&name) {
                debug!("Skipping private constant {}", name);
                continue;
            }
            staged.register_constant(&name, value)?;
            registered.push(name);
        }

        for (name, decl) in manifest.functions {
            if is_private(&name) {
                debug!("Skipping private function {}", name);
                continue;
            }
            let entry = self.compile(&name, decl, Arc::clone(&scope))?;
            staged.register(&name, Definition::Function(entry))?;
            registered.push(name);
        }

        *registry = staged;
        Ok(registered)
    }

    fn compile(
        &self,
        name: &str,
        decl: FunctionDecl,
        scope: Arc<Registry>,
    ) -> Result<FunctionEntry, PluginError> {
        let mut seen = HashSet::new();
        for param in &decl.params {
            if !is_identifier(param) {
                return Err(PluginError::InvalidParam {
                    name: name.to_string(),
                    param: param.clone(),
                });
            }
            if !seen.insert(param.as_str()) {
                return Err(PluginError::DuplicateParam {
                    name: name.to_string(),
                    param: param.clone(),
                });
            }
        }

        let body = self
            .parser
            .parse(&decl.body)
            .map_err(|source| PluginError::Body {
                name: name.to_string(),
                source,
            })?;

        let function = ExpressionFunction {
            params: decl.params,
            body,
            scope,
            evaluator: self.evaluator,
        };
        let arity = Arity::Exact(function.params.len());
        Ok(FunctionEntry::new(
            arity,
            Arc::new(move |args: &[f64]| function.call(args)),
        ))
    }
}

/// A plugin function: a parsed body evaluated with its parameters bound.
struct ExpressionFunction {
    params: Vec<String>,
    body: ASTNode,
    scope: Arc<Registry>,
    evaluator: Evaluator,
}

impl ExpressionFunction {
    fn call(&self, args: &[f64]) -> Result<f64, String> {
        let bindings: HashMap<String, f64> = self
            .params
            .iter()
            .cloned()
            .zip(args.iter().copied())
            .collect();
        let bound = self.body.substitute(&bindings);
        self.evaluator
            .evaluate(&bound, &self.scope)
            .map_err(|e| e.to_string())
    }
}
