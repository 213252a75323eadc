use serde::Deserialize;
use std::collections::BTreeMap;

/// The contents of one plugin file.
///
/// ```json
/// {
///   "constants": { "tau": 6.283185307179586 },
///   "functions": {
///     "hypot": { "params": ["x", "y"], "body": "sqrt(x^2 + y^2)" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginManifest {
    #[serde(default)]
    pub constants: BTreeMap<String, f64>,
    #[serde(default)]
    pub functions: BTreeMap<String, FunctionDecl>,
}

/// A function whose value is an expression over its parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FunctionDecl {
    #[serde(default)]
    pub params: Vec<String>,
    pub body: String,
}

/// Names starting with an underscore stay inside the plugin.
pub fn is_private(name: &str) -> bool {
    name.starts_with('_')
}
