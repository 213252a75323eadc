use std::path::PathBuf;

/// Deepest nesting the parser accepts and the evaluator walks. Each level of
/// parentheses costs the grammar several recursive calls; this limit fits
/// comfortably in the 2 MiB stack of a spawned or rayon worker thread, even
/// in debug builds. Larger limits need a larger stack.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Directory scanned for plugin manifests when none is given.
pub const DEFAULT_PLUGIN_DIR: &str = "plugins";

/// Settings for a [`Calculator`](crate::Calculator).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalculatorConfig {
    pub max_depth: usize,
    pub plugin_dir: PathBuf,
    /// When false, `plugin_dir` is ignored and only built-ins are available.
    pub load_plugins: bool,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            plugin_dir: PathBuf::from(DEFAULT_PLUGIN_DIR),
            load_plugins: true,
        }
    }
}
