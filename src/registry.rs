use crate::ast::is_identifier;
use crate::error::{EvalError, RegistryError};
use crate::functions::register_functions;
use log::{debug, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A callable usable from expressions. An `Err` carries a message that is
/// reported as [`EvalError::FunctionFailed`].
pub type Function = Arc<dyn Fn(&[f64]) -> Result<f64, String> + Send + Sync>;

/// How many arguments a function accepts. Checked at call time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Arity {
    Exact(usize),
    Range { min: usize, max: usize },
    AtLeast(usize),
    Any,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::Range { min, max } => (min..=max).contains(&count),
            Arity::AtLeast(min) => count >= min,
            Arity::Any => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Range { min, max } if max == &(min + 1) => write!(f, "{} or {}", min, max),
            Arity::Range { min, max } => write!(f, "{} to {}", min, max),
            Arity::AtLeast(min) => write!(f, "at least {}", min),
            Arity::Any => write!(f, "any number of"),
        }
    }
}

/// A registered function and the argument counts it accepts.
#[derive(Clone)]
pub struct FunctionEntry {
    arity: Arity,
    function: Function,
}

impl FunctionEntry {
    pub fn new(arity: Arity, function: Function) -> Self {
        Self { arity, function }
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Checks the argument count, then invokes the function.
    pub fn call(&self, name: &str, args: &[f64]) -> Result<f64, EvalError> {
        if !self.arity.accepts(args.len()) {
            return Err(EvalError::ArityMismatch {
                name: name.to_string(),
                expected: self.arity,
                got: args.len(),
            });
        }
        (self.function)(args).map_err(|message| EvalError::FunctionFailed {
            name: name.to_string(),
            message,
        })
    }
}

impl fmt::Debug for FunctionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionEntry")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Something a name can be bound to.
#[derive(Clone)]
pub enum Definition {
    Constant(f64),
    Function(FunctionEntry),
}

/// Constants and functions visible to expressions.
///
/// The two namespaces are disjoint: `pi` can only be referenced, `sqrt` can
/// only be called. Fill the registry during start-up, then share it read-only;
/// it is `Send + Sync`.
#[derive(Clone, Default)]
pub struct Registry {
    constants: HashMap<String, f64>,
    functions: HashMap<String, FunctionEntry>,
}

impl Registry {
    /// A registry with nothing in it, not even the built-ins.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in constants (`pi`, `e`, `phi`) and functions (`sin`, `cos`,
    /// `tan`, `log`, `sqrt`, `abs`, `round`).
    pub fn with_builtins() -> Self {
        let mut registry = Self::empty();
        register_functions(&mut registry);
        registry
    }

    /// Binds `name` to a constant.
    ///
    /// Re-binding the same value is a no-op; binding a different one fails.
    pub fn register_constant(&mut self, name: &str, value: f64) -> Result<(), RegistryError> {
        validate_name(name)?;
        match self.constants.get(name) {
            Some(existing) if existing.to_bits() == value.to_bits() => Ok(()),
            Some(existing) => Err(RegistryError::ConstantConflict {
                name: name.to_string(),
                existing: *existing,
                value,
            }),
            None => {
                debug!("Registering constant {} = {}", name, value);
                self.insert_constant(name, value);
                Ok(())
            }
        }
    }

    /// Registers a function. The last registration under a name wins.
    pub fn register_function<F>(
        &mut self,
        name: &str,
        arity: Arity,
        function: F,
    ) -> Result<(), RegistryError>
    where
        F: Fn(&[f64]) -> Result<f64, String> + Send + Sync + 'static,
    {
        self.register(name, Definition::Function(FunctionEntry::new(arity, Arc::new(function))))
    }

    /// Binds `name` to either kind of definition.
    pub fn register(&mut self, name: &str, definition: Definition) -> Result<(), RegistryError> {
        match definition {
            Definition::Constant(value) => self.register_constant(name, value),
            Definition::Function(entry) => {
                validate_name(name)?;
                debug!("Registering function {} (arity {})", name, entry.arity());
                if self.functions.insert(name.to_string(), entry).is_some() {
                    warn!("Function '{}' was redefined; the latest definition wins", name);
                }
                Ok(())
            }
        }
    }

    pub fn constant(&self, name: &str) -> Option<f64> {
        self.constants.get(name).copied()
    }

    pub fn function(&self, name: &str) -> Option<&FunctionEntry> {
        self.functions.get(name)
    }

    pub fn contains_constant(&self, name: &str) -> bool {
        self.constants.contains_key(name)
    }

    pub fn contains_function(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Constant names in alphabetical order.
    pub fn constant_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.constants.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Function names in alphabetical order.
    pub fn function_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn insert_constant(&mut self, name: &str, value: f64) {
        self.constants.insert(name.to_string(), value);
    }

    pub(crate) fn insert_function(
        &mut self,
        name: &str,
        arity: Arity,
        function: fn(&[f64]) -> Result<f64, String>,
    ) {
        self.functions
            .insert(name.to_string(), FunctionEntry::new(arity, Arc::new(function)));
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("constants", &self.constant_names())
            .field("functions", &self.function_names())
            .finish()
    }
}

fn validate_name(name: &str) -> Result<(), RegistryError> {
    if is_identifier(name) {
        Ok(())
    } else {
        Err(RegistryError::InvalidName(name.to_string()))
    }
}
