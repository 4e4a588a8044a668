//! # Variable Environments
//!
//! A request carries one global [`Environment`]. Each grid sample evaluates
//! against its own [`LocalEnv`]: a borrowed view of the global bindings plus a
//! small owned delta holding the position variables and anything the
//! expression assigns. Writes never reach the global template, so samples
//! evaluated in parallel cannot observe each other.
//!
//! ## Example
//!
//! ```rust
//! use mc_expr::Environment;
//!
//! let mut globals = Environment::new();
//! globals.insert("r", 2.0);
//!
//! let mut local = globals.local();
//! local.set("r", 5.0);
//! assert_eq!(local.get("r"), Some(5.0));
//! assert_eq!(globals.get("r"), Some(2.0));
//! ```

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::HashMap;

/// Names the grid builder binds to the sample position.
pub const POSITION_VARIABLES: [&str; 3] = ["x", "y", "z"];

// =============================================================================
// GLOBAL ENVIRONMENT
// =============================================================================

/// Request-wide variable bindings (name → value).
///
/// Deserializes from a JSON object of numbers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Environment {
    variables: HashMap<String, f32>,
}

impl Environment {
    /// Creates an empty environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name` to `value`, replacing any previous binding.
    pub fn insert(&mut self, name: impl Into<String>, value: f32) {
        self.variables.insert(name.into(), value);
    }

    /// Looks up a binding.
    pub fn get(&self, name: &str) -> Option<f32> {
        self.variables.get(name).copied()
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.variables.len()
    }

    /// Returns true if nothing is bound.
    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Starts a private evaluation scope over these bindings.
    pub fn local(&self) -> LocalEnv<'_> {
        LocalEnv {
            base: self,
            delta: SmallVec::new(),
        }
    }

    /// Starts a private scope with `x`, `y`, `z` bound to `position`.
    ///
    /// Position bindings shadow any global binding of the same name.
    pub fn local_at(&self, position: [f32; 3]) -> LocalEnv<'_> {
        let mut local = self.local();
        for (name, value) in POSITION_VARIABLES.into_iter().zip(position) {
            local.delta.push((name, value));
        }
        local
    }
}

impl<K: Into<String>> FromIterator<(K, f32)> for Environment {
    fn from_iter<I: IntoIterator<Item = (K, f32)>>(iter: I) -> Self {
        Self {
            variables: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

// =============================================================================
// LOCAL OVERLAY
// =============================================================================

/// Per-evaluation view of an [`Environment`].
///
/// Reads check the owned delta first, then the borrowed base. Writes only
/// touch the delta. Names in the delta borrow from the expression tree or
/// are static, so seeding a sample allocates nothing.
#[derive(Debug, Clone)]
pub struct LocalEnv<'a> {
    base: &'a Environment,
    delta: SmallVec<[(&'a str, f32); 4]>,
}

impl<'a> LocalEnv<'a> {
    /// Looks up a binding, local writes first.
    pub fn get(&self, name: &str) -> Option<f32> {
        self.delta
            .iter()
            .find(|(bound, _)| *bound == name)
            .map(|&(_, value)| value)
            .or_else(|| self.base.get(name))
    }

    /// Writes a binding into this scope only.
    pub fn set(&mut self, name: &'a str, value: f32) {
        match self.delta.iter_mut().find(|(bound, _)| *bound == name) {
            Some(slot) => slot.1 = value,
            None => self.delta.push((name, value)),
        }
    }

    /// The global environment this scope reads through to.
    pub fn base(&self) -> &Environment {
        self.base
    }
}

// =============================================================================
// TESTS
// =============================================================================
