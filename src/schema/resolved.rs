/// Resolved values — authored fields that may be re-bound to a store variable.

use serde::{Deserialize, Serialize};

use crate::core::store::VariableStore;
use crate::schema::value::StoreValue;

/// A per-field wrapper choosing, at read time, between a store-bound
/// variable and a literal.
///
/// `active` only says whether the field was authored to take effect at all;
/// it never changes which of store and literal wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolved<T> {
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub bound: Option<String>,
    #[serde(default)]
    pub literal: T,
}

impl<T: Default> Default for Resolved<T> {
    fn default() -> Self {
        Self {
            active: false,
            bound: None,
            literal: T::default(),
        }
    }
}

impl<T> Resolved<T> {
    /// An active field with a fixed value.
    pub fn literal(value: T) -> Self {
        Self {
            active: true,
            bound: None,
            literal: value,
        }
    }

    /// An active field that follows the named variable, falling back to
    /// `fallback` when the variable is missing or of another type.
    pub fn bound(name: &str, fallback: T) -> Self {
        Self {
            active: true,
            bound: Some(name.to_string()),
            literal: fallback,
        }
    }

    /// A field that was authored but switched off.
    pub fn inactive(value: T) -> Self {
        Self {
            active: false,
            bound: None,
            literal: value,
        }
    }

    fn bound_name(&self) -> Option<&str> {
        self.bound.as_deref().filter(|name| !name.is_empty())
    }
}

impl<T: StoreValue + Clone> Resolved<T> {
    /// The store's current value when the bound name holds a variable of
    /// the same type, otherwise the literal.
    pub fn resolve(&self, store: &VariableStore) -> T {
        self.bound_name()
            .and_then(|name| store.get::<T>(name))
            .unwrap_or_else(|| self.literal.clone())
    }

    /// Like [`resolve`](Self::resolve), but empty when the field is inactive.
    pub fn resolve_active(&self, store: &VariableStore) -> Option<T> {
        self.active.then(|| self.resolve(store))
    }
}
