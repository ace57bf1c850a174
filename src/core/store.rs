/// Variable store — the named, typed, mutable table shared by a session.

use rustc_hash::FxHashMap;

use crate::schema::value::{StoreValue, Value, VariableKind, VariableTemplate};

/// Named variable slots, seeded from an authored template.
///
/// A slot's declared kind is fixed when it is seeded: writes of another
/// type are ignored, and slots are never removed during a session.
#[derive(Debug, Clone, Default)]
pub struct VariableStore {
    slots: FxHashMap<String, Value>,
}

impl VariableStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh store from a template. Later duplicates of a name win.
    pub fn from_template(template: &[VariableTemplate]) -> Self {
        let mut store = Self::new();
        store.reseed(template);
        store
    }

    /// Discard every slot and copy the template's starting values in.
    pub fn reseed(&mut self, template: &[VariableTemplate]) {
        self.slots.clear();
        for var in template {
            self.slots.insert(var.name.clone(), var.value.clone());
        }
    }

    /// Typed read. Empty when the name is missing or declared as another type.
    pub fn get<T: StoreValue>(&self, name: &str) -> Option<T> {
        self.slots.get(name).and_then(T::from_value)
    }

    /// Typed write. A no-op when the name is missing or declared as another
    /// type. Returns whether the slot changed.
    pub fn set<T: StoreValue>(&mut self, name: &str, value: T) -> bool {
        let Some(slot) = self.slots.get_mut(name) else {
            return false;
        };
        match value.into_value() {
            Some(new) if new.kind() == slot.kind() => {
                *slot = new;
                true
            }
            _ => false,
        }
    }

    /// Untyped read of the raw slot.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.slots.get(name)
    }

    pub fn kind_of(&self, name: &str) -> Option<VariableKind> {
        self.slots.get(name).map(Value::kind)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Slot names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.slots.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
