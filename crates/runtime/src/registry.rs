//! Action registry keyed by stable action id.
//!
//! Action definitions are immutable configuration loaded by the host
//! (typically deserialized from data files); the registry just stores and
//! looks them up for the command surface.

use std::collections::BTreeMap;

use tactics_core::ActionDefinition;

#[derive(Clone, Debug, Default)]
pub struct ActionRegistry {
    actions: BTreeMap<String, ActionDefinition>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a definition under its own id, replacing any previous one.
    pub fn register(&mut self, def: ActionDefinition) {
        self.actions.insert(def.id.clone(), def);
    }

    pub fn get(&self, id: &str) -> Option<&ActionDefinition> {
        self.actions.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.actions.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tactics_core::TargetingSpec;

    #[test]
    fn register_replaces_same_id() {
        let mut registry = ActionRegistry::new();
        registry.register(ActionDefinition::new("jab", "Jab", TargetingSpec::self_only()));
        registry.register(ActionDefinition::new(
            "jab",
            "Quick Jab",
            TargetingSpec::self_only(),
        ));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("jab").unwrap().name, "Quick Jab");
    }
}
