//! Compile-time view of the per-test context store

use indexmap::IndexSet;

/// Key a step output is stored under: `<stepId>.outputs.<name>`
pub fn output_key(step_id: &str, name: &str) -> String {
    format!("{}.outputs.{}", step_id, name)
}

/// Keys written by the steps emitted so far.
///
/// One store is threaded through the steps of one workflow. It mirrors the
/// `context` object of the generated test so the emitter can tell when a
/// step reads a key no earlier step wrote.
#[derive(Debug, Clone, Default)]
pub struct ContextStore {
    written: IndexSet<String>,
}

impl ContextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_write(&mut self, key: impl Into<String>) {
        self.written.insert(key.into());
    }

    pub fn is_written(&self, key: &str) -> bool {
        self.written.contains(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_writes() {
        let mut store = ContextStore::new();
        store.record_write(output_key("createRobot", "robotId"));
        store.record_write(output_key("addParts", "count"));
        store.record_write(output_key("createRobot", "robotId"));

        assert!(store.is_written("createRobot.outputs.robotId"));
        assert!(store.is_written("addParts.outputs.count"));
        assert!(!store.is_written("assemble.outputs.robotId"));
    }
}
