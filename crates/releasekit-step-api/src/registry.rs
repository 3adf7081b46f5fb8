use std::collections::HashMap;

use crate::step::ReleaseStep;

/// Step registry - manages all registered steps
pub struct StepRegistry {
    steps: HashMap<String, Box<dyn ReleaseStep>>,
}

impl StepRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            steps: HashMap::new(),
        }
    }

    /// Register a step
    pub fn register(&mut self, step: Box<dyn ReleaseStep>) {
        let step_type = step.step_type().to_string();
        self.steps.insert(step_type, step);
    }

    /// Get a step by step type
    pub fn get(&self, step_type: &str) -> Option<&dyn ReleaseStep> {
        self.steps.get(step_type).map(|s| s.as_ref())
    }

    /// Check if a step type is registered
    pub fn is_registered(&self, step_type: &str) -> bool {
        self.steps.contains_key(step_type)
    }

    /// Get all registered step types
    pub fn step_types(&self) -> Vec<String> {
        self.steps.keys().cloned().collect()
    }

    /// Get count of registered steps
    pub fn count(&self) -> usize {
        self.steps.len()
    }
}

impl Default for StepRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let registry = StepRegistry::new();
        assert_eq!(registry.count(), 0);
        assert!(!registry.is_registered("jira"));
    }
}
