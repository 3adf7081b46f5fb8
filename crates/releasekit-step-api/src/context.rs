use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};

use crate::template::VariableResolver;

/// Build context handed to a step when it runs.
///
/// Carries the merged variable map (environment plus build parameters) and
/// the workspace directory for steps that read artifacts from disk.
#[derive(Debug, Clone, Default)]
pub struct BuildContext {
    variables: VariableResolver,
    workspace: Option<PathBuf>,
}

impl BuildContext {
    pub fn new(variables: VariableResolver, workspace: Option<PathBuf>) -> Self {
        Self {
            variables,
            workspace,
        }
    }

    /// Context from the current process environment plus explicit parameters.
    pub fn from_env(parameters: HashMap<String, String>) -> Self {
        let environment = std::env::vars().collect();
        Self {
            variables: VariableResolver::from_sources(environment, parameters),
            workspace: std::env::var_os("WORKSPACE").map(PathBuf::from),
        }
    }

    pub fn variables(&self) -> &VariableResolver {
        &self.variables
    }

    /// Shorthand for resolving `${var}` references in step configuration.
    pub fn expand(&self, input: &str) -> String {
        self.variables.resolve(input)
    }

    pub fn workspace(&self) -> Option<&Path> {
        self.workspace.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expand_uses_parameters() {
        let resolver = VariableResolver::new(HashMap::from([(
            "RELEASE".to_string(),
            "1.2.0".to_string(),
        )]));
        let ctx = BuildContext::new(resolver, None);
        assert_eq!(ctx.expand("v${RELEASE}"), "v1.2.0");
        assert!(ctx.workspace().is_none());
    }
}
