//! `${name}` variable substitution over build parameters and environment

use std::collections::HashMap;

/// Resolves `${name}` references against a merged variable map.
///
/// Build parameters take priority over environment variables; references to
/// unknown variables are left in the text untouched so broken templates stay
/// visible in the build log.
#[derive(Debug, Clone, Default)]
pub struct VariableResolver {
    values: HashMap<String, String>,
}

impl VariableResolver {
    pub fn new(values: HashMap<String, String>) -> Self {
        Self { values }
    }

    /// Merges environment variables and build parameters, parameters winning.
    pub fn from_sources(
        environment: HashMap<String, String>, parameters: HashMap<String, String>,
    ) -> Self {
        let mut values = environment;
        values.extend(parameters);
        Self { values }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Replaces every `${name}` occurrence with the variable's value.
    pub fn resolve(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            match after.find('}') {
                Some(end) => {
                    let name = &after[..end];
                    match self.values.get(name) {
                        Some(value) => out.push_str(value),
                        None => {
                            out.push_str("${");
                            out.push_str(name);
                            out.push('}');
                        }
                    }
                    rest = &after[end + 1..];
                }
                None => {
                    // Unterminated reference, keep the remainder verbatim
                    out.push_str(&rest[start..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver(pairs: &[(&str, &str)]) -> VariableResolver {
        VariableResolver::new(
            pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }

    #[test]
    fn test_resolve_simple() {
        let r = resolver(&[("VERSION", "1.4.0")]);
        assert_eq!(r.resolve("release-${VERSION}"), "release-1.4.0");
    }

    #[test]
    fn test_unknown_variable_left_untouched() {
        let r = resolver(&[]);
        assert_eq!(r.resolve("tag ${MISSING} end"), "tag ${MISSING} end");
    }

    #[test]
    fn test_unterminated_reference() {
        let r = resolver(&[("A", "x")]);
        assert_eq!(r.resolve("${A} and ${broken"), "x and ${broken");
    }

    #[test]
    fn test_parameters_override_environment() {
        let env = HashMap::from([("NAME".to_string(), "from-env".to_string())]);
        let params = HashMap::from([("NAME".to_string(), "from-params".to_string())]);
        let r = VariableResolver::from_sources(env, params);
        assert_eq!(r.resolve("${NAME}"), "from-params");
    }

    #[test]
    fn test_multiple_references() {
        let r = resolver(&[("A", "1"), ("B", "2")]);
        assert_eq!(r.resolve("${A},${B},${A}"), "1,2,1");
    }
}
