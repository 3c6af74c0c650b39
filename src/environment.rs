use std::collections::HashMap;

/// Name of the variable holding the last foreground status.
pub const STATUS_VAR: &str = "?";

#[derive(Debug, Clone, PartialEq)]
struct Variable {
    value: String,
    exported: bool,
}

/// Variable table of the running shell process. A forked child works on
/// its own copy, so nothing it sets is visible to the parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Environment {
    vars: HashMap<String, Variable>,
}

impl Environment {
    pub fn new() -> Self {
        let mut env = Environment::empty();

        // Import all OS environment variables when starting the process (default value)
        for (k, v) in std::env::vars() {
            env.vars.insert(
                k,
                Variable {
                    value: v,
                    exported: true,
                },
            );
        }

        env
    }

    pub fn empty() -> Self {
        Environment {
            vars: HashMap::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(|v| v.value.as_str())
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.vars
            .entry(key.to_string())
            .and_modify(|var| var.value = value.to_string())
            .or_insert(Variable {
                value: value.to_string(),
                exported: false,
            });
    }

    pub fn set_exported(&mut self, key: &str, value: &str) {
        self.set(key, value);
        self.export(key);
    }

    pub fn unset(&mut self, key: &str) {
        self.vars.remove(key);
    }

    pub fn export(&mut self, key: &str) {
        if let Some(var) = self.vars.get_mut(key) {
            var.exported = true;
        }
    }

    /// `KEY=value` pairs handed to a replaced program image.
    pub fn exported_vars(&self) -> Vec<(String, String)> {
        self.vars
            .iter()
            .filter(|(_, v)| v.exported)
            .map(|(k, v)| (k.clone(), v.value.clone()))
            .collect()
    }

    pub fn set_last_status(&mut self, status: i32) {
        self.set_exported(STATUS_VAR, &status.to_string());
    }

    pub fn last_status(&self) -> Option<i32> {
        self.get(STATUS_VAR).and_then(|s| s.parse().ok())
    }

    pub fn set_pwd(&mut self, dir: &str) {
        self.set_exported("PWD", dir);
    }
}

impl Default for Environment {
    fn default() -> Self {
        Environment::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_includes_os_env() {
        let env = Environment::new();
        // At least one OS env var should exist
        assert!(!env.vars.is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut env = Environment::empty();
        env.set("FOO", "bar");
        assert_eq!(env.get("FOO"), Some("bar"));
        env.set("FOO", "baz");
        assert_eq!(env.get("FOO"), Some("baz"));
    }

    #[test]
    fn test_unset() {
        let mut env = Environment::empty();
        env.set("FOO", "bar");
        env.unset("FOO");
        assert_eq!(env.get("FOO"), None);
    }

    #[test]
    fn test_only_exported_vars_reach_children() {
        let mut env = Environment::empty();
        env.set("FOO", "bar");
        env.export("FOO");
        env.set("BAZ", "qux");
        let exported = env.exported_vars();
        assert!(exported.iter().any(|(k, v)| k == "FOO" && v == "bar"));
        assert!(!exported.iter().any(|(k, _)| k == "BAZ"));
    }

    #[test]
    fn test_last_status_is_exported() {
        let mut env = Environment::empty();
        assert_eq!(env.last_status(), None);
        env.set_last_status(127);
        assert_eq!(env.get("?"), Some("127"));
        assert_eq!(env.last_status(), Some(127));
        assert!(env.exported_vars().contains(&("?".to_string(), "127".to_string())));
    }

    #[test]
    fn test_clone_isolates_child_copy() {
        let mut parent = Environment::empty();
        parent.set_pwd("/home/u");
        let mut child = parent.clone();
        child.set_pwd("/tmp");
        child.set_exported("LOCAL", "1");
        assert_eq!(parent.get("PWD"), Some("/home/u"));
        assert_eq!(parent.get("LOCAL"), None);
    }
}
