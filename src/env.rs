use std::collections::BTreeMap;
use std::process::Command;

use crate::model::{Entry, LoadReport};

/// The merged, string-only environment produced by a load.
///
/// Loading never touches the process environment; hand this to a
/// [`Command`] with [`LoadedEnv::apply_to`] instead.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedEnv {
    vars: BTreeMap<String, String>,
    report: LoadReport,
}

impl LoadedEnv {
    pub(crate) fn from_entries(entries: Vec<Entry>, report: LoadReport) -> Self {
        let vars = entries
            .into_iter()
            .map(|entry| (entry.key, entry.value.into_env_string()))
            .collect();

        Self { vars, report }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.vars.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn report(&self) -> LoadReport {
        self.report
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.vars
    }

    /// Inject every variable into `command`, overriding inherited values.
    pub fn apply_to<'c>(&self, command: &'c mut Command) -> &'c mut Command {
        command.envs(&self.vars)
    }
}

impl IntoIterator for LoadedEnv {
    type Item = (String, String);
    type IntoIter = std::collections::btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    fn entry(key: &str, value: Value) -> Entry {
        Entry {
            key: key.to_owned(),
            value,
            source: None,
            line: 1,
        }
    }

    #[test]
    fn coerces_typed_values_to_strings() {
        let env = LoadedEnv::from_entries(
            vec![
                entry("S", Value::from("text")),
                entry("N", Value::from(2.0)),
                entry("B", Value::from(true)),
            ],
            LoadReport::default(),
        );

        assert_eq!(env.len(), 3);
        assert_eq!(env.get("S"), Some("text"));
        assert_eq!(env.get("N"), Some("2"));
        assert_eq!(env.get("B"), Some("true"));
        assert_eq!(env.get("MISSING"), None);
    }

    #[test]
    fn iterates_in_key_order() {
        let env = LoadedEnv::from_entries(
            vec![entry("Z", Value::from("last")), entry("A", Value::from(1.0))],
            LoadReport::default(),
        );

        assert!(env.contains_key("Z"));
        assert!(!env.contains_key("B"));
        assert_eq!(env.iter().collect::<Vec<_>>(), vec![("A", "1"), ("Z", "last")]);

        let owned: Vec<(String, String)> = env.into_iter().collect();
        assert_eq!(
            owned,
            vec![
                ("A".to_owned(), "1".to_owned()),
                ("Z".to_owned(), "last".to_owned())
            ]
        );
    }

    #[test]
    fn apply_to_sets_command_env() {
        let env = LoadedEnv::from_entries(
            vec![entry("WITHENV_TEST", Value::from("1"))],
            LoadReport::default(),
        );
        let mut command = Command::new("true");
        env.apply_to(&mut command);

        let vars: Vec<_> = command.get_envs().collect();
        assert_eq!(
            vars,
            vec![(
                std::ffi::OsStr::new("WITHENV_TEST"),
                Some(std::ffi::OsStr::new("1"))
            )]
        );
    }
}
