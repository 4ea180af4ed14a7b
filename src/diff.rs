use crate::model::module::Module;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FilterMode {
    /// Keep modules whose name starts with one of the prefixes.
    #[default]
    Include,
    /// Keep modules for which at least one prefix does *not* match.
    ///
    /// Reproduces the historical `--paths` behaviour, which only filters
    /// anything when a single prefix is given, and then excludes it.
    Legacy,
}

/// Import path prefixes restricting which changed modules are reported.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathFilter {
    pub prefixes: Vec<String>,
    pub mode: FilterMode,
}

impl PathFilter {
    pub fn new(prefixes: Vec<String>, mode: FilterMode) -> Self {
        PathFilter { prefixes, mode }
    }

    pub fn matches(&self, name: &str) -> bool {
        if self.prefixes.is_empty() {
            return true;
        }
        match self.mode {
            FilterMode::Include => self
                .prefixes
                .iter()
                .any(|prefix| name.starts_with(prefix.as_str())),
            FilterMode::Legacy => self
                .prefixes
                .iter()
                .any(|prefix| !name.starts_with(prefix.as_str())),
        }
    }
}

/// Returns the modules of `new` whose revision differs from the module with
/// the same name in `old`, with `previous_revision` set.
///
/// Modules missing from `old` are new requirements and are not reported.
pub fn changed_modules(new: &[Module], old: &[Module], filter: &PathFilter) -> Vec<Module> {
    new.iter()
        .filter_map(|module| {
            let previous = old.iter().find(|old| old.name == module.name)?;
            if previous.current_revision == module.current_revision {
                return None;
            }
            if !filter.matches(&module.name) {
                return None;
            }
            Some(Module {
                previous_revision: Some(previous.current_revision.clone()),
                ..module.clone()
            })
        })
        .collect()
}
