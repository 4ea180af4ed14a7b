use std::fmt::{Display, Formatter};

use log::debug;

use super::manifest::Manifest;

/// A required module after `replace` directives were applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Import path as declared in `require`.
    pub name: String,
    /// Path commits are resolved against; differs from `name` when replaced.
    pub repository: String,
    pub current_revision: String,
    /// Only set on modules produced by [`crate::diff::changed_modules`].
    pub previous_revision: Option<String>,
}

impl Module {
    pub fn new(name: impl Into<String>, revision: impl Into<String>) -> Module {
        let name = name.into();
        Module {
            repository: name.clone(),
            name,
            current_revision: revision.into(),
            previous_revision: None,
        }
    }

    pub fn replaced(
        name: impl Into<String>,
        repository: impl Into<String>,
        revision: impl Into<String>,
    ) -> Module {
        Module {
            name: name.into(),
            repository: repository.into(),
            current_revision: revision.into(),
            previous_revision: None,
        }
    }
}

impl Display for Module {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.previous_revision {
            Some(previous) => write!(f, "{} {}..{}", self.name, previous, self.current_revision),
            None => write!(f, "{} {}", self.name, self.current_revision),
        }?;
        if self.repository != self.name {
            write!(f, " ({})", self.repository)?;
        }
        Ok(())
    }
}

/// Flattens a manifest into one [`Module`] per requirement, in declaration order.
///
/// The first `replace` whose old path equals the module name wins and supplies
/// both the repository and the revision. The old version of the directive does
/// not restrict the match.
pub fn resolve_modules(manifest: &Manifest) -> Vec<Module> {
    manifest
        .requirements
        .iter()
        .map(|requirement| {
            match manifest
                .replacements
                .iter()
                .find(|replacement| replacement.old_path == requirement.path)
            {
                Some(replacement) => {
                    if let Some(old_version) = replacement
                        .old_version
                        .as_deref()
                        .filter(|old_version| *old_version != requirement.version)
                    {
                        debug!(
                            "Replacement of {}@{} applied to required version {}",
                            requirement.path, old_version, requirement.version
                        );
                    }
                    Module::replaced(
                        &requirement.path,
                        &replacement.new_path,
                        replacement.new_version.as_deref().unwrap_or_default(),
                    )
                }
                None => Module::new(&requirement.path, &requirement.version),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    fn parse(content: &str) -> Manifest {
        Manifest::parse("go.mod", content.as_bytes()).unwrap()
    }

    #[test]
    fn modules_without_replacements_point_at_themselves() {
        let manifest = parse(
            "require (\n\tgithub.com/a/a v1.0.0\n\tgithub.com/b/b v0.0.0-20200101000000-aaaaaaaaaaaa\n)\n",
        );
        let modules = resolve_modules(&manifest);
        assert_eq!(
            modules,
            vec![
                Module::new("github.com/a/a", "v1.0.0"),
                Module::new("github.com/b/b", "v0.0.0-20200101000000-aaaaaaaaaaaa"),
            ]
        );
        for (module, requirement) in modules.iter().zip(&manifest.requirements) {
            assert_eq!(module.repository, module.name);
            assert_eq!(module.current_revision, requirement.version);
        }
    }

    #[test]
    fn first_matching_replacement_wins() {
        let manifest = parse(
            "require (\n\tk8s.io/api v0.17.0\n\tgithub.com/c/c v1.2.0\n)\n\
             replace k8s.io/api => github.com/openshift/api v0.0.0-20200101000000-bbbbbbbbbbbb\n\
             replace k8s.io/api => github.com/other/api v9.9.9\n",
        );
        assert_eq!(
            resolve_modules(&manifest),
            vec![
                Module::replaced(
                    "k8s.io/api",
                    "github.com/openshift/api",
                    "v0.0.0-20200101000000-bbbbbbbbbbbb"
                ),
                Module::new("github.com/c/c", "v1.2.0"),
            ]
        );
    }

    #[test]
    fn versioned_replacement_applies_regardless_of_declared_version() {
        let manifest = parse(
            "require github.com/c/c v1.2.0\nreplace github.com/c/c v1.0.0 => github.com/fork/c v1.3.0\n",
        );
        assert_eq!(
            resolve_modules(&manifest),
            vec![Module::replaced("github.com/c/c", "github.com/fork/c", "v1.3.0")]
        );
    }

    #[test]
    fn local_replacement_has_empty_revision() {
        let manifest = parse("require github.com/c/c v1.2.0\nreplace github.com/c/c => ../c\n");
        assert_eq!(
            resolve_modules(&manifest),
            vec![Module::replaced("github.com/c/c", "../c", "")]
        );
    }

    #[test]
    fn display() {
        let mut module = Module::replaced("k8s.io/api", "github.com/openshift/api", "v2");
        module.previous_revision = Some("v1".to_owned());
        assert_eq!(
            module.to_string(),
            "k8s.io/api v1..v2 (github.com/openshift/api)"
        );
    }
}
