use std::collections::BTreeMap;
use crate::error::{AssetsError, AssetsResult};
use crate::matcher::VersionMatcher;

/// Dependency name to version specifier.
pub type RequirementSet = BTreeMap<String, String>;

/// Merges `addition` into `base`.
///
/// Names missing from `base` are inserted as-is, identical specifiers are left alone and
/// differing specifiers are space-joined into one compound specifier that must satisfy both.
pub fn merge(base: &RequirementSet, addition: &RequirementSet) -> RequirementSet {
    let mut merged = base.clone();
    for (name, specifier) in addition {
        match merged.get_mut(name) {
            None => {
                merged.insert(name.clone(), specifier.clone());
            }
            Some(existing) => {
                if existing != specifier {
                    *existing = join_specifiers(existing, specifier);
                }
            }
        }
    }
    merged
}

fn join_specifiers(existing: &str, incoming: &str) -> String {
    format!("{} {}", existing, incoming)
}

/// A requirement set assembled from several packages.
///
/// Remembers which package first asked for each dependency so a conflict can name both sides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContributedSet {
    requirements: RequirementSet,
    origins: BTreeMap<String, String>,
}

impl ContributedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the declarations of `package`.
    ///
    /// A differing specifier for a name already present is checked with `matcher`.
    /// Compatible specifiers are joined by [`merge`], incompatible ones fail with
    /// [`AssetsError::Conflict`] and leave the set untouched.
    pub fn contribute(
        &mut self,
        package: &str,
        addition: &RequirementSet,
        matcher: &dyn VersionMatcher,
    ) -> AssetsResult<()> {
        for (name, specifier) in addition {
            let Some(existing) = self.requirements.get(name) else {
                continue;
            };
            if existing == specifier {
                continue;
            }
            if !matcher.compatible(existing, specifier) {
                return Err(AssetsError::Conflict {
                    dependency: name.clone(),
                    existing_package: self.origins.get(name).cloned().unwrap_or_default(),
                    existing_specifier: existing.clone(),
                    package: package.to_string(),
                    specifier: specifier.clone(),
                });
            }
            tracing::debug!(
                dependency = %name,
                existing = %existing,
                incoming = %specifier,
                package,
                "joining compatible specifiers"
            );
        }
        self.requirements = merge(&self.requirements, addition);
        for name in addition.keys() {
            self.origins.entry(name.clone()).or_insert_with(|| package.to_string());
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn requirements(&self) -> RequirementSet {
        self.requirements.clone()
    }
}
