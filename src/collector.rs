use crate::error::AssetsResult;
use crate::graph::PackageGraph;
use crate::matcher::VersionMatcher;
use crate::merge::{ContributedSet, RequirementSet};

/// npm requirements installed under one package's own directory.
#[derive(Debug, Clone, PartialEq)]
pub struct IsolatedRequirements {
    pub package: String,
    pub requirements: RequirementSet,
}

/// Everything the graph asks for, split by where it gets installed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectedRequirements {
    /// One entry per non-exposing package that declares npm dependencies, in graph order.
    pub npm_isolated: Vec<IsolatedRequirements>,
    /// npm dependencies of the root project merged with those of every exposing package.
    pub npm_exposed: RequirementSet,
    /// bower dependencies of the root project and every package.
    pub bower: RequirementSet,
}

impl CollectedRequirements {
    pub fn isolated(&self, package: &str) -> Option<&RequirementSet> {
        self.npm_isolated
            .iter()
            .find(|i| i.package == package)
            .map(|i| &i.requirements)
    }
}

/// Walks the graph and gathers asset requirements.
///
/// Dev-only declarations count only for the root package and only in development mode.
/// Packages without structured extras are skipped.
pub fn collect(
    graph: &dyn PackageGraph,
    dev_mode: bool,
    matcher: &dyn VersionMatcher,
) -> AssetsResult<CollectedRequirements> {
    let root = graph.root();
    let mut npm_exposed = ContributedSet::new();
    let mut bower = ContributedSet::new();
    let mut npm_isolated = Vec::new();

    if let Some(extras) = &root.extras {
        if dev_mode {
            npm_exposed.contribute(&root.name, &extras.require_dev_npm, matcher)?;
            bower.contribute(&root.name, &extras.require_dev_bower, matcher)?;
        }
        npm_exposed.contribute(&root.name, &extras.require_npm, matcher)?;
        bower.contribute(&root.name, &extras.require_bower, matcher)?;
    }

    for package in graph.packages() {
        let Some(extras) = &package.extras else {
            continue;
        };
        if extras.expose_npm_packages {
            npm_exposed.contribute(&package.name, &extras.require_npm, matcher)?;
        } else if !extras.require_npm.is_empty() {
            npm_isolated.push(IsolatedRequirements {
                package: package.name.clone(),
                requirements: extras.require_npm.clone(),
            });
        }
        bower.contribute(&package.name, &extras.require_bower, matcher)?;
    }

    tracing::debug!(
        isolated = npm_isolated.len(),
        exposed = npm_exposed.requirements().len(),
        bower = bower.requirements().len(),
        "collected asset requirements"
    );
    Ok(CollectedRequirements {
        npm_isolated,
        npm_exposed: npm_exposed.requirements(),
        bower: bower.requirements(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AssetsError;
    use crate::graph::StaticGraph;
    use crate::matcher::SemverMatcher;
    use crate::package::{AssetExtras, Package};

    fn set(pairs: &[(&str, &str)]) -> RequirementSet {
        pairs.iter().map(|(n, v)| (n.to_string(), v.to_string())).collect()
    }

    fn graph() -> StaticGraph {
        StaticGraph {
            root: Package::new(
                "acme/app",
                Some(AssetExtras {
                    require_npm: set(&[("gulp", "^3.9.0")]),
                    require_dev_npm: set(&[("mocha", "^2.0.0")]),
                    require_bower: set(&[("jquery", "~2.1")]),
                    require_dev_bower: set(&[("qunit", "~1.18")]),
                    ..Default::default()
                }),
            ),
            packages: vec![
                Package::new(
                    "acme/isolated",
                    Some(AssetExtras {
                        require_npm: set(&[("left-pad", "^1.0.0")]),
                        require_dev_npm: set(&[("ignored", "1.0.0")]),
                        ..Default::default()
                    }),
                ),
                Package::new("acme/plain", None),
                Package::new(
                    "acme/exposed",
                    Some(AssetExtras {
                        require_npm: set(&[("left-pad", "^1.0.0"), ("gulp", "^3.9.1")]),
                        expose_npm_packages: true,
                        require_bower: set(&[("jquery", "2.x")]),
                        ..Default::default()
                    }),
                ),
                Package::new("acme/empty", Some(AssetExtras::default())),
            ],
        }
    }

    #[test]
    fn test_collect_dev_mode() {
        let collected = collect(&graph(), true, &SemverMatcher::new()).unwrap();
        assert_eq!(
            collected.npm_isolated,
            vec![IsolatedRequirements {
                package: "acme/isolated".to_string(),
                requirements: set(&[("left-pad", "^1.0.0")]),
            }]
        );
        assert_eq!(
            collected.npm_exposed,
            set(&[("gulp", "^3.9.0 ^3.9.1"), ("left-pad", "^1.0.0"), ("mocha", "^2.0.0")])
        );
        assert_eq!(collected.bower, set(&[("jquery", "~2.1 2.x"), ("qunit", "~1.18")]));
    }

    #[test]
    fn test_collect_without_dev_mode() {
        let collected = collect(&graph(), false, &SemverMatcher::new()).unwrap();
        assert!(!collected.npm_exposed.contains_key("mocha"));
        assert!(!collected.bower.contains_key("qunit"));
        assert_eq!(collected.isolated("acme/isolated").unwrap(), &set(&[("left-pad", "^1.0.0")]));
        assert!(collected.isolated("acme/empty").is_none());
    }

    #[test]
    fn test_collect_conflict() {
        let mut graph = graph();
        graph.packages.push(Package::new(
            "acme/newer",
            Some(AssetExtras {
                require_npm: set(&[("left-pad", "^2.0.0")]),
                expose_npm_packages: true,
                ..Default::default()
            }),
        ));
        let err = collect(&graph, false, &SemverMatcher::new()).unwrap_err();
        assert!(matches!(
            err,
            AssetsError::Conflict { ref existing_package, ref package, .. }
                if existing_package == "acme/exposed" && package == "acme/newer"
        ));
    }

    #[test]
    fn test_root_without_extras() {
        let graph = StaticGraph {
            root: Package::new("acme/app", None),
            packages: vec![],
        };
        assert_eq!(collect(&graph, true, &SemverMatcher::new()).unwrap(), CollectedRequirements::default());
    }
}
