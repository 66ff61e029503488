use std::collections::BTreeMap;
use serde::{Deserialize, Serialize};

/// The exact dependency tree a tool installed at one path.
pub type ResolvedTree = BTreeMap<String, LockedDependency>;

/// One installed dependency, as recorded by `npm shrinkwrap` or bower's `.bower.json`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LockedDependency {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependencies: Option<ResolvedTree>,
}

impl LockedDependency {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            from: None,
            resolved: None,
            dependencies: None,
        }
    }

    pub fn with_dependencies(mut self, dependencies: ResolvedTree) -> Self {
        self.dependencies = Some(dependencies);
        self
    }
}

/// Structural equality of two trees: same names, same versions and the same nesting, at every depth.
///
/// `from` and `resolved` are ignored.
pub fn trees_equal(a: &ResolvedTree, b: &ResolvedTree) -> bool {
    describe_drift(a, b).is_none()
}

/// The first difference between `expected` and `actual`, if any.
pub fn describe_drift(expected: &ResolvedTree, actual: &ResolvedTree) -> Option<String> {
    drift_at("", expected, actual)
}

fn drift_at(prefix: &str, expected: &ResolvedTree, actual: &ResolvedTree) -> Option<String> {
    for (name, want) in expected {
        let path = format!("{prefix}{name}");
        let Some(got) = actual.get(name) else {
            return Some(format!("{path}: {} not installed", want.version));
        };
        if want.version != got.version {
            return Some(format!("{path}: {} != {}", want.version, got.version));
        }
        match (&want.dependencies, &got.dependencies) {
            (Some(want_deps), Some(got_deps)) => {
                if let Some(drift) = drift_at(&format!("{path} > "), want_deps, got_deps) {
                    return Some(drift);
                }
            }
            (None, None) => {}
            (Some(_), None) => return Some(format!("{path}: nested dependencies missing")),
            (None, Some(_)) => return Some(format!("{path}: unexpected nested dependencies")),
        }
    }
    actual
        .keys()
        .find(|name| !expected.contains_key(*name))
        .map(|name| format!("{prefix}{name}: not in lock file"))
}
