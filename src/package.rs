use serde::{Deserialize, Serialize};
use crate::merge::RequirementSet;

/// A package of the host graph, reduced to what asset reconciliation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    /// The package name, e.g. `"acme/widgets"`. Isolated installs land in `<vendor-dir>/<name>`.
    pub name: String,
    /// Asset declarations from the package's `extra` section.
    /// `None` when the package carries no structured extras at all.
    pub extras: Option<AssetExtras>,
}

/// Asset declarations a package makes in its `extra` section.
///
/// Every field is optional in the source document and defaults to empty/false.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct AssetExtras {
    /// npm dependencies, installed under the package's own directory unless exposed.
    pub require_npm: RequirementSet,
    /// npm dependencies honored only for the root package in development mode.
    pub require_dev_npm: RequirementSet,
    /// Merge `require-npm` into the root project's install instead of isolating it.
    pub expose_npm_packages: bool,
    /// bower dependencies, always merged into the root project's install.
    pub require_bower: RequirementSet,
    /// bower dependencies honored only for the root package in development mode.
    pub require_dev_bower: RequirementSet,
}

impl Package {
    pub fn new(name: &str, extras: Option<AssetExtras>) -> Self {
        Self {
            name: name.to_string(),
            extras,
        }
    }

    /// Builds a package from a raw `extra` value.
    ///
    /// Anything that is not an object, or does not fit [`AssetExtras`], is treated as
    /// "no structured extras".
    pub fn from_extra(name: &str, extra: Option<serde_json::Value>) -> Self {
        let extras = match extra {
            Some(value @ serde_json::Value::Object(_)) => {
                match serde_json::from_value::<AssetExtras>(value) {
                    Ok(extras) => Some(extras),
                    Err(e) => {
                        tracing::warn!(package = name, error = %e, "ignoring malformed asset extras");
                        None
                    }
                }
            }
            _ => None,
        };
        Self::new(name, extras)
    }

    pub fn exposes_npm(&self) -> bool {
        self.extras.as_ref().is_some_and(|e| e.expose_npm_packages)
    }
}
