use std::path::{Path, PathBuf};
use serde_json::{Map, Value};
use crate::error::{AssetsError, AssetsResult};
use crate::merge::RequirementSet;

const DESCRIPTION: &str = "This file is auto-generated by extra-assets. You can modify this file but the \
'dependencies' section will be overwritten each time you run composer install or composer update. \
You must not change the 'name' section.";

/// A package manager manifest (`package.json`, `bower.json`) owned by extra-assets.
///
/// Ownership is marked by a sentinel `name`. A manifest with any other name belongs to the
/// user and is never overwritten.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    fields: Map<String, Value>,
}

impl Manifest {
    /// Loads our own manifest at `path`, or starts a new one from `defaults`.
    ///
    /// # Errors
    /// [`AssetsError::ManifestCollision`] if a foreign manifest already exists.
    pub fn load_or_create<P: AsRef<Path>>(
        path: P,
        sentinel: &str,
        defaults: Map<String, Value>,
    ) -> AssetsResult<Self> {
        let path = path.as_ref().to_path_buf();
        if path.exists() {
            let fields: Map<String, Value> = serde_json::from_str(&std::fs::read_to_string(&path)?)
                .unwrap_or_default();
            if fields.get("name").and_then(Value::as_str) != Some(sentinel) {
                return Err(collision(&path));
            }
            return Ok(Self { path, fields });
        }
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::from(sentinel));
        fields.insert("description".to_string(), Value::from(DESCRIPTION));
        fields.extend(defaults);
        Ok(Self { path, fields })
    }

    pub fn set_dependencies(&mut self, dependencies: &RequirementSet) {
        let deps: Map<String, Value> = dependencies
            .iter()
            .map(|(name, spec)| (name.clone(), Value::from(spec.as_str())))
            .collect();
        self.fields.insert("dependencies".to_string(), Value::Object(deps));
    }

    pub fn save(&self) -> AssetsResult<()> {
        let mut content = serde_json::to_string_pretty(&self.fields)?;
        content.push('\n');
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn collision(path: &Path) -> AssetsError {
    let file = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_default();
    AssetsError::ManifestCollision {
        path: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        file,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_create_writes_sentinel_and_dependencies() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.json");
        let mut manifest = Manifest::load_or_create(&path, "extra-assets", Map::new()).unwrap();
        let mut deps = RequirementSet::new();
        deps.insert("left-pad".to_string(), "^1.0.0".to_string());
        manifest.set_dependencies(&deps);
        manifest.save().unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["name"], "extra-assets");
        assert_eq!(written["dependencies"]["left-pad"], "^1.0.0");
    }

    #[test]
    fn test_owned_manifest_keeps_other_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("package.json");
        std::fs::write(&path, r#"{"name": "extra-assets", "private": true, "dependencies": {"old": "1"}}"#).unwrap();
        let mut manifest = Manifest::load_or_create(&path, "extra-assets", Map::new()).unwrap();
        manifest.set_dependencies(&RequirementSet::new());
        manifest.save().unwrap();

        let written: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(written["private"], true);
        assert!(written["dependencies"].as_object().unwrap().is_empty());
    }

    #[test]
    fn test_foreign_manifest_is_a_collision() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bower.json");
        std::fs::write(&path, r#"{"name": "my-app"}"#).unwrap();
        let err = Manifest::load_or_create(&path, "temp-extra-assets", Map::new()).unwrap_err();
        assert!(matches!(err, AssetsError::ManifestCollision { ref file, .. } if file == "bower.json"));
        // untouched
        assert_eq!(std::fs::read_to_string(&path).unwrap(), r#"{"name": "my-app"}"#);
    }
}
