use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use minijinja::{Environment, Error, State};
use sha2::{Digest, Sha256};

/// Resolves `asset("wrapped.css")` in templates to a cache-busting URL.
#[derive(Debug, Clone)]
pub struct AssetLoader {
    root: PathBuf,
    cache: Arc<RwLock<HashMap<String, String>>>,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: Arc::default(),
        }
    }

    pub fn asset_path(&self, path: &str) -> String {
        if let Some(hashed) = self.cache.read().ok().and_then(|c| c.get(path).cloned()) {
            return hashed;
        }

        match fs::read(self.root.join(path)) {
            Ok(contents) => {
                let digest = Sha256::digest(&contents);
                let short: String = format!("{:x}", digest).chars().take(16).collect();
                let hashed = format!("/static/{}?v={}", path, short);
                if let Ok(mut cache) = self.cache.write() {
                    cache.insert(path.to_string(), hashed.clone());
                }
                hashed
            }
            Err(_) => format!("/static/{}", path),
        }
    }

    pub fn register(&self, env: &mut Environment<'_>) {
        let loader = self.clone();
        env.add_function("asset", move |_state: &State, path: String| -> Result<String, Error> {
            Ok(loader.asset_path(&path))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_assets_fall_back_to_plain_path() {
        let loader = AssetLoader::new("does-not-exist");
        assert_eq!(loader.asset_path("wrapped.css"), "/static/wrapped.css");
    }

    #[test]
    fn existing_assets_get_a_content_hash() {
        let loader = AssetLoader::new(env!("CARGO_MANIFEST_DIR"));
        let path = loader.asset_path("Cargo.toml");
        assert!(path.starts_with("/static/Cargo.toml?v="));
        assert_eq!(path.len(), "/static/Cargo.toml?v=".len() + 16);
        assert_eq!(loader.asset_path("Cargo.toml"), path);
    }
}
