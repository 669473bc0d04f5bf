use std::{env, fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::ConfigResult;

pub const DEFAULT_CONFIG_FILE: &str = "firebase-config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfig {
    pub api_key: String,
    #[serde(default)]
    pub auth_domain: String,
    pub project_id: String,
    #[serde(default)]
    pub storage_bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub messaging_sender_id: Option<String>,
    pub app_id: String,
}

impl FirebaseConfig {
    /// Placeholder used when neither the environment nor the config file
    /// provide usable credentials.
    pub fn demo() -> Self {
        Self {
            api_key: "demo-api-key".to_string(),
            auth_domain: "demo-project.firebaseapp.com".to_string(),
            project_id: "demo-project".to_string(),
            storage_bucket: "demo-project.firebasestorage.app".to_string(),
            messaging_sender_id: None,
            app_id: "demo-app-id".to_string(),
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.api_key.is_empty() && !self.project_id.is_empty() && !self.app_id.is_empty()
    }

    /// Builds a config from `FIREBASE_*` variables. Returns `None` unless the
    /// api key, project id and app id are all present.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());
        let api_key = var("FIREBASE_API_KEY")?;
        let project_id = var("FIREBASE_PROJECT_ID")?;
        let app_id = var("FIREBASE_APP_ID")?;
        Some(Self {
            auth_domain: var("FIREBASE_AUTH_DOMAIN")
                .unwrap_or_else(|| format!("{project_id}.firebaseapp.com")),
            storage_bucket: var("FIREBASE_STORAGE_BUCKET")
                .unwrap_or_else(|| format!("{project_id}.appspot.com")),
            messaging_sender_id: var("FIREBASE_MESSAGING_SENDER_ID"),
            api_key,
            project_id,
            app_id,
        })
    }

    #[must_use]
    pub fn merged(mut self, patch: FirebaseConfigPatch) -> Self {
        if let Some(api_key) = patch.api_key {
            self.api_key = api_key;
        }
        if let Some(auth_domain) = patch.auth_domain {
            self.auth_domain = auth_domain;
        }
        if let Some(project_id) = patch.project_id {
            self.project_id = project_id;
        }
        if let Some(storage_bucket) = patch.storage_bucket {
            self.storage_bucket = storage_bucket;
        }
        if let Some(sender_id) = patch.messaging_sender_id {
            self.messaging_sender_id = Some(sender_id);
        }
        if let Some(app_id) = patch.app_id {
            self.app_id = app_id;
        }
        self
    }
}

/// Partial update applied by [`update_firebase_config`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FirebaseConfigPatch {
    pub api_key: Option<String>,
    pub auth_domain: Option<String>,
    pub project_id: Option<String>,
    pub storage_bucket: Option<String>,
    pub messaging_sender_id: Option<String>,
    pub app_id: Option<String>,
}

pub fn load_firebase_config(path: &Path) -> FirebaseConfig {
    load_firebase_config_with(path, |key| env::var(key).ok())
}

/// Environment first (persisting it to `path`), then the file at `path`, then
/// the demo config.
pub fn load_firebase_config_with(
    path: &Path,
    lookup: impl Fn(&str) -> Option<String>,
) -> FirebaseConfig {
    if let Some(config) = FirebaseConfig::from_vars(lookup) {
        if let Err(err) = write_config_file(path, &config) {
            tracing::warn!(path = %path.display(), error = %err, "failed to persist firebase config");
        }
        tracing::info!(project_id = %config.project_id, "firebase config loaded from environment");
        return config;
    }

    if path.exists() {
        match read_config_file(path) {
            Ok(config) if config.is_complete() => {
                tracing::info!(path = %path.display(), "firebase config loaded from file");
                return config;
            }
            Ok(_) => {
                tracing::warn!(path = %path.display(), "firebase config file is missing required fields");
            }
            Err(err) => {
                tracing::error!(path = %path.display(), error = %err, "failed to read firebase config file");
            }
        }
    }

    tracing::warn!(
        path = %path.display(),
        "using demo firebase config, update the config file with real credentials"
    );
    FirebaseConfig::demo()
}

pub fn update_firebase_config(
    path: &Path,
    patch: FirebaseConfigPatch,
) -> ConfigResult<FirebaseConfig> {
    update_firebase_config_with(path, patch, |key| env::var(key).ok())
}

pub fn update_firebase_config_with(
    path: &Path,
    patch: FirebaseConfigPatch,
    lookup: impl Fn(&str) -> Option<String>,
) -> ConfigResult<FirebaseConfig> {
    let current = if path.exists() {
        read_config_file(path).unwrap_or_else(|_| load_firebase_config_with(path, lookup))
    } else {
        load_firebase_config_with(path, lookup)
    };

    let updated = current.merged(patch);
    write_config_file(path, &updated)?;
    tracing::info!(path = %path.display(), "firebase config updated");
    Ok(updated)
}

fn read_config_file(path: &Path) -> ConfigResult<FirebaseConfig> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn write_config_file(path: &Path, config: &FirebaseConfig) -> ConfigResult<()> {
    let data = serde_json::to_string_pretty(config)?;
    fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |key| map.get(key).map(|v| (*v).to_string())
    }

    fn no_vars(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn env_config_fills_derived_domains_and_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        let config = load_firebase_config_with(
            &path,
            vars(&[
                ("FIREBASE_API_KEY", "key-1"),
                ("FIREBASE_PROJECT_ID", "slice-house"),
                ("FIREBASE_APP_ID", "app-1"),
            ]),
        );

        assert_eq!(config.auth_domain, "slice-house.firebaseapp.com");
        assert_eq!(config.storage_bucket, "slice-house.appspot.com");
        assert_eq!(config.messaging_sender_id, None);
        assert_eq!(read_config_file(&path).unwrap(), config);
    }

    #[test]
    fn incomplete_env_falls_back_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        let stored = FirebaseConfig {
            api_key: "file-key".into(),
            auth_domain: "custom.example.com".into(),
            project_id: "file-project".into(),
            storage_bucket: "bucket".into(),
            messaging_sender_id: Some("42".into()),
            app_id: "file-app".into(),
        };
        write_config_file(&path, &stored).unwrap();

        let config = load_firebase_config_with(&path, vars(&[("FIREBASE_API_KEY", "key-only")]));

        assert_eq!(config, stored);
    }

    #[test]
    fn unusable_file_yields_demo_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        fs::write(&path, "{ not json").unwrap();

        assert_eq!(load_firebase_config_with(&path, no_vars), FirebaseConfig::demo());

        fs::write(&path, r#"{"apiKey":"","projectId":"p","appId":"a"}"#).unwrap();
        assert_eq!(load_firebase_config_with(&path, no_vars), FirebaseConfig::demo());
    }

    #[test]
    fn update_overlays_patch_on_stored_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);
        write_config_file(&path, &FirebaseConfig::demo()).unwrap();

        let updated = update_firebase_config_with(
            &path,
            FirebaseConfigPatch {
                api_key: Some("real-key".into()),
                messaging_sender_id: Some("1234".into()),
                ..FirebaseConfigPatch::default()
            },
            no_vars,
        )
        .unwrap();

        assert_eq!(updated.api_key, "real-key");
        assert_eq!(updated.project_id, "demo-project");
        assert_eq!(updated.messaging_sender_id.as_deref(), Some("1234"));
        assert_eq!(read_config_file(&path).unwrap(), updated);
    }

    #[test]
    fn update_without_file_starts_from_loaded_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_FILE);

        let updated = update_firebase_config_with(
            &path,
            FirebaseConfigPatch {
                app_id: Some("new-app".into()),
                ..FirebaseConfigPatch::default()
            },
            no_vars,
        )
        .unwrap();

        assert_eq!(updated.app_id, "new-app");
        assert_eq!(updated.api_key, "demo-api-key");
        assert!(path.exists());
    }
}
