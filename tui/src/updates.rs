//! Startup update check against the published manifest.

use serde_json::Value;

use newtab_core::version::is_newer_version;

pub(crate) const DEFAULT_MANIFEST_URL: &str =
    "https://raw.githubusercontent.com/Foxfox09/newtab/main/newtab/manifest.json";

/// Fetch the published manifest and return the remote version when it is
/// strictly newer than `current_version`.
pub(crate) async fn newer_published_version(
    manifest_url: &str,
    current_version: &str,
) -> anyhow::Result<Option<String>> {
    let manifest: Value = reqwest::Client::new()
        .get(manifest_url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    let Some(remote) = manifest.get("version").and_then(Value::as_str) else {
        anyhow::bail!("manifest has no version field");
    };
    if is_newer_version(remote, current_version) {
        Ok(Some(remote.to_string()))
    } else {
        Ok(None)
    }
}
