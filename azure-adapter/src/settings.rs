//! Merge of the task's required flags into `~/.claude/settings.json`.

use anyhow::Context;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

/// Enables project MCP servers in the user settings under `home`, keeping
/// every other key. Missing, blank or corrupt files start from `{}`.
pub fn setup_claude_code_settings(home: &Path) -> anyhow::Result<PathBuf> {
    let dir = home.join(".claude");
    let path = dir.join("settings.json");

    let mut settings = match fs::read_to_string(&path) {
        Ok(content) if !content.trim().is_empty() => {
            match serde_json::from_str::<Value>(&content) {
                Ok(Value::Object(map)) => map,
                _ => {
                    tracing::warn!(path = %path.display(), "Ignoring unparseable Claude settings");
                    Map::new()
                }
            }
        }
        _ => Map::new(),
    };

    settings.insert("enableAllProjectMcpServers".to_string(), Value::Bool(true));

    fs::create_dir_all(&dir).with_context(|| format!("failed to create {}", dir.display()))?;
    fs::write(&path, serde_json::to_string_pretty(&Value::Object(settings))?)
        .with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!("Claude Code settings updated: {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn creates_directory_and_file() {
        let home = TempDir::new().unwrap();
        let path = setup_claude_code_settings(home.path()).unwrap();
        assert_eq!(path, home.path().join(".claude/settings.json"));
        assert_eq!(read(&path)["enableAllProjectMcpServers"], true);
    }

    #[test]
    fn preserves_existing_keys() {
        let home = TempDir::new().unwrap();
        fs::create_dir_all(home.path().join(".claude")).unwrap();
        fs::write(
            home.path().join(".claude/settings.json"),
            r#"{"someOtherSetting":"value","anotherKey":42}"#,
        )
        .unwrap();

        let settings = read(&setup_claude_code_settings(home.path()).unwrap());
        assert_eq!(settings["enableAllProjectMcpServers"], true);
        assert_eq!(settings["someOtherSetting"], "value");
        assert_eq!(settings["anotherKey"], 42);
    }

    #[test]
    fn blank_and_corrupt_files_start_fresh() {
        for content in ["   ", "{ invalid json {{", "[1, 2]"] {
            let home = TempDir::new().unwrap();
            fs::create_dir_all(home.path().join(".claude")).unwrap();
            fs::write(home.path().join(".claude/settings.json"), content).unwrap();

            let settings = read(&setup_claude_code_settings(home.path()).unwrap());
            assert_eq!(settings, serde_json::json!({"enableAllProjectMcpServers": true}));
        }
    }
}
