use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Optional behaviour an application opts into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// `-v`, `-q`, `-s` and `--logfile` flags plus subscriber setup.
    pub logging: bool,
    /// `--bash-complete`, `--bash-eval` and `--completion-script`.
    pub completion: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub name: String,
    pub about: Option<String>,
    pub version: Option<String>,
    pub capabilities: Capabilities,
}

impl AppConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            about: None,
            version: None,
            capabilities: Capabilities::default(),
        }
    }
}

/// Settings of the interactive shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Defaults to `"<name>> "`.
    pub prompt: Option<String>,
    /// Persist input history between sessions.
    pub history: bool,
    /// Key that triggers completion; `None` disables completion.
    pub complete_key: Option<String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            prompt: None,
            history: false,
            complete_key: Some("tab".to_string()),
        }
    }
}

impl ShellConfig {
    pub fn prompt_for(&self, name: &str) -> String {
        self.prompt
            .clone()
            .unwrap_or_else(|| format!("{}> ", name))
    }
}

/// `$XDG_CONFIG_HOME`, or `~/.config` when unset.
pub fn config_home() -> Option<PathBuf> {
    resolve_config_home(env::var_os("XDG_CONFIG_HOME"), dirs::home_dir())
}

/// An empty `xdg_config_home` counts as unset.
pub fn resolve_config_home(xdg_config_home: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
    match xdg_config_home {
        Some(dir) if !dir.is_empty() => Some(PathBuf::from(dir)),
        _ => home.map(|home| home.join(".config")),
    }
}

/// Where the history of application `name` is kept.
pub fn history_path(name: &str) -> Option<PathBuf> {
    config_home().map(|dir| history_file_in(&dir, name))
}

pub fn history_file_in(config_home: &Path, name: &str) -> PathBuf {
    config_home.join(format!("{}.history", name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_defaults_to_name() {
        let config = ShellConfig::default();
        assert_eq!(config.prompt_for("foobar"), "foobar> ");

        let config = ShellConfig {
            prompt: Some("$ ".to_string()),
            ..ShellConfig::default()
        };
        assert_eq!(config.prompt_for("foobar"), "$ ");
    }

    #[test]
    fn test_default_complete_key_is_tab() {
        assert_eq!(ShellConfig::default().complete_key.as_deref(), Some("tab"));
        assert!(!ShellConfig::default().history);
    }

    #[test]
    fn test_config_home_prefers_xdg() {
        let dir = resolve_config_home(
            Some(OsString::from("/xdg/config")),
            Some(PathBuf::from("/home/user")),
        );
        assert_eq!(dir, Some(PathBuf::from("/xdg/config")));
    }

    #[test]
    fn test_config_home_falls_back_to_dot_config() {
        let home = Some(PathBuf::from("/home/user"));
        assert_eq!(
            resolve_config_home(None, home.clone()),
            Some(PathBuf::from("/home/user/.config"))
        );
        assert_eq!(
            resolve_config_home(Some(OsString::new()), home),
            Some(PathBuf::from("/home/user/.config"))
        );
        assert_eq!(resolve_config_home(None, None), None);
    }

    #[test]
    fn test_history_file_is_named_after_app() {
        assert_eq!(
            history_file_in(Path::new("/home/user/.config"), "foobar"),
            PathBuf::from("/home/user/.config/foobar.history")
        );
    }
}
