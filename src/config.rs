use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use serde::de::Deserializer;
use serde::Deserialize;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "cbook";
const DEFAULT_CONTACTS_FILE: &str = "contact.txt";
const DEFAULT_SELECTION_FILE: &str = "current.txt";
/// One frame at 60 Hz.
const DEFAULT_TICK_MS: u64 = 16;

#[derive(Debug, Clone)]
pub struct Config {
    pub config_path: PathBuf,
    pub data_dir: PathBuf,
    pub contacts_path: PathBuf,
    pub selection_path: PathBuf,
    pub persist_selection: bool,
    pub tick: Duration,
    pub keys: Keys,
    pub ui: UiConfig,
    /// Problems found while reading the file that did not prevent loading.
    pub warnings: Vec<String>,
}

impl Config {
    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}

/// Expand ~ to home directory in paths
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

#[derive(Debug, Clone)]
pub struct UiConfig {
    pub colors: UiColors,
    pub layout: UiLayout,
}

#[derive(Debug, Clone)]
pub struct UiColors {
    pub border: RgbColor,
    pub accent: RgbColor,
    pub hover: RgbColor,
    pub danger: RgbColor,
    pub confirm: RgbColor,
    pub field_bg: RgbColor,
    pub selection_bg: RgbColor,
    pub selection_fg: RgbColor,
    pub status_fg: RgbColor,
    pub status_bg: RgbColor,
}

#[derive(Debug, Clone)]
pub struct UiLayout {
    /// Width of the contact rows on the list screen
    pub list_width: u16,
    /// Width of the input boxes on the edit screen
    pub field_width: u16,
    pub button_width: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

// =============================================================================
// Key Bindings - one context per screen, plus the delete confirmation
// =============================================================================

#[derive(Debug, Clone, Default)]
pub struct Keys {
    pub list: ListKeys,
    pub edit: EditKeys,
    pub view: ViewKeys,
    pub confirm: ConfirmKeys,
}

#[derive(Debug, Clone)]
pub struct ListKeys {
    pub add: Vec<String>,
    pub open: Vec<String>,
    pub next: Vec<String>,
    pub prev: Vec<String>,
    pub quit: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct EditKeys {
    pub save: Vec<String>,
    pub cancel: Vec<String>,
    pub next_field: Vec<String>,
    pub prev_field: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ViewKeys {
    pub back: Vec<String>,
    pub edit: Vec<String>,
    pub delete: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ConfirmKeys {
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

impl Default for ListKeys {
    fn default() -> Self {
        Self {
            add: vec!["F2".into(), "Insert".into()],
            open: vec!["Enter".into()],
            next: vec!["Down".into(), "Tab".into()],
            prev: vec!["Up".into(), "Backtab".into()],
            quit: vec!["Escape".into(), "F10".into()],
        }
    }
}

impl Default for EditKeys {
    fn default() -> Self {
        Self {
            save: vec!["Enter".into()],
            cancel: vec!["Escape".into()],
            next_field: vec!["Tab".into(), "Down".into()],
            prev_field: vec!["Backtab".into(), "Up".into()],
        }
    }
}

impl Default for ViewKeys {
    fn default() -> Self {
        Self {
            back: vec!["Escape".into(), "q".into(), "Backspace".into()],
            edit: vec!["e".into()],
            delete: vec!["d".into(), "Delete".into()],
        }
    }
}

impl Default for ConfirmKeys {
    fn default() -> Self {
        Self {
            confirm: vec!["y".into(), "Enter".into()],
            cancel: vec!["n".into(), "Escape".into()],
        }
    }
}

// =============================================================================
// Serde deserialization types (support both single string and array)
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum KeyBinding {
    Single(String),
    Multiple(Vec<String>),
}

impl KeyBinding {
    fn into_vec(self) -> Vec<String> {
        match self {
            KeyBinding::Single(s) => vec![s],
            KeyBinding::Multiple(v) => v,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct KeysFile {
    list: ListKeysFile,
    edit: EditKeysFile,
    view: ViewKeysFile,
    confirm: ConfirmKeysFile,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ListKeysFile {
    add: KeyBinding,
    open: KeyBinding,
    next: KeyBinding,
    prev: KeyBinding,
    quit: KeyBinding,
}

impl Default for ListKeysFile {
    fn default() -> Self {
        let defaults = ListKeys::default();
        Self {
            add: KeyBinding::Multiple(defaults.add),
            open: KeyBinding::Multiple(defaults.open),
            next: KeyBinding::Multiple(defaults.next),
            prev: KeyBinding::Multiple(defaults.prev),
            quit: KeyBinding::Multiple(defaults.quit),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct EditKeysFile {
    save: KeyBinding,
    cancel: KeyBinding,
    next_field: KeyBinding,
    prev_field: KeyBinding,
}

impl Default for EditKeysFile {
    fn default() -> Self {
        let defaults = EditKeys::default();
        Self {
            save: KeyBinding::Multiple(defaults.save),
            cancel: KeyBinding::Multiple(defaults.cancel),
            next_field: KeyBinding::Multiple(defaults.next_field),
            prev_field: KeyBinding::Multiple(defaults.prev_field),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ViewKeysFile {
    back: KeyBinding,
    edit: KeyBinding,
    delete: KeyBinding,
}

impl Default for ViewKeysFile {
    fn default() -> Self {
        let defaults = ViewKeys::default();
        Self {
            back: KeyBinding::Multiple(defaults.back),
            edit: KeyBinding::Multiple(defaults.edit),
            delete: KeyBinding::Multiple(defaults.delete),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfirmKeysFile {
    confirm: KeyBinding,
    cancel: KeyBinding,
}

impl Default for ConfirmKeysFile {
    fn default() -> Self {
        let defaults = ConfirmKeys::default();
        Self {
            confirm: KeyBinding::Multiple(defaults.confirm),
            cancel: KeyBinding::Multiple(defaults.cancel),
        }
    }
}

impl From<KeysFile> for Keys {
    fn from(file: KeysFile) -> Self {
        Self {
            list: ListKeys {
                add: file.list.add.into_vec(),
                open: file.list.open.into_vec(),
                next: file.list.next.into_vec(),
                prev: file.list.prev.into_vec(),
                quit: file.list.quit.into_vec(),
            },
            edit: EditKeys {
                save: file.edit.save.into_vec(),
                cancel: file.edit.cancel.into_vec(),
                next_field: file.edit.next_field.into_vec(),
                prev_field: file.edit.prev_field.into_vec(),
            },
            view: ViewKeys {
                back: file.view.back.into_vec(),
                edit: file.view.edit.into_vec(),
                delete: file.view.delete.into_vec(),
            },
            confirm: ConfirmKeys {
                confirm: file.confirm.confirm.into_vec(),
                cancel: file.confirm.cancel.into_vec(),
            },
        }
    }
}

// =============================================================================
// Key binding validation
// =============================================================================

/// Normalize a key binding string to a canonical form for collision detection.
/// Single characters preserve case (since 'E' means Shift+e, different from 'e').
/// Multi-character key names are case-insensitive (Enter, ENTER, enter are the same).
fn normalize_binding(binding: &str) -> String {
    let trimmed = binding.trim();
    if trimmed.chars().count() == 1 {
        trimmed.to_string()
    } else {
        trimmed.to_ascii_lowercase()
    }
}

fn check_context_collisions(bindings: &[(&str, &[String])], context_name: &str) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::new();

    for (action_name, keys) in bindings {
        for key in *keys {
            let normalized = normalize_binding(key);
            if normalized.is_empty() {
                continue;
            }
            if let Some(existing_action) = seen.get(&normalized) {
                bail!(
                    "key binding collision in [keys.{}]: '{}' is bound to both '{}' and '{}'",
                    context_name,
                    key,
                    existing_action,
                    action_name
                );
            }
            seen.insert(normalized, action_name);
        }
    }

    Ok(())
}

fn validate_key_bindings(keys: &Keys) -> Result<()> {
    check_context_collisions(
        &[
            ("add", &keys.list.add),
            ("open", &keys.list.open),
            ("next", &keys.list.next),
            ("prev", &keys.list.prev),
            ("quit", &keys.list.quit),
        ],
        "list",
    )?;

    check_context_collisions(
        &[
            ("save", &keys.edit.save),
            ("cancel", &keys.edit.cancel),
            ("next_field", &keys.edit.next_field),
            ("prev_field", &keys.edit.prev_field),
        ],
        "edit",
    )?;

    check_context_collisions(
        &[
            ("back", &keys.view.back),
            ("edit", &keys.view.edit),
            ("delete", &keys.view.delete),
        ],
        "view",
    )?;

    check_context_collisions(
        &[
            ("confirm", &keys.confirm.confirm),
            ("cancel", &keys.confirm.cancel),
        ],
        "confirm",
    )?;

    Ok(())
}

// =============================================================================
// Config file structure
// =============================================================================

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ConfigFile {
    data_dir: Option<PathBuf>,
    contacts_file: Option<PathBuf>,
    selection_file: Option<PathBuf>,
    tick_ms: Option<u64>,
    selection: SelectionFile,
    keys: KeysFile,
    ui: UiFile,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SelectionFile {
    persist: bool,
}

impl Default for SelectionFile {
    fn default() -> Self {
        Self { persist: true }
    }
}

fn config_root() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.config_dir().join(APP_NAME))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

fn default_data_dir() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine data directories")?;
    Ok(base.data_dir().join(APP_NAME))
}

/// Load configuration from `explicit` or the default location.
///
/// A missing default file yields built-in defaults; a missing explicit file is
/// an error. `data_dir_override` wins over `data_dir` from the file.
pub fn load(explicit: Option<&Path>, data_dir_override: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => config_path()?,
    };

    let mut warnings = Vec::new();
    let cfg_file = if path.exists() {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read configuration file at {}", path.display()))?;

        let value: toml::Value = toml::from_str(&raw)
            .with_context(|| format!("failed to parse {} as TOML", path.display()))?;

        warn_unknown_keys(&value, &mut warnings);

        value
            .try_into()
            .with_context(|| format!("failed to deserialize config from {}", path.display()))?
    } else if explicit.is_some() {
        bail!("configuration file not found at {}", path.display());
    } else {
        ConfigFile::default()
    };

    let data_dir = match (data_dir_override, cfg_file.data_dir.as_deref()) {
        (Some(dir), _) => dir.to_path_buf(),
        (None, Some(dir)) => expand_tilde(dir),
        (None, None) => default_data_dir()?,
    };

    let contacts_path = data_dir.join(expand_tilde(
        cfg_file
            .contacts_file
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_CONTACTS_FILE)),
    ));
    let selection_path = data_dir.join(expand_tilde(
        cfg_file
            .selection_file
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_SELECTION_FILE)),
    ));

    if contacts_path == selection_path {
        bail!(
            "contacts_file and selection_file both resolve to {}",
            contacts_path.display()
        );
    }

    let tick_ms = match cfg_file.tick_ms {
        Some(0) | None => DEFAULT_TICK_MS,
        Some(ms) => ms,
    };

    let keys: Keys = cfg_file.keys.into();
    validate_key_bindings(&keys)?;

    Ok(Config {
        config_path: path,
        data_dir,
        contacts_path,
        selection_path,
        persist_selection: cfg_file.selection.persist,
        tick: Duration::from_millis(tick_ms),
        keys,
        ui: cfg_file.ui.into(),
        warnings,
    })
}

// =============================================================================
// Unknown key warnings
// =============================================================================

fn warn_unknown_keys(value: &toml::Value, warnings: &mut Vec<String>) {
    warn_unknown_in_table(
        value,
        "",
        &[
            "data_dir",
            "contacts_file",
            "selection_file",
            "tick_ms",
            "selection",
            "keys",
            "ui",
        ],
        warnings,
    );

    let Some(table) = value.as_table() else {
        return;
    };

    if let Some(selection) = table.get("selection") {
        warn_unknown_in_table(selection, "selection", &["persist"], warnings);
    }

    if let Some(keys) = table.get("keys") {
        warn_unknown_in_table(keys, "keys", &["list", "edit", "view", "confirm"], warnings);
        if let Some(keys) = keys.as_table() {
            let contexts: [(&str, &[&str]); 4] = [
                ("list", &["add", "open", "next", "prev", "quit"]),
                ("edit", &["save", "cancel", "next_field", "prev_field"]),
                ("view", &["back", "edit", "delete"]),
                ("confirm", &["confirm", "cancel"]),
            ];
            for (context, known) in contexts {
                if let Some(v) = keys.get(context) {
                    warn_unknown_in_table(v, &format!("keys.{}", context), known, warnings);
                }
            }
        }
    }

    if let Some(ui) = table.get("ui") {
        warn_unknown_in_table(ui, "ui", &["colors", "layout"], warnings);
        if let Some(ui) = ui.as_table() {
            if let Some(colors) = ui.get("colors") {
                warn_unknown_in_table(
                    colors,
                    "ui.colors",
                    &[
                        "border",
                        "accent",
                        "hover",
                        "danger",
                        "confirm",
                        "field_bg",
                        "selection_bg",
                        "selection_fg",
                        "status_fg",
                        "status_bg",
                    ],
                    warnings,
                );
            }
            if let Some(layout) = ui.get("layout") {
                warn_unknown_in_table(
                    layout,
                    "ui.layout",
                    &["list_width", "field_width", "button_width"],
                    warnings,
                );
            }
        }
    }
}

fn warn_unknown_in_table(
    value: &toml::Value,
    section: &str,
    known: &[&str],
    warnings: &mut Vec<String>,
) {
    let Some(table) = value.as_table() else {
        return;
    };
    let known_set: HashSet<&str> = known.iter().copied().collect();
    for key in table.keys() {
        if known_set.contains(key.as_str()) {
            continue;
        }
        if section.is_empty() {
            warnings.push(format!("unknown configuration key `{}`", key));
        } else {
            warnings.push(format!("unknown {}.* entry `{}`", section, key));
        }
    }
}

// =============================================================================
// UI config types
// =============================================================================

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct UiFile {
    colors: UiColorsFile,
    layout: UiLayoutFile,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct UiColorsFile {
    border: RgbColor,
    accent: RgbColor,
    hover: RgbColor,
    danger: RgbColor,
    confirm: RgbColor,
    field_bg: RgbColor,
    selection_bg: RgbColor,
    selection_fg: RgbColor,
    status_fg: RgbColor,
    status_bg: RgbColor,
}

impl Default for UiColorsFile {
    fn default() -> Self {
        Self {
            border: RgbColor::new(105, 105, 105),
            accent: RgbColor::new(0, 255, 255),
            hover: RgbColor::new(0, 200, 200),
            danger: RgbColor::new(255, 0, 0),
            confirm: RgbColor::new(0, 255, 0),
            field_bg: RgbColor::new(105, 105, 105),
            selection_bg: RgbColor::new(0, 255, 255),
            selection_fg: RgbColor::new(0, 0, 0),
            status_fg: RgbColor::new(0, 255, 255),
            status_bg: RgbColor::new(0, 0, 0),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct UiLayoutFile {
    list_width: u16,
    field_width: u16,
    button_width: u16,
}

impl Default for UiLayoutFile {
    fn default() -> Self {
        Self {
            list_width: 40,
            field_width: 40,
            button_width: 12,
        }
    }
}

impl From<UiFile> for UiConfig {
    fn from(file: UiFile) -> Self {
        let defaults = UiLayoutFile::default();
        let or_default = |value: u16, fallback: u16| if value == 0 { fallback } else { value };
        Self {
            colors: UiColors {
                border: file.colors.border,
                accent: file.colors.accent,
                hover: file.colors.hover,
                danger: file.colors.danger,
                confirm: file.colors.confirm,
                field_bg: file.colors.field_bg,
                selection_bg: file.colors.selection_bg,
                selection_fg: file.colors.selection_fg,
                status_fg: file.colors.status_fg,
                status_bg: file.colors.status_bg,
            },
            layout: UiLayout {
                list_width: or_default(file.layout.list_width, defaults.list_width),
                field_width: or_default(file.layout.field_width, defaults.field_width),
                button_width: or_default(file.layout.button_width, defaults.button_width),
            },
        }
    }
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl<'de> serde::Deserialize<'de> for RgbColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Helper {
            Array([u8; 3]),
            Map { r: u8, g: u8, b: u8 },
        }

        let helper = Helper::deserialize(deserializer)?;
        let (r, g, b) = match helper {
            Helper::Array(values) => (values[0], values[1], values[2]),
            Helper::Map { r, g, b } => (r, g, b),
        };
        Ok(RgbColor { r, g, b })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.toml");
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn defaults_when_file_only_sets_data_dir() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        let path = write_config(&dir, &format!("data_dir = {:?}\n", data));

        let config = load(Some(&path), None).unwrap();

        assert_eq!(config.contacts_path, data.join("contact.txt"));
        assert_eq!(config.selection_path, data.join("current.txt"));
        assert_eq!(config.log_dir(), data.join("logs"));
        assert!(config.persist_selection);
        assert_eq!(config.tick, Duration::from_millis(DEFAULT_TICK_MS));
        assert_eq!(config.keys.edit.save, vec!["Enter".to_string()]);
        assert_eq!(config.ui.colors.accent, RgbColor::new(0, 255, 255));
        assert!(config.warnings.is_empty());
    }

    #[test]
    fn data_dir_override_wins() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "data_dir = \"/nowhere\"\ncontacts_file = \"book.csv\"\n");
        let override_dir = dir.path().join("elsewhere");

        let config = load(Some(&path), Some(&override_dir)).unwrap();

        assert_eq!(config.data_dir, override_dir);
        assert_eq!(config.contacts_path, override_dir.join("book.csv"));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = load(Some(&dir.path().join("absent.toml")), Some(dir.path())).unwrap_err();
        assert!(err.to_string().contains("configuration file not found"));
    }

    #[test]
    fn key_bindings_accept_string_or_list() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[keys.view]
edit = "E"
delete = ["x", "Delete"]
"#,
        );

        let config = load(Some(&path), Some(dir.path())).unwrap();

        assert_eq!(config.keys.view.edit, vec!["E".to_string()]);
        assert_eq!(
            config.keys.view.delete,
            vec!["x".to_string(), "Delete".to_string()]
        );
        assert_eq!(config.keys.view.back, ViewKeys::default().back);
    }

    #[test]
    fn colliding_bindings_are_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[keys.confirm]
confirm = ["y", "ENTER"]
cancel = ["enter"]
"#,
        );

        let err = load(Some(&path), Some(dir.path())).unwrap_err();
        assert!(err.to_string().contains("key binding collision in [keys.confirm]"));
    }

    #[test]
    fn same_letter_different_case_does_not_collide() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[keys.view]
edit = "e"
delete = "E"
"#,
        );
        assert!(load(Some(&path), Some(dir.path())).is_ok());
    }

    #[test]
    fn unknown_keys_become_warnings() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
theme = "dark"

[keys.list]
launch = "l"

[ui.colors]
sparkle = [1, 2, 3]
"#,
        );

        let config = load(Some(&path), Some(dir.path())).unwrap();

        assert_eq!(
            config.warnings,
            vec![
                "unknown configuration key `theme`".to_string(),
                "unknown keys.list.* entry `launch`".to_string(),
                "unknown ui.colors.* entry `sparkle`".to_string(),
            ]
        );
    }

    #[test]
    fn colors_accept_arrays_and_tables() {
        let dir = TempDir::new().unwrap();
        let path = write_config(
            &dir,
            r#"
[ui.colors]
accent = [1, 2, 3]
danger = { r = 200, g = 10, b = 20 }

[ui.layout]
list_width = 0
field_width = 60
"#,
        );

        let config = load(Some(&path), Some(dir.path())).unwrap();

        assert_eq!(config.ui.colors.accent, RgbColor::new(1, 2, 3));
        assert_eq!(config.ui.colors.danger, RgbColor::new(200, 10, 20));
        assert_eq!(config.ui.layout.list_width, 40);
        assert_eq!(config.ui.layout.field_width, 60);
    }

    #[test]
    fn selection_persistence_and_tick_are_configurable() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "tick_ms = 50\n[selection]\npersist = false\n");

        let config = load(Some(&path), Some(dir.path())).unwrap();

        assert!(!config.persist_selection);
        assert_eq!(config.tick, Duration::from_millis(50));
    }

    #[test]
    fn contacts_and_selection_must_differ() {
        let dir = TempDir::new().unwrap();
        let path = write_config(&dir, "contacts_file = \"same.txt\"\nselection_file = \"same.txt\"\n");

        assert!(load(Some(&path), Some(dir.path())).is_err());
    }
}
