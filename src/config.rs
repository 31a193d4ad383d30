//! User configuration: keybindings, reveal defaults, and persistence.
//!
//! Settings are stored as a simple key-value text file at
//! `$XDG_CONFIG_HOME/reveal/config.toml` (default `~/.config/reveal/config.toml`).

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::animation::{AnimationConfig, RootMargin};

// ───────────────────────────────────────── actions ───────────

/// All configurable user actions on the page view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Top,
    Bottom,
    Replay,
    Quit,
}

impl Action {
    /// Ordered list of all actions (used when saving).
    pub const ALL: &[Action] = &[
        Action::ScrollUp,
        Action::ScrollDown,
        Action::PageUp,
        Action::PageDown,
        Action::Top,
        Action::Bottom,
        Action::Replay,
        Action::Quit,
    ];

    /// Key used in the config file.
    fn config_key(self) -> &'static str {
        match self {
            Action::ScrollUp => "scroll_up",
            Action::ScrollDown => "scroll_down",
            Action::PageUp => "page_up",
            Action::PageDown => "page_down",
            Action::Top => "top",
            Action::Bottom => "bottom",
            Action::Replay => "replay",
            Action::Quit => "quit",
        }
    }

    fn from_config_key(s: &str) -> Option<Self> {
        Action::ALL.iter().copied().find(|a| a.config_key() == s)
    }
}

// ───────────────────────────────────────── key bind ──────────

/// A single key binding: key code + modifier combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyBind {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

/// Only these modifiers take part in matching.
const MODIFIER_MASK: KeyModifiers = KeyModifiers::CONTROL
    .union(KeyModifiers::ALT)
    .union(KeyModifiers::SHIFT);

impl KeyBind {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn matches(&self, event: KeyEvent) -> bool {
        self.code == event.code && (self.modifiers & MODIFIER_MASK) == (event.modifiers & MODIFIER_MASK)
    }

    /// Short label for the status bar (`"↓"`, `"Ctrl+d"`).
    pub fn display(&self) -> String {
        let key = match self.code {
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::PageUp => "PgUp".to_string(),
            KeyCode::PageDown => "PgDn".to_string(),
            _ => key_name(self.code),
        };
        format!("{}{key}", modifier_prefix(self.modifiers))
    }

    /// Config-file form (`"Ctrl+d"`, `"PageDown"`, `"q"`).
    fn to_config_string(&self) -> String {
        format!("{}{}", modifier_prefix(self.modifiers), key_name(self.code))
    }

    /// Parse a key string like `"Ctrl+d"`, `"Down"`, `"q"`.
    fn parse(s: &str) -> Option<Self> {
        let (mods, key) = match s.rsplit_once('+') {
            // A bare "+" is the plus key itself.
            Some((mods, "")) => (mods.strip_suffix('+').unwrap_or(mods), "+"),
            Some((mods, key)) => (mods, key),
            None => ("", s),
        };

        let mut modifiers = KeyModifiers::NONE;
        for part in mods.split('+').filter(|p| !p.is_empty()) {
            modifiers |= match part.to_lowercase().as_str() {
                "ctrl" => KeyModifiers::CONTROL,
                "alt" => KeyModifiers::ALT,
                "shift" => KeyModifiers::SHIFT,
                _ => return None,
            };
        }

        let code = match key.to_lowercase().as_str() {
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "enter" | "return" => KeyCode::Enter,
            "esc" | "escape" => KeyCode::Esc,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            "space" => KeyCode::Char(' '),
            _ if key.chars().count() == 1 => KeyCode::Char(key.chars().next()?),
            _ => return None,
        };
        Some(Self { code, modifiers })
    }
}

fn modifier_prefix(modifiers: KeyModifiers) -> String {
    let mut s = String::new();
    if modifiers.contains(KeyModifiers::CONTROL) {
        s.push_str("Ctrl+");
    }
    if modifiers.contains(KeyModifiers::ALT) {
        s.push_str("Alt+");
    }
    if modifiers.contains(KeyModifiers::SHIFT) {
        s.push_str("Shift+");
    }
    s
}

fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".into(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Up => "Up".into(),
        KeyCode::Down => "Down".into(),
        KeyCode::Left => "Left".into(),
        KeyCode::Right => "Right".into(),
        KeyCode::Enter => "Enter".into(),
        KeyCode::Esc => "Esc".into(),
        KeyCode::Home => "Home".into(),
        KeyCode::End => "End".into(),
        KeyCode::PageUp => "PageUp".into(),
        KeyCode::PageDown => "PageDown".into(),
        other => format!("{other:?}"),
    }
}

// ───────────────────────────────────────── config ────────────

/// Application configuration: keybindings plus reveal and rendering knobs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bindings: HashMap<Action, Vec<KeyBind>>,
    /// Defaults applied to every observed element on the page.
    pub reveal: AnimationConfig,
    /// Abstract pixels per terminal row / column.
    pub px_per_row: f64,
    pub px_per_col: f64,
    /// Redraw interval while the UI is idle.
    pub tick_ms: u64,
    /// Give up loading a page file after this long.
    pub page_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bindings: Self::default_bindings(),
            reveal: AnimationConfig::default(),
            px_per_row: 16.0,
            px_per_col: 8.0,
            tick_ms: 33,
            page_timeout_ms: 2000,
        }
    }
}

impl AppConfig {
    pub fn default_bindings() -> HashMap<Action, Vec<KeyBind>> {
        use KeyCode::*;
        let ctrl = KeyModifiers::CONTROL;
        let mut m = HashMap::new();

        m.insert(Action::ScrollUp, vec![KeyBind::plain(Up), KeyBind::plain(Char('k'))]);
        m.insert(Action::ScrollDown, vec![KeyBind::plain(Down), KeyBind::plain(Char('j'))]);
        m.insert(Action::PageUp, vec![KeyBind::plain(PageUp), KeyBind::new(Char('u'), ctrl)]);
        m.insert(
            Action::PageDown,
            vec![
                KeyBind::plain(PageDown),
                KeyBind::new(Char('d'), ctrl),
                KeyBind::plain(Char(' ')),
            ],
        );
        m.insert(Action::Top, vec![KeyBind::plain(Home), KeyBind::plain(Char('g'))]);
        m.insert(
            Action::Bottom,
            vec![KeyBind::plain(End), KeyBind::new(Char('G'), KeyModifiers::SHIFT)],
        );
        m.insert(Action::Replay, vec![KeyBind::plain(Char('r'))]);
        m.insert(Action::Quit, vec![KeyBind::plain(Char('q')), KeyBind::plain(Esc)]);

        m
    }

    /// Find the action bound to a key event.  The binding with the most
    /// modifiers wins.
    pub fn match_key(&self, event: KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .flat_map(|(&action, binds)| binds.iter().map(move |b| (action, b)))
            .filter(|(_, b)| b.matches(event))
            .max_by_key(|(_, b)| b.modifiers.bits().count_ones())
            .map(|(action, _)| action)
    }

    fn first_binding(&self, action: Action) -> String {
        match self.bindings.get(&action) {
            Some(binds) if !binds.is_empty() => binds[0].display(),
            _ => "?".into(),
        }
    }

    /// Build the status-bar hint string from current bindings.
    pub fn status_bar_hint(&self) -> String {
        format!(
            "{}/{}: scroll | {}: page | {}: replay | {}: quit",
            self.first_binding(Action::ScrollUp),
            self.first_binding(Action::ScrollDown),
            self.first_binding(Action::PageDown),
            self.first_binding(Action::Replay),
            self.first_binding(Action::Quit),
        )
    }

    // ── persistence ─────────────────────────────────────────────

    /// Load config from `path` (or the default location), falling back to
    /// defaults for anything missing or malformed.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        match std::fs::read_to_string(&path) {
            Ok(contents) => {
                tracing::debug!(path = %path.display(), "loaded config");
                Self::parse(&contents)
            }
            Err(_) => Self::default(),
        }
    }

    /// Persist current config to `path` (or the default location).
    pub fn save(&self, path: Option<&Path>) -> anyhow::Result<()> {
        let path = path.map(Path::to_path_buf).unwrap_or_else(config_path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, self.serialise())?;
        Ok(())
    }

    fn parse(s: &str) -> Self {
        let mut cfg = Self::default();

        for line in s.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('[') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim().trim_matches('"');

            match key {
                "threshold" => {
                    if let Ok(v) = value.parse::<f64>() {
                        cfg.reveal = cfg.reveal.with_threshold(v.clamp(0.0, 1.0));
                    }
                }
                "root_margin" => match value.parse::<RootMargin>() {
                    Ok(m) => cfg.reveal = cfg.reveal.with_root_margin(m),
                    Err(err) => tracing::warn!(%err, "config: ignoring root_margin"),
                },
                "duration" => {
                    if let Ok(v) = value.parse::<f64>() {
                        cfg.reveal = cfg.reveal.with_duration(v.clamp(0.05, 10.0));
                    }
                }
                "stagger" => {
                    if let Ok(v) = value.parse::<f64>() {
                        cfg.reveal = cfg.reveal.with_stagger(v.clamp(0.0, 5.0));
                    }
                }
                "px_per_row" => {
                    if let Ok(v) = value.parse::<f64>() {
                        cfg.px_per_row = v.clamp(1.0, 64.0);
                    }
                }
                "px_per_col" => {
                    if let Ok(v) = value.parse::<f64>() {
                        cfg.px_per_col = v.clamp(1.0, 64.0);
                    }
                }
                "tick_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        cfg.tick_ms = v.clamp(10, 1000);
                    }
                }
                "page_timeout_ms" => {
                    if let Ok(v) = value.parse::<u64>() {
                        cfg.page_timeout_ms = v.clamp(100, 60_000);
                    }
                }
                _ => {
                    let Some(action) = Action::from_config_key(key) else {
                        continue;
                    };
                    let parsed: Vec<KeyBind> = value
                        .split(',')
                        .filter_map(|part| KeyBind::parse(part.trim().trim_matches('"')))
                        .collect();
                    if !parsed.is_empty() {
                        cfg.bindings.insert(action, parsed);
                    }
                }
            }
        }

        cfg
    }

    fn serialise(&self) -> String {
        let mut lines = vec![
            "# reveal configuration".to_string(),
            String::new(),
            "# Reveal defaults".to_string(),
            format!("threshold = {}", self.reveal.threshold),
            format!("root_margin = \"{}\"", self.reveal.root_margin),
            format!("duration = {}", self.reveal.duration),
            format!("stagger = {}", self.reveal.stagger),
            String::new(),
            "# Rendering".to_string(),
            format!("px_per_row = {}", self.px_per_row),
            format!("px_per_col = {}", self.px_per_col),
            format!("tick_ms = {}", self.tick_ms),
            format!("page_timeout_ms = {}", self.page_timeout_ms),
            String::new(),
            "# Key bindings".to_string(),
            "# Format: action = Key1, Key2, ...".to_string(),
            "# Modifiers: Ctrl+, Alt+, Shift+ (prefix)".to_string(),
            String::new(),
        ];

        for &action in Action::ALL {
            if let Some(binds) = self.bindings.get(&action) {
                let keys: Vec<String> = binds.iter().map(|b| b.to_config_string()).collect();
                lines.push(format!("{} = {}", action.config_key(), keys.join(", ")));
            }
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

/// Return the config file path (`$XDG_CONFIG_HOME/reveal/config.toml`).
fn config_path() -> PathBuf {
    let config_dir = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home).join(".config")
        });
    config_dir.join("reveal").join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn default_bindings_match() {
        let cfg = AppConfig::default();
        assert_eq!(
            cfg.match_key(key(KeyCode::Char('j'), KeyModifiers::NONE)),
            Some(Action::ScrollDown)
        );
        assert_eq!(
            cfg.match_key(key(KeyCode::Char('d'), KeyModifiers::CONTROL)),
            Some(Action::PageDown)
        );
        assert_eq!(cfg.match_key(key(KeyCode::Char('d'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn parse_overrides_reveal_defaults() {
        let cfg = AppConfig::parse(
            "threshold = 0.25\nroot_margin = \"0px 0px -80px 0px\"\nduration = 99\nstagger = 0.05\n",
        );
        assert_eq!(cfg.reveal.threshold, 0.25);
        assert_eq!(cfg.reveal.root_margin, RootMargin::px(0.0, 0.0, -80.0, 0.0));
        assert_eq!(cfg.reveal.duration, 10.0);
        assert_eq!(cfg.reveal.stagger, 0.05);
    }

    #[test]
    fn bad_values_keep_defaults() {
        let cfg = AppConfig::parse("root_margin = 12em\ntick_ms = soon\nnonsense\n");
        assert_eq!(cfg.reveal.root_margin, RootMargin::default());
        assert_eq!(cfg.tick_ms, AppConfig::default().tick_ms);
    }

    #[test]
    fn bindings_survive_serialise_and_parse() {
        let mut cfg = AppConfig::default();
        cfg.bindings.insert(
            Action::Replay,
            vec![KeyBind::new(KeyCode::Char('r'), KeyModifiers::CONTROL | KeyModifiers::ALT)],
        );
        cfg.reveal.root_margin = "10px 5%".parse().unwrap();
        let back = AppConfig::parse(&cfg.serialise());
        assert_eq!(back.bindings, cfg.bindings);
        assert_eq!(back.reveal.root_margin, cfg.reveal.root_margin);
    }

    #[test]
    fn save_then_load_from_explicit_path() {
        let dir = std::env::temp_dir().join(format!("reveal-config-{}", std::process::id()));
        let path = dir.join("config.toml");
        let mut cfg = AppConfig::default();
        cfg.tick_ms = 50;
        cfg.save(Some(&path)).unwrap();
        assert_eq!(AppConfig::load(Some(&path)).tick_ms, 50);
        let _ = std::fs::remove_dir_all(dir);
    }

    #[test]
    fn key_strings_parse() {
        assert_eq!(
            KeyBind::parse("Ctrl+d"),
            Some(KeyBind::new(KeyCode::Char('d'), KeyModifiers::CONTROL))
        );
        assert_eq!(KeyBind::parse("PageDown"), Some(KeyBind::plain(KeyCode::PageDown)));
        assert_eq!(KeyBind::parse("Space"), Some(KeyBind::plain(KeyCode::Char(' '))));
        assert_eq!(KeyBind::parse("+"), Some(KeyBind::plain(KeyCode::Char('+'))));
        assert_eq!(KeyBind::parse("Hyper+x"), None);
    }
}
