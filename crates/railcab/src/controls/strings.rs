use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

/// Short labels drawn next to the cab handles on the HUD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandleLabels {
    pub forward: String,
    pub neutral: String,
    pub backward: String,
    pub power: String,
    pub power_null: String,
    pub brake: String,
    pub brake_null: String,
    pub release: String,
    pub lap: String,
    pub service: String,
    pub emergency: String,
    pub hold_brake: String,
    pub doors_left: String,
    pub doors_right: String,
}

impl Default for HandleLabels {
    fn default() -> Self {
        Self {
            forward: "F".to_string(),
            neutral: "N".to_string(),
            backward: "B".to_string(),
            power: "P".to_string(),
            power_null: "N".to_string(),
            brake: "B".to_string(),
            brake_null: "N".to_string(),
            release: "RL".to_string(),
            lap: "LP".to_string(),
            service: "SV".to_string(),
            emergency: "EM".to_string(),
            hold_brake: "HB".to_string(),
            doors_left: "L".to_string(),
            doors_right: "R".to_string(),
        }
    }
}

/// Localized interface text loaded from a language file.
///
/// The file is INI-like: `[section]` headers, `key = value` lines and `;`
/// comments. `[commands]` and `[keys]` override descriptions, `[handles]` and
/// `[doors]` fill [`HandleLabels`], everything else is stored as
/// `section_key`.
#[derive(Debug, Clone, Default)]
pub struct InterfaceStrings {
    strings: HashMap<String, String>,
    command_descriptions: HashMap<String, String>,
    key_descriptions: HashMap<String, String>,
    handles: HandleLabels,
}

impl InterfaceStrings {
    pub fn load(path: &Path) -> io::Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(Self::parse(&raw))
    }

    pub fn parse(raw: &str) -> Self {
        let mut parsed = Self::default();
        let mut section = String::new();
        for line in raw.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with(';') {
                continue;
            }
            if line.starts_with('[') && line.ends_with(']') {
                section = line[1..line.len() - 1].trim().to_ascii_lowercase();
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim_end().to_ascii_lowercase();
            let value = unescape(value.trim_start());
            parsed.insert(&section, key, value);
        }
        parsed
    }

    fn insert(&mut self, section: &str, key: String, value: String) {
        let handles = &mut self.handles;
        match (section, key.as_str()) {
            ("handles", "forward") => handles.forward = value,
            ("handles", "neutral") => handles.neutral = value,
            ("handles", "backward") => handles.backward = value,
            ("handles", "power") => handles.power = value,
            ("handles", "powernull") => handles.power_null = value,
            ("handles", "brake") => handles.brake = value,
            ("handles", "brakenull") => handles.brake_null = value,
            ("handles", "release") => handles.release = value,
            ("handles", "lap") => handles.lap = value,
            ("handles", "service") => handles.service = value,
            ("handles", "emergency") => handles.emergency = value,
            ("handles", "holdbrake") => handles.hold_brake = value,
            ("doors", "left") => handles.doors_left = value,
            ("doors", "right") => handles.doors_right = value,
            ("handles", _) | ("doors", _) => {}
            ("commands", _) => {
                self.command_descriptions.insert(key, value);
            }
            ("keys", _) => {
                self.key_descriptions.insert(key, value);
            }
            _ => {
                self.strings.insert(format!("{section}_{key}"), value);
            }
        }
    }

    /// Localized text for `key`, or `key` itself when the language file has
    /// no entry for it.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        self.strings.get(key).map(String::as_str).unwrap_or(key)
    }

    pub fn command_description(&self, command_name: &str) -> Option<&str> {
        self.command_descriptions
            .get(&command_name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn key_description(&self, key_name: &str) -> Option<&str> {
        self.key_descriptions
            .get(&key_name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn handles(&self) -> &HandleLabels {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
; sample language file
[notification]
mousegrab_on = Mouse grab on
pause = PAUSE

[handles]
power = Pw
emergency = EB

[commands]
MISC_PAUSE = Pause the game

[keys]
a = Letter A
";

    #[test]
    fn sections_become_prefixed_keys() {
        let strings = InterfaceStrings::parse(SAMPLE);
        assert_eq!(strings.get("notification_mousegrab_on"), "Mouse grab on");
        assert_eq!(strings.get("notification_pause"), "PAUSE");
        assert_eq!(strings.len(), 2);
    }

    #[test]
    fn missing_key_falls_back_to_key_itself() {
        let strings = InterfaceStrings::default();
        assert_eq!(strings.get("menu_resume"), "menu_resume");
    }

    #[test]
    fn handles_and_descriptions_are_routed() {
        let strings = InterfaceStrings::parse(SAMPLE);
        assert_eq!(strings.handles().power, "Pw");
        assert_eq!(strings.handles().emergency, "EB");
        assert_eq!(strings.handles().lap, "LP");
        assert_eq!(strings.command_description("misc_pause"), Some("Pause the game"));
        assert_eq!(strings.key_description("A"), Some("Letter A"));
    }

    #[test]
    fn values_are_unescaped() {
        let strings = InterfaceStrings::parse("[message]\ntwo = first\\nsecond\n");
        assert_eq!(strings.get("message_two"), "first\nsecond");
    }

    #[test]
    fn load_reads_from_disk() {
        let temp = tempfile::TempDir::new().expect("temp");
        let path = temp.path().join("en-US.cfg");
        fs::write(&path, SAMPLE).expect("write");

        let strings = InterfaceStrings::load(&path).expect("load");
        assert_eq!(strings.get("notification_pause"), "PAUSE");
    }
}
