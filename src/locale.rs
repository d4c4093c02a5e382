use std::collections::HashMap;

use bevy::prelude::*;

use crate::inventory::error::{read_json, DataError};

/// Key -> string table for user-facing labels.
#[derive(Resource, Debug, Default, Clone)]
pub struct Locale {
    strings: HashMap<String, String>,
}

impl Locale {
    pub fn from_map(strings: HashMap<String, String>) -> Self {
        Self { strings }
    }

    /// Localized string, or the built-in English text when the key is missing or empty.
    pub fn get<'a>(&'a self, key: &'a str) -> &'a str {
        match self.strings.get(key) {
            Some(s) if !s.is_empty() => s.as_str(),
            _ => english(key),
        }
    }

    pub fn merge(&mut self, strings: HashMap<String, String>) {
        self.strings.extend(strings);
    }
}

/// English defaults. Unknown keys fall back to the key itself.
pub fn english(key: &str) -> &str {
    match key {
        "ui_durability" => "Durability",
        "ui_ammo" => "Ammo",
        "ammo_type" => "Ammo Type",
        "ui_serial" => "Serial Number",
        "ui_components" => "Components",
        "ui_tint" => "Tint",
        "ui_unknown_item" => "Unknown item",
        "ui_required_materials" => "Required Materials",
        "ui_usefulcontrols" => "Useful Controls",
        "ui_rmb" => "Open item context menu",
        "ui_alt_lmb" => "Fast use an item",
        "ui_ctrl_lmb" => "Fast move items",
        "ui_shift_drag" => "Split item quantity",
        "ui_ctrl_shift_lmb" => "Fast move half stack",
        "ui_ctrl_c" => "Copy weapon serial",
        "ui_hotbar" => "Hotbar",
        other => other,
    }
}

pub fn load_locale(path: &str) -> Result<Locale, DataError> {
    Ok(Locale::from_map(read_json(path)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_use_english() {
        let locale = Locale::default();
        assert_eq!(locale.get("ui_durability"), "Durability");
        assert_eq!(locale.get("ui_something_new"), "ui_something_new");
    }

    #[test]
    fn table_overrides_english() {
        let mut locale = Locale::default();
        locale.merge(HashMap::from([
            ("ui_ammo".to_string(), "Munition".to_string()),
            ("ui_tint".to_string(), String::new()),
        ]));
        assert_eq!(locale.get("ui_ammo"), "Munition");
        assert_eq!(locale.get("ui_tint"), "Tint");
    }
}
