use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An item stack occupying a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotItem {
    pub name: String,
    #[serde(default = "one")]
    pub count: u32,
    /// Weight of a single unit, in grams.
    #[serde(default)]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub durability: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ItemMetadata>,
    /// Crafting recipes only: ingredient name -> required quantity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingredients: Option<BTreeMap<String, f64>>,
    /// Crafting recipes only: craft time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,
}

fn one() -> u32 {
    1
}

impl SlotItem {
    pub fn new(name: impl Into<String>, count: u32, weight: f64) -> Self {
        Self {
            name: name.into(),
            count,
            weight,
            durability: None,
            metadata: None,
            ingredients: None,
            duration: None,
        }
    }

    /// Weight of the whole stack.
    pub fn stack_weight(&self) -> f64 {
        self.weight * self.count as f64
    }

    pub fn meta(&self) -> Option<&ItemMetadata> {
        self.metadata.as_ref()
    }
}

/// Open key/value bag attached to an item instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemMetadata(pub Map<String, Value>);

impl ItemMetadata {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String field, only when present (see [`is_present`]).
    pub fn str_field(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| is_present(v)).and_then(Value::as_str)
    }

    pub fn label(&self) -> Option<&str> {
        self.str_field("label")
    }

    pub fn description(&self) -> Option<&str> {
        self.str_field("description")
    }

    pub fn rarity(&self) -> Option<&str> {
        self.str_field("rarity")
    }

    pub fn item_type(&self) -> Option<&str> {
        self.str_field("type")
    }

    /// Ammo count is shown whenever the key exists, including zero.
    pub fn ammo(&self) -> Option<String> {
        match self.get("ammo") {
            None | Some(Value::Null) => None,
            Some(v) => Some(value_text(v)),
        }
    }

    pub fn serial(&self) -> Option<String> {
        self.display_value("serial")
    }

    pub fn weapon_tint(&self) -> Option<String> {
        self.display_value("weapontint")
    }

    /// Attached component ids, `None` unless the first entry is present.
    pub fn components(&self) -> Option<Vec<&str>> {
        let list = self.get("components")?.as_array()?;
        if !list.first().is_some_and(is_present) {
            return None;
        }
        Some(list.iter().filter_map(Value::as_str).collect())
    }

    /// Text for an arbitrary key, when the value is present.
    pub fn display_value(&self, key: &str) -> Option<String> {
        self.get(key).filter(|v| is_present(v)).map(value_text)
    }
}

/// Truthiness of a metadata value: null, false, "", and 0 count as absent.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) => format!("{}", f),
            None => n.to_string(),
        },
        other => other.to_string(),
    }
}
