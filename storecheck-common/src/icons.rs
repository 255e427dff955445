//! Category icon identifiers
//!
//! Categories carry a symbolic icon name chosen by the administrator. The
//! set is closed: every stored name maps through `Icon::resolve` and unknown
//! names fall back to the default instead of erroring, so a stale name in
//! the database can never break rendering.

use serde::{Deserialize, Serialize, Serializer};

/// Closed set of category icons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(from = "String")]
pub enum Icon {
    /// Default, used for any unknown name
    Clipboard,
    Utensils,
    Refrigerator,
    Thermometer,
    Spray,
    Trash,
    Boxes,
    Restroom,
    Storefront,
}

/// (name, icon) lookup table, one row per variant
const ICON_NAMES: &[(&str, Icon)] = &[
    ("clipboard", Icon::Clipboard),
    ("utensils", Icon::Utensils),
    ("refrigerator", Icon::Refrigerator),
    ("thermometer", Icon::Thermometer),
    ("spray", Icon::Spray),
    ("trash", Icon::Trash),
    ("boxes", Icon::Boxes),
    ("restroom", Icon::Restroom),
    ("storefront", Icon::Storefront),
];

impl Icon {
    /// Look up an icon by symbolic name; unknown names resolve to the default
    pub fn resolve(name: &str) -> Icon {
        ICON_NAMES
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, icon)| *icon)
            .unwrap_or(Icon::Clipboard)
    }

    /// Symbolic name stored in the database and sent over the API
    pub fn name(&self) -> &'static str {
        ICON_NAMES
            .iter()
            .find(|(_, icon)| icon == self)
            .map(|(n, _)| *n)
            .expect("every Icon variant has a table row")
    }
}

impl Default for Icon {
    fn default() -> Self {
        Icon::Clipboard
    }
}

impl From<String> for Icon {
    fn from(name: String) -> Self {
        Icon::resolve(&name)
    }
}

impl Serialize for Icon {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}
