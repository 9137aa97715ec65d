use serde::{Deserialize, Serialize};

/// A named capture width/height pair.
///
/// The width doubles as the filename discriminator for screenshots
/// (`<width>.png`); one report document is produced per viewport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    /// Human-readable label, e.g. `desktop`. The configuration file
    /// calls this key `viewport`.
    #[serde(rename = "viewport")]
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    /// Label used on the cover page, e.g. `desktop (1600x900)`.
    pub fn display_label(&self) -> String {
        format!("{} ({}x{})", self.name, self.width, self.height)
    }
}
