//! Annotation color palette
//!
//! Profiles and their shapes draw from a fixed ten-entry palette. Colors
//! serialize as lowercase `#rrggbb` hex strings, the form the wire records use.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the ten palette colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum RoiColor {
    Red,
    Orange,
    Amber,
    Green,
    Teal,
    Cyan,
    Blue,
    Indigo,
    Purple,
    Pink,
}

impl RoiColor {
    /// Palette order, which is also the auto-assignment order for profiles.
    pub const ALL: [RoiColor; 10] = [
        RoiColor::Red,
        RoiColor::Orange,
        RoiColor::Amber,
        RoiColor::Green,
        RoiColor::Teal,
        RoiColor::Cyan,
        RoiColor::Blue,
        RoiColor::Indigo,
        RoiColor::Purple,
        RoiColor::Pink,
    ];

    /// RGB components.
    pub fn rgb(&self) -> (u8, u8, u8) {
        match self {
            RoiColor::Red => (0xef, 0x44, 0x44),
            RoiColor::Orange => (0xf9, 0x73, 0x16),
            RoiColor::Amber => (0xf5, 0x9e, 0x0b),
            RoiColor::Green => (0x22, 0xc5, 0x5e),
            RoiColor::Teal => (0x14, 0xb8, 0xa6),
            RoiColor::Cyan => (0x06, 0xb6, 0xd4),
            RoiColor::Blue => (0x3b, 0x82, 0xf6),
            RoiColor::Indigo => (0x63, 0x66, 0xf1),
            RoiColor::Purple => (0xa8, 0x55, 0xf7),
            RoiColor::Pink => (0xec, 0x48, 0x99),
        }
    }

    /// Lowercase `#rrggbb` form.
    pub fn hex(&self) -> String {
        let (r, g, b) = self.rgb();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RoiColor::Red => "red",
            RoiColor::Orange => "orange",
            RoiColor::Amber => "amber",
            RoiColor::Green => "green",
            RoiColor::Teal => "teal",
            RoiColor::Cyan => "cyan",
            RoiColor::Blue => "blue",
            RoiColor::Indigo => "indigo",
            RoiColor::Purple => "purple",
            RoiColor::Pink => "pink",
        }
    }

    /// Returns the first palette color not present in `used`.
    pub fn first_unused<I>(used: I) -> Option<RoiColor>
    where
        I: IntoIterator<Item = RoiColor>,
    {
        let used: Vec<RoiColor> = used.into_iter().collect();
        Self::ALL.iter().copied().find(|c| !used.contains(c))
    }

    /// Picks the color for a new profile given its siblings' colors.
    ///
    /// Uses the first unused color; once every color is taken, cycles through
    /// the palette by sibling count so repeated collisions spread evenly.
    pub fn assign<I>(sibling_colors: I) -> RoiColor
    where
        I: IntoIterator<Item = RoiColor>,
    {
        let used: Vec<RoiColor> = sibling_colors.into_iter().collect();
        let count = used.len();
        Self::first_unused(used).unwrap_or(Self::ALL[count % Self::ALL.len()])
    }
}

impl Default for RoiColor {
    fn default() -> Self {
        RoiColor::Red
    }
}

impl fmt::Display for RoiColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.hex())
    }
}

impl FromStr for RoiColor {
    type Err = String;

    /// Accepts a palette hex value (case-insensitive) or a color name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.hex() == needle || c.name() == needle)
            .ok_or_else(|| format!("'{}' is not a palette color", s))
    }
}

impl TryFrom<String> for RoiColor {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RoiColor> for String {
    fn from(color: RoiColor) -> Self {
        color.hex()
    }
}
