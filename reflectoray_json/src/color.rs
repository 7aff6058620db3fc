use super::*;

use core::{fmt, str::FromStr};

/// An 8-bit RGB color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Color(pub [u8; 3]);

// A subset of the X11 color names understood by Tk.
const NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("black", [0x00, 0x00, 0x00]),
    ("white", [0xff, 0xff, 0xff]),
    ("red", [0xff, 0x00, 0x00]),
    ("green", [0x00, 0xff, 0x00]),
    ("blue", [0x00, 0x00, 0xff]),
    ("yellow", [0xff, 0xff, 0x00]),
    ("cyan", [0x00, 0xff, 0xff]),
    ("magenta", [0xff, 0x00, 0xff]),
    ("orange", [0xff, 0xa5, 0x00]),
    ("purple", [0xa0, 0x20, 0xf0]),
    ("pink", [0xff, 0xc0, 0xcb]),
    ("brown", [0xa5, 0x2a, 0x2a]),
    ("gray", [0xbe, 0xbe, 0xbe]),
    ("grey", [0xbe, 0xbe, 0xbe]),
    ("violet", [0xee, 0x82, 0xee]),
    ("gold", [0xff, 0xd7, 0x00]),
    ("navy", [0x00, 0x00, 0x80]),
    ("maroon", [0xb0, 0x30, 0x60]),
    ("turquoise", [0x40, 0xe0, 0xd0]),
    ("darkgreen", [0x00, 0x64, 0x00]),
    ("darkblue", [0x00, 0x00, 0x8b]),
    ("darkred", [0x8b, 0x00, 0x00]),
    ("limegreen", [0x32, 0xcd, 0x32]),
    ("skyblue", [0x87, 0xce, 0xeb]),
];

impl Color {
    pub const BLACK: Self = Self([0, 0, 0]);

    /// Looks up a color name, ignoring case and whitespace (`"Dark Green"` is `"darkgreen"`).
    pub fn from_name(name: &str) -> Option<Self> {
        let name: String = name
            .chars()
            .filter(|c| !c.is_whitespace())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        NAMED_COLORS
            .iter()
            .find_map(|(n, rgb)| (*n == name).then_some(Self(*rgb)))
    }

    /// Parses `#rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').filter(|d| d.len() == 6)?;

        let mut rgb = [0; 3];
        for (i, channel) in rgb.iter_mut().enumerate() {
            *channel = u8::from_str_radix(digits.get(2 * i..2 * i + 2)?, 16).ok()?;
        }
        Some(Self(rgb))
    }

    /// All the color names recognized by [`Self::from_name`].
    pub fn names() -> impl Iterator<Item = &'static str> {
        NAMED_COLORS.iter().map(|(name, _)| *name)
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
            .or_else(|| Self::from_name(s))
            .ok_or_else(|| format!("unknown color: {s:?}"))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "#{r:02x}{g:02x}{b:02x}")
    }
}

impl JsonSer for Color {
    fn to_json(&self) -> serde_json::Value {
        serde_json::Value::String(self.to_string())
    }
}

impl JsonDes for Color {
    /// A color name (`"red"`, `"dark green"`...) or a `"#rrggbb"` string.
    fn from_json(json: &serde_json::Value) -> Result<Self, Box<dyn Error>> {
        Ok(json.as_str().ok_or("color must be a string")?.parse()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_and_hex() {
        assert_eq!("red".parse(), Ok(Color([255, 0, 0])));
        assert_eq!("Dark Green".parse(), Ok(Color([0, 100, 0])));
        assert_eq!("#1a2B3c".parse(), Ok(Color([0x1a, 0x2b, 0x3c])));
        assert!("#12345".parse::<Color>().is_err());
        assert!("#zz0000".parse::<Color>().is_err());
        assert!("ultraviolet".parse::<Color>().is_err());
    }

    #[test]
    fn display_is_hex() {
        assert_eq!(Color([0xff, 0x08, 0x00]).to_string(), "#ff0800");
    }

    #[test]
    fn every_name_parses() {
        for name in Color::names() {
            assert!(Color::from_name(name).is_some());
        }
    }
}
