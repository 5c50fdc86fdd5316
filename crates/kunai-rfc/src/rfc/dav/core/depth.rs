//! Depth header values.

use std::fmt;

/// `WebDAV` Depth header value.
///
/// RFC 4918 only defines `0`, `1` and `infinity`, but some servers accept a
/// larger finite depth; [`Depth::Levels`] carries those.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Depth {
    /// Depth: 0 - The resource itself only.
    Zero,
    /// Depth: 1 - The resource and its immediate children.
    #[default]
    One,
    /// Depth: n (n >= 2).
    Levels(u32),
    /// Depth: infinity - The resource and all descendants.
    Infinity,
}

impl Depth {
    /// Parses from header value.
    #[must_use]
    pub fn from_header(value: &str) -> Option<Self> {
        let value = value.trim();
        if value.eq_ignore_ascii_case("infinity") {
            return Some(Self::Infinity);
        }
        value.parse::<u32>().ok().map(Self::levels)
    }

    /// Converts a signed depth where `-1` means infinity.
    #[must_use]
    pub fn from_i32(depth: i32) -> Option<Self> {
        match depth {
            -1 => Some(Self::Infinity),
            n => u32::try_from(n).ok().map(Self::levels),
        }
    }

    /// Builds a finite depth.
    #[must_use]
    pub const fn levels(levels: u32) -> Self {
        match levels {
            0 => Self::Zero,
            1 => Self::One,
            n => Self::Levels(n),
        }
    }

    /// Returns the header value string.
    #[must_use]
    pub fn header_value(self) -> String {
        match self {
            Self::Zero => "0".to_owned(),
            Self::One => "1".to_owned(),
            Self::Levels(n) => n.to_string(),
            Self::Infinity => "infinity".to_owned(),
        }
    }
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.header_value())
    }
}

impl std::str::FromStr for Depth {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_header(s).ok_or(())
    }
}
