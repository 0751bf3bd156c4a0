//! The eight terminal base colors (curses numbering).

/// A terminal base color. Discriminants match `COLOR_*` in curses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermColor {
    Black = 0,
    Red = 1,
    Green = 2,
    Yellow = 3,
    Blue = 4,
    Magenta = 5,
    Cyan = 6,
    White = 7,
}

impl TermColor {
    pub const ALL: [TermColor; 8] = [
        TermColor::Black,
        TermColor::Red,
        TermColor::Green,
        TermColor::Yellow,
        TermColor::Blue,
        TermColor::Magenta,
        TermColor::Cyan,
        TermColor::White,
    ];

    /// Parse a color name, case-insensitively, ignoring surrounding spaces.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "black" => Some(Self::Black),
            "red" => Some(Self::Red),
            "green" => Some(Self::Green),
            "yellow" => Some(Self::Yellow),
            "blue" => Some(Self::Blue),
            "magenta" => Some(Self::Magenta),
            "cyan" => Some(Self::Cyan),
            "white" => Some(Self::White),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Black => "black",
            Self::Red => "red",
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Blue => "blue",
            Self::Magenta => "magenta",
            Self::Cyan => "cyan",
            Self::White => "white",
        }
    }

    /// Curses color index.
    pub fn index(self) -> i16 {
        self as i16
    }
}

impl std::fmt::Display for TermColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_round_trip() {
        for c in TermColor::ALL {
            assert_eq!(TermColor::from_name(c.name()), Some(c));
        }
    }

    #[test]
    fn from_name_is_lenient() {
        assert_eq!(TermColor::from_name("  Magenta "), Some(TermColor::Magenta));
        assert_eq!(TermColor::from_name("CYAN"), Some(TermColor::Cyan));
    }

    #[test]
    fn unknown_name() {
        assert_eq!(TermColor::from_name("orange"), None);
        assert_eq!(TermColor::from_name(""), None);
    }

    #[test]
    fn curses_indices() {
        assert_eq!(TermColor::Black.index(), 0);
        assert_eq!(TermColor::Yellow.index(), 3);
        assert_eq!(TermColor::White.index(), 7);
    }
}
