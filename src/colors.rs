use crossterm::style::Color;

/// Palette index: 0 green (default), 1 fire, 2 ice, 3 pink, 4 gold,
/// 5 electric, 6 lava, 7 mono (semantic colours), 8 rainbow, 9 neon
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorState {
    pub scheme: u8,
}

pub const MONO_SCHEME: u8 = 7;
pub const MAX_SCHEME: u8 = 9;

impl ColorState {
    pub fn new(scheme: u8) -> Self {
        Self { scheme: scheme.min(MAX_SCHEME) }
    }

    pub fn is_mono(&self) -> bool {
        self.scheme == MONO_SCHEME
    }
}

/// Get color from scheme based on intensity (0-3)
pub fn scheme_color(scheme: u8, intensity: u8, bold: bool) -> (Color, bool) {
    let ramp = match scheme {
        1 => [Color::DarkRed, Color::Red, Color::DarkYellow, Color::Yellow],
        2 => [Color::DarkBlue, Color::Blue, Color::Cyan, Color::Cyan],
        3 => [Color::DarkMagenta, Color::Magenta, Color::Magenta, Color::AnsiValue(13)],
        4 => [Color::DarkYellow, Color::Yellow, Color::Yellow, Color::AnsiValue(11)],
        5 => [Color::DarkCyan, Color::Cyan, Color::Cyan, Color::AnsiValue(14)],
        6 => [Color::DarkRed, Color::Red, Color::Magenta, Color::AnsiValue(9)],
        7 => [Color::DarkGrey, Color::Grey, Color::White, Color::White],
        8 => [Color::Red, Color::Yellow, Color::Green, Color::Cyan],
        9 => [Color::DarkBlue, Color::Blue, Color::Magenta, Color::AnsiValue(13)],
        _ => [Color::DarkGreen, Color::Green, Color::Green, Color::AnsiValue(10)],
    };
    match intensity {
        0 | 1 => (ramp[intensity as usize], false),
        2 => (ramp[2], bold),
        _ => (ramp[3], true),
    }
}

/// Meter gradient by height on the meter (0 = floor, 100 = 0 dB).
/// Mono uses the classic green → yellow → red.
pub fn level_color(percent: f32, colors: &ColorState) -> Color {
    if colors.is_mono() {
        if percent >= 90.0 {
            Color::AnsiValue(9)
        } else if percent >= 70.0 {
            Color::AnsiValue(11)
        } else {
            Color::AnsiValue(10)
        }
    } else {
        let intensity = if percent >= 90.0 { 3 } else if percent >= 70.0 { 2 } else { 1 };
        scheme_color(colors.scheme, intensity, false).0
    }
}

pub fn peak_color(colors: &ColorState) -> Color {
    if colors.is_mono() {
        Color::White
    } else {
        scheme_color(colors.scheme, 3, true).0
    }
}

pub fn text_color(colors: &ColorState) -> Color {
    if colors.is_mono() {
        Color::White
    } else {
        scheme_color(colors.scheme, 2, false).0
    }
}

pub fn muted_color(colors: &ColorState) -> Color {
    if colors.is_mono() {
        Color::DarkGrey
    } else {
        scheme_color(colors.scheme, 0, false).0
    }
}

pub fn header_color(colors: &ColorState) -> Color {
    if colors.is_mono() {
        Color::Cyan
    } else {
        scheme_color(colors.scheme, 3, true).0
    }
}

/// Map semantic status color to scheme color
pub fn status_color(colors: &ColorState, status: StatusColor) -> Color {
    if colors.is_mono() {
        match status {
            StatusColor::Good => Color::Green,
            StatusColor::Warning => Color::Yellow,
            StatusColor::Critical => Color::Red,
            StatusColor::Muted => Color::DarkGrey,
        }
    } else {
        let intensity = match status {
            StatusColor::Muted => 0,
            StatusColor::Good | StatusColor::Warning => 2,
            StatusColor::Critical => 3,
        };
        scheme_color(colors.scheme, intensity, false).0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatusColor {
    Good,
    Warning,
    Critical,
    Muted,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_is_capped() {
        assert_eq!(ColorState::new(42).scheme, MAX_SCHEME);
        assert!(ColorState::new(7).is_mono());
    }

    #[test]
    fn mono_level_gradient() {
        let mono = ColorState::new(MONO_SCHEME);
        assert_eq!(level_color(10.0, &mono), Color::AnsiValue(10));
        assert_eq!(level_color(75.0, &mono), Color::AnsiValue(11));
        assert_eq!(level_color(100.0, &mono), Color::AnsiValue(9));
    }

    #[test]
    fn top_intensity_is_bold() {
        assert!(scheme_color(0, 3, false).1);
        assert!(!scheme_color(0, 2, false).1);
        assert!(scheme_color(0, 2, true).1);
    }
}
