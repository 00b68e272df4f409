use plotters::style::RGBColor;

const DATA_COLORS: [RGBColor; 8] = [
    RGBColor(0x2e, 0x86, 0xc1),
    RGBColor(0xd3, 0x54, 0x00),
    RGBColor(0x58, 0xd6, 0x8d),
    RGBColor(0x8e, 0x44, 0xad),
    RGBColor(0xc0, 0x39, 0x2b),
    RGBColor(0x17, 0xa5, 0x89),
    RGBColor(0x7f, 0x8c, 0x8d),
    RGBColor(0xf1, 0xc4, 0x0f),
];

/// Figure colour: an index into the data palette or a named colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Index(usize),
    White,
    Black,
    Grey,
    Green,
    LightBlue,
    Orange,
    LightOrange,
}

impl Color {
    pub fn rgb(self) -> RGBColor {
        match self {
            Color::Index(i) => DATA_COLORS[i % DATA_COLORS.len()],
            Color::White => RGBColor(0xff, 0xff, 0xff),
            Color::Black => RGBColor(0x00, 0x00, 0x00),
            Color::Grey => RGBColor(0x80, 0x80, 0x80),
            Color::Green => RGBColor(0xd5, 0xf5, 0xe3),
            Color::LightBlue => RGBColor(0x85, 0xc1, 0xe9),
            Color::Orange => RGBColor(0xd3, 0x54, 0x00),
            Color::LightOrange => RGBColor(0xf8, 0xc4, 0x71),
        }
    }
}

impl From<usize> for Color {
    fn from(i: usize) -> Self {
        Color::Index(i)
    }
}

/// Linear blend from `a` (t = 0) to `b` (t = 1).
pub fn lerp(a: Color, b: Color, t: f64) -> RGBColor {
    let (a, b) = (a.rgb(), b.rgb());
    let t = t.clamp(0.0, 1.0);
    let mix = |x: u8, y: u8| (x as f64 + (y as f64 - x as f64) * t).round() as u8;
    RGBColor(mix(a.0, b.0), mix(a.1, b.1), mix(a.2, b.2))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_wraps_and_blends() {
        assert_eq!(Color::Index(8).rgb(), Color::Index(0).rgb());
        assert_eq!(lerp(Color::Black, Color::White, 0.0), RGBColor(0, 0, 0));
        assert_eq!(lerp(Color::Black, Color::White, 1.0), RGBColor(255, 255, 255));
        assert_eq!(lerp(Color::Black, Color::White, 0.5), RGBColor(128, 128, 128));
    }
}
