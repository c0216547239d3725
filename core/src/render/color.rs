use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLUE: Rgb = Rgb { r: 0, g: 0, b: 255 };
    pub const RED: Rgb = Rgb { r: 255, g: 0, b: 0 };
}

impl fmt::Display for Rgb {
    /// Format as CSS: rgb(r,g,b)
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({},{},{})", self.r, self.g, self.b)
    }
}

/// RGB with opacity in [0.0, 1.0].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const SKY: Rgba = Rgba {
        r: 135,
        g: 206,
        b: 235,
        a: 0.5,
    };

    pub fn rgb(&self) -> Rgb {
        Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }

    pub fn opacity(&self) -> f32 {
        self.a.clamp(0.0, 1.0)
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({},{},{},{})", self.r, self.g, self.b, self.opacity())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_css_colors() {
        assert_eq!(Rgb::RED.to_string(), "rgb(255,0,0)");
        assert_eq!(Rgba::SKY.to_string(), "rgba(135,206,235,0.5)");
    }
}
