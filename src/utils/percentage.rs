use std::{fmt::Display, ops::Deref};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Percentage(f64);

impl Display for Percentage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}

impl Percentage {
    pub const ZERO: Percentage = Percentage(0.);

    /// Creates a percentage out of a part of a whole. An empty whole is 0%.
    pub fn of(part: usize, whole: usize) -> Percentage {
        if whole == 0 {
            return Percentage::ZERO;
        }
        let fraction = part.min(whole) as f64 / whole as f64;
        Percentage(fraction * 100.)
    }

    pub fn rounded(self) -> Percentage {
        Percentage(self.0.round())
    }

    pub fn fraction(self) -> f64 {
        self.0 / 100.
    }
}

impl Deref for Percentage {
    type Target = f64;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
