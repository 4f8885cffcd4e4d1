//! Source location types
//!
//! Positions refer to the original source the low-level SSA front end
//! compiled, not to any textual rendering of the IR itself.

use serde::{Deserialize, Serialize};

/// Single location in source code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Loc {
    pub line: u32,
    pub col: u32,
}

impl Loc {
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }

    /// Location for synthetic instructions with no source counterpart
    pub fn zero() -> Self {
        Self::new(0, 0)
    }
}

impl Default for Loc {
    fn default() -> Self {
        Self::zero()
    }
}

impl std::fmt::Display for Loc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loc_display() {
        assert_eq!(Loc::new(12, 4).to_string(), "12:4");
        assert_eq!(Loc::zero().to_string(), "0:0");
    }
}
