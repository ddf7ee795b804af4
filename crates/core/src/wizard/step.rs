use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four ordered wizard stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Company,
    Account,
    Documents,
    Review,
}

impl Step {
    pub const ALL: [Step; 4] = [Step::Company, Step::Account, Step::Documents, Step::Review];
    pub const COUNT: u8 = 4;

    pub fn number(self) -> u8 {
        match self {
            Self::Company => 1,
            Self::Account => 2,
            Self::Documents => 3,
            Self::Review => 4,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::Company),
            2 => Some(Self::Account),
            3 => Some(Self::Documents),
            4 => Some(Self::Review),
            _ => None,
        }
    }

    /// The following step, saturating at [`Step::Review`].
    pub fn next(self) -> Self {
        Self::from_number(self.number() + 1).unwrap_or(Self::Review)
    }

    /// The preceding step, saturating at [`Step::Company`].
    pub fn previous(self) -> Self {
        Self::from_number(self.number().saturating_sub(1)).unwrap_or(Self::Company)
    }

    pub fn is_first(self) -> bool {
        self == Self::Company
    }

    pub fn is_last(self) -> bool {
        self == Self::Review
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Company => "Company Information",
            Self::Account => "Administrator Account",
            Self::Documents => "Upload Documents",
            Self::Review => "Review & Submit",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {} ({})", self.number(), self.title())
    }
}
