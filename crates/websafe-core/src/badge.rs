//! Score -> toolbar badge mapping.

use serde::{Deserialize, Serialize};

/// Three-way severity classification of a score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTier {
    /// score < 4
    Red,
    /// 4 <= score < 7
    Amber,
    /// score >= 7
    Green,
}

impl BadgeTier {
    pub fn for_score(score: u8) -> Self {
        if score < 4 {
            Self::Red
        } else if score < 7 {
            Self::Amber
        } else {
            Self::Green
        }
    }

    pub fn text(self) -> &'static str {
        match self {
            Self::Red => "!",
            Self::Amber => "?",
            Self::Green => "",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Red => "#ef4444",
            Self::Amber => "#f59e0b",
            Self::Green => "#10b981",
        }
    }
}

/// What the host should render on a tab's badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeState {
    pub tier: BadgeTier,
    pub text: String,
    pub color: String,
}

impl BadgeState {
    pub fn for_score(score: u8) -> Self {
        BadgeTier::for_score(score).into()
    }
}

impl From<BadgeTier> for BadgeState {
    fn from(tier: BadgeTier) -> Self {
        Self {
            tier,
            text: tier.text().to_string(),
            color: tier.color().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boundaries() {
        assert_eq!(BadgeTier::for_score(3), BadgeTier::Red);
        assert_eq!(BadgeTier::for_score(4), BadgeTier::Amber);
        assert_eq!(BadgeTier::for_score(6), BadgeTier::Amber);
        assert_eq!(BadgeTier::for_score(7), BadgeTier::Green);
    }

    #[test]
    fn test_every_score_has_exactly_one_tier() {
        for score in 0..=u8::MAX {
            let state = BadgeState::for_score(score);
            let expected = match score {
                0..=3 => ("!", "#ef4444"),
                4..=6 => ("?", "#f59e0b"),
                _ => ("", "#10b981"),
            };
            assert_eq!((state.text.as_str(), state.color.as_str()), expected);
        }
    }
}
