//! Analysis dimensions, grading policy levels and the UI-facing label tables.
//!
//! Labels are accepted both as short English keys (`visual`, `strict`, ...) and as
//! the Chinese labels the browser UI shows, so form values can be forwarded as-is.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// One of the three agent roles. Declaration order is the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Visual,
    Ux,
    Market,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Visual, Category::Ux, Category::Market];

    pub fn key(self) -> &'static str {
        match self {
            Category::Visual => "visual",
            Category::Ux => "ux",
            Category::Market => "market",
        }
    }

    /// Label shown by the UI multiselect.
    pub fn ui_label(self) -> &'static str {
        match self {
            Category::Visual => "视觉设计",
            Category::Ux => "用户体验",
            Category::Market => "市场分析",
        }
    }

    /// Section title used in reports.
    pub fn title(self) -> &'static str {
        match self {
            Category::Visual => "Visual Design Analysis",
            Category::Ux => "User Experience Analysis",
            Category::Market => "Market Analysis",
        }
    }

    /// System instructions for the agent playing this role.
    pub fn instructions(self) -> &'static [&'static str] {
        match self {
            Category::Visual => &[
                "You are a visual analysis expert that:",
                "1. Identifies design elements, patterns, and visual hierarchy",
                "2. Analyzes color schemes, typography, and layouts",
                "3. Detects UI components and their relationships",
                "4. Evaluates visual consistency and branding",
                "Be specific and technical in your analysis",
                "Please provide your analysis in Chinese (Simplified Chinese).",
            ],
            Category::Ux => &[
                "You are a UX analysis expert that:",
                "1. Evaluates user flows and interaction patterns",
                "2. Identifies usability issues and opportunities",
                "3. Suggests UX improvements based on best practices",
                "4. Analyzes accessibility and inclusive design",
                "Focus on user-centric insights and practical improvements",
                "Please provide your analysis in Chinese (Simplified Chinese).",
            ],
            Category::Market => &[
                "You are a market research expert that:",
                "1. Identifies market trends and competitor patterns",
                "2. Analyzes similar products and features",
                "3. Suggests market positioning and opportunities",
                "4. Provides industry-specific insights",
                "Focus on actionable market intelligence",
                "Please provide your analysis in Chinese (Simplified Chinese).",
            ],
        }
    }

    /// One-line description of what the agent contributes (combined insights note).
    pub fn contribution(self) -> &'static str {
        match self {
            Category::Visual => "Visual design agent: analyzes design elements and patterns",
            Category::Ux => "User experience agent: evaluates usability and interactions",
            Category::Market => "Market research agent: provides market context and opportunities",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Category {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        match t.to_ascii_lowercase().as_str() {
            "visual" | "视觉设计" => Ok(Category::Visual),
            "ux" | "用户体验" => Ok(Category::Ux),
            "market" | "市场分析" => Ok(Category::Market),
            _ => Err(ConfigError::UnknownCategory(t.to_string())),
        }
    }
}

/// How harshly deviations from a perfect score are graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    Lenient,
    #[default]
    Normal,
    Strict,
}

impl Strictness {
    /// Multiplier applied to the distance from 10 by the normalizer.
    pub fn factor(self) -> f32 {
        match self {
            Strictness::Lenient => 0.8,
            Strictness::Normal => 1.0,
            Strictness::Strict => 1.2,
        }
    }

    /// Grading guidance embedded in the prompt.
    pub fn guidance(self) -> &'static str {
        match self {
            Strictness::Lenient => {
                "Grade leniently: give credit for reasonable choices and only deduct for clear, user-facing problems."
            }
            Strictness::Normal => {
                "Grade with balanced judgement: weigh strengths and weaknesses evenly against common industry practice."
            }
            Strictness::Strict => {
                "Grade strictly: hold the design to top-tier product standards and deduct for every inconsistency or missed best practice."
            }
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Strictness::Lenient => "lenient",
            Strictness::Normal => "normal",
            Strictness::Strict => "strict",
        }
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Strictness {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        match t.to_ascii_lowercase().as_str() {
            "lenient" | "宽松" => Ok(Strictness::Lenient),
            "normal" | "标准" => Ok(Strictness::Normal),
            "strict" | "严格" => Ok(Strictness::Strict),
            _ => Err(ConfigError::UnknownStrictness(t.to_string())),
        }
    }
}

/// Focus areas offered by the UI (English key, UI label).
pub const FOCUS_AREAS: [(&str, &str); 8] = [
    ("color_scheme", "配色方案"),
    ("typography", "字体排版"),
    ("layout", "布局设计"),
    ("navigation", "导航结构"),
    ("interaction", "交互设计"),
    ("accessibility", "无障碍性"),
    ("branding", "品牌设计"),
    ("market_fit", "市场契合度"),
];
