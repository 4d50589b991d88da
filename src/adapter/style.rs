//! Style variants for text-to-image generation.

use crate::error::StudioError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Rendering style for a generated blueprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StyleVariant {
    /// Flat, two-dimensional technical blueprint.
    #[default]
    Blueprint,
    /// Three-dimensional rendered model.
    #[serde(rename = "3d")]
    Rendered3d,
}

/// System instruction per variant, indexed by discriminant.
static STYLE_INSTRUCTIONS: [&str; StyleVariant::ALL.len()] = [
    "You are an expert technical illustrator. Produce a flat, two-dimensional engineering \
     blueprint of what the user describes: crisp white line work on a deep blue background, \
     orthographic front, side and top views where they help, precise dimension lines, \
     callout labels and a small title block. No shading, no perspective, no photographic detail.",
    "You are an expert technical visualization artist. Produce a three-dimensional rendered \
     model of what the user describes: an isometric or three-quarter perspective view, clean \
     physically based materials, soft studio lighting, a faint blueprint grid on the ground \
     plane and leader-line annotations for the key components.",
];

impl StyleVariant {
    /// Every variant, in table order.
    pub const ALL: [StyleVariant; 2] = [Self::Blueprint, Self::Rendered3d];

    /// Returns the fixed system instruction for this variant.
    pub fn instruction(&self) -> &'static str {
        STYLE_INSTRUCTIONS[*self as usize]
    }

    /// Returns the short identifier (`blueprint` or `3d`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blueprint => "blueprint",
            Self::Rendered3d => "3d",
        }
    }
}

impl std::fmt::Display for StyleVariant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleVariant {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blueprint" | "flat" | "2d" | "technical" => Ok(Self::Blueprint),
            "3d" | "rendered" | "three-dimensional" => Ok(Self::Rendered3d),
            other => Err(StudioError::Validation(format!(
                "unknown style variant: {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_variant_has_distinct_instruction() {
        let blueprint = StyleVariant::Blueprint.instruction();
        let rendered = StyleVariant::Rendered3d.instruction();
        assert_ne!(blueprint, rendered);
        assert!(blueprint.contains("blueprint"));
        assert!(rendered.contains("three-dimensional"));
    }

    #[test]
    fn test_all_matches_discriminants() {
        for (i, variant) in StyleVariant::ALL.iter().enumerate() {
            assert_eq!(*variant as usize, i);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!("flat".parse::<StyleVariant>().unwrap(), StyleVariant::Blueprint);
        assert_eq!("3D".parse::<StyleVariant>().unwrap(), StyleVariant::Rendered3d);
        assert_eq!(
            "rendered".parse::<StyleVariant>().unwrap(),
            StyleVariant::Rendered3d
        );
        assert!("watercolor".parse::<StyleVariant>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for variant in StyleVariant::ALL {
            assert_eq!(variant.to_string().parse::<StyleVariant>().unwrap(), variant);
        }
    }

    #[test]
    fn test_default_is_blueprint() {
        assert_eq!(StyleVariant::default(), StyleVariant::Blueprint);
    }
}
