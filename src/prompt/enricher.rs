use crate::{models::StylePreset, prompt::PromptEnricher};

const QUALITY_BOOSTERS: &str = "award-winning logo design, trending on design showcases, \
professional branding, 8K resolution, ultra detailed, clean vector style, \
studio-grade quality, polished finish";

const POSITIVE_BASE: &str = "sharp edges, sophisticated color palette, \
clear visual hierarchy, refined geometry, subtle depth, balanced composition, \
high contrast, premium finish";

const NEGATIVE_BASE: &str = "blurry, low quality, pixelated, amateur, clipart, watermark, \
generic stock image, placeholder mockup, lifeless flat fill, NO cheap effects, \
NO heavy gradients, NO bevels, NO heavy shading, NO noise, NO glows";

const TEXT_POSITIVE: &str = "professional typography, premium font, perfect kerning, \
crisp legible lettering, refined letterforms";

const TEXT_NEGATIVE: &str = "blurry text, misspelled words, distorted letters, \
unreadable text, poor kerning, pixelated text, generic fonts";

const ICON_POSITIVE: &str = "ICON ONLY, NO TEXT WHATSOEVER, pure symbol, graphic mark only, \
text-free design, symbol-only logo, abstract emblem";

const ICON_NEGATIVE: &str = "text, letters, words, numbers, digits, alphabet, characters, \
writing, script, calligraphy, wordmark, lettering, monogram, initials, signage";

/// Appends a style descriptor, quality boosters and text constraints.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardEnricher;

impl StandardEnricher {
    pub fn new() -> Self {
        Self
    }

    pub fn style_descriptor(style: StylePreset) -> &'static str {
        match style {
            StylePreset::Modern => {
                "modern, clean, contemporary, professional, award-winning design"
            }
            StylePreset::Corporate => {
                "corporate, professional, trustworthy, business-like, enterprise quality"
            }
            StylePreset::Creative => "creative, innovative, artistic, bold, gallery featured",
            StylePreset::Minimalist => {
                "minimalist, simple, clean lines, elegant simplicity, Swiss design aesthetic"
            }
            StylePreset::Vibrant => {
                "vibrant, colorful, energetic, eye-catching, premium branding"
            }
            StylePreset::Elegant => {
                "elegant, sophisticated, refined, luxurious, high-end brand identity"
            }
        }
    }
}

impl PromptEnricher for StandardEnricher {
    fn enrich(&self, prompt: &str, style: StylePreset, include_text_in_ai: bool) -> String {
        let (text_positive, text_negative) = if include_text_in_ai {
            (TEXT_POSITIVE, TEXT_NEGATIVE)
        } else {
            (ICON_POSITIVE, ICON_NEGATIVE)
        };

        format!(
            "{}, {}, {}, {}, {}, {}, {}",
            prompt,
            Self::style_descriptor(style),
            QUALITY_BOOSTERS,
            POSITIVE_BASE,
            text_positive,
            NEGATIVE_BASE,
            text_negative
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enrich_is_deterministic() {
        let enricher = StandardEnricher::new();
        let a = enricher.enrich("mountain coffee brand", StylePreset::Creative, false);
        let b = enricher.enrich("mountain coffee brand", StylePreset::Creative, false);
        assert_eq!(a, b);
        assert!(a.starts_with("mountain coffee brand, "));
        assert!(a.contains(StandardEnricher::style_descriptor(StylePreset::Creative)));
        assert!(a.contains(QUALITY_BOOSTERS));
    }

    #[test]
    fn test_every_style_has_its_own_descriptor() {
        let enricher = StandardEnricher::new();
        for style in StylePreset::ALL {
            let out = enricher.enrich("owl", style, true);
            assert!(out.contains(StandardEnricher::style_descriptor(style)));
            assert!(out.contains(style.as_str()));
        }
    }

    #[test]
    fn test_unknown_style_falls_back_to_modern() {
        let enricher = StandardEnricher::new();
        let out = enricher.enrich("owl", StylePreset::lenient("steampunk"), false);
        assert_eq!(out, enricher.enrich("owl", StylePreset::Modern, false));
    }

    #[test]
    fn test_icon_only_branch_excludes_text() {
        let out = StandardEnricher::new().enrich("fox head", StylePreset::Minimalist, false);
        assert!(out.contains("ICON ONLY"));
        assert!(!out.to_lowercase().contains("typography"));
        for negation in ["letters", "numbers", "wordmark", "monogram"] {
            assert!(out.contains(negation), "missing negation '{}'", negation);
        }
        assert!(!out.contains("premium font"));
    }

    #[test]
    fn test_text_branch_asks_for_typography() {
        let out = StandardEnricher::new().enrich("ACME bakery", StylePreset::Elegant, true);
        assert!(out.contains("professional typography"));
        assert!(out.contains("misspelled words"));
        assert!(!out.contains("ICON ONLY"));
    }
}
