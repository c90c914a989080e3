pub mod enricher;

use crate::models::StylePreset;

pub use enricher::StandardEnricher;

/// Turns a raw user prompt into a provider-ready prompt. Implementations
/// must be pure: the same inputs always give the same output.
pub trait PromptEnricher: Send + Sync {
    fn enrich(&self, prompt: &str, style: StylePreset, include_text_in_ai: bool) -> String;
}

pub const DIVERSITY_MODIFIERS: [&str; 5] = [
    "alternative composition, different visual approach, unique interpretation",
    "reimagined concept, fresh perspective, creative variation",
    "distinct style, alternative aesthetic, different mood",
    "unique geometric arrangement, different symbolism, varied approach",
    "original interpretation, alternative design language, fresh concept",
];

/// Prompt for the 0-based variation `index`. The first variation uses the
/// base prompt as is.
pub fn variation_prompt(base: &str, index: usize) -> String {
    if index == 0 {
        return base.to_string();
    }
    let modifier = DIVERSITY_MODIFIERS[index % DIVERSITY_MODIFIERS.len()];
    format!("{}, {}, maintain premium quality", base, modifier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_variation_is_verbatim() {
        assert_eq!(variation_prompt("base prompt", 0), "base prompt");
    }

    #[test]
    fn test_later_variations_rotate_modifiers() {
        let second = variation_prompt("base", 1);
        let third = variation_prompt("base", 2);
        assert_eq!(
            second,
            format!("base, {}, maintain premium quality", DIVERSITY_MODIFIERS[1])
        );
        assert!(third.contains(DIVERSITY_MODIFIERS[2]));
        assert_ne!(second, third);

        // wraps around the rotation
        assert!(variation_prompt("base", 5).contains(DIVERSITY_MODIFIERS[0]));
    }
}
