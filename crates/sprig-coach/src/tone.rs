//! Tone adaptation: a phrasing wrapper derived from profile tags.
//!
//! Tone never changes what a message says or where the conversation goes,
//! only how the message opens.

use sprig_core::types::{AgeGroup, MotivationLevel, UserProfile};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Playful,
    Respectful,
    FactBased,
    Neutral,
}

/// Derive the tone for a profile. Age group outranks motivation.
pub fn tone_for(profile: &UserProfile) -> Tone {
    match (profile.age_group, profile.motivation) {
        (Some(AgeGroup::Youth), _) => Tone::Playful,
        (Some(AgeGroup::Elderly), _) => Tone::Respectful,
        (None, Some(MotivationLevel::Skeptic)) => Tone::FactBased,
        _ => Tone::Neutral,
    }
}

/// Prefix a message with the tone's opener.
pub fn apply(tone: Tone, message: &str) -> String {
    let opener = match tone {
        Tone::Playful => "✨ Let's make this fun! ",
        Tone::Respectful => "🙏 At your own pace: ",
        Tone::FactBased => "📊 The numbers back this up. ",
        Tone::Neutral => "🌿 ",
    };
    format!("{opener}{message}")
}
