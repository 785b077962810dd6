//! Utility prompts answered directly, without entering the coaching flow.
//!
//! Matched on the exact (trimmed, lowercased) message, the way slash
//! commands are intercepted before dispatch.

pub(crate) fn direct_answer(message: &str) -> Option<&'static str> {
    match message.trim().to_lowercase().as_str() {
        "tell me a green fact" => Some(
            "Did you know that recycling one aluminum can saves enough energy to \
             power a TV for three hours? Every little bit helps! 🌱",
        ),
        "what can i recycle today?" => Some(
            "For today, focus on recycling all clean paper, cardboard, plastic \
             bottles (with caps), and aluminum cans. Check local guidelines for \
             more specifics! ♻️",
        ),
        "eco tip" => Some(
            "Here's a quick eco tip: Unplug electronics when not in use. They can \
             still draw 'phantom' power even when turned off! 💡",
        ),
        "why is climate change bad?" => Some(
            "Climate change is leading to more extreme weather, rising sea levels, \
             and impacts on ecosystems, threatening human health and natural \
             habitats globally. 🌍",
        ),
        "inspire me" => Some(
            "Remember, every small action you take for sustainability creates a \
             ripple effect. Your effort matters, and together, we can build a \
             greener future! ✨",
        ),
        _ => None,
    }
}
