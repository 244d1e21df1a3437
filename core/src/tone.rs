use crate::intent::Tone;
use crate::phrases::{
    CONFUSION_PHRASES, FRUSTRATION_PHRASES, PANIC_EXCLAMATION_MIN, PANIC_PHRASES,
};
use crate::text::{contains_any, normalize};

/// Emotional register of the ticket. Checked in fixed precedence:
/// panic, then frustration, then confusion.
pub fn detect_tone(text: &str) -> Tone {
    let text = normalize(text);

    if contains_any(&text, PANIC_PHRASES) || text.matches('!').count() >= PANIC_EXCLAMATION_MIN {
        return Tone::Panic;
    }
    if contains_any(&text, FRUSTRATION_PHRASES) {
        return Tone::Frustration;
    }
    if contains_any(&text, CONFUSION_PHRASES) {
        return Tone::Confusion;
    }
    Tone::Neutral
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neutral_by_default() {
        assert_eq!(detect_tone("Where is my order?"), Tone::Neutral);
        assert_eq!(detect_tone(""), Tone::Neutral);
    }

    #[test]
    fn panic_from_keywords_or_exclamations() {
        assert_eq!(detect_tone("This is URGENT"), Tone::Panic);
        assert_eq!(detect_tone("help!!!"), Tone::Panic);
        assert_eq!(detect_tone("help!!"), Tone::Neutral);
    }

    #[test]
    fn panic_outranks_frustration() {
        assert_eq!(
            detect_tone("still not working and I am losing money"),
            Tone::Panic
        );
    }

    #[test]
    fn frustration_and_confusion() {
        assert_eq!(detect_tone("I'm so frustrated"), Tone::Frustration);
        assert_eq!(detect_tone("I'm confused about pools"), Tone::Confusion);
    }
}
