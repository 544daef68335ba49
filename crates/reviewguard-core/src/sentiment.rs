//! Sentiment outcome of one classification call.

/// Binary sentiment verdict for a review's free text.
///
/// `Negative` is the only action-triggering value; anything the classifier
/// returns that is not the configured negative label maps to `Positive`, so
/// an unrecognized label conservatively causes no downstream action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sentiment {
    Negative,
    Positive,
}

impl Sentiment {
    /// Map a raw classifier label against the configured negative label.
    pub fn from_label(label: &str, negative_label: &str) -> Self {
        if label == negative_label {
            Self::Negative
        } else {
            Self::Positive
        }
    }

    pub fn is_negative(&self) -> bool {
        matches!(self, Self::Negative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_negative_label_matches() {
        assert_eq!(
            Sentiment::from_label("negative", "negative"),
            Sentiment::Negative
        );
    }

    #[test]
    fn positive_label_maps_to_positive() {
        assert_eq!(
            Sentiment::from_label("positive", "negative"),
            Sentiment::Positive
        );
    }

    #[test]
    fn unrecognized_label_is_treated_as_positive() {
        // Only the exact negative label triggers quarantine; anything else,
        // including garbage output from the model, is a no-op verdict.
        assert_eq!(
            Sentiment::from_label("mostly fine??", "negative"),
            Sentiment::Positive
        );
        assert!(!Sentiment::from_label("NEGATIVE", "negative").is_negative());
    }
}
