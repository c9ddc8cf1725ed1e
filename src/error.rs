/// The error type used throughout this library. It pairs a human-readable context
/// with the stringified error it propagates, if any. A failure deep inside the page
/// stream encoder therefore surfaces to the caller as a single error whose message
/// chains every context it crossed on the way up.
#[derive(Debug, Clone)]
pub struct ReportError {
    pub context: String,
    pub source_error: Option<String>,
}

impl std::fmt::Display for ReportError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.source_error {
            Some(source_error) => {
                // Lowercase the first letter of the propagated message so that the
                // chained contexts read as a single sentence.
                let mut characters = source_error.chars();
                match characters.next() {
                    Some(first_character) => write!(
                        formatter,
                        "{}: {}{}",
                        self.context,
                        first_character.to_lowercase(),
                        characters.as_str()
                    ),
                    None => write!(formatter, "{}", self.context),
                }
            }
            None => write!(formatter, "{}", self.context),
        }
    }
}

impl std::error::Error for ReportError {}

impl ReportError {
    /// Create a new `ReportError` with the given context.
    pub fn with_context<S: Into<String>>(context: S) -> ReportError {
        ReportError {
            context: context.into(),
            source_error: None,
        }
    }

    /// Create a new `ReportError` with the given context and the source error it wraps.
    pub fn with_error<S: Into<String>>(context: S, error: &dyn std::error::Error) -> ReportError {
        ReportError {
            context: context.into(),
            source_error: Some(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chained_contexts_read_as_one_sentence() {
        let inner = ReportError::with_context("The page index 3 is out of bounds");
        let outer = ReportError::with_error("Failed to render the transaction report", &inner);
        assert_eq!(
            outer.to_string(),
            "Failed to render the transaction report: the page index 3 is out of bounds"
        );
    }

    #[test]
    fn plain_context_is_displayed_verbatim() {
        let error = ReportError::with_context("No records were provided");
        assert_eq!(error.to_string(), "No records were provided");
    }
}
