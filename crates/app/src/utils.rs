//! Helper functions for the Body Language Analyst app.

/// Turn a raw provider error into a message with actionable guidance.
///
/// The raw error text is always kept at the end so nothing is hidden.
pub fn describe_failure(error: &str) -> String {
    let lower = error.to_lowercase();

    if lower.contains("gemini_api_key") {
        return format!(
            "No Gemini API key is configured. Set the GEMINI_API_KEY environment \
            variable and try again.\n\n{}",
            error
        );
    }

    if lower.contains("401")
        || lower.contains("403")
        || lower.contains("unauthorized")
        || lower.contains("forbidden")
        || lower.contains("invalid api key")
    {
        return format!(
            "Gemini rejected the API key. Check that the key is valid and that the \
            Generative Language API is enabled for it.\n\n{}",
            error
        );
    }

    if lower.contains("429") || lower.contains("rate limit") || lower.contains("too many requests")
    {
        return format!(
            "The analysis service is temporarily busy. Wait a moment and try again.\n\n{}",
            error
        );
    }

    if lower.contains("quota") || lower.contains("billing") {
        return format!(
            "The API quota looks exhausted. Check your Gemini plan and billing.\n\n{}",
            error
        );
    }

    if lower.contains("connection")
        || lower.contains("network")
        || lower.contains("timeout")
        || lower.contains("timed out")
        || lower.contains("dns")
    {
        return format!(
            "Couldn't reach the analysis service. Check your internet connection \
            and try again.\n\n{}",
            error
        );
    }

    format!("The analysis failed:\n\n{}", error)
}
