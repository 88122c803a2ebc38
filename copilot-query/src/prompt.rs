/// Question sent to extractive backends for a risk review, which have no free-form instructions.
pub const RISK_REVIEW_QUESTION: &str = "What are the main clinical risks for this patient?";

/// Recorded as the question of a summarization answer.
pub const SUMMARIZE_REQUEST: &str = "Summarize these clinical notes.";

/// What a backend is asked to do with a patient summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prompt {
    /// Answer a clinician's question from the summary.
    Question { context: String, question: String },
    /// Name the top potential clinical risks found in the summary.
    RiskReview { context: String },
    /// Condense free-text clinical notes into a short summary.
    Summarize { text: String },
}

impl Prompt {
    pub fn question(context: impl Into<String>, question: impl Into<String>) -> Self {
        Prompt::Question {
            context: context.into(),
            question: question.into(),
        }
    }

    pub fn risk_review(context: impl Into<String>) -> Self {
        Prompt::RiskReview {
            context: context.into(),
        }
    }

    pub fn summarize(text: impl Into<String>) -> Self {
        Prompt::Summarize { text: text.into() }
    }

    pub fn context(&self) -> &str {
        match self {
            Prompt::Question { context, .. } | Prompt::RiskReview { context } => context,
            Prompt::Summarize { text } => text,
        }
    }

    /// The question as an extractive backend should see it.
    pub fn question_text(&self) -> &str {
        match self {
            Prompt::Question { question, .. } => question,
            Prompt::RiskReview { .. } => RISK_REVIEW_QUESTION,
            Prompt::Summarize { .. } => SUMMARIZE_REQUEST,
        }
    }

    /// Full text for generative backends.
    pub fn render(&self) -> String {
        match self {
            Prompt::Question { context, question } => {
                format!("Patient summary: {context}\n\nQuestion: {question}\n\nRelevant data points:")
            }
            Prompt::RiskReview { context } => format!(
                "Review the patient record below and identify the top 3 potential clinical risks \
                 (for example a medication conflict or an abnormal lab trend). \
                 Answer with a brief bulleted list. If no significant risk is apparent, say so.\n\n\
                 PATIENT RECORD:\n{context}"
            ),
            Prompt::Summarize { text } => format!(
                "Summarize the following clinical notes in a few sentences. \
                 Keep diagnoses, medications, lab values and follow-up plans; \
                 do not add findings that are not in the notes.\n\n\
                 NOTES:\n{text}\n\nSUMMARY:"
            ),
        }
    }
}

/// Text-generation services often return the prompt followed by the continuation.
pub fn strip_prompt_echo(generated: &str, prompt: &str) -> String {
    generated
        .strip_prefix(prompt)
        .unwrap_or(generated)
        .trim()
        .to_string()
}
