//! Keyword-based query understanding: pick the summary lines a question is about.

/// Terms recognised in clinician questions.
pub const DEFAULT_VOCABULARY: &[&str] = &[
    "chest pain",
    "treatment",
    "blood pressure",
    "hypertension",
    "diabetes",
    "glucose",
    "hba1c",
    "asthma",
    "kidney",
    "creatinine",
    "cholesterol",
    "heart rate",
    "allergy",
    "medication",
    "condition",
    "observation",
];

/// Case-insensitive matcher over a fixed vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordMatcher {
    vocabulary: Vec<String>,
}

impl Default for KeywordMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_VOCABULARY.iter().copied())
    }
}

impl KeywordMatcher {
    pub fn new<I, S>(vocabulary: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            vocabulary: vocabulary
                .into_iter()
                .map(|term| term.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Vocabulary terms found in `question`, in vocabulary order.
    pub fn extract(&self, question: &str) -> Vec<String> {
        let question = question.to_lowercase();
        self.vocabulary
            .iter()
            .filter(|term| question.contains(term.as_str()))
            .cloned()
            .collect()
    }
}

/// Extract keywords with the default vocabulary.
pub fn extract_keywords(question: &str) -> Vec<String> {
    KeywordMatcher::default().extract(question)
}

/// Keep the summary lines that mention any keyword.
///
/// The `Patient:` line is always kept for orientation but does not count as a
/// match on its own. `None` means nothing in the summary is relevant.
pub fn focus_context(summary: &str, keywords: &[String]) -> Option<String> {
    let mut matched = false;
    let lines: Vec<&str> = summary
        .lines()
        .filter(|line| {
            if line.starts_with("Patient: ") {
                return true;
            }
            let lower = line.to_lowercase();
            let hit = keywords.iter().any(|keyword| lower.contains(keyword.as_str()));
            matched |= hit;
            hit
        })
        .collect();

    matched.then(|| lines.join("\n"))
}
