//! Splits the model's free-text report into explanation, diagnosis and next steps.
//!
//! Each section runs from its heading phrase to the earliest terminator
//! (the next section's heading, in any of the forms the model tends to
//! produce) or to the end of the text. Matching is case-insensitive and
//! spans newlines; the first occurrence of a heading wins.

use std::sync::LazyLock;

use regex::Regex;

use crate::models::explanation::{NO_DIAGNOSIS, NO_EXPLANATION, NO_STEPS};
use crate::models::StructuredExplanation;

struct SectionPattern {
    heading: Regex,
    terminator: Regex,
}

impl SectionPattern {
    fn new(heading: &str, terminator: &str) -> Self {
        Self {
            heading: Regex::new(&format!("(?is){heading}")).expect("invalid section heading regex"),
            terminator: Regex::new(&format!("(?is){terminator}"))
                .expect("invalid section terminator regex"),
        }
    }

    /// The matched span: heading through to the earliest terminator or end.
    fn find<'a>(&self, text: &'a str) -> Option<&'a str> {
        let heading = self.heading.find(text)?;
        let rest = &text[heading.end()..];
        let end = self
            .terminator
            .find(rest)
            .map_or(text.len(), |t| heading.end() + t.start());
        Some(&text[heading.start()..end])
    }
}

static EXPLANATION: LazyLock<SectionPattern> = LazyLock::new(|| {
    SectionPattern::new(
        r"Explanation of Your Results",
        r"\n\s*\*\*?What|2\. What|What This Could",
    )
});
static DIAGNOSIS: LazyLock<SectionPattern> = LazyLock::new(|| {
    SectionPattern::new(
        r"What This Could Mean",
        r"\n\s*\*\*?Your Suggested|3\. Your|Your Suggested",
    )
});
static NEXT_STEPS: LazyLock<SectionPattern> = LazyLock::new(|| {
    SectionPattern::new(
        r"Your Suggested Next Steps",
        r"\n\s*\*\*?Additional|4\. Additional|Additional Concerns",
    )
});

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*[*+\-][ \t]*(.+)$").expect("invalid bullet regex"));
static RISK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(High|Moderate|Low)\s*Risk").expect("invalid risk regex"));

/// Stateless parser for model answers.
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseStructurer;

impl ResponseStructurer {
    pub fn new() -> Self {
        Self
    }

    /// Parse `answer` into sections. `fallback_risk` is reported when the
    /// explanation names no "High/Moderate/Low Risk" phrase.
    pub fn structure(&self, answer: &str, fallback_risk: &str) -> StructuredExplanation {
        let explanation = section_body(&EXPLANATION, answer);
        let diagnosis = section_body(&DIAGNOSIS, answer);
        let steps_body = section_body(&NEXT_STEPS, answer);

        let next_steps = extract_bullets(&steps_body);
        let risk = detect_risk(&explanation).unwrap_or_else(|| fallback_risk.to_string());

        tracing::debug!(
            explanation_found = !explanation.is_empty(),
            diagnosis_found = !diagnosis.is_empty(),
            steps = next_steps.len(),
            risk = %risk,
            "Answer structured"
        );

        StructuredExplanation {
            explanation: or_sentinel(explanation, NO_EXPLANATION),
            diagnosis: or_sentinel(diagnosis, NO_DIAGNOSIS),
            next_steps,
            risk,
        }
    }
}

/// Section text with its heading line removed, or empty when the heading is absent.
///
/// A match spanning a single line is kept whole.
fn section_body(pattern: &SectionPattern, answer: &str) -> String {
    let Some(matched) = pattern.find(answer) else {
        return String::new();
    };
    let body = matched.split_once('\n').map_or(matched, |(_, rest)| rest);
    let body = body.strip_prefix(':').unwrap_or(body);
    body.trim().to_string()
}

/// Bulleted items of the next-steps body, never empty.
fn extract_bullets(body: &str) -> Vec<String> {
    let items: Vec<String> = BULLET_RE
        .captures_iter(body)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|item| keep_item(item))
        .collect();

    if !items.is_empty() {
        items
    } else if !body.is_empty() {
        vec![body.to_string()]
    } else {
        vec![NO_STEPS.to_string()]
    }
}

fn keep_item(item: &str) -> bool {
    !item.is_empty() && item != "being." && item != "being" && item.chars().count() > 3
}

/// First "High/Moderate/Low Risk" phrase, title-cased.
fn detect_risk(explanation: &str) -> Option<String> {
    RISK_RE.find(explanation).map(|m| title_case(m.as_str()))
}

/// Upper-case the first letter of each alphabetic run, lower-case the rest.
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_alpha = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

fn or_sentinel(body: String, sentinel: &str) -> String {
    if body.is_empty() {
        sentinel.to_string()
    } else {
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_ANSWER: &str = "Your Personal Health Report

1. Explanation of Your Results & Risk Level
Your results indicate a high risk that warrants attention.
Your blood pressure is well above the normal range.

2. What This Could Mean (Possible Diagnosis)
The pattern is most commonly associated with Primary Hypertension.

3. Your Suggested Next Steps
- Schedule a follow-up appointment with your doctor.
- Monitor your blood pressure at home.
* Reduce sodium in your diet.

4. Additional Concerns
None.";

    fn structure(answer: &str, fallback: &str) -> StructuredExplanation {
        ResponseStructurer::new().structure(answer, fallback)
    }

    #[test]
    fn splits_three_sections() {
        let s = structure(FULL_ANSWER, "Bad");
        assert_eq!(
            s.explanation,
            "Your results indicate a high risk that warrants attention.\nYour blood pressure is well above the normal range."
        );
        assert_eq!(
            s.diagnosis,
            "The pattern is most commonly associated with Primary Hypertension."
        );
        assert_eq!(
            s.next_steps,
            vec![
                "Schedule a follow-up appointment with your doctor.",
                "Monitor your blood pressure at home.",
                "Reduce sodium in your diet.",
            ]
        );
    }

    #[test]
    fn detected_risk_is_title_cased() {
        assert_eq!(structure(FULL_ANSWER, "Bad").risk, "High Risk");
    }

    #[test]
    fn high_risk_phrase_is_reported_exactly() {
        let answer = "Explanation of Your Results\nYou are at High Risk of heart disease.";
        assert_eq!(structure(answer, "Fair").risk, "High Risk");
    }

    #[test]
    fn risk_phrase_allows_no_space() {
        let answer = "Explanation of Your Results\nOverall: MODERATERISK.";
        assert_eq!(structure(answer, "Fair").risk, "Moderaterisk");
    }

    #[test]
    fn no_risk_phrase_uses_fallback() {
        let answer = "Explanation of Your Results\nYour numbers look fine.";
        assert_eq!(structure(answer, "Good").risk, "Good");
    }

    #[test]
    fn risk_outside_explanation_is_ignored() {
        let answer = "What This Could Mean\nLow risk of anything serious.";
        assert_eq!(structure(answer, "Unknown").risk, "Unknown");
    }

    #[test]
    fn no_headings_yield_sentinels() {
        let s = structure("I am unable to help with that request.", "Fair");
        assert_eq!(s.explanation, "No explanation found.");
        assert_eq!(s.diagnosis, "Unable to retrieve diagnosis.");
        assert_eq!(s.next_steps, vec!["No steps provided."]);
        assert_eq!(s.risk, "Fair");
    }

    #[test]
    fn empty_answer_yields_sentinels() {
        let s = structure("", "Unknown");
        assert_eq!(s.explanation, NO_EXPLANATION);
        assert_eq!(s.next_steps, vec![NO_STEPS]);
    }

    #[test]
    fn headings_are_case_insensitive() {
        let answer = "EXPLANATION OF YOUR RESULTS\nbody one\nwhat this could mean\nbody two\nYOUR SUGGESTED NEXT STEPS\n- step three here";
        let s = structure(answer, "Good");
        assert_eq!(s.explanation, "body one");
        assert_eq!(s.diagnosis, "body two");
        assert_eq!(s.next_steps, vec!["step three here"]);
    }

    #[test]
    fn markdown_bold_headings_terminate_sections() {
        let answer = "**Explanation of Your Results & Risk Level**\nBody A.\n\n**What This Could Mean**\nBody B.\n\n**Your Suggested Next Steps**\n+ Walk daily for thirty minutes.";
        let s = structure(answer, "Good");
        assert_eq!(s.explanation, "Body A.");
        assert_eq!(s.diagnosis, "Body B.");
        assert_eq!(s.next_steps, vec!["Walk daily for thirty minutes."]);
    }

    #[test]
    fn numbered_headings_terminate_sections() {
        let answer = "Explanation of Your Results:\nBody A. 2. What This Could Mean\nBody B. 3. Your Suggested Next Steps\nRest well.";
        let s = structure(answer, "Good");
        assert_eq!(s.explanation, "Body A.");
        assert_eq!(s.diagnosis, "Body B.");
        assert_eq!(s.next_steps, vec!["Rest well."]);
    }

    #[test]
    fn colon_after_line_break_is_stripped() {
        let answer = "Explanation of Your Results\n: Your pressure is high.";
        assert_eq!(structure(answer, "Bad").explanation, "Your pressure is high.");
    }

    #[test]
    fn single_line_match_keeps_text() {
        let s = structure("Explanation of Your Results are below.", "Good");
        assert_eq!(s.explanation, "Explanation of Your Results are below.");
    }

    #[test]
    fn first_heading_occurrence_wins() {
        let answer = "Explanation of Your Results\nfirst\nWhat This Could Mean\nx\nExplanation of Your Results\nsecond";
        assert_eq!(structure(answer, "Good").explanation, "first");
    }

    #[test]
    fn missing_middle_section_only_affects_that_field() {
        let answer = "Explanation of Your Results\nAll good.\nYour Suggested Next Steps\n- Keep it up, you are doing well.";
        let s = structure(answer, "Good");
        assert_eq!(s.explanation, "All good.\nYour Suggested Next Steps\n- Keep it up, you are doing well.");
        assert_eq!(s.diagnosis, "Unable to retrieve diagnosis.");
        assert_eq!(s.next_steps, vec!["Keep it up, you are doing well."]);
    }

    #[test]
    fn bullets_drop_short_and_being_items() {
        let answer = "Your Suggested Next Steps\n- being.\n- being\n- ok\n-\n* Eat more vegetables.\n+ Sleep";
        let s = structure(answer, "Good");
        assert_eq!(s.next_steps, vec!["Eat more vegetables.", "Sleep"]);
    }

    #[test]
    fn no_surviving_bullets_falls_back_to_body() {
        let answer = "Your Suggested Next Steps\nBook an appointment with your doctor this week.";
        let s = structure(answer, "Fair");
        assert_eq!(s.next_steps, vec!["Book an appointment with your doctor this week."]);
    }

    #[test]
    fn only_filtered_bullets_fall_back_to_body() {
        let answer = "Your Suggested Next Steps\n- ok\n- being.";
        let s = structure(answer, "Fair");
        assert_eq!(s.next_steps, vec!["- ok\n- being."]);
    }

    #[test]
    fn empty_steps_body_gives_sentinel() {
        let answer = "Your Suggested Next Steps\n   \n4. Additional Concerns\nnone";
        assert_eq!(structure(answer, "Fair").next_steps, vec!["No steps provided."]);
    }

    #[test]
    fn next_steps_never_empty() {
        for answer in ["", "Your Suggested Next Steps", "Your Suggested Next Steps\n- x", FULL_ANSWER] {
            assert!(!structure(answer, "Good").next_steps.is_empty(), "empty for {answer:?}");
        }
    }

    #[test]
    fn bodies_reconstruct_text_between_headings() {
        let s = structure(FULL_ANSWER, "Bad");
        let start = FULL_ANSWER.find("1. Explanation").unwrap();
        let end = FULL_ANSWER.find("4. Additional").unwrap();
        let middle = &FULL_ANSWER[start..end];
        assert!(middle.contains(&s.explanation));
        assert!(middle.contains(&s.diagnosis));
        for step in &s.next_steps {
            assert!(middle.contains(step.as_str()));
        }
    }

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("hIGH   rIsK"), "High   Risk");
        assert_eq!(title_case("low risk"), "Low Risk");
    }
}
