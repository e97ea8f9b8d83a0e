use crate::models::{PatientRecord, RiskLabel};
use crate::pipeline::storage::types::ScoredPassage;

/// "Stuff" instructions: every retrieved passage goes in ahead of the question.
pub const STUFF_SYSTEM_PROMPT: &str = "Use the following pieces of context to answer the user's question. \
If you don't know the answer, just say that you don't know, don't try to make up an answer.";

/// Heading phrases the report must use, in order.
pub const REPORT_HEADINGS: [&str; 3] = [
    "1. Explanation of Your Results & Risk Level",
    "2. What This Could Mean (Possible Diagnosis)",
    "3. Your Suggested Next Steps",
];

/// System message with the retrieved passages appended.
pub fn build_system_prompt(passages: &[ScoredPassage]) -> String {
    let mut prompt = String::from(STUFF_SYSTEM_PROMPT);
    prompt.push_str("\n----------------\n");
    let context = passages
        .iter()
        .map(|p| p.content.trim())
        .collect::<Vec<_>>()
        .join("\n\n");
    prompt.push_str(&context);
    prompt
}

/// The patient question: vitals, predicted risk and the report layout to follow.
pub fn build_patient_question(record: &PatientRecord, risk: RiskLabel) -> String {
    format!(
        "Patient vitals:
- Gender: {gender}
- Age: {age}
- BP: {systolic}/{diastolic}
- Cholesterol: {cholesterol}
- BMI: {bmi}
- Smoker: {smoker}
- Diabetic: {diabetic}
Predicted Risk: {risk}

Provide:
Your Personal Health Report
Hello {name}, this report explains your recent vital signs and what they might mean for your health, with clear information and practical next steps.

{h1}
State the overall risk level in plain words (for example \"Moderate Risk\" or \"High Risk\") and explain which of the vitals above drive it and why they matter.

{h2}
Describe the condition this pattern of vitals is most commonly associated with. Make clear this is an assessment based on the numbers, not a formal diagnosis.

{h3}
List concrete actions as bullet points, one per line, each starting with \"- \": a follow-up appointment, home monitoring where useful, and lifestyle changes (diet, activity, stress, smoking).

Close with a short encouraging note.",
        gender = record.gender,
        age = show_number(record.age),
        systolic = show_number(record.systolic_bp),
        diastolic = show_number(record.diastolic_bp),
        cholesterol = show_number(record.cholesterol),
        bmi = show_number(record.bmi),
        smoker = yes_no(record.smoker),
        diabetic = yes_no(record.diabetic),
        risk = risk,
        name = record.name,
        h1 = REPORT_HEADINGS[0],
        h2 = REPORT_HEADINGS[1],
        h3 = REPORT_HEADINGS[2],
    )
}

fn show_number(value: Option<f64>) -> String {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{}", v as i64),
        Some(v) => v.to_string(),
        None => "not provided".to_string(),
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PatientRecord {
        PatientRecord {
            name: "Tomás".into(),
            gender: "male".into(),
            age: Some(58.0),
            systolic_bp: Some(150.0),
            diastolic_bp: Some(95.0),
            cholesterol: Some(240.5),
            bmi: None,
            smoker: true,
            diabetic: false,
            email: "tomas@example.com".into(),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn question_lists_vitals_and_risk() {
        let q = build_patient_question(&record(), RiskLabel::Bad);
        assert!(q.contains("- Gender: male"));
        assert!(q.contains("- Age: 58\n"));
        assert!(q.contains("- BP: 150/95"));
        assert!(q.contains("- Cholesterol: 240.5"));
        assert!(q.contains("- BMI: not provided"));
        assert!(q.contains("- Smoker: Yes"));
        assert!(q.contains("- Diabetic: No"));
        assert!(q.contains("Predicted Risk: Bad"));
        assert!(q.contains("Hello Tomás"));
    }

    #[test]
    fn question_contains_headings_in_order() {
        let q = build_patient_question(&record(), RiskLabel::Fair);
        let positions: Vec<usize> = REPORT_HEADINGS
            .iter()
            .map(|h| q.find(h).expect("heading present"))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn system_prompt_stuffs_passages() {
        let passages = vec![
            ScoredPassage {
                source: "a".into(),
                content: " First passage. ".into(),
                score: 0.9,
            },
            ScoredPassage {
                source: "b".into(),
                content: "Second passage.".into(),
                score: 0.5,
            },
        ];
        let system = build_system_prompt(&passages);
        assert!(system.starts_with(STUFF_SYSTEM_PROMPT));
        assert!(system.ends_with("First passage.\n\nSecond passage."));
    }
}
