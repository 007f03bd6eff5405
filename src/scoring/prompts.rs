//! Prompt templates

use crate::model::Axis;

fn axis_instruction(axis: Axis) -> &'static str {
    match axis {
        Axis::Reflection => {
            "the mood of the user, with 1 being very negative and 10 being very positive"
        }
        Axis::Stress => "the stress of the user, with 1 being no stress and 10 being highly stressed",
        Axis::Anxiety => {
            "the anxiety of the user, with 1 being no anxiety and 10 being highly anxious"
        }
    }
}

pub fn score_prompt(axis: Axis, text: &str) -> String {
    format!(
        "Based on the following journal entry, generate a score between 1 and 10 for {}. \
         The output should just be a number and there should not be any text.\n\n\
         Journal Entry:\n{}",
        axis_instruction(axis),
        text
    )
}

/// Re-ask after a reply that did not parse
pub fn clarify_prompt(axis: Axis, text: &str, bad_reply: &str) -> String {
    format!(
        "{}\n\nYour previous answer was {:?}, which is not a single whole number. \
         Reply with one integer from 1 to 10 and nothing else.",
        score_prompt(axis, text),
        bad_reply
    )
}

pub fn report_prompt(text: &str) -> String {
    format!(
        "You are an insightful and empathetic mental wellness coach. The user has provided a \
journal entry describing their thoughts, feelings, and experiences. Your task is to analyze \
the entry and provide meaningful suggestions or thoughtful remarks that can help the user \
reflect, improve their mindset, or take positive actions. Focus on emotional well-being, \
personal growth, and mental clarity. Keep it short and in bullets.

Journal Entry:
{}

Output Format:
Summary of Emotions: (e.g., Positive, Anxious, Reflective, etc.)
Key Themes Identified: (e.g., Stress at work, Relationship concerns, etc.)
Actionable Suggestions: (Provide 2-3 helpful suggestions or reflections.)",
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_prompts_differ_per_axis() {
        let prompts: Vec<String> = Axis::ALL.iter().map(|a| score_prompt(*a, "hi")).collect();
        assert_ne!(prompts[0], prompts[1]);
        assert_ne!(prompts[1], prompts[2]);
        assert!(prompts.iter().all(|p| p.contains("between 1 and 10") && p.ends_with("hi")));
    }

    #[test]
    fn test_report_prompt_sections() {
        let p = report_prompt("slept badly");
        assert!(p.contains("slept badly"));
        for section in ["Summary of Emotions", "Key Themes Identified", "Actionable Suggestions"] {
            assert!(p.contains(section));
        }
    }
}
