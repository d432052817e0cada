//! Prompt assembly and checked generation shared by the agents.

use saathi_types::llm::GenerationError;
use tracing::debug;

use crate::llm::BoxTextGenerator;
use crate::retry::RetryPolicy;

/// Join a role description and labelled sections into one prompt.
///
/// Sections are wrapped in XML tags so the model can tell the request
/// fields apart from the instructions.
pub(crate) fn build_prompt(role: &str, fields: &[(&str, String)], instructions: &str) -> String {
    let mut sections = Vec::with_capacity(fields.len() + 2);
    sections.push(format!("<role>\n{}\n</role>", role.trim()));
    for (tag, value) in fields {
        sections.push(format!("<{tag}>{value}</{tag}>"));
    }
    sections.push(format!(
        "<instructions>\n{}\n</instructions>",
        instructions.trim()
    ));
    sections.join("\n\n")
}

/// Generate text for `prompt`, retrying until `accept` holds.
///
/// An unaccepted reply is still returned once attempts run out.
pub(crate) async fn generate_checked<A>(
    generator: &BoxTextGenerator,
    retry: &RetryPolicy,
    prompt: &str,
    accept: A,
) -> Result<String, GenerationError>
where
    A: Fn(&String) -> bool,
{
    let outcome = retry.run(|_| generator.generate(prompt), accept).await;
    if outcome.result.is_ok() && !outcome.accepted {
        debug!(
            generator = generator.name(),
            attempts = outcome.attempts,
            "using reply that failed its quality check"
        );
    }
    outcome.result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedGenerator;

    #[test]
    fn prompt_has_tagged_sections() {
        let prompt = build_prompt(
            "You are a study coach.",
            &[("subjects", "Maths, Physics".to_string())],
            "Keep it short.",
        );
        assert!(prompt.starts_with("<role>\nYou are a study coach.\n</role>"));
        assert!(prompt.contains("<subjects>Maths, Physics</subjects>"));
        assert!(prompt.ends_with("<instructions>\nKeep it short.\n</instructions>"));
    }

    #[tokio::test]
    async fn rejected_reply_is_retried() {
        let generator = BoxTextGenerator::new(ScriptedGenerator::new(
            vec![Ok(String::new())],
            "a real answer",
        ));
        let policy = RetryPolicy::new(
            3,
            saathi_types::config::Backoff::Fixed,
            std::time::Duration::ZERO,
        );
        let text = generate_checked(&generator, &policy, "p", |t| !t.trim().is_empty())
            .await
            .unwrap();
        assert_eq!(text, "a real answer");
    }
}
