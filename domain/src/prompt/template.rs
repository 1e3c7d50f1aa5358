//! Prompt templates for the review flow

use crate::observation::{ObservationResults, TOOLS};

const DIFF_OPEN: &str = "```diff\n";
const SPEC_OPEN: &str = "```markdown\n";
const FENCE_CLOSE: &str = "\n```";
const CODE_CHANGES_HEADING: &str = "## Code Changes";

const REVIEW_INTRO: &str = "You are a senior code reviewer. Review the following code changes.";

const REVIEW_INSTRUCTIONS: &str = r#"## Instructions

For each significant change (new file, modified function, etc.), provide a structured verdict.

Use this exact format for each change:

### <file_path or file_path:function_name>
VERDICT: PASS | CONCERN | BLOCK
CORRECTNESS: VALID | QUESTIONABLE | BROKEN
SPEC_COMPLIANCE: MEETS | PARTIAL | VIOLATES | N/A
TEST_COVERAGE: COVERED | PARTIAL | UNTESTED
INTEGRATION: WIRED | PARTIAL | MISSING
REASONING: <brief explanation of your assessment>
---

## Review Criteria

1. **CORRECTNESS**: Does the code do what it claims? Is the logic sound?
   - VALID: Logic is correct, no bugs apparent
   - QUESTIONABLE: Logic may have edge cases or unclear behavior
   - BROKEN: Clear bugs or incorrect behavior

2. **SPEC_COMPLIANCE**: Does it meet MUST requirements from the specification?
   - MEETS: All relevant requirements satisfied
   - PARTIAL: Some requirements met, others missing or incomplete
   - VIOLATES: Contradicts the requirements
   - N/A: No specification provided or not applicable

3. **TEST_COVERAGE**: Are there tests for the new/changed code?
   - COVERED: Tests exist and cover the changes
   - PARTIAL: Some tests exist but coverage is incomplete
   - UNTESTED: No tests for the changes

4. **INTEGRATION**: Are callers updated? Is the feature usable end-to-end?
   - WIRED: Feature is fully integrated and usable
   - PARTIAL: Interface exists but callers not updated, or integration incomplete
   - MISSING: No integration with existing code

## Verdict Guidelines

- **BLOCK**: Security issues, broken functionality, requirement violations, or missing critical integration
- **CONCERN**: Missing tests, partial integration, questionable patterns, or unclear logic
- **PASS**: Correct, tested, well-integrated code

## Important

- Focus on actual issues, not style preferences
- If a method signature is added but callers aren't updated, that's PARTIAL integration
- Be specific in reasoning - reference line numbers or function names
- When in doubt, use CONCERN rather than PASS"#;

const SELF_REVIEW_INSTRUCTIONS: &str = r#"## Self-Review

After completing your review, add a brief self-assessment:

### SELF_REVIEW
CONFIDENCE: HIGH | MEDIUM | LOW
LIMITATIONS: <what context were you missing that affected review quality?>
---

## Feature Requests

If this review tool could be improved to help you do a better job, suggest features:

### FEATURE_REQUESTS
- <suggestion 1>
- <suggestion 2>
---

Only include this section if you have specific suggestions. Skip if none."#;

const OBSERVATION_INSTRUCTIONS: &str = r#"## Observations

If you cannot render a confident verdict without more context, you may instead
request observations. Output this block and nothing else; you will be called
again with the results:

### OBSERVATIONS
```json
[{"name": "descriptive_name", "tool": "tool_name", "params": {"param": "value"}}]
```

Paths are relative to the repository root."#;

const SPEC_CHECK_INSTRUCTIONS: &str = r#"## Instructions

Check each MUST requirement in the specification. For each requirement, determine if the code:
1. **MEETS** - Code satisfies the requirement
2. **PARTIAL** - Code partially addresses the requirement
3. **VIOLATES** - Code contradicts or ignores the requirement
4. **UNTESTED** - Requirement exists but no test coverage

Use this exact format for each requirement:

### MUST: <requirement text>
STATUS: MEETS | PARTIAL | VIOLATES | UNTESTED
EVIDENCE: <specific code reference or explanation>
---

## Summary

After reviewing all requirements, provide:

OVERALL: COMPLIANT | NON_COMPLIANT | PARTIAL
MISSING: <list any MUST requirements not addressed>
CONCERNS: <any implementation concerns>"#;

/// Templates for generating prompts at each stage
pub struct PromptTemplate;

impl PromptTemplate {
    /// Markdown table of the observation tools.
    pub fn tool_table() -> String {
        let mut table = String::from(
            "| Tool | Params | Purpose | When to use |\n|------|--------|---------|-------------|\n",
        );
        for tool in TOOLS.iter() {
            table.push_str(&format!(
                "| `{}` | {} | {} | {} |\n",
                tool.name, tool.params, tool.purpose, tool.when_to_use
            ));
        }
        table
    }

    fn diff_section(diff: &str) -> String {
        format!("{}\n\n{}{}{}", CODE_CHANGES_HEADING, DIFF_OPEN, diff, FENCE_CLOSE)
    }

    fn spec_section(spec: Option<&str>) -> String {
        match spec {
            Some(spec) => format!(
                "## Specification\n\nReview the code against this specification. \
                 Flag any MUST requirements that are not met.\n\n{}{}{}",
                SPEC_OPEN, spec, FENCE_CLOSE
            ),
            None => "## Specification\n\nNo specification provided. \
                     Focus on correctness, tests, and integration."
                .to_string(),
        }
    }

    fn observation_results_section(observations: &ObservationResults) -> String {
        let mut section = String::from(
            "## Observation Results\n\n\
             These observations were gathered from the repository at your request. \
             Use them to render your verdicts.\n",
        );
        for (name, result) in observations {
            let pretty =
                serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string());
            section.push_str(&format!("\n### {}\n```json\n{}\n```\n", name, pretty));
        }
        section
    }

    /// The structured review prompt.
    ///
    /// Observation results, when present, are placed after the diff.
    pub fn review_prompt(
        diff: &str,
        spec: Option<&str>,
        observations: Option<&ObservationResults>,
    ) -> String {
        let mut prompt = format!(
            "{}\n\n{}\n\n{}\n\n",
            REVIEW_INTRO,
            Self::spec_section(spec),
            Self::diff_section(diff)
        );

        if let Some(observations) = observations
            && !observations.is_empty()
        {
            prompt.push_str(&Self::observation_results_section(observations));
            prompt.push('\n');
        }

        prompt.push_str(REVIEW_INSTRUCTIONS);
        prompt.push_str("\n\n");
        prompt.push_str(OBSERVATION_INSTRUCTIONS);
        prompt.push_str("\n\nAvailable tools:\n\n");
        prompt.push_str(&Self::tool_table());
        prompt.push('\n');
        prompt.push_str(SELF_REVIEW_INSTRUCTIONS);
        prompt.push('\n');
        prompt
    }

    /// Requirement-by-requirement specification compliance prompt.
    pub fn spec_check_prompt(diff: &str, spec: &str) -> String {
        format!(
            "You are a specification compliance checker. \
             Review the code changes against the specification.\n\n\
             ## Specification\n\n{}{}{}\n\n{}\n\n{}\n",
            SPEC_OPEN,
            spec,
            FENCE_CLOSE,
            Self::diff_section(diff),
            SPEC_CHECK_INSTRUCTIONS
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const DIFF: &str = "diff --git a/app.py b/app.py\n+++ b/app.py\n@@ -1 +1 @@\n-x = 1\n+x = 2";

    #[test]
    fn test_review_prompt_contains_protocol() {
        let prompt = PromptTemplate::review_prompt(DIFF, None, None);
        assert!(prompt.contains("VERDICT: PASS | CONCERN | BLOCK"));
        assert!(prompt.contains("### SELF_REVIEW"));
        assert!(prompt.contains("### FEATURE_REQUESTS"));
        assert!(prompt.contains("### OBSERVATIONS"));
        assert!(prompt.contains("No specification provided"));
        assert!(prompt.contains("`raises_analysis`"));
        assert!(!prompt.contains("## Observation Results"));
    }

    #[test]
    fn test_review_prompt_with_observations() {
        let mut obs = ObservationResults::new();
        obs.insert("deps".to_string(), json!({"dependencies": ["httpx"]}));
        let prompt = PromptTemplate::review_prompt(DIFF, Some("MUST retry"), Some(&obs));

        assert!(prompt.contains("## Observation Results"));
        assert!(prompt.contains("### deps"));
        assert!(prompt.contains("\"httpx\""));
        assert!(prompt.contains("MUST retry"));
    }

    #[test]
    fn test_review_prompt_keeps_diff_and_spec_verbatim() {
        let spec = "# Spec\n\n## Code Changes\n\n```diff\n-old\n+new\n```\n\nMUST log errors";
        let prompt = PromptTemplate::review_prompt(DIFF, Some(spec), None);
        assert!(prompt.contains(&format!("```markdown\n{}\n```", spec)));
        assert!(prompt.contains(&format!("## Code Changes\n\n```diff\n{}\n```", DIFF)));
    }

    #[test]
    fn test_spec_check_prompt() {
        let prompt = PromptTemplate::spec_check_prompt(DIFF, "MUST be fast");
        assert!(prompt.contains("MUST be fast"));
        assert!(prompt.contains("STATUS: MEETS | PARTIAL | VIOLATES | UNTESTED"));
        assert!(prompt.contains(DIFF));
    }

    #[test]
    fn test_review_prompt_lists_every_tool() {
        let prompt = PromptTemplate::review_prompt(DIFF, None, None);
        for tool in TOOLS.iter() {
            assert!(prompt.contains(tool.name));
        }
    }
}
