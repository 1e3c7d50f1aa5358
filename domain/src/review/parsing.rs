//! Response parsing for structured code reviews.
//!
//! Model output is free-form text that is *supposed* to follow the review
//! protocol: a sequence of `### <heading>` blocks with labeled fields,
//! separated by `---` rules. These functions scan that text line by line and
//! never fail; malformed or missing pieces degrade to conservative defaults.
//!
//! # Functions
//!
//! | Function | Block | Fallback |
//! |----------|-------|----------|
//! | [`parse_review_response`] | `### <change_id>` | no changes, gate CONCERN |
//! | [`parse_self_review`] | `### SELF_REVIEW` | `None` |
//! | [`parse_feature_requests`] | `### FEATURE_REQUESTS` | empty list |
//! | [`parse_observation_requests`] | `### OBSERVATIONS` | empty list |

use super::entities::{ChangeVerdict, ModelReview, SelfReview};
use super::verdict::{Confidence, Correctness, Integration, SpecCompliance, TestCoverage, Verdict};
use crate::observation::request::ObservationRequest;
use std::collections::BTreeMap;

/// Parse a VERDICT value. Anything unrecognized is a CONCERN, never a PASS.
pub fn parse_verdict(text: &str) -> Verdict {
    text.parse().unwrap_or(Verdict::Concern)
}

/// Parse a CORRECTNESS value; unrecognized text means "not assessed".
pub fn parse_correctness(text: &str) -> Option<Correctness> {
    text.parse().ok()
}

/// Parse a SPEC_COMPLIANCE value (`N/A` and `NA` are both accepted).
pub fn parse_spec_compliance(text: &str) -> Option<SpecCompliance> {
    text.parse().ok()
}

pub fn parse_test_coverage(text: &str) -> Option<TestCoverage> {
    text.parse().ok()
}

pub fn parse_integration(text: &str) -> Option<Integration> {
    text.parse().ok()
}

/// Parse a CONFIDENCE value, defaulting to MEDIUM.
pub fn parse_confidence(text: &str) -> Confidence {
    text.parse().unwrap_or(Confidence::Medium)
}

// ==================== Line scanning ====================

/// A line that ends the free-text value of the current field.
fn is_terminator(line: &str) -> bool {
    let t = line.trim_start();
    t.starts_with("---") || t.starts_with("##")
}

/// `### <id>` heading; returns the trimmed id.
///
/// `####` and deeper headings are not change headings.
fn change_heading(line: &str) -> Option<&str> {
    let rest = line.trim_start().strip_prefix("###")?;
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let id = rest.trim();
    (!id.is_empty()).then_some(id)
}

/// `###<ws>*NAME<ws>*`, case-insensitive.
fn is_section_heading(line: &str, name: &str) -> bool {
    line.trim_start()
        .strip_prefix("###")
        .map(|rest| rest.trim().eq_ignore_ascii_case(name))
        .unwrap_or(false)
}

/// `LABEL: value`, label matched case-insensitively. Returns the trimmed value.
fn labeled_field<'a>(line: &'a str, label: &str) -> Option<&'a str> {
    let t = line.trim_start();
    let head = t.get(..label.len())?;
    if !head.eq_ignore_ascii_case(label) {
        return None;
    }
    let value = t[label.len()..].trim_start().strip_prefix(':')?;
    Some(value.trim())
}

/// Index of the first non-blank line at or after `from`.
fn skip_blank(lines: &[&str], from: usize) -> usize {
    let mut i = from;
    while i < lines.len() && lines[i].trim().is_empty() {
        i += 1;
    }
    i
}

/// Free text starting with `first` and continuing until a terminator.
///
/// Returns the trimmed text and the index of the line after it.
fn free_text(first: &str, lines: &[&str], from: usize) -> (String, usize) {
    let mut text = String::from(first);
    let mut i = from;
    while i < lines.len() && !is_terminator(lines[i]) {
        text.push('\n');
        text.push_str(lines[i]);
        i += 1;
    }
    (text.trim().to_string(), i)
}

/// Try to read one change block whose heading sits at `lines[start]`.
///
/// Fields must appear in protocol order; VERDICT and REASONING are required.
/// Returns the verdict and the index of the first line after the block.
fn parse_change_block(id: &str, lines: &[&str], start: usize) -> Option<(ChangeVerdict, usize)> {
    let mut i = skip_blank(lines, start + 1);

    let verdict = parse_verdict(labeled_field(lines.get(i)?, "VERDICT")?);
    i += 1;

    let mut change = ChangeVerdict::new(id, verdict, String::new());

    if let Some(value) = lines.get(i).and_then(|l| labeled_field(l, "CORRECTNESS")) {
        change.correctness = parse_correctness(value);
        i += 1;
    }
    if let Some(value) = lines.get(i).and_then(|l| labeled_field(l, "SPEC_COMPLIANCE")) {
        change.spec_compliance = parse_spec_compliance(value);
        i += 1;
    }
    if let Some(value) = lines.get(i).and_then(|l| labeled_field(l, "TEST_COVERAGE")) {
        change.test_coverage = parse_test_coverage(value);
        i += 1;
    }
    if let Some(value) = lines.get(i).and_then(|l| labeled_field(l, "INTEGRATION")) {
        change.integration = parse_integration(value);
        i += 1;
    }

    let first = labeled_field(lines.get(i)?, "REASONING")?;
    let (reasoning, end) = free_text(first, lines, i + 1);
    change.reasoning = reasoning;

    Some((change, end))
}

/// Extract every well-formed change block, in order of appearance.
pub fn parse_changes(response: &str) -> Vec<ChangeVerdict> {
    let lines: Vec<&str> = response.lines().collect();
    let mut changes = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if let Some(id) = change_heading(lines[i])
            && let Some((change, end)) = parse_change_block(id, &lines, i)
        {
            changes.push(change);
            i = end;
            continue;
        }
        i += 1;
    }

    changes
}

/// Index of the first line after the `### NAME` heading, if present.
fn find_section(lines: &[&str], name: &str) -> Option<usize> {
    lines
        .iter()
        .position(|l| is_section_heading(l, name))
        .map(|i| i + 1)
}

/// Parse the `### SELF_REVIEW` block.
///
/// Requires a CONFIDENCE field; LIMITATIONS is the free text after it.
pub fn parse_self_review(response: &str) -> Option<SelfReview> {
    let lines: Vec<&str> = response.lines().collect();
    let mut i = skip_blank(&lines, find_section(&lines, "SELF_REVIEW")?);

    let confidence = parse_confidence(labeled_field(lines.get(i)?, "CONFIDENCE")?);
    i += 1;

    let limitations = match lines.get(i).and_then(|l| labeled_field(l, "LIMITATIONS")) {
        Some(first) => free_text(first, &lines, i + 1).0,
        None => String::new(),
    };

    Some(SelfReview {
        confidence,
        limitations,
    })
}

/// Parse the bullet list of the `### FEATURE_REQUESTS` block.
pub fn parse_feature_requests(response: &str) -> Vec<String> {
    let lines: Vec<&str> = response.lines().collect();
    let Some(start) = find_section(&lines, "FEATURE_REQUESTS") else {
        return Vec::new();
    };

    lines[start..]
        .iter()
        .take_while(|l| !is_terminator(l))
        .filter_map(|l| {
            let t = l.trim();
            t.strip_prefix("- ")
                .or_else(|| t.strip_prefix("* "))
                .map(|item| item.trim().to_string())
        })
        .filter(|item| !item.is_empty())
        .collect()
}

/// Parse the fenced JSON array of the `### OBSERVATIONS` block.
///
/// Missing fence, invalid JSON or a non-array value all yield an empty list.
/// Array entries that are not JSON objects are ignored.
pub fn parse_observation_requests(response: &str) -> Vec<ObservationRequest> {
    let lines: Vec<&str> = response.lines().collect();
    let Some(start) = find_section(&lines, "OBSERVATIONS") else {
        return Vec::new();
    };

    let open = skip_blank(&lines, start);
    match lines.get(open) {
        Some(l) if l.trim().eq_ignore_ascii_case("```json") => {}
        _ => return Vec::new(),
    }

    let body: Vec<&str> = lines[open + 1..]
        .iter()
        .take_while(|l| l.trim() != "```")
        .copied()
        .collect();
    // An unterminated fence is not a complete block
    if open + 1 + body.len() >= lines.len() {
        return Vec::new();
    }

    match serde_json::from_str::<serde_json::Value>(&body.join("\n")) {
        Ok(serde_json::Value::Array(items)) => items
            .iter()
            .filter_map(ObservationRequest::from_value)
            .collect(),
        _ => Vec::new(),
    }
}

/// Parse a raw model response into a [`ModelReview`].
///
/// Never fails: a response with no parseable change blocks yields an empty
/// change list and a CONCERN gate.
pub fn parse_review_response(model: &str, response: &str) -> ModelReview {
    let changes = parse_changes(response);
    let gate = ModelReview::derive_gate(&changes);

    ModelReview {
        model: model.to_string(),
        gate,
        changes,
        raw_response: response.to_string(),
        self_review: parse_self_review(response),
        feature_requests: parse_feature_requests(response),
        observations: BTreeMap::new(),
        failed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_RESPONSE: &str = "\
## Review

### src/client.py:fetch
VERDICT: CONCERN
CORRECTNESS: QUESTIONABLE
SPEC_COMPLIANCE: N/A
TEST_COVERAGE: PARTIAL
INTEGRATION: WIRED
REASONING: The retry loop swallows TransportError.
1. Timeouts are retried forever
2. No backoff
---

### src/server.py
VERDICT: PASS
REASONING: Straightforward refactor.
---

### SELF_REVIEW
CONFIDENCE: HIGH
LIMITATIONS: Did not run the tests.
---

### FEATURE_REQUESTS
- Show call sites of changed functions
* Include coverage data
not a bullet
";

    // ==================== Field parsers ====================

    #[test]
    fn test_parse_verdict_defaults_to_concern() {
        assert_eq!(parse_verdict("PASS"), Verdict::Pass);
        assert_eq!(parse_verdict(" block "), Verdict::Block);
        assert_eq!(parse_verdict("APPROVED"), Verdict::Concern);
        assert_eq!(parse_verdict(""), Verdict::Concern);
    }

    #[test]
    fn test_secondary_axes_unknown_is_none() {
        assert_eq!(parse_correctness("valid"), Some(Correctness::Valid));
        assert_eq!(parse_correctness("mostly fine"), None);
        assert_eq!(parse_spec_compliance("NA"), Some(SpecCompliance::NotApplicable));
        assert_eq!(parse_spec_compliance("N/A"), Some(SpecCompliance::NotApplicable));
        assert_eq!(parse_test_coverage("none"), None);
        assert_eq!(parse_integration("missing"), Some(Integration::Missing));
    }

    #[test]
    fn test_parse_confidence_defaults_to_medium() {
        assert_eq!(parse_confidence("low"), Confidence::Low);
        assert_eq!(parse_confidence("very high"), Confidence::Medium);
    }

    // ==================== Change blocks ====================

    #[test]
    fn test_parse_full_response() {
        let review = parse_review_response("claude", FULL_RESPONSE);

        assert_eq!(review.model, "claude");
        assert_eq!(review.changes.len(), 2);
        assert_eq!(review.gate, Verdict::Concern);

        let first = &review.changes[0];
        assert_eq!(first.change_id, "src/client.py:fetch");
        assert_eq!(first.verdict, Verdict::Concern);
        assert_eq!(first.correctness, Some(Correctness::Questionable));
        assert_eq!(first.spec_compliance, Some(SpecCompliance::NotApplicable));
        assert_eq!(first.test_coverage, Some(TestCoverage::Partial));
        assert_eq!(first.integration, Some(Integration::Wired));
        assert!(first.reasoning.starts_with("The retry loop"));
        assert!(first.reasoning.contains("1. Timeouts are retried forever"));
        assert!(first.reasoning.ends_with("2. No backoff"));

        let second = &review.changes[1];
        assert_eq!(second.change_id, "src/server.py");
        assert_eq!(second.verdict, Verdict::Pass);
        assert_eq!(second.correctness, None);
        assert_eq!(second.reasoning, "Straightforward refactor.");

        assert_eq!(review.raw_response, FULL_RESPONSE);
    }

    #[test]
    fn test_optional_fields_independently_absent() {
        let text = "### a.py\nVERDICT: PASS\nTEST_COVERAGE: COVERED\nREASONING: ok\n";
        let changes = parse_changes(text);

        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].correctness, None);
        assert_eq!(changes[0].spec_compliance, None);
        assert_eq!(changes[0].test_coverage, Some(TestCoverage::Covered));
        assert_eq!(changes[0].integration, None);
    }

    #[test]
    fn test_labels_are_case_insensitive() {
        let text = "### a.py\nverdict: block\nReasoning: broken\n";
        let changes = parse_changes(text);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].verdict, Verdict::Block);
    }

    #[test]
    fn test_unknown_verdict_value_is_concern() {
        let text = "### a.py\nVERDICT: LGTM\nREASONING: looks good to me\n";
        let review = parse_review_response("m", text);
        assert_eq!(review.changes[0].verdict, Verdict::Concern);
        assert_eq!(review.gate, Verdict::Concern);
    }

    #[test]
    fn test_block_without_verdict_is_skipped() {
        let text = "### a.py\nREASONING: no verdict here\n---\n### b.py\nVERDICT: PASS\nREASONING: fine\n";
        let changes = parse_changes(text);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_id, "b.py");
    }

    #[test]
    fn test_block_without_reasoning_is_skipped() {
        let text = "### a.py\nVERDICT: BLOCK\n---\n";
        assert!(parse_changes(text).is_empty());
    }

    #[test]
    fn test_reasoning_stops_at_next_heading() {
        let text = "### a.py\nVERDICT: PASS\nREASONING: first\n### b.py\nVERDICT: BLOCK\nREASONING: second";
        let changes = parse_changes(text);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].reasoning, "first");
        assert_eq!(changes[1].reasoning, "second");
    }

    #[test]
    fn test_deeper_heading_is_not_a_change() {
        let text = "#### a.py\nVERDICT: BLOCK\nREASONING: nested\n";
        assert!(parse_changes(text).is_empty());
    }

    #[test]
    fn test_empty_response_gate_is_concern() {
        for text in ["", "   \n\t\n"] {
            let review = parse_review_response("m", text);
            assert!(review.changes.is_empty());
            assert_eq!(review.gate, Verdict::Concern);
            assert!(review.self_review.is_none());
            assert!(review.feature_requests.is_empty());
        }
    }

    #[test]
    fn test_block_anywhere_gates_block() {
        let text = "### a.py\nVERDICT: PASS\nREASONING: ok\n---\n### b.py\nVERDICT: BLOCK\nREASONING: bad\n---\n### c.py\nVERDICT: PASS\nREASONING: ok\n";
        assert_eq!(parse_review_response("m", text).gate, Verdict::Block);
    }

    #[test]
    fn test_change_named_error_is_not_a_failed_invocation() {
        let text = "### ERROR\nVERDICT: BLOCK\nREASONING: Swallows the exception.\n---\n";
        let review = parse_review_response("m", text);

        assert_eq!(review.changes.len(), 1);
        assert_eq!(review.changes[0].change_id, "ERROR");
        assert_eq!(review.gate, Verdict::Block);
        assert!(!review.is_failure());
        assert!(ModelReview::failed("m", "crashed").is_failure());
    }

    #[test]
    fn test_parsing_is_idempotent() {
        let a = parse_review_response("m", FULL_RESPONSE);
        let b = parse_review_response("m", FULL_RESPONSE);
        assert_eq!(a, b);
    }

    // ==================== Self review / feature requests ====================

    #[test]
    fn test_parse_self_review() {
        let sr = parse_self_review(FULL_RESPONSE).unwrap();
        assert_eq!(sr.confidence, Confidence::High);
        assert_eq!(sr.limitations, "Did not run the tests.");
    }

    #[test]
    fn test_self_review_unknown_confidence_is_medium() {
        let text = "### SELF_REVIEW\nCONFIDENCE: somewhat\nLIMITATIONS: none\n";
        let sr = parse_self_review(text).unwrap();
        assert_eq!(sr.confidence, Confidence::Medium);
        assert_eq!(sr.limitations, "none");
    }

    #[test]
    fn test_self_review_absent() {
        assert!(parse_self_review("### a.py\nVERDICT: PASS\nREASONING: ok\n").is_none());
    }

    #[test]
    fn test_parse_feature_requests() {
        let requests = parse_feature_requests(FULL_RESPONSE);
        assert_eq!(
            requests,
            vec![
                "Show call sites of changed functions".to_string(),
                "Include coverage data".to_string()
            ]
        );
    }

    #[test]
    fn test_feature_requests_stop_at_rule() {
        let text = "### FEATURE_REQUESTS\n- one\n---\n- not part of the block\n";
        assert_eq!(parse_feature_requests(text), vec!["one".to_string()]);
        assert!(parse_feature_requests("### FEATURE_REQUESTS\nnothing\n").is_empty());
    }

    // ==================== Observation requests ====================

    #[test]
    fn test_parse_observation_requests() {
        let text = "\
### OBSERVATIONS
```json
[
  {\"name\": \"errs\", \"tool\": \"exception_hierarchy\", \"params\": {\"class_name\": \"ValueError\"}},
  {\"tool\": \"project_dependencies\"}
]
```
";
        let requests = parse_observation_requests(text);
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].name, "errs");
        assert_eq!(requests[0].tool.as_deref(), Some("exception_hierarchy"));
        assert_eq!(requests[0].params["class_name"], "ValueError");
        assert_eq!(requests[1].name, "unnamed");
        assert!(requests[1].params.is_empty());
    }

    #[test]
    fn test_observation_requests_degrade_to_empty() {
        // no block
        assert!(parse_observation_requests("### a.py\nVERDICT: PASS\nREASONING: ok").is_empty());
        // no fence
        assert!(parse_observation_requests("### OBSERVATIONS\n[{\"tool\": \"x\"}]\n").is_empty());
        // broken json
        assert!(parse_observation_requests("### OBSERVATIONS\n```json\n[{\"tool\": \n```\n").is_empty());
        // not an array
        assert!(parse_observation_requests("### OBSERVATIONS\n```json\n{\"tool\": \"x\"}\n```\n").is_empty());
        // unterminated fence
        assert!(parse_observation_requests("### OBSERVATIONS\n```json\n[]").is_empty());
    }

    #[test]
    fn test_observations_block_is_not_a_change() {
        let text = "### OBSERVATIONS\n```json\n[]\n```\n";
        let review = parse_review_response("m", text);
        assert!(review.changes.is_empty());
        assert!(review.observations.is_empty());
    }
}
