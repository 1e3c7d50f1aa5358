//! Verdict vocabulary shared by every layer.
//!
//! Each enumeration round-trips through its uppercase wire label
//! (`"PASS"`, `"N/A"`, ...) so that the text protocol spoken by the
//! models, the JSON report and the Rust types all agree.

use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Normalize a raw label: trim surrounding whitespace and uppercase it.
fn normalize(s: &str) -> String {
    s.trim().to_uppercase()
}

fn invalid(kind: &'static str, value: &str) -> DomainError {
    DomainError::InvalidLabel {
        kind,
        value: value.to_string(),
    }
}

/// Overall verdict for a change or a whole review.
///
/// Ordered by severity, so `max()` over a set of verdicts yields the gate:
///
/// ```
/// use codequorum_domain::Verdict;
///
/// assert!(Verdict::Pass < Verdict::Concern);
/// assert!(Verdict::Concern < Verdict::Block);
/// assert_eq!("block".parse::<Verdict>().unwrap(), Verdict::Block);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Pass,
    Concern,
    Block,
}

impl Verdict {
    pub const ALL: [Verdict; 3] = [Verdict::Pass, Verdict::Concern, Verdict::Block];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Pass => "PASS",
            Verdict::Concern => "CONCERN",
            Verdict::Block => "BLOCK",
        }
    }

    /// Process exit code used by the `gate` command.
    pub fn exit_code(&self) -> i32 {
        match self {
            Verdict::Pass => 0,
            Verdict::Concern => 1,
            Verdict::Block => 2,
        }
    }

    /// Bracketed badge for reports, e.g. `[BLOCK]`.
    pub fn badge(&self) -> String {
        format!("[{}]", self.as_str())
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Verdict {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "PASS" => Ok(Verdict::Pass),
            "CONCERN" => Ok(Verdict::Concern),
            "BLOCK" => Ok(Verdict::Block),
            _ => Err(invalid("verdict", s)),
        }
    }
}

/// Assessment of whether the code does what it claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Correctness {
    Valid,
    Questionable,
    Broken,
}

impl Correctness {
    pub const ALL: [Correctness; 3] = [
        Correctness::Valid,
        Correctness::Questionable,
        Correctness::Broken,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Correctness::Valid => "VALID",
            Correctness::Questionable => "QUESTIONABLE",
            Correctness::Broken => "BROKEN",
        }
    }
}

impl fmt::Display for Correctness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Correctness {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "VALID" => Ok(Correctness::Valid),
            "QUESTIONABLE" => Ok(Correctness::Questionable),
            "BROKEN" => Ok(Correctness::Broken),
            _ => Err(invalid("correctness", s)),
        }
    }
}

/// Assessment against the MUST requirements of a specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpecCompliance {
    #[serde(rename = "MEETS")]
    Meets,
    #[serde(rename = "PARTIAL")]
    Partial,
    #[serde(rename = "VIOLATES")]
    Violates,
    #[serde(rename = "N/A", alias = "NA")]
    NotApplicable,
}

impl SpecCompliance {
    pub const ALL: [SpecCompliance; 4] = [
        SpecCompliance::Meets,
        SpecCompliance::Partial,
        SpecCompliance::Violates,
        SpecCompliance::NotApplicable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpecCompliance::Meets => "MEETS",
            SpecCompliance::Partial => "PARTIAL",
            SpecCompliance::Violates => "VIOLATES",
            SpecCompliance::NotApplicable => "N/A",
        }
    }
}

impl fmt::Display for SpecCompliance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpecCompliance {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "MEETS" => Ok(SpecCompliance::Meets),
            "PARTIAL" => Ok(SpecCompliance::Partial),
            "VIOLATES" => Ok(SpecCompliance::Violates),
            "N/A" | "NA" => Ok(SpecCompliance::NotApplicable),
            _ => Err(invalid("spec compliance", s)),
        }
    }
}

/// Whether the changed code is exercised by tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestCoverage {
    Covered,
    Partial,
    Untested,
}

impl TestCoverage {
    pub const ALL: [TestCoverage; 3] = [
        TestCoverage::Covered,
        TestCoverage::Partial,
        TestCoverage::Untested,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TestCoverage::Covered => "COVERED",
            TestCoverage::Partial => "PARTIAL",
            TestCoverage::Untested => "UNTESTED",
        }
    }
}

impl fmt::Display for TestCoverage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestCoverage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "COVERED" => Ok(TestCoverage::Covered),
            "PARTIAL" => Ok(TestCoverage::Partial),
            "UNTESTED" => Ok(TestCoverage::Untested),
            _ => Err(invalid("test coverage", s)),
        }
    }
}

/// Whether callers were updated and the feature is usable end to end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Integration {
    Wired,
    Partial,
    Missing,
}

impl Integration {
    pub const ALL: [Integration; 3] = [
        Integration::Wired,
        Integration::Partial,
        Integration::Missing,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Integration::Wired => "WIRED",
            Integration::Partial => "PARTIAL",
            Integration::Missing => "MISSING",
        }
    }
}

impl fmt::Display for Integration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Integration {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "WIRED" => Ok(Integration::Wired),
            "PARTIAL" => Ok(Integration::Partial),
            "MISSING" => Ok(Integration::Missing),
            _ => Err(invalid("integration", s)),
        }
    }
}

/// A model's confidence in its own review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    pub const ALL: [Confidence; 3] = [Confidence::High, Confidence::Medium, Confidence::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "HIGH",
            Confidence::Medium => "MEDIUM",
            Confidence::Low => "LOW",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Confidence {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "HIGH" => Ok(Confidence::High),
            "MEDIUM" => Ok(Confidence::Medium),
            "LOW" => Ok(Confidence::Low),
            _ => Err(invalid("confidence", s)),
        }
    }
}
