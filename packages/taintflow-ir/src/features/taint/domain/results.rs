//! Analysis results

use serde::{Deserialize, Serialize};

use super::finding::Finding;
use crate::config::Direction;
use crate::features::call_graph::domain::CallSiteRef;

/// Everything one analysis run produced
///
/// `incomplete_seeds` lists seeds whose propagation hit a budget and was cut
/// short: their absence of findings is not a proof of safety. A non-zero
/// `unresolved_call_count` means some callees were treated as conservative
/// black boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaintAnalysisResults {
    pub specification: String,
    pub direction: Direction,
    pub findings: Vec<Finding>,
    /// Source call sites seeded (forward) or sink operands seeded (backward)
    pub seeds: usize,
    /// Seeds whose propagation exceeded a budget
    pub incomplete_seeds: Vec<CallSiteRef>,
    /// Call sites whose callee resolved to no group function
    pub unresolved_call_count: usize,
    /// Total facts processed across all seeds
    pub facts_processed: usize,
}

impl TaintAnalysisResults {
    pub fn is_empty(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.findings.len()
    }

    /// Results are complete: no seed was cut short
    pub fn is_complete(&self) -> bool {
        self.incomplete_seeds.is_empty()
    }
}

impl std::fmt::Display for TaintAnalysisResults {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "specification `{}` ({:?}): {} finding(s) from {} seed(s)",
            self.specification,
            self.direction,
            self.findings.len(),
            self.seeds
        )?;
        for finding in &self.findings {
            writeln!(f, "  {}", finding)?;
        }
        if !self.incomplete_seeds.is_empty() {
            writeln!(
                f,
                "  incomplete: {} seed(s) exceeded the budget",
                self.incomplete_seeds.len()
            )?;
        }
        if self.unresolved_call_count > 0 {
            writeln!(
                f,
                "  {} call site(s) treated as unresolved black boxes",
                self.unresolved_call_count
            )?;
        }
        Ok(())
    }
}
