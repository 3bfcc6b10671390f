//! Performance / efficiency core split estimation.
//!
//! Operating systems rarely expose the hybrid topology directly, so the split
//! is inferred from core counts and the processor's marketing name. The
//! result is a best-effort estimate, not an authoritative reading: the rule
//! table below is plain data and can be extended for new CPU generations
//! without touching [`classify`].

use crate::core::system_info::types::CoreTypeResult;
use log::warn;
use regex::RegexBuilder;

/// How a matched rule divides the physical cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoreSplit {
    /// Every core is a performance core
    AllPerformance,
    /// Every core is an efficiency core
    AllEfficiency,
    /// `n` performance cores (capped at the core count), the rest efficiency
    Performance(u32),
    /// Exact split regardless of core count
    Fixed { p: u32, e: u32 },
}

/// One row of the heuristic table.
#[derive(Debug, Clone, Copy)]
pub struct CoreTypeRule {
    /// Lowercase keyword looked up in manufacturer and processor name
    pub vendor: &'static str,
    /// Case-insensitive pattern matched against the processor name
    pub model: &'static str,
    /// Only applies at this physical core count
    pub cores: Option<u32>,
    pub split: CoreSplit,
}

/// Evaluated top to bottom; the first matching row wins.
pub const CORE_TYPE_RULES: &[CoreTypeRule] = &[
    CoreTypeRule {
        vendor: "intel",
        model: r"\bi3\b",
        cores: None,
        split: CoreSplit::AllPerformance,
    },
    CoreTypeRule {
        vendor: "intel",
        model: r"\bi5\b",
        cores: None,
        split: CoreSplit::Performance(6),
    },
    CoreTypeRule {
        vendor: "intel",
        model: r"\bi[79]\b",
        cores: Some(24),
        split: CoreSplit::Fixed { p: 8, e: 16 },
    },
    CoreTypeRule {
        vendor: "intel",
        model: r"\bi[79]\b",
        cores: None,
        split: CoreSplit::Performance(8),
    },
    CoreTypeRule {
        vendor: "amd",
        model: r"ryzen\s+\d+\s+7\d{3}",
        cores: Some(8),
        split: CoreSplit::Fixed { p: 6, e: 2 },
    },
    CoreTypeRule {
        vendor: "amd",
        model: r"ryzen\s+\d+\s+7\d{3}",
        cores: Some(16),
        split: CoreSplit::Fixed { p: 8, e: 8 },
    },
    CoreTypeRule {
        vendor: "apple",
        model: r"\bm\d",
        cores: None,
        split: CoreSplit::AllPerformance,
    },
    CoreTypeRule {
        vendor: "qualcomm",
        model: r"snapdragon.*\bx",
        cores: Some(12),
        split: CoreSplit::Fixed { p: 8, e: 4 },
    },
    CoreTypeRule {
        vendor: "qualcomm",
        model: r"snapdragon.*\bx",
        cores: None,
        split: CoreSplit::AllEfficiency,
    },
];

/// Estimate the P-core / E-core split using the built-in rule table.
///
/// The returned value always satisfies `p_cores + e_cores == total_cores`.
pub fn classify(
    physical_cores: u32,
    logical_processors: u32,
    processor_name: Option<&str>,
    manufacturer: Option<&str>,
) -> CoreTypeResult {
    classify_with_rules(
        CORE_TYPE_RULES,
        physical_cores,
        logical_processors,
        processor_name,
        manufacturer,
    )
}

pub fn classify_with_rules(
    rules: &[CoreTypeRule],
    physical_cores: u32,
    logical_processors: u32,
    processor_name: Option<&str>,
    manufacturer: Option<&str>,
) -> CoreTypeResult {
    if physical_cores == logical_processors {
        return CoreTypeResult {
            p_cores: 0,
            e_cores: physical_cores,
            total_cores: physical_cores,
        };
    }

    let name = processor_name.unwrap_or_default();
    let vendor = format!(
        "{} {}",
        manufacturer.unwrap_or_default().to_lowercase(),
        name.to_lowercase()
    );

    let candidate = match find_rule(rules, &vendor, name, physical_cores) {
        Some(rule) => apply_split(rule.split, physical_cores),
        None => smt_estimate(physical_cores, logical_processors),
    };

    match candidate {
        Some(result) if result.is_consistent() && result.total_cores == physical_cores => result,
        _ => {
            warn!(
                "Core-type estimate for '{}' ({} cores / {} threads) is inconsistent, using fallback",
                name, physical_cores, logical_processors
            );
            CoreTypeResult::fallback(physical_cores)
        }
    }
}

fn find_rule<'a>(
    rules: &'a [CoreTypeRule],
    vendor: &str,
    name: &str,
    physical_cores: u32,
) -> Option<&'a CoreTypeRule> {
    rules.iter().find(|rule| {
        vendor.contains(rule.vendor)
            && rule.cores.map_or(true, |c| c == physical_cores)
            && model_matches(rule.model, name)
    })
}

fn model_matches(pattern: &str, name: &str) -> bool {
    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => re.is_match(name),
        Err(e) => {
            warn!("Skipping core-type rule '{}': {}", pattern, e);
            false
        }
    }
}

fn apply_split(split: CoreSplit, physical_cores: u32) -> Option<CoreTypeResult> {
    let (p, e) = match split {
        CoreSplit::AllPerformance => (physical_cores, 0),
        CoreSplit::AllEfficiency => (0, physical_cores),
        CoreSplit::Performance(n) => {
            let p = n.min(physical_cores);
            (p, physical_cores - p)
        }
        CoreSplit::Fixed { p, e } => (p, e),
    };

    Some(CoreTypeResult {
        p_cores: p,
        e_cores: e,
        total_cores: physical_cores,
    })
}

/// Assumes two-way SMT on performance cores only.
fn smt_estimate(physical_cores: u32, logical_processors: u32) -> Option<CoreTypeResult> {
    let p = logical_processors.checked_sub(physical_cores)?;
    let e = physical_cores.checked_sub(p)?;

    Some(CoreTypeResult {
        p_cores: p,
        e_cores: e,
        total_cores: physical_cores,
    })
}
