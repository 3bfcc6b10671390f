//! Processor display-name cleanup and codename lookup.

use crate::core::system_info::types::ProcessorInfo;
use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// `(manufacturer keyword, generation number, codename)`
pub const CODENAMES: &[(&str, &str, &str)] = &[
    ("intel", "4", "NetBurst"),
    ("intel", "6", "Skylake"),
    ("intel", "7", "Kaby Lake"),
    ("intel", "8", "Coffee Lake"),
    ("intel", "9", "Coffee Lake Refresh"),
    ("intel", "10", "Comet Lake"),
    ("intel", "11", "Rocket Lake"),
    ("intel", "12", "Alder Lake"),
    ("intel", "13", "Raptor Lake"),
    ("intel", "14", "Raptor Lake Refresh"),
    ("intel", "15", "Arrow Lake"),
];

/// Ryzen families reported as Zen 4 when a generation is known
const AMD_ZEN4_SERIES: &[&str] = &["Ryzen 9", "Ryzen 8", "Ryzen 7"];

const MOBILE_MARKERS: &[&str] = &["laptop", "mobile", " m "];

static GENERATION_PREFIX: Lazy<Option<Regex>> = Lazy::new(|| {
    RegexBuilder::new(r"^\s*\d+(?:st|nd|rd|th)\s+gen(?:eration)?\s+")
        .case_insensitive(true)
        .build()
        .ok()
});

static MARKS: Lazy<Option<Regex>> = Lazy::new(|| {
    RegexBuilder::new(r"\((?:r|tm|c)\)|[®™©]")
        .case_insensitive(true)
        .build()
        .ok()
});

static GENERATION: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"(\d+)(?:st|nd|rd|th)\b").ok());

static INTEL_MODEL: Lazy<Option<Regex>> =
    Lazy::new(|| Regex::new(r"\b(i[3579])(\d{3,5}[A-Za-z]*)\b").ok());

static SPACES: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"\s+").ok());

fn replace_all(re: &Lazy<Option<Regex>>, input: &str, rep: &str) -> String {
    match re.as_ref() {
        Some(re) => re.replace_all(input, rep).into_owned(),
        None => input.to_string(),
    }
}

/// Strip trademark noise and generation prefixes from a processor name.
///
/// `"13th Gen Intel(R) Core(TM) i9-13900K"` becomes `"Intel Core i9-13900K"`.
pub fn clean_processor_name(name: &str, manufacturer: &str) -> String {
    let cleaned = replace_all(&GENERATION_PREFIX, name, "");
    let cleaned = replace_all(&MARKS, &cleaned, "");
    let cleaned = cleaned.replace("GenuineIntel", "Intel");

    let cleaned = if is_intel(manufacturer) && cleaned.contains("Intel") {
        replace_all(&INTEL_MODEL, &cleaned, "$1-$2")
    } else {
        cleaned
    };

    replace_all(&SPACES, &cleaned, " ").trim().to_string()
}

/// `"13th Gen Intel Core i7"` gives `Some("13th Gen")`.
pub fn extract_generation(name: &str) -> Option<String> {
    let re = GENERATION.as_ref()?;
    let number = re.captures(name)?.get(1)?.as_str();
    Some(format!("{}th Gen", number))
}

/// Codename for a processor, `"Unknown"` when nothing applies.
pub fn lookup_codename(name: &str, manufacturer: &str, generation: Option<&str>) -> String {
    let Some(generation) = generation else {
        return "Unknown".to_string();
    };

    if is_intel(manufacturer) {
        let number = generation
            .split("th")
            .next()
            .map(str::trim)
            .filter(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()));

        let Some(number) = number else {
            return "Unknown".to_string();
        };

        let mut codename = CODENAMES
            .iter()
            .find(|(vendor, gen, _)| *vendor == "intel" && *gen == number)
            .map(|(_, _, codename)| codename.to_string())
            .unwrap_or_else(|| format!("Gen {}", number));

        let lower = format!(" {} ", name.to_lowercase());
        if MOBILE_MARKERS.iter().any(|m| lower.contains(m)) {
            codename.push_str(" (Mobile)");
        }
        return codename;
    }

    if manufacturer.to_uppercase().contains("AMD") {
        return if AMD_ZEN4_SERIES.iter().any(|s| name.contains(s)) {
            "Zen 4".to_string()
        } else {
            "Zen Architecture".to_string()
        };
    }

    "Unknown".to_string()
}

fn is_intel(manufacturer: &str) -> bool {
    manufacturer.to_lowercase().contains("intel")
}

/// Build the display record from a raw inventory record.
pub fn build_processor_info(
    raw_name: &str,
    manufacturer: &str,
    cores: u32,
    logical_processors: u32,
) -> ProcessorInfo {
    let generation = extract_generation(raw_name);
    let name = clean_processor_name(raw_name, manufacturer);
    let codename = lookup_codename(&name, manufacturer, generation.as_deref());

    ProcessorInfo {
        name,
        manufacturer: manufacturer.trim().to_string(),
        cores,
        logical_processors,
        generation,
        codename,
    }
}
