//! The canonical section table.
//!
//! Section numbers, display names, display order and the descriptions shown
//! on section screens all come from this one table.

/// Fallback name for a question whose section cannot be determined.
pub const UNKNOWN_SECTION: &str = "Unknown Section";

/// Name of the section that collects site-specific questions.
pub const SITE_SPECIFIC_SECTION: &str = "Site-specific Questions";

/// A well-known section with its description.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanonicalSection {
    pub name: &'static str,
    pub description: &'static str,
}

/// Canonical sections in display order. Section number `n` is entry `n - 1`.
pub const CANONICAL_SECTIONS: [CanonicalSection; 6] = [
    CanonicalSection {
        name: "Engagement/Manager Relationships",
        description: "How connected you feel to your work and how well you are supported by your manager.",
    },
    CanonicalSection {
        name: "Peer/Team Dynamics",
        description: "How you and your teammates work together, share the load and treat one another.",
    },
    CanonicalSection {
        name: "Feedback & Communication Quality",
        description: "How clearly information flows and how useful the feedback you receive is.",
    },
    CanonicalSection {
        name: "Recognition and Pride",
        description: "Whether your contributions are noticed and how proud you are of where you work.",
    },
    CanonicalSection {
        name: "Safety & Wellness Indicators",
        description: "How physically and psychologically safe you feel, and how sustainable your workload is.",
    },
    CanonicalSection {
        name: SITE_SPECIFIC_SECTION,
        description: "A few questions specific to your site.",
    },
];

/// The canonical name for a 1-based section number.
pub fn canonical_name(number: usize) -> Option<&'static str> {
    number
        .checked_sub(1)
        .and_then(|index| CANONICAL_SECTIONS.get(index))
        .map(|section| section.name)
}

/// The 0-based position of a name in the canonical order.
pub fn canonical_rank(name: &str) -> Option<usize> {
    CANONICAL_SECTIONS.iter().position(|s| s.name == name)
}

/// The description shown on the section screen, if the section is canonical.
pub fn section_description(name: &str) -> Option<&'static str> {
    CANONICAL_SECTIONS
        .iter()
        .find(|s| s.name == name)
        .map(|s| s.description)
}

/// The name used for a legacy section index beyond or within the table.
pub fn legacy_section_name(index: usize) -> String {
    let number = index + 1;
    canonical_name(number).map_or_else(|| format!("Section {number}"), String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_one_based() {
        assert_eq!(canonical_name(0), None);
        assert_eq!(canonical_name(1), Some("Engagement/Manager Relationships"));
        assert_eq!(canonical_name(3), Some("Feedback & Communication Quality"));
        assert_eq!(canonical_name(6), Some(SITE_SPECIFIC_SECTION));
        assert_eq!(canonical_name(7), None);
    }

    #[test]
    fn legacy_names_fall_back_to_numbers() {
        assert_eq!(legacy_section_name(0), "Engagement/Manager Relationships");
        assert_eq!(legacy_section_name(8), "Section 9");
    }

    #[test]
    fn rank_and_description_agree() {
        for (rank, section) in CANONICAL_SECTIONS.iter().enumerate() {
            assert_eq!(canonical_rank(section.name), Some(rank));
            assert_eq!(section_description(section.name), Some(section.description));
        }
        assert_eq!(canonical_rank(UNKNOWN_SECTION), None);
    }
}
