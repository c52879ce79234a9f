//! Progress labels shown to respondents.

use std::fmt;

/// Separator between position and total in a question progress label.
pub const PROGRESS_SEPARATOR: &str = " of ";

/// The label for question `index` (0-based) out of `total`, e.g. `"3 of 12"`.
///
/// Renderers parse this back with [`parse_progress_label`].
pub fn question_progress_label(index: usize, total: usize) -> String {
    format!("{}{PROGRESS_SEPARATOR}{}", index + 1, total)
}

/// Split a question progress label back into `(position, total)`.
pub fn parse_progress_label(label: &str) -> Option<(usize, usize)> {
    let (position, total) = label.split_once(PROGRESS_SEPARATOR)?;
    Some((position.parse().ok()?, total.parse().ok()?))
}

/// Position of a section among all sections of the session, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionProgress {
    pub current: usize,
    pub total: usize,
}

impl fmt::Display for SectionProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Section {}{PROGRESS_SEPARATOR}{}", self.current, self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_format() {
        assert_eq!(question_progress_label(0, 4), "1 of 4");
        assert_eq!(question_progress_label(11, 12), "12 of 12");
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_progress_label("welcome"), None);
        assert_eq!(parse_progress_label("x of 3"), None);
        assert_eq!(parse_progress_label("1 of"), None);
    }

    #[test]
    fn section_progress_display() {
        let progress = SectionProgress { current: 2, total: 5 };
        assert_eq!(progress.to_string(), "Section 2 of 5");
    }
}
