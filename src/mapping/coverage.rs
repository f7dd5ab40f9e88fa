//! Overall coverage of a split specification.

use crate::domain::Section;

/// Length-weighted average coverage of `sections`, floored to an integer percent.
///
/// Each section weighs `len(text) / total length`. Sections with no text at
/// all (or an empty list) give 0.
pub fn aggregate_coverage(sections: &[Section]) -> u32 {
    let total: u128 = sections.iter().map(|s| s.text.len() as u128).sum();
    if total == 0 {
        return 0;
    }

    // floor(100 * sum(len/total * cov/100)) == floor(sum(len * cov) / total)
    let weighted: u128 = sections
        .iter()
        .map(|s| s.text.len() as u128 * u128::from(s.coverage.min(100)))
        .sum();

    (weighted / total) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Attachments;

    fn section(text: &str, offset: usize, coverage: u32) -> Section {
        Section {
            text: text.to_string(),
            offset,
            coverage,
            attached: Attachments::new(),
        }
    }

    #[test]
    fn test_empty_list_is_zero() {
        assert_eq!(aggregate_coverage(&[]), 0);
    }

    #[test]
    fn test_all_empty_texts_is_zero() {
        assert_eq!(aggregate_coverage(&[section("", 0, 100), section("", 0, 50)]), 0);
    }

    #[test]
    fn test_full_coverage() {
        let sections = vec![section("abc", 0, 100), section("defgh", 3, 100), section("i", 8, 100)];
        assert_eq!(aggregate_coverage(&sections), 100);
    }

    #[test]
    fn test_weighted_and_floored() {
        // 5 * 50 + 9 * 100 = 1150 over 18 -> 63.8
        let sections = vec![
            section("The ", 0, 0),
            section("quick", 4, 50),
            section("brown fox", 10, 100),
        ];
        assert_eq!(aggregate_coverage(&sections), 63);
    }

    #[test]
    fn test_coverage_above_hundred_is_clamped() {
        assert_eq!(aggregate_coverage(&[section("abcd", 0, 250)]), 100);
    }
}
