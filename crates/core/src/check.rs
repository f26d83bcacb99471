use crate::normalize::FILLER;

const WEIGHTS: [u32; 3] = [7, 3, 1];

/// ICAO 9303 check digit over `s`: weights 7-3-1 repeating, digits count as
/// themselves, `A`-`Z` as 10-35 and filler as 0, sum taken modulo 10.
///
/// `None` if `s` contains any character outside that alphabet.
pub fn check_digit(s: &str) -> Option<u32> {
    s.chars()
        .zip(WEIGHTS.iter().cycle())
        .try_fold(0u32, |sum, (c, w)| Some(sum + char_value(c)? * w))
        .map(|sum| sum % 10)
}

fn char_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => c.to_digit(10),
        'A'..='Z' => Some(c as u32 - 'A' as u32 + 10),
        FILLER => Some(0),
        _ => None,
    }
}

/// Compare the computed digit for `field` against the printed `check` char.
///
/// `None` when the printed character is not a digit or the field contains
/// characters outside the MRZ alphabet.
pub fn verify(field: &str, check: &str) -> Option<bool> {
    let mut chars = check.chars();
    let printed = match (chars.next(), chars.next()) {
        (Some(c), None) => c.to_digit(10)?,
        _ => return None,
    };
    Some(check_digit(field)? == printed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn icao_specimen_values() {
        // ICAO 9303 part 4 specimen passport.
        assert_eq!(check_digit("L898902C3"), Some(6));
        assert_eq!(check_digit("740812"), Some(2));
        assert_eq!(check_digit("120415"), Some(9));
    }

    #[test]
    fn filler_counts_as_zero() {
        assert_eq!(check_digit("<<<<<<"), Some(0));
        assert_eq!(check_digit("D23145890<"), check_digit("D23145890"));
    }

    #[test]
    fn lowercase_and_symbols_are_outside_alphabet() {
        assert_eq!(check_digit("abc"), None);
        assert_eq!(check_digit("12-34"), None);
    }

    #[test]
    fn verify_matches_printed_digit() {
        assert_eq!(verify("L898902C3", "6"), Some(true));
        assert_eq!(verify("L898902C3", "5"), Some(false));
        assert_eq!(verify("L898902C4", "6"), Some(false));
    }

    #[test]
    fn verify_unknown_when_check_not_a_digit() {
        assert_eq!(verify("740812", "<"), None);
        assert_eq!(verify("740812", ""), None);
        assert_eq!(verify("740812", "22"), None);
        assert_eq!(verify("74 812", "2"), None);
    }
}
