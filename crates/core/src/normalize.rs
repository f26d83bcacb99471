use crate::types::NameParts;

/// MRZ filler character.
pub const FILLER: char = '<';

/// Two-digit years below this pivot belong to the 2000s, the rest to the 1900s.
pub const YEAR_PIVOT: u32 = 30;

/// Characters `[start, end)` of `line`, counted in chars, without surrounding
/// whitespace. Positions past the end of the line yield a shorter (or empty)
/// field rather than a panic.
pub fn field(line: &str, start: usize, end: usize) -> String {
    raw_field(line, start, end).trim().to_string()
}

/// Same as [`field`] but keeps the text exactly as printed.
pub fn raw_field(line: &str, start: usize, end: usize) -> String {
    line.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}

/// Characters from `start` to the end of `line`.
pub fn tail(line: &str, start: usize) -> String {
    line.chars().skip(start).collect()
}

/// Drop every filler and space, keeping the remaining characters in order.
pub fn strip_filler(s: &str) -> String {
    s.chars().filter(|&c| c != FILLER && c != ' ').collect()
}

/// Split a packed `SURNAME<<GIVEN<NAMES` field.
///
/// Only the first `<<` separates the two parts. Inside each part filler
/// becomes a space, then runs of whitespace collapse to one. The collapse is
/// intentional and goes beyond a plain filler-to-space substitution:
/// `ANNA<<MARIA` left over after the first separator reads `ANNA MARIA`,
/// not `ANNA  MARIA`.
pub fn parse_name(s: &str) -> NameParts {
    let (primary, secondary) = s.split_once("<<").unwrap_or((s, ""));
    NameParts {
        primary: clean_name_part(primary),
        secondary: clean_name_part(secondary),
    }
}

fn clean_name_part(part: &str) -> String {
    part.replace(FILLER, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Convert `YYMMDD` into `YYYY-MM-DD`.
///
/// Month and day are copied as printed; no calendar validation happens here.
/// Returns `None` unless the input is exactly six characters with a numeric year.
pub fn normalize_date(s: &str) -> Option<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() != 6 {
        return None;
    }
    let yy: String = chars[..2].iter().collect();
    if !yy.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let century = if yy.parse::<u32>().ok()? < YEAR_PIVOT { "20" } else { "19" };
    let month: String = chars[2..4].iter().collect();
    let day: String = chars[4..6].iter().collect();
    Some(format!("{century}{yy}-{month}-{day}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── slicing ───────────────────────────────────────────────────────────────

    #[test]
    fn field_slices_and_trims() {
        assert_eq!(field("ABCDEFGH", 2, 5), "CDE");
        assert_eq!(field("AB  DE  ", 1, 8), "B  DE");
        assert_eq!(raw_field("AB  DE  ", 1, 8), "B  DE  ");
    }

    #[test]
    fn field_past_end_is_short_not_panicking() {
        assert_eq!(field("ABC", 1, 10), "BC");
        assert_eq!(field("ABC", 5, 10), "");
        assert_eq!(field("ABC", 2, 1), "");
        assert_eq!(tail("ABC", 7), "");
    }

    #[test]
    fn tail_takes_rest_of_line() {
        assert_eq!(tail("P<UTOSMITH<<JOHN", 5), "SMITH<<JOHN");
    }

    // ── filler ────────────────────────────────────────────────────────────────

    #[test]
    fn strip_filler_removes_filler_and_spaces() {
        assert_eq!(strip_filler("AB<12<<< 3"), "AB123");
        assert_eq!(strip_filler("<<<<"), "");
    }

    #[test]
    fn strip_filler_is_identity_on_clean_input() {
        for s in ["", "L898902C3", "XXXXXXXXX", "ÑANDU42"] {
            assert_eq!(strip_filler(s), s);
        }
    }

    // ── names ─────────────────────────────────────────────────────────────────

    #[test]
    fn parse_name_splits_surname_and_given() {
        let n = parse_name("SMITH<<JOHN<<<<<<<<<<<<<<<<<<<<<<<<");
        assert_eq!(n.primary, "SMITH");
        assert_eq!(n.secondary, "JOHN");
    }

    #[test]
    fn parse_name_without_separator_is_all_primary() {
        let n = parse_name("MADONNA<");
        assert_eq!(n.primary, "MADONNA");
        assert_eq!(n.secondary, "");
    }

    #[test]
    fn parse_name_single_fillers_become_spaces() {
        let n = parse_name("DE<LA<CRUZ<<MARIA<JOSE<<<<<");
        assert_eq!(n.primary, "DE LA CRUZ");
        assert_eq!(n.secondary, "MARIA JOSE");
    }

    #[test]
    fn parse_name_only_first_separator_splits() {
        let n = parse_name("ERIKSSON<<ANNA<<MARIA<<<");
        assert_eq!(n.primary, "ERIKSSON");
        assert_eq!(n.secondary, "ANNA MARIA");
    }

    #[test]
    fn parse_name_all_filler_is_empty() {
        assert_eq!(parse_name("<<<<<<<<"), NameParts::default());
        assert_eq!(parse_name(""), NameParts::default());
    }

    #[test]
    fn parse_name_never_contains_filler() {
        let n = parse_name("<A<<<B<<<C<");
        assert!(!n.primary.contains(FILLER));
        assert!(!n.secondary.contains(FILLER));
    }

    // ── dates ─────────────────────────────────────────────────────────────────

    #[test]
    fn normalize_date_pivots_on_thirty() {
        assert_eq!(normalize_date("000101").as_deref(), Some("2000-01-01"));
        assert_eq!(normalize_date("050607").as_deref(), Some("2005-06-07"));
        assert_eq!(normalize_date("291231").as_deref(), Some("2029-12-31"));
        assert_eq!(normalize_date("300101").as_deref(), Some("1930-01-01"));
        assert_eq!(normalize_date("991231").as_deref(), Some("1999-12-31"));
    }

    #[test]
    fn normalize_date_every_year_gets_expected_century() {
        for yy in 0..100u32 {
            let out = normalize_date(&format!("{yy:02}0101")).unwrap();
            let prefix = if yy < 30 { "20" } else { "19" };
            assert!(out.starts_with(prefix), "{yy:02} -> {out}");
        }
    }

    #[test]
    fn normalize_date_rejects_wrong_length() {
        assert_eq!(normalize_date(""), None);
        assert_eq!(normalize_date("80010"), None);
        assert_eq!(normalize_date("8001011"), None);
    }

    #[test]
    fn normalize_date_rejects_non_numeric_year() {
        assert_eq!(normalize_date("<<0101"), None);
        assert_eq!(normalize_date("A00101"), None);
    }

    #[test]
    fn normalize_date_passes_month_and_day_through() {
        assert_eq!(normalize_date("801332").as_deref(), Some("1980-13-32"));
        assert_eq!(normalize_date("80<<<<").as_deref(), Some("1980-<<-<<"));
    }
}
