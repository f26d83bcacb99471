use crate::check::verify;
use crate::detect::{detect_format, mrz_lines};
use crate::normalize::{field, normalize_date, parse_name, raw_field, strip_filler, tail};
use crate::types::{CheckDigits, DecodeFailure, DecodeResult, DecodedDocument, MrzFormat};

// ── Public decoding API ───────────────────────────────────────────────────────

pub struct MrzDecoder;

impl MrzDecoder {
    /// Detect the layout of `raw` and extract its fields.
    pub fn decode(raw: &str) -> DecodeResult {
        let Some(format) = detect_format(raw) else {
            let failure = DecodeFailure::unrecognized(raw);
            tracing::warn!(line_widths = ?failure.line_widths, "MRZ format not recognized");
            return Err(failure);
        };

        let doc = match format {
            MrzFormat::Td1 => Self::extract_td1(raw),
            MrzFormat::Td2 => Self::extract_td2(raw),
            MrzFormat::Td3 => Self::extract_td3(raw),
        };
        tracing::debug!(
            format = %doc.format,
            document_number = %doc.document_number,
            checks_valid = doc.check_digits.all_valid(),
            "MRZ decoded"
        );
        Ok(doc)
    }

    // ── TD1: 3 × 30 ───────────────────────────────────────────────────────────

    pub fn extract_td1(raw: &str) -> DecodedDocument {
        let lines = mrz_lines(raw);
        let (line1, line2, line3) = (line(&lines, 0), line(&lines, 1), line(&lines, 2));
        let name = parse_name(line3);

        DecodedDocument {
            format: MrzFormat::Td1,
            document_number: strip_filler(&field(line1, 5, 14)),
            last_name: name.primary,
            first_name: name.secondary,
            birth_date: normalize_date(&field(line2, 0, 6)),
            expiry_date: normalize_date(&field(line2, 8, 14)),
            sex: field(line2, 7, 8),
            nationality: None,
            check_digits: CheckDigits {
                document_number: checked(line1, 5, 14),
                birth_date: checked(line2, 0, 6),
                expiry_date: checked(line2, 8, 14),
            },
            raw_data: raw.to_string(),
        }
    }

    // ── TD2: 2 × 36 ───────────────────────────────────────────────────────────

    pub fn extract_td2(raw: &str) -> DecodedDocument {
        let lines = mrz_lines(raw);
        let (line1, line2) = (line(&lines, 0), line(&lines, 1));
        let name = parse_name(&tail(line1, 14));

        DecodedDocument {
            format: MrzFormat::Td2,
            document_number: strip_filler(&field(line1, 5, 14)),
            last_name: name.primary,
            first_name: name.secondary,
            birth_date: normalize_date(&field(line2, 0, 6)),
            expiry_date: normalize_date(&field(line2, 8, 14)),
            sex: field(line2, 7, 8),
            nationality: None,
            check_digits: CheckDigits {
                // The name field starts right after the document number.
                document_number: None,
                birth_date: checked(line2, 0, 6),
                expiry_date: checked(line2, 8, 14),
            },
            raw_data: raw.to_string(),
        }
    }

    // ── TD3: 2 × 44 ───────────────────────────────────────────────────────────

    pub fn extract_td3(raw: &str) -> DecodedDocument {
        let lines = mrz_lines(raw);
        let (line1, line2) = (line(&lines, 0), line(&lines, 1));
        let name = parse_name(&tail(line1, 5));

        DecodedDocument {
            format: MrzFormat::Td3,
            document_number: strip_filler(&field(line2, 0, 9)),
            last_name: name.primary,
            first_name: name.secondary,
            birth_date: normalize_date(&field(line2, 13, 19)),
            expiry_date: normalize_date(&field(line2, 21, 27)),
            sex: field(line2, 20, 21),
            nationality: Some(strip_filler(&field(line2, 10, 13))),
            check_digits: CheckDigits {
                document_number: checked(line2, 0, 9),
                birth_date: checked(line2, 13, 19),
                expiry_date: checked(line2, 21, 27),
            },
            raw_data: raw.to_string(),
        }
    }
}

/// Decode a raw MRZ blob. See [`MrzDecoder::decode`].
pub fn decode(raw: &str) -> DecodeResult {
    MrzDecoder::decode(raw)
}

fn line<'a>(lines: &[&'a str], idx: usize) -> &'a str {
    lines.get(idx).copied().unwrap_or("")
}

/// Verify the field at `[start, end)` against the check digit printed at `end`.
fn checked(line: &str, start: usize, end: usize) -> Option<bool> {
    verify(&raw_field(line, start, end), &raw_field(line, end, end + 1))
}

// ── Tests ─────────────────────────────────────────────────────────────────────
