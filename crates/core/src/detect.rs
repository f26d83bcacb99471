use crate::types::MrzFormat;

/// The non-empty `\n`-separated lines of a raw blob, in order.
pub fn mrz_lines(raw: &str) -> Vec<&str> {
    raw.split('\n').filter(|l| !l.is_empty()).collect()
}

/// Classify a raw blob by line count and uniform line width.
pub fn detect_format(raw: &str) -> Option<MrzFormat> {
    let lines = mrz_lines(raw);
    [MrzFormat::Td1, MrzFormat::Td3, MrzFormat::Td2]
        .into_iter()
        .find(|f| {
            lines.len() == f.line_count()
                && lines.iter().all(|l| l.chars().count() == f.line_width())
        })
}
