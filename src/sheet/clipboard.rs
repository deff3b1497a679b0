//! Tab-separated clipboard blocks, as copied from a spreadsheet.

/// Split clipboard text into rows of cells.
///
/// Returns `None` for plain text: a single line without any tab is an ordinary
/// text paste, not a structured fill. One trailing line break is ignored since
/// spreadsheet applications append it to every copied range.
pub fn parse_block(text: &str) -> Option<Vec<Vec<String>>> {
    if !text.contains('\n') && !text.contains('\t') && !text.contains('\r') {
        return None;
    }

    let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
    let body = normalized.strip_suffix('\n').unwrap_or(&normalized);

    let rows = body
        .split('\n')
        .map(|line| line.split('\t').map(str::to_string).collect())
        .collect();

    Some(rows)
}
