use terminal_size::{terminal_size, Width};

pub(crate) fn terminal_width() -> Option<usize> {
    if let Some((Width(width), _)) = terminal_size() {
        Some(width as usize)
    } else {
        None
    }
}

// Hard-wrap a description at `width` columns.  A cut line is suffixed with a
// `-` continuation marker and the remainder continues indented to
// `padding + 2` columns.
pub(crate) fn wrap(text: &str, width: usize, padding: usize) -> String {
    let indent = padding + 2;
    let mut lines: Vec<String> = Vec::default();
    let mut trimming = text.to_string();

    while trimming.chars().count() > width {
        let cut = width.saturating_sub(2);

        // The indent must leave room to advance, or the wrap cannot terminate.
        if cut <= indent {
            break;
        }

        let cut_index = byte_offset(&trimming, cut);
        lines.push(format!("{}-", &trimming[..cut_index]));
        trimming = format!("{:indent$}{}", "", &trimming[cut_index..]);
    }

    lines.push(trimming);
    lines.join("\n")
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}
