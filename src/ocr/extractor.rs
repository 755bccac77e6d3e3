use super::shard::{LayoutNode, PageNode, TextBuffer};

/// Append `add` on a new line when it has visible content
fn concat_if(out: &mut String, add: &str) {
    let add = add.trim();
    if add.is_empty() {
        return;
    }
    if !out.is_empty() {
        out.push('\n');
    }
    out.push_str(add);
}

fn join_children(children: &[LayoutNode], buffer: &TextBuffer<'_>) -> String {
    let mut out = String::new();
    for child in children {
        if let Some(anchor) = child.anchor() {
            concat_if(&mut out, &buffer.resolve(anchor));
        }
    }
    out
}

fn join_inline(children: &[LayoutNode]) -> String {
    let mut out = String::new();
    for child in children {
        concat_if(&mut out, child.inline_content().unwrap_or(""));
    }
    out
}

/// Extract the text of one physical page.
///
/// Strategies, first non-empty wins: the page's own anchor; paragraph, line,
/// block children (newline-joined); tokens (joined without separators);
/// inline anchor content on paragraphs, lines or blocks.
pub fn extract_page_text(page: &PageNode, full_text: &str) -> String {
    let buffer = TextBuffer::new(full_text);

    let own = page
        .node
        .anchor()
        .map(|a| buffer.resolve(a))
        .unwrap_or_default();
    if !own.trim().is_empty() {
        return own.trim().to_string();
    }

    for children in [&page.paragraphs, &page.lines, &page.blocks].into_iter().flatten() {
        let text = join_children(children, &buffer);
        if !text.trim().is_empty() {
            return text.trim().to_string();
        }
    }

    if let Some(tokens) = &page.tokens {
        let text: String = tokens
            .iter()
            .filter_map(|t| t.anchor())
            .map(|a| buffer.resolve(a))
            .collect();
        if !text.trim().is_empty() {
            return text.trim().to_string();
        }
    }

    // Backends that inline text instead of offsets
    for children in [&page.paragraphs, &page.lines, &page.blocks].into_iter().flatten() {
        let text = join_inline(children);
        if !text.is_empty() {
            return text;
        }
    }

    String::new()
}
