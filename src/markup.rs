//! Inline paragraph markup: `<b>`, `<strong>`, `<i>`, `<em>` and `<br/>`.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    Text(TextRun),
    LineBreak,
}

/// Parses paragraph markup into styled runs. Input that is not well-formed is
/// returned as a single plain run.
pub fn parse(source: &str) -> Vec<Inline> {
    let wrapped = format!("<para>{}</para>", escape_bare_ampersands(source));
    match roxmltree::Document::parse(&wrapped) {
        Ok(doc) => {
            let mut out = Vec::new();
            walk(doc.root_element(), false, false, &mut out);
            out
        }
        Err(err) => {
            log::warn!("paragraph markup rejected ({err}); rendering as plain text");
            vec![Inline::Text(TextRun {
                text: source.to_string(),
                bold: false,
                italic: false,
            })]
        }
    }
}

/// Concatenated text content, with line breaks as newlines.
pub fn plain_text(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text(run) => out.push_str(&run.text),
            Inline::LineBreak => out.push('\n'),
        }
    }
    out
}

fn walk(node: roxmltree::Node<'_, '_>, bold: bool, italic: bool, out: &mut Vec<Inline>) {
    for child in node.children() {
        if child.is_text() {
            let Some(text) = child.text() else {
                continue;
            };
            push_text(out, text, bold, italic);
            continue;
        }
        if !child.is_element() {
            continue;
        }
        let tag = child.tag_name().name().to_ascii_lowercase();
        match tag.as_str() {
            "br" => out.push(Inline::LineBreak),
            "b" | "strong" => walk(child, true, italic, out),
            "i" | "em" => walk(child, bold, true, out),
            other => {
                log::debug!("unsupported inline tag <{other}> treated as plain text");
                walk(child, bold, italic, out);
            }
        }
    }
}

fn push_text(out: &mut Vec<Inline>, text: &str, bold: bool, italic: bool) {
    if let Some(Inline::Text(last)) = out.last_mut() {
        if last.bold == bold && last.italic == italic {
            last.text.push_str(text);
            return;
        }
    }
    out.push(Inline::Text(TextRun {
        text: text.to_string(),
        bold,
        italic,
    }));
}

// XML only predefines five entities; anything else that looks like an entity
// reference is kept literally unless it is numeric or `&nbsp;`.
fn escape_bare_ampersands(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;
    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match entity_len(tail) {
            Some((len, replacement)) => {
                out.push_str(replacement.unwrap_or(&tail[..len]));
                rest = &tail[len..];
            }
            None => {
                out.push_str("&amp;");
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity_len(tail: &str) -> Option<(usize, Option<&'static str>)> {
    let end = tail.find(';')?;
    let name = &tail[1..end];
    if name.is_empty() {
        return None;
    }
    let known = match name {
        "amp" | "lt" | "gt" | "quot" | "apos" => None,
        "nbsp" => Some("&#160;"),
        _ => {
            let numeric = name
                .strip_prefix("#x")
                .or_else(|| name.strip_prefix("#X"))
                .map(|hex| !hex.is_empty() && hex.chars().all(|c| c.is_ascii_hexdigit()))
                .or_else(|| {
                    name.strip_prefix('#')
                        .map(|dec| !dec.is_empty() && dec.chars().all(|c| c.is_ascii_digit()))
                })
                .unwrap_or(false);
            if !numeric {
                return None;
            }
            None
        }
    };
    Some((end + 1, known))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, bold: bool, italic: bool) -> Inline {
        Inline::Text(TextRun {
            text: text.to_string(),
            bold,
            italic,
        })
    }

    #[test]
    fn bold_and_italic_runs_nest() {
        let parsed = parse("a <b>bold <i>both</i></b> <em>it</em>");
        assert_eq!(
            parsed,
            vec![
                run("a ", false, false),
                run("bold ", true, false),
                run("both", true, true),
                run(" ", false, false),
                run("it", false, true),
            ]
        );
    }

    #[test]
    fn line_breaks_split_runs() {
        let parsed = parse("\u{2022} one<br/>\u{2022} two");
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[1], Inline::LineBreak);
        assert_eq!(plain_text(&parsed), "\u{2022} one\n\u{2022} two");
    }

    #[test]
    fn bare_ampersands_are_literal() {
        let parsed = parse("Digital Strategy & Business Transformation");
        assert_eq!(
            plain_text(&parsed),
            "Digital Strategy & Business Transformation"
        );
        assert_eq!(plain_text(&parse("R&amp;D &#169; &nbsp;x")), "R&D \u{a9} \u{a0}x");
    }

    #[test]
    fn malformed_markup_falls_back_to_plain_text() {
        let parsed = parse("<b>unclosed");
        assert_eq!(parsed, vec![run("<b>unclosed", false, false)]);
    }
}
