//! Completion response cleanup
//!
//! The vendor returns markdown with `[n]` citation markers. The API serves
//! HTML fragments, so responses pass through here before leaving the
//! gateway: markers out, emphasis out, entities escaped, paragraphs in.
//! Every step falls back to the raw text rather than failing the request.

use regex::Regex;

/// Remove `[1]`-style citation markers
pub fn strip_citations(text: &str) -> String {
    if let Ok(re) = Regex::new(r"\[\d+\]") {
        re.replace_all(text, "").into_owned()
    } else {
        text.to_string()
    }
}

/// Remove `**bold**` and `*italic*` markdown emphasis, keeping the inner text
pub fn strip_emphasis(text: &str) -> String {
    let mut out = text.to_string();
    if let Ok(re) = Regex::new(r"\*\*(.*?)\*\*") {
        out = re.replace_all(&out, "$1").into_owned();
    }
    if let Ok(re) = Regex::new(r"\*(.*?)\*") {
        out = re.replace_all(&out, "$1").into_owned();
    }
    out
}

/// Render a model answer as an HTML fragment
///
/// Strips citations and emphasis, escapes entities, then wraps blank-line
/// separated blocks in `<p>` with `<br>` for single newlines.
pub fn render_html(text: &str) -> String {
    let cleaned = strip_emphasis(&strip_citations(text));
    let escaped = escape(cleaned.trim());

    let paragraphs: Vec<String> = escaped
        .split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>", p.replace('\n', "<br>")))
        .collect();

    paragraphs.join("\n")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_citations() {
        assert_eq!(
            strip_citations("Groceries average $400[1], below typical[12]."),
            "Groceries average $400, below typical."
        );
    }

    #[test]
    fn test_strip_citations_idempotent() {
        let once = strip_citations("Tip one[1]. Tip two[2].");
        assert_eq!(strip_citations(&once), once);
    }

    #[test]
    fn test_strip_citations_leaves_plain_brackets() {
        assert_eq!(strip_citations("see [appendix]"), "see [appendix]");
    }

    #[test]
    fn test_strip_emphasis() {
        assert_eq!(
            strip_emphasis("Try **meal prep** and *batch cooking*."),
            "Try meal prep and batch cooking."
        );
    }

    #[test]
    fn test_render_html_paragraphs_and_breaks() {
        let html = render_html("First tip.\nStill first.\n\nSecond tip.");
        assert_eq!(html, "<p>First tip.<br>Still first.</p>\n<p>Second tip.</p>");
    }

    #[test]
    fn test_render_html_escapes_entities() {
        let html = render_html("Spend < $50 & save > 10%");
        assert_eq!(html, "<p>Spend &lt; $50 &amp; save &gt; 10%</p>");
    }

    #[test]
    fn test_render_html_empty_input() {
        assert_eq!(render_html(""), "");
        assert_eq!(render_html("   \n\n  "), "");
    }

    #[test]
    fn test_render_html_full_pipeline() {
        let html = render_html("**Cut** subscriptions[3].\n\nBrew *coffee* at home[4].");
        assert_eq!(
            html,
            "<p>Cut subscriptions.</p>\n<p>Brew coffee at home.</p>"
        );
    }
}
