//! HTML body stripping for the report's body section.

use regex::RegexBuilder;

/// Reduce an HTML body to readable plain text.
///
/// - `<script>`/`<style>` blocks are removed entirely
/// - `<br>` and closing block tags (`</p> </div> </tr> </li>`) become newlines
/// - remaining tags are stripped
/// - common HTML entities are unescaped
/// - runs of 3+ newlines collapse to one blank line
pub fn strip_html(html: &str) -> String {
    let mut text = html.to_string();

    for block in ["style", "script"] {
        let re = RegexBuilder::new(&format!(r"<{block}[^>]*>.*?</{block}>"))
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .expect("static regex");
        text = re.replace_all(&text, "").into_owned();
    }

    let re_br = RegexBuilder::new(r"<br\s*/?>")
        .case_insensitive(true)
        .build()
        .expect("static regex");
    text = re_br.replace_all(&text, "\n").into_owned();

    let re_block = RegexBuilder::new(r"</(?:p|div|tr|li)>")
        .case_insensitive(true)
        .build()
        .expect("static regex");
    text = re_block.replace_all(&text, "\n").into_owned();

    let re_tag = RegexBuilder::new(r"<[^>]+>").build().expect("static regex");
    text = re_tag.replace_all(&text, "").into_owned();

    text = unescape_entities(&text);

    let re_blank = RegexBuilder::new(r"\n{3,}").build().expect("static regex");
    text = re_blank.replace_all(&text, "\n\n").into_owned();

    text.trim().to_string()
}

/// Unescape the entities that actually show up in mail bodies.
///
/// `&amp;` is handled last so `&amp;lt;` stays `&lt;`.
fn unescape_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_basic_tags() {
        let html = "<p>Hello <b>world</b></p><p>Second paragraph</p>";
        let text = strip_html(html);
        assert!(text.contains("Hello world"));
        assert!(text.contains("Second paragraph"));
    }

    #[test]
    fn test_br_becomes_newline() {
        let text = strip_html("line one<br>line two<br/>line three");
        assert_eq!(text, "line one\nline two\nline three");
    }

    #[test]
    fn test_entities_unescaped() {
        let text = strip_html("Tom &amp; Jerry &lt;3&gt;");
        assert_eq!(text, "Tom & Jerry <3>");
    }

    #[test]
    fn test_scripts_and_styles_removed() {
        let html = "Before<script>alert('x')</script><style>p{color:red}</style>After";
        assert_eq!(strip_html(html), "BeforeAfter");
    }

    #[test]
    fn test_blank_lines_collapsed() {
        let html = "a</p>\n\n\n\n\nb</p>";
        let text = strip_html(html);
        assert!(!text.contains("\n\n\n"));
    }

    #[test]
    fn test_multiline_style_block() {
        let html = "<style>\nbody {\n  margin: 0;\n}\n</style>content";
        assert_eq!(strip_html(html), "content");
    }
}
