//! Review snippets and the HTML sanitizer applied to them.
//!
//! Review text arrives as untrusted HTML. [`sanitize_html`] keeps a small set
//! of formatting tags and the `class` attribute, and drops everything else:
//!
//! | Input                              | Output                      |
//! |------------------------------------|-----------------------------|
//! | `<p class="x" onclick="y">hi</p>`  | `<p class="x">hi</p>`       |
//! | `<a href="javascript:…">link</a>`  | `link`                      |
//! | `<script>alert(1)</script>ok`      | `ok`                        |
//! | `1 < 2`                            | `1 &lt; 2`                  |

use std::sync::LazyLock;

use oshop_core::{Review, ReviewId};
use regex::{Captures, Regex};
use tracing::debug;

use crate::api::StoreApi;
use crate::catalog::LoadState;

/// Tags kept by the sanitizer.
pub const ALLOWED_TAGS: &[&str] = &["p", "br", "strong", "em", "u", "span", "div"];

/// Elements removed together with everything inside them.
const STRIPPED_ELEMENTS: &[&str] = &["script", "object", "embed", "iframe", "style"];

/// Any start tag, end tag, or comment.
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|<(/?)([a-zA-Z][a-zA-Z0-9-]*)((?:[^>\x22']|\x22[^\x22]*\x22|'[^']*')*)>")
        .expect("Invalid regex")
});

/// `class` attribute in double-quoted, single-quoted, or bare form.
static CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)class\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("Invalid regex")
});

/// One regex per stripped element, matching the element and its content.
static STRIPPED_RES: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    STRIPPED_ELEMENTS
        .iter()
        .map(|name| {
            Regex::new(&format!(r"(?is)<{name}\b[^>]*>.*?</{name}\s*>"))
                .expect("Invalid regex")
        })
        .collect()
});

/// Reduce untrusted review HTML to the allowed subset.
#[must_use]
pub fn sanitize_html(input: &str) -> String {
    let mut html = input.to_string();
    for re in STRIPPED_RES.iter() {
        if re.is_match(&html) {
            html = re.replace_all(&html, "").into_owned();
        }
    }

    let mut out = String::with_capacity(html.len());
    let mut last = 0;
    for caps in TAG_RE.captures_iter(&html) {
        let Some(whole) = caps.get(0) else { continue };
        escape_text(&html[last..whole.start()], &mut out);
        out.push_str(&rewrite_tag(&caps));
        last = whole.end();
    }
    escape_text(&html[last..], &mut out);
    out
}

/// Rebuild an allowed tag with only its `class` attribute; drop anything else.
fn rewrite_tag(caps: &Captures<'_>) -> String {
    let Some(name) = caps.get(2) else {
        // comment
        return String::new();
    };
    let name = name.as_str().to_ascii_lowercase();
    if !ALLOWED_TAGS.contains(&name.as_str()) {
        return String::new();
    }

    let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
    if closing {
        return if name == "br" { String::new() } else { format!("</{name}>") };
    }

    let attrs = caps.get(3).map_or("", |m| m.as_str());
    let class = CLASS_RE.captures(attrs).and_then(|c| {
        c.get(1)
            .or_else(|| c.get(2))
            .or_else(|| c.get(3))
            .map(|m| m.as_str().to_string())
    });

    match class {
        Some(class) => {
            let mut tag = format!("<{name} class=\"");
            escape_attr(&class, &mut tag);
            tag.push_str("\">");
            tag
        }
        None => format!("<{name}>"),
    }
}

fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Render sanitized HTML as plain text for a terminal.
///
/// Block and line-break tags become newlines, other tags vanish, and the
/// common character references are decoded.
#[must_use]
pub fn to_plain_text(html: &str) -> String {
    let text = TAG_RE.replace_all(html, |caps: &Captures<'_>| {
        let name = caps.get(2).map(|m| m.as_str().to_ascii_lowercase());
        let closing = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        match name.as_deref() {
            Some("br") => "\n",
            Some("p" | "div") if closing => "\n",
            _ => "",
        }
    });

    let text = text
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&");

    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// A review with its text already sanitized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafeReview {
    pub id: ReviewId,
    pub html: String,
}

impl From<Review> for SafeReview {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            html: sanitize_html(&review.text),
        }
    }
}

/// Reviews shown above the product listing.
#[derive(Debug, Default)]
pub struct Reviews {
    items: Vec<SafeReview>,
    state: LoadState,
}

impl Reviews {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitized reviews, in server order.
    #[must_use]
    pub fn items(&self) -> &[SafeReview] {
        &self.items
    }

    #[must_use]
    pub const fn state(&self) -> LoadState {
        self.state
    }

    /// Fetch and sanitize all reviews. A failed fetch leaves the list empty.
    pub async fn load<A: StoreApi>(&mut self, api: &A) {
        self.state = LoadState::Loading;
        self.items = api
            .fetch_reviews()
            .await
            .into_iter()
            .map(SafeReview::from)
            .collect();
        self.state = LoadState::Idle;
        debug!(count = self.items.len(), "Reviews loaded");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_tags_kept() {
        let html = "<p>Great <strong>chair</strong>, <em>very</em> <u>comfy</u><br/>!</p>";
        assert_eq!(
            sanitize_html(html),
            "<p>Great <strong>chair</strong>, <em>very</em> <u>comfy</u><br>!</p>"
        );
    }

    #[test]
    fn test_only_class_attribute_survives() {
        assert_eq!(
            sanitize_html(r#"<p class="lead" onclick="steal()" style="color:red">hi</p>"#),
            r#"<p class="lead">hi</p>"#
        );
        assert_eq!(
            sanitize_html("<span class='a b' id=x>t</span>"),
            r#"<span class="a b">t</span>"#
        );
        assert_eq!(sanitize_html("<div CLASS=note>t</div>"), r#"<div class="note">t</div>"#);
    }

    #[test]
    fn test_disallowed_tags_dropped_text_kept() {
        assert_eq!(
            sanitize_html(r#"<a href="javascript:alert(1)">click</a> <img src=x onerror=alert(1)>"#),
            "click "
        );
        assert_eq!(sanitize_html("<h1>Title</h1>"), "Title");
    }

    #[test]
    fn test_dangerous_elements_removed_with_content() {
        assert_eq!(sanitize_html("<script>alert('x')</script>ok"), "ok");
        assert_eq!(sanitize_html("a<SCRIPT type=\"text/javascript\">x()</SCRIPT >b"), "ab");
        assert_eq!(sanitize_html("<style>p{}</style><p>t</p>"), "<p>t</p>");
        assert_eq!(sanitize_html("<iframe src=\"//evil\"></iframe>x"), "x");
        assert_eq!(sanitize_html("<object data=x><param></object>y"), "y");
        assert_eq!(sanitize_html("<embed src=x>z"), "z");
    }

    #[test]
    fn test_attribute_with_angle_bracket_does_not_leak() {
        assert_eq!(sanitize_html(r#"<p title="a>b" class="c">t</p>"#), r#"<p class="c">t</p>"#);
    }

    #[test]
    fn test_class_value_is_escaped() {
        assert_eq!(
            sanitize_html(r#"<span class='x"><script>'>t</span>"#),
            r#"<span class="x&quot;&gt;&lt;script&gt;">t</span>"#
        );
    }

    #[test]
    fn test_stray_angle_brackets_escaped() {
        assert_eq!(sanitize_html("1 < 2 > 0"), "1 &lt; 2 &gt; 0");
        assert_eq!(sanitize_html("<3 this"), "&lt;3 this");
    }

    #[test]
    fn test_comments_removed() {
        assert_eq!(sanitize_html("a<!-- <script>x</script> -->b"), "ab");
    }

    #[test]
    fn test_plain_text_rendering() {
        let html = sanitize_html("<p>First &amp; best</p><p>1 &lt; 2<br>done</p>");
        assert_eq!(to_plain_text(&html), "First & best\n1 < 2\ndone");
    }

    #[test]
    fn test_safe_review_from_review() {
        let review = Review {
            id: ReviewId::new(3),
            text: "<p onclick=x>ok</p>".to_string(),
        };
        let safe = SafeReview::from(review);
        assert_eq!(safe.id, ReviewId::new(3));
        assert_eq!(safe.html, "<p>ok</p>");
    }
}
