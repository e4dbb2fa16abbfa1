//! Markdown archive document for one run.
//!
//! ```text
//! # 2025-01-02 08:30 Trending
//!
//! ## <translated trend>
//!
//! ### [<article title>](<url>)
//!
//! <translated body>
//! ```

use super::view::EditionView;

/// Escape characters that would end a Markdown link label early.
fn link_label(s: &str) -> String {
    s.replace('\\', "\\\\").replace('[', "\\[").replace(']', "\\]")
}

/// Angle-bracket the destination when it contains characters that would end it.
fn link_target(url: &str) -> String {
    if url.contains([' ', '(', ')']) {
        format!("<{}>", url.replace('<', "%3C").replace('>', "%3E"))
    } else {
        url.to_string()
    }
}

pub fn render_archive(view: &EditionView) -> String {
    let mut md = format!("# {}\n\n", view.title);
    for trend in &view.trends {
        md.push_str(&format!("## {}\n\n", trend.heading));
        for article in &trend.articles {
            let label = if article.title.trim().is_empty() {
                &article.url
            } else {
                &article.title
            };
            md.push_str(&format!(
                "### [{}]({})\n\n{}\n\n",
                link_label(label),
                link_target(&article.url),
                article.body
            ));
        }
    }
    md
}
