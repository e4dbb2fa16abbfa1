//! HTML pages: one index card per trend, one page per trend.
//!
//! All text coming from the web or the model is escaped before it is placed
//! in the page.

use super::view::{EditionView, TrendView};
use crate::config::SiteLabels;
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};

const STYLE: &str = r#"
  body { font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; margin: 0; padding: 0; background: #1d1f21; color: #eee; }
  .header { text-align: center; padding: 20px 0; background: rgba(0, 0, 0, 0.7); }
  h1 { font-size: 2.2em; margin: 0; }
  .subtitle { color: #ccc; margin-top: 5px; }
  .container { width: 80%; max-width: 900px; margin: 20px auto; padding: 20px; border-radius: 10px; background: rgba(0, 0, 0, 0.5); }
  .cards { display: grid; grid-template-columns: repeat(auto-fit, minmax(250px, 1fr)); gap: 20px; }
  .article-card { display: block; padding: 20px; border-radius: 10px; background: rgba(255, 255, 255, 0.1); color: #fff; text-decoration: none; }
  .article-card:hover { background: rgba(255, 255, 255, 0.2); }
  .article-title { font-size: 1.3em; margin-bottom: 10px; }
  .article-content { line-height: 1.6; color: #ccc; }
  .article-link { color: #4CAF50; font-weight: bold; text-decoration: none; }
  .footer { text-align: center; font-size: 0.9em; color: #ccc; padding: 10px; }
  @media (max-width: 768px) { .container { width: auto; margin: 10px; } h1 { font-size: 1.8em; } }
"#;

fn page(title: &str, updated: &str, body: &str, labels: &SiteLabels) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<div class="header">
  <h1>{title}</h1>
  <p class="subtitle">{updated_label}: {updated}</p>
</div>
<div class="container">
{body}</div>
<div class="footer"><a href="index.html">{site}</a></div>
</body>
</html>
"#,
        lang = attr(&labels.lang),
        title = text(title),
        style = STYLE,
        updated_label = text(&labels.updated_label),
        updated = text(updated),
        body = body,
        site = text(&labels.site_title),
    )
}

/// Index page with one card per trend, in trend order.
pub fn render_index(view: &EditionView, labels: &SiteLabels) -> String {
    let mut cards = String::from("<div class=\"cards\">\n");
    for trend in &view.trends {
        cards.push_str(&format!(
            "  <a href=\"{}\" class=\"article-card\"><h2 class=\"article-title\">{}</h2></a>\n",
            attr(&urlencoding::encode(&trend.file_name)),
            text(&trend.heading)
        ));
    }
    cards.push_str("</div>\n");
    page(&labels.site_title, &view.updated_at, &cards, labels)
}

/// Page for one trend: every article's title, translated body and source link.
pub fn render_trend(view: &EditionView, trend: &TrendView, labels: &SiteLabels) -> String {
    let mut body = String::new();
    for article in &trend.articles {
        body.push_str(&format!(
            "<h2 class=\"article-title\">{}</h2>\n<p class=\"article-content\">{}</p>\n<p><a href=\"{}\" target=\"_blank\" rel=\"noopener\" class=\"article-link\">{}</a></p>\n<hr>\n",
            text(&article.title),
            text(&article.body),
            attr(&article.url),
            text(&labels.source_link_label),
        ));
    }
    page(&trend.heading, &view.updated_at, &body, labels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::outputs::view::ArticleView;

    fn view() -> EditionView {
        EditionView {
            title: "2025-01-02 08:30 Trends".to_string(),
            updated_at: "2025-01-02 08:30".to_string(),
            archive_file: "2025-01-02_08-30_trends.md".to_string(),
            archive_fallback: "2025-01-02_08-30-00_trends.md".to_string(),
            trends: vec![
                TrendView {
                    heading: "Tom & Jerry <live>".to_string(),
                    file_name: "Tom_&_Jerry_live.html".to_string(),
                    articles: vec![ArticleView {
                        title: "A \"quoted\" title".to_string(),
                        body: "<script>alert(1)</script> body".to_string(),
                        url: "https://a.example/?x=1&y=\"2\"".to_string(),
                    }],
                },
                TrendView {
                    heading: "超级碗".to_string(),
                    file_name: "超级碗.html".to_string(),
                    articles: vec![],
                },
            ],
        }
    }

    #[test]
    fn test_index_links_every_trend_in_order() {
        let html = render_index(&view(), &SiteLabels::default());
        let first = html.find("Tom_%26_Jerry_live.html").unwrap();
        let second = html.find("%E8%B6%85%E7%BA%A7%E7%A2%97.html").unwrap();
        assert!(first < second);
        assert!(html.contains("Tom &amp; Jerry &lt;live&gt;"));
        assert!(html.contains("2025-01-02 08:30"));
    }

    #[test]
    fn test_trend_page_escapes_content() {
        let v = view();
        let labels = SiteLabels::default();
        let html = render_trend(&v, &v.trends[0], &labels);
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt; body"));
        assert!(html.contains("href=\"https://a.example/?x=1&amp;y=&quot;2&quot;\""));
        assert!(html.contains(&labels.source_link_label));
        assert!(html.contains("<title>Tom &amp; Jerry &lt;live&gt;</title>"));
    }

    #[test]
    fn test_trend_page_without_articles() {
        let v = view();
        let html = render_trend(&v, &v.trends[1], &SiteLabels::default());
        assert!(html.contains("<h1>超级碗</h1>"));
        assert!(!html.contains("class=\"article-content\""));
    }
}
