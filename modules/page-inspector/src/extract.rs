use scraper::{Html, Selector};

/// Metadata pulled out of an HTML document. Every field is independent:
/// a missing or empty element leaves that field `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extracted {
    pub h1: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

pub fn extract(html: &str) -> Extracted {
    let doc = Html::parse_document(html);
    Extracted {
        h1: first_text(&doc, "h1"),
        title: first_text(&doc, "title"),
        description: first_attr(&doc, r#"meta[name="description"]"#, "content"),
    }
}

fn first_text(doc: &Html, selector: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let text = doc.select(&sel).next()?.text().collect::<String>();
    non_empty(&text)
}

fn first_attr(doc: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    let value = doc.select(&sel).next()?.value().attr(attr)?;
    non_empty(value)
}

fn non_empty(s: &str) -> Option<String> {
    let t = s.trim();
    (!t.is_empty()).then(|| t.to_string())
}
