use crate::web::flash::Flash;
use time::macros::format_description;
use time::OffsetDateTime;
use urls_sqlite::{TrackedUrl, UrlCheck, UrlListing};

fn escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn date(at: OffsetDateTime) -> String {
    at.format(format_description!("[year]-[month]-[day]"))
        .unwrap_or_else(|_| String::new())
}

fn opt(value: Option<&str>) -> String {
    value.map(escape).unwrap_or_default()
}

fn layout(title: &str, flash: Option<&Flash>, body: &str) -> String {
    let alert = flash
        .map(|f| {
            format!(
                "<div class=\"alert {}\" role=\"alert\">{}</div>",
                f.level.css_class(),
                escape(&f.message)
            )
        })
        .unwrap_or_default();
    format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\">\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
<title>{} - Page Analyzer</title></head><body>\
<header><nav><a href=\"/\">Page Analyzer</a> | <a href=\"/urls\">Sites</a></nav></header>\
<main>{alert}{body}</main>\
<footer>page-analyzer {}</footer></body></html>",
        escape(title),
        analyzer_core::version()
    )
}

pub(crate) fn index_page(flash: Option<&Flash>, input: &str, error: Option<&str>) -> String {
    let (class, feedback) = match error {
        Some(e) => (" is-invalid", format!("<div class=\"invalid-feedback\">{}</div>", escape(e))),
        None => ("", String::new()),
    };
    let body = format!(
        "<h1>Page Analyzer</h1>\
<p>Check web pages for SEO suitability for free</p>\
<form action=\"/urls\" method=\"post\">\
<input type=\"text\" name=\"url\" value=\"{}\" placeholder=\"https://www.example.com\" \
class=\"form-control{class}\" aria-label=\"url\" required>\
{feedback}<input type=\"submit\" value=\"Check\"></form>",
        escape(input)
    );
    layout("Home", flash, &body)
}

pub(crate) fn urls_page(flash: Option<&Flash>, urls: &[UrlListing]) -> String {
    let mut rows = String::new();
    for u in urls {
        rows.push_str(&format!(
            "<tr><td>{id}</td><td><a href=\"/urls/{id}\">{name}</a></td><td>{last}</td><td>{status}</td></tr>",
            id = u.id,
            name = escape(&u.name),
            last = u.last_check_at.map(date).unwrap_or_default(),
            status = u.last_status.map(|s| s.to_string()).unwrap_or_default(),
        ));
    }
    let body = format!(
        "<h1>Sites</h1><table data-test=\"urls\"><thead><tr>\
<th>ID</th><th>Name</th><th>Last check</th><th>Status code</th>\
</tr></thead><tbody>{rows}</tbody></table>"
    );
    layout("Sites", flash, &body)
}

pub(crate) fn url_page(flash: Option<&Flash>, url: &TrackedUrl, checks: &[UrlCheck]) -> String {
    let mut rows = String::new();
    for c in checks {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            c.id,
            c.status_code.map(|s| s.to_string()).unwrap_or_default(),
            opt(c.h1.as_deref()),
            opt(c.title.as_deref()),
            opt(c.description.as_deref()),
            date(c.created_at),
        ));
    }
    let name = escape(&url.name);
    let body = format!(
        "<h1>Site: {name}</h1>\
<table data-test=\"url\"><tbody>\
<tr><td>ID</td><td>{id}</td></tr>\
<tr><td>Name</td><td>{name}</td></tr>\
<tr><td>Created at</td><td>{created}</td></tr>\
</tbody></table>\
<h2>Checks</h2>\
<form method=\"post\" action=\"/urls/{id}/checks\"><input type=\"submit\" value=\"Run check\"></form>\
<table data-test=\"checks\"><thead><tr>\
<th>ID</th><th>Status code</th><th>h1</th><th>title</th><th>description</th><th>Created at</th>\
</tr></thead><tbody>{rows}</tbody></table>",
        id = url.id,
        created = date(url.created_at),
    );
    layout(&url.name, flash, &body)
}

pub(crate) fn not_found_page() -> String {
    layout("Not found", None, "<h1>Page not found</h1><p><a href=\"/\">Back to the start page</a></p>")
}

pub(crate) fn server_error_page() -> String {
    layout("Error", None, "<h1>Internal server error</h1><p>Please try again later.</p>")
}
