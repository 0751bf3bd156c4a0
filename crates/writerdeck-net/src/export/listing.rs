//! HTML directory listings.

use std::io;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

use super::resolve::percent_encode;

/// One row of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Entry {
    /// Text shown to the user.
    display: String,
    /// Percent-encoded relative link.
    href: String,
    sort_key: String,
}

fn read_entries(dir: &Path) -> io::Result<Vec<Entry>> {
    let mut entries = Vec::new();
    for item in std::fs::read_dir(dir)? {
        let item = item?;
        let name = item.file_name();
        let full = item.path();
        let lossy = name.to_string_lossy().into_owned();
        let mut href = percent_encode(name.as_bytes());
        let mut display = lossy.clone();

        // `is_dir` follows symlinks, so a link to a directory still links
        // with a trailing slash but displays with `@`.
        if full.is_dir() {
            display.push('/');
            href.push('/');
        }
        if full.is_symlink() {
            display = format!("{lossy}@");
        }

        entries.push(Entry {
            display,
            href,
            sort_key: lossy.to_lowercase(),
        });
    }
    entries.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    Ok(entries)
}

/// Render the listing page for `dir`, titled with the decoded URL path.
pub fn render_listing(url_path: &str, dir: &Path) -> io::Result<String> {
    let entries = read_entries(dir)?;
    let mut title = String::from("Directory listing for ");
    push_escaped(&mut title, url_path);

    let mut html = String::with_capacity(256 + entries.len() * 64);
    html.push_str("<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{title}</title>\n</head>\n<body>\n"));
    html.push_str(&format!("<h1>{title}</h1>\n<hr>\n<ul>\n"));
    for entry in &entries {
        html.push_str("<li><a href=\"");
        push_escaped(&mut html, &entry.href);
        html.push_str("\">");
        push_escaped(&mut html, &entry.display);
        html.push_str("</a></li>\n");
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    Ok(html)
}

/// Push HTML-escaped text into a string.
pub fn push_escaped(out: &mut String, text: &str) {
    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
}
