//! Server-rendered card and set pages
//!
//! Pages are rendered into the embedded layout and kept for the revalidation
//! interval; the first request after that regenerates them from fresh data.

use crate::cache::{CacheStats, TtlCache};
use crate::images::proxied_image_url;
use std::fmt::Write;
use std::future::Future;
use std::time::Duration;
use tcg_common::{ApiPage, Card, CardSet, Result};

const LAYOUT: &str = include_str!("../static/layout.html");

/// Escape text for use in HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wrap `content` (already HTML) in the site layout
fn render_layout(title: &str, content: &str) -> String {
    let generated_at = chrono::Utc::now().format("%Y-%m-%d %H:%M UTC").to_string();
    LAYOUT
        .replace("{{title}}", &escape_html(title))
        .replace("{{generated_at}}", &generated_at)
        .replace("{{content}}", content)
}

fn render_pager<T>(page: &ApiPage<T>, route: &str) -> String {
    let mut html = String::from("        <nav class=\"pager\">\n");

    if page.has_previous() {
        let _ = writeln!(
            html,
            "            <a href=\"{route}?page={}\">&larr; Previous</a>",
            page.page - 1
        );
    } else {
        html.push_str("            <span></span>\n");
    }

    let _ = writeln!(
        html,
        "            <span class=\"muted\">Page {} of {}</span>",
        page.page,
        page.total_pages().max(1)
    );

    if page.has_next() {
        let _ = writeln!(
            html,
            "            <a href=\"{route}?page={}\">Next &rarr;</a>",
            page.page + 1
        );
    } else {
        html.push_str("            <span></span>\n");
    }

    html.push_str("        </nav>\n");
    html
}

pub fn render_index() -> String {
    let content = "        <p>Browse every card and expansion of the Pokemon Trading Card Game.</p>\n\
                   \x20       <ul>\n\
                   \x20           <li><a href=\"/cards\">All cards</a></li>\n\
                   \x20           <li><a href=\"/sets\">All sets</a></li>\n\
                   \x20       </ul>\n";
    render_layout("Home", content)
}

pub fn render_cards_page(page: &ApiPage<Card>) -> String {
    let mut content = String::new();
    let _ = writeln!(
        content,
        "        <p class=\"muted\">{} cards</p>",
        page.total_count
    );
    content.push_str("        <div class=\"grid\">\n");

    for card in &page.data {
        let details = [card.supertype.as_str(), card.rarity.as_deref().unwrap_or("")]
            .iter()
            .filter(|s| !s.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" · ");

        let _ = writeln!(
            content,
            "            <article class=\"card\">\n\
             \x20               <img src=\"{}\" alt=\"{}\" loading=\"lazy\">\n\
             \x20               <h2>{}</h2>\n\
             \x20               <p>{} #{}</p>\n\
             \x20               <p>{}</p>\n\
             \x20           </article>",
            escape_html(&proxied_image_url(&card.images.small)),
            escape_html(&card.name),
            escape_html(&card.name),
            escape_html(&card.set.name),
            escape_html(&card.number),
            escape_html(&details),
        );
    }

    content.push_str("        </div>\n");
    content.push_str(&render_pager(page, "/cards"));
    render_layout("Cards", &content)
}

pub fn render_sets_page(page: &ApiPage<CardSet>) -> String {
    let mut content = String::new();
    let _ = writeln!(
        content,
        "        <p class=\"muted\">{} sets</p>",
        page.total_count
    );
    content.push_str("        <div class=\"grid\">\n");

    for set in &page.data {
        let _ = writeln!(
            content,
            "            <article class=\"card set\">\n\
             \x20               <img src=\"{}\" alt=\"{}\" loading=\"lazy\">\n\
             \x20               <h2>{}</h2>\n\
             \x20               <p>{} · {} cards</p>\n\
             \x20               <p>Released {}</p>\n\
             \x20           </article>",
            escape_html(&proxied_image_url(&set.images.logo)),
            escape_html(&set.name),
            escape_html(&set.name),
            escape_html(&set.series),
            set.printed_total,
            escape_html(&set.release_date),
        );
    }

    content.push_str("        </div>\n");
    content.push_str(&render_pager(page, "/sets"));
    render_layout("Sets", &content)
}

/// Rendered HTML kept for the revalidation interval
pub struct PageCache {
    pages: TtlCache<String, String>,
}

impl PageCache {
    pub fn new(revalidate: Duration) -> Self {
        Self {
            pages: TtlCache::new(revalidate),
        }
    }

    pub fn revalidate(&self) -> Duration {
        self.pages.ttl()
    }

    /// Return the cached page for `key`, or run `render` and keep its output.
    /// Render failures are returned and nothing is stored.
    pub async fn get_or_render<F, Fut>(&self, key: &str, render: F) -> Result<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<String>>,
    {
        let key = key.to_string();
        if let Some(html) = self.pages.get(&key) {
            return Ok(html);
        }

        log::info!("Regenerating page {}", key);
        let html = render().await?;
        self.pages.insert(key, html.clone());
        Ok(html)
    }

    pub fn clear(&self) {
        self.pages.clear();
    }

    pub fn stats(&self) -> CacheStats {
        self.pages.stats()
    }
}
