//! Markdown listing of harvested authors

use crate::models::AuthorRecord;

/// Formats author records as a markdown document
///
/// Each author becomes a section with their bio, Twitter link (when known)
/// and a table of articles in harvest order.
///
/// # Arguments
///
/// * `authors` - The harvested records, in crawl order
///
/// # Returns
///
/// A markdown-formatted string
pub fn format_markdown(authors: &[AuthorRecord]) -> String {
    let mut md = String::new();

    md.push_str("# Author Directory\n\n");

    let article_total: usize = authors.iter().map(|a| a.articles.len()).sum();
    md.push_str(&format!("- **Authors**: {}\n", authors.len()));
    md.push_str(&format!("- **Articles**: {}\n\n", article_total));

    for author in authors {
        md.push_str(&format!("## {}\n\n", author.name));

        if !author.bio.is_empty() {
            md.push_str(&format!("{}\n\n", author.bio));
        }

        if let Some(handle) = &author.twitter_handle {
            md.push_str(&format!("- **Twitter**: {}\n\n", handle));
        }

        if author.articles.is_empty() {
            md.push_str("_No articles._\n\n");
            continue;
        }

        md.push_str("| Date | Title | URL |\n");
        md.push_str("|------|-------|-----|\n");
        for article in &author.articles {
            md.push_str(&format!(
                "| {} | {} | {} |\n",
                article.date.format("%Y-%m-%d"),
                escape_cell(&article.title),
                article.url
            ));
        }
        md.push('\n');
    }

    md
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
