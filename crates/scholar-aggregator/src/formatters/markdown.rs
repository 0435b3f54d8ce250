//! Markdown output formatting.

use std::borrow::Cow;

use crate::features::Features;
use crate::models::EnhancedArticle;

/// Characters of abstract shown per article.
const ABSTRACT_PREVIEW_CHARS: usize = 300;

/// Format a ranked list of articles as Markdown.
///
/// `total` is the size of the view the list was cut from.
#[must_use]
pub fn format_articles_markdown(articles: &[EnhancedArticle], total: usize) -> String {
    if articles.is_empty() {
        return "No articles found.".to_string();
    }

    let mut output = if total > articles.len() {
        format!("# Articles (showing {} of {})\n\n", articles.len(), total)
    } else {
        format!("# Articles ({} results)\n\n", articles.len())
    };

    for (i, article) in articles.iter().enumerate() {
        output.push_str(&format_article_markdown(article, i + 1));
        output.push_str("\n---\n\n");
    }

    output
}

/// Format a single article as Markdown.
#[must_use]
pub fn format_article_markdown(enhanced: &EnhancedArticle, index: usize) -> String {
    let article = &enhanced.article;
    let mut output = String::new();

    output.push_str(&format!("## {}. {}\n\n", index, article.title));
    output.push_str(&format!("**Authors**: {}\n\n", article.authors));

    let mut meta = vec![
        format!("**Date**: {}", article.date),
        format!("**Citations**: {}", article.citation_count),
        format!("**Venue**: {}", article.journal),
    ];
    if let Some(source) = article.source {
        meta.push(format!("**Source**: {source}"));
    }
    output.push_str(&format!("{}\n\n", meta.join(" | ")));

    output.push_str(&format!(
        "**Relevance**: {:.3} | **Rank score**: {:.3}\n\n",
        enhanced.relevance_score, enhanced.ranking_score
    ));

    if !article.tags.is_empty() {
        output.push_str(&format!("**Tags**: {}\n\n", article.tags.join(", ")));
    }

    let mut links = Vec::new();
    if let Some(arxiv) = &article.arxiv_id {
        links.push(format!("[arXiv](https://arxiv.org/abs/{arxiv})"));
    } else if article.has_doi() {
        links.push(format!("[DOI](https://doi.org/{})", article.doi));
    }
    if let Some(url) = &article.download_url {
        links.push(format!("[PDF]({url})"));
    }
    if let Some(url) = &article.repository_url {
        links.push(format!("[Code]({url})"));
    }
    if !links.is_empty() {
        output.push_str(&format!("**Links**: {}\n\n", links.join(" | ")));
    }

    output.push_str(&format!("**Abstract**: {}\n", truncate(&article.r#abstract)));

    output
}

/// Format extracted findings as Markdown.
#[must_use]
pub fn format_features_markdown(title: Option<&str>, features: &Features) -> String {
    let mut output = match title {
        Some(title) => format!("# Insights: {title}\n\n"),
        None => "# Insights\n\n".to_string(),
    };

    if features.is_empty() {
        output.push_str("No findings could be extracted from this abstract.\n");
        return output;
    }

    for (name, value) in features {
        output.push_str(&format!("- **{}**: {}\n", feature_label(name), value));
    }

    output
}

/// Format the venue list as Markdown.
#[must_use]
pub fn format_venues_markdown(venues: &[String]) -> String {
    if venues.is_empty() {
        return "No venues available.".to_string();
    }

    let mut output = format!("# Venues ({})\n\n", venues.len());
    for venue in venues {
        output.push_str(&format!("- {venue}\n"));
    }
    output
}

fn feature_label(name: &str) -> Cow<'_, str> {
    match name {
        "main_outcome" => Cow::Borrowed("Main outcome"),
        "methodology" => Cow::Borrowed("Methodology"),
        other => Cow::Owned(other.replace('_', " ")),
    }
}

fn truncate(text: &str) -> Cow<'_, str> {
    match text.char_indices().nth(ABSTRACT_PREVIEW_CHARS) {
        Some((cut, _)) => Cow::Owned(format!("{}...", &text[..cut])),
        None => Cow::Borrowed(text),
    }
}
