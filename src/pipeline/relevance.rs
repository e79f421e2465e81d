//! Relevance pre-filter: a cheap keyword pass that bounds how many articles
//! reach the expensive extraction stage.
//!
//! Policy: false positives are acceptable, false negatives are not. Anything
//! ambiguous or unscorable stays in (fail-open); extraction rejects garbage
//! on its own.

use tracing::info;

use crate::types::article::Article;
use crate::types::config::RelevanceConfig;

/// Ephemeral per-article decision, handed to extraction and dropped.
#[derive(Debug, Clone)]
pub struct RelevanceDecision {
    pub article_id: String,
    pub is_relevant: bool,
    pub reason: Option<String>,
}

/// Output of the relevance pass.
#[derive(Debug, Clone)]
pub struct RelevanceOutcome {
    /// Relevant articles in their original order (stable filter).
    pub relevant: Vec<Article>,

    pub rejected_count: usize,

    pub decisions: Vec<RelevanceDecision>,
}

/// Filter articles down to those plausibly describing a startup/venture.
pub fn filter_relevant(
    articles: Vec<Article>,
    topic: &str,
    config: &RelevanceConfig,
) -> RelevanceOutcome {
    let topic_tokens: Vec<String> = topic
        .split_whitespace()
        .map(|t| t.to_lowercase())
        .filter(|t| t.len() >= 3)
        .collect();

    let total = articles.len();
    let mut relevant = Vec::with_capacity(total);
    let mut decisions = Vec::with_capacity(total);
    let mut rejected_count = 0usize;

    for article in articles {
        let haystack = article.text().to_lowercase();

        let keyword_hit = config.keywords.iter().find(|kw| haystack.contains(kw.as_str()));
        let topic_hit = topic_tokens.iter().find(|t| haystack.contains(t.as_str()));

        // An article with no body can't be scored; fail open.
        let is_relevant = keyword_hit.is_some() || topic_hit.is_some() || !article.has_body();

        let reason = keyword_hit
            .map(|kw| format!("keyword '{}'", kw))
            .or_else(|| topic_hit.map(|t| format!("topic term '{}'", t)));

        decisions.push(RelevanceDecision {
            article_id: article.id.clone(),
            is_relevant,
            reason,
        });

        if is_relevant {
            relevant.push(article);
        } else {
            rejected_count += 1;
        }
    }

    info!(
        kept = relevant.len(),
        rejected = rejected_count,
        total,
        "relevance pre-filter complete"
    );

    RelevanceOutcome {
        relevant,
        rejected_count,
        decisions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::article::Origin;
    use crate::types::config::SourceCategory;

    fn article(id: &str, title: &str, body: &str) -> Article {
        Article {
            id: id.to_string(),
            source_category: SourceCategory::GeneralStartups,
            title: title.to_string(),
            body_text: body.to_string(),
            url: String::new(),
            published_at: None,
            origin: Origin::Feed,
        }
    }

    #[test]
    fn test_keyword_match_keeps_article() {
        let articles = vec![
            article("a", "Acme", "The startup raised a new round."),
            article("b", "Recipes", "Ten ways to cook lentils."),
        ];
        let out = filter_relevant(articles, "fintech", &RelevanceConfig::default());
        assert_eq!(out.relevant.len(), 1);
        assert_eq!(out.relevant[0].id, "a");
        assert_eq!(out.rejected_count, 1);
    }

    #[test]
    fn test_topic_terms_also_match() {
        let articles = vec![article("a", "Lentil report", "New lentil processing plants in Spain.")];
        let out = filter_relevant(articles, "lentil processing", &RelevanceConfig::default());
        assert_eq!(out.relevant.len(), 1);
        assert!(out.decisions[0]
            .reason
            .as_deref()
            .unwrap()
            .contains("topic term"));
    }

    #[test]
    fn test_filter_is_stable() {
        let articles = vec![
            article("a", "Startup one", "startup news"),
            article("b", "Recipes", "cooking"),
            article("c", "Startup two", "startup news"),
            article("d", "Startup three", "startup news"),
        ];
        let out = filter_relevant(articles, "x", &RelevanceConfig::default());
        let ids: Vec<_> = out.relevant.iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c", "d"]);
    }

    #[test]
    fn test_unscorable_article_fails_open() {
        let articles = vec![article("a", "", "   ")];
        let out = filter_relevant(articles, "fintech", &RelevanceConfig::default());
        assert_eq!(out.relevant.len(), 1);
        assert_eq!(out.rejected_count, 0);
    }
}
