use gn_core::{LocatedArticle, RawArticle, LOCATION_KEYWORD};

/// Keeps the articles tagged with a location, in their original order.
///
/// The first location keyword wins; articles without one are dropped.
pub fn extract_locations(articles: &[RawArticle]) -> Vec<LocatedArticle> {
    tracing::info!("🔎 Extracting locations from {} articles...", articles.len());
    let located: Vec<LocatedArticle> = articles.iter().filter_map(locate).collect();
    tracing::info!("✨ Extracted {} locations.", located.len());
    located
}

fn locate(article: &RawArticle) -> Option<LocatedArticle> {
    let location = article
        .keywords
        .iter()
        .find(|k| k.name == LOCATION_KEYWORD)?;
    Some(LocatedArticle {
        title: article.headline.main.clone(),
        url: article.web_url.clone(),
        location: location.value.clone(),
    })
}
