use serde::{Deserialize, Deserializer, Serialize};

/// Keyword category the search API uses for geographic locations.
pub const LOCATION_KEYWORD: &str = "glocations";

/// An article as returned by the search API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    #[serde(default, deserialize_with = "null_as_default")]
    pub headline: Headline,
    #[serde(default, deserialize_with = "null_as_default")]
    pub keywords: Vec<Keyword>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub web_url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    #[serde(default, deserialize_with = "null_as_default")]
    pub main: String,
}

/// Reads an explicit `null` the same way as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyword {
    pub name: String,
    pub value: String,
}

/// An article that carries a location. Articles without one never get this far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocatedArticle {
    pub title: String,
    pub url: String,
    pub location: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// A located article plus whatever coordinates geocoding produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedArticle {
    pub title: String,
    pub url: String,
    pub location: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl EnrichedArticle {
    /// Both halves of the pair, or nothing.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinates { lat, lon }),
            _ => None,
        }
    }

    pub fn set_coordinates(&mut self, coordinates: Coordinates) {
        self.lat = Some(coordinates.lat);
        self.lon = Some(coordinates.lon);
    }
}

impl From<LocatedArticle> for EnrichedArticle {
    fn from(article: LocatedArticle) -> Self {
        Self {
            title: article.title,
            url: article.url,
            location: article.location,
            lat: None,
            lon: None,
        }
    }
}

/// The persisted form of an [`EnrichedArticle`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredArticle {
    pub id: i64,
    pub title: String,
    pub url: String,
    pub location: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

impl StoredArticle {
    pub fn from_enriched(id: i64, article: &EnrichedArticle) -> Self {
        Self {
            id,
            title: article.title.clone(),
            url: article.url.clone(),
            location: article.location.clone(),
            lat: article.lat,
            lon: article.lon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_article_tolerates_missing_fields() {
        let article: RawArticle = serde_json::from_str(r#"{"web_url": "http://x/1"}"#).unwrap();
        assert_eq!(article.web_url, "http://x/1");
        assert!(article.headline.main.is_empty());
        assert!(article.keywords.is_empty());
    }

    #[test]
    fn test_raw_article_tolerates_nulls() {
        let article: RawArticle = serde_json::from_str(
            r#"{"headline": {"main": null}, "keywords": null, "web_url": "http://x/1"}"#,
        )
        .unwrap();
        assert!(article.headline.main.is_empty());
        assert!(article.keywords.is_empty());

        let article: RawArticle = serde_json::from_str(r#"{"headline": null, "web_url": null}"#).unwrap();
        assert_eq!(article, RawArticle::default());
    }

    #[test]
    fn test_coordinates_require_both_halves() {
        let mut article = EnrichedArticle::from(LocatedArticle {
            title: "A".to_string(),
            url: "http://x/1".to_string(),
            location: "Paris".to_string(),
        });
        assert_eq!(article.coordinates(), None);

        article.lat = Some(48.85);
        assert_eq!(article.coordinates(), None);

        article.set_coordinates(Coordinates { lat: 48.85, lon: 2.35 });
        assert_eq!(article.coordinates(), Some(Coordinates { lat: 48.85, lon: 2.35 }));
    }
}
