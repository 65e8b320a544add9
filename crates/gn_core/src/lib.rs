pub mod config;
pub mod error;
pub mod geocode;
pub mod source;
pub mod storage;
pub mod types;

pub use config::{HarvestConfig, HumanDuration};
pub use error::Error;
pub use geocode::Geocoder;
pub use source::ArticleSource;
pub use storage::{ArticleStorage, StorageSession};
pub use types::{
    Coordinates, EnrichedArticle, Headline, Keyword, LocatedArticle, RawArticle, StoredArticle,
    LOCATION_KEYWORD,
};

pub type Result<T> = std::result::Result<T, Error>;

pub mod prelude {
    pub use super::{
        ArticleSource, ArticleStorage, Coordinates, EnrichedArticle, Error, Geocoder,
        LocatedArticle, RawArticle, Result, StorageSession, StoredArticle,
    };
}
