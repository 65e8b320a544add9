pub mod driver;
pub mod enrich;
pub mod extract;
pub mod logging;
pub mod source;

pub use driver::{BatchOutcome, HarvestDriver, RunSummary};
pub use enrich::Enricher;
pub use extract::extract_locations;
pub use logging::init_logging;
pub use source::ArticleSearchClient;

pub mod prelude {
    pub use super::{extract_locations, ArticleSearchClient, Enricher, HarvestDriver, RunSummary};
    pub use gn_core::{ArticleSource, EnrichedArticle, Error, HarvestConfig, LocatedArticle, RawArticle, Result};
}
