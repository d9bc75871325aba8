pub mod candidate_selector;
pub mod evidence;
pub mod keyword_filter;
pub mod providers;
pub mod query_builder;
pub mod recommendations;
pub mod resolver;

pub use keyword_filter::KeywordFilter;
pub use recommendations::{PipelineSettings, RecommendationPipeline, RecommendationReport};
