pub mod limiters;
pub mod query_hint;
pub mod similarity;

pub use limiters::Limiters;
pub use similarity::cosine_similarity;
