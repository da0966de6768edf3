pub mod crawler;
pub mod fetch;
pub mod retriever;
pub mod web;

pub use crawler::PageSource;
pub use fetch::FetchSource;
pub use retriever::Retriever;
pub use web::RenderSource;
