pub mod call;
pub mod catalog;
pub mod serve;

// Re-export command handlers
pub use call::CallCommand;
pub use catalog::CatalogCommand;
