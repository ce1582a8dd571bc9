pub mod catalog;
pub mod providers;
pub mod reconcile;
pub mod validation;
pub mod watchlist;

pub use catalog::CatalogOptions;
