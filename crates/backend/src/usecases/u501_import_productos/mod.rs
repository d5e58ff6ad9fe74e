pub mod errors;
pub mod excel_reader;
pub mod executor;
pub mod normalizer;
pub mod store;

pub use errors::ImportError;
pub use executor::ImportExecutor;
pub use store::{CatalogStore, SeaOrmCatalogStore};
