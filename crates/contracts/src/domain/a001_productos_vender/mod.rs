pub mod aggregate;
pub mod excel;
pub mod filter;

pub use aggregate::{ProductoVender, StoredProducto};
pub use excel::Columns;
pub use filter::{CatalogFacets, CatalogFilter, CatalogView};
