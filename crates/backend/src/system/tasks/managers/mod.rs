pub mod u501_import_productos;

pub use u501_import_productos::U501ImportProductosManager;
