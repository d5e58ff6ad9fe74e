pub mod a001_productos_vender;
