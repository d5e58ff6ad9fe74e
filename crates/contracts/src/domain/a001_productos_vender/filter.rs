use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::aggregate::{ProductoVender, StoredProducto};

/// Значение фильтра "все" для муниципалитета и категории
pub const ALL: &str = "todos";

/// Фильтр каталога (поиск, муниципалитет, категория, диапазон цены продажи)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFilter {
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub municipio: Option<String>,
    #[serde(default)]
    pub categoria: Option<String>,
    #[serde(default)]
    pub precio_min: Option<f64>,
    #[serde(default)]
    pub precio_max: Option<f64>,
}

impl CatalogFilter {
    pub fn matches(&self, p: &ProductoVender) -> bool {
        self.matches_search(p)
            && exact_or_all(self.municipio.as_deref(), &p.municipio)
            && exact_or_all(self.categoria.as_deref(), &p.categoria)
            && self.matches_price(p.precio_venta)
    }

    fn matches_search(&self, p: &ProductoVender) -> bool {
        let needle = match self.search.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ => return true,
        };
        p.producto.to_lowercase().contains(&needle) || p.codigo.to_lowercase().contains(&needle)
    }

    fn matches_price(&self, price: f64) -> bool {
        // Границы <= 0 считаются не заданными
        let min_ok = match self.precio_min {
            Some(min) if min > 0.0 => price >= min,
            _ => true,
        };
        let max_ok = match self.precio_max {
            Some(max) if max > 0.0 => price <= max,
            _ => true,
        };
        min_ok && max_ok
    }
}

fn exact_or_all(wanted: Option<&str>, actual: &str) -> bool {
    match wanted {
        None | Some(ALL) => true,
        Some(w) => w == actual,
    }
}

/// Доступные значения для выпадающих фильтров
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogFacets {
    pub municipios: Vec<String>,
    pub categorias: Vec<String>,
}

impl CatalogFacets {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ProductoVender>) -> Self {
        let mut municipios = BTreeSet::new();
        let mut categorias = BTreeSet::new();
        for p in records {
            if !p.municipio.is_empty() {
                municipios.insert(p.municipio.clone());
            }
            if !p.categoria.is_empty() {
                categorias.insert(p.categoria.clone());
            }
        }
        Self {
            municipios: municipios.into_iter().collect(),
            categorias: categorias.into_iter().collect(),
        }
    }
}

/// Результат запроса к каталогу
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogView {
    /// Всего товаров в каталоге (до фильтрации)
    pub total: usize,
    pub facets: CatalogFacets,
    pub productos: Vec<StoredProducto>,
}
