use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Normalized record
// ============================================================================

/// Товар каталога после нормализации строки Excel.
/// Все числовые поля всегда заполнены (отсутствующее значение = 0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductoVender {
    /// Номер позиции: колонка "Ítems" или номер строки (с 1)
    pub item_number: i32,

    /// Натуральный ключ, никогда не пустой
    pub codigo: String,

    pub municipio: String,
    pub categoria: String,
    pub producto: String,
    pub presentacion: String,

    pub costo_pcc: f64,
    pub porcentaje_logistica: f64,
    pub porcentaje_transporte: f64,
    pub precio_sugerido: f64,
    pub precio_venta: f64,
}

impl ProductoVender {
    /// Пустая запись с заданным кодом (удобно для тестов и ручного заполнения)
    pub fn with_codigo(item_number: i32, codigo: impl Into<String>) -> Self {
        Self {
            item_number,
            codigo: codigo.into(),
            municipio: String::new(),
            categoria: String::new(),
            producto: String::new(),
            presentacion: String::new(),
            costo_pcc: 0.0,
            porcentaje_logistica: 0.0,
            porcentaje_transporte: 0.0,
            precio_sugerido: 0.0,
            precio_venta: 0.0,
        }
    }
}

// ============================================================================
// Stored row
// ============================================================================

/// Запись каталога в хранилище: суррогатный id и временные метки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredProducto {
    pub id: i32,

    #[serde(flatten)]
    pub producto: ProductoVender,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
