/// Заголовки колонок файла bD_canastasVerdes.xlsx (первый лист)
pub struct Columns;

impl Columns {
    pub const ITEM: &'static str = "Ítems";
    pub const CODE: &'static str = "Código";
    pub const CITY: &'static str = "Municipio";
    pub const CATEGORY: &'static str = "Categoría";
    pub const PRODUCT: &'static str = "Producto";
    pub const PRESENTATION: &'static str = "Presentación";
    pub const COST: &'static str = "Costo Pcc";
    pub const LOGISTICS: &'static str = "% Logística";
    pub const TRANSPORT: &'static str = "%Transporte";
    /// Встречается в старых выгрузках; используется только если нет TRANSPORT
    pub const TRANSPORT_ALT: &'static str = "% Transporte";
    pub const SUGGESTED: &'static str = "Precio Sugerido";
    pub const SALE: &'static str = "Precio de Venta";
}

/// Имя файла каталога по умолчанию (ищется в рабочей директории процесса)
pub const DEFAULT_EXCEL_FILE: &str = "bD_canastasVerdes.xlsx";
