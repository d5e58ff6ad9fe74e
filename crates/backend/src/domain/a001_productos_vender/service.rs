use super::repository;
use contracts::domain::a001_productos_vender::{
    CatalogFacets, CatalogFilter, CatalogView, StoredProducto,
};
use sea_orm::DatabaseConnection;

/// Каталог с фильтрацией и списками значений для фильтров
pub async fn query_catalog(
    db: &DatabaseConnection,
    filter: &CatalogFilter,
) -> anyhow::Result<CatalogView> {
    let all = repository::list_all(db).await?;
    Ok(build_view(all, filter))
}

pub async fn count(db: &DatabaseConnection) -> anyhow::Result<u64> {
    Ok(repository::count(db).await?)
}

/// Facets строятся по всему каталогу, а не по отфильтрованной выборке
fn build_view(all: Vec<StoredProducto>, filter: &CatalogFilter) -> CatalogView {
    let total = all.len();
    let facets = CatalogFacets::from_records(all.iter().map(|s| &s.producto));
    let mut productos: Vec<StoredProducto> = all
        .into_iter()
        .filter(|s| filter.matches(&s.producto))
        .collect();
    productos.sort_by(|a, b| {
        a.producto
            .item_number
            .cmp(&b.producto.item_number)
            .then_with(|| a.producto.codigo.cmp(&b.producto.codigo))
    });

    CatalogView {
        total,
        facets,
        productos,
    }
}
