use crate::{
    entities::{product, product_variant, ProductVariant},
    errors::ServiceError,
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::sync::Arc;
use tracing::instrument;

/// Resolves a product's effective stock from the two-level stock model.
///
/// An explicitly set product stock is authoritative. When it is NULL the
/// figure is derived from the variants on every read that needs it; the
/// derived value is displayed, never written back.
#[derive(Clone)]
pub struct StockService {
    db: Arc<DatabaseConnection>,
}

impl StockService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Effective stock for a product: the admin override when set, else the
    /// sum of tracked variant stocks, else "not tracked".
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn resolve_product_stock(
        &self,
        product: &product::Model,
    ) -> Result<Option<i64>, ServiceError> {
        if let Some(stock) = product.stock {
            return Ok(Some(i64::from(stock)));
        }

        let variants = ProductVariant::find()
            .filter(product_variant::Column::ProductId.eq(product.id))
            .all(&*self.db)
            .await?;

        Ok(aggregate_variant_stock(variants.iter().map(|v| v.stock)))
    }
}

/// Sums variant stocks treating untracked (NULL) as 0. A non-positive total
/// reports "not tracked" rather than a misleading zero.
pub fn aggregate_variant_stock(stocks: impl Iterator<Item = Option<i32>>) -> Option<i64> {
    let total: i64 = stocks.map(|s| i64::from(s.unwrap_or(0))).sum();
    (total > 0).then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_tracked_stocks_treating_null_as_zero() {
        let stocks = [Some(3), Some(0), None, Some(5)];
        assert_eq!(aggregate_variant_stock(stocks.into_iter()), Some(8));
    }

    #[test]
    fn all_untracked_reports_not_tracked() {
        let stocks = [None, None, None];
        assert_eq!(aggregate_variant_stock(stocks.into_iter()), None);
    }

    #[test]
    fn all_zero_reports_not_tracked_not_zero() {
        let stocks = [Some(0), Some(0)];
        assert_eq!(aggregate_variant_stock(stocks.into_iter()), None);
    }

    #[test]
    fn no_variants_reports_not_tracked() {
        assert_eq!(aggregate_variant_stock(std::iter::empty()), None);
    }

    #[test]
    fn single_tracked_variant_wins() {
        let stocks = [None, Some(1)];
        assert_eq!(aggregate_variant_stock(stocks.into_iter()), Some(1));
    }
}
