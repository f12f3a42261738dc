mod common;

use common::{create_option, create_value, TestApp};
use rust_decimal_macros::dec;
use storefront_api::services::catalog::{
    AxisSelection, GenerateVariantsInput, UpdateProductInput, UpdateVariantInput,
};
use uuid::Uuid;

/// Build a product with four variants and set their stocks.
async fn product_with_variant_stocks(app: &TestApp, stocks: [Option<i32>; 4]) -> Uuid {
    let product_id = common::create_product(app, dec!(10.00), None).await;
    let talla_id = create_option(app, product_id, "Talla", 0).await;
    create_value(app, talla_id, "S", 0).await;
    create_value(app, talla_id, "M", 1).await;
    let color_id = create_option(app, product_id, "Color", 1).await;
    create_value(app, color_id, "Rojo", 0).await;
    create_value(app, color_id, "Azul", 1).await;

    app.state
        .services
        .variants
        .generate_variants(GenerateVariantsInput {
            product_id,
            axes: vec![
                AxisSelection {
                    option_id: talla_id,
                    value_ids: vec![],
                },
                AxisSelection {
                    option_id: color_id,
                    value_ids: vec![],
                },
            ],
            base_price: dec!(10.00),
        })
        .await
        .expect("generation should succeed");

    let views = app
        .state
        .services
        .variants
        .list_variants(product_id)
        .await
        .unwrap();
    assert_eq!(views.len(), 4);

    for (view, stock) in views.iter().zip(stocks) {
        app.state
            .services
            .variants
            .update_variant(
                view.id,
                UpdateVariantInput {
                    stock: Some(stock),
                    ..Default::default()
                },
            )
            .await
            .expect("stock update should succeed");
    }

    product_id
}

#[tokio::test]
async fn explicit_product_stock_is_authoritative() {
    let app = TestApp::new().await;
    let product_id = product_with_variant_stocks(&app, [Some(3), Some(0), None, Some(5)]).await;

    // Admin sets an explicit figure; variant totals must not override it
    app.state
        .services
        .products
        .update_product(
            product_id,
            UpdateProductInput {
                stock: Some(Some(42)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let product = app
        .state
        .services
        .products
        .get_product(product_id)
        .await
        .unwrap();
    let resolved = app
        .state
        .services
        .stock
        .resolve_product_stock(&product)
        .await
        .unwrap();

    assert_eq!(resolved, Some(42));
}

#[tokio::test]
async fn unset_product_stock_derives_from_variants() {
    let app = TestApp::new().await;
    let product_id = product_with_variant_stocks(&app, [Some(3), Some(0), None, Some(5)]).await;

    let product = app
        .state
        .services
        .products
        .get_product(product_id)
        .await
        .unwrap();
    assert_eq!(product.stock, None);

    let resolved = app
        .state
        .services
        .stock
        .resolve_product_stock(&product)
        .await
        .unwrap();

    assert_eq!(resolved, Some(8));
}

#[tokio::test]
async fn all_untracked_variants_resolve_to_none_not_zero() {
    let app = TestApp::new().await;
    let product_id = product_with_variant_stocks(&app, [None, None, Some(0), Some(0)]).await;

    let product = app
        .state
        .services
        .products
        .get_product(product_id)
        .await
        .unwrap();
    let resolved = app
        .state
        .services
        .stock
        .resolve_product_stock(&product)
        .await
        .unwrap();

    assert_eq!(resolved, None);
}

#[tokio::test]
async fn clearing_product_stock_switches_back_to_derived() {
    let app = TestApp::new().await;
    let product_id = product_with_variant_stocks(&app, [Some(2), Some(4), None, None]).await;

    // Explicit override first
    app.state
        .services
        .products
        .update_product(
            product_id,
            UpdateProductInput {
                stock: Some(Some(99)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // Blank form input clears the override
    app.state
        .services
        .products
        .update_product(
            product_id,
            UpdateProductInput {
                stock: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let product = app
        .state
        .services
        .products
        .get_product(product_id)
        .await
        .unwrap();
    assert_eq!(product.stock, None);

    let resolved = app
        .state
        .services
        .stock
        .resolve_product_stock(&product)
        .await
        .unwrap();
    assert_eq!(resolved, Some(6));
}

#[tokio::test]
async fn product_without_variants_resolves_to_none() {
    let app = TestApp::new().await;
    let product_id = common::create_product(&app, dec!(10.00), None).await;

    let product = app
        .state
        .services
        .products
        .get_product(product_id)
        .await
        .unwrap();
    let resolved = app
        .state
        .services
        .stock
        .resolve_product_stock(&product)
        .await
        .unwrap();

    assert_eq!(resolved, None);
}
