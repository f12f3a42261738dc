mod common;

use assert_matches::assert_matches;
use common::{create_option, TestApp};
use rust_decimal_macros::dec;
use storefront_api::{
    errors::ServiceError,
    services::catalog::{AxisSelection, GenerateVariantsInput, QuickTemplate},
};

#[tokio::test]
async fn ropa_template_seeds_talla_and_color() {
    let app = TestApp::new().await;
    let product_id = common::create_product(&app, dec!(15.00), None).await;

    app.state
        .services
        .templates
        .apply_template(product_id, QuickTemplate::Ropa)
        .await
        .expect("template should apply");

    let options = app
        .state
        .services
        .options
        .list_options(product_id)
        .await
        .unwrap();
    assert_eq!(options.len(), 2);

    let talla = &options[0];
    assert_eq!(talla.option.name, "Talla");
    assert_eq!(talla.option.position, 0);
    let talla_values: Vec<&str> = talla.values.iter().map(|v| v.value.as_str()).collect();
    assert_eq!(talla_values, ["XS", "S", "M", "L", "XL", "XXL"]);
    let positions: Vec<i32> = talla.values.iter().map(|v| v.position).collect();
    assert_eq!(positions, [0, 1, 2, 3, 4, 5]);

    let color = &options[1];
    assert_eq!(color.option.name, "Color");
    assert_eq!(color.option.position, 1);
    assert_eq!(color.values.len(), 4);
    for value in &color.values {
        let hex = value
            .swatch_hex
            .as_deref()
            .expect("color values carry a swatch");
        assert!(hex.starts_with('#') && hex.len() == 7);
        assert!(value.visible);
    }
}

#[tokio::test]
async fn template_refuses_product_that_already_has_options() {
    let app = TestApp::new().await;
    let product_id = common::create_product(&app, dec!(15.00), None).await;
    create_option(&app, product_id, "Material", 0).await;

    let err = app
        .state
        .services
        .templates
        .apply_template(product_id, QuickTemplate::Ropa)
        .await
        .expect_err("template on a configured product must fail");

    assert_matches!(err, ServiceError::TemplateNotApplicable(_));

    // Nothing was partially applied
    let options = app
        .state
        .services
        .options
        .list_options(product_id)
        .await
        .unwrap();
    assert_eq!(options.len(), 1);
    assert_eq!(options[0].option.name, "Material");
}

#[tokio::test]
async fn template_cannot_be_applied_twice() {
    let app = TestApp::new().await;
    let product_id = common::create_product(&app, dec!(15.00), None).await;

    app.state
        .services
        .templates
        .apply_template(product_id, QuickTemplate::Ropa)
        .await
        .unwrap();

    let err = app
        .state
        .services
        .templates
        .apply_template(product_id, QuickTemplate::Ropa)
        .await
        .expect_err("second application must fail");
    assert_matches!(err, ServiceError::TemplateNotApplicable(_));
}

#[tokio::test]
async fn template_then_generation_covers_the_full_matrix() {
    let app = TestApp::new().await;
    let product_id = common::create_product(&app, dec!(10.00), None).await;

    app.state
        .services
        .templates
        .apply_template(product_id, QuickTemplate::Ropa)
        .await
        .unwrap();

    let options = app
        .state
        .services
        .options
        .list_options(product_id)
        .await
        .unwrap();
    let axes: Vec<AxisSelection> = options
        .iter()
        .map(|o| AxisSelection {
            option_id: o.option.id,
            value_ids: vec![],
        })
        .collect();

    let result = app
        .state
        .services
        .variants
        .generate_variants(GenerateVariantsInput {
            product_id,
            axes,
            base_price: dec!(10.00),
        })
        .await
        .unwrap();

    // 6 sizes × 4 colors
    assert_eq!(result.created, 24);

    let views = app
        .state
        .services
        .variants
        .list_variants(product_id)
        .await
        .unwrap();
    assert_eq!(views.len(), 24);

    // Every L-size combination carries the surcharge; the rest do not
    let (l_views, other_views): (Vec<_>, Vec<_>) = views
        .iter()
        .partition(|v| v.display_name.contains("Talla: L /"));
    assert_eq!(l_views.len(), 4);
    for view in l_views {
        assert_eq!(view.price, Some(dec!(11.00)));
    }
    for view in other_views {
        assert_eq!(view.price, Some(dec!(10.00)));
    }
}
