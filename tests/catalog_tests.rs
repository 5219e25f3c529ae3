/// Integration tests for catalog normalization and lookup
use serde_json::json;
use shop_estimate::catalog::{normalize, parse_catalog, CatalogIndex, CatalogLoadError, LookupError};
use tokio_test::assert_ok;

fn nested_document() -> serde_json::Value {
    json!({
        "categories": [
            {
                "key": "brakes",
                "name": "Brakes",
                "services": [
                    {"code": "front_pads", "name": "Front Pads", "labor_hours_min": 1.0, "labor_hours_max": 1.5},
                    {"code": "rotors", "name": "Rotors", "labor_hours_min": 1.5, "labor_hours_max": 2.5,
                     "flat_rate_min": 300, "flat_rate_max": 550}
                ]
            },
            {
                "key": "engine",
                "name": "Engine",
                "services": [
                    {"code": "diag", "name": "Engine Diagnostic", "labor_hours_min": 1.0, "labor_hours_max": 2.5}
                ]
            }
        ]
    })
}

#[test]
fn test_heterogeneous_shapes_normalize_identically() {
    let expected = assert_ok!(normalize(&nested_document()));

    let flat_rows = json!({
        "rows": [
            {"category_key": "engine", "category_name": "Engine", "service_code": "diag",
             "service_name": "Engine Diagnostic", "hours_min": "1.0", "hours_max": 2.5},
            {"service_category": "Brakes", "code": "front_pads", "service": "Front Pads",
             "min_hours": 1, "max_hours": 1.5},
            {"categoryKey": "brakes", "categoryName": "Brakes", "serviceCode": "rotors", "serviceName": "Rotors",
             "laborHoursMin": 1.5, "laborHoursMax": 2.5, "flatRateMin": "$300", "flatRateMax": 550}
        ]
    });

    let keyed_map = json!({
        "brakes": {
            "name": "Brakes",
            "services": [
                {"code": "rotors", "name": "Rotors", "hours_min": 1.5, "hours_max": 2.5,
                 "price_min": 300, "price_max": 550},
                {"code": "front_pads", "name": "Front Pads", "hours_min": 1.0, "hours_max": 1.5}
            ]
        },
        "engine": {
            "name": "Engine",
            "items": [{"id": "diag", "label": "Engine Diagnostic", "labor_min": 1.0, "labor_max": 2.5}]
        }
    });

    let wrapped = json!({ "data": { "catalog": nested_document()["categories"].clone() } });
    let top_level_list = nested_document()["categories"].clone();

    for document in [flat_rows, keyed_map, wrapped, top_level_list] {
        let index = assert_ok!(normalize(&document));
        assert_eq!(index, expected, "document did not normalize canonically: {}", document);
    }
}

#[test]
fn test_normalization_is_idempotent() {
    let bytes = serde_json::to_vec(&nested_document()).unwrap();
    let first = assert_ok!(parse_catalog(&bytes));
    let second = assert_ok!(parse_catalog(&bytes));
    assert_eq!(first, second);
}

#[test]
fn test_bounds_are_backfilled_and_ordered() {
    let index = assert_ok!(normalize(&json!({
        "services": [
            {"category": "misc", "code": "only_max", "labor_hours_max": 2.0},
            {"category": "misc", "code": "only_min", "labor_hours_min": 0.5, "flat_rate_max": 120},
            {"category": "misc", "code": "reversed", "labor_hours_min": 3.0, "labor_hours_max": 1.0},
            {"category": "misc", "code": "garbage", "labor_hours_min": "soon", "labor_hours_max": -4},
            {"category": "misc", "code": "single", "labor_hours": 0.75, "flat_rate": 95}
        ]
    })));

    for category in index.categories() {
        for service in category.services() {
            assert!(service.labor_hours_min > 0.0);
            assert!(service.labor_hours_max >= service.labor_hours_min);
            if let Some((min, max)) = service.flat_rate() {
                assert!(min > 0.0 && max >= min);
            }
        }
    }

    let service = |code: &str| index.find_service("misc", code).unwrap().clone();
    assert_eq!((service("only_max").labor_hours_min, service("only_max").labor_hours_max), (2.0, 2.0));
    assert_eq!(service("only_min").flat_rate(), Some((120.0, 120.0)));
    assert_eq!((service("reversed").labor_hours_min, service("reversed").labor_hours_max), (1.0, 3.0));
    assert_eq!((service("garbage").labor_hours_min, service("garbage").labor_hours_max), (1.0, 1.0));
    assert_eq!(service("single").flat_rate(), Some((95.0, 95.0)));
}

#[test]
fn test_every_indexed_service_resolves() {
    let index: CatalogIndex = assert_ok!(normalize(&nested_document()));

    for category in index.categories() {
        assert_eq!(assert_ok!(index.find_category(&category.key)).key, category.key);
        for service in category.services() {
            let found = assert_ok!(index.find_service(&category.key, &service.code));
            assert_eq!(found, service);
        }
    }

    assert_eq!(
        index.find_service("brakes", "Front_Pads").unwrap_err(),
        LookupError::ServiceNotFound {
            category: "brakes".to_string(),
            code: "Front_Pads".to_string(),
        }
    );
    assert!(matches!(
        index.find_category("tires"),
        Err(LookupError::CategoryNotFound(ref key)) if key == "tires"
    ));
}

#[test]
fn test_sorted_by_display_name() {
    let index = assert_ok!(normalize(&json!([
        {"category": "zeta", "category_name": "zulu", "service": "b"},
        {"category": "alpha", "category_name": "Alpha", "service": "Beta"},
        {"category": "alpha", "category_name": "Alpha", "service": "alpha"},
        {"category": "mid", "category_name": "Mike", "service": "x"}
    ])));

    let names: Vec<&str> = index.categories().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "Mike", "zulu"]);

    let services: Vec<&str> = index
        .find_category("alpha")
        .unwrap()
        .services()
        .iter()
        .map(|s| s.name.as_str())
        .collect();
    assert_eq!(services, vec!["alpha", "Beta"]);
}

#[test]
fn test_load_errors_are_distinguishable() {
    assert!(matches!(parse_catalog(b"{{{"), Err(CatalogLoadError::Malformed(_))));
    assert!(matches!(parse_catalog(b"{\"categories\": []}"), Err(CatalogLoadError::Empty)));
    assert!(matches!(
        parse_catalog(b"[{\"service\": \"orphan row without category\"}]"),
        Err(CatalogLoadError::Empty)
    ));
}

#[test]
fn test_shipped_catalog_loads() {
    let bytes = std::fs::read(concat!(env!("CARGO_MANIFEST_DIR"), "/data/services_catalog.json")).unwrap();
    let index = assert_ok!(parse_catalog(&bytes));

    assert_eq!(index.default_labor_rate(), Some(90.0));
    assert!(index.find_service("brakes", "front_brake_pads").is_ok());
    assert_eq!(index.categories().len(), 20);
    assert!(index.service_count() >= 100);

    let manifold = assert_ok!(index.find_service("intake_air", "intake_manifold_replace"));
    assert_eq!(manifold.name, "Intake Manifold Replacement");
    assert_eq!(manifold.flat_rate(), Some((900.0, 2400.0)));

    for key in [
        "transmission",
        "driveline",
        "fuel_ignition",
        "exhaust_emissions",
        "tires_wheels",
        "lighting",
        "body",
        "interior",
        "gaskets_seals",
        "inspection",
        "sensors",
        "belts",
        "starting_charging",
    ] {
        assert_ok!(index.find_category(key));
    }
}
