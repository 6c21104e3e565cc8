use safegear_catalog::{CatalogSnapshot, Category, Product};
use safegear_facets::{
    decode_selection, encode_selection, extract_options, project, schema_for, EngineConfig,
    FacetSelection, FacetValue, FilterError, FilterSession, FilterStore, Projection, SurfaceHandle,
    TriState,
};

const CATALOG: &str = r#"[
  { "id": "ey-1", "name": "Clear overspec", "category": "eyewear",
    "attributes": { "uv": "UV1", "esd": true, "en_standards": ["EN 166", "EN 170"], "lens_tint": "Clear" } },
  { "id": "ey-2", "name": "Smoke goggle", "category": "eyewear",
    "attributes": { "uv": "UV2", "esd": false, "en_standards": ["EN 166", "EN 172"], "lens_tint": "Smoke", "optical_class": 1 } },
  { "id": "ey-3", "name": "Visitor spec", "category": "eyewear",
    "attributes": { "uv": "UV1", "esd": null, "en_standards": ["EN 166"], "optical_class": 2 } },
  { "id": "gl-1", "name": "Cut glove", "category": "gloves",
    "attributes": { "cut_level": "C", "esd": true } }
]"#;

fn catalog() -> CatalogSnapshot {
    safegear_observability::init();
    CatalogSnapshot::from_json(CATALOG).unwrap()
}

fn session() -> FilterSession {
    FilterSession::new(catalog(), Category::Eyewear, EngineConfig::default())
}

fn visible_ids(projection: &Projection<'_>) -> Vec<String> {
    projection
        .visible_ids()
        .into_iter()
        .map(|id| id.as_str().to_string())
        .collect()
}

#[test]
fn and_across_facets_single_value() {
    let mut session = session();
    session.desktop().toggle("uv", "UV1").unwrap();
    assert_eq!(visible_ids(&session.project()), vec!["ey-1", "ey-3"]);

    session.desktop().set_flag("esd", TriState::Yes).unwrap();
    assert_eq!(visible_ids(&session.project()), vec!["ey-1"]);
}

#[test]
fn or_within_facet() {
    let mut session = session();
    session.mobile().toggle("uv", "UV1").unwrap();
    session.mobile().toggle("uv", "UV2").unwrap();
    assert_eq!(visible_ids(&session.project()), vec!["ey-1", "ey-2", "ey-3"]);

    session.mobile().replace("en_standards", ["EN 170", "EN 172"]).unwrap();
    assert_eq!(visible_ids(&session.project()), vec!["ey-1", "ey-2"]);
}

#[test]
fn boolean_absence_is_not_a_wildcard() {
    let mut session = session();
    session.desktop().set_flag("esd", TriState::Yes).unwrap();
    assert_eq!(visible_ids(&session.project()), vec!["ey-1"]);

    session.desktop().set_flag("esd", TriState::No).unwrap();
    assert_eq!(visible_ids(&session.project()), vec!["ey-2"]);
}

#[test]
fn toggle_twice_restores_selection() {
    let mut session = session();
    session.desktop().toggle("en_standards", "EN 166").unwrap();
    let before = session.store().snapshot();

    session.desktop().toggle("uv", "UV2").unwrap();
    session.mobile().toggle("uv", "UV2").unwrap();
    assert_eq!(session.store().snapshot(), before);
}

#[test]
fn desktop_and_mobile_sequences_converge() {
    fn replay(handle: &mut SurfaceHandle<'_>) {
        handle.toggle("uv", "UV1").unwrap();
        handle.cycle("esd").unwrap();
        handle.toggle("en_standards", "EN 170").unwrap();
        handle.toggle("uv", "UV2").unwrap();
        handle.cycle("esd").unwrap();
        handle.toggle("uv", "UV1").unwrap();
        handle.clear("en_standards").unwrap();
    }

    let mut desktop = session();
    let mut mobile = session();
    replay(&mut desktop.desktop());
    replay(&mut mobile.mobile());

    assert_eq!(desktop.store().snapshot(), mobile.store().snapshot());
    assert_eq!(visible_ids(&desktop.project()), visible_ids(&mobile.project()));
    assert_eq!(visible_ids(&desktop.project()), vec!["ey-2"]);
}

#[test]
fn clearing_everything_shows_the_whole_category() {
    let mut session = session();
    session.desktop().toggle("uv", "UV2").unwrap();
    session.desktop().set_flag("anti_fog", TriState::Yes).unwrap();
    assert!(session.project().visible().is_empty());

    session.mobile().clear_all().unwrap();
    let projection = session.project();
    assert_eq!(visible_ids(&projection), vec!["ey-1", "ey-2", "ey-3"]);
    assert_eq!(projection.active_count(), 0);
}

#[test]
fn selected_values_stay_listed_under_leave_one_out() {
    let mut session = session();
    session.desktop().toggle("uv", "UV1").unwrap();

    let projection = session.project();
    let uv = projection.option_set("uv").unwrap();
    assert_eq!(
        uv.values(),
        vec![&FacetValue::text("UV1"), &FacetValue::text("UV2")]
    );
    assert_eq!(uv.count_of(&FacetValue::text("UV1")), 2);
    assert_eq!(uv.count_of(&FacetValue::text("UV2")), 1);

    // Other facets only see products reachable under uv = UV1.
    let tint = projection.option_set("lens_tint").unwrap();
    assert_eq!(
        tint.values(),
        vec![&FacetValue::text("Clear"), &FacetValue::text("Not specified")]
    );
}

#[test]
fn unreachable_selected_value_is_listed_with_zero_count() {
    let mut session = session();
    session.desktop().toggle("uv", "UV2").unwrap();
    session.desktop().toggle("optical_class", "2").unwrap();

    let projection = session.project();
    assert!(projection.visible().is_empty());

    let optical = projection.option_set("optical_class").unwrap();
    assert_eq!(optical.values(), vec![&FacetValue::Number(1), &FacetValue::Number(2)]);
    assert_eq!(optical.count_of(&FacetValue::Number(2)), 0);
}

#[test]
fn degenerate_flag_is_hidden_until_selected() {
    let mut session = session();
    session.desktop().toggle("uv", "UV1").unwrap();

    // ey-1 is ESD safe, ey-3 does not say: only one value is reachable.
    let projection = session.project();
    assert!(projection.option_set("esd").unwrap().is_hidden());
    assert!(projection.displayed_options().all(|o| o.key() != "esd"));

    session.desktop().set_flag("esd", TriState::Yes).unwrap();
    assert!(!session.project().option_set("esd").unwrap().is_hidden());
}

#[test]
fn empty_catalog_yields_empty_results() {
    let products: Vec<Product> = Vec::new();
    let selection = FacetSelection::new().with_values("uv", ["UV1"]);
    let projection = project(&products, Category::Eyewear, &selection);

    assert!(projection.is_empty_catalog());
    assert!(projection.visible().is_empty());
    assert_eq!(projection.options().len(), schema_for(Category::Eyewear).len());
    assert!(projection.options().iter().all(|o| o.is_empty()));
}

#[test]
fn mis_tagged_product_is_skipped_not_fatal() {
    let json = r#"[
      { "id": "h-1", "name": "Ear plug", "category": "hearing", "attributes": { "snr": 32 } },
      { "id": "h-2", "name": "Ear muff", "category": "hearing", "attributes": { "snr": 28, "uv": "UV1" } }
    ]"#;
    let snapshot = CatalogSnapshot::from_json(json).unwrap();
    let session = FilterSession::new(snapshot, Category::Hearing, EngineConfig::default());

    let projection = session.project();
    assert_eq!(visible_ids(&projection), vec!["h-1"]);
    assert_eq!(projection.candidates(), 2);
    assert_eq!(projection.rejected().len(), 1);
    assert_eq!(projection.rejected()[0].product_id.as_str(), "h-2");
    assert!(matches!(projection.rejected()[0].error, FilterError::SchemaMismatch { .. }));
}

#[test]
fn bad_payload_records_do_not_sink_the_catalog() {
    let json = r#"[
      { "id": "h-1", "name": "Ear plug", "category": "hearing", "attributes": { "snr": 32 } },
      { "id": "h-2", "name": "Ear muff", "category": "hearing", "attributes": { "snr": 28.5 } },
      { "id": "t-1", "name": "Tool belt", "category": "toolbelts" }
    ]"#;
    let snapshot = CatalogSnapshot::from_json(json).unwrap();
    assert_eq!(snapshot.rejected().len(), 2);

    let session = FilterSession::new(snapshot, Category::Hearing, EngineConfig::default());
    assert_eq!(visible_ids(&session.project()), vec!["h-1"]);
}

#[test]
fn invalid_toggle_leaves_state_untouched() {
    let mut store = FilterStore::new(Category::Eyewear);
    store.desktop().toggle("uv", "UV1").unwrap();
    let before = store.snapshot();

    assert!(matches!(
        store.mobile().toggle("optical_class", "clear"),
        Err(FilterError::InvalidSelectionValue { .. })
    ));
    assert!(matches!(
        store.mobile().toggle("snr", "32"),
        Err(FilterError::SchemaMismatch { .. })
    ));
    assert_eq!(store.snapshot(), before);
}

#[test]
fn option_extraction_is_deterministic() {
    let snapshot = catalog();
    let schema = schema_for(Category::Eyewear);
    let eyewear = snapshot.for_category(Category::Eyewear);

    for facet in schema.facets() {
        let first = extract_options(eyewear.iter().copied(), facet);
        let second = extract_options(eyewear.iter().copied(), facet);
        assert_eq!(first, second, "facet {}", facet.key);
    }
}

#[test]
fn url_round_trip_reproduces_selection() {
    let mut session = session();
    session.desktop().toggle("en_standards", "EN 166").unwrap();
    session.desktop().toggle("optical_class", "1").unwrap();
    session.mobile().set_flag("esd", TriState::No).unwrap();

    let query = session.query_string();
    let schema = schema_for(Category::Eyewear);
    assert_eq!(&decode_selection(&query, &schema).unwrap(), session.store().selection());
    assert_eq!(encode_selection(session.store().selection(), &schema), query);

    let mut reloaded = FilterSession::new(catalog(), Category::Eyewear, EngineConfig::default());
    reloaded.restore_from_query(&format!("?{query}")).unwrap();
    assert_eq!(reloaded.store().selection(), session.store().selection());
    assert_eq!(visible_ids(&reloaded.project()), visible_ids(&session.project()));
}
