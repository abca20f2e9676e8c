mod common;

use common::{sample_catalog, CountingSource, SHIP};
use std::sync::atomic::Ordering;
use techforge_core::cache::Catalog;
use techforge_core::error::CatalogError;

#[tokio::test]
async fn test_concurrent_tree_requests_fetch_once() {
    let catalog = Catalog::new(CountingSource::new(sample_catalog()));

    let (a, b, c) = tokio::join!(
        catalog.tech_tree(SHIP),
        catalog.tech_tree(SHIP),
        catalog.tech_tree(SHIP)
    );
    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    assert_eq!(catalog.source().tree_fetches(), 1);

    catalog.tech_tree(SHIP).await.unwrap();
    assert_eq!(catalog.source().tree_fetches(), 1);
}

#[tokio::test]
async fn test_each_ship_type_is_cached_separately() {
    let catalog = Catalog::new(CountingSource::new(sample_catalog()));
    catalog.tech_tree(SHIP).await.unwrap();
    catalog.tech_tree("freighter").await.unwrap();
    assert_eq!(catalog.source().tree_fetches(), 2);
}

#[tokio::test]
async fn test_failed_fetch_is_retried() {
    let catalog = Catalog::new(CountingSource::new(sample_catalog()));
    catalog.source().set_failing(true);
    assert!(matches!(catalog.tech_tree(SHIP).await, Err(CatalogError::Http(_))));

    catalog.source().set_failing(false);
    assert!(catalog.tech_tree(SHIP).await.is_ok());
    assert_eq!(catalog.source().tree_fetches(), 2);
}

#[tokio::test]
async fn test_invalidate_and_clear_force_refetch() {
    let catalog = Catalog::new(CountingSource::new(sample_catalog()));
    catalog.tech_tree(SHIP).await.unwrap();

    catalog.invalidate(SHIP);
    catalog.tech_tree(SHIP).await.unwrap();
    assert_eq!(catalog.source().tree_fetches(), 2);

    catalog.ship_types().await.unwrap();
    catalog.clear();
    catalog.tech_tree(SHIP).await.unwrap();
    catalog.ship_types().await.unwrap();
    assert_eq!(catalog.source().tree_fetches(), 3);
    assert_eq!(catalog.source().ship_type_fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_ship_type_keys_are_sorted() {
    let catalog = Catalog::new(sample_catalog());
    assert_eq!(
        catalog.ship_type_keys().await.unwrap(),
        vec!["freighter".to_string(), "standard".to_string()]
    );
}

#[tokio::test]
async fn test_unknown_ship_type_is_error() {
    let catalog = Catalog::new(sample_catalog());
    assert!(matches!(
        catalog.tech_tree("corvette").await,
        Err(CatalogError::UnknownShipType(ship)) if ship == "corvette"
    ));
}
