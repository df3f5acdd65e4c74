//! Rescue-candidate selection behavior.

use async_trait::async_trait;
use bson::{Bson, Document, doc};
use shelterstore::{memory::MemoryBackend, prelude::*};

fn finder() -> RescueFinder<MemoryBackend> {
    RescueFinder::new(DocumentStore::new(MemoryBackend::new(), "AAC", "animals").unwrap())
}

async fn seed(store: &DocumentStore<MemoryBackend>, animal_type: &str, breed: &str, weeks: i32) -> Bson {
    store
        .create(doc! {
            "animal_type": animal_type,
            "breed": breed,
            "age_upon_outcome_in_weeks": weeks,
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn water_candidates_filtered_by_breed() {
    let finder = finder();
    let newfoundland = seed(finder.store(), "Dog", "Newfoundland", 40).await;
    seed(finder.store(), "Dog", "Poodle", 40).await;

    let candidates = finder.find_candidates("water").await.unwrap();

    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].get("_id"), Some(&newfoundland));
    assert_eq!(candidates[0].get_str("breed").unwrap(), "Newfoundland");
}

#[tokio::test]
async fn water_age_window_is_inclusive() {
    let finder = finder();
    seed(finder.store(), "Dog", "Portuguese Water Dog", 26).await;
    seed(finder.store(), "Dog", "Portuguese Water Dog", 156).await;
    seed(finder.store(), "Dog", "Portuguese Water Dog", 25).await;
    seed(finder.store(), "Dog", "Portuguese Water Dog", 157).await;

    let candidates = finder.find_candidates("water").await.unwrap();

    assert_eq!(candidates.len(), 2);
    for candidate in &candidates {
        let weeks = candidate.get_i32("age_upon_outcome_in_weeks").unwrap();
        assert!((26..=156).contains(&weeks));
    }
}

#[tokio::test]
async fn disaster_uses_the_wider_age_window() {
    let finder = finder();
    seed(finder.store(), "Dog", "Bloodhound", 20).await;
    seed(finder.store(), "Dog", "Bloodhound", 300).await;
    seed(finder.store(), "Dog", "Bloodhound", 19).await;
    seed(finder.store(), "Dog", "Bloodhound", 301).await;

    let candidates = finder.find_candidates("disaster").await.unwrap();

    assert_eq!(candidates.len(), 2);
}

#[tokio::test]
async fn mountain_breeds_do_not_satisfy_water() {
    let finder = finder();
    seed(finder.store(), "Dog", "Siberian Husky", 52).await;

    assert!(finder.find_candidates("water").await.unwrap().is_empty());
    assert_eq!(finder.find_candidates("mountain").await.unwrap().len(), 1);
}

#[tokio::test]
async fn non_dogs_are_excluded() {
    let finder = finder();
    seed(finder.store(), "Cat", "Newfoundland", 40).await;

    assert!(finder.find_candidates("water").await.unwrap().is_empty());
}

#[tokio::test]
async fn category_parsing_is_case_insensitive() {
    let finder = finder();
    seed(finder.store(), "Dog", "Newfoundland", 40).await;

    assert_eq!(finder.find_candidates("WATER").await.unwrap().len(), 1);
    assert_eq!("Disaster".parse::<RescueCategory>().unwrap(), RescueCategory::Disaster);
}

#[tokio::test]
async fn unknown_category_issues_no_query() {
    let finder =
        RescueFinder::new(DocumentStore::new(UnreachableBackend, "AAC", "animals").unwrap());

    let err = finder.find_candidates("space").await.unwrap_err();

    assert!(matches!(err, StoreError::UnknownCategory(ref category) if category == "space"));
}

#[tokio::test]
async fn invalid_arguments_issue_no_query() {
    let store = DocumentStore::new(UnreachableBackend, "AAC", "animals").unwrap();

    let err = store.create("just a string").await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));

    let err = store.read(Some(Bson::Int32(7))).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidArgument(_)));
}

#[tokio::test]
async fn criteria_stay_in_the_native_dialect() {
    let criteria = RescueCategory::Water.criteria();

    assert_eq!(criteria.get_str("animal_type").unwrap(), "Dog");

    let breeds = criteria
        .get_document("breed")
        .unwrap()
        .get_array("$in")
        .unwrap();
    assert_eq!(breeds.len(), 4);
    assert!(breeds.contains(&Bson::String("Portuguese Water Dog".to_string())));

    assert!(criteria.get("$expr").and_then(Bson::as_document).is_some());
}

#[tokio::test]
async fn every_category_names_only_dogs() {
    for category in RescueCategory::ALL {
        let criteria = category.criteria();
        assert_eq!(criteria.get_str("animal_type").unwrap(), "Dog");
        assert_eq!(category.name().parse::<RescueCategory>().unwrap(), category);
    }
}

/// Backend that fails the test if any engine operation is reached.
#[derive(Debug)]
struct UnreachableBackend;

#[async_trait]
impl StoreBackend for UnreachableBackend {
    async fn ping(&self, _: &str) -> StoreResult<()> {
        unreachable!("no engine call expected")
    }

    async fn insert_one(&self, _: &str, _: &str, _: Document) -> StoreResult<Bson> {
        unreachable!("no engine call expected")
    }

    async fn find(&self, _: &str, _: &str, _: Document) -> StoreResult<Vec<Document>> {
        unreachable!("no engine call expected")
    }

    async fn update(
        &self,
        _: &str,
        _: &str,
        _: Document,
        _: Document,
        _: bool,
    ) -> StoreResult<u64> {
        unreachable!("no engine call expected")
    }

    async fn delete(&self, _: &str, _: &str, _: Document, _: bool) -> StoreResult<u64> {
        unreachable!("no engine call expected")
    }

    async fn count(&self, _: &str, _: &str, _: Document) -> StoreResult<u64> {
        unreachable!("no engine call expected")
    }

    async fn collection_stats(&self, _: &str, _: &str) -> StoreResult<CollectionStats> {
        unreachable!("no engine call expected")
    }
}
