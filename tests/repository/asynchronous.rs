use crate::common::*;
use criteria_core::query_builder::CriteriaBuilder;
use criteria_core::repository::{AsyncRepository, FieldSetter};
use criteria_core::{CriteriaError, InMemoryRepository};
use std::sync::Arc;

fn shared_repository() -> Arc<InMemoryRepository<Book>> {
    Arc::new(InMemoryRepository::new().with_rows(catalogue()))
}

#[tokio::test]
async fn test_async_queries_match_sync_backend() {
    let repository = shared_repository();
    let criteria = CriteriaBuilder::<Book>::new()
        .predicate()
        .unwrap()
        .attribute(Book::STOCK)
        .is_not_zero()
        .apply()
        .ascending(Book::STOCK)
        .build();

    let found = repository.find_all_using(&criteria).await.unwrap();
    assert_eq!(ids(&found), vec![3, 1, 4]);

    let top = repository.find_top_using(&criteria).await.unwrap();
    assert_eq!(top.map(|b| b.id), Some(3));

    let top_two = repository.find_top_n_using(2, &criteria).await.unwrap();
    assert_eq!(ids(&top_two), vec![3, 1]);

    assert!(matches!(
        repository.find_one_using(&criteria).await,
        Err(CriteriaError::NonUniqueResult { count: 3, .. })
    ));
}

#[tokio::test]
async fn test_async_mutations() {
    let repository = shared_repository();
    let herbert = CriteriaBuilder::<Book>::new()
        .join(Book::AUTHOR)
        .predicate()
        .unwrap()
        .joined_attribute(Book::AUTHOR, Author::NAME)
        .unwrap()
        .is_equal_to("Herbert")
        .apply()
        .build();

    let updated = repository
        .update_using(&herbert, &[FieldSetter::new(Book::PRICE, 5.0)])
        .await
        .unwrap();
    assert_eq!(updated, 2);

    let deleted = repository.delete_using(&herbert).await.unwrap();
    assert_eq!(deleted, 2);
    assert_eq!(repository.count().await.unwrap(), 3);
    assert_eq!(repository.checkpoint().await.unwrap(), 5);
}

#[tokio::test]
async fn test_concurrent_readers_share_one_criteria() {
    let repository = shared_repository();
    let criteria = CriteriaBuilder::<Book>::new()
        .predicate()
        .unwrap()
        .attribute(Book::ELECTRONIC)
        .is_true()
        .apply()
        .build();

    let tasks: Vec<_> = (0..4)
        .map(|_| {
            let repository = Arc::clone(&repository);
            let criteria = criteria.clone();
            tokio::spawn(async move { repository.find_all_using(&criteria).await })
        })
        .collect();

    for task in tasks {
        let found = task.await.unwrap().unwrap();
        assert_eq!(ids(&found), vec![2, 4, 5]);
    }
}
