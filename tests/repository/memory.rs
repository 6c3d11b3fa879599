use crate::common::*;
use criteria_core::model::Attribute;
use criteria_core::query_builder::{Criteria, CriteriaBuilder, JoinType};
use criteria_core::repository::{FieldSetter, InMemoryRepository, Repository};
use criteria_core::{CriteriaConfig, CriteriaError, FindOnePolicy};

fn catalogue_repository() -> InMemoryRepository<Book> {
    InMemoryRepository::new().with_rows(catalogue())
}

fn everything() -> Criteria<Book> {
    CriteriaBuilder::new().build()
}

fn electronic() -> Criteria<Book> {
    CriteriaBuilder::new()
        .predicate()
        .unwrap()
        .attribute(Book::ELECTRONIC)
        .is_true()
        .apply()
        .build()
}

#[test]
fn test_electronic_books_starting_with_a() {
    let repository = InMemoryRepository::new().with_rows(scenario_books());
    let criteria = CriteriaBuilder::<Book>::new()
        .predicate()
        .unwrap()
        .attribute(Book::ELECTRONIC)
        .is_true()
        .and()
        .attribute(Book::NAME)
        .starts_with("A")
        .apply()
        .build();

    let found = repository.find_all_using(&criteria).unwrap();
    assert_eq!(ids(&found), vec![1]);
}

#[test]
fn test_unordered_results_keep_insertion_order() {
    let found = catalogue_repository().find_all_using(&everything()).unwrap();
    assert_eq!(ids(&found), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_nulls_sort_last_ascending_and_first_descending() {
    let repository = catalogue_repository();

    let ascending = CriteriaBuilder::new().ascending(Book::PRICE).build();
    let descending = CriteriaBuilder::new().descending(Book::PRICE).build();

    assert_eq!(ids(&repository.find_all_using(&ascending).unwrap()), vec![2, 1, 3, 4, 5]);
    assert_eq!(ids(&repository.find_all_using(&descending).unwrap()), vec![4, 5, 3, 1, 2]);
}

#[test]
fn test_secondary_order_breaks_ties() {
    let criteria = CriteriaBuilder::new()
        .descending(Book::ELECTRONIC)
        .ascending(Book::NAME)
        .build();

    let found = catalogue_repository().find_all_using(&criteria).unwrap();
    assert_eq!(ids(&found), vec![4, 2, 5, 1, 3]);
}

#[test]
fn test_inner_join_drops_rows_without_related_entity() {
    let criteria = CriteriaBuilder::new().join(Book::AUTHOR).build();
    let found = catalogue_repository().find_all_using(&criteria).unwrap();
    assert_eq!(ids(&found), vec![1, 2, 3, 5]);
}

#[test]
fn test_right_join_behaves_as_inner_join() {
    let criteria = CriteriaBuilder::new()
        .join_with(Book::AUTHOR, JoinType::Right, false)
        .build();
    let found = catalogue_repository().find_all_using(&criteria).unwrap();
    assert_eq!(ids(&found), vec![1, 2, 3, 5]);
}

#[test]
fn test_left_join_reads_missing_entity_as_null() {
    let criteria = CriteriaBuilder::new()
        .left_join(Book::AUTHOR)
        .predicate()
        .unwrap()
        .joined_attribute(Book::AUTHOR, Author::NAME)
        .unwrap()
        .is_null()
        .apply()
        .build();

    let found = catalogue_repository().find_all_using(&criteria).unwrap();
    assert_eq!(ids(&found), vec![4]);
}

#[test]
fn test_filter_and_order_on_joined_entity() {
    let criteria = CriteriaBuilder::new()
        .left_fetch(Book::AUTHOR)
        .predicate()
        .unwrap()
        .joined_attribute(Book::AUTHOR, Author::NAME)
        .unwrap()
        .is_not_null()
        .or()
        .attribute(Book::STOCK)
        .is_positive()
        .apply()
        .ascending_by(Book::AUTHOR, Author::NAME)
        .unwrap()
        .build();

    let found = catalogue_repository().find_all_using(&criteria).unwrap();
    assert_eq!(ids(&found), vec![3, 1, 2, 5, 4]);
}

#[test]
fn test_to_many_join_returns_each_root_once() {
    let criteria = CriteriaBuilder::new()
        .join(Book::REVIEWS)
        .predicate()
        .unwrap()
        .joined_attribute(Book::REVIEWS, Review::RATING)
        .unwrap()
        .is_greater_than_or_equal_to(4)
        .apply()
        .build();

    let found = catalogue_repository().find_all_using(&criteria).unwrap();
    assert_eq!(ids(&found), vec![1, 5]);
}

#[test]
fn test_order_on_to_many_join_uses_best_related_row() {
    let descending = CriteriaBuilder::new()
        .join(Book::REVIEWS)
        .descending_by(Book::REVIEWS, Review::RATING)
        .unwrap()
        .build();
    let found = catalogue_repository().find_all_using(&descending).unwrap();
    // Hyperion's 5 outranks Dune Messiah's only review; Dune keeps its place on the tie
    assert_eq!(ids(&found), vec![1, 5, 2]);

    let ascending = CriteriaBuilder::new()
        .join(Book::REVIEWS)
        .ascending_by(Book::REVIEWS, Review::RATING)
        .unwrap()
        .build();
    let found = catalogue_repository().find_all_using(&ascending).unwrap();
    assert_eq!(ids(&found), vec![5, 2, 1]);
}

#[test]
fn test_order_on_to_many_join_only_considers_matching_rows() {
    let criteria = CriteriaBuilder::new()
        .join(Book::REVIEWS)
        .predicate()
        .unwrap()
        .joined_attribute(Book::REVIEWS, Review::RATING)
        .unwrap()
        .is_less_than(5)
        .apply()
        .descending_by(Book::REVIEWS, Review::RATING)
        .unwrap()
        .build();

    let found = catalogue_repository().find_all_using(&criteria).unwrap();
    assert_eq!(ids(&found), vec![1, 2, 5]);
}

#[test]
fn test_configured_wildcard_drives_matching() {
    let config = CriteriaConfig {
        wildcard: '*',
        ..CriteriaConfig::default()
    };
    let repository = InMemoryRepository::with_config(&config).with_rows(catalogue());
    let criteria = CriteriaBuilder::new()
        .predicate()
        .unwrap()
        .attribute(Book::NAME)
        .contains("un")
        .apply()
        .build();

    let found = repository.find_all_using(&criteria).unwrap();
    assert_eq!(ids(&found), vec![1, 2, 3]);
}

#[test]
fn test_single_character_wildcard() {
    let criteria = CriteriaBuilder::new()
        .predicate()
        .unwrap()
        .attribute(Book::NAME)
        .is_like("D_ne")
        .apply()
        .build();

    let found = catalogue_repository().find_all_using(&criteria).unwrap();
    assert_eq!(ids(&found), vec![1]);
}

#[test]
fn test_unknown_field_is_reported() {
    const PAGES: Attribute<Book, i32> = Attribute::new("pages");
    let criteria = CriteriaBuilder::new()
        .predicate()
        .unwrap()
        .attribute(PAGES)
        .is_positive()
        .apply()
        .build();

    let result = catalogue_repository().find_all_using(&criteria);
    assert_eq!(
        result.err(),
        Some(CriteriaError::unknown_field("book", "pages"))
    );
}

#[test]
fn test_find_one_strict_rejects_several_matches() {
    let repository = catalogue_repository();
    assert_eq!(
        repository.find_one_using(&electronic()).err(),
        Some(CriteriaError::NonUniqueResult {
            entity: "book",
            count: 3
        })
    );
}

#[test]
fn test_find_one_first_policy_returns_first_match() {
    let config = CriteriaConfig {
        find_one: FindOnePolicy::First,
        ..CriteriaConfig::default()
    };
    let repository = InMemoryRepository::with_config(&config).with_rows(catalogue());

    let found = repository.find_one_using(&electronic()).unwrap();
    assert_eq!(found.map(|b| b.id), Some(2));
}

#[test]
fn test_find_one_without_match() {
    let repository = InMemoryRepository::new().with_rows(vec![book(1, "Paper", false)]);
    assert_eq!(repository.find_one_using(&electronic()).unwrap(), None);
}

#[test]
fn test_find_top_and_top_n() {
    let repository = catalogue_repository();
    let criteria = CriteriaBuilder::new().descending(Book::STOCK).build();

    assert_eq!(repository.find_top_using(&criteria).unwrap().map(|b| b.id), Some(4));
    assert_eq!(ids(&repository.find_top_n_using(2, &criteria).unwrap()), vec![4, 1]);
    assert_eq!(repository.find_top_n_using(10, &criteria).unwrap().len(), 5);
    assert!(repository.find_top_n_using(0, &criteria).unwrap().is_empty());
}

#[test]
fn test_delete_removes_matching_rows() {
    let repository = catalogue_repository();

    assert_eq!(repository.delete_using(&electronic()).unwrap(), 3);
    assert_eq!(ids(&repository.snapshot()), vec![1, 3]);
    assert_eq!(repository.count().unwrap(), 2);
    assert_eq!(repository.delete_using(&electronic()).unwrap(), 0);
}

#[test]
fn test_delete_through_join() {
    let repository = catalogue_repository();
    let criteria = CriteriaBuilder::new()
        .join(Book::AUTHOR)
        .predicate()
        .unwrap()
        .joined_attribute(Book::AUTHOR, Author::NAME)
        .unwrap()
        .is_equal_to("Herbert")
        .apply()
        .build();

    assert_eq!(repository.delete_using(&criteria).unwrap(), 2);
    assert_eq!(ids(&repository.snapshot()), vec![3, 4, 5]);
}

#[test]
fn test_update_applies_setters_to_matches() {
    let repository = catalogue_repository();
    let criteria = CriteriaBuilder::new()
        .predicate()
        .unwrap()
        .attribute(Book::STOCK)
        .is_negative()
        .apply()
        .build();

    let updated = repository
        .update_using(&criteria, &[FieldSetter::new(Book::STOCK, 0)])
        .unwrap();
    assert_eq!(updated, 1);

    let stocks: Vec<i32> = repository.snapshot().iter().map(|b| b.stock).collect();
    assert_eq!(stocks, vec![3, 0, 0, 8, 0]);
}

#[test]
fn test_update_without_setters_is_rejected() {
    let repository = catalogue_repository();
    assert_eq!(
        repository.update_using(&electronic(), &[]).err(),
        Some(CriteriaError::NoUpdatesSpecified)
    );
}

#[test]
fn test_failed_update_leaves_rows_untouched() {
    let repository = catalogue_repository();
    let before = repository.snapshot();
    let setters = vec![
        FieldSetter::new(Book::STOCK, 42),
        FieldSetter::new(Book::ID, 99),
    ];

    let result = repository.update_using(&electronic(), &setters);
    assert!(matches!(result, Err(CriteriaError::InvalidAssignment { .. })));
    assert_eq!(repository.snapshot(), before);
}

#[test]
fn test_count_and_checkpoint() {
    let repository = catalogue_repository();
    assert_eq!(repository.count().unwrap(), 5);
    assert_eq!(repository.checkpoint().unwrap(), 5);

    repository.insert(book(42, "Solaris", false));
    assert_eq!(repository.count().unwrap(), 6);
    assert_eq!(repository.checkpoint().unwrap(), 42);

    let empty = InMemoryRepository::<Book>::new();
    assert_eq!(empty.count().unwrap(), 0);
    assert_eq!(empty.checkpoint().unwrap(), 0);
}

#[test]
fn test_criteria_is_reused_across_repositories() {
    let criteria = electronic();
    let first = InMemoryRepository::new().with_rows(scenario_books());
    let second = catalogue_repository();

    assert_eq!(ids(&first.find_all_using(&criteria).unwrap()), vec![1, 2]);
    assert_eq!(ids(&second.find_all_using(&criteria).unwrap()), vec![2, 4, 5]);
}
