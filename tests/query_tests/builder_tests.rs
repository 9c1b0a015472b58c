//! Tests for QueryBuilder
//!
//! These tests verify:
//! - Filtering with every operator
//! - Single and multi-key sorting, both directions
//! - Limit and offset applied after filter and sort
//! - Builders are reusable and unaffected by execution
//! - Lazy type checking and unknown-column behaviour

use flintdb::{ColumnType, Database, Direction, FlintError, Operator, ResultSet, TableHandle, Value};

// =============================================================================
// Helper Functions
// =============================================================================

/// `users`: 4 rows, ids 1..=4
fn users_table(db: &Database) -> TableHandle {
    let users = db
        .create(
            "users",
            [("name", ColumnType::String), ("age", ColumnType::Integer)],
        )
        .unwrap();
    for (name, age) in [("Kamil", 25), ("Kriss", 31), ("Paul", 19), ("Anna", 42)] {
        users
            .insert([("name", Value::from(name)), ("age", Value::from(age))])
            .unwrap();
    }
    users
}

/// `order`: 9 rows with deliberate ties on category and name
fn order_table(db: &Database) -> TableHandle {
    let order = db
        .create(
            "order",
            [
                ("category", ColumnType::String),
                ("name", ColumnType::String),
                ("number", ColumnType::Integer),
            ],
        )
        .unwrap();
    let rows = [
        ("A", "b", 5), // 1
        ("B", "c", 1), // 2
        ("B", "d", 2), // 3
        ("A", "z", 3), // 4
        ("B", "e", 4), // 5
        ("C", "a", 7), // 6
        ("C", "y", 6), // 7
        ("B", "f", 8), // 8
        ("A", "b", 0), // 9
    ];
    for (category, name, number) in rows {
        order
            .insert([
                ("category", Value::from(category)),
                ("name", Value::from(name)),
                ("number", Value::from(number)),
            ])
            .unwrap();
    }
    order
}

fn ids(results: &ResultSet) -> Vec<u64> {
    results.iter().map(|r| r.id()).collect()
}

fn first_and_last(results: &ResultSet) -> (u64, u64) {
    let ids = ids(results);
    (ids[0], ids[ids.len() - 1])
}

// =============================================================================
// Filter Tests
// =============================================================================

#[test]
fn test_find_all_returns_every_record_in_insertion_order() {
    let db = Database::in_memory();
    let users = users_table(&db);

    let results = users.find_all().unwrap();

    assert_eq!(results.count(), 4);
    assert_eq!(ids(&results), vec![1, 2, 3, 4]);
}

#[test]
fn test_where_equal_id() {
    let db = Database::in_memory();
    let users = users_table(&db);

    let results = users.filter("id", Operator::Eq, 1).find_all().unwrap();

    assert_eq!(ids(&results), vec![1]);
}

#[test]
fn test_where_not_equal_id_keeps_original_order() {
    let db = Database::in_memory();
    let users = users_table(&db);

    let results = users.filter("id", Operator::Ne, 4).find_all().unwrap();

    assert_eq!(ids(&results), vec![1, 2, 3]);
}

#[test]
fn test_where_string_equality() {
    let db = Database::in_memory();
    let users = users_table(&db);

    let kriss = users.filter("name", Operator::Eq, "Kriss").find_all().unwrap();
    assert_eq!(ids(&kriss), vec![2]);

    let others = users.filter("name", Operator::Ne, "Kriss").find_all().unwrap();
    assert_eq!(ids(&others), vec![1, 3, 4]);
}

#[test]
fn test_where_relational_operators() {
    let db = Database::in_memory();
    let users = users_table(&db);

    let cases = [
        (Operator::Gt, 2, vec![3, 4]),
        (Operator::Lt, 3, vec![1, 2]),
        (Operator::Ge, 2, vec![2, 3, 4]),
        (Operator::Le, 3, vec![1, 2, 3]),
    ];
    for (op, bound, expected) in cases {
        let results = users.filter("id", op, bound).find_all().unwrap();
        assert_eq!(ids(&results), expected, "id {} {}", op, bound);
    }
}

#[test]
fn test_chained_where_is_conjunction() {
    let db = Database::in_memory();
    let users = users_table(&db);

    let results = users
        .filter("id", Operator::Le, 3)
        .filter("id", Operator::Gt, 1)
        .find_all()
        .unwrap();

    assert_eq!(ids(&results), vec![2, 3]);
}

#[test]
fn test_chained_filters_equal_single_pass() {
    let db = Database::in_memory();
    let users = users_table(&db);

    let chained = users
        .filter("age", Operator::Gt, 20)
        .filter("name", Operator::Ne, "Anna")
        .find_all()
        .unwrap();

    let manual: Vec<u64> = users
        .find_all()
        .unwrap()
        .iter()
        .filter(|r| r.get("age").and_then(|v| v.as_i64()).unwrap() > 20)
        .filter(|r| r.get("name").and_then(|v| v.as_str()) != Some("Anna"))
        .map(|r| r.id())
        .collect();

    assert_eq!(ids(&chained), manual);
    assert_eq!(manual, vec![1, 2]);
}

#[test]
fn test_where_on_unknown_column_matches_nothing() {
    let db = Database::in_memory();
    let users = users_table(&db);

    let results = users.filter("email", Operator::Eq, "x@y").find_all().unwrap();
    assert!(results.is_empty());

    let negated = users.filter("email", Operator::Ne, "x@y").find_all().unwrap();
    assert!(negated.is_empty());
}

#[test]
fn test_type_mismatch_is_reported_at_find_all() {
    let db = Database::in_memory();
    let users = users_table(&db);

    // Building succeeds
    let query = users.filter("name", Operator::Gt, 5);
    assert_eq!(query.conditions().len(), 1);

    // Executing fails
    let err = query.find_all().unwrap_err();
    assert!(matches!(err, FlintError::TypeMismatch { ref column, .. } if column == "name"));
}

#[test]
fn test_type_mismatch_reported_on_empty_table() {
    let db = Database::in_memory();
    let empty = db.create("empty", [("flag", ColumnType::Boolean)]).unwrap();

    assert!(matches!(
        empty.filter("flag", Operator::Lt, true).find_all(),
        Err(FlintError::TypeMismatch { .. })
    ));
}

// =============================================================================
// Sort Tests
// =============================================================================

#[test]
fn test_order_by_id_both_directions_are_reversed() {
    let db = Database::in_memory();
    let order = order_table(&db);

    let asc = order.order_by("id", Direction::Asc).find_all().unwrap();
    let desc = order.order_by("id", Direction::Desc).find_all().unwrap();

    assert_eq!(first_and_last(&asc), (1, 9));
    assert_eq!(first_and_last(&desc), (9, 1));

    let mut reversed = ids(&desc);
    reversed.reverse();
    assert_eq!(ids(&asc), reversed);
}

#[test]
fn test_order_by_name() {
    let db = Database::in_memory();
    let order = order_table(&db);

    let asc = order.order_by_asc("name").find_all().unwrap();
    let desc = order.order_by("name", Direction::Desc).find_all().unwrap();

    assert_eq!(first_and_last(&asc), (6, 4));
    assert_eq!(first_and_last(&desc), (4, 6));
}

#[test]
fn test_order_by_two_keys() {
    let db = Database::in_memory();
    let order = order_table(&db);

    let both_asc = order
        .order_by_asc("category")
        .order_by_asc("name")
        .find_all()
        .unwrap();
    assert_eq!(ids(&both_asc), vec![1, 9, 4, 2, 3, 5, 8, 6, 7]);

    let name_desc = order
        .order_by_asc("category")
        .order_by("name", Direction::Desc)
        .find_all()
        .unwrap();
    assert_eq!(first_and_last(&name_desc), (4, 6));
}

#[test]
fn test_order_by_three_keys() {
    let db = Database::in_memory();
    let order = order_table(&db);

    let results = order
        .order_by_asc("category")
        .order_by_asc("name")
        .order_by_asc("number")
        .find_all()
        .unwrap();

    assert_eq!(first_and_last(&results), (9, 7));
    assert_eq!(&ids(&results)[..3], &[9, 1, 4]);
}

#[test]
fn test_order_by_primary_key_then_tie_break() {
    let db = Database::in_memory();
    let order = db
        .create(
            "order",
            [("category", ColumnType::String), ("name", ColumnType::String)],
        )
        .unwrap();
    order
        .insert([("category", Value::from("A")), ("name", Value::from("b"))])
        .unwrap();
    order
        .insert([("category", Value::from("A")), ("name", Value::from("a"))])
        .unwrap();

    let results = order
        .order_by_asc("category")
        .order_by_asc("name")
        .find_all()
        .unwrap();

    assert_eq!(ids(&results), vec![2, 1]);
}

#[test]
fn test_sort_is_stable_on_ties() {
    let db = Database::in_memory();
    let order = order_table(&db);

    let results = order.order_by_asc("category").find_all().unwrap();

    assert_eq!(ids(&results), vec![1, 4, 9, 2, 3, 5, 8, 6, 7]);
}

#[test]
fn test_order_by_unknown_column_keeps_scan_order() {
    let db = Database::in_memory();
    let order = order_table(&db);

    let results = order.order_by("nothing", Direction::Desc).find_all().unwrap();

    assert_eq!(ids(&results), (1..=9).collect::<Vec<u64>>());
}

#[test]
fn test_order_by_float_and_boolean_columns() {
    let db = Database::in_memory();
    let t = db
        .create("t", [("x", ColumnType::Float), ("flag", ColumnType::Boolean)])
        .unwrap();
    for (x, flag) in [(2.5, true), (-1.0, false), (10.0, true), (0.0, false)] {
        t.insert([("x", Value::from(x)), ("flag", Value::from(flag))])
            .unwrap();
    }

    let by_x = t.order_by_asc("x").find_all().unwrap();
    assert_eq!(ids(&by_x), vec![2, 4, 1, 3]);

    let by_flag = t.order_by_asc("flag").find_all().unwrap();
    assert_eq!(ids(&by_flag), vec![2, 4, 1, 3]);
}

// =============================================================================
// Limit / Offset Tests
// =============================================================================

#[test]
fn test_limit_one() {
    let db = Database::in_memory();
    let users = users_table(&db);

    let results = users.limit(1).find_all().unwrap();

    assert_eq!(results.count(), 1);
    assert_eq!(ids(&results), vec![1]);
}

#[test]
fn test_limit_applies_after_sort() {
    let db = Database::in_memory();
    let users = users_table(&db);

    let oldest = users
        .order_by("age", Direction::Desc)
        .limit(2)
        .find_all()
        .unwrap();

    assert_eq!(ids(&oldest), vec![4, 2]);
}

#[test]
fn test_limit_applies_after_filter() {
    let db = Database::in_memory();
    let users = users_table(&db);

    let results = users.filter("id", Operator::Gt, 2).limit(1).find_all().unwrap();
    assert_eq!(ids(&results), vec![3]);

    let none = users.filter("id", Operator::Gt, 10).limit(1).find_all().unwrap();
    assert_eq!(none.count(), 0);
}

#[test]
fn test_limit_zero_and_oversized() {
    let db = Database::in_memory();
    let users = users_table(&db);

    assert_eq!(users.limit(0).find_all().unwrap().count(), 0);
    assert_eq!(users.limit(100).find_all().unwrap().count(), 4);
}

#[test]
fn test_offset_then_limit() {
    let db = Database::in_memory();
    let order = order_table(&db);

    let page = order
        .order_by_asc("id")
        .offset(3)
        .limit(2)
        .find_all()
        .unwrap();
    assert_eq!(ids(&page), vec![4, 5]);

    let past_end = order.offset(20).find_all().unwrap();
    assert!(past_end.is_empty());
}

// =============================================================================
// Reuse Tests
// =============================================================================

#[test]
fn test_builder_is_reusable() {
    let db = Database::in_memory();
    let users = users_table(&db);

    let base = users.filter("age", Operator::Gt, 20);
    let first = base.find_all().unwrap();
    let second = base.find_all().unwrap();
    assert_eq!(ids(&first), ids(&second));

    let narrowed = base.clone().filter("name", Operator::Ne, "Kamil");
    assert_eq!(ids(&narrowed.find_all().unwrap()), vec![2, 4]);

    // The original builder is unchanged
    assert_eq!(base.conditions().len(), 1);
    assert_eq!(ids(&base.find_all().unwrap()), vec![1, 2, 4]);
}

#[test]
fn test_builder_reflects_accumulated_state() {
    let db = Database::in_memory();
    let users = users_table(&db);

    let query = users.query();
    assert_eq!(query.find_all().unwrap().count(), 4);

    let query = query.filter("id", Operator::Gt, 1);
    assert_eq!(query.find_all().unwrap().count(), 3);

    let query = query.order_by("id", Direction::Desc).limit(1);
    assert_eq!(ids(&query.find_all().unwrap()), vec![4]);
    assert_eq!(query.sort_keys().len(), 1);
    assert_eq!(query.limit_value(), Some(1));
    assert_eq!(query.table_name(), "users");
}

#[test]
fn test_builder_sees_new_records_on_each_run() {
    let db = Database::in_memory();
    let users = users_table(&db);
    let query = users.filter("age", Operator::Lt, 30);

    assert_eq!(query.count().unwrap(), 2);
    users
        .insert([("name", Value::from("Zoe")), ("age", Value::from(8))])
        .unwrap();
    assert_eq!(query.count().unwrap(), 3);
}

#[test]
fn test_first() {
    let db = Database::in_memory();
    let users = users_table(&db);

    let youngest = users.order_by_asc("age").first().unwrap().unwrap();
    assert_eq!(youngest.get("name"), Some(&Value::from("Paul")));

    assert!(users.filter("id", Operator::Gt, 99).first().unwrap().is_none());
}

#[test]
fn test_query_on_removed_table_fails() {
    let db = Database::in_memory();
    let users = users_table(&db);
    let query = users.filter("id", Operator::Gt, 0);

    db.remove("users").unwrap();

    assert!(matches!(query.find_all(), Err(FlintError::TableNotFound(_))));
}
