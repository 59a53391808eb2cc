use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::rc::Rc;

use proptest::prelude::*;
use rcmp_assert::{
    using_recursive_comparison, walkable, AssertionError, ComparisonAssert, ComparisonSettings,
    Object, RecursiveComparisonConfiguration, TypeInfo, TypeName, Value,
};
use serde_json::json;

#[derive(Clone, Debug)]
struct Address {
    street: String,
    number: u32,
}
walkable!(Address { street, number });

#[derive(Clone, Debug)]
struct Home {
    address: Address,
}
walkable!(Home { address });

#[derive(Clone, Debug)]
struct Person {
    name: String,
    height: f64,
    home: Home,
    friends: Vec<String>,
    scores: BTreeMap<String, i32>,
}
walkable!(Person { name, height, home, friends, scores });

fn sherlock() -> Person {
    Person {
        name: "Sherlock".into(),
        height: 1.80,
        home: Home {
            address: Address {
                street: "Baker Street".into(),
                number: 221,
            },
        },
        friends: vec!["Watson".into(), "Hudson".into()],
        scores: [("deduction".to_string(), 10)].into_iter().collect(),
    }
}

fn within(tolerance: f64) -> impl Fn(&Value, &Value) -> Ordering + Send + Sync + 'static {
    move |a: &Value, b: &Value| match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) if (x - y).abs() <= tolerance => Ordering::Equal,
        (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Less),
        _ => Ordering::Less,
    }
}

#[test]
fn equal_people_pass_with_no_differences() {
    let assertion = using_recursive_comparison(&sherlock());
    assert!(assertion.is_equal_to(&sherlock()).is_ok());
    assert!(assertion.determine_differences_with(&sherlock()).unwrap().is_empty());
}

#[test]
fn height_within_field_tolerance_passes() {
    let mut taller = sherlock();
    taller.height = 1.90;

    let lenient = using_recursive_comparison(&sherlock())
        .with_comparator_for_fields(within(0.5), ["height"])
        .unwrap();
    assert!(lenient.is_equal_to(&taller).is_ok());

    let tight = using_recursive_comparison(&sherlock())
        .with_comparator_for_fields(within(0.05), ["height"])
        .unwrap();
    let err = tight.is_equal_to(&taller).unwrap_err();
    let failure = err.failure().unwrap();
    assert_eq!(failure.paths(), vec!["height"]);
}

#[test]
fn ignored_nested_field_passes() {
    let mut moved = sherlock();
    moved.home.address.street = "Montague Street".into();

    assert!(using_recursive_comparison(&sherlock()).is_equal_to(&moved).is_err());
    assert!(using_recursive_comparison(&sherlock())
        .ignoring_fields(["home.address.street"])
        .is_equal_to(&moved)
        .is_ok());
}

#[test]
fn field_comparator_wins_over_type_comparator() {
    let mut taller = sherlock();
    taller.height = 1.90;

    let assertion = using_recursive_comparison(&sherlock())
        .with_comparator_for_type("f64", |_: &Value, _: &Value| Ordering::Greater)
        .with_comparator_for_fields(within(0.5), ["height"])
        .unwrap();
    assert!(assertion.is_equal_to(&taller).is_ok());

    let assertion = using_recursive_comparison(&sherlock())
        .with_comparator_for_type("f64", |_: &Value, _: &Value| Ordering::Equal)
        .with_comparator_for_fields(within(0.05), ["height"])
        .unwrap();
    assert!(assertion.is_equal_to(&taller).is_err());
}

#[test]
fn self_referencing_structures_compare_equal() {
    let make = || {
        let node = Rc::new(Object::new(TypeInfo::new("Node")).with_field("id", Value::Int(7)));
        node.set("next", Value::Object(node.clone()));
        Value::Object(node)
    };
    assert!(ComparisonAssert::new(make()).is_equal_to(&make()).is_ok());
}

#[test]
fn collection_order_can_be_ignored() {
    let mut reordered = sherlock();
    reordered.friends.reverse();

    let err = using_recursive_comparison(&sherlock())
        .is_equal_to(&reordered)
        .unwrap_err();
    assert_eq!(err.failure().unwrap().paths(), vec!["friends[0]", "friends[1]"]);

    assert!(using_recursive_comparison(&sherlock())
        .ignoring_collection_order_in_fields(["friends"])
        .is_equal_to(&reordered)
        .is_ok());
}

#[test]
fn ignoring_a_field_does_not_leak_into_other_assertions() {
    let mut renamed = sherlock();
    renamed.name = "Mycroft".into();

    let baseline = using_recursive_comparison(&sherlock())
        .determine_differences_with(&renamed)
        .unwrap();
    assert_eq!(baseline.len(), 1);

    assert!(using_recursive_comparison(&sherlock())
        .ignoring_fields(["name"])
        .is_equal_to(&renamed)
        .is_ok());

    let again = using_recursive_comparison(&sherlock())
        .determine_differences_with(&renamed)
        .unwrap();
    assert_eq!(again.len(), baseline.len());
    assert_eq!(again[0].path, baseline[0].path);
}

#[test]
fn failure_report_lists_differences_and_configuration() {
    let mut other = sherlock();
    other.name = "Mycroft".into();
    other.scores.insert("chemistry".into(), 8);

    let err = using_recursive_comparison(&sherlock())
        .ignoring_fields(["home"])
        .is_equal_to(&other)
        .unwrap_err();
    let report = err.to_string();

    assert!(report.starts_with("Expecting actual:\n  Person("));
    assert!(report.contains("found the following 2 differences:"));
    assert!(report.contains("field/property 'name' differ:\n- actual value  : \"Sherlock\"\n- expected value: \"Mycroft\""));
    assert!(report.contains("The following keys were not found in the actual map value:\n  [chemistry]"));
    assert!(report.contains("- the following fields were ignored in the comparison: home"));
}

#[test]
fn custom_message_replaces_the_default_block() {
    let mut other = sherlock();
    other.home.address.number = 222;
    let err = using_recursive_comparison(&sherlock())
        .with_error_message_for_fields("wrong house number at {0}", ["home.address.number"])
        .unwrap()
        .is_equal_to(&other)
        .unwrap_err();
    assert!(err.to_string().contains("\nwrong house number at home.address.number\n"));
}

#[test]
fn configuration_loaded_from_settings() {
    let settings = ComparisonSettings::from_toml_str(
        r#"
ignored_fields = ["height"]
ignored_collection_order_in_fields = ["friends"]
"#,
    )
    .unwrap();
    let config = RecursiveComparisonConfiguration::from_settings(&settings).unwrap();

    let mut other = sherlock();
    other.height = 2.0;
    other.friends.reverse();
    assert!(using_recursive_comparison(&sherlock())
        .with_configuration(config)
        .is_equal_to(&other)
        .is_ok());
}

#[test]
fn json_documents_can_be_compared() {
    let actual = json!({"id": 1, "tags": ["a", "b"], "owner": {"name": "Sherlock"}});
    let expected = json!({"id": 2, "tags": ["b", "a"], "owner": {"name": "Sherlock"}});

    let err = using_recursive_comparison(&actual)
        .is_equal_to(&expected)
        .unwrap_err();
    assert_eq!(
        err.failure().unwrap().paths(),
        vec!["{id}", "{tags}[0]", "{tags}[1]"]
    );

    assert!(using_recursive_comparison(&actual)
        .ignoring_fields(["id"])
        .ignoring_collection_order()
        .is_equal_to(&expected)
        .is_ok());
}

#[test]
fn null_root_is_never_a_content_difference() {
    let err = ComparisonAssert::new(Value::Null)
        .ignoring_actual_null_fields()
        .is_equal_to(&sherlock())
        .unwrap_err();
    assert!(matches!(err, AssertionError::ExpectedNonNull { .. }));
}

#[test]
fn deeply_nested_failure_report_renders() {
    let (mut actual, mut expected) = (Value::Int(1), Value::Int(2));
    for _ in 0..100_000 {
        actual = Value::list([actual]);
        expected = Value::list([expected]);
    }
    let err = ComparisonAssert::new(actual).is_equal_to(&expected).unwrap_err();
    let report = err.to_string();
    assert!(report.starts_with("Expecting actual:\n  [[[["));
    assert!(report.contains("..."));
    assert!(report.contains("found the following 1 difference:"));
    assert!(report.contains("- actual value  : 1\n- expected value: 2"));
}

#[test]
fn only_fields_of_compared_types_are_checked() {
    let mut other = sherlock();
    other.name = "Mycroft".into();
    other.friends.push("Lestrade".into());
    other.home.address.number = 222;

    let err = using_recursive_comparison(&sherlock())
        .comparing_only_fields_of_types([TypeName::of::<Address>()])
        .is_equal_to(&other)
        .unwrap_err();
    assert_eq!(err.failure().unwrap().paths(), vec!["home.address.number"]);
    assert!(err
        .to_string()
        .contains("- the comparison was performed on any fields with types: "));

    other.home.address.number = 221;
    assert!(using_recursive_comparison(&sherlock())
        .comparing_only_fields_of_types([TypeName::of::<Address>()])
        .is_equal_to(&other)
        .is_ok());
}

#[test]
fn actual_can_be_looked_up_among_candidates() {
    let mut taller = sherlock();
    taller.height = 1.95;
    let mut renamed = sherlock();
    renamed.name = "Mycroft".into();

    assert!(using_recursive_comparison(&sherlock())
        .is_in(&[taller.clone(), sherlock()])
        .is_ok());
    let err = using_recursive_comparison(&sherlock())
        .is_in(&[taller.clone(), renamed.clone()])
        .unwrap_err();
    assert!(matches!(err, AssertionError::NotIn { .. }));

    assert!(using_recursive_comparison(&sherlock())
        .ignoring_fields(["height"])
        .is_not_in(&[taller, renamed])
        .is_err());
}

proptest! {
    #[test]
    fn any_person_equals_a_copy_of_itself(
        name in "[A-Za-z]{1,12}",
        height in 0.5f64..2.5,
        number in 1u32..1000,
        friends in prop::collection::vec("[a-z]{1,8}", 0..5),
    ) {
        let person = Person {
            name,
            height,
            home: Home { address: Address { street: "Baker Street".into(), number } },
            friends,
            scores: BTreeMap::new(),
        };
        prop_assert!(using_recursive_comparison(&person).is_equal_to(&person.clone()).is_ok());
        prop_assert!(using_recursive_comparison(&person)
            .ignoring_collection_order()
            .is_equal_to(&person.clone())
            .is_ok());
    }
}
