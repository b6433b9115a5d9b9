use roster_core::{NewPerson, Person, PersonValidationError};
use uuid::Uuid;

#[test]
fn new_person_sets_defaults() {
    let draft = NewPerson::new("Asmaa");

    assert_eq!(draft.name, "Asmaa");
    assert_eq!(draft.age, None);
    assert!(draft.favorite_foods.is_empty());
    assert!(draft.validate().is_ok());
}

#[test]
fn validate_rejects_empty_and_whitespace_names() {
    let empty = NewPerson::new("");
    assert_eq!(empty.validate().unwrap_err(), PersonValidationError::EmptyName);

    let blank = NewPerson::new("   ");
    assert_eq!(blank.validate().unwrap_err(), PersonValidationError::EmptyName);
}

#[test]
fn with_id_promotes_draft_without_changing_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut draft = NewPerson::new("Bob");
    draft.age = Some(30);
    draft.favorite_foods = vec!["pizza".to_string(), "ice cream".to_string()];

    let person = draft.clone().with_id(id);
    assert_eq!(person.id, id);
    assert_eq!(person.name, draft.name);
    assert_eq!(person.age, draft.age);
    assert_eq!(person.favorite_foods, draft.favorite_foods);
    assert!(person.validate().is_ok());
}

#[test]
fn likes_matches_exact_entries_only() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut draft = NewPerson::new("Mary");
    draft.favorite_foods = vec!["pasta".to_string(), "chocolate".to_string()];
    let person = draft.with_id(id);

    assert!(person.likes("pasta"));
    assert!(!person.likes("past"));
    assert!(!person.likes("burritos"));
}

#[test]
fn person_serialization_uses_expected_wire_fields() {
    let id = Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap();
    let mut draft = NewPerson::new("Charlie");
    draft.age = Some(35);
    draft.favorite_foods = vec!["sushi".to_string(), "ramen".to_string()];
    let person = draft.with_id(id);

    let json = serde_json::to_value(&person).unwrap();
    assert_eq!(json["id"], id.to_string());
    assert_eq!(json["name"], "Charlie");
    assert_eq!(json["age"], 35);
    assert_eq!(json["favoriteFoods"][0], "sushi");
    assert_eq!(json["favoriteFoods"][1], "ramen");

    let decoded: Person = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, person);
}

#[test]
fn deserialize_defaults_missing_favorite_foods_to_empty() {
    let value = serde_json::json!({
        "id": "11111111-2222-4333-8444-555555555555",
        "name": "Alice",
        "age": null,
    });

    let person: Person = serde_json::from_value(value).unwrap();
    assert_eq!(person.age, None);
    assert!(person.favorite_foods.is_empty());
}
