//! Request validation from per-type rule tables.
//!
//! Each parameter type lists its fields with the rules that apply, in
//! declaration order. The walk stops at the first violation and reports it as
//! a 400 whose description is `"<Type>.<field path>: <reason>"`.

use crate::error::HttpError;
use regex::Regex;

/// A constraint on one field. Rules run in the order they are declared.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Zero values (empty string, 0, empty list) are rejected.
    Required,
    /// A zero value skips the remaining rules of the field.
    Omitempty,
    /// Check the elements of a list field. Vacuous over an empty list.
    Dive,
    /// Numbers: value >= n. Strings: at least n characters. Lists: at least n items.
    Min(i64),
    /// Numbers: value <= n. Strings: at most n characters. Lists: at most n items.
    Max(i64),
    Uuid,
    Email,
    Fqdn,
    OneOf(&'static [&'static str]),
}

/// Borrowed view of a field value.
pub enum FieldValue<'a> {
    Str(&'a str),
    Int(i64),
    Nested(&'a dyn Validate),
    List(Vec<&'a dyn Validate>),
}

pub struct Field<'a> {
    pub name: &'static str,
    pub value: FieldValue<'a>,
    pub rules: &'static [Rule],
}

impl<'a> Field<'a> {
    pub fn str(name: &'static str, value: &'a str, rules: &'static [Rule]) -> Self {
        Self {
            name,
            value: FieldValue::Str(value),
            rules,
        }
    }

    pub fn int(name: &'static str, value: i64, rules: &'static [Rule]) -> Self {
        Self {
            name,
            value: FieldValue::Int(value),
            rules,
        }
    }

    /// Nested structs are always validated.
    pub fn nested(name: &'static str, value: &'a dyn Validate) -> Self {
        Self {
            name,
            value: FieldValue::Nested(value),
            rules: &[],
        }
    }

    pub fn list<T: Validate>(name: &'static str, items: &'a [T], rules: &'static [Rule]) -> Self {
        Self {
            name,
            value: FieldValue::List(items.iter().map(|i| i as &dyn Validate).collect()),
            rules,
        }
    }
}

/// Types whose fields carry validation rules.
pub trait Validate {
    /// Name used as the first segment of violation paths.
    fn type_name(&self) -> &'static str;
    /// Field table, in declaration order. Names are the JSON names.
    fn fields(&self) -> Vec<Field<'_>>;
}

/// First rule a value failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub namespace: String,
    pub reason: String,
}

impl From<Violation> for HttpError {
    fn from(v: Violation) -> Self {
        HttpError::bad_request(format!("{}: {}", v.namespace, v.reason))
    }
}

/// Stateless apart from the compiled format patterns; build once and share.
pub struct Validator {
    email: Regex,
    fqdn: Regex,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self {
            email: Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email pattern"),
            fqdn: Regex::new(r"^(?i)([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}\.?$")
                .expect("valid fqdn pattern"),
        }
    }

    /// Validate `value`, reporting only the first violation.
    pub fn validate(&self, value: &dyn Validate) -> Result<(), HttpError> {
        match self.first_violation(value) {
            Some(v) => Err(v.into()),
            None => Ok(()),
        }
    }

    pub fn first_violation(&self, value: &dyn Validate) -> Option<Violation> {
        self.walk(value, value.type_name())
    }

    fn walk(&self, value: &dyn Validate, prefix: &str) -> Option<Violation> {
        for field in value.fields() {
            let namespace = format!("{}.{}", prefix, field.name);
            if let Some(v) = self.check_field(&field, &namespace) {
                return Some(v);
            }
        }
        None
    }

    fn check_field(&self, field: &Field<'_>, namespace: &str) -> Option<Violation> {
        let mut dive = false;
        for rule in field.rules {
            match rule {
                Rule::Omitempty if is_zero(&field.value) => return None,
                Rule::Omitempty => {}
                Rule::Dive => {
                    dive = true;
                    break;
                }
                _ => {
                    if let Some(reason) = self.check_rule(rule, field.name, &field.value) {
                        return Some(Violation {
                            namespace: namespace.to_string(),
                            reason,
                        });
                    }
                }
            }
        }
        match &field.value {
            FieldValue::Nested(inner) => self.walk(*inner, namespace),
            FieldValue::List(items) if dive => items
                .iter()
                .enumerate()
                .find_map(|(i, item)| self.walk(*item, &format!("{}[{}]", namespace, i))),
            _ => None,
        }
    }

    fn check_rule(&self, rule: &Rule, name: &str, value: &FieldValue<'_>) -> Option<String> {
        match (rule, value) {
            (Rule::Required, v) if is_zero(v) => Some(format!("{} is a required field", name)),
            (Rule::Min(n), FieldValue::Int(i)) if i < n => Some(format!("{} must be {} or greater", name, n)),
            (Rule::Max(n), FieldValue::Int(i)) if i > n => Some(format!("{} must be {} or less", name, n)),
            (Rule::Min(n), FieldValue::Str(s)) if (s.chars().count() as i64) < *n => {
                Some(format!("{} must be at least {} in length", name, plural(*n, "character")))
            }
            (Rule::Max(n), FieldValue::Str(s)) if (s.chars().count() as i64) > *n => {
                Some(format!("{} must be a maximum of {} in length", name, plural(*n, "character")))
            }
            (Rule::Min(n), FieldValue::List(items)) if (items.len() as i64) < *n => {
                Some(format!("{} must contain at least {}", name, plural(*n, "item")))
            }
            (Rule::Max(n), FieldValue::List(items)) if (items.len() as i64) > *n => {
                Some(format!("{} must contain at maximum {}", name, plural(*n, "item")))
            }
            (Rule::Uuid, FieldValue::Str(s)) if uuid::Uuid::parse_str(s).is_err() => {
                Some(format!("{} must be valid UUID", name))
            }
            (Rule::Email, FieldValue::Str(s)) if !self.email.is_match(s) => {
                Some(format!("{} must be a valid email address", name))
            }
            (Rule::Fqdn, FieldValue::Str(s)) if !self.fqdn.is_match(s) => Some(format!("{} must be valid FQDN", name)),
            (Rule::OneOf(allowed), FieldValue::Str(s)) if !allowed.iter().any(|a| a == s) => {
                Some(format!("{} must be one of [{}]", name, allowed.join(" ")))
            }
            (Rule::OneOf(allowed), FieldValue::Int(i)) if !allowed.iter().any(|a| *a == i.to_string()) => {
                Some(format!("{} must be one of [{}]", name, allowed.join(" ")))
            }
            _ => None,
        }
    }
}

fn is_zero(value: &FieldValue<'_>) -> bool {
    match value {
        FieldValue::Str(s) => s.is_empty(),
        FieldValue::Int(i) => *i == 0,
        FieldValue::Nested(_) => false,
        FieldValue::List(items) => items.is_empty(),
    }
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct TestStruct {
        name: String,
        last: String,
    }

    impl Validate for TestStruct {
        fn type_name(&self) -> &'static str {
            "TestStruct"
        }

        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::str("name", &self.name, &[Rule::Required]),
                Field::str("last", &self.last, &[Rule::Required]),
            ]
        }
    }

    struct TestParentStruct {
        elements: Vec<TestStruct>,
    }

    impl Validate for TestParentStruct {
        fn type_name(&self) -> &'static str {
            "TestParentStruct"
        }

        fn fields(&self) -> Vec<Field<'_>> {
            vec![Field::list("elements", &self.elements, &[Rule::Dive])]
        }
    }

    struct TestMemberStruct {
        member: TestStruct,
    }

    impl Validate for TestMemberStruct {
        fn type_name(&self) -> &'static str {
            "TestMemberStruct"
        }

        fn fields(&self) -> Vec<Field<'_>> {
            vec![Field::nested("member", &self.member)]
        }
    }

    struct Account {
        id: String,
        email: String,
        host: String,
        role: String,
        age: i64,
    }

    impl Validate for Account {
        fn type_name(&self) -> &'static str {
            "Account"
        }

        fn fields(&self) -> Vec<Field<'_>> {
            vec![
                Field::str("id", &self.id, &[Rule::Omitempty, Rule::Uuid]),
                Field::str("email", &self.email, &[Rule::Required, Rule::Email]),
                Field::str("host", &self.host, &[Rule::Omitempty, Rule::Fqdn]),
                Field::str("role", &self.role, &[Rule::OneOf(&["admin", "member"])]),
                Field::int("age", self.age, &[Rule::Min(18), Rule::Max(130)]),
            ]
        }
    }

    fn account() -> Account {
        Account {
            id: String::new(),
            email: "jane@example.com".into(),
            host: String::new(),
            role: "member".into(),
            age: 30,
        }
    }

    fn message(value: &dyn Validate) -> String {
        Validator::new().validate(value).unwrap_err().to_string()
    }

    #[test]
    fn reports_only_the_first_invalid_field() {
        assert_eq!(
            message(&TestStruct::default()),
            "400: TestStruct.name: name is a required field"
        );
    }

    #[test]
    fn checks_list_elements_with_dive() {
        let value = TestParentStruct {
            elements: vec![TestStruct::default()],
        };
        assert_eq!(
            message(&value),
            "400: TestParentStruct.elements[0].name: name is a required field"
        );
    }

    #[test]
    fn reports_index_of_the_failing_element() {
        let value = TestParentStruct {
            elements: vec![
                TestStruct {
                    name: "a".into(),
                    last: "b".into(),
                },
                TestStruct {
                    name: "c".into(),
                    last: String::new(),
                },
            ],
        };
        assert_eq!(
            message(&value),
            "400: TestParentStruct.elements[1].last: last is a required field"
        );
    }

    #[test]
    fn dive_over_empty_list_passes() {
        let value = TestParentStruct { elements: vec![] };
        assert!(Validator::new().validate(&value).is_ok());
    }

    #[test]
    fn validates_nested_struct_automatically() {
        let value = TestMemberStruct {
            member: TestStruct::default(),
        };
        assert_eq!(
            message(&value),
            "400: TestMemberStruct.member.name: name is a required field"
        );
    }

    #[test]
    fn valid_value_passes() {
        assert!(Validator::new().validate(&account()).is_ok());
    }

    #[test]
    fn omitempty_skips_zero_values_only() {
        let mut value = account();
        value.id = "not-a-uuid".into();
        assert_eq!(message(&value), "400: Account.id: id must be valid UUID");
        value.id = "123e4567-e89b-12d3-a456-426655440000".into();
        assert!(Validator::new().validate(&value).is_ok());
    }

    #[test]
    fn format_rules() {
        let mut value = account();
        value.email = "jane".into();
        assert_eq!(message(&value), "400: Account.email: email must be a valid email address");

        let mut value = account();
        value.host = "not a host".into();
        assert_eq!(message(&value), "400: Account.host: host must be valid FQDN");
        value.host = "api.example.com".into();
        assert!(Validator::new().validate(&value).is_ok());
    }

    #[test]
    fn one_of_lists_allowed_values() {
        let mut value = account();
        value.role = "owner".into();
        assert_eq!(message(&value), "400: Account.role: role must be one of [admin member]");
    }

    #[test]
    fn numeric_ranges() {
        let mut value = account();
        value.age = 12;
        assert_eq!(message(&value), "400: Account.age: age must be 18 or greater");
        value.age = 200;
        assert_eq!(message(&value), "400: Account.age: age must be 130 or less");
    }

    #[test]
    fn string_lengths_count_characters() {
        struct Note {
            text: String,
        }
        impl Validate for Note {
            fn type_name(&self) -> &'static str {
                "Note"
            }
            fn fields(&self) -> Vec<Field<'_>> {
                vec![Field::str("text", &self.text, &[Rule::Min(2), Rule::Max(3)])]
            }
        }
        let short = Note { text: "é".into() };
        assert_eq!(message(&short), "400: Note.text: text must be at least 2 characters in length");
        let long = Note { text: "éééé".into() };
        assert_eq!(
            message(&long),
            "400: Note.text: text must be a maximum of 3 characters in length"
        );
        assert!(Validator::new().validate(&Note { text: "ééé".into() }).is_ok());
    }
}
