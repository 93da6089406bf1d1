//! Field normalization applied before validation.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modifier {
    Trim,
    TrimStart,
    TrimEnd,
    Lowercase,
    Uppercase,
    /// Apply the element type's own modifiers to every list element.
    Dive,
}

impl Modifier {
    fn name(&self) -> &'static str {
        match self {
            Modifier::Trim => "trim",
            Modifier::TrimStart => "ltrim",
            Modifier::TrimEnd => "rtrim",
            Modifier::Lowercase => "lcase",
            Modifier::Uppercase => "ucase",
            Modifier::Dive => "dive",
        }
    }
}

pub enum Target<'a> {
    Str(&'a mut String),
    Int(&'a mut i64),
    Nested(&'a mut dyn Transform),
    List(Vec<&'a mut dyn Transform>),
}

pub struct FieldMods<'a> {
    pub name: &'static str,
    pub target: Target<'a>,
    pub modifiers: &'static [Modifier],
}

impl<'a> FieldMods<'a> {
    pub fn str(name: &'static str, target: &'a mut String, modifiers: &'static [Modifier]) -> Self {
        Self {
            name,
            target: Target::Str(target),
            modifiers,
        }
    }

    pub fn int(name: &'static str, target: &'a mut i64, modifiers: &'static [Modifier]) -> Self {
        Self {
            name,
            target: Target::Int(target),
            modifiers,
        }
    }

    /// Nested structs are always transformed.
    pub fn nested(name: &'static str, target: &'a mut dyn Transform) -> Self {
        Self {
            name,
            target: Target::Nested(target),
            modifiers: &[],
        }
    }

    pub fn list<T: Transform>(name: &'static str, items: &'a mut [T], modifiers: &'static [Modifier]) -> Self {
        Self {
            name,
            target: Target::List(items.iter_mut().map(|i| i as &mut dyn Transform).collect()),
            modifiers,
        }
    }
}

pub trait Transform {
    /// Mutable field table. Fields without modifiers may be left out.
    fn modifiers(&mut self) -> Vec<FieldMods<'_>>;
}

/// A modifier was declared on a field it cannot apply to. This is a bug in
/// the declaring type, never a client error.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("{field}: modifier '{modifier}' cannot be applied to {kind} field")]
    Unsupported {
        field: String,
        modifier: &'static str,
        kind: &'static str,
    },
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Transformer;

impl Transformer {
    pub fn new() -> Self {
        Self
    }

    /// Apply every declared modifier to `value` in place. `type_name` prefixes error paths.
    pub fn apply(&self, value: &mut dyn Transform, type_name: &str) -> Result<(), TransformError> {
        self.walk(value, type_name)
    }

    fn walk(&self, value: &mut dyn Transform, prefix: &str) -> Result<(), TransformError> {
        for field in value.modifiers() {
            let namespace = format!("{}.{}", prefix, field.name);
            self.apply_field(field, &namespace)?;
        }
        Ok(())
    }

    fn apply_field(&self, field: FieldMods<'_>, namespace: &str) -> Result<(), TransformError> {
        match field.target {
            Target::Str(s) => {
                for m in field.modifiers {
                    apply_str(*m, s).ok_or_else(|| unsupported(namespace, *m, "string"))?;
                }
                Ok(())
            }
            Target::Int(_) => match field.modifiers.first() {
                Some(m) => Err(unsupported(namespace, *m, "integer")),
                None => Ok(()),
            },
            Target::Nested(inner) => match field.modifiers.first() {
                Some(m) => Err(unsupported(namespace, *m, "struct")),
                None => self.walk(inner, namespace),
            },
            Target::List(items) => {
                let mut dive = false;
                for m in field.modifiers {
                    match m {
                        Modifier::Dive => dive = true,
                        other => return Err(unsupported(namespace, *other, "list")),
                    }
                }
                if dive {
                    for (i, item) in items.into_iter().enumerate() {
                        self.walk(item, &format!("{}[{}]", namespace, i))?;
                    }
                }
                Ok(())
            }
        }
    }
}

fn apply_str(modifier: Modifier, s: &mut String) -> Option<()> {
    let changed = match modifier {
        Modifier::Trim => s.trim().to_string(),
        Modifier::TrimStart => s.trim_start().to_string(),
        Modifier::TrimEnd => s.trim_end().to_string(),
        Modifier::Lowercase => s.to_lowercase(),
        Modifier::Uppercase => s.to_uppercase(),
        Modifier::Dive => return None,
    };
    *s = changed;
    Some(())
}

fn unsupported(namespace: &str, modifier: Modifier, kind: &'static str) -> TransformError {
    TransformError::Unsupported {
        field: namespace.to_string(),
        modifier: modifier.name(),
        kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Tag {
        label: String,
    }

    impl Transform for Tag {
        fn modifiers(&mut self) -> Vec<FieldMods<'_>> {
            vec![FieldMods::str("label", &mut self.label, &[Modifier::Trim, Modifier::Lowercase])]
        }
    }

    struct Post {
        title: String,
        code: String,
        author: Tag,
        tags: Vec<Tag>,
    }

    impl Transform for Post {
        fn modifiers(&mut self) -> Vec<FieldMods<'_>> {
            vec![
                FieldMods::str("title", &mut self.title, &[Modifier::Trim]),
                FieldMods::str("code", &mut self.code, &[Modifier::TrimStart, Modifier::Uppercase]),
                FieldMods::nested("author", &mut self.author),
                FieldMods::list("tags", &mut self.tags, &[Modifier::Dive]),
            ]
        }
    }

    #[test]
    fn trims_recursively() {
        let mut post = Post {
            title: "  hello  ".into(),
            code: "  ab ".into(),
            author: Tag { label: " Jane ".into() },
            tags: vec![Tag { label: "\tRust\n".into() }, Tag::default()],
        };
        Transformer::new().apply(&mut post, "Post").unwrap();
        assert_eq!(post.title, "hello");
        assert_eq!(post.code, "AB ");
        assert_eq!(post.author.label, "jane");
        assert_eq!(post.tags[0].label, "rust");
        assert_eq!(post.tags[1].label, "");
    }

    #[test]
    fn list_without_dive_is_left_alone() {
        struct Shallow {
            tags: Vec<Tag>,
        }
        impl Transform for Shallow {
            fn modifiers(&mut self) -> Vec<FieldMods<'_>> {
                vec![FieldMods::list("tags", &mut self.tags, &[])]
            }
        }
        let mut value = Shallow {
            tags: vec![Tag { label: " x ".into() }],
        };
        Transformer::new().apply(&mut value, "Shallow").unwrap();
        assert_eq!(value.tags[0].label, " x ");
    }

    #[test]
    fn string_modifier_on_integer_is_an_error() {
        struct Counter {
            count: i64,
        }
        impl Transform for Counter {
            fn modifiers(&mut self) -> Vec<FieldMods<'_>> {
                vec![FieldMods::int("count", &mut self.count, &[Modifier::Trim])]
            }
        }
        let err = Transformer::new().apply(&mut Counter { count: 1 }, "Counter").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Counter.count: modifier 'trim' cannot be applied to integer field"
        );
    }
}
