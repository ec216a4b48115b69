//! Record → name/value pairs.
//!
//! Both object encoders consume the same ordered pair list, so skip,
//! rename, omit-if-empty and flattening behave identically in AMF0 and AMF3.

use std::collections::BTreeMap;

use tracing::trace;

use crate::error::EncodeError;
use crate::model::{Field, Record};

/// One member to emit.
pub struct Pair<'a> {
    pub name: &'static str,
    pub field: Field<'a>,
}

/// A member before name conflicts and omit-if-empty are resolved.
struct Candidate<'a> {
    name: &'static str,
    field: Field<'a>,
    omit_empty: bool,
    depth: usize,
}

/// Collects the members of `record` in declaration order.
///
/// Flattened sub-records contribute their members inline, recursively.
/// Each flatten level counts toward `max_depth`, starting from `depth`.
/// When several members share a wire name, the least deeply flattened one
/// is kept (the first declared on a tie) and the others are dropped, so the
/// output never repeats a key. Omit-if-empty applies to the kept member.
pub fn record_pairs<'a>(
    record: &'a dyn Record,
    depth: usize,
    max_depth: usize,
) -> Result<Vec<Pair<'a>>, EncodeError> {
    let mut candidates = Vec::with_capacity(record.descriptors().len());
    collect_candidates(record, depth, max_depth, &mut candidates)?;

    let mut winners: BTreeMap<&'static str, usize> = BTreeMap::new();
    for (index, candidate) in candidates.iter().enumerate() {
        match winners.get(candidate.name) {
            Some(&kept) if candidates[kept].depth <= candidate.depth => {
                trace!(name = candidate.name, depth = candidate.depth, "dropping shadowed member");
            }
            _ => {
                winners.insert(candidate.name, index);
            }
        }
    }

    Ok(candidates
        .into_iter()
        .enumerate()
        .filter(|(index, c)| winners.get(c.name) == Some(index))
        .filter(|(_, c)| !(c.omit_empty && c.field.is_empty()))
        .map(|(_, c)| Pair {
            name: c.name,
            field: c.field,
        })
        .collect())
}

fn collect_candidates<'a>(
    record: &'a dyn Record,
    depth: usize,
    max_depth: usize,
    out: &mut Vec<Candidate<'a>>,
) -> Result<(), EncodeError> {
    for (index, desc) in record.descriptors().iter().enumerate() {
        if desc.skip() {
            continue;
        }
        let field = record.field(index);
        if desc.flatten() {
            let Field::Record(inner) = field else {
                return Err(EncodeError::InvalidFlatten { field: desc.field() });
            };
            let depth = depth + 1;
            if depth > max_depth {
                return Err(EncodeError::DepthExceeded { max: max_depth });
            }
            trace!(field = desc.field(), depth, "flattening embedded record");
            collect_candidates(inner, depth, max_depth, out)?;
            continue;
        }
        out.push(Candidate {
            name: desc.name(),
            field,
            omit_empty: desc.omit_empty(),
            depth,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use lazy_static::lazy_static;

    use super::*;
    use crate::model::{FieldDescriptor, Value};

    struct Base {
        id: f64,
        tag: String,
    }

    struct Clip {
        base: Base,
        title: String,
        note: String,
        hidden: bool,
    }

    lazy_static! {
        static ref BASE_FIELDS: Vec<FieldDescriptor> = vec![
            FieldDescriptor::tagged("id", "ID"),
            FieldDescriptor::tagged("tag", "tag,omitempty"),
        ];
        static ref CLIP_FIELDS: Vec<FieldDescriptor> = vec![
            FieldDescriptor::flattened("base"),
            FieldDescriptor::new("title"),
            FieldDescriptor::tagged("note", ",omitempty"),
            FieldDescriptor::tagged("hidden", "-"),
        ];
    }

    impl Record for Base {
        fn descriptors(&self) -> &'static [FieldDescriptor] {
            &BASE_FIELDS
        }

        fn field(&self, index: usize) -> Field<'_> {
            match index {
                0 => Field::Value(self.id.into()),
                _ => Field::Value(self.tag.as_str().into()),
            }
        }
    }

    impl Record for Clip {
        fn descriptors(&self) -> &'static [FieldDescriptor] {
            &CLIP_FIELDS
        }

        fn field(&self, index: usize) -> Field<'_> {
            match index {
                0 => Field::Record(&self.base),
                1 => Field::Value(self.title.as_str().into()),
                2 => Field::Value(self.note.as_str().into()),
                _ => Field::Value(self.hidden.into()),
            }
        }
    }

    fn names(pairs: &[Pair<'_>]) -> Vec<&'static str> {
        pairs.iter().map(|p| p.name).collect()
    }

    #[test]
    fn test_flatten_skip_omitempty() {
        let clip = Clip {
            base: Base { id: 7.0, tag: String::new() },
            title: "intro".into(),
            note: String::new(),
            hidden: true,
        };
        let pairs = record_pairs(&clip, 0, 8).unwrap();
        assert_eq!(names(&pairs), ["ID", "title"]);
        assert!(matches!(pairs[0].field, Field::Value(Value::Number(n)) if n == 7.0));
    }

    #[test]
    fn test_omitempty_keeps_non_empty() {
        let clip = Clip {
            base: Base { id: 0.0, tag: "x".into() },
            title: String::new(),
            note: "n".into(),
            hidden: false,
        };
        let pairs = record_pairs(&clip, 0, 8).unwrap();
        // Fields without omitempty are written even when empty.
        assert_eq!(names(&pairs), ["ID", "tag", "title", "note"]);
    }

    #[test]
    fn test_flatten_counts_toward_depth() {
        let clip = Clip {
            base: Base { id: 1.0, tag: String::new() },
            title: String::new(),
            note: String::new(),
            hidden: false,
        };
        let result = record_pairs(&clip, 0, 0);
        assert!(matches!(result, Err(EncodeError::DepthExceeded { max: 0 })));
    }

    struct BadFlatten;

    lazy_static! {
        static ref BAD_FIELDS: Vec<FieldDescriptor> = vec![FieldDescriptor::flattened("inner")];
    }

    impl Record for BadFlatten {
        fn descriptors(&self) -> &'static [FieldDescriptor] {
            &BAD_FIELDS
        }

        fn field(&self, _index: usize) -> Field<'_> {
            Field::Value(Value::Null)
        }
    }

    #[test]
    fn test_flatten_requires_record() {
        let result = record_pairs(&BadFlatten, 0, 8);
        assert!(matches!(result, Err(EncodeError::InvalidFlatten { field: "inner" })));
    }

    struct Inner {
        id: f64,
        extra: f64,
    }

    struct Outer {
        id: f64,
        inner: Inner,
    }

    lazy_static! {
        static ref INNER_FIELDS: Vec<FieldDescriptor> = vec![
            FieldDescriptor::new("id"),
            FieldDescriptor::new("extra"),
        ];
        static ref OUTER_FIELDS: Vec<FieldDescriptor> = vec![
            FieldDescriptor::tagged("id", "id,omitempty"),
            FieldDescriptor::flattened("inner"),
        ];
    }

    impl Record for Inner {
        fn descriptors(&self) -> &'static [FieldDescriptor] {
            &INNER_FIELDS
        }

        fn field(&self, index: usize) -> Field<'_> {
            match index {
                0 => Field::Value(self.id.into()),
                _ => Field::Value(self.extra.into()),
            }
        }
    }

    impl Record for Outer {
        fn descriptors(&self) -> &'static [FieldDescriptor] {
            &OUTER_FIELDS
        }

        fn field(&self, index: usize) -> Field<'_> {
            match index {
                0 => Field::Value(self.id.into()),
                _ => Field::Record(&self.inner),
            }
        }
    }

    #[test]
    fn test_shallower_name_wins() {
        let outer = Outer {
            id: 1.0,
            inner: Inner { id: 2.0, extra: 3.0 },
        };
        let pairs = record_pairs(&outer, 0, 8).unwrap();
        assert_eq!(names(&pairs), ["id", "extra"]);
        assert!(matches!(pairs[0].field, Field::Value(Value::Number(n)) if n == 1.0));
    }

    #[test]
    fn test_omitted_outer_name_still_shadows() {
        let outer = Outer {
            id: 0.0,
            inner: Inner { id: 2.0, extra: 3.0 },
        };
        let pairs = record_pairs(&outer, 0, 8).unwrap();
        assert_eq!(names(&pairs), ["extra"]);
    }
}
