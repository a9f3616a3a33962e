//! Element identity for keyed lists.
//!
//! List elements are matched across renders by a key. Element types expose
//! their identity fields through [`HasIdentity`]; [`For`](super::For) picks
//! the field to use once per render, from the first element present.

use super::show::Truthy;
use crate::reactive::{Observable, Slot};
use crate::view::Key;

/// Field names checked for an element's identity, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdField {
    /// `id`
    Id,
    /// `_id`
    UnderscoreId,
    /// `__id`
    DoubleUnderscoreId,
}

impl IdField {
    /// Every field, highest priority first.
    pub const ALL: [IdField; 3] = [IdField::Id, IdField::UnderscoreId, IdField::DoubleUnderscoreId];

    /// The field's name.
    pub fn name(self) -> &'static str {
        match self {
            IdField::Id => "id",
            IdField::UnderscoreId => "_id",
            IdField::DoubleUnderscoreId => "__id",
        }
    }
}

/// Types whose values can carry an identity field.
///
/// The default implementation has no identity fields at all, so elements
/// fall back to their position. Elements that are not present are skipped
/// by [`For`](super::For).
///
/// ```rust
/// use lattice_flow::flow::{HasIdentity, IdField};
/// use lattice_flow::view::Key;
///
/// struct Todo {
///     id: u32,
///     title: String,
/// }
///
/// impl HasIdentity for Todo {
///     fn identity(&self, field: IdField) -> Option<Key> {
///         (field == IdField::Id).then(|| Key::from(self.id))
///     }
/// }
///
/// let todo = Todo { id: 7, title: "write docs".into() };
/// assert_eq!(todo.identity(IdField::Id), Some(Key::Int(7)));
/// assert_eq!(todo.identity(IdField::UnderscoreId), None);
/// ```
pub trait HasIdentity {
    /// The value of `field`, or `None` when the element has no such field.
    fn identity(&self, field: IdField) -> Option<Key> {
        let _ = field;
        None
    }

    /// Whether the element is rendered at all.
    fn is_present(&self) -> bool {
        true
    }
}

impl HasIdentity for serde_json::Value {
    fn identity(&self, field: IdField) -> Option<Key> {
        match self.as_object()?.get(field.name())? {
            serde_json::Value::Null => None,
            serde_json::Value::String(value) => Some(Key::Str(value.clone())),
            serde_json::Value::Number(number) => Some(match number.as_i64() {
                Some(value) => Key::Int(value),
                None => Key::Str(number.to_string()),
            }),
            other => Some(Key::Str(other.to_string())),
        }
    }

    fn is_present(&self) -> bool {
        self.is_truthy()
    }
}

macro_rules! positional {
    ($($ty:ty),*) => {
        $(
            impl HasIdentity for $ty {
                fn is_present(&self) -> bool {
                    self.is_truthy()
                }
            }
        )*
    };
}

positional!(bool, i8, i16, i32, i64, u8, u16, u32, u64, usize, f32, f64, String, &'static str);

impl HasIdentity for char {}

/// The identity field for a render pass.
///
/// Only the first element present is inspected, and a field is chosen only
/// when its value there is truthy. Values are read untracked.
pub(crate) fn identity_field<T>(slots: &[Slot<T>]) -> Option<IdField>
where
    T: HasIdentity + Send + Sync + 'static,
{
    let first = slots.iter().find_map(present)?;
    first.peek_with(|value| {
        IdField::ALL.into_iter().find(|field| {
            value
                .identity(*field)
                .is_some_and(|key| key.is_truthy())
        })
    })
}

/// The element in `slot`, unless it is a hole or a falsy value.
pub(crate) fn present<T>(slot: &Slot<T>) -> Option<&Observable<T>>
where
    T: HasIdentity + Send + Sync + 'static,
{
    slot.as_ref()
        .filter(|element| element.peek_with(|value| value.is_present()))
}

/// The key of the element at `index`: its `field` value if it has one,
/// otherwise its position.
pub(crate) fn key_of<T>(element: &Observable<T>, field: Option<IdField>, index: usize) -> Key
where
    T: HasIdentity + Send + Sync + 'static,
{
    field
        .and_then(|field| element.peek_with(|value| value.identity(field)))
        .unwrap_or(Key::Index(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactive::ObservableList;
    use serde_json::json;

    fn keys(list: &ObservableList<serde_json::Value>) -> Vec<Key> {
        let slots = list.peek();
        let field = identity_field(&slots);
        slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| present(slot).map(|element| key_of(element, field, index)))
            .collect()
    }

    #[test]
    fn id_field_wins() {
        let list = ObservableList::from_vec(vec![json!({ "id": "x" }), json!({ "id": "y" })]);
        assert_eq!(keys(&list), vec![Key::from("x"), Key::from("y")]);
    }

    #[test]
    fn underscore_fields_are_fallbacks() {
        let list = ObservableList::from_vec(vec![json!({ "_id": 1 }), json!({ "_id": 2 })]);
        assert_eq!(keys(&list), vec![Key::Int(1), Key::Int(2)]);

        let list = ObservableList::from_vec(vec![json!({ "__id": "a", "_id": 0 })]);
        assert_eq!(keys(&list), vec![Key::from("a")]);
    }

    #[test]
    fn no_identity_means_positions() {
        let list = ObservableList::from_vec(vec![json!({}), json!({})]);
        assert_eq!(keys(&list), vec![Key::Index(0), Key::Index(1)]);

        let list = ObservableList::from_vec(vec![1, 2, 3]);
        assert_eq!(identity_field(&list.peek()), None);
    }

    #[test]
    fn first_present_element_decides_the_field() {
        let list = ObservableList::from_sparse(vec![
            None,
            Some(json!({ "_id": 5 })),
            Some(json!({ "id": 9, "_id": 6 })),
            Some(json!({ "name": "no id" })),
        ]);
        assert_eq!(identity_field(&list.peek()), Some(IdField::UnderscoreId));
        assert_eq!(keys(&list), vec![Key::Int(5), Key::Int(6), Key::Index(3)]);
    }

    #[test]
    fn falsy_identity_is_not_selected() {
        let list = ObservableList::from_vec(vec![json!({ "id": 0 }), json!({ "id": 1 })]);
        assert_eq!(keys(&list), vec![Key::Index(0), Key::Index(1)]);

        let list = ObservableList::from_vec(vec![json!({ "id": "" })]);
        assert_eq!(identity_field(&list.peek()), None);
    }

    #[test]
    fn falsy_elements_are_not_present() {
        let list = ObservableList::from_vec(vec![
            serde_json::Value::Null,
            json!({ "id": "a" }),
            json!(false),
            json!({ "id": "b" }),
        ]);
        assert_eq!(identity_field(&list.peek()), Some(IdField::Id));
        assert_eq!(keys(&list), vec![Key::from("a"), Key::from("b")]);

        assert!(!0_i32.is_present());
        assert!(!"".is_present());
        assert!(1.5_f64.is_present());
        assert!('\0'.is_present());
    }
}
