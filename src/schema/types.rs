//! Schema model
//!
//! A schema is a tree of nodes:
//! - `Field`: ordered list of conditions
//! - `Group`: named children, kept in insertion order
//! - `List`: one member schema applied to every element
//! - `Computed`: pure derivation over the ancestor chain
//!
//! The same node type describes both the validation schema and the
//! compute schema. Validation ignores `Computed` leaves; derivation
//! ignores `Field` leaves.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::condition::Condition;

/// Derivation over `[root, ..., parent, current]`.
pub type ComputeFn = Arc<dyn Fn(&[&Value]) -> Value + Send + Sync>;

/// Node-level validator for a Group or List; messages land in `$internal`.
pub type NodeValidator = Arc<dyn Fn(&Value) -> Vec<String> + Send + Sync>;

type KeyFn = Arc<dyn Fn(&Value) -> String + Send + Sync>;

#[derive(Clone)]
pub enum SchemaNode {
    Field(Vec<Condition>),
    Group(GroupSchema),
    List(ListSchema),
    Computed(ComputeFn),
}

impl SchemaNode {
    pub fn field(conditions: impl IntoIterator<Item = Condition>) -> Self {
        SchemaNode::Field(conditions.into_iter().collect())
    }

    /// A field with no conditions.
    pub fn plain() -> Self {
        SchemaNode::Field(Vec::new())
    }

    pub fn computed(derive: impl Fn(&[&Value]) -> Value + Send + Sync + 'static) -> Self {
        SchemaNode::Computed(Arc::new(derive))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            SchemaNode::Field(_) => "field",
            SchemaNode::Group(_) => "group",
            SchemaNode::List(_) => "list",
            SchemaNode::Computed(_) => "computed",
        }
    }

    /// Empty container matching this node: `{}` for groups, `[]` for lists.
    pub fn scaffold(&self) -> Option<Value> {
        match self {
            SchemaNode::Group(_) => Some(Value::Object(Default::default())),
            SchemaNode::List(_) => Some(Value::Array(Vec::new())),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&GroupSchema> {
        match self {
            SchemaNode::Group(group) => Some(group),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&ListSchema> {
        match self {
            SchemaNode::List(list) => Some(list),
            _ => None,
        }
    }
}

impl fmt::Debug for SchemaNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaNode::Field(conditions) => f.debug_tuple("Field").field(conditions).finish(),
            SchemaNode::Group(group) => fmt::Debug::fmt(group, f),
            SchemaNode::List(list) => fmt::Debug::fmt(list, f),
            SchemaNode::Computed(_) => f.write_str("Computed"),
        }
    }
}

impl From<GroupSchema> for SchemaNode {
    fn from(group: GroupSchema) -> Self {
        SchemaNode::Group(group)
    }
}

impl From<ListSchema> for SchemaNode {
    fn from(list: ListSchema) -> Self {
        SchemaNode::List(list)
    }
}

/// Named children in insertion order.
#[derive(Clone, Default)]
pub struct GroupSchema {
    fields: Vec<(String, SchemaNode)>,
    validation: Option<NodeValidator>,
}

impl GroupSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a child; re-adding a name replaces it in place.
    pub fn field(mut self, name: impl Into<String>, node: impl Into<SchemaNode>) -> Self {
        let name = name.into();
        let node = node.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = node,
            None => self.fields.push((name, node)),
        }
        self
    }

    pub fn validation(
        mut self,
        validate: impl Fn(&Value) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.validation = Some(Arc::new(validate));
        self
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &SchemaNode)> {
        self.fields.iter().map(|(name, node)| (name.as_str(), node))
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, node)| node)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn validator(&self) -> Option<&NodeValidator> {
        self.validation.as_ref()
    }
}

impl fmt::Debug for GroupSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (name, node) in &self.fields {
            map.entry(name, node);
        }
        map.finish()
    }
}

/// One member schema applied to every element.
#[derive(Clone)]
pub struct ListSchema {
    member: Box<SchemaNode>,
    key_selector: KeySelector,
    validation: Option<NodeValidator>,
}

impl ListSchema {
    pub fn new(member: impl Into<SchemaNode>) -> Self {
        Self {
            member: Box::new(member.into()),
            key_selector: KeySelector::Index,
            validation: None,
        }
    }

    pub fn key_selector(mut self, key_selector: KeySelector) -> Self {
        self.key_selector = key_selector;
        self
    }

    pub fn validation(
        mut self,
        validate: impl Fn(&Value) -> Vec<String> + Send + Sync + 'static,
    ) -> Self {
        self.validation = Some(Arc::new(validate));
        self
    }

    pub fn member(&self) -> &SchemaNode {
        &self.member
    }

    pub fn keys(&self) -> &KeySelector {
        &self.key_selector
    }

    pub fn validator(&self) -> Option<&NodeValidator> {
        self.validation.as_ref()
    }
}

impl fmt::Debug for ListSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("List")
            .field("member", &self.member)
            .field("key_selector", &self.key_selector)
            .finish()
    }
}

/// Derives a stable identity for a list element.
///
/// List errors are stored under this key rather than the index, so they
/// follow their element through reorders and insertions.
///
/// Keys are text. A field holding `1` and one holding `"1"` name the same
/// row, and like any duplicate key the later row owns the error. A key
/// starting with `$` gets one more `$` prepended, so no row can land on
/// the reserved `$internal` entry.
#[derive(Clone, Default)]
pub enum KeySelector {
    /// Position in the array
    #[default]
    Index,
    /// Value of a field of the element; falls back to the index when absent
    Field(String),
    Custom(KeyFn),
}

impl KeySelector {
    pub fn field(name: impl Into<String>) -> Self {
        KeySelector::Field(name.into())
    }

    pub fn custom(select: impl Fn(&Value) -> String + Send + Sync + 'static) -> Self {
        KeySelector::Custom(Arc::new(select))
    }

    /// Error key of `item` at `index`.
    pub fn key(&self, item: &Value, index: usize) -> String {
        let raw = match self {
            KeySelector::Index => return index.to_string(),
            KeySelector::Field(name) => match item.get(name) {
                Some(Value::String(key)) => key.clone(),
                Some(Value::Null) | None => return index.to_string(),
                Some(other) => other.to_string(),
            },
            KeySelector::Custom(select) => select(item),
        };
        if raw.starts_with('$') {
            format!("${}", raw)
        } else {
            raw
        }
    }

    /// Whether keys survive reordering (anything but `Index`).
    pub fn is_order_independent(&self) -> bool {
        !matches!(self, KeySelector::Index)
    }
}

impl fmt::Debug for KeySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeySelector::Index => f.write_str("Index"),
            KeySelector::Field(name) => f.debug_tuple("Field").field(name).finish(),
            KeySelector::Custom(_) => f.write_str("Custom"),
        }
    }
}
