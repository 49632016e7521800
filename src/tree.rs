//! The capabilities the renderer needs from a host tree.

use core::{fmt::Debug, hash::Hash};

/// Shape of an element to create, or to compare an existing element against.
///
/// Style properties use CSS names (`font-size`, not `fontSize`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementDescriptor {
	pub tag: String,
	pub classes: Vec<String>,
	pub style: Vec<(String, String)>,
	/// Not part of [`structural_equal`](`crate::equal::structural_equal`).
	pub attributes: Vec<(String, String)>,
}

impl ElementDescriptor {
	pub fn new(tag: impl Into<String>) -> Self {
		Self {
			tag: tag.into(),
			..Self::default()
		}
	}

	#[must_use]
	pub fn class(mut self, class: impl Into<String>) -> Self {
		self.classes.push(class.into());
		self
	}

	#[must_use]
	pub fn style(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.style.push((name.into(), value.into()));
		self
	}

	#[must_use]
	pub fn attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.attributes.push((name.into(), value.into()));
		self
	}

	#[must_use]
	pub fn style_value(&self, name: &str) -> Option<&str> {
		self.style.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
	}
}

/// A mutable, identity-bearing output tree, like the DOM.
///
/// Nodes are addressed by cheap handles. Two handles are equal iff they address the same node.
///
/// Mutations follow DOM semantics: inserting a node that already has a parent moves it.
/// Implementations log host failures instead of returning them.
pub trait OutputTree: 'static {
	type Node: Clone + Eq + Hash + Debug + 'static;

	fn create_text(&mut self, text: &str) -> Self::Node;
	fn create_element(&mut self, descriptor: &ElementDescriptor) -> Self::Node;

	/// [`None`] for text nodes. Casing is up to the host.
	fn tag_name(&self, node: &Self::Node) -> Option<String>;
	/// [`None`] for elements.
	fn text(&self, node: &Self::Node) -> Option<String>;
	fn set_text(&mut self, node: &Self::Node, text: &str);

	fn classes(&self, node: &Self::Node) -> Vec<String>;
	fn add_class(&mut self, node: &Self::Node, class: &str);

	/// Explicitly set style properties, in host order.
	fn style(&self, node: &Self::Node) -> Vec<(String, String)>;
	fn set_style(&mut self, node: &Self::Node, name: &str, value: &str);

	fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;
	fn set_attribute(&mut self, node: &Self::Node, name: &str, value: &str);

	fn parent(&self, node: &Self::Node) -> Option<Self::Node>;
	fn children(&self, node: &Self::Node) -> Vec<Self::Node>;

	fn child_at(&self, node: &Self::Node, index: usize) -> Option<Self::Node> {
		self.children(node).get(index).cloned()
	}

	fn append_child(&mut self, parent: &Self::Node, child: &Self::Node);
	/// Appends if `reference` is [`None`].
	fn insert_before(&mut self, parent: &Self::Node, child: &Self::Node, reference: Option<&Self::Node>);
	fn remove_child(&mut self, parent: &Self::Node, child: &Self::Node);
	fn replace_child(&mut self, parent: &Self::Node, new_child: &Self::Node, old_child: &Self::Node);

	fn has_class(&self, node: &Self::Node, class: &str) -> bool {
		self.classes(node).iter().any(|c| c == class)
	}

	/// The resolved value of a style property, empty if unset.
	fn style_value(&self, node: &Self::Node, name: &str) -> String {
		self.style(node).into_iter().find(|(n, _)| n == name).map(|(_, v)| v).unwrap_or_default()
	}

	fn is_element(&self, node: &Self::Node, tag: &str) -> bool {
		self.tag_name(node).map_or(false, |t| t.eq_ignore_ascii_case(tag))
	}
}

/// Makes `parent`'s children exactly `children`, in order, moving nodes as needed.
///
/// Children already in place are left untouched.
pub fn sync_children<T: OutputTree>(tree: &mut T, parent: &T::Node, children: &[T::Node]) {
	for (index, child) in children.iter().enumerate() {
		match tree.child_at(parent, index) {
			Some(current) if current == *child => (),
			current => tree.insert_before(parent, child, current.as_ref()),
		}
	}
	while let Some(extra) = tree.child_at(parent, children.len()) {
		tree.remove_child(parent, &extra);
	}
}
