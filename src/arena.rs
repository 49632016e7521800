//! An in-memory [`OutputTree`] addressed by stable [`NodeId`]s.
//!
//! Every mutation is recorded in a [`Mutation`] log, so this backend also measures
//! how much work a render actually did.
//!
//! Nodes are never freed while the tree lives, so a [`NodeId`] never dangles or gets reused.

use crate::tree::{ElementDescriptor, OutputTree};
use core::fmt::Write as _;
use tracing::error;

/// Handle of a node in an [`ArenaTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
	#[must_use]
	pub fn index(self) -> usize {
		self.0
	}
}

/// One recorded change to the tree. Node creation is not a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
	Insert { parent: NodeId, child: NodeId },
	Remove { parent: NodeId, child: NodeId },
	Replace { parent: NodeId, old: NodeId, new: NodeId },
	SetText { node: NodeId },
	AddClass { node: NodeId },
	SetStyle { node: NodeId },
	SetAttribute { node: NodeId },
}

impl Mutation {
	/// Whether this changed parent/child links.
	#[must_use]
	pub fn is_structural(&self) -> bool {
		matches!(self, Mutation::Insert { .. } | Mutation::Remove { .. } | Mutation::Replace { .. })
	}

	/// The node whose child list changed, for structural mutations.
	#[must_use]
	pub fn parent(&self) -> Option<NodeId> {
		match *self {
			Mutation::Insert { parent, .. } | Mutation::Remove { parent, .. } | Mutation::Replace { parent, .. } => Some(parent),
			_ => None,
		}
	}
}

#[derive(Debug)]
enum Content {
	Text(String),
	Element {
		tag: String,
		classes: Vec<String>,
		style: Vec<(String, String)>,
		attributes: Vec<(String, String)>,
		children: Vec<NodeId>,
	},
}

#[derive(Debug)]
struct Slot {
	parent: Option<NodeId>,
	content: Content,
}

#[derive(Debug, Default)]
pub struct ArenaTree {
	slots: Vec<Slot>,
	log: Vec<Mutation>,
}

impl ArenaTree {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Number of nodes ever created.
	#[must_use]
	pub fn len(&self) -> usize {
		self.slots.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.slots.is_empty()
	}

	#[must_use]
	pub fn mutations(&self) -> &[Mutation] {
		&self.log
	}

	/// Structural mutations whose parent is `parent`.
	#[must_use]
	pub fn structural_mutations_of(&self, parent: NodeId) -> Vec<Mutation> {
		self.log.iter().copied().filter(|m| m.parent() == Some(parent)).collect()
	}

	pub fn clear_mutations(&mut self) {
		self.log.clear()
	}

	/// Serializes `node` and its descendants as HTML.
	///
	/// Attributes are written in the order `class`, `style`, then the rest. Style properties are joined without spaces.
	#[must_use]
	pub fn outer_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		self.write_html(node, &mut html);
		html
	}

	/// Serializes only the descendants of `node`.
	#[must_use]
	pub fn inner_html(&self, node: NodeId) -> String {
		let mut html = String::new();
		if let Content::Element { children, .. } = &self.slot(node).content {
			for &child in children {
				self.write_html(child, &mut html);
			}
		}
		html
	}

	fn write_html(&self, node: NodeId, html: &mut String) {
		match &self.slot(node).content {
			Content::Text(text) => escape_into(html, text, false),
			Content::Element {
				tag,
				classes,
				style,
				attributes,
				children,
			} => {
				html.push('<');
				html.push_str(tag);
				if !classes.is_empty() {
					html.push_str(" class=\"");
					escape_into(html, &classes.join(" "), true);
					html.push('"');
				}
				if !style.is_empty() {
					let mut css = String::new();
					for (name, value) in style {
						let _ = write!(css, "{}:{};", name, value);
					}
					html.push_str(" style=\"");
					escape_into(html, &css, true);
					html.push('"');
				}
				for (name, value) in attributes {
					html.push(' ');
					html.push_str(name);
					html.push_str("=\"");
					escape_into(html, value, true);
					html.push('"');
				}
				html.push('>');
				if is_void(tag) {
					return;
				}
				for &child in children {
					self.write_html(child, html);
				}
				html.push_str("</");
				html.push_str(tag);
				html.push('>');
			}
		}
	}

	fn slot(&self, node: NodeId) -> &Slot {
		&self.slots[node.0]
	}

	fn slot_mut(&mut self, node: NodeId) -> &mut Slot {
		&mut self.slots[node.0]
	}

	fn push(&mut self, content: Content) -> NodeId {
		self.slots.push(Slot { parent: None, content });
		NodeId(self.slots.len() - 1)
	}

	fn children_mut(&mut self, node: NodeId) -> Option<&mut Vec<NodeId>> {
		match &mut self.slot_mut(node).content {
			Content::Element { children, .. } => Some(children),
			Content::Text(_) => None,
		}
	}

	/// Unlinks `child` from its current parent, if any, without logging.
	fn unlink(&mut self, child: NodeId) -> Option<NodeId> {
		let parent = self.slot_mut(child).parent.take()?;
		if let Some(children) = self.children_mut(parent) {
			children.retain(|&c| c != child);
		}
		Some(parent)
	}

	fn is_ancestor_or_self(&self, ancestor: NodeId, mut node: NodeId) -> bool {
		loop {
			if node == ancestor {
				return true;
			}
			match self.slot(node).parent {
				Some(parent) => node = parent,
				None => return false,
			}
		}
	}
}

impl OutputTree for ArenaTree {
	type Node = NodeId;

	fn create_text(&mut self, text: &str) -> NodeId {
		self.push(Content::Text(text.to_owned()))
	}

	fn create_element(&mut self, descriptor: &ElementDescriptor) -> NodeId {
		let mut classes: Vec<String> = Vec::with_capacity(descriptor.classes.len());
		for class in &descriptor.classes {
			if !classes.contains(class) {
				classes.push(class.clone());
			}
		}
		self.push(Content::Element {
			tag: descriptor.tag.clone(),
			classes,
			style: descriptor.style.clone(),
			attributes: descriptor.attributes.clone(),
			children: Vec::new(),
		})
	}

	fn tag_name(&self, node: &NodeId) -> Option<String> {
		match &self.slot(*node).content {
			Content::Element { tag, .. } => Some(tag.clone()),
			Content::Text(_) => None,
		}
	}

	fn text(&self, node: &NodeId) -> Option<String> {
		match &self.slot(*node).content {
			Content::Text(text) => Some(text.clone()),
			Content::Element { .. } => None,
		}
	}

	fn set_text(&mut self, node: &NodeId, text: &str) {
		match &mut self.slot_mut(*node).content {
			Content::Text(current) => {
				text.clone_into(current);
				self.log.push(Mutation::SetText { node: *node });
			}
			Content::Element { .. } => error!("Tried to set text data of element {:?}. Ignoring.", node),
		}
	}

	fn classes(&self, node: &NodeId) -> Vec<String> {
		match &self.slot(*node).content {
			Content::Element { classes, .. } => classes.clone(),
			Content::Text(_) => Vec::new(),
		}
	}

	fn add_class(&mut self, node: &NodeId, class: &str) {
		match &mut self.slot_mut(*node).content {
			Content::Element { classes, .. } => {
				if !classes.iter().any(|c| c == class) {
					classes.push(class.to_owned());
					self.log.push(Mutation::AddClass { node: *node });
				}
			}
			Content::Text(_) => error!("Tried to add class {:?} to text node {:?}. Ignoring.", class, node),
		}
	}

	fn style(&self, node: &NodeId) -> Vec<(String, String)> {
		match &self.slot(*node).content {
			Content::Element { style, .. } => style.clone(),
			Content::Text(_) => Vec::new(),
		}
	}

	fn set_style(&mut self, node: &NodeId, name: &str, value: &str) {
		match &mut self.slot_mut(*node).content {
			Content::Element { style, .. } => {
				match style.iter_mut().find(|(n, _)| n == name) {
					Some((_, current)) if current.as_str() == value => return,
					Some((_, current)) => value.clone_into(current),
					None => style.push((name.to_owned(), value.to_owned())),
				}
				self.log.push(Mutation::SetStyle { node: *node });
			}
			Content::Text(_) => error!("Tried to style text node {:?}. Ignoring.", node),
		}
	}

	fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
		match &self.slot(*node).content {
			Content::Element { attributes, .. } => attributes.iter().find(|(n, _)| n == name).map(|(_, v)| v.clone()),
			Content::Text(_) => None,
		}
	}

	fn set_attribute(&mut self, node: &NodeId, name: &str, value: &str) {
		match &mut self.slot_mut(*node).content {
			Content::Element { attributes, .. } => {
				match attributes.iter_mut().find(|(n, _)| n == name) {
					Some((_, current)) if current.as_str() == value => return,
					Some((_, current)) => value.clone_into(current),
					None => attributes.push((name.to_owned(), value.to_owned())),
				}
				self.log.push(Mutation::SetAttribute { node: *node });
			}
			Content::Text(_) => error!("Tried to set attribute {:?} on text node {:?}. Ignoring.", name, node),
		}
	}

	fn parent(&self, node: &NodeId) -> Option<NodeId> {
		self.slot(*node).parent
	}

	fn children(&self, node: &NodeId) -> Vec<NodeId> {
		match &self.slot(*node).content {
			Content::Element { children, .. } => children.clone(),
			Content::Text(_) => Vec::new(),
		}
	}

	fn child_at(&self, node: &NodeId, index: usize) -> Option<NodeId> {
		match &self.slot(*node).content {
			Content::Element { children, .. } => children.get(index).copied(),
			Content::Text(_) => None,
		}
	}

	fn append_child(&mut self, parent: &NodeId, child: &NodeId) {
		self.insert_before(parent, child, None)
	}

	fn insert_before(&mut self, parent: &NodeId, child: &NodeId, reference: Option<&NodeId>) {
		let (parent, child) = (*parent, *child);
		if self.children_mut(parent).is_none() {
			return error!("Tried to insert {:?} into text node {:?}. Ignoring.", child, parent);
		}
		if self.is_ancestor_or_self(child, parent) {
			return error!("Tried to insert {:?} into its own subtree at {:?}. Ignoring.", child, parent);
		}
		if let Some(&reference) = reference {
			if reference == child {
				return;
			}
			if self.slot(reference).parent != Some(parent) {
				return error!("Reference node {:?} is not a child of {:?}. Ignoring insertion of {:?}.", reference, parent, child);
			}
		}

		self.unlink(child);
		if let Some(children) = self.children_mut(parent) {
			let index = reference.and_then(|reference| children.iter().position(|c| c == reference)).unwrap_or(children.len());
			children.insert(index, child);
		}
		self.slot_mut(child).parent = Some(parent);
		self.log.push(Mutation::Insert { parent, child });
	}

	fn remove_child(&mut self, parent: &NodeId, child: &NodeId) {
		if self.slot(*child).parent != Some(*parent) {
			return error!("Tried to remove {:?} from {:?}, which is not its parent. Ignoring.", child, parent);
		}
		self.unlink(*child);
		self.log.push(Mutation::Remove { parent: *parent, child: *child });
	}

	fn replace_child(&mut self, parent: &NodeId, new_child: &NodeId, old_child: &NodeId) {
		let (parent, new, old) = (*parent, *new_child, *old_child);
		if new == old {
			return;
		}
		if self.slot(old).parent != Some(parent) {
			return error!("Tried to replace {:?} in {:?}, which is not its parent. Ignoring.", old, parent);
		}
		if self.is_ancestor_or_self(new, parent) {
			return error!("Tried to replace {:?} with its own ancestor {:?}. Ignoring.", old, new);
		}

		self.unlink(new);
		if let Some(children) = self.children_mut(parent) {
			if let Some(slot) = children.iter_mut().find(|c| **c == old) {
				*slot = new;
			}
		}
		self.slot_mut(old).parent = None;
		self.slot_mut(new).parent = Some(parent);
		self.log.push(Mutation::Replace { parent, old, new });
	}
}

fn is_void(tag: &str) -> bool {
	matches!(tag.to_ascii_lowercase().as_str(), "br" | "hr" | "img" | "input" | "meta" | "link" | "wbr")
}

fn escape_into(html: &mut String, text: &str, attribute: bool) {
	for c in text.chars() {
		match c {
			'&' => html.push_str("&amp;"),
			'<' => html.push_str("&lt;"),
			'>' => html.push_str("&gt;"),
			'"' if attribute => html.push_str("&quot;"),
			c => html.push(c),
		}
	}
}
