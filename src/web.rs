//! [`OutputTree`] over the live browser DOM.
//!
//! DOM nodes have no hashable identity on the Rust side, so each node this backend touches gets a numeric
//! key stored as an expando property. [`WebNode`]s compare and hash by that key.
//! Keys come from one per-thread counter, so nodes keyed by different [`WebTree`]s never collide.
//!
//! The browser expands shorthand style properties into longhands, so style written through this backend
//! is also recorded as declared, in a second expando property. [`OutputTree::style`] reports that record.

use crate::tree::{ElementDescriptor, OutputTree};
use core::{
	cell::Cell,
	hash::{Hash, Hasher},
};
use js_sys::{Array, Object, Reflect};
use tracing::error;
use wasm_bindgen::{JsCast, JsValue, UnwrapThrowExt};
use web_sys::{Document, Element, HtmlElement, Node, Text};

const KEY_PROPERTY: &str = "__mfmDomKey";
const STYLE_PROPERTY: &str = "__mfmDomStyle";

thread_local! {
	static NEXT_KEY: Cell<u32> = Cell::new(0);
}

/// [`None`] once the counter is exhausted. Keys are never reused.
fn allocate_key(next: &Cell<u32>) -> Option<u32> {
	let key = next.get();
	next.set(key.checked_add(1)?);
	Some(key)
}

/// A DOM node with a stable key.
#[derive(Debug, Clone)]
pub struct WebNode {
	key: u32,
	node: Node,
}

impl PartialEq for WebNode {
	fn eq(&self, other: &Self) -> bool {
		self.key == other.key
	}
}
impl Eq for WebNode {}

impl Hash for WebNode {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.key.hash(state);
	}
}

impl WebNode {
	#[must_use]
	pub fn key(&self) -> u32 {
		self.key
	}

	#[must_use]
	pub fn node(&self) -> &Node {
		&self.node
	}
}

impl AsRef<Node> for WebNode {
	fn as_ref(&self) -> &Node {
		&self.node
	}
}

/// Renders into `document`.
pub struct WebTree {
	document: Document,
}

impl WebTree {
	#[must_use]
	pub fn new(document: Document) -> Self {
		Self { document }
	}

	/// The current window's document.
	///
	/// # Panics
	///
	/// Iff there is no window or it has no document.
	#[must_use]
	pub fn for_window() -> Self {
		let document = web_sys::window().expect_throw("no window").document().expect_throw("no document");
		Self::new(document)
	}

	#[must_use]
	pub fn document(&self) -> &Document {
		&self.document
	}

	/// Keys `node`, reusing its existing key if this or another [`WebTree`] assigned one before.
	///
	/// Use this to obtain the parent handle for [`Renderer::render`](`crate::Renderer::render`).
	///
	/// # Panics
	///
	/// Throws once the current thread has keyed [`u32::MAX`] nodes.
	pub fn wrap(&self, node: Node) -> WebNode {
		let name = JsValue::from_str(KEY_PROPERTY);
		let existing = Reflect::get(&node, &name).ok().and_then(|key| key.as_f64());
		#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
		let key = match existing {
			Some(key) => key as u32,
			None => {
				let key = NEXT_KEY.with(allocate_key).unwrap_or_else(|| {
					error!("Ran out of DOM node keys.");
					wasm_bindgen::throw_str("mfm-dom: ran out of DOM node keys")
				});
				if let Err(error) = Reflect::set(&node, &name, &JsValue::from(key)) {
					error!("Failed to key DOM node: {:?}", error);
				}
				key
			}
		};
		WebNode { key, node }
	}
}

fn element(node: &WebNode) -> Option<&Element> {
	node.node.dyn_ref::<Element>()
}

fn html_element(node: &WebNode) -> Option<&HtmlElement> {
	node.node.dyn_ref::<HtmlElement>()
}

/// The style recorded by [`record_style`], if any.
fn declared_style(node: &WebNode) -> Option<Object> {
	Reflect::get(&node.node, &JsValue::from_str(STYLE_PROPERTY)).ok()?.dyn_into::<Object>().ok()
}

fn record_style(node: &WebNode, name: &str, value: &str) {
	let declared = declared_style(node).unwrap_or_else(|| {
		let declared = Object::new();
		log_failure("style record", Reflect::set(&node.node, &JsValue::from_str(STYLE_PROPERTY), &declared));
		declared
	});
	log_failure("style record", Reflect::set(&declared, &JsValue::from_str(name), &JsValue::from_str(value)));
}

fn log_failure<T>(operation: &str, result: Result<T, JsValue>) {
	if let Err(error) = result {
		error!("DOM {} failed: {:?}", operation, error);
	}
}

impl OutputTree for WebTree {
	type Node = WebNode;

	fn create_text(&mut self, text: &str) -> WebNode {
		let text: Node = self.document.create_text_node(text).into();
		self.wrap(text)
	}

	fn create_element(&mut self, descriptor: &ElementDescriptor) -> WebNode {
		let element = self.document.create_element(&descriptor.tag).expect_throw("Failed to create element");
		for class in &descriptor.classes {
			log_failure("classList.add", element.class_list().add_1(class));
		}
		for (name, value) in &descriptor.attributes {
			log_failure("setAttribute", element.set_attribute(name, value));
		}
		let node = self.wrap(element.into());
		for (name, value) in &descriptor.style {
			self.set_style(&node, name, value);
		}
		node
	}

	fn tag_name(&self, node: &WebNode) -> Option<String> {
		element(node).map(Element::tag_name)
	}

	fn text(&self, node: &WebNode) -> Option<String> {
		node.node.dyn_ref::<Text>().map(|text| text.data())
	}

	fn set_text(&mut self, node: &WebNode, text: &str) {
		match node.node.dyn_ref::<Text>() {
			Some(node) => node.set_data(text),
			None => error!("Tried to set text of a non-text node."),
		}
	}

	fn classes(&self, node: &WebNode) -> Vec<String> {
		element(node).map_or_else(Vec::new, |element| {
			let list = element.class_list();
			(0..list.length()).filter_map(|i| list.item(i)).collect()
		})
	}

	fn add_class(&mut self, node: &WebNode, class: &str) {
		match element(node) {
			Some(element) => log_failure("classList.add", element.class_list().add_1(class)),
			None => error!("Tried to add a class to a non-element node."),
		}
	}

	fn style(&self, node: &WebNode) -> Vec<(String, String)> {
		if let Some(declared) = declared_style(node) {
			return Object::entries(&declared)
				.iter()
				.filter_map(|entry| {
					let entry = Array::from(&entry);
					Some((entry.get(0).as_string()?, entry.get(1).as_string()?))
				})
				.collect();
		}

		// Not styled through this backend, so only the expanded longhands are available.
		html_element(node).map_or_else(Vec::new, |html| {
			let style = html.style();
			(0..style.length())
				.map(|i| style.item(i))
				.map(|name| {
					let value = style.get_property_value(&name).unwrap_or_default();
					(name, value)
				})
				.collect()
		})
	}

	fn set_style(&mut self, node: &WebNode, name: &str, value: &str) {
		match html_element(node) {
			Some(html) => {
				if self.style_value(node, name) != value {
					log_failure("style.setProperty", html.style().set_property(name, value));
					record_style(node, name, value);
				}
			}
			None => error!("Tried to style a non-HTML node."),
		}
	}

	fn style_value(&self, node: &WebNode, name: &str) -> String {
		match declared_style(node) {
			Some(declared) => Reflect::get(&declared, &JsValue::from_str(name)).ok().and_then(|value| value.as_string()).unwrap_or_default(),
			None => html_element(node).and_then(|html| html.style().get_property_value(name).ok()).unwrap_or_default(),
		}
	}

	fn attribute(&self, node: &WebNode, name: &str) -> Option<String> {
		element(node)?.get_attribute(name)
	}

	fn set_attribute(&mut self, node: &WebNode, name: &str, value: &str) {
		match element(node) {
			Some(element) if element.get_attribute(name).as_deref() == Some(value) => (),
			Some(element) => log_failure("setAttribute", element.set_attribute(name, value)),
			None => error!("Tried to set an attribute on a non-element node."),
		}
	}

	fn parent(&self, node: &WebNode) -> Option<WebNode> {
		node.node.parent_node().map(|parent| self.wrap(parent))
	}

	fn children(&self, node: &WebNode) -> Vec<WebNode> {
		let child_nodes = node.node.child_nodes();
		(0..child_nodes.length()).filter_map(|i| child_nodes.get(i)).map(|child| self.wrap(child)).collect()
	}

	fn child_at(&self, node: &WebNode, index: usize) -> Option<WebNode> {
		let index = u32::try_from(index).ok()?;
		node.node.child_nodes().get(index).map(|child| self.wrap(child))
	}

	fn append_child(&mut self, parent: &WebNode, child: &WebNode) {
		log_failure("appendChild", parent.node.append_child(&child.node));
	}

	fn insert_before(&mut self, parent: &WebNode, child: &WebNode, reference: Option<&WebNode>) {
		log_failure("insertBefore", parent.node.insert_before(&child.node, reference.map(|reference| &reference.node)));
	}

	fn remove_child(&mut self, parent: &WebNode, child: &WebNode) {
		log_failure("removeChild", parent.node.remove_child(&child.node));
	}

	fn replace_child(&mut self, parent: &WebNode, new_child: &WebNode, old_child: &WebNode) {
		log_failure("replaceChild", parent.node.replace_child(&new_child.node, &old_child.node));
	}
}
