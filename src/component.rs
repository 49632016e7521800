//! Components and the per-kind registry.
//!
//! A [`Component`] is a factory. The [`ComponentManager`](`crate::manager::ComponentManager`) calls
//! [`Component::instantiate`] once per output node it governs and keeps the resulting [`Instance`] around,
//! so instances may cache whatever they like between renders.
//!
//! Closures work for both:
//!
//! ```
//! use mfm_dom::{
//! 	arena::{ArenaTree, NodeId},
//! 	component::{self, ComponentRef},
//! 	props::Props,
//! 	tree::{ElementDescriptor, OutputTree},
//! };
//!
//! let hashtag: ComponentRef<ArenaTree> = component::from_fn(|| {
//! 	component::instance(|tree: &mut ArenaTree, props: &Props<NodeId>, _previous: Option<&NodeId>| {
//! 		let a = tree.create_element(&ElementDescriptor::new("a"));
//! 		let text = tree.create_text(props.str("hashtag")?);
//! 		tree.append_child(&a, &text);
//! 		Ok(a)
//! 	})
//! });
//! # let _ = hashtag;
//! ```

use crate::{ast::Kind, error::RenderError, props::Props, tree::OutputTree};
use hashbrown::HashMap;
use std::rc::Rc;

/// A component instance, bound to one output node at a time.
pub trait Instance<T: OutputTree> {
	/// Renders `props`, optionally reusing `previous`, which is the node this instance returned last time
	/// (or a foreign node if the kind at that position changed).
	///
	/// Returning `previous` itself means "updated in place".
	///
	/// # Errors
	///
	/// Typically [`RenderError::MalformedProps`].
	fn render(&mut self, tree: &mut T, props: &Props<T::Node>, previous: Option<&T::Node>) -> Result<T::Node, RenderError>;
}

impl<T, F> Instance<T> for F
where
	T: OutputTree,
	F: FnMut(&mut T, &Props<T::Node>, Option<&T::Node>) -> Result<T::Node, RenderError>,
{
	fn render(&mut self, tree: &mut T, props: &Props<T::Node>, previous: Option<&T::Node>) -> Result<T::Node, RenderError> {
		self(tree, props, previous)
	}
}

/// Creates [`Instance`]s.
pub trait Component<T: OutputTree> {
	fn instantiate(&self) -> Box<dyn Instance<T>>;
}

impl<T, F, I> Component<T> for F
where
	T: OutputTree,
	F: Fn() -> I,
	I: Instance<T> + 'static,
{
	fn instantiate(&self) -> Box<dyn Instance<T>> {
		Box::new(self())
	}
}

/// Shared component reference. Two references name the same component iff they point to the same allocation.
pub type ComponentRef<T> = Rc<dyn Component<T>>;

/// Wraps a factory closure.
pub fn from_fn<T, F, I>(factory: F) -> ComponentRef<T>
where
	T: OutputTree,
	F: Fn() -> I + 'static,
	I: Instance<T> + 'static,
{
	Rc::new(factory)
}

/// Pins a closure to the [`Instance`] signature, which closure type inference can't do on its own.
pub fn instance<T, F>(render: F) -> F
where
	T: OutputTree,
	F: FnMut(&mut T, &Props<T::Node>, Option<&T::Node>) -> Result<T::Node, RenderError>,
{
	render
}

#[must_use]
pub fn same_component<T: OutputTree>(a: &ComponentRef<T>, b: &ComponentRef<T>) -> bool {
	Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
}

/// One component per [`Kind`].
///
/// Text and the fixed-tag kinds (bold, italic, strike) are handled by the renderer itself and never looked up.
pub struct Components<T: OutputTree> {
	by_kind: HashMap<Kind, ComponentRef<T>>,
}

impl<T: OutputTree> Default for Components<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: OutputTree> Components<T> {
	#[must_use]
	pub fn new() -> Self {
		Self { by_kind: HashMap::new() }
	}

	/// Returns the component previously registered for `kind`, if any.
	pub fn register(&mut self, kind: Kind, component: ComponentRef<T>) -> Option<ComponentRef<T>> {
		self.by_kind.insert(kind, component)
	}

	#[must_use]
	pub fn with(mut self, kind: Kind, component: ComponentRef<T>) -> Self {
		self.register(kind, component);
		self
	}

	pub fn unregister(&mut self, kind: Kind) -> Option<ComponentRef<T>> {
		self.by_kind.remove(&kind)
	}

	/// # Errors
	///
	/// [`RenderError::MissingComponent`] if nothing is registered for `kind`.
	pub fn get(&self, kind: Kind) -> Result<&ComponentRef<T>, RenderError> {
		self.by_kind.get(&kind).ok_or(RenderError::MissingComponent(kind))
	}

	#[must_use]
	pub fn contains(&self, kind: Kind) -> bool {
		self.by_kind.contains_key(&kind)
	}
}
