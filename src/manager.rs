//! Per-output-node memoization.

use crate::{
	component::{same_component, ComponentRef, Instance},
	equal::shallow_equal,
	error::RenderError,
	props::Props,
	tree::OutputTree,
};
use core::any::Any;
use hashbrown::HashMap;
use tracing::{debug, trace, trace_span};

/// What the [`ComponentManager`] remembers about one output node.
pub struct RenderContext<T: OutputTree> {
	component: ComponentRef<T>,
	instance: Box<dyn Instance<T>>,
	previous_props: Option<Props<T::Node>>,
	previous_node: Option<T::Node>,
	outer_state: Option<Box<dyn Any>>,
}

impl<T: OutputTree> RenderContext<T> {
	fn new(component: &ComponentRef<T>) -> Self {
		Self {
			component: component.clone(),
			instance: component.instantiate(),
			previous_props: None,
			previous_node: None,
			outer_state: None,
		}
	}

	fn needs_render(&self, props: &Props<T::Node>, previous: Option<&T::Node>) -> bool {
		match (previous, &self.previous_node, &self.previous_props) {
			(Some(previous), Some(previous_node), Some(previous_props)) => previous != previous_node || !shallow_equal(previous_props, props),
			_ => true,
		}
	}
}

/// Caches the last props and result per output node, and skips re-renders that wouldn't change anything.
///
/// Contexts are keyed by node handle and hold the last rendered node and props, so a node stays alive on
/// the host side until its context is [evicted](`ComponentManager::evict_subtree`). The
/// [`Renderer`](`crate::Renderer`) evicts on every removal and replacement.
pub struct ComponentManager<T: OutputTree> {
	contexts: HashMap<T::Node, RenderContext<T>>,
}

impl<T: OutputTree> Default for ComponentManager<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T: OutputTree> ComponentManager<T> {
	#[must_use]
	pub fn new() -> Self {
		Self { contexts: HashMap::new() }
	}

	/// Number of nodes with a live context.
	#[must_use]
	pub fn len(&self) -> usize {
		self.contexts.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.contexts.is_empty()
	}

	#[must_use]
	pub fn contains(&self, node: &T::Node) -> bool {
		self.contexts.contains_key(node)
	}

	/// The outer state attached to `node`, if there is one and it is an `S`.
	#[must_use]
	pub fn outer_state<S: 'static>(&self, node: &T::Node) -> Option<&S> {
		self.contexts.get(node)?.outer_state.as_ref()?.downcast_ref()
	}

	/// Attaches `state` to `node`'s context, replacing any previous state.
	///
	/// Returns `false` (and drops `state`) if `node` has no context.
	pub fn set_outer_state<S: 'static>(&mut self, node: &T::Node, state: S) -> bool {
		match self.contexts.get_mut(node) {
			Some(context) => {
				context.outer_state = Some(Box::new(state));
				true
			}
			None => false,
		}
	}

	/// Forgets `node`. Its descendants keep their contexts.
	pub fn evict(&mut self, node: &T::Node) -> bool {
		self.contexts.remove(node).is_some()
	}

	/// Forgets `node` and all of its current descendants.
	pub fn evict_subtree(&mut self, tree: &T, node: &T::Node) {
		if self.contexts.is_empty() {
			return;
		}
		let mut pending = vec![node.clone()];
		let mut evicted = 0_usize;
		while let Some(node) = pending.pop() {
			evicted += usize::from(self.contexts.remove(&node).is_some());
			pending.extend(tree.children(&node));
		}
		if evicted > 0 {
			trace!("Evicted {} render context(s).", evicted);
		}
	}

	/// Renders `component` with `props`, reusing `previous` where possible.
	///
	/// If the result is a different node than `previous`, it takes `previous`'s place in the tree,
	/// as long as `previous` is still attached to the parent it had before the render.
	///
	/// # Errors
	///
	/// Whatever the component's [`Instance::render`] returns. `previous`'s context is then left as it was.
	pub fn render(&mut self, tree: &mut T, component: &ComponentRef<T>, props: Props<T::Node>, previous: Option<&T::Node>) -> Result<T::Node, RenderError> {
		let span = trace_span!("ComponentManager::render", ?previous, props = props.len());
		let _enter = span.enter();

		let stored = previous.and_then(|previous| self.contexts.remove(previous));
		let (mut context, displaced) = match stored {
			Some(context) if same_component(&context.component, component) => (context, None),
			Some(displaced) => {
				debug!("Component changed. Starting over with a fresh context.");
				(RenderContext::new(component), Some(displaced))
			}
			None => (RenderContext::new(component), None),
		};

		if !context.needs_render(&props, previous) {
			trace!("Props unchanged. Keeping the previous node.");
			if let Some(previous) = previous {
				self.contexts.insert(previous.clone(), context);
				return Ok(previous.clone());
			}
		}

		let host = previous.and_then(|previous| tree.parent(previous));
		let node = match context.instance.render(tree, &props, previous) {
			Ok(node) => node,
			Err(error) => {
				let kept = if context.previous_node.is_some() { Some(context) } else { displaced };
				if let (Some(previous), Some(kept)) = (previous, kept) {
					self.contexts.insert(previous.clone(), kept);
				}
				return Err(error);
			}
		};
		context.previous_props = Some(props);
		context.previous_node = Some(node.clone());

		if let Some(previous) = previous {
			if *previous != node {
				match (host, tree.parent(previous)) {
					(Some(host), Some(parent)) if parent == host => tree.replace_child(&parent, &node, previous),
					(Some(_), _) => debug!("The instance moved the previous node. Leaving it where it is."),
					(None, _) => trace!("Previous node is detached. Skipping the splice."),
				}
			}
		}

		self.contexts.insert(node.clone(), context);
		Ok(node)
	}
}
