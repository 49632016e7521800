use crate::{
	ast::{Kind, Node},
	component::Components,
	equal::structural_equal,
	error::RenderError,
	manager::ComponentManager,
	props::PropValue,
	tree::{ElementDescriptor, OutputTree},
};
use core::fmt::Debug;
use tracing::{error, info, instrument, trace, trace_span, warn};

/// Knobs for a [`Renderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererOptions {
	/// Prefix of the marker classes the renderer itself assigns (`<prefix>-text`, `<prefix>-bold`, …).
	///
	/// Defaults to `"mfm"`. If empty, the bare names are used.
	pub class_prefix: String,
	/// How many levels of nested node lists may be reconciled. Defaults to 64.
	pub depth_limit: usize,
}

impl Default for RendererOptions {
	fn default() -> Self {
		Self {
			class_prefix: "mfm".to_owned(),
			depth_limit: 64,
		}
	}
}

impl RendererOptions {
	#[must_use]
	pub fn with_class_prefix(mut self, class_prefix: impl Into<String>) -> Self {
		self.class_prefix = class_prefix.into();
		self
	}

	#[must_use]
	pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
		self.depth_limit = depth_limit;
		self
	}
}

/// Children staged for a composite node, attached to it as outer state between renders.
struct StagedChildren<N>(Vec<N>);

/// Where a node list is reconciled into.
enum Slots<'a, N> {
	/// The live children of this node.
	Children(&'a N),
	/// A plain buffer that some composite component will place into the tree itself.
	Staged(&'a mut Vec<N>),
}

impl<N: Clone + Eq + Debug> Slots<'_, N> {
	fn get<T: OutputTree<Node = N>>(&self, tree: &T, index: usize) -> Option<N> {
		match self {
			Slots::Children(parent) => tree.child_at(parent, index),
			Slots::Staged(buffer) => buffer.get(index).cloned(),
		}
	}

	fn push<T: OutputTree<Node = N>>(&mut self, tree: &mut T, node: &N) {
		match self {
			Slots::Children(parent) => tree.append_child(parent, node),
			Slots::Staged(buffer) => buffer.push(node.clone()),
		}
	}

	fn remove<T: OutputTree<Node = N>>(&mut self, tree: &mut T, index: usize, existing: &N) {
		match self {
			Slots::Children(parent) => tree.remove_child(parent, existing),
			Slots::Staged(buffer) => {
				buffer.remove(index);
			}
		}
	}

	fn replace<T: OutputTree<Node = N>>(&mut self, tree: &mut T, index: usize, existing: &N, rendered: &N) {
		match self {
			Slots::Children(parent) => {
				if tree.parent(rendered).as_ref() == Some(*parent) {
					trace!("Already spliced into place.");
				} else if tree.parent(existing).as_ref() == Some(*parent) {
					tree.replace_child(parent, rendered, existing);
				} else {
					// `existing` no longer occupies slot `index`, so its old successor does.
					warn!(
						"Expected to replace {:?} in {:?}, but it was moved elsewhere. Leaving it to its new owner and inserting the replacement at {}.",
						existing, parent, index
					);
					let reference = tree.child_at(parent, index);
					tree.insert_before(parent, rendered, reference.as_ref());
				}
			}
			Slots::Staged(buffer) => buffer[index] = rendered.clone(),
		}
	}
}

/// Reconciles MFM syntax trees against an [`OutputTree`], reusing existing output nodes wherever possible.
///
/// # Correct Use
///
/// A renderer assumes it is the only one mutating the subtrees it renders into.
/// Nodes moved away from under it are treated as externally owned and left alone.
///
/// Rendering the same nodes again into the same parent performs no mutations at all.
pub struct Renderer<T: OutputTree> {
	components: Components<T>,
	manager: ComponentManager<T>,
	options: RendererOptions,
}

impl<T: OutputTree> Renderer<T> {
	#[must_use]
	pub fn new(components: Components<T>) -> Self {
		Self::with_options(components, RendererOptions::default())
	}

	#[must_use]
	pub fn with_options(components: Components<T>, options: RendererOptions) -> Self {
		Self {
			components,
			manager: ComponentManager::new(),
			options,
		}
	}

	#[must_use]
	pub fn options(&self) -> &RendererOptions {
		&self.options
	}

	#[must_use]
	pub fn components(&self) -> &Components<T> {
		&self.components
	}

	/// Swapping a component out makes every node it rendered re-render on next use.
	pub fn components_mut(&mut self) -> &mut Components<T> {
		&mut self.components
	}

	#[must_use]
	pub fn manager(&self) -> &ComponentManager<T> {
		&self.manager
	}

	/// The children currently staged for the composite rendered as `node`.
	#[must_use]
	pub fn staged_children(&self, node: &T::Node) -> Option<&[T::Node]> {
		self.manager.outer_state::<StagedChildren<T::Node>>(node).map(|staged| staged.0.as_slice())
	}

	/// Makes `parent`'s children represent `nodes`.
	///
	/// # Errors
	///
	/// See [`RenderError`]. Siblings before the failing node are already updated.
	#[instrument(skip(self, tree, nodes), fields(len = nodes.len()))]
	pub fn render(&mut self, tree: &mut T, nodes: &[Node], parent: &T::Node) -> Result<(), RenderError> {
		let result = self.diff_splice_node_list(tree, nodes, Slots::Children(parent), self.options.depth_limit);
		info!("Live render contexts: {}", self.manager.len());
		result
	}

	/// Like [`Renderer::render`], but reconciles into a plain buffer instead of a parent's children.
	///
	/// The buffer's nodes are not inserted anywhere.
	///
	/// # Errors
	///
	/// See [`RenderError`].
	#[instrument(skip(self, tree, nodes, buffer), fields(len = nodes.len(), buffered = buffer.len()))]
	pub fn render_into(&mut self, tree: &mut T, nodes: &[Node], buffer: &mut Vec<T::Node>) -> Result<(), RenderError> {
		self.diff_splice_node_list(tree, nodes, Slots::Staged(buffer), self.options.depth_limit)
	}

	/// Renders a single node, reusing `existing` if possible. The result is not inserted anywhere,
	/// unless a component spliced it into `existing`'s place.
	///
	/// # Errors
	///
	/// See [`RenderError`].
	pub fn render_node(&mut self, tree: &mut T, node: &Node, existing: Option<&T::Node>) -> Result<T::Node, RenderError> {
		self.diff_node(tree, node, existing, self.options.depth_limit)
	}

	fn class_name(&self, name: &str) -> String {
		if self.options.class_prefix.is_empty() {
			name.to_owned()
		} else {
			format!("{}-{}", self.options.class_prefix, name)
		}
	}

	/// Two-cursor walk over `nodes` and the existing slots.
	fn diff_splice_node_list(&mut self, tree: &mut T, nodes: &[Node], mut slots: Slots<'_, T::Node>, depth_limit: usize) -> Result<(), RenderError> {
		if depth_limit == 0 {
			error!("Depth limit reached");
			return Err(RenderError::DepthLimit(self.options.depth_limit));
		}

		let mut nodes = nodes.iter();
		let mut next = nodes.next();
		let mut i = 0;
		loop {
			match (next, slots.get(tree, i)) {
				(None, None) => break,

				(Some(node), None) => {
					let rendered = self.diff_node(tree, node, None, depth_limit - 1)?;
					slots.push(tree, &rendered);
				}

				(None, Some(existing)) => {
					let span = trace_span!("Removing surplus node", ?existing);
					let _enter = span.enter();
					slots.remove(tree, i, &existing);
					self.manager.evict_subtree(tree, &existing);
					// The next existing node moved into slot `i`.
					continue;
				}

				(Some(node), Some(existing)) => {
					let rendered = self.diff_node(tree, node, Some(&existing), depth_limit - 1)?;
					if rendered != existing {
						let span = trace_span!("Replacing node", ?existing, ?rendered);
						let _enter = span.enter();
						slots.replace(tree, i, &existing, &rendered);
						self.manager.evict_subtree(tree, &existing);
					}
				}
			}

			next = nodes.next();
			i += 1;
		}
		Ok(())
	}

	fn diff_node(&mut self, tree: &mut T, node: &Node, existing: Option<&T::Node>, depth_limit: usize) -> Result<T::Node, RenderError> {
		let span = trace_span!("Diffing node", kind = node.kind().as_str(), ?existing);
		let _enter = span.enter();

		match node {
			Node::Text { props } => Ok(self.diff_text(tree, &props.text, existing)),
			Node::Bold { children } => self.diff_fixed_tag(tree, "b", Kind::Bold, children, existing, depth_limit),
			Node::Italic { children } => self.diff_fixed_tag(tree, "i", Kind::Italic, children, existing, depth_limit),
			Node::Strike { children } => self.diff_fixed_tag(tree, "s", Kind::Strike, children, existing, depth_limit),

			Node::Link { .. } | Node::Plain { .. } | Node::Small { .. } | Node::Center { .. } | Node::Quote { .. } | Node::Fn { .. } => self.diff_composite(tree, node, existing, depth_limit),

			Node::Hashtag { .. }
			| Node::EmojiCode { .. }
			| Node::UnicodeEmoji { .. }
			| Node::BlockCode { .. }
			| Node::InlineCode { .. }
			| Node::MathBlock { .. }
			| Node::MathInline { .. }
			| Node::Url { .. }
			| Node::Mention { .. }
			| Node::Search { .. } => {
				let component = self.components.get(node.kind())?;
				self.manager.render(tree, component, node.props(), existing)
			}
		}
	}

	/// Text becomes a carrier `<span>` holding text runs separated by `<br>`s.
	fn diff_text(&mut self, tree: &mut T, text: &str, existing: Option<&T::Node>) -> T::Node {
		#[cfg(feature = "dangerous-logging")]
		let span = trace_span!("Diffing text", text);
		#[cfg(not(feature = "dangerous-logging"))]
		let span = trace_span!("Diffing text", len = text.len());
		let _enter = span.enter();

		let shell = ElementDescriptor::new("span").class(self.class_name("text"));
		let carrier = match existing {
			Some(existing) if structural_equal(tree, existing, &shell) => {
				self.manager.evict(existing);
				existing.clone()
			}
			_ => tree.create_element(&shell),
		};

		let lines = split_lines(text);
		for (i, line) in lines.iter().enumerate() {
			let current = tree.child_at(&carrier, i);
			let reusable = match (line, &current) {
				(Line::Break, Some(current)) => tree.is_element(current, "br"),
				(Line::Run(run), Some(current)) => match tree.text(current) {
					Some(data) => {
						if data != *run {
							tree.set_text(current, run);
						}
						true
					}
					None => false,
				},
				(_, None) => false,
			};
			if reusable {
				continue;
			}

			let fresh = match line {
				Line::Break => tree.create_element(&ElementDescriptor::new("br")),
				Line::Run(run) => tree.create_text(run),
			};
			match current {
				Some(current) => {
					tree.replace_child(&carrier, &fresh, &current);
					self.manager.evict_subtree(tree, &current);
				}
				None => tree.append_child(&carrier, &fresh),
			}
		}
		while let Some(extra) = tree.child_at(&carrier, lines.len()) {
			tree.remove_child(&carrier, &extra);
			self.manager.evict_subtree(tree, &extra);
		}

		carrier
	}

	/// Kinds that wrap their children in one fixed tag with a marker class.
	fn diff_fixed_tag(&mut self, tree: &mut T, tag: &str, kind: Kind, children: &[Node], existing: Option<&T::Node>, depth_limit: usize) -> Result<T::Node, RenderError> {
		let class = self.class_name(kind.as_str());
		let element = match existing {
			Some(existing) if tree.is_element(existing, tag) => {
				self.manager.evict(existing);
				existing.clone()
			}
			_ => tree.create_element(&ElementDescriptor::new(tag).class(class.as_str())),
		};
		if !tree.has_class(&element, &class) {
			tree.add_class(&element, &class);
		}

		self.diff_splice_node_list(tree, children, Slots::Children(&element), depth_limit)?;
		Ok(element)
	}

	/// Kinds whose component arranges its children itself.
	///
	/// The children are reconciled into a staged buffer that survives on the output node,
	/// so they are revised in place whether or not the wrapper is rebuilt.
	fn diff_composite(&mut self, tree: &mut T, node: &Node, existing: Option<&T::Node>, depth_limit: usize) -> Result<T::Node, RenderError> {
		let component = self.components.get(node.kind())?.clone();

		let mut staged = existing
			.and_then(|existing| self.manager.outer_state::<StagedChildren<T::Node>>(existing))
			.map(|staged| staged.0.clone())
			.unwrap_or_default();
		self.diff_splice_node_list(tree, node.children(), Slots::Staged(&mut staged), depth_limit)?;

		let props = node.props().with("children", PropValue::Nodes(staged.clone()));
		let rendered = self.manager.render(tree, &component, props, existing)?;
		if !self.manager.set_outer_state(&rendered, StagedChildren(staged)) {
			error!("Lost the render context of freshly rendered {:?}. Its children will be rebuilt next time.", rendered);
		}
		Ok(rendered)
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Line<'a> {
	Run(&'a str),
	Break,
}

/// Splits at `\r\n`, `\r` and `\n`, keeping each separator as a [`Line::Break`]. Empty runs are dropped.
fn split_lines(text: &str) -> Vec<Line<'_>> {
	let mut lines = Vec::new();
	let mut rest = text;
	while let Some(at) = rest.find(|c| c == '\r' || c == '\n') {
		if at > 0 {
			lines.push(Line::Run(&rest[..at]));
		}
		lines.push(Line::Break);
		let separator = if rest[at..].starts_with("\r\n") { 2 } else { 1 };
		rest = &rest[at + separator..];
	}
	if !rest.is_empty() {
		lines.push(Line::Run(rest));
	}
	lines
}
