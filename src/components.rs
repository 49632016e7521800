//! Stock components for every kind the renderer delegates.
//!
//! They produce plain HTML-ish structures (`<a>`, `<pre><code>`, styled `<span>`s …) and leave all
//! further presentation to the host's stylesheet.

use crate::{
	ast::Kind,
	component::{Component, ComponentRef, Components, Instance},
	equal::structural_equal,
	error::RenderError,
	functions::Functions,
	props::Props,
	tree::{sync_children, ElementDescriptor, OutputTree},
};
use std::rc::Rc;
use url::Url;

/// Settings shared by the stock components.
#[derive(Debug, Clone)]
pub struct ComponentsOptions {
	/// Base for mention links. Defaults to `https://misskey.io/`.
	pub instance: Url,
	/// Search engine for search blocks. The query is set as its `q` parameter. Defaults to `https://duckduckgo.com/`.
	pub search_url: Url,
	pub functions: Functions,
}

impl Default for ComponentsOptions {
	fn default() -> Self {
		Self {
			instance: Url::parse("https://misskey.io/").expect("valid URL literal"),
			search_url: Url::parse("https://duckduckgo.com/").expect("valid URL literal"),
			functions: Functions::default(),
		}
	}
}

impl ComponentsOptions {
	#[must_use]
	pub fn with_instance(mut self, instance: Url) -> Self {
		self.instance = instance;
		self
	}

	#[must_use]
	pub fn with_search_url(mut self, search_url: Url) -> Self {
		self.search_url = search_url;
		self
	}

	#[must_use]
	pub fn with_functions(mut self, functions: Functions) -> Self {
		self.functions = functions;
		self
	}
}

type Build<T> = fn(&mut T, &Props<<T as OutputTree>::Node>, Option<&<T as OutputTree>::Node>, &ComponentsOptions) -> Result<<T as OutputTree>::Node, RenderError>;

/// A stateless stock component. It is its own instance.
struct Builtin<T: OutputTree> {
	build: Build<T>,
	options: Rc<ComponentsOptions>,
}

impl<T: OutputTree> Clone for Builtin<T> {
	fn clone(&self) -> Self {
		Self {
			build: self.build,
			options: Rc::clone(&self.options),
		}
	}
}

impl<T: OutputTree> Instance<T> for Builtin<T> {
	fn render(&mut self, tree: &mut T, props: &Props<T::Node>, previous: Option<&T::Node>) -> Result<T::Node, RenderError> {
		(self.build)(tree, props, previous, &self.options)
	}
}

impl<T: OutputTree> Component<T> for Builtin<T> {
	fn instantiate(&self) -> Box<dyn Instance<T>> {
		Box::new(self.clone())
	}
}

/// A registry with a stock component for each delegated kind.
#[must_use]
pub fn defaults<T: OutputTree>(options: ComponentsOptions) -> Components<T> {
	let options = Rc::new(options);
	let builtin = |build: Build<T>| -> ComponentRef<T> {
		Rc::new(Builtin {
			build,
			options: Rc::clone(&options),
		})
	};

	Components::new()
		.with(Kind::Hashtag, builtin(hashtag))
		.with(Kind::CustomEmoji, builtin(custom_emoji))
		.with(Kind::UnicodeEmoji, builtin(unicode_emoji))
		.with(Kind::BlockCode, builtin(block_code))
		.with(Kind::InlineCode, builtin(inline_code))
		.with(Kind::MathBlock, builtin(math_block))
		.with(Kind::MathInline, builtin(math_inline))
		.with(Kind::Url, builtin(url))
		.with(Kind::Link, builtin(link))
		.with(Kind::Mention, builtin(mention))
		.with(Kind::Plain, builtin(plain))
		.with(Kind::Small, builtin(small))
		.with(Kind::Center, builtin(center))
		.with(Kind::Quote, builtin(quote))
		.with(Kind::Search, builtin(search))
		.with(Kind::Fn, builtin(function))
}

fn with_text<T: OutputTree>(tree: &mut T, descriptor: &ElementDescriptor, text: &str) -> T::Node {
	let element = tree.create_element(descriptor);
	let text = tree.create_text(text);
	tree.append_child(&element, &text);
	element
}

fn code_block<T: OutputTree>(tree: &mut T, inline: bool, code: &str) -> T::Node {
	let mut pre = ElementDescriptor::new("pre");
	if inline {
		pre = pre.style("display", "inline");
	}
	let pre = tree.create_element(&pre);
	let code = with_text(tree, &ElementDescriptor::new("code"), code);
	tree.append_child(&pre, &code);
	pre
}

/// Reuses `previous` if it is still the right shell, then moves `children` into it.
fn wrap<T: OutputTree>(tree: &mut T, descriptor: &ElementDescriptor, previous: Option<&T::Node>, children: &[T::Node]) -> T::Node {
	let element = match previous {
		Some(previous) if structural_equal(tree, previous, descriptor) => {
			for (name, value) in &descriptor.attributes {
				tree.set_attribute(previous, name, value);
			}
			previous.clone()
		}
		_ => tree.create_element(descriptor),
	};
	sync_children(tree, &element, children);
	element
}

fn hashtag<T: OutputTree>(tree: &mut T, props: &Props<T::Node>, _: Option<&T::Node>, _: &ComponentsOptions) -> Result<T::Node, RenderError> {
	Ok(with_text(tree, &ElementDescriptor::new("a"), props.str("hashtag")?))
}

fn custom_emoji<T: OutputTree>(tree: &mut T, props: &Props<T::Node>, _: Option<&T::Node>, _: &ComponentsOptions) -> Result<T::Node, RenderError> {
	let name = props.str("name")?;
	Ok(with_text(tree, &ElementDescriptor::new("span").attribute("alt", name), &format!(":{}:", name)))
}

fn unicode_emoji<T: OutputTree>(tree: &mut T, props: &Props<T::Node>, _: Option<&T::Node>, _: &ComponentsOptions) -> Result<T::Node, RenderError> {
	Ok(with_text(tree, &ElementDescriptor::new("span"), props.str("emoji")?))
}

fn block_code<T: OutputTree>(tree: &mut T, props: &Props<T::Node>, _: Option<&T::Node>, _: &ComponentsOptions) -> Result<T::Node, RenderError> {
	Ok(code_block(tree, false, props.str("code")?))
}

fn inline_code<T: OutputTree>(tree: &mut T, props: &Props<T::Node>, _: Option<&T::Node>, _: &ComponentsOptions) -> Result<T::Node, RenderError> {
	Ok(code_block(tree, true, props.str("code")?))
}

fn math_block<T: OutputTree>(tree: &mut T, props: &Props<T::Node>, _: Option<&T::Node>, _: &ComponentsOptions) -> Result<T::Node, RenderError> {
	Ok(code_block(tree, false, props.str("formula")?))
}

fn math_inline<T: OutputTree>(tree: &mut T, props: &Props<T::Node>, _: Option<&T::Node>, _: &ComponentsOptions) -> Result<T::Node, RenderError> {
	Ok(code_block(tree, true, props.str("formula")?))
}

fn url<T: OutputTree>(tree: &mut T, props: &Props<T::Node>, _: Option<&T::Node>, _: &ComponentsOptions) -> Result<T::Node, RenderError> {
	let url = props.str("url")?;
	Ok(with_text(tree, &ElementDescriptor::new("a").attribute("href", url), url))
}

fn link<T: OutputTree>(tree: &mut T, props: &Props<T::Node>, previous: Option<&T::Node>, _: &ComponentsOptions) -> Result<T::Node, RenderError> {
	let descriptor = ElementDescriptor::new("a").attribute("href", props.str("url")?);
	Ok(wrap(tree, &descriptor, previous, props.nodes("children")?))
}

fn mention<T: OutputTree>(tree: &mut T, props: &Props<T::Node>, _: Option<&T::Node>, options: &ComponentsOptions) -> Result<T::Node, RenderError> {
	let acct = props.str("acct")?;
	let href = options.instance.join(&format!("./{}", acct)).map_err(|_| RenderError::malformed("acct", "a valid account path"))?;
	Ok(with_text(tree, &ElementDescriptor::new("a").attribute("href", href.as_str()), acct))
}

fn plain<T: OutputTree>(tree: &mut T, props: &Props<T::Node>, previous: Option<&T::Node>, _: &ComponentsOptions) -> Result<T::Node, RenderError> {
	Ok(wrap(tree, &ElementDescriptor::new("span"), previous, props.nodes("children")?))
}

fn small<T: OutputTree>(tree: &mut T, props: &Props<T::Node>, previous: Option<&T::Node>, _: &ComponentsOptions) -> Result<T::Node, RenderError> {
	let descriptor = ElementDescriptor::new("span").style("font-size", "0.8em").style("opacity", "0.8");
	Ok(wrap(tree, &descriptor, previous, props.nodes("children")?))
}

fn center<T: OutputTree>(tree: &mut T, props: &Props<T::Node>, previous: Option<&T::Node>, _: &ComponentsOptions) -> Result<T::Node, RenderError> {
	let descriptor = ElementDescriptor::new("div")
		.style("display", "flex")
		.style("flex-direction", "column")
		.style("align-items", "center");
	Ok(wrap(tree, &descriptor, previous, props.nodes("children")?))
}

fn quote<T: OutputTree>(tree: &mut T, props: &Props<T::Node>, previous: Option<&T::Node>, _: &ComponentsOptions) -> Result<T::Node, RenderError> {
	let children = props.nodes("children")?;
	let outer = ElementDescriptor::new("div");
	let inner = ElementDescriptor::new("q");

	let reusable = previous.filter(|previous| structural_equal(tree, *previous, &outer)).and_then(|previous| {
		let q = tree.child_at(previous, 0)?;
		(tree.children(previous).len() == 1 && structural_equal(tree, &q, &inner)).then(|| (previous.clone(), q))
	});
	let (div, q) = match reusable {
		Some(pair) => pair,
		None => {
			let div = tree.create_element(&outer);
			let q = tree.create_element(&inner);
			tree.append_child(&div, &q);
			(div, q)
		}
	};
	sync_children(tree, &q, children);
	Ok(div)
}

fn search<T: OutputTree>(tree: &mut T, props: &Props<T::Node>, _: Option<&T::Node>, options: &ComponentsOptions) -> Result<T::Node, RenderError> {
	let query = props.str("query")?;
	let content = props.str("content")?;

	let mut href = options.search_url.clone();
	let kept: Vec<(String, String)> = href.query_pairs().filter(|(name, _)| name != "q").map(|(name, value)| (name.into_owned(), value.into_owned())).collect();
	href.query_pairs_mut().clear().extend_pairs(kept).append_pair("q", query);

	let div = tree.create_element(&ElementDescriptor::new("div"));
	let a = with_text(tree, &ElementDescriptor::new("a").attribute("href", href.as_str()), content);
	tree.append_child(&div, &a);
	Ok(div)
}

fn function<T: OutputTree>(tree: &mut T, props: &Props<T::Node>, previous: Option<&T::Node>, options: &ComponentsOptions) -> Result<T::Node, RenderError> {
	let descriptor = options.functions.descriptor(props.str("name")?, props.args("args")?)?;
	Ok(wrap(tree, &descriptor, previous, props.nodes("children")?))
}
