use mfm_dom::{
	arena::ArenaTree,
	ast::{FnArg, FnArgs, Node},
	components::{self, ComponentsOptions},
	tree::{ElementDescriptor, OutputTree},
	Renderer,
};

mod arena_logging_;

#[test]
fn text() {
	test_create_diff_identical_remove(vec![Node::text("Hello mfm-dom text!")], r#"<span class="mfm-text">Hello mfm-dom text!</span>"#);
}

#[test]
fn multiline_text() {
	test_create_diff_identical_remove(vec![Node::text("line1\nline2")], r#"<span class="mfm-text">line1<br>line2</span>"#);
}

#[test]
fn bold() {
	test_create_diff_identical_remove(
		vec![Node::bold(vec![Node::text("hi")])],
		r#"<b class="mfm-bold"><span class="mfm-text">hi</span></b>"#,
	);
}

#[test]
fn nested_fixed_tags() {
	test_create_diff_identical_remove(
		vec![Node::italic(vec![Node::strike(vec![Node::text("gone")])])],
		r#"<i class="mfm-italic"><s class="mfm-strike"><span class="mfm-text">gone</span></s></i>"#,
	);
}

#[test]
fn hashtag() {
	test_create_diff_identical_remove(vec![Node::hashtag("mfm")], "<a>mfm</a>");
}

#[test]
fn custom_emoji() {
	test_create_diff_identical_remove(vec![Node::custom_emoji("blobcat")], r#"<span alt="blobcat">:blobcat:</span>"#);
}

#[test]
fn inline_code() {
	test_create_diff_identical_remove(vec![Node::inline_code("a < b")], r#"<pre style="display:inline;"><code>a &lt; b</code></pre>"#);
}

#[test]
fn block_code() {
	test_create_diff_identical_remove(vec![Node::block_code("fn main() {}", Some("rust"))], "<pre><code>fn main() {}</code></pre>");
}

#[test]
fn mention() {
	test_create_diff_identical_remove(
		vec![Node::mention("alice", Some("example.com"))],
		r#"<a href="https://misskey.io/@alice@example.com">@alice@example.com</a>"#,
	);
}

#[test]
fn search() {
	test_create_diff_identical_remove(
		vec![Node::search("rust lang", "rust lang Search")],
		r#"<div><a href="https://duckduckgo.com/?q=rust+lang">rust lang Search</a></div>"#,
	);
}

#[test]
fn link() {
	test_create_diff_identical_remove(
		vec![Node::link("https://example.com/", vec![Node::text("here")])],
		r#"<a href="https://example.com/"><span class="mfm-text">here</span></a>"#,
	);
}

#[test]
fn quote() {
	test_create_diff_identical_remove(
		vec![Node::quote(vec![Node::text("quoted")])],
		r#"<div><q><span class="mfm-text">quoted</span></q></div>"#,
	);
}

#[test]
fn small_in_center() {
	test_create_diff_identical_remove(
		vec![Node::center(vec![Node::small(vec![Node::text("fine print")])])],
		concat!(
			r#"<div style="display:flex;flex-direction:column;align-items:center;">"#,
			r#"<span style="font-size:0.8em;opacity:0.8;"><span class="mfm-text">fine print</span></span>"#,
			"</div>",
		),
	);
}

#[test]
fn function() {
	let mut args = FnArgs::new();
	args.insert("deg".to_owned(), FnArg::Value("45".to_owned()));
	test_create_diff_identical_remove(
		vec![Node::function("rotate", args, vec![Node::hashtag("tilted")])],
		r#"<span style="display:inline-block;transform:rotate(45deg);transform-origin:center center;"><a>tilted</a></span>"#,
	);
}

#[test]
fn multi() {
	test_create_diff_identical_remove(
		vec![Node::text("Hello "), Node::bold(vec![Node::text("mfm-dom")]), Node::unicode_emoji("👋")],
		r#"<span class="mfm-text">Hello </span><b class="mfm-bold"><span class="mfm-text">mfm-dom</span></b><span>👋</span>"#,
	);
}

fn test_create_diff_identical_remove(nodes: Vec<Node>, html: &str) {
	arena_logging_::init();

	let mut tree = ArenaTree::new();
	let root = tree.create_element(&ElementDescriptor::new("div"));
	let mut renderer = Renderer::new(components::defaults(ComponentsOptions::default()));

	renderer.render(&mut tree, &nodes, &root).unwrap();
	assert_eq!(tree.inner_html(root), html);

	tree.clear_mutations();
	renderer.render(&mut tree, &nodes, &root).unwrap();
	assert!(tree.mutations().is_empty(), "identical re-render mutated the tree: {:?}", tree.mutations());
	assert_eq!(tree.inner_html(root), html);

	renderer.render(&mut tree, &[], &root).unwrap();
	assert_eq!(tree.inner_html(root), "");
	assert!(renderer.manager().is_empty(), "{} render context(s) leaked", renderer.manager().len());
}
