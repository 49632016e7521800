#![cfg(target_arch = "wasm32")]

use mfm_dom::{
	ast::{FnArgs, Node},
	equal::structural_equal,
	functions::Functions,
	components::{self, ComponentsOptions},
	tree::{ElementDescriptor, OutputTree},
	web::WebTree,
	Renderer,
};
use std::sync::Once;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::{Element, HtmlBodyElement};

wasm_bindgen_test_configure!(run_in_browser);

static LOG_INIT: Once = Once::new();

#[wasm_bindgen_test]
fn text() {
	test_create_diff_identical_remove(vec![Node::text("Hello mfm-dom!\nSecond line.")], r#"<span class="mfm-text">Hello mfm-dom!<br>Second line.</span>"#);
}

#[wasm_bindgen_test]
fn bold() {
	test_create_diff_identical_remove(vec![Node::bold(vec![Node::text("hi")])], r#"<b class="mfm-bold"><span class="mfm-text">hi</span></b>"#);
}

#[wasm_bindgen_test]
fn small() {
	test_create_diff_identical_remove(
		vec![Node::small(vec![Node::hashtag("tag")])],
		r#"<span style="font-size: 0.8em; opacity: 0.8;"><a>tag</a></span>"#,
	);
}

#[wasm_bindgen_test]
fn quote() {
	test_create_diff_identical_remove(vec![Node::quote(vec![Node::text("q")])], r#"<div><q><span class="mfm-text">q</span></q></div>"#);
}

#[wasm_bindgen_test]
fn keys_are_unique_across_trees() {
	LOG_INIT.call_once(tracing_wasm::set_as_global_default);

	let mut first = WebTree::for_window();
	let mut second = WebTree::for_window();
	let a = first.create_text("a");
	let b = second.create_text("b");
	assert_ne!(a.key(), b.key());
	assert_ne!(a, b);

	assert_eq!(second.wrap(a.node().clone()), a);
}

#[wasm_bindgen_test]
fn shorthand_style_is_compared_as_declared() {
	LOG_INIT.call_once(tracing_wasm::set_as_global_default);

	let mut tree = WebTree::for_window();
	let tada = Functions::default().descriptor("tada", &FnArgs::new()).unwrap();
	let span = tree.create_element(&tada);
	assert!(structural_equal(&tree, &span, &tada));
	assert_eq!(tree.style_value(&span, "animation"), tada.style_value("animation").unwrap());

	let jelly = Functions::default().descriptor("jelly", &FnArgs::new()).unwrap();
	assert!(!structural_equal(&tree, &span, &jelly));
}

#[wasm_bindgen_test]
fn animated_wrapper_is_reused() {
	LOG_INIT.call_once(tracing_wasm::set_as_global_default);

	let mut tree = WebTree::for_window();
	let root = tree.create_element(&ElementDescriptor::new("div"));
	let mut renderer = Renderer::new(components::defaults(ComponentsOptions::default()));
	let note = |children| vec![Node::function("tada", FnArgs::new(), children)];

	renderer.render(&mut tree, &note(vec![Node::text("a")]), &root).unwrap();
	let wrapper = tree.child_at(&root, 0).unwrap();

	renderer.render(&mut tree, &note(vec![Node::text("a"), Node::hashtag("b")]), &root).unwrap();
	assert_eq!(tree.child_at(&root, 0), Some(wrapper.clone()));
	assert_eq!(tree.children(&wrapper).len(), 2);
}

fn test_create_diff_identical_remove(nodes: Vec<Node>, html: &str) {
	LOG_INIT.call_once(tracing_wasm::set_as_global_default);

	let mut tree = WebTree::for_window();
	let body = tree.document().body().unwrap().dyn_into::<HtmlBodyElement>().unwrap();
	let root = tree.create_element(&ElementDescriptor::new("div"));
	let body = tree.wrap(body.into());
	tree.append_child(&body, &root);
	let root_element = root.node().dyn_ref::<Element>().unwrap().clone();

	let mut renderer = Renderer::new(components::defaults(ComponentsOptions::default()));

	renderer.render(&mut tree, &nodes, &root).unwrap();
	assert_eq!(root_element.inner_html(), html);

	let children: Vec<_> = tree.children(&root);
	renderer.render(&mut tree, &nodes, &root).unwrap();
	assert_eq!(tree.children(&root), children);
	assert_eq!(root_element.inner_html(), html);

	renderer.render(&mut tree, &[], &root).unwrap();
	assert_eq!(root_element.inner_html(), "");
	assert!(renderer.manager().is_empty());

	tree.remove_child(&body, &root);
}
