use mfm_dom::{
	arena::{ArenaTree, Mutation, NodeId},
	ast::{FnArg, FnArgs, Kind, Node},
	component::{self, Components},
	components::{self, ComponentsOptions},
	props::Props,
	tree::{ElementDescriptor, OutputTree},
	RenderError, Renderer, RendererOptions,
};

mod arena_logging_;

fn setup() -> (ArenaTree, NodeId, Renderer<ArenaTree>) {
	arena_logging_::init();
	let mut tree = ArenaTree::new();
	let root = tree.create_element(&ElementDescriptor::new("div"));
	let renderer = Renderer::new(components::defaults(ComponentsOptions::default()));
	(tree, root, renderer)
}

fn texts(texts: &[&str]) -> Vec<Node> {
	texts.iter().map(|&text| Node::text(text)).collect()
}

#[test]
fn shrinking_removes_only_the_surplus() {
	let (mut tree, root, mut renderer) = setup();
	renderer.render(&mut tree, &texts(&["a", "b", "c"]), &root).unwrap();
	let first = tree.child_at(&root, 0).unwrap();

	tree.clear_mutations();
	renderer.render(&mut tree, &texts(&["a"]), &root).unwrap();
	let structural = tree.structural_mutations_of(root);
	assert_eq!(structural.len(), 2);
	assert!(structural.iter().all(|m| matches!(m, Mutation::Remove { .. })));
	assert_eq!(tree.children(&root), [first]);
}

#[test]
fn growing_appends_only_the_delta() {
	let (mut tree, root, mut renderer) = setup();
	renderer.render(&mut tree, &texts(&["a"]), &root).unwrap();

	tree.clear_mutations();
	renderer.render(&mut tree, &texts(&["a", "b", "c", "d"]), &root).unwrap();
	let structural = tree.structural_mutations_of(root);
	assert_eq!(structural.len(), 3);
	assert!(structural.iter().all(|m| matches!(m, Mutation::Insert { .. })));
	assert_eq!(tree.inner_html(root), r#"<span class="mfm-text">a</span><span class="mfm-text">b</span><span class="mfm-text">c</span><span class="mfm-text">d</span>"#);
}

#[test]
fn changed_text_is_revised_in_place() {
	let (mut tree, root, mut renderer) = setup();
	renderer.render(&mut tree, &texts(&["before"]), &root).unwrap();
	let carrier = tree.child_at(&root, 0).unwrap();

	tree.clear_mutations();
	renderer.render(&mut tree, &texts(&["after"]), &root).unwrap();
	assert_eq!(tree.child_at(&root, 0), Some(carrier));
	assert_eq!(tree.mutations().len(), 1);
	assert!(matches!(tree.mutations()[0], Mutation::SetText { .. }));
	assert_eq!(tree.inner_html(root), r#"<span class="mfm-text">after</span>"#);
}

#[test]
fn line_breaks_are_reconciled_too() {
	let (mut tree, root, mut renderer) = setup();
	renderer.render(&mut tree, &texts(&["one\r\ntwo\rthree"]), &root).unwrap();
	assert_eq!(tree.inner_html(root), r#"<span class="mfm-text">one<br>two<br>three</span>"#);

	renderer.render(&mut tree, &texts(&["one\n\ntwo"]), &root).unwrap();
	assert_eq!(tree.inner_html(root), r#"<span class="mfm-text">one<br><br>two</span>"#);

	renderer.render(&mut tree, &texts(&["\n"]), &root).unwrap();
	assert_eq!(tree.inner_html(root), r#"<span class="mfm-text"><br></span>"#);
}

#[test]
fn fixed_tags_keep_their_element() {
	let (mut tree, root, mut renderer) = setup();
	renderer.render(&mut tree, &[Node::bold(texts(&["x"]))], &root).unwrap();
	let b = tree.child_at(&root, 0).unwrap();

	renderer.render(&mut tree, &[Node::bold(texts(&["y", "z"]))], &root).unwrap();
	assert_eq!(tree.child_at(&root, 0), Some(b));
	assert_eq!(tree.children(&b).len(), 2);
}

#[test]
fn kind_changes_replace_in_place() {
	let (mut tree, root, mut renderer) = setup();
	renderer.render(&mut tree, &[Node::text("a"), Node::text("b")], &root).unwrap();
	let second = tree.child_at(&root, 1).unwrap();

	tree.clear_mutations();
	renderer.render(&mut tree, &[Node::bold(texts(&["a"])), Node::text("b")], &root).unwrap();
	assert_eq!(tree.structural_mutations_of(root).len(), 1);
	assert!(matches!(tree.structural_mutations_of(root)[0], Mutation::Replace { .. }));
	assert_eq!(tree.child_at(&root, 1), Some(second));

	tree.clear_mutations();
	renderer.render(&mut tree, &[Node::hashtag("a"), Node::text("b")], &root).unwrap();
	let structural = tree.structural_mutations_of(root);
	assert_eq!(structural.len(), 1, "{:?}", structural);
	assert_eq!(tree.inner_html(root), r#"<a>a</a><span class="mfm-text">b</span>"#);
}

#[test]
fn text_carrier_class_follows_the_prefix() {
	arena_logging_::init();
	let mut tree = ArenaTree::new();
	let root = tree.create_element(&ElementDescriptor::new("div"));
	let mut renderer = Renderer::with_options(Components::new(), RendererOptions::default().with_class_prefix("note"));
	renderer.render(&mut tree, &[Node::strike(texts(&["x"]))], &root).unwrap();
	assert_eq!(tree.inner_html(root), r#"<s class="note-strike"><span class="note-text">x</span></s>"#);

	let mut renderer = Renderer::with_options(Components::new(), RendererOptions::default().with_class_prefix(""));
	let bare = tree.create_element(&ElementDescriptor::new("div"));
	renderer.render(&mut tree, &texts(&["x"]), &bare).unwrap();
	assert_eq!(tree.inner_html(bare), r#"<span class="text">x</span>"#);
}

#[test]
fn composite_children_are_revised_without_rebuilding_the_wrapper() {
	let (mut tree, root, mut renderer) = setup();
	renderer.render(&mut tree, &[Node::link("https://example.com/", texts(&["a"]))], &root).unwrap();
	let a = tree.child_at(&root, 0).unwrap();
	let carrier = tree.child_at(&a, 0).unwrap();
	assert_eq!(renderer.staged_children(&a), Some(&[carrier][..]));

	tree.clear_mutations();
	renderer.render(&mut tree, &[Node::link("https://example.com/", texts(&["b"]))], &root).unwrap();
	assert_eq!(tree.child_at(&root, 0), Some(a));
	assert_eq!(tree.mutations().len(), 1);
	assert!(matches!(tree.mutations()[0], Mutation::SetText { .. }));

	tree.clear_mutations();
	renderer.render(&mut tree, &[Node::link("https://example.org/", texts(&["b"]))], &root).unwrap();
	assert_eq!(tree.child_at(&root, 0), Some(a));
	assert_eq!(tree.mutations(), [Mutation::SetAttribute { node: a }]);

	tree.clear_mutations();
	renderer.render(&mut tree, &[Node::link("https://example.org/", vec![Node::text("b"), Node::bold(texts(&["c"]))])], &root).unwrap();
	assert_eq!(tree.child_at(&root, 0), Some(a));
	assert_eq!(tree.children(&a).len(), 2);
	assert!(tree.structural_mutations_of(root).is_empty());
	assert_eq!(tree.inner_html(root), r#"<a href="https://example.org/"><span class="mfm-text">b</span><b class="mfm-bold"><span class="mfm-text">c</span></b></a>"#);
}

#[test]
fn composite_kind_change_keeps_the_children() {
	let (mut tree, root, mut renderer) = setup();
	renderer.render(&mut tree, &[Node::plain(texts(&["x"]))], &root).unwrap();
	let plain = tree.child_at(&root, 0).unwrap();
	let carrier = tree.child_at(&plain, 0).unwrap();

	renderer.render(&mut tree, &[Node::small(texts(&["x"]))], &root).unwrap();
	let small = tree.child_at(&root, 0).unwrap();
	assert_ne!(small, plain);
	assert_eq!(tree.parent(&carrier), Some(small));
	assert_eq!(renderer.staged_children(&small), Some(&[carrier][..]));
	assert!(!renderer.manager().contains(&plain));
}

#[test]
fn nested_composites() {
	let (mut tree, root, mut renderer) = setup();
	let mut args = FnArgs::new();
	args.insert("h".to_owned(), FnArg::Flag(true));
	let nodes = vec![Node::quote(vec![Node::function("flip", args, vec![Node::center(texts(&["deep"]))])])];

	renderer.render(&mut tree, &nodes, &root).unwrap();
	assert_eq!(
		tree.inner_html(root),
		concat!(
			r#"<div><q><span style="display:inline-block;transform:scaleX(-1);">"#,
			r#"<div style="display:flex;flex-direction:column;align-items:center;"><span class="mfm-text">deep</span></div>"#,
			"</span></q></div>",
		),
	);

	tree.clear_mutations();
	renderer.render(&mut tree, &nodes, &root).unwrap();
	assert!(tree.mutations().is_empty(), "{:?}", tree.mutations());
}

#[test]
fn render_into_fills_a_buffer() {
	let (mut tree, _root, mut renderer) = setup();
	let mut buffer = Vec::new();
	renderer.render_into(&mut tree, &[Node::text("a"), Node::hashtag("b")], &mut buffer).unwrap();
	assert_eq!(buffer.len(), 2);
	assert!(buffer.iter().all(|node| tree.parent(node).is_none()));

	let kept = buffer.clone();
	renderer.render_into(&mut tree, &[Node::text("a"), Node::hashtag("b")], &mut buffer).unwrap();
	assert_eq!(buffer, kept);

	renderer.render_into(&mut tree, &[Node::text("a")], &mut buffer).unwrap();
	assert_eq!(buffer, kept[..1]);
}

#[test]
fn render_node_reuses_what_it_can() {
	let (mut tree, _root, mut renderer) = setup();
	let b = renderer.render_node(&mut tree, &Node::bold(texts(&["x"])), None).unwrap();
	assert_eq!(renderer.render_node(&mut tree, &Node::bold(texts(&["y"])), Some(&b)), Ok(b));
	assert_eq!(tree.outer_html(b), r#"<b class="mfm-bold"><span class="mfm-text">y</span></b>"#);

	let a = renderer.render_node(&mut tree, &Node::hashtag("x"), Some(&b)).unwrap();
	assert_ne!(a, b);
	assert_eq!(tree.parent(&a), None);
}

/// Wraps the hashtag in a new `<em>` and moves any previous output into it.
fn adopting_hashtag() -> component::ComponentRef<ArenaTree> {
	component::from_fn(|| {
		component::instance(|tree: &mut ArenaTree, props: &Props<NodeId>, previous: Option<&NodeId>| {
			let em = tree.create_element(&ElementDescriptor::new("em"));
			let text = tree.create_text(props.str("hashtag")?);
			tree.append_child(&em, &text);
			if let Some(previous) = previous {
				tree.append_child(&em, previous);
			}
			Ok(em)
		})
	})
}

#[test]
fn replacement_takes_the_slot_of_a_node_moved_away() {
	let (mut tree, root, mut renderer) = setup();
	renderer.components_mut().register(Kind::Hashtag, adopting_hashtag());

	renderer.render(&mut tree, &[Node::hashtag("x"), Node::text("b")], &root).unwrap();
	assert_eq!(tree.inner_html(root), r#"<em>x</em><span class="mfm-text">b</span>"#);
	let adopted = tree.child_at(&root, 0).unwrap();
	let carrier = tree.child_at(&root, 1).unwrap();

	let nodes = [Node::hashtag("y"), Node::text("c")];
	renderer.render(&mut tree, &nodes, &root).unwrap();
	let html = r#"<em>y<em>x</em></em><span class="mfm-text">c</span>"#;
	assert_eq!(tree.inner_html(root), html);
	let wrapper = tree.child_at(&root, 0).unwrap();
	assert_eq!(tree.parent(&adopted), Some(wrapper));
	assert_eq!(tree.child_at(&root, 1), Some(carrier));

	tree.clear_mutations();
	renderer.render(&mut tree, &nodes, &root).unwrap();
	assert_eq!(tree.inner_html(root), html);
	assert!(tree.mutations().is_empty(), "{:?}", tree.mutations());
}

#[test]
fn missing_component() {
	let (mut tree, root, _) = setup();
	let mut renderer = Renderer::new(Components::new());
	assert_eq!(
		renderer.render(&mut tree, &[Node::text("ok"), Node::hashtag("nope")], &root),
		Err(RenderError::MissingComponent(Kind::Hashtag)),
	);
	// Siblings before the failure are in place.
	assert_eq!(tree.inner_html(root), r#"<span class="mfm-text">ok</span>"#);

	assert_eq!(
		renderer.render(&mut tree, &[Node::quote(vec![])], &root),
		Err(RenderError::MissingComponent(Kind::Quote)),
	);
}

#[test]
fn malformed_props() {
	let (mut tree, root, mut renderer) = setup();
	renderer.components_mut().register(
		Kind::Hashtag,
		component::from_fn(|| {
			component::instance(|tree: &mut ArenaTree, props: &Props<NodeId>, _previous: Option<&NodeId>| {
				let text = tree.create_text(props.str("tag")?);
				Ok(text)
			})
		}),
	);
	let error = renderer.render(&mut tree, &[Node::hashtag("x")], &root).unwrap_err();
	assert!(matches!(&error, RenderError::MalformedProps { key, .. } if key == "tag"), "{}", error);

	let error = renderer.render(&mut tree, &[Node::function("border", FnArgs::new(), vec![])], &root).unwrap_err();
	assert!(matches!(&error, RenderError::MalformedProps { key, .. } if key == "args.radius"), "{}", error);
}

#[test]
fn depth_limit() {
	let (mut tree, root, _) = setup();
	let nodes = [Node::bold(vec![Node::bold(texts(&["deep"]))])];

	let mut renderer = Renderer::with_options(Components::new(), RendererOptions::default().with_depth_limit(2));
	assert_eq!(renderer.render(&mut tree, &nodes, &root), Err(RenderError::DepthLimit(2)));

	let other = tree.create_element(&ElementDescriptor::new("div"));
	let mut renderer = Renderer::with_options(Components::new(), RendererOptions::default().with_depth_limit(3));
	renderer.render(&mut tree, &nodes, &other).unwrap();
	assert_eq!(tree.inner_html(other), r#"<b class="mfm-bold"><b class="mfm-bold"><span class="mfm-text">deep</span></b></b>"#);
}
