use mfm_dom::{
	arena::ArenaTree,
	ast::{FnArg, Kind, Node},
	components::{self, ComponentsOptions},
	tree::{ElementDescriptor, OutputTree},
	Renderer,
};

mod arena_logging_;

const NOTE: &str = r#"[
	{ "type": "text", "props": { "text": "Hi " } },
	{ "type": "mention", "props": { "username": "bob", "host": null, "acct": "@bob" } },
	{ "type": "emojiCode", "props": { "name": "wave" } },
	{ "type": "url", "props": { "url": "https://example.com/", "brackets": true } },
	{
		"type": "fn",
		"props": { "name": "spin", "args": { "x": true, "speed": "2s" } },
		"children": [{ "type": "unicodeEmoji", "props": { "emoji": "🌀" } }]
	},
	{ "type": "mathInline", "props": { "formula": "x^2" } }
]"#;

#[test]
fn parses_mfm_js_output() {
	let nodes: Vec<Node> = serde_json::from_str(NOTE).unwrap();
	let kinds: Vec<Kind> = nodes.iter().map(Node::kind).collect();
	assert_eq!(kinds, [Kind::Text, Kind::Mention, Kind::CustomEmoji, Kind::Url, Kind::Fn, Kind::MathInline]);
	assert_eq!(nodes[1], Node::mention("bob", None));

	match &nodes[4] {
		Node::Fn { props, children } => {
			assert_eq!(props.args.get("x"), Some(&FnArg::Flag(true)));
			assert_eq!(props.args.get("speed").and_then(FnArg::as_value), Some("2s"));
			assert_eq!(children.len(), 1);
		}
		other => panic!("expected an fn node, got {:?}", other),
	}
}

#[test]
fn children_default_to_empty() {
	let node: Node = serde_json::from_str(r#"{ "type": "bold" }"#).unwrap();
	assert_eq!(node, Node::bold(vec![]));
}

#[test]
fn serializes_with_mfm_js_tags() {
	let json = serde_json::to_value(&Node::custom_emoji("wave")).unwrap();
	assert_eq!(json, serde_json::json!({ "type": "emojiCode", "props": { "name": "wave" } }));
}

#[test]
fn renders_parsed_notes() {
	arena_logging_::init();
	let nodes: Vec<Node> = serde_json::from_str(NOTE).unwrap();

	let mut tree = ArenaTree::new();
	let root = tree.create_element(&ElementDescriptor::new("div"));
	let mut renderer = Renderer::new(components::defaults(ComponentsOptions::default()));
	renderer.render(&mut tree, &nodes, &root).unwrap();

	assert_eq!(
		tree.inner_html(root),
		concat!(
			r#"<span class="mfm-text">Hi </span>"#,
			r#"<a href="https://misskey.io/@bob">@bob</a>"#,
			r#"<span alt="wave">:wave:</span>"#,
			r#"<a href="https://example.com/">https://example.com/</a>"#,
			r#"<span style="display:inline-block;animation:mfm-spinX 2s linear 0s infinite normal;"><span>🌀</span></span>"#,
			r#"<pre style="display:inline;"><code>x^2</code></pre>"#,
		),
	);
}
