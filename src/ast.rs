//! The MFM syntax tree, in the shape `mfm-js` produces.
//!
//! ```
//! use mfm_dom::ast::{Kind, Node};
//!
//! let nodes: Vec<Node> = serde_json::from_str(
//! 	r#"[{ "type": "bold", "children": [{ "type": "text", "props": { "text": "hi" } }] }]"#,
//! )
//! .unwrap();
//! assert_eq!(nodes, vec![Node::bold(vec![Node::text("hi")])]);
//! assert_eq!(nodes[0].kind(), Kind::Bold);
//! ```

use crate::props::{PropValue, Props};
use core::fmt::{self, Display, Formatter};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Parameters of an `$[fn.key=value,flag …]` invocation.
pub type FnArgs = BTreeMap<String, FnArg>;

/// A single `fn` parameter: either `key=value` or a bare `key`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FnArg {
	Value(String),
	/// Presence-only. `mfm-js` always emits `true` here.
	Flag(bool),
}

impl FnArg {
	#[must_use]
	pub fn as_value(&self) -> Option<&str> {
		match self {
			FnArg::Value(value) => Some(value),
			FnArg::Flag(_) => None,
		}
	}
}

/// The closed set of node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Kind {
	Text,
	Bold,
	Italic,
	Strike,
	Hashtag,
	CustomEmoji,
	UnicodeEmoji,
	BlockCode,
	InlineCode,
	MathBlock,
	MathInline,
	Url,
	Link,
	Mention,
	Plain,
	Small,
	Center,
	Quote,
	Search,
	Fn,
}

impl Kind {
	pub const ALL: [Kind; 20] = [
		Kind::Text,
		Kind::Bold,
		Kind::Italic,
		Kind::Strike,
		Kind::Hashtag,
		Kind::CustomEmoji,
		Kind::UnicodeEmoji,
		Kind::BlockCode,
		Kind::InlineCode,
		Kind::MathBlock,
		Kind::MathInline,
		Kind::Url,
		Kind::Link,
		Kind::Mention,
		Kind::Plain,
		Kind::Small,
		Kind::Center,
		Kind::Quote,
		Kind::Search,
		Kind::Fn,
	];

	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Kind::Text => "text",
			Kind::Bold => "bold",
			Kind::Italic => "italic",
			Kind::Strike => "strike",
			Kind::Hashtag => "hashtag",
			Kind::CustomEmoji => "custom-emoji",
			Kind::UnicodeEmoji => "unicode-emoji",
			Kind::BlockCode => "block-code",
			Kind::InlineCode => "inline-code",
			Kind::MathBlock => "math-block",
			Kind::MathInline => "math-inline",
			Kind::Url => "url",
			Kind::Link => "link",
			Kind::Mention => "mention",
			Kind::Plain => "plain",
			Kind::Small => "small",
			Kind::Center => "center",
			Kind::Quote => "quote",
			Kind::Search => "search",
			Kind::Fn => "fn",
		}
	}
}

impl Display for Kind {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextProps {
	pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashtagProps {
	pub hashtag: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiCodeProps {
	pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnicodeEmojiProps {
	pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockCodeProps {
	pub code: String,
	pub lang: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineCodeProps {
	pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathProps {
	pub formula: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlProps {
	pub url: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub brackets: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkProps {
	#[serde(default)]
	pub silent: bool,
	pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionProps {
	pub username: String,
	pub host: Option<String>,
	pub acct: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchProps {
	pub query: String,
	pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FnProps {
	pub name: String,
	#[serde(default)]
	pub args: FnArgs,
}

/// One MFM syntax node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
	Text {
		props: TextProps,
	},
	Bold {
		#[serde(default)]
		children: Vec<Node>,
	},
	Italic {
		#[serde(default)]
		children: Vec<Node>,
	},
	Strike {
		#[serde(default)]
		children: Vec<Node>,
	},
	Hashtag {
		props: HashtagProps,
	},
	EmojiCode {
		props: EmojiCodeProps,
	},
	UnicodeEmoji {
		props: UnicodeEmojiProps,
	},
	BlockCode {
		props: BlockCodeProps,
	},
	InlineCode {
		props: InlineCodeProps,
	},
	MathBlock {
		props: MathProps,
	},
	MathInline {
		props: MathProps,
	},
	Url {
		props: UrlProps,
	},
	Link {
		props: LinkProps,
		#[serde(default)]
		children: Vec<Node>,
	},
	Mention {
		props: MentionProps,
	},
	Plain {
		#[serde(default)]
		children: Vec<Node>,
	},
	Small {
		#[serde(default)]
		children: Vec<Node>,
	},
	Center {
		#[serde(default)]
		children: Vec<Node>,
	},
	Quote {
		#[serde(default)]
		children: Vec<Node>,
	},
	Search {
		props: SearchProps,
	},
	Fn {
		props: FnProps,
		#[serde(default)]
		children: Vec<Node>,
	},
}

impl Node {
	#[must_use]
	pub fn kind(&self) -> Kind {
		match self {
			Node::Text { .. } => Kind::Text,
			Node::Bold { .. } => Kind::Bold,
			Node::Italic { .. } => Kind::Italic,
			Node::Strike { .. } => Kind::Strike,
			Node::Hashtag { .. } => Kind::Hashtag,
			Node::EmojiCode { .. } => Kind::CustomEmoji,
			Node::UnicodeEmoji { .. } => Kind::UnicodeEmoji,
			Node::BlockCode { .. } => Kind::BlockCode,
			Node::InlineCode { .. } => Kind::InlineCode,
			Node::MathBlock { .. } => Kind::MathBlock,
			Node::MathInline { .. } => Kind::MathInline,
			Node::Url { .. } => Kind::Url,
			Node::Link { .. } => Kind::Link,
			Node::Mention { .. } => Kind::Mention,
			Node::Plain { .. } => Kind::Plain,
			Node::Small { .. } => Kind::Small,
			Node::Center { .. } => Kind::Center,
			Node::Quote { .. } => Kind::Quote,
			Node::Search { .. } => Kind::Search,
			Node::Fn { .. } => Kind::Fn,
		}
	}

	/// Child nodes. Empty for leaf kinds.
	#[must_use]
	pub fn children(&self) -> &[Node] {
		match self {
			Node::Bold { children }
			| Node::Italic { children }
			| Node::Strike { children }
			| Node::Link { children, .. }
			| Node::Plain { children }
			| Node::Small { children }
			| Node::Center { children }
			| Node::Quote { children }
			| Node::Fn { children, .. } => children,
			_ => &[],
		}
	}

	/// Flattens this node's own properties into the mapping handed to components.
	///
	/// Children are not included; composite kinds receive theirs as a staged `children` list instead.
	#[must_use]
	pub fn props<N>(&self) -> Props<N> {
		fn string<N>(value: &str) -> PropValue<N> {
			PropValue::Str(value.to_owned())
		}
		fn nullable<N>(value: Option<&String>) -> PropValue<N> {
			value.map_or(PropValue::Null, |value| PropValue::Str(value.clone()))
		}

		let mut props = Props::new();
		match self {
			Node::Text { props: p } => props.insert("text", string(&p.text)),
			Node::Hashtag { props: p } => props.insert("hashtag", string(&p.hashtag)),
			Node::EmojiCode { props: p } => props.insert("name", string(&p.name)),
			Node::UnicodeEmoji { props: p } => props.insert("emoji", string(&p.emoji)),
			Node::BlockCode { props: p } => {
				props.insert("code", string(&p.code));
				props.insert("lang", nullable(p.lang.as_ref()));
			}
			Node::InlineCode { props: p } => props.insert("code", string(&p.code)),
			Node::MathBlock { props: p } | Node::MathInline { props: p } => props.insert("formula", string(&p.formula)),
			Node::Url { props: p } => {
				props.insert("url", string(&p.url));
				if let Some(brackets) = p.brackets {
					props.insert("brackets", PropValue::Bool(brackets));
				}
			}
			Node::Link { props: p, .. } => {
				props.insert("silent", PropValue::Bool(p.silent));
				props.insert("url", string(&p.url));
			}
			Node::Mention { props: p } => {
				props.insert("username", string(&p.username));
				props.insert("host", nullable(p.host.as_ref()));
				props.insert("acct", string(&p.acct));
			}
			Node::Search { props: p } => {
				props.insert("query", string(&p.query));
				props.insert("content", string(&p.content));
			}
			Node::Fn { props: p, .. } => {
				props.insert("name", string(&p.name));
				props.insert("args", PropValue::Args(p.args.clone()));
			}
			Node::Bold { .. } | Node::Italic { .. } | Node::Strike { .. } | Node::Plain { .. } | Node::Small { .. } | Node::Center { .. } | Node::Quote { .. } => (),
		}
		props
	}
}

/// Constructors, mostly for hosts that build trees by hand and for tests.
impl Node {
	pub fn text(text: impl Into<String>) -> Self {
		Node::Text { props: TextProps { text: text.into() } }
	}

	#[must_use]
	pub fn bold(children: Vec<Node>) -> Self {
		Node::Bold { children }
	}

	#[must_use]
	pub fn italic(children: Vec<Node>) -> Self {
		Node::Italic { children }
	}

	#[must_use]
	pub fn strike(children: Vec<Node>) -> Self {
		Node::Strike { children }
	}

	#[must_use]
	pub fn plain(children: Vec<Node>) -> Self {
		Node::Plain { children }
	}

	#[must_use]
	pub fn small(children: Vec<Node>) -> Self {
		Node::Small { children }
	}

	#[must_use]
	pub fn center(children: Vec<Node>) -> Self {
		Node::Center { children }
	}

	#[must_use]
	pub fn quote(children: Vec<Node>) -> Self {
		Node::Quote { children }
	}

	pub fn hashtag(hashtag: impl Into<String>) -> Self {
		Node::Hashtag { props: HashtagProps { hashtag: hashtag.into() } }
	}

	pub fn custom_emoji(name: impl Into<String>) -> Self {
		Node::EmojiCode { props: EmojiCodeProps { name: name.into() } }
	}

	pub fn unicode_emoji(emoji: impl Into<String>) -> Self {
		Node::UnicodeEmoji { props: UnicodeEmojiProps { emoji: emoji.into() } }
	}

	pub fn block_code(code: impl Into<String>, lang: Option<&str>) -> Self {
		Node::BlockCode {
			props: BlockCodeProps {
				code: code.into(),
				lang: lang.map(str::to_owned),
			},
		}
	}

	pub fn inline_code(code: impl Into<String>) -> Self {
		Node::InlineCode { props: InlineCodeProps { code: code.into() } }
	}

	pub fn math_block(formula: impl Into<String>) -> Self {
		Node::MathBlock { props: MathProps { formula: formula.into() } }
	}

	pub fn math_inline(formula: impl Into<String>) -> Self {
		Node::MathInline { props: MathProps { formula: formula.into() } }
	}

	pub fn url(url: impl Into<String>) -> Self {
		Node::Url {
			props: UrlProps { url: url.into(), brackets: None },
		}
	}

	pub fn link(url: impl Into<String>, children: Vec<Node>) -> Self {
		Node::Link {
			props: LinkProps { silent: false, url: url.into() },
			children,
		}
	}

	/// `acct` is derived the way `mfm-js` does: `@username` or `@username@host`.
	pub fn mention(username: impl Into<String>, host: Option<&str>) -> Self {
		let username = username.into();
		let acct = match host {
			Some(host) => format!("@{}@{}", username, host),
			None => format!("@{}", username),
		};
		Node::Mention {
			props: MentionProps {
				username,
				host: host.map(str::to_owned),
				acct,
			},
		}
	}

	pub fn search(query: impl Into<String>, content: impl Into<String>) -> Self {
		Node::Search {
			props: SearchProps {
				query: query.into(),
				content: content.into(),
			},
		}
	}

	pub fn function(name: impl Into<String>, args: FnArgs, children: Vec<Node>) -> Self {
		Node::Fn {
			props: FnProps { name: name.into(), args },
			children,
		}
	}
}
