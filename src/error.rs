use crate::ast::Kind;
use thiserror::Error;

/// Errors that abort a render call.
///
/// Whatever was reconciled before the failure stays in place and is internally consistent,
/// so rendering the same (or a corrected) AST again picks up where the failed call stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
	/// No component is registered for a kind that delegates to one.
	#[error("no component registered for `{0}` nodes")]
	MissingComponent(Kind),

	/// A component's props lack a key it requires, or the value has the wrong type.
	#[error("malformed props: `{key}` must be {expected}")]
	MalformedProps { key: String, expected: &'static str },

	/// The AST nests deeper than [`RendererOptions::depth_limit`](`crate::RendererOptions::depth_limit`).
	#[error("depth limit of {0} reached")]
	DepthLimit(usize),
}

impl RenderError {
	pub(crate) fn malformed(key: &str, expected: &'static str) -> Self {
		Self::MalformedProps { key: key.to_owned(), expected }
	}
}
