//! Comparisons that decide whether existing work can be kept.

use crate::{
	props::Props,
	tree::{ElementDescriptor, OutputTree},
};
use hashbrown::HashSet;

/// Aggregate style key that mirrors all other properties and is never compared.
const AGGREGATE_STYLE_KEY: &str = "cssText";

/// `true` iff every key of `b` is present in `a` with the same value (see [`PropValue::is_same`](`crate::props::PropValue::is_same`)).
///
/// Keys only present in `a` are ignored.
#[must_use]
pub fn shallow_equal<N: PartialEq>(a: &Props<N>, b: &Props<N>) -> bool {
	b.iter().all(|(key, b_value)| a.get(key).map_or(false, |a_value| a_value.is_same(b_value)))
}

/// `true` iff `node` is an element with `descriptor`'s tag, exactly its class set and the same resolved style.
///
/// Style properties missing from `descriptor` count as empty. Index-like keys and `cssText` are skipped.
/// Attributes and children are not compared.
#[must_use]
pub fn structural_equal<T: OutputTree>(tree: &T, node: &T::Node, descriptor: &ElementDescriptor) -> bool {
	if !tree.is_element(node, &descriptor.tag) {
		return false;
	}

	let classes: HashSet<String> = tree.classes(node).into_iter().collect();
	let expected: HashSet<&str> = descriptor.classes.iter().map(String::as_str).collect();
	if classes.len() != expected.len() || !expected.iter().all(|class| classes.contains(*class)) {
		return false;
	}

	let style = tree.style(node);
	let keys: HashSet<&str> = style.iter().map(|(name, _)| name.as_str()).chain(descriptor.style.iter().map(|(name, _)| name.as_str())).collect();
	// Bound so the key iterator is dropped before `style`.
	let same_style = keys.into_iter().filter(|key| !is_skipped_style_key(key)).all(|key| {
		let actual = style.iter().find(|(name, _)| name == key).map_or("", |(_, value)| value.as_str());
		actual == descriptor.style_value(key).unwrap_or("")
	});
	same_style
}

fn is_skipped_style_key(key: &str) -> bool {
	key == AGGREGATE_STYLE_KEY || (!key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()))
}
