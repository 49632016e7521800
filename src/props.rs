//! Flat property mappings handed to components.

use crate::{ast::FnArgs, error::RenderError};

/// A single property value.
///
/// `N` is the output tree's node handle type, used for staged children.
#[derive(Debug, Clone)]
pub enum PropValue<N> {
	Str(String),
	Bool(bool),
	Number(f64),
	Null,
	Args(FnArgs),
	Nodes(Vec<N>),
}

impl<N: PartialEq> PropValue<N> {
	/// Identity-style comparison used to gate re-renders.
	///
	/// Numbers match by value except that `NaN` matches `NaN` and `0.0` does not match `-0.0`.
	/// Node lists match if they hold the same handles in the same order.
	#[must_use]
	pub fn is_same(&self, other: &Self) -> bool {
		match (self, other) {
			(PropValue::Str(a), PropValue::Str(b)) => a == b,
			(PropValue::Bool(a), PropValue::Bool(b)) => a == b,
			(PropValue::Number(a), PropValue::Number(b)) => (a.is_nan() && b.is_nan()) || a.to_bits() == b.to_bits(),
			(PropValue::Null, PropValue::Null) => true,
			(PropValue::Args(a), PropValue::Args(b)) => a == b,
			(PropValue::Nodes(a), PropValue::Nodes(b)) => a == b,
			_ => false,
		}
	}
}

/// Ordered `key → value` mapping. Keys are unique; inserting an existing key overwrites in place.
#[derive(Debug, Clone)]
pub struct Props<N>(Vec<(String, PropValue<N>)>);

impl<N> Default for Props<N> {
	fn default() -> Self {
		Self::new()
	}
}

impl<N> Props<N> {
	#[must_use]
	pub fn new() -> Self {
		Self(Vec::new())
	}

	pub fn insert(&mut self, key: impl Into<String>, value: PropValue<N>) {
		let key = key.into();
		match self.0.iter_mut().find(|(k, _)| *k == key) {
			Some((_, slot)) => *slot = value,
			None => self.0.push((key, value)),
		}
	}

	#[must_use]
	pub fn with(mut self, key: impl Into<String>, value: PropValue<N>) -> Self {
		self.insert(key, value);
		self
	}

	#[must_use]
	pub fn get(&self, key: &str) -> Option<&PropValue<N>> {
		self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
	}

	#[must_use]
	pub fn contains_key(&self, key: &str) -> bool {
		self.get(key).is_some()
	}

	pub fn iter(&self) -> impl Iterator<Item = (&str, &PropValue<N>)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	#[must_use]
	pub fn len(&self) -> usize {
		self.0.len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}

	/// # Errors
	///
	/// [`RenderError::MalformedProps`] if `key` is missing or not a string.
	pub fn str(&self, key: &str) -> Result<&str, RenderError> {
		match self.get(key) {
			Some(PropValue::Str(value)) => Ok(value),
			_ => Err(RenderError::malformed(key, "a string")),
		}
	}

	/// Like [`Props::str`], but `null` reads as [`None`]. The key itself must still be present.
	///
	/// # Errors
	///
	/// [`RenderError::MalformedProps`] if `key` is missing or neither a string nor `null`.
	pub fn nullable_str(&self, key: &str) -> Result<Option<&str>, RenderError> {
		match self.get(key) {
			Some(PropValue::Str(value)) => Ok(Some(value)),
			Some(PropValue::Null) => Ok(None),
			_ => Err(RenderError::malformed(key, "a string or null")),
		}
	}

	/// Reads an optional flag. Absent reads as `false`.
	///
	/// # Errors
	///
	/// [`RenderError::MalformedProps`] if `key` is present but not a boolean.
	pub fn flag(&self, key: &str) -> Result<bool, RenderError> {
		match self.get(key) {
			None => Ok(false),
			Some(PropValue::Bool(value)) => Ok(*value),
			Some(_) => Err(RenderError::malformed(key, "a boolean")),
		}
	}

	/// # Errors
	///
	/// [`RenderError::MalformedProps`] if `key` is missing or not an `fn` argument map.
	pub fn args(&self, key: &str) -> Result<&FnArgs, RenderError> {
		match self.get(key) {
			Some(PropValue::Args(args)) => Ok(args),
			_ => Err(RenderError::malformed(key, "an argument map")),
		}
	}

	/// # Errors
	///
	/// [`RenderError::MalformedProps`] if `key` is missing or not a node list.
	pub fn nodes(&self, key: &str) -> Result<&[N], RenderError> {
		match self.get(key) {
			Some(PropValue::Nodes(nodes)) => Ok(nodes),
			_ => Err(RenderError::malformed(key, "a node list")),
		}
	}
}
