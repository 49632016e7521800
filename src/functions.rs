//! Wrapper shapes for `$[name.args content]` invocations.
//!
//! Each handler maps the invocation's arguments to an [`ElementDescriptor`] that the stock `fn` component
//! then wraps the invocation's children in. Animated handlers reference keyframes named
//! `<prefix>-<animation>`, which the host's stylesheet is expected to define.

use crate::{
	ast::{FnArg, FnArgs},
	error::RenderError,
	tree::ElementDescriptor,
};
use hashbrown::HashMap;

/// `(args, keyframes prefix)` to wrapper shape.
pub type FunctionHandler = fn(&FnArgs, &str) -> Result<ElementDescriptor, RenderError>;

/// Handlers by function name. Unknown names render as a plain `<span>`.
#[derive(Debug, Clone)]
pub struct Functions {
	handlers: HashMap<String, FunctionHandler>,
	prefix: String,
}

impl Default for Functions {
	/// The Misskey set, with keyframes prefixed `mfm`.
	fn default() -> Self {
		Self::misskey("mfm")
	}
}

impl Functions {
	/// No handlers at all.
	pub fn empty(prefix: impl Into<String>) -> Self {
		Self {
			handlers: HashMap::new(),
			prefix: prefix.into(),
		}
	}

	pub fn misskey(prefix: impl Into<String>) -> Self {
		let stock: [(&str, FunctionHandler); 20] = [
			("tada", tada),
			("jelly", jelly),
			("twitch", twitch),
			("shake", shake),
			("spin", spin),
			("jump", jump),
			("bounce", bounce),
			("rainbow", rainbow),
			("flip", flip),
			("x2", x2),
			("x3", x3),
			("x4", x4),
			("font", font),
			("blur", blur),
			("rotate", rotate),
			("position", position),
			("scale", scale),
			("fg", fg),
			("bg", bg),
			("border", border),
		];
		let mut functions = Self::empty(prefix);
		for (name, handler) in stock {
			functions.register(name, handler);
		}
		functions
	}

	#[must_use]
	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	pub fn register(&mut self, name: impl Into<String>, handler: FunctionHandler) -> Option<FunctionHandler> {
		self.handlers.insert(name.into(), handler)
	}

	#[must_use]
	pub fn with(mut self, name: impl Into<String>, handler: FunctionHandler) -> Self {
		self.register(name, handler);
		self
	}

	#[must_use]
	pub fn contains(&self, name: &str) -> bool {
		self.handlers.contains_key(name)
	}

	/// # Errors
	///
	/// [`RenderError::MalformedProps`] if a required argument is missing.
	pub fn descriptor(&self, name: &str, args: &FnArgs) -> Result<ElementDescriptor, RenderError> {
		match self.handlers.get(name) {
			Some(handler) => handler(args, &self.prefix),
			None => Ok(ElementDescriptor::new("span")),
		}
	}
}

fn value<'a>(args: &'a FnArgs, key: &str) -> Option<&'a str> {
	args.get(key).and_then(FnArg::as_value)
}

fn flag(args: &FnArgs, key: &str) -> bool {
	args.contains_key(key)
}

/// Reads a leading decimal number the way browsers read `1.5s` or `90deg`.
fn leading_number(text: &str) -> Option<f64> {
	let text = text.trim_start();
	let end = text
		.char_indices()
		.find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '-' || c == '+'))))
		.map_or(text.len(), |(i, _)| i);
	(1..=end).rev().find_map(|len| text[..len].parse::<f64>().ok()).filter(|number| number.is_finite())
}

fn number(args: &FnArgs, key: &str, default: f64) -> f64 {
	value(args, key).and_then(leading_number).unwrap_or(default)
}

fn animated(args: &FnArgs, prefix: &str, animation: &str, default_speed: f64) -> ElementDescriptor {
	let speed = number(args, "speed", default_speed);
	let delay = number(args, "delay", 0.0);
	ElementDescriptor::new("span")
		.style("display", "inline-block")
		.style("animation", format!("{}-{} {}s linear {}s running infinite", prefix, animation, speed, delay))
}

#[allow(clippy::unnecessary_wraps)]
fn tada(args: &FnArgs, prefix: &str) -> Result<ElementDescriptor, RenderError> {
	Ok(animated(args, prefix, "tada", 1.0).style("font-size", "150%"))
}

#[allow(clippy::unnecessary_wraps)]
fn jelly(args: &FnArgs, prefix: &str) -> Result<ElementDescriptor, RenderError> {
	Ok(animated(args, prefix, "jelly", 1.0))
}

#[allow(clippy::unnecessary_wraps)]
fn twitch(args: &FnArgs, prefix: &str) -> Result<ElementDescriptor, RenderError> {
	Ok(animated(args, prefix, "twitch", 0.5))
}

#[allow(clippy::unnecessary_wraps)]
fn shake(args: &FnArgs, prefix: &str) -> Result<ElementDescriptor, RenderError> {
	Ok(animated(args, prefix, "shake", 0.5))
}

#[allow(clippy::unnecessary_wraps)]
fn jump(args: &FnArgs, prefix: &str) -> Result<ElementDescriptor, RenderError> {
	Ok(animated(args, prefix, "jump", 0.75))
}

#[allow(clippy::unnecessary_wraps)]
fn bounce(args: &FnArgs, prefix: &str) -> Result<ElementDescriptor, RenderError> {
	Ok(animated(args, prefix, "bounce", 0.75).style("transform-origin", "center bottom"))
}

#[allow(clippy::unnecessary_wraps)]
fn rainbow(args: &FnArgs, prefix: &str) -> Result<ElementDescriptor, RenderError> {
	Ok(animated(args, prefix, "rainbow", 1.0))
}

#[allow(clippy::unnecessary_wraps)]
fn spin(args: &FnArgs, prefix: &str) -> Result<ElementDescriptor, RenderError> {
	let keyframes = if flag(args, "x") {
		"spinX"
	} else if flag(args, "y") {
		"spinY"
	} else {
		"spin"
	};
	let direction = if flag(args, "left") {
		"reverse"
	} else if flag(args, "alternate") {
		"alternate"
	} else {
		"normal"
	};
	let speed = number(args, "speed", 1.5);
	let delay = number(args, "delay", 0.0);
	Ok(ElementDescriptor::new("span").style("display", "inline-block").style(
		"animation",
		format!("{}-{} {}s linear {}s infinite {}", prefix, keyframes, speed, delay, direction),
	))
}

#[allow(clippy::unnecessary_wraps)]
fn flip(args: &FnArgs, _: &str) -> Result<ElementDescriptor, RenderError> {
	let transform = match (flag(args, "h"), flag(args, "v")) {
		(true, true) => "scale(-1, -1)",
		(false, true) => "scaleY(-1)",
		_ => "scaleX(-1)",
	};
	Ok(ElementDescriptor::new("span").style("display", "inline-block").style("transform", transform))
}

#[allow(clippy::unnecessary_wraps)]
fn x2(_: &FnArgs, _: &str) -> Result<ElementDescriptor, RenderError> {
	Ok(ElementDescriptor::new("span").style("font-size", "200%"))
}

#[allow(clippy::unnecessary_wraps)]
fn x3(_: &FnArgs, _: &str) -> Result<ElementDescriptor, RenderError> {
	Ok(ElementDescriptor::new("span").style("font-size", "400%"))
}

#[allow(clippy::unnecessary_wraps)]
fn x4(_: &FnArgs, _: &str) -> Result<ElementDescriptor, RenderError> {
	Ok(ElementDescriptor::new("span").style("font-size", "600%"))
}

#[allow(clippy::unnecessary_wraps)]
fn font(args: &FnArgs, _: &str) -> Result<ElementDescriptor, RenderError> {
	let family = ["serif", "monospace", "cursive", "fantasy", "emoji", "math"].into_iter().find(|family| flag(args, family));
	Ok(match family {
		Some(family) => ElementDescriptor::new("span").style("font-family", family),
		None => ElementDescriptor::new("span"),
	})
}

#[allow(clippy::unnecessary_wraps)]
fn blur(_: &FnArgs, prefix: &str) -> Result<ElementDescriptor, RenderError> {
	Ok(ElementDescriptor::new("span").class(format!("{}-blur", prefix)))
}

#[allow(clippy::unnecessary_wraps)]
fn rotate(args: &FnArgs, _: &str) -> Result<ElementDescriptor, RenderError> {
	Ok(ElementDescriptor::new("span")
		.style("display", "inline-block")
		.style("transform", format!("rotate({}deg)", number(args, "deg", 90.0)))
		.style("transform-origin", "center center"))
}

#[allow(clippy::unnecessary_wraps)]
fn position(args: &FnArgs, _: &str) -> Result<ElementDescriptor, RenderError> {
	let x = number(args, "x", 0.0);
	let y = number(args, "y", 0.0);
	Ok(ElementDescriptor::new("span")
		.style("display", "inline-block")
		.style("transform", format!("translateX({}em) translateY({}em)", x, y)))
}

#[allow(clippy::unnecessary_wraps)]
fn scale(args: &FnArgs, _: &str) -> Result<ElementDescriptor, RenderError> {
	let x = number(args, "x", 1.0).clamp(-5.0, 5.0);
	let y = number(args, "y", 1.0).clamp(-5.0, 5.0);
	Ok(ElementDescriptor::new("span")
		.style("display", "inline-block")
		.style("transform", format!("scale({}, {})", x, y)))
}

#[allow(clippy::unnecessary_wraps)]
fn fg(args: &FnArgs, _: &str) -> Result<ElementDescriptor, RenderError> {
	let span = ElementDescriptor::new("span");
	Ok(match value(args, "color") {
		Some(color) => span.style("color", color),
		None => span,
	})
}

#[allow(clippy::unnecessary_wraps)]
fn bg(args: &FnArgs, _: &str) -> Result<ElementDescriptor, RenderError> {
	let span = ElementDescriptor::new("span");
	Ok(match value(args, "color") {
		Some(color) => span.style("background-color", color),
		None => span,
	})
}

fn border(args: &FnArgs, _: &str) -> Result<ElementDescriptor, RenderError> {
	let radius = value(args, "radius")
		.and_then(leading_number)
		.ok_or_else(|| RenderError::malformed("args.radius", "a number"))?;
	let width = number(args, "width", 1.0);
	let color = value(args, "color").unwrap_or("currentColor");

	let span = ElementDescriptor::new("span")
		.style("display", "inline-block")
		.style("border", format!("{}px solid {}", width, color))
		.style("border-radius", format!("{}px", radius));
	Ok(if flag(args, "noclip") { span } else { span.style("overflow", "clip") })
}

#[cfg(test)]
mod tests {
	use super::*;

	fn args(pairs: &[(&str, Option<&str>)]) -> FnArgs {
		pairs
			.iter()
			.map(|&(key, value)| (key.to_owned(), value.map_or(FnArg::Flag(true), |value| FnArg::Value(value.to_owned()))))
			.collect()
	}

	#[test]
	fn leading_numbers() {
		assert_eq!(leading_number("1.5s"), Some(1.5));
		assert_eq!(leading_number("90deg"), Some(90.0));
		assert_eq!(leading_number("-2"), Some(-2.0));
		assert_eq!(leading_number("1.2.3"), Some(1.2));
		assert_eq!(leading_number("fast"), None);
		assert_eq!(leading_number(""), None);
	}

	#[test]
	fn unknown_names_are_plain_spans() {
		let functions = Functions::default();
		assert!(!functions.contains("sparkle"));
		assert_eq!(functions.descriptor("sparkle", &FnArgs::new()), Ok(ElementDescriptor::new("span")));
	}

	#[test]
	fn animation_defaults_and_overrides() {
		let functions = Functions::misskey("x");
		let tada = functions.descriptor("tada", &FnArgs::new()).unwrap();
		assert_eq!(tada.style_value("animation"), Some("x-tada 1s linear 0s running infinite"));
		assert_eq!(tada.style_value("font-size"), Some("150%"));

		let spin = functions.descriptor("spin", &args(&[("y", None), ("left", None), ("speed", Some("3s"))])).unwrap();
		assert_eq!(spin.style_value("animation"), Some("x-spinY 3s linear 0s infinite reverse"));
	}

	#[test]
	fn border_requires_radius() {
		let functions = Functions::default();
		assert_eq!(
			functions.descriptor("border", &args(&[("color", Some("red"))])),
			Err(RenderError::malformed("args.radius", "a number")),
		);

		let border = functions.descriptor("border", &args(&[("radius", Some("4")), ("noclip", None)])).unwrap();
		assert_eq!(border.style_value("border"), Some("1px solid currentColor"));
		assert_eq!(border.style_value("border-radius"), Some("4px"));
		assert_eq!(border.style_value("overflow"), None);
	}

	#[test]
	fn flip_and_font() {
		let functions = Functions::default();
		let both = functions.descriptor("flip", &args(&[("h", None), ("v", None)])).unwrap();
		assert_eq!(both.style_value("transform"), Some("scale(-1, -1)"));
		let font = functions.descriptor("font", &args(&[("monospace", None)])).unwrap();
		assert_eq!(font.style_value("font-family"), Some("monospace"));
	}
}
