#![doc(html_root_url = "https://docs.rs/mfm-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! An incremental renderer for MFM (Misskey Flavored Markdown) syntax trees.
//!
//! [`Renderer`] reconciles a list of [`ast::Node`]s against the children of an output node, reusing
//! existing output wherever it still fits. Anything beyond text, bold, italic and strike is delegated to
//! [`component`]s, memoized per output node by a [`manager::ComponentManager`].
//!
//! Output goes through the [`tree::OutputTree`] trait: [`web::WebTree`] drives the browser DOM and
//! [`arena::ArenaTree`] is an in-memory stand-in that records every mutation.

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod arena;
pub mod ast;
pub mod component;
pub mod components;
pub mod diff;
pub mod equal;
pub mod error;
pub mod functions;
pub mod manager;
pub mod props;
pub mod tree;
pub mod web;

pub use diff::{Renderer, RendererOptions};
pub use error::RenderError;
