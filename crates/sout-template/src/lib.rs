//! # sout-template
//!
//! A small templating engine driven by four delimiter characters. A template
//! is text with names (`{name}`) and nestings (`{name|part|part}`); rendering
//! it against a model resolves the names and decides, based on the resolved
//! value, how to render the parts: booleans choose a part, sequences loop
//! over a part. Every step can be taken over by hooks.
//!
//! ## Modules
//!
//! - [`parser`] - Template text to node tree
//! - [`value`] - Model values and the [`Model`](value::Model) trait
//! - [`scope`] - Render-time variable scopes
//! - [`resolver`] - Dotted name resolution
//! - [`iterator`] - Turning values into sequences
//! - [`hooks`] - The extension traits
//! - [`handlers`] - The built-in boolean, collection and pass-through handlers
//! - [`renderer`] - The dispatch engine
//! - [`template`] - `Template` and `Configuration`
//! - [`loaders`] - Reading template text from disk or memory
//! - [`extensions`] - Ready-made hooks: counters, nested templates, dates, null policies
//!
//! ## Example
//!
//! ```
//! use sout_template::{Configuration, Template, Value};
//!
//! let template = Template::parse(
//!     "Hello {name}{vip|, welcome back}!",
//!     &Configuration::default(),
//! ).unwrap();
//! let model = Value::map([("name", Value::from("Ada")), ("vip", Value::from(true))]);
//! assert_eq!(template.render_to_string(&model).unwrap(), "Hello Ada, welcome back!");
//! ```

pub mod extensions;
pub mod handlers;
pub mod hooks;
pub mod iterator;
pub mod loaders;
pub mod parser;
pub mod renderer;
pub mod resolver;
pub mod scope;
pub mod template;
pub mod value;

pub use hooks::{
    CustomIteratorFactory, CustomNameRenderer, CustomNameResolver, CustomTypeRenderer,
    NameContext, Renderable, TypeContext,
};
pub use loaders::{load_template, ChainLoader, FileSystemLoader, StringLoader, TemplateLoader};
pub use parser::{Container, Node};
pub use renderer::Renderer;
pub use scope::Scope;
pub use template::{Configuration, Template};
pub use value::{Model, Value, ValueIter};
