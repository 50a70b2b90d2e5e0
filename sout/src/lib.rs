//! # sout
//!
//! A small templating engine driven by four delimiter characters.
//!
//! This is the meta-crate that re-exports the sub-crates for convenient
//! access. Depend on `sout` for the engine, or on the individual crates for
//! finer-grained control.
//!
//! ```
//! use sout::prelude::*;
//!
//! let template = Template::parse("Hello {name}!", &Configuration::default()).unwrap();
//! let model = Value::map([("name", "Piet")]);
//! assert_eq!(template.render_to_string(&model).unwrap(), "Hello Piet!");
//! ```

/// Positions, the error type, settings and logging.
pub use sout_core as core;

/// Parser, renderer, value model, hooks, loaders and extensions.
#[cfg(feature = "template")]
pub use sout_template as template;

/// The `sout` command line tool as a library.
#[cfg(feature = "cli")]
pub use sout_cli as cli;

pub use serde;
pub use serde_json;
pub use tracing;

/// The types most programs need.
pub mod prelude {
    pub use sout_core::{Delimiters, Position, Settings, SoutError, SoutResult};

    #[cfg(feature = "template")]
    pub use sout_template::{
        Configuration, CustomIteratorFactory, CustomNameRenderer, CustomNameResolver,
        CustomTypeRenderer, Model, NameContext, Renderable, Scope, Template, TypeContext, Value,
        ValueIter,
    };
}
