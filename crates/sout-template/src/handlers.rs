//! The built-in type renderers.
//!
//! After the custom type renderers have declined, a nesting is offered to
//! these three in order: [`BooleanRenderer`], [`CollectionRenderer`] and
//! [`PassThroughRenderer`].

use std::io::Write;

use sout_core::{SoutError, SoutResult};

use crate::hooks::{CustomTypeRenderer, TypeContext};
use crate::iterator::IteratorFactory;

/// Renders a nesting whose name resolved to a boolean.
///
/// `{flag|yes}` renders `yes` when the flag is true and nothing otherwise;
/// `{flag|yes|no}` renders one of the two. The parts are rendered against
/// the model the flag was found on, not against the flag.
#[derive(Debug, Default, Clone, Copy)]
pub struct BooleanRenderer;

impl CustomTypeRenderer for BooleanRenderer {
    fn render(&self, ctx: &TypeContext<'_>, out: &mut dyn Write) -> SoutResult<bool> {
        let Some(flag) = ctx.value.as_bool() else {
            return Ok(false);
        };
        let part = match (ctx.parts, flag) {
            ([when_true], true) | ([when_true, _], true) => Some(when_true),
            ([_], false) => None,
            ([_, when_false], false) => Some(when_false),
            _ => {
                return Err(SoutError::render_at(
                    format!(
                        "wrong amount of parts ({}) for `{}`: a boolean takes 1 or 2",
                        ctx.parts.len(),
                        ctx.name
                    ),
                    ctx.position,
                ))
            }
        };
        if let Some(part) = part {
            part.render(ctx.parent_model, ctx.scope, out)?;
        }
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "boolean"
    }
}

/// Renders a nesting by looping over the sequence its name resolved to.
///
/// | Parts | Meaning                                     |
/// |-------|---------------------------------------------|
/// | 1     | main                                        |
/// | 2     | main, separator                             |
/// | 4     | lead-in, main, separator, lead-out          |
///
/// The main part is rendered once per element, against the element. The
/// separator is rendered between elements, also against the element that
/// follows it. Lead-in and lead-out are rendered once around a non-empty
/// sequence, against the model the sequence was found on. An empty sequence
/// renders nothing at all.
#[derive(Debug, Default, Clone)]
pub struct CollectionRenderer {
    iterators: IteratorFactory,
}

impl CollectionRenderer {
    /// Creates a collection renderer that loops over what `iterators`
    /// produces.
    pub const fn new(iterators: IteratorFactory) -> Self {
        Self { iterators }
    }
}

impl CustomTypeRenderer for CollectionRenderer {
    fn render(&self, ctx: &TypeContext<'_>, out: &mut dyn Write) -> SoutResult<bool> {
        let (lead_in, main, separator, lead_out) = match ctx.parts {
            [main] => (None, main, None, None),
            [main, separator] => (None, main, Some(separator), None),
            [lead_in, main, separator, lead_out] => {
                (Some(lead_in), main, Some(separator), Some(lead_out))
            }
            _ => {
                return Err(SoutError::render_at(
                    format!(
                        "wrong amount of parts ({}) for `{}`: a collection takes 1, 2 or 4",
                        ctx.parts.len(),
                        ctx.name
                    ),
                    ctx.position,
                ))
            }
        };
        // Parts are checked before asking for the sequence, so a malformed
        // nesting never drains a live iterator.
        let Some(mut elements) =
            self.iterators
                .to_iterator(ctx.value, ctx.parent_scope, ctx.position)?
        else {
            return Ok(false);
        };

        let Some(first) = elements.next() else {
            return Ok(true);
        };
        if let Some(lead_in) = lead_in {
            lead_in.render(ctx.parent_model, ctx.scope, out)?;
        }
        main.render(&first, ctx.scope, out)?;
        for element in elements {
            if let Some(separator) = separator {
                separator.render(&element, ctx.scope, out)?;
            }
            main.render(&element, ctx.scope, out)?;
        }
        if let Some(lead_out) = lead_out {
            lead_out.render(ctx.parent_model, ctx.scope, out)?;
        }
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "collection"
    }
}

/// Renders the single part of a nesting against the resolved value, as if
/// the value were the model. Only reached for values nothing can loop over.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassThroughRenderer;

impl CustomTypeRenderer for PassThroughRenderer {
    fn render(&self, ctx: &TypeContext<'_>, out: &mut dyn Write) -> SoutResult<bool> {
        let [part] = ctx.parts else {
            return Ok(false);
        };
        part.render(ctx.value, ctx.scope, out)?;
        Ok(true)
    }

    fn name(&self) -> &'static str {
        "pass-through"
    }
}
