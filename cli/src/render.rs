//! Template renderer with a single injected `secret` helper.
//!
//! Thin adapter over handlebars: parsing is syntax-only, execution is a
//! single left-to-right pass, and every `{{ secret "path" }}` occurrence
//! triggers one synchronous fetch through the bound [`SecretSource`].
//! The first read failure aborts the render; output is all-or-nothing.

use std::collections::HashMap;
use std::sync::Arc;

use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext,
    RenderErrorReason, no_escape,
};
use thiserror::Error;
use vellum_vault::SecretSource;

const TEMPLATE_NAME: &str = "template";

/// Rendering failures.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Template syntax is invalid
    #[error("error parsing template: {0}")]
    Parse(#[from] handlebars::TemplateError),

    /// Execution failed; secret read failures surface here
    #[error("error rendering template: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Helper backing `{{ secret "path" }}`: resolves the path through the
/// secret source at the moment of substitution.
struct SecretHelper {
    source: Arc<dyn SecretSource>,
}

impl HelperDef for SecretHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _r: &'reg Handlebars<'reg>,
        _ctx: &'rc Context,
        _rc: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let path = h
            .param(0)
            .and_then(|p| p.value().as_str())
            .ok_or(RenderErrorReason::ParamNotFoundForIndex("secret", 0))?;

        let value = self
            .source
            .read_string(path)
            .map_err(|e| RenderErrorReason::NestedError(Box::new(e)))?;

        out.write(&value)?;
        Ok(())
    }
}

/// Template renderer bound to a secret source.
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    /// Create a renderer whose `secret` helper reads through `source`.
    #[must_use]
    pub fn new(source: Arc<dyn SecretSource>) -> Self {
        let mut registry = Handlebars::new();
        // Output is arbitrary text, not HTML.
        registry.register_escape_fn(no_escape);
        registry.register_helper("secret", Box::new(SecretHelper { source }));
        Self { registry }
    }

    /// Compile the template source. Syntax-only: no secret is fetched.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Parse`] on invalid template syntax.
    pub fn parse(&mut self, source: &str) -> Result<(), RenderError> {
        self.registry.register_template_string(TEMPLATE_NAME, source)?;
        Ok(())
    }

    /// Execute the compiled template against the given context.
    ///
    /// Plain substitutions read from `context`; missing keys render as
    /// empty. Secret references fetch lazily and the first failure
    /// aborts with no output.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::Render`] if execution fails, including any
    /// secret read failure.
    pub fn render(&self, context: &HashMap<String, String>) -> Result<Vec<u8>, RenderError> {
        let rendered = self.registry.render(TEMPLATE_NAME, context)?;
        Ok(rendered.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_vault::ReadError;

    struct NoSecrets;

    impl SecretSource for NoSecrets {
        fn read_string(&self, path: &str) -> Result<String, ReadError> {
            Err(ReadError::NotFound(path.to_string()))
        }
    }

    #[test]
    fn test_parse_rejects_bad_syntax() {
        let mut renderer = Renderer::new(Arc::new(NoSecrets));
        assert!(matches!(
            renderer.parse("{{ unclosed "),
            Err(RenderError::Parse(_))
        ));
    }

    #[test]
    fn test_output_is_not_html_escaped() {
        let mut renderer = Renderer::new(Arc::new(NoSecrets));
        renderer.parse("{{ VALUE }}").expect("parse");

        let mut context = HashMap::new();
        context.insert("VALUE".to_string(), "a < b & c".to_string());

        let output = renderer.render(&context).expect("render");
        assert_eq!(output, b"a < b & c");
    }
}
