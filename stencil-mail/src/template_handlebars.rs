//! Handlebars render engine.
//!
//! Handlebars accepts the Mustache subset used by email templates
//! (`{{var}}`, `{{{raw}}}`, block sections), so metadata,
//! HTML and text templates render through the same registry.

use handlebars::Handlebars;

use crate::{RenderEngine, Result};

/// Handlebars-based render engine.
pub struct HandlebarsEngine {
    handlebars: Handlebars<'static>,
}

impl HandlebarsEngine {
    /// Create an engine where missing variables render as empty strings.
    pub fn new() -> Self {
        Self {
            handlebars: Handlebars::new(),
        }
    }

    /// Fail on missing variables instead of rendering them empty.
    pub fn strict(mut self) -> Self {
        self.handlebars.set_strict_mode(true);
        self
    }

    /// Register helpers.
    pub fn register_helper<H: handlebars::HelperDef + Send + Sync + 'static>(
        mut self,
        name: &str,
        helper: H,
    ) -> Self {
        self.handlebars.register_helper(name, Box::new(helper));
        self
    }
}

impl Default for HandlebarsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderEngine for HandlebarsEngine {
    fn render(&self, template: &str, data: &serde_json::Value) -> Result<String> {
        Ok(self.handlebars.render_template(template, data)?)
    }
}
