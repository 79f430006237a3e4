use std::{path::Path, sync::Arc};

use axum::{extract::State, response::Html};
use handlebars::{Handlebars, RenderError, TemplateError};
use serde_json::json;

use crate::{error::ApiError, store::TodoStore, AppState};

const HOME: &str = "home";

pub struct Pages {
    registry: Handlebars<'static>,
}

impl Pages {
    pub fn load(home: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let mut registry = Self::registry();
        registry.register_template_file(HOME, home)?;
        Ok(Self { registry })
    }

    pub fn from_source(home: &str) -> Result<Self, TemplateError> {
        let mut registry = Self::registry();
        registry.register_template_string(HOME, home)?;
        Ok(Self { registry })
    }

    fn registry() -> Handlebars<'static> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry
    }

    pub fn render_home(&self) -> Result<String, RenderError> {
        self.registry.render(
            HOME,
            &json!({
                "title": "Todo",
                "api": "/todo/",
            }),
        )
    }
}

pub async fn home<S: TodoStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<Html<String>, ApiError> {
    Ok(Html(state.pages.render_home()?))
}
