//! HTML views rendered from the bundled templates.

use std::sync::Arc;

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

use crate::error::SiftError;

pub const INDEX: &str = "index.html";
pub const ADMIN_LOGIN: &str = "admin_login.html";
pub const ADMIN_DASHBOARD: &str = "admin_dashboard.html";

#[derive(Clone)]
pub struct Views {
    env: Arc<Environment<'static>>,
}

impl Views {
    pub fn new() -> Result<Self, SiftError> {
        let mut env = Environment::new();
        env.add_template(INDEX, include_str!("../templates/index.html"))?;
        env.add_template(ADMIN_LOGIN, include_str!("../templates/admin_login.html"))?;
        env.add_template(
            ADMIN_DASHBOARD,
            include_str!("../templates/admin_dashboard.html"),
        )?;
        Ok(Self { env: Arc::new(env) })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<Html<String>, SiftError> {
        let template = self.env.get_template(name)?;
        Ok(Html(template.render(ctx)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn all_templates_render() {
        let views = Views::new().unwrap();
        assert!(views.render(INDEX, context! {}).unwrap().0.contains("/predict"));
        let login = views
            .render(ADMIN_LOGIN, context! { error => "Invalid credentials" })
            .unwrap();
        assert!(login.0.contains("Invalid credentials"));
        let dashboard = views
            .render(
                ADMIN_DASHBOARD,
                context! { username => "admin", total => 3, fake => 1, real => 2, logs => Vec::<u8>::new(), retrain_state => "idle" },
            )
            .unwrap();
        assert!(dashboard.0.contains("No retrain runs yet."));
    }

    #[test]
    fn user_data_is_escaped() {
        let views = Views::new().unwrap();
        let html = views
            .render(ADMIN_LOGIN, context! { username => "<script>x</script>" })
            .unwrap();
        assert!(!html.0.contains("<script>x</script>"));
        assert!(html.0.contains("&lt;script&gt;"));
    }
}
