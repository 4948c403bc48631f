use axum::response::Html;
use once_cell::sync::Lazy;
use tera::{Context, Tera};

use crate::error::AppError;

/// Template registry, embedded at compile time so the binary is
/// self-contained.
static TEMPLATES: Lazy<Tera> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../../templates/base.html")),
        ("home.html", include_str!("../../templates/home.html")),
        ("login.html", include_str!("../../templates/login.html")),
        ("instructor_list.html", include_str!("../../templates/instructor_list.html")),
        ("instructor_detail.html", include_str!("../../templates/instructor_detail.html")),
        ("instructor_form.html", include_str!("../../templates/instructor_form.html")),
        ("student_list.html", include_str!("../../templates/student_list.html")),
        ("student_detail.html", include_str!("../../templates/student_detail.html")),
        ("student_form.html", include_str!("../../templates/student_form.html")),
        ("course_list.html", include_str!("../../templates/course_list.html")),
        ("course_detail.html", include_str!("../../templates/course_detail.html")),
        ("course_form.html", include_str!("../../templates/course_form.html")),
        ("section_list.html", include_str!("../../templates/section_list.html")),
        ("section_detail.html", include_str!("../../templates/section_detail.html")),
        ("section_form.html", include_str!("../../templates/section_form.html")),
        ("semester_list.html", include_str!("../../templates/semester_list.html")),
        ("semester_detail.html", include_str!("../../templates/semester_detail.html")),
        ("semester_form.html", include_str!("../../templates/semester_form.html")),
        ("registration_list.html", include_str!("../../templates/registration_list.html")),
        ("registration_detail.html", include_str!("../../templates/registration_detail.html")),
        ("registration_form.html", include_str!("../../templates/registration_form.html")),
    ])
    .expect("embedded templates are valid");
    tera
});

/// Render a named template with the given context.
pub fn page(template: &str, context: &Context) -> Result<Html<String>, AppError> {
    Ok(Html(TEMPLATES.render(template, context)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_renders_the_login_page() {
        let mut ctx = Context::new();
        ctx.insert("next", "/");
        ctx.insert("error", &Option::<String>::None);
        ctx.insert("username", "");
        let html = page("login.html", &ctx).expect("render");
        assert!(html.0.contains("username"));
    }
}
