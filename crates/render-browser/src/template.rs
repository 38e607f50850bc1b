//! HTML template compilation and print styling.
use handlebars::Handlebars;
use rapport_render_core::{RenderError, RenderOptions, register_helpers};
use serde_json::Value;

/// Compiles HTML templates against the view model. Output is HTML-escaped.
pub struct HtmlTemplater {
    registry: Handlebars<'static>,
}

impl Default for HtmlTemplater {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HtmlTemplater {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HtmlTemplater").finish_non_exhaustive()
    }
}

impl HtmlTemplater {
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(false);
        register_helpers(&mut registry);
        Self { registry }
    }

    /// Renders `template` and injects the print stylesheet for `options`.
    pub fn compile(&self, template: &str, view: &Value, options: &RenderOptions) -> Result<String, RenderError> {
        let html = self.registry.render_template(template, view)?;
        Ok(inject_print_css(&html, &print_css(options)))
    }
}

/// `@page` geometry plus exact colour printing so backgrounds survive.
pub fn print_css(options: &RenderOptions) -> String {
    let size = options.page_size.dimensions();
    let m = options.margins;
    let mut css = format!(
        "@page {{ size: {}mm {}mm; margin: {}mm {}mm {}mm {}mm; }}",
        size.width, size.height, m.top, m.right, m.bottom, m.left
    );
    if options.print_background {
        css.push_str(" html, body { -webkit-print-color-adjust: exact; print-color-adjust: exact; }");
    }
    css
}

/// Places a `<style>` element at the end of `<head>`, or at the start of the document.
pub fn inject_print_css(html: &str, css: &str) -> String {
    let style = format!("<style data-print>{css}</style>");
    let lower = html.to_ascii_lowercase();
    match lower.find("</head>") {
        Some(at) => format!("{}{}{}", &html[..at], style, &html[at..]),
        None => format!("{style}{html}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rapport_types::{Margins, PageSize};
    use serde_json::json;

    #[test]
    fn css_for_a4_with_backgrounds() {
        let css = print_css(&RenderOptions::default());
        assert!(css.starts_with("@page { size: 210mm 297mm; margin: 10mm 10mm 10mm 10mm; }"));
        assert!(css.contains("print-color-adjust: exact"));
    }

    #[test]
    fn css_for_letter_without_backgrounds() {
        let options = RenderOptions {
            page_size: PageSize::Letter,
            margins: Margins { top: 12.5, right: 8.0, bottom: 12.5, left: 8.0 },
            print_background: false,
        };
        assert_eq!(print_css(&options), "@page { size: 215.9mm 279.4mm; margin: 12.5mm 8mm 12.5mm 8mm; }");
    }

    #[test]
    fn injects_into_head() {
        let out = inject_print_css("<html><HEAD><title>x</title></HEAD><body/></html>", "a{}");
        assert_eq!(out, "<html><HEAD><title>x</title><style data-print>a{}</style></HEAD><body/></html>");
        assert_eq!(inject_print_css("<p>x</p>", "a{}"), "<style data-print>a{}</style><p>x</p>");
    }

    #[test]
    fn compiles_with_helpers_and_escaping() {
        let view = json!({
            "site": { "name": "A & B" },
            "status": "OK",
            "photos": [{ "url": "p.png", "caption": "Lens" }, { "caption": "Missing" }]
        });
        let template = r#"<head></head><h1>{{site.name}}</h1>{{#if (eq status "OK")}}pass{{/if}}{{#each (gallery photos)}}<img src="{{src}}">{{/each}}{{default engineer "n/a"}}"#;
        let html = HtmlTemplater::new().compile(template, &view, &RenderOptions::default()).unwrap();
        assert!(html.contains("<h1>A &amp; B</h1>"));
        assert!(html.contains("pass"));
        assert!(html.contains(r#"<img src="p.png"><img src="">"#));
        assert!(html.contains("n/a"));
        assert!(html.contains("@page"));
    }

    #[test]
    fn syntax_errors_are_reported() {
        let err = HtmlTemplater::new()
            .compile("{{#if x}}unclosed", &json!({}), &RenderOptions::default())
            .unwrap_err();
        assert!(matches!(err, RenderError::TemplateSyntax { .. }));
    }
}
