use crate::content::ContentCollections;
use crate::views::ViewRegistry;
use crate::RenderResult;
use pagesmith_editor::Page;
use pagesmith_layout::{render_properties_to_css, to_render_properties, Column, Module, Row, Section, Style};
use std::collections::BTreeMap;

/// Options for HTML rendering
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Emit node styles as `style` attributes
    pub inline_styles: bool,
    /// Pretty print HTML
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            inline_styles: true,
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

/// Output buffer shared by the layout walker and module views
pub struct Context {
    options: RenderOptions,
    depth: usize,
    buffer: String,
}

impl Context {
    pub fn new(options: RenderOptions) -> Self {
        Self {
            options,
            depth: 0,
            buffer: String::new(),
        }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn add(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn add_line(&mut self, text: &str) {
        if self.options.pretty {
            self.add_indent();
        }
        self.add(text);
        if self.options.pretty {
            self.add("\n");
        }
    }

    fn add_indent(&mut self) {
        for _ in 0..self.depth {
            self.buffer.push_str(&self.options.indent);
        }
    }

    pub fn indent(&mut self) {
        self.depth += 1;
    }

    pub fn dedent(&mut self) {
        if self.depth > 0 {
            self.depth -= 1;
        }
    }

    /// `<tag attrs>` on its own line, then indent
    pub fn open(&mut self, tag: &str, attrs: &[(&str, String)]) {
        let mut line = format!("<{}", tag);
        for (name, value) in attrs {
            if value.is_empty() {
                continue;
            }
            line.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
        }
        line.push('>');
        self.add_line(&line);
        self.indent();
    }

    /// Dedent, then `</tag>`
    pub fn close(&mut self, tag: &str) {
        self.dedent();
        self.add_line(&format!("</{}>", tag));
    }

    /// `<tag attrs>text</tag>` on one line, text escaped
    pub fn element(&mut self, tag: &str, attrs: &[(&str, String)], text: &str) {
        let mut line = format!("<{}", tag);
        for (name, value) in attrs {
            if value.is_empty() {
                continue;
            }
            line.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
        }
        line.push('>');
        line.push_str(&escape_html(text));
        line.push_str(&format!("</{}>", tag));
        self.add_line(&line);
    }

    fn into_output(self) -> String {
        self.buffer
    }
}

/// Render a section list as an HTML fragment
pub fn render_layout(
    sections: &[Section],
    content: &ContentCollections,
    views: &ViewRegistry,
    options: RenderOptions,
) -> RenderResult<String> {
    let mut ctx = Context::new(options);
    render_sections(sections, content, views, &mut ctx)?;
    Ok(ctx.into_output())
}

/// Render a complete HTML document for a page
pub fn render_page(
    page: &Page,
    content: &ContentCollections,
    views: &ViewRegistry,
    options: RenderOptions,
) -> RenderResult<String> {
    let mut ctx = Context::new(options);

    ctx.add_line("<!DOCTYPE html>");
    ctx.add_line("<html>");
    ctx.indent();

    render_head(page, &mut ctx);

    ctx.open("body", &[("class", format!("page-{}", page.slug))]);
    ctx.open("main", &[("class", "ps-page".to_string())]);
    render_sections(&page.layout.sections, content, views, &mut ctx)?;
    ctx.close("main");
    ctx.close("body");

    ctx.dedent();
    ctx.add_line("</html>");

    tracing::debug!("Rendered page {}", page.slug);
    Ok(ctx.into_output())
}

fn render_head(page: &Page, ctx: &mut Context) {
    ctx.add_line("<head>");
    ctx.indent();

    ctx.add_line("<meta charset=\"UTF-8\">");
    ctx.add_line("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">");
    ctx.element("title", &[], &page.title);
    if !page.seo.description.is_empty() {
        ctx.add_line(&format!(
            "<meta name=\"description\" content=\"{}\">",
            escape_html(&page.seo.description)
        ));
    }
    if !page.seo.keywords.is_empty() {
        ctx.add_line(&format!(
            "<meta name=\"keywords\" content=\"{}\">",
            escape_html(&page.seo.keywords)
        ));
    }

    ctx.dedent();
    ctx.add_line("</head>");
}

fn render_sections(
    sections: &[Section],
    content: &ContentCollections,
    views: &ViewRegistry,
    ctx: &mut Context,
) -> RenderResult<()> {
    for section in sections {
        render_section(section, content, views, ctx)?;
    }
    Ok(())
}

fn render_section(
    section: &Section,
    content: &ContentCollections,
    views: &ViewRegistry,
    ctx: &mut Context,
) -> RenderResult<()> {
    let style = style_attr(&section.style, BTreeMap::new(), ctx);
    ctx.open(
        "section",
        &[
            ("id", section.id.clone()),
            ("class", format!("ps-section ps-{}", section.kind)),
            ("style", style),
        ],
    );

    for row in &section.rows {
        render_row(section, row, content, views, ctx)?;
    }

    ctx.close("section");
    Ok(())
}

fn render_row(
    section: &Section,
    row: &Row,
    content: &ContentCollections,
    views: &ViewRegistry,
    ctx: &mut Context,
) -> RenderResult<()> {
    let mut layout = BTreeMap::new();
    layout.insert("display".to_string(), "flex".to_string());
    layout.insert("flex-wrap".to_string(), "wrap".to_string());
    if let Some(gap) = row.settings.get("gap").and_then(css_length) {
        layout.insert("gap".to_string(), gap);
    }

    let mut class = "ps-row".to_string();
    if let Some(extra) = row.settings.get("cssClass").and_then(|v| v.as_str()) {
        class.push(' ');
        class.push_str(extra.trim());
    }

    let style = style_attr(&row.style, layout, ctx);
    ctx.open("div", &[("id", row.id.clone()), ("class", class), ("style", style)]);

    for column in &row.columns {
        render_column(section, column, content, views, ctx)?;
    }

    ctx.close("div");
    Ok(())
}

fn render_column(
    section: &Section,
    column: &Column,
    content: &ContentCollections,
    views: &ViewRegistry,
    ctx: &mut Context,
) -> RenderResult<()> {
    let mut layout = BTreeMap::new();
    layout.insert("flex".to_string(), format!("0 0 {}%", column.width));
    layout.insert("max-width".to_string(), format!("{}%", column.width));

    let style = style_attr(&column.style, layout, ctx);
    ctx.open(
        "div",
        &[("id", column.id.clone()), ("class", "ps-column".to_string()), ("style", style)],
    );

    for module in &column.modules {
        render_module(section, module, content, views, ctx)?;
    }

    ctx.close("div");
    Ok(())
}

fn render_module(
    section: &Section,
    module: &Module,
    content: &ContentCollections,
    views: &ViewRegistry,
    ctx: &mut Context,
) -> RenderResult<()> {
    let Some(view) = views.resolve(module) else {
        tracing::warn!("No view for module {} ({}) in section {}", module.id, module.name, section.id);
        ctx.add_line(&format!("<!-- unknown module: {} -->", escape_comment(&module.name)));
        return Ok(());
    };

    ctx.open(
        "div",
        &[
            ("id", module.id.clone()),
            ("class", format!("ps-module ps-{}", module.name)),
        ],
    );
    view.render(module, content, ctx)?;
    ctx.close("div");
    Ok(())
}

/// Inline style for a node; `layout` properties win over the node's own style
fn style_attr(style: &Style, layout: BTreeMap<String, String>, ctx: &Context) -> String {
    if !ctx.options.inline_styles {
        return String::new();
    }
    let mut props = to_render_properties(style);
    props.extend(layout);
    render_properties_to_css(&props)
}

fn css_length(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Number(n) => Some(format!("{}px", n)),
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn escape_comment(text: &str) -> String {
    text.replace("--", "- -")
}
