//! # Module views
//!
//! A view turns one module into HTML. Views are looked up by module name,
//! then by category, so a custom `"content"` view can catch every block-like
//! module without registering each name.
//!
//! Views never fail on missing content: a reference to a block, form or
//! collection entry that does not exist renders an empty placeholder.

use crate::content::ContentCollections;
use crate::renderer::{escape_html, Context};
use crate::RenderResult;
use pagesmith_layout::Module;
use serde_json::{Map, Value};
use std::collections::HashMap;

pub trait ModuleView {
    fn render(&self, module: &Module, content: &ContentCollections, ctx: &mut Context) -> RenderResult<()>;
}

/// Registry of module views keyed by module name or category
pub struct ViewRegistry {
    views: HashMap<String, Box<dyn ModuleView>>,
}

impl ViewRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self { views: HashMap::new() }
    }

    /// Registry holding a view for every built-in module type
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("heading", Heading);
        registry.register("text", Text);
        registry.register("button", Button);
        registry.register("image", Image);
        registry.register("video", Video);
        registry.register("divider", Divider);
        registry.register("spacer", Spacer);
        registry.register("events", Events);
        registry.register("schedule", Schedule);
        registry.register("speakers", Speakers);
        registry.register("tickets", Tickets);
        registry.register("cart", CommerceWidget("cart"));
        registry.register("checkout", CommerceWidget("checkout"));
        registry.register("block", Block);
        registry.register("form", Form);
        registry
    }

    /// Register `view` under a module name or category, replacing any previous view
    pub fn register(&mut self, key: impl Into<String>, view: impl ModuleView + 'static) {
        self.views.insert(key.into(), Box::new(view));
    }

    pub fn get(&self, key: &str) -> Option<&dyn ModuleView> {
        self.views.get(key).map(|v| v.as_ref())
    }

    /// View for `module`: by name first, then by category
    pub fn resolve(&self, module: &Module) -> Option<&dyn ModuleView> {
        self.get(&module.name).or_else(|| self.get(&module.category))
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

impl Default for ViewRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

fn prop_str<'a>(props: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    props.get(key).and_then(Value::as_str).filter(|s| !s.trim().is_empty())
}

fn prop_u64(props: &Map<String, Value>, key: &str) -> Option<u64> {
    match props.get(key)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn prop_bool(props: &Map<String, Value>, key: &str) -> bool {
    props.get(key).and_then(Value::as_bool).unwrap_or(false)
}

/// Reference id stored as either a string or a number
fn prop_ref(props: &Map<String, Value>, key: &str) -> Option<String> {
    match props.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn placeholder(ctx: &mut Context, what: &str) {
    ctx.add_line(&format!("<div class=\"ps-empty\" data-missing=\"{}\"></div>", escape_html(what)));
}

struct Heading;

impl ModuleView for Heading {
    fn render(&self, module: &Module, _content: &ContentCollections, ctx: &mut Context) -> RenderResult<()> {
        let level = prop_u64(&module.default_props, "level").unwrap_or(2).clamp(1, 6);
        let text = prop_str(&module.default_props, "text").unwrap_or_default();
        ctx.element(&format!("h{}", level), &[], text);
        Ok(())
    }
}

struct Text;

impl ModuleView for Text {
    fn render(&self, module: &Module, _content: &ContentCollections, ctx: &mut Context) -> RenderResult<()> {
        let text = prop_str(&module.default_props, "text").unwrap_or_default();
        for paragraph in text.split("\n\n").filter(|p| !p.trim().is_empty()) {
            ctx.element("p", &[], paragraph.trim());
        }
        Ok(())
    }
}

struct Button;

impl ModuleView for Button {
    fn render(&self, module: &Module, _content: &ContentCollections, ctx: &mut Context) -> RenderResult<()> {
        let props = &module.default_props;
        let variant = prop_str(props, "variant").unwrap_or("primary");
        ctx.element(
            "a",
            &[
                ("href", prop_str(props, "href").unwrap_or("#").to_string()),
                ("class", format!("ps-button ps-button-{}", variant)),
            ],
            prop_str(props, "label").unwrap_or_default(),
        );
        Ok(())
    }
}

struct Image;

impl ModuleView for Image {
    fn render(&self, module: &Module, _content: &ContentCollections, ctx: &mut Context) -> RenderResult<()> {
        let props = &module.default_props;
        match prop_str(props, "src") {
            Some(src) => ctx.add_line(&format!(
                "<img src=\"{}\" alt=\"{}\" />",
                escape_html(src),
                escape_html(prop_str(props, "alt").unwrap_or_default())
            )),
            None => placeholder(ctx, "image"),
        }
        Ok(())
    }
}

struct Video;

impl ModuleView for Video {
    fn render(&self, module: &Module, _content: &ContentCollections, ctx: &mut Context) -> RenderResult<()> {
        let props = &module.default_props;
        let Some(url) = prop_str(props, "url") else {
            placeholder(ctx, "video");
            return Ok(());
        };
        let autoplay = if prop_bool(props, "autoplay") { " autoplay muted" } else { "" };
        ctx.add_line(&format!("<video src=\"{}\" controls{}></video>", escape_html(url), autoplay));
        Ok(())
    }
}

struct Divider;

impl ModuleView for Divider {
    fn render(&self, _module: &Module, _content: &ContentCollections, ctx: &mut Context) -> RenderResult<()> {
        ctx.add_line("<hr />");
        Ok(())
    }
}

struct Spacer;

impl ModuleView for Spacer {
    fn render(&self, module: &Module, _content: &ContentCollections, ctx: &mut Context) -> RenderResult<()> {
        let height = prop_u64(&module.default_props, "height").unwrap_or(32);
        ctx.add_line(&format!("<div class=\"ps-spacer\" style=\"height: {}px;\"></div>", height));
        Ok(())
    }
}

struct Events;

impl ModuleView for Events {
    fn render(&self, module: &Module, content: &ContentCollections, ctx: &mut Context) -> RenderResult<()> {
        if content.events.is_empty() {
            placeholder(ctx, "events");
            return Ok(());
        }
        let limit = prop_u64(&module.default_props, "limit").unwrap_or(u64::MAX) as usize;

        ctx.open("ul", &[("class", "ps-events".to_string())]);
        for event in content.events.iter().take(limit) {
            ctx.open("li", &[("data-event", event.id.clone())]);
            match &event.url {
                Some(url) => ctx.element("a", &[("href", url.clone())], &event.title),
                None => ctx.element("strong", &[], &event.title),
            }
            if let Some(starts_at) = &event.starts_at {
                ctx.element("time", &[("datetime", starts_at.clone())], starts_at);
            }
            if let Some(location) = &event.location {
                ctx.element("span", &[("class", "ps-location".to_string())], location);
            }
            ctx.close("li");
        }
        ctx.close("ul");
        Ok(())
    }
}

struct Schedule;

impl ModuleView for Schedule {
    fn render(&self, _module: &Module, content: &ContentCollections, ctx: &mut Context) -> RenderResult<()> {
        let mut dated: Vec<_> = content.events.iter().filter(|e| e.starts_at.is_some()).collect();
        if dated.is_empty() {
            placeholder(ctx, "schedule");
            return Ok(());
        }
        dated.sort_by(|a, b| a.starts_at.cmp(&b.starts_at));

        ctx.open("ol", &[("class", "ps-schedule".to_string())]);
        for event in dated {
            let starts_at = event.starts_at.clone().unwrap_or_default();
            ctx.open("li", &[]);
            ctx.element("time", &[("datetime", starts_at.clone())], &starts_at);
            ctx.element("span", &[], &event.title);
            ctx.close("li");
        }
        ctx.close("ol");
        Ok(())
    }
}

struct Speakers;

impl ModuleView for Speakers {
    fn render(&self, module: &Module, content: &ContentCollections, ctx: &mut Context) -> RenderResult<()> {
        if content.speakers.is_empty() {
            placeholder(ctx, "speakers");
            return Ok(());
        }
        let props = &module.default_props;
        let limit = prop_u64(props, "limit").unwrap_or(u64::MAX) as usize;
        let columns = prop_u64(props, "columns").unwrap_or(4).max(1);

        ctx.open(
            "div",
            &[
                ("class", "ps-speakers".to_string()),
                ("style", format!("display: grid; grid-template-columns: repeat({}, 1fr);", columns)),
            ],
        );
        for speaker in content.speakers.iter().take(limit) {
            ctx.open("figure", &[("data-speaker", speaker.id.clone())]);
            if let Some(photo) = &speaker.photo {
                ctx.add_line(&format!(
                    "<img src=\"{}\" alt=\"{}\" />",
                    escape_html(photo),
                    escape_html(&speaker.name)
                ));
            }
            ctx.element("figcaption", &[], &speaker.name);
            let role: Vec<&str> = [speaker.title.as_deref(), speaker.company.as_deref()]
                .into_iter()
                .flatten()
                .collect();
            if !role.is_empty() {
                ctx.element("small", &[], &role.join(", "));
            }
            ctx.close("figure");
        }
        ctx.close("div");
        Ok(())
    }
}

struct Tickets;

impl ModuleView for Tickets {
    fn render(&self, module: &Module, content: &ContentCollections, ctx: &mut Context) -> RenderResult<()> {
        let show_sold_out = prop_bool(&module.default_props, "showSoldOut");
        let tickets: Vec<_> = content
            .tickets
            .iter()
            .filter(|t| show_sold_out || !t.sold_out)
            .collect();
        if tickets.is_empty() {
            placeholder(ctx, "tickets");
            return Ok(());
        }

        ctx.open("ul", &[("class", "ps-tickets".to_string())]);
        for ticket in tickets {
            let class = if ticket.sold_out { "ps-sold-out" } else { "" };
            ctx.open("li", &[("data-ticket", ticket.id.clone()), ("class", class.to_string())]);
            ctx.element("span", &[], &ticket.name);
            if let Some(price) = ticket.price {
                let currency = ticket.currency.as_deref().unwrap_or("");
                ctx.element(
                    "span",
                    &[("class", "ps-price".to_string())],
                    format!("{:.2} {}", price, currency).trim(),
                );
            }
            ctx.close("li");
        }
        ctx.close("ul");
        Ok(())
    }
}

/// Mount point filled in client-side
struct CommerceWidget(&'static str);

impl ModuleView for CommerceWidget {
    fn render(&self, _module: &Module, _content: &ContentCollections, ctx: &mut Context) -> RenderResult<()> {
        ctx.add_line(&format!("<div data-widget=\"{}\"></div>", self.0));
        Ok(())
    }
}

struct Block;

impl ModuleView for Block {
    fn render(&self, module: &Module, content: &ContentCollections, ctx: &mut Context) -> RenderResult<()> {
        let block_id = module
            .block_id
            .clone()
            .or_else(|| prop_ref(&module.default_props, "blockId"));
        let Some(block) = block_id.as_deref().and_then(|id| content.block(id)) else {
            placeholder(ctx, "block");
            return Ok(());
        };

        let body = block.content.as_deref().unwrap_or_default();
        match block.content_type.as_deref() {
            // Trusted markup authored in the block library
            Some("html") => ctx.add_line(body),
            _ => ctx.element("div", &[("class", "ps-block-text".to_string())], body),
        }
        Ok(())
    }
}

struct Form;

impl ModuleView for Form {
    fn render(&self, module: &Module, content: &ContentCollections, ctx: &mut Context) -> RenderResult<()> {
        let Some(form) = prop_ref(&module.default_props, "formId").and_then(|id| content.form(&id)) else {
            placeholder(ctx, "form");
            return Ok(());
        };

        ctx.open("form", &[("data-form", form.id.clone()), ("method", "post".to_string())]);
        let fields = form
            .form_config
            .get("fields")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();
        for field in &fields {
            let Some(name) = field.get("name").and_then(Value::as_str) else {
                continue;
            };
            let label = field.get("label").and_then(Value::as_str).unwrap_or(name);
            let kind = field.get("type").and_then(Value::as_str).unwrap_or("text");
            let required = field.get("required").and_then(Value::as_bool).unwrap_or(false);

            ctx.open("label", &[]);
            ctx.add_line(&escape_html(label));
            ctx.add_line(&format!(
                "<input type=\"{}\" name=\"{}\"{} />",
                escape_html(kind),
                escape_html(name),
                if required { " required" } else { "" }
            ));
            ctx.close("label");
        }
        let submit = form
            .form_config
            .get("submitLabel")
            .and_then(Value::as_str)
            .unwrap_or("Submit");
        ctx.element("button", &[("type", "submit".to_string())], submit);
        ctx.close("form");
        Ok(())
    }
}
