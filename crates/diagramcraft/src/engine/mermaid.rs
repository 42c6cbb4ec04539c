//! The Mermaid engine: parser-backed validation and SVG rendering.

use std::{
    future::Future,
    sync::{Arc, LazyLock},
};

use log::{debug, trace};
use mermaid_rs_renderer::{LayoutConfig, RenderOptions, Theme};
use regex::Regex;
use tokio::task;

use crate::{
    config::RenderConfig,
    description::Version,
    engine::{RenderHandle, Renderer, Validator},
    error::DiagramcraftError,
    outcome::{RenderError, SyntaxError},
};

static ELEMENT_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(\s)id="([^"]+)""#).expect("element id pattern is a valid regex")
});
static URL_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"url\(#([^)\s]+)\)").expect("url reference pattern is a valid regex")
});
static HREF_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"href="#([^"]+)""##).expect("href reference pattern is a valid regex")
});

/// Validates with `diagramcraft-parser` and draws with `mermaid-rs-renderer`.
///
/// The theme is fixed when the engine is built; nothing is reconfigured per
/// call. Both calls run on the blocking pool.
#[derive(Debug, Clone)]
pub struct MermaidEngine {
    font_family: String,
    background: Option<String>,
}

impl MermaidEngine {
    /// Build an engine from the `[render]` configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DiagramcraftError::Config`] if the background is not a CSS color.
    pub fn new(config: &RenderConfig) -> Result<Self, DiagramcraftError> {
        let background = config
            .background_color()
            .map_err(DiagramcraftError::Config)?
            .map(|color| color.to_hex());
        Ok(Self {
            font_family: config.font_family().to_string(),
            background,
        })
    }

    fn options(&self) -> RenderOptions {
        let mut theme = Theme::modern();
        theme.font_family = self.font_family.clone();
        if let Some(background) = &self.background {
            theme.background = background.clone();
        }
        RenderOptions {
            theme,
            layout: LayoutConfig::default(),
        }
    }
}

impl Validator for MermaidEngine {
    fn validate(
        &self,
        source: Arc<str>,
        version: Version,
    ) -> impl Future<Output = Result<(), SyntaxError>> + Send {
        async move {
            let checked = task::spawn_blocking(move || {
                diagramcraft_parser::validate(&source)
                    .map_err(|err| SyntaxError::from_parse(err, &source))
            })
            .await;

            match checked {
                Ok(Ok(diagram)) => {
                    debug!(
                        version:% = version,
                        dialect:% = diagram.dialect(),
                        statements = diagram.statement_count();
                        "Description is valid"
                    );
                    Ok(())
                }
                Ok(Err(err)) => {
                    trace!(version:% = version, diagnostics:? = err.diagnostics(); "Validation failed");
                    Err(err)
                }
                Err(err) => Err(SyntaxError::new(format!("validator stopped unexpectedly: {err}"))),
            }
        }
    }
}

impl Renderer for MermaidEngine {
    fn render(
        &self,
        source: Arc<str>,
        handle: RenderHandle,
        version: Version,
    ) -> impl Future<Output = Result<String, RenderError>> + Send {
        let options = self.options();
        async move {
            debug!(version:% = version, handle:% = handle; "Rendering description");
            let rendered = task::spawn_blocking(move || {
                mermaid_rs_renderer::render_with_options(&source, options)
                    .map(|svg| scope_ids(&svg, &handle))
                    .map_err(|err| RenderError::new(err.to_string()))
            })
            .await;

            match rendered {
                Ok(Ok(svg)) => {
                    trace!(version:% = version, bytes = svg.len(); "SVG produced");
                    Ok(svg)
                }
                Ok(Err(err)) => Err(err),
                Err(err) => Err(RenderError::new(format!("renderer stopped unexpectedly: {err}"))),
            }
        }
    }
}

/// Prefix every element id and id reference in `svg` with the handle.
///
/// Only markup is rewritten: attributes inside tags and the CSS of `<style>`
/// elements. Text nodes hold user labels and are copied unchanged. The root
/// `<svg>` element gets the bare handle as its id unless it already has one.
fn scope_ids(svg: &str, handle: &RenderHandle) -> String {
    let mut scoped = String::with_capacity(svg.len() + 64);
    let mut rest = svg;
    let mut in_style = false;
    let mut root_seen = false;

    while let Some(open) = rest.find('<') {
        let (text, tail) = rest.split_at(open);
        push_text(&mut scoped, text, in_style, handle);

        let (markup, after) = tail.split_at(markup_len(tail));
        rest = after;

        if let Some(body) = markup.strip_prefix("<![CDATA[") {
            let (body, close) = body
                .strip_suffix("]]>")
                .map_or((body, ""), |body| (body, "]]>"));
            scoped.push_str("<![CDATA[");
            push_text(&mut scoped, body, in_style, handle);
            scoped.push_str(close);
            continue;
        }
        if markup.starts_with("<!") || markup.starts_with("<?") {
            scoped.push_str(markup);
            continue;
        }

        let name = tag_name(markup);
        let tag = scope_tag(markup, handle);
        if name == "svg" && !root_seen {
            root_seen = true;
            push_root(&mut scoped, &tag, handle);
        } else {
            scoped.push_str(&tag);
        }
        match name {
            "style" => in_style = !markup.ends_with("/>"),
            "/style" => in_style = false,
            _ => {}
        }
    }
    push_text(&mut scoped, rest, in_style, handle);
    scoped
}

/// Byte length of the tag, comment or CDATA section at the start of `tail`.
fn markup_len(tail: &str) -> usize {
    for (opening, closing) in [("<![CDATA[", "]]>"), ("<!--", "-->")] {
        if tail.starts_with(opening) {
            return tail
                .find(closing)
                .map_or(tail.len(), |end| end + closing.len());
        }
    }

    // `>` may appear unescaped inside quoted attribute values.
    let mut quote = None;
    for (index, ch) in tail.char_indices() {
        match quote {
            Some(open) if ch == open => quote = None,
            Some(_) => {}
            None if ch == '"' || ch == '\'' => quote = Some(ch),
            None if ch == '>' => return index + 1,
            None => {}
        }
    }
    tail.len()
}

/// `svg` for `<svg ...>`, `/style` for `</style>`.
fn tag_name(markup: &str) -> &str {
    let name = &markup[1..];
    let end = name
        .char_indices()
        .skip(1)
        .find(|&(_, ch)| ch.is_whitespace() || ch == '>' || ch == '/')
        .map_or(name.len(), |(index, _)| index);
    &name[..end]
}

fn push_text(scoped: &mut String, text: &str, in_style: bool, handle: &RenderHandle) {
    if in_style {
        scoped.push_str(&scope_urls(text, handle));
    } else {
        scoped.push_str(text);
    }
}

fn scope_urls(markup: &str, handle: &RenderHandle) -> String {
    URL_REFERENCE
        .replace_all(markup, |caps: &regex::Captures<'_>| {
            format!("url(#{handle}-{})", &caps[1])
        })
        .into_owned()
}

fn scope_tag(tag: &str, handle: &RenderHandle) -> String {
    let scoped = ELEMENT_ID.replace_all(tag, |caps: &regex::Captures<'_>| {
        format!(r#"{}id="{handle}-{}""#, &caps[1], &caps[2])
    });
    let scoped = scope_urls(&scoped, handle);
    HREF_REFERENCE
        .replace_all(&scoped, |caps: &regex::Captures<'_>| {
            format!(r##"href="#{handle}-{}""##, &caps[1])
        })
        .into_owned()
}

fn push_root(scoped: &mut String, tag: &str, handle: &RenderHandle) {
    if ELEMENT_ID.is_match(tag) {
        scoped.push_str(tag);
        return;
    }
    let (open, attributes) = tag.split_at("<svg".len());
    scoped.push_str(open);
    scoped.push_str(&format!(r#" id="{handle}""#));
    scoped.push_str(attributes);
}
