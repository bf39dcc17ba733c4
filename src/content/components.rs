//! Custom components that may be embedded in post bodies by name
//!
//! A component tag is any HTML-looking tag whose name starts with an
//! uppercase letter (`<OldPost>`, `<WebGLFingerprint />`). Lowercase tags are
//! plain HTML and pass through untouched.

use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::Arc;

use super::CompileError;
use crate::helpers::html_escape;

lazy_static! {
    static ref COMPONENT_TAG: Regex =
        Regex::new(r#"<(/?)([A-Z][A-Za-z0-9]*)((?:\s+[A-Za-z_:][-A-Za-z0-9_:.]*(?:\s*=\s*(?:"[^"]*"|'[^']*'|\{[^}]*\}))?)*)\s*(/?)>"#)
            .unwrap();
    static ref ATTRIBUTE: Regex =
        Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|\{([^}]*)\}))?"#)
            .unwrap();
}

/// Attributes written on a component tag
pub type Props = IndexMap<String, String>;

/// Something that can stand in for a component tag in the rendered HTML
pub trait Component: Send + Sync {
    /// Markup emitted for the opening (or self-closing) tag
    fn open(&self, props: &Props) -> String;

    /// Markup emitted for the closing tag
    fn close(&self) -> String;
}

/// Component lookup table, keyed by tag name
#[derive(Clone)]
pub struct ComponentRegistry {
    components: HashMap<String, Arc<dyn Component>>,
}

impl ComponentRegistry {
    /// An empty registry; every component tag is an error
    pub fn empty() -> Self {
        Self {
            components: HashMap::new(),
        }
    }

    /// Register a component under `name`, replacing any previous one
    pub fn register<C: Component + 'static>(&mut self, name: &str, component: C) {
        self.components.insert(name.to_string(), Arc::new(component));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.components.contains_key(name)
    }

    /// Replace every component tag in an HTML fragment
    pub fn expand(&self, html: &str) -> Result<String, CompileError> {
        let mut missing = None;
        let expanded = COMPONENT_TAG.replace_all(html, |caps: &Captures| {
            let name = &caps[2];
            let Some(component) = self.components.get(name) else {
                missing.get_or_insert_with(|| name.to_string());
                return String::new();
            };

            if !caps[1].is_empty() {
                return component.close();
            }

            let props = parse_props(&caps[3]);
            if caps[4].is_empty() {
                component.open(&props)
            } else {
                format!("{}{}", component.open(&props), component.close())
            }
        });

        match missing {
            Some(name) => Err(CompileError::UnknownComponent(name)),
            None => Ok(expanded.into_owned()),
        }
    }
}

impl Default for ComponentRegistry {
    /// The components the blog ships with
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register("WebGLFingerprint", WebGlFingerprint);
        registry.register("OldPost", OldPost);
        registry
    }
}

fn parse_props(raw: &str) -> Props {
    ATTRIBUTE
        .captures_iter(raw)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| m.as_str().trim().trim_matches(['"', '\'']).to_string())
                .unwrap_or_else(|| "true".to_string());
            (caps[1].to_string(), value)
        })
        .collect()
}

fn data_attributes(props: &Props) -> String {
    props
        .iter()
        .map(|(key, value)| format!(r#" data-{}="{}""#, key.to_lowercase(), html_escape(value)))
        .collect()
}

/// Mount point for the WebGL fingerprint demo; the script fills it in
pub struct WebGlFingerprint;

impl Component for WebGlFingerprint {
    fn open(&self, props: &Props) -> String {
        format!(
            r#"<div class="webgl-fingerprint" data-component="WebGLFingerprint"{}><noscript>This demo needs JavaScript and WebGL.</noscript>"#,
            data_attributes(props)
        )
    }

    fn close(&self) -> String {
        "</div>".to_string()
    }
}

/// Notice wrapped around posts that are kept for posterity
pub struct OldPost;

impl Component for OldPost {
    fn open(&self, props: &Props) -> String {
        format!(
            r#"<aside class="old-post" data-component="OldPost"{}><p>This is an old post. Things might have changed since it was written.</p>"#,
            data_attributes(props)
        )
    }

    fn close(&self) -> String {
        "</aside>".to_string()
    }
}
