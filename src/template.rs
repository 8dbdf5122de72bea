//! HTML manual templates.
//!
//! Templates carry `{{ name }}` placeholders which are filled from a typed
//! slot table in one pass. Substituted content is never scanned again, so a
//! fragment may itself contain `{{` without being expanded.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::ops::Range;
use std::path::Path;
use std::sync::LazyLock;

use log::{debug, warn};
use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.\-]+)\s*\}\}").unwrap());

/// Slot contents for a manual, keyed by placeholder name
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManualContent {
    #[serde(default)]
    pub slots: BTreeMap<String, String>,
}

impl ManualContent {
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(Error::Content)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_toml(&content)
    }
}

#[derive(Debug, Clone)]
struct Placeholder {
    name: String,
    span: Range<usize>,
}

/// A parsed template
#[derive(Debug, Clone)]
pub struct Template {
    text: String,
    placeholders: Vec<Placeholder>,
}

impl Template {
    pub fn parse(text: impl Into<String>) -> Self {
        let text = text.into();
        let placeholders = PLACEHOLDER
            .captures_iter(&text)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(Placeholder {
                    name: caps[1].to_string(),
                    span: whole.range(),
                })
            })
            .collect();
        Self { text, placeholders }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::parse(text))
    }

    /// Distinct placeholder names, sorted.
    pub fn slot_names(&self) -> BTreeSet<&str> {
        self.placeholders.iter().map(|p| p.name.as_str()).collect()
    }

    /// Fill every placeholder. A placeholder without content is an error;
    /// content nobody asked for is only reported.
    pub fn render(&self, content: &ManualContent) -> Result<String> {
        let mut out = String::with_capacity(self.text.len());
        let mut last = 0;

        for placeholder in &self.placeholders {
            let value = content.slots.get(&placeholder.name).ok_or_else(|| {
                Error::MissingSlot {
                    name: placeholder.name.clone(),
                }
            })?;
            out.push_str(&self.text[last..placeholder.span.start]);
            out.push_str(value);
            last = placeholder.span.end;
        }
        out.push_str(&self.text[last..]);

        let used = self.slot_names();
        for name in content.slots.keys() {
            if !used.contains(name.as_str()) {
                warn!("slot `{name}` is not used by the template");
            }
        }
        debug!(
            "filled {} placeholders from {} slots",
            self.placeholders.len(),
            content.slots.len()
        );

        Ok(out)
    }
}
