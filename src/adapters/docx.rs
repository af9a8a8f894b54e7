//! `{{ placeholder }}` substitution inside DOCX packages.

use crate::domain::model::TransformedContext;
use crate::domain::ports::TemplateEngine;
use crate::utils::error::{DocsError, Result};
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::io::{Cursor, Read, Write};
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

pub struct DocxTemplate {
    /// A marker whose braces or name were split across Word runs.
    split_marker: Regex,
    markup: Regex,
    placeholder: Regex,
    /// Any `{{ … }}` or `{% … %}` tag, supported or not.
    any_tag: Regex,
    plain_placeholder: Regex,
    templated_part: Regex,
}

impl DocxTemplate {
    pub fn new() -> Result<Self> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|e| DocsError::RenderError {
                message: format!("invalid placeholder pattern: {}", e),
            })
        };

        Ok(Self {
            split_marker: compile(r"\{(?:<[^>]*>)*\{(?:[^{}<]|<[^>]*>)*?\}(?:<[^>]*>)*\}")?,
            markup: compile(r"<[^>]*>")?,
            placeholder: compile(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}")?,
            any_tag: compile(r"(?s)\{\{.*?\}\}|\{%.*?%\}")?,
            plain_placeholder: compile(r"^\{\{\s*[A-Za-z_][A-Za-z0-9_]*\s*\}\}$")?,
            templated_part: compile(r"^word/(document|header[0-9]*|footer[0-9]*)\.xml$")?,
        })
    }

    /// Pulls every marker back into a single run so the placeholder pattern
    /// can see it. Only markup between the outer braces is dropped.
    fn join_split_markers(&self, xml: &str) -> String {
        self.split_marker
            .replace_all(xml, |caps: &Captures<'_>| {
                self.markup.replace_all(&caps[0], "").into_owned()
            })
            .into_owned()
    }

    /// Names referenced by the part, in order of first appearance.
    pub fn placeholders(&self, xml: &str) -> Vec<String> {
        let joined = self.join_split_markers(xml);
        let mut seen = BTreeSet::new();
        self.placeholder
            .captures_iter(&joined)
            .map(|caps| caps[1].to_string())
            .filter(|name| seen.insert(name.clone()))
            .collect()
    }

    /// Tags other than a bare `{{ name }}`: filters, expressions, control
    /// blocks. Returned without markup, in order of appearance.
    pub fn unsupported_tags(&self, xml: &str) -> Vec<String> {
        self.any_tag
            .find_iter(xml)
            .map(|m| self.markup.replace_all(m.as_str(), "").into_owned())
            .filter(|tag| !self.plain_placeholder.is_match(tag))
            .collect()
    }

    pub fn render_part(&self, xml: &str, context: &TransformedContext) -> Result<String> {
        let joined = self.join_split_markers(xml);

        let unsupported = self.unsupported_tags(&joined);
        if !unsupported.is_empty() {
            return Err(DocsError::RenderError {
                message: format!("template uses unsupported tag(s): {}", unsupported.join(", ")),
            });
        }

        let missing: Vec<String> = self
            .placeholders(&joined)
            .into_iter()
            .filter(|name| context.get(name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(DocsError::RenderError {
                message: format!("template references unknown field(s): {}", missing.join(", ")),
            });
        }

        Ok(self
            .placeholder
            .replace_all(&joined, |caps: &Captures<'_>| {
                escape_xml(context.get(&caps[1]).unwrap_or_default())
            })
            .into_owned())
    }
}

impl TemplateEngine for DocxTemplate {
    fn render(&self, template: &[u8], context: &TransformedContext) -> Result<Vec<u8>> {
        let mut archive = ZipArchive::new(Cursor::new(template)).map_err(|e| DocsError::RenderError {
            message: format!("template is not a DOCX package: {}", e),
        })?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let mut found_document = false;

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();
            let options = SimpleFileOptions::default().compression_method(entry.compression());

            if entry.is_dir() {
                writer.add_directory(name, options)?;
                continue;
            }

            let mut content = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut content)?;

            if self.templated_part.is_match(&name) {
                found_document |= name == "word/document.xml";
                let xml = String::from_utf8(content).map_err(|_| DocsError::RenderError {
                    message: format!("{} is not valid UTF-8", name),
                })?;
                content = self.render_part(&xml, context)?.into_bytes();
            }

            writer.start_file(name, options)?;
            writer.write_all(&content)?;
        }

        if !found_document {
            return Err(DocsError::RenderError {
                message: "template has no word/document.xml".to_string(),
            });
        }

        Ok(writer.finish()?.into_inner())
    }
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
