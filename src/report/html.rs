//! Shared document handling for reporters that produce HTML.

use crate::diagnostics;
use crate::html::Element;
use crate::record::{SentenceRecord, Source};
use crate::util;
use crate::Result;

use anyhow::{anyhow, bail, Context};
use std::fs;
use std::path::Path;

/// One HTML document per reporter instance.
///
/// Each reported sentence appends a titled section; the whole tree is
/// rewritten to `{report_path}.html` after every sentence. Sections are
/// never removed, so the file grows monotonically with the run.
#[derive(Debug)]
pub struct HtmlReport {
    report_path: String,
    root: Element,
}

impl HtmlReport {
    pub fn new(report_path: impl Into<String>) -> Self {
        let head = Element::new("head")
            .with_child(Element::new("meta").with_attr("charset", "UTF-8"))
            .with_child(Element::new("title").with_text("Translation Report"));
        let root = Element::new("html")
            .with_child(head)
            .with_child(Element::new("body"));
        Self {
            report_path: report_path.into(),
            root,
        }
    }

    /// Prefix used to derive the HTML and image file names.
    pub fn report_path(&self) -> &str {
        &self.report_path
    }

    /// Append a titled section for sentence `idx` and make it the target of
    /// subsequent per-sentence operations.
    pub fn start_sent(&mut self, idx: usize) -> Result<()> {
        let section = Element::new("div")
            .with_child(
                Element::new("h1").with_text(&format!("Translation Report for Sentence {idx}")),
            )
            .with_child(Element::new("div").with_attr("name", "main_content"));
        match self.root.child_mut(1) {
            Some(body) => {
                body.push_child(section);
                Ok(())
            }
            None => bail!("{}", diagnostics::error_message("report document has no body")),
        }
    }

    /// Append the source/output/reference text blocks to the current
    /// section and return the rendered source and target strings.
    ///
    /// The source block is omitted for non-textual sources (e.g. speech
    /// features); a missing output renders as an empty block with a
    /// warning.
    pub fn add_sent_in_out(&mut self, record: &SentenceRecord) -> Result<(String, String)> {
        let src_is_speech = matches!(&record.source, Some(Source::Features(_)));
        let src_str = match &record.source {
            Some(source) => source.joined(),
            None => String::new(),
        };
        let trg_str = match &record.output {
            Some(output) => output.clone(),
            None => {
                diagnostics::warn("record has no output sentence");
                String::new()
            }
        };

        let mut blocks: Vec<(&str, &str)> = Vec::new();
        if !src_is_speech {
            blocks.push(("Source Words", src_str.as_str()));
        }
        blocks.push(("Output Words", trg_str.as_str()));
        if let Some(reference) = &record.reference {
            blocks.push(("Reference Words", reference));
        }

        for (caption, text) in blocks {
            let block = Element::new("p")
                .with_child(Element::new("b").with_text(&format!("{caption}: ")))
                .with_child(Element::new("span").with_text(text));
            self.append_to_sent(block)?;
        }
        Ok((src_str, trg_str))
    }

    /// Append an element to the current sentence's content container.
    pub fn append_to_sent(&mut self, element: Element) -> Result<()> {
        self.content_mut()?.push_child(element);
        Ok(())
    }

    /// Insert an element at a fixed child position of the current
    /// sentence's content container; positions past the end append.
    pub fn insert_in_sent(&mut self, position: usize, element: Element) -> Result<()> {
        self.content_mut()?.insert_child(position, element);
        Ok(())
    }

    /// Serialize the entire accumulated document, pretty-printed.
    pub fn render(&self) -> String {
        let mut out = String::from("<!doctype html>\n");
        out.push_str(&self.root.to_html());
        out
    }

    /// Write the document to `{report_path}.html`, overwriting the previous
    /// file.
    pub fn write_html_tree(&self) -> Result<()> {
        let html_file = format!("{}.html", self.report_path);
        let path = Path::new(&html_file);
        util::make_parent_dir(path)?;
        fs::write(path, self.render()).with_context(|| format!("write report {}", html_file))?;
        Ok(())
    }

    fn content_mut(&mut self) -> Result<&mut Element> {
        self.root
            .child_mut(1)
            .and_then(Element::last_child_mut)
            .and_then(|section| section.child_mut(1))
            .ok_or_else(|| anyhow!(diagnostics::error_message("no open sentence section")))
    }
}
