//! HTML to Markdown serialization.
//!
//! The serializer walks the parsed content fragment recursively and renders
//! each element through a closed set of rules. Standard elements (headings,
//! paragraphs, emphasis, lists, links, blockquotes) use the base conversion:
//! ATX headings, `-` bullets, `*` emphasis delimiters, fenced code blocks.
//! A small set of custom rules takes precedence for preformatted code,
//! inline code, images, tables, and admonition call-outs.
//!
//! Serialization is deterministic and never fails: unknown elements degrade
//! to their converted children.
//!
//! Markdown-metacharacter escaping is disabled by default. The content was
//! authored as HTML, and re-escaping produces visible backslashes in the
//! output; the escaping code stays available behind
//! [`SerializeConfig::escape_markdown`] so the trade-off is a configuration
//! choice.

use scraper::{ElementRef, Html, Node, Selector};

/// Configuration for Markdown serialization.
#[derive(Debug, Clone)]
pub struct SerializeConfig {
    /// Escape Markdown metacharacters in raw text (default: false).
    pub escape_markdown: bool,
    /// Marker for unordered list items (default: '-').
    pub bullet_marker: char,
}

impl Default for SerializeConfig {
    fn default() -> Self {
        Self { escape_markdown: false, bullet_marker: '-' }
    }
}

/// The closed set of rendering rules.
///
/// Every element maps to exactly one rule; [`Rule::Default`] covers the
/// base conversion and the generic passthrough for unknown elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    PreBlock,
    InlineCode,
    Image,
    Table,
    Admonition(AdmonitionKind),
    Default,
}

/// Call-out flavor, checked in precedence order: warning, tip, note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AdmonitionKind {
    Warning,
    Tip,
    Note,
}

impl AdmonitionKind {
    fn label(self) -> &'static str {
        match self {
            Self::Warning => "⚠️ WARNING",
            Self::Tip => "💡 TIP",
            Self::Note => "ℹ️ NOTE",
        }
    }
}

fn classify(el: ElementRef<'_>) -> Rule {
    match el.value().name() {
        "pre" => Rule::PreBlock,
        "code" => Rule::InlineCode,
        "img" => Rule::Image,
        "table" => Rule::Table,
        "div" => {
            let has = |class: &str| el.value().classes().any(|c| c == class);
            if has("warning") {
                Rule::Admonition(AdmonitionKind::Warning)
            } else if has("tip") {
                Rule::Admonition(AdmonitionKind::Tip)
            } else if has("note") {
                Rule::Admonition(AdmonitionKind::Note)
            } else {
                Rule::Default
            }
        }
        _ => Rule::Default,
    }
}

/// Converts extracted content HTML to Markdown.
///
/// # Example
///
/// ```rust
/// use pagemark_core::serialize::MarkdownSerializer;
///
/// let serializer = MarkdownSerializer::default();
/// let md = serializer.serialize("<h2>Setup</h2><p>Install the tool.</p>");
/// assert!(md.contains("## Setup"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MarkdownSerializer {
    config: SerializeConfig,
}

impl MarkdownSerializer {
    pub fn new(config: SerializeConfig) -> Self {
        Self { config }
    }

    /// Serializes a content HTML fragment to Markdown.
    ///
    /// Deterministic: the same input always produces the same output.
    pub fn serialize(&self, content_html: &str) -> String {
        let fragment = Html::parse_fragment(content_html);
        let body = self.render_children(fragment.root_element(), 0);
        body.trim().to_string()
    }

    fn render_children(&self, el: ElementRef<'_>, depth: usize) -> String {
        let mut out = String::new();
        for child in el.children() {
            match child.value() {
                Node::Text(text) => out.push_str(&self.render_text(text)),
                Node::Element(_) => {
                    if let Some(child_el) = ElementRef::wrap(child) {
                        out.push_str(&self.render_element(child_el, depth));
                    }
                }
                _ => {}
            }
        }
        out
    }

    fn render_text(&self, text: &str) -> String {
        let collapsed = collapse_whitespace(text);
        if self.config.escape_markdown { escape_markdown(&collapsed) } else { collapsed }
    }

    fn render_element(&self, el: ElementRef<'_>, depth: usize) -> String {
        match classify(el) {
            Rule::PreBlock => self.render_pre(el),
            Rule::InlineCode => render_inline_code(el),
            Rule::Image => render_image(el),
            Rule::Table => self.render_table(el),
            Rule::Admonition(kind) => self.render_admonition(el, kind),
            Rule::Default => self.render_default(el, depth),
        }
    }

    fn render_default(&self, el: ElementRef<'_>, depth: usize) -> String {
        match el.value().name() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let level = el.value().name()[1..].parse::<usize>().unwrap_or(1);
                let inline = self.render_children(el, depth);
                format!("\n\n{} {}\n\n", "#".repeat(level), inline.trim())
            }
            "p" => {
                let inline = self.render_children(el, depth);
                let inline = inline.trim();
                if inline.is_empty() { String::new() } else { format!("\n\n{}\n\n", inline) }
            }
            "br" => "\n".to_string(),
            "hr" => "\n\n---\n\n".to_string(),
            "strong" | "b" => wrap_inline(&self.render_children(el, depth), "**"),
            "em" | "i" => wrap_inline(&self.render_children(el, depth), "*"),
            "a" => {
                let text = self.render_children(el, depth);
                let text = text.trim();
                match el.value().attr("href") {
                    Some(href) if !text.is_empty() => format!("[{}]({})", text, href),
                    Some(href) => format!("[{}]({})", href, href),
                    None => text.to_string(),
                }
            }
            "ul" => self.render_list(el, depth, false),
            "ol" => self.render_list(el, depth, true),
            "blockquote" => {
                let inner = self.render_children(el, depth);
                format!("\n\n{}\n\n", prefix_lines(inner.trim(), "> "))
            }
            "script" | "style" | "head" | "title" | "template" => String::new(),
            _ => self.render_children(el, depth),
        }
    }

    fn render_list(&self, el: ElementRef<'_>, depth: usize, ordered: bool) -> String {
        let mut out = String::from("\n\n");
        let mut index = 1usize;

        for child in el.children() {
            let Some(item) = ElementRef::wrap(child) else { continue };
            if item.value().name() != "li" {
                continue;
            }

            let content = self.render_children(item, depth + 1);
            let marker = if ordered {
                format!("{}. ", index)
            } else {
                format!("{} ", self.config.bullet_marker)
            };
            index += 1;

            out.push_str(&"  ".repeat(depth));
            out.push_str(&marker);
            out.push_str(content.trim());
            out.push('\n');
        }

        out.push('\n');
        out
    }

    /// Renders a `pre` element as a fenced code block.
    ///
    /// A nested `code` element supplies the language via a `language-<word>`
    /// class; the fence, language tag, content, and closing fence each land
    /// on their own line.
    fn render_pre(&self, el: ElementRef<'_>) -> String {
        let code_el = Selector::parse("code")
            .ok()
            .and_then(|sel| el.select(&sel).next());

        let language = code_el
            .and_then(detect_language)
            .or_else(|| detect_language(el))
            .unwrap_or_default();

        let raw: String = match code_el {
            Some(code) => code.text().collect(),
            None => el.text().collect(),
        };
        let raw = raw.trim_end_matches('\n');

        format!("\n\n```{}\n{}\n```\n\n", language, raw)
    }

    /// Renders a table row by row.
    ///
    /// Each cell is serialized independently with embedded newlines
    /// collapsed to spaces; header cells are bolded. The first row is
    /// unconditionally treated as the header row and followed by a
    /// separator of `---|` per column with the trailing pipe trimmed.
    fn render_table(&self, el: ElementRef<'_>) -> String {
        let Ok(tr_selector) = Selector::parse("tr") else {
            return String::new();
        };

        let mut lines = Vec::new();
        for (row_index, row) in el.select(&tr_selector).enumerate() {
            let mut cells = Vec::new();
            for child in row.children() {
                let Some(cell) = ElementRef::wrap(child) else { continue };
                let tag = cell.value().name();
                if tag != "td" && tag != "th" {
                    continue;
                }

                let inner = self.render_children(cell, 0);
                let flat = flatten_cell(&inner);
                if tag == "th" && !flat.is_empty() {
                    cells.push(format!("**{}**", flat));
                } else {
                    cells.push(flat);
                }
            }

            if cells.is_empty() {
                continue;
            }

            let column_count = cells.len();
            lines.push(cells.join("|"));
            if row_index == 0 {
                let separator = "---|".repeat(column_count);
                lines.push(separator.trim_end_matches('|').to_string());
            }
        }

        if lines.is_empty() {
            return String::new();
        }
        format!("\n\n{}\n\n", lines.join("\n"))
    }

    fn render_admonition(&self, el: ElementRef<'_>, kind: AdmonitionKind) -> String {
        let inner = self.render_children(el, 0);
        let body = prefix_lines(inner.trim(), "> ");
        format!("\n\n> **{}**\n{}\n\n", kind.label(), body)
    }
}

/// Renders an inline `code` element.
///
/// The raw text content is used as-is, without recursive conversion, so
/// markup-looking code is not double-processed.
fn render_inline_code(el: ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    format!("`{}`", raw)
}

fn render_image(el: ElementRef<'_>) -> String {
    let alt = el.value().attr("alt").unwrap_or_default();
    let src = el.value().attr("src").unwrap_or_default();
    format!("![{}]({})", alt, src)
}

/// Detects a code-block language from a `language-<word>` class.
fn detect_language(el: ElementRef<'_>) -> Option<String> {
    el.value().classes().find_map(|class| {
        let word = class.strip_prefix("language-")?;
        if !word.is_empty() && word.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-') {
            Some(word.to_string())
        } else {
            None
        }
    })
}

/// Collapses whitespace runs to single spaces, preserving a single leading
/// or trailing space so words at element boundaries stay separated.
///
/// Whitespace-only nodes containing a newline are formatting between block
/// elements and vanish; a plain space between inline elements survives.
fn collapse_whitespace(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return if text.is_empty() || text.contains('\n') { String::new() } else { " ".to_string() };
    }

    let mut result = String::with_capacity(collapsed.len() + 2);
    if text.starts_with(|c: char| c.is_whitespace()) {
        result.push(' ');
    }
    result.push_str(&collapsed);
    if text.ends_with(|c: char| c.is_whitespace()) {
        result.push(' ');
    }
    result
}

/// Collapses a serialized cell to a single line.
fn flatten_cell(content: &str) -> String {
    content.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn wrap_inline(content: &str, delimiter: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{}{}{}", delimiter, trimmed, delimiter)
    }
}

/// Prefixes every line of `content`; blank lines get the bare prefix with
/// trailing whitespace trimmed.
fn prefix_lines(content: &str, prefix: &str) -> String {
    content
        .lines()
        .map(|line| {
            if line.trim().is_empty() {
                prefix.trim_end().to_string()
            } else {
                format!("{}{}", prefix, line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escapes Markdown metacharacters in raw text.
///
/// Only used when [`SerializeConfig::escape_markdown`] is enabled.
fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '`' | '*' | '_' | '#' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
