//! Rich-text editor configuration.
//!
//! The admin page renders a `contenteditable` surface whose toolbar is built
//! from [`EditorConfig::toolbar`]. Each button carries the command name that
//! `static/editor.js` dispatches to the browser's editing API. The same
//! extension set drives [`EditorConfig::sanitizer`], so stored HTML can be
//! reduced to exactly the markup the editor is able to produce.

use std::{
    borrow::Cow,
    collections::{HashMap, HashSet},
};

use ammonia::Builder;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlignment {
    Left,
    Center,
    Right,
}

impl TextAlignment {
    pub fn as_str(self) -> &'static str {
        match self {
            TextAlignment::Left => "left",
            TextAlignment::Center => "center",
            TextAlignment::Right => "right",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorExtension {
    Heading { levels: Vec<u8> },
    Bold,
    Italic,
    TextAlign { alignments: Vec<TextAlignment> },
    Image,
    CodeBlock,
}

/// One toolbar button. `command` and `value` are passed through to the
/// client script verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarButton {
    pub command: &'static str,
    pub value: Option<String>,
    pub label: String,
    pub title: String,
}

impl ToolbarButton {
    fn new(command: &'static str, label: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            command,
            value: None,
            label: label.into(),
            title: title.into(),
        }
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct EditorConfig {
    extensions: Vec<EditorExtension>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            extensions: vec![
                EditorExtension::Heading {
                    levels: vec![1, 2, 3],
                },
                EditorExtension::Bold,
                EditorExtension::Italic,
                EditorExtension::TextAlign {
                    alignments: vec![
                        TextAlignment::Left,
                        TextAlignment::Center,
                        TextAlignment::Right,
                    ],
                },
                EditorExtension::Image,
                EditorExtension::CodeBlock,
            ],
        }
    }
}

impl EditorConfig {
    pub fn new(extensions: Vec<EditorExtension>) -> Self {
        Self { extensions }
    }

    pub fn toolbar(&self) -> Vec<ToolbarButton> {
        let mut buttons = vec![ToolbarButton::new("paragraph", "P", "Paragraph")];
        for extension in &self.extensions {
            match extension {
                EditorExtension::Heading { levels } => {
                    buttons.extend(levels.iter().map(|level| {
                        ToolbarButton::new("heading", format!("H{level}"), format!("Heading {level}"))
                            .with_value(format!("h{level}"))
                    }));
                }
                EditorExtension::Bold => buttons.push(ToolbarButton::new("bold", "B", "Bold")),
                EditorExtension::Italic => {
                    buttons.push(ToolbarButton::new("italic", "I", "Italic"))
                }
                EditorExtension::TextAlign { alignments } => {
                    buttons.extend(alignments.iter().map(|alignment| {
                        let name = alignment.as_str();
                        ToolbarButton::new("align", align_label(*alignment), format!("Align {name}"))
                            .with_value(name)
                    }));
                }
                EditorExtension::Image => {
                    buttons.push(ToolbarButton::new("image", "Img", "Insert image"))
                }
                EditorExtension::CodeBlock => {
                    buttons.push(ToolbarButton::new("codeBlock", "</>", "Code block"))
                }
            }
        }
        buttons
    }

    /// Tags the configured extensions can emit.
    pub fn allowed_tags(&self) -> HashSet<&'static str> {
        let mut tags: HashSet<&'static str> = HashSet::from(["p", "br", "div", "span"]);
        for extension in &self.extensions {
            match extension {
                EditorExtension::Heading { levels } => {
                    tags.extend(levels.iter().filter_map(|level| heading_tag(*level)));
                }
                EditorExtension::Bold => tags.extend(["strong", "b"]),
                EditorExtension::Italic => tags.extend(["em", "i"]),
                EditorExtension::TextAlign { .. } => {}
                EditorExtension::Image => {
                    tags.insert("img");
                }
                EditorExtension::CodeBlock => tags.extend(["pre", "code"]),
            }
        }
        tags
    }

    fn allows_alignment(&self) -> bool {
        self.extensions
            .iter()
            .any(|extension| matches!(extension, EditorExtension::TextAlign { .. }))
    }

    /// HTML cleaner restricted to the editor's output.
    pub fn sanitizer(&self) -> Builder<'static> {
        let tags = self.allowed_tags();
        let mut tag_attributes: HashMap<&'static str, HashSet<&'static str>> = HashMap::new();
        if tags.contains("img") {
            tag_attributes.insert("img", HashSet::from(["src", "alt", "title"]));
        }
        if self.allows_alignment() {
            for tag in tags.iter().copied().filter(|tag| is_block(tag)) {
                tag_attributes.entry(tag).or_default().insert("style");
            }
        }

        let mut builder = Builder::empty();
        builder
            .tags(tags)
            .clean_content_tags(HashSet::from(["script", "style"]))
            .tag_attributes(tag_attributes)
            .url_schemes(HashSet::from(["http", "https"]))
            .attribute_filter(|_, attribute, value| {
                if attribute != "style" {
                    return Some(Cow::Borrowed(value));
                }
                alignment_style(value).map(Cow::Owned)
            });
        builder
    }

    pub fn sanitize(&self, html: &str) -> String {
        self.sanitizer().clean(html).to_string()
    }
}

fn heading_tag(level: u8) -> Option<&'static str> {
    match level {
        1 => Some("h1"),
        2 => Some("h2"),
        3 => Some("h3"),
        4 => Some("h4"),
        5 => Some("h5"),
        6 => Some("h6"),
        _ => None,
    }
}

fn is_block(tag: &str) -> bool {
    matches!(tag, "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6")
}

fn align_label(alignment: TextAlignment) -> &'static str {
    match alignment {
        TextAlignment::Left => "⇤",
        TextAlignment::Center => "↔",
        TextAlignment::Right => "⇥",
    }
}

/// Keep only a `text-align` declaration from an inline style.
fn alignment_style(style: &str) -> Option<String> {
    style.split(';').find_map(|declaration| {
        let (property, value) = declaration.split_once(':')?;
        if !property.trim().eq_ignore_ascii_case("text-align") {
            return None;
        }
        let value = value.trim().to_ascii_lowercase();
        matches!(value.as_str(), "left" | "center" | "right" | "justify")
            .then(|| format!("text-align: {value}"))
    })
}
