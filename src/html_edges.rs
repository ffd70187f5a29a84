//! Edge extraction for HTML files.
//!
//! Markup is a second edge source: custom-element and attribute selectors
//! pull in component/directive files, pipe names appearing in binding
//! expressions pull in pipe files, `@load(...)` directives in element
//! text pull in scripts, and stylesheet links pull in CSS files.
//!
//! Parsing is lenient (html5ever, no schema validation). html5ever
//! lowercases tag and attribute names, so selectors are lowercased at
//! comparison time. Binding attributes (`[prop]`, `(event)`) are
//! normalized to their unwrapped form when the per-element index is
//! built, which unifies bound and unbound attributes for matching.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::angular::{FrameworkInfo, FrameworkMap};
use crate::context::{Context, CSS_HREF_PREFIX, CSS_REROOT};
use crate::error::Error;
use crate::resolve::ImportResolver;

/// One element of the parsed document, in document order.
struct ElementEntry {
    tag: String,
    /// (normalized name, value) in source order.
    attrs: Vec<(String, String)>,
    /// Concatenated direct text children.
    text: String,
}

/// Strip one layer of binding brackets from an attribute name.
fn normalize_attr_name(name: &str) -> &str {
    if (name.starts_with('[') && name.ends_with(']'))
        || (name.starts_with('(') && name.ends_with(')'))
    {
        &name[1..name.len() - 1]
    } else {
        name
    }
}

fn collect_elements(handle: &Handle, out: &mut Vec<ElementEntry>) {
    for child in handle.children.borrow().iter() {
        if let NodeData::Element { name, attrs, .. } = &child.data {
            let mut entry = ElementEntry {
                tag: name.local.to_string(),
                attrs: Vec::new(),
                text: String::new(),
            };
            for attr in attrs.borrow().iter() {
                let raw = attr.name.local.to_string();
                entry
                    .attrs
                    .push((normalize_attr_name(&raw).to_string(), attr.value.to_string()));
            }
            for grandchild in child.children.borrow().iter() {
                if let NodeData::Text { contents } = &grandchild.data {
                    entry.text.push_str(&contents.borrow());
                }
            }
            out.push(entry);
        }
        collect_elements(child, out);
    }
}

fn push_unique(edges: &mut Vec<String>, target: String) {
    if !edges.contains(&target) {
        edges.push(target);
    }
}

fn parse_elements(rel_path: &str, source: &str) -> Result<Vec<ElementEntry>, Error> {
    let dom = parse_document(RcDom::default(), Default::default())
        .from_utf8()
        .read_from(&mut source.as_bytes())
        .map_err(|e| Error::SourceParse {
            file: rel_path.to_string(),
            message: e.to_string(),
        })?;
    let mut elements = Vec::new();
    collect_elements(&dom.document, &mut elements);
    Ok(elements)
}

/// Whether the document contains an element matching a component or
/// directive selector: `[attr]` selectors test normalized attribute
/// presence, anything else tests the tag name.
fn selector_matches(elements: &[ElementEntry], selector: &str) -> bool {
    let selector = selector.trim().to_ascii_lowercase();
    if let Some(attr_name) = selector
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
    {
        elements
            .iter()
            .any(|e| e.attrs.iter().any(|(name, _)| name == attr_name))
    } else {
        elements.iter().any(|e| e.tag == selector)
    }
}

/// A string references a pipe iff it contains both a `|` character and
/// the pipe's name.
fn pipe_referenced(elements: &[ElementEntry], name: &str) -> bool {
    let hit = |s: &str| s.contains('|') && s.contains(name);
    elements
        .iter()
        .any(|e| hit(&e.text) || e.attrs.iter().any(|(_, value)| hit(value)))
}

/// Extract the first comma-separated argument between the first `(` and
/// its matching `)`, with one layer of quotes stripped.
fn load_directive_argument(line: &str) -> Option<&str> {
    let open = line.find('(')?;
    let mut depth = 0usize;
    let mut close = None;
    for (i, c) in line[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(open + i);
                    break;
                }
            }
            _ => {}
        }
    }
    let inner = &line[open + 1..close?];
    let first = inner.split(',').next()?.trim();
    let first = first
        .strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| first.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
        .unwrap_or(first);
    if first.is_empty() {
        None
    } else {
        Some(first)
    }
}

/// Extract the ordered, deduplicated outgoing edges of one HTML file.
///
/// `files` is the full tracked-file list in discovery order; it fixes the
/// iteration order over the framework map so output is deterministic.
pub fn extract_html_edges(
    rel_path: &str,
    source: &str,
    ctx: &Context,
    resolver: &ImportResolver<'_>,
    files: &[String],
    framework: &FrameworkMap,
) -> Result<Vec<String>, Error> {
    let elements = parse_elements(rel_path, source)?;
    let mut edges: Vec<String> = Vec::new();

    // Selector edges, in discovery order of the declaring files.
    for file in files {
        if file == rel_path {
            continue;
        }
        let Some(infos) = framework.get(file) else {
            continue;
        };
        for info in infos {
            let matched = match info {
                FrameworkInfo::Component {
                    selector: Some(s), ..
                }
                | FrameworkInfo::Directive {
                    selector: Some(s), ..
                } => selector_matches(&elements, s),
                FrameworkInfo::Pipe {
                    selector: Some(s), ..
                } => pipe_referenced(&elements, s),
                _ => false,
            };
            if matched {
                push_unique(&mut edges, file.clone());
                break;
            }
        }
    }

    // @load directives in element text.
    for element in &elements {
        for line in element.text.lines() {
            if !line.contains("@load") {
                continue;
            }
            let Some(argument) = load_directive_argument(line) else {
                continue;
            };
            let Some(target) = resolver.resolve(argument, rel_path) else {
                continue;
            };
            if ctx.file_exists(&target) {
                push_unique(&mut edges, target);
            } else if [".ts", ".js", ".html", ".css"]
                .iter()
                .any(|ext| target.ends_with(ext))
            {
                return Err(Error::MissingModule {
                    target,
                    from: rel_path.to_string(),
                    specifier: argument.to_string(),
                });
            }
        }
    }

    // Stylesheet links.
    for element in &elements {
        if element.tag != "link" && element.tag != "preload" {
            continue;
        }
        let Some((_, href)) = element.attrs.iter().find(|(name, _)| name == "href") else {
            continue;
        };
        if !href.ends_with(".css") || !href.starts_with(CSS_HREF_PREFIX) {
            continue;
        }
        let target = format!("{CSS_REROOT}{href}");
        if !ctx.file_exists(&target) {
            return Err(Error::MissingStylesheet {
                target,
                from: rel_path.to_string(),
            });
        }
        push_unique(&mut edges, target);
    }

    Ok(edges)
}
