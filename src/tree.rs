//! Classified tree: folders and pages with resolved prefixes.
//!
//! The builder walks the raw TOC top-down, classifies every node via
//! [`crate::classify`] and assembles the classified tree. Skipped nodes are
//! omitted together with their subtree, and folders whose subtree ends up
//! without any page are pruned as well. Page numbers and folder spans are
//! stamped afterwards by [`crate::index`].

use crate::classify::{self, ClassifyCtx, FolderOutcome, PageOutcome};
use crate::error::{AipError, Result};
use crate::types::{content_id, RawNode, TocDocument};

/// Inclusive page-number range of a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub first: usize,
    pub last: usize,
}

/// A node of the classified tree.
#[derive(Debug, Clone)]
pub enum TocNode {
    Folder(TocFolder),
    Page(TocPage),
}

/// A folder of the classified tree.
#[derive(Debug, Clone)]
pub struct TocFolder {
    pub name: String,
    pub href: String,
    /// Space-joined path. Transparent folders (and the root) carry none.
    pub prefix: Option<String>,
    pub title: Option<String>,
    /// Page-number range, stamped after numbering.
    pub span: Option<Span>,
    pub children: Vec<TocNode>,
}

/// A page of the classified tree.
#[derive(Debug, Clone, PartialEq)]
pub struct TocPage {
    pub name: String,
    pub href: String,
    /// Stable identity of the underlying artifact, derived from `href`.
    pub content_id: String,
    /// Structural breadcrumb, e.g. `["AD", "2", "EDDC", "4"]`.
    pub path: Vec<String>,
    /// Space-joined path, the lookup key.
    pub prefix: String,
    pub title: Option<String>,
    /// Physical sheet side, with subpage letters folded in.
    pub odd: bool,
    /// Document-order number, stamped after numbering.
    pub number: usize,
}

/// Running state while walking the raw tree in document order.
///
/// A page with a subpage letter is only valid directly behind its base: the
/// previous page must share the stem (path without the letter) and carry the
/// preceding letter, with the bare base page counting as letter index zero.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LastPage {
    stem: String,
    subpage: u32,
}

struct Builder {
    last: Option<LastPage>,
}

impl Builder {
    fn build_node(&mut self, node: &RawNode, ctx: &ClassifyCtx<'_>) -> Result<Option<TocNode>> {
        if node.is_folder() {
            self.build_folder(node, ctx)
        } else {
            self.build_page(node, ctx)
        }
    }

    fn build_folder(&mut self, node: &RawNode, ctx: &ClassifyCtx<'_>) -> Result<Option<TocNode>> {
        let (path, prefix, title) = match classify::classify_folder(node, ctx)? {
            FolderOutcome::Skip => return Ok(None),
            FolderOutcome::Transparent => (ctx.path.to_vec(), None, None),
            FolderOutcome::Resolved { components, title } => {
                let mut path = ctx.path.to_vec();
                path.extend(components);
                let prefix = path.join(" ");
                (path, Some(prefix), title)
            }
        };

        let mut children = Vec::new();
        for child in node.folder.as_deref().unwrap_or_default() {
            let child_ctx = ClassifyCtx {
                aip_type: ctx.aip_type,
                path: &path,
            };
            if let Some(built) = self.build_node(child, &child_ctx)? {
                children.push(built);
            }
        }

        // Folders without any surviving page are dropped.
        if children.is_empty() {
            return Ok(None);
        }

        Ok(Some(TocNode::Folder(TocFolder {
            name: node.name.clone(),
            href: node.href.clone(),
            prefix,
            title,
            span: None,
            children,
        })))
    }

    fn build_page(&mut self, node: &RawNode, ctx: &ClassifyCtx<'_>) -> Result<Option<TocNode>> {
        let (components, number, subpage, title) = match classify::classify_page(node, ctx)? {
            PageOutcome::Skip => return Ok(None),
            PageOutcome::Resolved {
                components,
                number,
                subpage,
                title,
            } => (components, number, subpage, title),
        };

        let mut path = ctx.path.to_vec();
        path.extend(components);
        path.push(number.to_string());
        let stem = path.join(" ");

        let subpage_index = match subpage {
            None => None,
            Some(letter) => {
                let letter = letter.to_ascii_uppercase();
                let index = u32::from(letter) - u32::from('A') + 1;

                // Subpages hang off the back side of a sheet, so the base
                // page number must be even, and the letters must run without
                // gaps directly behind their base.
                let preceding = self.last.as_ref().filter(|l| l.stem == stem);
                if number % 2 != 0 || preceding.is_none_or(|l| l.subpage + 1 != index) {
                    return Err(AipError::SubpageOrder {
                        name: node.name.clone(),
                        path: ctx.path.join(" "),
                    });
                }

                Some(index)
            }
        };

        if let Some(letter) = subpage {
            if let Some(last) = path.last_mut() {
                last.push(letter.to_ascii_uppercase());
            }
        }
        let prefix = path.join(" ");

        let odd = match subpage_index {
            None => number % 2 == 1,
            Some(index) => index % 2 == 1,
        };

        self.last = Some(LastPage {
            stem,
            subpage: subpage_index.unwrap_or(0),
        });

        Ok(Some(TocNode::Page(TocPage {
            name: node.name.clone(),
            href: node.href.clone(),
            content_id: content_id(&node.href),
            path,
            prefix,
            title,
            odd,
            number: 0,
        })))
    }
}

/// Build the classified tree for a cached TOC document.
///
/// # Errors
/// Returns [`AipError::Structural`] when a label matches no classification
/// rule and [`AipError::SubpageOrder`] when a subpage letter appears out of
/// sequence.
pub fn build(doc: &TocDocument) -> Result<TocFolder> {
    let mut builder = Builder { last: None };
    let path: Vec<String> = Vec::new();

    let mut children = Vec::new();
    for child in &doc.folder {
        let ctx = ClassifyCtx {
            aip_type: doc.aip_type,
            path: &path,
        };
        if let Some(built) = builder.build_node(child, &ctx)? {
            children.push(built);
        }
    }

    Ok(TocFolder {
        name: doc.name.clone().unwrap_or_else(|| doc.aip_type.to_string()),
        href: doc.href.clone(),
        prefix: None,
        title: None,
        span: None,
        children,
    })
}
