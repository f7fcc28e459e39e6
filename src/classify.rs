//! Label classification: ordered rule tables.
//!
//! Every raw TOC node is classified by its label and structural path into an
//! identity fragment (path components plus optional title, and for pages the
//! local page number). The rules live in two explicit ordered tables, one
//! for folders and one for pages, evaluated top to bottom with the first
//! match winning. A label no rule recognizes is a fatal [`AipError::Structural`]:
//! an unrecognized label means the structural model is stale, and silently
//! guessing would corrupt the numbering.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::error::{AipError, Result};
use crate::types::{AipType, RawNode};

/// Context handed to rule predicates and extractors.
#[derive(Debug, Clone, Copy)]
pub struct ClassifyCtx<'a> {
    /// AIP flavor of the tree being classified.
    pub aip_type: AipType,
    /// Path accumulated above this node (empty at chapter level).
    pub path: &'a [String],
}

impl ClassifyCtx<'_> {
    fn structural(&self, node: &RawNode) -> AipError {
        AipError::Structural {
            name: node.name.clone(),
            path: self.path.join(" "),
        }
    }
}

/// Classification result for a folder node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderOutcome {
    /// The folder contributes the given path components.
    Resolved {
        components: Vec<String>,
        title: Option<String>,
    },
    /// The folder stays in the tree but contributes no path component;
    /// its children classify under the parent path.
    Transparent,
    /// The folder and its whole subtree are omitted.
    Skip,
}

/// Classification result for a page node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageOutcome {
    /// The page resolves to a local page number (plus optional extra
    /// components preceding it in the path).
    Resolved {
        components: Vec<String>,
        number: u32,
        subpage: Option<char>,
        title: Option<String>,
    },
    /// The page is omitted.
    Skip,
}

type FolderExtract = fn(&RawNode, &Captures<'_>, &ClassifyCtx<'_>) -> Result<FolderOutcome>;
type PageExtract = fn(&RawNode, &Captures<'_>, &ClassifyCtx<'_>) -> Result<PageOutcome>;

struct FolderRule {
    applies: fn(&ClassifyCtx<'_>) -> bool,
    pattern: Regex,
    extract: FolderExtract,
}

struct PageRule {
    applies: fn(&ClassifyCtx<'_>) -> bool,
    pattern: Regex,
    extract: PageExtract,
}

#[allow(clippy::expect_used)] // Static rule patterns that are guaranteed to be valid
fn rx(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid rule pattern")
}

fn path_is(path: &[String], parts: &[&str]) -> bool {
    path.len() == parts.len() && path.iter().zip(parts).all(|(a, b)| a == b)
}

fn cap(c: &Captures<'_>, i: usize) -> Option<String> {
    c.get(i).map(|m| m.as_str().to_string())
}

fn cap_char(c: &Captures<'_>, i: usize) -> Option<char> {
    c.get(i).and_then(|m| m.as_str().chars().next())
}

fn cap_num(c: &Captures<'_>, i: usize, node: &RawNode, ctx: &ClassifyCtx<'_>) -> Result<u32> {
    c.get(i)
        .and_then(|m| m.as_str().parse().ok())
        .ok_or_else(|| ctx.structural(node))
}

fn folder(components: Vec<String>, title: Option<String>) -> Result<FolderOutcome> {
    Ok(FolderOutcome::Resolved { components, title })
}

/// Ordered folder rule table.
///
/// Mirrors the published navigation structure: chapter roots, section
/// numbers, the IFR dot-style subsection scheme, chart folders, register
/// entries and the two circular/supplement families.
static FOLDER_RULES: LazyLock<Vec<FolderRule>> = LazyLock::new(|| {
    vec![
        // Chapter roots.
        FolderRule {
            applies: |ctx| ctx.path.is_empty(),
            pattern: rx(r"^(GEN|ENR|AD|HEL AD|AIC|SUP)( (.+))?$"),
            extract: |_, c, _| folder(vec![cap(c, 1).unwrap_or_default()], cap(c, 3)),
        },
        // Section numbers directly below a chapter.
        FolderRule {
            applies: |ctx| {
                path_is(ctx.path, &["GEN"])
                    || path_is(ctx.path, &["ENR"])
                    || path_is(ctx.path, &["AD"])
                    || path_is(ctx.path, &["HEL AD"])
            },
            pattern: rx(r"^(GEN|ENR|AD|HEL AD) ([0-9])( (.+))?$"),
            extract: |_, c, _| folder(vec![cap(c, 2).unwrap_or_default()], cap(c, 4)),
        },
        // IFR subsection numbers (dot style, e.g. "GEN 1.2 ...").
        FolderRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Ifr
                    && ctx.path.len() == 2
                    && matches!(ctx.path[0].as_str(), "GEN" | "ENR" | "AD")
            },
            pattern: rx(r"^(GEN|ENR|AD) [0-9]\.([0-9]+)( (.+))?$"),
            extract: |_, c, _| folder(vec![cap(c, 2).unwrap_or_default()], cap(c, 4)),
        },
        // The VFR set hard-links its enroute charts to the IFR section.
        FolderRule {
            applies: |ctx| ctx.aip_type == AipType::Vfr && path_is(ctx.path, &["ENR"]),
            pattern: rx(r"^ENR Enroute Charts siehe AIP IFR"),
            extract: |_, _, _| folder(vec!["6".to_string()], Some("Streckenkarte".to_string())),
        },
        // Enroute chart folders below ENR 6.
        FolderRule {
            applies: |ctx| path_is(ctx.path, &["ENR", "6"]),
            pattern: rx(r"Streckenkarte Oberer Luftraum$"),
            extract: |n, _, _| folder(vec!["UPPER".to_string()], Some(n.name.clone())),
        },
        FolderRule {
            applies: |ctx| path_is(ctx.path, &["ENR", "6"]),
            pattern: rx(r"Streckenkarte Unterer Luftraum$"),
            extract: |n, _, _| folder(vec!["LOWER".to_string()], Some(n.name.clone())),
        },
        FolderRule {
            applies: |ctx| path_is(ctx.path, &["ENR", "6"]),
            pattern: rx(r"Streckenkarte - Kursführungsmindesthöhenkarte$"),
            extract: |n, _, _| folder(vec!["MVA".to_string()], Some(n.name.clone())),
        },
        // Alphabetic register entries in the VFR airfield navigation.
        FolderRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Vfr
                    && (path_is(ctx.path, &["AD"]) || path_is(ctx.path, &["HEL AD"]))
            },
            pattern: rx(r"^[A-Z](-[A-Z])?$"),
            extract: |_, _, _| Ok(FolderOutcome::Skip),
        },
        // Airfields with an ICAO locator.
        FolderRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Vfr
                    && (path_is(ctx.path, &["AD"]) || path_is(ctx.path, &["HEL AD"]))
            },
            pattern: rx(r"^(.+) (E[DT][A-Z][A-Z])"),
            extract: |_, c, _| folder(vec![cap(c, 2).unwrap_or_default()], cap(c, 1)),
        },
        // Airfields without an ICAO locator.
        FolderRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Vfr
                    && (path_is(ctx.path, &["AD"]) || path_is(ctx.path, &["HEL AD"]))
            },
            pattern: rx(r"^.+$"),
            extract: |n, _, _| folder(vec![n.name.clone()], Some(n.name.clone())),
        },
        // Military aerodrome sections in the IFR set.
        FolderRule {
            applies: |ctx| ctx.aip_type == AipType::Ifr && path_is(ctx.path, &["AD"]),
            pattern: rx(r"^MIL-AD ([0-9])( (.+))?$"),
            extract: |_, c, _| {
                folder(
                    vec!["MIL".to_string(), cap(c, 1).unwrap_or_default()],
                    cap(c, 3),
                )
            },
        },
        // Redundant "MIL-AD" wrapper folder below AD MIL 1.
        FolderRule {
            applies: |ctx| ctx.aip_type == AipType::Ifr && path_is(ctx.path, &["AD", "MIL", "1"]),
            pattern: rx(r"^MIL-AD$"),
            extract: |_, _, _| Ok(FolderOutcome::Transparent),
        },
        // IFR approach chart folders: the ICAO locator is not part of the
        // folder label, it has to be taken from the first child.
        FolderRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Ifr
                    && (path_is(ctx.path, &["AD", "2"])
                        || path_is(ctx.path, &["AD", "3"])
                        || path_is(ctx.path, &["AD", "MIL", "2"]))
            },
            pattern: rx(r"^.*$"),
            extract: |n, _, ctx| {
                let locator = n
                    .folder
                    .as_deref()
                    .and_then(|children| children.first())
                    .and_then(|child| child.name.split_whitespace().nth(2))
                    .ok_or_else(|| ctx.structural(n))?;
                folder(vec![locator.to_string()], Some(n.name.clone()))
            },
        },
        // Year registers in the circular navigation.
        FolderRule {
            applies: |ctx| path_is(ctx.path, &["AIC"]) || path_is(ctx.path, &["SUP"]),
            pattern: rx(r"^20[0-9][0-9]$"),
            extract: |_, _, _| Ok(FolderOutcome::Skip),
        },
        // Circulars (AIC).
        FolderRule {
            applies: |ctx| ctx.aip_type == AipType::Vfr && path_is(ctx.path, &["AIC"]),
            pattern: rx(r"^AIC Prüfliste$"),
            extract: |_, _, _| {
                folder(vec!["Liste".to_string()], Some("Prüfliste".to_string()))
            },
        },
        FolderRule {
            applies: |ctx| path_is(ctx.path, &["AIC"]),
            pattern: rx(r"^AIC ([0-9][0-9]/[0-9][0-9]) (.+)$"),
            extract: |_, c, _| folder(vec![cap(c, 1).unwrap_or_default()], cap(c, 2)),
        },
        // Supplements (SUP).
        FolderRule {
            applies: |ctx| ctx.aip_type == AipType::Vfr && path_is(ctx.path, &["SUP"]),
            pattern: rx(r"^SUP Liste der Ergänzungen$"),
            extract: |_, _, _| {
                folder(
                    vec!["Liste".to_string()],
                    Some("Liste der Ergänzungen".to_string()),
                )
            },
        },
        FolderRule {
            applies: |ctx| path_is(ctx.path, &["SUP"]),
            pattern: rx(r"^SUP ([0-9][0-9]/[0-9][0-9]) (.+)$"),
            extract: |_, c, _| folder(vec![cap(c, 1).unwrap_or_default()], cap(c, 2)),
        },
    ]
});

fn page(
    components: Vec<String>,
    number: u32,
    subpage: Option<char>,
    title: Option<String>,
) -> Result<PageOutcome> {
    Ok(PageOutcome::Resolved {
        components,
        number,
        subpage,
        title,
    })
}

/// Ordered page rule table.
static PAGE_RULES: LazyLock<Vec<PageRule>> = LazyLock::new(|| {
    vec![
        // VFR text pages ("GEN 2-14", "AD 1-7a Titel").
        PageRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Vfr
                    && ctx.path.len() == 2
                    && matches!(ctx.path[0].as_str(), "GEN" | "ENR" | "AD" | "HEL AD")
            },
            pattern: rx(r"^(GEN|ENR|AD|HEL AD) ([0-9])[-\.]([0-9]+)([A-Za-z])?( (.+))?$"),
            extract: |n, c, ctx| {
                // Directory pages (section 2) also show up below the chart
                // folders; only keep them in section 2 itself.
                if ctx.path[1] != "2" && c.get(2).map(|m| m.as_str()) == Some("2") {
                    return Ok(PageOutcome::Skip);
                }
                page(vec![], cap_num(c, 3, n, ctx)?, cap_char(c, 4), cap(c, 6))
            },
        },
        // Some VFR airfield pages lack the "AD 2" prefix ("5 Allstedt").
        PageRule {
            applies: |ctx| ctx.aip_type == AipType::Vfr && path_is(ctx.path, &["AD", "2"]),
            pattern: rx(r"^([0-9]+)([A-Za-z])? (.+)$"),
            extract: |n, c, ctx| page(vec![], cap_num(c, 1, n, ctx)?, cap_char(c, 2), cap(c, 3)),
        },
        // IFR text pages ("GEN 1.2-3", "ENR 2 1-14a").
        PageRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Ifr
                    && ctx.path.len() == 3
                    && matches!(ctx.path[0].as_str(), "GEN" | "ENR" | "AD")
            },
            pattern: rx(r"^(GEN|ENR|AD) [0-9][\. ][0-9]+[- ]([0-9]+)([A-Za-z])?( (.+))?$"),
            extract: |n, c, ctx| page(vec![], cap_num(c, 2, n, ctx)?, cap_char(c, 3), cap(c, 5)),
        },
        // IFR military text pages.
        PageRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Ifr
                    && ctx.path.len() == 3
                    && ctx.path[0] == "AD"
                    && ctx.path[1] == "MIL"
            },
            pattern: rx(r"^MIL-AD [0-9]-([0-9]+)([A-Za-z])?( (.+))?$"),
            extract: |n, c, ctx| page(vec![], cap_num(c, 1, n, ctx)?, cap_char(c, 2), cap(c, 4)),
        },
        // IFR route directory pages, grouped by route letter.
        PageRule {
            applies: |ctx| ctx.aip_type == AipType::Ifr && path_is(ctx.path, &["ENR", "3", "2"]),
            pattern: rx(r"^ENR 3\.2-([A-Z]+)-([0-9]+)([A-Za-z])?$"),
            extract: |n, c, ctx| {
                let route = cap(c, 1).unwrap_or_default();
                page(
                    vec![route.clone()],
                    cap_num(c, 2, n, ctx)?,
                    cap_char(c, 3),
                    Some(route),
                )
            },
        },
        // Enroute chart sheets carry no page number of their own.
        PageRule {
            applies: |ctx| {
                ctx.path.len() == 3 && ctx.path[0] == "ENR" && ctx.path[1] == "6"
            },
            pattern: rx(r"^.*$"),
            extract: |n, _, _| page(vec![], 1, None, Some(n.name.clone())),
        },
        // VFR terminal charts.
        PageRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Vfr && ctx.path.len() == 2 && ctx.path[0] == "AD"
            },
            pattern: rx(r"^E[DT][A-Z][A-Z] (.+) Terminal Chart ([0-9]+)$"),
            extract: |n, c, ctx| {
                page(
                    vec!["TC".to_string()],
                    cap_num(c, 2, n, ctx)?,
                    None,
                    cap(c, 1).map(|t| format!("{t} Terminal Chart")),
                )
            },
        },
        PageRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Vfr && ctx.path.len() == 2 && ctx.path[0] == "AD"
            },
            pattern: rx(r"^E[DT][A-Z][A-Z] (.+) Terminal Chart( Vorderseite)?$"),
            extract: |_, c, _| {
                page(
                    vec!["TC".to_string()],
                    1,
                    None,
                    cap(c, 1).map(|t| format!("{t} Terminal Chart")),
                )
            },
        },
        PageRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Vfr && ctx.path.len() == 2 && ctx.path[0] == "AD"
            },
            pattern: rx(r"^E[DT][A-Z][A-Z] (.+) Terminal Chart Rueckseite$"),
            extract: |_, c, _| {
                page(
                    vec!["TC".to_string()],
                    2,
                    None,
                    cap(c, 1).map(|t| format!("{t} Terminal Chart")),
                )
            },
        },
        // Text pages of VFR airfield charts.
        PageRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Vfr && ctx.path.len() == 2 && ctx.path[0] == "AD"
            },
            pattern: rx(r"^AD 3-(.+) ([0-9]+)([A-Za-z])?$"),
            extract: |n, c, ctx| page(vec![], cap_num(c, 2, n, ctx)?, cap_char(c, 3), cap(c, 1)),
        },
        // VFR approach chart sheets.
        PageRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Vfr && ctx.path.len() == 2 && ctx.path[0] == "AD"
            },
            pattern: rx(r"^(E[DT][A-Z][A-Z] )?(.+)[- ]([0-9]+)([A-Za-z])?$"),
            extract: |n, c, ctx| page(vec![], cap_num(c, 3, n, ctx)?, cap_char(c, 4), cap(c, 2)),
        },
        // IFR airfield charts, plain numbering (1-1, 1-2, ..., 2-1, ...).
        PageRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Ifr
                    && ctx.path.len() == 3
                    && ctx.path[0] == "AD"
                    && matches!(ctx.path[1].as_str(), "2" | "3")
            },
            pattern: rx(r"^AD [23] E[DT][A-Z][A-Z] ([126])-([0-9]+)([A-Za-z])?( (.+))?$"),
            extract: |n, c, ctx| {
                page(
                    vec![cap(c, 1).unwrap_or_default()],
                    cap_num(c, 2, n, ctx)?,
                    cap_char(c, 3),
                    cap(c, 5),
                )
            },
        },
        // IFR airfield charts, nested numbering (3-1-1, 3-1-2, ..., 3-2-1).
        PageRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Ifr
                    && ctx.path.len() == 3
                    && ctx.path[0] == "AD"
                    && matches!(ctx.path[1].as_str(), "2" | "3")
            },
            pattern: rx(r"^AD [23] E[DT][A-Z][A-Z] ([345])-([0-9]+)-([0-9]+)([A-Za-z])?( (.+))?$"),
            extract: |n, c, ctx| {
                page(
                    vec![cap(c, 1).unwrap_or_default(), cap(c, 2).unwrap_or_default()],
                    cap_num(c, 3, n, ctx)?,
                    cap_char(c, 4),
                    cap(c, 6),
                )
            },
        },
        // IFR military approach chart sheets.
        PageRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Ifr
                    && ctx.path.len() == 4
                    && ctx.path[0] == "AD"
                    && ctx.path[1] == "MIL"
                    && ctx.path[2] == "2"
            },
            pattern: rx(r"^AD 2 E[DT][A-Z][A-Z] ([0-9])[- ]([0-9]+)([A-Za-z])?( (.+))?$"),
            extract: |n, c, ctx| {
                page(
                    vec![cap(c, 1).unwrap_or_default()],
                    cap_num(c, 2, n, ctx)?,
                    cap_char(c, 3),
                    cap(c, 5),
                )
            },
        },
        // Heliport directory pages, grouped by register letter.
        PageRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Vfr && ctx.path.len() == 2 && ctx.path[0] == "HEL AD"
            },
            pattern: rx(r"^HEL AD 3-([A-Z]+)-([0-9]+)([A-Za-z])?$"),
            extract: |n, c, ctx| {
                // Directory pages also show up below the chart folders; only
                // keep them in section 3 itself.
                if ctx.path[1] != "3" {
                    return Ok(PageOutcome::Skip);
                }
                let letter = cap(c, 1).unwrap_or_default();
                page(
                    vec![letter.clone()],
                    cap_num(c, 2, n, ctx)?,
                    cap_char(c, 3),
                    Some(letter),
                )
            },
        },
        // Heliport approach chart sheets.
        PageRule {
            applies: |ctx| {
                ctx.aip_type == AipType::Vfr && ctx.path.len() == 2 && ctx.path[0] == "HEL AD"
            },
            pattern: rx(r"^(.+) ([0-9]+)([A-Za-z])?$"),
            extract: |n, c, ctx| page(vec![], cap_num(c, 2, n, ctx)?, cap_char(c, 3), cap(c, 1)),
        },
        // Circular pages (AIC).
        PageRule {
            applies: |ctx| ctx.path.len() == 2 && ctx.path[0] == "AIC",
            pattern: rx(r"^AIC( VFR| IFR)? .+(-|- | Seite | Page-)([0-9]+)$"),
            extract: |n, c, ctx| page(vec![], cap_num(c, 3, n, ctx)?, None, None),
        },
        // Supplement pages (SUP).
        PageRule {
            applies: |ctx| ctx.path.len() == 2 && ctx.path[0] == "SUP",
            pattern: rx(r"^(LIST OF )?SUP( VFR)? .+(-| Seite | Page-)([0-9]+)( .+)?$"),
            extract: |n, c, ctx| page(vec![], cap_num(c, 4, n, ctx)?, None, None),
        },
    ]
});

/// Classify a folder node.
///
/// # Errors
/// Returns [`AipError::Structural`] when no rule matches.
pub fn classify_folder(node: &RawNode, ctx: &ClassifyCtx<'_>) -> Result<FolderOutcome> {
    for rule in FOLDER_RULES.iter() {
        if !(rule.applies)(ctx) {
            continue;
        }
        if let Some(captures) = rule.pattern.captures(&node.name) {
            return (rule.extract)(node, &captures, ctx);
        }
    }
    Err(ctx.structural(node))
}

/// Classify a page node.
///
/// # Errors
/// Returns [`AipError::Structural`] when no rule matches.
pub fn classify_page(node: &RawNode, ctx: &ClassifyCtx<'_>) -> Result<PageOutcome> {
    for rule in PAGE_RULES.iter() {
        if !(rule.applies)(ctx) {
            continue;
        }
        if let Some(captures) = rule.pattern.captures(&node.name) {
            return (rule.extract)(node, &captures, ctx);
        }
    }
    Err(ctx.structural(node))
}
