//! Inline icon normalizer.
//!
//! Each configured icon reference is fetched, parsed as SVG and stripped of
//! embedded styling so the active theme decides its colours. Identifying
//! attributes of the reference (id, alt text, explicit size) are carried over
//! to the inlined graphic, which then replaces the reference in its slot.
//!
//! Icons are processed independently: a failing icon is logged and keeps its
//! reference slot while the others are inlined.

mod fetch;
mod shapes;
mod svg;

pub use fetch::{FsFetcher, ResourceFetcher};
pub use shapes::{IconShapes, Shape};
pub use svg::{SvgElement, SvgNode};

use std::io;

use thiserror::Error;

use crate::config::IconRef;

/// Class attached to every inlined icon.
pub const ICON_CLASS: &str = "logo";

#[derive(Debug, Error)]
pub enum IconError {
    #[error("failed to fetch {src}: {source}")]
    Fetch { src: String, source: io::Error },
    #[error("invalid SVG markup: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("invalid SVG attribute: {0}")]
    Attr(#[from] quick_xml::events::attributes::AttrError),
    #[error("unbalanced SVG markup")]
    Unbalanced,
}

/// A parsed, restyled icon ready to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineIcon {
    pub root: SvgElement,
    pub shapes: IconShapes,
}

impl InlineIcon {
    /// Accessible label, falling back to the element id.
    pub fn label(&self) -> Option<&str> {
        self.root.attr("aria-label").or_else(|| self.root.attr("id"))
    }
}

/// One header icon position: either still the reference, or the inlined graphic.
#[derive(Debug, Clone, PartialEq)]
pub enum IconSlot {
    Reference(IconRef),
    Inline(InlineIcon),
}

impl IconSlot {
    /// Text shown in place of the graphic.
    pub fn label(&self) -> &str {
        match self {
            IconSlot::Reference(r) => r.alt.as_deref().unwrap_or(&r.src),
            IconSlot::Inline(icon) => icon.label().unwrap_or(""),
        }
    }
}

fn strip_styling(el: &mut SvgElement) {
    el.remove_attr("style");
    el.children
        .retain(|c| !matches!(c, SvgNode::Element(e) if e.local_name() == "style"));
    for child in el.elements_mut() {
        strip_styling(child);
    }
}

/// Apply the normalization rules to a parsed `<svg>` root.
pub fn normalize_root(mut root: SvgElement, reference: &IconRef) -> SvgElement {
    strip_styling(&mut root);

    let class = match root.attr("class") {
        Some(existing) if existing.split_whitespace().any(|c| c == ICON_CLASS) => {
            existing.to_string()
        }
        Some(existing) if !existing.trim().is_empty() => format!("{existing} {ICON_CLASS}"),
        _ => ICON_CLASS.to_string(),
    };
    root.set_attr("class", class);

    if let Some(id) = &reference.id {
        root.set_attr("id", id.as_str());
    }
    if let Some(alt) = &reference.alt {
        if root.attr("aria-label").is_none() {
            root.set_attr("aria-label", alt.as_str());
        }
    }
    if let Some(width) = reference.width {
        root.set_attr("width", width.to_string());
    }
    if let Some(height) = reference.height {
        root.set_attr("height", height.to_string());
    }
    root
}

/// Fetch, parse and normalize one icon.
///
/// Returns `Ok(None)` when the markup has no `<svg>` root.
pub fn normalize_icon<F: ResourceFetcher + ?Sized>(
    fetcher: &F,
    reference: &IconRef,
) -> Result<Option<InlineIcon>, IconError> {
    let markup = fetcher.fetch(&reference.src).map_err(|source| IconError::Fetch {
        src: reference.src.clone(),
        source,
    })?;

    let Some(root) = svg::parse(&markup)? else {
        return Ok(None);
    };
    if root.local_name() != "svg" {
        return Ok(None);
    }

    // Shapes keep the intrinsic coordinate space; the reference size only
    // affects how large the icon is displayed.
    let shapes = shapes::extract(&root);
    let root = normalize_root(root, reference);
    Ok(Some(InlineIcon { root, shapes }))
}

/// Normalize every reference, one scoped thread per icon.
///
/// The result has one slot per reference, in the same order.
pub fn normalize_all<F: ResourceFetcher + Sync + ?Sized>(
    fetcher: &F,
    references: &[IconRef],
) -> Vec<IconSlot> {
    std::thread::scope(|scope| {
        let handles: Vec<_> = references
            .iter()
            .map(|reference| scope.spawn(move || normalize_icon(fetcher, reference)))
            .collect();

        handles
            .into_iter()
            .zip(references)
            .map(|(handle, reference)| match handle.join() {
                Ok(Ok(Some(icon))) => {
                    tracing::debug!(
                        src = %reference.src,
                        shapes = icon.shapes.shapes.len(),
                        "icon inlined"
                    );
                    tracing::trace!(markup = %icon.root.to_markup(), "inlined icon markup");
                    IconSlot::Inline(icon)
                }
                Ok(Ok(None)) => IconSlot::Reference(reference.clone()),
                Ok(Err(e)) => {
                    tracing::warn!(src = %reference.src, error = %e, "failed to inline icon");
                    IconSlot::Reference(reference.clone())
                }
                Err(_) => {
                    tracing::error!(src = %reference.src, "icon worker panicked");
                    IconSlot::Reference(reference.clone())
                }
            })
            .collect()
    })
}
