use crate::models::{AspectKind, Element, SpecModel};

/// How far an aspect's interval reaches above its first element. Guards
/// against an edit landing on the section keyword or the newline right
/// before the anchor element rather than strictly inside it.
pub(crate) const BOUNDARY_LOOKAHEAD: usize = 5;

/// The element list and prefix of the aspect an edit offset falls into.
#[derive(Debug, Clone, Copy)]
pub struct AspectSlice<'a> {
    pub kind: AspectKind,
    pub prefix: &'static str,
    pub elements: &'a [Element],
}

/// Assigns `offset` to an aspect.
///
/// Each aspect's boundary is the offset of its first element minus the
/// lookahead; an empty aspect inherits the boundary of the next aspect in the
/// fixed order, so it never opens a gap that swallows its neighbor's edits.
/// The aspects partition the offset axis into contiguous intervals, closed at
/// the top: an offset exactly on a boundary belongs to the preceding aspect.
/// Everything below the second aspect's boundary belongs to the first.
///
/// Returns `None` when any boundary is indeterminate (an anchor element
/// within the lookahead of the document start). Producing no edits is always
/// safe; producing misrouted edits is not.
pub fn locate_aspect(model: &SpecModel, offset: usize) -> Option<AspectSlice<'_>> {
    let boundaries = aspect_boundaries(model)?;

    let kind = AspectKind::ALL
        .into_iter()
        .enumerate()
        .find(|&(i, _)| offset <= boundaries[i + 1])
        .map(|(_, kind)| kind)?;

    Some(AspectSlice {
        kind,
        prefix: kind.prefix(),
        elements: model.elements(kind),
    })
}

/// Start boundaries of every aspect, plus a sentinel past the last.
///
/// Computed back to front so that an empty aspect can inherit its successor's
/// boundary. `None` when any populated aspect's anchor sits too close to the
/// document start for the subtraction to be meaningful.
fn aspect_boundaries(model: &SpecModel) -> Option<[usize; 9]> {
    let mut boundaries = [usize::MAX; 9];
    for (i, kind) in AspectKind::ALL.into_iter().enumerate().rev() {
        boundaries[i] = match model.first_offset(kind) {
            Some(anchor) => anchor.checked_sub(BOUNDARY_LOOKAHEAD)?,
            None => boundaries[i + 1],
        };
    }
    Some(boundaries)
}
