//! Scroll-into-view for windowed viewports with partially measured items.
//!
//! The host reports the items it measured during the last layout pass. Items outside
//! that window have unknown extent; when the target lies below the window its extent,
//! and the extent of everything between, is assumed equal to the last measured item.
//! Those estimates can be off and are corrected by the next request once the real
//! items have been measured.

use tracing::trace;

/// Page size used when no extent information is available.
pub const FALLBACK_PAGE_SIZE: usize = 10;

/// Geometry of one measured item, in host units (pixels, terminal rows).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeasuredItem {
    /// Position in the visible sequence.
    pub index: usize,
    /// Start of the item relative to the viewport start; negative when clipped.
    pub offset: i32,
    pub extent: i32,
}

/// Measured items in ascending index order, plus the viewport extent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ViewportLayout {
    pub items: Vec<MeasuredItem>,
    pub viewport_extent: i32,
}

impl ViewportLayout {
    pub const fn new(items: Vec<MeasuredItem>, viewport_extent: i32) -> Self {
        Self {
            items,
            viewport_extent,
        }
    }

    /// Builds a layout of consecutive items starting at `first_index`, laid out
    /// back to back from `first_offset`.
    pub fn from_extents(
        first_index: usize,
        first_offset: i32,
        extents: impl IntoIterator<Item = i32>,
        viewport_extent: i32,
    ) -> Self {
        let mut offset = first_offset;
        let items = extents
            .into_iter()
            .enumerate()
            .map(|(pos, extent)| {
                let item = MeasuredItem {
                    index: first_index + pos,
                    offset,
                    extent,
                };
                offset = offset.saturating_add(extent);
                item
            })
            .collect();
        Self::new(items, viewport_extent)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of measured extents.
    pub fn content_extent(&self) -> i32 {
        self.items
            .iter()
            .fold(0_i32, |sum, item| sum.saturating_add(item.extent))
    }

    /// Measured item at visible-sequence `index`, if it is in the window.
    pub fn item(&self, index: usize) -> Option<&MeasuredItem> {
        let first = self.items.first()?.index;
        self.items
            .get(index.checked_sub(first)?)
            .filter(|item| item.index == index)
    }
}

/// Scroll position: the item placed at the viewport start and how far into that
/// item the viewport begins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ScrollTarget {
    pub index: usize,
    pub offset: i32,
}

impl ScrollTarget {
    pub const fn new(index: usize, offset: i32) -> Self {
        Self { index, offset }
    }

    /// Places `index` at the viewport start.
    pub const fn top(index: usize) -> Self {
        Self { index, offset: 0 }
    }
}

/// Which branch of the decision procedure applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollCase {
    /// Nothing measured, nothing to do.
    NoLayout,
    /// Target at or above the first measured item: it becomes the top item.
    AboveWindow,
    /// Target is the last measured item.
    LastMeasured,
    /// Target strictly inside the measured window.
    InsideWindow,
    /// Target is the last node of the whole sequence: overscroll past it.
    EndOfSequence,
    /// Target is the first unmeasured item below the window.
    JustBelowWindow,
    /// Target is further below the window.
    FarBelowWindow,
}

/// Outcome of [`plan_scroll`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollPlan {
    pub case: ScrollCase,
    /// `None` when the target is already fully visible or nothing can be computed.
    pub target: Option<ScrollTarget>,
}

/// Computes the minimal scroll that brings item `target` fully into view.
///
/// `target_is_last` tells whether `target` is the last item of the whole visible
/// sequence. Cases are evaluated in a fixed order; the first match wins.
pub fn plan_scroll(layout: &ViewportLayout, target: usize, target_is_last: bool) -> ScrollPlan {
    let plan = decide(layout, target, target_is_last);
    trace!(target, case = ?plan.case, result = ?plan.target, "scroll into view");
    plan
}

/// Shorthand for [`plan_scroll`] returning only the target.
pub fn scroll_into_view(
    layout: &ViewportLayout,
    target: usize,
    target_is_last: bool,
) -> Option<ScrollTarget> {
    plan_scroll(layout, target, target_is_last).target
}

fn decide(layout: &ViewportLayout, target: usize, target_is_last: bool) -> ScrollPlan {
    let (Some(first), Some(last)) = (layout.items.first(), layout.items.last()) else {
        return ScrollPlan {
            case: ScrollCase::NoLayout,
            target: None,
        };
    };
    let viewport = layout.viewport_extent;

    if target <= first.index {
        return ScrollPlan {
            case: ScrollCase::AboveWindow,
            target: Some(ScrollTarget::top(target)),
        };
    }

    if target == last.index {
        let fits = i64::from(last.offset) + i64::from(last.extent) <= i64::from(viewport);
        return ScrollPlan {
            case: ScrollCase::LastMeasured,
            target: (!fits).then(|| align_bottom(&layout.items, 0, viewport)),
        };
    }

    if target < last.index {
        return ScrollPlan {
            case: ScrollCase::InsideWindow,
            target: None,
        };
    }

    if target_is_last {
        // The host clamps the overscroll, leaving the target at the bottom.
        return ScrollPlan {
            case: ScrollCase::EndOfSequence,
            target: Some(ScrollTarget::top(target + 1)),
        };
    }

    let assumed = i64::from(last.extent.max(1));
    if target == last.index + 1 {
        return ScrollPlan {
            case: ScrollCase::JustBelowWindow,
            target: Some(align_bottom(&layout.items, assumed, viewport)),
        };
    }

    // Every item from the window's end up to and including the target is assumed
    // to be `assumed` long.
    let unmeasured = i64::try_from(target - last.index).unwrap_or(i64::MAX);
    let unmeasured_extent = unmeasured.saturating_mul(assumed);
    let distance = unmeasured_extent - i64::from(viewport);
    let target = if distance >= 0 {
        let skipped = usize::try_from(distance / assumed).unwrap_or(usize::MAX);
        ScrollTarget {
            index: (last.index + 1).saturating_add(skipped),
            offset: narrow(distance % assumed),
        }
    } else {
        align_bottom(&layout.items, unmeasured_extent, viewport)
    };
    ScrollPlan {
        case: ScrollCase::FarBelowWindow,
        target: Some(target),
    }
}

// Walks the measured items bottom-up, starting with `below` already accumulated,
// until the viewport is filled. The item where the walk stops becomes the top item,
// offset by the overshoot so the bottom lines up with the viewport end.
fn align_bottom(items: &[MeasuredItem], below: i64, viewport: i32) -> ScrollTarget {
    let viewport = i64::from(viewport);
    let mut sum = below;
    let mut top = None;
    for item in items.iter().rev() {
        if sum >= viewport {
            break;
        }
        sum += i64::from(item.extent);
        top = Some(item.index);
    }
    match top {
        Some(index) => ScrollTarget::new(index, narrow((sum - viewport).max(0))),
        // `below` alone fills the viewport: the first unmeasured item is on top.
        None => ScrollTarget::new(
            items.last().map_or(0, |item| item.index + 1),
            narrow(sum - viewport),
        ),
    }
}

fn narrow(value: i64) -> i32 {
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// Default page size for a fully realized (non-windowed) rendering.
///
/// Estimated as `visible_count * viewport_extent / content_extent`, at least 1;
/// [`FALLBACK_PAGE_SIZE`] when extents are unknown.
pub fn realized_page_size(visible_count: usize, viewport_extent: i32, content_extent: i32) -> usize {
    let (Ok(viewport), Ok(content)) = (
        usize::try_from(viewport_extent),
        usize::try_from(content_extent),
    ) else {
        return FALLBACK_PAGE_SIZE;
    };
    if viewport == 0 || content == 0 {
        return FALLBACK_PAGE_SIZE;
    }
    (visible_count.saturating_mul(viewport) / content).max(1)
}

/// Default page size for a windowed rendering: measured items minus one, at least 1.
pub fn windowed_page_size(layout: &ViewportLayout) -> usize {
    layout.items.len().saturating_sub(1).max(1)
}

/// Page-size policy for page-up/page-down navigation.
#[derive(Clone, Copy, Debug, Default)]
pub enum PageSize {
    /// The default for the rendering mode in use.
    #[default]
    Auto,
    /// Always this many items (at least 1).
    Fixed(usize),
    /// Caller-supplied estimate from the last measured layout.
    Custom(fn(&ViewportLayout) -> usize),
}

impl PageSize {
    /// Resolves the page size for a windowed host.
    pub fn windowed(self, layout: &ViewportLayout) -> usize {
        match self {
            Self::Auto => windowed_page_size(layout),
            Self::Fixed(size) => size.max(1),
            Self::Custom(estimate) => estimate(layout).max(1),
        }
    }

    /// Resolves the page size for a fully realized host whose layout holds every
    /// visible item.
    pub fn realized(self, layout: &ViewportLayout) -> usize {
        match self {
            Self::Auto => realized_page_size(
                layout.items.len(),
                layout.viewport_extent,
                layout.content_extent(),
            ),
            Self::Fixed(size) => size.max(1),
            Self::Custom(estimate) => estimate(layout).max(1),
        }
    }
}

/// A scroll to execute, either at once or as an animated transition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollRequest {
    pub target: ScrollTarget,
    pub animate: bool,
    generation: u64,
}

impl ScrollRequest {
    /// Identifies the request; later requests have larger generations.
    pub const fn generation(&self) -> u64 {
        self.generation
    }
}

/// Holds at most one in-flight scroll. A new request supersedes the previous one
/// instead of queueing behind it.
#[derive(Clone, Debug, Default)]
pub struct ScrollDriver {
    generation: u64,
    in_flight: Option<ScrollRequest>,
}

impl ScrollDriver {
    pub const fn new() -> Self {
        Self {
            generation: 0,
            in_flight: None,
        }
    }

    /// Starts a scroll, cancelling any in-flight one. Returns its generation.
    pub fn request(&mut self, target: ScrollTarget, animate: bool) -> u64 {
        self.generation = self.generation.wrapping_add(1);
        if let Some(previous) = self.in_flight.take() {
            trace!(superseded = previous.generation, "scroll superseded");
        }
        self.in_flight = Some(ScrollRequest {
            target,
            animate,
            generation: self.generation,
        });
        self.generation
    }

    pub const fn in_flight(&self) -> Option<&ScrollRequest> {
        self.in_flight.as_ref()
    }

    /// Returns `true` if the request with this generation has not been superseded
    /// or finished.
    pub fn is_current(&self, generation: u64) -> bool {
        self.in_flight
            .is_some_and(|request| request.generation == generation)
    }

    pub const fn cancel(&mut self) {
        self.in_flight = None;
    }

    /// Advances the in-flight scroll from `position` and returns the new position.
    ///
    /// Immediate requests land in one step. Animated ones halve the remaining item
    /// distance per step and settle the pixel offset on the final step. Returns
    /// `None` when nothing is in flight.
    pub fn step(&mut self, position: ScrollTarget) -> Option<ScrollTarget> {
        let request = self.in_flight?;
        let target = request.target;
        if !request.animate || position.index == target.index {
            self.in_flight = None;
            return Some(target);
        }
        let next_index = if position.index < target.index {
            let remaining = target.index - position.index;
            position.index + remaining.div_ceil(2)
        } else {
            let remaining = position.index - target.index;
            position.index - remaining.div_ceil(2)
        };
        if next_index == target.index {
            self.in_flight = None;
            return Some(target);
        }
        Some(ScrollTarget::top(next_index))
    }
}
