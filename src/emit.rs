//! Range-grouped emission of render units for windowed hosts.
//!
//! Siblings are scanned left to right. A maximal run of unexpanded siblings becomes
//! one [`GroupKind::Run`] group whose units are still keyed one by one, so expanding
//! one of them later only changes that unit's shape. Every expanded sibling becomes
//! its own [`GroupKind::Expanded`] group, immediately followed by the groups of its
//! children one level deeper. Children of collapsed nodes are never requested.

use std::hash::Hash;
use std::ops::Range;

use rustc_hash::FxHashMap;

use crate::model::{ContentType, TreeModel};
use crate::state::TreeState;

/// Shape a node is rendered with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitForm {
    /// Leaf or collapsed node.
    Collapsed,
    /// Expanded node; its children follow in the plan.
    Expanded,
}

/// One emitted `(node, form, key, depth)` tuple handed to the host.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderUnit<Id> {
    pub node: Id,
    pub form: UnitForm,
    pub depth: u16,
    pub content_type: ContentType,
}

impl<Id: Copy> RenderUnit<Id> {
    /// Stable identity key: the node itself, independent of position.
    #[inline]
    pub const fn key(&self) -> Id {
        self.node
    }

    #[inline]
    pub fn is_expanded(&self) -> bool {
        self.form == UnitForm::Expanded
    }
}

/// How a slice of consecutive units was batched.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupKind {
    /// Consecutive unexpanded siblings.
    Run,
    /// A single expanded node.
    Expanded,
}

/// A batch of units sharing a sibling list and depth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnitGroup {
    pub kind: GroupKind,
    pub depth: u16,
    /// Positions in [`EmissionPlan::units`].
    pub range: Range<usize>,
}

/// Flat, depth-first list of render units plus their grouping.
#[derive(Clone, Debug)]
pub struct EmissionPlan<Id> {
    units: Vec<RenderUnit<Id>>,
    groups: Vec<UnitGroup>,
    positions: FxHashMap<Id, usize>,
}

impl<Id: Copy + Eq + Hash> Default for EmissionPlan<Id> {
    fn default() -> Self {
        Self {
            units: Vec::new(),
            groups: Vec::new(),
            positions: FxHashMap::default(),
        }
    }
}

impl<Id: Copy + Eq + Hash> EmissionPlan<Id> {
    /// Builds the plan for the state's current expansion set.
    pub fn build<T: TreeModel<Id = Id>>(model: &T, state: &TreeState<Id>) -> Self {
        let mut plan = Self::default();
        plan.rebuild(model, state);
        plan
    }

    /// Rebuilds in place, reusing allocations.
    pub fn rebuild<T: TreeModel<Id = Id>>(&mut self, model: &T, state: &TreeState<Id>) {
        self.units.clear();
        self.groups.clear();
        self.positions.clear();
        let hint = model.size_hint();
        if hint > 0 {
            self.units.reserve(hint.saturating_sub(self.units.capacity()));
        }
        self.emit_siblings(model, state, state.roots(), 0);
        self.positions.reserve(self.units.len());
        self.positions.extend(
            self.units
                .iter()
                .enumerate()
                .map(|(idx, unit)| (unit.node, idx)),
        );
    }

    fn emit_siblings<T: TreeModel<Id = Id>>(
        &mut self,
        model: &T,
        state: &TreeState<Id>,
        siblings: &[Id],
        depth: u16,
    ) {
        let mut rest = siblings;
        while !rest.is_empty() {
            let run_len = rest
                .iter()
                .take_while(|&&id| !state.is_expanded(id))
                .count();
            if run_len > 0 {
                let start = self.units.len();
                for &id in &rest[..run_len] {
                    self.push_unit(model, id, UnitForm::Collapsed, depth);
                }
                self.groups.push(UnitGroup {
                    kind: GroupKind::Run,
                    depth,
                    range: start..self.units.len(),
                });
                rest = &rest[run_len..];
                continue;
            }

            let id = rest[0];
            let start = self.units.len();
            self.push_unit(model, id, UnitForm::Expanded, depth);
            self.groups.push(UnitGroup {
                kind: GroupKind::Expanded,
                depth,
                range: start..start + 1,
            });
            self.emit_siblings(model, state, model.children(id), depth.saturating_add(1));
            rest = &rest[1..];
        }
    }

    fn push_unit<T: TreeModel<Id = Id>>(&mut self, model: &T, id: Id, form: UnitForm, depth: u16) {
        self.units.push(RenderUnit {
            node: id,
            form,
            depth,
            content_type: model.content_type(id),
        });
    }

    /// All units in visible order.
    pub fn units(&self) -> &[RenderUnit<Id>] {
        &self.units
    }

    /// Groups in emission order; their ranges tile [`units`](Self::units).
    pub fn groups(&self) -> &[UnitGroup] {
        &self.groups
    }

    pub const fn len(&self) -> usize {
        self.units.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Position of the node's unit, if the node is visible.
    pub fn position(&self, id: Id) -> Option<usize> {
        self.positions.get(&id).copied()
    }

    pub fn get(&self, index: usize) -> Option<&RenderUnit<Id>> {
        self.units.get(index)
    }

    /// Units in `range`, clamped to the plan.
    pub fn window(&self, range: Range<usize>) -> &[RenderUnit<Id>] {
        let end = range.end.min(self.units.len());
        let start = range.start.min(end);
        &self.units[start..end]
    }
}

/// Plan cached against a [`TreeState::revision`].
#[derive(Clone, Debug)]
pub struct PlanCache<Id> {
    plan: EmissionPlan<Id>,
    revision: Option<u64>,
    // Number of rebuilds so far; positions are only comparable within one build.
    generation: u64,
}

impl<Id: Copy + Eq + Hash> Default for PlanCache<Id> {
    fn default() -> Self {
        Self {
            plan: EmissionPlan::default(),
            revision: None,
            generation: 0,
        }
    }
}

impl<Id: Copy + Eq + Hash> PlanCache<Id> {
    /// Returns the plan, rebuilding it if the state changed since the last call.
    pub fn get<T: TreeModel<Id = Id>>(&mut self, model: &T, state: &TreeState<Id>) -> &EmissionPlan<Id> {
        if self.revision != Some(state.revision()) {
            self.plan.rebuild(model, state);
            self.revision = Some(state.revision());
            self.generation = self.generation.wrapping_add(1);
        }
        &self.plan
    }

    /// Last built plan, possibly stale.
    pub const fn plan(&self) -> &EmissionPlan<Id> {
        &self.plan
    }

    pub const fn invalidate(&mut self) {
        self.revision = None;
    }

    /// Changes every time the plan is rebuilt.
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns `true` if the cached plan matches the state.
    pub fn is_current(&self, state: &TreeState<Id>) -> bool {
        self.revision == Some(state.revision())
    }
}
