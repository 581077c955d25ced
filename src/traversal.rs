use std::collections::VecDeque;
use std::iter::FusedIterator;

use smallvec::SmallVec;

use crate::model::TreeModel;
use crate::state::TreeState;

/// A visible node together with its depth (roots are at depth 0).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibleNode<Id> {
    pub id: Id,
    pub depth: u16,
}

/// Read-only traversal over a model using a tree state's roots and expansion set.
///
/// A node is visible when it is a root or when every ancestor up to its root is
/// expanded. Nothing here mutates the state; every call reflects the expansion set
/// as it was when the traversal was created.
pub struct Traversal<'a, T: TreeModel> {
    model: &'a T,
    state: &'a TreeState<T::Id>,
}

impl<T: TreeModel> Clone for Traversal<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T: TreeModel> Copy for Traversal<'_, T> {}

impl<'a, T: TreeModel> Traversal<'a, T> {
    pub const fn new(model: &'a T, state: &'a TreeState<T::Id>) -> Self {
        Self { model, state }
    }

    /// Lazily enumerates visible nodes in depth-first pre-order.
    ///
    /// Stopping early costs nothing beyond the nodes already produced.
    pub fn visible(&self) -> VisibleNodes<'a, T> {
        let mut stack = SmallVec::new();
        stack.extend(self.state.roots().iter().rev().map(|&id| (id, 0)));
        VisibleNodes {
            model: self.model,
            state: self.state,
            stack,
        }
    }

    /// Same as [`visible`](Self::visible), yielding only ids.
    pub fn visible_ids(&self) -> impl Iterator<Item = T::Id> + use<'a, T> {
        self.visible().map(|node| node.id)
    }

    /// Counts visible nodes with a full traversal.
    pub fn visible_len(&self) -> usize {
        self.visible().count()
    }

    /// Returns the position of the node in the visible sequence.
    ///
    /// `None` if the node is not visible (a collapsed ancestor, or the node is gone).
    /// Linear in the number of visible nodes; meant for discrete events such as
    /// cursor changes, not per-frame use.
    pub fn index_of(&self, target: T::Id) -> Option<usize> {
        self.visible_ids().position(|id| id == target)
    }

    /// Returns `true` if the node appears in the visible sequence.
    pub fn is_visible(&self, target: T::Id) -> bool {
        let mut current = target;
        while let Some(parent) = self.model.parent(current) {
            if !self.state.is_expanded(parent) {
                return false;
            }
            current = parent;
        }
        self.state.roots().contains(&current)
    }

    /// Returns the depth of the node, counted along its parent chain.
    pub fn depth_of(&self, target: T::Id) -> u16 {
        let mut depth = 0_u16;
        let mut current = target;
        while let Some(parent) = self.model.parent(current) {
            depth = depth.saturating_add(1);
            current = parent;
        }
        depth
    }

    /// Returns the first visible node (the first root).
    pub fn first_visible(&self) -> T::Id {
        self.state.roots()[0]
    }

    /// Returns the last visible node: the end of the expanded last-child chain
    /// below the last root.
    pub fn last_visible(&self) -> T::Id {
        let roots = self.state.roots();
        self.deepest_last(roots[roots.len() - 1])
    }

    /// Returns the node `offset` steps after `node` in visible order.
    ///
    /// Clamps to the last visible node when the walk runs past the end;
    /// `offset == 0` returns `node` unchanged.
    pub fn successor(&self, node: T::Id, offset: usize) -> T::Id {
        let mut pending: VecDeque<T::Id> = VecDeque::with_capacity(8);
        pending.push_back(node);
        let mut current = node;
        // The first pop yields `node` itself, hence `offset + 1` pops.
        for _ in 0..=offset {
            if pending.is_empty() && !self.push_younger_siblings(current, &mut pending) {
                break;
            }
            let Some(next) = pending.pop_front() else {
                break;
            };
            current = next;
            if self.state.is_expanded(current) {
                for &child in self.model.children(current).iter().rev() {
                    pending.push_front(child);
                }
            }
        }
        current
    }

    /// Returns the node `offset` steps before `node` in visible order.
    ///
    /// Stepping back onto an earlier sibling lands on the deepest visible node of
    /// that sibling's subtree, so this walks the exact reverse of
    /// [`successor`](Self::successor). Clamps at the first root.
    pub fn predecessor(&self, node: T::Id, offset: usize) -> T::Id {
        let mut current = node;
        for _ in 0..offset {
            let parent = self.model.parent(current);
            let siblings = self.siblings(parent);
            match siblings.iter().position(|&id| id == current) {
                Some(idx) if idx > 0 => current = self.deepest_last(siblings[idx - 1]),
                _ => match parent {
                    Some(parent) => current = parent,
                    None => break,
                },
            }
        }
        current
    }

    fn siblings(&self, parent: Option<T::Id>) -> &'a [T::Id] {
        match parent {
            Some(parent) => self.model.children(parent),
            None => self.state.roots(),
        }
    }

    // Climbs from `node` until a level with unvisited younger siblings is found and
    // queues them. Returns `false` when the top level is exhausted.
    fn push_younger_siblings(&self, node: T::Id, pending: &mut VecDeque<T::Id>) -> bool {
        let mut current = node;
        loop {
            let parent = self.model.parent(current);
            let siblings = self.siblings(parent);
            if let Some(idx) = siblings.iter().position(|&id| id == current)
                && idx + 1 < siblings.len()
            {
                pending.extend(siblings[idx + 1..].iter().copied());
                return true;
            }
            match parent {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn deepest_last(&self, node: T::Id) -> T::Id {
        let mut current = node;
        while self.state.is_expanded(current) {
            match self.model.children(current).last() {
                Some(&last) => current = last,
                None => break,
            }
        }
        current
    }
}

/// Iterator over visible nodes, see [`Traversal::visible`].
pub struct VisibleNodes<'a, T: TreeModel> {
    model: &'a T,
    state: &'a TreeState<T::Id>,
    // Top of the stack is the next node to yield.
    stack: SmallVec<[(T::Id, u16); 16]>,
}

impl<T: TreeModel> Iterator for VisibleNodes<'_, T> {
    type Item = VisibleNode<T::Id>;

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        if self.state.is_expanded(id) {
            let children = self.model.children(id);
            self.stack
                .extend(children.iter().rev().map(|&child| (child, depth.saturating_add(1))));
        }
        Some(VisibleNode { id, depth })
    }
}

impl<T: TreeModel> FusedIterator for VisibleNodes<'_, T> {}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::model::fixture::{ArenaTree, DigitTree};

    fn digit_state(tree: &DigitTree) -> TreeState<u32> {
        TreeState::new(tree.roots().iter().copied()).unwrap()
    }

    #[test]
    fn collapsed_roots_are_all_visible() {
        let tree = DigitTree::new();
        let state = digit_state(&tree);

        let ids: Vec<u32> = state.traverse(&tree).visible_ids().collect();

        assert_eq!(ids, (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn expanding_root_inserts_children_in_place() {
        let tree = DigitTree::new();
        let mut state = digit_state(&tree);
        state.expand(&tree, 3).unwrap();

        let nodes: Vec<_> = state.traverse(&tree).visible().collect();
        let ids: Vec<u32> = nodes.iter().map(|node| node.id).collect();

        let mut expected = vec![1, 2, 3];
        expected.extend(30..40);
        expected.extend(4..=9);
        assert_eq!(ids, expected);
        assert_eq!(nodes[3].depth, 1);
        assert_eq!(nodes[13].depth, 0);
    }

    #[test]
    fn visible_sequence_is_lazy() {
        let tree = DigitTree::new();
        let mut state = digit_state(&tree);
        state.expand_with_descendants(&tree, 1).unwrap();

        let first: Vec<u32> = state.traverse(&tree).visible_ids().take(3).collect();

        assert_eq!(first, vec![1, 10, 100]);
    }

    #[test]
    fn successor_steps_and_clamps() {
        let tree = DigitTree::new();
        let state = digit_state(&tree);
        let traversal = state.traverse(&tree);

        assert_eq!(traversal.successor(5, 1), 6);
        assert_eq!(traversal.successor(9, 1), 9);
        assert_eq!(traversal.successor(5, 0), 5);
        assert_eq!(traversal.successor(1, 100), 9);
    }

    #[test]
    fn successor_descends_and_climbs() {
        let tree = DigitTree::new();
        let mut state = digit_state(&tree);
        state.expand(&tree, 3).unwrap();
        state.expand(&tree, 39).unwrap();
        let traversal = state.traverse(&tree);

        assert_eq!(traversal.successor(3, 1), 30);
        assert_eq!(traversal.successor(38, 2), 390);
        assert_eq!(traversal.successor(399, 1), 4);
        assert_eq!(traversal.successor(395, 6), 5);
    }

    #[test]
    fn predecessor_enters_expanded_subtrees() {
        let tree = DigitTree::new();
        let mut state = digit_state(&tree);
        state.expand(&tree, 3).unwrap();
        state.expand(&tree, 39).unwrap();
        let traversal = state.traverse(&tree);

        assert_eq!(traversal.predecessor(4, 1), 399);
        assert_eq!(traversal.predecessor(30, 1), 3);
        assert_eq!(traversal.predecessor(2, 5), 1);
        assert_eq!(traversal.predecessor(1, 1), 1);
    }

    #[test]
    fn last_visible_follows_expanded_last_children() {
        let tree = DigitTree::new();
        let mut state = digit_state(&tree);
        assert_eq!(state.traverse(&tree).last_visible(), 9);

        state.expand(&tree, 9).unwrap();
        state.expand(&tree, 99).unwrap();
        assert_eq!(state.traverse(&tree).last_visible(), 999);
    }

    #[test]
    fn index_of_reports_hidden_nodes_as_absent() {
        let tree = DigitTree::new();
        let mut state = digit_state(&tree);
        state.expand(&tree, 2).unwrap();
        let traversal = state.traverse(&tree);

        assert_eq!(traversal.index_of(1), Some(0));
        assert_eq!(traversal.index_of(25), Some(7));
        assert_eq!(traversal.index_of(3), Some(12));
        assert_eq!(traversal.index_of(45), None);
        assert!(!traversal.is_visible(45));
        assert!(traversal.is_visible(25));
        assert_eq!(traversal.depth_of(456), 2);
    }

    fn arb_state() -> impl Strategy<Value = (ArenaTree, Vec<usize>)> {
        (1..4_usize, 1..4_usize, 0..4_u16).prop_flat_map(|(roots, fanout, depth)| {
            let tree = ArenaTree::uniform(roots, fanout, depth);
            let len = tree.parents.len();
            (Just(tree), prop::collection::vec(0..len, 0..len.max(1)))
        })
    }

    fn build(tree: &ArenaTree, expand: &[usize]) -> TreeState<usize> {
        let mut state = TreeState::new(tree.roots.iter().copied()).unwrap();
        for &id in expand {
            let _ = state.expand(tree, id);
        }
        state
    }

    proptest! {
        #[test]
        fn visibility_matches_expanded_ancestors((tree, expand) in arb_state()) {
            let state = build(&tree, &expand);
            let traversal = state.traverse(&tree);
            let visible: Vec<usize> = traversal.visible_ids().collect();
            for id in tree.all_nodes() {
                let mut ancestors_expanded = true;
                let mut current = id;
                while let Some(parent) = tree.parents[current] {
                    ancestors_expanded &= state.is_expanded(parent);
                    current = parent;
                }
                prop_assert_eq!(visible.contains(&id), ancestors_expanded);
                prop_assert_eq!(traversal.is_visible(id), ancestors_expanded);
            }
        }

        #[test]
        fn successor_and_predecessor_are_inverse((tree, expand) in arb_state()) {
            let state = build(&tree, &expand);
            let traversal = state.traverse(&tree);
            let visible: Vec<usize> = traversal.visible_ids().collect();
            for (idx, &id) in visible.iter().enumerate() {
                let next = traversal.successor(id, 1);
                let expected_next = visible.get(idx + 1).copied().unwrap_or(id);
                prop_assert_eq!(next, expected_next);
                if next != id {
                    prop_assert_eq!(traversal.predecessor(next, 1), id);
                }
            }
            prop_assert_eq!(traversal.last_visible(), *visible.last().unwrap());
        }

        #[test]
        fn offsets_match_visible_positions((tree, expand) in arb_state(), offset in 0..12_usize) {
            let state = build(&tree, &expand);
            let traversal = state.traverse(&tree);
            let visible: Vec<usize> = traversal.visible_ids().collect();
            let last = visible.len() - 1;
            for (idx, &id) in visible.iter().enumerate() {
                prop_assert_eq!(traversal.successor(id, offset), visible[(idx + offset).min(last)]);
                prop_assert_eq!(traversal.predecessor(id, offset), visible[idx.saturating_sub(offset)]);
                prop_assert_eq!(traversal.index_of(id), Some(idx));
            }
        }
    }
}
