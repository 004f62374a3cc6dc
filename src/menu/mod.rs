//! Core menu logic: membership encoding, tree assembly, authority resolution.
//!
//! Everything here is a pure function over already-fetched data; persistence
//! and HTTP live in `db` and `api`.

use std::collections::{BTreeSet, HashMap};

use crate::models::{AuthorityMenuView, MenuItem, MenuNode};

/// Menu id that is visible to every authority: the home/root menu must stay
/// reachable no matter how permissions are edited.
pub const ALWAYS_VISIBLE_MENU_ID: i64 = 1;

/// Token prefix of the persisted membership encoding.
const ID_PREFIX: &str = "^|";
/// Token terminator of the persisted membership encoding.
const ID_SUFFIX: char = ',';

/// Set of menu ids an authority level may access.
///
/// Persisted as a delimited string where each accessible id `n` appears as
/// the token `^|n,`. The `^|` and `,` delimiters bound each id exactly, so
/// token containment is equivalent to set membership (no `12` / `112`
/// collisions). The string form exists only at the persistence boundary;
/// all in-process checks go through the set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MenuIdSet(BTreeSet<i64>);

impl MenuIdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from a list of ids, deduplicating.
    pub fn from_ids<I: IntoIterator<Item = i64>>(ids: I) -> Self {
        Self(ids.into_iter().collect())
    }

    /// Parse the persisted encoding. Every well-formed `^|<digits>,` token is
    /// collected; malformed fragments between tokens are skipped. An empty or
    /// missing string yields the empty set.
    pub fn decode(encoded: &str) -> Self {
        let mut ids = BTreeSet::new();
        let mut rest = encoded;
        while let Some(start) = rest.find(ID_PREFIX) {
            rest = &rest[start + ID_PREFIX.len()..];
            if let Some(end) = rest.find(ID_SUFFIX) {
                if let Ok(id) = rest[..end].parse::<i64>() {
                    ids.insert(id);
                }
                rest = &rest[end + ID_SUFFIX.len_utf8()..];
            } else {
                break;
            }
        }
        Self(ids)
    }

    /// Render the persisted encoding, ids in ascending order.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for id in &self.0 {
            out.push_str(ID_PREFIX);
            out.push_str(&id.to_string());
            out.push(ID_SUFFIX);
        }
        out
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Assemble flat menu records into the navigation forest.
///
/// Children are grouped by parent id in one pass, then nodes are built
/// recursively from the roots with children sorted by `display_order` and
/// `level` incrementing per depth. An item whose `parent_id` references a
/// missing id is promoted to a root, and members of a parent cycle are
/// re-rooted at the lowest-ordered member, so no record is ever dropped.
pub fn build_menu_tree(items: Vec<MenuItem>) -> Vec<MenuNode> {
    let known_ids: BTreeSet<i64> = items.iter().map(|item| item.id).collect();

    let mut roots: Vec<MenuItem> = Vec::new();
    let mut by_parent: HashMap<i64, Vec<MenuItem>> = HashMap::new();
    for item in items {
        match item.parent_id {
            Some(parent_id) if known_ids.contains(&parent_id) => {
                by_parent.entry(parent_id).or_default().push(item);
            }
            Some(parent_id) => {
                tracing::warn!(
                    menu_id = item.id,
                    parent_id,
                    "menu references a missing parent, promoting to root"
                );
                roots.push(item);
            }
            None => roots.push(item),
        }
    }

    roots.sort_by_key(|item| item.display_order);
    let mut forest: Vec<MenuNode> = roots
        .into_iter()
        .map(|item| assemble_node(item, 0, &mut by_parent))
        .collect();

    // Members of a parent cycle are reachable from no root, so the pass above
    // leaves them behind in `by_parent`. The write path rejects cycle-forming
    // edits; should one arrive from data edited outside the API, break it here
    // instead of dropping records.
    while let Some(item) = take_stranded(&mut by_parent) {
        tracing::warn!(
            menu_id = item.id,
            "menu unreachable from any root, promoting to root"
        );
        forest.push(assemble_node(item, 0, &mut by_parent));
    }

    forest
}

/// Pull the lowest-ordered item still grouped under a parent, detaching it so
/// it can be re-rooted. Returns `None` once every record has been placed.
fn take_stranded(by_parent: &mut HashMap<i64, Vec<MenuItem>>) -> Option<MenuItem> {
    let (parent_id, idx) = by_parent
        .iter()
        .flat_map(|(parent_id, children)| {
            children
                .iter()
                .enumerate()
                .map(move |(idx, child)| (*parent_id, idx, child.display_order, child.id))
        })
        .min_by_key(|&(_, _, display_order, id)| (display_order, id))
        .map(|(parent_id, idx, _, _)| (parent_id, idx))?;

    let children = by_parent.get_mut(&parent_id)?;
    let item = children.remove(idx);
    if children.is_empty() {
        by_parent.remove(&parent_id);
    }
    Some(item)
}

fn assemble_node(
    item: MenuItem,
    level: u32,
    by_parent: &mut HashMap<i64, Vec<MenuItem>>,
) -> MenuNode {
    let mut children = by_parent.remove(&item.id).unwrap_or_default();
    children.sort_by_key(|child| child.display_order);
    let children = children
        .into_iter()
        .map(|child| assemble_node(child, level + 1, by_parent))
        .collect();
    MenuNode {
        item,
        level,
        children,
    }
}

/// Annotate every menu item with whether `membership` may access it, in input
/// order. The always-visible root is checked regardless of membership; a
/// missing membership row is passed in as the empty set.
pub fn resolve_authority_menus(items: &[MenuItem], membership: &MenuIdSet) -> Vec<AuthorityMenuView> {
    items
        .iter()
        .map(|item| AuthorityMenuView {
            item: item.clone(),
            checked: item.id == ALWAYS_VISIBLE_MENU_ID || membership.contains(item.id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MenuType;

    fn menu(id: i64, parent_id: Option<i64>, display_order: i64) -> MenuItem {
        MenuItem {
            id,
            name: format!("Menu {}", id),
            menu_type: MenuType::Page,
            parent_id,
            is_using: true,
            display_order,
            url: None,
            icon: None,
            remark: None,
            created_by: "admin".to_string(),
            created: "2024-01-01T00:00:00Z".to_string(),
            updated_by: "admin".to_string(),
            updated: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    fn count_nodes(nodes: &[MenuNode]) -> usize {
        nodes
            .iter()
            .map(|n| 1 + count_nodes(&n.children))
            .sum()
    }

    #[test]
    fn encode_produces_delimited_tokens() {
        let set = MenuIdSet::from_ids([5, 2]);
        assert_eq!(set.encode(), "^|2,^|5,");
    }

    #[test]
    fn decode_recovers_exact_membership() {
        let set = MenuIdSet::decode("^|2,^|5,");
        assert!(set.contains(2));
        assert!(set.contains(5));
        assert!(!set.contains(3));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn decode_empty_string_is_empty_set() {
        assert!(MenuIdSet::decode("").is_empty());
    }

    #[test]
    fn decode_skips_malformed_fragments() {
        let set = MenuIdSet::decode("junk^|7,^|x,^|9,trailing^|");
        assert_eq!(set, MenuIdSet::from_ids([7, 9]));
    }

    #[test]
    fn no_delimiter_collisions_between_similar_ids() {
        // 1 vs 11 vs 112: each token is bounded by ^| and , so none of these
        // can match another's encoding.
        let set = MenuIdSet::from_ids([112]);
        let encoded = set.encode();
        let decoded = MenuIdSet::decode(&encoded);
        assert!(decoded.contains(112));
        assert!(!decoded.contains(12));
        assert!(!decoded.contains(1));
        assert!(!decoded.contains(11));
    }

    #[test]
    fn round_trip_is_exact() {
        let set = MenuIdSet::from_ids([1, 2, 11, 12, 112, 9000]);
        assert_eq!(MenuIdSet::decode(&set.encode()), set);
    }

    #[test]
    fn tree_preserves_node_count() {
        let items = vec![
            menu(1, None, 1),
            menu(2, Some(1), 2),
            menu(3, Some(1), 1),
            menu(4, Some(2), 1),
            menu(5, None, 2),
        ];
        let tree = build_menu_tree(items);
        assert_eq!(count_nodes(&tree), 5);
    }

    #[test]
    fn children_sorted_by_display_order() {
        let items = vec![
            menu(1, None, 1),
            menu(2, Some(1), 30),
            menu(3, Some(1), 10),
            menu(4, Some(1), 20),
        ];
        let tree = build_menu_tree(items);
        let child_ids: Vec<i64> = tree[0].children.iter().map(|n| n.item.id).collect();
        assert_eq!(child_ids, vec![3, 4, 2]);
    }

    #[test]
    fn levels_increment_per_depth() {
        let items = vec![menu(1, None, 1), menu(2, Some(1), 1), menu(3, Some(2), 1)];
        let tree = build_menu_tree(items);
        assert_eq!(tree[0].level, 0);
        assert_eq!(tree[0].children[0].level, 1);
        assert_eq!(tree[0].children[0].children[0].level, 2);
    }

    #[test]
    fn roots_sorted_by_display_order() {
        let items = vec![menu(1, None, 5), menu(2, None, 1), menu(3, None, 3)];
        let tree = build_menu_tree(items);
        let root_ids: Vec<i64> = tree.iter().map(|n| n.item.id).collect();
        assert_eq!(root_ids, vec![2, 3, 1]);
    }

    #[test]
    fn orphan_promoted_to_root() {
        let items = vec![menu(1, None, 1), menu(2, Some(99), 2)];
        let tree = build_menu_tree(items);
        assert_eq!(count_nodes(&tree), 2);
        let root_ids: Vec<i64> = tree.iter().map(|n| n.item.id).collect();
        assert_eq!(root_ids, vec![1, 2]);
        assert_eq!(tree[1].level, 0);
    }

    #[test]
    fn cycle_members_promoted_to_roots() {
        let items = vec![menu(1, None, 1), menu(2, Some(3), 2), menu(3, Some(2), 3)];
        let tree = build_menu_tree(items);
        assert_eq!(count_nodes(&tree), 3);
        let root_ids: Vec<i64> = tree.iter().map(|n| n.item.id).collect();
        assert_eq!(root_ids, vec![1, 2]);
        assert_eq!(tree[1].children[0].item.id, 3);
        assert_eq!(tree[1].children[0].level, 1);
    }

    #[test]
    fn cycle_subtree_stays_attached() {
        let items = vec![
            menu(1, None, 1),
            menu(2, Some(3), 2),
            menu(3, Some(2), 3),
            menu(4, Some(2), 4),
        ];
        let tree = build_menu_tree(items);
        assert_eq!(count_nodes(&tree), 4);
        // 2 is re-rooted with both 3 and 4 still underneath it
        assert_eq!(tree[1].item.id, 2);
        let child_ids: Vec<i64> = tree[1].children.iter().map(|n| n.item.id).collect();
        assert_eq!(child_ids, vec![3, 4]);
    }

    #[test]
    fn resolver_marks_membership() {
        let items = vec![
            menu(1, None, 1),
            menu(2, Some(1), 1),
            menu(3, Some(1), 2),
            menu(5, Some(1), 3),
        ];
        let membership = MenuIdSet::decode("^|2,^|5,");
        let views = resolve_authority_menus(&items, &membership);
        let checked: Vec<bool> = views.iter().map(|v| v.checked).collect();
        assert_eq!(checked, vec![true, true, false, true]);
    }

    #[test]
    fn resolver_with_empty_membership_checks_only_root() {
        let items = vec![menu(1, None, 1), menu(2, Some(1), 1), menu(3, Some(1), 2)];
        let views = resolve_authority_menus(&items, &MenuIdSet::new());
        let checked: Vec<bool> = views.iter().map(|v| v.checked).collect();
        assert_eq!(checked, vec![true, false, false]);
    }

    #[test]
    fn root_menu_always_checked() {
        let items = vec![menu(1, None, 1)];
        for encoded in ["", "^|2,", "^|1,"] {
            let views = resolve_authority_menus(&items, &MenuIdSet::decode(encoded));
            assert!(views[0].checked);
        }
    }

    #[test]
    fn resolver_preserves_input_order() {
        let items = vec![menu(3, None, 3), menu(1, None, 1), menu(2, None, 2)];
        let views = resolve_authority_menus(&items, &MenuIdSet::new());
        let ids: Vec<i64> = views.iter().map(|v| v.item.id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
    }
}
