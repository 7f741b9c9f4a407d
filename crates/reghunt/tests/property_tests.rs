//! Property tests for matching and traversal order.

use proptest::prelude::*;
use reghunt::registry::{LiveRoot, LiveSource, MemoryRegistry, RegistryValue};
use reghunt::search::{Matcher, MatchMode, SearchResultSet, Walker, DEFAULT_MAX_DEPTH};

fn literal(keyword: &str) -> Matcher {
    Matcher::new(keyword, MatchMode::Literal).unwrap()
}

proptest! {
    #[test]
    fn test_literal_match_is_case_insensitive_substring(
        text in "[a-zA-Z0-9 _.\\\\]{0,24}",
        keyword in "[a-zA-Z0-9 _.]{0,4}",
    ) {
        let expected = text.to_lowercase().contains(&keyword.to_lowercase());
        prop_assert_eq!(literal(&keyword).is_match(&text), expected);
    }

    #[test]
    fn test_embedded_keyword_always_matches(
        prefix in "\\PC{0,8}",
        keyword in "[a-z]{1,6}",
        suffix in "\\PC{0,8}",
    ) {
        let text = format!("{}{}{}", prefix, keyword.to_uppercase(), suffix);
        prop_assert!(literal(&keyword).is_match(&text));
    }

    #[test]
    fn test_empty_keyword_matches_decodable_values(text in "\\PC{0,16}", n in any::<u32>(), q in any::<u64>()) {
        let m = literal("");
        prop_assert!(m.match_value(&RegistryValue::string("s", &text)).is_some());
        prop_assert!(m.match_value(&RegistryValue::dword("d", n)).is_some());
        prop_assert!(m.match_value(&RegistryValue::qword("q", q)).is_some());
    }
}

/// A generated tree: node 0 is the root, node `i > 0` hangs under
/// `parents[i - 1] % i`.
#[derive(Debug, Clone)]
struct Tree {
    parents: Vec<usize>,
    values: Vec<Vec<String>>,
}

impl Tree {
    fn len(&self) -> usize {
        self.parents.len() + 1
    }

    fn parent(&self, node: usize) -> Option<usize> {
        (node > 0).then(|| self.parents[node - 1] % node)
    }

    fn children(&self, node: usize) -> Vec<usize> {
        (1..self.len()).filter(|&c| self.parent(c) == Some(node)).collect()
    }

    /// Path below the root, e.g. `k1\k4`.
    fn relative_path(&self, node: usize) -> String {
        let mut segments = Vec::new();
        let mut current = node;
        while let Some(p) = self.parent(current) {
            segments.push(format!("k{}", current));
            current = p;
        }
        segments.reverse();
        segments.join("\\")
    }

    fn full_path(&self, node: usize) -> String {
        let rel = self.relative_path(node);
        if rel.is_empty() {
            "HKLM".to_string()
        } else {
            format!("HKLM\\{}", rel)
        }
    }

    fn registry(&self) -> MemoryRegistry {
        let mut reg = MemoryRegistry::new();
        for node in 0..self.len() {
            let path = self.relative_path(node);
            reg.add_key(LiveRoot::LocalMachine, &path);
            for (i, text) in self.values[node].iter().enumerate() {
                reg.add_value(LiveRoot::LocalMachine, &path, RegistryValue::string(format!("v{}", i), text));
            }
        }
        reg
    }

    /// Recursive pre-order reference enumeration of (path, name, text).
    fn flatten(&self, node: usize, out: &mut Vec<(String, String, String)>) {
        for (i, text) in self.values[node].iter().enumerate() {
            out.push((self.full_path(node), format!("v{}", i), text.clone()));
        }
        for child in self.children(node) {
            self.flatten(child, out);
        }
    }
}

fn tree_strategy() -> impl Strategy<Value = Tree> {
    (0usize..24).prop_flat_map(|n| {
        (
            prop::collection::vec(any::<usize>(), n),
            prop::collection::vec(prop::collection::vec("[abcAB]{0,5}", 0..3), n + 1),
        )
            .prop_map(|(parents, values)| Tree { parents, values })
    })
}

proptest! {
    #[test]
    fn test_walk_equals_flat_preorder_filter(tree in tree_strategy(), keyword in "[ab]{0,2}") {
        let reg = tree.registry();
        let matcher = literal(&keyword);
        let mut results = SearchResultSet::new();
        Walker::new(&matcher, DEFAULT_MAX_DEPTH).walk(&LiveSource::new(&reg, LiveRoot::LocalMachine), &mut results);

        let mut flat = Vec::new();
        tree.flatten(0, &mut flat);
        let expected: Vec<_> = flat
            .into_iter()
            .filter(|(_, _, text)| text.to_lowercase().contains(&keyword.to_lowercase()))
            .collect();
        let actual: Vec<_> = results
            .hits()
            .map(|h| (h.path.clone(), h.name.clone(), h.textual_form.clone()))
            .collect();

        prop_assert_eq!(results.errors().count(), 0);
        prop_assert_eq!(actual, expected);
    }
}
