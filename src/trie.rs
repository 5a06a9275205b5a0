//! # Prefix Trie
//!
//! Case-insensitive autocompletion over song titles and artist names.
//!
//! Nodes live in a flat arena and refer to their children by index, so the
//! tree owns nothing recursively and enumeration runs on an explicit stack
//! regardless of word length.

use crate::collections::{List, Map};

const ROOT: usize = 0;

#[derive(Debug, Default)]
struct TrieNode {
    children: Map<char, usize>,
    terminal: bool,
}

/// Work item of the enumeration stack. `Leave` undoes the character pushed by
/// the matching `Enter`.
enum Step {
    Enter(usize, char),
    Leave,
}

#[derive(Debug)]
pub struct Trie {
    nodes: Vec<TrieNode>,
    words: usize,
}

impl Trie {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            words: 0,
        }
    }

    /// Stores `word` lowercased. Inserting a word twice is a no-op.
    pub fn insert(&mut self, word: &str) {
        let mut current = ROOT;
        for ch in word.to_lowercase().chars() {
            current = match self.nodes[current].children.get(&ch) {
                Some(&child) => child,
                None => {
                    let child = self.nodes.len();
                    self.nodes.push(TrieNode::default());
                    self.nodes[current].children.put(ch, child);
                    child
                }
            };
        }

        let node = &mut self.nodes[current];
        if !node.terminal {
            node.terminal = true;
            self.words += 1;
        }
    }

    /// Every stored word starting with `prefix`, lowercased.
    ///
    /// A prefix that leaves the tree yields nothing; the empty prefix yields
    /// every word. Order is unspecified.
    #[must_use]
    pub fn autocomplete(&self, prefix: &str) -> List<String> {
        let prefix = prefix.to_lowercase();
        let Some(start) = self.walk(&prefix) else {
            return List::new();
        };

        let mut found = List::new();
        if self.nodes[start].terminal {
            found.push_front(prefix.clone());
        }

        let mut word = prefix;
        let mut stack: Vec<Step> = self.children_of(start).collect();
        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(index, ch) => {
                    word.push(ch);
                    if self.nodes[index].terminal {
                        found.push_front(word.clone());
                    }
                    stack.push(Step::Leave);
                    stack.extend(self.children_of(index));
                }
                Step::Leave => {
                    word.pop();
                }
            }
        }
        found
    }

    /// Exact, case-insensitive membership.
    #[must_use]
    pub fn contains(&self, word: &str) -> bool {
        self.walk(&word.to_lowercase())
            .is_some_and(|index| self.nodes[index].terminal)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.words
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.words == 0
    }

    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[ROOT] = TrieNode::default();
        self.words = 0;
    }

    fn children_of(&self, index: usize) -> impl Iterator<Item = Step> + '_ {
        self.nodes[index]
            .children
            .iter()
            .map(|(&ch, &child)| Step::Enter(child, ch))
    }

    /// Index of the node reached by `folded`, which must already be lowercase.
    fn walk(&self, folded: &str) -> Option<usize> {
        folded.chars().try_fold(ROOT, |index, ch| {
            self.nodes[index].children.get(&ch).copied()
        })
    }
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Trie {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut trie = Self::new();
        for word in iter {
            trie.insert(word.as_ref());
        }
        trie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(found: List<String>) -> Vec<String> {
        let mut words: Vec<String> = found.into_iter().collect();
        words.sort();
        words
    }

    #[test]
    fn test_prefix_matches() {
        let trie: Trie = ["amapola", "amargo", "azul"].into_iter().collect();

        assert_eq!(sorted(trie.autocomplete("ama")), vec!["amapola", "amargo"]);
        assert!(trie.autocomplete("xyz").is_empty());
        assert!(trie.autocomplete("amapolas").is_empty());
    }

    #[test]
    fn test_empty_prefix_returns_everything() {
        let trie: Trie = ["cat", "catalog", "dog"].into_iter().collect();
        assert_eq!(sorted(trie.autocomplete("")), vec!["cat", "catalog", "dog"]);
    }

    #[test]
    fn test_shared_path_words_both_terminate() {
        let trie: Trie = ["catalog", "cat"].into_iter().collect();

        assert!(trie.contains("cat"));
        assert!(trie.contains("catalog"));
        assert!(!trie.contains("cata"));
        assert_eq!(sorted(trie.autocomplete("cat")), vec!["cat", "catalog"]);
    }

    #[test]
    fn test_case_folding() {
        let mut trie = Trie::new();
        trie.insert("Bohemian Rhapsody");

        assert!(trie.contains("BOHEMIAN rhapsody"));
        assert_eq!(sorted(trie.autocomplete("BoHe")), vec!["bohemian rhapsody"]);
    }

    #[test]
    fn test_duplicate_insert_is_idempotent() {
        let mut trie = Trie::new();
        trie.insert("amargo");
        trie.insert("AMARGO");

        assert_eq!(trie.len(), 1);
        assert_eq!(trie.autocomplete("am").len(), 1);
    }

    #[test]
    fn test_clear_empties_tree() {
        let mut trie: Trie = ["one", "two"].into_iter().collect();
        trie.clear();

        assert!(trie.is_empty());
        assert!(trie.autocomplete("").is_empty());

        trie.insert("three");
        assert_eq!(sorted(trie.autocomplete("t")), vec!["three"]);
    }

    #[test]
    fn test_deep_word_does_not_overflow() {
        let long_word = "a".repeat(20_000);
        let mut trie = Trie::new();
        trie.insert(&long_word);

        let found = trie.autocomplete("");
        assert_eq!(found.len(), 1);
        assert_eq!(found.get(0).map(String::len), Some(20_000));
    }
}
