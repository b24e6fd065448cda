//! Smallest-first string enumeration over an alphabet of literals.
//!
//! Enumerates every string composable from the alphabet's literals in
//! total-length order, deduplicated, lexicographic within a length. Letters
//! need not be single characters, so a length may be reachable through
//! several compositions of letter lengths (or not at all).

use indexmap::{IndexMap, IndexSet};

/// Iterator over the feasible total lengths, ascending.
struct StringSizes {
    sizes: IndexSet<usize>,
    counter: usize,
    has_one: bool,
}

impl StringSizes {
    fn new(sizes: IndexSet<usize>) -> StringSizes {
        let has_one = sizes.contains(&1);
        StringSizes {
            sizes,
            counter: 0,
            has_one,
        }
    }

    fn can_make(&self, size: usize) -> bool {
        if size < 1 {
            return false;
        }
        if self.has_one {
            return true;
        }
        for &s in &self.sizes {
            if s == size || size % s == 0 || (size > s && self.can_make(size - s)) {
                return true;
            }
        }
        false
    }
}

impl Iterator for StringSizes {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.sizes.is_empty() {
            return None;
        }
        loop {
            self.counter += 1;
            if self.can_make(self.counter) {
                return Some(self.counter);
            }
        }
    }
}

/// Ordered compositions of `target` from the available letter lengths.
///
/// `next_composition` may return an empty vector, which means "no
/// composition produced this call" rather than "done"; callers skip
/// empties while `has_next` holds.
struct Compositions {
    target: usize,
    has_exact: bool,
    smaller: Vec<usize>,
    smaller_set: IndexSet<usize>,
    index: usize,
    first: bool,
    child: Option<Box<Compositions>>,
}

impl Compositions {
    fn new(target: usize, sizes: &IndexSet<usize>) -> Compositions {
        let mut has_exact = false;
        let mut smaller = Vec::new();
        let mut smaller_set = IndexSet::new();
        if target >= 1 {
            for &size in sizes {
                if size == target {
                    has_exact = true;
                } else if size < target {
                    smaller.push(size);
                    smaller_set.insert(size);
                }
            }
        }
        smaller.sort_unstable();
        Compositions {
            target,
            has_exact,
            smaller,
            smaller_set,
            index: 0,
            first: true,
            child: None,
        }
    }

    fn has_next(&self) -> bool {
        if self.target < 1 {
            return false;
        }
        if self.index + 1 < self.smaller.len() {
            return true;
        }
        if self.has_exact || self.first {
            return true;
        }
        match &self.child {
            Some(child) => child.has_next(),
            None => false,
        }
    }

    fn next_composition(&mut self) -> Vec<usize> {
        self.first = false;

        if self.index < self.smaller.len() {
            let lead = self.smaller[self.index];
            if self.child.is_none() {
                self.child = Some(Box::new(Compositions::new(
                    self.target - lead,
                    &self.smaller_set,
                )));
            }
            let child = self.child.as_mut().expect("composition continuation");
            if child.has_next() {
                let remaining = child.next_composition();
                if !remaining.is_empty() {
                    let mut composition = Vec::with_capacity(remaining.len() + 1);
                    composition.push(lead);
                    composition.extend(remaining);
                    return composition;
                }
                return Vec::new();
            }
            self.index += 1;
            self.child = None;
            return self.next_composition();
        }
        if self.has_exact {
            self.has_exact = false;
            return vec![self.target];
        }
        Vec::new()
    }
}

/// Smallest-first, deduplicated enumeration of all strings over an
/// alphabet of (non-empty) literals.
pub struct SmallestStrings {
    sizes: IndexSet<usize>,
    letters_of_size: IndexMap<usize, Vec<String>>,
    current: Vec<String>,
    index: usize,
    size_iter: StringSizes,
}

impl SmallestStrings {
    pub fn new<I>(alphabet: I) -> SmallestStrings
    where
        I: IntoIterator<Item = String>,
    {
        let mut sizes = IndexSet::new();
        let mut letters_of_size: IndexMap<usize, Vec<String>> = IndexMap::new();
        for letter in alphabet {
            if letter.is_empty() {
                continue;
            }
            sizes.insert(letter.len());
            letters_of_size.entry(letter.len()).or_default().push(letter);
        }
        for letters in letters_of_size.values_mut() {
            letters.sort_unstable();
            letters.dedup();
        }

        let mut size_iter = StringSizes::new(sizes.clone());
        let mut iterator = SmallestStrings {
            sizes,
            letters_of_size,
            current: Vec::new(),
            index: 0,
            size_iter: StringSizes::new(IndexSet::new()),
        };
        if let Some(size) = size_iter.next() {
            iterator.current = iterator.strings_of_size(size);
        }
        iterator.size_iter = size_iter;
        iterator
    }

    fn strings_of_size(&self, size: usize) -> Vec<String> {
        let mut strings = IndexSet::new();
        let mut compositions = Compositions::new(size, &self.sizes);
        while compositions.has_next() {
            let composition = compositions.next_composition();
            if !composition.is_empty() {
                self.strings_in_composition(&composition, 0, &mut strings);
            }
        }
        let mut out: Vec<String> = strings.into_iter().collect();
        out.sort_unstable();
        out
    }

    fn strings_in_composition(
        &self,
        composition: &[usize],
        position: usize,
        out: &mut IndexSet<String>,
    ) {
        let Some(prefixes) = self.letters_of_size.get(&composition[position]) else {
            return;
        };
        if position + 1 < composition.len() {
            let mut suffixes = IndexSet::new();
            self.strings_in_composition(composition, position + 1, &mut suffixes);
            for prefix in prefixes {
                for suffix in &suffixes {
                    out.insert(format!("{prefix}{suffix}"));
                }
            }
        } else {
            out.extend(prefixes.iter().cloned());
        }
    }
}

impl Iterator for SmallestStrings {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if self.index < self.current.len() {
                let value = self.current[self.index].clone();
                self.index += 1;
                return Some(value);
            }
            let size = self.size_iter.next()?;
            self.current = self.strings_of_size(size);
            self.index = 0;
        }
    }
}
