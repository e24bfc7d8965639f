//! Segment trie used by every router to resolve a path to an [`Endpoint`].
//!
//! ## Layout
//!
//! Each node owns up to four kinds of children plus two terminal slots:
//!
//! - **literal** children keyed by exact segment text
//! - **regex** children in registration order, shared by identical pattern text
//! - **typed** children, one slot per [`NumericKind`]
//! - a single **generic** child for `{name}`
//! - a **hard end** reached when the path is exhausted without a trailing slash,
//!   and a **soft end** for the trailing-slash variant
//!
//! ## Lookup order
//!
//! At every node the children are tried literal → regex → int32 → int64 →
//! float32 → float64 → generic. On the last segment a literal, regex or typed
//! child may also match the segment with its file extension removed
//! (`report.pdf` → `report`). If a branch dead-ends further down, the lookup
//! backtracks and tries the next candidate.
//!
//! ## Wildcards
//!
//! `{name*}` registers the pattern twice: once without the wildcard segment
//! (the zero-length match) and once with it. When the wildcard is the last
//! segment, its node is greedy: a request with more segments than the pattern
//! still resolves there and the wildcard captures everything that is left,
//! joined with `/`.
//!
//! ```rust,ignore
//! let mut trie = RouteTrie::new();
//! trie.handle("/files/{rest*}", "files", &["GET"])?;
//! let found = trie.find_endpoint(&["files", "a", "b.txt"], false);
//! assert_eq!(found.values.as_slice(), ["a/b.txt"]);
//! ```

use http::Method;
use regex::Regex;
use smallvec::SmallVec;
use std::collections::HashMap;
use std::sync::Arc;

use super::endpoint::{parse_method, Endpoint, DEFAULT_METHODS};
use super::segment::{parse_segment, split_extension, split_path, PatternSegment, SegmentKind};
use crate::error::RouteError;

/// Maximum number of captured values before heap allocation
pub const MAX_INLINE_VALUES: usize = 8;

/// Captured segment values in encounter order
pub type ValueVec = SmallVec<[String; MAX_INLINE_VALUES]>;

#[derive(Debug, Clone)]
struct RegexChild<H> {
    source: String,
    regex: Regex,
    node: RouteTrie<H>,
}

/// Recursive segment trie
#[derive(Debug, Clone)]
pub struct RouteTrie<H> {
    literal: HashMap<String, RouteTrie<H>>,
    regex: Vec<RegexChild<H>>,
    typed: [Option<Box<RouteTrie<H>>>; 4],
    generic: Option<Box<RouteTrie<H>>>,
    hard_end: Option<Endpoint<H>>,
    soft_end: Option<Endpoint<H>>,
    greedy: bool,
}

impl<H> Default for RouteTrie<H> {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of [`RouteTrie::find_endpoint`]
#[derive(Debug)]
pub struct TrieLookup<'a, H> {
    /// The endpoint, or `None` when nothing matched
    pub endpoint: Option<&'a Endpoint<H>>,
    /// Variable values in the order of `endpoint.variable_names()`.
    /// On failure, the values captured up to the deepest point reached.
    pub values: ValueVec,
    /// Segments left unconsumed at the deepest point reached, joined with `/`.
    /// Empty on success.
    pub remaining: String,
}

struct Progress {
    remaining: usize,
    values: ValueVec,
}

impl<H> RouteTrie<H> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            literal: HashMap::new(),
            regex: Vec::new(),
            typed: [None, None, None, None],
            generic: None,
            hard_end: None,
            soft_end: None,
            greedy: false,
        }
    }

    /// Register `handler` for `pattern` under `methods` (all but HEAD when empty).
    ///
    /// The pattern and the method list are validated in full before the trie
    /// is touched. Returns the endpoint of the full pattern so the caller can
    /// attach CORS policy or an OPTIONS responder.
    pub fn handle<S: AsRef<str>>(
        &mut self,
        pattern: &str,
        handler: H,
        methods: &[S],
    ) -> Result<&mut Endpoint<H>, RouteError>
    where
        H: Clone,
    {
        let methods: Vec<Method> = if methods.is_empty() {
            DEFAULT_METHODS.to_vec()
        } else {
            methods
                .iter()
                .map(|m| parse_method(m.as_ref()))
                .collect::<Result<_, _>>()?
        };

        let (raw_segments, trailing) = split_path(pattern);
        let segments = raw_segments
            .iter()
            .map(|s| parse_segment(pattern, s))
            .collect::<Result<Vec<PatternSegment>, RouteError>>()?;

        let greedy_tail = segments.last().is_some_and(|s| s.wildcard);
        let mut variants = variants(&segments);
        // The last variant keeps every segment.
        let full = variants.pop().unwrap_or_default();

        for variant in &variants {
            let picked: Vec<&PatternSegment> = variant.iter().map(|&i| &segments[i]).collect();
            let greedy = greedy_tail && variant.last() == Some(&(segments.len() - 1));
            self.insert(pattern, &picked, greedy, trailing)
                .bind(handler.clone(), &methods);
        }

        let picked: Vec<&PatternSegment> = full.iter().map(|&i| &segments[i]).collect();
        let endpoint = self.insert(pattern, &picked, greedy_tail, trailing);
        endpoint.bind(handler, &methods);
        Ok(endpoint)
    }

    fn insert(
        &mut self,
        pattern: &str,
        segments: &[&PatternSegment],
        greedy_tail: bool,
        trailing: bool,
    ) -> &mut Endpoint<H> {
        let mut names: Vec<Arc<str>> = Vec::new();
        let mut node = self;
        for (i, segment) in segments.iter().enumerate() {
            if let Some(name) = &segment.name {
                names.push(Arc::from(name.as_str()));
            }
            node = node.child_mut(segment);
            if greedy_tail && i + 1 == segments.len() {
                node.greedy = true;
            }
        }
        let slot = if trailing {
            &mut node.soft_end
        } else {
            &mut node.hard_end
        };
        let endpoint = slot.get_or_insert_with(|| Endpoint::new(pattern, Vec::new()));
        endpoint.rebind(pattern, names);
        endpoint
    }

    fn child_mut(&mut self, segment: &PatternSegment) -> &mut RouteTrie<H> {
        match &segment.kind {
            SegmentKind::Literal(text) => self.literal.entry(text.clone()).or_default(),
            SegmentKind::Regex { source, regex } => {
                let idx = match self.regex.iter().position(|c| c.source == *source) {
                    Some(idx) => idx,
                    None => {
                        self.regex.push(RegexChild {
                            source: source.clone(),
                            regex: regex.clone(),
                            node: RouteTrie::new(),
                        });
                        self.regex.len() - 1
                    }
                };
                &mut self.regex[idx].node
            }
            SegmentKind::Typed(kind) => {
                &mut **self.typed[kind.index()].get_or_insert_with(|| Box::new(RouteTrie::new()))
            }
            SegmentKind::Generic => {
                &mut **self.generic.get_or_insert_with(|| Box::new(RouteTrie::new()))
            }
        }
    }

    /// Resolve already-split request segments.
    pub fn find_endpoint<'a>(&'a self, segments: &[&str], trailing_slash: bool) -> TrieLookup<'a, H> {
        let mut values = ValueVec::new();
        let mut progress = Progress {
            remaining: segments.len() + 1,
            values: ValueVec::new(),
        };
        match self.search(segments, trailing_slash, &mut values, &mut progress) {
            Some(endpoint) => TrieLookup {
                endpoint: Some(endpoint),
                values,
                remaining: String::new(),
            },
            None => {
                let consumed = segments.len().saturating_sub(progress.remaining);
                TrieLookup {
                    endpoint: None,
                    values: progress.values,
                    remaining: segments[consumed..].join("/"),
                }
            }
        }
    }

    /// Split `path` and resolve it.
    pub fn find_path<'a>(&'a self, path: &str) -> TrieLookup<'a, H> {
        let (segments, trailing) = split_path(path);
        self.find_endpoint(&segments, trailing)
    }

    fn search<'a>(
        &'a self,
        segments: &[&str],
        trailing: bool,
        values: &mut ValueVec,
        progress: &mut Progress,
    ) -> Option<&'a Endpoint<H>> {
        if segments.len() < progress.remaining {
            progress.remaining = segments.len();
            progress.values = values.clone();
        }

        let Some((&segment, rest)) = segments.split_first() else {
            return if trailing {
                self.soft_end.as_ref()
            } else {
                self.hard_end.as_ref()
            };
        };

        let stem = if rest.is_empty() {
            split_extension(segment).map(|(stem, _)| stem)
        } else {
            None
        };
        let candidates: SmallVec<[&str; 2]> = std::iter::once(segment).chain(stem).collect();

        for candidate in &candidates {
            if let Some(child) = self.literal.get(*candidate) {
                if let Some(found) = child.search(rest, trailing, values, progress) {
                    return Some(found);
                }
            }
        }

        for child in &self.regex {
            if let Some(candidate) = candidates.iter().find(|c| child.regex.is_match(c)) {
                if let Some(found) = descend(&child.node, candidate, rest, trailing, values, progress)
                {
                    return Some(found);
                }
            }
        }

        for kind in super::segment::NumericKind::ALL {
            if let Some(child) = &self.typed[kind.index()] {
                if let Some(candidate) = candidates.iter().find(|c| kind.accepts(c)) {
                    if let Some(found) = descend(child, candidate, rest, trailing, values, progress) {
                        return Some(found);
                    }
                }
            }
        }

        if let Some(child) = &self.generic {
            if let Some(found) = descend(child, segment, rest, trailing, values, progress) {
                return Some(found);
            }
        }

        if self.greedy {
            let end = if trailing { &self.soft_end } else { &self.hard_end };
            if let Some(endpoint) = end.as_ref() {
                if let Some(last) = values.last_mut() {
                    for s in segments {
                        last.push('/');
                        last.push_str(s);
                    }
                }
                return Some(endpoint);
            }
        }

        None
    }

    /// Every endpoint in this trie, sorted by pattern.
    #[must_use]
    pub fn endpoints(&self) -> Vec<&Endpoint<H>> {
        let mut out = Vec::new();
        self.collect(&mut out);
        out.sort_by(|a, b| a.pattern().cmp(b.pattern()));
        out
    }

    fn collect<'a>(&'a self, out: &mut Vec<&'a Endpoint<H>>) {
        out.extend(self.hard_end.iter());
        out.extend(self.soft_end.iter());
        for child in self.literal.values() {
            child.collect(out);
        }
        for child in &self.regex {
            child.node.collect(out);
        }
        for child in self.typed.iter().flatten() {
            child.collect(out);
        }
        if let Some(child) = &self.generic {
            child.collect(out);
        }
    }

    /// Apply `f` to every endpoint last registered through `pattern`,
    /// including the zero-length variants of its wildcards.
    ///
    /// Returns how many endpoints were updated.
    pub fn update_pattern<F>(&mut self, pattern: &str, f: &mut F) -> usize
    where
        F: FnMut(&mut Endpoint<H>),
    {
        let mut updated = 0;
        for endpoint in [&mut self.hard_end, &mut self.soft_end].into_iter().flatten() {
            if endpoint.pattern() == pattern {
                f(endpoint);
                updated += 1;
            }
        }
        for child in self.literal.values_mut() {
            updated += child.update_pattern(pattern, f);
        }
        for child in &mut self.regex {
            updated += child.node.update_pattern(pattern, f);
        }
        for child in self.typed.iter_mut().flatten() {
            updated += child.update_pattern(pattern, f);
        }
        if let Some(child) = &mut self.generic {
            updated += child.update_pattern(pattern, f);
        }
        updated
    }

    /// True when no route has been registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hard_end.is_none()
            && self.soft_end.is_none()
            && self.literal.is_empty()
            && self.regex.is_empty()
            && self.generic.is_none()
            && self.typed.iter().all(Option::is_none)
    }
}

fn descend<'a, H>(
    child: &'a RouteTrie<H>,
    captured: &str,
    rest: &[&str],
    trailing: bool,
    values: &mut ValueVec,
    progress: &mut Progress,
) -> Option<&'a Endpoint<H>> {
    values.push(captured.to_string());
    let found = child.search(rest, trailing, values, progress);
    if found.is_none() {
        values.pop();
    }
    found
}

/// Index lists for every way of keeping or dropping wildcard segments.
///
/// Variants that drop a wildcard come before the ones that keep it, and the
/// list always ends with the variant that keeps everything.
fn variants(segments: &[PatternSegment]) -> Vec<Vec<usize>> {
    let mut out: Vec<Vec<usize>> = vec![Vec::new()];
    for (i, segment) in segments.iter().enumerate() {
        if segment.wildcard {
            let mut next = Vec::with_capacity(out.len() * 2);
            for v in &out {
                next.push(v.clone());
            }
            for v in &out {
                let mut kept = v.clone();
                kept.push(i);
                next.push(kept);
            }
            out = next;
        } else {
            for v in &mut out {
                v.push(i);
            }
        }
    }
    out
}
