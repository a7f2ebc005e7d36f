//! Depth-first discovery of posts anywhere in a JSON payload.

use std::collections::HashSet;

use reelrank_core::PostRecord;
use serde_json::Value;

use crate::context::ExtractionContext;
use crate::normalize::{classify_node, Classification, Rejection};

pub const DEFAULT_MAX_DEPTH: usize = 25;

/// Member keys that only ever hold type labels, never post data.
const SKIPPED_KEYS: &[&str] = &["__typename", "logging_page_id"];

/// Posts found in one payload.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Distinct posts in discovery order.
    pub posts: Vec<PostRecord>,
    /// Every id recognized in this payload, including out-of-scope ones.
    pub seen: HashSet<String>,
    /// Posts dropped because their owner is a different profile.
    pub out_of_scope: usize,
    /// Containers left unvisited because they sat below the depth limit.
    pub truncated_branches: usize,
}

/// Walks JSON trees and collects the posts in them.
#[derive(Debug, Clone)]
pub struct TreeExtractor {
    max_depth: usize,
    profile: Option<String>,
}

impl Default for TreeExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl TreeExtractor {
    #[must_use]
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            profile: None,
        }
    }

    /// Restricts extraction to posts owned by `profile`.
    ///
    /// Posts whose owner cannot be resolved are always kept.
    #[must_use]
    pub fn with_profile(mut self, profile: Option<&str>) -> Self {
        self.profile = profile
            .map(|p| p.trim().trim_start_matches('@').to_lowercase())
            .filter(|p| !p.is_empty());
        self
    }

    #[must_use]
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Collects every distinct post in `root`. The first occurrence of an id
    /// wins; later duplicates in the same payload are ignored.
    #[must_use]
    pub fn extract(&self, root: &Value, now: i64) -> Extraction {
        let mut out = Extraction::default();
        self.walk(root, ExtractionContext::default(), 0, now, &mut out);
        out
    }

    fn walk<'a>(
        &self,
        value: &'a Value,
        ctx: ExtractionContext<'a>,
        depth: usize,
        now: i64,
        out: &mut Extraction,
    ) {
        if depth > self.max_depth {
            if value.is_object() || value.is_array() {
                out.truncated_branches += 1;
            }
            return;
        }

        match value {
            Value::Array(items) => {
                for item in items {
                    self.walk(item, ctx, depth + 1, now, out);
                }
            }
            Value::Object(node) => {
                let ctx = ctx.descend(node);
                match classify_node(node, ctx, now) {
                    Classification::Post(post) => self.record(*post, out),
                    Classification::NotAPost(reason) => {
                        if reason != Rejection::MissingIdentifier {
                            tracing::trace!(?reason, depth, "identifier-bearing node rejected");
                        }
                    }
                }
                // Media nodes can nest further media (carousels, remixes).
                for (key, child) in node {
                    if SKIPPED_KEYS.contains(&key.as_str()) {
                        continue;
                    }
                    self.walk(child, ctx, depth + 1, now, out);
                }
            }
            _ => {}
        }
    }

    fn record(&self, post: PostRecord, out: &mut Extraction) {
        if !out.seen.insert(post.id.clone()) {
            return;
        }
        if let Some(profile) = self.profile.as_deref() {
            if !post.owner.is_empty() && post.owner != profile {
                tracing::trace!(id = %post.id, owner = %post.owner, profile, "post outside profile scope");
                out.out_of_scope += 1;
                return;
            }
        }
        out.posts.push(post);
    }
}
