//! Batch tag loading for post pages / 批量加载文章标签

use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;

use crate::error::Result;
use crate::models::Post;
use crate::storage::PostStore;

/// Group `(key, value)` rows into `key -> set of values`
pub fn group_into_sets<K, V, I>(rows: I) -> HashMap<K, BTreeSet<V>>
where
    K: Eq + Hash,
    V: Ord,
    I: IntoIterator<Item = (K, V)>,
{
    let mut groups: HashMap<K, BTreeSet<V>> = HashMap::new();
    for (key, value) in rows {
        groups.entry(key).or_default().insert(value);
    }
    groups
}

/// Attaches tag sets to posts with a single storage round trip
pub struct PostAssembler<'a, S: PostStore + ?Sized> {
    store: &'a S,
}

impl<'a, S: PostStore + ?Sized> PostAssembler<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Replace every post's tags; posts with no tag rows get an empty set
    pub async fn attach_tags(&self, posts: &mut [Post]) -> Result<()> {
        if posts.is_empty() {
            return Ok(());
        }

        let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
        let mut tags = self.store.fetch_tags_for_post_ids(&ids).await?;

        for post in posts.iter_mut() {
            post.tags = tags.remove(&post.id).unwrap_or_default();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Tag;
    use crate::search::SearchCriteria;
    use crate::storage::PostTags;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Store that only serves tags and counts calls
    struct TagOnlyStore {
        tags: Vec<(i64, Tag)>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl PostStore for TagOnlyStore {
        async fn count_matching(&self, _criteria: &SearchCriteria) -> Result<u64> {
            Ok(0)
        }

        async fn fetch_page(&self, _criteria: &SearchCriteria, _offset: u64, _limit: u32) -> Result<Vec<Post>> {
            Ok(vec![])
        }

        async fn fetch_tags_for_post_ids(&self, ids: &[i64]) -> Result<PostTags> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(group_into_sets(
                self.tags.iter().filter(|(id, _)| ids.contains(id)).cloned(),
            ))
        }
    }

    fn tag(id: i64, name: &str) -> Tag {
        Tag { id, name: name.to_string() }
    }

    fn post(id: i64) -> Post {
        Post { id, title: format!("Post {}", id), ..Default::default() }
    }

    #[test]
    fn test_group_into_sets_dedups() {
        let groups = group_into_sets(vec![(1, "a"), (2, "b"), (1, "a"), (1, "c")]);
        assert_eq!(groups[&1].len(), 2);
        assert_eq!(groups[&2].len(), 1);
    }

    #[tokio::test]
    async fn test_empty_input_skips_query() {
        let store = TagOnlyStore { tags: vec![], calls: AtomicUsize::new(0) };
        let mut posts: Vec<Post> = vec![];
        PostAssembler::new(&store).attach_tags(&mut posts).await.unwrap();
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_attach_in_one_call() {
        let store = TagOnlyStore {
            tags: vec![(1, tag(10, "java")), (1, tag(11, "spring")), (3, tag(10, "java"))],
            calls: AtomicUsize::new(0),
        };
        let mut posts = vec![post(3), post(2), post(1)];
        posts[1].tags.insert(tag(99, "stale"));

        PostAssembler::new(&store).attach_tags(&mut posts).await.unwrap();

        assert_eq!(store.calls.load(Ordering::SeqCst), 1);
        assert_eq!(posts[0].tags.len(), 1);
        assert!(posts[1].tags.is_empty());
        assert_eq!(posts[2].tags.len(), 2);
        assert_eq!(posts.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3, 2, 1]);
    }
}
