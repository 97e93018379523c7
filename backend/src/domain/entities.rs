/// Domain entities
use super::base::Entity;
use super::value_objects::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A Comment on a page or a reply to another comment.
/// Replies nest to any depth. A comment owns its replies and has no link back
/// to its parent, so a comment tree cannot contain a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    #[serde(rename = "commentId")]
    comment_id: ObjectId,
    body: String,
    #[serde(rename = "commentDate")]
    comment_date: DateTime<Utc>,
    #[serde(default)]
    comments: Vec<Comment>,
}

impl Comment {
    /// Create a new comment with a freshly generated identifier
    pub fn new(body: impl Into<String>, comment_date: DateTime<Utc>) -> Self {
        Comment::with_id(ObjectId::generate(), body, comment_date)
    }

    /// Create a comment with a known identifier
    pub fn with_id(comment_id: ObjectId, body: impl Into<String>, comment_date: DateTime<Utc>) -> Self {
        Comment {
            comment_id,
            body: body.into(),
            comment_date,
            comments: Vec::new(),
        }
    }

    pub fn comment_id(&self) -> &ObjectId {
        &self.comment_id
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn comment_date(&self) -> DateTime<Utc> {
        self.comment_date
    }

    /// Direct replies, in the order they were added
    pub fn replies(&self) -> &[Comment] {
        &self.comments
    }

    pub fn has_replies(&self) -> bool {
        !self.comments.is_empty()
    }

    /// Append a reply at the end of this comment's replies
    pub fn reply(&mut self, comment: Comment) {
        self.comments.push(comment);
    }

    /// Number of levels in this subtree (a comment with no replies has depth 1)
    pub fn depth(&self) -> usize {
        1 + self.comments.iter().map(Comment::depth).max().unwrap_or(0)
    }

    /// Number of comments in this subtree, including this one
    pub fn count(&self) -> usize {
        1 + self.comments.iter().map(Comment::count).sum::<usize>()
    }

    /// Find a comment in this subtree by identifier
    pub fn find(&self, id: &ObjectId) -> Option<&Comment> {
        if &self.comment_id == id {
            return Some(self);
        }
        self.comments.iter().find_map(|c| c.find(id))
    }

    /// Find a comment in this subtree by identifier, mutably
    pub fn find_mut(&mut self, id: &ObjectId) -> Option<&mut Comment> {
        if &self.comment_id == id {
            return Some(self);
        }
        self.comments.iter_mut().find_map(|c| c.find_mut(id))
    }

    /// Iterate the subtree depth-first, parents before their replies
    pub fn iter(&self) -> CommentIter<'_> {
        CommentIter { stack: vec![self] }
    }
}

impl Entity for Comment {
    type Id = ObjectId;

    fn id(&self) -> &Self::Id {
        &self.comment_id
    }
}

/// Pre-order walk over a comment forest
pub struct CommentIter<'a> {
    stack: Vec<&'a Comment>,
}

impl<'a> CommentIter<'a> {
    pub(crate) fn over(comments: &'a [Comment]) -> Self {
        CommentIter {
            stack: comments.iter().rev().collect(),
        }
    }
}

impl<'a> Iterator for CommentIter<'a> {
    type Item = &'a Comment;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.comments.iter().rev());
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_new_comment_has_no_replies() {
        let comment = Comment::new("first!", at(10));
        assert!(!comment.comment_id().is_nil());
        assert_eq!(comment.body(), "first!");
        assert_eq!(comment.comment_date(), at(10));
        assert!(!comment.has_replies());
        assert_eq!(comment.depth(), 1);
        assert_eq!(comment.count(), 1);
    }

    #[test]
    fn test_replies_keep_insertion_order() {
        let mut root = Comment::new("root", at(1));
        root.reply(Comment::new("a", at(2)));
        root.reply(Comment::new("b", at(3)));
        root.reply(Comment::new("c", at(4)));

        let bodies: Vec<&str> = root.replies().iter().map(|c| c.body()).collect();
        assert_eq!(bodies, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_find_nested_comment() {
        let mut root = Comment::new("root", at(1));
        let mut child = Comment::new("child", at(2));
        let grandchild = Comment::new("grandchild", at(3));
        let grandchild_id = *grandchild.comment_id();
        child.reply(grandchild);
        root.reply(child);

        assert_eq!(root.find(&grandchild_id).unwrap().body(), "grandchild");
        assert!(root.find(&ObjectId::generate()).is_none());

        root.find_mut(&grandchild_id)
            .unwrap()
            .reply(Comment::new("great-grandchild", at(4)));
        assert_eq!(root.depth(), 4);
        assert_eq!(root.count(), 4);
    }

    #[test]
    fn test_iter_is_depth_first() {
        let mut root = Comment::new("1", at(1));
        let mut a = Comment::new("1.1", at(2));
        a.reply(Comment::new("1.1.1", at(3)));
        root.reply(a);
        root.reply(Comment::new("1.2", at(4)));

        let order: Vec<&str> = root.iter().map(|c| c.body()).collect();
        assert_eq!(order, vec!["1", "1.1", "1.1.1", "1.2"]);
    }

    #[test]
    fn test_serialized_field_names() {
        let comment = Comment::new("hi", at(0));
        let value = serde_json::to_value(&comment).unwrap();
        assert!(value.get("commentId").is_some());
        assert!(value.get("commentDate").is_some());
        assert_eq!(value["body"], "hi");
        assert_eq!(value["comments"], serde_json::json!([]));
    }

    #[test]
    fn test_missing_replies_field_deserializes_empty() {
        let json = serde_json::json!({
            "commentId": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "body": "legacy",
            "commentDate": "2020-01-01T00:00:00Z"
        });
        let comment: Comment = serde_json::from_value(json).unwrap();
        assert!(comment.replies().is_empty());
    }
}
