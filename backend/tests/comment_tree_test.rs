/// Comment trees through the document store
use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;
use std::thread;
use wiki::application::dto::CommentRequest;
use wiki::application::repositories::PageRepository;
use wiki::application::use_cases::AddComment;
use wiki::domain::*;
use wiki::infrastructure::persistence::{Database, SqlitePageRepository};

/// A chain of `depth` nested replies, each level also carrying `fan_out - 1`
/// leaf siblings after the branch that continues downward.
fn build_tree(depth: usize, fan_out: usize, label: &str) -> Comment {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let mut node = Comment::new(format!("{}-{}", label, depth), start + Duration::seconds(depth as i64));
    if depth > 1 {
        node.reply(build_tree(depth - 1, fan_out, label));
        for leaf in 1..fan_out {
            node.reply(Comment::new(
                format!("{}-{}-leaf{}", label, depth, leaf),
                start + Duration::milliseconds(leaf as i64),
            ));
        }
    }
    node
}

fn shape(comments: &[Comment]) -> Vec<(ObjectId, String, usize)> {
    let mut out = Vec::new();
    for top in comments {
        for c in top.iter() {
            out.push((*c.comment_id(), c.body().to_string(), c.replies().len()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_tree_round_trip() {
        let repo = SqlitePageRepository::new_in_memory().unwrap();

        let mut page = Page::new("threads", "a busy page");
        page.add_comment(build_tree(12, 3, "a"));
        page.add_comment(build_tree(1, 1, "b"));
        page.add_comment(build_tree(4, 2, "c"));
        let expected = page.comments().to_vec();

        repo.save(&mut page, false).unwrap();
        let loaded = repo.load("threads").unwrap();

        assert_eq!(loaded.comments(), expected.as_slice());
        assert_eq!(shape(loaded.comments()), shape(&expected));
        assert_eq!(loaded.comments()[0].depth(), 12);
        assert_eq!(loaded.comments()[1].depth(), 1);
        assert_eq!(loaded.comment_count(), page.comment_count());
    }

    #[test]
    fn test_update_keeps_comment_tree() {
        let repo = SqlitePageRepository::new_in_memory().unwrap();

        let mut page = Page::new("threads", "v1");
        page.add_comment(build_tree(5, 2, "a"));
        repo.save(&mut page, false).unwrap();
        let expected = page.comments().to_vec();

        // The edit form never carries comments
        let mut edit = Page::with_id(*page.id(), "threads", "v2");
        repo.save(&mut edit, true).unwrap();

        let loaded = repo.load("threads").unwrap();
        assert_eq!(loaded.body(), "v2");
        assert_eq!(loaded.comments(), expected.as_slice());
    }

    #[test]
    fn test_reply_deep_in_tree_persists() {
        let repo = SqlitePageRepository::new_in_memory().unwrap();

        let mut page = Page::new("threads", "");
        page.add_comment(build_tree(6, 1, "a"));
        repo.save(&mut page, false).unwrap();

        let mut page = repo.load("threads").unwrap();
        let deepest = *page.all_comments().last().unwrap().comment_id();
        let reply = Comment::new("bottom", Utc::now());
        let reply_id = *reply.comment_id();
        page.reply_to(&deepest, reply).unwrap();
        let last_update = page.last_update();
        repo.save_comments(&page).unwrap();

        let loaded = repo.load("threads").unwrap();
        assert_eq!(loaded.comments()[0].depth(), 7);
        assert_eq!(loaded.find_comment(&reply_id).unwrap().body(), "bottom");
        assert_eq!(loaded.last_update(), last_update);
    }

    #[test]
    fn test_tree_survives_reconnect() {
        let dir = tempfile::tempdir().unwrap();
        let config = wiki::config::StoreConfig {
            location: wiki::config::StoreLocation::file(dir.path(), "gowiki"),
            ..wiki::config::StoreConfig::in_memory()
        };

        let expected = {
            let repo = SqlitePageRepository::new(Arc::new(Database::connect(&config).unwrap()));
            let mut page = Page::new("threads", "");
            page.add_comment(build_tree(20, 2, "deep"));
            repo.save(&mut page, false).unwrap();
            page.comments().to_vec()
        };

        let repo = SqlitePageRepository::new(Arc::new(Database::connect(&config).unwrap()));
        let loaded = repo.load("threads").unwrap();
        assert_eq!(loaded.comments(), expected.as_slice());
        assert_eq!(loaded.comments()[0].depth(), 20);
    }

    #[test]
    fn test_very_deep_tree_round_trip() {
        let repo = SqlitePageRepository::new_in_memory().unwrap();

        let mut page = Page::new("abyss", "");
        page.add_comment(build_tree(300, 1, "deep"));
        let expected = page.comments().to_vec();
        repo.save(&mut page, false).unwrap();
        repo.save(&mut Page::new("shallow", ""), false).unwrap();

        let loaded = repo.load("abyss").unwrap();
        assert_eq!(loaded.comments()[0].depth(), 300);
        assert_eq!(shape(loaded.comments()), shape(&expected));

        // One deep page must not break listing the rest of the wiki
        assert_eq!(repo.list_all().unwrap().len(), 2);
        assert_eq!(repo.search("ab").unwrap().len(), 1);

        // Updating the deep page keeps its tree
        let mut edit = Page::with_id(*page.id(), "abyss", "edited");
        repo.save(&mut edit, true).unwrap();
        let loaded = repo.load("abyss").unwrap();
        assert_eq!(loaded.body(), "edited");
        assert_eq!(loaded.comments()[0].depth(), 300);
    }

    #[test]
    fn test_reply_chain_through_add_comment() {
        let repo = SqlitePageRepository::new_in_memory().unwrap();
        repo.save(&mut Page::new("chain", ""), false).unwrap();

        let use_case = AddComment::new(&repo);
        let mut parent = use_case.execute(CommentRequest::new("chain", "level 1")).unwrap();
        for level in 2..=200 {
            parent = use_case
                .execute(
                    CommentRequest::new("chain", format!("level {}", level))
                        .replying_to(parent.comment_id().to_hex()),
                )
                .unwrap();
        }

        let loaded = repo.load("chain").unwrap();
        assert_eq!(loaded.comments()[0].depth(), 200);
        assert_eq!(loaded.all_comments().last().unwrap().comment_id(), parent.comment_id());
    }

    #[test]
    fn test_concurrent_replies_to_one_comment() {
        let repo = Arc::new(SqlitePageRepository::new_in_memory().unwrap());
        repo.save(&mut Page::new("busy", ""), false).unwrap();
        let root = AddComment::new(&*repo)
            .execute(CommentRequest::new("busy", "root"))
            .unwrap();
        let root_id = root.comment_id().to_hex();

        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let repo = Arc::clone(&repo);
                let root_id = root_id.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        let body = format!("worker {} reply {}", worker, i);
                        AddComment::new(&*repo)
                            .execute(CommentRequest::new("busy", body).replying_to(root_id.clone()))
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let page = repo.load("busy").unwrap();
        assert_eq!(page.comments().len(), 1);
        assert_eq!(page.comments()[0].replies().len(), 200);
        assert_eq!(page.comment_count(), 201);
    }

    #[test]
    fn test_pre_order_walk() {
        let tree = build_tree(3, 2, "t");
        let bodies: Vec<&str> = tree.iter().map(|c| c.body()).collect();
        assert_eq!(bodies, vec!["t-3", "t-2", "t-1", "t-2-leaf1", "t-3-leaf1"]);
        assert_eq!(tree.count(), 5);
    }
}
