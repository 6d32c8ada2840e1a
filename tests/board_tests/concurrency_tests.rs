//! Tests for concurrent access
//!
//! These tests verify:
//! - Parallel comment writers never share an id
//! - Post allocation in different topics proceeds independently
//! - Rebuild interleaved with writers loses nothing

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use ledgerboard::store::Store;
use ledgerboard::{Board, CommentId, MemoryStore, PostId, TopicId};

// =============================================================================
// Helper Functions
// =============================================================================

fn shared_board() -> Arc<Board<MemoryStore>> {
    let board = Board::new(MemoryStore::new());
    let topic = board.create_topic("busy").unwrap();
    board.create_post(topic, "thread").unwrap();
    Arc::new(board)
}

// =============================================================================
// Writers
// =============================================================================

#[test]
fn test_concurrent_comments_get_distinct_ids() {
    let board = shared_board();
    let threads = 8;
    let per_thread = 25;
    let mut handles = vec![];

    for t in 0..threads {
        let board = Arc::clone(&board);
        handles.push(thread::spawn(move || {
            (0..per_thread)
                .map(|i| {
                    board
                        .create_comment(TopicId(0), PostId(0), &format!("user{}", t), &i.to_string())
                        .unwrap()
                })
                .collect::<Vec<CommentId>>()
        }));
    }

    let ids: Vec<CommentId> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    let total = threads * per_thread;

    let distinct: HashSet<CommentId> = ids.iter().copied().collect();
    assert_eq!(distinct.len(), total);
    assert_eq!(board.store().comment_count().unwrap(), total as u64);
    assert_eq!(board.store().scan_prefix("COMMENT").unwrap().len(), total);

    let listed: Vec<u64> = board
        .list_comments(TopicId(0), PostId(0))
        .unwrap()
        .iter()
        .map(|c| c.id.seq())
        .collect();
    assert_eq!(listed, (0..total as u64).collect::<Vec<_>>());
}

#[test]
fn test_concurrent_posts_across_topics() {
    let board = Arc::new(Board::new(MemoryStore::new()));
    for i in 0..4 {
        board.create_topic(&format!("t{}", i)).unwrap();
    }

    let mut handles = vec![];
    for t in 0..4u64 {
        for _ in 0..2 {
            let board = Arc::clone(&board);
            handles.push(thread::spawn(move || {
                for i in 0..10 {
                    board.create_post(TopicId(t), &format!("p{}", i)).unwrap();
                }
            }));
        }
    }
    for handle in handles {
        handle.join().unwrap();
    }

    for t in 0..4 {
        let ids: Vec<PostId> = board
            .list_posts(TopicId(t))
            .unwrap()
            .iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, (0..20).map(PostId).collect::<Vec<_>>());
        assert_eq!(board.store().post_count(TopicId(t)).unwrap(), 20);
    }
}

#[test]
fn test_concurrent_topics_are_dense() {
    let board = Arc::new(Board::new(MemoryStore::new()));
    let mut handles = vec![];

    for t in 0..6 {
        let board = Arc::clone(&board);
        handles.push(thread::spawn(move || {
            for i in 0..10 {
                board.create_topic(&format!("{}-{}", t, i)).unwrap();
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }

    let ids: Vec<u64> = board.list_topics().iter().map(|t| t.id.seq()).collect();
    assert_eq!(ids, (0..60).collect::<Vec<_>>());
}

// =============================================================================
// Writers and Rebuild
// =============================================================================

#[test]
fn test_rebuild_during_writes() {
    let board = shared_board();
    let mut handles = vec![];

    for _ in 0..4 {
        let board = Arc::clone(&board);
        handles.push(thread::spawn(move || {
            for i in 0..50 {
                board
                    .create_comment(TopicId(0), PostId(0), "w", &i.to_string())
                    .unwrap();
            }
        }));
    }

    {
        let board = Arc::clone(&board);
        handles.push(thread::spawn(move || {
            for _ in 0..10 {
                board.rebuild().unwrap();
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let live = board.snapshot();
    assert_eq!(live.comment_count(), 200);

    board.rebuild().unwrap();
    assert_eq!(board.snapshot(), live);
}

#[test]
fn test_readers_alongside_writers() {
    let board = shared_board();
    let writer = {
        let board = Arc::clone(&board);
        thread::spawn(move || {
            for i in 0..100 {
                board
                    .create_comment(TopicId(0), PostId(0), "w", &i.to_string())
                    .unwrap();
            }
        })
    };

    let mut readers = vec![];
    for _ in 0..4 {
        let board = Arc::clone(&board);
        readers.push(thread::spawn(move || {
            let mut last = 0;
            for _ in 0..100 {
                let seen = board.list_comments(TopicId(0), PostId(0)).unwrap().len();
                assert!(seen >= last);
                last = seen;
            }
        }));
    }

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(board.list_comments(TopicId(0), PostId(0)).unwrap().len(), 100);
}
