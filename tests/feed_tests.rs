//! NewsFeed unit tests

#[cfg(test)]
mod tests {
    use world_news::{
        feed::NewsFeed,
        types::{FeedLimits, ZonePos, DEFAULT_ZONE, MAX_ENTRIES, TTL_MS},
    };

    const NOW: i64 = 1_700_000_000_000;

    fn ticks(events: &[world_news::NewsEvent]) -> Vec<i64> {
        events.iter().map(|ev| ev.tick).collect()
    }

    // -----------------------------------------------------------------------
    // Append & capacity
    // -----------------------------------------------------------------------

    #[test]
    fn capacity_never_exceeded_and_oldest_dropped() {
        let mut feed = NewsFeed::new();
        for tick in 0..(MAX_ENTRIES as i64 + 25) {
            feed.add(tick, "event", DEFAULT_ZONE, 0, 0, NOW);
            assert!(feed.len() <= MAX_ENTRIES);
        }
        assert_eq!(feed.len(), MAX_ENTRIES);

        let kept = ticks(feed.entries());
        assert_eq!(kept.first(), Some(&25));
        assert_eq!(kept.last(), Some(&(MAX_ENTRIES as i64 + 24)));
        assert!(kept.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn custom_limit_trims_in_bulk() {
        let mut feed = NewsFeed::new().with_limits(FeedLimits {
            max_entries: 3,
            ..Default::default()
        });
        for tick in 1..=5 {
            feed.add(tick, "e", "", 0, 0, NOW);
        }
        assert_eq!(ticks(feed.entries()), vec![3, 4, 5]);
    }

    #[test]
    fn lowering_capacity_trims_immediately() {
        let mut feed = NewsFeed::new();
        for tick in 1..=5 {
            feed.add(tick, "e", "", 0, 0, NOW);
        }
        feed.mark_clean();

        feed.set_limits(FeedLimits {
            max_entries: 2,
            ..Default::default()
        });
        assert_eq!(ticks(feed.entries()), vec![4, 5]);
        assert!(feed.is_dirty());

        feed.mark_clean();
        feed.set_limits(FeedLimits::default());
        assert_eq!(feed.len(), 2);
        assert!(!feed.is_dirty());
    }

    #[test]
    fn merge_older_puts_history_first_and_respects_capacity() {
        let mut older = NewsFeed::new();
        for tick in 1..=3 {
            older.add(tick, "old", "", 0, 0, NOW);
        }
        let mut feed = NewsFeed::new().with_limits(FeedLimits {
            max_entries: 4,
            ..Default::default()
        });
        feed.add(10, "new", "", 0, 0, NOW);
        feed.add(11, "newer", "", 0, 0, NOW);

        feed.merge_older(older);
        assert_eq!(ticks(feed.entries()), vec![2, 3, 10, 11]);
    }

    #[test]
    fn blank_text_is_dropped() {
        let mut feed = NewsFeed::new();
        feed.add(1, "", "zone", 0, 0, NOW);
        feed.add(2, "   ", "zone", 0, 0, NOW);
        assert!(feed.is_empty());
        assert!(!feed.is_dirty());
    }

    #[test]
    fn blank_zone_defaults() {
        let mut feed = NewsFeed::new();
        feed.add(1, "x", "", 0, 0, NOW);
        assert_eq!(feed.entries()[0].zone_id, DEFAULT_ZONE);
    }

    #[test]
    fn malformed_zone_is_stored_verbatim() {
        let mut feed = NewsFeed::new();
        feed.add(1, "x", "Not A Zone!", 0, 0, NOW);
        assert_eq!(feed.entries()[0].zone_id, "Not A Zone!");
    }

    #[test]
    fn non_positive_timestamp_is_stamped_now() {
        let mut feed = NewsFeed::new();
        feed.add(1, "zero", "", 0, 0, 0);
        feed.add(2, "negative", "", 0, 0, -5);
        assert!(feed.entries().iter().all(|ev| ev.created_at_ms > 0));
    }

    #[test]
    fn add_marks_dirty() {
        let mut feed = NewsFeed::new();
        feed.add(1, "x", "", 0, 0, NOW);
        assert!(feed.is_dirty());
        feed.mark_clean();
        assert!(!feed.is_dirty());
    }

    #[test]
    fn legacy_and_located_overloads() {
        let mut feed = NewsFeed::new();
        feed.add_legacy(1, "legacy");
        feed.add_at(2, "located", &ZonePos::new("minecraft:the_nether", 12, -40));

        let legacy = &feed.entries()[0];
        assert_eq!(legacy.zone_id, DEFAULT_ZONE);
        assert_eq!((legacy.x, legacy.z), (0, 0));
        assert!(legacy.created_at_ms > 0);

        let located = &feed.entries()[1];
        assert_eq!(located.zone_id, "minecraft:the_nether");
        assert_eq!((located.x, located.z), (12, -40));
        assert!(located.created_at_ms > 0);
    }

    // -----------------------------------------------------------------------
    // Pruning
    // -----------------------------------------------------------------------

    #[test]
    fn ttl_boundary_is_inclusive_retain() {
        let mut feed = NewsFeed::new();
        feed.add(1, "old", "", 0, 0, NOW);

        feed.prune_expired(NOW + TTL_MS - 1);
        assert_eq!(feed.len(), 1);

        feed.prune_expired(NOW + TTL_MS);
        assert_eq!(feed.len(), 1);

        feed.prune_expired(NOW + TTL_MS + 1);
        assert!(feed.is_empty());
    }

    #[test]
    fn expiry_preserves_survivor_order() {
        let mut feed = NewsFeed::new();
        feed.add(1, "a", "", 0, 0, NOW);
        feed.add(2, "b", "", 0, 0, NOW + 10);
        feed.add(3, "c", "", 0, 0, NOW + 20);
        feed.add(4, "d", "", 0, 0, NOW + 30);

        let report = feed.prune_expired(NOW + TTL_MS + 15);
        assert_eq!(report.expired, 2);
        assert_eq!(ticks(feed.entries()), vec![3, 4]);
    }

    #[test]
    fn legacy_entries_are_healed_not_deleted() {
        let mut feed: NewsFeed = serde_json::from_str(
            r#"{"entries":[{"tick":1,"text":"from an old save"}]}"#,
        )
        .unwrap();
        assert_eq!(feed.entries()[0].created_at_ms, 0);

        let report = feed.prune_expired(NOW);
        assert_eq!(report.healed, 1);
        assert_eq!(report.expired, 0);
        assert_eq!(feed.entries()[0].created_at_ms, NOW);
        assert!(feed.is_dirty());

        feed.prune_expired(NOW + TTL_MS + 1);
        assert!(feed.is_empty());
    }

    #[test]
    fn pruning_is_idempotent() {
        let mut feed = NewsFeed::new();
        feed.add(1, "a", "", 0, 0, NOW - TTL_MS - 100);
        feed.add(2, "b", "", 0, 0, NOW);
        feed.prune_expired(NOW);
        let after_first = feed.entries().to_vec();

        feed.mark_clean();
        let report = feed.prune_expired(NOW);
        assert!(!report.changed());
        assert!(!feed.is_dirty());
        assert_eq!(feed.entries(), after_first.as_slice());
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    #[test]
    fn latest_returns_suffix_in_forward_order() {
        let mut feed = NewsFeed::new();
        for tick in 1..=3 {
            feed.add(tick, "e", "", 0, 0, NOW);
        }
        assert_eq!(ticks(&feed.latest(2)), vec![2, 3]);
        assert_eq!(ticks(&feed.latest(10)), vec![1, 2, 3]);
        assert!(feed.latest(0).is_empty());
    }

    #[test]
    fn latest_does_not_prune() {
        let mut feed = NewsFeed::new();
        feed.add(1, "ancient", "", 0, 0, 1);
        assert_eq!(feed.latest(5).len(), 1);
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn latest_results_are_independent_copies() {
        let mut feed = NewsFeed::new();
        feed.add(1, "a", "", 0, 0, NOW);
        let snapshot = feed.latest(1);
        feed.add(2, "b", "", 0, 0, NOW);
        feed.prune_expired(NOW + TTL_MS + 1);
        assert_eq!(snapshot[0].text, "a");
    }

    #[test]
    fn spatial_filter_by_zone_and_radius() {
        let mut feed = NewsFeed::new();
        feed.add(1, "a", "zonea", 0, 0, NOW);
        feed.add(2, "b", "zonea", 100, 0, NOW);
        feed.add(3, "c", "zoneb", 0, 0, NOW);

        let near = feed.latest_near_at(NOW, "zonea", 0, 0, 10, 10);
        assert_eq!(ticks(&near), vec![1]);

        let wide = feed.latest_near_at(NOW, "zonea", 0, 0, 200, 10);
        assert_eq!(ticks(&wide), vec![2, 1]);
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let mut feed = NewsFeed::new();
        feed.add(1, "edge", "", 3, 4, NOW);
        assert_eq!(feed.latest_near_at(NOW, "", 0, 0, 5, 1).len(), 1);
        assert!(feed.latest_near_at(NOW, "", 0, 0, 4, 1).is_empty());
    }

    #[test]
    fn limit_stops_early_with_most_recent() {
        let mut feed = NewsFeed::new();
        for tick in 1..=100 {
            feed.add(tick, "e", "zone", tick as i32, 0, NOW);
        }
        let hits = feed.latest_near_at(NOW, "zone", 0, 0, i32::MAX, 5);
        assert_eq!(ticks(&hits), vec![100, 99, 98, 97, 96]);
    }

    #[test]
    fn zero_limit_is_empty_but_still_prunes() {
        let mut feed = NewsFeed::new();
        feed.add(1, "stale", "", 0, 0, NOW);
        let hits = feed.latest_near_at(NOW + TTL_MS + 1, "", 0, 0, 100, 0);
        assert!(hits.is_empty());
        assert!(feed.is_empty());
    }

    #[test]
    fn near_query_prunes_expired_first() {
        let mut feed = NewsFeed::new();
        feed.add(1, "stale", "", 0, 0, NOW);
        feed.add(2, "fresh", "", 0, 0, NOW + TTL_MS);
        let hits = feed.latest_near_at(NOW + TTL_MS + 1, DEFAULT_ZONE, 0, 0, 10, 10);
        assert_eq!(ticks(&hits), vec![2]);
        assert_eq!(feed.len(), 1);
    }

    #[test]
    fn wall_clock_near_query_keeps_fresh_events() {
        let mut feed = NewsFeed::new();
        feed.add_at(1, "just now", &ZonePos::new("zone", 5, 5));
        let hits = feed.latest_near("zone", 0, 0, 10, 3);
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn stats_track_tick_range() {
        let mut feed = NewsFeed::new();
        assert_eq!(feed.stats().oldest_tick, None);
        feed.add(4, "a", "", 0, 0, NOW);
        feed.add(9, "b", "", 0, 0, NOW);
        let stats = feed.stats();
        assert_eq!(stats.entries, 2);
        assert_eq!(stats.oldest_tick, Some(4));
        assert_eq!(stats.newest_tick, Some(9));
    }
}
