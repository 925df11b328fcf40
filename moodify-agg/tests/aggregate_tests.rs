//! Integration tests for the aggregation layer, run against the in-memory
//! fake stores.

use std::sync::Arc;

use uuid::Uuid;

use moodify_agg::fakes::{FakeCatalog, FakeCollection, FakeLibrary};
use moodify_agg::{Aggregator, HydrationStrategy};
use moodify_common::models::{NewPlaylist, NewSong};
use moodify_common::{EntityKind, Error, Mood};

struct Harness {
    catalog: Arc<FakeCatalog>,
    library: Arc<FakeLibrary>,
    collection: Arc<FakeCollection>,
    agg: Aggregator,
}

fn harness() -> Harness {
    let catalog = Arc::new(FakeCatalog::new());
    let library = Arc::new(FakeLibrary::new());
    let collection = Arc::new(FakeCollection::new());
    let agg = Aggregator::new(
        catalog.clone(),
        library.clone(),
        collection.clone(),
    );
    Harness {
        catalog,
        library,
        collection,
        agg,
    }
}

fn new_song(title: &str) -> NewSong {
    NewSong {
        title: title.to_string(),
        artist: "Test Artist".to_string(),
        mood: Mood::Chill,
        storage_path: format!("songs/{}.mp3", title),
        content_type: "audio/mpeg".to_string(),
    }
}

// ========================================
// Identifier resolution
// ========================================

#[tokio::test]
async fn unknown_user_resolves_to_empty_sets_not_error() {
    let h = harness();
    let ids = h.agg.resolve_library(Uuid::new_v4()).await.unwrap();
    assert!(ids.songs.is_empty());
    assert!(ids.playlists.is_empty());
}

#[tokio::test]
async fn resolution_failure_is_a_typed_upstream_error() {
    let h = harness();
    h.library.set_fail_reads(true);

    let err = h.agg.resolve_library(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, Error::Upstream { .. }), "got: {:?}", err);
    assert_eq!(err.discriminant(), "upstream_unavailable");
}

#[tokio::test]
async fn resolution_deduplicates_ids() {
    let h = harness();
    let user = Uuid::new_v4();
    let song = h.catalog.seed_song("One", "A", Mood::Happy);
    h.agg.add_song_to_library(user, song.id).await.unwrap();
    h.agg.add_song_to_library(user, song.id).await.unwrap();

    let ids = h.agg.resolve_library(user).await.unwrap();
    assert_eq!(ids.songs.len(), 1);
}

// ========================================
// Batch hydration
// ========================================

#[tokio::test]
async fn batch_hydration_result_is_subset_of_input() {
    let h = harness();
    let s1 = h.catalog.seed_song("One", "A", Mood::Happy);
    let s2 = h.catalog.seed_song("Two", "B", Mood::Sad);
    let unknown = Uuid::new_v4();

    let input = vec![s1.id, s2.id, unknown];
    let songs = h.agg.hydrate_songs(&input).await.unwrap();

    assert!(songs.len() <= input.len());
    assert_eq!(songs.len(), 2);
    for song in &songs {
        assert!(input.contains(&song.id));
    }
}

#[tokio::test]
async fn batch_hydration_with_one_unknown_id_returns_the_known_record() {
    let h = harness();
    let s1 = h.catalog.seed_song("One", "A", Mood::Energetic);

    let songs = h.agg.hydrate_songs(&[s1.id, Uuid::new_v4()]).await.unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].id, s1.id);
}

#[tokio::test]
async fn empty_input_short_circuits_without_a_network_call() {
    let h = harness();
    let songs = h.agg.hydrate_songs(&[]).await.unwrap();
    assert!(songs.is_empty());
    assert_eq!(h.catalog.batch_calls(), 0);
}

#[tokio::test]
async fn batch_failure_is_an_error_not_an_empty_list() {
    let h = harness();
    let s1 = h.catalog.seed_song("One", "A", Mood::Happy);
    h.catalog.set_fail_requests(true);

    let err = h.agg.hydrate_songs(&[s1.id]).await.unwrap_err();
    assert!(matches!(err, Error::Upstream { .. }), "got: {:?}", err);
}

#[tokio::test]
async fn hydrated_songs_carry_fresh_signed_urls() {
    let h = harness();
    let s1 = h.catalog.seed_song("One", "A", Mood::Romantic);

    let songs = h.agg.hydrate_songs(&[s1.id]).await.unwrap();
    let url = songs[0].signed_url.as_deref().unwrap();
    assert!(url.contains(&s1.storage_path), "got: {}", url);
}

#[tokio::test]
async fn missing_storage_object_yields_null_url_not_a_failure() {
    let h = harness();
    let s1 = h.catalog.seed_song("One", "A", Mood::Happy);
    let s2 = h.catalog.seed_song("Two", "B", Mood::Sad);
    h.catalog.mark_object_missing(&s2.storage_path);

    let songs = h.agg.hydrate_songs(&[s1.id, s2.id]).await.unwrap();
    assert_eq!(songs.len(), 2);
    let missing = songs.iter().find(|s| s.id == s2.id).unwrap();
    assert!(missing.signed_url.is_none());
}

#[tokio::test]
async fn per_item_strategy_drops_unknown_ids() {
    let h = harness();
    let s1 = h.catalog.seed_song("One", "A", Mood::Chill);
    let agg = Aggregator::new(h.catalog.clone(), h.library.clone(), h.collection.clone())
        .with_strategy(HydrationStrategy::PerItem)
        .with_concurrency(2);

    let songs = agg.hydrate_songs(&[s1.id, Uuid::new_v4()]).await.unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0].id, s1.id);
    // batch endpoint never consulted on the fallback path
    assert_eq!(h.catalog.batch_calls(), 0);
}

#[tokio::test]
async fn playlist_hydration_result_is_subset_of_input() {
    let h = harness();
    let p1 = h
        .agg
        .create_playlist_for_user(Uuid::new_v4(), playlist_named("P1"), &[])
        .await
        .unwrap();
    let p2 = h
        .agg
        .create_playlist_for_user(Uuid::new_v4(), playlist_named("P2"), &[])
        .await
        .unwrap();

    let input = vec![p1.id, p2.id, Uuid::new_v4()];
    let playlists = h.agg.hydrate_playlists(&input).await.unwrap();

    assert_eq!(playlists.len(), 2);
    for playlist in &playlists {
        assert!(input.contains(&playlist.id));
    }
}

#[tokio::test]
async fn per_item_playlist_hydration_drops_unknown_ids() {
    let h = harness();
    let p1 = h
        .agg
        .create_playlist_for_user(Uuid::new_v4(), playlist_named("Kept"), &[])
        .await
        .unwrap();
    let agg = Aggregator::new(h.catalog.clone(), h.library.clone(), h.collection.clone())
        .with_strategy(HydrationStrategy::PerItem)
        .with_concurrency(2);

    let playlists = agg
        .hydrate_playlists(&[p1.id, Uuid::new_v4()])
        .await
        .unwrap();
    assert_eq!(playlists.len(), 1);
    assert_eq!(playlists[0].id, p1.id);
}

#[tokio::test]
async fn empty_playlist_hydration_input_short_circuits() {
    let h = harness();
    let playlists = h.agg.hydrate_playlists(&[]).await.unwrap();
    assert!(playlists.is_empty());
}

#[tokio::test]
async fn per_item_strategy_propagates_real_failures() {
    let h = harness();
    let s1 = h.catalog.seed_song("One", "A", Mood::Chill);
    h.catalog.set_fail_requests(true);
    let agg = Aggregator::new(h.catalog.clone(), h.library.clone(), h.collection.clone())
        .with_strategy(HydrationStrategy::PerItem);

    assert!(agg.hydrate_songs(&[s1.id]).await.is_err());
}

// ========================================
// Library mutation
// ========================================

#[tokio::test]
async fn adding_the_same_membership_twice_yields_one_row() {
    let h = harness();
    let user = Uuid::new_v4();
    let song = h.catalog.seed_song("One", "A", Mood::Happy);

    h.agg.add_song_to_library(user, song.id).await.unwrap();
    h.agg.add_song_to_library(user, song.id).await.unwrap();

    assert_eq!(h.library.song_row_count(song.id), 1);
}

#[tokio::test]
async fn concurrent_duplicate_adds_converge_to_one_row() {
    let h = harness();
    let playlist = h
        .agg
        .create_playlist_for_user(Uuid::new_v4(), playlist_named("P1"), &[])
        .await
        .unwrap();
    let song = h.catalog.seed_song("S1", "A", Mood::Happy);

    let song_ids = [song.id];
    let (a, b) = tokio::join!(
        h.agg.add_songs_to_playlist(playlist.id, &song_ids),
        h.agg.add_songs_to_playlist(playlist.id, &song_ids),
    );
    a.unwrap();
    b.unwrap();

    assert_eq!(h.collection.membership_count(playlist.id), 1);
}

#[tokio::test]
async fn removing_an_absent_membership_is_a_noop() {
    let h = harness();
    let user = Uuid::new_v4();
    h.agg
        .remove_song_from_library(user, Uuid::new_v4())
        .await
        .unwrap();
}

#[tokio::test]
async fn created_song_appears_exactly_once_in_the_library() {
    let h = harness();
    let user = Uuid::new_v4();

    let created = h
        .agg
        .register_song_for_user(user, new_song("RoundTrip"))
        .await
        .unwrap();

    let ids = h.agg.resolve_library(user).await.unwrap();
    let matching: Vec<_> = ids.songs.iter().filter(|id| **id == created.id).collect();
    assert_eq!(matching.len(), 1);

    let songs = h
        .agg
        .hydrate_songs(&ids.songs.iter().copied().collect::<Vec<_>>())
        .await
        .unwrap();
    assert_eq!(songs.iter().filter(|s| s.id == created.id).count(), 1);
}

// ========================================
// Two-step create-then-link
// ========================================

#[tokio::test]
async fn link_failure_surfaces_partial_link_with_the_created_id() {
    let h = harness();
    let user = Uuid::new_v4();
    h.library.set_fail_writes(true);

    let err = h
        .agg
        .register_song_for_user(user, new_song("Orphan"))
        .await
        .unwrap_err();

    let (entity, id) = match err {
        Error::PartialLink { entity, id, .. } => (entity, id),
        other => panic!("expected PartialLink, got {:?}", other),
    };
    assert_eq!(entity, EntityKind::Song);
    // the song exists, reachable by id, just not linked
    assert!(h.catalog.contains(id));
    assert_eq!(h.library.song_row_count(id), 0);

    // the link step alone is repeatable once the store recovers
    h.library.set_fail_writes(false);
    h.agg.retry_link(user, entity, id).await.unwrap();
    assert_eq!(h.library.song_row_count(id), 1);
}

#[tokio::test]
async fn playlist_link_failure_is_retryable_without_recreation() {
    let h = harness();
    let user = Uuid::new_v4();
    h.library.set_fail_writes(true);

    let err = h
        .agg
        .create_playlist_for_user(user, playlist_named("Orphaned"), &[])
        .await
        .unwrap_err();

    let id = match err {
        Error::PartialLink {
            entity: EntityKind::Playlist,
            id,
            ..
        } => id,
        other => panic!("expected playlist PartialLink, got {:?}", other),
    };
    assert!(h.collection.contains(id));

    h.library.set_fail_writes(false);
    h.agg
        .retry_link(user, EntityKind::Playlist, id)
        .await
        .unwrap();
    let ids = h.agg.resolve_library(user).await.unwrap();
    assert!(ids.playlists.contains(&id));
}

#[tokio::test]
async fn empty_playlist_name_is_rejected_before_any_store_call() {
    let h = harness();
    let err = h
        .agg
        .create_playlist_for_user(Uuid::new_v4(), playlist_named("   "), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "got: {:?}", err);
}

#[tokio::test]
async fn empty_song_list_for_playlist_add_is_rejected() {
    let h = harness();
    let err = h
        .agg
        .add_songs_to_playlist(Uuid::new_v4(), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)), "got: {:?}", err);
}

// ========================================
// Playlist-song join hydration
// ========================================

fn playlist_named(name: &str) -> NewPlaylist {
    NewPlaylist {
        name: name.to_string(),
        description: None,
    }
}

#[tokio::test]
async fn road_trip_scenario_add_two_remove_one() {
    let h = harness();
    let alice = Uuid::new_v4();
    let s1 = h.catalog.seed_song("S1", "A", Mood::Happy);
    let s2 = h.catalog.seed_song("S2", "B", Mood::Chill);

    let playlist = h
        .agg
        .create_playlist_for_user(alice, playlist_named("Road Trip"), &[])
        .await
        .unwrap();
    assert!(playlist.description.is_none());

    h.agg
        .add_songs_to_playlist(playlist.id, &[s1.id, s2.id])
        .await
        .unwrap();
    h.agg
        .remove_song_from_playlist(playlist.id, s1.id)
        .await
        .unwrap();

    let view = h.agg.playlist_with_songs(playlist.id).await.unwrap();
    assert_eq!(view.playlist.song_ids, vec![s2.id]);
    assert_eq!(view.songs.len(), 1);
    assert_eq!(view.songs[0].id, s2.id);
}

#[tokio::test]
async fn dangling_song_reference_is_dropped_not_raised() {
    let h = harness();
    let s1 = h.catalog.seed_song("Kept", "A", Mood::Happy);
    let ghost = Uuid::new_v4();

    let playlist = h
        .agg
        .create_playlist_for_user(Uuid::new_v4(), playlist_named("Mixed"), &[s1.id, ghost])
        .await
        .unwrap();

    let view = h.agg.playlist_with_songs(playlist.id).await.unwrap();
    assert_eq!(view.playlist.song_ids.len(), 2);
    assert_eq!(view.songs.len(), 1);
    assert_eq!(view.songs[0].id, s1.id);
    assert!(view.error.is_none());
}

// ========================================
// Full library fan-out
// ========================================

#[tokio::test]
async fn one_playlist_failure_does_not_abort_siblings() {
    let h = harness();
    let user = Uuid::new_v4();
    let song = h.catalog.seed_song("S1", "A", Mood::Happy);

    let good = h
        .agg
        .create_playlist_for_user(user, playlist_named("Good"), &[song.id])
        .await
        .unwrap();

    // membership pointing at a playlist the Collection Store no longer has
    let dangling = Uuid::new_v4();
    h.agg.add_playlist_to_library(user, dangling).await.unwrap();

    let overview = h.agg.library_overview(user).await.unwrap();
    assert_eq!(overview.playlists.len(), 2);

    let good_view = overview
        .playlists
        .iter()
        .find(|p| p.playlist.id == good.id)
        .unwrap();
    assert!(good_view.error.is_none());
    assert_eq!(good_view.songs.len(), 1);

    let failed_view = overview
        .playlists
        .iter()
        .find(|p| p.playlist.id == dangling)
        .unwrap();
    assert!(failed_view.error.is_some());
    assert!(failed_view.songs.is_empty());
}

#[tokio::test]
async fn overview_includes_hydrated_library_songs() {
    let h = harness();
    let user = Uuid::new_v4();
    let song = h.catalog.seed_song("Mine", "A", Mood::Energetic);
    h.agg.add_song_to_library(user, song.id).await.unwrap();

    let overview = h.agg.library_overview(user).await.unwrap();
    assert_eq!(overview.songs.len(), 1);
    assert_eq!(overview.songs[0].id, song.id);
    assert!(overview.songs[0].signed_url.is_some());
}

// ========================================
// Ordered deletes
// ========================================

#[tokio::test]
async fn deleting_a_playlist_removes_all_membership_rows() {
    for n in [0usize, 1, 5] {
        let h = harness();
        let user = Uuid::new_v4();
        let songs: Vec<Uuid> = (0..n)
            .map(|i| h.catalog.seed_song(&format!("S{}", i), "A", Mood::Sad).id)
            .collect();

        let playlist = h
            .agg
            .create_playlist_for_user(user, playlist_named("Doomed"), &songs)
            .await
            .unwrap();
        assert_eq!(h.collection.membership_count(playlist.id), n);

        h.agg.delete_playlist(playlist.id).await.unwrap();

        assert_eq!(h.collection.membership_count(playlist.id), 0);
        assert!(!h.collection.contains(playlist.id));
        assert_eq!(h.library.playlist_row_count(playlist.id), 0);
    }
}

#[tokio::test]
async fn playlist_delete_names_the_failed_step() {
    let h = harness();
    let song = h.catalog.seed_song("S1", "A", Mood::Happy);
    let playlist = h
        .agg
        .create_playlist_for_user(Uuid::new_v4(), playlist_named("Sticky"), &[song.id])
        .await
        .unwrap();

    h.collection.set_fail_delete_row(true);
    let err = h.agg.delete_playlist(playlist.id).await.unwrap_err();
    assert!(
        err.to_string().contains("deleting playlist row"),
        "got: {}",
        err
    );
    // join rows were already cleared by the first step
    assert_eq!(h.collection.membership_count(playlist.id), 0);
    assert!(h.collection.contains(playlist.id));
}

#[tokio::test]
async fn deleting_a_song_cascades_to_all_memberships() {
    let h = harness();
    let user = Uuid::new_v4();
    let song = h.catalog.seed_song("Everywhere", "A", Mood::Happy);
    h.agg.add_song_to_library(user, song.id).await.unwrap();
    let playlist = h
        .agg
        .create_playlist_for_user(user, playlist_named("Holder"), &[song.id])
        .await
        .unwrap();

    h.agg.delete_song(song.id).await.unwrap();

    assert!(!h.catalog.contains(song.id));
    assert_eq!(h.library.song_row_count(song.id), 0);
    assert_eq!(h.collection.membership_count(playlist.id), 0);
}

#[tokio::test]
async fn deleting_an_unknown_song_still_purges_dangling_memberships() {
    let h = harness();
    let user = Uuid::new_v4();
    let ghost = Uuid::new_v4();
    h.agg.add_song_to_library(user, ghost).await.unwrap();

    let err = h.agg.delete_song(ghost).await.unwrap_err();
    assert!(matches!(err, Error::NotFound(_)), "got: {:?}", err);
    assert_eq!(h.library.song_row_count(ghost), 0);
}
