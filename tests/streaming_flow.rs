// tests/streaming_flow.rs
//
// End-to-end flow over a real temp database: admin ingests content, the
// catalog cache picks it up through events, a viewer signs up, subscribes,
// saves a title and watches it.

use std::fs;
use std::sync::Arc;

use nebula::{
    create_connection_pool, initialize_database, AddMovieRequest, AppState, AuthMode, MediaStore,
    OpResult,
};

fn fresh_state() -> (AppState, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("temp dir");
    let pool = create_connection_pool(&dir.path().join("nebula.db")).expect("pool");
    {
        let conn = pool.get().expect("conn");
        initialize_database(&conn).expect("schema");
    }
    let media = MediaStore::new(dir.path().join("media"));
    media.ensure_directories().expect("media dirs");
    (AppState::build(Arc::new(pool), media), dir)
}

#[test]
fn ingested_movie_is_browsable_with_formatted_duration() {
    let (state, dir) = fresh_state();

    let thumb = dir.path().join("poster.jpg");
    let video = dir.path().join("feature.mp4");
    fs::write(&thumb, b"jpeg").unwrap();
    fs::write(&video, b"mp4").unwrap();

    assert!(state.ingestion_service.add_genre("Drama").success);
    let added = state.ingestion_service.add_movie(&AddMovieRequest {
        name: "Test Film".to_string(),
        description: "A film for the test suite.".to_string(),
        genre: "Drama".to_string(),
        runtime_min: 125,
        thumbnail_source: thumb.to_str().unwrap().to_string(),
        video_source: video.to_str().unwrap().to_string(),
    });
    assert_eq!(added, OpResult::ok("Movie added"));

    // The cache reloaded through the event wiring; no manual reload here.
    let categories = state.catalog_service.categories();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].name, "Drama");

    let item = &categories[0].items[0];
    assert_eq!(item.title, "Test Film");
    assert_eq!(item.genre, "Drama");
    assert_eq!(item.duration, "2h 5m");
    assert!(item.thumbnail_url.starts_with("file://"));
    assert!(item.video_url.starts_with("file://"));

    let featured = state.catalog_service.featured_item();
    assert_eq!(featured.title, "Test Film");
}

#[test]
fn viewer_account_lifecycle() {
    let (state, _dir) = fresh_state();

    state.ingestion_service.add_genre("Drama");
    state.ingestion_service.add_movie(&AddMovieRequest {
        name: "Test Film".to_string(),
        description: String::new(),
        genre: "Drama".to_string(),
        runtime_min: 125,
        ..Default::default()
    });

    // Sign up, then log in with the same credentials.
    let signup = state.auth_service.authenticate(
        AuthMode::SignUp,
        "viewer@example.com",
        "secret123",
        "secret123",
    );
    assert!(signup.success, "{}", signup.message);

    let login =
        state
            .auth_service
            .authenticate(AuthMode::Login, "viewer@example.com", "secret123", "");
    assert!(login.success);
    assert_eq!(login.role, "user");

    // The bootstrapped admin account can log in too.
    let admin = state
        .auth_service
        .authenticate(AuthMode::Login, "admin", "admin1234", "");
    assert!(admin.success);
    assert_eq!(admin.role, "admin");

    // Subscribing twice leaves exactly one active subscription.
    let plans = state.account_service.list_plans().expect("plans");
    assert_eq!(plans.len(), 3);
    assert!(
        state
            .account_service
            .subscribe_plan("viewer@example.com", plans[0].id)
            .success
    );
    assert!(
        state
            .account_service
            .subscribe_plan("viewer@example.com", plans[2].id)
            .success
    );

    // My-list add is idempotent per (profile, title).
    assert_eq!(
        state
            .account_service
            .add_to_my_list("viewer@example.com", "Test Film"),
        OpResult::ok("Added to My List")
    );
    assert_eq!(
        state
            .account_service
            .add_to_my_list("viewer@example.com", "Test Film"),
        OpResult::fail("Already in My List")
    );

    // Playback logs append; an unknown title is a silent no-op.
    state
        .account_service
        .log_playback("viewer@example.com", "Test Film", 300, false);
    state
        .account_service
        .log_playback("viewer@example.com", "Ghost Film", 10, false);

    let profile = state
        .account_service
        .user_profile("viewer@example.com")
        .expect("profile");
    assert_eq!(profile.user.email, "viewer@example.com");
    assert_eq!(profile.subscription.unwrap().plan_name, plans[2].name);
    assert_eq!(profile.profiles.len(), 1);
    assert_eq!(profile.profiles[0].name, "Profile 1");
    assert_eq!(profile.my_list.len(), 1);
    assert_eq!(profile.history.len(), 1);
    assert_eq!(profile.history[0].title, "Test Film");
    assert_eq!(profile.counts.my_list, 1);
}
