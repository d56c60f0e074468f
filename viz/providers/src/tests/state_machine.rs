use stores::StoreError;

use super::*;
use crate::data::ProviderData;
use crate::state::DataProviderState;

#[tokio::test]
async fn test_state_machine_walks_from_invalid_to_ready() {
    // given
    let scripted = ScriptedBackend::new();
    let mut provider = build_surface_provider(&scripted);
    assert_eq!(provider.state(), DataProviderState::SettingsInvalid);

    // when the first evaluation spawns the directory helper
    provider.step();

    // then settings are still unresolved
    assert_eq!(provider.state(), DataProviderState::SettingsInvalid);
    assert!(scripted
        .pending_keys()
        .iter()
        .any(|key| key.contains("surface_directory")));

    // when the directory resolves
    scripted.resolve("surface_directory", Ok(Response::SurfaceDirectory(demo_directory())));
    provider.wait().await;
    provider.step();

    // then the settings are valid but nothing has been fetched
    assert_eq!(provider.state(), DataProviderState::SettingsValidNotFetched);
    assert!(!provider.is_loading());

    // when the fetch is started
    provider.ensure_fetch();
    assert_eq!(provider.state(), DataProviderState::Fetching);
    assert!(provider.is_loading());

    // and it resolves
    scripted.resolve("regular_surface", Ok(Response::Surface(demo_surface(0.0))));
    provider.wait().await;
    provider.step();

    // then
    assert_eq!(provider.state(), DataProviderState::Ready);
    assert_eq!(
        provider.data(),
        Some(&ProviderData::RegularSurface(demo_surface(0.0)))
    );
    assert!(provider.bounding_box().is_some());
    assert!(provider.value_range().is_some());
}

#[tokio::test]
async fn test_superseded_fetch_result_is_discarded() {
    // given a provider fetching for realization 0
    let scripted = ScriptedBackend::new();
    let mut provider = build_surface_provider(&scripted);
    provider.step();
    scripted.resolve("surface_directory", Ok(Response::SurfaceDirectory(demo_directory())));
    provider.wait().await;
    provider.step();
    provider.ensure_fetch();
    assert_eq!(provider.state(), DataProviderState::Fetching);

    // when the settings change to realization 1 mid-flight
    select_realization(&mut provider, 1);
    provider.step();
    provider.ensure_fetch();
    assert_eq!(provider.state(), DataProviderState::Fetching);

    // then the superseded request's cancellation token was cancelled
    assert!(scripted.is_cancelled("/r0/"));

    // when both fetches resolve, the superseded one first
    scripted.resolve("/r0/", Ok(Response::Surface(demo_surface(0.0))));
    scripted.resolve("/r1/", Ok(Response::Surface(demo_surface(500.0))));
    while provider.is_loading() {
        provider.wait().await;
        provider.step();
    }

    // then only the fetch for the current settings drove the state
    assert_eq!(provider.state(), DataProviderState::Ready);
    assert_eq!(
        provider.data(),
        Some(&ProviderData::RegularSurface(demo_surface(500.0)))
    );
}

#[tokio::test]
async fn test_settings_turning_invalid_cancels_the_fetch() {
    // given a provider fetching
    let scripted = ScriptedBackend::new();
    let mut provider = build_surface_provider(&scripted);
    provider.step();
    scripted.resolve("surface_directory", Ok(Response::SurfaceDirectory(demo_directory())));
    provider.wait().await;
    provider.step();
    provider.ensure_fetch();
    assert_eq!(provider.state(), DataProviderState::Fetching);

    // when the ensemble set empties out from under it
    provider.set_global_settings(GlobalSettings {
        field: Some("DROGON".to_string()),
        ..Default::default()
    });
    provider.step();

    // then the provider drops back to invalid and the fetch was cancelled
    assert_eq!(provider.state(), DataProviderState::SettingsInvalid);
    assert!(!provider.is_loading());
    assert!(scripted.is_cancelled("regular_surface"));
    assert_eq!(provider.data(), None);
}

#[tokio::test]
async fn test_fetch_failure_is_surfaced_and_retried_on_settings_change() {
    // given
    let scripted = ScriptedBackend::new();
    let mut provider = build_surface_provider(&scripted);
    provider.step();
    scripted.resolve("surface_directory", Ok(Response::SurfaceDirectory(demo_directory())));
    provider.wait().await;
    provider.step();
    provider.ensure_fetch();

    // when the fetch fails
    scripted.resolve(
        "regular_surface",
        Err(StoreError::NotFound("r0/TopVolantis".to_string())),
    );
    provider.wait().await;
    provider.step();

    // then the error is retained, user-visible and non-fatal
    assert_eq!(provider.state(), DataProviderState::Error);
    let (_, message) = provider.error().unwrap();
    assert!(message.contains("r0/TopVolantis"));

    // and it is not retried for the same settings
    provider.step();
    provider.ensure_fetch();
    assert_eq!(provider.state(), DataProviderState::Error);
    assert!(scripted.pending_keys().is_empty());

    // when a fetch-relevant setting changes
    select_realization(&mut provider, 1);
    provider.step();
    provider.ensure_fetch();

    // then a new fetch is attempted
    assert_eq!(provider.state(), DataProviderState::Fetching);
    scripted.resolve("/r1/", Ok(Response::Surface(demo_surface(500.0))));
    while provider.is_loading() {
        provider.wait().await;
        provider.step();
    }
    assert_eq!(provider.state(), DataProviderState::Ready);
    assert!(provider.error().is_none());
}

#[tokio::test]
async fn test_cosmetic_setting_change_does_not_refetch() {
    // given a ready provider
    let scripted = ScriptedBackend::new();
    let mut provider = build_surface_provider(&scripted);
    provider.step();
    scripted.resolve("surface_directory", Ok(Response::SurfaceDirectory(demo_directory())));
    provider.wait().await;
    provider.step();
    provider.ensure_fetch();
    scripted.resolve("regular_surface", Ok(Response::Surface(demo_surface(0.0))));
    while provider.is_loading() {
        provider.wait().await;
        provider.step();
    }
    assert_eq!(provider.state(), DataProviderState::Ready);

    let before = provider.context().snapshot();

    // when only the color scale changes
    provider
        .set_setting_value(
            SettingKind::ColorScale,
            Some(SettingValue::Text("Spectral".to_string())),
        )
        .unwrap();
    provider.step();
    provider.ensure_fetch();

    // then no refetch happens
    let after = provider.context().snapshot();
    assert!(!provider.settings_change_requires_refetch(&before, &after));
    assert_eq!(provider.state(), DataProviderState::Ready);
    assert!(scripted.pending_keys().is_empty());
}

#[tokio::test]
async fn test_refresh_drives_to_ready_in_one_call() {
    // given responses that are ready before the provider asks
    let scripted = ScriptedBackend::new();
    let mut provider = build_surface_provider(&scripted);

    // when refresh is driven concurrently with scripted resolutions
    let refresh = async {
        provider.refresh().await;
        provider
    };
    let resolve = async {
        loop {
            if scripted.resolve("surface_directory", Ok(Response::SurfaceDirectory(demo_directory()))) {
                break;
            }
            tokio::task::yield_now().await;
        }
        loop {
            if scripted.resolve("regular_surface", Ok(Response::Surface(demo_surface(0.0)))) {
                break;
            }
            tokio::task::yield_now().await;
        }
    };
    let (provider, ()) = tokio::join!(refresh, resolve);

    // then
    assert_eq!(provider.state(), DataProviderState::Ready);
}
