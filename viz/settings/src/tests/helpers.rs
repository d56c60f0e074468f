use super::*;

fn directory_for(label: &str) -> StoredValue {
    StoredValue::SurfaceDirectory(vec![surface_meta("TopVolantis", label)])
}

fn select_ensemble(context: &mut SettingsContext, name: &str) {
    context
        .set_setting_value(
            SettingKind::Ensemble,
            Some(SettingValue::Ensemble(EnsembleIdent::new("case", name))),
        )
        .unwrap();
}

#[tokio::test]
async fn test_superseded_keys_commit_only_the_latest_result() {
    // given three ensembles and a pending directory computation for the first
    let scripted = ScriptedHelper::new();
    let globals = globals_with(vec![
        ensemble("iter-0", &[0]),
        ensemble("iter-1", &[0]),
        ensemble("iter-2", &[0]),
    ]);
    let mut context = build_surface_context(&scripted, globals).unwrap();
    context.evaluate();
    assert_eq!(scripted.pending_count(), 1);

    // when the key changes twice before anything resolves
    select_ensemble(&mut context, "iter-1");
    context.evaluate();
    select_ensemble(&mut context, "iter-2");
    context.evaluate();

    // and the latest key resolves
    scripted.resolve("case::iter-2", Ok(directory_for("amplitude")));
    context.helper_resolved().await;
    context.evaluate();

    // then only the latest result is committed
    assert_eq!(
        context.helper_value(HelperKind::SurfaceDirectory),
        Some(&directory_for("amplitude"))
    );
    assert!(!context.has_pending_helpers());

    // and late resolutions of the superseded keys change nothing
    scripted.resolve("case::iter-0", Ok(directory_for("stale-0")));
    scripted.resolve("case::iter-1", Ok(directory_for("stale-1")));
    let pass = context.evaluate();
    assert!(pass.is_noop());
    assert_eq!(
        context.helper_value(HelperKind::SurfaceDirectory),
        Some(&directory_for("amplitude"))
    );
}

#[tokio::test]
async fn test_superseding_cancels_the_in_flight_token() {
    // given
    let scripted = ScriptedHelper::new();
    let globals = globals_with(vec![ensemble("iter-0", &[0]), ensemble("iter-1", &[0])]);
    let mut context = build_surface_context(&scripted, globals).unwrap();
    context.evaluate();
    assert!(!scripted.is_cancelled("case::iter-0"));

    // when the key changes while the computation is in flight
    select_ensemble(&mut context, "iter-1");
    context.evaluate();

    // then the token handed to the superseded computation is cancelled, so
    // cancellation reaches whatever I/O the computation composed it into
    assert!(scripted.is_cancelled("case::iter-0"));
    assert!(!scripted.is_cancelled("case::iter-1"));
}

#[tokio::test]
async fn test_helper_failure_keeps_last_good_value() {
    // given a committed directory for the first ensemble
    let scripted = ScriptedHelper::new();
    let globals = globals_with(vec![ensemble("iter-0", &[0]), ensemble("iter-1", &[0])]);
    let mut context = build_surface_context(&scripted, globals).unwrap();
    context.evaluate();
    scripted.resolve("case::iter-0", Ok(directory_for("depth")));
    context.helper_resolved().await;
    context.evaluate();
    assert!(!context.any_helper_failed());

    // when the next key fails
    select_ensemble(&mut context, "iter-1");
    context.evaluate();
    scripted.resolve(
        "case::iter-1",
        Err(HelperError::Failed("directory query failed".to_string())),
    );
    context.helper_resolved().await;
    context.evaluate();

    // then dependents still observe the last good value, and the failure is
    // visible so the owning provider can treat itself as not ready
    assert_eq!(
        context.helper_value(HelperKind::SurfaceDirectory),
        Some(&directory_for("depth"))
    );
    assert!(context.any_helper_failed());
    assert!(!context.has_pending_helpers());

    // and the failure is not retried until an input changes
    let pass = context.evaluate();
    assert!(pass.is_noop());

    // when the key changes back
    select_ensemble(&mut context, "iter-0");
    let pass = context.evaluate();

    // then a fresh computation is spawned for the changed key
    assert_eq!(pass.helpers_spawned, 1);
}

#[tokio::test]
async fn test_unchanged_key_is_memoized() {
    // given a committed directory
    let scripted = ScriptedHelper::new();
    let globals = globals_with(vec![ensemble("iter-0", &[0, 1])]);
    let mut context = build_surface_context(&scripted, globals).unwrap();
    context.evaluate();
    scripted.resolve("case::iter-0", Ok(directory_for("depth")));
    context.helper_resolved().await;
    context.evaluate();

    // when a setting the helper does not read changes
    context
        .set_setting_value(SettingKind::Realization, Some(SettingValue::Realization(RealizationNumber(1))))
        .unwrap();
    let pass = context.evaluate();

    // then no new computation is spawned
    assert_eq!(pass.helpers_spawned, 0);
    assert_eq!(scripted.pending_count(), 0);
}

#[tokio::test]
async fn test_dependents_observe_previous_value_while_pending() {
    // given a committed directory for the first ensemble
    let scripted = ScriptedHelper::new();
    let globals = globals_with(vec![ensemble("iter-0", &[0]), ensemble("iter-1", &[0])]);
    let mut context = build_surface_context(&scripted, globals).unwrap();
    context.evaluate();
    scripted.resolve("case::iter-0", Ok(directory_for("depth")));
    context.helper_resolved().await;
    context.evaluate();

    // when a new computation is in flight
    select_ensemble(&mut context, "iter-1");
    context.evaluate();

    // then the dependent attribute still reflects the previous directory
    assert!(context.has_pending_helpers());
    assert_eq!(
        context
            .setting(SettingKind::Attribute)
            .unwrap()
            .value(),
        Some(&SettingValue::Text("depth".to_string()))
    );
}
