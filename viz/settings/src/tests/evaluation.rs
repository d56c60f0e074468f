use super::*;

#[tokio::test]
async fn test_initial_evaluation_resolves_settings_in_dependency_order() {
    // given
    let scripted = ScriptedHelper::new();
    let globals = globals_with(vec![ensemble("iter-0", &[0, 1, 2]), ensemble("iter-1", &[0])]);
    let mut context = build_surface_context(&scripted, globals).unwrap();

    // when
    context.evaluate();

    // then, ensemble and realization are fixed up from the globals
    assert_eq!(
        context
            .setting(SettingKind::Ensemble)
            .unwrap()
            .value(),
        Some(&SettingValue::Ensemble(EnsembleIdent::new("case", "iter-0")))
    );
    assert_eq!(
        context
            .setting(SettingKind::Realization)
            .unwrap()
            .value(),
        Some(&SettingValue::Realization(RealizationNumber(0)))
    );

    // and the attribute waits for the directory helper
    assert_eq!(
        context
            .setting(SettingKind::Attribute)
            .unwrap()
            .value(),
        None
    );
    assert!(context.has_pending_helpers());
    assert_eq!(scripted.pending_count(), 1);

    // when the directory resolves
    scripted.resolve(
        "case::iter-0",
        Ok(StoredValue::SurfaceDirectory(vec![
            surface_meta("TopVolantis", "depth"),
            surface_meta("TopVolantis", "thickness"),
        ])),
    );
    context.helper_resolved().await;
    context.evaluate();

    // then
    assert_eq!(
        context
            .setting(SettingKind::Attribute)
            .unwrap()
            .value(),
        Some(&SettingValue::Text("depth".to_string()))
    );
    assert!(!context.has_pending_helpers());
}

#[tokio::test]
async fn test_evaluate_is_idempotent_when_nothing_changed() {
    // given a fully resolved context
    let scripted = ScriptedHelper::new();
    let globals = globals_with(vec![ensemble("iter-0", &[0, 1])]);
    let mut context = build_surface_context(&scripted, globals).unwrap();
    context.evaluate();
    scripted.resolve(
        "case::iter-0",
        Ok(StoredValue::SurfaceDirectory(vec![surface_meta("TopVolantis", "depth")])),
    );
    context.helper_resolved().await;
    context.evaluate();

    let available_before: Vec<Vec<SettingValue>> = context
        .settings()
        .map(|setting| setting.available_values().to_vec())
        .collect();

    // when evaluating again with no upstream change
    let pass = context.evaluate();

    // then nothing runs and nothing is spawned
    assert!(pass.is_noop());
    assert_eq!(scripted.pending_count(), 0);

    let available_after: Vec<Vec<SettingValue>> = context
        .settings()
        .map(|setting| setting.available_values().to_vec())
        .collect();
    assert_eq!(available_before, available_after);
}

#[tokio::test]
async fn test_narrowed_availability_fixes_up_current_value() {
    // given an attribute setting with available ["depth", "thickness"] and
    // the non-default value selected
    let scripted = ScriptedHelper::new();
    let globals = globals_with(vec![ensemble("iter-0", &[0]), ensemble("iter-1", &[0])]);
    let mut context = build_surface_context(&scripted, globals).unwrap();
    context.evaluate();
    scripted.resolve(
        "case::iter-0",
        Ok(StoredValue::SurfaceDirectory(vec![
            surface_meta("TopVolantis", "depth"),
            surface_meta("TopVolantis", "thickness"),
        ])),
    );
    context.helper_resolved().await;
    context.evaluate();

    context
        .set_setting_value(SettingKind::Attribute, Some(SettingValue::Text("thickness".to_string())))
        .unwrap();
    context.evaluate();
    assert_eq!(
        context
            .setting(SettingKind::Attribute)
            .unwrap()
            .value(),
        Some(&SettingValue::Text("thickness".to_string()))
    );

    // when an upstream change narrows availability to ["depth"]
    context
        .set_setting_value(
            SettingKind::Ensemble,
            Some(SettingValue::Ensemble(EnsembleIdent::new("case", "iter-1"))),
        )
        .unwrap();
    context.evaluate();
    scripted.resolve(
        "case::iter-1",
        Ok(StoredValue::SurfaceDirectory(vec![surface_meta("TopVolantis", "depth")])),
    );
    context.helper_resolved().await;
    context.evaluate();

    // then the stale selection is fixed up onto the remaining value
    assert_eq!(
        context
            .setting(SettingKind::Attribute)
            .unwrap()
            .value(),
        Some(&SettingValue::Text("depth".to_string()))
    );
}

#[tokio::test]
async fn test_membership_invariant_holds_after_every_pass() {
    // given
    let scripted = ScriptedHelper::new();
    let globals = globals_with(vec![ensemble("iter-0", &[0, 1, 2])]);
    let mut context = build_surface_context(&scripted, globals.clone()).unwrap();

    let assert_invariant = |context: &SettingsContext| {
        for setting in context.settings() {
            assert!(
                setting.is_value_available(),
                "value outside availability. setting: {}",
                setting.kind()
            );
        }
    };

    // then, after each of a sequence of passes
    context.evaluate();
    assert_invariant(&context);

    context
        .set_setting_value(SettingKind::Realization, Some(SettingValue::Realization(RealizationNumber(7))))
        .unwrap();
    context.evaluate();
    assert_invariant(&context);

    let mut narrowed = globals;
    narrowed.realization_filter = subsurface::ensemble::RealizationFilter::Only(
        [RealizationNumber(2)].into_iter().collect(),
    );
    context.set_global_settings(narrowed);
    context.evaluate();
    assert_invariant(&context);
    assert_eq!(
        context
            .setting(SettingKind::Realization)
            .unwrap()
            .value(),
        Some(&SettingValue::Realization(RealizationNumber(2)))
    );
}

#[tokio::test]
async fn test_global_settings_change_retriggers_declared_readers() {
    // given
    let scripted = ScriptedHelper::new();
    let globals = globals_with(vec![ensemble("iter-0", &[0, 1, 2])]);
    let mut context = build_surface_context(&scripted, globals.clone()).unwrap();
    context.evaluate();

    assert_eq!(
        context
            .get_stored_data(StoredDataKind::FilteredRealizations)
            .and_then(StoredValue::as_realizations)
            .map(<[RealizationNumber]>::len),
        Some(3)
    );

    // when the realization filter changes
    let mut narrowed = globals;
    narrowed.realization_filter =
        subsurface::ensemble::RealizationFilter::Only([RealizationNumber(0), RealizationNumber(1)].into_iter().collect());
    context.set_global_settings(narrowed);
    let pass = context.evaluate();

    // then the stored slot and the downstream availability both updated
    assert!(pass.nodes_evaluated > 0);
    assert_eq!(
        context
            .get_stored_data(StoredDataKind::FilteredRealizations)
            .and_then(StoredValue::as_realizations)
            .map(<[RealizationNumber]>::len),
        Some(2)
    );
    assert_eq!(
        context
            .setting(SettingKind::Realization)
            .unwrap()
            .available_values()
            .len(),
        2
    );
}

#[tokio::test]
async fn test_failing_updater_yields_empty_availability() {
    // given a setting whose updater always fails
    let mut registrar = DependencyRegistrar::new([(SettingKind::Attribute, FixupMode::FirstAvailable)]);
    registrar
        .available_values(SettingKind::Attribute, &[], |_ctx| {
            Err(crate::error::UpdaterError::Other("directory unavailable".to_string()))
        })
        .unwrap();
    let mut context = registrar
        .finish(GlobalSettings::default(), &CancellationToken::new())
        .unwrap();

    // when
    context.evaluate();

    // then the failure is recovered locally
    let setting = context
        .setting(SettingKind::Attribute)
        .unwrap();
    assert!(setting.available_values().is_empty());
    assert_eq!(setting.value(), None);
    assert!(!setting.is_valid());
}

#[test]
fn test_cyclic_registration_fails_fast() {
    // given two settings that read each other
    let mut registrar = DependencyRegistrar::new([
        (SettingKind::Attribute, FixupMode::FirstAvailable),
        (SettingKind::SurfaceName, FixupMode::FirstAvailable),
    ]);
    registrar
        .available_values(SettingKind::Attribute, &[Local(SettingKind::SurfaceName)], |_ctx| Ok(vec![]))
        .unwrap();
    registrar
        .available_values(SettingKind::SurfaceName, &[Local(SettingKind::Attribute)], |_ctx| Ok(vec![]))
        .unwrap();

    // when
    let result = registrar.finish(GlobalSettings::default(), &CancellationToken::new());

    // then
    assert!(matches!(result, Err(SettingsContextError::CyclicDependency(_))));
}

#[test]
fn test_read_of_unregistered_node_fails_fast() {
    // given
    let mut registrar = DependencyRegistrar::new([(SettingKind::Attribute, FixupMode::FirstAvailable)]);
    registrar
        .available_values(
            SettingKind::Attribute,
            &[Stored(StoredDataKind::FilteredRealizations)],
            |_ctx| Ok(vec![]),
        )
        .unwrap();

    // when, no stored-data updater was registered for the read
    let result = registrar.finish(GlobalSettings::default(), &CancellationToken::new());

    // then
    assert!(matches!(result, Err(SettingsContextError::UnknownReadTarget {
        ..
    })));
}

#[test]
fn test_duplicate_registration_fails() {
    // given
    let mut registrar = DependencyRegistrar::new([(SettingKind::Attribute, FixupMode::FirstAvailable)]);
    registrar
        .available_values(SettingKind::Attribute, &[], |_ctx| Ok(vec![]))
        .unwrap();

    // when
    let result = registrar.available_values(SettingKind::Attribute, &[], |_ctx| Ok(vec![]));

    // then
    assert!(matches!(result, Err(SettingsContextError::DuplicateRegistration(_))));
}

#[test]
fn test_updater_for_unknown_setting_fails() {
    // given a registrar without the SurfaceName setting
    let mut registrar = DependencyRegistrar::new([(SettingKind::Attribute, FixupMode::FirstAvailable)]);

    // when
    let result = registrar.available_values(SettingKind::SurfaceName, &[], |_ctx| Ok(vec![]));

    // then
    assert!(matches!(
        result,
        Err(SettingsContextError::UnknownSetting(SettingKind::SurfaceName))
    ));
}
