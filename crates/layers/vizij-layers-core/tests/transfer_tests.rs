use std::collections::HashMap;

use vizij_layers_core::{
    collect, scan, AnimationHost, ChannelNode, ChannelPath, Config, Curve, KeyTime, Keyframe,
    LayerAttributes, LayerContext, LayerMode, LayerTransfer, LayersError, RotationMode, Scene,
    SceneDocument, TakeId, TakeSelection, TICKS_PER_SECOND,
};

fn path(s: &str) -> ChannelPath {
    ChannelPath::new(s)
}

fn cube_scene() -> Scene {
    let mut scene = Scene::new(Config::default());
    scene
        .add_component(
            "Cube1",
            Some(ChannelNode::group(
                "Cube1",
                vec![ChannelNode::xyz("Translation"), ChannelNode::xyz("Rotation")],
            )),
        )
        .unwrap();
    scene
}

fn base(scene: &Scene, take: TakeId) -> LayerContext {
    LayerContext::new(take, scene.layers(take).unwrap()[0])
}

fn key_curve(keys: &[(i64, f64)]) -> Curve {
    Curve::from_keys(
        keys.iter()
            .map(|&(t, v)| Keyframe::new(KeyTime(t), v))
            .collect(),
    )
}

/// it should collect only channels that carry keys
#[test]
fn collect_omits_empty_curves() {
    let mut scene = cube_scene();
    let take = scene.add_take("Take 001");
    let ctx = base(&scene, take);
    scene
        .set_curve(ctx, &path("Cube1.Translation.X"), key_curve(&[(0, 1.0)]))
        .unwrap();
    scene
        .set_curve(ctx, &path("Cube1.Translation.Y"), Curve::new())
        .unwrap();

    let cube = scene.component_by_name("Cube1").unwrap().id;
    let curves = collect(&scene, ctx, cube).unwrap();
    assert_eq!(curves.keys().collect::<Vec<_>>(), vec![&path("Cube1.Translation.X")]);
}

/// it should skip components without a channel tree while scanning
#[test]
fn scan_skips_unanimatable_components() {
    let mut scene = cube_scene();
    scene.add_component("Light", None).unwrap();
    scene
        .add_component(
            "Sphere",
            Some(ChannelNode::group("Sphere", vec![ChannelNode::leaf("Visibility")])),
        )
        .unwrap();
    let take = scene.add_take("Take 001");
    let ctx = base(&scene, take);
    scene
        .set_curve(ctx, &path("Sphere.Visibility"), key_curve(&[(0, 1.0)]))
        .unwrap();

    let animated = scan(&scene, ctx).unwrap();
    let names: Vec<String> = animated
        .into_iter()
        .map(|c| scene.component_name(c).unwrap())
        .collect();
    assert_eq!(names, vec!["Sphere"]);
}

/// it should rebuild a single keyed channel on the destination's new layer
#[test]
fn single_channel_scenario() {
    let mut scene = cube_scene();
    let src = scene.add_take("Take 001");
    let dst = scene.add_take("Take 002");
    let frame = TICKS_PER_SECOND / 30;
    let ctx = base(&scene, src);
    scene
        .set_curve(
            ctx,
            &path("Cube1.Translation.X"),
            key_curve(&[(0, 0.0), (24 * frame, 10.0)]),
        )
        .unwrap();

    let report = LayerTransfer::default()
        .transfer(&mut scene, &[TakeSelection::new(src, vec![ctx.layer])], &[dst]);
    assert!(report.is_ok());

    let created = &report.destinations[0].created[0];
    assert_eq!(created.channels_written, 1);
    let rebuilt = scene
        .curve_of(LayerContext::new(dst, created.layer), &path("Cube1.Translation.X"))
        .unwrap();
    let keys: Vec<(i64, f64)> = rebuilt.keys().iter().map(|k| (k.time.ticks(), k.value)).collect();
    assert_eq!(keys, vec![(0, 0.0), (24 * frame, 10.0)]);
    assert!(scene
        .curve_of(LayerContext::new(dst, created.layer), &path("Cube1.Translation.Y"))
        .is_none());
}

/// it should keep the source's bottom-to-top layer order on the destination
#[test]
fn order_is_preserved() {
    let mut scene = cube_scene();
    let src = scene.add_take("Source");
    let dst = scene.add_take("Destination");
    let a = scene.add_layer(src, LayerAttributes::named("A")).unwrap();
    let b = scene.add_layer(src, LayerAttributes::named("B")).unwrap();
    let c = scene.add_layer(src, LayerAttributes::named("C")).unwrap();
    for (i, layer) in [a, b, c].into_iter().enumerate() {
        scene
            .set_curve(
                LayerContext::new(src, layer),
                &path("Cube1.Rotation.Y"),
                key_curve(&[(0, i as f64)]),
            )
            .unwrap();
    }

    // selection order is irrelevant; the source stack decides
    let report = LayerTransfer::default()
        .transfer(&mut scene, &[TakeSelection::new(src, vec![c, a, b])], &[dst]);
    assert!(report.is_ok());
    assert_eq!(
        scene.layer_names(dst).unwrap(),
        vec!["BaseAnimation", "A", "B", "C"]
    );

    let stack = scene.layers(dst).unwrap();
    for (i, &layer) in stack[1..].iter().enumerate() {
        let curve = scene
            .curve_of(LayerContext::new(dst, layer), &path("Cube1.Rotation.Y"))
            .unwrap();
        assert_eq!(curve.keys()[0].value, i as f64);
    }
}

/// it should copy mode, rotation mode and weight but leave mute state alone
#[test]
fn attributes_follow_the_layer() {
    let mut scene = cube_scene();
    let src = scene.add_take("T1");
    let dst = scene.add_take("T2");
    let wave = scene
        .add_layer(
            src,
            LayerAttributes::named("Wave")
                .with_mode(LayerMode::OverridePassthrough)
                .with_rotation_mode(RotationMode::PerLayer)
                .with_weight(35.0),
        )
        .unwrap();
    let mut attrs = scene.layer_attributes(LayerContext::new(src, wave)).unwrap();
    attrs.muted = true;
    scene
        .set_layer_attributes(LayerContext::new(src, wave), &attrs)
        .unwrap();

    let report = LayerTransfer::default()
        .transfer(&mut scene, &[TakeSelection::new(src, vec![wave])], &[dst]);
    let created = report.created().next().unwrap();
    let copied = scene
        .layer_attributes(LayerContext::new(dst, created.layer))
        .unwrap();
    assert_eq!(copied.name, "Wave");
    assert_eq!(copied.mode, LayerMode::OverridePassthrough);
    assert_eq!(copied.rotation_mode, RotationMode::PerLayer);
    assert_eq!(copied.weight, 35.0);
    assert!(!copied.muted);
}

/// it should reproduce the walk/wave fixture: T1 [Base, Walk, Wave] onto T2
#[test]
fn walk_wave_fixture_scenario() {
    let doc: SceneDocument = vizij_test_fixtures::scenes::load("walk-wave").unwrap();
    let expected: HashMap<String, Vec<String>> =
        vizij_test_fixtures::scenes::expected("walk-wave").unwrap().unwrap();
    let mut scene = Scene::from_document(&doc, Config::default()).unwrap();

    let t1 = scene.take_by_name("T1").unwrap().id;
    let t2 = scene.take_by_name("T2").unwrap().id;
    let walk = scene.context_by_name("T1", "Walk").unwrap().layer;
    let wave = scene.context_by_name("T1", "Wave").unwrap().layer;

    let report = LayerTransfer::default()
        .transfer(&mut scene, &[TakeSelection::new(t1, vec![walk, wave])], &[t2]);
    assert!(report.is_ok());

    for (take, names) in &expected {
        let id = scene.take_by_name(take).unwrap().id;
        assert_eq!(&scene.layer_names(id).unwrap(), names);
    }
    for name in ["Walk", "Wave"] {
        let src = scene.context_by_name("T1", name).unwrap();
        let dst = scene.context_by_name("T2", name).unwrap();
        let a = scene.layer_attributes(src).unwrap();
        let b = scene.layer_attributes(dst).unwrap();
        assert_eq!((a.mode, a.rotation_mode, a.weight), (b.mode, b.rotation_mode, b.weight));
    }

    // the TCB key in Wave comes back as a broken tangent; everything else matches
    let arm = path("RightArm.Rotation.Z");
    let src = scene.curve_of(scene.context_by_name("T1", "Wave").unwrap(), &arm).unwrap();
    let dst = scene.curve_of(scene.context_by_name("T2", "Wave").unwrap(), &arm).unwrap();
    assert_eq!(src.len(), dst.len());
    assert_eq!(dst.keys()[1].tangent_mode, vizij_layers_core::TangentMode::Break);
    assert_eq!(dst.keys()[0].right_weight, 0.5);
    assert_eq!(dst.keys()[1].left_weight, 0.25);
}

/// it should report an unresolved channel and still write the others
#[test]
fn unresolved_channel_is_isolated() {
    let mut scene = cube_scene();
    scene
        .add_component("Prop", Some(ChannelNode::group("Prop", vec![ChannelNode::leaf("Spin")])))
        .unwrap();
    let src = scene.add_take("T1");
    let dst = scene.add_take("T2");
    let layer = scene.add_layer(src, LayerAttributes::named("Anim")).unwrap();
    let ctx = LayerContext::new(src, layer);
    scene
        .set_curve(ctx, &path("Cube1.Translation.X"), key_curve(&[(0, 1.0)]))
        .unwrap();
    scene
        .set_curve(ctx, &path("Prop.Spin"), key_curve(&[(0, 2.0)]))
        .unwrap();
    scene
        .set_curve(ctx, &path("Cube1.Translation.Z"), key_curve(&[(0, 3.0)]))
        .unwrap();

    let engine = LayerTransfer::default();
    let capture = engine
        .capture_take(&mut scene, &TakeSelection::new(src, vec![layer]))
        .unwrap();
    assert_eq!(capture.layers[0].curves.len(), 3);

    // the destination scene loses the component between capture and replay
    let prop = scene.component_by_name("Prop").unwrap().id;
    scene.remove_component(prop).unwrap();

    let report = engine.replay(&mut scene, &capture, dst);
    assert!(report.error.is_none());
    assert_eq!(report.channel_errors.len(), 1);
    assert_eq!(
        report.channel_errors[0].error,
        LayersError::UnresolvedChannel { path: path("Prop.Spin") }
    );

    let created = &report.created[0];
    assert_eq!(created.channels_written, 2);
    let new_ctx = LayerContext::new(dst, created.layer);
    assert!(scene.curve_of(new_ctx, &path("Cube1.Translation.X")).is_some());
    assert!(scene.curve_of(new_ctx, &path("Cube1.Translation.Z")).is_some());
}

/// it should append again on a second run and let the host rename the copies
#[test]
fn repeated_transfers_append() {
    let mut scene = cube_scene();
    let src = scene.add_take("T1");
    let dst = scene.add_take("T2");
    let walk = scene.add_layer(src, LayerAttributes::named("Walk")).unwrap();
    let selection = [TakeSelection::new(src, vec![walk])];
    let engine = LayerTransfer::default();

    engine.transfer(&mut scene, &selection, &[dst]);
    let second = engine.transfer(&mut scene, &selection, &[dst, dst]);

    assert_eq!(
        scene.layer_names(dst).unwrap(),
        vec!["BaseAnimation", "Walk", "Walk 1", "Walk 2"]
    );
    let names: Vec<&str> = second.created().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Walk 1", "Walk 2"]);
}

/// it should treat the base layer like any other selected layer
#[test]
fn base_layer_transfers_as_a_new_layer() {
    let mut scene = cube_scene();
    let src = scene.add_take("T1");
    let dst = scene.add_take("T2");
    let ctx = base(&scene, src);
    scene
        .set_curve(ctx, &path("Cube1.Rotation.X"), key_curve(&[(0, 90.0)]))
        .unwrap();

    let report = LayerTransfer::default()
        .transfer(&mut scene, &[TakeSelection::new(src, vec![ctx.layer])], &[dst]);
    assert!(report.is_ok());
    assert_eq!(
        scene.layer_names(dst).unwrap(),
        vec!["BaseAnimation", "BaseAnimation 1"]
    );
    assert!(scene
        .curve_of(base(&scene, dst), &path("Cube1.Rotation.X"))
        .is_none());
}

/// it should contribute nothing for a take with no selected layers
#[test]
fn empty_selection_is_a_no_op() {
    let mut scene = cube_scene();
    let src = scene.add_take("T1");
    let dst = scene.add_take("T2");
    let report = LayerTransfer::default()
        .transfer(&mut scene, &[TakeSelection::new(src, vec![])], &[dst]);
    assert!(report.is_ok());
    assert_eq!(report.created().count(), 0);
    assert_eq!(scene.layer_names(dst).unwrap(), vec!["BaseAnimation"]);
}

/// it should keep what earlier selections wrote when a later source take fails to capture
#[test]
fn stale_selection_does_not_discard_the_report() {
    let mut scene = cube_scene();
    let t1 = scene.add_take("T1");
    let t3 = scene.add_take("T3");
    let dst = scene.add_take("Dst");
    let a = scene.add_layer(t1, LayerAttributes::named("A")).unwrap();
    let b = scene.add_layer(t3, LayerAttributes::named("B")).unwrap();
    scene
        .set_curve(LayerContext::new(t1, a), &path("Cube1.Translation.X"), key_curve(&[(0, 1.0)]))
        .unwrap();
    // B goes away between building the selection and running the transfer
    scene.delete_layer(LayerContext::new(t3, b)).unwrap();

    let report = LayerTransfer::default().transfer(
        &mut scene,
        &[TakeSelection::new(t1, vec![a]), TakeSelection::new(t3, vec![b])],
        &[dst],
    );
    assert!(!report.is_ok());
    assert_eq!(report.sources.len(), 1);
    assert_eq!(report.sources[0].take, t3);
    assert!(matches!(report.sources[0].error, LayersError::HostState { .. }));

    assert_eq!(report.destinations.len(), 1);
    assert_eq!(report.destinations[0].take, dst);
    assert_eq!(report.destinations[0].created[0].name, "A");
    assert_eq!(scene.layer_names(dst).unwrap(), vec!["BaseAnimation", "A"]);
}

/// it should survive a full document round trip after a transfer
#[test]
fn documents_roundtrip_after_transfer() {
    let json = vizij_test_fixtures::scenes::json("cube-translation").unwrap();
    let mut scene = Scene::from_json(&json, Config::default()).unwrap();
    let src = scene.context_by_name("Take 001", "BaseAnimation").unwrap();
    let dst = scene.take_by_name("Take 002").unwrap().id;
    LayerTransfer::default()
        .transfer(&mut scene, &[TakeSelection::new(src.take, vec![src.layer])], &[dst]);

    let doc = scene.to_document().unwrap();
    let reloaded = Scene::from_document(&doc, Config::default()).unwrap();
    assert_eq!(reloaded.to_document().unwrap(), doc);
    assert_eq!(doc.takes[1].layers.len(), 2);
    assert!(doc.takes[1].layers[1]
        .curves
        .contains_key(&path("Cube1.Translation.X")));
}
