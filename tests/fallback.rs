use egui::{pos2, vec2, Rect, Ui};
use kestrel_inspector::property::{DeclaredKind, TargetTypeInfo};
use kestrel_inspector::{
    CustomDrawer, DocumentTarget, FieldKind, FieldNode, FieldValue, GenericInspector, HandlerRegistry,
    OptimizedBlockState,
};
use std::cell::RefCell;
use std::rc::Rc;

fn run_frames(frames: usize, mut frame: impl FnMut(&mut Ui)) {
    let ctx = egui::Context::default();
    ctx.options_mut(|options| options.max_passes = std::num::NonZeroUsize::MIN);
    for _ in 0..frames {
        let input = egui::RawInput {
            screen_rect: Some(Rect::from_min_size(pos2(0.0, 0.0), vec2(800.0, 600.0))),
            ..Default::default()
        };
        let _ = ctx.run(input, |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| frame(ui));
        });
    }
}

fn bump_registry() -> HandlerRegistry {
    let mut registry = HandlerRegistry::with_builtin();
    registry.register_drawer(
        "Bump",
        CustomDrawer::new(18.0, |_, _, field, cx| {
            if let FieldValue::Integer(value) = field.value() {
                cx.edits.push(field.path(), FieldValue::Integer(value + 1));
            }
            false
        }),
    );
    registry.register_drawer("Live", CustomDrawer::new(18.0, |_, _, _, _| false).dynamic());
    registry
}

#[test]
fn show_takes_the_fast_path_for_cacheable_targets() {
    let registry = bump_registry();
    let mut targets =
        [DocumentTarget::new(TargetTypeInfo::derived("Mover"), vec![FieldNode::float("speed", 1.0)])];
    let mut inspector = GenericInspector::default();
    run_frames(3, |ui| {
        inspector.show(ui, &mut targets, &registry, false);
    });
    let stats = inspector.stats();
    assert_eq!(stats.height_scans, 1);
    assert_eq!(stats.draw_passes, 3);
    assert_eq!(stats.fallback_passes, 0);
    assert_eq!(inspector.optimized_block_state(), OptimizedBlockState::Cacheable);
}

#[test]
fn show_falls_back_once_a_target_is_poisoned() {
    let registry = bump_registry();
    let mut targets = [DocumentTarget::new(
        TargetTypeInfo::derived("Mover"),
        vec![FieldNode::float("speed", 1.0), FieldNode::float("graph", 0.0).with_type_name("Live")],
    )];
    let mut inspector = GenericInspector::default();
    run_frames(3, |ui| {
        inspector.show(ui, &mut targets, &registry, false);
    });
    let stats = inspector.stats();
    assert_eq!(stats.height_scans, 1, "a poisoned target is not rescanned every frame");
    assert_eq!(stats.fallback_passes, 3);
    assert_eq!(stats.draw_passes, 0);
    assert_eq!(stats.fields_drawn, 6);
}

#[test]
fn base_types_render_through_the_fallback_and_still_commit_edits() {
    let registry = bump_registry();
    let mut targets = [DocumentTarget::new(
        TargetTypeInfo::derived("Behaviour").with_declared(DeclaredKind::BaseBehaviour),
        vec![FieldNode::script("script", None), FieldNode::integer("count", 1).with_type_name("Bump")],
    )];
    let mut inspector = GenericInspector::default();
    let mut changed = Vec::new();
    run_frames(2, |ui| {
        changed.push(inspector.show(ui, &mut targets, &registry, false));
    });
    assert_eq!(changed, vec![true, true]);
    assert_eq!(targets[0].find("count").map(|n| n.value.clone()), Some(FieldValue::Integer(3)));
    let stats = inspector.stats();
    assert_eq!(stats.height_scans, 0);
    assert_eq!(stats.fallback_passes, 2);
    assert_eq!(inspector.optimized_block_state(), OptimizedBlockState::Unknown);
}

#[test]
fn fallback_draws_fields_without_handlers_as_placeholders() {
    let registry = HandlerRegistry::empty();
    let mut targets =
        [DocumentTarget::new(TargetTypeInfo::derived("Mover"), vec![FieldNode::float("speed", 1.0)])];
    let mut inspector = GenericInspector::default();
    let mut changed = None;
    run_frames(1, |ui| {
        changed = Some(inspector.show(ui, &mut targets, &registry, false));
    });
    assert_eq!(changed, Some(false));
    let stats = inspector.stats();
    assert_eq!(stats.fallback_passes, 1);
    assert_eq!(stats.fields_drawn, 0);
}

#[test]
fn dirty_frames_rescan_on_the_next_show() {
    let registry = bump_registry();
    let mut targets =
        [DocumentTarget::new(TargetTypeInfo::derived("Mover"), vec![FieldNode::float("speed", 1.0)])];
    let mut inspector = GenericInspector::default();
    let mut frame = 0;
    run_frames(4, |ui| {
        inspector.show(ui, &mut targets, &registry, frame == 2);
        frame += 1;
    });
    assert_eq!(inspector.stats().height_scans, 2);
    assert_eq!(inspector.stats().draw_passes, 4);
}

#[test]
fn invisible_frames_skip_the_draw_pass_entirely() {
    let registry = bump_registry();
    let mut targets = [DocumentTarget::new(
        TargetTypeInfo::derived("Mover"),
        vec![FieldNode::float("speed", 1.0), FieldNode::boolean("enabled", true)],
    )];
    let mut inspector = GenericInspector::default();
    run_frames(1, |ui| {
        inspector.show(ui, &mut targets, &registry, false);
    });
    assert_eq!(inspector.optimized_block_state(), OptimizedBlockState::Cacheable);
    let before = inspector.stats();
    let refreshes = inspector.serialized_object().map(|view| view.refresh_count());

    let mut changed = Vec::new();
    run_frames(3, |ui| {
        ui.set_invisible();
        changed.push(inspector.show(ui, &mut targets, &registry, false));
    });
    assert_eq!(changed, vec![false, false, false]);
    assert_eq!(inspector.stats(), before);
    assert_eq!(inspector.serialized_object().map(|view| view.refresh_count()), refreshes);
}

#[test]
fn invisible_frames_never_scan_or_fall_back() {
    let registry = bump_registry();
    let mut targets = [DocumentTarget::new(
        TargetTypeInfo::derived("Mover"),
        vec![FieldNode::float("graph", 0.0).with_type_name("Live")],
    )];
    let mut inspector = GenericInspector::default();
    run_frames(2, |ui| {
        ui.set_invisible();
        inspector.show(ui, &mut targets, &registry, false);
    });
    let stats = inspector.stats();
    assert_eq!(stats.height_scans, 0);
    assert_eq!(stats.draw_passes, 0);
    assert_eq!(stats.fallback_passes, 0);
    assert!(inspector.serialized_object().is_none());
}

#[test]
fn missing_script_unlocks_the_identity_field_for_reassignment() {
    let states = Rc::new(RefCell::new(Vec::new()));
    let mut registry = HandlerRegistry::with_builtin();
    let seen = Rc::clone(&states);
    registry.register_kind(
        FieldKind::ScriptRef,
        CustomDrawer::new(18.0, move |ui: &mut Ui, _, field, cx| {
            seen.borrow_mut().push(ui.is_enabled());
            if let FieldValue::ObjectRef(None) = field.value() {
                cx.edits.push(field.path(), FieldValue::ObjectRef(Some("Mover".to_string())));
            }
            false
        }),
    );
    let mut targets = [DocumentTarget::new(
        TargetTypeInfo::derived("Behaviour").with_declared(DeclaredKind::BaseBehaviour),
        vec![FieldNode::script("script", None), FieldNode::float("speed", 1.0)],
    )];
    let mut inspector = GenericInspector::default();
    let mut changed = Vec::new();
    run_frames(2, |ui| {
        changed.push(inspector.show(ui, &mut targets, &registry, false));
    });
    assert_eq!(*states.borrow(), vec![true, false], "locked again once a script is assigned");
    assert_eq!(changed, vec![true, false]);
    assert_eq!(
        targets[0].find("script").map(|node| node.value.clone()),
        Some(FieldValue::ObjectRef(Some("Mover".to_string())))
    );
}
