// Drawing, resizing and label bookkeeping driven through pointer events.

mod common;

use box_annotator::{
    Corner, DisplayRect, EngineSettings, GestureOutcome, HandleHit, ScaleRatio, Tool, UNLABELED,
};
use common::{Lcg, create_scene, create_wide_scene, drag, p};

#[test]
fn wide_image_fits_display_bounds() {
    let engine = create_wide_scene();
    let img = engine.active_image().unwrap();
    assert!((img.scale_ratio.get() - 0.64).abs() < 1e-6);
    assert_eq!(img.display_size(), (640, 320));
}

#[test]
fn display_size_never_exceeds_bounds() {
    let mut rng = Lcg::new(7);
    for _ in 0..500 {
        let (w, h) = (rng.next_u32(1, 8000), rng.next_u32(1, 8000));
        let (mw, mh) = (rng.next_u32(1, 2000), rng.next_u32(1, 2000));
        let ratio = ScaleRatio::fit(w, h, mw, mh).unwrap();
        let (dw, dh) = ratio.display_size(w, h);
        assert!(dw <= mw && dh <= mh, "{w}x{h} into {mw}x{mh} gave {dw}x{dh}");
        assert!(ratio.get() > 0.0 && ratio.get() <= 1.0);

        // Aspect ratio holds to within a pixel of rounding on the short side.
        if w >= h {
            let expected = dw as f64 * h as f64 / w as f64;
            assert!((dh as f64 - expected).abs() <= 1.0, "{w}x{h} -> {dw}x{dh}");
        } else {
            let expected = dh as f64 * w as f64 / h as f64;
            assert!((dw as f64 - expected).abs() <= 1.0, "{w}x{h} -> {dw}x{dh}");
        }
    }
}

#[test]
fn reverse_drag_at_minimum_creates_box() {
    let mut engine = create_wide_scene();
    assert_eq!(drag(&mut engine, p(10.0, 10.0), p(5.0, 5.0)), GestureOutcome::Created(0));
    assert_eq!(engine.boxes()[0].rect, DisplayRect::new(5.0, 5.0, 5.0, 5.0));
}

#[test]
fn narrow_drag_creates_nothing() {
    let mut engine = create_wide_scene();
    assert_eq!(
        drag(&mut engine, p(100.0, 100.0), p(103.0, 120.0)),
        GestureOutcome::Discarded
    );
    assert!(engine.boxes().is_empty());
}

#[test]
fn larger_minimum_from_settings_is_honored() {
    let settings = EngineSettings {
        min_box_size: 10.0,
        ..EngineSettings::default()
    };
    let mut engine = box_annotator::AnnotationEngine::new(settings);
    engine
        .install_batch([Ok(common::decoded("a.png", 100, 100))])
        .unwrap();
    assert_eq!(drag(&mut engine, p(0.0, 0.0), p(9.0, 30.0)), GestureOutcome::Discarded);
    assert_eq!(drag(&mut engine, p(0.0, 0.0), p(10.0, 30.0)), GestureOutcome::Created(0));
}

#[test]
fn resize_sequences_always_end_well_formed() {
    let mut rng = Lcg::new(42);
    for round in 0..200 {
        let mut engine = create_wide_scene();
        drag(&mut engine, p(200.0, 100.0), p(260.0, 150.0));
        engine.set_tool(Tool::Edit);

        let corner = Corner::ALL[round % 4];
        let handle = engine.boxes()[0].rect.corner(corner);
        let outcome = engine.pointer_down(handle);
        assert_eq!(
            outcome,
            GestureOutcome::ResizeStarted(HandleHit {
                box_index: 0,
                corner
            })
        );

        for _ in 0..rng.next_u32(1, 12) {
            engine.pointer_move(p(rng.next_f32(640.0), rng.next_f32(320.0)));
        }
        let end = p(rng.next_f32(640.0), rng.next_f32(320.0));
        assert_eq!(engine.pointer_up(end), GestureOutcome::Resized(0));

        let rect = engine.boxes()[0].rect;
        assert!(rect.width >= 5.0, "round {round}: {rect:?}");
        assert!(rect.height >= 5.0, "round {round}: {rect:?}");
        assert!(engine.gesture().is_idle());
    }
}

#[test]
fn resize_keeps_opposite_corner_pinned() {
    let mut engine = create_wide_scene();
    drag(&mut engine, p(100.0, 100.0), p(200.0, 180.0));
    engine.set_tool(Tool::Edit);

    engine.pointer_down(p(100.0, 180.0));
    engine.pointer_move(p(150.0, 150.0));
    engine.pointer_move(p(250.0, 90.0));
    engine.pointer_up(p(260.0, 60.0));

    // Bottom-left dragged past the top-right corner (200, 100).
    assert_eq!(engine.boxes()[0].rect, DisplayRect::new(200.0, 60.0, 60.0, 40.0));
}

#[test]
fn topmost_box_takes_the_handle() {
    let mut engine = create_wide_scene();
    drag(&mut engine, p(100.0, 100.0), p(150.0, 150.0));
    drag(&mut engine, p(150.0, 150.0), p(220.0, 200.0));
    engine.set_tool(Tool::Edit);

    assert_eq!(
        engine.hit_test(p(151.0, 149.0)),
        Some(HandleHit {
            box_index: 1,
            corner: Corner::TopLeft
        })
    );
}

#[test]
fn draw_tool_never_resizes() {
    let mut engine = create_wide_scene();
    drag(&mut engine, p(100.0, 100.0), p(150.0, 150.0));
    // On a handle, but with the draw tool this starts a new box.
    assert_eq!(engine.pointer_down(p(150.0, 150.0)), GestureOutcome::DrawStarted);
    engine.pointer_leave();
    assert_eq!(engine.boxes().len(), 1);
}

#[test]
fn deleting_label_moves_boxes_to_next_label() {
    let mut engine = create_wide_scene();
    engine.add_label("cat", None).unwrap();
    engine.add_label("dog", None).unwrap();
    drag(&mut engine, p(10.0, 10.0), p(100.0, 100.0));
    assert_eq!(engine.boxes()[0].label, "cat");

    engine.delete_label("cat").unwrap();
    assert_eq!(engine.boxes()[0].label, "dog");
}

#[test]
fn no_box_references_a_deleted_label() {
    let mut engine = create_scene(&[("a.png", 800, 600), ("b.png", 300, 200)]);
    for name in ["car", "bus", "bike"] {
        engine.add_label(name, None).unwrap();
    }

    let labels = ["car", "bus", "bike", "car", "bike"];
    for image in 0..2 {
        engine.set_active_image(image).unwrap();
        for (i, label) in labels.iter().enumerate() {
            let x = 10.0 + i as f32 * 30.0;
            drag(&mut engine, p(x, 10.0), p(x + 20.0, 40.0));
            engine.set_box_label(i, label).unwrap();
        }
    }

    for removed in ["bus", "car", "bike"] {
        engine.delete_label(removed).unwrap();
        for img in engine.images() {
            for b in &img.boxes {
                assert!(
                    b.label == UNLABELED || engine.labels().contains(&b.label),
                    "box still labeled {} after deleting {removed}",
                    b.label
                );
            }
        }
    }
    assert!(
        engine
            .images()
            .iter()
            .flat_map(|img| &img.boxes)
            .all(|b| b.label == UNLABELED)
    );
}

#[test]
fn switching_tools_or_images_resets_gesture() {
    let mut engine = create_scene(&[("a.png", 100, 100), ("b.png", 100, 100)]);
    engine.pointer_down(p(10.0, 10.0));
    engine.pointer_move(p(50.0, 50.0));
    assert!(engine.preview().is_some());

    engine.set_tool(Tool::Edit);
    assert!(engine.gesture().is_idle());
    assert!(engine.boxes().is_empty());

    engine.set_tool(Tool::Draw);
    engine.pointer_down(p(10.0, 10.0));
    engine.set_active_image(1).unwrap();
    assert!(engine.gesture().is_idle());
    assert!(engine.images()[0].boxes.is_empty());
}
