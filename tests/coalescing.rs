use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tiny_overlays::config::{OverlayConfig, SyncConfig};
use tiny_overlays::{
    Document, Edit, EditorBinding, EditorEvent, FrameScheduler, HeadlessEditor, LexicalTokenizer,
    OverlaySynchronizer, Viewport,
};

/// Frame scheduler that only counts requests
#[derive(Default)]
struct CountingFrames {
    requests: AtomicUsize,
}

impl FrameScheduler for CountingFrames {
    fn request_frame(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }
}

impl CountingFrames {
    fn count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }
}

fn editor_with(text: &str) -> Arc<HeadlessEditor> {
    let editor = Arc::new(HeadlessEditor::new(
        Document::from_str(text, "javascript"),
        Viewport::new(10.0, 1.0).with_gutter(50.0),
    ));
    editor.layout(800.0, 600.0);
    editor.drain_events();
    editor
}

fn bind_counting(
    editor: &Arc<HeadlessEditor>,
    config: SyncConfig,
) -> (OverlaySynchronizer, Arc<CountingFrames>) {
    let frames = Arc::new(CountingFrames::default());
    let mut binding = EditorBinding::from_host(editor.clone(), Arc::new(LexicalTokenizer));
    binding.frames = frames.clone();

    let mut sync = OverlaySynchronizer::new(config);
    sync.initialize(binding);
    sync.update();
    (sync, frames)
}

fn append_line(editor: &HeadlessEditor, text: &str) {
    let end = editor.document().read().byte_count();
    editor.apply_edit(Edit::Insert {
        pos: end,
        text: format!("\n{}", text),
    });
}

#[test]
fn test_burst_of_edits_requests_one_frame() {
    let editor = editor_with("a");
    let (mut sync, frames) = bind_counting(&editor, SyncConfig::default());

    for _ in 0..5 {
        append_line(&editor, "x");
    }
    for event in editor.drain_events() {
        assert_eq!(event, EditorEvent::ContentChanged);
        sync.handle_event(event);
    }

    assert_eq!(frames.count(), 1);
    assert!(sync.has_pending_update());
    // Nothing recomputed yet
    assert_eq!(editor.annotations().zone_count(), 1);

    sync.handle_event(EditorEvent::AnimationFrame);
    assert!(!sync.has_pending_update());
    assert_eq!(editor.annotations().zone_count(), 6);
}

#[test]
fn test_edits_after_request_are_picked_up_by_the_frame() {
    let editor = editor_with("a");
    let (mut sync, frames) = bind_counting(&editor, SyncConfig::default());

    append_line(&editor, "b");
    sync.on_content_changed();
    append_line(&editor, "c");
    append_line(&editor, "d");
    sync.on_content_changed();
    sync.on_content_changed();

    assert_eq!(frames.count(), 1);
    sync.on_frame();
    assert_eq!(editor.annotations().zone_count(), 4);
}

#[test]
fn test_next_burst_requests_a_new_frame() {
    let editor = editor_with("a");
    let (mut sync, frames) = bind_counting(&editor, SyncConfig::default());

    sync.on_content_changed();
    sync.on_frame();
    sync.on_content_changed();

    assert_eq!(frames.count(), 2);
}

#[test]
fn test_frame_without_pending_change_is_noop() {
    let editor = editor_with("a\nb");
    let (mut sync, _frames) = bind_counting(&editor, SyncConfig::default());
    let zones = sync.zone_ids().to_vec();

    sync.on_frame();
    assert_eq!(sync.zone_ids(), zones.as_slice());
}

#[test]
fn test_scroll_updates_immediately_and_clears_pending() {
    let editor = editor_with("a");
    let (mut sync, _frames) = bind_counting(&editor, SyncConfig::default());

    append_line(&editor, "b");
    sync.on_content_changed();
    assert!(sync.has_pending_update());

    sync.on_scroll_changed();
    assert!(!sync.has_pending_update());
    assert_eq!(editor.annotations().zone_count(), 2);

    // The frame that was already requested finds nothing left to do
    let zones = sync.zone_ids().to_vec();
    sync.on_frame();
    assert_eq!(sync.zone_ids(), zones.as_slice());
}

#[test]
fn test_layout_updates_immediately() {
    let editor = editor_with("a");
    let (mut sync, frames) = bind_counting(&editor, SyncConfig::default());

    append_line(&editor, "b");
    editor.drain_events();
    editor.layout(400.0, 300.0);
    editor.dispatch(&mut sync);

    assert_eq!(frames.count(), 0);
    assert_eq!(editor.annotations().zone_count(), 2);
    assert_eq!(sync.bounding_box().map(|r| r.width), Some(400.0 - 50.0 - 20.0));
}

#[test]
fn test_coalescing_can_be_disabled() {
    let editor = editor_with("a");
    let config = SyncConfig {
        overlay: OverlayConfig {
            coalesce_content_changes: false,
            ..OverlayConfig::default()
        },
        ..SyncConfig::default()
    };
    let (mut sync, frames) = bind_counting(&editor, config);

    append_line(&editor, "b");
    sync.on_content_changed();

    assert_eq!(frames.count(), 0);
    assert!(!sync.has_pending_update());
    assert_eq!(editor.annotations().zone_count(), 2);
}

#[test]
fn test_teardown_drops_pending_update() {
    let editor = editor_with("a");
    let (mut sync, _frames) = bind_counting(&editor, SyncConfig::default());

    sync.on_content_changed();
    sync.teardown();
    assert!(!sync.has_pending_update());

    sync.on_frame();
    assert_eq!(editor.annotations().zone_count(), 0);
}

#[test]
fn test_headless_dispatch_runs_one_frame() {
    let editor = editor_with("a");
    let mut sync = OverlaySynchronizer::new(SyncConfig::default());
    sync.initialize(EditorBinding::from_host(
        editor.clone(),
        Arc::new(LexicalTokenizer),
    ));

    append_line(&editor, "b");
    append_line(&editor, "c");
    editor.dispatch(&mut sync);

    assert!(!editor.take_frame_request());
    assert!(!sync.has_pending_update());
    assert_eq!(editor.annotations().zone_count(), 3);
}
