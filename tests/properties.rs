use proptest::prelude::*;
use std::sync::Arc;
use tiny_overlays::config::SyncConfig;
use tiny_overlays::{
    Document, EditorBinding, HeadlessEditor, LexicalTokenizer, OverlaySynchronizer, Tokenizer,
    Viewport,
};

fn synced(text: &str) -> (Arc<HeadlessEditor>, OverlaySynchronizer) {
    let editor = Arc::new(HeadlessEditor::new(
        Document::from_str(text, "plaintext"),
        Viewport::new(12.0, 1.0),
    ));
    editor.layout(1024.0, 768.0);
    let mut sync = OverlaySynchronizer::new(SyncConfig::default());
    sync.initialize(EditorBinding::from_host(
        editor.clone(),
        Arc::new(LexicalTokenizer),
    ));
    sync.update();
    (editor, sync)
}

proptest! {
    #[test]
    fn zone_per_line_in_order(lines in prop::collection::vec("[a-z(); ]{0,16}", 1..24)) {
        let (editor, sync) = synced(&lines.join("\n"));
        let zones = editor.annotations().zones();

        prop_assert_eq!(zones.len(), lines.len());
        prop_assert_eq!(sync.zone_ids().len(), lines.len());
        for (index, (id, zone)) in zones.iter().enumerate() {
            prop_assert_eq!(zone.after_line, index as u32 + 1);
            prop_assert_eq!(sync.zone_ids()[index], *id);
        }
    }

    #[test]
    fn marker_per_token(lines in prop::collection::vec("[a-z0-9(); =\"]{0,16}", 1..24)) {
        let (editor, _sync) = synced(&lines.join("\n"));
        let markers = editor.annotations().markers();

        for (index, line) in lines.iter().enumerate() {
            let line_number = index as u32 + 1;
            let expected = LexicalTokenizer.tokenize(line, "plaintext").len();
            let actual = markers.iter().filter(|(_, m)| m.line == line_number).count();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn second_update_changes_nothing(lines in prop::collection::vec("[a-z; ]{0,12}", 1..12)) {
        let (editor, mut sync) = synced(&lines.join("\n"));
        let zones: Vec<_> = editor.annotations().zones().into_iter().map(|(_, z)| z).collect();
        let markers: Vec<_> = editor.annotations().markers().into_iter().map(|(_, m)| m).collect();
        let rect = sync.bounding_box();

        sync.update();

        let zones_after: Vec<_> = editor.annotations().zones().into_iter().map(|(_, z)| z).collect();
        let markers_after: Vec<_> = editor.annotations().markers().into_iter().map(|(_, m)| m).collect();
        prop_assert_eq!(zones_after, zones);
        prop_assert_eq!(markers_after, markers);
        prop_assert_eq!(sync.bounding_box(), rect);
    }
}
