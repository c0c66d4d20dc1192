//! Node position tests - text, structure and navigation across trees

use fos_ax::{
    BoolAttribute, EmbeddedObjectBehavior, IntAttribute, IntListAttribute, NodeData, NodeId,
    NodePosition, Role, StringAttribute, TextAffinity, TextStyles, Tree, TreeData, TreeId,
    TreeLookup, TreeRegistry, TreeUpdate, EMBEDDED_CHARACTER, INVALID_OFFSET,
};

const PAGE: TreeId = TreeId::from_raw(501);
const FRAME: TreeId = TreeId::from_raw(502);

/// Page with a paragraph, a line break, an image and an iframe
fn page() -> TreeUpdate {
    let mut update = TreeUpdate::new(1, vec![
        NodeData::new(1, Role::RootWebArea).with_children(&[2, 6, 8, 9]),
        NodeData::new(2, Role::Paragraph)
            .with_bool(BoolAttribute::IsLineBreakingObject, true)
            .with_int(IntAttribute::TextStyle, TextStyles::BOLD)
            .with_children(&[3, 4, 5]),
        NodeData::new(3, Role::StaticText)
            .with_name("Hello ")
            .with_int(IntAttribute::NextOnLineId, 4)
            .with_int_list(IntListAttribute::WordStarts, vec![0])
            .with_int_list(IntListAttribute::WordEnds, vec![5])
            .with_int_list(IntListAttribute::CharacterOffsets, vec![5, 10, 15, 20, 25, 30]),
        NodeData::new(4, Role::StaticText)
            .with_name("brave world")
            .with_int(IntAttribute::PreviousOnLineId, 3)
            .with_int(IntAttribute::TextStyle, TextStyles::ITALIC)
            .with_int_list(IntListAttribute::CharacterOffsets, vec![5; 11]),
        NodeData::new(5, Role::StaticText)
            .with_name("   ")
            .with_int_list(IntListAttribute::CharacterOffsets, vec![5, 10, 15]),
        NodeData::new(6, Role::LineBreak).with_name("\n").with_children(&[7]),
        NodeData::new(7, Role::InlineTextBox).with_name("\n"),
        NodeData::new(8, Role::Image).with_name("Logo"),
        NodeData::new(9, Role::Iframe).with_child_tree(FRAME),
    ]);
    update.tree_data = Some(TreeData { tree_id: PAGE, ..Default::default() });
    update
}

fn frame() -> TreeUpdate {
    let mut update = TreeUpdate::new(1, vec![
        NodeData::new(1, Role::RootWebArea).with_children(&[2]),
        NodeData::new(2, Role::StaticText).with_name("Framed"),
    ]);
    update.tree_data = Some(TreeData {
        tree_id: FRAME,
        parent_tree_id: Some(PAGE),
        ..Default::default()
    });
    update
}

fn registry(behavior: EmbeddedObjectBehavior) -> TreeRegistry {
    let mut registry = TreeRegistry::new().with_embedded_object_behavior(behavior);
    registry.insert(Tree::from_update(&page()).unwrap());
    registry.insert(Tree::from_update(&frame()).unwrap());
    registry
}

fn at(registry: &TreeRegistry, tree_id: TreeId, id: i32) -> NodePosition {
    let node = registry.node(tree_id, NodeId(id)).unwrap();
    NodePosition::create_position(node, 0, TextAffinity::Downstream)
}

// ============================================================================
// TEXT
// ============================================================================

#[test]
fn test_text_crosses_into_child_tree() {
    let registry = registry(EmbeddedObjectBehavior::SuppressCharacter);
    let root = at(&registry, PAGE, 1);
    assert_eq!(root.text(&registry), "Hello brave world   \nFramed");
    assert_eq!(at(&registry, PAGE, 9).text(&registry), "Framed");
}

#[test]
fn test_embedded_object_character() {
    let registry = registry(EmbeddedObjectBehavior::ExposeCharacter);
    let image = at(&registry, PAGE, 8);
    assert!(image.is_empty_object_replaced_by_character(&registry));
    assert_eq!(image.text(&registry), EMBEDDED_CHARACTER.to_string());
    assert_eq!(image.max_text_offset(&registry), 1);
    assert_eq!(image.word_start_offsets(&registry), vec![0]);
    assert_eq!(image.word_end_offsets(&registry), vec![1]);

    let root = at(&registry, PAGE, 1);
    assert_eq!(root.text(&registry), "Hello brave world   \n\u{FFFC}Framed");

    let suppressed = registry_without_frame(EmbeddedObjectBehavior::SuppressCharacter);
    assert!(!at(&suppressed, PAGE, 8).is_empty_object_replaced_by_character(&suppressed));
    assert_eq!(at(&suppressed, PAGE, 8).text(&suppressed), "");
}

fn registry_without_frame(behavior: EmbeddedObjectBehavior) -> TreeRegistry {
    let mut registry = TreeRegistry::new().with_embedded_object_behavior(behavior);
    registry.insert(Tree::from_update(&page()).unwrap());
    registry
}

#[test]
fn test_host_without_child_tree_is_empty_object() {
    let registry = registry_without_frame(EmbeddedObjectBehavior::ExposeCharacter);
    let host = at(&registry, PAGE, 9);
    assert_eq!(host.anchor_child_count(&registry), 0);
    assert_eq!(host.text(&registry), "\u{FFFC}");
}

#[test]
fn test_max_text_offset_matches_text_everywhere() {
    for behavior in [EmbeddedObjectBehavior::ExposeCharacter, EmbeddedObjectBehavior::SuppressCharacter] {
        let registry = registry(behavior);
        for (tree_id, ids) in [(PAGE, 1..=9), (FRAME, 1..=2)] {
            for id in ids {
                let pos = at(&registry, tree_id, id);
                let text = pos.text(&registry);
                assert_eq!(
                    pos.max_text_offset(&registry),
                    text.encode_utf16().count() as i32,
                    "node {} of {}",
                    id,
                    tree_id
                );
                assert_eq!(pos.clone().text(&registry), text);
            }
        }
    }
}

#[test]
fn test_leaf_value_wins_over_name() {
    let tree = Tree::from_update(&TreeUpdate::new(1, vec![
        NodeData::new(1, Role::TextField)
            .with_name("Search")
            .with_string(StringAttribute::Value, "rust"),
    ]))
    .unwrap();
    let pos = NodePosition::create_position(tree.root().unwrap(), 0, TextAffinity::Downstream);
    assert_eq!(pos.text(&tree), "rust");
    assert_eq!(pos.max_text_offset(&tree), 4);
}

#[test]
fn test_empty_leaf_value_falls_back_to_name() {
    let tree = Tree::from_update(&TreeUpdate::new(1, vec![
        NodeData::new(1, Role::Paragraph).with_children(&[2]),
        NodeData::new(2, Role::StaticText)
            .with_name("Hello")
            .with_string(StringAttribute::Value, ""),
    ]))
    .unwrap();
    let leaf = NodePosition::create_position(tree.get(NodeId(2)).unwrap(), 0, TextAffinity::Downstream);
    assert_eq!(leaf.text(&tree), "Hello");
    assert_eq!(leaf.max_text_offset(&tree), 5);

    let paragraph = NodePosition::create_position(tree.root().unwrap(), 0, TextAffinity::Downstream);
    assert_eq!(paragraph.text(&tree), "Hello");
    assert_eq!(paragraph.max_text_offset(&tree), 5);
}

// ============================================================================
// STRUCTURE
// ============================================================================

#[test]
fn test_anchor_child_into_child_tree() {
    let registry = registry(EmbeddedObjectBehavior::SuppressCharacter);
    let host = at(&registry, PAGE, 9);
    assert_eq!(host.anchor_child_count(&registry), 1);
    assert_eq!(host.anchor_child(&registry, 0), (FRAME, NodeId(1)));
    assert_eq!(host.anchor_child(&registry, 1), (TreeId::UNKNOWN, NodeId::INVALID));

    let child = host.create_child_position_at(&registry, 0);
    assert!(child.is_tree_position());
    assert_eq!(child.tree_id(), FRAME);
    assert_eq!(child.anchor_id(), NodeId(1));
}

#[test]
fn test_anchor_parent_out_of_child_tree() {
    let registry = registry(EmbeddedObjectBehavior::SuppressCharacter);
    let frame_root = at(&registry, FRAME, 1);
    assert_eq!(frame_root.anchor_parent(&registry), (PAGE, NodeId(9)));
    assert_eq!(at(&registry, PAGE, 1).anchor_parent(&registry), (TreeId::UNKNOWN, NodeId::INVALID));

    let framed = at(&registry, FRAME, 2);
    assert_eq!(
        framed.ancestor_anchors(&registry),
        vec![(FRAME, NodeId(2)), (FRAME, NodeId(1)), (PAGE, NodeId(9)), (PAGE, NodeId(1))]
    );

    let parent = frame_root.create_parent_position(&registry);
    assert_eq!((parent.tree_id(), parent.anchor_id()), (PAGE, NodeId(9)));
    assert_eq!(parent.child_index(), 0);
}

#[test]
fn test_text_offset_climbs_to_root() {
    let registry = registry(EmbeddedObjectBehavior::SuppressCharacter);
    let world = NodePosition::create_text_position(PAGE, NodeId(4), 6, TextAffinity::Downstream);
    let paragraph = world.create_parent_position(&registry);
    assert_eq!(paragraph.text_offset(), 12);
    let root = paragraph.create_parent_position(&registry);
    assert_eq!(root.anchor_id(), NodeId(1));
    assert_eq!(root.text_offset(), 12);
    assert!(root.create_parent_position(&registry).is_null());
}

#[test]
fn test_removed_child_tree_stops_navigation() {
    let mut registry = registry(EmbeddedObjectBehavior::SuppressCharacter);
    let frame_root = at(&registry, FRAME, 1);
    registry.remove(FRAME);
    assert!(frame_root.anchor(&registry).is_none());
    assert_eq!(frame_root.max_text_offset(&registry), INVALID_OFFSET);
    assert_eq!(at(&registry, PAGE, 9).anchor_child(&registry, 0), (TreeId::UNKNOWN, NodeId::INVALID));
}

// ============================================================================
// WORDS, WHITESPACE AND LINES
// ============================================================================

#[test]
fn test_word_offsets() {
    let registry = registry(EmbeddedObjectBehavior::SuppressCharacter);
    let hello = at(&registry, PAGE, 3);
    assert_eq!(hello.word_start_offsets(&registry), vec![0]);
    assert_eq!(hello.word_end_offsets(&registry), vec![5]);

    // No word data but character data: one word spanning the node
    let brave = at(&registry, PAGE, 4);
    assert_eq!(brave.word_start_offsets(&registry), vec![0]);
    assert_eq!(brave.word_end_offsets(&registry), vec![11]);

    // Whitespace only: no words
    let blank = at(&registry, PAGE, 5);
    assert!(blank.word_start_offsets(&registry).is_empty());
    assert!(blank.word_end_offsets(&registry).is_empty());

    // No character data at all
    let framed = at(&registry, FRAME, 2);
    assert!(framed.word_start_offsets(&registry).is_empty());
}

#[test]
fn test_white_space_and_line_breaks() {
    let registry = registry(EmbeddedObjectBehavior::SuppressCharacter);
    assert!(at(&registry, PAGE, 5).is_in_white_space(&registry));
    assert!(at(&registry, PAGE, 6).is_in_white_space(&registry));
    assert!(at(&registry, PAGE, 7).is_in_line_break(&registry));
    assert!(!at(&registry, PAGE, 3).is_in_white_space(&registry));
    assert!(at(&registry, PAGE, 3).is_in_text_object(&registry));
    assert!(!at(&registry, PAGE, 2).is_in_text_object(&registry));
}

#[test]
fn test_line_breaking_object_and_list_markers() {
    let registry = registry(EmbeddedObjectBehavior::SuppressCharacter);
    assert!(at(&registry, PAGE, 2).is_in_line_breaking_object(&registry));
    assert!(!at(&registry, PAGE, 3).is_in_line_breaking_object(&registry));

    let tree = Tree::from_update(&TreeUpdate::new(1, vec![
        NodeData::new(1, Role::ListItem).with_children(&[2]),
        NodeData::new(2, Role::ListMarker)
            .with_bool(BoolAttribute::IsLineBreakingObject, true),
    ]))
    .unwrap();
    let marker = NodePosition::create_position(tree.get(NodeId(2)).unwrap(), 0, TextAffinity::Downstream);
    assert!(!marker.is_in_line_breaking_object(&tree));
}

#[test]
fn test_line_links() {
    let registry = registry(EmbeddedObjectBehavior::SuppressCharacter);
    let pos = at(&registry, PAGE, 3);
    assert_eq!(pos.next_on_line_id(&registry, NodeId(3)), NodeId(4));
    assert_eq!(pos.previous_on_line_id(&registry, NodeId(4)), NodeId(3));
    assert_eq!(pos.next_on_line_id(&registry, NodeId(4)), NodeId::INVALID);
    assert_eq!(pos.next_on_line_id(&registry, NodeId(99)), NodeId::INVALID);
}

#[test]
fn test_text_styles_fall_back_to_parent() {
    let registry = registry(EmbeddedObjectBehavior::SuppressCharacter);
    assert!(at(&registry, PAGE, 3).text_styles(&registry).has_style(TextStyles::BOLD));
    let own = at(&registry, PAGE, 4).text_styles(&registry);
    assert!(own.has_style(TextStyles::ITALIC));
    assert!(!own.has_style(TextStyles::BOLD));
    assert!(at(&registry, PAGE, 1).text_styles(&registry).is_unset());
    assert_eq!(at(&registry, PAGE, 3).role(&registry), Role::StaticText);
}
