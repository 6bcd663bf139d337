use researchflow::editor::{EditorState, DUPLICATE_INSERT_WINDOW_MS};
use researchflow::template::vocabulary::VariableVocabulary;

fn vocabulary() -> VariableVocabulary {
    let mut vocabulary = VariableVocabulary::new();
    vocabulary.insert_step_output("wyckoff");
    vocabulary.insert_tool("Market Data");
    vocabulary
}

#[test]
fn editor_module_render_then_canonical_round_trips_plain_strings() {
    let vocabulary = vocabulary();
    let mut editor = EditorState::new();
    for value in ["", "no tokens at all", "stray { brace"] {
        editor.set_value(value, &vocabulary);
        assert_eq!(editor.canonical_text(), value);
    }
}

#[test]
fn editor_module_chip_reports_canonical_token_not_decoration() {
    let vocabulary = vocabulary();
    let mut editor = EditorState::new();
    editor.set_value("pre {wyckoff_output} post", &vocabulary);
    // the delete glyph shown on a chip is display-only and never leaks
    assert_eq!(editor.canonical_text(), "pre {wyckoff_output} post");
    assert_eq!(editor.chip_count(), 1);
}

#[test]
fn editor_module_unknown_tokens_render_as_text_and_round_trip() {
    let vocabulary = vocabulary();
    let mut editor = EditorState::new();
    editor.set_value("keep {unknown_thing} literal", &vocabulary);
    assert_eq!(editor.chip_count(), 0);
    assert_eq!(editor.canonical_text(), "keep {unknown_thing} literal");
}

#[test]
fn editor_module_duplicate_insert_window_matches_contract() {
    let mut editor = EditorState::new();
    editor.focus();
    assert!(editor.insert_variable("wyckoff_output", 0));
    assert!(!editor.insert_variable(
        "wyckoff_output",
        DUPLICATE_INSERT_WINDOW_MS - 1
    ));
    assert_eq!(editor.chip_count(), 1);
    assert!(editor.insert_variable("wyckoff_output", DUPLICATE_INSERT_WINDOW_MS));
    assert_eq!(editor.chip_count(), 2);
}

#[test]
fn editor_module_backspace_after_chip_is_atomic() {
    let vocabulary = vocabulary();
    let mut editor = EditorState::new();
    editor.set_value("keep {wyckoff_output}", &vocabulary);
    editor.focus();
    editor.move_end();
    editor.backspace();
    assert_eq!(editor.canonical_text(), "keep ");
    // a second backspace eats a plain character, one at a time
    editor.backspace();
    assert_eq!(editor.canonical_text(), "keep");
}

#[test]
fn editor_module_canonical_text_captures_unflushed_edits_before_save() {
    let vocabulary = vocabulary();
    let mut editor = EditorState::new();
    editor.set_value("draft", &vocabulary);
    editor.focus();
    editor.move_end();
    editor.insert_char('!');
    // owner reads the canonical value directly, without waiting for any
    // change-callback round trip
    assert_eq!(editor.canonical_text(), "draft!");
}

#[test]
fn editor_module_insert_lands_at_remembered_position_after_blur() {
    let vocabulary = vocabulary();
    let mut editor = EditorState::new();
    editor.set_value("ab", &vocabulary);
    editor.focus();
    editor.move_home();
    editor.move_right();
    editor.blur();
    editor.insert_variable("market_data", 0);
    assert_eq!(editor.canonical_text(), "a{market_data}b");
    // cursor sits right after the chip and becomes the new remembered spot
    editor.blur();
    editor.insert_variable("wyckoff_output", 10_000);
    assert_eq!(
        editor.canonical_text(),
        "a{market_data}{wyckoff_output}b"
    );
}

#[test]
fn editor_module_select_all_then_type_overwrites_everything() {
    let vocabulary = vocabulary();
    let mut editor = EditorState::open("old {wyckoff_output} content", &vocabulary);
    editor.insert_text("fresh");
    assert_eq!(editor.canonical_text(), "fresh");
}

#[test]
fn editor_module_deliberate_reinsertion_in_two_places_is_supported() {
    let mut editor = EditorState::new();
    editor.focus();
    editor.insert_variable("wyckoff_output", 0);
    editor.insert_char(' ');
    editor.insert_variable("wyckoff_output", 2_000);
    assert_eq!(
        editor.canonical_text(),
        "{wyckoff_output} {wyckoff_output}"
    );
}
