//! End-to-end engine scenarios, stroke in, typed text out, driven entirely through the public
//! crate API (`Engine::add_stroke` and a `RecordingSink`).

use steno_engine::dict::ortho::{AutoSuffix, NoWordList};
use steno_engine::dict::ram::MapDictBuilder;
use steno_engine::dict::stack::DictionaryStack;
use steno_engine::engine::Engine;
use steno_engine::sink::RecordingSink;
use steno_engine::{EngineConfig, Stroke};
use steno_macros::stroke;

fn engine_with(entries: &[(Vec<Stroke>, &str)]) -> Engine<'static, NoWordList> {
    let mut builder = MapDictBuilder::new();
    for (strokes, text) in entries {
        builder.insert(strokes.clone(), text.to_string());
    }
    let mut stack = DictionaryStack::new();
    stack.push("main", true, Box::new(builder.into_map_dict()));
    Engine::new(EngineConfig::default(), stack, &[], &[], &NoWordList)
}

#[test]
fn s1_single_stroke_types_its_definition() {
    let mut engine = engine_with(&[(vec![stroke!("KAT")], "cat")]);
    let mut sink = RecordingSink::default();
    engine.add_stroke(stroke!("KAT"), &mut sink);
    assert_eq!(sink.typed, "cat");
}

#[test]
fn s2_longer_outline_replaces_the_shorter_one_it_extends() {
    let mut engine = engine_with(&[
        (vec![stroke!("HEL")], "hello"),
        (vec![stroke!("HEL"), stroke!("HROE")], "hello world"),
    ]);
    let mut sink = RecordingSink::default();

    engine.add_stroke(stroke!("HEL"), &mut sink);
    assert_eq!(sink.typed, "hello");

    engine.add_stroke(stroke!("HROE"), &mut sink);
    assert_eq!(sink.typed, "hello world");
    assert_eq!(sink.backspaces, 5);
}

#[test]
fn s3_auto_suffix_joins_via_orthography() {
    let mut builder = MapDictBuilder::new();
    builder.insert(vec![stroke!("RUPB")], "run".to_string());
    let mut stack = DictionaryStack::new();
    stack.push("main", true, Box::new(builder.into_map_dict()));

    let auto_suffixes = [AutoSuffix {
        bit: stroke!("-G"),
        text: "ing",
    }];
    let mut engine = Engine::new(
        EngineConfig::default(),
        stack,
        &[],
        &auto_suffixes,
        &NoWordList,
    );
    let mut sink = RecordingSink::default();

    engine.add_stroke(stroke!("RUPB") | stroke!("-G"), &mut sink);
    assert_eq!(sink.typed, "running");
}

#[test]
fn s4_undo_retracts_the_whole_translation() {
    let mut engine = engine_with(&[(vec![stroke!("KAT")], "cat")]);
    let mut sink = RecordingSink::default();

    engine.add_stroke(stroke!("KAT"), &mut sink);
    assert_eq!(sink.typed, "cat");

    engine.add_stroke(stroke!("*"), &mut sink);
    assert_eq!(sink.typed, "");
}

#[test]
fn s5_glue_directive_suppresses_the_leading_space() {
    let mut engine = engine_with(&[
        (vec![stroke!("TPO")], "foo"),
        (vec![stroke!("-T")], "{^}the"),
    ]);
    let mut sink = RecordingSink::default();

    engine.add_stroke(stroke!("TPO"), &mut sink);
    engine.add_stroke(stroke!("-T"), &mut sink);
    assert_eq!(sink.typed, "foothe");
}

#[test]
fn s6_unknown_stroke_fingerspells_its_canonical_text() {
    let mut engine: Engine<'static, NoWordList> = engine_with(&[]);
    let mut sink = RecordingSink::default();

    let raw = stroke!("STKPWH");
    engine.add_stroke(raw, &mut sink);
    assert_eq!(sink.typed, raw.to_string());
}

#[test]
fn retranslation_only_backspaces_the_divergent_suffix() {
    // Extending "hello" to "hello world" only needs to erase "hello"'s own 5 characters, not
    // retype the shared prefix: s2 already asserts the backspace count, this checks the typed
    // text still carries the full replacement even though the diff is partial.
    let mut engine = engine_with(&[
        (vec![stroke!("HEL")], "hello"),
        (vec![stroke!("HEL"), stroke!("HROE")], "hello there"),
    ]);
    let mut sink = RecordingSink::default();

    engine.add_stroke(stroke!("HEL"), &mut sink);
    engine.add_stroke(stroke!("HROE"), &mut sink);
    assert_eq!(sink.typed, "hello there");
}

#[test]
fn a_dictionary_pushed_first_shadows_one_pushed_after_it() {
    let mut user = MapDictBuilder::new();
    user.insert(vec![stroke!("KAT")], "custom cat".to_string());
    let mut main = MapDictBuilder::new();
    main.insert(vec![stroke!("KAT")], "cat".to_string());

    let mut stack = DictionaryStack::new();
    stack.push("user", true, Box::new(user.into_map_dict()));
    stack.push("main", true, Box::new(main.into_map_dict()));

    let mut engine = Engine::new(EngineConfig::default(), stack, &[], &[], &NoWordList);
    let mut sink = RecordingSink::default();
    engine.add_stroke(stroke!("KAT"), &mut sink);
    assert_eq!(sink.typed, "custom cat");
}

#[test]
fn a_disabled_layer_is_skipped_even_when_it_has_priority() {
    let mut user = MapDictBuilder::new();
    user.insert(vec![stroke!("KAT")], "custom cat".to_string());
    let mut main = MapDictBuilder::new();
    main.insert(vec![stroke!("KAT")], "cat".to_string());

    let mut stack = DictionaryStack::new();
    stack.push("user", false, Box::new(user.into_map_dict()));
    stack.push("main", true, Box::new(main.into_map_dict()));

    let mut engine = Engine::new(EngineConfig::default(), stack, &[], &[], &NoWordList);
    let mut sink = RecordingSink::default();
    engine.add_stroke(stroke!("KAT"), &mut sink);
    assert_eq!(sink.typed, "cat");
}
