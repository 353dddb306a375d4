use arazzo_testgen::codegen::{generate_program, GeneratorOptions};
use arazzo_testgen::document::Sources;

/// Generate and render, failing when no program comes out
pub fn render_sources(sources: &Sources) -> String {
    generate_program(&sources.arazzo, &sources.openapi, &GeneratorOptions::default())
        .render()
        .expect("Expected a generated program")
}

/// Assert that `first` occurs in `text`, and before `second`
pub fn assert_before(text: &str, first: &str, second: &str) {
    let a = text
        .find(first)
        .unwrap_or_else(|| panic!("Expected to find: {}", first));
    let b = text
        .find(second)
        .unwrap_or_else(|| panic!("Expected to find: {}", second));
    assert!(a < b, "Expected `{}` before `{}`", first, second);
}

pub fn assert_contains(text: &str, needle: &str) {
    assert!(
        text.contains(needle),
        "Expected generated program to contain:\n{}\n\n--- program ---\n{}",
        needle,
        text
    );
}
