use std::path::PathBuf;
use htpy_scanner::ast_visitor::{extract_classes_from_content, extract_classes_from_file, ClassSet};

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn classes(source: &str) -> ClassSet {
    extract_classes_from_content(source, "test.py").unwrap()
}

fn set(items: &[&str]) -> ClassSet {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_class_keyword() {
    assert_eq!(classes("div(class_='bg-blue-500 text-white')"), set(&["bg-blue-500", "text-white"]));
}

#[test]
fn test_class_keyword_splits_whitespace_runs() {
    assert_eq!(classes("div(class_='a b  c')"), set(&["a", "b", "c"]));
    assert_eq!(classes("div(class_='  a\tb  ')"), set(&["a", "b"]));
}

#[test]
fn test_dot_notation() {
    assert_eq!(classes("div('.bg-red-500 .p-4')"), set(&["bg-red-500", "p-4"]));
}

#[test]
fn test_dot_notation_strips_every_leading_dot() {
    assert_eq!(classes("div('.x ..y .')"), set(&["x", "y"]));
}

#[test]
fn test_dot_notation_tokens_without_dot_are_kept() {
    // Only the first token has to start with a dot
    assert_eq!(classes("div('.x y')"), set(&["x", "y"]));
}

#[test]
fn test_mixed_syntax() {
    let code = "div('.flex .items-center', span(class_='text-sm font-bold'), p('.mx-4'))";
    assert_eq!(
        classes(code),
        set(&["flex", "items-center", "text-sm", "font-bold", "mx-4"])
    );
}

#[test]
fn test_both_forms_on_one_call() {
    assert_eq!(classes("div('.a', class_='b')"), set(&["a", "b"]));
}

#[test]
fn test_nested_calls_in_function_bodies() {
    let code = "def page():\n    if True:\n        return div(section(article(class_='deep')))\n";
    assert_eq!(classes(code), set(&["deep"]));
}

#[test]
fn test_handle_empty_functions() {
    assert!(classes("div()\nspan()").is_empty());
}

#[test]
fn test_ignore_non_class_attributes() {
    let code = "div(id_='myDiv', class_='bg-blue-500', data_value='test')";
    assert_eq!(classes(code), set(&["bg-blue-500"]));
}

#[test]
fn test_id_shorthand_contributes_nothing() {
    assert!(classes("div('#main')").is_empty());
    assert!(classes("div('#main .card')").is_empty());
}

#[test]
fn test_non_literal_values_are_ignored() {
    assert!(classes("div(class_=classes)").is_empty());
    assert!(classes("div(class_='a' if x else 'b')").is_empty());
    assert!(classes("div(class_='a ' + extra)").is_empty());
    assert!(classes("div(name)").is_empty());
    assert!(classes("div(1, class_=2)").is_empty());
}

#[test]
fn test_empty_and_whitespace_strings() {
    assert!(classes("div(class_='')").is_empty());
    assert!(classes("div(class_='   ')").is_empty());
    assert!(classes("div('.')").is_empty());
}

#[test]
fn test_dot_form_requires_first_positional_argument() {
    assert!(classes("div(content, '.late')").is_empty());
    assert_eq!(classes("div(class_='k', *['.x'])"), set(&["k"]));
    assert!(classes("div('plain .text')").is_empty());
}

#[test]
fn test_attribute_callee_only_supports_keyword_form() {
    assert_eq!(classes("h.div('.dotted', class_='kw')"), set(&["kw"]));
    assert_eq!(classes("make()('.x')"), set(&[]));
}

#[test]
fn test_module_level_and_decorator_calls() {
    let code = "@register(class_='decorated')\ndef view():\n    pass\nROOT = div('.root')\n";
    assert_eq!(classes(code), set(&["decorated", "root"]));
}

#[test]
fn test_invalid_syntax_is_an_error() {
    let result = extract_classes_from_content("this is not valid python", "invalid.py");
    assert!(result.is_err());
    assert!(result.unwrap_err().is_parse_error());
}

#[test]
fn test_scan_layout_fixture() {
    let extracted = extract_classes_from_file(&fixture_path("layout.py")).unwrap();
    assert_eq!(
        extracted,
        set(&[
            "min-h-screen",
            "bg-gray-50",
            "flex",
            "items-center",
            "justify-between",
            "px-6",
            "max-w-7xl",
            "mx-auto",
            "text-3xl",
            "font-bold",
            "text-gray-900",
        ])
    );
}

#[test]
fn test_scan_components_fixture() {
    let extracted = extract_classes_from_file(&fixture_path("components.py")).unwrap();
    assert_eq!(
        extracted,
        set(&[
            "rounded-xl",
            "shadow-lg",
            "p-6",
            "px-4",
            "py-2",
            "rounded-lg",
            "hover:bg-blue-600",
            "still-found",
        ])
    );
}

#[test]
fn test_scan_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let test_file = temp_dir.path().join("test.py");
    std::fs::write(
        &test_file,
        "def my_template():\n\
         \x20   return div('.container .mx-auto',\n\
         \x20       h1(class_='text-2xl font-bold'),\n\
         \x20       p('.mt-4 .text-gray-600'))",
    )
    .unwrap();

    let extracted = extract_classes_from_file(&test_file).unwrap();
    assert_eq!(
        extracted,
        set(&["container", "mx-auto", "text-2xl", "font-bold", "mt-4", "text-gray-600"])
    );
}

#[test]
fn test_missing_file_is_an_io_error() {
    let result = extract_classes_from_file(&fixture_path("does_not_exist.py"));
    let err = result.unwrap_err();
    assert!(!err.is_parse_error());
}
