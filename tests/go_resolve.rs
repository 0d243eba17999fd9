use namewise::classify::{Entity, classify};
use namewise::error::RenameError;
use namewise::model::Selector;
use namewise::resolve::{IdentRole, resolve};
use namewise::syntax::SourceFile;
use namewise::syntax::scope::BindingKind;
use std::path::PathBuf;

fn fixture(name: &str) -> SourceFile {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    SourceFile::open(&path).unwrap()
}

#[test]
fn every_column_of_an_identifier_resolves_to_it() {
    let file = fixture("order.go");
    let at = |col| {
        let ident = resolve(&file, &Selector::position(7, col)).unwrap();
        (ident.name, file.location(ident.node).to_string())
    };
    let first = at(2);
    assert_eq!(first.0, "Seq");
    assert!(first.1.ends_with("order.go:7:2"), "{}", first.1);
    assert_eq!(at(3), first);
    assert_eq!(at(4), first);
}

#[test]
fn declaration_and_selector_agree_on_the_struct() {
    let file = fixture("order.go");

    let decl = resolve(&file, &Selector::position(7, 2)).unwrap();
    assert!(matches!(
        decl.role,
        IdentRole::Declared(binding) if binding.kind == BindingKind::Field
    ));

    let usage = resolve(&file, &Selector::position(22, 50)).unwrap();
    assert_eq!(usage.name, "Seq");
    assert!(matches!(usage.role, IdentRole::FieldSelector));

    for ident in [decl, usage] {
        match classify(&file, &ident).unwrap() {
            Entity::Field { struct_name } => assert_eq!(struct_name, "OrderStruct"),
            other => panic!("expected a field, got {other:?}"),
        }
    }
}

#[test]
fn struct_name_is_a_type() {
    let file = fixture("order.go");
    let ident = resolve(&file, &Selector::position(6, 6)).unwrap();
    assert_eq!(ident.name, "OrderStruct");
    assert!(matches!(classify(&file, &ident).unwrap(), Entity::Type { .. }));

    // receiver type reference resolves to the same declaration
    let receiver = resolve(&file, &Selector::position(14, 10)).unwrap();
    assert_eq!(receiver.name, "OrderStruct");
    assert!(matches!(classify(&file, &receiver).unwrap(), Entity::Type { .. }));
}

#[test]
fn locals_report_their_enclosing_function() {
    let file = fixture("sample.go");
    let ident = resolve(&file, &Selector::position(12, 3)).unwrap();
    assert_eq!(ident.name, "count");
    let Entity::Variable { function: Some(func) } = classify(&file, &ident).unwrap() else {
        panic!("expected a variable inside a function");
    };
    assert_eq!(file.function_name(func), "ComputeStats");

    let order = fixture("order.go");
    let ident = resolve(&order, &Selector::position(16, 24)).unwrap();
    assert_eq!(ident.name, "amt");
    let Entity::Variable { function: Some(func) } = classify(&order, &ident).unwrap() else {
        panic!("expected a variable inside a function");
    };
    assert_eq!(order.function_name(func), "ApplyDiscount");
}

#[test]
fn function_variable_selector_finds_bound_names() {
    let file = fixture("fibonacci.go");
    let ident = resolve(&file, &Selector::function_variable("main", "series")).unwrap();
    assert_eq!(ident.name, "series");
    assert!(file.location(ident.node).to_string().ends_with("fibonacci.go:20:2"));

    let err = resolve(&file, &Selector::function_variable("main", "num")).unwrap_err();
    assert!(matches!(err, RenameError::NotFound(_)), "{err:?}");
    let err = resolve(&file, &Selector::function_variable("Fib", "num")).unwrap_err();
    assert!(matches!(err, RenameError::NotFound(_)), "{err:?}");
}

#[test]
fn positions_without_an_identifier_are_not_found() {
    let file = fixture("sample.go");
    for (row, col) in [(100, 1), (9, 1), (3, 1)] {
        let err = resolve(&file, &Selector::position(row, col)).unwrap_err();
        assert!(matches!(err, RenameError::NotFound(_)), "{row}:{col} {err:?}");
    }
}
