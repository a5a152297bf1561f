use flexverb::{Parser, Term, parse};
use flexverb_interpreter::{
    ActionHandler, ActionId, ActionRegistry, Interpreter, RuntimeError, WriterActions,
    check_script, execute_script,
};
use proptest::prelude::*;

/// Records every invocation instead of performing it.
#[derive(Default)]
struct Recorder {
    calls: Vec<(ActionId, Option<String>)>,
}

impl ActionHandler for Recorder {
    fn invoke(&mut self, action: &ActionId, argument: Option<&str>) -> Result<(), RuntimeError> {
        self.calls.push((action.clone(), argument.map(str::to_string)));
        Ok(())
    }
}

fn run(source: &str) -> String {
    let sentence = parse(source).expect("parse failed");
    let registry = ActionRegistry::default();
    let mut output = Vec::new();
    Interpreter::new(&registry)
        .interpret(sentence, &mut WriterActions::new(&mut output))
        .expect("execution failed");
    String::from_utf8(output).unwrap()
}

fn interpret(source: &str) -> (Result<(), RuntimeError>, Recorder) {
    let sentence = parse(source).expect("parse failed");
    let registry = ActionRegistry::default();
    let mut recorder = Recorder::default();
    let result = Interpreter::new(&registry).interpret(sentence, &mut recorder);
    (result, recorder)
}

#[test]
fn executes_a_method() {
    assert_eq!(
        run("verb(print) direct-object(\"hello world\")"),
        "hello world\n"
    );
}

#[test]
fn ignores_word_order() {
    assert_eq!(
        run("direct-object(\"hello world\") verb(print)"),
        "hello world\n"
    );
}

#[test]
fn both_orders_invoke_identically() {
    let (forward, forward_calls) = interpret("verb(print) direct-object(\"hello world\")");
    let (reverse, reverse_calls) = interpret("direct-object(\"hello world\") verb(print)");
    assert_eq!(forward, Ok(()));
    assert_eq!(reverse, Ok(()));
    assert_eq!(forward_calls.calls, reverse_calls.calls);
    assert_eq!(
        forward_calls.calls,
        vec![(ActionId::OUTPUT, Some("hello world".to_string()))]
    );
}

#[test]
fn verb_without_object_invokes_with_no_argument() {
    let (result, recorder) = interpret("v(print)");
    assert_eq!(result, Ok(()));
    assert_eq!(recorder.calls, vec![(ActionId::OUTPUT, None)]);
    assert_eq!(run("verb(print)"), "\n");
}

#[test]
fn accepts_bare_term_and_collection() {
    let registry = ActionRegistry::default();
    let interpreter = Interpreter::new(&registry);
    let bare = interpreter.resolve(Term::verb("print")).unwrap();
    let collection = interpreter.resolve(vec![Term::verb("print")]).unwrap();
    assert_eq!(bare, collection);
}

#[test]
fn unknown_verb_performs_nothing() {
    let (result, recorder) = interpret("verb(shout) o(\"hi\")");
    assert_eq!(result, Err(RuntimeError::UnknownVerb("shout".to_string())));
    assert!(recorder.calls.is_empty());
}

#[test]
fn missing_verb() {
    let (result, recorder) = interpret("direct-object(\"hello world\")");
    assert_eq!(result, Err(RuntimeError::MissingVerb));
    assert!(recorder.calls.is_empty());
}

#[test]
fn duplicate_role_performs_nothing() {
    let (result, recorder) = interpret("v(print) o(\"a\") o(\"b\")");
    assert!(matches!(result, Err(RuntimeError::DuplicateRole(_))));
    assert!(recorder.calls.is_empty());
}

#[test]
fn custom_registry_routes_to_custom_actions() {
    let registry = ActionRegistry::builder()
        .verb("say", ActionId::OUTPUT)
        .verb("quit", ActionId::new("exit"))
        .build();
    let interpreter = Interpreter::new(&registry);

    let mut recorder = Recorder::default();
    interpreter
        .interpret(parse("o(\"bye\") v(say)").unwrap(), &mut recorder)
        .unwrap();
    interpreter
        .interpret(parse("v(quit)").unwrap(), &mut recorder)
        .unwrap();
    assert_eq!(
        recorder.calls,
        vec![
            (ActionId::OUTPUT, Some("bye".to_string())),
            (ActionId::new("exit"), None),
        ]
    );

    // `print` is not in this registry.
    assert_eq!(
        interpreter.resolve(Term::verb("print")),
        Err(RuntimeError::UnknownVerb("print".to_string()))
    );
}

#[test]
fn handler_errors_propagate() {
    let registry = ActionRegistry::builder()
        .verb("quit", ActionId::new("exit"))
        .build();
    let mut output = Vec::new();
    let err = Interpreter::new(&registry)
        .interpret(Term::verb("quit"), &mut WriterActions::new(&mut output))
        .unwrap_err();
    assert_eq!(err, RuntimeError::UnsupportedAction(ActionId::new("exit")));
}

#[test]
fn script_runs_every_line() {
    let source = "# greet twice\nv(print) o(\"one\")\n\no(\"two\") verb(print)\n";
    let script = Parser::new(source, 0).parse_script().unwrap();
    let registry = ActionRegistry::default();
    let mut output = Vec::new();
    let count = execute_script(&script, &registry, &mut WriterActions::new(&mut output)).unwrap();
    assert_eq!(count, 2);
    assert_eq!(String::from_utf8(output).unwrap(), "one\ntwo\n");
}

#[test]
fn script_stops_at_first_failure() {
    let source = "v(print) o(\"one\")\nv(yell) o(\"two\")\nv(print) o(\"three\")\n";
    let script = Parser::new(source, 4).parse_script().unwrap();
    let registry = ActionRegistry::default();
    let mut recorder = Recorder::default();

    let err = execute_script(&script, &registry, &mut recorder).unwrap_err();
    assert_eq!(err.error, RuntimeError::UnknownVerb("yell".to_string()));
    assert_eq!(err.source_id, 4);
    // Points at `v(yell)` on the second line.
    assert_eq!(err.span, 18..25);
    assert_eq!(recorder.calls.len(), 1);
}

#[test]
fn script_errors_without_term_span_cover_the_line() {
    let source = "o(\"orphan\")\n";
    let script = Parser::new(source, 0).parse_script().unwrap();
    let err = check_script(&script, &ActionRegistry::default()).unwrap_err();
    assert_eq!(err.error, RuntimeError::MissingVerb);
    assert_eq!(err.span, 0..11);

    let diagnostic = err.to_diagnostic();
    assert_eq!(diagnostic.message, "missing verb: sentence has no verb term");
    assert_eq!(diagnostic.labels.len(), 1);
}

#[test]
fn duplicate_role_points_at_second_term() {
    let source = "v(print) o(\"a\") o(\"b\")";
    let script = Parser::new(source, 0).parse_script().unwrap();
    let err = check_script(&script, &ActionRegistry::default()).unwrap_err();
    assert_eq!(err.span, 16..22);
}

#[test]
fn check_script_resolves_without_performing() {
    let source = "v(print) o(\"a\")\no(\"b\") v(print)";
    let script = Parser::new(source, 0).parse_script().unwrap();
    let invocations = check_script(&script, &ActionRegistry::default()).unwrap();
    let arguments: Vec<_> = invocations.iter().map(|i| i.argument.as_deref()).collect();
    assert_eq!(arguments, vec![Some("a"), Some("b")]);
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

fn render(verb: &str, literal: &str, terse_verb: bool, terse_object: bool) -> (String, String) {
    let verb_marker = if terse_verb { "v" } else { "verb" };
    let object_marker = if terse_object { "o" } else { "direct-object" };
    (
        format!("{}({})", verb_marker, verb),
        format!("{}(\"{}\")", object_marker, literal),
    )
}

proptest! {
    #[test]
    fn order_and_notation_do_not_change_the_invocation(
        verb in prop::sample::select(vec!["print", "say", "echo"]),
        literal in "[a-zA-Z0-9 ()!?.,-]{0,16}",
        separator in "[ \t\n]{1,4}",
        terse_verb in any::<bool>(),
        terse_object in any::<bool>(),
        object_first in any::<bool>(),
    ) {
        let registry = ActionRegistry::builder()
            .verb("print", ActionId::OUTPUT)
            .verb("say", ActionId::OUTPUT)
            .verb("echo", ActionId::new("echo"))
            .build();
        let interpreter = Interpreter::new(&registry);

        let (verb_term, object_term) = render(verb, &literal, terse_verb, terse_object);
        let source = if object_first {
            format!("{}{}{}", object_term, separator, verb_term)
        } else {
            format!("{}{}{}", verb_term, separator, object_term)
        };

        let invocation = interpreter.resolve(parse(&source).unwrap()).unwrap();
        prop_assert_eq!(invocation.action, registry.resolve(verb).unwrap().clone());
        prop_assert_eq!(invocation.argument, Some(literal.clone()));
    }

    #[test]
    fn terse_and_full_markers_parse_identically(
        verb in "[a-z_!-]{1,10}",
        literal in "[^\"]{0,16}",
    ) {
        let (full_verb, full_object) = render(&verb, &literal, false, false);
        let (terse_verb, terse_object) = render(&verb, &literal, true, true);
        prop_assert_eq!(parse(&full_verb).unwrap(), parse(&terse_verb).unwrap());
        prop_assert_eq!(parse(&full_object).unwrap(), parse(&terse_object).unwrap());
    }
}
