//! End-to-end runs over the room/teacher assignment problem

use relmodel::ast::{Declaration, Expression, RecordRelation};
use relmodel::engine::{Evaluator, MockSolver};
use relmodel::solver::{Options, Solver};
use relmodel::translator::Translator;
use relmodel::{RelmodelError, Set, Value};

fn strings(values: &[&str]) -> Expression {
    Expression::set(values.iter().map(|s| Expression::string(*s)).collect())
}

fn declarations(constraints: Vec<Expression>) -> Vec<Declaration> {
    let mut declarations = vec![
        Declaration::import("peg.lang.String"),
        Declaration::record("Room", vec![], vec![RecordRelation::new("teacher", "Teacher")]),
        Declaration::record("Teacher", vec![], vec![]),
        Declaration::facts(vec![
            Expression::symbol("Room").equals(strings(&["Room A", "Room B"])),
            Expression::symbol("Teacher").equals(strings(&["Gerber", "Damasio"])),
        ]),
    ];
    declarations.extend(constraints.into_iter().map(Declaration::constraint));
    declarations
}

fn every_teacher_has_a_room() -> Expression {
    Expression::forall(
        ["t"],
        "Teacher",
        Expression::exists(
            ["r"],
            "Room",
            Expression::variable("r").member("teacher").equals(Expression::variable("t")),
        ),
    )
}

fn every_room_has_a_teacher() -> Expression {
    Expression::forall(
        ["r"],
        "Room",
        Expression::exists(
            ["t"],
            "Teacher",
            Expression::variable("t").equals(Expression::variable("r").member("teacher")),
        ),
    )
}

#[test]
fn assignment_covers_rooms_and_teachers() {
    let _ = env_logger::builder().is_test(true).try_init();
    let declarations = declarations(vec![every_teacher_has_a_room(), every_room_has_a_teacher()]);

    let solution = Solver::new(Options::default())
        .solve(&declarations)
        .expect("room/teacher assignment is satisfiable");
    let model = solution.model();

    let pairs = model.values("Room#teacher").expect("relation is reified");
    for pair in pairs {
        let Value::Tuple(items) = pair else {
            panic!("relation element {} is not a pair", pair);
        };
        assert_eq!(items.len(), 2);
        assert!(model.contains("Room", &items[0]));
        assert!(model.contains("Teacher", &items[1]));
    }
    for room in ["Room A", "Room B"] {
        assert!(
            pairs.iter().any(|p| matches!(p, Value::Tuple(items) if items[0] == Value::str(room))),
            "{} has no teacher",
            room
        );
    }
    for teacher in ["Gerber", "Damasio"] {
        assert!(
            pairs.iter().any(|p| matches!(p, Value::Tuple(items) if items[1] == Value::str(teacher))),
            "{} has no room",
            teacher
        );
    }
    assert!(pairs.len() <= 4);
}

#[test]
fn reified_model_satisfies_every_proposition() {
    let declarations = declarations(vec![every_teacher_has_a_room(), every_room_has_a_teacher()]);
    let options = Options {
        verify_model: false,
        ..Options::default()
    };
    let model = Solver::new(options)
        .solve(&declarations)
        .unwrap()
        .into_model();

    let propositions = Translator::new(&declarations).propositions().unwrap();
    Evaluator::with_model(&model).check(&propositions).unwrap();
}

#[test]
fn curried_comparison_with_a_value() {
    let constraint = Expression::forall(
        ["r"],
        "Room",
        Expression::variable("r")
            .member("teacher")
            .equals(Expression::string("Gerber"))
            .and(
                Expression::variable("r")
                    .member("teacher")
                    .differs(Expression::string("Damasio")),
            ),
    );
    let model = Solver::new(Options::default())
        .solve(&declarations(vec![constraint]))
        .unwrap()
        .into_model();

    assert_eq!(
        model.get("Room#teacher"),
        Some(&Set::literal([
            Value::pair(Value::str("Room A"), Value::str("Gerber")),
            Value::pair(Value::str("Room B"), Value::str("Gerber")),
        ]))
    );
}

#[test]
fn runs_are_deterministic() {
    let declarations = declarations(vec![every_teacher_has_a_room(), every_room_has_a_teacher()]);
    let solver = Solver::new(Options::default());
    let first = solver.solve(&declarations).unwrap().into_model();
    let second = solver.solve(&declarations).unwrap().into_model();
    assert_eq!(first, second);
    assert_eq!(
        first.names().collect::<Vec<_>>(),
        vec!["Room", "Room#teacher", "Teacher"]
    );
}

#[test]
fn unconstrained_relation_cannot_be_justified() {
    let result = Solver::new(Options::default()).solve(&declarations(vec![]));
    assert!(matches!(
        result,
        Err(RelmodelError::UnjustifiedRelation { ref relation, .. }) if relation == "Room#teacher"
    ));
}

#[test]
fn record_without_facts_is_unresolvable() {
    let declarations = vec![Declaration::record("Room", vec![], vec![])];
    assert_eq!(
        Solver::new(Options::default()).solve(&declarations).unwrap_err(),
        RelmodelError::UnresolvableUniverse("Room".into())
    );
}

#[test]
fn inconsistent_assignment_is_rejected() {
    let declarations = declarations(vec![every_teacher_has_a_room()]);
    let solver = Solver::new(Options::default());

    // An all-false assignment leaves every teacher without a room
    let mut sat = MockSolver::new();
    assert!(matches!(
        solver.solve_with(&mut sat, &declarations),
        Err(RelmodelError::ModelViolation(_))
    ));
}
