use criterion::{black_box, criterion_group, criterion_main, Criterion};
use relmodel::ast::{Declaration, Expression, RecordRelation};
use relmodel::solver::{Options, Solver};

/// Room/teacher assignment: every teacher teaches in some room and every
/// room has some teacher
fn room_teacher_problem(num_rooms: usize, num_teachers: usize) -> Vec<Declaration> {
    let atoms = |prefix: &str, n: usize| {
        Expression::set(
            (0..n)
                .map(|i| Expression::string(format!("{}{}", prefix, i)))
                .collect(),
        )
    };

    vec![
        Declaration::record("Room", vec![], vec![RecordRelation::new("teacher", "Teacher")]),
        Declaration::record("Teacher", vec![], vec![]),
        Declaration::facts(vec![
            Expression::symbol("Room").equals(atoms("Room", num_rooms)),
            Expression::symbol("Teacher").equals(atoms("Teacher", num_teachers)),
        ]),
        Declaration::constraint(Expression::forall(
            ["t"],
            "Teacher",
            Expression::exists(
                ["r"],
                "Room",
                Expression::variable("r").member("teacher").equals(Expression::variable("t")),
            ),
        )),
        Declaration::constraint(Expression::forall(
            ["r"],
            "Room",
            Expression::exists(
                ["t"],
                "Teacher",
                Expression::variable("r").member("teacher").equals(Expression::variable("t")),
            ),
        )),
    ]
}

fn solver_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("solver");

    for (rooms, teachers) in [(2, 2), (4, 3), (8, 6)] {
        group.bench_function(format!("room_teacher_{}x{}", rooms, teachers), |b| {
            b.iter(|| {
                let declarations = black_box(room_teacher_problem(rooms, teachers));
                let solver = Solver::new(Options::default());
                let _ = solver.solve(&declarations);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, solver_benchmarks);
criterion_main!(benches);
