#[cfg(test)]
mod tests {
    use itertools::Itertools;
    use proptest::prelude::*;
    use strum::VariantArray;
    use varisat::Var;

    use crate::board::Board;
    use crate::builder::TourBuilder;
    use crate::error::{BuilderInvalidReason, TourError};
    use crate::index::{AuxGroup, AuxTag, VarIndex, Variable};
    use crate::location::Location;
    use crate::logic::{exactly_one, exactly_one_sequential, Encoding};
    use crate::problem::count_tours;
    use crate::solver::{Engine, Model, VarisatEngine};
    use crate::step::KnightStep;
    use crate::symmetry::{are_equivalent, count_up_to_symmetry, Reflection};
    use crate::tour::{Solution, Tour};
    use crate::uniqueness::{leave_one_out, separate_from, separates, separating_constraints, Constraint, ReferencePolicy};

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn tour(cells: &[(usize, usize)]) -> Tour {
        Tour::from(cells.iter().copied().map(Location::from).collect_vec())
    }

    fn sorted_tours(dims: (usize, usize), start: Location, encoding: Encoding) -> Vec<Tour> {
        let mut tours = TourBuilder::with_dims(dims)
            .start_at(start)
            .encoding(encoding)
            .build()
            .unwrap()
            .all_tours()
            .unwrap();
        tours.sort();
        tours
    }

    // the four tours of the 3x4 board from (1, 0), smallest first
    fn tours_3x4_from_1_0() -> Vec<Tour> {
        vec![
            tour(&[(1, 0), (0, 2), (2, 3), (1, 1), (0, 3), (2, 2), (0, 1), (1, 3), (2, 1), (0, 0), (1, 2), (2, 0)]),
            tour(&[(1, 0), (0, 2), (2, 3), (1, 1), (0, 3), (2, 2), (0, 1), (2, 0), (1, 2), (0, 0), (2, 1), (1, 3)]),
            tour(&[(1, 0), (2, 2), (0, 3), (1, 1), (2, 3), (0, 2), (2, 1), (0, 0), (1, 2), (2, 0), (0, 1), (1, 3)]),
            tour(&[(1, 0), (2, 2), (0, 3), (1, 1), (2, 3), (0, 2), (2, 1), (1, 3), (0, 1), (2, 0), (1, 2), (0, 0)]),
        ]
    }

    #[test]
    fn knight_moves() {
        let board = Board::with_dims((3, 3));
        assert_eq!(board.moves_from(Location(0, 0)).sorted().collect_vec(), vec![Location(1, 2), Location(2, 1)]);
        assert_eq!(board.moves_from(Location(1, 1)).count(), 0);
        assert!(board.is_knight_move(Location(2, 1), Location(0, 0)));
        assert!(!board.is_knight_move(Location(0, 0), Location(1, 1)));

        assert_eq!(KnightStep::DownDownRight.attempt_from(Location(0, 0)), Location(2, 1));

        // every move from the middle of a 5x5 board stays on it, and every edge is seen from both ends
        let board = Board::with_dims((5, 5));
        let middle = KnightStep::VARIANTS.iter().map(|step| step.attempt_from(Location(2, 2))).sorted().collect_vec();
        assert_eq!(board.moves_from(Location(2, 2)).sorted().collect_vec(), middle);
        assert!(middle.iter().all(|location| board.is_knight_move(*location, Location(2, 2))));
    }

    #[test]
    fn var_numbering() {
        let index = VarIndex::allocate((3, 4), 12).unwrap();
        assert_eq!(index.primary_count(), 144);
        assert_eq!(index.next_free(), 145);
        assert_eq!(index.var(Location(0, 0), 0).index(), 0);
        assert_eq!(index.var(Location(1, 2), 3).index(), 3 * 12 + 1 * 4 + 2);
        assert_eq!(index.var(Location(2, 3), 11).index(), 143);
        assert_eq!(
            index.describe(Var::from_index(42)),
            Some(Variable::Visit { location: Location(1, 2), timestep: 3 }),
        );
        assert_eq!(index.describe(Var::from_index(144)), None);

        assert!(VarIndex::allocate((1 << 20, 1 << 20), 1).is_none());
    }

    #[test]
    fn auxiliary_variables_follow_primary() {
        let problem = TourBuilder::with_dims((3, 4))
            .encoding(Encoding::SequentialCounter)
            .build()
            .unwrap();
        let index = problem.index();

        // 24 groups of 12 literals, 11 counter variables each
        assert_eq!(index.auxiliary().len(), 24 * 11);
        assert_eq!(index.len(), 144 + 24 * 11);
        assert_eq!(
            index.describe(Var::from_index(144)),
            Some(Variable::Auxiliary(AuxTag { group: AuxGroup::Timestep(0), position: 0 })),
        );
        assert_eq!(
            index.describe(Var::from_index(index.len() - 1)),
            Some(Variable::Auxiliary(AuxTag { group: AuxGroup::Cell(Location(2, 3)), position: 10 })),
        );
        assert_eq!(index.describe(Var::from_index(index.len())), None);

        let naive = TourBuilder::with_dims((3, 4)).build().unwrap();
        assert!(naive.index().auxiliary().is_empty());
    }

    #[test]
    fn cardinality_clause_counts() {
        let vars = (0..5).map(Var::from_index).collect_vec();

        assert_eq!(exactly_one(&vars).len(), 1 + 10);

        let mut next = 5;
        let clauses = exactly_one_sequential(&vars, |_| {
            next += 1;
            Var::from_index(next - 1)
        });
        assert_eq!(clauses.len(), 3 * 5 - 3);
        assert_eq!(next - 5, 4);

        let single = exactly_one_sequential(&vars[..1], |_| unreachable!());
        assert_eq!(single, vec![vec![vars[0].positive()]]);
        assert_eq!(exactly_one_sequential(&vars[..2], |_| unreachable!()).len(), 2);
    }

    #[test]
    fn sequential_counter_admits_exactly_one() {
        for k in 1..=6 {
            let vars = (0..k).map(Var::from_index).collect_vec();
            let mut next = k;
            let clauses = exactly_one_sequential(&vars, |_| {
                next += 1;
                Var::from_index(next - 1)
            });

            let mut engine = VarisatEngine::new();
            for clause in &clauses {
                engine.add_clause(clause);
            }

            let assignments = engine.enumerate_models()
                .map(|model| model.unwrap())
                .map(|model| vars.iter().map(|var| model.value(*var)).collect_vec())
                .collect_vec();

            // the counter is fully determined by the input literals
            assert_eq!(assignments.len(), k);
            assert!(assignments.iter().all(|values| values.iter().filter(|v| **v).count() == 1));
            assert!(assignments.iter().all_unique());
        }
    }

    #[test]
    fn model_enumeration() {
        let a = Var::from_index(0);
        let b = Var::from_index(1);
        let mut engine = VarisatEngine::new();
        engine.add_clause(&[a.positive(), b.positive()]);

        let models = engine.enumerate_models().collect::<crate::Result<Vec<_>>>().unwrap();
        assert_eq!(models.len(), 3);
        assert!(models.iter().all(|model| model.value(a) || model.value(b)));
        assert!(!engine.solve().unwrap());
    }

    #[test]
    fn model_from_lits() {
        let model = Model::from_lits(&[Var::from_index(1).positive(), Var::from_index(0).negative()]);
        assert_eq!(model.len(), 2);
        assert!(!model.value(Var::from_index(0)));
        assert!(model.value(Var::from_index(1)));
        assert!(!model.value(Var::from_index(7)));
        assert_eq!(model.true_vars().collect_vec(), vec![Var::from_index(1)]);
    }

    #[test]
    fn encoding_names() {
        assert_eq!("sc".parse::<Encoding>().unwrap(), Encoding::SequentialCounter);
        assert_eq!("sequential-counter".parse::<Encoding>().unwrap(), Encoding::SequentialCounter);
        assert_eq!("n".parse::<Encoding>().unwrap(), Encoding::Naive);
        assert_eq!(Encoding::SequentialCounter.to_string(), "sequential-counter");
        assert_eq!(Encoding::default(), Encoding::Naive);
        assert!("pairwise".parse::<Encoding>().is_err());
    }

    #[test]
    fn builder_rejects_empty_board() {
        let err = TourBuilder::with_dims((0, 3)).build().unwrap_err();
        assert!(matches!(err, TourError::Invalid(reasons) if reasons == vec![BuilderInvalidReason::StartOutOfBounds]));
    }

    #[test]
    fn builder_rejects_bad_parameters() {
        let mut builder = TourBuilder::with_dims((3, 3));
        builder.start_at(Location(3, 0));
        assert_eq!(builder.is_valid(), Some(&vec![BuilderInvalidReason::StartOutOfBounds]));

        let mut builder = TourBuilder::with_dims((3, 3));
        builder.constrain(Constraint::new(9, Location(0, 0)));
        assert_eq!(builder.is_valid(), Some(&vec![BuilderInvalidReason::ConstraintOutOfBounds]));

        let mut builder = TourBuilder::with_dims((3, 4));
        builder.constrain_all([Constraint::new(1, Location(0, 2)), Constraint::new(1, Location(2, 2))]);
        assert_eq!(builder.is_valid(), Some(&vec![BuilderInvalidReason::ConflictingConstraints]));


        let mut builder = TourBuilder::with_dims((3, 4));
        builder.constrain_all([Constraint::new(1, Location(0, 2)), Constraint::new(1, Location(0, 2))]);
        assert_eq!(builder.is_valid(), None);
        assert_eq!(builder.build().unwrap().constraints().len(), 1);
    }

    #[test]
    fn unsatisfiable_constraints_are_not_errors() {
        let problem = TourBuilder::with_dims((3, 4)).start_at(Location(1, 0)).build().unwrap();

        // one cell at two timesteps
        let twice = [Constraint::new(1, Location(0, 2)), Constraint::new(5, Location(0, 2))];
        let mut builder = TourBuilder::with_dims((3, 4));
        builder.start_at(Location(1, 0)).constrain_all(twice);
        assert_eq!(builder.is_valid(), None);
        assert!(builder.build().unwrap().solve().unwrap().is_none());

        let constrained = problem.constrained(&twice).unwrap();
        assert_eq!(constrained.constraints(), &twice);
        assert!(constrained.solve().unwrap().is_none());
        assert!(constrained.all_solutions().unwrap().is_empty());

        // the start cell again later on
        let revisit = problem.constrained(&[Constraint::new(5, Location(1, 0))]).unwrap();
        assert!(revisit.solve().unwrap().is_none());

        let err = problem.constrained(&[Constraint::new(1, Location(0, 2)), Constraint::new(1, Location(2, 2))]).unwrap_err();
        assert!(matches!(err, TourError::Invalid(reasons) if reasons == vec![BuilderInvalidReason::ConflictingConstraints]));
    }

    #[test]
    fn tour_agrees_with_model() {
        for encoding in Encoding::VARIANTS {
            let problem = TourBuilder::with_dims((3, 4))
                .start_at(Location(1, 0))
                .encoding(*encoding)
                .build()
                .unwrap();
            let index = problem.index();

            let mut engine = VarisatEngine::new();
            problem.load(&mut engine);
            assert!(engine.solve().unwrap());
            let model = engine.model().unwrap();

            let tour = Solution::from_model(&model, index).unwrap().to_tour().unwrap();
            assert_eq!(tour.len(), 12);
            for t in 0..tour.len() {
                let location = tour.at(t).unwrap();
                assert!(model.value(index.var(location, t)));

                let board = problem.board();
                let visited = board.cells().filter(|cell| model.value(index.var(*cell, t))).collect_vec();
                assert_eq!(visited, vec![location]);
            }

            // every true primary variable is a step of the tour
            let primary = model.true_vars()
                .filter_map(|var| index.describe(var))
                .filter_map(|variable| match variable {
                    Variable::Visit { location, timestep } => Some((timestep, location)),
                    Variable::Auxiliary(_) => None,
                })
                .sorted()
                .collect_vec();
            assert_eq!(primary, tour.locations().iter().copied().enumerate().collect_vec());
        }
    }

    #[test]
    fn single_cell() {
        init_tracing();
        let problem = TourBuilder::with_dims((1, 1)).build().unwrap();

        let solution = problem.solve().unwrap().unwrap();
        assert_eq!(solution.to_rows(), vec![vec![0]]);
        assert_eq!(problem.all_solutions().unwrap().len(), 1);
        assert!(problem.uniqueness_constraints(ReferencePolicy::Smallest).unwrap().is_empty());
    }

    #[test]
    fn dead_ends_are_not_tours() {
        // some cell of each board has no knight move at all
        for dims in [(1, 2), (2, 1), (2, 2), (2, 3)] {
            for encoding in Encoding::VARIANTS {
                let problem = TourBuilder::with_dims(dims).encoding(*encoding).build().unwrap();
                assert!(problem.solve().unwrap().is_none(), "{dims:?} {encoding}");
            }
        }
    }

    #[test]
    fn no_tour_from_center_of_3x3() {
        init_tracing();
        for encoding in Encoding::VARIANTS {
            let problem = TourBuilder::with_dims((3, 3))
                .start_at(Location(1, 1))
                .encoding(*encoding)
                .build()
                .unwrap();
            assert!(problem.solve().unwrap().is_none());
            assert!(problem.all_solutions().unwrap().is_empty());
        }
    }

    #[test]
    fn no_tour_on_4x4() {
        let naive = count_tours((4, 4), Encoding::Naive).unwrap();
        let sequential = count_tours((4, 4), Encoding::SequentialCounter).unwrap();

        assert_eq!(naive.len(), 16);
        assert_eq!(naive, sequential);
        assert!(naive.iter().all(|(_, count)| *count == 0));
    }

    #[test]
    fn solve_5x5_corner() {
        init_tracing();
        let problem = TourBuilder::with_dims((5, 5))
            .encoding(Encoding::SequentialCounter)
            .build()
            .unwrap();

        let solution = problem.solve().unwrap().unwrap();
        assert!(solution.is_complete());
        assert_eq!(solution.get(Location(0, 0)), Some(0));
        assert_eq!(solution.cells().iter().flatten().copied().sorted().collect_vec(), (0..25).collect_vec());

        let tour = solution.to_tour().unwrap();
        assert!(tour.is_valid(problem.board(), Location(0, 0)));
        assert_eq!(tour.to_solution((5, 5)), solution);
    }

    #[test]
    fn count_3x4() {
        let counts = count_tours((3, 4), Encoding::SequentialCounter).unwrap();
        let expected = [
            2, 0, 0, 2,
            4, 0, 0, 4,
            2, 0, 0, 2,
        ];

        assert_eq!(counts.iter().map(|(_, count)| *count).collect_vec(), expected);
        assert_eq!(counts[4].0, Location(1, 0));
        assert_eq!(counts.iter().map(|(_, count)| count).sum::<usize>(), 16);

        let transposed = count_tours((4, 3), Encoding::Naive).unwrap();
        for (Location(row, col), count) in transposed {
            assert_eq!(count, counts[col * 4 + row].1);
        }
    }

    #[test]
    fn all_tours_3x4() {
        let tours = sorted_tours((3, 4), Location(1, 0), Encoding::Naive);
        assert_eq!(tours, tours_3x4_from_1_0());

        let board = Board::with_dims((3, 4));
        assert!(tours.iter().all(|tour| tour.is_valid(&board, Location(1, 0))));
    }

    #[test]
    fn encodings_agree_on_3x4() {
        for start in [Location(0, 0), Location(1, 0), Location(2, 3), Location(1, 1)] {
            assert_eq!(
                sorted_tours((3, 4), start, Encoding::Naive),
                sorted_tours((3, 4), start, Encoding::SequentialCounter),
            );
        }
    }

    #[test]
    fn display_solution() {
        let solution = tours_3x4_from_1_0()[0].to_solution((3, 4));
        assert_eq!(format!("{}", solution), " 9  6  1  4
 0  3 10  7
11  8  5  2
");

        let partial = tour(&[(0, 0), (1, 2)]).to_solution((2, 3));
        assert!(!partial.is_complete());
        assert_eq!(format!("{}", partial), "0 . .
. . 1
");
        assert_eq!(partial.to_rows(), vec![vec![0, -1, -1], vec![-1, -1, 1]]);
        assert!(matches!(partial.to_tour(), Err(TourError::IncompleteSolution(_))));
    }

    #[test]
    fn unique_tour_3x4() {
        init_tracing();
        let problem = TourBuilder::with_dims((3, 4))
            .start_at(Location(1, 0))
            .encoding(Encoding::SequentialCounter)
            .build()
            .unwrap();

        let constraints = problem.uniqueness_constraints(ReferencePolicy::Smallest).unwrap();
        assert_eq!(constraints, vec![
            Constraint::new(1, Location(0, 2)),
            Constraint::new(7, Location(1, 3)),
        ]);
        assert_eq!(constraints[0].to_string(), "(0, 2) at t=1");

        let check = problem.check_separation(&constraints).unwrap();
        assert!(check.is_unique());
        assert!(check.is_irredundant());
        assert_eq!(check.leave_one_out, vec![2, 2]);

        let solved = problem.constrained(&constraints).unwrap().solve().unwrap().unwrap();
        assert_eq!(solved.to_tour().unwrap(), tours_3x4_from_1_0()[0]);
    }

    #[test]
    fn unique_tour_3x4_corner() {
        let problem = TourBuilder::with_dims((3, 4)).build().unwrap();
        let constraints = problem.uniqueness_constraints(ReferencePolicy::Smallest).unwrap();

        assert_eq!(constraints, vec![Constraint::new(7, Location(1, 0))]);
        assert!(problem.check_separation(&constraints).unwrap().is_unique());
    }

    #[test]
    fn seeded_reference_is_reproducible() {
        let tours = tours_3x4_from_1_0();

        for seed in [0, 7, 1 << 40] {
            let first = separating_constraints(&tours, ReferencePolicy::Seeded(seed));
            assert_eq!(first, separating_constraints(&tours, ReferencePolicy::Seeded(seed)));

            let reference = ReferencePolicy::Seeded(seed).choose(&tours).unwrap();
            assert!(separates(&tours, reference, &first));
        }

        let reference = ReferencePolicy::Entropy.choose(&tours).unwrap();
        let constraints = separate_from(&tours, reference);
        assert!(separates(&tours, reference, &constraints));
        assert!(leave_one_out(&constraints).all(|subset| !separates(&tours, reference, &subset)));
    }

    #[test]
    fn redundant_constraints_are_dropped() {
        let reference = tour(&[(0, 0), (0, 1), (0, 2), (0, 3)]);
        let tours = [
            reference.clone(),
            tour(&[(0, 0), (0, 1), (0, 3), (0, 2)]),
            tour(&[(0, 0), (0, 1), (0, 2), (1, 0)]),
        ];

        // the greedy pass constrains t = 2 and t = 3, but t = 3 alone excludes both alternatives
        assert_eq!(separate_from(&tours, &reference), vec![Constraint::new(3, Location(0, 3))]);
    }

    #[test]
    fn duplicate_tours_need_no_constraint() {
        let single = tours_3x4_from_1_0().remove(0);
        assert!(separating_constraints(&[single.clone(), single], ReferencePolicy::Smallest).is_empty());
        assert!(separating_constraints(&[], ReferencePolicy::Entropy).is_empty());
    }

    #[test]
    fn leave_one_out_subsets() {
        let constraints = [
            Constraint::new(1, Location(0, 2)),
            Constraint::new(4, Location(0, 3)),
            Constraint::from((7usize, 1usize, 3usize)),
        ];
        let subsets = leave_one_out(&constraints).collect_vec();

        assert_eq!(subsets.len(), 3);
        assert_eq!(subsets[1], vec![constraints[0], constraints[2]]);
        assert_eq!(constraints[2].as_triple(), (7, 1, 3));
    }

    #[test]
    fn symmetry_classes_3x4() {
        let solutions = count_tours((3, 4), Encoding::Naive)
            .unwrap()
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .flat_map(|(start, _)| TourBuilder::with_dims((3, 4)).start_at(start).build().unwrap().all_solutions().unwrap())
            .collect::<Vec<Solution>>();

        assert_eq!(solutions.len(), 16);
        assert_eq!(count_up_to_symmetry(&solutions), 4);

        let solution = &solutions[0];
        assert_eq!(solution.reflect(Reflection::Central).reflect(Reflection::Central), *solution);
        assert!(are_equivalent(solution, &solution.reflect(Reflection::Horizontal)));
        assert_eq!(solution.reflect(Reflection::Vertical).get(Location(0, 3)), solution.get(Location(0, 0)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn encodings_agree(
            (rows, cols, row, col) in (1usize..=3, 1usize..=4)
                .prop_flat_map(|(rows, cols)| (Just(rows), Just(cols), 0..rows, 0..cols))
        ) {
            let start = Location(row, col);
            let naive = sorted_tours((rows, cols), start, Encoding::Naive);
            let sequential = sorted_tours((rows, cols), start, Encoding::SequentialCounter);

            let board = Board::with_dims((rows, cols));
            prop_assert!(naive.iter().all(|tour| tour.is_valid(&board, start)));
            prop_assert_eq!(naive, sequential);
        }
    }
}
