//! Linear-systems topics: 2x2 systems, augmented matrices, row reduction,
//! solution classification, and parametric form.
//!
//! Systems are drawn coefficients-first with a |det| >= 2 guard, then the
//! right-hand side is produced by forward-substituting a chosen integer
//! solution, so every solvable system has an exact lattice-point answer.

use crate::domain::{Difficulty, ExerciseBody, ExerciseKind, Expected, GenOut, Vec2};
use crate::gen::{
  build_exercise, component_range, grid_extent, pick_archetype, retry_draw, single_choice_options,
  GenOpts,
};
use crate::numeric::{det2, tolerance_for};
use crate::rng::Rng;
use crate::util::{fmt_matrix, fmt_num};

/// Minimum determinant magnitude for a drawn 2x2 system. Keeps systems
/// solvable and well-conditioned.
const MIN_DET: f64 = 2.0;

/// A drawn 2x2 system with its lattice solution.
struct System {
  a: [[f64; 2]; 2],
  rhs: [f64; 2],
  solution: (i64, i64),
}

fn draw_system(rng: &mut Rng, difficulty: Difficulty) -> System {
  let range = component_range(difficulty).min(6);
  let a = retry_draw(
    rng,
    |rng| {
      let a = [
        [rng.int(-range, range) as f64, rng.int(-range, range) as f64],
        [rng.int(-range, range) as f64, rng.int(-range, range) as f64],
      ];
      if det2(a).abs() >= MIN_DET { Some(a) } else { None }
    },
    || [[2.0, 1.0], [1.0, 2.0]],
  );
  let x = rng.int(-5, 5);
  let y = rng.int(-5, 5);
  let rhs = [
    a[0][0] * x as f64 + a[0][1] * y as f64,
    a[1][0] * x as f64 + a[1][1] * y as f64,
  ];
  System { a, rhs, solution: (x, y) }
}

fn equation_line(coef: [f64; 2], rhs: f64) -> String {
  let x_part = match coef[0] {
    c if c == 1.0 => "x".to_string(),
    c if c == -1.0 => "-x".to_string(),
    c => format!("{}x", fmt_num(c)),
  };
  let y_part = match coef[1] {
    c if c == 1.0 => "+ y".to_string(),
    c if c == -1.0 => "- y".to_string(),
    c if c < 0.0 => format!("- {}y", fmt_num(-c)),
    c => format!("+ {}y", fmt_num(c)),
  };
  format!("{} {} = {}", x_part, y_part, fmt_num(rhs))
}

fn system_prompt(sys: &System) -> String {
  format!(
    "Consider the system:\n{}\n{}",
    equation_line(sys.a[0], sys.rhs[0]),
    equation_line(sys.a[1], sys.rhs[1])
  )
}

// ---- linear_systems ----

pub fn generate_systems(rng: &mut Rng, difficulty: Difficulty, id: String, opts: &GenOpts) -> GenOut {
  let weights: &[(&'static str, f64)] = match difficulty {
    Difficulty::Easy => &[("solve_x", 2.5), ("solve_y", 2.5), ("solve_point", 2.0)],
    Difficulty::Medium => &[("solve_x", 2.0), ("solve_y", 2.0), ("solve_point", 3.0)],
    Difficulty::Hard => &[("solve_x", 2.0), ("solve_y", 2.0), ("solve_point", 3.5)],
  };
  let sys = draw_system(rng, difficulty);
  match pick_archetype(rng, weights, opts.avoid_archetype.as_deref()) {
    "solve_x" => solve_component(rng, difficulty, id, sys, true),
    "solve_y" => solve_component(rng, difficulty, id, sys, false),
    _ => solve_point(difficulty, id, sys),
  }
}

fn solve_component(_rng: &mut Rng, difficulty: Difficulty, id: String, sys: System, want_x: bool) -> GenOut {
  let (var, value) = if want_x { ("x", sys.solution.0) } else { ("y", sys.solution.1) };
  let prompt = format!("{}\nSolve for {var}.", system_prompt(&sys));
  GenOut {
    exercise: build_exercise(id, difficulty, "Linear Systems", prompt, ExerciseBody::Numeric {}),
    expected: Expected::Numeric {
      value: value as f64,
      tolerance: tolerance_for(difficulty, ExerciseKind::Numeric),
    },
    archetype: if want_x { "solve_x" } else { "solve_y" },
  }
}

fn solve_point(difficulty: Difficulty, id: String, sys: System) -> GenOut {
  let extent = grid_extent(difficulty).max(6);
  let target = Vec2::new(sys.solution.0 as f64, sys.solution.1 as f64);
  let prompt = format!("{}\nDrag the point (x, y) that solves both equations.", system_prompt(&sys));
  GenOut {
    exercise: build_exercise(
      id,
      difficulty,
      "Linear Systems",
      prompt,
      ExerciseBody::VectorDragTarget { start: Vec2::new(0.0, 0.0), locked: None, grid_extent: extent },
    ),
    expected: Expected::VectorDragTarget {
      target,
      tolerance: tolerance_for(difficulty, ExerciseKind::VectorDragTarget),
      locked: false,
    },
    archetype: "solve_point",
  }
}

// ---- augmented_matrices ----

pub fn generate_augmented(rng: &mut Rng, difficulty: Difficulty, id: String, opts: &GenOpts) -> GenOut {
  let weights: &[(&'static str, f64)] = match difficulty {
    Difficulty::Easy => &[("build_augmented", 3.0), ("read_row", 2.0)],
    Difficulty::Medium => &[("build_augmented", 2.5), ("read_row", 2.5)],
    Difficulty::Hard => &[("build_augmented", 2.0), ("read_row", 3.0)],
  };
  let sys = draw_system(rng, difficulty);
  match pick_archetype(rng, weights, opts.avoid_archetype.as_deref()) {
    "build_augmented" => build_augmented(difficulty, id, sys),
    _ => read_row(rng, difficulty, id, sys),
  }
}

fn augmented_of(sys: &System) -> Vec<Vec<f64>> {
  vec![
    vec![sys.a[0][0], sys.a[0][1], sys.rhs[0]],
    vec![sys.a[1][0], sys.a[1][1], sys.rhs[1]],
  ]
}

fn build_augmented(difficulty: Difficulty, id: String, sys: System) -> GenOut {
  let target = augmented_of(&sys);
  let prompt = format!("{}\nEnter the augmented matrix [A | b] of the system.", system_prompt(&sys));
  GenOut {
    exercise: build_exercise(
      id,
      difficulty,
      "Augmented Matrices",
      prompt,
      ExerciseBody::MatrixInput { rows: 2, cols: 3 },
    ),
    expected: Expected::MatrixInput {
      target,
      tolerance: tolerance_for(difficulty, ExerciseKind::MatrixInput),
    },
    archetype: "build_augmented",
  }
}

fn read_row(rng: &mut Rng, difficulty: Difficulty, id: String, sys: System) -> GenOut {
  let row = rng.int(0, 1) as usize;
  let correct = equation_line(sys.a[row], sys.rhs[row]);
  let other = 1 - row;
  let distractors = vec![
    equation_line(sys.a[other], sys.rhs[other]),
    // Swapped coefficients: the classic transcription error.
    equation_line([sys.a[row][1], sys.a[row][0]], sys.rhs[row]),
    equation_line(sys.a[row], -sys.rhs[row]),
  ];
  let (options, correct_id) = single_choice_options(rng, correct, distractors);

  let prompt = format!(
    "The augmented matrix of a system is {}. Which equation does row {} represent?",
    fmt_matrix(&augmented_of(&sys)),
    row + 1
  );
  GenOut {
    exercise: build_exercise(id, difficulty, "Augmented Matrices", prompt, ExerciseBody::SingleChoice { options }),
    expected: Expected::SingleChoice { option_id: correct_id },
    archetype: "read_row",
  }
}

// ---- rref ----

pub fn generate_rref(rng: &mut Rng, difficulty: Difficulty, id: String, opts: &GenOpts) -> GenOut {
  let weights: &[(&'static str, f64)] = match difficulty {
    Difficulty::Easy => &[("is_rref", 3.0), ("pivot_count", 2.0), ("rref_solve", 1.5)],
    Difficulty::Medium => &[("is_rref", 2.0), ("pivot_count", 2.0), ("rref_solve", 3.0)],
    Difficulty::Hard => &[("is_rref", 1.5), ("pivot_count", 2.0), ("rref_solve", 3.5)],
  };
  match pick_archetype(rng, weights, opts.avoid_archetype.as_deref()) {
    "is_rref" => is_rref(rng, difficulty, id),
    "pivot_count" => pivot_count(rng, difficulty, id),
    _ => rref_solve(rng, difficulty, id),
  }
}

fn rref_solve(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let sys = draw_system(rng, difficulty);
  let target = vec![
    vec![1.0, 0.0, sys.solution.0 as f64],
    vec![0.0, 1.0, sys.solution.1 as f64],
  ];
  let prompt = format!(
    "Row-reduce the augmented matrix {} to reduced row echelon form and enter the result.",
    fmt_matrix(&augmented_of(&sys))
  );
  GenOut {
    exercise: build_exercise(id, difficulty, "Row Reduction", prompt, ExerciseBody::MatrixInput { rows: 2, cols: 3 }),
    expected: Expected::MatrixInput {
      target,
      tolerance: tolerance_for(difficulty, ExerciseKind::MatrixInput),
    },
    archetype: "rref_solve",
  }
}

fn pivot_count(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  // Deliberately pick the rank, then build a matrix in echelon form with
  // exactly that many pivots.
  let rank = rng.int(1, 2);
  let c = rng.int(2, 5) as f64;
  let m = if rank == 2 {
    vec![vec![1.0, 0.0, c], vec![0.0, 1.0, -c]]
  } else {
    vec![vec![1.0, c, 2.0 * c], vec![0.0, 0.0, 0.0]]
  };
  let prompt = format!("How many pivot positions does the matrix {} have?", fmt_matrix(&m));
  GenOut {
    exercise: build_exercise(id, difficulty, "Row Reduction", prompt, ExerciseBody::Numeric {}),
    expected: Expected::Numeric {
      value: rank as f64,
      tolerance: tolerance_for(difficulty, ExerciseKind::Numeric),
    },
    archetype: "pivot_count",
  }
}

fn is_rref(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  let c = rng.int(2, 6) as f64;
  // Half the time show a genuine RREF; otherwise break exactly one rule.
  let (m, correct) = if rng.float() < 0.5 {
    (vec![vec![1.0, 0.0, c], vec![0.0, 1.0, c - 1.0]], "yes")
  } else {
    let broken = match rng.int(0, 2) {
      0 => vec![vec![1.0, 0.0, c], vec![0.0, c, 1.0]], // pivot not 1
      1 => vec![vec![1.0, c, 0.0], vec![0.0, 1.0, c]], // nonzero above pivot
      _ => vec![vec![0.0, 1.0, c], vec![1.0, 0.0, c]], // pivot order violated
    };
    (broken, "no")
  };
  let other = if correct == "yes" { "no" } else { "yes" };
  let (options, correct_id) = single_choice_options(rng, correct.to_string(), vec![other.to_string()]);

  let prompt = format!("Is the matrix {} in reduced row echelon form?", fmt_matrix(&m));
  GenOut {
    exercise: build_exercise(id, difficulty, "Row Reduction", prompt, ExerciseBody::SingleChoice { options }),
    expected: Expected::SingleChoice { option_id: correct_id },
    archetype: "is_rref",
  }
}

// ---- solution_classification ----

pub fn generate_classification(rng: &mut Rng, difficulty: Difficulty, id: String, opts: &GenOpts) -> GenOut {
  let _ = opts;
  let range = component_range(difficulty).min(6);
  let kind = rng.weighted(&[("unique", 2.0), ("none", 1.5), ("infinite", 1.5)]);

  let (m, rhs) = match kind {
    "unique" => {
      let sys = draw_system(rng, difficulty);
      (sys.a, sys.rhs)
    }
    _ => {
      // Dependent rows: row2 = k * row1; the RHS decides between
      // "no solutions" and "infinitely many".
      let row = retry_draw(
        rng,
        |rng| {
          let r = [rng.int(-range, range) as f64, rng.int(-range, range) as f64];
          if r[0] != 0.0 || r[1] != 0.0 { Some(r) } else { None }
        },
        || [1.0, 2.0],
      );
      let k = rng.int(2, 3) as f64;
      let b1 = rng.int(-5, 5) as f64;
      let b2 = if kind == "infinite" { k * b1 } else { k * b1 + rng.int(1, 3) as f64 };
      ([row, [k * row[0], k * row[1]]], [b1, b2])
    }
  };

  let correct = match kind {
    "unique" => "exactly one solution",
    "none" => "no solutions",
    _ => "infinitely many solutions",
  };
  let distractors: Vec<String> = ["exactly one solution", "no solutions", "infinitely many solutions"]
    .iter()
    .filter(|l| **l != correct)
    .map(|l| l.to_string())
    .collect();
  let (options, correct_id) = single_choice_options(rng, correct.to_string(), distractors);

  let sys = System { a: m, rhs, solution: (0, 0) };
  let prompt = format!("{}\nHow many solutions does the system have?", system_prompt(&sys));
  GenOut {
    exercise: build_exercise(id, difficulty, "Classifying Solutions", prompt, ExerciseBody::SingleChoice { options }),
    expected: Expected::SingleChoice { option_id: correct_id },
    archetype: "classify_solutions",
  }
}

// ---- parametric_form ----

pub fn generate_parametric(rng: &mut Rng, difficulty: Difficulty, id: String, opts: &GenOpts) -> GenOut {
  let weights: &[(&'static str, f64)] = match difficulty {
    Difficulty::Easy => &[("parametric_line", 2.5), ("free_vars", 2.0)],
    Difficulty::Medium => &[("parametric_line", 2.5), ("free_vars", 2.5)],
    Difficulty::Hard => &[("parametric_line", 3.0), ("free_vars", 2.5)],
  };
  match pick_archetype(rng, weights, opts.avoid_archetype.as_deref()) {
    "free_vars" => free_vars(rng, difficulty, id),
    _ => parametric_line(rng, difficulty, id),
  }
}

fn parametric_line(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  // One equation ax + y = c, y-coefficient fixed at 1 so the parametric
  // description stays on integer coefficients: (x, y) = (t, c - a t).
  let a = retry_draw(
    rng,
    |rng| {
      let a = rng.int(-4, 4);
      if a != 0 { Some(a) } else { None }
    },
    || 2,
  );
  let c = rng.int(-6, 6);

  let correct = format!("(x, y) = (t, {} - {}t)", fmt_num(c as f64), fmt_num(a as f64));
  let distractors = vec![
    format!("(x, y) = (t, {} + {}t)", fmt_num(c as f64), fmt_num(a as f64)),
    format!("(x, y) = ({} - {}t, t)", fmt_num(c as f64), fmt_num(a as f64)),
    format!("(x, y) = (t, {} - {}t)", fmt_num(a as f64), fmt_num(c as f64)),
  ];
  let (options, correct_id) = single_choice_options(rng, correct, distractors);

  let prompt = format!(
    "Which parametric description gives all solutions of {}x + y = {} (t free)?",
    fmt_num(a as f64),
    fmt_num(c as f64)
  );
  GenOut {
    exercise: build_exercise(id, difficulty, "Parametric Form", prompt, ExerciseBody::SingleChoice { options }),
    expected: Expected::SingleChoice { option_id: correct_id },
    archetype: "parametric_line",
  }
}

fn free_vars(rng: &mut Rng, difficulty: Difficulty, id: String) -> GenOut {
  // Echelon matrix over 3 unknowns with a chosen rank; free variables are
  // the unknowns minus the pivots.
  let rank = rng.int(1, 2);
  let c = rng.int(2, 4) as f64;
  let m = if rank == 2 {
    vec![vec![1.0, 0.0, c, 1.0], vec![0.0, 1.0, -c, 2.0]]
  } else {
    vec![vec![1.0, c, 2.0 * c, 3.0], vec![0.0, 0.0, 0.0, 0.0]]
  };
  let value = 3.0 - rank as f64;

  let prompt = format!(
    "The augmented matrix {} (three unknowns) is in echelon form. How many free variables does the system have?",
    fmt_matrix(&m)
  );
  GenOut {
    exercise: build_exercise(id, difficulty, "Parametric Form", prompt, ExerciseBody::Numeric {}),
    expected: Expected::Numeric {
      value,
      tolerance: tolerance_for(difficulty, ExerciseKind::Numeric),
    },
    archetype: "free_vars",
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn drawn_systems_are_well_conditioned_lattice_systems() {
    let mut rng = Rng::from_seed(55);
    for _ in 0..100 {
      let sys = draw_system(&mut rng, Difficulty::Medium);
      assert!(det2(sys.a).abs() >= MIN_DET);
      // RHS is consistent with the recorded solution by construction.
      let (x, y) = (sys.solution.0 as f64, sys.solution.1 as f64);
      assert_eq!(sys.a[0][0] * x + sys.a[0][1] * y, sys.rhs[0]);
      assert_eq!(sys.a[1][0] * x + sys.a[1][1] * y, sys.rhs[1]);
    }
  }

  #[test]
  fn rref_solution_matches_the_system() {
    let mut rng = Rng::from_seed(59);
    for _ in 0..50 {
      let out = rref_solve(&mut rng, Difficulty::Hard, "rref-test".into());
      match &out.expected {
        Expected::MatrixInput { target, .. } => {
          assert_eq!(target.len(), 2);
          assert_eq!(target[0][0], 1.0);
          assert_eq!(target[0][1], 0.0);
          assert_eq!(target[1][0], 0.0);
          assert_eq!(target[1][1], 1.0);
        }
        other => panic!("wrong expected: {other:?}"),
      }
    }
  }

  #[test]
  fn classification_covers_all_three_cases() {
    let mut rng = Rng::from_seed(61);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..200 {
      let out = generate_classification(&mut rng, Difficulty::Medium, "cls-test".into(), &GenOpts::default());
      if let (ExerciseBody::SingleChoice { options }, Expected::SingleChoice { option_id }) =
        (&out.exercise.body, &out.expected)
      {
        let label = &options.iter().find(|o| &o.id == option_id).unwrap().label;
        seen.insert(label.clone());
      }
    }
    assert!(seen.contains("exactly one solution"));
    assert!(seen.contains("no solutions"));
    assert!(seen.contains("infinitely many solutions"));
  }

  #[test]
  fn free_variable_count_is_rank_complement() {
    let mut rng = Rng::from_seed(67);
    for _ in 0..50 {
      let out = free_vars(&mut rng, Difficulty::Easy, "param-test".into());
      match out.expected {
        Expected::Numeric { value, .. } => assert!(value == 1.0 || value == 2.0),
        other => panic!("wrong expected: {other:?}"),
      }
    }
  }
}
