//! Option extraction and randomization.
//!
//! Everything random goes through a [`Permuter`], so the same seed always
//! produces the same option order, question order and answers.

mod answer_line;
mod choices;
mod engine;
mod permute;
mod relabel;

pub use answer_line::take_answer_line;
pub use choices::{check_choices, extract_choices, take_correct_markers, CHOICES_PER_QUESTION};
pub use engine::{
    canonical_answer, shuffle_exam, shuffle_question, PLACEHOLDER_CHOICE_ANSWER,
    PLACEHOLDER_SHORT_ANSWER,
};
pub use permute::{apply_permutation, variant_seed, FixedPermuter, Permuter, SeededPermuter};
pub use relabel::{relabel_choices, relabel_node};
