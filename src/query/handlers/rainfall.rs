use std::collections::BTreeMap;

use serde_json::Value;

use super::{cell, fail, finish, HandlerInput, Outcome};
use crate::dataset::schema::{RAINFALL_COLUMN, RAINFALL_STATE_COLUMN};
use crate::dataset::{mean, number_cell, snake_column_name, to_numeric, Dataset};
use crate::query::answer::{join_names, Answer, FailureKind, SourceMeta};
use crate::query::entities::extract_states;
use crate::source::DatasetKind;

/// Mean rainfall per state for the states named in the question
pub fn answer(input: &HandlerInput<'_>) -> Answer {
    finish(compare(input))
}

fn compare(input: &HandlerInput<'_>) -> Result<Answer, Outcome> {
    let states = extract_states(input.question);
    if states.is_empty() {
        return fail(
            FailureKind::InputValidation,
            "Please specify one or more states to compare rainfall.",
        );
    }

    let columns: Vec<String> = input
        .dataset
        .columns()
        .iter()
        .map(|c| snake_column_name(c))
        .collect();

    let Some(rain_index) = RAINFALL_COLUMN.resolve(&columns) else {
        return fail(FailureKind::SchemaDrift, "No rainfall-related column found in dataset.");
    };
    let Some(state_index) = RAINFALL_STATE_COLUMN.resolve(&columns) else {
        return fail(FailureKind::SchemaDrift, "State column missing in dataset.");
    };

    let wanted: Vec<String> = states.iter().map(|s| s.to_lowercase()).collect();

    // grouped by the state cell as written, keys ascending
    let mut groups: BTreeMap<String, Vec<Option<f64>>> = BTreeMap::new();
    let mut rows_used = 0;

    for row in input.dataset.rows() {
        // only text cells can name a state
        let Value::String(state) = cell(row, state_index)? else {
            continue;
        };
        if !wanted.contains(&state.to_lowercase()) {
            continue;
        }

        rows_used += 1;
        groups
            .entry(state.clone())
            .or_default()
            .push(to_numeric(cell(row, rain_index)?));
    }

    let state_names = join_names(&states);
    if rows_used == 0 {
        return fail(
            FailureKind::NoData,
            format!("No rainfall data found for {}", state_names),
        );
    }

    let rows = groups
        .into_iter()
        .map(|(state, samples)| vec![Value::String(state), number_cell(mean(samples))])
        .collect();
    let table = Dataset::new(
        vec![columns[state_index].clone(), columns[rain_index].clone()],
        rows,
    );

    Ok(Answer::success(
        format!("Average Rainfall Comparison for {}:", state_names),
        table,
        SourceMeta::new(DatasetKind::Rainfall, input.source_url, rows_used),
    ))
}
