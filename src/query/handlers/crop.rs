use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde_json::Value;

use super::{cell, fail, finish, HandlerInput, Outcome};
use crate::dataset::schema::{CROP_COMMODITY_COLUMN, CROP_STATE_COLUMN};
use crate::dataset::{mean, normalized_text, number_cell, to_numeric, Dataset};
use crate::query::answer::{join_names, Answer, FailureKind, SourceMeta};
use crate::query::entities::{extract_crops, extract_states};
use crate::source::DatasetKind;

pub const PRICE_COLUMNS: [&str; 3] = ["min_price", "max_price", "modal_price"];

const MODAL: usize = 2;

/// Average market prices per (state, commodity) for the states named in the question
pub fn answer(input: &HandlerInput<'_>) -> Answer {
    finish(summarize(input))
}

struct PriceRow {
    state: String,
    commodity: String,
    prices: [Option<f64>; 3],
}

fn summarize(input: &HandlerInput<'_>) -> Result<Answer, Outcome> {
    let states = extract_states(input.question);
    let crops = extract_crops(input.question);

    if states.is_empty() {
        return fail(
            FailureKind::InputValidation,
            "Please specify a state to check crop market data.",
        );
    }

    let dataset = input.dataset;
    let (Some(state_index), Some(commodity_index)) = (
        CROP_STATE_COLUMN.resolve(dataset.columns()),
        CROP_COMMODITY_COLUMN.resolve(dataset.columns()),
    ) else {
        return fail(
            FailureKind::SchemaDrift,
            "Required columns (state or commodity) not found in dataset.",
        );
    };

    let state_names = join_names(&states);
    let wanted_states: Vec<String> = states.iter().map(|s| s.to_lowercase()).collect();

    let mut matched = Vec::new();
    for row in dataset.rows() {
        let state = normalized_text(cell(row, state_index)?);
        if wanted_states.contains(&state) {
            let commodity = normalized_text(cell(row, commodity_index)?);
            matched.push((state, commodity, row));
        }
    }

    if matched.is_empty() {
        return fail(FailureKind::NoData, format!("No data found for {}", state_names));
    }

    if let Some(crops) = &crops {
        matched.retain(|(_, commodity, _)| crops.iter().any(|crop| *crop == commodity.as_str()));
        if matched.is_empty() {
            return fail(
                FailureKind::NoData,
                format!("No data found for crop {} in {}.", join_names(crops), state_names),
            );
        }
    }

    let price_indexes = PRICE_COLUMNS.map(|name| dataset.column_index(name));
    if price_indexes.iter().all(Option::is_none) {
        return fail(
            FailureKind::SchemaDrift,
            "Required price columns (min_price, max_price, modal_price) not found in dataset.",
        );
    }

    let mut priced = Vec::with_capacity(matched.len());
    for (state, commodity, row) in matched {
        let mut prices = [None; 3];
        for (price, index) in prices.iter_mut().zip(price_indexes) {
            if let Some(index) = index {
                *price = to_numeric(cell(row, index)?);
            }
        }

        if prices.iter().any(Option::is_some) {
            priced.push(PriceRow {
                state,
                commodity,
                prices,
            });
        }
    }

    let rows_used = priced.len();
    let table = average_by_group(priced);

    Ok(Answer::success(
        format!("Average Market Prices for {}:", state_names),
        table,
        SourceMeta::new(DatasetKind::CropPrice, input.source_url, rows_used),
    ))
}

/// Mean prices per (state, commodity), highest modal price first
fn average_by_group(rows: Vec<PriceRow>) -> Dataset {
    let mut groups: BTreeMap<(String, String), [Vec<Option<f64>>; 3]> = BTreeMap::new();
    for row in rows {
        let samples = groups.entry((row.state, row.commodity)).or_default();
        for (sample, price) in samples.iter_mut().zip(row.prices) {
            sample.push(price);
        }
    }

    let mut summary: Vec<((String, String), [Option<f64>; 3])> = groups
        .into_iter()
        .map(|(key, samples)| (key, samples.map(mean)))
        .collect();

    // missing modal means sort last
    summary.sort_by(|a, b| match (a.1[MODAL], b.1[MODAL]) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let mut columns = vec!["state".to_string(), "commodity".to_string()];
    columns.extend(PRICE_COLUMNS.iter().map(|c| c.to_string()));

    let rows = summary
        .into_iter()
        .map(|((state, commodity), means)| {
            let mut row = vec![Value::String(state), Value::String(commodity)];
            row.extend(means.into_iter().map(number_cell));
            row
        })
        .collect();

    Dataset::new(columns, rows)
}
