use super::{cell, fail, finish, HandlerInput, Outcome};
use crate::dataset::cell_text;
use crate::dataset::schema::MSP_CROP_COLUMN;
use crate::query::answer::{join_names, Answer, FailureKind, SourceMeta};
use crate::query::similarity::close_matches;
use crate::source::DatasetKind;

/// MSP rows for the crops the question names, tolerating misspellings
pub fn answer(input: &HandlerInput<'_>) -> Answer {
    finish(lookup(input))
}

fn lookup(input: &HandlerInput<'_>) -> Result<Answer, Outcome> {
    let dataset = input.dataset;
    let Some(crop_index) = MSP_CROP_COLUMN.resolve(dataset.columns()) else {
        return fail(
            FailureKind::SchemaDrift,
            "Could not detect a crop or commodity column in the MSP dataset.",
        );
    };

    let mut crop_names = Vec::with_capacity(dataset.len());
    for row in dataset.rows() {
        crop_names.push(lowercase_text(cell(row, crop_index)?));
    }

    let mut candidates: Vec<&str> = Vec::new();
    for name in &crop_names {
        if !name.is_empty() && !candidates.contains(&name.as_str()) {
            candidates.push(name);
        }
    }

    // one best candidate per word; repeated words repeat the match
    let question = input.question.to_lowercase();
    let matches: Vec<&str> = question
        .split_whitespace()
        .filter_map(|word| {
            close_matches(word, &candidates, 1, input.options.msp_match_cutoff)
                .into_iter()
                .next()
        })
        .collect();

    if matches.is_empty() {
        return fail(
            FailureKind::InputValidation,
            "Please specify a valid crop name to get MSP data (e.g., Wheat, Paddy, Cotton).",
        );
    }

    let matching = dataset.filter_rows(|row| {
        row.get(crop_index)
            .map(|value| {
                let name = lowercase_text(value);
                matches.iter().any(|m| *m == name)
            })
            .unwrap_or(false)
    });

    let match_names = join_names(&matches);
    if matching.is_empty() {
        return fail(
            FailureKind::NoData,
            format!("No MSP data found for {}", match_names),
        );
    }

    Ok(Answer::success(
        format!("MSP Data for {}:", match_names),
        matching.head(input.options.msp_max_rows),
        SourceMeta::new(DatasetKind::Msp, input.source_url, matching.len()),
    ))
}

fn lowercase_text(value: &serde_json::Value) -> String {
    cell_text(value).map(|s| s.to_lowercase()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QueryConfig;
    use crate::dataset::Dataset;
    use serde_json::{json, Value};

    fn msp_table() -> Dataset {
        Dataset::new(
            vec!["year".to_string(), "crop_name".to_string(), "msp".to_string()],
            vec![
                vec![json!("2023-24"), json!("Wheat"), json!(2125)],
                vec![json!("2024-25"), json!("Wheat"), json!(2275)],
                vec![json!("2024-25"), json!("Paddy"), json!(2183)],
                vec![json!("2024-25"), json!("Cotton"), json!(6620)],
                vec![json!("2024-25"), json!(null), json!(0)],
            ],
        )
    }

    fn ask_with(question: &str, dataset: &Dataset, options: &QueryConfig) -> Answer {
        answer(&HandlerInput {
            question,
            dataset,
            source_url: "https://api.data.gov.in/resource/msp",
            options,
        })
    }

    fn ask(question: &str, dataset: &Dataset) -> Answer {
        ask_with(question, dataset, &QueryConfig::default())
    }

    #[test]
    fn test_misspelled_crop_matches() {
        let answer = ask("show price for whaet", &msp_table());

        assert!(answer.success);
        assert_eq!(answer.message, "MSP Data for wheat:");

        let table = answer.table.unwrap();
        assert_eq!(table.columns(), &["year", "crop_name", "msp"]);
        assert_eq!(table.len(), 2);
        assert!(table.rows().iter().all(|row| row[1] == json!("Wheat")));

        let meta = answer.meta.unwrap();
        assert_eq!(meta.rows_used, 2);
        assert_eq!(meta.source, "Department of Agriculture & Farmers Welfare");
    }

    #[test]
    fn test_repeated_words_are_not_deduplicated() {
        let answer = ask("wheat and wheat msp", &msp_table());

        assert_eq!(answer.message, "MSP Data for wheat, wheat:");
        assert_eq!(answer.table.unwrap().len(), 2);
    }

    #[test]
    fn test_multiple_crops() {
        let answer = ask("msp of paddy and cotton", &msp_table());

        assert_eq!(answer.message, "MSP Data for paddy, cotton:");
        assert_eq!(answer.meta.unwrap().rows_used, 2);
    }

    #[test]
    fn test_no_crop_recognized() {
        let answer = ask("msp for this season", &msp_table());

        assert_eq!(
            answer.message,
            "Please specify a valid crop name to get MSP data (e.g., Wheat, Paddy, Cotton)."
        );
        assert_eq!(answer.failure, Some(FailureKind::InputValidation));
    }

    #[test]
    fn test_table_limited_but_rows_used_counts_all() {
        let rows: Vec<Vec<Value>> = (0..12)
            .map(|i| vec![json!(format!("{}", 2000 + i)), json!("Wheat"), json!(1000 + i)])
            .collect();
        let dataset = Dataset::new(
            vec!["year".to_string(), "commodity".to_string(), "msp".to_string()],
            rows,
        );
        let answer = ask("msp wheat", &dataset);

        assert_eq!(answer.table.unwrap().len(), 10);
        assert_eq!(answer.meta.unwrap().rows_used, 12);
    }

    #[test]
    fn test_cutoff_from_options() {
        let strict = QueryConfig {
            msp_match_cutoff: 0.9,
            ..QueryConfig::default()
        };
        let answer = ask_with("msp for whaet", &msp_table(), &strict);
        assert_eq!(answer.failure, Some(FailureKind::InputValidation));
    }

    #[test]
    fn test_missing_crop_column() {
        let dataset = Dataset::new(
            vec!["year".to_string(), "msp".to_string()],
            vec![vec![json!("2024"), json!(2275)]],
        );
        let answer = ask("msp for wheat", &dataset);

        assert_eq!(
            answer.message,
            "Could not detect a crop or commodity column in the MSP dataset."
        );
        assert_eq!(answer.failure, Some(FailureKind::SchemaDrift));
    }
}
