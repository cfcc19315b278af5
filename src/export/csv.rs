use ::csv::WriterBuilder;

use super::{Cell, Section};
use crate::error::AppError;

/// Writes each section as a header row plus data rows. Sections are separated
/// by one blank line. Fields containing commas, quotes or newlines are quoted.
pub fn to_csv(sections: &[Section]) -> Result<String, AppError> {
    let mut blocks = Vec::with_capacity(sections.len());

    for section in sections {
        let mut wtr = WriterBuilder::new().from_writer(Vec::new());
        wtr.write_record(section.headers)?;
        for row in &section.rows {
            wtr.write_record(row.iter().map(Cell::render))?;
        }

        let bytes = wtr
            .into_inner()
            .map_err(|e| AppError::Export(e.to_string()))?;
        blocks.push(String::from_utf8(bytes).map_err(|e| AppError::Export(e.to_string()))?);
    }

    Ok(blocks.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::{expense, studio};

    fn parse(text: &str) -> Vec<Vec<String>> {
        ::csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes())
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn commas_in_descriptions_stay_in_one_field() {
        let mut entry = expense("2024-02", 3, 7, 12.0);
        entry.description = "foo, bar".into();

        let text = to_csv(&[Section::of(&[entry])]).unwrap();
        assert!(text.contains("\"foo, bar\""));

        let rows = parse(&text);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), rows[1].len());
        assert_eq!(rows[1][3], "foo, bar");
        assert_eq!(rows[1][4], "12.00");
    }

    #[test]
    fn embedded_quotes_and_newlines_are_escaped() {
        let mut row = studio("2024-02", 4, "card", 5.5);
        row.merchant = "Joe's \"Best\" Prints".into();
        row.details = Some("line one\nline two".into());

        let text = to_csv(&[Section::of(&[row])]).unwrap();
        assert!(text.contains("\"Joe's \"\"Best\"\" Prints\""));

        let rows = parse(&text);
        assert_eq!(rows[1][2], "Joe's \"Best\" Prints");
        assert_eq!(rows[1][3], "line one\nline two");
        assert_eq!(rows[1][5], "5.50");
    }

    #[test]
    fn sections_are_separated_by_a_blank_line() {
        let text = to_csv(&[
            Section::of(&[expense("2024-02", 3, 7, 1.0)]),
            Section::of(&[studio("2024-02", 4, "cash", 2.0)]),
        ])
        .unwrap();

        assert_eq!(text.matches("\n\n").count(), 1);
        let rows = parse(&text);
        // header + row per section; the blank line is skipped by readers
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[2][2], "Merchant");
    }

    #[test]
    fn empty_record_set_still_has_headers() {
        let text = to_csv(&[Section::of::<crate::model::expense::ExpenseEntry>(&[])]).unwrap();
        assert_eq!(text, "ID,Employee ID,Date,Description,Amount,Receipt\n");
    }
}
