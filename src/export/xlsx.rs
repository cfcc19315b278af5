use rust_xlsxwriter::{Format, Workbook};

use super::{Cell, Section};
use crate::error::AppError;

/// Excel caps sheet names at 31 characters.
const MAX_SHEET_NAME: usize = 31;

/// One worksheet per section, bold header row, numbers as numeric cells.
pub fn to_xlsx(sections: &[Section]) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();

    let header_fmt = Format::new().set_bold();
    let number_fmt = Format::new().set_num_format("0.00");

    for section in sections {
        let name: String = section.title.chars().take(MAX_SHEET_NAME).collect();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(&name)?;

        for (col, header) in section.headers.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_fmt)?;
            worksheet.set_column_width(col as u16, 16)?;
        }

        for (i, row) in section.rows.iter().enumerate() {
            let r = (i + 1) as u32;
            for (col, cell) in row.iter().enumerate() {
                let c = col as u16;
                match cell {
                    Cell::Text(s) => {
                        worksheet.write_string(r, c, s)?;
                    }
                    Cell::Number(n) => {
                        worksheet.write_number_with_format(r, c, *n, &number_fmt)?;
                    }
                    Cell::Integer(n) => {
                        worksheet.write_number(r, c, *n as f64)?;
                    }
                    Cell::Date(_) => {
                        worksheet.write_string(r, c, cell.render())?;
                    }
                    Cell::Empty => {}
                }
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}
