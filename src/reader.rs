//! CSV ingestion for sales records.
//!
//! The reader accepts the Spanish and English spellings of every column, compared
//! case-insensitively. Rows that cannot be coerced into a [`SaleRecord`] are skipped, logged, and
//! returned in [`SalesData::skipped`]; a bad row never fails the whole file.

use std::ffi::OsStr;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, warn};
use rust_decimal::Decimal;

use crate::error::InputError;
use crate::model::{SaleRecord, SalesData, SkippedRow};

/// Canonical field together with the header spellings that map onto it.
struct ColumnAliases {
    field: &'static str,
    aliases: &'static [&'static str],
}

const PRODUCT: ColumnAliases = ColumnAliases {
    field: "product",
    aliases: &["producto", "product"],
};

const QUANTITY: ColumnAliases = ColumnAliases {
    field: "quantity",
    aliases: &["cantidad", "quantity"],
};

const PRICE: ColumnAliases = ColumnAliases {
    field: "price",
    aliases: &["precio", "price", "unit_price"],
};

const ACCEPTED_EXTENSION: &str = "csv";

/// Column positions resolved from the header row.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ColumnIndices {
    product: usize,
    quantity: usize,
    price: usize,
}

impl ColumnIndices {
    fn resolve(headers: &StringRecord) -> Result<Self, InputError> {
        if headers.iter().all(|header| normalize_header(header).is_empty()) {
            return Err(InputError::MissingHeader);
        }

        Ok(Self {
            product: find_column(headers, &PRODUCT)?,
            quantity: find_column(headers, &QUANTITY)?,
            price: find_column(headers, &PRICE)?,
        })
    }
}

fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_lowercase()
}

fn find_column(headers: &StringRecord, column: &ColumnAliases) -> Result<usize, InputError> {
    let normalized: Vec<String> = headers.iter().map(normalize_header).collect();
    column
        .aliases
        .iter()
        .find_map(|alias| normalized.iter().position(|header| header == alias))
        .ok_or_else(|| InputError::MissingColumn {
            field: column.field,
            accepted: column.aliases.join(", "),
        })
}

/// Reads the sales file at `path`, enforcing the extension and size limits before parsing.
pub fn read_sales_file(path: &Path, max_file_size: u64) -> Result<SalesData, InputError> {
    let has_csv_extension = path
        .extension()
        .and_then(OsStr::to_str)
        .is_some_and(|extension| extension.eq_ignore_ascii_case(ACCEPTED_EXTENSION));
    if !has_csv_extension {
        return Err(InputError::UnsupportedExtension(path.to_path_buf()));
    }

    let metadata = fs::metadata(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => InputError::Missing(path.to_path_buf()),
        _ => InputError::Unreadable {
            path: path.to_path_buf(),
            source,
        },
    })?;

    if !metadata.is_file() {
        return Err(InputError::Unreadable {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }

    if metadata.len() > max_file_size {
        return Err(InputError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
            limit: max_file_size,
        });
    }

    let bytes = fs::read(path).map_err(|source| InputError::Unreadable {
        path: path.to_path_buf(),
        source,
    })?;

    let data = read_sales(bytes.as_slice())?;
    debug!(
        "Read {} sales records from {} ({} skipped)",
        data.records.len(),
        path.display(),
        data.skipped.len()
    );
    Ok(data)
}

/// Parses sales records from any reader producing comma-separated text with a header row.
pub fn read_sales<R: io::Read>(input: R) -> Result<SalesData, InputError> {
    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(input);

    let columns = ColumnIndices::resolve(reader.headers()?)?;
    let mut data = SalesData::default();

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(err) => {
                if matches!(err.kind(), csv::ErrorKind::Io(_)) {
                    return Err(err.into());
                }
                let line = err.position().map(|position| position.line()).unwrap_or(0);
                skip(&mut data, line, err.to_string());
                continue;
            }
        };

        let line = record.position().map(|position| position.line()).unwrap_or(0);
        match parse_record(&record, columns) {
            Ok(sale) => data.records.push(sale),
            Err(reason) => skip(&mut data, line, reason),
        }
    }

    Ok(data)
}

fn skip(data: &mut SalesData, line: u64, reason: String) {
    warn!("Skipping CSV row {}: {}", line, reason);
    data.skipped.push(SkippedRow { line, reason });
}

fn field<'r>(
    record: &'r StringRecord,
    index: usize,
    column: &ColumnAliases,
) -> Result<&'r str, String> {
    record
        .get(index)
        .ok_or_else(|| format!("missing {} value", column.field))
}

fn parse_record(record: &StringRecord, columns: ColumnIndices) -> Result<SaleRecord, String> {
    let product = field(record, columns.product, &PRODUCT)?;
    if product.is_empty() {
        return Err("empty product name".to_owned());
    }

    let raw_quantity = field(record, columns.quantity, &QUANTITY)?;
    let quantity = raw_quantity
        .parse::<u32>()
        .map_err(|_| format!("invalid quantity {:?}", raw_quantity))?;

    let raw_price = field(record, columns.price, &PRICE)?;
    let unit_price =
        Decimal::from_str(raw_price).map_err(|_| format!("invalid price {:?}", raw_price))?;
    if unit_price.is_sign_negative() && !unit_price.is_zero() {
        return Err(format!("negative price {:?}", raw_price));
    }

    Ok(SaleRecord::new(product, quantity, unit_price))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decimal(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn parses_spanish_headers() {
        let input = "Producto,Cantidad,Precio\nLaptop,5,1200.00\nMouse,10,25.50\n";
        let data = read_sales(input.as_bytes()).expect("valid csv");

        assert!(data.skipped.is_empty());
        assert_eq!(
            data.records,
            vec![
                SaleRecord::new("Laptop", 5, decimal("1200.00")),
                SaleRecord::new("Mouse", 10, decimal("25.50")),
            ]
        );
    }

    #[test]
    fn parses_english_headers_in_any_case_and_order() {
        let input = "PRICE, product ,Quantity\n9.99,Cable,3\n";
        let data = read_sales(input.as_bytes()).expect("valid csv");
        assert_eq!(
            data.records,
            vec![SaleRecord::new("Cable", 3, decimal("9.99"))]
        );
    }

    #[test]
    fn strips_byte_order_mark() {
        let input = "\u{feff}Producto,Cantidad,Precio\nTeclado,2,45\n";
        let data = read_sales(input.as_bytes()).expect("valid csv");
        assert_eq!(data.records.len(), 1);
        assert_eq!(data.records[0].product(), "Teclado");
    }

    #[test]
    fn header_only_yields_no_records() {
        let data = read_sales("Product,Quantity,Price\n".as_bytes()).expect("valid csv");
        assert!(data.records.is_empty());
        assert!(data.skipped.is_empty());
    }

    #[test]
    fn empty_input_has_no_header() {
        let err = read_sales("".as_bytes()).unwrap_err();
        assert!(matches!(err, InputError::MissingHeader));
    }

    #[test]
    fn missing_column_is_reported() {
        let err = read_sales("Product,Quantity\nLaptop,1\n".as_bytes()).unwrap_err();
        match err {
            InputError::MissingColumn { field, accepted } => {
                assert_eq!(field, "price");
                assert!(accepted.contains("precio"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_rows_are_skipped_with_line_numbers() {
        let input = "Product,Quantity,Price\n\
                     Laptop,5,1200.00\n\
                     Broken,five,10.00\n\
                     ,3,1.00\n\
                     Negative,-2,4.00\n\
                     Cheap,1,-0.50\n\
                     Short,4\n\
                     Mouse,10,25.50\n";
        let data = read_sales(input.as_bytes()).expect("valid csv");

        let products: Vec<_> = data.records.iter().map(SaleRecord::product).collect();
        assert_eq!(products, vec!["Laptop", "Mouse"]);

        let lines: Vec<_> = data.skipped.iter().map(|row| row.line).collect();
        assert_eq!(lines, vec![3, 4, 5, 6, 7]);
        assert!(data.skipped[0].reason.contains("quantity"));
        assert!(data.skipped[1].reason.contains("product"));
        assert!(data.skipped[3].reason.contains("price"));
        assert!(data.skipped[4].reason.contains("missing"));
    }

    #[test]
    fn zero_quantity_and_price_are_valid() {
        let data = read_sales("Product,Quantity,Price\nSample,0,0\n".as_bytes()).unwrap();
        assert_eq!(data.records, vec![SaleRecord::new("Sample", 0, Decimal::ZERO)]);
    }

    #[test]
    fn file_checks_run_before_parsing() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("ventas.csv");
        assert!(matches!(
            read_sales_file(&missing, 1024),
            Err(InputError::Missing(_))
        ));

        let wrong_extension = dir.path().join("ventas.txt");
        fs::write(&wrong_extension, "Product,Quantity,Price\n").unwrap();
        assert!(matches!(
            read_sales_file(&wrong_extension, 1024),
            Err(InputError::UnsupportedExtension(_))
        ));

        let large = dir.path().join("large.csv");
        fs::write(&large, "Product,Quantity,Price\nLaptop,5,1200.00\n").unwrap();
        assert!(matches!(
            read_sales_file(&large, 8),
            Err(InputError::TooLarge { limit: 8, .. })
        ));
        assert_eq!(read_sales_file(&large, 1024).unwrap().records.len(), 1);
    }
}
