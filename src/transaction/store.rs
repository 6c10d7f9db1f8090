//! Persists transactions in a flat comma separated file.
//!
//! The first line of the file is [DATA_FILE_HEADER] and each following line
//! is one transaction with its six fields joined by commas. Fields are written
//! as is with no quoting or escaping, so a category or description containing
//! a comma or newline will be split into extra columns when the file is read
//! back. Existing data files rely on this exact format.
//!
//! The store does no locking of its own. Callers that share a store between
//! threads must serialize access, see [crate::AppState].

use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use csv::{ReaderBuilder, StringRecord, Terminator, Writer, WriterBuilder};

use crate::{
    Error,
    extract::{leading_float, leading_int},
    timezone::{LocalTimezone, format_date},
    transaction::core::{Transaction, TransactionBuilder, TransactionId},
};

/// The first line of every data file.
pub const DATA_FILE_HEADER: &str = "id,type,category,amount,description,date";

const ID_COLUMN: usize = 0;
const KIND_COLUMN: usize = 1;
const CATEGORY_COLUMN: usize = 2;
const AMOUNT_COLUMN: usize = 3;
const DESCRIPTION_COLUMN: usize = 4;
const DATE_COLUMN: usize = 5;

/// Owns the data file and assigns transaction IDs.
#[derive(Debug, Clone)]
pub struct TransactionStore {
    path: PathBuf,
    local_timezone: LocalTimezone,
}

impl TransactionStore {
    /// Create a store backed by the file at `path`.
    ///
    /// This does not touch the file system, call
    /// [TransactionStore::ensure_initialized] before use.
    pub fn new(path: impl Into<PathBuf>, local_timezone: LocalTimezone) -> Self {
        Self {
            path: path.into(),
            local_timezone,
        }
    }

    /// The path of the data file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the data file with only the header line if it does not exist.
    ///
    /// An existing file is left untouched, whatever it contains. Returns
    /// whether the file was created.
    ///
    /// # Errors
    /// Returns [Error::Io] if the file cannot be created.
    pub fn ensure_initialized(&self) -> Result<bool, Error> {
        let file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&self.path);

        let mut file = match file {
            Ok(file) => file,
            Err(error) if error.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(error) => return Err(error.into()),
        };

        file.write_all(DATA_FILE_HEADER.as_bytes())?;
        file.write_all(b"\n")?;
        tracing::info!("Created data file: {}", self.path.display());

        Ok(true)
    }

    /// Read every transaction, newest date first.
    ///
    /// Dates are compared as plain strings, so only `YYYY-MM-DD` dates sort
    /// chronologically. Transactions with equal dates keep their file order.
    /// A missing data file reads as an empty list.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidRecord] if any row has an `id` or `amount` that is not a number,
    /// - or [Error::Io] if the file cannot be read.
    pub fn list_all(&self) -> Result<Vec<Transaction>, Error> {
        let mut reader = match ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .quoting(false)
            .from_path(&self.path)
        {
            Ok(reader) => reader,
            Err(error) if is_not_found(&error) => {
                tracing::warn!("Data file {} does not exist", self.path.display());
                return Ok(Vec::new());
            }
            Err(error) => return Err(error.into()),
        };

        let mut transactions = Vec::new();

        for record in reader.records() {
            transactions.push(parse_record(&record?)?);
        }

        transactions.sort_by(|a, b| b.date.cmp(&a.date));

        Ok(transactions)
    }

    /// Store `draft` as a new transaction with the next free ID.
    ///
    /// The ID is one more than the largest ID in the file, or 1 if there are
    /// no transactions. The ID freed by deleting the transaction with the
    /// largest ID is therefore handed out again.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidRecord] if the existing rows cannot be parsed,
    /// - [Error::InvalidId] if the next ID would not fit in 32 bits,
    /// - or [Error::Io] if the file cannot be opened for appending.
    pub fn append(&self, draft: TransactionBuilder) -> Result<Transaction, Error> {
        let next_id = next_id(&self.list_all()?);
        if i32::try_from(next_id).is_err() {
            return Err(Error::InvalidId(next_id.to_string()));
        }
        let transaction = draft.finalize(next_id);

        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = record_writer(file);
        writer.write_record(to_record(&transaction))?;
        writer.flush()?;

        tracing::debug!("Appended transaction {}", transaction.id);

        Ok(transaction)
    }

    /// Remove the transaction with `id`, returning whether it existed.
    ///
    /// The whole file is rewritten in place with the remaining transactions in
    /// [TransactionStore::list_all] order. If writing fails partway the file is
    /// left truncated.
    ///
    /// # Errors
    /// This function will return a:
    /// - [Error::InvalidRecord] if the existing rows cannot be parsed,
    /// - or [Error::Io] if the file cannot be rewritten.
    pub fn delete_by_id(&self, id: TransactionId) -> Result<bool, Error> {
        let transactions = self.list_all()?;
        let before = transactions.len();

        let mut writer = record_writer(File::create(&self.path)?);
        writer.write_record(DATA_FILE_HEADER.split(','))?;

        let mut remaining = 0;
        for transaction in transactions.iter().filter(|transaction| transaction.id != id) {
            writer.write_record(to_record(transaction))?;
            remaining += 1;
        }
        writer.flush()?;

        let found = remaining < before;
        tracing::debug!("Delete transaction {id}: found={found}, {remaining} remaining");

        Ok(found)
    }

    /// Today's date as `YYYY-MM-DD` in the store's timezone.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if the configured timezone cannot be resolved.
    pub fn current_date_string(&self) -> Result<String, Error> {
        self.local_timezone.today().map(format_date)
    }
}

fn is_not_found(error: &csv::Error) -> bool {
    matches!(error.kind(), csv::ErrorKind::Io(io_error) if io_error.kind() == io::ErrorKind::NotFound)
}

fn next_id(transactions: &[Transaction]) -> TransactionId {
    transactions
        .iter()
        .fold(1, |next, transaction| next.max(transaction.id.saturating_add(1)))
}

fn record_writer<W: Write>(writer: W) -> Writer<W> {
    WriterBuilder::new()
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer)
}

fn to_record(transaction: &Transaction) -> [String; 6] {
    [
        transaction.id.to_string(),
        transaction.kind.clone(),
        transaction.category.clone(),
        transaction.amount.to_string(),
        transaction.description.clone(),
        transaction.date.clone(),
    ]
}

fn parse_record(record: &StringRecord) -> Result<Transaction, Error> {
    let line = record.position().map_or(0, |position| position.line());
    let column = |index| record.get(index).unwrap_or_default();

    let id = leading_int(column(ID_COLUMN)).ok_or_else(|| Error::InvalidRecord {
        line,
        field: "id",
        value: column(ID_COLUMN).to_owned(),
    })?;
    let amount = leading_float(column(AMOUNT_COLUMN)).ok_or_else(|| Error::InvalidRecord {
        line,
        field: "amount",
        value: column(AMOUNT_COLUMN).to_owned(),
    })?;

    Ok(Transaction {
        id,
        kind: column(KIND_COLUMN).to_owned(),
        category: column(CATEGORY_COLUMN).to_owned(),
        amount,
        description: column(DESCRIPTION_COLUMN).to_owned(),
        date: column(DATE_COLUMN).to_owned(),
    })
}
