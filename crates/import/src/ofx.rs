use chrono::NaiveDate;
use fennel_core::Amount;
use thiserror::Error;

use crate::row::{RawTransactionRow, RowField};

#[derive(Debug, Clone)]
pub struct OfxTransaction {
    pub trn_type: String,
    pub date: NaiveDate,
    pub amount: Amount,
    pub name: String,
    pub memo: String,
}

#[derive(Debug, Clone, Default)]
pub struct OfxAccount {
    pub account_id: String,
    pub bank_id: Option<String>,
    pub account_type: Option<String>,
    pub currency: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OfxStatement {
    pub account: OfxAccount,
    pub transactions: Vec<OfxTransaction>,
}

#[derive(Error, Debug)]
pub enum OfxError {
    #[error("Failed to parse OFX: {0}")]
    ParseError(String),
    #[error("Only one account per OFX file is supported (found {0})")]
    MultipleAccounts(usize),
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Invalid date format: {0}")]
    InvalidDate(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

type Converter = fn(&OfxTransaction) -> String;

/// Converters applied to every transaction when it becomes a raw row.
const ROW_CONVERTERS: [(RowField, Converter); 5] = [
    (RowField::Type, convert_type),
    (RowField::Amount, convert_amount),
    (RowField::Date, convert_date),
    (RowField::Name, convert_name),
    (RowField::Memo, convert_memo),
];

fn convert_type(t: &OfxTransaction) -> String {
    t.trn_type.clone()
}

fn convert_amount(t: &OfxTransaction) -> String {
    t.amount.to_plain_string()
}

fn convert_date(t: &OfxTransaction) -> String {
    t.date.format("%Y/%m/%d").to_string()
}

fn convert_name(t: &OfxTransaction) -> String {
    t.name.clone()
}

fn convert_memo(t: &OfxTransaction) -> String {
    t.memo.clone()
}

impl OfxTransaction {
    pub fn to_row(&self) -> RawTransactionRow {
        ROW_CONVERTERS
            .iter()
            .fold(RawTransactionRow::new(), |row, (field, convert)| {
                row.with(*field, convert(self))
            })
    }
}

impl OfxStatement {
    pub fn rows(&self) -> Vec<RawTransactionRow> {
        self.transactions.iter().map(OfxTransaction::to_row).collect()
    }
}

pub struct OfxParser;

impl OfxParser {
    /// Parses every bank and credit-card statement in the document.
    /// Handles both SGML (OFX 1.x) and XML (OFX 2.x) bodies.
    pub fn parse(data: &str) -> Result<Vec<OfxStatement>, OfxError> {
        let mut saw_root = false;
        let mut statements: Vec<OfxStatement> = Vec::new();
        let mut current_trx: Option<BuildingTrx> = None;

        for element in elements(data) {
            match element.tag.as_str() {
                "OFX" => saw_root = true,
                "STMTRS" | "CCSTMTRS" => statements.push(OfxStatement {
                    account: OfxAccount::default(),
                    transactions: Vec::new(),
                }),
                "STMTTRN" => {
                    if current_trx.is_some() {
                        return Err(OfxError::ParseError(
                            "<STMTTRN> opened before the previous one was closed".to_string(),
                        ));
                    }
                    current_trx = Some(BuildingTrx::default());
                }
                "/STMTTRN" => {
                    if let Some(trx) = current_trx.take() {
                        let stmt = statements.last_mut().ok_or_else(|| {
                            OfxError::ParseError("<STMTTRN> outside of a statement".to_string())
                        })?;
                        stmt.transactions.push(trx.finish()?);
                    }
                }
                tag => {
                    let Some(value) = element.value else {
                        continue;
                    };
                    if let Some(ref mut trx) = current_trx {
                        match tag {
                            "TRNTYPE" => trx.trn_type = Some(value),
                            "DTPOSTED" => trx.date = Some(value),
                            "TRNAMT" => trx.amount = Some(value),
                            "NAME" => trx.name = Some(value),
                            "MEMO" => trx.memo = Some(value),
                            _ => {}
                        }
                    } else if let Some(stmt) = statements.last_mut() {
                        match tag {
                            "ACCTID" => stmt.account.account_id = value,
                            "BANKID" => stmt.account.bank_id = Some(value),
                            "ACCTTYPE" => stmt.account.account_type = Some(value),
                            "CURDEF" => stmt.account.currency = Some(value),
                            _ => {}
                        }
                    }
                }
            }
        }

        if !saw_root {
            return Err(OfxError::ParseError("missing <OFX> root element".to_string()));
        }
        if current_trx.is_some() {
            return Err(OfxError::ParseError("unterminated <STMTTRN>".to_string()));
        }

        Ok(statements)
    }
}

#[derive(Default)]
struct BuildingTrx {
    trn_type: Option<String>,
    date: Option<String>,
    amount: Option<String>,
    name: Option<String>,
    memo: Option<String>,
}

impl BuildingTrx {
    fn finish(self) -> Result<OfxTransaction, OfxError> {
        let raw_date = self
            .date
            .ok_or_else(|| OfxError::MissingField("DTPOSTED".to_string()))?;
        let date =
            parse_ofx_date(&raw_date).ok_or_else(|| OfxError::InvalidDate(raw_date.clone()))?;

        let raw_amount = self
            .amount
            .ok_or_else(|| OfxError::MissingField("TRNAMT".to_string()))?;
        let amount = raw_amount
            .parse::<Amount>()
            .map_err(|_| OfxError::InvalidAmount(raw_amount.clone()))?;

        Ok(OfxTransaction {
            trn_type: self.trn_type.unwrap_or_default(),
            date,
            amount,
            name: self.name.unwrap_or_default(),
            memo: self.memo.unwrap_or_default(),
        })
    }
}

struct Element {
    tag: String,
    value: Option<String>,
}

/// Splits the body into `<TAG>value` pairs. Text before the first tag (the
/// SGML header) and processing instructions are skipped.
fn elements(data: &str) -> impl Iterator<Item = Element> + '_ {
    data.split('<').skip(1).filter_map(|chunk| {
        let (tag, rest) = chunk.split_once('>')?;
        let tag = tag.trim();
        if tag.is_empty() || tag.starts_with('?') || tag.starts_with('!') {
            return None;
        }
        let value = rest.trim();
        Some(Element {
            tag: tag.to_ascii_uppercase(),
            value: (!value.is_empty()).then(|| unescape(value)),
        })
    })
}

fn unescape(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn parse_ofx_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.len() >= 8 {
        let y: i32 = s.get(0..4)?.parse().ok()?;
        let m: u32 = s.get(4..6)?.parse().ok()?;
        let d: u32 = s.get(6..8)?.parse().ok()?;

        if let Some(date) = NaiveDate::from_ymd_opt(y, m, d) {
            return Some(date);
        }
    }

    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    None
}

/// Parses the single statement of a document. `Ok(None)` when it has no account.
pub fn parse_statement(data: &[u8]) -> Result<Option<OfxStatement>, OfxError> {
    let content = String::from_utf8_lossy(data);
    let mut statements = OfxParser::parse(&content)?;
    match statements.len() {
        0 | 1 => Ok(statements.pop()),
        n => Err(OfxError::MultipleAccounts(n)),
    }
}

/// Parses a document into raw rows, one per transaction.
pub fn parse(data: &[u8]) -> Result<Vec<RawTransactionRow>, OfxError> {
    Ok(parse_statement(data)?
        .map(|stmt| stmt.rows())
        .unwrap_or_default())
}
