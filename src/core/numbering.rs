//! Gapless invoice number sequence.
//!
//! Numbers look like `04138-25`: a five-digit serial, a dash, the
//! two-digit year. The serial increases by one per issued number and
//! resets to 1 when the sequence advances to a new year.

use chrono::{Datelike, NaiveDate};

use super::error::InvoiceError;

/// Issues sequential invoice numbers within a year.
///
/// The sequence itself is plain data; persistence of the counter is up
/// to the caller. Numbers are only handed out by [`next_number`], so a
/// consumed serial is never reused.
///
/// [`next_number`]: InvoiceNumberSequence::next_number
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceNumberSequence {
    year: i32,
    next_serial: u32,
}

impl InvoiceNumberSequence {
    /// Start a fresh sequence for the given year, first serial 1.
    pub fn new(year: i32) -> Self {
        Self {
            year,
            next_serial: 1,
        }
    }

    /// Resume a sequence at a known serial, e.g. after loading the
    /// counter from storage.
    pub fn starting_at(year: i32, next_serial: u32) -> Self {
        Self { year, next_serial }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    /// The number the next [`next_number`](Self::next_number) call will
    /// return, without consuming it.
    pub fn peek(&self) -> String {
        format_number(self.next_serial, self.year)
    }

    /// Issue the next number and advance the serial.
    pub fn next_number(&mut self) -> String {
        let number = format_number(self.next_serial, self.year);
        self.next_serial += 1;
        number
    }

    /// Move the sequence to a later year, resetting the serial to 1.
    /// Going backwards (or staying) is refused; that would reopen a
    /// closed number range.
    pub fn advance_year(&mut self, year: i32) -> Result<(), InvoiceError> {
        if year <= self.year {
            return Err(InvoiceError::Numbering(format!(
                "Jahr {year} liegt nicht nach {}",
                self.year
            )));
        }
        self.year = year;
        self.next_serial = 1;
        Ok(())
    }

    /// Advance to the year of `date` if it is later; no-op otherwise.
    pub fn auto_advance(&mut self, date: NaiveDate) {
        if date.year() > self.year {
            self.year = date.year();
            self.next_serial = 1;
        }
    }
}

fn format_number(serial: u32, year: i32) -> String {
    format!("{serial:05}-{:02}", year.rem_euclid(100))
}
