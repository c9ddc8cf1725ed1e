//! finreport turns an uploaded list of financial transactions into a paginated,
//! tabular PDF report: an identity line, two filtered listing sections (the new
//! incomes and the self-transfers) and the full transaction history as a table
//! with alternating row shading, broken across as many letter-sized pages as
//! the records require.
//!
//! The heart of the crate is the layout engine in the `layout` module, which
//! converts the ordered record sequence into absolute page coordinates and
//! low-level drawing commands. The commands are emitted into the `pdf` module,
//! a thin ordered command sink on top of `lopdf` which assembles them into the
//! final byte sequence. Everything around those two modules is plumbing:
//! ingestion of the CSV input, the classification of the records and the
//! orchestration of the whole pipeline.

/// The transaction record and its derived category.
///
/// A record is a plain immutable value: the calendar date of the movement, the
/// source and destination account identifiers and the exact decimal amount.
/// The category (income or self-transfer) is deliberately not stored on the
/// record: it is a pure function of the two account identifiers, and every
/// place that displays it recomputes it through the same method so that the
/// listings and the table column always agree.
pub mod transaction;

/// The two pure filters splitting the record list for the listing sections.
///
/// `filter_incomes` keeps the records moving money between distinct accounts,
/// `filter_self_transfers` keeps the complementary ones. Both preserve the
/// original relative order and together they partition their input; they have
/// no failure modes and no side effects.
pub mod classifier;

/// The document layout engine, the core of this crate.
///
/// The `render` operation walks the records exactly once and decides where
/// everything lands: the summary text flow with its fixed leading, the history
/// table with its validated column grid, the alternating row shading and the
/// page breaks. All positions are computed against a fixed letter-sized page
/// with fixed margins; the transient state is confined to a page cursor owned
/// by the single render call, which makes concurrent renders trivially safe.
/// The engine only talks to the page stream encoder through drawing commands
/// and never inspects its state.
pub mod layout;

/// The page stream encoder on top of `lopdf`.
///
/// The `PdfDocument` struct accumulates drawing operations (text objects, line
/// strokes, filled rectangles) page by page and assembles them into a complete
/// PDF document on `save_to_bytes`: the catalog, the pages tree, the font
/// resources and one uncompressed content stream per page. Text is written
/// with the builtin Helvetica faces in the WinAnsi encoding, so the documents
/// carry no embedded font programs and stay small and inspectable.
pub mod pdf;

/// CSV ingestion of the uploaded transaction files.
///
/// The expected header is `date,account_from,account_to,amount`. Ingestion is
/// where all the validation lives: empty account identifiers, unparsable dates
/// and unparsable amounts are rejected here, with the offending line in the
/// error, and the rest of the crate only ever handles well-formed records.
pub mod ingest;

/// The report service tying the pipeline together: ingest, classify, render.
pub mod report;

/// This module contains the `ReportError` type which is the error type used
/// throughout this library.
///
/// Every fallible operation returns it inside a `Result`, carrying a
/// human-readable context plus the stringified source error when one was
/// propagated. Rendering deliberately has no partial-recovery path: the first
/// error anywhere in the pipeline aborts the whole render and surfaces to the
/// caller with its chain of contexts intact, and no partial document is
/// returned.
pub mod error;
