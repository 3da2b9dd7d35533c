//! The interactive question loop.
//!
//! ## Contract
//!
//! 1. Extract the document text once. No text → say so and stop without
//!    reading any input.
//! 2. Read one line per question. `q` / `Q` (or end of input) stops the
//!    session cleanly.
//! 3. Every other line becomes exactly one completion call, and its reply
//!    (answer or failure sentinel) is printed after [`ANSWER_LABEL`].
//! 4. A question that fails before reaching the model is reported and the
//!    loop moves on; one bad question never ends the session.
//!
//! Input and output are generic so tests can drive the loop with byte
//! buffers instead of a terminal.

use crate::error::PdfQaError;
use crate::output::{Reply, SessionSummary};
use crate::pipeline::extract::TextProvider;
use crate::pipeline::llm::Completer;
use crate::prompts::build_prompt;
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info};

/// Input that ends the session.
pub const QUIT_SENTINEL: &str = "q";

pub const NO_TEXT_MESSAGE: &str = "No text was extracted from the PDF.";
pub const READY_MESSAGE: &str = "PDF content extracted. Type 'q' to quit.";
pub const QUESTION_PROMPT: &str = "Ask a question: ";
pub const EXIT_MESSAGE: &str = "Exiting...";
pub const ANSWER_LABEL: &str = "Answer: ";

/// Knobs for [`run_session`] that do not belong to the completion client.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Reject prompts longer than this many characters.
    pub max_prompt_chars: Option<usize>,
}

/// Whether a raw input line asks to leave the session.
pub fn is_quit(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case(QUIT_SENTINEL)
}

/// Answer a single question against the document text.
///
/// Returns `Err` only when the prompt cannot be assembled; completion
/// failures come back in-band as [`Reply::Failed`].
pub async fn answer_query(
    completer: &dyn Completer,
    document: &str,
    query: &str,
    options: &SessionOptions,
) -> Result<Reply, PdfQaError> {
    let prompt = build_prompt(document, query, options.max_prompt_chars)?;
    debug!("Prompt assembled: {} chars", prompt.len());
    Ok(completer.complete(&prompt).await)
}

/// Run the REPL until the user quits or input ends.
pub async fn run_session<R, W>(
    provider: &dyn TextProvider,
    completer: &dyn Completer,
    pdf_path: &Path,
    options: &SessionOptions,
    mut input: R,
    output: &mut W,
) -> Result<SessionSummary, PdfQaError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut summary = SessionSummary::default();

    let Some(document) = provider.extract(pdf_path).await else {
        write_line(output, NO_TEXT_MESSAGE).await?;
        return Ok(summary);
    };
    summary.document_loaded = true;
    info!(
        "Document ready: {} chars from {}",
        document.len(),
        pdf_path.display()
    );

    write_line(output, READY_MESSAGE).await?;

    let mut buf = Vec::new();
    loop {
        output.write_all(QUESTION_PROMPT.as_bytes()).await?;
        output.flush().await?;

        let Some(line) = read_question(&mut input, &mut buf).await? else {
            debug!("End of input");
            write_line(output, "").await?;
            write_line(output, EXIT_MESSAGE).await?;
            break;
        };

        if is_quit(&line) {
            write_line(output, EXIT_MESSAGE).await?;
            break;
        }

        summary.queries += 1;
        match answer_query(completer, &document, &line, options).await {
            Ok(reply) => {
                if reply.is_answer() {
                    summary.answered += 1;
                } else {
                    summary.failed += 1;
                }
                write_line(output, &format!("{ANSWER_LABEL}{reply}")).await?;
            }
            Err(e) => {
                error!("Question failed: {}", e);
                summary.errors += 1;
                write_line(output, &format!("An error occurred: {e}")).await?;
            }
        }
    }

    Ok(summary)
}

/// Read one line as text, or `None` at end of input.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so a
/// mistyped question is still just a question.
async fn read_question<R: AsyncBufRead + Unpin>(
    input: &mut R,
    buf: &mut Vec<u8>,
) -> Result<Option<String>, PdfQaError> {
    buf.clear();
    if input.read_until(b'\n', buf).await? == 0 {
        return Ok(None);
    }
    while matches!(buf.last(), Some(b'\n' | b'\r')) {
        buf.pop();
    }
    Ok(Some(String::from_utf8_lossy(buf).into_owned()))
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<(), PdfQaError> {
    output.write_all(text.as_bytes()).await?;
    output.write_all(b"\n").await?;
    output.flush().await?;
    Ok(())
}
