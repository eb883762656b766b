use super::{CodeScanner, Permission, ScanEvent};
use crate::analysis::{AnalysisRequester, ProductKind, TextGenerator};
use crate::catalog::{ProductLookup, ProductSearch};
use crate::error::{LookupError, ScanError};
use crate::model::{AnalysisResult, LookupOutcome};
use crate::output;
use crate::request_state::{RequestState, RequestTracker};
use std::convert::Infallible;
use std::io::Write;

#[derive(Debug, Clone, Copy, Default)]
pub struct SessionOptions {
    pub analyze: bool,
    pub json: bool,
    /// Framing for analysis; inferred per product when unset.
    pub kind: Option<ProductKind>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub scanned: usize,
    pub found: usize,
    pub not_found: usize,
    pub failed: usize,
}

/// Drive a scan session until the scanner is exhausted.
///
/// The scanner is deactivated while a lookup (and the optional analysis) is
/// in flight and re-activated once it settles. Lookup failures are reported
/// and the session continues; only scanner errors end it early.
pub async fn run<C, L, G, S, W>(
    scanner: &mut C,
    catalog: &L,
    analyzer: &AnalysisRequester<G, S>,
    options: SessionOptions,
    out: &mut W,
) -> Result<SessionSummary, ScanError>
where
    C: CodeScanner,
    L: ProductLookup,
    G: TextGenerator,
    S: ProductSearch,
    W: Write,
{
    if scanner.request_permission().await? == Permission::Denied {
        return Err(ScanError::PermissionDenied);
    }
    scanner.set_active(true);

    let mut summary = SessionSummary::default();
    let mut lookup: RequestTracker<LookupOutcome, LookupError> = RequestTracker::new();
    let mut analysis: RequestTracker<AnalysisResult, Infallible> = RequestTracker::new();

    // Lookups are awaited one at a time; the trackers are the read-only
    // state the renderers consume, so Idle/InFlight never reach them.
    while let Some(event) = scanner.next_event().await? {
        scanner.set_active(false);
        lookup.begin();
        summary.scanned += 1;
        tracing::info!("Scanned {} code {}", event.symbol, event.value);

        let result = catalog.fetch_by_code(&event.value).await;
        lookup.settle(result);

        let mut analysis_result = None;
        match lookup.state() {
            RequestState::Succeeded(LookupOutcome::Found(product)) => {
                summary.found += 1;
                if options.analyze {
                    analysis.reset();
                    analysis.begin();
                    let kind = options.kind.unwrap_or_else(|| ProductKind::infer(product));
                    analysis.settle(Ok(analyzer.request_analysis_as(product, kind).await));
                    if let RequestState::Succeeded(result) = analysis.state() {
                        analysis_result = Some(result);
                    }
                }
            }
            RequestState::Succeeded(LookupOutcome::NotFound { .. }) => summary.not_found += 1,
            RequestState::Failed(e) => {
                summary.failed += 1;
                tracing::warn!("Lookup of {} failed: {}", event.value, e);
            }
            RequestState::Idle | RequestState::InFlight => {}
        }

        if options.json {
            write_json(out, &event, lookup.state(), analysis_result)?;
        } else {
            write_markdown(out, &event, lookup.state(), analysis_result)?;
        }
        out.flush()?;

        scanner.set_active(true);
    }

    tracing::info!(
        "Scan session finished: {} scanned, {} found, {} not found, {} failed",
        summary.scanned,
        summary.found,
        summary.not_found,
        summary.failed
    );
    Ok(summary)
}

fn write_markdown<W: Write>(
    out: &mut W,
    event: &ScanEvent,
    lookup: &RequestState<LookupOutcome, LookupError>,
    analysis: Option<&AnalysisResult>,
) -> std::io::Result<()> {
    write!(out, "{}", output::format_scan_event(event))?;
    match lookup {
        RequestState::Succeeded(LookupOutcome::Found(product)) => {
            write!(out, "{}", output::format_product(product))?;
            if let Some(result) = analysis {
                write!(out, "{}", output::format_analysis(result))?;
            }
        }
        RequestState::Succeeded(LookupOutcome::NotFound { code }) => {
            write!(out, "{}", output::format_not_found(code))?;
        }
        RequestState::Failed(e) => {
            write!(out, "{}", output::format_lookup_error(&event.value, e))?;
        }
        RequestState::Idle | RequestState::InFlight => {}
    }
    Ok(())
}

fn write_json<W: Write>(
    out: &mut W,
    event: &ScanEvent,
    lookup: &RequestState<LookupOutcome, LookupError>,
    analysis: Option<&AnalysisResult>,
) -> std::io::Result<()> {
    let lookup = match lookup {
        RequestState::Succeeded(outcome) => serde_json::to_value(outcome)?,
        RequestState::Failed(e) => serde_json::json!({ "outcome": "error", "error": e.to_string() }),
        RequestState::Idle | RequestState::InFlight => serde_json::Value::Null,
    };
    let line = serde_json::json!({
        "scan": event,
        "lookup": lookup,
        "analysis": analysis,
    });
    serde_json::to_writer(&mut *out, &line)?;
    writeln!(out)
}
