//! Background execution of the analysis call.

use crate::types::AnalysisOutcome;
use providers::gemini::GeminiClient;
use shared::prompt::{AnalysisPrompt, SYSTEM_INSTRUCTION};
use std::sync::mpsc::Sender;

/// Run the analysis request to completion on a dedicated runtime and send
/// the outcome back to the UI (non-blocking).
///
/// `prompt` is the snapshot captured when the user triggered the analysis;
/// gallery edits made while the call is in flight do not affect it. There is
/// no cancellation: the result is delivered whenever the service answers.
pub fn run_analysis(client: GeminiClient, prompt: AnalysisPrompt, tx: Sender<AnalysisOutcome>) {
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            let _ = tx.send(AnalysisOutcome::Failed(format!(
                "Failed to start async runtime: {}",
                e
            )));
            return;
        }
    };

    let result = rt.block_on(client.analyze(
        SYSTEM_INSTRUCTION,
        &prompt.text,
        &prompt.image_parts,
    ));

    let outcome = match result {
        Ok(text) => AnalysisOutcome::Completed(text),
        Err(e) => AnalysisOutcome::Failed(e.to_string()),
    };
    let _ = tx.send(outcome);
}
