use crate::handlers::{self, SourceCache};
use crate::{PrintCommand, PrintUpdate};
use tokio::sync::mpsc;

/// Start a worker on the current tokio runtime and return its channels
pub fn spawn_worker() -> (
    mpsc::UnboundedSender<PrintCommand>,
    mpsc::UnboundedReceiver<PrintUpdate>,
) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, update_rx) = mpsc::unbounded_channel();
    tokio::spawn(worker_task(command_rx, update_tx));
    (command_tx, update_rx)
}

/// Async worker task that processes layout commands and sends updates.
///
/// Runs until every command sender is dropped.
pub async fn worker_task(
    mut command_rx: mpsc::UnboundedReceiver<PrintCommand>,
    update_tx: mpsc::UnboundedSender<PrintUpdate>,
) {
    let mut cache = SourceCache::new();

    while let Some(cmd) = command_rx.recv().await {
        process_command(cmd, &mut cache, &mut command_rx, &update_tx).await;
    }
}

async fn process_command(
    cmd: PrintCommand,
    cache: &mut SourceCache,
    command_rx: &mut mpsc::UnboundedReceiver<PrintCommand>,
    update_tx: &mpsc::UnboundedSender<PrintUpdate>,
) {
    match cmd {
        PrintCommand::LoadSources { files, policy } => {
            handlers::handle_load_sources(files, policy, cache, update_tx).await;
        }
        PrintCommand::CalculateStats { options } => {
            handlers::handle_calculate_stats(options, cache, update_tx).await;
        }
        PrintCommand::GeneratePreview {
            mut options,
            mut max_sheets,
        } => {
            // Drain any queued preview commands, keeping only the most recent
            while let Ok(next_cmd) = command_rx.try_recv() {
                if let PrintCommand::GeneratePreview {
                    options: new_options,
                    max_sheets: new_max_sheets,
                } = next_cmd
                {
                    log::debug!("Discarding queued preview, using newer request");
                    options = new_options;
                    max_sheets = new_max_sheets;
                } else {
                    // Other commands keep their place ahead of the preview
                    Box::pin(process_command(next_cmd, cache, command_rx, update_tx)).await;
                }
            }

            handlers::handle_generate_preview(options, max_sheets, cache, update_tx).await;
        }
        PrintCommand::Generate {
            options,
            output_path,
            history_path,
        } => {
            handlers::handle_generate(options, output_path, history_path, cache, update_tx).await;
        }
        PrintCommand::CheckHistory {
            files,
            history_path,
        } => {
            handlers::handle_check_history(files, history_path, update_tx).await;
        }
        PrintCommand::ClearCache => {
            log::debug!("Clearing source cache");
            cache.clear();
        }
    }
}
