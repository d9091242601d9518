use lopdf::{Dictionary, Document, Object, Stream};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use zzprint_runtime::*;

fn write_test_pdf(path: &Path, num_pages: usize) {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for _ in 0..num_pages {
        let content_id = doc.add_object(Stream::new(Dictionary::new(), b"q Q".to_vec()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(595),
                    Object::Integer(421),
                ]),
            ),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    let pages_dict = Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Pages".to_vec())),
        ("Kids", Object::Array(kids)),
        ("Count", Object::Integer(num_pages as i64)),
    ]);
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc.save(path).unwrap();
}

fn invoices(dir: &Path, count: usize) -> Vec<PathBuf> {
    (0..count)
        .map(|i| {
            let path = dir.join(format!("invoice{}.pdf", i));
            write_test_pdf(&path, 1);
            path
        })
        .collect()
}

fn options_for(paths: &[PathBuf]) -> LayoutOptions {
    LayoutOptions {
        input_files: paths.iter().cloned().map(InputFile::from).collect(),
        copies: 2,
        ..LayoutOptions::default()
    }
}

/// Run commands through a fresh worker and collect every update it sends
async fn run(commands: Vec<PrintCommand>) -> Vec<PrintUpdate> {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();

    for cmd in commands {
        command_tx.send(cmd).unwrap();
    }
    drop(command_tx);

    worker_task(command_rx, update_tx).await;

    let mut updates = Vec::new();
    while let Ok(update) = update_rx.try_recv() {
        updates.push(update);
    }
    updates
}

#[tokio::test]
async fn test_load_sources_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = invoices(dir.path(), 2);
    let ofd = dir.path().join("e-invoice.ofd");
    std::fs::write(&ofd, b"ofd").unwrap();
    paths.push(ofd);

    let updates = run(vec![PrintCommand::LoadSources {
        files: paths.into_iter().map(InputFile::from).collect(),
        policy: FailurePolicy::Placeholder,
    }])
    .await;

    assert!(matches!(
        updates.as_slice(),
        [PrintUpdate::SourcesLoaded {
            documents: 3,
            pages: 3,
            placeholders: 1
        }]
    ));
}

#[tokio::test]
async fn test_generate_writes_output_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let paths = invoices(dir.path(), 3);
    let output_path = dir.path().join("out.pdf");
    let history_path = dir.path().join("history.json");

    let updates = run(vec![
        PrintCommand::Generate {
            options: options_for(&paths),
            output_path: output_path.clone(),
            history_path: Some(history_path.clone()),
        },
        PrintCommand::CheckHistory {
            files: paths.clone(),
            history_path,
        },
    ])
    .await;

    let sheet_progress = updates
        .iter()
        .filter(|u| matches!(u, PrintUpdate::Progress { operation, .. } if operation == "Laying out sheets"))
        .count();
    assert_eq!(sheet_progress, 3);

    let complete = updates.iter().find_map(|u| match u {
        PrintUpdate::Complete { path, sheet_count } => Some((path.clone(), *sheet_count)),
        _ => None,
    });
    assert_eq!(complete, Some((output_path.clone(), 3)));
    assert_eq!(Document::load(&output_path).unwrap().get_pages().len(), 3);

    let printed = updates.iter().find_map(|u| match u {
        PrintUpdate::PrintedBefore { files } => Some(files.clone()),
        _ => None,
    });
    assert_eq!(printed, Some(paths));
}

#[tokio::test]
async fn test_queued_previews_collapse_to_newest() {
    let dir = tempfile::tempdir().unwrap();
    let paths = invoices(dir.path(), 4);

    let mut first = options_for(&paths);
    first.grid = Grid::OneByOne;
    let mut newest = options_for(&paths);
    newest.grid = Grid::TwoByFour;

    let updates = run(vec![
        PrintCommand::GeneratePreview {
            options: first.clone(),
            max_sheets: 8,
        },
        PrintCommand::GeneratePreview {
            options: first,
            max_sheets: 8,
        },
        PrintCommand::GeneratePreview {
            options: newest,
            max_sheets: 8,
        },
    ])
    .await;

    let previews: Vec<usize> = updates
        .iter()
        .filter_map(|u| match u {
            PrintUpdate::PreviewGenerated { page_count, .. } => Some(*page_count),
            _ => None,
        })
        .collect();
    // 8 cells fit one 2×4 sheet
    assert_eq!(previews, vec![1]);
}

#[tokio::test]
async fn test_stats_use_options() {
    let dir = tempfile::tempdir().unwrap();
    let paths = invoices(dir.path(), 3);

    let updates = run(vec![PrintCommand::CalculateStats {
        options: options_for(&paths),
    }])
    .await;

    match updates.as_slice() {
        [PrintUpdate::StatsCalculated { stats }] => {
            assert_eq!(stats.placed_cells, 6);
            assert_eq!(stats.output_sheets, 3);
        }
        other => panic!("Unexpected updates: {:?}", other),
    }
}

#[tokio::test]
async fn test_abort_policy_reports_error() {
    let dir = tempfile::tempdir().unwrap();
    let broken = dir.path().join("broken.pdf");
    std::fs::write(&broken, b"not a pdf").unwrap();

    let mut options = options_for(&[broken]);
    options.failure_policy = FailurePolicy::Abort;

    let updates = run(vec![PrintCommand::Generate {
        options,
        output_path: dir.path().join("out.pdf"),
        history_path: None,
    }])
    .await;

    assert!(matches!(updates.last(), Some(PrintUpdate::Error { .. })));
    assert!(!dir.path().join("out.pdf").exists());
}

#[tokio::test]
async fn test_cache_cleared_between_loads() {
    let dir = tempfile::tempdir().unwrap();
    let paths = invoices(dir.path(), 1);
    let files: Vec<InputFile> = paths.iter().cloned().map(InputFile::from).collect();

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(worker_task(command_rx, update_tx));

    command_tx
        .send(PrintCommand::LoadSources {
            files: files.clone(),
            policy: FailurePolicy::Placeholder,
        })
        .unwrap();
    assert!(matches!(
        update_rx.recv().await,
        Some(PrintUpdate::SourcesLoaded { pages: 1, .. })
    ));

    // A cached load would still report the old page count
    write_test_pdf(&paths[0], 2);
    command_tx.send(PrintCommand::ClearCache).unwrap();
    command_tx
        .send(PrintCommand::LoadSources {
            files,
            policy: FailurePolicy::Placeholder,
        })
        .unwrap();
    assert!(matches!(
        update_rx.recv().await,
        Some(PrintUpdate::SourcesLoaded { pages: 2, .. })
    ));

    drop(command_tx);
    worker.await.unwrap();
}

#[tokio::test]
async fn test_stats_without_inputs_reports_error() {
    let updates = run(vec![PrintCommand::CalculateStats {
        options: LayoutOptions::default(),
    }])
    .await;

    assert!(matches!(
        updates.as_slice(),
        [PrintUpdate::Error { message }] if message == "No input files specified"
    ));
}

#[tokio::test]
async fn test_history_records_remaining_sources_when_one_disappears() {
    let dir = tempfile::tempdir().unwrap();
    let paths = invoices(dir.path(), 2);
    let output_path = dir.path().join("out.pdf");
    let history_path = dir.path().join("history.json");
    let options = options_for(&paths);

    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (update_tx, mut update_rx) = mpsc::unbounded_channel();
    let worker = tokio::spawn(worker_task(command_rx, update_tx));

    command_tx
        .send(PrintCommand::LoadSources {
            files: options.input_files.clone(),
            policy: options.failure_policy,
        })
        .unwrap();
    assert!(matches!(
        update_rx.recv().await,
        Some(PrintUpdate::SourcesLoaded { documents: 2, .. })
    ));

    // The cached document still lays out, but the file can no longer be hashed
    std::fs::remove_file(&paths[0]).unwrap();

    command_tx
        .send(PrintCommand::Generate {
            options,
            output_path: output_path.clone(),
            history_path: Some(history_path.clone()),
        })
        .unwrap();
    loop {
        match update_rx.recv().await.unwrap() {
            PrintUpdate::Complete { sheet_count, .. } => {
                assert_eq!(sheet_count, 2);
                break;
            }
            PrintUpdate::Error { message } => panic!("generate failed: {message}"),
            _ => {}
        }
    }
    assert!(output_path.exists());

    command_tx
        .send(PrintCommand::CheckHistory {
            files: vec![paths[1].clone()],
            history_path,
        })
        .unwrap();
    match update_rx.recv().await {
        Some(PrintUpdate::PrintedBefore { files }) => assert_eq!(files, vec![paths[1].clone()]),
        other => panic!("unexpected update: {other:?}"),
    }

    drop(command_tx);
    worker.await.unwrap();
}
