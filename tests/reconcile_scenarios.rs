mod common;

use assert_fs::prelude::*;
use media_reconciler::core::reconcile::{ActionKind, ApplyOutcome, Reconciler, TransferMode};
use media_reconciler::events::EventSender;
use media_reconciler::ReconcileError;
use predicates::prelude::*;

fn reconciler(sources: &[&std::path::Path], dest: &std::path::Path, mode: TransferMode) -> Reconciler {
    Reconciler::new(common::config(sources, dest, mode), common::token())
}

#[test]
fn new_photo_is_copied_into_dated_sooc_folder() {
    let source = assert_fs::TempDir::new().unwrap();
    let dest = assert_fs::TempDir::new().unwrap();
    let photo = source.child("photo.jpg");
    common::write(&photo, &common::jpeg("2024:11:13 14:22:05", b"a"));

    let run = reconciler(&[source.path()], dest.path(), TransferMode::Copy);
    let events = EventSender::detached();
    let plan = run.plan(&events).unwrap();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan.count(ActionKind::Copy), 1);

    let report = run.apply(&plan, &events).unwrap();
    assert_eq!(report.outcome, ApplyOutcome::Completed);
    dest.child("photos/2024/2024-11-13/sooc/photo.jpg")
        .assert(predicate::path::is_file());
    photo.assert(predicate::path::is_file());
}

#[test]
fn renamed_copy_in_destination_is_skipped() {
    let source = assert_fs::TempDir::new().unwrap();
    let dest = assert_fs::TempDir::new().unwrap();
    let bytes = common::jpeg("2024:11:13 14:22:05", b"same");
    common::write(&source.child("photo.jpg"), &bytes);
    common::write(&dest.child("photos/2024/2024-11-13/sooc/renamed.jpg"), &bytes);

    let run = reconciler(&[source.path()], dest.path(), TransferMode::Copy);
    let events = EventSender::detached();
    let plan = run.plan(&events).unwrap();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan.count(ActionKind::Skip), 1);

    run.apply(&plan, &events).unwrap();
    source.child("photo.jpg").assert(predicate::path::is_file());
    dest.child("photos/2024/2024-11-13/sooc/photo.jpg")
        .assert(predicate::path::missing());
}

#[test]
fn second_run_only_skips() {
    let source = assert_fs::TempDir::new().unwrap();
    let dest = assert_fs::TempDir::new().unwrap();
    common::write(&source.child("a.jpg"), &common::jpeg("2023:06:01 08:00:00", b"a"));
    common::write(&source.child("b.RAF"), &common::raf("2023:06:01 08:00:01"));
    common::write(&source.child("clips/c.mov"), &common::mov(3_800_000_000));

    let events = EventSender::detached();
    let first = reconciler(&[source.path()], dest.path(), TransferMode::Copy);
    let plan = first.plan(&events).unwrap();
    assert_eq!(plan.count(ActionKind::Copy), 3);
    first.apply(&plan, &events).unwrap();

    let second = reconciler(&[source.path()], dest.path(), TransferMode::Copy);
    let plan = second.plan(&events).unwrap();
    assert_eq!(plan.len(), 3);
    assert_eq!(plan.count(ActionKind::Skip), 3);
}

#[test]
fn raw_and_video_land_without_subfolder() {
    let source = assert_fs::TempDir::new().unwrap();
    let dest = assert_fs::TempDir::new().unwrap();
    common::write(&source.child("DSCF0001.RAF"), &common::raf("2022:02:03 10:11:12"));

    let run = reconciler(&[source.path()], dest.path(), TransferMode::Copy);
    let events = EventSender::detached();
    let plan = run.plan(&events).unwrap();
    run.apply(&plan, &events).unwrap();

    dest.child("photos/2022/2022-02-03/DSCF0001.RAF")
        .assert(predicate::path::is_file());
}

#[test]
fn move_mode_removes_source() {
    let source = assert_fs::TempDir::new().unwrap();
    let dest = assert_fs::TempDir::new().unwrap();
    let photo = source.child("photo.jpg");
    common::write(&photo, &common::jpeg("2024:11:13 14:22:05", b"m"));

    let run = reconciler(&[source.path()], dest.path(), TransferMode::Move);
    let events = EventSender::detached();
    let plan = run.plan(&events).unwrap();
    assert_eq!(plan.count(ActionKind::Move), 1);

    run.apply(&plan, &events).unwrap();
    photo.assert(predicate::path::missing());
    dest.child("photos/2024/2024-11-13/sooc/photo.jpg")
        .assert(predicate::path::is_file());
}

#[test]
fn zero_creation_time_produces_no_plan() {
    let source = assert_fs::TempDir::new().unwrap();
    let dest = assert_fs::TempDir::new().unwrap();
    common::write(&source.child("clip.mov"), &common::mov(0));

    let run = reconciler(&[source.path()], dest.path(), TransferMode::Copy);
    let err = run.plan(&EventSender::detached()).unwrap_err();

    assert!(matches!(err, ReconcileError::Resolve(_)));
    assert!(err.to_string().contains("clip.mov"));
}

#[test]
fn destination_conflict_blocks_every_mutation() {
    let source = assert_fs::TempDir::new().unwrap();
    let dest = assert_fs::TempDir::new().unwrap();
    let dup = common::jpeg("2024:01:01 00:00:00", b"dup");
    common::write(&dest.child("photos/2024/2024-01-01/sooc/a.jpg"), &dup);
    common::write(&dest.child("photos/2024/2024-01-01/sooc/b.jpg"), &dup);
    common::write(&dest.child("photos/2019/2019-01-01/sooc/misplaced.jpg"), &common::jpeg("2024:01:02 00:00:00", b"x"));
    common::write(&source.child("new.jpg"), &common::jpeg("2024:01:03 00:00:00", b"n"));

    let run = reconciler(&[source.path()], dest.path(), TransferMode::Move);
    let events = EventSender::detached();
    let plan = run.plan(&events).unwrap();

    assert_eq!(plan.count(ActionKind::Conflict), 1);
    assert_eq!(plan.count(ActionKind::Move), 2);

    let report = run.apply(&plan, &events).unwrap();
    assert_eq!(report.outcome, ApplyOutcome::Refused);
    source.child("new.jpg").assert(predicate::path::is_file());
    dest.child("photos/2019/2019-01-01/sooc/misplaced.jpg")
        .assert(predicate::path::is_file());
    dest.child("photos/2024/2024-01-03").assert(predicate::path::missing());
}

#[test]
fn same_file_name_from_two_cameras_is_caught_before_apply() {
    let first = assert_fs::TempDir::new().unwrap();
    let second = assert_fs::TempDir::new().unwrap();
    let dest = assert_fs::TempDir::new().unwrap();
    common::write(&first.child("DSCF0001.JPG"), &common::jpeg("2024:05:05 10:00:00", b"x100v"));
    common::write(&second.child("DSCF0001.JPG"), &common::jpeg("2024:05:05 16:00:00", b"x-t5"));
    common::write(&first.child("other.jpg"), &common::jpeg("2024:05:06 10:00:00", b"other"));

    let run = reconciler(&[first.path(), second.path()], dest.path(), TransferMode::Move);
    let events = EventSender::detached();
    let plan = run.plan(&events).unwrap();

    assert_eq!(plan.count(ActionKind::Conflict), 1);
    assert_eq!(plan.count(ActionKind::Move), 1);
    assert!(plan.summary().to_string().contains("2 files would be placed at"));

    let report = run.apply(&plan, &events).unwrap();
    assert_eq!(report.outcome, ApplyOutcome::Refused);
    first.child("DSCF0001.JPG").assert(predicate::path::is_file());
    second.child("DSCF0001.JPG").assert(predicate::path::is_file());
    first.child("other.jpg").assert(predicate::path::is_file());
    dest.child("photos").assert(predicate::path::missing());
}

#[test]
fn duplicates_across_sources_are_copied_once() {
    let card = assert_fs::TempDir::new().unwrap();
    let phone = assert_fs::TempDir::new().unwrap();
    let dest = assert_fs::TempDir::new().unwrap();
    let bytes = common::jpeg("2021:07:04 18:00:00", b"twin");
    common::write(&card.child("IMG_1.jpg"), &bytes);
    common::write(&phone.child("IMG_1.jpg"), &bytes);

    let run = reconciler(&[card.path(), phone.path()], dest.path(), TransferMode::Copy);
    let events = EventSender::detached();
    let plan = run.plan(&events).unwrap();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan.source_duplicates(), &[phone.child("IMG_1.jpg").path().to_path_buf()]);

    let report = run.apply(&plan, &events).unwrap();
    assert_eq!(report.applied, 1);
}

#[test]
fn no_sooc_places_jpeg_beside_raw() {
    let source = assert_fs::TempDir::new().unwrap();
    let dest = assert_fs::TempDir::new().unwrap();
    common::write(&source.child("photo.jpg"), &common::jpeg("2024:11:13 14:22:05", b"s"));

    let config = media_reconciler::core::reconcile::ReconcileConfig::builder()
        .source(source.path())
        .destination(dest.path())
        .no_sooc(true)
        .build()
        .unwrap();
    let run = Reconciler::new(config, common::token());
    let events = EventSender::detached();
    let plan = run.plan(&events).unwrap();
    run.apply(&plan, &events).unwrap();

    dest.child("photos/2024/2024-11-13/photo.jpg")
        .assert(predicate::path::is_file());
}

#[test]
fn many_files_flow_through_a_small_queue() {
    let source = assert_fs::TempDir::new().unwrap();
    let dest = assert_fs::TempDir::new().unwrap();
    for i in 0..60 {
        let name = format!("day{}/IMG_{i:04}.jpg", i % 3);
        common::write(
            &source.child(name),
            &common::jpeg("2020:12:24 19:30:00", format!("frame {i}").as_bytes()),
        );
    }

    let run = reconciler(&[source.path()], dest.path(), TransferMode::Copy);
    let (sender, receiver) = media_reconciler::events::EventChannel::unbounded();
    let plan = run.plan(&sender).unwrap();
    assert_eq!(plan.count(ActionKind::Copy), 60);

    let report = run.apply(&plan, &sender).unwrap();
    assert_eq!(report.applied, 60);

    let progress: Vec<_> = receiver
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            media_reconciler::events::Event::Progress(p) => Some(p),
            _ => None,
        })
        .collect();
    assert!(progress.iter().all(|p| p.percent <= 100));
    assert!(progress.iter().any(|p| p.processed == 60 && p.total == 60));
}
