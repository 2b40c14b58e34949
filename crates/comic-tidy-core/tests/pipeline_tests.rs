use std::cell::RefCell;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use comic_tidy_core::{
    AppConfig, ArchiveConverter, ConvertOptions, ConvertReport, Converter, Error, Pipeline,
    PipelineStage, ProgressReporter, SilentReporter, Strategy,
};

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn write_zip_comic(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut zip = ZipWriter::new(File::create(path).unwrap());
    zip.start_file("001.jpg", SimpleFileOptions::default()).unwrap();
    zip.write_all(b"page").unwrap();
    zip.finish().unwrap();
}

struct FailingConverter;

impl Converter for FailingConverter {
    fn run(
        &self,
        _source: &Path,
        _dest: &Path,
        _options: &ConvertOptions,
        _reporter: &dyn ProgressReporter,
    ) -> Result<ConvertReport, Error> {
        Err(Error::Archive("converter exploded".to_string()))
    }
}

/// Records the options it was handed and converts nothing.
#[derive(Default)]
struct SpyConverter {
    seen: RefCell<Option<(ConvertOptions, bool)>>,
}

impl Converter for SpyConverter {
    fn run(
        &self,
        source: &Path,
        dest: &Path,
        options: &ConvertOptions,
        _reporter: &dyn ProgressReporter,
    ) -> Result<ConvertReport, Error> {
        *self.seen.borrow_mut() = Some((options.clone(), dest.is_dir()));
        Ok(ConvertReport {
            source: source.to_path_buf(),
            dest: dest.to_path_buf(),
            tally: Default::default(),
            flatten: None,
            prune: None,
        })
    }
}

#[derive(Default)]
struct StageRecorder {
    stages: RefCell<Vec<PipelineStage>>,
}

impl ProgressReporter for StageRecorder {
    fn on_stage(&self, stage: PipelineStage) {
        self.stages.borrow_mut().push(stage);
    }
}

#[test]
fn test_converter_failure_keeps_flatten_results() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    write(&root.join("a/foo.cbz"), "a");
    write(&root.join("b/foo.cbr"), "b");
    write(&root.join("c/d/foo.cbz"), "c");

    let result = Pipeline::new(&root, &AppConfig::default()).run(&FailingConverter, &SilentReporter);
    assert!(matches!(result, Err(Error::Archive(_))));

    // Flattened and pruned, no rollback.
    assert!(root.join("foo.cbz").exists());
    assert!(root.join("foo (1).cbz").exists());
    assert!(root.join("foo.cbr").exists());
    assert!(!root.join("a").exists());
    assert!(!root.join("c").exists());
    // The temp folder was created before conversion and is left behind.
    assert!(root.join("converted_temp").is_dir());
}

#[test]
fn test_pipeline_uses_fixed_settings_and_cleans_temp() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    write(&root.join("x/one.cbz"), "1");

    let spy = SpyConverter::default();
    let recorder = StageRecorder::default();
    let report = Pipeline::new(&root, &AppConfig::default())
        .run(&spy, &recorder)
        .unwrap();

    let (options, temp_existed) = spy.seen.borrow().clone().expect("converter called");
    assert!(temp_existed);
    assert!(options.force_replace);
    assert_eq!(options.flatten, Some(Strategy::Rename));
    assert!(!options.dry_run);

    assert_eq!(report.flatten.tally.moved, 1);
    assert_eq!(report.flatten.prune.as_ref().unwrap().tally.removed, 1);
    assert!(!report.temp_dir.exists());
    assert_eq!(
        *recorder.stages.borrow(),
        vec![
            PipelineStage::Flatten,
            PipelineStage::PrepareTemp,
            PipelineStage::Convert,
            PipelineStage::Cleanup,
        ]
    );
}

#[test]
fn test_pipeline_converts_and_replaces_cbr() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    write_zip_comic(&root.join("vol1/Book.cbr"));
    write(&root.join("vol2/Other.cbz"), "other");

    let report = Pipeline::new(&root, &AppConfig::default())
        .run(&ArchiveConverter::new(), &SilentReporter)
        .unwrap();

    assert_eq!(report.convert.tally.converted, 1);
    assert_eq!(report.convert.tally.replaced, 1);
    assert!(root.join("Book.cbz").exists());
    assert!(!root.join("Book.cbr").exists());
    assert!(root.join("Other.cbz").exists());
    assert!(!root.join("converted_temp").exists());
    let entries: Vec<_> = fs::read_dir(&root).unwrap().flatten().collect();
    assert_eq!(entries.len(), 2);
}

#[test]
fn test_pipeline_missing_root_is_fatal() {
    let tmp = tempdir().unwrap();
    let result = Pipeline::new(tmp.path().join("missing"), &AppConfig::default())
        .run(&FailingConverter, &SilentReporter);
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[test]
fn test_pipeline_keeps_unrelated_cbz_with_same_stem() {
    let tmp = tempdir().unwrap();
    let root = tmp.path().join("library");
    write(&root.join("foo.cbz"), "DIFFERENT COMIC");
    write_zip_comic(&root.join("sub/foo.cbr"));

    let report = Pipeline::new(&root, &AppConfig::default())
        .run(&ArchiveConverter::new(), &SilentReporter)
        .unwrap();

    assert_eq!(report.flatten.tally.moved, 1);
    assert_eq!(report.convert.tally.converted, 1);
    assert_eq!(report.convert.tally.replaced, 1);
    assert_eq!(
        fs::read_to_string(root.join("foo.cbz")).unwrap(),
        "DIFFERENT COMIC"
    );
    assert!(root.join("foo (1).cbz").is_file());
    assert!(!root.join("foo.cbr").exists());
    assert!(!root.join("sub").exists());
    assert!(!root.join("converted_temp").exists());
}
