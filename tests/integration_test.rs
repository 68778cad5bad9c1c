use pptx_unlock::models::plan_jobs;
use pptx_unlock::package::XmlDocument;
use pptx_unlock::package::is_modify_verifier;
use pptx_unlock::{run_batch, transform, App, BatchContext, Config, FailureKind, Job};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const DESCRIPTOR: &str = "ppt/presentation.xml";

const PROTECTED_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:modifyVerifier cryptAlgorithmClass="hash" cryptAlgorithmType="typeAny" spinCount="100000"/><p:sldIdLst/></p:presentation>"#;

const PLAIN_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<p:presentation xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:sldIdLst/></p:presentation>"#;

const MEDIA: &[u8] = &[0x89, b'P', b'N', b'G', 0, 1, 2, 3, 255, 254];

/// 构造一个演示文稿压缩包
fn write_package(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);
    for (name, content) in entries {
        if name.ends_with('/') {
            zip.add_directory(*name, options).unwrap();
        } else {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content).unwrap();
        }
    }
    zip.finish().unwrap();
}

fn standard_package(path: &Path, descriptor: &str) {
    write_package(
        path,
        &[
            ("[Content_Types].xml", b"<Types/>"),
            ("_rels/.rels", b"<Relationships/>"),
            ("ppt/", b""),
            (DESCRIPTOR, descriptor.as_bytes()),
            ("ppt/slides/slide1.xml", b"<p:sld/>"),
            ("ppt/media/image1.png", MEDIA),
        ],
    );
}

/// 读出压缩包全部成员（目录成员内容为空）
fn read_members(path: &Path) -> BTreeMap<String, Vec<u8>> {
    let mut archive = ZipArchive::new(File::open(path).unwrap()).unwrap();
    let mut members = BTreeMap::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).unwrap();
        let mut content = Vec::new();
        entry.read_to_end(&mut content).unwrap();
        members.insert(entry.name().to_string(), content);
    }
    members
}

fn verifier_count(xml: &[u8]) -> usize {
    XmlDocument::parse(xml)
        .unwrap()
        .count_elements(is_modify_verifier)
}

#[test]
fn test_end_to_end_removes_verifier() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("locked.pptx");
    let output = dir.path().join("unlocked.pptx");
    standard_package(&input, PROTECTED_XML);

    assert_eq!(transform(&input, &output).unwrap(), 1);

    let before = read_members(&input);
    let after = read_members(&output);
    assert_eq!(
        before.keys().collect::<Vec<_>>(),
        after.keys().collect::<Vec<_>>()
    );

    for (name, content) in &before {
        if name != DESCRIPTOR {
            assert_eq!(&after[name], content, "成员 {} 内容被改变", name);
        }
    }

    let descriptor = String::from_utf8(after[DESCRIPTOR].clone()).unwrap();
    assert_eq!(verifier_count(descriptor.as_bytes()), 0);
    assert!(descriptor.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\""));
    assert!(descriptor.contains("<p:sldIdLst/>"));

    // 与不含标记的文档逻辑等价
    let expected = XmlDocument::parse(PLAIN_XML.as_bytes())
        .unwrap()
        .to_pretty_bytes()
        .unwrap();
    assert_eq!(descriptor.as_bytes(), expected.as_slice());
}

#[test]
fn test_output_is_deflated() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("a.pptx");
    let output = dir.path().join("b.pptx");
    standard_package(&input, PROTECTED_XML);
    transform(&input, &output).unwrap();

    let mut archive = ZipArchive::new(File::open(&output).unwrap()).unwrap();
    let entry = archive.by_name(DESCRIPTOR).unwrap();
    assert_eq!(entry.compression(), CompressionMethod::Deflated);
}

#[test]
fn test_unprotected_package_is_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("plain.pptx");
    let output = dir.path().join("out.pptx");
    standard_package(&input, PLAIN_XML);

    assert_eq!(transform(&input, &output).unwrap(), 0);
    assert_eq!(read_members(&input), read_members(&output));
}

#[test]
fn test_missing_descriptor() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("no_descriptor.pptx");
    let output = dir.path().join("out.pptx");
    write_package(&input, &[("[Content_Types].xml", b"<Types/>")]);

    let err = transform(&input, &output).unwrap_err();
    assert_eq!(err.kind(), FailureKind::MissingDescriptor);
    assert_eq!(err.to_string(), "找不到 ppt/presentation.xml 文件。");
    assert!(!output.exists());
}

#[test]
fn test_truncated_archive_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("broken.pptx");
    standard_package(&input, PROTECTED_XML);
    let bytes = fs::read(&input).unwrap();
    fs::write(&input, &bytes[..bytes.len() / 2]).unwrap();

    let err = transform(&input, &dir.path().join("out.pptx")).unwrap_err();
    assert_eq!(err.kind(), FailureKind::UnreadablePackage);
}

#[test]
fn test_legacy_binary_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("old.ppt");
    fs::write(&input, [0xD0, 0xCF, 0x11, 0xE0, 0xA1, 0xB1, 0x1A, 0xE1]).unwrap();

    let err = transform(&input, &dir.path().join("old_out.ppt")).unwrap_err();
    assert_eq!(err.kind(), FailureKind::UnreadablePackage);

    let err = transform(&dir.path().join("missing.pptx"), &dir.path().join("x.pptx")).unwrap_err();
    assert_eq!(err.kind(), FailureKind::UnreadablePackage);
}

#[test]
fn test_malformed_descriptor_leaves_no_output() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("bad_xml.pptx");
    let output = dir.path().join("out.pptx");
    standard_package(&input, "<p:presentation><unclosed>");

    let err = transform(&input, &output).unwrap_err();
    assert_eq!(err.kind(), FailureKind::MalformedXml);
    assert!(!output.exists());
}

#[cfg(unix)]
#[test]
fn test_output_mode_follows_input() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("shared.pptx");
    let output = dir.path().join("shared_out.pptx");
    standard_package(&input, PROTECTED_XML);
    fs::set_permissions(&input, fs::Permissions::from_mode(0o644)).unwrap();

    transform(&input, &output).unwrap();

    let mode = fs::metadata(&output).unwrap().permissions().mode() & 0o777;
    assert_eq!(mode, 0o644);
}

#[test]
fn test_existing_output_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("deck.pptx");
    let output = dir.path().join("deck_out.pptx");
    standard_package(&input, PROTECTED_XML);
    fs::write(&output, b"stale").unwrap();

    transform(&input, &output).unwrap();
    assert_eq!(verifier_count(&read_members(&output)[DESCRIPTOR]), 0);
}

#[tokio::test]
async fn test_batch_isolates_failures() {
    let dir = tempfile::tempdir().unwrap();
    let in_dir = dir.path().join("in");
    let out_dir = dir.path().join("out");
    fs::create_dir_all(&in_dir).unwrap();
    fs::create_dir_all(&out_dir).unwrap();

    let mut jobs = Vec::new();
    for i in 0..5 {
        let input = in_dir.join(format!("deck{}.pptx", i));
        standard_package(&input, PROTECTED_XML);
        jobs.push(Job::for_input(&input, &out_dir).unwrap());
    }

    // 第 3 个文件截断
    let bad = jobs[2].input.clone();
    let bytes = fs::read(&bad).unwrap();
    fs::write(&bad, &bytes[..bytes.len() / 2]).unwrap();

    let report = run_batch(&BatchContext::new(3), jobs.clone()).await;

    assert_eq!(report.total, 5);
    assert_eq!(report.succeeded, 4);
    assert_eq!(report.failed, 1);
    assert_eq!(report.total, report.succeeded + report.failed);
    assert_eq!(report.failures[0].input, bad);
    assert_eq!(report.failures[0].kind, FailureKind::UnreadablePackage);

    for (i, job) in jobs.iter().enumerate() {
        assert_eq!(job.output.exists(), i != 2, "输出 {}", job.output.display());
    }
}

#[tokio::test]
async fn test_batch_all_failed_still_reports() {
    let dir = tempfile::tempdir().unwrap();
    let jobs: Vec<Job> = (0..3)
        .map(|i| {
            Job::new(
                dir.path().join(format!("missing{}.pptx", i)),
                dir.path().join(format!("out{}.pptx", i)),
            )
        })
        .collect();

    let report = run_batch(&BatchContext::new(1), jobs).await;
    assert_eq!(report.total, 3);
    assert_eq!(report.failed, 3);
    assert!(!report.is_clean());
}

#[tokio::test]
async fn test_app_run_reports_collisions() {
    let dir = tempfile::tempdir().unwrap();
    let in_dir = dir.path().join("in");
    fs::create_dir_all(in_dir.join("a")).unwrap();
    fs::create_dir_all(in_dir.join("b")).unwrap();

    let first = in_dir.join("a").join("deck.pptx");
    let second = in_dir.join("b").join("deck.pptx");
    let missing = in_dir.join("nodesc.pptx");
    standard_package(&first, PROTECTED_XML);
    standard_package(&second, PLAIN_XML);
    write_package(&missing, &[("docProps/app.xml", b"<Properties/>")]);

    let json_path = dir.path().join("report.json");
    let config = Config {
        input_folder: in_dir.clone(),
        output_folder: dir.path().join("out"),
        max_workers: 2,
        verbose_logging: false,
        output_log_file: None,
        report_json: Some(json_path.clone()),
    };

    let inputs: Vec<PathBuf> = vec![first.clone(), second.clone(), missing.clone()];
    let app = App::initialize(config).await.unwrap();
    let report = app.run(inputs).await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 2);

    // 失败按输入顺序排列
    assert_eq!(report.failures[0].input, second);
    assert_eq!(report.failures[1].input, missing);

    let kinds: Vec<_> = report
        .failures
        .iter()
        .map(|f| (f.input.clone(), f.kind))
        .collect();
    assert!(kinds.contains(&(missing, FailureKind::MissingDescriptor)));
    assert!(kinds.contains(&(second, FailureKind::OutputCollision)));

    // 输出来自先出现的文件
    let output = dir.path().join("out").join("deck.pptx");
    assert_eq!(verifier_count(&read_members(&output)[DESCRIPTOR]), 0);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["failed"], 2);
}

#[test]
fn test_plan_jobs_flat_output() {
    let plan = plan_jobs(["x/one.pptx", "y/z/two.PPT"], Path::new("out"));
    assert!(plan.rejected.is_empty());
    assert_eq!(plan.jobs[1].output, Path::new("out").join("two.PPT"));
}
