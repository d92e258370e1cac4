use std::fs;
use std::io::Write;

use crate::cli::{cmd_build, collect_blob_paths, exit_code, BuildArgs};
use estk_dts::ConversionError;

const CLEAN_XML: &str = r#"<package>
    <classdef name="Document" dynamic="true">
        <elements type="constructor"><constructor name="constructor"><parameters></parameters></constructor></elements>
        <elements type="instance">
            <method name="save">
                <parameters>
                    <parameter name="path">
                        <datatype><type>String</type></datatype>
                    </parameter>
                </parameters>
            </method>
        </elements>
    </classdef>
</package>"#;

fn build_args(xml: &std::path::Path, out: &std::path::Path) -> BuildArgs {
    BuildArgs {
        xml: xml.to_path_buf(),
        blobs: Vec::new(),
        blob_dir: None,
        out: Some(out.to_path_buf()),
        log_level: "warn".to_string(),
        require_blobs: false,
    }
}

#[test]
fn test_cmd_build_writes_declaration_from_xml_only() {
    let tmp = tempfile::tempdir().unwrap();
    let xml_path = tmp.path().join("Document.xml");
    fs::write(&xml_path, CLEAN_XML).unwrap();
    let out_path = tmp.path().join("out.d.ts");

    cmd_build(build_args(&xml_path, &out_path)).unwrap();

    let output = fs::read_to_string(&out_path).unwrap();
    assert!(output.contains("declare class Document"));
    assert!(output.contains("save(path: string): void;"));
}

#[test]
fn test_cmd_build_recovers_parameter_description_from_blob() {
    let tmp = tempfile::tempdir().unwrap();
    let xml = r#"<package>
        <classdef name="Document" dynamic="true">
            <elements type="constructor"><constructor name="constructor"><parameters></parameters></constructor></elements>
            <elements type="instance">
                <method name="resize">
                    <parameters>
                        <parameter name="interpolationType">
                            <datatype><type>String</type></datatype>
                        </parameter>
                    </parameters>
                </method>
            </elements>
        </classdef>
    </package>"#;
    let xml_path = tmp.path().join("Document.xml");
    fs::write(&xml_path, xml).unwrap();

    let blob_path = tmp.path().join("Document.dll");
    let mut blob = fs::File::create(&blob_path).unwrap();
    blob.write_all(b"interpolationType: The interpolation method to use.\0resize\0").unwrap();

    let out_path = tmp.path().join("out.d.ts");
    let mut args = build_args(&xml_path, &out_path);
    args.blobs.push(blob_path);

    cmd_build(args).unwrap();

    let output = fs::read_to_string(&out_path).unwrap();
    assert!(output.contains("The interpolation method to use."));
}

#[test]
fn test_cmd_build_rejects_structurally_invalid_xml() {
    let tmp = tempfile::tempdir().unwrap();
    let xml_path = tmp.path().join("Bad.xml");
    fs::write(&xml_path, r#"<package><classdef name="Mystery"></classdef></package>"#).unwrap();
    let out_path = tmp.path().join("out.d.ts");

    let err = cmd_build(build_args(&xml_path, &out_path)).unwrap_err();
    assert!(matches!(err, ConversionError::UnknownDefinitionKind { .. }));
    assert!(!out_path.exists());
}

#[test]
fn test_cmd_build_missing_xml_file_is_io_error() {
    let tmp = tempfile::tempdir().unwrap();
    let xml_path = tmp.path().join("does-not-exist.xml");
    let out_path = tmp.path().join("out.d.ts");

    let err = cmd_build(build_args(&xml_path, &out_path)).unwrap_err();
    assert!(matches!(err, ConversionError::Io { .. }));
}

#[test]
fn test_cmd_build_require_blobs_errors_when_none_found() {
    let tmp = tempfile::tempdir().unwrap();
    let xml_path = tmp.path().join("Document.xml");
    fs::write(&xml_path, CLEAN_XML).unwrap();
    let out_path = tmp.path().join("out.d.ts");

    let mut args = build_args(&xml_path, &out_path);
    args.require_blobs = true;

    let err = cmd_build(args).unwrap_err();
    assert!(matches!(err, ConversionError::NoBlobsFound { .. }));
}

#[test]
fn test_collect_blob_paths_explicit_then_sorted_dir() {
    let tmp = tempfile::tempdir().unwrap();
    let explicit = tmp.path().join("explicit.dll");
    fs::write(&explicit, b"").unwrap();

    let dir = tmp.path().join("natives");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("zeta.dll"), b"").unwrap();
    fs::write(dir.join("alpha.dll"), b"").unwrap();

    let args = BuildArgs {
        xml: tmp.path().join("unused.xml"),
        blobs: vec![explicit.clone()],
        blob_dir: Some(dir.clone()),
        out: None,
        log_level: "warn".to_string(),
        require_blobs: false,
    };

    let paths = collect_blob_paths(&args).unwrap();
    assert_eq!(
        paths,
        vec![explicit, dir.join("alpha.dll"), dir.join("zeta.dll")],
        "explicit blobs come first, directory blobs follow sorted by file name"
    );
}

#[test]
fn test_exit_code_io_and_argument_errors_are_two() {
    let io_err = ConversionError::Io {
        path: "x".to_string(),
        source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
    };
    assert_eq!(exit_code(&io_err), 2);

    let no_blobs = ConversionError::NoBlobsFound { dir: "x".to_string() };
    assert_eq!(exit_code(&no_blobs), 2);

    let invalid_args = ConversionError::InvalidArgs("bad flag combination".to_string());
    assert_eq!(exit_code(&invalid_args), 2);
}

#[test]
fn test_exit_code_structural_errors_are_one() {
    let unknown_def = ConversionError::UnknownDefinitionKind { name: "x".to_string() };
    assert_eq!(exit_code(&unknown_def), 1);

    let unknown_member = ConversionError::UnknownMemberKind {
        definition: "x".to_string(),
        tag: "widget".to_string(),
    };
    assert_eq!(exit_code(&unknown_member), 1);
}
