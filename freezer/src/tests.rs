//! Tests for the freeze pipeline.

use std::fs;
use std::path::Path;

use cfgfreeze_artifact::read_artifact;
use cfgfreeze_bootstrap::{Descriptor, SEED_PATH, thaw};
use cfgfreeze_graph::{AttrPath, Object, ObjectGraph, Value};
use cfgfreeze_source::{ConfigModule, FnProvider, MODULE_CLASS, SourceError};

use super::*;

const PROCESS_SOURCE: &str = r#"
process: !Process
  name: GEN
  RandomNumberGeneratorService: !Service
    externalLHEProducer: !PSet
      initialSeed: !uint32 1234
  generator: !EDProducer
    type: Pythia8HadronizerFilter
    comEnergy: 13000.0
    process: !ref process
  producers: [!ref process.generator]
unused: !PSet
  big: 1
"#;

fn write_source(dir: &Path, text: &str) -> PathBuf {
    let path = dir.join("job_cfg.yaml");
    fs::write(&path, text).unwrap();
    path
}

fn lookup<'a>(graph: &'a ObjectGraph, path: &str) -> &'a Value {
    graph.lookup(&AttrPath::parse(path).unwrap()).unwrap()
}

fn files_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_freeze_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_source(dir.path(), PROCESS_SOURCE);
    let output = dir.path().join("bootstrap.py");

    let frozen = freeze(&config, &output, &FreezeOptions::default()).unwrap();
    assert_eq!(frozen.bootstrap, output);
    assert_eq!(frozen.artifact, dir.path().join("bootstrap.py.pkl"));

    let expected = SourceProvider::new(&config)
        .load()
        .unwrap()
        .extract(PROCESS_ATTR)
        .unwrap();
    let stored = read_artifact(&frozen.artifact).unwrap();
    assert_eq!(stored, expected);

    let thawed = thaw(&frozen.bootstrap).unwrap();
    assert_eq!(lookup(&thawed, "name").as_str(), Some("GEN"));
    assert_eq!(lookup(&thawed, "generator.comEnergy"), &Value::Float(13000.0));
    assert_eq!(lookup(&thawed, "generator.process"), thawed.root());
    assert_eq!(lookup(&thawed, "producers.0"), lookup(&thawed, "generator"));
    assert_eq!(
        lookup(&thawed, SEED_PATH),
        &Value::tagged("uint32", Value::Int(100))
    );
}

#[test]
fn test_freeze_writes_exactly_two_files() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    let out = dir.path().join("out");
    fs::create_dir_all(&src).unwrap();
    fs::create_dir_all(&out).unwrap();
    let config = write_source(&src, PROCESS_SOURCE);

    freeze(&config, &out.join("cfg.py"), &FreezeOptions::default()).unwrap();
    assert_eq!(files_in(&out), vec!["cfg.py", "cfg.py.pkl"]);
    assert_eq!(fs::read_to_string(&config).unwrap(), PROCESS_SOURCE);
}

#[test]
fn test_freeze_drops_other_module_attributes() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_source(dir.path(), PROCESS_SOURCE);
    let frozen = freeze(&config, &dir.path().join("out"), &FreezeOptions::default()).unwrap();

    let stored = read_artifact(&frozen.artifact).unwrap();
    assert!(stored.objects().all(|(_, o)| {
        o.class.as_deref() != Some(MODULE_CLASS) && !o.has_attr("big")
    }));
}

// ============================================================================
// Pairing
// ============================================================================

#[test]
fn test_pairing_with_dots_and_separators() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_source(dir.path(), PROCESS_SOURCE);
    let nested = dir.path().join("v1.2").join("run.d");
    fs::create_dir_all(&nested).unwrap();

    for name in ["job", "job.py", "job.v2.cfg"] {
        let output = nested.join(name);
        let frozen = freeze(&config, &output, &FreezeOptions::default()).unwrap();

        let descriptor = Descriptor::parse(&fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(descriptor.artifact, format!("{}.pkl", output.display()));
        assert_eq!(Path::new(&descriptor.artifact), frozen.artifact);
        assert!(frozen.artifact.exists());
    }
}

#[test]
fn test_pairing_python_bootstrap() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_source(dir.path(), PROCESS_SOURCE);
    let output = dir.path().join("job.cfg.py");
    let opts = FreezeOptions {
        emit: EmitFormat::Python,
        ..Default::default()
    };

    let frozen = freeze(&config, &output, &opts).unwrap();
    let text = fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "import FWCore.ParameterSet.Config as cms");
    assert_eq!(lines[1], "import pickle");
    assert_eq!(
        lines[2],
        format!("process = pickle.load(open('{}', 'rb'))", frozen.artifact.display())
    );
    assert_eq!(lines[3], format!("process.{SEED_PATH} = 100"));

    let thawed = thaw(&output).unwrap();
    assert_eq!(lookup(&thawed, SEED_PATH).untagged(), &Value::Int(100));
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_invalid_source_fails_before_writing() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_source(dir.path(), "process: [unclosed\n");
    let output = dir.path().join("out.py");

    let err = freeze(&config, &output, &FreezeOptions::default()).unwrap_err();
    assert!(matches!(err, FreezeError::Load(_)));
    assert!(!output.exists());
    assert!(!dir.path().join("out.py.pkl").exists());
}

#[test]
fn test_eval_error_is_load_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_source(dir.path(), "process: !ref nowhere\n");

    let err = freeze(&config, &dir.path().join("out"), &FreezeOptions::default()).unwrap_err();
    match err {
        FreezeError::Load(source) => assert!(source.to_string().contains("nowhere")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_missing_process_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_source(dir.path(), "proc: !Process\n  name: GEN\n");

    let err = freeze(&config, &dir.path().join("out.py"), &FreezeOptions::default()).unwrap_err();
    match &err {
        FreezeError::Attribute(SourceError::MissingAttribute { attr, .. }) => {
            assert_eq!(attr, PROCESS_ATTR)
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(files_in(dir.path()), vec!["job_cfg.yaml"]);
}

#[test]
fn test_missing_source_is_input_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = freeze(
        &dir.path().join("missing.yaml"),
        &dir.path().join("out.py"),
        &FreezeOptions::default(),
    )
    .unwrap_err();
    assert!(matches!(err, FreezeError::Input(SourceError::Io { .. })));
    assert_eq!(files_in(dir.path()), Vec::<String>::new());
}

#[test]
fn test_unwritable_output() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_source(dir.path(), PROCESS_SOURCE);
    let output = dir.path().join("no/such/dir/out.py");

    let err = freeze(&config, &output, &FreezeOptions::default()).unwrap_err();
    assert!(matches!(err, FreezeError::Bootstrap(_)));
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_regenerate_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_source(dir.path(), PROCESS_SOURCE);
    let output = dir.path().join("out.py");

    for emit in [EmitFormat::Descriptor, EmitFormat::Python] {
        let opts = FreezeOptions {
            emit,
            ..Default::default()
        };
        let first = freeze(&config, &output, &opts).unwrap();
        let bootstrap = fs::read(&first.bootstrap).unwrap();
        let artifact = read_artifact(&first.artifact).unwrap();

        let second = freeze(&config, &output, &opts).unwrap();
        assert_eq!(first, second);
        assert_eq!(fs::read(&second.bootstrap).unwrap(), bootstrap);
        assert_eq!(read_artifact(&second.artifact).unwrap(), artifact);
    }
}

// ============================================================================
// Providers
// ============================================================================

fn built_module() -> Result<ConfigModule, SourceError> {
    let mut graph = ObjectGraph::new();
    let pset = graph.alloc(
        Object::with_class("PSet").with_attr("initialSeed", Value::tagged("uint32", Value::Int(7))),
    );
    let rng = graph.alloc(Object::with_class("Service").with_attr("externalLHEProducer", pset));
    let process = graph.alloc(
        Object::with_class("Process")
            .with_attr("name", "BUILT")
            .with_attr("RandomNumberGeneratorService", rng),
    );
    let namespace = graph.alloc(Object::with_class(MODULE_CLASS).with_attr(PROCESS_ATTR, process));
    graph.set_root(Value::Object(namespace));
    Ok(ConfigModule::new("built", graph, namespace))
}

#[test]
fn test_freeze_with_fn_provider() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("built.py");

    let frozen = freeze_with(&FnProvider::new(built_module), &output, &FreezeOptions::default())
        .unwrap();
    let thawed = thaw(&frozen.bootstrap).unwrap();
    assert_eq!(lookup(&thawed, "name").as_str(), Some("BUILT"));
    assert_eq!(lookup(&thawed, SEED_PATH).as_int(), Some(100));
}

#[test]
fn test_freeze_with_failing_provider() {
    let dir = tempfile::tempdir().unwrap();
    let provider = FnProvider::new(|| Err(SourceError::Build("generator crashed".to_string())));

    let err = freeze_with(&provider, &dir.path().join("out"), &FreezeOptions::default())
        .unwrap_err();
    assert!(matches!(err, FreezeError::Load(SourceError::Build(_))));
    assert!(err.to_string().contains("generator crashed"));
}

#[test]
fn test_provider_missing_attribute_is_attribute_error() {
    let dir = tempfile::tempdir().unwrap();
    let provider = FnProvider::new(|| {
        Err(SourceError::MissingAttribute {
            module: "built".to_string(),
            attr: "geometry".to_string(),
        })
    });

    let err = freeze_with(&provider, &dir.path().join("out.py"), &FreezeOptions::default())
        .unwrap_err();
    assert!(matches!(
        err,
        FreezeError::Attribute(SourceError::MissingAttribute { .. })
    ));
    assert_eq!(files_in(dir.path()), Vec::<String>::new());
}

#[test]
fn test_freeze_with_dyn_provider() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_source(dir.path(), PROCESS_SOURCE);
    let provider: Box<dyn ConfigProvider> = Box::new(SourceProvider::new(config));

    let frozen = freeze_with(provider.as_ref(), &dir.path().join("dyn"), &FreezeOptions::default())
        .unwrap();
    assert!(frozen.artifact.exists());
}

#[test]
fn test_transfer_message() {
    let out = FreezeOutput {
        bootstrap: PathBuf::from("a.py"),
        artifact: PathBuf::from("a.py.pkl"),
    };
    assert_eq!(
        out.transfer_message(),
        "Done!  You will need to add 'transfer_input_files = a.py, a.py.pkl' to your Condor submit file."
    );
}
