//! Tests for the configuration object graph.

use super::*;

/// process
///   RandomNumberGeneratorService (Service)
///     externalLHEProducer (PSet): initialSeed = uint32 1234
///   producers: [generator]
///   generator (EDProducer) with a back-reference to process
fn sample_process() -> ObjectGraph {
    let mut graph = ObjectGraph::new();
    let process = graph.alloc(Object::with_class("Process").with_attr("name", "GEN"));
    let seed = graph.alloc(
        Object::with_class("PSet")
            .with_attr("initialSeed", Value::tagged("uint32", Value::Int(1234)))
            .with_attr("engineName", "HepJamesRandom"),
    );
    let rng = graph.alloc(Object::with_class("Service").with_attr("externalLHEProducer", seed));
    let generator = graph.alloc(
        Object::with_class("EDProducer")
            .with_attr("type", "Pythia8HadronizerFilter")
            .with_attr("process", process),
    );

    let obj = graph.get_mut(process).unwrap();
    obj.set_attr("RandomNumberGeneratorService", Value::Object(rng));
    obj.set_attr("generator", Value::Object(generator));
    obj.set_attr("producers", Value::Seq(vec![Value::Object(generator)]));
    graph.set_root(Value::Object(process));
    graph
}

fn path(s: &str) -> AttrPath {
    s.parse().unwrap()
}

// ============================================================================
// AttrPath
// ============================================================================

#[test]
fn test_path_parse() {
    let p = path("RandomNumberGeneratorService.externalLHEProducer.initialSeed");
    assert_eq!(p.len(), 3);
    assert_eq!(p.segments()[1], "externalLHEProducer");
    assert_eq!(p.prefix(2), "RandomNumberGeneratorService.externalLHEProducer");
    assert_eq!(p.to_string(), "RandomNumberGeneratorService.externalLHEProducer.initialSeed");
}

#[test]
fn test_path_parse_invalid() {
    assert!(AttrPath::parse("").is_err());
    assert!(AttrPath::parse("a..b").is_err());
    assert!(AttrPath::parse(".a").is_err());
    assert!(AttrPath::parse("a.").is_err());
}

#[test]
fn test_path_split_last() {
    let p = path("a.b.c");
    let (parent, leaf) = p.split_last();
    assert_eq!(parent, &["a".to_string(), "b".to_string()]);
    assert_eq!(leaf, "c");
}

// ============================================================================
// Object
// ============================================================================

#[test]
fn test_object_set_attr_keeps_order() {
    let mut obj = Object::new();
    assert!(obj.set_attr("b", Value::Int(1)).is_none());
    assert!(obj.set_attr("a", Value::Int(2)).is_none());
    assert_eq!(obj.set_attr("b", Value::Int(3)), Some(Value::Int(1)));

    let names: Vec<&str> = obj.fields.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(names, vec!["b", "a"]);
    assert_eq!(obj.attr("b"), Some(&Value::Int(3)));
}

// ============================================================================
// Resolve / assign
// ============================================================================

#[test]
fn test_lookup_nested() {
    let graph = sample_process();
    let seed = graph
        .lookup(&path("RandomNumberGeneratorService.externalLHEProducer.initialSeed"))
        .unwrap();
    assert_eq!(seed.tag(), Some("uint32"));
    assert_eq!(seed.as_int(), Some(1234));
}

#[test]
fn test_lookup_through_sequence_and_cycle() {
    let graph = sample_process();
    let name = graph.lookup(&path("producers.0.process.name")).unwrap();
    assert_eq!(name.as_str(), Some("GEN"));
}

#[test]
fn test_lookup_missing() {
    let graph = sample_process();
    let err = graph
        .lookup(&path("RandomNumberGeneratorService.missing.initialSeed"))
        .unwrap_err();
    assert_eq!(
        err,
        GraphError::NotFound("RandomNumberGeneratorService.missing".to_string())
    );
}

#[test]
fn test_lookup_through_scalar() {
    let graph = sample_process();
    let err = graph.lookup(&path("name.length")).unwrap_err();
    assert_eq!(err, GraphError::NotAnObject("name".to_string()));
}

#[test]
fn test_assign_keeps_tag() {
    let mut graph = sample_process();
    let p = path("RandomNumberGeneratorService.externalLHEProducer.initialSeed");
    let previous = graph.assign(&p, Value::Int(100)).unwrap();

    assert_eq!(previous, Some(Value::tagged("uint32", Value::Int(1234))));
    assert_eq!(graph.lookup(&p).unwrap(), &Value::tagged("uint32", Value::Int(100)));
}

#[test]
fn test_assign_replaces_tagged_with_tagged() {
    let mut graph = sample_process();
    let p = path("RandomNumberGeneratorService.externalLHEProducer.initialSeed");
    graph.assign(&p, Value::tagged("int32", Value::Int(5))).unwrap();
    assert_eq!(graph.lookup(&p).unwrap().tag(), Some("int32"));
}

#[test]
fn test_assign_creates_leaf() {
    let mut graph = sample_process();
    let p = path("RandomNumberGeneratorService.externalLHEProducer.skip");
    assert_eq!(graph.assign(&p, Value::Bool(true)).unwrap(), None);
    assert_eq!(graph.lookup(&p).unwrap(), &Value::Bool(true));
}

#[test]
fn test_assign_missing_parent() {
    let mut graph = sample_process();
    let err = graph
        .assign(&path("NoSuchService.externalLHEProducer.initialSeed"), Value::Int(1))
        .unwrap_err();
    assert_eq!(err, GraphError::NotFound("NoSuchService".to_string()));
}

#[test]
fn test_assign_on_scalar_root() {
    let mut graph = ObjectGraph::new();
    graph.set_root(Value::Int(1));
    let err = graph.assign(&path("x"), Value::Int(2)).unwrap_err();
    assert_eq!(err, GraphError::NotAnObject("<root>".to_string()));
}

// ============================================================================
// Extract
// ============================================================================

#[test]
fn test_extract_drops_unreachable() {
    let mut graph = sample_process();
    let stray = graph.alloc(Object::with_class("Unused"));
    assert_eq!(graph.len(), 5);

    let root = graph.root().clone();
    let extracted = graph.extract(&root).unwrap();
    assert_eq!(extracted.len(), 4);
    assert!(extracted.objects().all(|(_, o)| o.class.as_deref() != Some("Unused")));
    let _ = stray;
}

#[test]
fn test_extract_renumbers_depth_first() {
    let mut graph = ObjectGraph::new();
    // Allocate children before the parent so ids are out of visiting order.
    let b = graph.alloc(Object::with_class("B"));
    let a = graph.alloc(Object::with_class("A"));
    let root = graph.alloc(Object::with_class("Root").with_attr("a", a).with_attr("b", b));
    graph.get_mut(a).unwrap().set_attr("back", Value::Object(root));

    let extracted = graph.extract(&Value::Object(root)).unwrap();
    let classes: Vec<&str> = extracted
        .objects()
        .map(|(_, o)| o.class.as_deref().unwrap())
        .collect();
    assert_eq!(classes, vec!["Root", "A", "B"]);
    assert_eq!(extracted.root(), &Value::Object(ObjectId(0)));
    assert_eq!(
        extracted.lookup(&path("a.back.b")).unwrap(),
        &Value::Object(ObjectId(2))
    );
}

#[test]
fn test_extract_is_deterministic() {
    let graph = sample_process();
    let root = graph.root().clone();
    let once = graph.extract(&root).unwrap();
    let twice = once.extract(once.root()).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_extract_dangling() {
    let mut graph = ObjectGraph::new();
    let root = graph.alloc(Object::new().with_attr("x", ObjectId(42)));
    let err = graph.extract(&Value::Object(root)).unwrap_err();
    assert_eq!(err, GraphError::DanglingRef(ObjectId(42)));
}

#[test]
fn test_validate() {
    let graph = sample_process();
    assert!(graph.validate().is_ok());

    let mut broken = ObjectGraph::new();
    broken.set_root(Value::Seq(vec![Value::Object(ObjectId(0))]));
    assert_eq!(broken.validate(), Err(GraphError::DanglingRef(ObjectId(0))));
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_msgpack_preserves_cycles() {
    let graph = sample_process();
    let bytes = rmp_serde::to_vec_named(&graph).unwrap();
    let restored: ObjectGraph = rmp_serde::from_slice(&bytes).unwrap();
    assert_eq!(graph, restored);
    assert_eq!(
        restored.lookup(&path("generator.process.generator.type")).unwrap().as_str(),
        Some("Pythia8HadronizerFilter")
    );
}

// ============================================================================
// YAML rendering
// ============================================================================

#[test]
fn test_to_yaml_renders_refs() {
    let graph = sample_process();
    let text = graph.to_yaml_string("process").unwrap();

    assert!(text.contains("process: !Process"));
    assert!(text.contains("initialSeed: !uint32 1234"));
    assert!(text.contains("process: !ref process\n"));
    assert!(text.contains("- !ref process.generator"));
}

#[test]
fn test_to_yaml_scalar_root() {
    let mut graph = ObjectGraph::new();
    graph.set_root(Value::Seq(vec![Value::Int(1), Value::from("two")]));
    let yaml = graph.to_yaml("root").unwrap();
    assert_eq!(yaml, serde_yaml::from_str::<serde_yaml::Value>("[1, two]").unwrap());
}
