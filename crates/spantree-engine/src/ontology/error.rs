use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OntologyError {
    #[error("no ontology named '{name}' under {}", display_path(.parent))]
    NotFound { name: String, parent: Vec<String> },
    #[error("an ontology path needs at least one name")]
    EmptyPath,
}

fn display_path(path: &[String]) -> String {
    if path.is_empty() {
        "the root".to_owned()
    } else {
        format!("'{}'", path.join("/"))
    }
}
